//! 产品数据页抓取
//!
//! 抓取分三步，各自可单独测试：
//!
//! - **fetch**: 校验 URL 属于允许的域名，下载页面（外部协作者，可替换）
//! - **extract**: 在页面中定位数据表容器，按顺序产出分组标题和键值条目
//! - **mapper**: 清理文本、合并被拆开的行、过滤黑名单，生成文档行
//!
//! 结果是四种互斥的结论之一：有数据、空结果、已取消、失败。
//! 取消和空结果都不是错误；取消时已经解析出的行全部丢弃。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::config::ScrapeConfig;
use crate::document::Row;

pub mod extract;
pub mod fetch;
pub mod mapper;

pub use extract::extract_items;
pub use fetch::{validate_url, HttpFetcher, PageFetcher};
pub use mapper::{merge_lines, normalize_text, render_value, ScrapeMapper};

/// 抓取失败的原因
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("不允许抓取 {url}：只支持 {domain}")]
    DomainNotAllowed { url: String, domain: String },

    #[error("网络错误: {0}")]
    Network(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    /// 页面已加载，但没有找到数据表容器
    #[error("页面中没有找到数据表 ({0})")]
    MissingContainer(String),
}

/// 页面中提取出的原始条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapedItem {
    /// 分组标题
    Section { title: String },
    /// 键和原始多行文本（按换行分隔）
    Entry { key: String, raw: String },
}

impl ScrapedItem {
    pub fn section(title: impl Into<String>) -> Self {
        ScrapedItem::Section {
            title: title.into(),
        }
    }

    pub fn entry(key: impl Into<String>, raw: impl Into<String>) -> Self {
        ScrapedItem::Entry {
            key: key.into(),
            raw: raw.into(),
        }
    }
}

/// 抓取结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Rows(Vec<Row>),
    /// 页面正常，但过滤后没有任何行
    Empty,
    /// 用户取消，不提交任何行
    Canceled,
    Failed(ScrapeError),
}

impl ScrapeOutcome {
    pub fn rows(&self) -> &[Row] {
        match self {
            ScrapeOutcome::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScrapeOutcome::Failed(_))
    }
}

/// 可在线程间共享的取消标记
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 长时间操作的进度回调，前端（CLI/界面线程）按需实现
pub trait ScrapeProgress {
    /// 开始处理，`total` 为条目总数
    fn begin(&mut self, _total: usize) {}

    /// 又处理完一个条目
    fn item_done(&mut self, _done: usize, _total: usize) {}

    fn log(&mut self, _msg: &str) {}
}

/// 不关心进度时使用
pub struct NullProgress;

impl ScrapeProgress for NullProgress {}

/// 完整的抓取流程：校验、下载、提取、映射
pub fn scrape_url(
    url: &str,
    config: &ScrapeConfig,
    fetcher: &dyn PageFetcher,
    cancel: &CancelToken,
    progress: &mut dyn ScrapeProgress,
) -> ScrapeOutcome {
    let url = match validate_url(url, &config.allowed_domain) {
        Ok(url) => url,
        Err(e) => return ScrapeOutcome::Failed(e),
    };

    progress.log(&format!("正在加载 {}", url));
    let html = match fetcher.fetch(&url) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("页面加载失败 {}: {}", url, e);
            return ScrapeOutcome::Failed(e);
        }
    };

    if cancel.is_canceled() {
        return ScrapeOutcome::Canceled;
    }

    let items = match extract_items(&html, config) {
        Ok(items) => items,
        Err(e) => return ScrapeOutcome::Failed(e),
    };
    tracing::info!("从 {} 提取 {} 个条目", url, items.len());

    ScrapeMapper::from_config(config).map_items(&items, cancel, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Url;

    struct StaticPage(&'static str);

    impl PageFetcher for StaticPage {
        fn fetch(&self, _url: &Url) -> Result<String, ScrapeError> {
            Ok(self.0.to_string())
        }
    }

    struct Unreachable;

    impl PageFetcher for Unreachable {
        fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
            Err(ScrapeError::Timeout(url.to_string()))
        }
    }

    const PAGE: &str = r#"<html><body>
<table class="datenblatt">
  <tr class="gruppe"><td colspan="2">Sensor</td></tr>
  <tr><td>Auflösung</td><td>8.640 x<br>5.760<br>(<br>Pixel<br>)</td></tr>
  <tr><td>Preis</td><td>2.999 EUR</td></tr>
</table>
</body></html>"#;

    #[test]
    fn test_scrape_url_maps_page() {
        let outcome = scrape_url(
            "https://www.digitalkamera.de/Kamera/Test.aspx",
            &ScrapeConfig::default(),
            &StaticPage(PAGE),
            &CancelToken::new(),
            &mut NullProgress,
        );
        assert_eq!(
            outcome,
            ScrapeOutcome::Rows(vec![
                Row::section("Sensor"),
                Row::entry("Auflösung", "8.640 x 5.760 (Pixel)"),
            ])
        );
    }

    #[test]
    fn test_foreign_domain_is_rejected_before_fetch() {
        let outcome = scrape_url(
            "https://example.com/kamera",
            &ScrapeConfig::default(),
            &StaticPage(PAGE),
            &CancelToken::new(),
            &mut NullProgress,
        );
        assert!(matches!(
            outcome,
            ScrapeOutcome::Failed(ScrapeError::DomainNotAllowed { .. })
        ));
    }

    #[test]
    fn test_network_failure_is_an_error_not_empty() {
        let outcome = scrape_url(
            "https://digitalkamera.de/x",
            &ScrapeConfig::default(),
            &Unreachable,
            &CancelToken::new(),
            &mut NullProgress,
        );
        assert!(outcome.is_error());
        assert!(outcome.rows().is_empty());
    }

    #[test]
    fn test_missing_container_is_reported() {
        let outcome = scrape_url(
            "https://digitalkamera.de/x",
            &ScrapeConfig::default(),
            &StaticPage("<p>Wartung</p>"),
            &CancelToken::new(),
            &mut NullProgress,
        );
        assert!(matches!(
            outcome,
            ScrapeOutcome::Failed(ScrapeError::MissingContainer(_))
        ));
    }

    #[test]
    fn test_canceled_before_mapping() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = scrape_url(
            "https://digitalkamera.de/x",
            &ScrapeConfig::default(),
            &StaticPage(PAGE),
            &cancel,
            &mut NullProgress,
        );
        assert_eq!(outcome, ScrapeOutcome::Canceled);
    }
}
