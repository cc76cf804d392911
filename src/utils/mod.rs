//! # 工具模块
//!
//! - URL 解析与域名校验（抓取入口使用）
//! - 内置正则的一次性编译

use regex::Regex;

pub use url::Url;

/// 永不匹配的表达式，内置正则编译失败时的退路
const NEVER_MATCH: &str = r"[^\s\S]";

/// 编译内置正则
///
/// 内置表达式都是常量，失败只可能来自编码错误；此时记录错误并返回一个永不匹配的表达式，
/// 相关功能退化为不生效，而不是让进程崩溃。
pub fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        tracing::error!("内置正则无效: {}", e);
        Regex::new(NEVER_MATCH).unwrap_or_else(|_| unreachable!())
    })
}

/// 判断 `domain` 是否等于 `base` 或是其子域名（不区分大小写）
pub fn domain_is_within_domain(domain: &str, base: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let base = base.trim_start_matches('.').trim_end_matches('.').to_ascii_lowercase();

    if base.is_empty() {
        return false;
    }

    domain == base || domain.ends_with(&format!(".{base}"))
}

/// 解析带协议的 URL，只接受 http 和 https
pub fn parse_http_url(input: &str) -> Option<Url> {
    let url = Url::parse(input.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}
