//! 配置管理模块
//!
//! 提供统一的配置管理，支持配置文件、环境变量和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, ExportConfig, ScrapeConfig, SheetConfig, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 文档默认值
    pub const DEFAULT_HEADER_LEFT: &str = "Kategorie";
    pub const DEFAULT_HEADER_RIGHT: &str = "Details";
    pub const DEFAULT_EXPORT_TITLE: &str = "Technische_Daten";
    pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%title%.txt";
    pub const DEFAULT_TARGET_SUFFIX: &str = "_FR";

    // 嵌入快照
    pub const SNAPSHOT_MARKER: &str = "SPECS_SNAPSHOT";
    pub const SNAPSHOT_VERSION: u32 = 2;

    /// 导出文件开头的固定样式块
    pub const SPEC_TABLE_CSS: &str = r#"<style type="text/css">
table.specs {width:100%; border-collapse:collapse; font-family:Arial, Helvetica, sans-serif; font-size:14px;}
      .specs th, .specs td {border:1px solid #ddd; padding:8px; vertical-align:top;}
      .specs th {background:#f5f5f5; text-align:left; width:30%;}
      .specs tr:nth-child(even){background:#fafafa;}
      .specs th.section {background:#006c8c; color:#ffffff; font-size:16px; width:auto;}
      .specs th.category {background:#e6f0f3; color:#006c8c; width:auto;}
      ul {margin:6px 0 6px 18px; padding:0;}</style>"#;

    // 语言设置
    pub const SOURCE_LANG: &str = "de";
    pub const TARGET_LANG: &str = "fr";
    pub const PIVOT_LANG: &str = "en";

    // 翻译相关
    pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
    pub const DEFAULT_MIN_BLOCK_CHARS: usize = 20;
    pub const DEFAULT_CACHE_SIZE: usize = 1000;
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

    // 抓取相关
    pub const DEFAULT_ALLOWED_DOMAIN: &str = "digitalkamera.de";
    pub const DEFAULT_CONTAINER_TAG: &str = "table";
    pub const DEFAULT_CONTAINER_CLASS: &str = "datenblatt";
    pub const DEFAULT_GROUP_HEADER_CLASS: &str = "gruppe";
    pub const DEFAULT_BULLET_LIST_KEY: &str = "Besonderheiten";
    pub const DEFAULT_USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
    pub const DEFAULT_EXCLUDED_SECTIONS: &[&str] = &["Testberichte", "Preisvergleich", "Kurzbewertung"];
    pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &["Preis", "UVP", "Bewertung", "Testbericht"];

    // 通道容量
    pub const WORKER_CHANNEL_CAPACITY: usize = 64;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "specsheet.toml",
        ".specsheet.toml",
        "specsheet.json",
        "~/.config/specsheet/config.toml",
    ];
}
