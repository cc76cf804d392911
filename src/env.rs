//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，所有变量都以 `SPECSHEET_` 为前缀

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 只有变量被显式设置且能解析时才返回值，用于覆盖配置文件
    fn get_override() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "SPECSHEET_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 翻译功能启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable translation of the exported sheet";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 直译接口（德语到法语）
    pub struct DirectApiUrl;
    impl EnvVar<String> for DirectApiUrl {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_DIRECT_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "DeepLX-compatible endpoint used for direct DE->FR translation";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 中转接口（德语经英语到法语）
    pub struct PivotApiUrl;
    impl EnvVar<String> for PivotApiUrl {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_PIVOT_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Endpoint used for the DE->EN->FR pivot chain when no direct engine is set";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(20));
        const DESCRIPTION: &'static str = "Translation request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_timeout(value, Self::NAME)
        }
    }

    /// 语言检测置信度阈值
    pub struct MinConfidence;
    impl EnvVar<f64> for MinConfidence {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_MIN_CONFIDENCE";
        const DEFAULT: Option<f64> = Some(0.5);
        const DESCRIPTION: &'static str = "Minimum language detection confidence (0.0 - 1.0)";

        fn parse(value: &str) -> EnvResult<f64> {
            let confidence: f64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number".to_string(),
            })?;

            if !(0.0..=1.0).contains(&confidence) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Confidence must be between 0 and 1".to_string(),
                });
            }

            Ok(confidence)
        }
    }

    /// 外部词典文件
    pub struct DictionaryPath;
    impl EnvVar<String> for DictionaryPath {
        const NAME: &'static str = "SPECSHEET_DICTIONARY_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "JSON file with label overrides (flat string map)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_path(value, Self::NAME)
        }
    }

    /// 外部后编辑规则文件
    pub struct PostEditPath;
    impl EnvVar<String> for PostEditPath {
        const NAME: &'static str = "SPECSHEET_POST_EDIT_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "JSON file with post-edit substitutions (flat string map)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_path(value, Self::NAME)
        }
    }

    /// 翻译缓存大小
    pub struct CacheSize;
    impl EnvVar<usize> for CacheSize {
        const NAME: &'static str = "SPECSHEET_TRANSLATION_CACHE_SIZE";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str = "Translation cache size (number of entries)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 10, 100000)
        }
    }
}

/// 抓取相关环境变量
pub mod scrape {
    use super::*;

    /// 允许抓取的域名
    pub struct AllowedDomain;
    impl EnvVar<String> for AllowedDomain {
        const NAME: &'static str = "SPECSHEET_SCRAPE_ALLOWED_DOMAIN";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Domain (and its subdomains) scrape URLs must belong to";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("digitalkamera.de".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let domain = value.trim().trim_start_matches("www.").to_lowercase();
            if domain.is_empty() || domain.contains('/') || !domain.contains('.') {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid domain '{}'", value),
                });
            }
            Ok(domain)
        }
    }

    /// 页面请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "SPECSHEET_SCRAPE_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(20));
        const DESCRIPTION: &'static str = "Page fetch timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_timeout(value, Self::NAME)
        }
    }

    /// 请求头中的 User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "SPECSHEET_SCRAPE_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent when fetching datasheet pages";

        fn parse(value: &str) -> EnvResult<String> {
            let user_agent = value.trim();
            if user_agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User agent must not be empty".to_string(),
                });
            }
            Ok(user_agent.to_string())
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let url = value.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: "API URL must start with http:// or https://".to_string(),
        })
    }
}

fn parse_path(value: &str, var_name: &str) -> EnvResult<String> {
    let path = value.trim();
    if path.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Path must not be empty".to_string(),
        });
    }
    Ok(shellexpand::tilde(path).into_owned())
}

fn parse_timeout(value: &str, var_name: &str) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if seconds > 300 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout too long (max 300 seconds)".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 翻译配置
    pub translation_enabled: bool,
    pub translation_direct_api_url: Option<String>,
    pub translation_pivot_api_url: Option<String>,
    pub translation_timeout: Duration,
    pub translation_min_confidence: f64,

    // 抓取配置
    pub scrape_allowed_domain: String,
    pub scrape_timeout: Duration,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            translation_enabled: translation::Enabled::get()?,
            translation_direct_api_url: translation::DirectApiUrl::get().ok(),
            translation_pivot_api_url: translation::PivotApiUrl::get().ok(),
            translation_timeout: translation::RequestTimeout::get()?,
            translation_min_confidence: translation::MinConfidence::get()?,

            scrape_allowed_domain: scrape::AllowedDomain::get()?,
            scrape_timeout: scrape::RequestTimeout::get()?,
        })
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!(
            "  Translation: {}",
            if self.translation_enabled { "enabled" } else { "disabled" }
        );
        match (&self.translation_direct_api_url, &self.translation_pivot_api_url) {
            (Some(url), _) => println!("  MT Engine: direct ({})", url),
            (None, Some(url)) => println!("  MT Engine: pivot ({})", url),
            (None, None) => println!("  MT Engine: [not configured]"),
        }
        println!("  Scrape Domain: {}", self.scrape_allowed_domain);
    }
}

fn push_doc_line<T: fmt::Debug>(docs: &mut String, name: &str, description: &str, default: Option<T>) {
    docs.push_str(&format!("- `{}`: {} (default: {:?})\n", name, description, default));
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_doc_line(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION, core::LogLevel::DEFAULT);
    push_doc_line(&mut docs, core::NoColor::NAME, core::NoColor::DESCRIPTION, core::NoColor::DEFAULT);

    docs.push_str("\n## Translation Configuration\n\n");
    push_doc_line(
        &mut docs,
        translation::Enabled::NAME,
        translation::Enabled::DESCRIPTION,
        translation::Enabled::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::DirectApiUrl::NAME,
        translation::DirectApiUrl::DESCRIPTION,
        translation::DirectApiUrl::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::PivotApiUrl::NAME,
        translation::PivotApiUrl::DESCRIPTION,
        translation::PivotApiUrl::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::RequestTimeout::NAME,
        translation::RequestTimeout::DESCRIPTION,
        translation::RequestTimeout::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::MinConfidence::NAME,
        translation::MinConfidence::DESCRIPTION,
        translation::MinConfidence::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::DictionaryPath::NAME,
        translation::DictionaryPath::DESCRIPTION,
        translation::DictionaryPath::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::PostEditPath::NAME,
        translation::PostEditPath::DESCRIPTION,
        translation::PostEditPath::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        translation::CacheSize::NAME,
        translation::CacheSize::DESCRIPTION,
        translation::CacheSize::DEFAULT,
    );

    docs.push_str("\n## Scrape Configuration\n\n");
    push_doc_line(
        &mut docs,
        scrape::AllowedDomain::NAME,
        scrape::AllowedDomain::DESCRIPTION,
        scrape::AllowedDomain::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        scrape::RequestTimeout::NAME,
        scrape::RequestTimeout::DESCRIPTION,
        scrape::RequestTimeout::DEFAULT,
    );
    push_doc_line(
        &mut docs,
        scrape::UserAgent::NAME,
        scrape::UserAgent::DESCRIPTION,
        scrape::UserAgent::DEFAULT,
    );

    docs
}
