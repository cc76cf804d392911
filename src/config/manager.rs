//! 配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::core::{SheetError, SheetResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub enabled: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub pivot_lang: String,

    // 机器翻译引擎，未配置时走降级路径
    pub direct_api_url: Option<String>,
    pub pivot_api_url: Option<String>,
    pub request_timeout_secs: u64,

    // 语言检测
    pub min_confidence: f64,
    pub min_block_chars: usize,
    pub use_statistical_detector: bool,

    // 外部资源文件
    pub dictionary_path: Option<String>,
    pub post_edit_path: Option<String>,

    // 缓存配置
    pub cache_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_lang: constants::SOURCE_LANG.to_string(),
            target_lang: constants::TARGET_LANG.to_string(),
            pivot_lang: constants::PIVOT_LANG.to_string(),

            direct_api_url: None,
            pivot_api_url: None,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            min_confidence: constants::DEFAULT_MIN_CONFIDENCE,
            min_block_chars: constants::DEFAULT_MIN_BLOCK_CHARS,
            use_statistical_detector: true,

            dictionary_path: None,
            post_edit_path: None,

            cache_size: constants::DEFAULT_CACHE_SIZE,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> SheetResult<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(SheetError::Config("置信度阈值必须在 0 到 1 之间".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(SheetError::Config("请求超时不能为0".to_string()));
        }

        if self.cache_size == 0 {
            return Err(SheetError::Config("缓存大小不能为0".to_string()));
        }

        for url in [&self.direct_api_url, &self.pivot_api_url].into_iter().flatten() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SheetError::Config(format!("翻译接口地址无效: {}", url)));
            }
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        if let Some(enabled) = translation::Enabled::get_override() {
            self.enabled = enabled;
        }

        if let Some(url) = translation::DirectApiUrl::get_override() {
            tracing::info!("环境变量覆盖直译接口: {}", url);
            self.direct_api_url = Some(url);
        }

        if let Some(url) = translation::PivotApiUrl::get_override() {
            tracing::info!("环境变量覆盖中转接口: {}", url);
            self.pivot_api_url = Some(url);
        }

        if let Some(timeout) = translation::RequestTimeout::get_override() {
            self.request_timeout_secs = timeout.as_secs();
        }

        if let Some(confidence) = translation::MinConfidence::get_override() {
            self.min_confidence = confidence;
        }

        if let Some(path) = translation::DictionaryPath::get_override() {
            self.dictionary_path = Some(path);
        }

        if let Some(path) = translation::PostEditPath::get_override() {
            self.post_edit_path = Some(path);
        }

        if let Some(size) = translation::CacheSize::get_override() {
            self.cache_size = size;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 抓取配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub allowed_domain: String,
    pub container_tag: String,
    pub container_class: String,
    pub group_header_class: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub excluded_sections: Vec<String>,
    pub excluded_keys: Vec<String>,
    pub bullet_list_key: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            allowed_domain: constants::DEFAULT_ALLOWED_DOMAIN.to_string(),
            container_tag: constants::DEFAULT_CONTAINER_TAG.to_string(),
            container_class: constants::DEFAULT_CONTAINER_CLASS.to_string(),
            group_header_class: constants::DEFAULT_GROUP_HEADER_CLASS.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            excluded_sections: constants::DEFAULT_EXCLUDED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_keys: constants::DEFAULT_EXCLUDED_KEYS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bullet_list_key: constants::DEFAULT_BULLET_LIST_KEY.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn validate(&self) -> SheetResult<()> {
        if self.allowed_domain.trim().is_empty() {
            return Err(SheetError::Config("允许抓取的域名不能为空".to_string()));
        }
        if self.container_tag.trim().is_empty() {
            return Err(SheetError::Config("容器元素标签不能为空".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SheetError::Config("请求超时不能为0".to_string()));
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        use crate::env::{scrape, EnvVar};

        if let Some(domain) = scrape::AllowedDomain::get_override() {
            self.allowed_domain = domain;
        }

        if let Some(timeout) = scrape::RequestTimeout::get_override() {
            self.request_timeout_secs = timeout.as_secs();
        }

        if let Some(user_agent) = scrape::UserAgent::get_override() {
            self.user_agent = user_agent;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 导出配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_title: String,
    pub output_template: String,
    pub target_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_title: constants::DEFAULT_EXPORT_TITLE.to_string(),
            output_template: constants::DEFAULT_OUTPUT_TEMPLATE.to_string(),
            target_suffix: constants::DEFAULT_TARGET_SUFFIX.to_string(),
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetConfig {
    pub translation: TranslationConfig,
    pub scrape: ScrapeConfig,
    pub export: ExportConfig,
}

impl SheetConfig {
    pub fn validate(&self) -> SheetResult<()> {
        self.translation.validate()?;
        self.scrape.validate()?;
        if self.export.target_suffix.is_empty() {
            return Err(SheetError::Config("译文文件后缀不能为空".to_string()));
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.translation.apply_env_overrides();
        self.scrape.apply_env_overrides();
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: SheetConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> SheetResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建，不搜索默认路径
    pub fn from_path(path: &Path) -> SheetResult<Self> {
        Self::load_dotenv();
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn into_config(self) -> SheetConfig {
        self.config
    }

    fn load_config() -> SheetResult<SheetConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            let candidate = Path::new(expanded_path.as_ref());
            if candidate.exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(candidate);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(SheetConfig::default())
    }

    fn load_from_file(path: &Path) -> SheetResult<SheetConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetError::Config(format!("读取配置文件失败: {}", e)))?;

        let is_json = path
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| SheetError::Config(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| SheetError::Config(format!("解析TOML配置失败: {}", e)))
        }
    }

    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> SheetResult<()> {
        let config = SheetConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| SheetError::Config(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content).map_err(|e| SheetError::io(path, e))?;

        Ok(())
    }
}
