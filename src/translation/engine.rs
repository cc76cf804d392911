//! 翻译引擎与引擎注册表
//!
//! `EngineRegistry` 在进程启动时创建一次，按引用传给翻译器。
//! 机器翻译路由和统计分类器都是首次使用时才初始化并缓存；
//! 初始化失败不会中断流程，只会让相关功能走降级路径。

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::detect::{LanguageClassifier, LanguageDetector, WhatlangClassifier};
use super::error::{TranslationError, TranslationResult};
use crate::config::TranslationConfig;

/// 机器翻译引擎接口
pub trait MachineTranslator: Send + Sync {
    fn name(&self) -> &str;

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResult<String>;
}

#[derive(Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Deserialize)]
struct DeepLxResponse {
    code: u16,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// DeepLX 兼容接口
pub struct DeepLxEngine {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl DeepLxEngine {
    pub fn new(api_url: &str, timeout: Duration) -> TranslationResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

impl MachineTranslator for DeepLxEngine {
    fn name(&self) -> &str {
        &self.api_url
    }

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResult<String> {
        let request = DeepLxRequest {
            text,
            source_lang: source_lang.to_uppercase(),
            target_lang: target_lang.to_uppercase(),
        };

        let response = self.client.post(&self.api_url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::TranslationServiceError(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json()?;
        let parsed: DeepLxResponse = serde_json::from_value(body)?;
        if parsed.code != 200 {
            return Err(TranslationError::TranslationServiceError(format!(
                "code {}: {}",
                parsed.code,
                parsed.message.unwrap_or_default()
            )));
        }

        parsed
            .data
            .ok_or_else(|| TranslationError::TranslationServiceError("响应中没有 data 字段".to_string()))
    }
}

/// 可用的翻译路由
#[derive(Clone)]
pub enum EngineRoute {
    /// 德语直接译为法语
    Direct(Arc<dyn MachineTranslator>),
    /// 德语经英语中转译为法语
    Pivot {
        first: Arc<dyn MachineTranslator>,
        second: Arc<dyn MachineTranslator>,
    },
    /// 没有可用引擎，附带原因
    Unavailable(String),
}

impl EngineRoute {
    pub fn is_available(&self) -> bool {
        !matches!(self, EngineRoute::Unavailable(_))
    }

    pub fn describe(&self) -> String {
        match self {
            EngineRoute::Direct(engine) => format!("direct ({})", engine.name()),
            EngineRoute::Pivot { first, second } => {
                format!("pivot ({} -> {})", first.name(), second.name())
            }
            EngineRoute::Unavailable(reason) => format!("unavailable: {}", reason),
        }
    }
}

impl std::fmt::Debug for EngineRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// 引擎注册表
pub struct EngineRegistry {
    config: TranslationConfig,
    route: OnceLock<EngineRoute>,
    detector: OnceLock<LanguageDetector>,
}

impl EngineRegistry {
    pub fn new(config: TranslationConfig) -> Self {
        Self {
            config,
            route: OnceLock::new(),
            detector: OnceLock::new(),
        }
    }

    /// 使用预先构造的路由（测试或嵌入场景）
    pub fn with_route(config: TranslationConfig, route: EngineRoute) -> Self {
        let registry = Self::new(config);
        let _ = registry.route.set(route);
        registry
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 初始化翻译路由（只执行一次），返回最终路由
    pub fn try_init(&self) -> &EngineRoute {
        self.route.get_or_init(|| {
            let route = build_route(&self.config);
            match &route {
                EngineRoute::Unavailable(reason) => {
                    tracing::warn!("机器翻译不可用，将只使用词典: {}", reason)
                }
                route => tracing::info!("机器翻译路由: {}", route.describe()),
            }
            route
        })
    }

    /// 是否已有可用的翻译路由（不会触发初始化）
    pub fn is_ready(&self) -> bool {
        self.route
            .get()
            .map(EngineRoute::is_available)
            .unwrap_or(false)
    }

    pub fn is_initialized(&self) -> bool {
        self.route.get().is_some()
    }

    pub fn route(&self) -> &EngineRoute {
        self.try_init()
    }

    /// 德语检测器（首次使用时加载统计分类器）
    pub fn detector(&self) -> &LanguageDetector {
        self.detector.get_or_init(|| {
            let statistical: Option<Box<dyn LanguageClassifier>> =
                if self.config.use_statistical_detector {
                    Some(Box::new(WhatlangClassifier::new()))
                } else {
                    tracing::debug!("统计语言分类器已禁用");
                    None
                };
            LanguageDetector::new(statistical, self.config.min_confidence)
        })
    }

    /// 按当前路由翻译文本；引擎不可用时返回 `EngineUnavailable`
    pub fn translate(&self, text: &str) -> TranslationResult<String> {
        let source = self.config.source_lang.as_str();
        let target = self.config.target_lang.as_str();

        match self.route() {
            EngineRoute::Direct(engine) => call_engine(engine.as_ref(), text, source, target),
            EngineRoute::Pivot { first, second } => {
                let pivot = self.config.pivot_lang.as_str();
                let intermediate = call_engine(first.as_ref(), text, source, pivot)?;
                call_engine(second.as_ref(), &intermediate, pivot, target)
            }
            EngineRoute::Unavailable(reason) => {
                Err(TranslationError::EngineUnavailable(reason.clone()))
            }
        }
    }
}

/// 调用一次引擎；可重试的错误（网络、超时、服务端）再重试一次
fn call_engine(
    engine: &dyn MachineTranslator,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> TranslationResult<String> {
    match engine.translate(text, source_lang, target_lang) {
        Err(e) if e.is_retryable() => {
            tracing::debug!("引擎 {} 调用失败，重试一次: {}", engine.name(), e);
            engine.translate(text, source_lang, target_lang)
        }
        result => result,
    }
}

fn build_route(config: &TranslationConfig) -> EngineRoute {
    if !config.enabled {
        return EngineRoute::Unavailable("翻译已禁用".to_string());
    }

    let timeout = config.request_timeout();

    if let Some(url) = &config.direct_api_url {
        match DeepLxEngine::new(url, timeout) {
            Ok(engine) => return EngineRoute::Direct(Arc::new(engine)),
            Err(e) => tracing::warn!("直译引擎初始化失败，尝试中转: {}", e),
        }
    }

    if let Some(url) = &config.pivot_api_url {
        match DeepLxEngine::new(url, timeout) {
            Ok(engine) => {
                let engine: Arc<dyn MachineTranslator> = Arc::new(engine);
                return EngineRoute::Pivot {
                    first: engine.clone(),
                    second: engine,
                };
            }
            Err(e) => return EngineRoute::Unavailable(e.to_string()),
        }
    }

    EngineRoute::Unavailable("未配置翻译接口".to_string())
}
