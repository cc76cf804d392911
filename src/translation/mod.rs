//! 翻译模块
//!
//! 把德语标签和富文本片段翻译成法语，采用清晰的模块化架构：
//! - **protect**: 技术词元保护（占位符遮蔽与还原）
//! - **detect**: 德语检测（启发式 + 统计分类器 + 简单分类器）
//! - **dictionary**: 内置与外部覆盖词典
//! - **post_edit**: 译后编辑正则替换
//! - **engine**: 机器翻译引擎与引擎注册表
//! - **cache**: 翻译结果缓存
//! - **service**: 组合以上部分的翻译器
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use specsheet::config::TranslationConfig;
//! use specsheet::translation::{LabelTranslator, Translator};
//!
//! let translator = Translator::from_config(TranslationConfig::default());
//! let translation = translator.translate_label("Blitzgerät");
//! assert_eq!(translation.text, "Flash");
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 翻译结果缓存
pub mod cache;

/// 德语检测
pub mod detect;

/// 标签词典
pub mod dictionary;

/// 机器翻译引擎与注册表
///
/// 引擎在首次使用时初始化，失败时降级而不是中断
pub mod engine;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 译后编辑
pub mod post_edit;

/// 技术词元保护
pub mod protect;

/// 翻译服务
pub mod service;

// ============================================================================
// 公共API导出
// ============================================================================

pub use cache::{CacheStats, TranslationCache};
pub use detect::{Classification, LanguageClassifier, LanguageDetector, NgramClassifier, WhatlangClassifier};
pub use dictionary::Dictionary;
pub use engine::{DeepLxEngine, EngineRegistry, EngineRoute, MachineTranslator};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use post_edit::PostEditor;
pub use protect::{MaskedText, TokenProtector};
pub use service::Translator;

use crate::config::constants::SOURCE_LANG;

/// 单段文本的翻译结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    /// 未请求翻译（恒等翻译器或空文本）
    Passthrough,
    /// 词典命中
    Dictionary,
    /// 机器翻译成功
    MachineTranslated,
    /// 不是德语，无需翻译
    NotGerman,
    /// 是德语，但没有可用引擎
    EngineUnavailable,
    /// 引擎返回了与原文相同的文本
    Unchanged,
    /// 引擎调用失败
    Failed,
}

impl TranslationStatus {
    /// 应当翻译却没有翻译
    pub fn is_missing(self) -> bool {
        matches!(
            self,
            TranslationStatus::EngineUnavailable | TranslationStatus::Unchanged | TranslationStatus::Failed
        )
    }

    pub fn is_translated(self) -> bool {
        matches!(self, TranslationStatus::Dictionary | TranslationStatus::MachineTranslated)
    }

    /// 合并片段中各文本节点的结论：缺失优先，其次是实际发生的翻译
    pub fn combine(statuses: &[TranslationStatus]) -> TranslationStatus {
        if let Some(missing) = statuses.iter().find(|status| status.is_missing()) {
            return *missing;
        }

        [
            TranslationStatus::MachineTranslated,
            TranslationStatus::Dictionary,
            TranslationStatus::NotGerman,
        ]
        .into_iter()
        .find(|candidate| statuses.contains(candidate))
        .unwrap_or(TranslationStatus::Passthrough)
    }
}

/// 翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub status: TranslationStatus,
}

impl Translation {
    pub fn new(text: impl Into<String>, status: TranslationStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    pub fn passthrough(text: &str) -> Self {
        Self::new(text, TranslationStatus::Passthrough)
    }

    pub fn is_missing(&self) -> bool {
        self.status.is_missing()
    }

    pub fn is_translated(&self) -> bool {
        self.status.is_translated()
    }
}

/// 导出器使用的翻译接口
pub trait LabelTranslator: Send + Sync {
    /// 翻译纯文本标签（键、标题、表头）
    fn translate_label(&self, text: &str) -> Translation;

    /// 翻译富文本片段，只替换文本节点
    fn translate_fragment(&self, html: &str) -> Translation;

    /// 输出语言代码
    fn target_lang(&self) -> &str;
}

/// 恒等翻译器，用于生成源语言文件
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl LabelTranslator for IdentityTranslator {
    fn translate_label(&self, text: &str) -> Translation {
        Translation::passthrough(text)
    }

    fn translate_fragment(&self, html: &str) -> Translation {
        Translation::passthrough(html)
    }

    fn target_lang(&self) -> &str {
        SOURCE_LANG
    }
}
