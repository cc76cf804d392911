//! 翻译服务
//!
//! 组合词典、语言检测、词元保护、机器翻译和译后编辑：
//!
//! - 标签：词典命中直接返回（不做语言检测）；否则检测德语后遮蔽、翻译、还原
//! - 富文本片段：解析文本节点，整体判断一次语言（文本过短时逐节点判断），
//!   然后逐个翻译文本节点，标记结构保持不变
//!
//! 引擎不可用或文本不是德语时返回原文，并通过状态告诉调用方是否算作“缺失翻译”。

use std::path::Path;
use std::sync::Arc;

use super::cache::TranslationCache;
use super::dictionary::Dictionary;
use super::engine::EngineRegistry;
use super::error::{ErrorSeverity, TranslationError};
use super::post_edit::PostEditor;
use super::protect::TokenProtector;
use super::{LabelTranslator, Translation, TranslationStatus};
use crate::config::TranslationConfig;
use crate::parsers::html::{fragment_to_dom, node_text, serialize_children, set_node_text, text_nodes};

/// 德语到法语的翻译器
pub struct Translator {
    registry: Arc<EngineRegistry>,
    dictionary: Dictionary,
    post_edits: PostEditor,
    protector: TokenProtector,
    cache: TranslationCache,
    min_block_chars: usize,
}

impl Translator {
    /// 根据配置创建翻译器，外部词典和译后编辑文件在此加载
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        let config = registry.config().clone();
        let dictionary = Dictionary::with_overrides(config.dictionary_path.as_deref().map(Path::new));
        let post_edits = PostEditor::with_overrides(config.post_edit_path.as_deref().map(Path::new));
        Self::with_parts(registry, dictionary, post_edits)
    }

    pub fn from_config(config: TranslationConfig) -> Self {
        Self::new(Arc::new(EngineRegistry::new(config)))
    }

    pub fn with_parts(registry: Arc<EngineRegistry>, dictionary: Dictionary, post_edits: PostEditor) -> Self {
        let config = registry.config();
        let cache = TranslationCache::new(config.cache_size);
        let min_block_chars = config.min_block_chars;

        Self {
            registry,
            dictionary,
            post_edits,
            protector: TokenProtector::new(),
            cache,
            min_block_chars,
        }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// 提前初始化引擎和检测器，返回是否有可用的机器翻译
    pub fn warm_up(&self) -> bool {
        let available = self.registry.try_init().is_available();
        let _ = self.registry.detector();
        available
    }

    /// 对单段纯文本执行翻译决策；`german` 为 `None` 时自行检测
    fn translate_text(&self, text: &str, german: Option<bool>) -> Translation {
        if let Some(hit) = self.dictionary.lookup(text) {
            tracing::debug!("词典命中: {} -> {}", text, hit);
            return Translation::new(self.post_edits.apply(hit), TranslationStatus::Dictionary);
        }

        let masked = self.protector.mask(text);
        if !masked.has_translatable_text() {
            return Translation::new(self.post_edits.apply(text), TranslationStatus::NotGerman);
        }

        let is_german = german.unwrap_or_else(|| self.registry.detector().is_german(text));
        if !is_german {
            return Translation::new(self.post_edits.apply(text), TranslationStatus::NotGerman);
        }

        if !self.registry.route().is_available() {
            return Translation::new(
                self.post_edits.apply(text),
                TranslationStatus::EngineUnavailable,
            );
        }

        let config = self.registry.config();
        let key = TranslationCache::generate_key(text, &config.source_lang, &config.target_lang);
        if let Some(cached) = self.cache.get(&key) {
            return Translation::new(cached, TranslationStatus::MachineTranslated);
        }

        match self.registry.translate(&masked.text) {
            Ok(raw) => {
                let restored = self.protector.unmask(&raw, &masked.tokens);
                if restored.trim() == text.trim() {
                    tracing::debug!("机器翻译没有改变文本: {}", text);
                    return Translation::new(self.post_edits.apply(text), TranslationStatus::Unchanged);
                }
                let edited = self.post_edits.apply(restored.trim());
                self.cache.set(key, edited.clone());
                Translation::new(edited, TranslationStatus::MachineTranslated)
            }
            Err(TranslationError::EngineUnavailable(_)) => Translation::new(
                self.post_edits.apply(text),
                TranslationStatus::EngineUnavailable,
            ),
            Err(e) => {
                match e.severity() {
                    ErrorSeverity::Error | ErrorSeverity::Critical => {
                        tracing::warn!("翻译失败 ({:?})，保留原文 {:?}: {}", e.category(), text, e)
                    }
                    ErrorSeverity::Info | ErrorSeverity::Warning => {
                        tracing::info!("翻译失败 ({:?})，保留原文 {:?}: {}", e.category(), text, e)
                    }
                }
                Translation::new(self.post_edits.apply(text), TranslationStatus::Failed)
            }
        }
    }
}

/// 拆出首尾空白，便于翻译后原样放回
fn split_padding(text: &str) -> (&str, &str, &str) {
    let core = text.trim();
    if core.is_empty() {
        return (text, "", "");
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    (&text[..start], core, &text[end..])
}

impl LabelTranslator for Translator {
    fn translate_label(&self, text: &str) -> Translation {
        let label = text.trim();
        if label.is_empty() {
            return Translation::passthrough(text);
        }
        self.translate_text(label, None)
    }

    fn translate_fragment(&self, html: &str) -> Translation {
        if html.trim().is_empty() {
            return Translation::passthrough(html);
        }

        let (_dom, body) = fragment_to_dom(html);
        let Some(body) = body else {
            tracing::warn!("无法解析片段，按纯文本翻译");
            return self.translate_label(html);
        };

        let nodes = text_nodes(&body);
        if nodes.is_empty() {
            return Translation::passthrough(html);
        }

        let block_text = nodes
            .iter()
            .filter_map(node_text)
            .map(|text| text.trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let block_german = if block_text.chars().count() >= self.min_block_chars {
            let german = self.registry.detector().is_german(&block_text);
            tracing::trace!("片段整体判定德语: {}", german);
            Some(german)
        } else {
            None
        };

        let mut statuses = Vec::with_capacity(nodes.len());
        let mut changed = false;

        for node in &nodes {
            let Some(original) = node_text(node) else {
                continue;
            };
            let (leading, core, trailing) = split_padding(&original);
            if core.is_empty() {
                continue;
            }

            let translation = self.translate_text(core, block_german);
            if translation.text != core {
                set_node_text(node, &format!("{leading}{}{trailing}", translation.text));
                changed = true;
            }
            statuses.push(translation.status);
        }

        let status = TranslationStatus::combine(&statuses);
        if changed {
            Translation::new(serialize_children(&body).trim().to_string(), status)
        } else {
            Translation::new(html.to_string(), status)
        }
    }

    fn target_lang(&self) -> &str {
        &self.registry.config().target_lang
    }
}
