//! 译后编辑
//!
//! 翻译后按顺序执行的正则替换，用来修正引擎的固定错误。
//! 所有规则都不区分大小写；外部表中无法编译的模式按字面文本处理。

use std::path::Path;

use regex::{Regex, RegexBuilder};

use super::dictionary::load_string_map;

/// 内置规则
const BUILTIN_RULES: &[(&str, &str)] = &[
    (r"\bouverture de diaphragme\b", "ouverture"),
    (r"\bviseur électronique électronique\b", "viseur électronique"),
    (r"\bstabilisation d'image\b", "stabilisateur d'image"),
    (r"\bBluetooth Low Energy\b", "Bluetooth LE"),
    (r"\bappareil photo photo\b", "appareil photo"),
];

#[derive(Debug, Clone)]
struct PostEditRule {
    pattern: Regex,
    replacement: String,
}

/// 译后编辑规则表
#[derive(Debug, Clone, Default)]
pub struct PostEditor {
    rules: Vec<PostEditRule>,
}

impl PostEditor {
    /// 没有任何规则
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut editor = Self::empty();
        for (pattern, replacement) in BUILTIN_RULES {
            editor.push_rule(pattern, replacement);
        }
        editor
    }

    /// 内置规则加上外部规则文件；文件缺失或无效时只记录警告
    pub fn with_overrides(path: Option<&Path>) -> Self {
        let mut editor = Self::builtin();
        if let Some(path) = path {
            match load_string_map(path) {
                Ok(rules) => {
                    tracing::info!("已加载 {} 条译后编辑规则: {}", rules.len(), path.display());
                    for (pattern, replacement) in rules {
                        editor.push_rule(&pattern, &replacement);
                    }
                }
                Err(e) => tracing::warn!("译后编辑文件不可用，仅使用内置规则: {}", e),
            }
        }
        editor
    }

    /// 追加一条规则；模式无效时转义后按字面匹配
    pub fn push_rule(&mut self, pattern: &str, replacement: &str) {
        if pattern.trim().is_empty() {
            return;
        }

        let compiled = compile_case_insensitive(pattern).or_else(|e| {
            tracing::warn!("译后编辑模式无效，按字面文本匹配 {:?}: {}", pattern, e);
            compile_case_insensitive(&regex::escape(pattern))
        });

        match compiled {
            Ok(regex) => self.rules.push(PostEditRule {
                pattern: regex,
                replacement: replacement.to_string(),
            }),
            Err(e) => tracing::warn!("忽略译后编辑规则 {:?}: {}", pattern, e),
        }
    }

    /// 依次应用所有规则
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            let replaced = rule.pattern.replace_all(&result, rule.replacement.as_str());
            if let std::borrow::Cow::Owned(replaced) = replaced {
                result = replaced;
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_rules_are_case_insensitive() {
        let editor = PostEditor::builtin();
        assert_eq!(editor.apply("Ouverture de diaphragme maximale"), "ouverture maximale");
        assert_eq!(editor.apply("Flash"), "Flash");
    }

    #[test]
    fn test_invalid_pattern_is_matched_literally() {
        let mut editor = PostEditor::empty();
        editor.push_rule("(Pixel", "(pixels");
        assert_eq!(editor.len(), 1);
        assert_eq!(editor.apply("5.760 (PIXEL)"), "5.760 (pixels)");
    }

    #[test]
    fn test_external_rules_run_after_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"\\bobjectif zoom\\b": "zoom"}}"#).unwrap();

        let editor = PostEditor::with_overrides(Some(file.path()));
        assert_eq!(editor.len(), BUILTIN_RULES.len() + 1);
        assert_eq!(editor.apply("Objectif zoom standard"), "zoom standard");
    }
}
