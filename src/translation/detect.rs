//! 语言检测
//!
//! 判断一段文本是否为德语：
//!
//! 1. 正则启发式（变音字母、德语虚词、典型后缀）命中即判定为德语
//! 2. 否则使用统计分类器（whatlang），置信度达到阈值时采用其结论
//! 3. 统计分类器不可用或置信度不足时，退回到基于字母组合的简单分类器

use std::sync::OnceLock;

use regex::Regex;
use whatlang::{Detector, Lang};

use crate::utils::static_regex;

fn german_heuristic_regex() -> &'static Regex {
    static GERMAN_RE: OnceLock<Regex> = OnceLock::new();
    GERMAN_RE.get_or_init(|| {
        static_regex(
            r"(?i)[äöüß]|\b(?:der|die|das|und|oder|mit|ohne|für|nicht|bei|von|vom|zum|zur|ein|eine|einen|einem|einer|kein|keine|auf|ist|sind|wird|werden|den|dem|des|im|bis|über|unter|nach|irgend\w*)\b|\w{3,}(?:ung|ungen|heit|keit|lich|isch|schaft)\b",
        )
    })
}

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_german: bool,
    pub confidence: f64,
}

/// 语言分类器接口
pub trait LanguageClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// 无法给出结论时返回 `None`
    fn classify(&self, text: &str) -> Option<Classification>;
}

/// 基于 whatlang 的统计分类器
pub struct WhatlangClassifier {
    detector: Detector,
}

impl WhatlangClassifier {
    pub fn new() -> Self {
        Self {
            detector: Detector::with_allowlist(vec![
                Lang::Deu,
                Lang::Eng,
                Lang::Fra,
                Lang::Ita,
                Lang::Spa,
                Lang::Nld,
            ]),
        }
    }
}

impl Default for WhatlangClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageClassifier for WhatlangClassifier {
    fn name(&self) -> &'static str {
        "whatlang"
    }

    fn classify(&self, text: &str) -> Option<Classification> {
        let info = self.detector.detect(text)?;
        Some(Classification {
            is_german: info.lang() == Lang::Deu,
            confidence: info.confidence(),
        })
    }
}

const GERMAN_NGRAMS: &[&str] = &[
    "sch", "ein", "ich", "che", "cht", "der", "den", "die", "gen", "ung", "ber", "ers", "ter",
    "hen", "ier", "aus", "auf", "eit", "nde", "ste", "tz", "ss",
];

const OTHER_NGRAMS: &[&str] = &[
    "the", "ing", "and", "ion", "tio", "ent", "les", "que", "eur", "ais", "ous", "qu", "ght",
    "ity", "ble", "ée", "é",
];

/// 基于常见字母组合的简单分类器，没有外部模型时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct NgramClassifier;

impl LanguageClassifier for NgramClassifier {
    fn name(&self) -> &'static str {
        "ngram"
    }

    fn classify(&self, text: &str) -> Option<Classification> {
        let mut german = 0usize;
        let mut other = 0usize;

        for word in text
            .split(|c: char| !c.is_alphabetic())
            .filter(|word| !word.is_empty())
        {
            let word = word.to_lowercase();
            german += GERMAN_NGRAMS
                .iter()
                .filter(|gram| word.contains(*gram))
                .count();
            other += OTHER_NGRAMS
                .iter()
                .filter(|gram| word.contains(*gram))
                .count();
        }

        let total = german + other;
        if total == 0 {
            return None;
        }

        Some(Classification {
            is_german: german > other,
            confidence: german.max(other) as f64 / total as f64,
        })
    }
}

/// 德语检测器
pub struct LanguageDetector {
    statistical: Option<Box<dyn LanguageClassifier>>,
    fallback: Box<dyn LanguageClassifier>,
    min_confidence: f64,
}

impl LanguageDetector {
    pub fn new(statistical: Option<Box<dyn LanguageClassifier>>, min_confidence: f64) -> Self {
        Self {
            statistical,
            fallback: Box::new(NgramClassifier),
            min_confidence,
        }
    }

    /// 只使用启发式和字母组合分类器
    pub fn heuristic_only(min_confidence: f64) -> Self {
        Self::new(None, min_confidence)
    }

    pub fn has_statistical_classifier(&self) -> bool {
        self.statistical.is_some()
    }

    /// 正则启发式是否命中
    pub fn looks_german(text: &str) -> bool {
        german_heuristic_regex().is_match(text)
    }

    pub fn is_german(&self, text: &str) -> bool {
        let text = text.trim();
        if !text.chars().any(char::is_alphabetic) {
            return false;
        }

        if Self::looks_german(text) {
            tracing::trace!("启发式判定为德语: {}", text);
            return true;
        }

        if let Some(classifier) = &self.statistical {
            if let Some(result) = classifier.classify(text) {
                if result.confidence >= self.min_confidence {
                    tracing::trace!(
                        "{} 判定 {:?} (置信度 {:.2})",
                        classifier.name(),
                        result.is_german,
                        result.confidence
                    );
                    return result.is_german;
                }
            }
        }

        match self.fallback.classify(text) {
            Some(result) => result.is_german && result.confidence >= self.min_confidence,
            None => false,
        }
    }
}
