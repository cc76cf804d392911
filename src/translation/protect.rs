//! 技术词元保护
//!
//! 机器翻译前把型号、单位数值、分辨率、编解码器和接口标准等词元替换为
//! `<<PH0>>`、`<<PH1>>` 形式的占位符，翻译后再按序号还原。

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::utils::static_regex;

/// 受保护词元的匹配规则，按优先级排列（最左优先）
const PROTECTED_PATTERNS: &[&str] = &[
    // ISO 感光度及范围：ISO 100-3200
    r"\bISO\s?\d+(?:[.,]\d+)?(?:\s?[-–]\s?\d+(?:[.,]\d+)?)?",
    // 分辨率：8.640 x 5.760、3840x2160
    r"\b\d{1,5}(?:[.,]\d{3})?\s?[x×]\s?\d{1,5}(?:[.,]\d{3})?\b",
    // 光圈与快门：f/2.8、1/8000 s
    r"\b[fF]/\d+(?:[.,]\d+)?",
    r"\b\d+/\d+\s?s\b",
    // 编解码器和文件格式
    r"\b(?:H\.26[45]|HEVC|AVC|MPEG-?[24]|MP4|MOV|JPEG|JPG|HEIF|HEIC|RAW|DNG|TIFF|ProRes(?:\s?RAW)?|XAVC(?:\s?S)?(?:-I)?|N-Log|S-Log\d?|HLG|AAC|LPCM|WAV)\b",
    // 接口与连接标准
    r"\b(?:USB(?:[-\s]?(?:Type[-\s]?C|C|[23](?:\.\d)?))?|(?:Micro-|Mini-)?HDMI|WLAN|Wi-?Fi|Bluetooth(?:\s?LE)?|NFC|GPS|LTE|Ethernet|(?:micro)?SD(?:HC|XC)?|CFexpress(?:\s?Typ(?:e)?\s?[AB])?|UHS-I{1,2}|XQD)\b",
    // 带单位的数值及范围：24,2 MP、30p、100-400 mm、5 %
    r"\b\d+(?:[.,]\d+)?(?:\s?[-–]\s?\d+(?:[.,]\d+)?)?\s?(?:(?:mm|cm|kg|g|MP|fps|Hz|kHz|MHz|GHz|mAh|Wh|GB|MB|TB|ms|EV|K|V|W|p|i|s)\b|%|°C)",
    // 型号：R5、Z8、A7R
    r"\b[A-Z]{1,4}-?\d+[A-Za-z0-9-]*\b",
    // 缩写：OLED、EVF
    r"\b[A-Z]{2,}[A-Z0-9]*\b",
];

fn protected_regex() -> &'static Regex {
    static PROTECTED_RE: OnceLock<Regex> = OnceLock::new();
    PROTECTED_RE.get_or_init(|| static_regex(&PROTECTED_PATTERNS.join("|")))
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    // 引擎可能在尖括号内插入空格
    PLACEHOLDER_RE.get_or_init(|| static_regex(r"<<\s*PH\s*(\d+)\s*>>"))
}

/// 已遮蔽的文本及其原始词元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    pub text: String,
    pub tokens: Vec<String>,
}

impl MaskedText {
    /// 去掉占位符后是否还剩下需要翻译的字母
    pub fn has_translatable_text(&self) -> bool {
        placeholder_regex()
            .replace_all(&self.text, "")
            .chars()
            .any(char::is_alphabetic)
    }
}

/// 词元保护器
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenProtector;

impl TokenProtector {
    pub fn new() -> Self {
        Self
    }

    /// 用占位符替换所有受保护词元
    pub fn mask(&self, text: &str) -> MaskedText {
        let mut tokens = Vec::new();
        let masked = protected_regex().replace_all(text, |caps: &Captures| {
            let placeholder = format!("<<PH{}>>", tokens.len());
            tokens.push(caps[0].to_string());
            placeholder
        });

        MaskedText {
            text: masked.into_owned(),
            tokens,
        }
    }

    /// 按序号还原占位符；序号越界的占位符保持原样
    pub fn unmask(&self, translated: &str, tokens: &[String]) -> String {
        placeholder_regex()
            .replace_all(translated, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| tokens.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// 文本中会被保护的词元
    pub fn protected_tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        protected_regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_range_is_one_token() {
        let masked = TokenProtector::new().mask("ISO 100-3200 Empfindlichkeit");
        assert_eq!(masked.text, "<<PH0>> Empfindlichkeit");
        assert_eq!(masked.tokens, vec!["ISO 100-3200"]);
    }

    #[test]
    fn test_usb_type_c_is_protected() {
        let masked = TokenProtector::new().mask("USB Type-C Anschluss");
        assert_eq!(masked.text, "<<PH0>> Anschluss");
        assert_eq!(masked.tokens, vec!["USB Type-C"]);
    }

    #[test]
    fn test_resolution_units_and_codecs() {
        let protector = TokenProtector::new();
        assert_eq!(
            protector.protected_tokens("8.640 x 5.760 Pixel, 4K mit 30p in H.265 und 24,2 MP"),
            vec!["8.640 x 5.760", "4K", "30p", "H.265", "24,2 MP"]
        );
    }

    #[test]
    fn test_unmask_tolerates_spacing_and_unknown_indices() {
        let protector = TokenProtector::new();
        let tokens = vec!["ISO 100".to_string(), "HDMI".to_string()];
        assert_eq!(
            protector.unmask("<< PH1 >> et <<PH0>> <<PH7>>", &tokens),
            "HDMI et ISO 100 <<PH7>>"
        );
    }

    #[test]
    fn test_has_translatable_text() {
        let protector = TokenProtector::new();
        assert!(!protector.mask("ISO 100-3200").has_translatable_text());
        assert!(!protector.mask("24 MP, 30p").has_translatable_text());
        assert!(protector.mask("HDMI Ausgang").has_translatable_text());
    }

    #[test]
    fn test_plain_german_words_are_untouched() {
        let masked = TokenProtector::new().mask("Blitzgerät mit Bildstabilisator");
        assert!(masked.tokens.is_empty());
        assert_eq!(masked.text, "Blitzgerät mit Bildstabilisator");
    }
}
