//! 抓取结果映射
//!
//! 把提取出的原始条目清理成文档行：
//!
//! - `ß` 替换为 `ss`，`ẞ` 替换为 `SS`
//! - 黑名单中的分组（直到下一个分组标题）和键被整体丢弃，匹配不区分大小写
//! - 被网站拆散的多行文本按规则合并，之后再按分号拆成独立的行
//! - 特定的键渲染为项目符号列表，其余键的行用 `<br />` 连接

use std::sync::OnceLock;

use regex::Regex;

use super::{CancelToken, ScrapeOutcome, ScrapeProgress, ScrapedItem};
use crate::config::ScrapeConfig;
use crate::document::Row;
use crate::parsers::html::{collapse_whitespace, escape_html};
use crate::utils::static_regex;

fn resolution_head_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| static_regex(r"\d\s*[xX×]$"))
}

fn lone_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| static_regex(r"^\d+(?:[.,]\d+)?$"))
}

fn frame_rate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| static_regex(r"^\d+(?:[.,]\d+)?\s?[pPiI]$"))
}

fn codec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        static_regex(
            r"(?i)^(?:h\.?26[456]|hevc|avc(?:hd)?|mpeg-?[124]|m-?jpeg|motion[\s-]jpeg|prores(?:\s+\w+)*|xavc(?:\s+\w+)*|long\s*gop|all-?i|ipb|lpcm|aac)$",
        )
    })
}

/// 替换下游编码处理不好的 `ß`
pub fn normalize_text(text: &str) -> String {
    text.replace('ß', "ss").replace('ẞ', "SS")
}

enum Join {
    /// 直接拼接
    Tight,
    /// 以空格拼接
    Spaced,
    /// 作为括号注释追加
    Parenthesized,
}

fn join_kind(previous: &str, current: &str) -> Option<Join> {
    if previous.ends_with('(') || current.starts_with(')') {
        return Some(Join::Tight);
    }
    if current.starts_with('(') || previous.ends_with(',') {
        return Some(Join::Spaced);
    }

    let starts_with_digit = current.chars().next().is_some_and(|c| c.is_ascii_digit());
    if starts_with_digit && resolution_head_regex().is_match(previous) {
        return Some(Join::Spaced);
    }
    if previous.ends_with(')') && lone_number_regex().is_match(current) {
        return Some(Join::Spaced);
    }
    if frame_rate_regex().is_match(current)
        && previous.chars().last().is_some_and(|c| c.is_ascii_digit())
    {
        return Some(Join::Spaced);
    }
    if codec_regex().is_match(current) {
        return Some(Join::Parenthesized);
    }
    None
}

/// 合并被拆开的行，再按分号拆分
///
/// `["8.640 x", "5.760", "(", "Pixel", ")"]` 合并为 `["8.640 x 5.760 (Pixel)"]`。
pub fn merge_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();

    for line in lines {
        let current = collapse_whitespace(line.as_ref());
        if current.is_empty() {
            continue;
        }

        let join = merged.last().and_then(|previous| join_kind(previous, &current));
        match (merged.last_mut(), join) {
            (Some(previous), Some(Join::Tight)) => previous.push_str(&current),
            (Some(previous), Some(Join::Spaced)) => {
                previous.push(' ');
                previous.push_str(&current);
            }
            (Some(previous), Some(Join::Parenthesized)) => {
                previous.push_str(&format!(" ({current})"));
            }
            _ => merged.push(current),
        }
    }

    merged
        .iter()
        .flat_map(|line| line.split(';'))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 渲染值片段：列表键用 `<ul><li>`，其余转义后以 `<br />` 连接
pub fn render_value(key: &str, lines: &[String], bullet_list_key: &str) -> String {
    if lines.is_empty() {
        return String::new();
    }

    if !bullet_list_key.is_empty() && fold(key) == fold(bullet_list_key) {
        let items: String = lines
            .iter()
            .map(|line| format!("<li>{}</li>", escape_html(line)))
            .collect();
        return format!("<ul>{items}</ul>");
    }

    lines
        .iter()
        .map(|line| escape_html(line))
        .collect::<Vec<_>>()
        .join("<br />")
}

fn clean_label(text: &str) -> String {
    let text = collapse_whitespace(&normalize_text(text));
    text.trim_end_matches(':').trim_end().to_string()
}

fn fold(text: &str) -> String {
    clean_label(text).to_lowercase()
}

/// 抓取条目到文档行的映射器
#[derive(Debug, Clone)]
pub struct ScrapeMapper {
    excluded_sections: Vec<String>,
    excluded_keys: Vec<String>,
    bullet_list_key: String,
}

impl ScrapeMapper {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            excluded_sections: config.excluded_sections.iter().map(|s| fold(s)).collect(),
            excluded_keys: config.excluded_keys.iter().map(|s| fold(s)).collect(),
            bullet_list_key: config.bullet_list_key.clone(),
        }
    }

    fn is_excluded_section(&self, title: &str) -> bool {
        self.excluded_sections.contains(&fold(title))
    }

    fn is_excluded_key(&self, key: &str) -> bool {
        self.excluded_keys.contains(&fold(key))
    }

    /// 按顺序映射全部条目；每个条目之前检查取消标记
    pub fn map_items(
        &self,
        items: &[ScrapedItem],
        cancel: &CancelToken,
        progress: &mut dyn ScrapeProgress,
    ) -> ScrapeOutcome {
        let total = items.len();
        progress.begin(total);

        let mut rows = Vec::new();
        let mut skipping = false;

        for (index, item) in items.iter().enumerate() {
            if cancel.is_canceled() {
                tracing::info!("抓取在 {}/{} 处取消，丢弃已解析的 {} 行", index, total, rows.len());
                return ScrapeOutcome::Canceled;
            }

            if let Some(row) = self.map_item(item, &mut skipping) {
                rows.push(row);
            }
            progress.item_done(index + 1, total);
        }

        if rows.is_empty() {
            ScrapeOutcome::Empty
        } else {
            ScrapeOutcome::Rows(rows)
        }
    }

    fn map_item(&self, item: &ScrapedItem, skipping: &mut bool) -> Option<Row> {
        match item {
            ScrapedItem::Section { title } => {
                let title = clean_label(title);
                *skipping = self.is_excluded_section(&title);
                if *skipping {
                    tracing::debug!("跳过分组: {}", title);
                    return None;
                }
                (!title.is_empty()).then(|| Row::section(title))
            }
            ScrapedItem::Entry { key, raw } => {
                if *skipping {
                    return None;
                }
                let key = clean_label(key);
                if self.is_excluded_key(&key) {
                    tracing::debug!("跳过键: {}", key);
                    return None;
                }

                let lines: Vec<String> = raw.lines().map(normalize_text).collect();
                let value = render_value(&key, &merge_lines(&lines), &self.bullet_list_key);
                if key.is_empty() && value.is_empty() {
                    return None;
                }
                Some(Row::entry(key, value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::NullProgress;

    #[test]
    fn test_merge_resolution_split_across_lines() {
        assert_eq!(
            merge_lines(&["8.640 x", "5.760", "(", "Pixel", ")"]),
            vec!["8.640 x 5.760 (Pixel)"]
        );
    }

    #[test]
    fn test_merge_rules() {
        assert_eq!(merge_lines(&["24 MP", "(effektiv)"]), vec!["24 MP (effektiv)"]);
        assert_eq!(merge_lines(&["Serienbild (mechanisch)", "10"]), vec!["Serienbild (mechanisch) 10"]);
        assert_eq!(merge_lines(&["MP4", "H.264"]), vec!["MP4 (H.264)"]);
        assert_eq!(merge_lines(&["3.840 x 2.160", "30p"]), vec!["3.840 x 2.160 30p"]);
        assert_eq!(merge_lines(&["WLAN,", "Bluetooth"]), vec!["WLAN, Bluetooth"]);
        assert_eq!(merge_lines(&["JPEG", "RAW"]), vec!["JPEG", "RAW"]);
    }

    #[test]
    fn test_semicolons_split_after_merging() {
        assert_eq!(merge_lines(&["USB; HDMI", "", "  "]), vec!["USB", "HDMI"]);
    }

    #[test]
    fn test_normalize_sharp_s() {
        assert_eq!(normalize_text("Größe ẞ"), "Grösse SS");
    }

    #[test]
    fn test_render_value() {
        let lines = vec!["A & B".to_string(), "<C>".to_string()];
        assert_eq!(render_value("Sensor", &lines, "Besonderheiten"), "A &amp; B<br />&lt;C&gt;");
        assert_eq!(
            render_value("besonderheiten:", &lines, "Besonderheiten"),
            "<ul><li>A &amp; B</li><li>&lt;C&gt;</li></ul>"
        );
        assert_eq!(render_value("Sensor", &[], "Besonderheiten"), "");
    }

    #[test]
    fn test_excluded_sections_drop_until_next_header() {
        let mapper = ScrapeMapper::from_config(&ScrapeConfig::default());
        let items = vec![
            ScrapedItem::section("Sensor"),
            ScrapedItem::entry("Typ", "CMOS"),
            ScrapedItem::section("TESTBERICHTE"),
            ScrapedItem::entry("Fazit", "gut"),
            ScrapedItem::section("Gehäuse"),
            ScrapedItem::entry("Maße", "10 x 8 cm"),
            ScrapedItem::entry("UVP:", "999 EUR"),
        ];
        let outcome = mapper.map_items(&items, &CancelToken::new(), &mut NullProgress);
        assert_eq!(
            outcome,
            ScrapeOutcome::Rows(vec![
                Row::section("Sensor"),
                Row::entry("Typ", "CMOS"),
                Row::section("Gehäuse"),
                Row::entry("Masse", "10 x 8 cm"),
            ])
        );
    }

    #[test]
    fn test_everything_filtered_is_empty() {
        let mapper = ScrapeMapper::from_config(&ScrapeConfig::default());
        let items = vec![ScrapedItem::entry("Preis", "1 EUR")];
        assert_eq!(
            mapper.map_items(&items, &CancelToken::new(), &mut NullProgress),
            ScrapeOutcome::Empty
        );
    }

    struct CancelAfter {
        token: CancelToken,
        after: usize,
    }

    impl ScrapeProgress for CancelAfter {
        fn item_done(&mut self, done: usize, _total: usize) {
            if done == self.after {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn test_cancel_discards_partial_rows() {
        let mapper = ScrapeMapper::from_config(&ScrapeConfig::default());
        let items: Vec<ScrapedItem> = (0..10)
            .map(|i| ScrapedItem::entry(format!("Key {i}"), "1"))
            .collect();
        let token = CancelToken::new();
        let mut progress = CancelAfter {
            token: token.clone(),
            after: 3,
        };
        assert_eq!(mapper.map_items(&items, &token, &mut progress), ScrapeOutcome::Canceled);
    }
}
