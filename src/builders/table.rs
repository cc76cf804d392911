//! 规格表导出
//!
//! 把文档快照序列化为可直接粘贴的 HTML 片段：固定样式块、`<table class="specs">`
//! 和结尾的快照注释。可选的翻译器作用于表头、标题、键和值；
//! 不传翻译器时使用恒等翻译器，源语言文件与译文文件的行顺序和跳过规则完全一致。

use crate::config::constants::{DEFAULT_HEADER_LEFT, DEFAULT_HEADER_RIGHT, SPEC_TABLE_CSS};
use crate::document::{DocumentSnapshot, Row};
use crate::parsers::html::{
    collapse_whitespace, escape_html, fragment_to_dom, sanitize_fragment, text_content,
};
use crate::snapshot::encode_snapshot;
use crate::translation::{LabelTranslator, Translation};

/// 一次导出的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub html: String,
    /// 写入 `<tbody>` 的行数
    pub rows_written: usize,
    /// 应当翻译却没有翻译的原文，按首次出现顺序去重
    pub missing: Vec<String>,
}

/// 规格表构建器
pub struct SpecTableBuilder<'a> {
    translator: &'a dyn LabelTranslator,
    lines: Vec<String>,
    emitted: Vec<Row>,
    missing: Vec<String>,
}

impl<'a> SpecTableBuilder<'a> {
    pub fn new(translator: &'a dyn LabelTranslator) -> Self {
        Self {
            translator,
            lines: Vec::new(),
            emitted: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn build(mut self, snapshot: &DocumentSnapshot) -> ExportOutput {
        let header_left = self.label(header_or_default(&snapshot.header_left, DEFAULT_HEADER_LEFT));
        let header_right = self.label(header_or_default(&snapshot.header_right, DEFAULT_HEADER_RIGHT));

        self.lines.push(SPEC_TABLE_CSS.to_string());
        self.lines.push(r#"<table border="1" class="specs">"#.to_string());
        self.lines.push("\t<thead>".to_string());
        self.lines.push("\t\t<tr>".to_string());
        self.lines.push(format!("\t\t\t<th>{}</th>", escape_html(&header_left)));
        self.lines.push(format!("\t\t\t<th>{}</th>", escape_html(&header_right)));
        self.lines.push("\t\t</tr>".to_string());
        self.lines.push("\t</thead>".to_string());
        self.lines.push("\t<tbody>".to_string());

        for row in &snapshot.rows {
            self.push_row(row);
        }

        self.lines.push("\t</tbody>".to_string());
        self.lines.push("</table>".to_string());
        self.lines
            .push(encode_snapshot(&header_left, &header_right, &self.emitted));

        tracing::debug!(
            "导出 {} 行 (目标语言 {}，{} 条未翻译)",
            self.emitted.len(),
            self.translator.target_lang(),
            self.missing.len()
        );

        ExportOutput {
            html: self.lines.join("\n"),
            rows_written: self.emitted.len(),
            missing: self.missing,
        }
    }

    fn push_row(&mut self, row: &Row) {
        match row {
            Row::Section { title } => {
                let title = self.label(title.trim());
                self.lines.push(r#"		<tr class="section">"#.to_string());
                self.lines.push(format!(
                    r#"			<th class="section" colspan="2">{}</th>"#,
                    escape_html(&title)
                ));
                self.lines.push("\t\t</tr>".to_string());
                self.emitted.push(Row::Section { title });
            }
            Row::Category { title } => {
                let title = self.label(title.trim());
                self.lines.push(r#"		<tr class="cat">"#.to_string());
                self.lines.push(format!(
                    r#"			<th class="category" colspan="2">{}</th>"#,
                    escape_html(&title)
                ));
                self.lines.push("\t\t</tr>".to_string());
                self.emitted.push(Row::Category { title });
            }
            Row::Entry { key, value } => {
                let key = key.trim();
                let value = sanitize_fragment(value);
                if key.is_empty() && value.is_empty() {
                    tracing::trace!("跳过空行");
                    return;
                }

                let key = self.label(key);
                let value = self.fragment(&value);
                self.lines.push("\t\t<tr>".to_string());
                self.lines.push(format!("\t\t\t<th>{}</th>", escape_html(&key)));
                // 值本身就是标记，不再转义
                self.lines.push(format!("\t\t\t<td>{}</td>", value));
                self.lines.push("\t\t</tr>".to_string());
                self.emitted.push(Row::Entry { key, value });
            }
        }
    }

    fn label(&mut self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let translation = self.translator.translate_label(text);
        self.record(&translation, || text.to_string());
        translation.text
    }

    fn fragment(&mut self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }
        let translation = self.translator.translate_fragment(html);
        self.record(&translation, || fragment_plain_text(html));
        translation.text
    }

    fn record(&mut self, translation: &Translation, original: impl FnOnce() -> String) {
        if !translation.is_missing() {
            return;
        }
        let original = original();
        if !original.is_empty() && !self.missing.contains(&original) {
            self.missing.push(original);
        }
    }
}

fn header_or_default<'h>(header: &'h str, default: &'h str) -> &'h str {
    let header = header.trim();
    if header.is_empty() {
        default
    } else {
        header
    }
}

fn fragment_plain_text(html: &str) -> String {
    let (_dom, body) = fragment_to_dom(html);
    match body {
        Some(body) => collapse_whitespace(&text_content(&body)),
        None => collapse_whitespace(html),
    }
}

/// 导出整张表
pub fn export_table(snapshot: &DocumentSnapshot, translator: &dyn LabelTranslator) -> ExportOutput {
    SpecTableBuilder::new(translator).build(snapshot)
}
