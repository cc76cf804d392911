/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 不允许出现在值片段中的结构性/脚本元素，连同内容一起移除
pub const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "meta", "link", "title", "head", "iframe", "object", "embed",
];

/// 表格结构元素：值片段里出现时只保留内容，防止单元格内的标记拆开导出表格的行
pub const TABLE_ELEMENTS: &[&str] = &[
    "table", "caption", "colgroup", "col", "thead", "tbody", "tfoot", "tr", "td", "th",
];

/// 编辑器遗留的内联样式属性（按前缀匹配）
pub const EDITOR_STYLE_PROPERTIES: &[&str] = &[
    "font-family",
    "font-size",
    "margin",
    "text-indent",
    "-qt-",
    "white-space",
];

/// 转义纯文本中的 HTML 特殊字符（`&`、`<`、`>`、`"`）
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 将多行纯文本转为转义后的 HTML，换行替换为 `<br />`
pub fn plain_text_to_html(text: &str) -> String {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br />")
}

/// 合并连续空白为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 检查内联样式声明是否为编辑器遗留属性
pub fn is_editor_style_property(property: &str) -> bool {
    let property = property.trim().to_ascii_lowercase();
    EDITOR_STYLE_PROPERTIES
        .iter()
        .any(|prefix| property.starts_with(prefix))
}
