//! 导入已导出的规格表文件
//!
//! 优先读取文件末尾的快照注释（无损）；没有快照或快照损坏时，
//! 解析 `<table class="specs">` 的结构恢复表头和各行。
//! 无法识别的行会被丢弃，不影响其余行的加载。

use markup5ever_rcdom::Handle;

use super::html::{
    collapse_whitespace, element_children, find_elements, get_node_attr, get_node_name, has_class,
    html_to_dom, serialize_children, text_content,
};
use crate::config::constants::{DEFAULT_HEADER_LEFT, DEFAULT_HEADER_RIGHT};
use crate::core::{SheetError, SheetResult};
use crate::document::{DocumentSnapshot, Row};
use crate::snapshot::decode_snapshot;

/// 从文件文本恢复文档快照
pub fn import_document(text: &str) -> SheetResult<DocumentSnapshot> {
    if let Some(snapshot) = decode_snapshot(text) {
        tracing::debug!("使用快照导入 {} 行", snapshot.rows.len());
        return Ok(snapshot);
    }

    tracing::info!("文件中没有可用的快照，按表格结构解析");
    import_legacy_table(text)
}

/// 按表格结构解析（旧版文件或手写文件）
pub fn import_legacy_table(text: &str) -> SheetResult<DocumentSnapshot> {
    let dom = html_to_dom(text);
    let tables = find_elements(&dom.document, "table");

    let table = tables
        .iter()
        .find(|table| has_class(table, "specs"))
        .or_else(|| tables.first())
        .ok_or_else(|| SheetError::Parse("文件中没有找到规格表".to_string()))?;

    let (header_left, header_right) = read_headers(table);

    let mut rows = Vec::new();
    for section in element_children(table) {
        if get_node_name(&section) != Some("tbody") {
            continue;
        }
        for (index, tr) in element_children(&section).iter().enumerate() {
            if get_node_name(tr) != Some("tr") {
                continue;
            }
            match classify_row(tr) {
                Some(row) => rows.push(row),
                None => tracing::warn!("丢弃无法识别的表格行 #{}", index),
            }
        }
    }

    tracing::debug!("从表格结构恢复 {} 行", rows.len());

    Ok(DocumentSnapshot {
        header_left,
        header_right,
        rows,
    })
}

fn read_headers(table: &Handle) -> (String, String) {
    let cells: Vec<String> = element_children(table)
        .iter()
        .filter(|child| get_node_name(child) == Some("thead"))
        .flat_map(|thead| find_elements(thead, "th"))
        .map(|th| collapse_whitespace(&text_content(&th)))
        .collect();

    let header = |index: usize, default: &str| {
        cells
            .get(index)
            .filter(|text| !text.is_empty())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    (header(0, DEFAULT_HEADER_LEFT), header(1, DEFAULT_HEADER_RIGHT))
}

fn classify_row(tr: &Handle) -> Option<Row> {
    let cells: Vec<Handle> = element_children(tr)
        .into_iter()
        .filter(|cell| matches!(get_node_name(cell), Some("th") | Some("td")))
        .collect();
    let first = cells.first()?;

    let is_section = has_class(tr, "section") || has_class(first, "section");
    let is_category = has_class(tr, "cat")
        || has_class(tr, "category")
        || has_class(first, "cat")
        || has_class(first, "category");

    if is_section || is_category {
        let title = collapse_whitespace(&text_content(first));
        if title.is_empty() {
            return None;
        }
        return Some(if is_section {
            Row::section(title)
        } else {
            Row::category(title)
        });
    }

    match cells.as_slice() {
        [key, value, ..] => {
            let key = collapse_whitespace(&text_content(key));
            let value = serialize_children(value).trim().to_string();
            if key.is_empty() && value.is_empty() {
                return None;
            }
            Some(Row::entry(key, value))
        }
        [single] if is_full_width(single) => {
            // 旧文件没有区分标题层级，无标记的整行标题一律视为分类
            let title = collapse_whitespace(&text_content(single));
            if title.is_empty() {
                return None;
            }
            tracing::debug!("无标记的整行标题按分类导入: {}", title);
            Some(Row::category(title))
        }
        _ => None,
    }
}

fn is_full_width(cell: &Handle) -> bool {
    get_node_name(cell) == Some("th")
        || get_node_attr(cell, "colspan")
            .and_then(|span| span.trim().parse::<u32>().ok())
            .is_some_and(|span| span >= 2)
}
