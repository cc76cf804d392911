//! 从产品数据页提取原始条目
//!
//! 数据表容器由配置的标签和类名确定（默认 `<table class="datenblatt">`）。
//! 带分组类名的行是分组标题，其余两列行是键值条目；值单元格按 `<br>`
//! 和块级元素拆成多行文本，交给映射器合并。

use markup5ever_rcdom::{Handle, NodeData};

use super::{ScrapeError, ScrapedItem};
use crate::config::ScrapeConfig;
use crate::parsers::html::{
    collapse_whitespace, element_children, find_elements, get_node_attr, get_node_name, has_class,
    html_to_dom, text_content,
};

const BLOCK_TAGS: &[&str] = &["p", "div", "li", "ul", "ol", "tr", "table"];

/// 提取页面中所有数据表容器里的条目，保持页面顺序
pub fn extract_items(html: &str, config: &ScrapeConfig) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let dom = html_to_dom(html);
    let containers: Vec<Handle> = find_elements(&dom.document, &config.container_tag)
        .into_iter()
        .filter(|node| config.container_class.is_empty() || has_class(node, &config.container_class))
        .collect();

    if containers.is_empty() {
        return Err(ScrapeError::MissingContainer(format!(
            "{}.{}",
            config.container_tag, config.container_class
        )));
    }

    let mut items = Vec::new();
    for container in &containers {
        let mut tables = Vec::new();
        if get_node_name(container) == Some("table") {
            tables.push(container.clone());
        } else {
            outer_tables(container, &mut tables);
        }

        for tr in tables.iter().flat_map(own_rows) {
            if let Some(item) = extract_row(&tr, &config.group_header_class) {
                items.push(item);
            }
        }
    }

    Ok(items)
}

/// 容器内最外层的表格；嵌套在单元格里的表格属于值，不单独展开
fn outer_tables(node: &Handle, tables: &mut Vec<Handle>) {
    for child in element_children(node) {
        if get_node_name(&child) == Some("table") {
            tables.push(child);
        } else {
            outer_tables(&child, tables);
        }
    }
}

/// 表格自身的行（直接子行或 thead/tbody/tfoot 下的行）
fn own_rows(table: &Handle) -> Vec<Handle> {
    let mut rows = Vec::new();
    for child in element_children(table) {
        match get_node_name(&child) {
            Some("tr") => rows.push(child),
            Some("thead") | Some("tbody") | Some("tfoot") => rows.extend(
                element_children(&child)
                    .into_iter()
                    .filter(|row| get_node_name(row) == Some("tr")),
            ),
            _ => {}
        }
    }
    rows
}

fn extract_row(tr: &Handle, group_header_class: &str) -> Option<ScrapedItem> {
    let cells: Vec<Handle> = element_children(tr)
        .into_iter()
        .filter(|cell| matches!(get_node_name(cell), Some("th") | Some("td")))
        .collect();

    let is_group = !group_header_class.is_empty()
        && (has_class(tr, group_header_class)
            || cells.iter().any(|cell| has_class(cell, group_header_class)));

    if is_group || is_heading_cell(&cells) {
        let title = collapse_whitespace(&text_content(tr));
        return (!title.is_empty()).then(|| ScrapedItem::section(title));
    }

    match cells.as_slice() {
        [key, value, ..] => Some(ScrapedItem::entry(
            collapse_whitespace(&text_content(key)),
            cell_lines(value),
        )),
        _ => None,
    }
}

fn is_heading_cell(cells: &[Handle]) -> bool {
    match cells {
        [single] => {
            get_node_name(single) == Some("th")
                || get_node_attr(single, "colspan")
                    .and_then(|span| span.trim().parse::<u32>().ok())
                    .is_some_and(|span| span >= 2)
        }
        _ => false,
    }
}

/// 单元格的可见文本，`<br>` 和块级元素边界处换行
fn cell_lines(cell: &Handle) -> String {
    let mut text = String::new();
    push_lines(cell, &mut text);
    text
}

fn push_lines(node: &Handle, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let tag = &*name.local;
            if matches!(tag, "script" | "style") {
                return;
            }
            if tag == "br" {
                text.push('\n');
                return;
            }

            let block = BLOCK_TAGS.contains(&tag);
            if block {
                text.push('\n');
            }
            for child in node.children.borrow().iter() {
                push_lines(child, text);
            }
            if block {
                text.push('\n');
            }
        }
        _ => {
            for child in node.children.borrow().iter() {
                push_lines(child, text);
            }
        }
    }
}
