//! 值片段清理模块
//!
//! 富文本编辑器导出的片段通常带有整页结构、字体覆盖和空的 `<span>` 包装。
//! 导出前只保留 body 内部的安全片段：
//!
//! - 删除注释（如 `<!--StartFragment-->`）和脚本/结构性元素
//! - 删除 `font-family`、`font-size`、`margin-*`、`-qt-*` 等内联样式
//! - 清空后的 `style` 属性被移除，没有属性的 `<span>` 被展开
//! - 表格结构标签（`<tr>`、`<td>` 等，包括不成对的结束标签）被展开，只留内容
//!
//! 清理是幂等的：对已清理的片段再次清理不会改变结果。

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{
    attr_count, find_nodes, fragment_to_dom, get_node_attr, get_node_name, html_to_dom,
    replace_children, set_node_attr,
};
use super::serializer::serialize_children;
use super::utils::{is_editor_style_property, plain_text_to_html, DROPPED_ELEMENTS, TABLE_ELEMENTS};

const CLEANUP_MARKERS: &[&str] = &[
    "style=", "<span", "<!--", "<body", "<html", "<head", "<script", "<style", "<meta",
    "<link", "<title", "<iframe", "<object", "<embed", "<t", "</t", "<caption", "</caption",
    "<col", "</col",
];

/// 判断片段是否包含需要清理的内容
pub fn needs_cleanup(fragment: &str) -> bool {
    let lowered = fragment.to_ascii_lowercase();
    CLEANUP_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// 清理值片段，返回安全的 inner HTML
pub fn sanitize_fragment(fragment: &str) -> String {
    let trimmed = fragment.trim();
    if !needs_cleanup(trimmed) {
        return trimmed.to_string();
    }

    if trimmed.to_ascii_lowercase().contains("<body") {
        return editor_html_to_fragment(trimmed, trimmed);
    }

    match fragment_to_dom(trimmed) {
        (_dom, Some(body)) => {
            clean_children(&body);
            serialize_children(&body).trim().to_string()
        }
        (_dom, None) => {
            tracing::warn!("无法解析值片段，按纯文本处理");
            plain_text_to_html(trimmed)
        }
    }
}

/// 从编辑器导出的整页 HTML 中提取值片段
///
/// 找不到 `<body>` 时退回到纯文本：转义后把换行替换为 `<br />`。
pub fn editor_html_to_fragment(editor_html: &str, plain_text: &str) -> String {
    if !editor_html.to_ascii_lowercase().contains("<body") {
        return plain_text_to_html(plain_text);
    }

    let dom = html_to_dom(editor_html);
    match find_nodes(&dom.document, vec!["html", "body"]).into_iter().next() {
        Some(body) => {
            clean_children(&body);
            serialize_children(&body).trim().to_string()
        }
        None => plain_text_to_html(plain_text),
    }
}

fn clean_children(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    let mut kept = Vec::with_capacity(children.len());

    for child in children {
        if matches!(
            child.data,
            NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. }
        ) {
            continue;
        }

        let name = get_node_name(&child).map(str::to_string);
        if let Some(name) = name {
            if DROPPED_ELEMENTS.contains(&name.as_str()) {
                continue;
            }

            clean_style_attr(&child);
            clean_children(&child);

            let is_table_part = TABLE_ELEMENTS.contains(&name.as_str());
            if is_table_part || (name == "span" && attr_count(&child) == 0) {
                let grandchildren: Vec<Handle> = child.children.borrow().iter().cloned().collect();
                kept.extend(grandchildren);
                continue;
            }
        }

        kept.push(child);
    }

    replace_children(node, kept);
}

fn clean_style_attr(node: &Handle) {
    let Some(style) = get_node_attr(node, "style") else {
        return;
    };

    let declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            let property = declaration.split(':').next().unwrap_or_default();
            !is_editor_style_property(property)
        })
        .collect();

    if declarations.is_empty() {
        set_node_attr(node, "style", None);
    } else {
        set_node_attr(node, "style", Some(format!("{};", declarations.join("; "))));
    }
}
