use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

use super::utils::WHITESPACES;

/// 将 HTML 字符串解析为 DOM
pub fn html_to_dom(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// 将片段包装进 `<body>` 后解析为 DOM，返回 DOM 与 body 节点
///
/// 片段始终落在 body 内，便于之后只序列化 body 的子节点。
pub fn fragment_to_dom(fragment: &str) -> (RcDom, Option<Handle>) {
    let dom = html_to_dom(&format!("<html><head></head><body>{fragment}</body></html>"));
    let body = find_nodes(&dom.document, vec!["html", "body"]).into_iter().next();
    (dom, body)
}

/// 将文件字节解码为字符串
///
/// 优先根据 BOM 判断编码；无 BOM 时按 UTF-8 解码，失败则退回 windows-1252。
pub fn decode_document_bytes(data: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(data) {
        let (text, _) = encoding.decode_without_bom_handling(&data[bom_length..]);
        return text.into_owned();
    }

    let (text, had_errors) = UTF_8.decode_without_bom_handling(data);
    if !had_errors {
        return text.into_owned();
    }

    tracing::debug!("文件不是有效的 UTF-8，改用 windows-1252 解码");
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(data);
    text.into_owned()
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    if node_names.is_empty() {
        return Vec::new();
    }

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, new_node_names.clone()));
            }
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按文档顺序收集所有指定标签名的后代元素
pub fn find_elements(node: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    for child in node.children.borrow().iter() {
        if get_node_name(child) == Some(tag) {
            found.push(child.clone());
        }
        found.append(&mut find_elements(child, tag));
    }
    found
}

/// 获取所有元素类型的直接子节点
pub fn element_children(parent: &Handle) -> Vec<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 检查元素的 class 属性是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| {
            classes
                .split(WHITESPACES)
                .any(|class| class.eq_ignore_ascii_case(class_name))
        })
        .unwrap_or(false)
}

/// 获取元素属性数量
pub fn attr_count(node: &Handle) -> usize {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().len(),
        _ => 0,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 拼接节点下所有文本节点的内容（实体已由解析器还原）
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if matches!(&*name.local, "script" | "style") => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, text);
            }
        }
    }
}

/// 按文档顺序收集含可见内容的文本节点（跳过脚本和样式）
pub fn text_nodes(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_text_nodes(node, &mut found);
    found
}

fn collect_text_nodes(node: &Handle, found: &mut Vec<Handle>) {
    match &node.data {
        NodeData::Text { contents } => {
            if !contents.borrow().trim().is_empty() {
                found.push(node.clone());
            }
        }
        NodeData::Element { name, .. } if matches!(&*name.local, "script" | "style") => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text_nodes(child, found);
            }
        }
    }
}

/// 读取文本节点内容
pub fn node_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 替换文本节点内容，非文本节点不做处理
pub fn set_node_text(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        let mut tendril = contents.borrow_mut();
        tendril.clear();
        tendril.push_slice(text);
    }
}

/// 用新的子节点列表替换父节点的子节点，并修正子节点的父指针
pub fn replace_children(parent: &Handle, children: Vec<Handle>) {
    for child in children.iter() {
        child.parent.set(Some(Rc::downgrade(parent)));
    }
    *parent.children.borrow_mut() = children;
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::LocalName;

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}
