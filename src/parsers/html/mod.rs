//! HTML解析和处理模块
//!
//! - `utils`: 基础工具函数和常量
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能
//! - `sanitize`: 值片段清理

pub mod dom;
pub mod sanitize;
pub mod serializer;
pub mod utils;

pub use dom::{
    decode_document_bytes, element_children, find_elements, find_nodes, fragment_to_dom,
    get_node_attr, get_node_name, has_class, html_to_dom, node_text,
    set_node_attr, set_node_text, text_content, text_nodes,
};
pub use sanitize::{editor_html_to_fragment, sanitize_fragment};
pub use serializer::serialize_children;
pub use utils::{collapse_whitespace, escape_html, plain_text_to_html, WHITESPACES};
