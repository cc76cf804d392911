//! # 解析器模块
//!
//! 这个模块包含所有用于解析和处理规格表 HTML 的功能：
//!
//! - HTML解析和DOM操作
//! - 值片段清理
//! - 导出文件的导入（快照优先，表格结构兜底）
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、片段清理与序列化
//! - `import` - 规格表文件导入

pub mod html;
pub mod import;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, sanitize_fragment, serialize_children};
pub use import::{import_document, import_legacy_table};
