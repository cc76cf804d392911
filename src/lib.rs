//! # Specsheet Library
//!
//! 两列规格表（分类/详情）的文档模型与转换管线：导出为可直接粘贴的 HTML 片段，
//! 从导出文件导入，从产品数据页抓取，以及德语到法语的标签翻译。
//!
//! ## 模块组织
//!
//! - `document` - 文档模型（行、移动、快照）
//! - `snapshot` - 导出文件中嵌入的快照注释
//! - `builders` - 规格表 HTML 导出
//! - `parsers` - HTML 解析、片段清理与文件导入
//! - `scrape` - 数据页抓取与映射
//! - `translation` - 词元保护、语言检测、词典、机器翻译与译后编辑
//! - `jobs` - 后台任务与消息通道
//! - `config` / `env` - 配置文件与环境变量
//! - `core` - 错误类型、导出文件写入与输出路径
//! - `utils` - 工具函数和实用程序

pub mod builders;
pub mod config;
pub mod core;
pub mod document;
pub mod env;
pub mod jobs;
pub mod parsers;
pub mod scrape;
pub mod snapshot;
pub mod translation;
pub mod utils;

// Re-export commonly used items for convenience
pub use core::{export_bundle, load_document_file, ExportReport, SheetError, SheetResult};
pub use document::{Document, DocumentSnapshot, MoveDirection, Row, RowId};
