//! # 构建器模块
//!
//! 这个模块包含用于构建导出文件的构建器：
//!
//! - `table` - 规格表 HTML 片段（样式块、表格与快照注释）

pub mod table;

pub use table::{export_table, ExportOutput, SpecTableBuilder};
