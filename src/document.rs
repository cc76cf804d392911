//! 规格表文档模型
//!
//! 文档由两个表头字符串和一个有序的行序列组成，是整个会话唯一的数据来源。
//! 行的插入顺序即显示顺序，也是导出顺序。

use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_HEADER_LEFT, DEFAULT_HEADER_RIGHT};
use crate::core::{SheetError, SheetResult};

/// 规格表中的一行
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Row {
    /// 键值行：键为纯文本，值为安全的 HTML 片段（粗体/斜体/颜色/列表/换行）
    Entry { key: String, value: String },
    /// 跨两列的子标题行
    Category { title: String },
    /// 跨两列的顶级标题行
    Section { title: String },
}

impl Row {
    pub fn entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        Row::Entry {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn category(title: impl Into<String>) -> Self {
        Row::Category {
            title: title.into(),
        }
    }

    pub fn section(title: impl Into<String>) -> Self {
        Row::Section {
            title: title.into(),
        }
    }

    /// 键和值都为空的键值行，导出时会被跳过
    pub fn is_blank_entry(&self) -> bool {
        match self {
            Row::Entry { key, value } => key.trim().is_empty() && value.trim().is_empty(),
            Row::Category { .. } | Row::Section { .. } => false,
        }
    }
}

/// 行的稳定标识，界面层用它引用某一行
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

/// 行移动方向
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// 文档在某一时刻的不可变快照，导出器只读取快照
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub header_left: String,
    pub header_right: String,
    pub rows: Vec<Row>,
}

impl Default for DocumentSnapshot {
    fn default() -> Self {
        Self {
            header_left: DEFAULT_HEADER_LEFT.to_string(),
            header_right: DEFAULT_HEADER_RIGHT.to_string(),
            rows: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    id: RowId,
    row: Row,
}

/// 可编辑的规格表文档
#[derive(Clone, Debug)]
pub struct Document {
    header_left: String,
    header_right: String,
    rows: Vec<Slot>,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 创建使用默认表头的空文档
    pub fn new() -> Self {
        Self {
            header_left: DEFAULT_HEADER_LEFT.to_string(),
            header_right: DEFAULT_HEADER_RIGHT.to_string(),
            rows: Vec::new(),
            next_id: 0,
        }
    }

    /// 从快照重建文档（导入、抓取后的批量插入）
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Self {
        let mut document = Self::new();
        document.header_left = snapshot.header_left;
        document.header_right = snapshot.header_right;
        document.replace_all(snapshot.rows);
        document
    }

    pub fn header_left(&self) -> &str {
        &self.header_left
    }

    pub fn header_right(&self) -> &str {
        &self.header_right
    }

    /// 编辑表头
    pub fn set_headers(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.header_left = left.into();
        self.header_right = right.into();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按显示顺序遍历行
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|slot| (slot.id, &slot.row))
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|slot| slot.id).collect()
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.position(id).map(|index| &self.rows[index].row)
    }

    /// 在末尾追加一行，不做校验
    pub fn append(&mut self, row: Row) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Slot { id, row });
        id
    }

    /// 通过“确认输入”动作追加键值行，键不能为空
    pub fn append_entry(&mut self, key: &str, value: &str) -> SheetResult<RowId> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SheetError::Validation("entry key must not be empty".to_string()));
        }
        Ok(self.append(Row::entry(key, value.trim())))
    }

    /// 追加子标题行，标题不能为空
    pub fn append_category(&mut self, title: &str) -> SheetResult<RowId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SheetError::Validation("category title must not be empty".to_string()));
        }
        Ok(self.append(Row::category(title)))
    }

    /// 追加顶级标题行，标题不能为空
    pub fn append_section(&mut self, title: &str) -> SheetResult<RowId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SheetError::Validation("section title must not be empty".to_string()));
        }
        Ok(self.append(Row::section(title)))
    }

    /// 原地替换某一行的内容，行不存在时返回 false
    pub fn update(&mut self, id: RowId, row: Row) -> bool {
        match self.position(id) {
            Some(index) => {
                self.rows[index].row = row;
                true
            }
            None => false,
        }
    }

    /// 删除一行，其余行保持相对顺序
    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        self.position(id).map(|index| self.rows.remove(index).row)
    }

    /// 与相邻行交换位置
    ///
    /// 第一行上移、最后一行下移都不是错误，只是什么也不做；返回是否发生了移动。
    pub fn move_row(&mut self, id: RowId, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.rows.len() => index + 1,
            _ => return false,
        };

        self.rows.swap(index, target);
        true
    }

    /// 用新的行序列替换全部内容
    pub fn replace_all(&mut self, rows: Vec<Row>) {
        self.rows.clear();
        for row in rows {
            self.append(row);
        }
    }

    /// 清空所有行，表头保持不变
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// 获取当前内容的不可变快照
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            header_left: self.header_left.clone(),
            header_right: self.header_right.clone(),
            rows: self.rows.iter().map(|slot| slot.row.clone()).collect(),
        }
    }

    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|slot| slot.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, Vec<RowId>) {
        let mut document = Document::new();
        let ids = vec![
            document.append(Row::section("Sensor")),
            document.append(Row::entry("Typ", "CMOS")),
            document.append(Row::category("Video")),
            document.append(Row::entry("Auflösung", "4K")),
        ];
        (document, ids)
    }

    fn titles(document: &Document) -> Vec<Row> {
        document.snapshot().rows
    }

    #[test]
    fn test_new_document_uses_default_headers() {
        let document = Document::new();
        assert_eq!(document.header_left(), "Kategorie");
        assert_eq!(document.header_right(), "Details");
        assert!(document.is_empty());
    }

    #[test]
    fn test_move_first_up_is_noop() {
        let (mut document, ids) = sample();
        let before = titles(&document);
        assert!(!document.move_row(ids[0], MoveDirection::Up));
        assert_eq!(titles(&document), before);
        assert_eq!(document.len(), 4);
    }

    #[test]
    fn test_move_last_down_is_noop() {
        let (mut document, ids) = sample();
        let before = titles(&document);
        assert!(!document.move_row(ids[3], MoveDirection::Down));
        assert_eq!(titles(&document), before);
    }

    #[test]
    fn test_move_swaps_neighbours_only() {
        let (mut document, ids) = sample();
        assert!(document.move_row(ids[1], MoveDirection::Down));
        assert_eq!(document.ids(), vec![ids[0], ids[2], ids[1], ids[3]]);
        assert!(document.move_row(ids[1], MoveDirection::Up));
        assert_eq!(document.ids(), ids);
    }

    #[test]
    fn test_remove_preserves_order() {
        let (mut document, ids) = sample();
        assert_eq!(document.remove(ids[1]), Some(Row::entry("Typ", "CMOS")));
        assert_eq!(document.ids(), vec![ids[0], ids[2], ids[3]]);
        assert_eq!(document.remove(ids[1]), None);
    }

    #[test]
    fn test_append_entry_rejects_empty_key() {
        let mut document = Document::new();
        let result = document.append_entry("   ", "<b>x</b>");
        assert!(matches!(result, Err(SheetError::Validation(_))));
        assert!(document.is_empty());
    }

    #[test]
    fn test_append_entry_trims_key() {
        let mut document = Document::new();
        let id = document.append_entry("  Gewicht ", "650 g").unwrap();
        assert_eq!(document.get(id), Some(&Row::entry("Gewicht", "650 g")));
    }

    #[test]
    fn test_replace_all_and_snapshot() {
        let (mut document, _) = sample();
        document.replace_all(vec![Row::entry("A", "1")]);
        let snapshot = document.snapshot();
        assert_eq!(snapshot.rows, vec![Row::entry("A", "1")]);

        let rebuilt = Document::from_snapshot(snapshot.clone());
        assert_eq!(rebuilt.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_edits() {
        let (mut document, ids) = sample();
        let snapshot = document.snapshot();
        document.remove(ids[0]);
        document.set_headers("Merkmal", "Wert");
        assert_eq!(snapshot.rows.len(), 4);
        assert_eq!(snapshot.header_left, "Kategorie");
    }

    #[test]
    fn test_blank_entry_detection() {
        assert!(Row::entry("", "").is_blank_entry());
        assert!(Row::entry(" ", "\n").is_blank_entry());
        assert!(!Row::entry("", "x").is_blank_entry());
        assert!(!Row::category("").is_blank_entry());
    }
}
