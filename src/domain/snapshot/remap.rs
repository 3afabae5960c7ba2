//! Identifier Remap Table
//!
//! 单次恢复操作内，旧 ID（快照中的链接键）到新生成 ID 的映射。
//! 只有被交叉引用的两类记录需要登记：实体（事件参与者、关系端点引用）和纪元（事件引用）。
//! 表只存在于一次恢复的调用栈中，结束即丢弃。

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// 被交叉引用的记录类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemapCategory {
    Entity,
    Era,
}

impl RemapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemapCategory::Entity => "entity",
            RemapCategory::Era => "era",
        }
    }
}

impl fmt::Display for RemapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 旧 ID -> 新 ID 映射表，按类别隔离
#[derive(Debug, Default)]
pub struct IdRemapTable {
    entries: HashMap<RemapCategory, HashMap<String, Uuid>>,
}

impl IdRemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条映射；同类别内旧 ID 必须唯一（由快照校验保证）
    pub fn record(&mut self, category: RemapCategory, old_id: impl Into<String>, new_id: Uuid) {
        let previous = self
            .entries
            .entry(category)
            .or_default()
            .insert(old_id.into(), new_id);
        debug_assert!(previous.is_none(), "{} id recorded twice", category);
    }

    /// 查找新 ID；`None` 表示引用目标不在快照中（或尚未创建）
    pub fn resolve(&self, category: RemapCategory, old_id: &str) -> Option<Uuid> {
        self.entries
            .get(&category)
            .and_then(|ids| ids.get(old_id))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_resolve() {
        let mut table = IdRemapTable::new();
        let new_id = Uuid::new_v4();

        table.record(RemapCategory::Entity, "ent-1", new_id);
        assert_eq!(table.resolve(RemapCategory::Entity, "ent-1"), Some(new_id));
    }

    #[test]
    fn test_categories_are_isolated() {
        let mut table = IdRemapTable::new();
        let era_id = Uuid::new_v4();
        table.record(RemapCategory::Era, "shared", era_id);

        assert!(table.resolve(RemapCategory::Entity, "shared").is_none());
        assert_eq!(table.resolve(RemapCategory::Era, "shared"), Some(era_id));
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let table = IdRemapTable::new();
        assert!(table.resolve(RemapCategory::Era, "missing").is_none());
    }
}
