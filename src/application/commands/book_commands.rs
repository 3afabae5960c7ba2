//! Book Commands

use uuid::Uuid;

use crate::domain::snapshot::BookSnapshot;

/// 创建书籍命令（附带一个默认卷）
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub summary: Option<String>,
}

/// 删除书籍命令（级联删除所有从属记录）
#[derive(Debug, Clone)]
pub struct DeleteBook {
    pub book_id: Uuid,
}

/// 导入纯文本稿件命令：生成单卷多章节的新书
#[derive(Debug, Clone)]
pub struct ImportManuscript {
    pub title: String,
    pub text: String,
    /// 来源文件名，写入简介
    pub source_name: Option<String>,
}

/// 从快照恢复为一本全新的书
#[derive(Debug, Clone)]
pub struct RestoreBook {
    pub snapshot: BookSnapshot,
    /// 调用方指定的新书 ID；为空时自动生成
    pub target_id: Option<Uuid>,
}
