//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Book Context: 书籍、卷、章节的值对象
//! - Timeline Context: 纪元与绝对时间刻度
//! - Snapshot Context: 全书快照格式、校验与 ID 重映射

pub mod book;
pub mod snapshot;
pub mod timeline;

// 纯文本稿件的章节切分与 HTML 渲染
mod manuscript;

pub use manuscript::{
    is_chapter_heading, render_manuscript_html, split_chapters, ManuscriptChapter,
    ManuscriptVolume, PROLOGUE_TITLE,
};
