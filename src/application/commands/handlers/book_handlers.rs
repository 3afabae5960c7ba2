//! Book Command Handlers

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{CreateBook, DeleteBook, ImportManuscript};
use crate::application::error::ApplicationError;
use crate::application::ports::{BookRecord, BookStorePort, ChapterRecord, VolumeRecord};
use crate::domain::book::{BookTitle, DEFAULT_BOOK_STATUS, DEFAULT_CHAPTER_STATUS};
use crate::domain::split_chapters;

/// 新书的默认卷名
pub const DEFAULT_VOLUME_TITLE: &str = "第一卷";

/// 导入稿件时唯一一卷的卷名
pub const IMPORTED_VOLUME_TITLE: &str = "正文卷";

fn new_book(id: Uuid, title: String, summary: Option<String>) -> BookRecord {
    let now = Utc::now();
    BookRecord {
        id,
        title,
        summary,
        status: DEFAULT_BOOK_STATUS.to_string(),
        cover_url: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// CreateBook
// ============================================================================

/// 创建书籍响应
#[derive(Debug, Clone, Serialize)]
pub struct BookCreated {
    pub id: Uuid,
    pub title: String,
    pub default_volume_id: Uuid,
}

/// CreateBook Handler - 书籍和默认卷在同一事务中创建
pub struct CreateBookHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateBookHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: CreateBook) -> Result<BookCreated, ApplicationError> {
        let title = BookTitle::new(command.title)?;
        let book = new_book(Uuid::new_v4(), title.into_inner(), command.summary);
        let volume = VolumeRecord {
            id: Uuid::new_v4(),
            book_id: book.id,
            title: DEFAULT_VOLUME_TITLE.to_string(),
            order_index: 1,
        };

        let mut uow = self.store.begin().await?;
        uow.insert_book(&book).await?;
        uow.insert_volume(&volume).await?;
        uow.commit().await?;

        tracing::info!(book_id = %book.id, title = %book.title, "Book created");

        Ok(BookCreated {
            id: book.id,
            title: book.title,
            default_volume_id: volume.id,
        })
    }
}

// ============================================================================
// DeleteBook
// ============================================================================

/// DeleteBook Handler
pub struct DeleteBookHandler {
    store: Arc<dyn BookStorePort>,
}

impl DeleteBookHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: DeleteBook) -> Result<(), ApplicationError> {
        let mut uow = self.store.begin().await?;
        if !uow.delete_book(command.book_id).await? {
            return Err(ApplicationError::not_found("Book", command.book_id));
        }
        uow.commit().await?;

        tracing::info!(book_id = %command.book_id, "Book deleted");
        Ok(())
    }
}

// ============================================================================
// ImportManuscript
// ============================================================================

/// 导入稿件响应
#[derive(Debug, Clone, Serialize)]
pub struct ManuscriptImported {
    pub book_id: Uuid,
    pub title: String,
    pub volume_id: Uuid,
    pub chapters: usize,
    pub word_count: i64,
}

/// ImportManuscript Handler - 纯文本切分为章节，整本书一次提交
pub struct ImportManuscriptHandler {
    store: Arc<dyn BookStorePort>,
}

impl ImportManuscriptHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: ImportManuscript,
    ) -> Result<ManuscriptImported, ApplicationError> {
        let title = BookTitle::new(command.title)?;

        let chapters = split_chapters(&command.text);
        if chapters.is_empty() {
            return Err(ApplicationError::validation("稿件内容为空"));
        }

        let summary = command.source_name.map(|name| format!("导入自 {}", name));
        let book = new_book(Uuid::new_v4(), title.into_inner(), summary);
        let volume = VolumeRecord {
            id: Uuid::new_v4(),
            book_id: book.id,
            title: IMPORTED_VOLUME_TITLE.to_string(),
            order_index: 1,
        };

        let mut uow = self.store.begin().await?;
        uow.insert_book(&book).await?;
        uow.insert_volume(&volume).await?;

        let mut word_count = 0_i64;
        for (index, chapter) in chapters.iter().enumerate() {
            let record = ChapterRecord {
                id: Uuid::new_v4(),
                volume_id: volume.id,
                title: chapter.title.clone(),
                content: chapter.content.clone(),
                word_count: chapter.word_count,
                status: DEFAULT_CHAPTER_STATUS.to_string(),
                order_index: index as i64 + 1,
            };
            uow.insert_chapter(&record).await?;
            word_count = word_count.saturating_add(chapter.word_count);
        }

        uow.commit().await?;

        tracing::info!(
            book_id = %book.id,
            title = %book.title,
            chapters = chapters.len(),
            word_count = word_count,
            "Manuscript imported"
        );

        Ok(ManuscriptImported {
            book_id: book.id,
            title: book.title,
            volume_id: volume.id,
            chapters: chapters.len(),
            word_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::queries::handlers::GetBookHandler;
    use crate::application::queries::GetBook;
    use crate::application::test_support::{memory_store, seed_book};

    #[tokio::test]
    async fn test_create_book_with_default_volume() {
        let store = memory_store().await;
        let handler = CreateBookHandler::new(store.clone());

        let created = handler
            .handle(CreateBook {
                title: "  长夜  ".to_string(),
                summary: None,
            })
            .await
            .unwrap();
        assert_eq!(created.title, "长夜");

        let detail = GetBookHandler::new(store)
            .handle(GetBook {
                book_id: created.id,
            })
            .await
            .unwrap();
        assert_eq!(detail.status, "ongoing");
        assert_eq!(detail.volumes.len(), 1);
        assert_eq!(detail.volumes[0].title, DEFAULT_VOLUME_TITLE);
        assert_eq!(detail.volumes[0].id, created.default_volume_id);
    }

    #[tokio::test]
    async fn test_create_book_rejects_blank_title() {
        let store = memory_store().await;
        let result = CreateBookHandler::new(store)
            .handle(CreateBook {
                title: "   ".to_string(),
                summary: None,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_book() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let handler = DeleteBookHandler::new(store.clone());
        handler.handle(DeleteBook { book_id }).await.unwrap();

        let result = GetBookHandler::new(store.clone())
            .handle(GetBook { book_id })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));

        let again = handler.handle(DeleteBook { book_id }).await;
        assert!(matches!(again, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_import_manuscript() {
        let store = memory_store().await;
        let text = "楔子的第一段。\n\n第一章 风起\n城门关了。\n\n第二章 夜行\n他走进雨里。\n";

        let imported = ImportManuscriptHandler::new(store.clone())
            .handle(ImportManuscript {
                title: "雨城".to_string(),
                text: text.to_string(),
                source_name: Some("雨城.txt".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(imported.chapters, 3);

        let detail = GetBookHandler::new(store)
            .handle(GetBook {
                book_id: imported.book_id,
            })
            .await
            .unwrap();
        assert_eq!(detail.summary.as_deref(), Some("导入自 雨城.txt"));
        let titles: Vec<_> = detail.volumes[0]
            .chapters
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["序章 / 前言", "第一章 风起", "第二章 夜行"]);
        assert_eq!(detail.word_count, imported.word_count);
    }

    #[tokio::test]
    async fn test_import_empty_manuscript() {
        let store = memory_store().await;
        let result = ImportManuscriptHandler::new(store)
            .handle(ImportManuscript {
                title: "空".to_string(),
                text: "\n  \n".to_string(),
                source_name: None,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }
}
