//! Book Query Handlers

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{BookRecord, BookStorePort, ChapterRecord, VolumeRecord};
use crate::application::queries::{GetBook, ListBooks, RenderManuscript};
use crate::domain::{render_manuscript_html, ManuscriptVolume};

// ============================================================================
// Response DTOs
// ============================================================================

/// 书籍列表项
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub status: String,
    pub cover_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BookRecord> for BookSummary {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            summary: record.summary,
            status: record.status,
            cover_url: record.cover_url,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 章节目录项（不含正文）
#[derive(Debug, Clone, Serialize)]
pub struct ChapterOutline {
    pub id: Uuid,
    pub title: String,
    pub word_count: i64,
    pub status: String,
    pub order_index: i64,
}

impl From<ChapterRecord> for ChapterOutline {
    fn from(record: ChapterRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            word_count: record.word_count,
            status: record.status,
            order_index: record.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeOutline {
    pub id: Uuid,
    pub title: String,
    pub order_index: i64,
    pub chapters: Vec<ChapterOutline>,
}

/// 书籍详情（含卷章目录）
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub status: String,
    pub cover_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub word_count: i64,
    pub volumes: Vec<VolumeOutline>,
}

/// 渲染后的整书稿件
#[derive(Debug, Clone)]
pub struct RenderedManuscript {
    pub title: String,
    pub html: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetBook Handler
pub struct GetBookHandler {
    store: Arc<dyn BookStorePort>,
}

impl GetBookHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetBook) -> Result<BookDetail, ApplicationError> {
        let mut uow = self.store.begin().await?;
        let book = uow
            .find_book(query.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", query.book_id))?;

        let mut volumes = Vec::new();
        let mut word_count = 0_i64;
        for volume in uow.find_volumes(book.id).await? {
            let chapters: Vec<ChapterOutline> = uow
                .find_chapters(volume.id)
                .await?
                .into_iter()
                .map(ChapterOutline::from)
                .collect();
            word_count = chapters
                .iter()
                .fold(word_count, |acc, c| acc.saturating_add(c.word_count));
            volumes.push(VolumeOutline {
                id: volume.id,
                title: volume.title,
                order_index: volume.order_index,
                chapters,
            });
        }
        uow.rollback().await?;

        let summary = BookSummary::from(book);
        Ok(BookDetail {
            id: summary.id,
            title: summary.title,
            summary: summary.summary,
            status: summary.status,
            cover_url: summary.cover_url,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            word_count,
            volumes,
        })
    }
}

/// ListBooks Handler
pub struct ListBooksHandler {
    store: Arc<dyn BookStorePort>,
}

impl ListBooksHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, _query: ListBooks) -> Result<Vec<BookSummary>, ApplicationError> {
        let mut uow = self.store.begin().await?;
        let books = uow.list_books().await?;
        uow.rollback().await?;

        Ok(books.into_iter().map(BookSummary::from).collect())
    }
}

/// RenderManuscript Handler - 按卷章顺序输出整书 HTML
pub struct RenderManuscriptHandler {
    store: Arc<dyn BookStorePort>,
}

impl RenderManuscriptHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: RenderManuscript,
    ) -> Result<RenderedManuscript, ApplicationError> {
        let mut uow = self.store.begin().await?;
        let book = uow
            .find_book(query.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", query.book_id))?;

        let mut volumes = Vec::new();
        for VolumeRecord { id, title, .. } in uow.find_volumes(book.id).await? {
            let chapters = uow
                .find_chapters(id)
                .await?
                .into_iter()
                .map(|c| (c.title, c.content))
                .collect();
            volumes.push(ManuscriptVolume { title, chapters });
        }
        uow.rollback().await?;

        tracing::debug!(book_id = %book.id, volumes = volumes.len(), "Manuscript rendered");

        Ok(RenderedManuscript {
            html: render_manuscript_html(&book.title, &volumes),
            title: book.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{memory_store, seed_book};

    #[tokio::test]
    async fn test_get_book_outline_is_ordered() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let detail = GetBookHandler::new(store)
            .handle(GetBook { book_id })
            .await
            .unwrap();
        let orders: Vec<i64> = detail.volumes.iter().map(|v| v.order_index).collect();
        assert_eq!(orders, vec![1, 2]);
        assert!(detail.volumes[0]
            .chapters
            .windows(2)
            .all(|w| w[0].order_index < w[1].order_index));
        assert!(detail.word_count > 0);
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let store = memory_store().await;
        let result = GetBookHandler::new(store)
            .handle(GetBook {
                book_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::NotFound {
                resource_type: "Book",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_list_books() {
        let store = memory_store().await;
        assert!(ListBooksHandler::new(store.clone())
            .handle(ListBooks)
            .await
            .unwrap()
            .is_empty());

        let book_id = seed_book(&store).await;
        let books = ListBooksHandler::new(store).handle(ListBooks).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, book_id);
    }

    #[tokio::test]
    async fn test_render_manuscript() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let rendered = RenderManuscriptHandler::new(store)
            .handle(RenderManuscript { book_id })
            .await
            .unwrap();
        assert!(rendered.html.contains("<h1>第一卷</h1>"));
        assert!(rendered.html.contains("<h2>第一章 初雪</h2>"));
        // 空章节使用占位
        assert!(rendered.html.contains("（暂无内容）"));
        let first = rendered.html.find("第一卷").unwrap();
        let second = rendered.html.find("第二卷").unwrap();
        assert!(first < second);
    }
}
