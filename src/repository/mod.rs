use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::RepoError,
    models::{
        ApiKey, Board, BoardDetail, BoardRequest, BlogView, Card, ClearOutcome, Column,
        ColumnRequest, Comment, Contact, ContactFormRequest, ContactRequest, CreateCardRequest,
        CreateCommentRequest, CreateEmailAccountRequest, CreateEventRequest, CreateNoteRequest,
        CreatePostRequest, CreateResourceRequest, CreateTimelineItemRequest,
        CreateWhiteboardRequest, EmailAccount, Event, EventRange, Folder, FolderRequest,
        HealthCheckLog, InboxMessage, Note, Post, Resource, TimelineItem, UpdateCardRequest,
        UpdateNoteRequest, UpdatePostRequest, UpdateTimelineItemRequest, Whiteboard,
    },
    reorder::{ReorderItem, ReorderScope},
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepoError>;

// Repository contracts are split per dashboard feature. Lookups return `Option`
// (None = absent), deletes return `bool` (false = nothing deleted), and every
// driver failure surfaces as `RepoError::Database`.

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn list_posts(&self) -> RepoResult<Vec<Post>>;
    // Newest publication first.
    async fn list_published_posts(&self) -> RepoResult<Vec<Post>>;
    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>>;
    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>>;
    // Conflict when the slug is taken.
    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>>;
    // Removes the post's comments and view counter too.
    async fn delete_post(&self, id: Uuid) -> RepoResult<bool>;

    /// Increments the counter of a published post; None if no such post is published.
    async fn record_view(&self, slug: &str) -> RepoResult<Option<BlogView>>;
    async fn list_views(&self) -> RepoResult<Vec<BlogView>>;

    async fn add_comment(&self, post_id: Uuid, req: CreateCommentRequest) -> RepoResult<Comment>;
    async fn list_approved_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>>;
    async fn list_comments(&self) -> RepoResult<Vec<Comment>>;
    async fn set_comment_approval(&self, id: Uuid, approved: bool)
    -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait KanbanRepository: Send + Sync {
    async fn list_boards(&self) -> RepoResult<Vec<Board>>;
    async fn get_board_detail(&self, id: Uuid) -> RepoResult<Option<BoardDetail>>;
    async fn create_board(&self, req: BoardRequest) -> RepoResult<Board>;
    async fn update_board(&self, id: Uuid, req: BoardRequest) -> RepoResult<Option<Board>>;
    /// Deletes the board with all its columns and cards as one transaction.
    async fn delete_board(&self, id: Uuid) -> RepoResult<bool>;

    /// Appends a column at the end of the board. NotFound if the board is missing.
    async fn create_column(&self, board_id: Uuid, req: ColumnRequest) -> RepoResult<Column>;
    async fn update_column(
        &self,
        board_id: Uuid,
        column_id: Uuid,
        req: ColumnRequest,
    ) -> RepoResult<Option<Column>>;
    // Removes the column's cards in the same transaction.
    async fn delete_column(&self, board_id: Uuid, column_id: Uuid) -> RepoResult<bool>;

    /// Appends a card at the end of its column. NotFound if the column is not on the board.
    async fn create_card(&self, board_id: Uuid, req: CreateCardRequest) -> RepoResult<Card>;
    async fn update_card(
        &self,
        board_id: Uuid,
        card_id: Uuid,
        req: UpdateCardRequest,
    ) -> RepoResult<Option<Card>>;
    async fn delete_card(&self, board_id: Uuid, card_id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait TimelineRepository: Send + Sync {
    async fn list_timeline(&self) -> RepoResult<Vec<TimelineItem>>;
    async fn create_timeline_item(&self, req: CreateTimelineItemRequest)
    -> RepoResult<TimelineItem>;
    async fn update_timeline_item(
        &self,
        id: Uuid,
        req: UpdateTimelineItemRequest,
    ) -> RepoResult<Option<TimelineItem>>;
    async fn delete_timeline_item(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait ReorderRepository: Send + Sync {
    /// Writes every `order` (and card `columnId`) in one batch statement.
    ///
    /// Items whose id does not exist within `scope` are skipped. Returns the number of
    /// rows actually updated.
    async fn reorder(&self, scope: ReorderScope, items: &[ReorderItem]) -> RepoResult<u64>;
}

#[async_trait]
pub trait NotesRepository: Send + Sync {
    async fn list_folders(&self) -> RepoResult<Vec<Folder>>;
    async fn create_folder(&self, req: FolderRequest) -> RepoResult<Folder>;
    async fn rename_folder(&self, id: Uuid, req: FolderRequest) -> RepoResult<Option<Folder>>;
    // Notes inside the folder move to the root.
    async fn delete_folder(&self, id: Uuid) -> RepoResult<bool>;

    // Pinned first, then most recently updated.
    async fn list_notes(&self, folder_id: Option<Uuid>) -> RepoResult<Vec<Note>>;
    async fn get_note(&self, id: Uuid) -> RepoResult<Option<Note>>;
    async fn create_note(&self, req: CreateNoteRequest) -> RepoResult<Note>;
    async fn update_note(&self, id: Uuid, req: UpdateNoteRequest) -> RepoResult<Option<Note>>;
    async fn delete_note(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    async fn get_contact(&self, id: Uuid) -> RepoResult<Option<Contact>>;
    async fn create_contact(&self, req: ContactRequest) -> RepoResult<Contact>;
    async fn update_contact(&self, id: Uuid, req: ContactRequest) -> RepoResult<Option<Contact>>;
    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait InboxRepository: Send + Sync {
    async fn create_message(&self, req: ContactFormRequest) -> RepoResult<InboxMessage>;
    async fn list_messages(&self) -> RepoResult<Vec<InboxMessage>>;
    async fn set_message_read(&self, id: Uuid, read: bool) -> RepoResult<Option<InboxMessage>>;
    async fn delete_message(&self, id: Uuid) -> RepoResult<bool>;

    async fn list_email_accounts(&self) -> RepoResult<Vec<EmailAccount>>;
    async fn create_email_account(&self, req: CreateEmailAccountRequest)
    -> RepoResult<EmailAccount>;
    async fn delete_email_account(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn list_events(&self, range: EventRange) -> RepoResult<Vec<Event>>;
    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>>;
    async fn create_event(&self, req: CreateEventRequest) -> RepoResult<Event>;
    // Persists every mutable field of `event`.
    async fn update_event(&self, event: Event) -> RepoResult<Option<Event>>;
    async fn delete_event(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait WhiteboardRepository: Send + Sync {
    async fn list_whiteboards(&self) -> RepoResult<Vec<Whiteboard>>;
    async fn get_whiteboard(&self, slug: &str) -> RepoResult<Option<Whiteboard>>;
    async fn create_whiteboard(&self, req: CreateWhiteboardRequest) -> RepoResult<Whiteboard>;
    async fn save_whiteboard(
        &self,
        slug: &str,
        elements: serde_json::Value,
    ) -> RepoResult<Option<Whiteboard>>;
    async fn delete_whiteboard(&self, slug: &str) -> RepoResult<bool>;

    /// Empties the board unless it was already cleared on `day`. The check and the write
    /// are one conditional update. None if the board does not exist.
    async fn clear_whiteboard_for_day(
        &self,
        slug: &str,
        day: NaiveDate,
    ) -> RepoResult<Option<ClearOutcome>>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn list_api_keys(&self) -> RepoResult<Vec<ApiKey>>;
    async fn create_api_key(&self, name: &str, prefix: &str, key_hash: &str)
    -> RepoResult<ApiKey>;
    async fn delete_api_key(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait HealthRepository: Send + Sync {
    // Creation order; the sweep probes in this order.
    async fn list_resources(&self) -> RepoResult<Vec<Resource>>;
    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>>;
    async fn create_resource(&self, req: CreateResourceRequest) -> RepoResult<Resource>;
    // Removes the resource's logs too.
    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool>;

    async fn insert_health_log(&self, log: &HealthCheckLog) -> RepoResult<()>;
    async fn list_health_logs(&self, resource_id: Uuid, limit: i64)
    -> RepoResult<Vec<HealthCheckLog>>;
    /// Deletes logs checked before `cutoff`, returning how many were removed.
    async fn prune_health_logs(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

/// Repository
///
/// The full data-access contract handed to handlers. Any type implementing every
/// feature trait is a `Repository`.
pub trait Repository:
    BlogRepository
    + KanbanRepository
    + TimelineRepository
    + ReorderRepository
    + NotesRepository
    + ContactRepository
    + InboxRepository
    + CalendarRepository
    + WhiteboardRepository
    + ApiKeyRepository
    + HealthRepository
{
}

impl<T> Repository for T where
    T: BlogRepository
        + KanbanRepository
        + TimelineRepository
        + ReorderRepository
        + NotesRepository
        + ContactRepository
        + InboxRepository
        + CalendarRepository
        + WhiteboardRepository
        + ApiKeyRepository
        + HealthRepository
{
}

/// RepositoryState
///
/// The shared, explicitly constructed data-access handle carried in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
