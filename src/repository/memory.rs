use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ApiKeyRepository, BlogRepository, CalendarRepository, ContactRepository, HealthRepository,
    InboxRepository, KanbanRepository, NotesRepository, RepoResult, ReorderRepository,
    TimelineRepository, WhiteboardRepository,
};
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

#[derive(Default)]
struct Store {
    posts: Vec<Post>,
    views: HashMap<Uuid, i64>,
    comments: Vec<Comment>,
    boards: Vec<Board>,
    columns: Vec<Column>,
    cards: Vec<Card>,
    timeline: Vec<TimelineItem>,
    folders: Vec<Folder>,
    notes: Vec<Note>,
    contacts: Vec<Contact>,
    messages: Vec<InboxMessage>,
    // (account, password)
    accounts: Vec<(EmailAccount, String)>,
    events: Vec<Event>,
    whiteboards: Vec<Whiteboard>,
    // (key, sha256 hex)
    api_keys: Vec<(ApiKey, String)>,
    resources: Vec<Resource>,
    health_logs: Vec<HealthCheckLog>,
}

/// MemoryRepository
///
/// An in-process implementation of every repository trait with the same observable
/// semantics as `PostgresRepository`. Used by the test suite; `set_failing(true)` makes
/// every call fail the way an unreachable database would.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
    failing: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// The stored password of an email account, for asserting it never leaks elsewhere.
    pub async fn email_account_password(&self, id: Uuid) -> Option<String> {
        let store = self.store.read().await;
        store
            .accounts
            .iter()
            .find(|(account, _)| account.id == id)
            .map(|(_, password)| password.clone())
    }

    /// The stored hash of an API key.
    pub async fn api_key_hash(&self, id: Uuid) -> Option<String> {
        let store = self.store.read().await;
        store
            .api_keys
            .iter()
            .find(|(key, _)| key.id == id)
            .map(|(_, hash)| hash.clone())
    }
}

// Saturates: a reorder may legitimately store i32::MAX.
fn next_order(orders: impl Iterator<Item = i32>) -> i32 {
    orders.max().map_or(0, |max| max.saturating_add(1))
}

fn remove_by<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() < before
}

#[async_trait]
impl BlogRepository for MemoryRepository {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        self.check()?;
        let mut posts = self.store.read().await.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_published_posts(&self) -> RepoResult<Vec<Post>> {
        self.check()?;
        let mut posts: Vec<Post> = self
            .store
            .read()
            .await
            .posts
            .iter()
            .filter(|p| p.published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|p| p.slug == slug && p.published)
            .cloned())
    }

    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post> {
        self.check()?;
        let mut store = self.store.write().await;
        if store.posts.iter().any(|p| p.slug == req.slug) {
            return Err(RepoError::Conflict(
                "a post with this slug already exists".into(),
            ));
        }
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            slug: req.slug,
            title: req.title,
            summary: req.summary,
            content: req.content,
            tags: req.tags,
            cover_image: req.cover_image,
            published: req.published,
            published_at: req.published.then_some(now),
            created_at: now,
            updated_at: now,
        };
        store.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        self.check()?;
        let mut store = self.store.write().await;
        if let Some(slug) = &req.slug
            && store.posts.iter().any(|p| &p.slug == slug && p.id != id)
        {
            return Err(RepoError::Conflict(
                "a post with this slug already exists".into(),
            ));
        }
        let Some(post) = store.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let now = Utc::now();
        if let Some(slug) = req.slug {
            post.slug = slug;
        }
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(summary) = req.summary {
            post.summary = summary;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(tags) = req.tags {
            post.tags = tags;
        }
        if req.cover_image.is_some() {
            post.cover_image = req.cover_image;
        }
        if let Some(published) = req.published {
            post.published = published;
        }
        if post.published && post.published_at.is_none() {
            post.published_at = Some(now);
        }
        post.updated_at = now;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        store.comments.retain(|c| c.post_id != id);
        store.views.remove(&id);
        Ok(remove_by(&mut store.posts, |p| p.id == id))
    }

    async fn record_view(&self, slug: &str) -> RepoResult<Option<BlogView>> {
        self.check()?;
        let mut store = self.store.write().await;
        let Some(post_id) = store
            .posts
            .iter()
            .find(|p| p.slug == slug && p.published)
            .map(|p| p.id)
        else {
            return Ok(None);
        };
        let views = store.views.entry(post_id).or_insert(0);
        *views += 1;
        Ok(Some(BlogView {
            post_id,
            slug: slug.to_string(),
            views: *views,
        }))
    }

    async fn list_views(&self) -> RepoResult<Vec<BlogView>> {
        self.check()?;
        let store = self.store.read().await;
        let mut views: Vec<BlogView> = store
            .posts
            .iter()
            .filter_map(|p| {
                store.views.get(&p.id).map(|views| BlogView {
                    post_id: p.id,
                    slug: p.slug.clone(),
                    views: *views,
                })
            })
            .collect();
        views.sort_by(|a, b| b.views.cmp(&a.views).then(a.slug.cmp(&b.slug)));
        Ok(views)
    }

    async fn add_comment(&self, post_id: Uuid, req: CreateCommentRequest) -> RepoResult<Comment> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store.posts.iter().any(|p| p.id == post_id) {
            return Err(RepoError::NotFound("post"));
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_name: req.author_name.trim().to_string(),
            body: req.body.trim().to_string(),
            approved: false,
            created_at: Utc::now(),
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_approved_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.approved)
            .cloned()
            .collect())
    }

    async fn list_comments(&self) -> RepoResult<Vec<Comment>> {
        self.check()?;
        let mut comments = self.store.read().await.comments.clone();
        comments.reverse();
        Ok(comments)
    }

    async fn set_comment_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> RepoResult<Option<Comment>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.approved = approved;
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.comments, |c| c.id == id))
    }
}

#[async_trait]
impl KanbanRepository for MemoryRepository {
    async fn list_boards(&self) -> RepoResult<Vec<Board>> {
        self.check()?;
        Ok(self.store.read().await.boards.clone())
    }

    async fn get_board_detail(&self, id: Uuid) -> RepoResult<Option<BoardDetail>> {
        self.check()?;
        let store = self.store.read().await;
        let Some(board) = store.boards.iter().find(|b| b.id == id).cloned() else {
            return Ok(None);
        };
        let mut columns: Vec<Column> = store
            .columns
            .iter()
            .filter(|c| c.board_id == id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| (c.order, c.created_at));
        let mut cards: Vec<Card> = store
            .cards
            .iter()
            .filter(|c| c.board_id == id)
            .cloned()
            .collect();
        cards.sort_by_key(|c| (c.order, c.created_at));
        Ok(Some(BoardDetail {
            board,
            columns,
            cards,
        }))
    }

    async fn create_board(&self, req: BoardRequest) -> RepoResult<Board> {
        self.check()?;
        let now = Utc::now();
        let board = Board {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        self.store.write().await.boards.push(board.clone());
        Ok(board)
    }

    async fn update_board(&self, id: Uuid, req: BoardRequest) -> RepoResult<Option<Board>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.boards.iter_mut().find(|b| b.id == id).map(|b| {
            b.name = req.name.trim().to_string();
            b.description = req.description;
            b.updated_at = Utc::now();
            b.clone()
        }))
    }

    async fn delete_board(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store.boards.iter().any(|b| b.id == id) {
            return Ok(false);
        }
        store.cards.retain(|c| c.board_id != id);
        store.columns.retain(|c| c.board_id != id);
        Ok(remove_by(&mut store.boards, |b| b.id == id))
    }

    async fn create_column(&self, board_id: Uuid, req: ColumnRequest) -> RepoResult<Column> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store.boards.iter().any(|b| b.id == board_id) {
            return Err(RepoError::NotFound("board"));
        }
        let order = next_order(
            store
                .columns
                .iter()
                .filter(|c| c.board_id == board_id)
                .map(|c| c.order),
        );
        let column = Column {
            id: Uuid::new_v4(),
            board_id,
            name: req.name.trim().to_string(),
            order,
            created_at: Utc::now(),
        };
        store.columns.push(column.clone());
        Ok(column)
    }

    async fn update_column(
        &self,
        board_id: Uuid,
        column_id: Uuid,
        req: ColumnRequest,
    ) -> RepoResult<Option<Column>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store
            .columns
            .iter_mut()
            .find(|c| c.id == column_id && c.board_id == board_id)
            .map(|c| {
                c.name = req.name.trim().to_string();
                c.clone()
            }))
    }

    async fn delete_column(&self, board_id: Uuid, column_id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store
            .columns
            .iter()
            .any(|c| c.id == column_id && c.board_id == board_id)
        {
            return Ok(false);
        }
        store.cards.retain(|c| c.column_id != column_id);
        Ok(remove_by(&mut store.columns, |c| c.id == column_id))
    }

    async fn create_card(&self, board_id: Uuid, req: CreateCardRequest) -> RepoResult<Card> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store
            .columns
            .iter()
            .any(|c| c.id == req.column_id && c.board_id == board_id)
        {
            return Err(RepoError::NotFound("column"));
        }
        let order = next_order(
            store
                .cards
                .iter()
                .filter(|c| c.column_id == req.column_id)
                .map(|c| c.order),
        );
        let now = Utc::now();
        let card = Card {
            id: Uuid::new_v4(),
            board_id,
            column_id: req.column_id,
            title: req.title.trim().to_string(),
            description: req.description,
            labels: req.labels,
            due_date: req.due_date,
            order,
            created_at: now,
            updated_at: now,
        };
        store.cards.push(card.clone());
        Ok(card)
    }

    async fn update_card(
        &self,
        board_id: Uuid,
        card_id: Uuid,
        req: UpdateCardRequest,
    ) -> RepoResult<Option<Card>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store
            .cards
            .iter_mut()
            .find(|c| c.id == card_id && c.board_id == board_id)
            .map(|card| {
                if let Some(title) = req.title {
                    card.title = title;
                }
                if req.description.is_some() {
                    card.description = req.description;
                }
                if let Some(labels) = req.labels {
                    card.labels = labels;
                }
                if req.due_date.is_some() {
                    card.due_date = req.due_date;
                }
                card.updated_at = Utc::now();
                card.clone()
            }))
    }

    async fn delete_card(&self, board_id: Uuid, card_id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.cards, |c| {
            c.id == card_id && c.board_id == board_id
        }))
    }
}

#[async_trait]
impl TimelineRepository for MemoryRepository {
    async fn list_timeline(&self) -> RepoResult<Vec<TimelineItem>> {
        self.check()?;
        let mut items = self.store.read().await.timeline.clone();
        items.sort_by_key(|item| (item.order, item.created_at));
        Ok(items)
    }

    async fn create_timeline_item(
        &self,
        req: CreateTimelineItemRequest,
    ) -> RepoResult<TimelineItem> {
        self.check()?;
        let mut store = self.store.write().await;
        let item = TimelineItem {
            id: Uuid::new_v4(),
            title: req.title.trim().to_string(),
            description: req.description,
            date: req.date,
            order: next_order(store.timeline.iter().map(|item| item.order)),
            created_at: Utc::now(),
        };
        store.timeline.push(item.clone());
        Ok(item)
    }

    async fn update_timeline_item(
        &self,
        id: Uuid,
        req: UpdateTimelineItemRequest,
    ) -> RepoResult<Option<TimelineItem>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.timeline.iter_mut().find(|i| i.id == id).map(|item| {
            if let Some(title) = req.title {
                item.title = title;
            }
            if req.description.is_some() {
                item.description = req.description;
            }
            if let Some(date) = req.date {
                item.date = date;
            }
            item.clone()
        }))
    }

    async fn delete_timeline_item(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.timeline, |i| i.id == id))
    }
}

#[async_trait]
impl ReorderRepository for MemoryRepository {
    async fn reorder(&self, scope: ReorderScope, items: &[ReorderItem]) -> RepoResult<u64> {
        self.check()?;
        // A single write guard covers the batch, so readers see all of it or none of it.
        let mut store = self.store.write().await;
        let store = &mut *store;
        let mut updated = 0;
        for item in items {
            let moved = match scope {
                ReorderScope::Columns { board_id } => store
                    .columns
                    .iter_mut()
                    .find(|c| c.id == item.id && c.board_id == board_id)
                    .map(|c| c.order = item.order)
                    .is_some(),
                ReorderScope::Cards { board_id } => {
                    let target_ok = item.column_id.is_none_or(|column_id| {
                        store
                            .columns
                            .iter()
                            .any(|c| c.id == column_id && c.board_id == board_id)
                    });
                    target_ok
                        && store
                            .cards
                            .iter_mut()
                            .find(|c| c.id == item.id && c.board_id == board_id)
                            .map(|card| {
                                card.order = item.order;
                                if let Some(column_id) = item.column_id {
                                    card.column_id = column_id;
                                }
                                card.updated_at = Utc::now();
                            })
                            .is_some()
                }
                ReorderScope::Timeline => store
                    .timeline
                    .iter_mut()
                    .find(|i| i.id == item.id)
                    .map(|i| i.order = item.order)
                    .is_some(),
            };
            if moved {
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl NotesRepository for MemoryRepository {
    async fn list_folders(&self) -> RepoResult<Vec<Folder>> {
        self.check()?;
        let mut folders = self.store.read().await.folders.clone();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    async fn create_folder(&self, req: FolderRequest) -> RepoResult<Folder> {
        self.check()?;
        let folder = Folder {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            created_at: Utc::now(),
        };
        self.store.write().await.folders.push(folder.clone());
        Ok(folder)
    }

    async fn rename_folder(&self, id: Uuid, req: FolderRequest) -> RepoResult<Option<Folder>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.folders.iter_mut().find(|f| f.id == id).map(|f| {
            f.name = req.name.trim().to_string();
            f.clone()
        }))
    }

    async fn delete_folder(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        for note in store.notes.iter_mut().filter(|n| n.folder_id == Some(id)) {
            note.folder_id = None;
        }
        Ok(remove_by(&mut store.folders, |f| f.id == id))
    }

    async fn list_notes(&self, folder_id: Option<Uuid>) -> RepoResult<Vec<Note>> {
        self.check()?;
        let mut notes: Vec<Note> = self
            .store
            .read()
            .await
            .notes
            .iter()
            .filter(|n| folder_id.is_none() || n.folder_id == folder_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        Ok(notes)
    }

    async fn get_note(&self, id: Uuid) -> RepoResult<Option<Note>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn create_note(&self, req: CreateNoteRequest) -> RepoResult<Note> {
        self.check()?;
        let mut store = self.store.write().await;
        if let Some(folder_id) = req.folder_id
            && !store.folders.iter().any(|f| f.id == folder_id)
        {
            return Err(RepoError::NotFound("folder"));
        }
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            folder_id: req.folder_id,
            title: req.title.trim().to_string(),
            content: req.content,
            pinned: req.pinned,
            created_at: now,
            updated_at: now,
        };
        store.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: Uuid, req: UpdateNoteRequest) -> RepoResult<Option<Note>> {
        self.check()?;
        let mut store = self.store.write().await;
        if let Some(Some(folder_id)) = req.folder_id
            && !store.folders.iter().any(|f| f.id == folder_id)
        {
            return Err(RepoError::NotFound("folder"));
        }
        Ok(store.notes.iter_mut().find(|n| n.id == id).map(|note| {
            if let Some(folder_id) = req.folder_id {
                note.folder_id = folder_id;
            }
            if let Some(title) = req.title {
                note.title = title;
            }
            if let Some(content) = req.content {
                note.content = content;
            }
            if let Some(pinned) = req.pinned {
                note.pinned = pinned;
            }
            note.updated_at = Utc::now();
            note.clone()
        }))
    }

    async fn delete_note(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.notes, |n| n.id == id))
    }
}

#[async_trait]
impl ContactRepository for MemoryRepository {
    async fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        self.check()?;
        let mut contacts = self.store.read().await.contacts.clone();
        contacts.sort_by_key(|c| c.name.to_lowercase());
        Ok(contacts)
    }

    async fn get_contact(&self, id: Uuid) -> RepoResult<Option<Contact>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn create_contact(&self, req: ContactRequest) -> RepoResult<Contact> {
        self.check()?;
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone,
            company: req.company,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.store.write().await.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_contact(&self, id: Uuid, req: ContactRequest) -> RepoResult<Option<Contact>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.contacts.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = req.name.trim().to_string();
            c.email = req.email;
            c.phone = req.phone;
            c.company = req.company;
            c.notes = req.notes;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.contacts, |c| c.id == id))
    }
}

#[async_trait]
impl InboxRepository for MemoryRepository {
    async fn create_message(&self, req: ContactFormRequest) -> RepoResult<InboxMessage> {
        self.check()?;
        let message = InboxMessage {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            subject: req.subject,
            body: req.body,
            read: false,
            received_at: Utc::now(),
        };
        self.store.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> RepoResult<Vec<InboxMessage>> {
        self.check()?;
        let mut messages = self.store.read().await.messages.clone();
        messages.reverse();
        Ok(messages)
    }

    async fn set_message_read(&self, id: Uuid, read: bool) -> RepoResult<Option<InboxMessage>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.read = read;
            m.clone()
        }))
    }

    async fn delete_message(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.messages, |m| m.id == id))
    }

    async fn list_email_accounts(&self) -> RepoResult<Vec<EmailAccount>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.accounts.iter().map(|(a, _)| a.clone()).collect())
    }

    async fn create_email_account(
        &self,
        req: CreateEmailAccountRequest,
    ) -> RepoResult<EmailAccount> {
        self.check()?;
        let account = EmailAccount {
            id: Uuid::new_v4(),
            label: req.label.trim().to_string(),
            email: req.email.trim().to_string(),
            imap_host: req.imap_host.trim().to_string(),
            imap_port: req.imap_port,
            username: req.username.trim().to_string(),
            created_at: Utc::now(),
        };
        self.store
            .write()
            .await
            .accounts
            .push((account.clone(), req.password));
        Ok(account)
    }

    async fn delete_email_account(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.accounts, |(a, _)| a.id == id))
    }
}

#[async_trait]
impl CalendarRepository for MemoryRepository {
    async fn list_events(&self, range: EventRange) -> RepoResult<Vec<Event>> {
        self.check()?;
        let mut events: Vec<Event> = self
            .store
            .read()
            .await
            .events
            .iter()
            .filter(|e| range.from.is_none_or(|from| e.ends_at >= from))
            .filter(|e| range.to.is_none_or(|to| e.starts_at < to))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.events.iter().find(|e| e.id == id).cloned())
    }

    async fn create_event(&self, req: CreateEventRequest) -> RepoResult<Event> {
        self.check()?;
        let event = Event {
            id: Uuid::new_v4(),
            title: req.title.trim().to_string(),
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            all_day: req.all_day,
            created_at: Utc::now(),
        };
        self.store.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, event: Event) -> RepoResult<Option<Event>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.events.iter_mut().find(|e| e.id == event.id).map(|e| {
            *e = Event {
                created_at: e.created_at,
                ..event
            };
            e.clone()
        }))
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.events, |e| e.id == id))
    }
}

#[async_trait]
impl WhiteboardRepository for MemoryRepository {
    async fn list_whiteboards(&self) -> RepoResult<Vec<Whiteboard>> {
        self.check()?;
        let mut boards = self.store.read().await.whiteboards.clone();
        boards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(boards)
    }

    async fn get_whiteboard(&self, slug: &str) -> RepoResult<Option<Whiteboard>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.whiteboards.iter().find(|w| w.slug == slug).cloned())
    }

    async fn create_whiteboard(&self, req: CreateWhiteboardRequest) -> RepoResult<Whiteboard> {
        self.check()?;
        let mut store = self.store.write().await;
        if store.whiteboards.iter().any(|w| w.slug == req.slug) {
            return Err(RepoError::Conflict(
                "a whiteboard with this slug already exists".into(),
            ));
        }
        let board = Whiteboard {
            id: Uuid::new_v4(),
            slug: req.slug,
            name: req.name.trim().to_string(),
            elements: req
                .elements
                .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
            cleared_on: None,
            updated_at: Utc::now(),
        };
        store.whiteboards.push(board.clone());
        Ok(board)
    }

    async fn save_whiteboard(
        &self,
        slug: &str,
        elements: serde_json::Value,
    ) -> RepoResult<Option<Whiteboard>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store
            .whiteboards
            .iter_mut()
            .find(|w| w.slug == slug)
            .map(|w| {
                w.elements = elements;
                w.updated_at = Utc::now();
                w.clone()
            }))
    }

    async fn delete_whiteboard(&self, slug: &str) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.whiteboards, |w| w.slug == slug))
    }

    async fn clear_whiteboard_for_day(
        &self,
        slug: &str,
        day: NaiveDate,
    ) -> RepoResult<Option<ClearOutcome>> {
        self.check()?;
        let mut store = self.store.write().await;
        let Some(board) = store.whiteboards.iter_mut().find(|w| w.slug == slug) else {
            return Ok(None);
        };
        if board.cleared_on == Some(day) {
            return Ok(Some(ClearOutcome::AlreadyCleared));
        }
        board.elements = serde_json::Value::Array(Vec::new());
        board.cleared_on = Some(day);
        board.updated_at = Utc::now();
        Ok(Some(ClearOutcome::Cleared))
    }
}

#[async_trait]
impl ApiKeyRepository for MemoryRepository {
    async fn list_api_keys(&self) -> RepoResult<Vec<ApiKey>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.api_keys.iter().rev().map(|(k, _)| k.clone()).collect())
    }

    async fn create_api_key(
        &self,
        name: &str,
        prefix: &str,
        key_hash: &str,
    ) -> RepoResult<ApiKey> {
        self.check()?;
        let mut store = self.store.write().await;
        if store.api_keys.iter().any(|(_, hash)| hash == key_hash) {
            return Err(RepoError::Conflict("api key collision, retry".into()));
        }
        let key = ApiKey {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            prefix: prefix.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        store.api_keys.push((key.clone(), key_hash.to_string()));
        Ok(key)
    }

    async fn delete_api_key(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(remove_by(&mut store.api_keys, |(k, _)| k.id == id))
    }
}

#[async_trait]
impl HealthRepository for MemoryRepository {
    async fn list_resources(&self) -> RepoResult<Vec<Resource>> {
        self.check()?;
        Ok(self.store.read().await.resources.clone())
    }

    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.resources.iter().find(|r| r.id == id).cloned())
    }

    async fn create_resource(&self, req: CreateResourceRequest) -> RepoResult<Resource> {
        self.check()?;
        let resource = Resource {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            url: req.url.trim().to_string(),
            created_at: Utc::now(),
        };
        self.store.write().await.resources.push(resource.clone());
        Ok(resource)
    }

    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut store = self.store.write().await;
        store.health_logs.retain(|l| l.resource_id != id);
        Ok(remove_by(&mut store.resources, |r| r.id == id))
    }

    async fn insert_health_log(&self, log: &HealthCheckLog) -> RepoResult<()> {
        self.check()?;
        let mut store = self.store.write().await;
        if !store.resources.iter().any(|r| r.id == log.resource_id) {
            return Err(RepoError::NotFound("resource"));
        }
        store.health_logs.push(log.clone());
        Ok(())
    }

    async fn list_health_logs(
        &self,
        resource_id: Uuid,
        limit: i64,
    ) -> RepoResult<Vec<HealthCheckLog>> {
        self.check()?;
        let store = self.store.read().await;
        let mut logs: Vec<HealthCheckLog> = store
            .health_logs
            .iter()
            .filter(|l| l.resource_id == resource_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        logs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(logs)
    }

    async fn prune_health_logs(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        self.check()?;
        let mut store = self.store.write().await;
        let before = store.health_logs.len();
        store.health_logs.retain(|l| l.checked_at >= cutoff);
        Ok((before - store.health_logs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_mode_surfaces_database_errors() {
        let repo = MemoryRepository::new();
        repo.set_failing(true);
        assert!(matches!(
            repo.list_timeline().await,
            Err(RepoError::Database(_))
        ));
        repo.set_failing(false);
        assert!(repo.list_timeline().await.is_ok());
    }

    #[tokio::test]
    async fn creates_append_after_the_current_maximum() {
        let repo = MemoryRepository::new();
        let board = repo
            .create_board(BoardRequest {
                name: "Work".into(),
                description: None,
            })
            .await
            .unwrap();
        let first = repo
            .create_column(board.id, ColumnRequest { name: "Todo".into() })
            .await
            .unwrap();
        let second = repo
            .create_column(board.id, ColumnRequest { name: "Done".into() })
            .await
            .unwrap();
        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
    }

    #[test]
    fn next_order_saturates_at_the_top_of_the_range() {
        assert_eq!(next_order(std::iter::empty()), 0);
        assert_eq!(next_order([3, 7].into_iter()), 8);
        assert_eq!(next_order([i32::MAX].into_iter()), i32::MAX);
    }

    #[tokio::test]
    async fn deleting_a_folder_moves_notes_to_the_root() {
        let repo = MemoryRepository::new();
        let folder = repo
            .create_folder(FolderRequest {
                name: "Ideas".into(),
            })
            .await
            .unwrap();
        let note = repo
            .create_note(CreateNoteRequest {
                folder_id: Some(folder.id),
                title: "Draft".into(),
                ..CreateNoteRequest::default()
            })
            .await
            .unwrap();

        assert!(repo.delete_folder(folder.id).await.unwrap());
        let note = repo.get_note(note.id).await.unwrap().unwrap();
        assert_eq!(note.folder_id, None);
    }
}
