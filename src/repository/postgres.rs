use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
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

const POST_COLUMNS: &str = "id, slug, title, summary, content, tags, cover_image, published, \
                            published_at, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, author_name, body, approved, created_at";
const CARD_COLUMNS: &str = "id, board_id, column_id, title, description, labels, due_date, \
                            sort_order, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, folder_id, title, content, pinned, created_at, updated_at";
const CONTACT_COLUMNS: &str =
    "id, name, email, phone, company, notes, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, name, email, subject, body, read, received_at";
const ACCOUNT_COLUMNS: &str = "id, label, email, imap_host, imap_port, username, created_at";
const EVENT_COLUMNS: &str =
    "id, title, description, location, starts_at, ends_at, all_day, created_at";
const WHITEBOARD_COLUMNS: &str = "id, slug, name, elements, cleared_on, updated_at";
const LOG_COLUMNS: &str =
    "id, resource_id, status, response_time_ms, is_healthy, error, checked_at";

/// PostgresRepository
///
/// The production implementation of every repository trait, backed by a `PgPool`.
/// Queries are runtime-checked (`query_as::<_, T>`) against the schema in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Closes the pool; called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepoError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => RepoError::Conflict(message.to_string()),
        _ => RepoError::Database(err),
    }
}

fn not_found_on_fk(err: sqlx::Error, entity: &'static str) -> RepoError {
    match err.as_database_error() {
        Some(db) if db.is_foreign_key_violation() => RepoError::NotFound(entity),
        _ => RepoError::Database(err),
    }
}

#[async_trait]
impl BlogRepository for PostgresRepository {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_published_posts(&self) -> RepoResult<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE published = true \
             ORDER BY published_at DESC NULLS LAST, created_at DESC"
        );
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND published = true");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post> {
        let sql = format!(
            "INSERT INTO posts (id, slug, title, summary, content, tags, cover_image, published, \
                                published_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() END, NOW(), NOW()) \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.slug)
            .bind(&req.title)
            .bind(&req.summary)
            .bind(&req.content)
            .bind(&req.tags)
            .bind(&req.cover_image)
            .bind(req.published)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "a post with this slug already exists"))
    }

    /// Partial update via `COALESCE`; `published_at` is stamped on the first publish only.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET \
                slug = COALESCE($2, slug), \
                title = COALESCE($3, title), \
                summary = COALESCE($4, summary), \
                content = COALESCE($5, content), \
                tags = COALESCE($6, tags), \
                cover_image = COALESCE($7, cover_image), \
                published = COALESCE($8, published), \
                published_at = CASE \
                    WHEN COALESCE($8, published) AND published_at IS NULL THEN NOW() \
                    ELSE published_at END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&req.slug)
            .bind(&req.title)
            .bind(&req.summary)
            .bind(&req.content)
            .bind(&req.tags)
            .bind(&req.cover_image)
            .bind(req.published)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "a post with this slug already exists"))
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        // Comments and the view counter go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_view(&self, slug: &str) -> RepoResult<Option<BlogView>> {
        let view = sqlx::query_as::<_, BlogView>(
            r#"
            WITH bumped AS (
                INSERT INTO blog_views (post_id, views)
                SELECT id, 1 FROM posts WHERE slug = $1 AND published = true
                ON CONFLICT (post_id) DO UPDATE SET views = blog_views.views + 1
                RETURNING post_id, views
            )
            SELECT post_id, $1 AS slug, views FROM bumped
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(view)
    }

    async fn list_views(&self) -> RepoResult<Vec<BlogView>> {
        Ok(sqlx::query_as::<_, BlogView>(
            "SELECT v.post_id, p.slug, v.views FROM blog_views v \
             JOIN posts p ON p.id = v.post_id ORDER BY v.views DESC, p.slug ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_comment(&self, post_id: Uuid, req: CreateCommentRequest) -> RepoResult<Comment> {
        let sql = format!(
            "INSERT INTO post_comments (id, post_id, author_name, body, approved, created_at) \
             VALUES ($1, $2, $3, $4, false, NOW()) RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(Uuid::new_v4())
            .bind(post_id)
            .bind(req.author_name.trim())
            .bind(req.body.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_on_fk(e, "post"))
    }

    async fn list_approved_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM post_comments \
             WHERE post_id = $1 AND approved = true ORDER BY created_at ASC"
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_comments(&self) -> RepoResult<Vec<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM post_comments ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Comment>(&sql).fetch_all(&self.pool).await?)
    }

    async fn set_comment_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> RepoResult<Option<Comment>> {
        let sql = format!(
            "UPDATE post_comments SET approved = $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(approved)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_comment(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM post_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl KanbanRepository for PostgresRepository {
    async fn list_boards(&self) -> RepoResult<Vec<Board>> {
        Ok(sqlx::query_as::<_, Board>(
            "SELECT id, name, description, created_at, updated_at FROM kanban_boards \
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_board_detail(&self, id: Uuid) -> RepoResult<Option<BoardDetail>> {
        let Some(board) = sqlx::query_as::<_, Board>(
            "SELECT id, name, description, created_at, updated_at FROM kanban_boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let columns = sqlx::query_as::<_, Column>(
            "SELECT id, board_id, name, sort_order, created_at FROM kanban_columns \
             WHERE board_id = $1 ORDER BY sort_order ASC, created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM kanban_cards WHERE board_id = $1 \
             ORDER BY sort_order ASC, created_at ASC"
        );
        let cards = sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(BoardDetail {
            board,
            columns,
            cards,
        }))
    }

    async fn create_board(&self, req: BoardRequest) -> RepoResult<Board> {
        Ok(sqlx::query_as::<_, Board>(
            "INSERT INTO kanban_boards (id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_board(&self, id: Uuid, req: BoardRequest) -> RepoResult<Option<Board>> {
        Ok(sqlx::query_as::<_, Board>(
            "UPDATE kanban_boards SET name = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING id, name, description, created_at, updated_at",
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(&req.description)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_board(&self, id: Uuid) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM kanban_cards WHERE board_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM kanban_columns WHERE board_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM kanban_boards WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_column(&self, board_id: Uuid, req: ColumnRequest) -> RepoResult<Column> {
        sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO kanban_columns (id, board_id, name, sort_order, created_at)
            SELECT $1, b.id, $3,
                   COALESCE((SELECT LEAST(MAX(sort_order), 2147483646) + 1 FROM kanban_columns WHERE board_id = b.id), 0),
                   NOW()
            FROM kanban_boards b WHERE b.id = $2
            RETURNING id, board_id, name, sort_order, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(board_id)
        .bind(req.name.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("board"))
    }

    async fn update_column(
        &self,
        board_id: Uuid,
        column_id: Uuid,
        req: ColumnRequest,
    ) -> RepoResult<Option<Column>> {
        Ok(sqlx::query_as::<_, Column>(
            "UPDATE kanban_columns SET name = $3 WHERE id = $2 AND board_id = $1 \
             RETURNING id, board_id, name, sort_order, created_at",
        )
        .bind(board_id)
        .bind(column_id)
        .bind(req.name.trim())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_column(&self, board_id: Uuid, column_id: Uuid) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM kanban_cards WHERE column_id = $2 AND board_id = $1")
            .bind(board_id)
            .bind(column_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM kanban_columns WHERE id = $2 AND board_id = $1")
            .bind(board_id)
            .bind(column_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_card(&self, board_id: Uuid, req: CreateCardRequest) -> RepoResult<Card> {
        let sql = format!(
            "INSERT INTO kanban_cards ({CARD_COLUMNS}) \
             SELECT $1, c.board_id, c.id, $4, $5, $6, $7, \
                    COALESCE((SELECT LEAST(MAX(sort_order), 2147483646) + 1 FROM kanban_cards WHERE column_id = c.id), 0), \
                    NOW(), NOW() \
             FROM kanban_columns c WHERE c.id = $3 AND c.board_id = $2 \
             RETURNING {CARD_COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(Uuid::new_v4())
            .bind(board_id)
            .bind(req.column_id)
            .bind(req.title.trim())
            .bind(&req.description)
            .bind(&req.labels)
            .bind(req.due_date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound("column"))
    }

    async fn update_card(
        &self,
        board_id: Uuid,
        card_id: Uuid,
        req: UpdateCardRequest,
    ) -> RepoResult<Option<Card>> {
        let sql = format!(
            "UPDATE kanban_cards SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                labels = COALESCE($5, labels), \
                due_date = COALESCE($6, due_date), \
                updated_at = NOW() \
             WHERE id = $2 AND board_id = $1 \
             RETURNING {CARD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Card>(&sql)
            .bind(board_id)
            .bind(card_id)
            .bind(&req.title)
            .bind(&req.description)
            .bind(&req.labels)
            .bind(req.due_date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_card(&self, board_id: Uuid, card_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM kanban_cards WHERE id = $2 AND board_id = $1")
            .bind(board_id)
            .bind(card_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TimelineRepository for PostgresRepository {
    async fn list_timeline(&self) -> RepoResult<Vec<TimelineItem>> {
        Ok(sqlx::query_as::<_, TimelineItem>(
            "SELECT id, title, description, date, sort_order, created_at FROM timeline_items \
             ORDER BY sort_order ASC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_timeline_item(
        &self,
        req: CreateTimelineItemRequest,
    ) -> RepoResult<TimelineItem> {
        Ok(sqlx::query_as::<_, TimelineItem>(
            r#"
            INSERT INTO timeline_items (id, title, description, date, sort_order, created_at)
            VALUES ($1, $2, $3, $4,
                    COALESCE((SELECT LEAST(MAX(sort_order), 2147483646) + 1 FROM timeline_items), 0), NOW())
            RETURNING id, title, description, date, sort_order, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(req.date)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_timeline_item(
        &self,
        id: Uuid,
        req: UpdateTimelineItemRequest,
    ) -> RepoResult<Option<TimelineItem>> {
        Ok(sqlx::query_as::<_, TimelineItem>(
            "UPDATE timeline_items SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                date = COALESCE($4, date) \
             WHERE id = $1 \
             RETURNING id, title, description, date, sort_order, created_at",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.date)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_timeline_item(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM timeline_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReorderRepository for PostgresRepository {
    /// One `UPDATE ... FROM UNNEST(...)` per call, so the batch is a single statement.
    async fn reorder(&self, scope: ReorderScope, items: &[ReorderItem]) -> RepoResult<u64> {
        let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let orders: Vec<i32> = items.iter().map(|item| item.order).collect();

        let result = match scope {
            ReorderScope::Columns { board_id } => {
                sqlx::query(
                    r#"
                    UPDATE kanban_columns AS c SET sort_order = u.sort_order
                    FROM UNNEST($1::uuid[], $2::int4[]) AS u(id, sort_order)
                    WHERE c.id = u.id AND c.board_id = $3
                    "#,
                )
                .bind(&ids)
                .bind(&orders)
                .bind(board_id)
                .execute(&self.pool)
                .await?
            }
            ReorderScope::Cards { board_id } => {
                let columns: Vec<Option<Uuid>> = items.iter().map(|item| item.column_id).collect();
                // A target column from another board disqualifies the item entirely.
                sqlx::query(
                    r#"
                    UPDATE kanban_cards AS c
                    SET sort_order = u.sort_order,
                        column_id = COALESCE(u.column_id, c.column_id),
                        updated_at = NOW()
                    FROM UNNEST($1::uuid[], $2::int4[], $3::uuid[]) AS u(id, sort_order, column_id)
                    WHERE c.id = u.id
                      AND c.board_id = $4
                      AND (u.column_id IS NULL OR EXISTS (
                          SELECT 1 FROM kanban_columns k WHERE k.id = u.column_id AND k.board_id = $4
                      ))
                    "#,
                )
                .bind(&ids)
                .bind(&orders)
                .bind(&columns)
                .bind(board_id)
                .execute(&self.pool)
                .await?
            }
            ReorderScope::Timeline => {
                sqlx::query(
                    r#"
                    UPDATE timeline_items AS t SET sort_order = u.sort_order
                    FROM UNNEST($1::uuid[], $2::int4[]) AS u(id, sort_order)
                    WHERE t.id = u.id
                    "#,
                )
                .bind(&ids)
                .bind(&orders)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl NotesRepository for PostgresRepository {
    async fn list_folders(&self) -> RepoResult<Vec<Folder>> {
        Ok(sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_at FROM note_folders ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_folder(&self, req: FolderRequest) -> RepoResult<Folder> {
        Ok(sqlx::query_as::<_, Folder>(
            "INSERT INTO note_folders (id, name, created_at) VALUES ($1, $2, NOW()) \
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn rename_folder(&self, id: Uuid, req: FolderRequest) -> RepoResult<Option<Folder>> {
        Ok(sqlx::query_as::<_, Folder>(
            "UPDATE note_folders SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(req.name.trim())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_folder(&self, id: Uuid) -> RepoResult<bool> {
        // notes.folder_id is ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM note_folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_notes(&self, folder_id: Option<Uuid>) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE ($1::uuid IS NULL OR folder_id = $1) \
             ORDER BY pinned DESC, updated_at DESC"
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(folder_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_note(&self, id: Uuid) -> RepoResult<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_note(&self, req: CreateNoteRequest) -> RepoResult<Note> {
        let sql = format!(
            "INSERT INTO notes ({NOTE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.folder_id)
            .bind(req.title.trim())
            .bind(&req.content)
            .bind(req.pinned)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_on_fk(e, "folder"))
    }

    async fn update_note(&self, id: Uuid, req: UpdateNoteRequest) -> RepoResult<Option<Note>> {
        let sql = format!(
            "UPDATE notes SET \
                folder_id = CASE WHEN $2 THEN $3 ELSE folder_id END, \
                title = COALESCE($4, title), \
                content = COALESCE($5, content), \
                pinned = COALESCE($6, pinned), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(req.folder_id.is_some())
            .bind(req.folder_id.flatten())
            .bind(&req.title)
            .bind(&req.content)
            .bind(req.pinned)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| not_found_on_fk(e, "folder"))
    }

    async fn delete_note(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ContactRepository for PostgresRepository {
    async fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY lower(name) ASC");
        Ok(sqlx::query_as::<_, Contact>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_contact(&self, id: Uuid) -> RepoResult<Option<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_contact(&self, req: ContactRequest) -> RepoResult<Contact> {
        let sql = format!(
            "INSERT INTO contacts ({CONTACT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.name.trim())
            .bind(&req.email)
            .bind(&req.phone)
            .bind(&req.company)
            .bind(&req.notes)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_contact(&self, id: Uuid, req: ContactRequest) -> RepoResult<Option<Contact>> {
        let sql = format!(
            "UPDATE contacts SET name = $2, email = $3, phone = $4, company = $5, notes = $6, \
             updated_at = NOW() WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(req.name.trim())
            .bind(&req.email)
            .bind(&req.phone)
            .bind(&req.company)
            .bind(&req.notes)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_contact(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InboxRepository for PostgresRepository {
    async fn create_message(&self, req: ContactFormRequest) -> RepoResult<InboxMessage> {
        let sql = format!(
            "INSERT INTO inbox_messages ({MESSAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, false, NOW()) RETURNING {MESSAGE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, InboxMessage>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.name.trim())
            .bind(req.email.trim())
            .bind(&req.subject)
            .bind(&req.body)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_messages(&self) -> RepoResult<Vec<InboxMessage>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM inbox_messages ORDER BY received_at DESC");
        Ok(sqlx::query_as::<_, InboxMessage>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_message_read(&self, id: Uuid, read: bool) -> RepoResult<Option<InboxMessage>> {
        let sql =
            format!("UPDATE inbox_messages SET read = $2 WHERE id = $1 RETURNING {MESSAGE_COLUMNS}");
        Ok(sqlx::query_as::<_, InboxMessage>(&sql)
            .bind(id)
            .bind(read)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_message(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM inbox_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_email_accounts(&self) -> RepoResult<Vec<EmailAccount>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM email_accounts ORDER BY created_at ASC");
        Ok(sqlx::query_as::<_, EmailAccount>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_email_account(
        &self,
        req: CreateEmailAccountRequest,
    ) -> RepoResult<EmailAccount> {
        // The password column is write-only: it is never part of a RETURNING or SELECT list.
        let sql = format!(
            "INSERT INTO email_accounts (id, label, email, imap_host, imap_port, username, \
                                         password_secret, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING {ACCOUNT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, EmailAccount>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.label.trim())
            .bind(req.email.trim())
            .bind(req.imap_host.trim())
            .bind(req.imap_port)
            .bind(req.username.trim())
            .bind(&req.password)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_email_account(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM email_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CalendarRepository for PostgresRepository {
    async fn list_events(&self, range: EventRange) -> RepoResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events \
             WHERE ($1::timestamptz IS NULL OR ends_at >= $1) \
               AND ($2::timestamptz IS NULL OR starts_at < $2) \
             ORDER BY starts_at ASC"
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = $1");
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_event(&self, req: CreateEventRequest) -> RepoResult<Event> {
        let sql = format!(
            "INSERT INTO calendar_events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.title.trim())
            .bind(&req.description)
            .bind(&req.location)
            .bind(req.starts_at)
            .bind(req.ends_at)
            .bind(req.all_day)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_event(&self, event: Event) -> RepoResult<Option<Event>> {
        let sql = format!(
            "UPDATE calendar_events SET title = $2, description = $3, location = $4, \
             starts_at = $5, ends_at = $6, all_day = $7 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.all_day)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WhiteboardRepository for PostgresRepository {
    async fn list_whiteboards(&self) -> RepoResult<Vec<Whiteboard>> {
        let sql = format!("SELECT {WHITEBOARD_COLUMNS} FROM whiteboards ORDER BY name ASC");
        Ok(sqlx::query_as::<_, Whiteboard>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_whiteboard(&self, slug: &str) -> RepoResult<Option<Whiteboard>> {
        let sql = format!("SELECT {WHITEBOARD_COLUMNS} FROM whiteboards WHERE slug = $1");
        Ok(sqlx::query_as::<_, Whiteboard>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_whiteboard(&self, req: CreateWhiteboardRequest) -> RepoResult<Whiteboard> {
        let sql = format!(
            "INSERT INTO whiteboards ({WHITEBOARD_COLUMNS}) VALUES ($1, $2, $3, $4, NULL, NOW()) \
             RETURNING {WHITEBOARD_COLUMNS}"
        );
        let elements = req
            .elements
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
        sqlx::query_as::<_, Whiteboard>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.slug)
            .bind(req.name.trim())
            .bind(elements)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "a whiteboard with this slug already exists"))
    }

    async fn save_whiteboard(
        &self,
        slug: &str,
        elements: serde_json::Value,
    ) -> RepoResult<Option<Whiteboard>> {
        let sql = format!(
            "UPDATE whiteboards SET elements = $2, updated_at = NOW() WHERE slug = $1 \
             RETURNING {WHITEBOARD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Whiteboard>(&sql)
            .bind(slug)
            .bind(elements)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_whiteboard(&self, slug: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM whiteboards WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_whiteboard_for_day(
        &self,
        slug: &str,
        day: NaiveDate,
    ) -> RepoResult<Option<ClearOutcome>> {
        let cleared = sqlx::query(
            "UPDATE whiteboards SET elements = '[]'::jsonb, cleared_on = $2, updated_at = NOW() \
             WHERE slug = $1 AND cleared_on IS DISTINCT FROM $2",
        )
        .bind(slug)
        .bind(day)
        .execute(&self.pool)
        .await?;
        if cleared.rows_affected() > 0 {
            return Ok(Some(ClearOutcome::Cleared));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM whiteboards WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.then_some(ClearOutcome::AlreadyCleared))
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresRepository {
    async fn list_api_keys(&self) -> RepoResult<Vec<ApiKey>> {
        Ok(sqlx::query_as::<_, ApiKey>(
            "SELECT id, name, prefix, created_at, last_used_at FROM api_keys ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_api_key(
        &self,
        name: &str,
        prefix: &str,
        key_hash: &str,
    ) -> RepoResult<ApiKey> {
        sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys (id, name, prefix, key_hash, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING id, name, prefix, created_at, last_used_at",
        )
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .bind(prefix)
        .bind(key_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "api key collision, retry"))
    }

    async fn delete_api_key(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HealthRepository for PostgresRepository {
    async fn list_resources(&self) -> RepoResult<Vec<Resource>> {
        Ok(sqlx::query_as::<_, Resource>(
            "SELECT id, name, url, created_at FROM resources ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>> {
        Ok(sqlx::query_as::<_, Resource>(
            "SELECT id, name, url, created_at FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_resource(&self, req: CreateResourceRequest) -> RepoResult<Resource> {
        Ok(sqlx::query_as::<_, Resource>(
            "INSERT INTO resources (id, name, url, created_at) VALUES ($1, $2, $3, NOW()) \
             RETURNING id, name, url, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.url.trim())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool> {
        // Logs follow through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_health_log(&self, log: &HealthCheckLog) -> RepoResult<()> {
        let sql = format!(
            "INSERT INTO health_check_logs ({LOG_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        sqlx::query(&sql)
            .bind(log.id)
            .bind(log.resource_id)
            .bind(log.status)
            .bind(log.response_time_ms)
            .bind(log.is_healthy)
            .bind(&log.error)
            .bind(log.checked_at)
            .execute(&self.pool)
            .await
            .map_err(|e| not_found_on_fk(e, "resource"))?;
        Ok(())
    }

    async fn list_health_logs(
        &self,
        resource_id: Uuid,
        limit: i64,
    ) -> RepoResult<Vec<HealthCheckLog>> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM health_check_logs WHERE resource_id = $1 \
             ORDER BY checked_at DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, HealthCheckLog>(&sql)
            .bind(resource_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn prune_health_logs(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM health_check_logs WHERE checked_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
