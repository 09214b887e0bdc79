use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

// --- Blog ---

/// Post
///
/// A blog article. Drafts (`published = false`) are only visible through admin routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    // Markdown source; rendering is the frontend's job.
    pub content: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub published: bool,
    // Set the first time the post is published and never cleared afterwards.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// BlogView
///
/// Per-post view counter, joined with the post slug for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogView {
    pub post_id: Uuid,
    pub slug: String,
    pub views: i64,
}

/// Comment
///
/// A reader comment on a post. Comments start unapproved and only approved ones are public.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl CreatePostRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_slug(&self.slug)?;
        require_text("title", &self.title)
    }
}

/// UpdatePostRequest
///
/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_name: String,
    pub body: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("authorName", &self.author_name)?;
        require_text("body", &self.body)?;
        if self.body.chars().count() > 5000 {
            return Err(AppError::validation("body must be at most 5000 characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ModerateCommentRequest {
    pub approved: bool,
}

// --- Kanban ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    // `order` is reserved in SQL, hence the column rename.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Card {
    pub id: Uuid,
    // Denormalized from the column so reorders can be scoped to one board.
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub due_date: Option<NaiveDate>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// BoardDetail
///
/// Everything the kanban view needs in one response: columns and cards already sorted by `order`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BoardDetail {
    pub board: Board,
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    pub name: String,
    pub description: Option<String>,
}

impl BoardRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ColumnRequest {
    pub name: String,
}

impl ColumnRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub due_date: Option<NaiveDate>,
}

impl CreateCardRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl UpdateCardRequest {
    pub fn validate(&self) -> AppResult<()> {
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

// --- Timeline ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TimelineItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTimelineItemRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl CreateTimelineItemRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateTimelineItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl UpdateTimelineItemRequest {
    pub fn validate(&self) -> AppResult<()> {
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

// --- Notes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Note {
    pub id: Uuid,
    // None places the note at the root, outside any folder.
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct FolderRequest {
    pub name: String,
}

impl FolderRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub folder_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pinned: bool,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title)
    }
}

/// UpdateNoteRequest
///
/// `folderId` distinguishes "absent" (keep) from `null` (move to root).
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub folder_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub pinned: Option<bool>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> AppResult<()> {
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NoteFilter {
    /// Only return notes stored in this folder.
    pub folder_id: Option<Uuid>,
}

// --- Contacts ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ContactRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ContactRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)?;
        match &self.email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

// --- Inbox ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InboxMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub body: String,
    pub read: bool,
    pub received_at: DateTime<Utc>,
}

/// EmailAccount
///
/// A mailbox the dashboard knows about. The password is stored but never read back out.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmailAccount {
    pub id: Uuid,
    pub label: String,
    pub email: String,
    pub imap_host: String,
    pub imap_port: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ContactFormRequest {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub body: String,
}

impl ContactFormRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)?;
        validate_email(&self.email)?;
        require_text("body", &self.body)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MarkReadRequest {
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmailAccountRequest {
    pub label: String,
    pub email: String,
    pub imap_host: String,
    pub imap_port: i32,
    pub username: String,
    pub password: String,
}

impl CreateEmailAccountRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("label", &self.label)?;
        validate_email(&self.email)?;
        require_text("imapHost", &self.imap_host)?;
        require_text("username", &self.username)?;
        require_text("password", &self.password)?;
        if !(1..=65535).contains(&self.imap_port) {
            return Err(AppError::validation("imapPort must be between 1 and 65535"));
        }
        Ok(())
    }
}

// --- Calendar ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub all_day: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl CreateEventRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title)?;
        validate_range(self.starts_at, self.ends_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
}

impl UpdateEventRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        Ok(())
    }

    /// Applies the partial update onto `event`, rejecting a resulting range that runs backwards.
    pub fn apply(self, event: &mut Event) -> AppResult<()> {
        let starts_at = self.starts_at.unwrap_or(event.starts_at);
        let ends_at = self.ends_at.unwrap_or(event.ends_at);
        validate_range(starts_at, ends_at)?;
        if let Some(title) = self.title {
            event.title = title;
        }
        if self.description.is_some() {
            event.description = self.description;
        }
        if self.location.is_some() {
            event.location = self.location;
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        event.starts_at = starts_at;
        event.ends_at = ends_at;
        Ok(())
    }
}

/// EventRange
///
/// Optional `[from, to)` window; events overlapping it are returned.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct EventRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// --- Whiteboards ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Whiteboard {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    // Opaque drawing elements owned by the frontend canvas; always a JSON array.
    pub elements: serde_json::Value,
    // UTC day of the most recent scheduled clear.
    pub cleared_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateWhiteboardRequest {
    pub slug: String,
    pub name: String,
    pub elements: Option<serde_json::Value>,
}

impl CreateWhiteboardRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_slug(&self.slug)?;
        require_text("name", &self.name)?;
        match &self.elements {
            Some(elements) => validate_elements(elements),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SaveWhiteboardRequest {
    pub elements: serde_json::Value,
}

impl SaveWhiteboardRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_elements(&self.elements)
    }
}

/// ClearOutcome
///
/// Result of the conditional daily clear of a whiteboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ClearOutcome {
    Cleared,
    AlreadyCleared,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TodayBoardResult {
    pub status: ClearOutcome,
    pub slug: String,
    pub cleared_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodayBoardResponse {
    pub result: TodayBoardResult,
}

// --- API keys ---

/// ApiKey
///
/// Public view of an issued key. Only the prefix is kept in clear; the secret is hashed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

impl CreateApiKeyRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)
    }
}

/// CreatedApiKey
///
/// Returned once from key creation. `key` is the only time the plaintext leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    pub api_key: ApiKey,
    pub key: String,
}

// --- Monitored resources & health checks ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateResourceRequest {
    pub name: String,
    pub url: String,
}

impl CreateResourceRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)?;
        let url = self.url.trim();
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| AppError::validation("url must start with http:// or https://"))?;
        if host.is_empty() {
            return Err(AppError::validation("url must include a host"));
        }
        Ok(())
    }
}

/// HealthCheckLog
///
/// One immutable record per probe attempt. `status` is absent when no HTTP response
/// arrived (timeout, connection failure).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HealthCheckLog {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub status: Option<i32>,
    pub response_time_ms: i64,
    pub is_healthy: bool,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct HealthCheckSweepResponse {
    pub results: Vec<HealthCheckLog>,
}

// --- Uploads ---

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "cover.png")]
    pub filename: String,
    /// The MIME type the upload is constrained to.
    #[schema(example = "image/png")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub resource_key: String,
}

/// SuccessResponse
///
/// Minimal acknowledgement used by the reorder endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// --- Boundary validation helpers ---

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Slugs are lowercase ASCII words joined by single hyphens.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug.len() <= 120
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(
            "slug must contain only lowercase letters, digits and single hyphens",
        ))
    }
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::validation("email is not a valid address"))
    }
}

fn validate_range(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> AppResult<()> {
    if ends_at < starts_at {
        return Err(AppError::validation("endsAt must not be before startsAt"));
    }
    Ok(())
}

fn validate_elements(elements: &serde_json::Value) -> AppResult<()> {
    if !elements.is_array() {
        return Err(AppError::validation("elements must be an array"));
    }
    Ok(())
}

// Present-but-null deserializes to Some(None); absence is handled by #[serde(default)].
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("hello-world-2").is_ok());
        assert!(validate_slug("Hello").is_err());
        assert!(validate_slug("-lead").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("me@example.com").is_ok());
        assert!(validate_email("me@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("plain").is_err());
    }

    #[test]
    fn note_update_distinguishes_null_from_absent() {
        let absent: UpdateNoteRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.folder_id, None);

        let null: UpdateNoteRequest = serde_json::from_str(r#"{"folderId":null}"#).unwrap();
        assert_eq!(null.folder_id, Some(None));

        let id = Uuid::from_u128(7);
        let set: UpdateNoteRequest =
            serde_json::from_str(&format!(r#"{{"folderId":"{id}"}}"#)).unwrap();
        assert_eq!(set.folder_id, Some(Some(id)));
    }

    #[test]
    fn event_update_rejects_backwards_range() {
        let start = Utc::now();
        let mut event = Event {
            starts_at: start,
            ends_at: start + chrono::Duration::hours(1),
            ..Event::default()
        };
        let update = UpdateEventRequest {
            ends_at: Some(start - chrono::Duration::hours(1)),
            ..UpdateEventRequest::default()
        };
        assert!(update.apply(&mut event).is_err());
        assert_eq!(event.ends_at, start + chrono::Duration::hours(1));
    }

    #[test]
    fn resource_url_must_be_http() {
        let ok = CreateResourceRequest {
            name: "site".into(),
            url: "https://example.com/health".into(),
        };
        assert!(ok.validate().is_ok());
        let bad = CreateResourceRequest {
            name: "site".into(),
            url: "ftp://example.com".into(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn health_log_uses_camel_case_keys() {
        let json = serde_json::to_value(HealthCheckLog::default()).unwrap();
        assert!(json.get("isHealthy").is_some());
        assert!(json.get("responseTimeMs").is_some());
        assert!(json.get("resourceId").is_some());
    }
}
