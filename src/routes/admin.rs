use crate::{
    AppState,
    handlers::{
        api_keys, blog, calendar, contacts, inbox, kanban, notes, resources, timeline, uploads,
        whiteboards,
    },
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router Module
///
/// Every dashboard endpoint. `create_router` wraps this whole router in the
/// `require_admin` route layer, and the mutating handlers additionally take
/// `AdminSession`, so a request without a valid session never reaches storage.
///
/// The static `/reorder` and `/health-check` segments are registered alongside the
/// `{id}` captures; axum's router prefers the static match.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Blog ---
        .route("/blog/posts", get(blog::list_posts).post(blog::create_post))
        .route(
            "/blog/posts/{id}",
            get(blog::get_post)
                .put(blog::update_post)
                .delete(blog::delete_post),
        )
        .route("/blog/views", get(blog::list_views))
        .route("/blog/comments", get(blog::list_comments))
        .route(
            "/blog/comments/{id}",
            patch(blog::moderate_comment).delete(blog::delete_comment),
        )
        // --- Kanban ---
        .route(
            "/kanban/boards",
            get(kanban::list_boards).post(kanban::create_board),
        )
        .route(
            "/kanban/boards/{board_id}",
            get(kanban::get_board)
                .put(kanban::update_board)
                .delete(kanban::delete_board),
        )
        .route(
            "/kanban/boards/{board_id}/columns",
            post(kanban::create_column),
        )
        .route(
            "/kanban/boards/{board_id}/columns/reorder",
            patch(kanban::reorder_columns),
        )
        .route(
            "/kanban/boards/{board_id}/columns/{column_id}",
            put(kanban::update_column).delete(kanban::delete_column),
        )
        .route("/kanban/boards/{board_id}/cards", post(kanban::create_card))
        .route(
            "/kanban/boards/{board_id}/cards/reorder",
            patch(kanban::reorder_cards),
        )
        .route(
            "/kanban/boards/{board_id}/cards/{card_id}",
            put(kanban::update_card).delete(kanban::delete_card),
        )
        // --- Timeline ---
        .route(
            "/timeline",
            get(timeline::list_timeline).post(timeline::create_timeline_item),
        )
        .route("/timeline/reorder", patch(timeline::reorder_timeline))
        .route(
            "/timeline/{id}",
            put(timeline::update_timeline_item).delete(timeline::delete_timeline_item),
        )
        // --- Notes ---
        .route(
            "/notes/folders",
            get(notes::list_folders).post(notes::create_folder),
        )
        .route(
            "/notes/folders/{id}",
            put(notes::rename_folder).delete(notes::delete_folder),
        )
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // --- Contacts ---
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        // --- Inbox ---
        .route("/inbox/messages", get(inbox::list_messages))
        .route(
            "/inbox/messages/{id}",
            patch(inbox::mark_message).delete(inbox::delete_message),
        )
        .route(
            "/inbox/accounts",
            get(inbox::list_email_accounts).post(inbox::create_email_account),
        )
        .route(
            "/inbox/accounts/{id}",
            axum::routing::delete(inbox::delete_email_account),
        )
        // --- Calendar ---
        .route(
            "/calendar/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/calendar/events/{id}",
            get(calendar::get_event)
                .put(calendar::update_event)
                .delete(calendar::delete_event),
        )
        // --- Whiteboards ---
        .route(
            "/whiteboards",
            get(whiteboards::list_whiteboards).post(whiteboards::create_whiteboard),
        )
        .route(
            "/whiteboards/{slug}",
            get(whiteboards::get_whiteboard)
                .put(whiteboards::save_whiteboard)
                .delete(whiteboards::delete_whiteboard),
        )
        // --- API keys ---
        .route(
            "/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/api-keys/{id}",
            axum::routing::delete(api_keys::delete_api_key),
        )
        // --- Monitored resources ---
        .route(
            "/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            "/resources/health-check",
            post(resources::run_health_check),
        )
        .route(
            "/resources/{id}",
            axum::routing::delete(resources::delete_resource),
        )
        .route("/resources/{id}/logs", get(resources::list_resource_logs))
        // --- Uploads ---
        .route("/uploads/presigned", post(uploads::get_presigned_url))
}
