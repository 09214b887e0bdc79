/// Router Module Index
///
/// Splits the HTTP surface by who may call it. Access control is attached per module
/// in `create_router`, so a route cannot end up unguarded by being registered in the
/// wrong place.

/// Anonymous routes: the public site reads plus the contact form and comments.
pub mod public;

/// Dashboard routes, all behind the admin session guard.
pub mod admin;

/// Scheduler endpoints authenticated with per-job bearer tokens.
pub mod jobs;
