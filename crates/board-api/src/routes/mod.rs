//! Route definitions
//!
//! API routes are mounted under /api; health probes sit at the root.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{auth, bans, boards, health, posts, threads, users};
use crate::state::AppState;

/// Create the main API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", api_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(board_routes())
        .merge(thread_routes())
        .merge(ban_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/current",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route("/users/forgot-password", post(users::forgot_password))
        .route("/users/reset-password", post(users::reset_password))
        .route(
            "/users/:username",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

fn board_routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/boards/:label",
            get(boards::get_board)
                .put(boards::update_board)
                .delete(boards::delete_board),
        )
        .route(
            "/boards/:label/posts/:number",
            delete(posts::delete_post),
        )
}

fn thread_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/boards/:label/threads",
            get(threads::list_threads).post(threads::create_thread),
        )
        .route("/boards/:label/threads/:number", get(threads::get_thread))
        .route(
            "/boards/:label/threads/:number/replies",
            get(threads::list_replies).post(threads::create_reply),
        )
        .route("/boards/:label/threads/:number/lock", patch(threads::set_locked))
        .route("/boards/:label/threads/:number/sticky", patch(threads::set_stickied))
}

fn ban_routes() -> Router<AppState> {
    Router::new()
        .route("/bans", get(bans::list_bans).post(bans::create_ban))
        .route("/bans/current", get(bans::get_current_ban))
        .route("/bans/:id", get(bans::get_ban).put(bans::update_ban))
        .route("/bans/:id/unban", put(bans::unban))
}
