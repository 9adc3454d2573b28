use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use huddle_api::{AppState, AppStateInner, channels, messages, reactions, search, threads, users};
use huddle_core::ChatService;
use huddle_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle=debug,tower_http=debug".into()),
        )
        .init();

    // Config — the store defaults to in-memory; point HUDDLE_DB_PATH at a
    // file to keep state across restarts (no durability promised).
    let db_path = std::env::var("HUDDLE_DB_PATH").unwrap_or_else(|_| ":memory:".into());
    let host = std::env::var("HUDDLE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HUDDLE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init store
    let db = if db_path == ":memory:" {
        Database::open_in_memory()?
    } else {
        Database::open(&PathBuf::from(&db_path))?
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        chat: ChatService::new(db),
    });

    // Routes
    let app = Router::new()
        .route("/channels", post(channels::create_channel))
        .route("/channels", get(channels::list_channels))
        .route("/channels/{channel_id}", delete(channels::delete_channel))
        .route("/channels/{channel_id}/read", post(channels::mark_channel_read))
        .route("/channels/{channel_id}/threads", post(threads::create_thread))
        .route("/channels/{channel_id}/threads", get(threads::list_threads))
        .route("/threads/{thread_id}/messages", post(messages::send_message))
        .route("/threads/{thread_id}/messages", get(messages::list_messages))
        .route("/messages/{message_id}/reactions", post(reactions::toggle_reaction))
        .route("/search", get(search::search))
        .route("/users", post(users::register_user))
        .route("/users", get(users::list_users))
        .route("/users/{user_id}/presence", patch(users::update_presence))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Huddle server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
