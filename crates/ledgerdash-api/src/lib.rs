//! HTTP server for the ledgerdash dashboard
//!
//! Routes are organized into modules:
//! - routes::dashboard: dashboard page, form actions, edit form
//! - routes::reports: JSON report for the signed-in user
//! - routes::login: sign in and sign out
//!
//! Every gated handler takes a `CurrentUser`; user identity never comes from
//! the request body.

pub mod auth;
pub mod error;
pub mod routes;

use axum::response::Redirect;
use axum::{routing::get, Router};
use chrono::Duration;
use ledgerdash_config::Config;
use ledgerdash_core::{Decimal, Store};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use auth::{CurrentUser, Session, SessionStore};
pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let ttl = Duration::minutes(i64::from(config.server.session_ttl_minutes));
        Self {
            store,
            config: Arc::new(config),
            sessions: SessionStore::new(ttl),
        }
    }

    /// Format an amount with the configured currency settings
    pub fn money(&self, amount: Decimal) -> String {
        let currency = &self.config.currency;
        ledgerdash_utils::format_money(
            amount,
            &currency.symbol,
            currency.decimal_places,
            &currency.thousands_separator,
        )
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{dashboard_action, page_dashboard, page_edit_transaction};
    use routes::login::{login_submit, logout, page_login};
    use routes::reports::api_report;

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/report", get(api_report))
        // Pages
        .route("/", get(index_page))
        .route("/dashboard", get(page_dashboard).post(dashboard_action))
        .route("/dashboard/edit", get(page_edit_transaction))
        .route("/login", get(page_login).post(login_submit))
        .route("/logout", get(logout))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn index_page() -> Redirect {
    Redirect::to("/dashboard")
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Ledgerdash</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        ledgerdash_utils::escape_html(title),
        content
    )
}

/// Top bar with the signed-in user and sign-out link
pub fn top_nav(username: &str) -> String {
    format!(
        r#"<nav class='bg-white border-b'>
            <div class='max-w-6xl mx-auto px-4 py-3 flex items-center justify-between'>
                <a href='/dashboard' class='text-xl font-bold text-indigo-600'>Ledgerdash</a>
                <div class='flex items-center gap-4 text-sm'>
                    <span class='text-gray-500'>Signed in as <strong class='text-gray-800'>{}</strong></span>
                    <a href='/logout' class='px-3 py-1.5 border rounded-lg hover:bg-gray-50'>Log out</a>
                </div>
            </div>
        </nav>"#,
        ledgerdash_utils::escape_html(username)
    )
}

/// Full page for a signed-in user
pub fn page_response(user: &CurrentUser, title: &str, inner: &str) -> axum::response::Html<String> {
    let content = format!(
        "{}<main class='max-w-6xl mx-auto px-4 py-6 space-y-6'>{}</main>",
        top_nav(&user.username),
        inner
    );
    axum::response::Html(base_html(title, &content))
}

/// Start the HTTP server
pub async fn start_server(config: Config, store: Store) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, store);
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "ledgerdash::api", "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "ledgerdash::api", "Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!(target: "ledgerdash::api", "Shutting down");
}
