//! Sign in / sign out
//!
//! - GET  /login   login form (`?error=1` shows a failed attempt)
//! - POST /login   check credentials against the configured users
//! - GET  /logout  drop the session

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use ledgerdash_core::UserId;
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::{expired_session_cookie, session_cookie, session_token};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login page
pub async fn page_login(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    let error = if params.contains_key("error") {
        "<p class='mb-4 px-3 py-2 rounded-lg bg-red-50 text-red-700 text-sm'>Invalid username or password.</p>"
    } else {
        ""
    };

    let content = format!(
        r#"<div class='min-h-screen flex items-center justify-center'>
            <form method='post' action='/login' class='w-full max-w-sm bg-white rounded-xl shadow-sm border p-6'>
                <h1 class='text-2xl font-bold text-indigo-600 mb-6'>Ledgerdash</h1>
                {}
                <label class='block text-sm font-medium text-gray-700 mb-1' for='username'>Username</label>
                <input id='username' name='username' autocomplete='username' required
                       class='w-full px-3 py-2 border rounded-lg mb-4'>
                <label class='block text-sm font-medium text-gray-700 mb-1' for='password'>Password</label>
                <input id='password' name='password' type='password' autocomplete='current-password' required
                       class='w-full px-3 py-2 border rounded-lg mb-6'>
                <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Sign in</button>
            </form>
        </div>"#,
        error
    );
    Html(crate::base_html("Sign in", &content))
}

/// Handle a login attempt
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> impl IntoResponse {
    let Some(user) = state.config.authenticate(form.username.trim(), &form.password) else {
        log::warn!(target: "ledgerdash::auth", "Failed login for '{}'", form.username.trim());
        return Redirect::to("/login?error=1").into_response();
    };

    let token = state.sessions.create(UserId(user.id), &user.username).await;
    (
        [(header::SET_COOKIE, session_cookie(&token, state.sessions.ttl()))],
        Redirect::to("/dashboard"),
    )
        .into_response()
}

/// End the current session
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token).await;
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/login"),
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{AppState, SessionStore};
    use axum::http::{header, StatusCode};
    use chrono::Duration;

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let state = state().await;
        let response = post_form(&state, "/login", None, "username=alice&password=wonderland").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("ledgerdash_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=43200"));

        let pair = cookie.split(';').next().unwrap();
        let page = get(&state, "/dashboard", Some(pair)).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_text(page).await.contains("alice"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let state = state().await;
        let response = post_form(&state, "/login", None, "username=alice&password=nope").await;
        assert_eq!(location(&response), "/login?error=1");
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let page = get(&state, "/login?error=1", None).await;
        assert!(body_text(page).await.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_a_password() {
        let state = state().await;
        let hash = state.config.users[0].password_hash.clone();
        let body = format!("username=alice&password={}", urlencoding::encode(&hash));
        let response = post_form(&state, "/login", None, &body).await;
        assert_eq!(location(&response), "/login?error=1");
    }

    #[tokio::test]
    async fn test_expired_session_redirects_to_login() {
        let state = AppState {
            sessions: SessionStore::new(Duration::zero()),
            ..state().await
        };
        let response = post_form(&state, "/login", None, "username=alice&password=wonderland").await;
        assert_eq!(location(&response), "/dashboard");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.ends_with("Max-Age=0"));

        let pair = cookie.split(';').next().unwrap();
        let page = get(&state, "/dashboard", Some(pair)).await;
        assert_eq!(location(&page), "/login");
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let state = state().await;
        let cookie = login_as(&state, ALICE, "alice").await;
        let response = get(&state, "/logout", Some(&cookie)).await;
        assert_eq!(location(&response), "/login");

        let page = get(&state, "/dashboard", Some(&cookie)).await;
        assert_eq!(location(&page), "/login");
    }
}
