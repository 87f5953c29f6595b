//! Error types for ledgerdash-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use ledgerdash_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Login required")]
    LoginRequired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    Internal { message: String },
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::ValidationError { message } => ApiError::BadRequest { message },
            CoreError::NotFound { resource } => ApiError::NotFound { resource },
            CoreError::StoreError { message } => ApiError::Internal { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::LoginRequired => return Redirect::to("/login").into_response(),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { message } => {
                log::error!(target: "ledgerdash::api", "Request failed: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = format!(
            r#"<div class='max-w-md mx-auto mt-24 bg-white rounded-xl shadow-sm p-6 text-center'>
                <p class='text-4xl font-bold text-gray-300'>{}</p>
                <p class='mt-2 text-gray-600'>{}</p>
                <a href='/dashboard' class='inline-block mt-4 text-indigo-600 hover:underline'>Back to dashboard</a>
            </div>"#,
            status.as_u16(),
            ledgerdash_utils::escape_html(&self.to_string())
        );
        (status, Html(crate::base_html(status.canonical_reason().unwrap_or("Error"), &body))).into_response()
    }
}
