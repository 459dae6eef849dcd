//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as [`ApiError`] JSON bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
