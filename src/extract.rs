// src/extract.rs
use axum::extract::FromRequest;
use crate::error::AppError;

/// `axum::Json` whose rejections are reported as `AppError` JSON bodies
/// instead of axum's plain-text 415/422 responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
