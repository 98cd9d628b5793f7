//! Response envelope shared by the JSON handlers.
//!
//! Entities and lists are returned as `{ "data": ... }`; errors use the
//! `{ "error", "code" }` body produced by [`crate::error::AppError`].

use axum::Json;
use serde::Serialize;

/// Standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Wrap `data` in the envelope.
pub fn data<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}
