//! HTTP route handlers.

pub mod courses;
pub mod database;
pub mod health;
pub mod metrics;

use serde::Serialize;
use utoipa::ToSchema;

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
