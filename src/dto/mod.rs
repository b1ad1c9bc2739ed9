use serde::Serialize;
use utoipa::ToSchema;

pub mod admin;
pub mod cart;
pub mod orders;
pub mod payment;
pub mod products;

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
