use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Payment;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub order_id: Uuid,
    pub charge_reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfirmed {
    pub payment: Payment,
    pub message: String,
}
