use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::payment::{ConfirmPaymentRequest, PaymentConfirmed},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    services::payment_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/confirm", post(confirm_payment))
        .route("/{order_id}", get(get_payment))
}

#[utoipa::path(
    post,
    path = "/api/payment/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded, order confirmed", body = PaymentConfirmed),
        (status = 400, description = "Order already paid"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn confirm_payment(
    State(pool): State<DbPool>,
    user: AuthUser,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<PaymentConfirmed>> {
    let confirmed = payment_service::confirm_payment(&pool, &user, payload).await?;
    Ok(Json(confirmed))
}

#[utoipa::path(
    get,
    path = "/api/payment/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Payment for the order", body = Payment),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn get_payment(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    let payment = payment_service::get_payment(&pool, &user, order_id).await?;
    Ok(Json(payment))
}
