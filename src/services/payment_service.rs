use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::payment::{ConfirmPaymentRequest, PaymentConfirmed},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderStatus, Payment},
};

/// Record a charge confirmation against an already-created order and advance
/// it to confirmed/paid. The gateway interaction itself happened elsewhere;
/// this only consumes its reference.
pub async fn confirm_payment(
    pool: &DbPool,
    user: &AuthUser,
    payload: ConfirmPaymentRequest,
) -> AppResult<PaymentConfirmed> {
    let mut txn = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(payload.order_id)
    .bind(user.user_id)
    .fetch_optional(&mut *txn)
    .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let payment: Payment = sqlx::query_as(
        r#"
        INSERT INTO payments (order_id, charge_reference, amount, status, payment_method)
        VALUES ($1, $2, $3, 'completed', 'stripe')
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(&payload.charge_reference)
    .bind(order.total_amount)
    .fetch_one(&mut *txn)
    .await?;

    sqlx::query(
        "UPDATE orders SET payment_status = 'paid', status = $1, updated_at = now() WHERE id = $2",
    )
    .bind(OrderStatus::Confirmed.as_str())
    .bind(order.id)
    .execute(&mut *txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "payment_confirmed",
        Some("payments"),
        Some(serde_json::json!({ "order_id": order.id, "payment_id": payment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(PaymentConfirmed {
        payment,
        message: "Payment confirmed".into(),
    })
}

pub async fn get_payment(pool: &DbPool, user: &AuthUser, order_id: Uuid) -> AppResult<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.* FROM payments p
        JOIN orders o ON o.id = p.order_id
        WHERE p.order_id = $1 AND o.user_id = $2
        "#,
    )
    .bind(order_id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?;

    match payment {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}
