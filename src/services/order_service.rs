use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderCreated, OrderDetail, OrderItemDetail},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderStatus, Payment},
};

/// One cart row joined with the current catalog price, read inside the
/// order-creation transaction. `price` is what gets snapshotted into
/// `order_items.price_at_purchase`.
#[derive(Debug, sqlx::FromRow)]
struct CartLine {
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
}

/// Materialize the user's cart into an order.
///
/// The whole read-compute-write sequence runs in one transaction: cart rows
/// are read (locked with FOR UPDATE so a concurrent creation for the same
/// user serializes on them and sees an emptied cart instead of placing a
/// duplicate), the order and its line items are inserted with purchase-time
/// prices, and the cart is cleared. Any failure drops the transaction, so no
/// partial order is ever visible.
pub async fn create_order(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<OrderCreated> {
    let mut txn = pool.begin().await?;

    let lines: Vec<CartLine> = sqlx::query_as(
        r#"
        SELECT ci.product_id, ci.quantity, p.price
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        FOR UPDATE OF ci
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&mut *txn)
    .await?;

    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let total = compute_total(&lines);

    let order_id = Uuid::new_v4();
    let order_number = generate_order_number(order_id);

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (id, user_id, order_number, total_amount,
                            shipping_address, billing_address, notes, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(user.user_id)
    .bind(&order_number)
    .bind(total)
    .bind(&payload.shipping_address)
    .bind(&payload.billing_address)
    .bind(payload.notes.unwrap_or_default())
    .bind(OrderStatus::Placed.as_str())
    .fetch_one(&mut *txn)
    .await?;

    for line in &lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *txn)
        .await?;
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total_amount,
        "order created"
    );

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "order_created",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(OrderCreated {
        order,
        message: "Order created successfully".into(),
    })
}

pub async fn list_orders(pool: &DbPool, user: &AuthUser) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn get_order(pool: &DbPool, user: &AuthUser, id: Uuid) -> AppResult<OrderDetail> {
    let order =
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = sqlx::query_as::<_, OrderItemDetail>(
        r#"
        SELECT oi.*, p.name, p.category
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        "#,
    )
    .bind(order.id)
    .fetch_all(pool)
    .await?;

    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
        .bind(order.id)
        .fetch_optional(pool)
        .await?;

    Ok(OrderDetail {
        order,
        items,
        payment,
    })
}

/// Exact monetary sum over the cart, in Decimal.
fn compute_total(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum()
}

/// Human-readable order number. Collision resistance comes from the random
/// order id, not the date prefix; the UNIQUE constraint on orders.order_number
/// backs it up.
fn generate_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let id = order_id.simple().to_string();
    format!("ORD-{}-{}", date, &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            quantity,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn total_is_exact_for_two_decimal_prices() {
        // 14.00 * 2 + 18.00 * 1 = 46.00
        let lines = vec![line("14.00", 2), line("18.00", 1)];
        assert_eq!(compute_total(&lines), "46.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn total_does_not_drift_across_many_lines() {
        // 0.10 summed 1000 times is exactly 100.00 in Decimal.
        let lines: Vec<CartLine> = (0..1000).map(|_| line("0.10", 1)).collect();
        assert_eq!(compute_total(&lines), "100.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn order_number_embeds_date_and_id_prefix() {
        let id = Uuid::new_v4();
        let number = generate_order_number(id);
        let date = Utc::now().format("%Y%m%d").to_string();
        assert_eq!(number, format!("ORD-{}-{}", date, &id.simple().to_string()[..8]));
    }

    #[test]
    fn order_numbers_differ_for_distinct_orders() {
        assert_ne!(
            generate_order_number(Uuid::new_v4()),
            generate_order_number(Uuid::new_v4())
        );
    }
}
