use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::{
        MessageResponse,
        cart::{AddToCartRequest, CartItemDetail, CartView, UpdateCartItemRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
};

pub async fn cart_view(pool: &DbPool, user: &AuthUser) -> AppResult<CartView> {
    let items = sqlx::query_as::<_, CartItemDetail>(
        r#"
        SELECT ci.id, ci.user_id, ci.product_id, ci.quantity,
               ci.created_at, ci.updated_at,
               p.name, p.price, p.image_url
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let total: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();

    Ok(CartView { items, total })
}

/// Add a product to the cart, merging into the existing row when the user
/// already has one for that product. This merge is what keeps
/// (user_id, product_id) unique; the table carries no constraint for it.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<CartItem> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".into()));
    }

    let product: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND available = TRUE")
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;

    let cart_item = if let Some(item) = existing {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = quantity + $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user.user_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user.user_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "quantity": payload.quantity
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(cart_item)
}

pub async fn update_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<CartItem> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".into()));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        UPDATE cart_items
        SET quantity = $3, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_optional(pool)
    .await?;

    match item {
        Some(item) => Ok(item),
        None => Err(AppError::NotFound),
    }
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<MessageResponse> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(MessageResponse::new("Item removed from cart"))
}

pub async fn clear_cart(pool: &DbPool, user: &AuthUser) -> AppResult<MessageResponse> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(MessageResponse::new("Cart cleared"))
}
