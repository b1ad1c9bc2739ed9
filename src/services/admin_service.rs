use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::{
        admin::{AdminOrderDetail, CustomerInfo, DashboardStats, UpdateOrderStatusRequest},
        orders::OrderItemDetail,
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, Payment, Product},
    routes::params::OrderListQuery,
};

pub async fn list_all_orders(
    pool: &DbPool,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<Vec<Order>> {
    ensure_admin(user)?;
    let (_, limit, offset) = query.pagination().normalize();

    let orders = match query.status.as_ref().filter(|s| !s.is_empty()) {
        Some(status) => {
            sqlx::query_as::<_, Order>(
                r#"
                SELECT * FROM orders
                WHERE status = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Order>(
                "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(orders)
}

pub async fn get_order_admin(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<AdminOrderDetail> {
    ensure_admin(user)?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
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

    let customer = sqlx::query_as::<_, CustomerInfo>(
        "SELECT id, email, full_name, phone FROM users WHERE id = $1",
    )
    .bind(order.user_id)
    .fetch_optional(pool)
    .await?;

    Ok(AdminOrderDetail {
        order,
        items,
        payment,
        customer,
    })
}

/// Set an order's status. The value must name a known lifecycle state;
/// transitions between states are admin-driven and not otherwise constrained.
pub async fn update_order_status(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<Order> {
    ensure_admin(user)?;

    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;

    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = $1, updated_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "order_status_updated",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": status.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(order)
}

pub async fn create_product(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name and price required".into()));
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, ingredients, price,
                              category, image_url, stock, available)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.ingredients)
    .bind(payload.price)
    .bind(&payload.category)
    .bind(&payload.image_url)
    .bind(payload.stock.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            ingredients = COALESCE($4, ingredients),
            price = COALESCE($5, price),
            category = COALESCE($6, category),
            image_url = COALESCE($7, image_url),
            stock = COALESCE($8, stock),
            available = COALESCE($9, available),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.ingredients)
    .bind(payload.price)
    .bind(&payload.category)
    .bind(&payload.image_url)
    .bind(payload.stock)
    .bind(payload.available)
    .fetch_optional(pool)
    .await?;

    match product {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

pub async fn dashboard_stats(pool: &DbPool, user: &AuthUser) -> AppResult<DashboardStats> {
    ensure_admin(user)?;

    let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    let total_revenue: Option<rust_decimal::Decimal> = sqlx::query_scalar(
        "SELECT SUM(total_amount) FROM orders WHERE payment_status = 'paid'",
    )
    .fetch_one(pool)
    .await?;

    let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_orders,
        total_revenue: total_revenue.unwrap_or_default(),
        total_products,
        total_users,
    })
}
