use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::Product,
    routes::params::ProductQuery,
};

/// Storefront listing: only available products, newest first.
pub async fn list_products(pool: &DbPool, query: ProductQuery) -> AppResult<Vec<Product>> {
    let (_, limit, offset) = query.pagination().normalize();

    let products = match query.category.as_ref().filter(|c| !c.is_empty()) {
        Some(category) => {
            sqlx::query_as::<_, Product>(
                r#"
                SELECT * FROM products
                WHERE available = TRUE AND category = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Product>(
                r#"
                SELECT * FROM products
                WHERE available = TRUE
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(products)
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match product {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_categories(pool: &DbPool) -> AppResult<Vec<String>> {
    let categories: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}
