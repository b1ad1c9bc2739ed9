use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    db::DbPool, error::AppResult, models::Product, routes::params::ProductQuery,
    services::product_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route("/categories/all", get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Available products, newest first", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(pool): State<DbPool>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product_service::list_products(&pool, query).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let product = product_service::get_product(&pool, id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/api/products/categories/all",
    responses(
        (status = 200, description = "Distinct product categories", body = Vec<String>)
    ),
    tag = "Products"
)]
pub async fn list_categories(State(pool): State<DbPool>) -> AppResult<Json<Vec<String>>> {
    let categories = product_service::list_categories(&pool).await?;
    Ok(Json(categories))
}
