use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{
        MessageResponse,
        cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    services::cart_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", get(cart_view).delete(clear_cart))
        .route("/add", post(add_to_cart))
        .route("/{id}", put(update_cart_item).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart items with current prices and total", body = CartView),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_view(State(pool): State<DbPool>, user: AuthUser) -> AppResult<Json<CartView>> {
    let view = cart_service::cart_view(&pool, &user).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Added or merged into existing cart item", body = CartItem),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(pool): State<DbPool>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<CartItem>> {
    let item = cart_service::add_to_cart(&pool, &user, payload).await?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart item", body = CartItem),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartItem>> {
    let item = cart_service::update_cart_item(&pool, &user, id, payload).await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(pool): State<DbPool>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let resp = cart_service::remove_from_cart(&pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart cleared", body = MessageResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(pool): State<DbPool>,
    user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let resp = cart_service::clear_cart(&pool, &user).await?;
    Ok(Json(resp))
}
