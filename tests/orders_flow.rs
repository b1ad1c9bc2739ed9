use plantry_api::{
    db::{DbPool, create_pool},
    dto::{
        admin::UpdateOrderStatusRequest,
        cart::AddToCartRequest,
        orders::CreateOrderRequest,
        payment::ConfirmPaymentRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_service, cart_service, order_service, payment_service},
};
use rust_decimal::Decimal;
use uuid::Uuid;

// Each test seeds its own user and products so the suite can run in parallel
// against a shared database.

async fn setup_pool() -> Option<DbPool> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return None;
        }
    };

    let pool = create_pool(&database_url).await.expect("connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
    Some(pool)
}

async fn create_user(pool: &DbPool, role: &str) -> AuthUser {
    let email = format!("{}-{}@plantry.example", role, Uuid::new_v4());
    let (user_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (email, full_name, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind("Test User")
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("insert user");

    AuthUser {
        user_id,
        role: role.into(),
    }
}

async fn create_product(pool: &DbPool, price: &str, stock: i32) -> Uuid {
    let name = format!("Test Product {}", Uuid::new_v4());
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (name, description, price, category, stock, available)
        VALUES ($1, 'test product', $2, 'test', $3, TRUE)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(price.parse::<Decimal>().unwrap())
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("insert product");
    id
}

async fn user_order_count(pool: &DbPool, user: &AuthUser) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await
        .expect("count orders")
}

async fn user_cart_count(pool: &DbPool, user: &AuthUser) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await
        .expect("count cart")
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn create_order_totals_cart_and_empties_it() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let juice = create_product(&pool, "14.00", 40).await;
    let almond_butter = create_product(&pool, "18.00", 50).await;

    cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: juice,
            quantity: 2,
        },
    )
    .await
    .expect("add juice");
    cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: almond_butter,
            quantity: 1,
        },
    )
    .await
    .expect("add almond butter");

    let created = order_service::create_order(
        &pool,
        &user,
        CreateOrderRequest {
            shipping_address: "123 Green Street".into(),
            billing_address: "123 Green Street".into(),
            notes: None,
        },
    )
    .await
    .expect("create order");

    // 14.00 * 2 + 18.00 * 1
    assert_eq!(created.order.total_amount, dec("46.00"));
    assert_eq!(created.order.status, "placed");
    assert_eq!(created.order.payment_status, "pending");
    assert!(created.order.order_number.starts_with("ORD-"));
    assert_eq!(created.message, "Order created successfully");

    assert_eq!(user_cart_count(&pool, &user).await, 0);
    assert_eq!(user_order_count(&pool, &user).await, 1);

    let detail = order_service::get_order(&pool, &user, created.order.id)
        .await
        .expect("get order");
    assert_eq!(detail.items.len(), 2);
    assert!(detail.payment.is_none());

    // The persisted total must equal the sum over the snapshotted items.
    let item_sum: Decimal = detail
        .items
        .iter()
        .map(|item| item.price_at_purchase * Decimal::from(item.quantity))
        .sum();
    assert_eq!(item_sum, detail.order.total_amount);
}

#[tokio::test]
async fn empty_cart_is_rejected_with_no_side_effects() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;

    let err = order_service::create_order(
        &pool,
        &user,
        CreateOrderRequest {
            shipping_address: "nowhere".into(),
            billing_address: "nowhere".into(),
            notes: None,
        },
    )
    .await
    .expect_err("empty cart must fail");

    assert!(matches!(err, AppError::EmptyCart));
    assert_eq!(err.to_string(), "Cart is empty");
    assert_eq!(user_order_count(&pool, &user).await, 0);
    assert_eq!(user_cart_count(&pool, &user).await, 0);
}

#[tokio::test]
async fn price_at_purchase_survives_catalog_price_change() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let product = create_product(&pool, "14.00", 40).await;

    cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: product,
            quantity: 2,
        },
    )
    .await
    .expect("add to cart");

    let created = order_service::create_order(
        &pool,
        &user,
        CreateOrderRequest {
            shipping_address: "123 Green Street".into(),
            billing_address: "123 Green Street".into(),
            notes: Some("leave at door".into()),
        },
    )
    .await
    .expect("create order");

    sqlx::query("UPDATE products SET price = $1 WHERE id = $2")
        .bind(dec("99.00"))
        .bind(product)
        .execute(&pool)
        .await
        .expect("reprice product");

    let detail = order_service::get_order(&pool, &user, created.order.id)
        .await
        .expect("get order");
    assert_eq!(detail.items[0].price_at_purchase, dec("14.00"));
    assert_eq!(detail.order.total_amount, dec("28.00"));
}

#[tokio::test]
async fn failed_item_insert_rolls_back_the_whole_order() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let product = create_product(&pool, "14.00", 40).await;

    // A zero quantity slips past the cart API only via direct SQL; the
    // order_items CHECK constraint then fails after the order row has been
    // inserted, which must roll everything back.
    sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, 0)")
        .bind(user.user_id)
        .bind(product)
        .execute(&pool)
        .await
        .expect("insert bad cart row");

    let err = order_service::create_order(
        &pool,
        &user,
        CreateOrderRequest {
            shipping_address: "123 Green Street".into(),
            billing_address: "123 Green Street".into(),
            notes: None,
        },
    )
    .await
    .expect_err("constraint violation must fail the order");

    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(user_order_count(&pool, &user).await, 0, "no partial order");
    assert_eq!(user_cart_count(&pool, &user).await, 1, "cart untouched");
}

#[tokio::test]
async fn concurrent_creations_for_one_user_yield_a_single_order() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let product = create_product(&pool, "12.00", 45).await;

    cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: product,
            quantity: 1,
        },
    )
    .await
    .expect("add to cart");

    let request = || CreateOrderRequest {
        shipping_address: "123 Green Street".into(),
        billing_address: "123 Green Street".into(),
        notes: None,
    };

    // Both creations read the same cart; the FOR UPDATE lock serializes them,
    // so the loser sees the emptied cart instead of placing a duplicate.
    let (first, second) = tokio::join!(
        order_service::create_order(&pool, &user, request()),
        order_service::create_order(&pool, &user, request()),
    );

    let loser = match (first, second) {
        (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => {
            assert_eq!(won.order.total_amount, dec("12.00"));
            lost
        }
        (Ok(_), Ok(_)) => panic!("both creations committed an order"),
        (Err(_), Err(_)) => panic!("no creation committed an order"),
    };
    assert!(matches!(loser, AppError::EmptyCart));

    assert_eq!(user_order_count(&pool, &user).await, 1);
    assert_eq!(user_cart_count(&pool, &user).await, 0);
}

#[tokio::test]
async fn merge_on_add_keeps_one_row_per_product() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let product = create_product(&pool, "6.00", 60).await;

    let first = cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: product,
            quantity: 1,
        },
    )
    .await
    .expect("first add");
    let second = cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: product,
            quantity: 2,
        },
    )
    .await
    .expect("second add");

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 3);
    assert_eq!(user_cart_count(&pool, &user).await, 1);

    let view = cart_service::cart_view(&pool, &user).await.expect("view");
    assert_eq!(view.total, dec("18.00"));
}

#[tokio::test]
async fn payment_confirmation_and_admin_status_flow() {
    let Some(pool) = setup_pool().await else { return };
    let user = create_user(&pool, "user").await;
    let admin = create_user(&pool, "admin").await;
    let product = create_product(&pool, "22.00", 35).await;

    cart_service::add_to_cart(
        &pool,
        &user,
        AddToCartRequest {
            product_id: product,
            quantity: 1,
        },
    )
    .await
    .expect("add to cart");

    let created = order_service::create_order(
        &pool,
        &user,
        CreateOrderRequest {
            shipping_address: "456 Plant Avenue".into(),
            billing_address: "456 Plant Avenue".into(),
            notes: None,
        },
    )
    .await
    .expect("create order");

    let confirmed = payment_service::confirm_payment(
        &pool,
        &user,
        ConfirmPaymentRequest {
            order_id: created.order.id,
            charge_reference: "ch_test_123".into(),
        },
    )
    .await
    .expect("confirm payment");
    assert_eq!(confirmed.payment.amount, dec("22.00"));
    assert_eq!(confirmed.payment.status, "completed");

    let detail = order_service::get_order(&pool, &user, created.order.id)
        .await
        .expect("get order");
    assert_eq!(detail.order.status, "confirmed");
    assert_eq!(detail.order.payment_status, "paid");

    // Double confirmation is rejected.
    let err = payment_service::confirm_payment(
        &pool,
        &user,
        ConfirmPaymentRequest {
            order_id: created.order.id,
            charge_reference: "ch_test_456".into(),
        },
    )
    .await
    .expect_err("already paid");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Admin walks the order through fulfilment.
    let shipped = admin_service::update_order_status(
        &pool,
        &admin,
        created.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await
    .expect("update status");
    assert_eq!(shipped.status, "shipped");

    // Unknown status values are rejected.
    let err = admin_service::update_order_status(
        &pool,
        &admin,
        created.order.id,
        UpdateOrderStatusRequest {
            status: "teleported".into(),
        },
    )
    .await
    .expect_err("invalid status");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Non-admins cannot touch admin endpoints.
    let err = admin_service::update_order_status(
        &pool,
        &user,
        created.order.id,
        UpdateOrderStatusRequest {
            status: "delivered".into(),
        },
    )
    .await
    .expect_err("forbidden");
    assert!(matches!(err, AppError::Forbidden));
}
