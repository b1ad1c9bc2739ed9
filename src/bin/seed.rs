use plantry_api::{config::AppConfig, db::create_pool};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@plantry.example", "Plantry Admin", "admin").await?;
    let user_id = ensure_user(&pool, "user@plantry.example", "Demo Customer", "user").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, full_name, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(full_name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        (
            "Morning Ritual Green",
            "juices",
            "14.00",
            "Fresh cold-pressed green juice with organic kale, cucumber, celery, and lemon",
            "Kale, Cucumber, Celery, Lemon",
            40,
        ),
        (
            "Ancient Grain Bowl",
            "bowls",
            "22.00",
            "Nourishing grain bowl with quinoa, roasted root vegetables, and tahini dressing",
            "Quinoa, Roasted Root Veg, Tahini",
            35,
        ),
        (
            "Stone-Ground Almond Butter",
            "pantry",
            "18.00",
            "Organic almond butter ground in-house with just a touch of sea salt",
            "Organic Heirloom Almonds, Sea Salt",
            50,
        ),
        (
            "Sunrise Turmeric Latte",
            "juices",
            "12.00",
            "Golden milk made with organic turmeric, ginger, coconut milk, and warming spices",
            "Turmeric, Ginger, Coconut Milk, Cinnamon",
            45,
        ),
        (
            "Cold Brew Coffee",
            "juices",
            "6.00",
            "Small batch cold brew made from shade-grown, single-origin beans",
            "Organic Cold Brew Coffee",
            60,
        ),
        (
            "Organic Granola Blend",
            "pantry",
            "16.00",
            "House-made granola with organic oats, nuts, seeds, and dried fruit",
            "Organic Oats, Almonds, Walnuts, Dried Coconut, Maple Syrup",
            55,
        ),
    ];

    for (name, category, price, description, ingredients, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (name, category, price, description, ingredients, stock, available)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(price.parse::<Decimal>()?)
        .bind(description)
        .bind(ingredients)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
