use storefront_api::{
    catalog::slugify,
    config::AppConfig,
    db::{create_pool, migrate},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    migrate(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin1234").await?;
    ensure_admin(&pool, admin_id, "Store Admin").await?;
    let user_id = ensure_user(&pool, "customer@example.com", "customer1234").await?;
    seed_products(&pool).await?;
    seed_order(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
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

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn ensure_admin(pool: &sqlx::PgPool, user_id: Uuid, full_name: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO admins (id, full_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET full_name = EXCLUDED.full_name
        "#,
    )
    .bind(user_id)
    .bind(full_name)
    .execute(pool)
    .await?;
    println!("Allow-listed admin {user_id}");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Custom Tee", "R427.42", "T-Shirts", &["S", "M", "L"][..]),
        ("Classic Print", "R399.00", "T-Shirts", &["M", "L", "XL"][..]),
        ("Village Hoodie", "R899.99", "Hoodies", &["M", "L"][..]),
        ("Long Sleeve Logo", "R549.50", "Long Sleeve", &["S", "M"][..]),
    ];

    for (name, price, category, sizes) in products {
        let slug = slugify(name);
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            continue;
        }
        let sizes: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO products (id, slug, name, price, category, soldout, availablesizes)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .bind(price)
        .bind(category)
        .bind(sizes)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_order(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = serde_json::json!([
        { "id": "custom-tee", "name": "Custom Tee", "price": 100, "quantity": 2, "imageurl": "" },
        { "id": "classic-print", "name": "Classic Print", "price": 50, "quantity": 1, "imageurl": "" }
    ]);
    sqlx::query(
        r#"
        INSERT INTO orders (order_id, status, customer_name, email, phone, shipping_method, shipping_address, items)
        VALUES ('ORD123', 'pending', 'Thandi Mokoena', 'thandi@example.com', '0820000000', 'delivery', '12 Long Street, Cape Town', $1)
        ON CONFLICT (order_id) DO NOTHING
        "#,
    )
    .bind(items)
    .execute(pool)
    .await?;
    println!("Seeded sample order ORD123");
    Ok(())
}
