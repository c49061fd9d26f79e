//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` environment variables (reads .env).

use sqlx::PgPool;
use uuid::Uuid;

const DEMO_PASSWORD: &str = "Demo123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== Trellis CRM Seed Script ===");

    let user_id = seed_demo_user(&pool).await?;
    let product_ids = seed_products(&pool).await?;
    seed_leads(&pool, user_id).await?;
    let client_ids = seed_clients(&pool, user_id).await?;
    seed_purchases(&pool, user_id, &client_ids, &product_ids).await?;

    println!("\n=== Seed complete! ===");
    println!("Demo login: demo / {DEMO_PASSWORD}");

    Ok(())
}

async fn seed_demo_user(pool: &PgPool) -> anyhow::Result<Uuid> {
    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = 'demo'")
            .fetch_optional(pool)
            .await?;

    let hash = trellis::services::auth::hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(id) = existing {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&hash)
            .bind(id)
            .execute(pool)
            .await?;
        println!("[done] Updated demo password");
        return Ok(id);
    }

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, display_name)
         VALUES ('demo', 'demo@trellis.local', $1, 'Demo Account')
         RETURNING id",
    )
    .bind(&hash)
    .fetch_one(pool)
    .await?;

    println!("[done] Created demo user");
    Ok(id)
}

async fn seed_products(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Products already exist ({count})");
        let ids = sqlx::query_scalar("SELECT id FROM products ORDER BY name")
            .fetch_all(pool)
            .await?;
        return Ok(ids);
    }

    let products = vec![
        ("Starter Plan", "29.00", "Monthly subscription, single seat"),
        ("Team Plan", "99.00", "Monthly subscription, up to ten seats"),
        ("Onboarding Workshop", "450.00", "One-time remote onboarding session"),
    ];

    let mut ids = Vec::new();
    for (name, price, description) in products {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO products (name, net_price, description)
             VALUES ($1, $2::numeric, $3)
             RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(description)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }

    println!("[done] Created 3 sample products");
    Ok(ids)
}

async fn seed_leads(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE created_by = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Leads already exist ({count})");
        return Ok(());
    }

    // Spread creation dates over the past weeks so the charts have shape.
    let leads = vec![
        ("Ada", "Lovelace", "Analytical Engines", "New", "High", 2),
        ("Charles", "Babbage", "Analytical Engines", "Contacted", "Medium", 5),
        ("Grace", "Hopper", "Navy Systems", "Won", "High", 9),
        ("Alan", "Turing", "Bletchley Ltd", "Contacted", "Medium", 14),
        ("Margaret", "Hamilton", "Apollo Software", "Won", "High", 21),
        ("Edsger", "Dijkstra", "Structured Co", "Lost", "Low", 30),
        ("Donald", "Knuth", "TeX Press", "New", "Low", 45),
    ];

    for (first, last, company, status, priority, days_ago) in leads {
        sqlx::query(
            "INSERT INTO leads (first_name, last_name, company, email, status, priority,
                 created_by, created_at, modified_at)
             VALUES ($1, $2, $3, $4, $5::lead_status, $6::lead_priority, $7,
                 NOW() - make_interval(days => $8), NOW() - make_interval(days => $8))",
        )
        .bind(first)
        .bind(last)
        .bind(company)
        .bind(format!(
            "{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        ))
        .bind(status)
        .bind(priority)
        .bind(user_id)
        .bind(days_ago)
        .execute(pool)
        .await?;
    }

    println!("[done] Created 7 sample leads");
    Ok(())
}

async fn seed_clients(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE created_by = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Clients already exist ({count})");
        let ids = sqlx::query_scalar("SELECT id FROM clients WHERE created_by = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        return Ok(ids);
    }

    let clients = vec![
        ("Katherine", "Johnson", "Langley Research", 3),
        ("Dorothy", "Vaughan", "Langley Research", 12),
        ("Mary", "Jackson", "Langley Research", 26),
    ];

    let mut ids = Vec::new();
    for (first, last, company, days_ago) in clients {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO clients (first_name, last_name, company, email, created_by,
                 created_at, modified_at)
             VALUES ($1, $2, $3, $4, $5,
                 NOW() - make_interval(days => $6), NOW() - make_interval(days => $6))
             RETURNING id",
        )
        .bind(first)
        .bind(last)
        .bind(company)
        .bind(format!(
            "{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        ))
        .bind(user_id)
        .bind(days_ago)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }

    println!("[done] Created 3 sample clients");
    Ok(ids)
}

async fn seed_purchases(
    pool: &PgPool,
    user_id: Uuid,
    client_ids: &[Uuid],
    product_ids: &[Uuid],
) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE created_by = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Purchases already exist ({count})");
        return Ok(());
    }
    if client_ids.is_empty() || product_ids.is_empty() {
        println!("[skip] No clients or products to attach purchases to");
        return Ok(());
    }

    let purchases = vec![
        (0usize, 0usize, 2, 1),
        (0, 1, 1, 4),
        (1, 0, 3, 8),
        (1, 2, 1, 15),
        (2, 1, 2, 22),
    ];

    for (client_idx, product_idx, quantity, days_ago) in purchases {
        sqlx::query(
            "INSERT INTO purchases (client_id, product_id, quantity, created_by, created_at)
             VALUES ($1, $2, $3, $4, NOW() - make_interval(days => $5))",
        )
        .bind(client_ids[client_idx % client_ids.len()])
        .bind(product_ids[product_idx % product_ids.len()])
        .bind(quantity)
        .bind(user_id)
        .bind(days_ago)
        .execute(pool)
        .await?;
    }

    // Seeded rows bypass the purchase service, so bring the running
    // counters in line with what was just inserted.
    sqlx::query(
        "UPDATE products SET sold_quantity =
             (SELECT COALESCE(SUM(quantity), 0) FROM purchases WHERE product_id = products.id)",
    )
    .execute(pool)
    .await?;

    println!("[done] Created 5 sample purchases and synced sold quantities");
    Ok(())
}
