use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    state::AppState,
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    artist: &'static str,
    price: i64,
    discount_price: Option<Decimal>,
    stock: i32,
    colors: &'static [&'static str],
}

const APPAREL_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    let state = AppState::new(pool);
    run_migrations(&state.orm).await?;

    seed_products(&state.pool).await?;
    seed_coupons(&state.pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        SeedProduct {
            name: "Midnight Tour Hoodie",
            slug: "midnight-tour-hoodie",
            artist: "Nova Lights",
            price: 5500,
            discount_price: Some(Decimal::new(4500, 2)),
            stock: 12,
            colors: &["Black:#111111", "Navy:#1a1a2e"],
        },
        SeedProduct {
            name: "Echo Tee",
            slug: "echo-tee",
            artist: "The Resonants",
            price: 2500,
            discount_price: None,
            stock: 40,
            colors: &["White:#ffffff", "Sand:#d8c8a8"],
        },
        SeedProduct {
            name: "Static Bomber",
            slug: "static-bomber",
            artist: "Nova Lights",
            price: 12000,
            discount_price: None,
            stock: 0,
            colors: &["Olive:#556b2f"],
        },
    ];

    let sale_ends = Utc::now() + Duration::days(14);
    for product in products {
        let sizes: Vec<String> = APPAREL_SIZES.iter().map(|s| s.to_string()).collect();
        let colors: Vec<String> = product.colors.iter().map(|c| c.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, slug, description, price, discount_price, discount_end_date,
                 stock, sizes, colors, images, artist)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.slug)
        .bind(format!("{} official merch", product.artist))
        .bind(product.price)
        .bind(product.discount_price)
        .bind(product.discount_price.map(|_| sale_ends))
        .bind(product.stock)
        .bind(sizes)
        .bind(colors)
        .bind(Vec::<String>::new())
        .bind(product.artist)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupons(pool: &DbPool) -> anyhow::Result<()> {
    // (code, description, type, value, min purchase, max uses)
    let coupons: [(&str, Option<&str>, &str, i64, i64, Option<i32>); 3] = [
        ("WELCOME10", Some("10% off your first order"), "percentage", 10, 0, None),
        ("SAVE5", None, "fixed", 500, 3000, None),
        ("VIP20", None, "percentage", 20, 5000, Some(100)),
    ];

    for (code, description, discount_type, value, min_purchase, max_uses) in coupons {
        sqlx::query(
            r#"
            INSERT INTO coupons
                (id, code, description, discount_type, discount_value, min_purchase, max_uses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(description)
        .bind(discount_type)
        .bind(value)
        .bind(min_purchase)
        .bind(max_uses)
        .execute(pool)
        .await?;
    }

    println!("Seeded coupons");
    Ok(())
}
