//! # Seed Data Generator
//!
//! Populates the database with a catalog and two staff accounts for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p caja-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p caja-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p caja-db --bin seed -- --db ./data/caja.db
//! ```
//!
//! ## Generated Data
//! - One category per entry in [`CATALOG`]
//! - Products named `{product} {size}`, with prices in whole pesos
//! - Users `admin` (admin) and `vendedor` (seller), ids 1 and 2 on a fresh
//!   database
//!
//! Sale prices include tax; about a third of purchase prices do not.

use anyhow::Context;
use caja_core::Role;
use caja_db::migrations::migration_status;
use caja_db::{Database, DbConfig, NewProduct};
use std::env;

/// Categories and the products stocked in each.
const CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Bebidas",
        &[
            ("Coca-Cola", "Coca-Cola"),
            ("Coca-Cola Zero", "Coca-Cola"),
            ("Fanta", "Coca-Cola"),
            ("Sprite", "Coca-Cola"),
            ("Pepsi", "CCU"),
            ("Bilz", "CCU"),
            ("Pap", "CCU"),
            ("Agua Cachantun", "CCU"),
            ("Agua Benedictino", "Coca-Cola"),
            ("Jugo Watt's Naranja", "Watt's"),
        ],
    ),
    (
        "Lácteos",
        &[
            ("Leche Entera", "Colun"),
            ("Leche Descremada", "Colun"),
            ("Yogur Frutilla", "Soprole"),
            ("Mantequilla", "Colun"),
            ("Queso Gauda", "Soprole"),
            ("Manjar", "Nestlé"),
        ],
    ),
    (
        "Despensa",
        &[
            ("Arroz Grado 1", "Tucapel"),
            ("Fideos Spaghetti", "Carozzi"),
            ("Fideos Corbata", "Lucchetti"),
            ("Azúcar", "Iansa"),
            ("Aceite Maravilla", "Belmont"),
            ("Harina", "Selecta"),
            ("Té", "Supremo"),
            ("Café Instantáneo", "Nescafé"),
            ("Sal", "Lobos"),
        ],
    ),
    (
        "Snacks",
        &[
            ("Papas Fritas", "Lay's"),
            ("Ramitas", "Evercrisp"),
            ("Super 8", "Nestlé"),
            ("Galletas Tritón", "McKay"),
            ("Chocolate Sahne-Nuss", "Nestlé"),
        ],
    ),
];

/// Size variants and what each adds to the base price.
const SIZES: &[(&str, i64)] = &[
    ("Chico", 0),
    ("Mediano", 300),
    ("Grande", 700),
    ("Familiar", 1200),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./caja_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caja POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./caja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Caja POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({applied}/{total})");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (username, full_name, role) in [
        ("admin", "Administrador", Role::Admin),
        ("vendedor", "Vendedor", Role::Seller),
    ] {
        if db.users().get_by_username(username).await?.is_none() {
            db.users()
                .insert(username, full_name, role)
                .await
                .with_context(|| format!("creating user {username}"))?;
            println!("✓ Created user {username}");
        }
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'catalog: for (category_name, products) in CATALOG {
        let category = db
            .categories()
            .insert(category_name)
            .await
            .with_context(|| format!("creating category {category_name}"))?;

        for (product_idx, (name, brand)) in products.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'catalog;
                }

                let product = generate_product(
                    category.id,
                    name,
                    brand,
                    size,
                    *price_addon,
                    category.id as usize * 100 + product_idx * 10 + size_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    println!();
    println!("Verifying search...");
    let results = db.products().search("coca").await?;
    println!("  Search 'coca': {} results", results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one product with deterministic prices and stock.
fn generate_product(
    category_id: i64,
    name: &str,
    brand: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    // base 590 - 2.580 pesos, rounded to tens
    let base_price = 590 + ((seed * 37) % 200) as i64 * 10;
    let sale_price = base_price + price_addon;

    // purchase at 55-75% of the shelf price
    let cost_pct = 55 + (seed % 21) as i64;
    let purchase_price = sale_price * cost_pct / 100;

    NewProduct {
        name: format!("{} {}", name, size),
        brand: brand.to_string(),
        category_id: Some(category_id),
        description: None,
        purchase_price,
        is_purchase_with_tax: seed % 3 != 0,
        sale_price,
        is_sale_with_tax: true,
        // 0 - 60, so a few products start sold out
        stock: (seed % 61) as i64,
    }
}
