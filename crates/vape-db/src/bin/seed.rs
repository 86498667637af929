//! # Seed Data Generator
//!
//! Populates the database with a demo assortment for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./vape_dev.db
//! cargo run -p vape-db --bin seed
//!
//! # Specify database path
//! cargo run -p vape-db --bin seed -- --db ./data/vape.db
//! ```
//!
//! ## Generated Products
//! - Liquids: one product per brand and bottle size, 3-5 flavors each
//! - Cartridges and nicoboosters: one product per brand
//!
//! Prices are in whole hryvnias; the purchase price is 55% of the sale price
//! and the seller gets 10%.

use std::env;

use vape_core::{Flavor, Money, ProductKind, ProductSpec, StockSpec};
use vape_db::{Database, DbConfig};

/// Liquid brands with their flavors and a base 30 ml price.
const LIQUIDS: &[(&str, &[&str], i64)] = &[
    ("Elf Liq", &["Mint", "Grape", "Blue Razz", "Watermelon"], 350),
    ("Chaser", &["Cherry", "Lemon", "Energy", "Cola", "Mango"], 300),
    ("Lucky", &["Pineapple", "Strawberry", "Ice Tea"], 280),
    ("Рідина Хмара", &["Ягоди", "Кавун", "М'ята"], 250),
];

const CARTRIDGES: &[(&str, i64)] = &[("Vaporesso XROS 0.6", 180), ("Voopoo PnP", 150), ("Smok Nord", 160)];

const NICOBOOSTERS: &[(&str, i64)] = &[("Booster 20 mg", 40), ("Booster Salt 50 mg", 45)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vape_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vape POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vape_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vape POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list(None).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (seed, spec) in demo_specs().iter().enumerate() {
        if let Err(e) = db.products().insert(spec).await {
            eprintln!("Failed to insert {} #{}: {}", spec.brand, seed, e);
            continue;
        }
        generated += 1;
    }

    let ledger = db.ledger().refresh_total().await?;

    println!();
    println!("✓ Generated {} products", generated);
    println!("  Stock value: {} грн", ledger.total);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn spec(kind: ProductKind, brand: &str, sale_hryvnias: i64, stock: StockSpec) -> ProductSpec {
    let sale_price = Money::from_hryvnias(sale_hryvnias);
    ProductSpec {
        kind,
        brand: brand.to_string(),
        purchase_price: Money::from_kopecks(sale_price.kopecks() * 55 / 100),
        sale_price,
        seller_amount: Money::from_kopecks(sale_price.kopecks() / 10),
        image_url: format!("/images/demo/{}.jpg", brand.to_lowercase().replace(' ', "-")),
        stock,
    }
}

/// Builds the demo assortment deterministically.
fn demo_specs() -> Vec<ProductSpec> {
    let mut specs = Vec::new();

    for (brand_idx, (brand, flavors, base_price)) in LIQUIDS.iter().enumerate() {
        for (size_idx, volume_ml) in [15_i64, 30].into_iter().enumerate() {
            let price = if volume_ml == 30 { *base_price } else { base_price * 6 / 10 };
            let flavors = flavors
                .iter()
                .enumerate()
                .map(|(flavor_idx, name)| Flavor::new(*name, 1 + ((brand_idx + size_idx + flavor_idx) % 6) as i64))
                .collect();
            specs.push(spec(
                ProductKind::Liquids,
                brand,
                price,
                StockSpec::Flavors { volume_ml, flavors },
            ));
        }
    }

    for (idx, (brand, price)) in CARTRIDGES.iter().enumerate() {
        specs.push(spec(ProductKind::Cartridges, brand, *price, StockSpec::Units(4 + idx as i64 * 3)));
    }

    for (idx, (brand, price)) in NICOBOOSTERS.iter().enumerate() {
        specs.push(spec(ProductKind::Nicoboosters, brand, *price, StockSpec::Units(10 + idx as i64 * 5)));
    }

    specs
}
