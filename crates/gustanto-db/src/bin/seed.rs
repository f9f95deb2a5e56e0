//! # Seed Data Generator
//!
//! Fills a database with demo sales and expenses for development.
//!
//! ## Usage
//! ```bash
//! # Last 30 days (default)
//! cargo run -p gustanto-db --bin seed
//!
//! # Custom span and path
//! cargo run -p gustanto-db --bin seed -- --db ./gustanto_dev.db --days 60
//! ```
//!
//! ## Generated Data
//! For every day in the span, ending today:
//! - 4 to 11 orders of 1 to 3 cafe items, spread over opening hours
//! - 1 or 2 expenses (milk, gas, vegetables, ...)
//!
//! Values are derived from the day index, so the same span always
//! produces the same ledger.

use chrono::{Days, Local, NaiveDate, NaiveTime};
use gustanto_core::period::format_timestamp;
use gustanto_core::{NewExpense, NewOrder, OrderLine};
use gustanto_db::{Database, DbConfig};
use std::env;

/// Menu items and prices (minor units)
const MENU: &[(&str, i64)] = &[
    ("Filter Coffee", 40),
    ("Masala Chai", 25),
    ("Cold Coffee", 90),
    ("Veg Sandwich", 80),
    ("Paneer Puff", 35),
    ("Samosa", 20),
    ("Chocolate Brownie", 110),
    ("Lemon Soda", 45),
    ("Cappuccino", 120),
    ("Butter Croissant", 95),
];

/// Recurring expenses (description, base amount)
const EXPENSES: &[(&str, i64)] = &[
    ("Milk", 450),
    ("Vegetables", 300),
    ("Gas cylinder refill", 1100),
    ("Bakery supplies", 650),
    ("Cleaning supplies", 220),
    ("Coffee beans", 1800),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: u64 = 30;
    let mut db_path = String::from("./gustanto_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
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
                println!("Gustanto POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of history to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./gustanto_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Gustanto POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.sales().count().await? + db.expenses().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} ledger rows", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut orders = 0usize;
    let mut expenses = 0usize;
    let start = std::time::Instant::now();

    for offset in (0..days).rev() {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            continue;
        };
        let seed = offset as usize;

        for order in 0..(4 + seed * 7 % 8) {
            let new_order = generate_order(date, seed, order)?;
            db.sales().record_order(&new_order).await?;
            orders += 1;
        }

        for n in 0..(1 + seed % 2) {
            let (description, base) = EXPENSES[(seed * 5 + n) % EXPENSES.len()];
            let amount = base + ((seed * 13) % 10) as i64 * 10;
            let ts = at(date, 8, (n * 20) as u32);
            db.expenses()
                .insert(&NewExpense::new(amount, description, &ts)?)
                .await?;
            expenses += 1;
        }
    }

    println!();
    println!(
        "✓ Generated {} orders ({} sale rows) and {} expenses in {:?}",
        orders,
        db.sales().count().await?,
        expenses,
        start.elapsed()
    );
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds one order: 1 to 3 menu items at a time between 09:00 and 20:59.
fn generate_order(
    date: NaiveDate,
    seed: usize,
    order: usize,
) -> Result<NewOrder, Box<dyn std::error::Error>> {
    let mix = seed * 31 + order * 17;
    let lines: Vec<OrderLine> = (0..(1 + mix % 3))
        .map(|k| {
            let (name, price) = MENU[(mix + k * 3) % MENU.len()];
            OrderLine {
                name: name.to_string(),
                price,
            }
        })
        .collect();

    let hour = 9 + (mix % 12) as u32;
    let minute = ((order * 7 + seed) % 60) as u32;

    Ok(NewOrder::new(&lines, &at(date, hour, minute))?)
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> String {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    format_timestamp(date.and_time(time))
}
