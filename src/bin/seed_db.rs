use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use serde_json::json;

use expense_tracker::{ExpensePayload, create_expense, initialize_db};

/// A utility for creating a database filled with sample expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Sample expenses as (amount, category, date, merchant).
const SAMPLE_EXPENSES: [(f64, &str, &str, &str); 8] = [
    (25000.0, "Makanan & Minuman", "2024-03-01", "Warung Padang"),
    (15000.0, "Transportasi", "2024-03-02", "Gojek"),
    (350000.0, "Tagihan", "2024-03-05", "PLN"),
    (120000.0, "Belanja", "2024-03-09", "Indomaret"),
    (75000.0, "Kesehatan", "2024-03-14", "Apotek"),
    (60000.0, "Hiburan", "2024-03-22", "Bioskop"),
    (200000.0, "Pendidikan", "2024-04-01", "Gramedia"),
    (10000.0, "Lainnya", "2024-04-03", "Parkir"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'expenses.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'expenses.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Adding {} sample expenses...", SAMPLE_EXPENSES.len());

    for (amount, category, date, merchant) in SAMPLE_EXPENSES {
        let expense = ExpensePayload {
            amount: json!(amount),
            category: Some(category.to_owned()),
            date: Some(date.to_owned()),
            merchant: Some(merchant.to_owned()),
            ..Default::default()
        }
        .validate()?;

        create_expense(expense, &conn)?;
    }

    println!("Success!");

    Ok(())
}
