use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use moneta_rs::{initialize_db, local_date_today, recurring::process_recurring_transactions};

/// Materialize due recurring transactions once and exit.
///
/// Intended to be run from cron once a day. Running it more than once on the
/// same day creates no duplicate transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The canonical timezone name used to decide what "today" is, e.g.
    /// "Pacific/Auckland".
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Run for this date (YYYY-MM-DD) instead of today.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();

    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("Could not open database.");
    initialize_db(&connection).expect("Could not initialize database.");

    let run_date = match args.date {
        Some(date) => date,
        None => local_date_today(&args.timezone).expect("Could not resolve the timezone."),
    };

    match process_recurring_transactions(run_date, &connection) {
        Ok(count) => {
            println!("Created {count} transactions for {run_date}.");
        }
        Err(error) => {
            eprintln!("Processing run for {run_date} failed: {error}");
            exit(1);
        }
    }
}

fn parse_date(text: &str) -> Result<Date, String> {
    let parts: Vec<&str> = text.split('-').collect();

    let [year, month, day] = parts.as_slice() else {
        return Err(format!("'{text}' is not a date in the format YYYY-MM-DD"));
    };

    let year: i32 = year
        .parse()
        .map_err(|_| format!("'{year}' is not a valid year"))?;
    let month: u8 = month
        .parse()
        .map_err(|_| format!("'{month}' is not a valid month"))?;
    let day: u8 = day
        .parse()
        .map_err(|_| format!("'{day}' is not a valid day"))?;

    let month = Month::try_from(month).map_err(|error| error.to_string())?;

    Date::from_calendar_date(year, month, day).map_err(|error| error.to_string())
}
