use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month};

use moneta_rs::{
    budget::{BudgetPeriod, NewBudget, create_budget},
    category::get_categories_for_user,
    initialize_db,
    recurring::{Frequency, NewRecurringTransaction, create_recurring_transaction},
    transaction::{NewTransaction, TransactionType, create_transaction},
    user::create_user,
};

/// A utility for creating a test database for the REST API server of moneta_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user...");
    let user = create_user("Demo User", "demo@example.com".parse()?, &connection)?;

    let categories = get_categories_for_user(user.id, &connection)?;
    let category_id = |name: &str| -> i64 {
        categories
            .iter()
            .find(|category| category.name.as_ref() == name)
            .unwrap_or_else(|| panic!("missing default category {name}"))
            .id
    };

    let salary = category_id("Salary");
    let groceries = category_id("Groceries");
    let rent = category_id("Rent");
    let eating_out = category_id("Eating Out");
    let entertainment = category_id("Entertainment");

    println!("Creating test transactions...");
    let start = Date::from_calendar_date(2024, Month::January, 1)?;
    let end = Date::from_calendar_date(2024, Month::June, 30)?;

    let mut date = start;
    while date <= end {
        if date.day() == 1 {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    transaction_type: TransactionType::Income,
                    amount: 4200.0,
                    date,
                    description: "Monthly salary".to_string(),
                    category_id: salary,
                    notes: None,
                },
                &connection,
            )?;
        }

        // A weekly shop every Saturday, dinner out every second Friday.
        match date.weekday() {
            time::Weekday::Saturday => {
                create_transaction(
                    NewTransaction {
                        user_id: user.id,
                        transaction_type: TransactionType::Expense,
                        amount: 90.0 + (date.day() % 7) as f64 * 8.5,
                        date,
                        description: "Supermarket".to_string(),
                        category_id: groceries,
                        notes: None,
                    },
                    &connection,
                )?;
            }
            time::Weekday::Friday if date.iso_week() % 2 == 0 => {
                create_transaction(
                    NewTransaction {
                        user_id: user.id,
                        transaction_type: TransactionType::Expense,
                        amount: 45.0,
                        date,
                        description: "Dinner out".to_string(),
                        category_id: eating_out,
                        notes: None,
                    },
                    &connection,
                )?;
            }
            _ => {}
        }

        date += Duration::days(1);
    }

    println!("Creating test budgets...");
    create_budget(
        NewBudget {
            user_id: user.id,
            category_id: groceries,
            amount: 550.0,
            period: BudgetPeriod::Monthly,
        },
        &connection,
    )?;
    create_budget(
        NewBudget {
            user_id: user.id,
            category_id: entertainment,
            amount: 120.0,
            period: BudgetPeriod::Monthly,
        },
        &connection,
    )?;

    println!("Creating test recurring transactions...");
    create_recurring_transaction(
        NewRecurringTransaction {
            user_id: user.id,
            category_id: rent,
            transaction_type: TransactionType::Expense,
            amount: 1800.0,
            description: "Rent".to_string(),
            notes: None,
            frequency: Frequency::Monthly,
            start_date: start,
            end_date: None,
            day_of_week: None,
            day_of_month: Some(1),
            is_active: true,
        },
        &connection,
    )?;
    create_recurring_transaction(
        NewRecurringTransaction {
            user_id: user.id,
            category_id: entertainment,
            transaction_type: TransactionType::Expense,
            amount: 17.99,
            description: "Streaming subscription".to_string(),
            notes: Some("cancel before the price goes up again".to_string()),
            frequency: Frequency::Monthly,
            start_date: start,
            end_date: None,
            day_of_week: None,
            day_of_month: Some(15),
            is_active: true,
        },
        &connection,
    )?;
    create_recurring_transaction(
        NewRecurringTransaction {
            user_id: user.id,
            category_id: salary,
            transaction_type: TransactionType::Income,
            amount: 4200.0,
            description: "Salary".to_string(),
            notes: None,
            frequency: Frequency::Monthly,
            start_date: Date::from_calendar_date(2024, Month::July, 1)?,
            end_date: None,
            day_of_week: None,
            day_of_month: Some(1),
            is_active: true,
        },
        &connection,
    )?;

    println!("Success!");

    Ok(())
}
