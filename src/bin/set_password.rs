//! Sets the log-in password, creating the user on first use.

use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use fintrack::{PasswordHash, UserID, ValidatedPassword, initialize_db, set_user_password};

/// A utility for setting the password used to log in to fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. Created if it does not exist.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let Some(password_hash) = get_new_password_hash() else {
        return Ok(());
    };

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;
    set_user_password(UserID::new(1), password_hash, &connection)?;

    println!("Password set successfully!");

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    let has_extension = db_path
        .extension()
        .is_some_and(|extension| !extension.is_empty());

    if !has_extension {
        print_error("Database path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }
}

fn prompt(message: &str) -> Option<String> {
    match rpassword::prompt_password(message) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn get_new_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = prompt("Enter a new password: ")?;

        let validated = match ValidatedPassword::new(&first_password) {
            Ok(validated) => validated,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = prompt("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash password: {error}. Try again.")),
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
