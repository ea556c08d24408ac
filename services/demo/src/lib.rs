mod cli;
mod customers;
mod demo;
mod infra;

use privacy_suite::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
