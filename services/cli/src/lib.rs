mod cli;
mod demo;
mod infra;

use credit_lens::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
