mod cli;
mod commands;
mod snapshot;

use menu_diet::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
