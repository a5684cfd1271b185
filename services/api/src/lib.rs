mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use loob_recruitment::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
