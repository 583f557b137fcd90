mod cli;
mod demo;
mod infra;
mod report;
mod routes;
mod server;

use placement_analytics::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
