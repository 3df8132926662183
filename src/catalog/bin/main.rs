use lambda_http::{run, Error};
use tracing::{error, info};
use book_manager::catalog::controller::app;
use book_manager::core::controller::AppState;
use book_manager::core::domain::Configuration;
use book_manager::utils::ddb::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/images-test.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let config = Configuration::from_env().map_err(|err| {
        error!("invalid configuration: {}", err);
        Error::from(err.to_string())
    })?;
    if config.env == "dev" {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
    }
    info!(env = config.env.as_str(), store = %config.store, ownership = %config.ownership_via, "starting book manager");

    let state = AppState::new(config).await;
    run(app(state)).await
}
