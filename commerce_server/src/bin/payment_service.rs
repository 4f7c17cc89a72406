use commerce_server::{cli::handle_command_line_args, config::PaymentServiceConfig, server::run_payment_server};
use dotenvy::dotenv;
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = PaymentServiceConfig::from_env_or_default();

    info!("🚀️ Starting payment service on {}:{}", config.host, config.port);
    match run_payment_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
