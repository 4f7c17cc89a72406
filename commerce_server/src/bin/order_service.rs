use commerce_server::{cli::handle_command_line_args, config::OrderServiceConfig, server::run_order_server};
use dotenvy::dotenv;
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = OrderServiceConfig::from_env_or_default();

    info!("🚀️ Starting order service on {}:{}", config.host, config.port);
    match run_order_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
