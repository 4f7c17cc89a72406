use std::{env, env::VarError};

/// There's no real CLI for the services, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "SHOP_HOST",
        "SHOP_PORT",
        "SHOP_DATABASE_URL",
        "SHOP_REMOTE_TIMEOUT_MS",
        "SHOP_BROKER",
        "SHOP_KAFKA_BOOTSTRAP_SERVERS",
        "SHOP_KAFKA_GROUP_ID",
        "SHOP_CATALOG_URL",
        "SHOP_ACCOUNT_URL",
        "SHOP_EVENT_BUFFER_SIZE",
        "SHOP_INTERACTION_EVENTS_TOPIC",
        "SHOP_ORDER_SERVICE_URL",
        "SHOP_PRODUCT_EVENTS_TOPIC",
        "SHOP_PROVIDER_API_URL",
        "SHOP_PROVIDER_TEST_MODE",
        "SHOP_PROVIDER_CURRENCY",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
