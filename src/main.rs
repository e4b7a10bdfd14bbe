// src/main.rs
#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = vocalis_cli::config::init_config_manager() {
        eprintln!("Configuration initialization failed: {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = vocalis_cli::cli::run().await;
    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
