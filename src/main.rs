use std::env;
use std::sync::Arc;

use sessiontron::config::{load_config, print_schema};
use sessiontron::startup;
use sessiontron::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    // `--schema` dumps the config JSON schema and exits.
    if env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = Arc::new(load_config());
    init_logging(&config.logging);

    if let Err(e) = startup::run(config).await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
