use clap::Parser;
use nms_sentinel_console::cli::{self, Cli, Command};
use nms_sentinel_console::infrastructure::logging;
use nms_sentinel_console::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    logging::init_logging(&logging::LoggingConfig::from(&config.logging));

    let service = nms_sentinel_console::create_console_service_with_config(&config)?;

    match cli.command.unwrap_or(Command::Console) {
        Command::Console => cli::console::run(&config, service).await,
        Command::Health => cli::oneshot::health(service).await,
        Command::Keys(auth) => cli::oneshot::keys(service, auth).await,
        Command::Proxy(auth) => cli::oneshot::proxy(service, auth).await,
    }
}
