//! One-shot commands - a single action, printed, then exit

use clap::Args;

use crate::cli::console::render_keys;
use crate::infrastructure::services::{ActionOutcome, ConsoleService};

/// Operator credentials for commands that need a session
#[derive(Args, Clone, Debug)]
pub struct AuthArgs {
    /// Admin username
    #[arg(long, short, env = "NMS_CONSOLE_USERNAME")]
    pub username: String,

    /// Admin password
    #[arg(long, short, env = "NMS_CONSOLE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Check backend health and print the message
pub async fn health(service: ConsoleService) -> anyhow::Result<()> {
    let outcome = service.check_health().await;
    let state = service.snapshot();

    match (outcome, state.health) {
        (ActionOutcome::Succeeded, Some(message)) => {
            println!("{}", message);
            Ok(())
        }
        _ => Err(last_log_error(&service)),
    }
}

/// Log in and print the key table
pub async fn keys(service: ConsoleService, auth: AuthArgs) -> anyhow::Result<()> {
    login(&service, auth).await?;

    let state = service.snapshot();
    print!("{}", render_keys(&state));
    Ok(())
}

/// Log in, run the proxy test and print the response
pub async fn proxy(service: ConsoleService, auth: AuthArgs) -> anyhow::Result<()> {
    login(&service, auth).await?;

    if !service.test_proxy().await.is_success() {
        return Err(last_log_error(&service));
    }

    if let Some(response) = service.snapshot().proxy_response {
        println!("{}", response);
    }
    Ok(())
}

async fn login(service: &ConsoleService, auth: AuthArgs) -> anyhow::Result<()> {
    let outcome = service.login(auth.username, auth.password).await;

    if !outcome.is_success() || !service.is_authenticated() {
        return Err(last_log_error(service));
    }
    Ok(())
}

fn last_log_error(service: &ConsoleService) -> anyhow::Error {
    let message = service
        .snapshot()
        .log
        .latest()
        .map(|entry| entry.message.clone())
        .unwrap_or_else(|| "action failed".to_string());
    anyhow::anyhow!(message)
}
