//! Console command - interactive operator console over stdin

mod command;
mod render;

pub use command::{CommandError, ConsoleCommand, HELP};
pub use render::{render, render_keys, render_logs};

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::services::ConsoleService;

/// What the read loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Run the interactive console until `quit`, EOF or Ctrl+C.
///
/// Commands run one at a time: the next line is read once the previous
/// command has finished. Concurrent actions are available through the
/// library API on cloned [`ConsoleService`] handles. Ctrl+C during a
/// running command abandons it and leaves the console.
pub async fn run(config: &AppConfig, service: ConsoleService) -> anyhow::Result<()> {
    let log_lines = config.console.log_lines;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render(&service.snapshot(), log_lines));
    println!("Type 'help' for a list of commands.");

    loop {
        prompt(&service)?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, leaving console");
                None
            }
        };

        let Some(line) = line else {
            break;
        };

        let flow = tokio::select! {
            flow = dispatch(&service, &line, log_lines) => flow,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, abandoning command");
                Flow::Quit
            }
        };

        match flow {
            Flow::Continue(output) => println!("{}", output),
            Flow::Quit => break,
        }
    }

    Ok(())
}

fn prompt(service: &ConsoleService) -> std::io::Result<()> {
    let marker = if service.is_authenticated() { "#" } else { ">" };
    let mut stdout = std::io::stdout();
    write!(stdout, "nms{} ", marker)?;
    stdout.flush()
}

/// Execute one line against the service and return what to print
pub async fn dispatch(service: &ConsoleService, line: &str, log_lines: usize) -> Flow {
    let command = match ConsoleCommand::parse(line) {
        Ok(command) => command,
        Err(e) => return Flow::Continue(e.to_string()),
    };

    match command {
        ConsoleCommand::Empty => return Flow::Continue(String::new()),
        ConsoleCommand::Quit => return Flow::Quit,
        ConsoleCommand::Help => return Flow::Continue(HELP.to_string()),
        ConsoleCommand::Logs => return Flow::Continue(render_logs(&service.snapshot(), 0)),
        ConsoleCommand::Status => {}
        ConsoleCommand::Login { username, password } => {
            service.login(username, password).await;
        }
        ConsoleCommand::Logout => service.logout(),
        ConsoleCommand::Health => {
            service.check_health().await;
        }
        ConsoleCommand::Keys => {
            service.fetch_keys().await;
        }
        ConsoleCommand::Create { name } => {
            service.create_key(name).await;
        }
        ConsoleCommand::Toggle { id } => {
            service.toggle_visibility(&id);
        }
        ConsoleCommand::Copy { id } => {
            let _ = service.copy_api_key(&id);
        }
        ConsoleCommand::CopyProxy => {
            let _ = service.copy_proxy_response();
        }
        ConsoleCommand::Delete { id } => service.delete_key(&id),
        ConsoleCommand::Proxy => {
            service.test_proxy().await;
        }
    }

    Flow::Continue(render(&service.snapshot(), log_lines))
}
