//! Console command parsing

use thiserror::Error;

use crate::domain::ApiKeyId;

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Login { username: String, password: String },
    Logout,
    Health,
    Keys,
    Create { name: String },
    Toggle { id: ApiKeyId },
    Copy { id: ApiKeyId },
    CopyProxy,
    Delete { id: ApiKeyId },
    Proxy,
    Logs,
    Status,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Commands:
  login <username> <password>   Log in and load API keys
  logout                        End the session
  health                        Check backend health
  keys                          Refresh the API key list
  create <name>                 Create an API key
  toggle <id>                   Show or hide a key
  copy <id>                     Copy a key to the clipboard
  copy-proxy                    Copy the last proxy response
  delete <id>                   Delete a key (not supported by the backend)
  proxy                         Run the NMS proxy test
  logs                          Show the full log
  status                        Redraw the console
  help                          Show this help
  quit                          Exit";

impl ConsoleCommand {
    /// Parse a line. Missing login or create arguments are passed through as
    /// empty strings so the console service reports them.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "login" => {
                let mut args = rest.split_whitespace();
                Self::Login {
                    username: args.next().unwrap_or_default().to_string(),
                    password: args.next().unwrap_or_default().to_string(),
                }
            }
            "logout" => Self::Logout,
            "health" => Self::Health,
            "keys" | "refresh" => Self::Keys,
            "create" => Self::Create {
                name: rest.to_string(),
            },
            "toggle" | "show" => Self::Toggle {
                id: require_id(rest, "toggle <id>")?,
            },
            "copy" => Self::Copy {
                id: require_id(rest, "copy <id>")?,
            },
            "copy-proxy" => Self::CopyProxy,
            "delete" => Self::Delete {
                id: require_id(rest, "delete <id>")?,
            },
            "proxy" => Self::Proxy,
            "logs" => Self::Logs,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn require_id(rest: &str, usage: &'static str) -> Result<ApiKeyId, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(ApiKeyId::parse(rest))
}
