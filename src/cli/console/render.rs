//! Text rendering of the console state

use std::fmt::Write;

use crate::domain::{Action, ApiKeyRecord, ConsoleState};

/// Render the full console view. At most `log_lines` log entries are shown.
pub fn render(state: &ConsoleState, log_lines: usize) -> String {
    let mut out = String::new();

    let session = if state.is_authenticated() {
        "logged in"
    } else {
        "logged out"
    };
    let _ = writeln!(out, "== NMSSentinel Console == [{}]", session);

    let busy: Vec<&str> = Action::ALL
        .iter()
        .filter(|a| state.loading.is_loading(**a))
        .map(|a| a.as_str())
        .collect();
    if !busy.is_empty() {
        let _ = writeln!(out, "In progress: {}", busy.join(", "));
    }

    if state.is_authenticated() {
        if let Some(health) = &state.health {
            let _ = writeln!(out, "\nSystem health: {}", health);
        }

        out.push('\n');
        out.push_str(&render_keys(state));

        if let Some(response) = &state.proxy_response {
            let _ = writeln!(out, "\nProxy response:");
            for line in response.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
    } else {
        let _ = writeln!(out, "\nLog in with: login <username> <password>");
    }

    out.push('\n');
    out.push_str(&render_logs(state, log_lines));
    out
}

/// Key table; hidden keys show only their preview
pub fn render_keys(state: &ConsoleState) -> String {
    let mut out = String::new();

    if state.api_keys.is_empty() {
        let _ = writeln!(out, "No API keys found. Create one with: create <name>");
        return out;
    }

    let rows: Vec<[String; 4]> = state
        .api_keys
        .iter()
        .map(|k| {
            [
                k.id.to_string(),
                k.name.clone(),
                key_cell(state, k),
                k.created_display(),
            ]
        })
        .collect();

    let headers = ["ID", "NAME", "KEY", "CREATED"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let _ = writeln!(out, "API keys ({}):", state.api_keys.len());
    let _ = writeln!(out, "  {}", format_row(&headers.map(String::from), &widths));
    for row in &rows {
        let _ = writeln!(out, "  {}", format_row(row, &widths));
    }

    out
}

/// Log entries, most recent first; `limit` of zero shows everything
pub fn render_logs(state: &ConsoleState, limit: usize) -> String {
    let mut out = String::new();

    if state.log.is_empty() {
        let _ = writeln!(out, "No logs yet. Actions will appear here.");
        return out;
    }

    let limit = if limit == 0 { state.log.len() } else { limit };
    let _ = writeln!(out, "Logs:");
    for entry in state.log.entries().take(limit) {
        let _ = writeln!(out, "  {}", entry);
    }

    out
}

fn key_cell(state: &ConsoleState, key: &ApiKeyRecord) -> String {
    if state.visibility.is_visible(&key.id) {
        key.key.clone()
    } else {
        key.masked_key()
    }
}

fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
