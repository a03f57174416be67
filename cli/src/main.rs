#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "logboard-cli", about = "Drive a running logboard service over HTTP")]
struct Cli {
    #[arg(long, env = "LOGBOARD_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Check that the service is up.
    Ping,
    /// Print the board snapshot and pending events.
    State,
    /// Re-read shared state; reconnects a degraded board.
    Refresh,
    /// Claim leadership for a user.
    Leader { user_id: i64 },
    /// Toggle edit focus for a user.
    Focus { user_id: i64 },
    /// Refocus whoever edited last.
    Resume,
    /// Scroll one user's pane vertically.
    Scroll { user_id: i64, offset: i64 },
    /// Load the next chunk of a user's rows.
    More { user_id: i64 },
    /// Move the user-selector strip.
    Horizontal { offset: i64 },
    /// Maximize the window.
    Maximize,
    /// Restore the window from maximized.
    Restore,
    /// Re-evaluate the fill policy after a resize.
    Resize,
}

/// Method, path, and optional JSON body for a board command. `Ping` has none.
fn route_for(command: &Command) -> Option<(Method, String, Option<Value>)> {
    let route = match command {
        Command::Ping => return None,
        Command::State => (Method::GET, "/api/board".to_owned(), None),
        Command::Refresh => (Method::POST, "/api/board/refresh".to_owned(), None),
        Command::Leader { user_id } => (Method::POST, format!("/api/leader/{user_id}"), None),
        Command::Focus { user_id } => (Method::POST, format!("/api/editor/{user_id}"), None),
        Command::Resume => (Method::POST, "/api/editor/resume".to_owned(), None),
        Command::Scroll { user_id, offset } => {
            (Method::POST, format!("/api/panes/{user_id}/scroll"), Some(json!({ "offset": offset })))
        }
        Command::More { user_id } => (Method::POST, format!("/api/panes/{user_id}/more"), None),
        Command::Horizontal { offset } => {
            (Method::PUT, "/api/scroll/horizontal".to_owned(), Some(json!({ "offset": offset })))
        }
        Command::Maximize => (Method::PUT, "/api/window".to_owned(), Some(json!({ "maximized": true }))),
        Command::Restore => (Method::PUT, "/api/window".to_owned(), Some(json!({ "maximized": false }))),
        Command::Resize => (Method::POST, "/api/window/resize".to_owned(), None),
    };
    Some(route)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match route_for(&cli.command) {
        None => run_ping(&base_url).await,
        Some((method, path, body)) => {
            let json = api_request(&base_url, method, &path, body).await?;
            print_json(&json)
        }
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(format!("{base_url}/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn api_request(base_url: &str, method: Method, path: &str, body: Option<Value>) -> Result<Value, CliError> {
    let request = reqwest::Client::new().request(method, format!("{base_url}{path}"));
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        return Err(CliError::ServerError { status: status.as_u16(), message: error_message(&text, status) });
    }
    Ok(response.json::<Value>().await?)
}

/// Render a failure body `{"error": {"code", "message"}}` as `CODE: message`,
/// falling back to the status reason when the body is not that shape.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|value| value.get("error"));
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_str);
    let message = error.and_then(|e| e.get("message")).and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_owned(),
        _ => status.canonical_reason().unwrap_or("request failed").to_owned(),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
