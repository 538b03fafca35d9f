//! intake-cli — terminal chat front-end for the Intake interview server
//!
//! Talks to `intake-server` over its HTTP chat API. The server owns the
//! session; this binary only renders views and forwards what the user types.
//!
//! # Subcommands
//! - `chat`    — interactive interview in the terminal
//! - `summary` — print the current view (prompt or summary) once
//! - `retake`  — clear the session on the server
//! - `status`  — show server health

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";

/// Typed at the prompt to restart the form.
const RETAKE_COMMAND: &str = ":retake";
/// Typed at the prompt to leave the chat.
const QUIT_COMMAND: &str = ":quit";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "intake-cli",
    version,
    about = "Intake interview chat — terminal front-end"
)]
struct Cli {
    /// Intake HTTP server URL (overrides INTAKE_HTTP_URL env var)
    #[arg(long, env = "INTAKE_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer the interview questions interactively
    Chat,

    /// Print the current prompt or the final summary
    Summary,

    /// Clear all answers and start the form again
    Retake,

    /// Show Intake server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

/// One user/bot exchange from the transcript
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub bot: String,
}

/// One answered field in the summary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

/// The view returned by every /session endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionView {
    Asking {
        prompt: String,
        position: usize,
        total: usize,
        transcript: Vec<Exchange>,
    },
    Summary {
        entries: Vec<SummaryLine>,
        saved: bool,
        transcript: Vec<Exchange>,
    },
}

impl SessionView {
    pub fn transcript(&self) -> &[Exchange] {
        match self {
            SessionView::Asking { transcript, .. } | SessionView::Summary { transcript, .. } => {
                transcript
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Result of POST /session/answer
#[derive(Debug)]
pub enum AnswerOutcome {
    View(SessionView),
    /// The server refused the answer (4xx/5xx) with this message.
    Refused { status: u16, error: String },
}

// ============================================================================
// Rendering
// ============================================================================

/// Prompt line, e.g. `[2/9] How old are you?`
pub fn render_prompt(position: usize, total: usize, prompt: &str) -> String {
    format!("[{}/{}] {}", position + 1, total, prompt)
}

/// Summary block shown once the form is complete.
pub fn render_summary(entries: &[SummaryLine], saved: bool) -> String {
    let mut out = String::new();
    if saved {
        out.push_str("✅ Your responses have been saved successfully!\n");
    } else {
        out.push_str("⚠️  Your responses could not be saved.\n");
    }
    out.push_str("\n📋 Your Responses:\n");
    for entry in entries {
        out.push_str(&format!("- {}: {}\n", entry.label, entry.value));
    }
    out
}

/// Bot reply to the most recent answer, if there is one.
pub fn latest_reply(view: &SessionView) -> Option<&str> {
    view.transcript().last().map(|e| e.bot.as_str())
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

struct IntakeClient {
    http: reqwest::blocking::Client,
    server: String,
}

impl IntakeClient {
    fn new(server: &str) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            server: server.to_string(),
        })
    }

    fn session(&self) -> anyhow::Result<SessionView> {
        let url = format!("{}/session", self.server);
        let resp = self.http.get(&url).send()?;
        if !resp.status().is_success() {
            anyhow::bail!("server returned {}", resp.status());
        }
        Ok(resp.json()?)
    }

    fn answer(&self, text: &str) -> anyhow::Result<AnswerOutcome> {
        let url = format!("{}/session/answer", self.server);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()?;

        let status = resp.status();
        if status.is_success() {
            return Ok(AnswerOutcome::View(resp.json()?));
        }

        let body = resp.text().unwrap_or_default();
        let error = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Ok(AnswerOutcome::Refused {
            status: status.as_u16(),
            error,
        })
    }

    fn retake(&self) -> anyhow::Result<SessionView> {
        let url = format!("{}/session/retake", self.server);
        let resp = self.http.post(&url).send()?;
        if !resp.status().is_success() {
            anyhow::bail!("server returned {}", resp.status());
        }
        Ok(resp.json()?)
    }
}

fn print_view(view: &SessionView) {
    match view {
        SessionView::Asking {
            prompt,
            position,
            total,
            ..
        } => println!("\n{}", render_prompt(*position, *total, prompt)),
        SessionView::Summary { entries, saved, .. } => {
            println!("\n{}", render_summary(entries, *saved))
        }
    }
}

/// Run the interview loop until the user quits or declines a retake.
fn do_chat(client: &IntakeClient) -> anyhow::Result<()> {
    println!("💬 Hiring Chatbot");
    println!("Talk to the hiring assistant below ({RETAKE_COMMAND} restarts, {QUIT_COMMAND} exits).");

    let mut view = client.session()?;
    for exchange in view.transcript() {
        println!("> {}\n{}", exchange.user, exchange.bot);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_view(&view);

        if let SessionView::Summary { .. } = view {
            print!("🔄 Retake the form? [y/N] ");
            std::io::stdout().flush()?;
            let reply = match lines.next() {
                Some(line) => line?,
                None => return Ok(()),
            };
            if !reply.trim().eq_ignore_ascii_case("y") {
                return Ok(());
            }
            view = client.retake()?;
            continue;
        }

        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        let input = line.trim_end_matches(['\r', '\n']);

        if input == QUIT_COMMAND {
            return Ok(());
        }
        if input == RETAKE_COMMAND {
            view = client.retake()?;
            continue;
        }
        if input.is_empty() {
            continue;
        }

        match client.answer(input)? {
            AnswerOutcome::View(next) => {
                if let Some(reply) = latest_reply(&next) {
                    println!("{reply}");
                }
                view = next;
            }
            AnswerOutcome::Refused { status, error } => {
                eprintln!("intake-cli: server refused answer ({status}): {error}");
                view = client.session()?;
            }
        }
    }
}

fn do_summary(client: &IntakeClient) -> anyhow::Result<()> {
    let view = client.session()?;
    print_view(&view);
    Ok(())
}

fn do_retake(client: &IntakeClient) -> anyhow::Result<()> {
    let view = client.retake()?;
    println!("Session cleared.");
    print_view(&view);
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    let resp = client.get(&url).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Intake server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Questions:     {}", body["questions"].as_u64().unwrap_or(0));
            println!("Complete:      {}", body["complete"].as_bool().unwrap_or(false));
            println!("Classifier:    {}", body["classifier"].as_str().unwrap_or("?"));
            println!("Output:        {}", body["output"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            let status = r.status();
            eprintln!("intake-cli: server unhealthy (HTTP {})", status);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("intake-cli: cannot reach {} — {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Chat => IntakeClient::new(&server).and_then(|c| do_chat(&c)),
        Commands::Summary => IntakeClient::new(&server).and_then(|c| do_summary(&c)),
        Commands::Retake => IntakeClient::new(&server).and_then(|c| do_retake(&c)),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("intake-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
