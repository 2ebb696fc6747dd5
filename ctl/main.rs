#![forbid(unsafe_code)]

//! `shift-sentinel-ctl` — local CLI companion for `shift-sentinel`.
//!
//! Sends requests to the running server's HTTP trigger surface and prints
//! the JSON responses. Designed for operators verifying delivery or
//! forcing a scan outside the periodic cadence.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "shift-sentinel-ctl",
    about = "Local CLI for the shift-sentinel server",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the running server.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dispatch a push notification.
    Dispatch {
        /// Target user id; repeat for multiple, or pass `*` to broadcast.
        #[arg(long = "recipient", required = true)]
        recipients: Vec<String>,
        /// Organization scope, required for broadcast.
        #[arg(long)]
        org: Option<String>,
        /// Notification title.
        #[arg(long)]
        title: String,
        /// Notification body.
        #[arg(long)]
        body: String,
        /// Optional category tag.
        #[arg(long)]
        category: Option<String>,
        /// Optional posting the notification refers to.
        #[arg(long)]
        posting: Option<String>,
    },

    /// Run one escalation scan immediately.
    Scan,

    /// Check server liveness.
    Health,
}

fn main() {
    let args = Cli::parse();

    let outcome = match &args.command {
        Command::Dispatch {
            recipients,
            org,
            title,
            body,
            category,
            posting,
        } => {
            let mut request = serde_json::json!({
                "recipients": recipients,
                "title": title,
                "body": body,
            });
            if let Some(org) = org {
                request["orgId"] = serde_json::Value::String(org.clone());
            }
            if let Some(category) = category {
                request["category"] = serde_json::Value::String(category.clone());
            }
            if let Some(posting) = posting {
                request["postingId"] = serde_json::Value::String(posting.clone());
            }
            post_json(&args.server, "/dispatch", Some(&request))
        }
        Command::Scan => post_json(&args.server, "/scan", None),
        Command::Health => get_text(&args.server, "/health"),
    };

    match outcome {
        Ok(response) => println!("{response}"),
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("Is shift-sentinel running at {}?", args.server);
            std::process::exit(1);
        }
    }
}

/// POST a JSON request and pretty-print the JSON response.
fn post_json(
    server: &str,
    path: &str,
    request: Option<&serde_json::Value>,
) -> std::result::Result<String, Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::new();
    let mut builder = client.post(format!("{server}{path}"));
    if let Some(request) = request {
        builder = builder.json(request);
    }
    let response: serde_json::Value = builder.send()?.error_for_status()?.json()?;
    Ok(serde_json::to_string_pretty(&response)?)
}

/// GET a plain-text endpoint.
fn get_text(server: &str, path: &str) -> std::result::Result<String, Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::new();
    Ok(client
        .get(format!("{server}{path}"))
        .send()?
        .error_for_status()?
        .text()?)
}
