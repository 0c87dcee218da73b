use std::io::{self, BufRead, Write};

use clap::{Arg, ArgAction, Command};
use tracing::info;

use crate::core::{parse_query, suggestions, TravelAgent};
use crate::services::{BackendClient, CandidateFetcher};

/// CLI entry point for the raahi-agent tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("raahi-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based travel assistant for the RAAHI booking platform")
        .arg(
            Arg::new("message")
                .help("Message to send; omit to start an interactive chat")
                .index(1),
        )
        .arg(
            Arg::new("backend-url")
                .short('u')
                .long("backend-url")
                .value_name("URL")
                .help("Booking backend base URL (or set BACKEND_URL / BACKEND_API_URL env vars)"),
        )
        .arg(
            Arg::new("conversation")
                .short('c')
                .long("conversation")
                .value_name("ID")
                .help("Conversation id used for context tracking")
                .default_value("cli"),
        )
        .arg(
            Arg::new("parse-only")
                .long("parse-only")
                .action(ArgAction::SetTrue)
                .help("Print the parsed query as JSON without calling the backend"),
        )
        .get_matches();

    let conversation = matches.get_one::<String>("conversation").unwrap().clone();

    if matches.get_flag("parse-only") {
        let message = matches
            .get_one::<String>("message")
            .ok_or("A message is required with --parse-only")?;
        let parsed = parse_query(message);
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    // Resolve backend URL from CLI or environment
    let backend_url = matches
        .get_one::<String>("backend-url")
        .cloned()
        .or_else(|| std::env::var("BACKEND_URL").ok())
        .or_else(|| std::env::var("BACKEND_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    let client = BackendClient::new(backend_url)?;
    info!("Using backend: {}", client.base_url());

    let agent = TravelAgent::new(client);
    agent.sessions().start_sweep();

    match matches.get_one::<String>("message") {
        Some(message) => respond(&agent, message, &conversation).await,
        None => chat_loop(&agent, &conversation).await?,
    }

    agent.sessions().stop_sweep();
    Ok(())
}

async fn chat_loop<F: CandidateFetcher>(
    agent: &TravelAgent<F>,
    conversation: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("RAAHI travel assistant. Type 'exit' to leave.");

    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let message = line.trim();

        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        respond(agent, message, conversation).await;
    }

    Ok(())
}

async fn respond<F: CandidateFetcher>(agent: &TravelAgent<F>, message: &str, conversation: &str) {
    let outcome = agent.handle_query(message, conversation).await;

    println!("\n{}\n", outcome.response);

    if let Some(error) = &outcome.error {
        eprintln!("(pipeline error: {error})");
    }

    let chips = suggestions(&outcome.parsed_query, outcome.parsed_query.language);
    if !chips.is_empty() {
        println!("Try: {}", chips.join(" | "));
    }
}
