mod interrupt;
mod logging;
mod render;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use assistant_core::{try_parse, AssistantConfig, CallerContext, CallerRole};
use assistant_llm::{GeminiProvider, ModelClient};
use assistant_loop::{AskContext, ChatSession, DispatchError, Dispatcher, RetryPolicy};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::interrupt::Interrupts;

#[derive(Parser)]
#[command(name = "meditrack-assistant")]
#[command(about = "Ask the MediTrack help assistant")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    debug: bool,

    /// Gemini model to use
    #[arg(long, global = true)]
    model: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Role of the person asking (admin, receptionist, public)
    #[arg(long, global = true)]
    role: Option<CallerRole>,

    /// Name of the person asking
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Ask a single question
    Ask {
        /// Question text
        message: String,
    },
    /// Parse raw model output from a file (or stdin) and print the reply as JSON
    Parse {
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let caller = CallerContext::new(cli.name.clone(), cli.role);
    let interrupts = Interrupts::listen();

    match &cli.command {
        Commands::Parse { file } => parse_output(file.as_deref()),
        Commands::Ask { message } => {
            let dispatcher = build_dispatcher(&cli)?;
            ask_once(&dispatcher, message, caller, &interrupts).await
        }
        Commands::Chat => {
            let dispatcher = build_dispatcher(&cli)?;
            run_interactive_chat(Arc::new(dispatcher), caller, &interrupts).await
        }
    }
}

fn build_dispatcher(cli: &Cli) -> anyhow::Result<Dispatcher> {
    let mut config = AssistantConfig::load().context("failed to load configuration")?;
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }

    let provider = GeminiProvider::from_config(&config)?;
    log::debug!(
        "Using model {} with up to {} retries",
        provider.model(),
        config.retry.max_retries
    );

    let client: Arc<dyn ModelClient> = Arc::new(provider);
    Ok(Dispatcher::with_policy(client, RetryPolicy::from(config.retry)))
}

async fn ask_once(
    dispatcher: &Dispatcher,
    message: &str,
    caller: CallerContext,
    interrupts: &Interrupts,
) -> anyhow::Result<()> {
    let ctx = AskContext::new(caller).with_cancel_token(interrupts.begin());

    let result = dispatcher.ask(message, &[], ctx);
    let result = match result {
        Ok(pending) => pending.await,
        Err(e) => Err(e),
    };
    interrupts.finish();

    match result {
        Ok(reply) => {
            println!("{}", render::render_reply(&reply));
            Ok(())
        }
        Err(DispatchError::Cancelled) => {
            println!("{}", "Request cancelled".yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_interactive_chat(
    dispatcher: Arc<Dispatcher>,
    caller: CallerContext,
    interrupts: &Interrupts,
) -> anyhow::Result<()> {
    println!("{}", "MediTrack Assistant".cyan().bold());
    if let Some(who) = caller.describe() {
        println!("{}", who.dimmed());
    }
    println!("{}", "Type 'exit' or 'quit' to leave. Ctrl-C cancels a pending answer, or leaves when idle".dimmed());
    println!();

    let mut session = ChatSession::new(dispatcher, caller);

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("{}", "Goodbye!".cyan());
            break;
        }

        if input.is_empty() {
            continue;
        }

        let result = session
            .submit_with_cancel(input, Some(interrupts.begin()))
            .await;
        interrupts.finish();

        match result {
            Ok(Some(message)) => {
                println!("{}", "Assistant:".green().bold());
                match message.bot_reply() {
                    Some(reply) => println!("{}", render::render_reply(&reply)),
                    None => println!("{}", message.text),
                }
            }
            Ok(None) => {}
            Err(DispatchError::Cancelled) => println!("{}", "Request cancelled".yellow()),
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }

        println!();
    }

    Ok(())
}

fn read_input(file: Option<&std::path::Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse_output(file: Option<&std::path::Path>) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let parsed = try_parse(&raw);
    if parsed.is_malformed() {
        log::warn!("Input is not a structured reply, using plain text");
    }
    println!("{}", serde_json::to_string_pretty(&parsed.into_reply())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "meditrack-assistant",
            "ask",
            "How do I add a room?",
            "--role",
            "receptionist",
            "--name",
            "Asha",
        ]);
        assert_eq!(cli.role, Some(CallerRole::Receptionist));
        assert_eq!(cli.name.as_deref(), Some("Asha"));
        assert!(matches!(cli.command, Commands::Ask { ref message } if message == "How do I add a room?"));
    }

    #[test]
    fn cli_rejects_unknown_role() {
        let result = Cli::try_parse_from(["meditrack-assistant", "--role", "janitor", "chat"]);
        assert!(result.is_err());
    }

    #[test]
    fn read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"reply\": \"hi\"}}").unwrap();
        assert_eq!(read_input(Some(file.path())).unwrap(), "{\"reply\": \"hi\"}");
    }

    #[test]
    fn read_input_reports_missing_file() {
        let err = read_input(Some(std::path::Path::new("/nonexistent/reply.txt"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
