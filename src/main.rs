mod config;
mod display;
mod error;
mod filters;
mod history;
mod output;
mod parsing;
mod pipeline;
mod prompt;
mod providers;

use clap::Parser;
use config::{Config, ModelChoice};
use display::Palette;
use error::{Error, Result};
use history::{HistoryStore, Message, Role};
use output::Sink;
use pipeline::Stages;
use providers::ChatRequest;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aipipe")]
#[command(version)]
#[command(about = "Pipe text through an LLM and render the response", long_about = None)]
struct Cli {
    /// Prompt text, appended after anything piped on stdin
    prompt: Vec<String>,

    /// Output only the first code block of the response
    #[arg(short, long, conflicts_with = "pretty")]
    codeblock: bool,

    /// Stream the response as it is generated
    #[arg(short, long)]
    stream: bool,

    /// Render Markdown with colors and syntax highlighting
    #[arg(short, long)]
    pretty: bool,

    /// Use the reasoning model
    #[arg(short, long, conflicts_with = "fast")]
    reasoning: bool,

    /// Use the fast model
    #[arg(short, long)]
    fast: bool,

    /// Keep the model's <think> section
    #[arg(short, long)]
    thinking: bool,

    /// Continue the last conversation
    #[arg(short = 'u', long)]
    follow_up: bool,
}

impl Cli {
    fn model_choice(&self) -> ModelChoice {
        if self.reasoning {
            ModelChoice::Reasoning
        } else if self.fast {
            ModelChoice::Fast
        } else {
            ModelChoice::Default
        }
    }

    fn stages(&self) -> Stages {
        Stages {
            strip_thinking: !self.thinking,
            code_block: self.codeblock,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("AIPIPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let provider = providers::create_provider(&config);

    let store = config::config_dir()
        .map(HistoryStore::new)
        .ok_or_else(|| Error::Config("cannot determine the config directory".to_string()))?;
    if !cli.follow_up {
        store.archive_last()?;
    }
    let mut conversation = store.load_last()?;

    let stdin = prompt::read_stdin()?;
    let user_prompt = prompt::build_user_prompt(stdin.as_deref(), &cli.prompt)?;
    conversation.push(Role::User, user_prompt);

    let messages: Vec<Message> =
        std::iter::once(Message::new(Role::System, prompt::system_prompt(cli.codeblock)))
            .chain(conversation.messages.iter().cloned())
            .collect();
    let request = ChatRequest {
        model: config.model(cli.model_choice()),
        messages: &messages,
    };

    let mut sink = if cli.pretty {
        Sink::pretty(io::stdout(), Palette::detect())
    } else {
        Sink::plain(io::stdout())
    };

    let emitted = if cli.stream {
        let fragments = provider.stream(&request).await?;
        pipeline::run_stream(fragments, cli.stages(), &mut sink).await?
    } else {
        let response = provider.complete(&request).await?;
        pipeline::run_complete(response, cli.stages(), &mut sink)?
    };

    conversation.push(Role::Assistant, emitted);
    store.save_last(&conversation)?;
    Ok(())
}
