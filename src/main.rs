use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use quote_gateway::{
    ApiServer, Config, QuoteCatalog, SpeechProxy, format_for_clipboard, format_for_social_share,
};

/// Quotes - quote widget backend with a text-to-speech proxy
#[derive(Parser)]
#[command(name = "quotes", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "QUOTE_GATEWAY_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "QUOTE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a random quote
    Quote {
        /// Text of a quote to avoid repeating
        #[arg(long)]
        current: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = QuoteFormat::Clipboard)]
        format: QuoteFormat,
    },
    /// Synthesize text (or a random quote) to an audio file
    Speak {
        /// Text to speak; a random quote when omitted
        text: Option<String>,
        /// Output file
        #[arg(short, long, default_value = "quote.mp3")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QuoteFormat {
    Clipboard,
    Share,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,quote_gateway=info",
        1 => "info,quote_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Quote { current, format } => print_quote(&config, current.as_deref(), format),
        Command::Speak { text, output } => speak(&config, text, &output).await,
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(port = config.server.port, "starting quote gateway");
    ApiServer::from_config(config)?.run().await?;
    Ok(())
}

fn print_quote(config: &Config, current: Option<&str>, format: QuoteFormat) -> anyhow::Result<()> {
    let catalog = QuoteCatalog::embedded()?;
    let quote = catalog.select_next(current);

    let rendered = match format {
        QuoteFormat::Clipboard => format_for_clipboard(quote),
        QuoteFormat::Share => {
            format_for_social_share(quote, &config.share.hashtags, config.share.max_length)
        }
        QuoteFormat::Json => serde_json::to_string_pretty(quote)?,
    };
    println!("{rendered}");
    Ok(())
}

async fn speak(config: &Config, text: Option<String>, output: &Path) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let catalog = QuoteCatalog::embedded()?;
            let quote = catalog.select_next(None);
            println!("{}", format_for_clipboard(quote));
            format!("{} — {}", quote.text, quote.author)
        }
    };

    let proxy = SpeechProxy::from_config(&config.speech)?;
    let audio = proxy.synthesize(&text).await?;
    let content_type = audio.content_type.clone();
    let bytes = audio.into_bytes().await?;

    tokio::fs::write(output, &bytes).await?;
    println!(
        "Wrote {} bytes ({content_type}) to {}",
        bytes.len(),
        output.display()
    );
    Ok(())
}
