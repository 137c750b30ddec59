use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_gateway::{CommandInterpreter, LlmClient};
use swap_core::config::{AppConfig, CONFIG};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "llm-cli",
    about = "One-shot driver for the swap command parser",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a free-text swap command into its structured form
    Parse {
        /// The instruction to parse, e.g. "swap 1.5 USDC for BTC.b"
        #[arg(long, short = 'c')]
        command: String,
    },
    /// Send a plain chat message to the configured model
    Chat {
        /// User message content
        #[arg(
            long,
            short = 'p',
            default_value = "Say hello and confirm the connection works."
        )]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let app_config: &AppConfig = &CONFIG;
    let client = LlmClient::from_app_config(app_config)?;

    match cli.command {
        Command::Parse { command } => {
            let parsed = client.parse_swap_command(command.trim()).await?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Chat { prompt } => {
            let reply = client.chat_completion(&prompt).await?;
            println!("{reply}");
        }
    }

    Ok(())
}

fn init_tracing() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .is_err()
    {
        // tracing already initialised; ignore.
    }
}
