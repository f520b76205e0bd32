use clap::{Parser, Subcommand};
use line_core::gateway::Service;

#[derive(Parser)]
#[command(name = "linebot")]
#[command(about = "LINE webhook bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the chat bot: relays each text message to the completion API and replies with the answer. Needs LINE_CHANNEL_SECRET, LINE_CHANNEL_ACCESS_TOKEN and OPENAI_API_KEY.
    Chat {
        /// Config file path (default: LINEBOT_CONFIG_PATH or ~/.linebot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run the weather bot: replies to a region name (or "今日の天気") with today's JMA forecast. Needs LINE_CHANNEL_SECRET and LINE_CHANNEL_ACCESS_TOKEN.
    Weather {
        /// Config file path (default: LINEBOT_CONFIG_PATH or ~/.linebot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("linebot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Chat { config, port }) => {
            if let Err(e) = run_service(Service::Chat, config, port).await {
                log::error!("chat service failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Weather { config, port }) => {
            if let Err(e) = run_service(Service::Weather, config, port).await {
                log::error!("weather service failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_service(
    service: Service,
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = line_core::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting {} service on {}:{}",
        service.name(),
        config.server.bind,
        config.server.port
    );
    line_core::gateway::run_service(config, service).await
}
