use crate::prelude::{eprintln, *};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use twquery::{HttpExecutor, TwitterConfig, TwitterContext};

mod list;
mod prelude;
mod search;
mod timeline;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Typed timeline, search and list queries against the Twitter API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Bearer token (falls back to TWITTER_BEARER_TOKEN)
    #[clap(long, global = true)]
    bearer_token: Option<String>,

    /// Base URL of the v1.1 API
    #[clap(long, global = true)]
    base_url: Option<String>,

    /// Base URL of the v2 API
    #[clap(long, global = true)]
    base_url2: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "TWQUERY_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Configuration from the environment with CLI overrides applied
    pub fn config(&self) -> Result<TwitterConfig> {
        let config = match TwitterConfig::from_env() {
            Ok(config) => config,
            Err(_) if self.bearer_token.is_some() => TwitterConfig::default(),
            Err(err) => return Err(eyre!(err)),
        };

        Ok(config.with_overrides(
            self.base_url.clone(),
            self.base_url2.clone(),
            self.bearer_token.clone(),
        ))
    }

    pub fn context(&self) -> Result<TwitterContext<HttpExecutor>> {
        let config = self.config()?;

        if self.verbose {
            eprintln!("API base: {} | v2: {}", config.base_url, config.base_url2);
        }

        TwitterContext::from_config(config).map_err(|e| eyre!(e))
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Status timelines and single tweets
    Timeline(crate::timeline::TimelineOptions),

    /// Premium search (30-day or full archive)
    Search(crate::search::SearchOptions),

    /// List queries and list maintenance
    #[command(subcommand)]
    List(crate::list::Commands),
}

/// Token cancelled on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let cancel = cancel_on_interrupt();

    match app.command {
        SubCommands::Timeline(options) => crate::timeline::run(options, app.global, cancel).await,
        SubCommands::Search(options) => crate::search::run(options, app.global, cancel).await,
        SubCommands::List(cmd) => crate::list::run(cmd, app.global, cancel).await,
    }
}
