// ABOUTME: Server binary for the wikiscrape article scraper.
// ABOUTME: Listens on PORT (default 4203) and answers GET /?page=<title> with the article as JSON.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wikiscrape::{Client, OrphanPolicy, ScrapeServer, SourceMode};

#[derive(Parser, Debug)]
#[command(name = "wikiscrape")]
#[command(about = "Serve Wikipedia articles as structured JSON")]
struct Args {
    /// Port to listen on
    #[arg(short = 'p', long = "port", env = "PORT", default_value_t = 4203)]
    port: u16,

    /// Address to bind
    #[arg(long = "bind", default_value = "0.0.0.0")]
    bind: String,

    /// Upstream request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Default source when a request does not name one: api or html
    #[arg(long = "source", default_value = "api")]
    source: String,

    /// Base URL of the mobile-sections API
    #[arg(long = "api-base")]
    api_base: Option<String>,

    /// Base URL of rendered article pages
    #[arg(long = "wiki-base")]
    wiki_base: Option<String>,

    /// User-Agent sent upstream
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Reject pages whose headings skip a level instead of dropping the block
    #[arg(long = "fail-on-orphans")]
    fail_on_orphans: bool,

    /// Answer every error with HTTP 200
    #[arg(long = "legacy-status")]
    legacy_status: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let source = match args.source.parse::<SourceMode>() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .source(source);
    if let Some(base) = args.api_base {
        builder = builder.api_base(base);
    }
    if let Some(base) = args.wiki_base {
        builder = builder.wiki_base(base);
    }
    if let Some(ua) = args.user_agent {
        builder = builder.user_agent(ua);
    }
    if args.fail_on_orphans {
        builder = builder.orphans(OrphanPolicy::Fail);
    }

    let client = match builder.build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("failed to build client: {}", e);
            return ExitCode::from(1);
        }
    };

    let server = ScrapeServer::new(&args.bind, args.port, client).with_legacy_status(args.legacy_status);
    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(1)
        }
    }
}
