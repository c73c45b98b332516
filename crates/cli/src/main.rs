// ABOUTME: CLI for scraping a single article with the wikiscrape library.
// ABOUTME: Scrapes a page live, or offline from saved API/HTML files, and prints the PageData JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wikiscrape::options::DEFAULT_WIKI_BASE;
use wikiscrape::resource::page_url;
use wikiscrape::{
    assemble, Client, DuplicatePolicy, FetchedPage, MobileSections, OrphanPolicy, PageData,
    SourceMode, TreeOptions,
};

/// Scrape one Wikipedia article and output JSON.
#[derive(Parser, Debug)]
#[command(name = "wikiscrape-cli")]
#[command(about = "Scrape a Wikipedia article and print it as JSON", long_about = None)]
struct Args {
    /// Page title to fetch live, e.g. "Rust (programming language)".
    page: Option<String>,

    /// Saved mobile-sections JSON to assemble offline.
    #[arg(long)]
    sections: Option<PathBuf>,

    /// Saved rendered page to assemble offline. Alone it selects the html source.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Page URL used to resolve relative image sources in offline mode.
    #[arg(long)]
    url: Option<String>,

    /// Source for live scrapes: api or html.
    #[arg(long, default_value = "api")]
    source: String,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Fail on headings that skip a level instead of dropping them.
    #[arg(long, default_value_t = false)]
    fail_on_orphans: bool,

    /// Keep the first of two same-titled siblings instead of the last.
    #[arg(long, default_value_t = false)]
    keep_first: bool,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Output file path (default: stdout).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

impl Args {
    fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            orphans: if self.fail_on_orphans {
                OrphanPolicy::Fail
            } else {
                OrphanPolicy::Skip
            },
            duplicates: if self.keep_first {
                DuplicatePolicy::KeepFirst
            } else {
                DuplicatePolicy::Overwrite
            },
            ..TreeOptions::default()
        }
    }

    fn offline(&self) -> bool {
        self.sections.is_some() || self.html.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if args.offline() && args.page.is_some() {
        bail!("a page title cannot be combined with --sections or --html");
    }

    let page = if args.offline() {
        scrape_offline(&args)?
    } else {
        let title = args
            .page
            .as_deref()
            .ok_or_else(|| anyhow!("a page title is required, or use --sections/--html"))?;
        scrape_live(&args, title).await?
    };

    let output = if args.compact {
        serde_json::to_string(&page)?
    } else {
        serde_json::to_string_pretty(&page)?
    };

    match &args.output {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("error writing to {}", path.display()))?,
        None => println!("{}", output),
    }

    Ok(())
}

async fn scrape_live(args: &Args, title: &str) -> Result<PageData> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(args.timeout))
        .source(args.source.parse::<SourceMode>().map_err(|e| anyhow!(e))?)
        .orphans(args.tree_options().orphans)
        .duplicates(args.tree_options().duplicates)
        .build()?;
    Ok(client.scrape(title).await?)
}

fn scrape_offline(args: &Args) -> Result<PageData> {
    let html = args.html.as_deref().map(read_file).transpose()?;
    let url = match &args.url {
        Some(url) => url.clone(),
        None => {
            let stem = args
                .html
                .as_ref()
                .or(args.sections.as_ref())
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            page_url(DEFAULT_WIKI_BASE, stem)?.to_string()
        }
    };

    let fetched = match &args.sections {
        Some(path) => {
            let body = read_file(path)?;
            let sections = MobileSections::from_json(&body)
                .with_context(|| format!("malformed sections JSON in {}", path.display()))?;
            FetchedPage::Api {
                sections,
                html: html.unwrap_or_default(),
                url,
            }
        }
        None => FetchedPage::Html {
            html: html.unwrap_or_default(),
            url,
        },
    };

    Ok(assemble(&fetched, &args.tree_options())?)
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(anyhow!("file not found: {}", path.display()));
    }
    fs::read_to_string(path).with_context(|| format!("error reading {}", path.display()))
}
