use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::Client as HttpClient;
use tracing_subscriber::EnvFilter;
use trakt_feed::{
    config::Config,
    publish,
    render::{self, FeedRenderer, DEFAULT_CONTAINER_ID, DEFAULT_SITE_URL},
    services::{build_http_client, Enricher, RecentlyWatched, TraktClient},
};

/// Build-time tooling for the recently watched feed
#[derive(Parser)]
#[command(name = "trakt-feed")]
#[command(about = "Publish and render a Trakt recently-watched feed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch history, resolve posters and write the feed JSON
    Publish {
        /// Output file (defaults to OUTPUT_PATH or data/trakt.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of history entries (defaults to HISTORY_LIMIT)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Verify the Trakt user exists before fetching history
        #[arg(long)]
        check_user: bool,
    },
    /// Render the feed into an HTML page's feed container
    Render {
        /// Feed endpoint to fetch, e.g. https://example.com/.netlify/functions/trakt
        #[arg(long, required_unless_present = "input", conflicts_with = "input")]
        endpoint: Option<String>,

        /// Previously published feed JSON to render instead of fetching
        #[arg(long)]
        input: Option<PathBuf>,

        /// HTML page to update in place
        #[arg(long)]
        page: PathBuf,

        /// Id of the container element
        #[arg(long, default_value = DEFAULT_CONTAINER_ID)]
        container: String,

        /// Trakt website used for detail links
        #[arg(long, default_value = DEFAULT_SITE_URL)]
        site_url: String,

        /// Request timeout in seconds when fetching the endpoint
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Publish {
            output,
            limit,
            check_user,
        } => publish_feed(output, limit, check_user).await,
        Commands::Render {
            endpoint,
            input,
            page,
            container,
            site_url,
            timeout_secs,
        } => render_page(endpoint, input, page, container, site_url, timeout_secs).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Failed to update Trakt feed");
            ExitCode::FAILURE
        }
    }
}

async fn publish_feed(
    output: Option<PathBuf>,
    limit: Option<u32>,
    check_user: bool,
) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(limit) = limit {
        config.history_limit = limit;
    }
    config.validate()?;

    let http_client = build_http_client(&config)?;
    let trakt = Arc::new(TraktClient::from_config(http_client.clone(), &config));

    if check_user {
        trakt.fetch_profile(&config.trakt_username).await?;
    }

    let feed = RecentlyWatched::new(
        trakt,
        Enricher::from_config(http_client, &config),
        config.trakt_username.clone(),
        config.history_limit,
    );
    let items = feed.load().await?;

    let output = output.unwrap_or_else(|| config.output_path.clone());
    publish::write_feed(&output, &items)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(path = %output.display(), items = items.len(), "Feed published");
    Ok(())
}

async fn render_page(
    endpoint: Option<String>,
    input: Option<PathBuf>,
    page: PathBuf,
    container: String,
    site_url: String,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let html = fs::read_to_string(&page).with_context(|| format!("reading {}", page.display()))?;

    let fragment = match (endpoint, input) {
        (Some(endpoint), _) => {
            let http_client = HttpClient::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?;
            FeedRenderer::new(http_client, endpoint, site_url).render().await
        }
        (None, Some(input)) => render::render_result(publish::read_feed(&input), &site_url),
        (None, None) => anyhow::bail!("either --endpoint or --input is required"),
    };

    let updated = render::inject_into_container(&html, &container, &fragment);
    if updated == html {
        return Ok(());
    }

    fs::write(&page, updated).with_context(|| format!("writing {}", page.display()))?;
    tracing::info!(page = %page.display(), container = %container, "Feed rendered");
    Ok(())
}
