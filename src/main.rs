//! Forge-Harvest main entry point
//!
//! This is the command-line interface for the repository API client and the
//! listing-page scraper.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forge_harvest::api::{
    client_from_config, NewRepository, NewTag, Repository, RepositoryClient, RepositoryUpdate,
    Tag, TagObjectType, Tagger,
};
use forge_harvest::config::{load_config_with_hash, Config};
use forge_harvest::extract::{BatchScraper, Extractor, JsonFileSink};
use forge_harvest::page::{SessionLauncher, StaticLauncher};
use forge_harvest::transport::{ApiResponse, ReqwestTransport, TransportSettings};
use forge_harvest::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Forge-Harvest: repository API client and listing-page scraper
#[derive(Parser, Debug)]
#[command(name = "forge-harvest")]
#[command(version)]
#[command(about = "Repository API client and listing-page scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would run without running it
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every item of the configured listing page
    Scrape,

    /// Extract one record from a single product page
    Extract {
        /// Page to extract from
        url: String,
    },

    /// Issue operations on the configured repository
    #[command(subcommand)]
    Issue(IssueCommand),

    /// Repository operations
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Tag operations on the configured repository
    #[command(subcommand)]
    Tag(TagCommand),
}

#[derive(Subcommand, Debug)]
enum IssueCommand {
    /// Open an issue
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Label to apply (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum RepoCommand {
    /// Create a repository for the authenticated user
    Create(CreateRepoArgs),
    /// Delete the configured repository
    Delete,
    /// List repositories of the authenticated user
    List,
    /// List public repositories of the configured owner
    ListOwner,
    /// Update fields of the configured repository
    Update(UpdateRepoArgs),
}

#[derive(Args, Debug)]
struct CreateRepoArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    homepage: Option<String>,
    #[arg(long)]
    private: Option<bool>,
    #[arg(long)]
    has_issues: Option<bool>,
    #[arg(long)]
    has_projects: Option<bool>,
    #[arg(long)]
    has_wiki: Option<bool>,
}

#[derive(Args, Debug)]
struct UpdateRepoArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    homepage: Option<String>,
    #[arg(long)]
    private: Option<bool>,
    #[arg(long)]
    default_branch: Option<String>,
    #[arg(long)]
    archived: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    /// Create an annotated tag object
    Create {
        /// Tag name, e.g. v1.0.0
        tag: String,
        #[arg(long)]
        message: String,
        /// SHA of the object to tag
        #[arg(long)]
        object: String,
        /// Object type: commit, tree or blob
        #[arg(long = "type", default_value = "commit", value_parser = parse_object_type)]
        object_type: TagObjectType,
        #[arg(long)]
        tagger_name: String,
        #[arg(long)]
        tagger_email: String,
    },
    /// List tags
    List,
}

fn parse_object_type(value: &str) -> Result<TagObjectType, String> {
    match value {
        "commit" => Ok(TagObjectType::Commit),
        "tree" => Ok(TagObjectType::Tree),
        "blob" => Ok(TagObjectType::Blob),
        other => Err(format!("unknown object type '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config, &cli.command);
    }

    match cli.command {
        Command::Scrape => handle_scrape(&config).await,
        Command::Extract { url } => handle_extract(&config, &url).await,
        Command::Issue(command) => handle_issue(&config, command).await,
        Command::Repo(command) => handle_repo(&config, command).await,
        Command::Tag(command) => handle_tag(&config, command).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forge_harvest=info,warn"),
            1 => EnvFilter::new("forge_harvest=debug,info"),
            2 => EnvFilter::new("forge_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the configuration the command would use
fn handle_dry_run(config: &Config, command: &Command) -> anyhow::Result<()> {
    println!("=== Forge-Harvest Dry Run ===\n");
    println!("Command: {:?}\n", command);

    match &config.api {
        Some(api) => {
            println!("API:");
            println!("  Base URL: {}", api.base_url);
            println!("  Repository: {}/{}", api.owner, api.repository);
            println!("  User agent: {}", api.user_agent);
            println!(
                "  Token: {}",
                if api.resolve_token().is_ok() {
                    "available"
                } else {
                    "MISSING"
                }
            );
        }
        None => println!("API: not configured"),
    }

    match &config.scraper {
        Some(scraper) => {
            println!("\nScraper:");
            println!("  Listing URL: {}", scraper.listing_url);
            println!("  Item selector: {}", scraper.item_selector);
            println!("  Price selector: {}", scraper.price_selector);
            println!("  Image selector: {}", scraper.image_selector);
            println!("  Wait timeout: {}ms", scraper.wait_timeout_ms);
            println!("  On item error: {:?}", scraper.on_item_error);
        }
        None => println!("\nScraper: not configured"),
    }

    match &config.page {
        Some(page) => {
            println!("\nSingle page:");
            println!("  Price selector: {}", page.price_selector);
            println!("  Image selector: {}", page.image_selector);
            println!("  Wait timeout: {}ms", page.wait_timeout_ms);
        }
        None => println!("\nSingle page: not configured"),
    }

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the batch scrape of the configured listing page
async fn handle_scrape(config: &Config) -> anyhow::Result<()> {
    let scraper_config = config
        .scraper
        .as_ref()
        .ok_or(ConfigError::MissingSection("scraper"))?;

    let scraper = BatchScraper::from_config(scraper_config);
    let launcher = StaticLauncher::new(scraper_config.user_agent.as_deref());
    let sink = JsonFileSink::new(&config.output.records_path);

    let records = scraper
        .run(&launcher, &sink)
        .await
        .context("Scraping failed")?;

    tracing::info!("Results saved to {}", config.output.records_path);
    println!("Scraping completed!");
    println!("Total products scraped: {}", records.len());
    Ok(())
}

/// Handles single-page extraction, printing the record as JSON
async fn handle_extract(config: &Config, url: &str) -> anyhow::Result<()> {
    let page_config = config
        .page
        .as_ref()
        .ok_or(ConfigError::MissingSection("page"))?;

    let extractor = Extractor::from_config(page_config);
    let launcher = StaticLauncher::new(page_config.user_agent.as_deref());

    let mut session = launcher.launch().await?;
    let record = match session.new_page().await {
        Ok(mut page) => Ok(extractor.extract(page.as_mut(), url).await),
        Err(e) => Err(e),
    };
    session.close().await?;

    println!("{}", serde_json::to_string_pretty(&record?)?);
    Ok(())
}

fn build_client(config: &Config) -> anyhow::Result<RepositoryClient> {
    let api = config
        .api
        .as_ref()
        .ok_or(ConfigError::MissingSection("api"))?;

    let token = api.resolve_token()?;
    let transport = ReqwestTransport::new(&TransportSettings::from_config(api, token))?;
    let client = client_from_config(Arc::new(transport), api);

    tracing::debug!("Client bound to {}", client.identity());
    Ok(client)
}

/// Prints status line and body; failures are reported, not raised
fn report(response: &ApiResponse) {
    println!("{} {}", response.status(), response.status_text());
    if !response.is_success() {
        tracing::error!("Request failed with status {}", response.status());
        tracing::error!("Error response body: {}", response.text());
    }
    if !response.body().is_empty() {
        println!("{}", response.text());
    }
}

fn report_names<T>(response: &ApiResponse, label: &str, name: impl Fn(&T) -> String)
where
    T: serde::de::DeserializeOwned,
{
    report(response);
    if !response.is_success() {
        return;
    }
    match response.json::<Vec<T>>() {
        Ok(items) => {
            for item in &items {
                println!("{}: {}", label, name(item));
            }
        }
        Err(e) => tracing::warn!("Could not decode list response: {}", e),
    }
}

async fn handle_issue(config: &Config, command: IssueCommand) -> anyhow::Result<()> {
    let client = build_client(config)?;
    match command {
        IssueCommand::Create {
            title,
            body,
            labels,
        } => report(&client.create_issue(&title, &body, labels).await?),
    }
    Ok(())
}

async fn handle_repo(config: &Config, command: RepoCommand) -> anyhow::Result<()> {
    let client = build_client(config)?;
    match command {
        RepoCommand::Create(args) => {
            let data = NewRepository {
                name: args.name,
                description: args.description,
                homepage: args.homepage,
                private: args.private,
                has_issues: args.has_issues,
                has_projects: args.has_projects,
                has_wiki: args.has_wiki,
            };
            report(&client.create_repository(&data).await?);
        }
        RepoCommand::Delete => report(&client.delete_repository().await?),
        RepoCommand::List => {
            let response = client.list_user_repositories().await?;
            report_names(&response, "Repository Name", |r: &Repository| r.name.clone());
        }
        RepoCommand::ListOwner => {
            let response = client.list_owner_repositories().await?;
            report_names(&response, "Repository Name", |r: &Repository| r.name.clone());
        }
        RepoCommand::Update(args) => {
            let data = RepositoryUpdate {
                name: args.name,
                description: args.description,
                homepage: args.homepage,
                private: args.private,
                default_branch: args.default_branch,
                archived: args.archived,
                ..RepositoryUpdate::default()
            };
            if data.is_empty() {
                anyhow::bail!("Nothing to update: pass at least one field");
            }
            report(&client.update_repository(&data).await?);
        }
    }
    Ok(())
}

async fn handle_tag(config: &Config, command: TagCommand) -> anyhow::Result<()> {
    let client = build_client(config)?;
    match command {
        TagCommand::Create {
            tag,
            message,
            object,
            object_type,
            tagger_name,
            tagger_email,
        } => {
            let data = NewTag {
                message,
                object,
                object_type,
                tagger: Tagger {
                    name: tagger_name,
                    email: tagger_email,
                    date: chrono::Utc::now(),
                },
            };
            report(&client.create_tag(&tag, &data).await?);
        }
        TagCommand::List => {
            let response = client.list_repository_tags().await?;
            report_names(&response, "Tag", |t: &Tag| t.name.clone());
        }
    }
    Ok(())
}
