use clap::{Parser, Subcommand};
use spacetraveling::cms::PrismicClient;
use spacetraveling::config::{self, SiteConfig};
use spacetraveling::{generate, output, pull};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shared flags for commands that pull from the CMS.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the regeneration cache and refetch every post
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(about = "Static blog front-end for a Prismic repository")]
#[command(long_about = "\
Static blog front-end for a Prismic repository

Posts are pulled from the CMS into a JSON snapshot, then rendered to plain
HTML. The listing shows one page of posts at a time; each \"Carregar mais
posts\" link leads to the listing with the next page appended.

Output structure:

  dist/
  ├── index.html                   # First listing page
  ├── page/2/index.html            # Listing after one \"load more\"
  └── post/<uid>/index.html        # One page per post

The CMS endpoint and access token can be set in config.toml or through the
PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN environment variables.

Run 'spacetraveling gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (snapshot, post cache)
    #[arg(long, default_value = ".spacetraveling-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the listing and every post into a snapshot
    Pull(CacheArgs),
    /// Produce the HTML site from the snapshot
    Generate,
    /// Run the full pipeline: pull → generate
    Build(CacheArgs),
    /// Check that the CMS is reachable with the current config
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Pull(cache_args) => {
            let site_config = config::load_config(&cli.config)?;
            run_pull(&site_config, &cli.temp_dir, !cache_args.no_cache).await?;
        }
        Command::Generate => {
            run_generate(&cli)?;
        }
        Command::Build(cache_args) => {
            let site_config = config::load_config(&cli.config)?;

            println!("==> Stage 1: Pulling from {}", site_config.cms.endpoint);
            run_pull(&site_config, &cli.temp_dir, !cache_args.no_cache).await?;

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            run_generate(&cli)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            println!("==> Checking {}", site_config.cms.endpoint);
            let client = PrismicClient::new(&site_config.cms)?;
            let master_ref = client.master_ref().await?;
            output::print_check_output(&site_config, master_ref);
            println!("==> CMS is reachable");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

async fn run_pull(
    site_config: &SiteConfig,
    temp_dir: &Path,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = PrismicClient::new(&site_config.cms)?;
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_pull_event(&event) {
                println!("{}", line);
            }
        }
    });

    let now = chrono::Utc::now().timestamp();
    let result = pull::pull_into(&client, site_config, temp_dir, use_cache, now, Some(tx)).await;
    // The sender is gone once pull_into returns, so the printer drains and exits
    printer.join().map_err(|_| "pull output printer panicked")?;
    let result = result?;

    println!("Cache: {}", result.cache_stats);
    Ok(())
}

fn run_generate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot_path = pull::snapshot_path(&cli.temp_dir);
    let config_dir = cli.config.parent().unwrap_or(Path::new("."));
    let summary = generate::generate(&snapshot_path, &cli.output, config_dir)?;
    output::print_generate_output(&summary);
    Ok(())
}
