use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rss_generator::cli::{Cli, Commands};
use rss_generator::config::Config;
use rss_generator::domain::SiteDescriptor;
use rss_generator::errors::{GeneratorError, GeneratorResult};
use rss_generator::services::{GenerateOptions, GenerateService, HttpFetcher, PageFetcher};
use rss_generator::sources::SiteRegistry;
use rss_generator::storage::{FilesystemStore, MinioStore, ObjectStore};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> GeneratorResult<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load configuration
    let config = Config::from_env()?;

    // Built-in site table
    let registry = SiteRegistry::new()?;

    match cli.command {
        Commands::List { json } => cmd_list(&registry, json),
        Commands::Generate {
            site,
            all,
            output_dir,
            full_content,
        } => cmd_generate(&config, &registry, site, all, output_dir, full_content),
        Commands::Check { ping } => cmd_check(&config, ping),
    }
}

/// Logs go to stderr so stdout stays clean for listings.
fn init_logging(verbose: bool) {
    let default = if verbose { "info,rss_generator=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_list(registry: &SiteRegistry, json: bool) -> GeneratorResult<()> {
    let sites = registry.list_sites();

    if json {
        println!("{}", serde_json::to_string_pretty(sites)?);
        return Ok(());
    }

    println!("Available sites:\n");
    for site in sites {
        println!("  {} [{}]", site.id, site.rule);
        println!("    Name: {}", site.name);
        println!("    URL: {}", site.url);
        println!("    Key: {}", site.object_key());
        println!();
    }

    Ok(())
}

fn cmd_generate(
    config: &Config,
    registry: &SiteRegistry,
    site: Option<String>,
    all: bool,
    output_dir: Option<PathBuf>,
    full_content: bool,
) -> GeneratorResult<()> {
    // Resolve sites before touching storage so an unknown id fails first
    let sites: Vec<SiteDescriptor> = if all {
        registry.list_sites().to_vec()
    } else {
        let id = site.ok_or_else(|| GeneratorError::Config("No site given".to_string()))?;
        vec![registry.get_site(&id)?.clone()]
    };

    let fetcher = HttpFetcher::from_config(config)?;
    let options = GenerateOptions { full_content };

    match output_dir {
        Some(dir) => {
            let service = GenerateService::new(fetcher, FilesystemStore::new(dir), options);
            publish(&service, &sites, all)
        }
        None => {
            let credentials = config.credentials()?;
            let store = MinioStore::new(&credentials, &config.bucket, &config.region)?;
            let service = GenerateService::new(fetcher, store, options);
            publish(&service, &sites, all)
        }
    }
}

fn publish<F: PageFetcher, S: ObjectStore>(
    service: &GenerateService<F, S>,
    sites: &[SiteDescriptor],
    all: bool,
) -> GeneratorResult<()> {
    if !all {
        for site in sites {
            let report = service.generate(site)?;
            println!("Published {} ({} items)", site.name, report.items);
            println!("  Location: {}", report.location);
        }
        return Ok(());
    }

    println!("Generating {} feeds...\n", sites.len());

    let outcomes = service.generate_all(sites);
    let mut failed = 0;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                println!(
                    "  OK      {} ({} items) -> {}",
                    outcome.site_id, report.items, report.location
                );
            }
            Err(e) => {
                println!("  FAILED  {}: {}", outcome.site_id, e);
                failed += 1;
            }
        }
    }

    println!();
    println!(
        "Done: {} published, {} failed",
        outcomes.len() - failed,
        failed
    );

    if failed > 0 {
        return Err(GeneratorError::SitesFailed {
            failed,
            total: outcomes.len(),
        });
    }

    Ok(())
}

fn cmd_check(config: &Config, ping: bool) -> GeneratorResult<()> {
    let issues = config.check();

    if !issues.is_empty() {
        println!("Configuration problems:\n");
        for issue in &issues {
            println!("  ! {}", issue);
        }
        println!();
        return Err(GeneratorError::Config(format!(
            "{} problem(s) found",
            issues.len()
        )));
    }

    let credentials = config.credentials()?;

    println!("Configuration OK");
    println!("  Endpoint: {}", credentials.endpoint);
    println!("  Bucket: {}", config.bucket);
    println!("  Region: {}", config.region);

    if ping {
        let fetcher = HttpFetcher::from_config(config)?;

        print!("Pinging {}... ", credentials.endpoint);
        io::stdout().flush()?;

        match fetcher.probe(&credentials.endpoint) {
            Ok(status) => println!("reachable (HTTP {})", status),
            Err(e) => {
                println!("FAILED");
                return Err(e);
            }
        }
    }

    Ok(())
}
