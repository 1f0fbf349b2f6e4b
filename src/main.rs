//! Trawl main entry point
//!
//! This is the command-line interface over the trawl library.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trawl::config::{load_config_with_hash, Config};
use trawl::crawler::{BatchExecutor, DeepCrawler};
use trawl::fetch::{HttpFetcher, PageFetcher};
use trawl::scenario::{ExtractionResult, Scenario, ScenarioRegistry, TemplateScenario};
use trawl::sink::{ResultSink, SqliteSink};
use trawl::template::{list_template_files, load_template, ExtractionTemplate};
use trawl::FetchResult;
use tracing_subscriber::EnvFilter;

/// Trawl: scenario-driven web extraction
///
/// Fetches pages with a named scenario (news, docs, ecommerce, academic,
/// table or a custom template) and records the results in SQLite.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "Scenario-driven web extraction", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URLs to fetch
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// Scenario to run
    #[arg(short, long, default_value = "news_crawler")]
    scenario: String,

    /// Load a custom template file and run it as the scenario
    #[arg(short, long, value_name = "FILE", conflicts_with = "scenario")]
    template: Option<PathBuf>,

    /// List registered scenarios and exit
    #[arg(long, conflicts_with = "validate")]
    list: bool,

    /// Only list scenarios in this category (custom, builtin, or a name prefix)
    #[arg(long, requires = "list")]
    category: Option<String>,

    /// Validate a template file and exit
    #[arg(long, value_name = "FILE")]
    validate: Option<PathBuf>,

    /// Deep-crawl from each URL instead of fetching it once
    #[arg(long)]
    deep: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(path) = &cli.validate {
        return handle_validate(path);
    }

    let registry = ScenarioRegistry::with_builtins()?;
    register_custom_templates(&registry, Path::new(&config.output.templates_dir));

    if cli.list {
        handle_list(&registry, cli.category.as_deref());
        return Ok(());
    }

    let scenario_name = match &cli.template {
        Some(path) => {
            let template = load_template(path)?;
            registry.register_template(template)?
        }
        None => cli.scenario.clone(),
    };
    let Some(scenario) = registry.get(&scenario_name) else {
        bail!(trawl::TrawlError::UnknownScenario(scenario_name));
    };

    if cli.urls.is_empty() {
        bail!("No URLs given");
    }

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.fetcher)?);
    let mut sink = SqliteSink::new(Path::new(&config.output.database_path))?
        .with_config_hash(config_hash);

    if cli.deep {
        handle_deep(&config, scenario.as_ref(), fetcher, &mut sink, &cli.urls).await
    } else if cli.urls.len() == 1 {
        handle_single(scenario.as_ref(), fetcher, &mut sink, &cli.urls[0]).await
    } else {
        handle_batch(&config, scenario.as_ref(), fetcher, &mut sink, &cli.urls).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
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

/// Registers every valid template file found in the templates directory
fn register_custom_templates(registry: &ScenarioRegistry, dir: &Path) {
    let files = match list_template_files(dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Cannot read templates directory {}: {}", dir.display(), e);
            return;
        }
    };

    for path in files {
        match load_template(&path).map_err(anyhow::Error::from).and_then(|template| {
            registry
                .register_template(template)
                .map_err(anyhow::Error::from)
        }) {
            Ok(name) => tracing::debug!("Loaded custom scenario '{}' from {}", name, path.display()),
            Err(e) => tracing::warn!("Skipping template {}: {}", path.display(), e),
        }
    }
}

/// Handles --validate: checks a template file the way registration would
fn handle_validate(path: &Path) -> anyhow::Result<()> {
    let template = load_template(path)?;

    if let Err(reason) = TemplateScenario::new(template.clone()).validate() {
        bail!("Template '{}' is not usable as a scenario: {}", template.name, reason);
    }

    println!("✓ Template '{}' is valid", template.name);
    println!("  Category: {}", template.category);
    println!("  Fields: {}", template.fields.len());
    if template.is_deep_crawl() {
        let advanced = template.advanced_or_default();
        println!(
            "  Deep crawl: {} up to {} pages",
            advanced.strategy, advanced.max_pages
        );
    }
    Ok(())
}

/// Handles --list: prints scenario schemas
fn handle_list(registry: &ScenarioRegistry, category: Option<&str>) {
    let schemas = match category {
        Some(category) => registry.list_by_category(category),
        None => registry.list_all(),
    };

    println!("Scenarios ({}):", schemas.len());
    for schema in &schemas {
        print_schema(schema);
    }
}

fn print_schema(schema: &ExtractionTemplate) {
    println!("  - {} [{}]", schema.name, schema.category);
    if let Some(description) = &schema.description {
        println!("    {}", description);
    }
    for field in &schema.fields {
        let marker = if field.required { "*" } else { " " };
        println!(
            "    {} {} ({}): {}",
            marker, field.name, field.field_type, field.selector
        );
    }
}

async fn handle_single(
    scenario: &dyn Scenario,
    fetcher: Arc<dyn PageFetcher>,
    sink: &mut SqliteSink,
    url: &str,
) -> anyhow::Result<()> {
    let label = scenario.schema().name;

    match scenario.extract(url, fetcher).await {
        ExtractionResult::Page(result) => {
            print_result(url, &result);
            let run_id = sink.record_batch(&label, &[url.to_string()], &[result])?;
            println!("\n✓ Recorded run {}", run_id);
        }
        ExtractionResult::DeepCrawl(result) => {
            for page in &result.pages {
                print_result(&page.url, &page.result);
            }
            let run_id = sink.record_traversal(&label, url, &result)?;
            println!("\n✓ Recorded run {} ({} pages)", run_id, result.total_pages);
        }
    }
    Ok(())
}

async fn handle_batch(
    config: &Config,
    scenario: &dyn Scenario,
    fetcher: Arc<dyn PageFetcher>,
    sink: &mut SqliteSink,
    urls: &[String],
) -> anyhow::Result<()> {
    let label = scenario.schema().name;

    let results = BatchExecutor::new(fetcher)
        .run_batch(urls, &scenario.fetch_config(), config.batch.max_concurrent)
        .await;

    for (url, result) in urls.iter().zip(&results) {
        print_result(url, result);
    }

    let run_id = sink.record_batch(&label, urls, &results)?;
    println!("\n✓ Recorded run {}", run_id);
    Ok(())
}

async fn handle_deep(
    config: &Config,
    scenario: &dyn Scenario,
    fetcher: Arc<dyn PageFetcher>,
    sink: &mut SqliteSink,
    urls: &[String],
) -> anyhow::Result<()> {
    let schema = scenario.schema();
    let strategy = schema.advanced_or_default().strategy;
    let fetch_config = scenario.fetch_config();
    let crawler = DeepCrawler::new(fetcher);

    for seed in urls {
        let result = crawler
            .traverse(
                seed,
                strategy,
                config.deep_crawl.max_pages,
                config.deep_crawl.max_depth,
                &fetch_config,
            )
            .await;

        for page in &result.pages {
            print_result(&page.url, &page.result);
        }

        let run_id = sink.record_traversal(&schema.name, seed, &result)?;
        println!(
            "\n✓ Recorded run {} for {} ({} pages, {} failed)",
            run_id,
            seed,
            result.total_pages,
            result.failed_pages()
        );
    }
    Ok(())
}

fn print_result(url: &str, result: &FetchResult) {
    match result {
        FetchResult::Success(page) => println!(
            "✓ {} - {} ({} internal links)",
            url,
            page.metadata.title.as_deref().unwrap_or("(untitled)"),
            page.links.internal.len()
        ),
        FetchResult::Failure { error } => println!("✗ {} - {}", url, error),
    }
}
