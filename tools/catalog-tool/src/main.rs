use clap::{Parser, Subcommand};
use filter_engine::counts::ListingIndex;
use filter_engine::EngineConfig;
use market_common::query::{build_query, parse_query, unknown_keys, CanonicalQuery};
use market_common::static_catalog::FacetCatalog;
use market_common::types::{FilterState, Listing};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-tool")]
#[command(about = "Catalog dataset, query and count utilities for the car market storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a brand/model/generation dump into the embedded catalog format
    Normalize {
        /// Input catalog JSON
        #[arg(long, short)]
        input: String,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<String>,
        /// Stamp generatedAt with the current time
        #[arg(long)]
        stamp: bool,
    },
    /// Build or parse canonical search queries
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },
    /// Count listings matching a query, per facet value
    Counts {
        /// Listings JSON array
        #[arg(long, short)]
        listings: String,
        /// Query string, e.g. "brand=Audi&priceTo=30000"
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Print the effective engine configuration
    Config {
        /// Config file (default: ~/.config/car-market/engine.toml)
        #[arg(long, short)]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
enum QueryAction {
    /// Filter state JSON -> canonical query string
    Build {
        /// Filter state JSON file
        #[arg(long, short)]
        state: String,
        /// Emit multi values comma-joined instead of repeated
        #[arg(long)]
        comma: bool,
    },
    /// Query string -> filter state JSON
    Parse {
        query: String,
    },
}

fn default_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut p = dirs::config_dir().ok_or("Could not find config directory")?;
    p.push("car-market");
    p.push("engine.toml");
    Ok(p)
}

/// Read the engine config; a missing file yields the defaults.
fn load_config(file: Option<&str>) -> Result<(PathBuf, EngineConfig), Box<dyn std::error::Error>> {
    let path = match file {
        Some(f) => PathBuf::from(f),
        None => default_config_path()?,
    };
    if !path.exists() {
        return Ok((path, EngineConfig::default()));
    }
    let config: EngineConfig = toml::from_str(&fs::read_to_string(&path)?)?;
    Ok((path, config))
}

fn normalize(input: String, output: Option<String>, stamp: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = FacetCatalog::from_json(&fs::read_to_string(&input)?)?;
    if stamp {
        catalog.generated_at = Some(chrono::Utc::now().to_rfc3339());
    }
    let json = serde_json::to_string_pretty(&catalog)?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!(
                "Catalog written to: {} ({} brands, {} models)",
                path,
                catalog.brands.len(),
                catalog.model_count()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn build(state: String, comma: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw: FilterState = serde_json::from_str(&fs::read_to_string(&state)?)?;
    // Round-trip through the codec so labels are canonicalized the same way
    // the storefront does it.
    let state = parse_query(&build_query(&raw));
    let query = build_query(&state);
    let query = if comma { query.to_comma_joined() } else { query };
    println!("{}", query.to_query_string());
    Ok(())
}

fn parse(raw: String) -> Result<(), Box<dyn std::error::Error>> {
    let query = CanonicalQuery::from_query_string(&raw);
    for key in unknown_keys(&query) {
        eprintln!("Ignoring unknown key: {}", key);
    }
    println!("{}", serde_json::to_string_pretty(&parse_query(&query))?);
    Ok(())
}

fn counts(listings: String, query: String) -> Result<(), Box<dyn std::error::Error>> {
    let listings: Vec<Listing> = serde_json::from_str(&fs::read_to_string(&listings)?)?;
    let index = ListingIndex::new(listings);
    let state = parse_query(&CanonicalQuery::from_query_string(&query));
    let snapshot = index.snapshot(&state);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn show_config(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (path, config) = load_config(file.as_deref())?;
    println!("# {}", path.display());
    println!("{}", toml::to_string(&config)?);
    println!(
        "# debounce {:?}, timeout {:?}, cache ttl {:?}",
        config.count_debounce(),
        config.request_timeout(),
        config.cache_ttl()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize {
            input,
            output,
            stamp,
        } => normalize(input, output, stamp),
        Commands::Query { action } => match action {
            QueryAction::Build { state, comma } => build(state, comma),
            QueryAction::Parse { query } => parse(query),
        },
        Commands::Counts { listings, query } => counts(listings, query),
        Commands::Config { file } => show_config(file),
    }
}
