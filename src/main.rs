use chrono::Utc;
use namesearch::cli::{Cli, Commands, ConfigAction};
use namesearch::config::Config;
use namesearch::enrichment::{DisabledGenerator, VariantGenerator};
use namesearch::error::{NamesearchError, Result};
use namesearch::query::{QueryComposer, QueryRequest, RequestValidator};
use namesearch::search::{normalize_all, IndexRequest, IndexResponse, SearchHit};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = &result {
        tracing::error!("{}", e);
        if let NamesearchError::Validation { errors } | NamesearchError::ConfigValidation { errors } = e
        {
            for error in errors {
                eprintln!("  {}: {}", error.path, error.message);
            }
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan {
            query,
            scope,
            field,
            date_field,
            date,
            page,
            page_size,
            search_type,
        } => {
            let mut request = QueryRequest::new(query)
                .with_search_type(search_type)
                .with_page(page, page_size);
            if let Some(scope) = scope {
                request = request.with_scope(scope);
            }
            if let Some(field) = field {
                request = request.with_field_restriction(field);
            }
            if let Some(date) = date {
                request = request.with_date_filter(date_field, date);
            }
            cmd_plan(cli.config, cli.profile, &request)?;
        }
        Commands::Normalize { file } => {
            cmd_normalize(&file)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "namesearch=debug"
    } else {
        "namesearch=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_plan(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    request: &QueryRequest,
) -> Result<()> {
    let config = load_config(config_path, profile)?;
    RequestValidator::validate(request)?;

    if config.llm.enabled {
        tracing::warn!("No language model client is bundled with the CLI, planning without enrichment");
    }
    let generator = VariantGenerator::from_config(Arc::new(DisabledGenerator), &config.llm);

    let rt = tokio::runtime::Runtime::new().map_err(|e| NamesearchError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;

    let cancel = CancellationToken::new();
    let variants = rt.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NamesearchError::Cancelled),
            variants = generator.generate(request.query_text()) => Ok(variants),
        }
    })?;

    let enriched =
        QueryComposer::new(&config.index, Utc::now().date_naive()).compose(request, &variants);
    let index_request = IndexRequest::from_query(&enriched, &config.index.search_fields);

    let plan = serde_json::json!({
        "originalQuery": request.raw_query,
        "searchedVariations": variants,
        "indexName": config.search.index_name,
        "request": index_request,
    });
    println!("{}", to_pretty_json(&plan, "Failed to serialize plan")?);

    Ok(())
}

/// Accepts either a full index response or a bare array of hits
#[derive(Deserialize)]
#[serde(untagged)]
enum HitsFile {
    Response(IndexResponse),
    Hits(Vec<SearchHit>),
}

fn cmd_normalize(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file).map_err(|e| NamesearchError::Io {
        source: e,
        context: format!("Failed to read hits file: {:?}", file),
    })?;

    let hits = match serde_json::from_str(&content).map_err(|e| NamesearchError::Json {
        source: e,
        context: format!("Failed to parse hits file: {:?}", file),
    })? {
        HitsFile::Response(response) => response.hits,
        HitsFile::Hits(hits) => hits,
    };

    tracing::info!("Normalizing {} hits", hits.len());
    let summaries = normalize_all(&hits);
    println!(
        "{}",
        to_pretty_json(&summaries, "Failed to serialize summaries")?
    );

    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile)?;
            println!("{}", to_pretty_json(&config, "Failed to serialize config")?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = match profile {
                Some(profile) => Config::load_with_profile(&path, &profile)?,
                None => Config::load(&path)?,
            };
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);

            match config.search_credentials() {
                Ok(credentials) => println!("  Search index: {:?}", credentials),
                Err(e) => println!("  Search index: {}", e),
            }
            match config.llm_credentials() {
                Ok(Some(credentials)) => println!("  Language model: {:?}", credentials),
                Ok(None) => println!("  Language model: disabled"),
                Err(e) => println!("  Language model: {}", e),
            }
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| NamesearchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'namesearch config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        return Ok(config);
    }

    if let Some(profile) = profile {
        Config::load_with_profile(&path, &profile)
    } else {
        Config::load(&path)
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| NamesearchError::Json {
        source: e,
        context: context.to_string(),
    })
}
