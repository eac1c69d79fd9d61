use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use specdec::config::{self, Config};
use specdec::export::{self, OutputFormat};
use specdec::system;
use specdec::{decode, find_match, parse_payload, MatchInput, SpecCatalog, Specification};

#[derive(Debug, Parser)]
#[command(
    name = "specdec",
    version,
    about = "specdec: decode rollup input payloads with user-authored specifications"
)]
struct Args {
    /// Config file (default: $SPECDEC_CONFIG or ~/.config/specdec/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra specification files or directories, searched before configured ones
    #[arg(long = "specs", global = true)]
    spec_paths: Vec<PathBuf>,

    /// Leave out the built-in system specifications
    #[arg(long, global = true)]
    no_system: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a payload with one specification
    Decode {
        /// Specification JSON file, or the id/name of a catalog entry
        #[arg(long)]
        spec: String,

        /// 0x-prefixed hex payload
        payload: String,

        #[arg(long)]
        format: Option<OutputFormat>,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Find the specification for an input, decoding its payload if given
    Match {
        /// Input JSON, inline or as a file path (msgSender, application.address, payload)
        #[arg(long)]
        input: String,

        /// Payload to decode; defaults to the input's `payload`
        #[arg(long)]
        payload: Option<String>,

        #[arg(long)]
        format: Option<OutputFormat>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the catalog, or export it as one JSON file
    Specs {
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    init_tracing(config.log_filter.as_deref());

    let catalog = load_catalog(&args, &config);

    match args.command {
        Command::Decode {
            spec,
            payload,
            format,
            output,
        } => {
            let spec = resolve_spec(&spec, &catalog)?;
            let payload = parse_payload(&payload)?;
            let envelope = decode(&spec, &payload);
            emit(&envelope, format.unwrap_or(config.output), output.as_deref())
        }
        Command::Match {
            input,
            payload,
            format,
            output,
        } => {
            let raw = read_json_arg(&input)?;
            let match_input: MatchInput =
                serde_json::from_value(raw.clone()).context("parse match input")?;

            let Some(spec) = find_match(Some(&match_input), catalog.specs()) else {
                println!("No specification matches this input.");
                return Ok(());
            };

            let payload = payload.or_else(|| {
                raw.get("payload")
                    .and_then(|value| value.as_str())
                    .map(str::to_string)
            });
            match payload {
                Some(payload) => {
                    let payload = parse_payload(&payload)?;
                    let envelope = decode(spec, &payload);
                    emit(&envelope, format.unwrap_or(config.output), output.as_deref())
                }
                None => {
                    println!("{}", describe(spec));
                    Ok(())
                }
            }
        }
        Command::Specs { export } => {
            if let Some(path) = export {
                let count = catalog.export(&path)?;
                info!(path = %path.display(), count, "catalog exported");
                println!("Exported {} specifications to {}", count, path.display());
                return Ok(());
            }
            for spec in catalog.specs() {
                println!("{}", describe(spec));
            }
            println!(
                "\n{} specifications ({} files scanned in {} ms, {} skipped)",
                catalog.len(),
                catalog.scanned_files,
                catalog.scan_ms,
                catalog.errors.len()
            );
            Ok(())
        }
    }
}

fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(args: &Args, config: &Config) -> SpecCatalog {
    let mut roots = args.spec_paths.clone();
    roots.extend(config.spec_roots());

    let mut catalog = SpecCatalog::scan_roots(&roots);
    if config.include_system_specs && !args.no_system {
        catalog = catalog.with_system_specs();
    }
    for err in &catalog.errors {
        warn!("skipped specification file: {err}");
    }
    catalog
}

/// A path to a specification file, an id/name in the catalog, or a system id
fn resolve_spec(key: &str, catalog: &SpecCatalog) -> Result<Specification> {
    let path = Path::new(key);
    if path.is_file() {
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let mut specs = SpecCatalog::parse(&content)?;
        if specs.len() != 1 {
            bail!(
                "{} holds {} specifications; load it with --specs and pick one by id or name",
                path.display(),
                specs.len()
            );
        }
        return Ok(specs.remove(0));
    }

    catalog
        .get(key)
        .cloned()
        .or_else(|| system::system_specification(key))
        .with_context(|| format!("no specification with id or name \"{key}\""))
}

fn read_json_arg(arg: &str) -> Result<serde_json::Value> {
    let trimmed = arg.trim();
    let content = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        fs::read_to_string(trimmed).with_context(|| format!("read {trimmed}"))?
    };
    serde_json::from_str(&content).context("parse input JSON")
}

fn emit(
    envelope: &specdec::Envelope<'_>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => export::write(path, envelope, format),
        None => {
            print!("{}", export::render(envelope, format)?);
            if format == OutputFormat::Json {
                println!();
            }
            Ok(())
        }
    }
}

fn describe(spec: &Specification) -> String {
    let created = spec
        .created_at()
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let predicates = spec.conditionals.as_ref().map_or(0, Vec::len);
    format!(
        "{:<28} {:<46} {:<10} v{:<3} {} ({} predicates)",
        spec.id.as_deref().unwrap_or("-"),
        spec.name,
        spec.mode_name(),
        spec.version,
        created,
        predicates
    )
}
