use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use height_export::{load_config, scene_url, Config, HeightExporter, MacrovisionEntity, ModelHeights, SchemaVersion};

const USAGE: &str = "\
Usage:
  height-export export [catalog.json] [--schema v1|v2] [--config path] [--output path]
  height-export scene <heights.json> <name:model:view:height>... [--config path]";

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the export
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "height_export=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = Options::parse(&args)?;

    let config = match &options.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match options.command.as_deref() {
        Some("export") => run_export(&options, &config),
        Some("scene") => run_scene(&options, &config),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

/// Command line: a command, positional arguments and --flag value pairs
#[derive(Debug, Default)]
struct Options {
    command: Option<String>,
    positional: Vec<String>,
    schema: Option<SchemaVersion>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--schema" | "--config" | "--output" => {
                    let value = iter
                        .next()
                        .with_context(|| format!("{} needs a value", arg))?;
                    match arg.as_str() {
                        "--schema" => options.schema = Some(value.parse()?),
                        "--config" => options.config = Some(PathBuf::from(value)),
                        _ => options.output = Some(PathBuf::from(value)),
                    }
                }
                flag if flag.starts_with("--") => bail!("Unknown option {}\n{}", flag, USAGE),
                _ if options.command.is_none() => options.command = Some(arg.clone()),
                _ => options.positional.push(arg.clone()),
            }
        }

        Ok(options)
    }
}

fn run_export(options: &Options, config: &Config) -> Result<()> {
    let catalog_path = options
        .positional
        .first()
        .map(PathBuf::from)
        .or_else(|| config.export.catalog.clone())
        .with_context(|| format!("No entity catalog given\n{}", USAGE))?;

    let schema = options.schema.unwrap_or(config.export.schema);
    info!(catalog = %catalog_path.display(), schema = %schema, "Exporting heights");

    let catalog = std::fs::read_to_string(&catalog_path)
        .with_context(|| format!("Failed to read catalog {}", catalog_path.display()))?;

    // Nothing is written unless the whole export succeeds
    let json = HeightExporter::new(schema).export_catalog(&catalog)?;

    match options.output.as_ref().or(config.export.output.as_ref()) {
        Some(path) => write_output(path, &json)?,
        None => println!("{}", json),
    }

    Ok(())
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(output = %path.display(), "Wrote height table");
    Ok(())
}

fn run_scene(options: &Options, config: &Config) -> Result<()> {
    let Some((heights_path, specs)) = options.positional.split_first() else {
        bail!("No height table given\n{}", USAGE);
    };

    let heights_json = std::fs::read_to_string(heights_path)
        .with_context(|| format!("Failed to read height table {}", heights_path))?;
    let heights = ModelHeights::from_json(&heights_json)?;

    let entities = specs
        .iter()
        .map(|spec| spec.parse::<MacrovisionEntity>())
        .collect::<Result<Vec<_>, _>>()?;

    let url = scene_url(&heights, entities, &config.macrovision.base_url)?;
    println!("{}", url);

    Ok(())
}
