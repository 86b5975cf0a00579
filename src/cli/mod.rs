//! CLI mode for alp - browse the catalog and download route descriptions.

mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::tables::{grade_id, grade_label, route_type_id, route_type_label};
use crate::{
    AppConfig, CatalogClient, DocumentFetcher, DownloadOrchestrator, HttpTransport, RouteQuery,
    RunOutcome, Selection, layout, natural_cmp,
};

use progress::{BarProgress, print_summary};

fn print_usage() {
    eprintln!("Usage: alp [OPTIONS] <COMMAND>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  ranges                      List mountain ranges");
    eprintln!("  areas [range-id]            List the areas of a range, or of every range");
    eprintln!("  summits <area-id>           List the summits of an area");
    eprintln!("  routes [FILTERS]            Search routes");
    eprintln!("  download [--range ID] [--area ID] [--dir PATH] <summit-id>...");
    eprintln!("                              Download route descriptions of the given summits");
    eprintln!();
    eprintln!("Route filters:");
    eprintln!("  --range <ID>  --area <ID>  --mountain <ID>");
    eprintln!("  --grade <LABEL|CODE>        Repeatable, e.g. --grade 2А --grade 3Б*");
    eprintln!("  --type <LABEL|CODE>         Repeatable, one of к л лс ск сн");
    eprintln!("  --min <METERS>  --max <METERS>");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --config <PATH>             Config file (default: {})", AppConfig::default_path().display());
    eprintln!("  --host <URL>                Catalog host");
    eprintln!("  -h, --help                  Show this help");
    eprintln!();
    eprintln!("Press Ctrl-C during a download to cancel after the current document.");
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Ranges,
    Areas { range_id: Option<u32> },
    Summits { area_id: u32 },
    Routes(RouteQuery),
    Download {
        selection: Selection,
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    host: Option<String>,
    command: Command,
}

fn parse_id(flag: &str, value: Option<&String>) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a number"))
}

fn parse_code(
    flag: &str,
    value: Option<&String>,
    by_label: fn(&str) -> Option<u32>,
    by_id: fn(u32) -> Option<&'static str>,
) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    if let Some(code) = by_label(value) {
        return Ok(code);
    }
    value
        .parse()
        .ok()
        .filter(|code| by_id(*code).is_some())
        .ok_or_else(|| format!("{flag}: unknown value '{value}'"))
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut config_path = None;
    let mut host = None;
    let mut command_name: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut query = RouteQuery::new();
    let mut dir = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(CliArgs {
                    config_path,
                    host,
                    command: Command::Help,
                });
            }
            "--config" => {
                config_path = Some(PathBuf::from(iter.next().ok_or("--config requires a value")?));
            }
            "--host" => host = Some(iter.next().ok_or("--host requires a value")?.clone()),
            "--dir" => dir = Some(PathBuf::from(iter.next().ok_or("--dir requires a value")?)),
            "--range" => query.region_id = Some(parse_id(arg, iter.next())?),
            "--area" => query.area_id = Some(parse_id(arg, iter.next())?),
            "--mountain" => query.mountain_id = Some(parse_id(arg, iter.next())?),
            "--min" => query.height_min = Some(parse_id(arg, iter.next())?),
            "--max" => query.height_max = Some(parse_id(arg, iter.next())?),
            "--grade" => {
                query
                    .complexities
                    .insert(parse_code(arg, iter.next(), grade_id, grade_label)?);
            }
            "--type" => {
                query
                    .types
                    .insert(parse_code(arg, iter.next(), route_type_id, route_type_label)?);
            }
            other if other.starts_with('-') => return Err(format!("unknown option '{other}'")),
            other => {
                if command_name.is_none() {
                    command_name = Some(other.to_string());
                } else {
                    positional.push(other.to_string());
                }
            }
        }
    }

    let single_id = |what: &str| -> Result<u32, String> {
        match positional.as_slice() {
            [id] => parse_id(what, Some(id)),
            _ => Err(format!("expected exactly one {what}")),
        }
    };

    let command = match command_name.as_deref() {
        None => Command::Help,
        Some("ranges") => Command::Ranges,
        Some("areas") => Command::Areas {
            range_id: if positional.is_empty() {
                None
            } else {
                Some(single_id("range id")?)
            },
        },
        Some("summits") => Command::Summits {
            area_id: single_id("area id")?,
        },
        Some("routes") => Command::Routes(query),
        Some("download") => {
            if positional.is_empty() {
                return Err("download needs at least one summit id".to_string());
            }
            let summit_ids = positional
                .iter()
                .map(|id| parse_id("summit id", Some(id)))
                .collect::<Result<Vec<_>, _>>()?;
            Command::Download {
                selection: Selection::new(query.region_id, query.area_id, summit_ids),
                dir,
            }
        }
        Some(other) => return Err(format!("unknown command '{other}'")),
    };

    Ok(CliArgs {
        config_path,
        host,
        command,
    })
}

/// Runs the CLI with the process arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, a catalog request
/// fails, or a download run fails.
pub async fn run() -> crate::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("Error: {msg}\n");
            print_usage();
            std::process::exit(2);
        }
    };

    let mut config = match &cli.config_path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(host) = cli.host {
        config.catalog = config.catalog.with_base_url(host);
    }

    match cli.command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Ranges => list_ranges(&config).await,
        Command::Areas { range_id } => list_areas(&config, range_id).await,
        Command::Summits { area_id } => list_summits(&config, area_id).await,
        Command::Routes(query) => list_routes(&config, &query).await,
        Command::Download { selection, dir } => {
            if let Some(dir) = dir {
                config.download = config.download.with_download_dir(dir);
            }
            download(&config, selection).await
        }
    }
}

async fn list_ranges(config: &AppConfig) -> crate::Result<()> {
    let catalog = CatalogClient::connect(&config.catalog)?;
    let mut ranges = catalog.fetch_ranges().await?;
    ranges.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    for range in ranges {
        println!("{:>6}  {}", range.id, range.name);
    }
    Ok(())
}

async fn list_areas(config: &AppConfig, range_id: Option<u32>) -> crate::Result<()> {
    let catalog = CatalogClient::connect(&config.catalog)?;
    let Some(range_id) = range_id else {
        return list_all_areas(&catalog).await;
    };
    let mut areas = catalog.fetch_areas(range_id).await?;
    areas.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    for area in areas {
        println!("{:>6}  {}", area.id, area.name);
    }
    Ok(())
}

async fn list_all_areas(catalog: &CatalogClient) -> crate::Result<()> {
    let mut ranges = catalog.fetch_ranges().await?;
    let mut areas = catalog.fetch_all_areas().await?;
    ranges.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    areas.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    for range in ranges {
        println!("{}", range.name);
        for area in areas.iter().filter(|a| a.parent_range_id == range.id) {
            println!("  {:>6}  {}", area.id, area.name);
        }
    }
    Ok(())
}

async fn list_summits(config: &AppConfig, area_id: u32) -> crate::Result<()> {
    let catalog = CatalogClient::connect(&config.catalog)?;
    let mut summits = catalog.fetch_summits(area_id).await?;
    summits.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    for summit in summits {
        println!("{:>6}  {:>5}  {}", summit.id, summit.height, summit.name);
    }
    Ok(())
}

async fn list_routes(config: &AppConfig, query: &RouteQuery) -> crate::Result<()> {
    let catalog = CatalogClient::connect(&config.catalog)?;
    let routes = catalog.query_routes(query).await?;
    if routes.is_empty() {
        println!("No routes found.");
        return Ok(());
    }
    for route in &routes {
        println!(
            "{} / {} / {}  {}  ({} document(s))",
            route.region_name,
            route.area_name,
            layout::peak_label(route),
            layout::route_label(route),
            route.documents.len()
        );
    }
    Ok(())
}

async fn download(config: &AppConfig, selection: Selection) -> crate::Result<()> {
    let transport = Arc::new(HttpTransport::new(&config.catalog)?);
    let catalog = Arc::new(CatalogClient::new(Arc::clone(&transport)));
    let fetcher = Arc::new(DocumentFetcher::new(transport, config.download.chunk_size));
    let orchestrator =
        DownloadOrchestrator::new(catalog, fetcher, config.download.download_dir.clone());

    let reporter = Arc::new(BarProgress::new());
    let handle = orchestrator.start(selection, reporter.clone())?;

    let cancel = orchestrator.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received SIGINT");
            cancel.cancel();
        }
    });

    let outcome = handle.await.map_err(std::io::Error::other)?;
    ctrl_c.abort();
    reporter.finish();
    print_summary(&outcome);

    match outcome {
        RunOutcome::Failed { error, .. } => Err(error),
        RunOutcome::Completed(_) | RunOutcome::Cancelled(_) => Ok(()),
    }
}
