use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cdc_places::app::{
    App, BatchReport, FetchOptions, Inventory, ListResult, LogSink, ProgressSink,
};
use cdc_places::catalog::MeasureCatalog;
use cdc_places::config::{ConfigLoader, ResolvedConfig};
use cdc_places::domain::MeasureCategory;
use cdc_places::error::PlacesError;
use cdc_places::http::HttpTransport;
use cdc_places::output::{JsonOutput, OutputMode};
use cdc_places::regions::{PopulationCategory, Region};
use cdc_places::registry::DatasetRegistry;
use cdc_places::store::Layout;

#[derive(Parser)]
#[command(name = "places")]
#[command(about = "Download, cache and validate CDC PLACES releases")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download registered years (all of them by default)")]
    Fetch(FetchArgs),
    #[command(about = "List registered years and their local status")]
    List,
    #[command(about = "Check that a downloaded year parses as CSV")]
    Validate(ValidateArgs),
    #[command(about = "List health measure codes")]
    Measures(MeasuresArgs),
    #[command(about = "Show resolved file locations for a year")]
    Paths(PathsArgs),
    #[command(about = "List Census regions, or look up a state or population band")]
    Regions(RegionsArgs),
}

#[derive(Args, Clone, Default)]
struct FetchArgs {
    #[arg(long = "year", value_name = "YEAR")]
    years: Vec<u16>,

    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct ValidateArgs {
    year: u16,
}

#[derive(Args)]
struct MeasuresArgs {
    #[arg(long)]
    category: Option<MeasureCategory>,
}

#[derive(Args)]
struct PathsArgs {
    year: u16,

    #[arg(long)]
    measure: Option<String>,
}

#[derive(Args)]
struct RegionsArgs {
    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    population: Option<u64>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(places) = report.downcast_ref::<PlacesError>() {
            return ExitCode::from(map_exit_code(places));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PlacesError) -> u8 {
    match error {
        PlacesError::InvalidYear(_)
        | PlacesError::InvalidMeasure(_)
        | PlacesError::InvalidCategory(_)
        | PlacesError::InvalidName(_)
        | PlacesError::DatasetNotFound(_)
        | PlacesError::ConfigRead(_)
        | PlacesError::InvalidState(_)
        | PlacesError::ConfigParse(_) => 2,
        error if error.is_network() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let registry = DatasetRegistry::builtin();
    let config = ConfigLoader::resolve(cli.config.as_deref(), &registry)?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());
    let layout = Layout::from_path(&data_dir)?;
    layout.ensure_dirs()?;

    match cli.command {
        None => run_fetch(FetchArgs::default(), registry, layout, &config, output_mode),
        Some(Commands::Fetch(args)) => run_fetch(args, registry, layout, &config, output_mode),
        Some(Commands::List) => run_list(Inventory::new(&registry, &layout), output_mode),
        Some(Commands::Validate(args)) => {
            let report = Inventory::new(&registry, &layout).validate_year(args.year)?;
            match output_mode {
                OutputMode::NonInteractive => {
                    JsonOutput::print_validation(&report).into_diagnostic()?
                }
                OutputMode::Interactive => println!(
                    "{} is valid: {} columns, {} rows checked",
                    report.path, report.columns, report.rows_checked
                ),
            }
            Ok(())
        }
        Some(Commands::Measures(args)) => run_measures(args, output_mode),
        Some(Commands::Paths(args)) => run_paths(args, &registry, &layout, output_mode),
        Some(Commands::Regions(args)) => run_regions(args, output_mode),
    }
}

fn run_fetch(
    args: FetchArgs,
    registry: DatasetRegistry,
    layout: Layout,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let years = if args.years.is_empty() {
        config.years.clone()
    } else {
        args.years
    };
    for &year in &years {
        registry.get(year)?;
    }

    let transport = HttpTransport::new(config.timeout)?;
    let app = App::new(registry, layout, transport);
    let options = FetchOptions { force: args.force };
    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::NonInteractive => &JsonOutput,
        OutputMode::Interactive => &LogSink,
    };

    let report = app.fetch_all(&years, options, sink);
    for path in report.paths() {
        info!("Downloaded: {path}");
    }

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_fetch(&report).into_diagnostic()?,
        OutputMode::Interactive => print_fetch_summary(&report),
    }
    Ok(())
}

fn run_list(inventory: Inventory<'_>, output_mode: OutputMode) -> miette::Result<()> {
    let result = inventory.list(&JsonOutput)?;
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_list(&result).into_diagnostic()?,
        OutputMode::Interactive => print_list(&result),
    }
    Ok(())
}

fn run_measures(args: MeasuresArgs, output_mode: OutputMode) -> miette::Result<()> {
    let catalog = MeasureCatalog::builtin();
    let entries = catalog
        .entries()
        .iter()
        .filter(|entry| args.category.is_none_or(|category| entry.category == category))
        .collect::<Vec<_>>();

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_measures(&entries).into_diagnostic()?,
        OutputMode::Interactive => {
            for entry in entries {
                println!(
                    "{:<13} {:<22} {}",
                    entry.code, entry.category, entry.description
                );
            }
        }
    }
    Ok(())
}

fn run_paths(
    args: PathsArgs,
    registry: &DatasetRegistry,
    layout: &Layout,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let descriptor = registry.get(args.year)?;
    let measure = args
        .measure
        .as_deref()
        .map(|value| MeasureCatalog::builtin().measure(value))
        .transpose()?;

    let paths = serde_json::json!({
        "year": descriptor.year,
        "source_url": descriptor.source_url,
        "metadata_url": descriptor.metadata_url,
        "raw": layout.raw_path(args.year).to_string(),
        "metadata": layout.metadata_path(args.year).to_string(),
        "processed": measure
            .as_ref()
            .map(|m| layout.processed_path(args.year, m).to_string()),
        "prevalence_column": measure.as_ref().map(|m| m.prevalence_column()),
        "ci_column": measure.as_ref().map(|m| m.ci_column()),
    });

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_json(&paths).into_diagnostic()?,
        OutputMode::Interactive => {
            println!("source:    {}", descriptor.source_url);
            println!("raw:       {}", layout.raw_path(args.year));
            println!("metadata:  {}", layout.metadata_path(args.year));
            if let Some(measure) = &measure {
                println!("processed: {}", layout.processed_path(args.year, measure));
                println!("columns:   {}, {}", measure.prevalence_column(), measure.ci_column());
            }
        }
    }
    Ok(())
}

fn run_regions(args: RegionsArgs, output_mode: OutputMode) -> miette::Result<()> {
    let regions = match args.state {
        Some(state) => vec![Region::for_state(&state).ok_or(PlacesError::InvalidState(state))?],
        None => Region::ALL.to_vec(),
    };
    let band = args.population.map(PopulationCategory::for_population);

    match output_mode {
        OutputMode::NonInteractive => {
            let listing = serde_json::json!({
                "regions": regions
                    .iter()
                    .map(|region| serde_json::json!({ "region": region, "states": region.states() }))
                    .collect::<Vec<_>>(),
                "population_category": band,
            });
            JsonOutput::print_json(&listing).into_diagnostic()?
        }
        OutputMode::Interactive => {
            for region in &regions {
                println!("{region:<10} {}", region.states().join(" "));
            }
            if let (Some(population), Some(band)) = (args.population, band) {
                println!("population {population}: {band}");
            }
        }
    }
    Ok(())
}

fn print_fetch_summary(report: &BatchReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    println!("{cyan}PLACES download summary{reset}");
    println!(
        "{green}Succeeded: {}/{}{reset}",
        report.succeeded(),
        report.requested
    );
    let failed = report.failed_years();
    if !failed.is_empty() {
        println!("{yellow}Failed years: {failed:?}{reset}");
    }

    for item in &report.items {
        let color = if item.succeeded { green } else { red };
        println!("{color}  {} ({}){reset}", item.year, item.action);
        if let Some(path) = &item.local_path {
            println!("{color}    path: {path}{reset}");
        }
        if let Some(error) = &item.error {
            println!("{color}    error: {error}{reset}");
        }
    }
}

fn print_list(result: &ListResult) {
    for entry in &result.datasets {
        match (&entry.local_path, entry.bytes) {
            (Some(path), Some(bytes)) => {
                let when = entry.downloaded_at.as_deref().unwrap_or("unknown time");
                println!("{}  {path}  {bytes} bytes  ({when})", entry.year);
            }
            _ => println!("{}  not downloaded  {}", entry.year, entry.source_url),
        }
    }
}
