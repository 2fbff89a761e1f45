//! Build the precipitation type dataset from a surface observation file and a sounding archive.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use metfor::HectoPascal;
use sounding_surface_join::{
    join_with_summary, read_sounding_archive, read_surface_csv, reduce_soundings, write_dataset,
    write_reduced_soundings, write_surface_observations, ArchiveConfig, JoinConfig,
    ReductionConfig,
};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "combine-obs")]
#[command(about = "Pair upper air soundings with the surface weather at launch time")]
struct Args {
    /// Surface observation file, delimited with a header row
    #[arg(short, long)]
    surface: PathBuf,

    /// Sounding archive in the fixed width format
    #[arg(short = 'a', long)]
    soundings: PathBuf,

    /// Where to write the dataset
    #[arg(short, long)]
    output: PathBuf,

    /// Only use soundings from this station identifier
    #[arg(long, env = "COMBINE_OBS_STATION")]
    station: Option<String>,

    /// Also write the reduced soundings to this file
    #[arg(long)]
    reduced_out: Option<PathBuf>,

    /// Also write the filtered surface observations to this file
    #[arg(long)]
    surface_out: Option<PathBuf>,

    /// Surface observations this many minutes from a launch are used
    #[arg(long, default_value_t = 60)]
    match_minutes: i64,

    /// Stop looking for surface observations this many minutes after a launch
    #[arg(long, default_value_t = 120)]
    stop_minutes: i64,

    /// Tolerance in hPa when looking for the 925 and 850 hPa levels
    #[arg(long, default_value_t = 20.0)]
    tolerance: f64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let archive_config = ArchiveConfig::new().with_station(args.station.clone());
    let reduction_config = ReductionConfig::new().with_tolerance(HectoPascal(args.tolerance));
    let join_config = JoinConfig::new()
        .with_match_radius(Duration::minutes(args.match_minutes))
        .with_stop_radius(Duration::minutes(args.stop_minutes));

    let surface_obs = read_surface_csv(open(&args.surface)?)
        .with_context(|| format!("reading surface observations {}", args.surface.display()))?;

    let soundings = read_sounding_archive(BufReader::new(open(&args.soundings)?), &archive_config)
        .with_context(|| format!("reading sounding archive {}", args.soundings.display()))?;
    let reduced = reduce_soundings(&soundings, &reduction_config);

    if let Some(path) = &args.surface_out {
        write_surface_observations(create(path)?, &surface_obs)
            .with_context(|| format!("writing surface observations {}", path.display()))?;
    }

    if let Some(path) = &args.reduced_out {
        write_reduced_soundings(create(path)?, &reduced)
            .with_context(|| format!("writing reduced soundings {}", path.display()))?;
    }

    let (records, summary) = join_with_summary(&reduced, &surface_obs, &join_config);

    write_dataset(create(&args.output)?, &records)
        .with_context(|| format!("writing dataset {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        records = records.len(),
        soundings = summary.soundings,
        "dataset complete"
    );

    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(f))
}
