use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use site_planner::model::{GeoPoint, ResidentPoint, estimate_residents};
use site_planner::projection::EquirectangularProjection;
use site_planner::score::Normalization;
use site_planner::solver::{SolveOptions, solve};
use site_planner::traits::Projection;

#[derive(Debug, Parser)]
#[command(name = "site-planner")]
#[command(about = "Propose new store locations that cover residential demand")]
struct Cli {
    /// JSON array of buildings: `{lat, lon, residents?, area_m2?, levels?}`.
    residents: PathBuf,

    /// JSON array of existing stores: `{lat, lon}`.
    stores: PathBuf,

    /// Number of stores to place.
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// Scoring radius in meters.
    #[arg(long, default_value_t = 1_000.0)]
    max_radius: f64,

    #[arg(long, default_value_t = 800.0)]
    expected_customers: f64,

    /// UCB exploration constant.
    #[arg(long, default_value_t = 1.0)]
    exploration: f64,

    #[arg(long, default_value_t = 4096)]
    pool_size: usize,

    #[arg(long, default_value_t = 3)]
    inner_rounds: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Normalize customer proximity by this constant instead of the
    /// in-radius weight sum.
    #[arg(long)]
    raw_normalization: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ResidentRow {
    lat: f64,
    lon: f64,
    residents: Option<f64>,
    area_m2: Option<f64>,
    levels: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StoreRow {
    lat: f64,
    lon: f64,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let resident_rows: Vec<ResidentRow> = read_json(&cli.residents)?;
    let store_rows: Vec<StoreRow> = read_json(&cli.stores)?;

    let geo: Vec<GeoPoint> = resident_rows.iter().map(|r| GeoPoint::new(r.lat, r.lon)).collect();
    let Some(projection) = EquirectangularProjection::from_mean_latitude(&geo) else {
        bail!("{} contains no residents", cli.residents.display());
    };

    let residents: Vec<ResidentPoint> = resident_rows
        .iter()
        .map(|row| {
            let position = projection.to_planar(GeoPoint::new(row.lat, row.lon));
            let weight = row
                .residents
                .filter(|n| n.is_finite() && *n > 0.0)
                .unwrap_or_else(|| estimate_residents(row.area_m2, row.levels));
            ResidentPoint { position, weight }
        })
        .collect();
    let stores: Vec<_> = store_rows
        .iter()
        .map(|row| projection.to_planar(GeoPoint::new(row.lat, row.lon)))
        .collect();

    info!(
        residents = residents.len(),
        stores = stores.len(),
        ref_lat = projection.ref_lat,
        count = cli.count,
        "starting placement"
    );

    let mut options = SolveOptions {
        exploration: cli.exploration,
        pool_size: cli.pool_size,
        inner_rounds: cli.inner_rounds,
        seed: cli.seed,
        ..SolveOptions::default()
    };
    options.score.max_radius = cli.max_radius;
    options.score.expected_customers_per_store = cli.expected_customers;
    if let Some(constant) = cli.raw_normalization {
        options.score.normalization = Normalization::Fixed(constant);
    }

    let result = solve(&residents, &stores, cli.count, options).context("placement failed")?;
    let records = result.to_records(&projection);
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
