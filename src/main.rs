use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod analyze;
mod bounds;
mod config;
mod export;
mod logging;
mod map;
mod stats;
mod table;

#[derive(Debug, Parser)]
#[command(version, about = "Recommend 5G offload targets for 4G cells")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify every 4G cell and write the results as CSV
    Classify {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long)]
        output: PathBuf,
        /// Write a JSON summary of the run
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Spread the 4G cells over all cores
        #[arg(long)]
        parallel: bool,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Classify every 4G cell and write sector polygons as GeoJSON
    Sectors {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Load a cell table and report how many rows are usable
    Check {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// 4G cell table (CSV)
    #[arg(long)]
    lte: PathBuf,
    /// 5G cell table (CSV)
    #[arg(long)]
    nr: PathBuf,
}

#[derive(Debug, Args)]
struct ThresholdArgs {
    /// Co-location distance in meters
    #[arg(long)]
    d_colo: Option<f64>,
    /// Co-location bearing tolerance in degrees
    #[arg(long)]
    theta_colo: Option<f64>,
    /// Search radius for 5G cells on other sites, in meters
    #[arg(long)]
    d_non_colo: Option<f64>,
    /// Minimum number of 5G cells in the search radius
    #[arg(long)]
    n_non_colo: Option<usize>,
}

impl ThresholdArgs {
    fn apply(&self, config: &mut config::Config) {
        let t = &mut config.thresholds;
        if let Some(x) = self.d_colo {
            t.d_colo = x;
        }
        if let Some(x) = self.theta_colo {
            t.theta_colo = x;
        }
        if let Some(x) = self.d_non_colo {
            t.d_non_colo = x;
        }
        if let Some(x) = self.n_non_colo {
            t.n_non_colo = x;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    logging::init(&config.log)?;

    match cli.command {
        Command::Classify {
            input,
            output,
            stats,
            parallel,
            thresholds,
        } => {
            thresholds.apply(&mut config);
            let stats = stats.or_else(|| config.stats.as_ref().map(|s| s.path.clone()));
            analyze::run(&config, &input.lte, &input.nr, &output, stats.as_deref(), parallel)?;
        }
        Command::Sectors {
            input,
            output,
            thresholds,
        } => {
            thresholds.apply(&mut config);
            map::run(&config, &input.lte, &input.nr, &output)?;
        }
        Command::Check { input } => table::check(&input, &config.bounds)?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use liboffload::Thresholds;

    use super::*;

    #[test]
    fn flags_override_config_thresholds() {
        let cli = Cli::try_parse_from([
            "nr-offload",
            "classify",
            "--lte",
            "lte.csv",
            "--nr",
            "nr.csv",
            "-o",
            "out.csv",
            "--d-colo",
            "80",
            "--n-non-colo",
            "3",
        ])
        .unwrap();
        let Command::Classify { thresholds, .. } = cli.command else {
            panic!("expected the classify command");
        };

        let mut config = config::Config::default();
        config.thresholds.theta_colo = 45.0;
        thresholds.apply(&mut config);

        assert_eq!(
            config.thresholds,
            Thresholds {
                d_colo: 80.0,
                theta_colo: 45.0,
                d_non_colo: Thresholds::default().d_non_colo,
                n_non_colo: 3,
            }
        );
    }

    #[test]
    fn no_flags_keep_config_thresholds() {
        let cli = Cli::try_parse_from([
            "nr-offload", "sectors", "--lte", "a.csv", "--nr", "b.csv", "-o", "map.geojson",
        ])
        .unwrap();
        let Command::Sectors { thresholds, .. } = cli.command else {
            panic!("expected the sectors command");
        };

        let mut config = config::Config::default();
        config.thresholds.d_non_colo = 500.0;
        let before = config.thresholds;
        thresholds.apply(&mut config);
        assert_eq!(config.thresholds, before);
    }
}
