use std::path::Path;

use anyhow::Result;
use liboffload::{
    classify, classify_parallel, Category, CellRecord, ClassificationResult, Summary,
};
use log::info;
use strum::IntoEnumIterator;

use crate::{config::Config, export, stats::Stats, table};

const PROGRESS_EVERY: usize = 10_000;

pub fn run(
    config: &Config,
    lte: &Path,
    nr: &Path,
    output: &Path,
    stats_path: Option<&Path>,
    parallel: bool,
) -> Result<()> {
    let (four_g, five_g) = load_tables(config, lte, nr)?;
    let results = classify_cells(config, &four_g, &five_g, parallel)?;

    export::save(output, &results)?;
    info!("wrote {} results to {}", results.len(), output.display());

    let summary = Summary::from_results(&results);
    log_summary(&summary);

    if let Some(path) = stats_path {
        Stats::new(config.thresholds, summary).save(path)?;
        info!("wrote stats to {}", path.display());
    }

    Ok(())
}

pub fn load_tables(config: &Config, lte: &Path, nr: &Path) -> Result<(Vec<CellRecord>, Vec<CellRecord>)> {
    let four_g = table::load(lte, &config.bounds)?.cells;
    let five_g = table::load(nr, &config.bounds)?.cells;
    info!("loaded {} 4G cells and {} 5G cells", four_g.len(), five_g.len());
    Ok((four_g, five_g))
}

pub fn classify_cells(
    config: &Config,
    four_g: &[CellRecord],
    five_g: &[CellRecord],
    parallel: bool,
) -> Result<Vec<ClassificationResult>> {
    let results = if parallel {
        classify_parallel(four_g, five_g, config.thresholds)?
    } else {
        let mut progress = |done: usize, total: usize| {
            if done % PROGRESS_EVERY == 0 || done == total {
                info!("classified {done}/{total}");
            }
        };
        classify(four_g, five_g, config.thresholds, Some(&mut progress))?
    };

    Ok(results)
}

fn log_summary(summary: &Summary) {
    info!("{} 4G cells classified", summary.total);
    for category in Category::iter() {
        info!("  {}: {}", category.title(), summary.count(category));
    }
}
