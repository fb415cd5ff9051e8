use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    geometry::{bearing_difference, distance},
    index::CellIndex,
    model::CellRecord,
    Error, Result,
};

/// Placeholder used wherever a result has no associated 5G cell.
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// A 5G cell shares the site and points the same way; traffic can move to it.
    CoLocatedOffload,
    /// A 5G cell shares the site but its antenna points elsewhere.
    CoLocatedTune,
    /// Enough 5G cells cover the area from other sites.
    NonColocatedOffload,
    /// No usable 5G coverage; a new 5G cell has to be planned.
    NeedsPlanning,
}

impl Category {
    pub fn label(self) -> &'static str {
        self.into()
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::CoLocatedOffload => "co-located 5G offload",
            Category::CoLocatedTune => "co-located 5G RF tuning",
            Category::NonColocatedOffload => "non-co-located 5G offload",
            Category::NeedsPlanning => "5G planning required",
        }
    }
}

/// Decision thresholds for one classification run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Maximum distance in meters for two cells to count as the same site.
    pub d_colo: f64,
    /// Maximum bearing difference in degrees for a co-located offload.
    pub theta_colo: f64,
    /// Search radius in meters for 5G cells on other sites.
    pub d_non_colo: f64,
    /// Minimum number of 5G cells within `d_non_colo` for a non-co-located offload.
    pub n_non_colo: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            d_colo: 50.0,
            theta_colo: 30.0,
            d_non_colo: 300.0,
            n_non_colo: 1,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        if !self.d_colo.is_finite() || self.d_colo <= 0.0 {
            return Err(Error::invalid_parameter(
                "d_colo",
                format!("must be a positive distance, got {}", self.d_colo),
            ));
        }
        if !self.theta_colo.is_finite() || self.theta_colo <= 0.0 || self.theta_colo > 180.0 {
            return Err(Error::invalid_parameter(
                "theta_colo",
                format!("must be within (0, 180] degrees, got {}", self.theta_colo),
            ));
        }
        if !self.d_non_colo.is_finite() || self.d_non_colo <= 0.0 {
            return Err(Error::invalid_parameter(
                "d_non_colo",
                format!("must be a positive distance, got {}", self.d_non_colo),
            ));
        }
        if self.n_non_colo == 0 {
            return Err(Error::invalid_parameter("n_non_colo", "must be at least 1"));
        }
        Ok(())
    }

    /// Radius of the candidate search.
    ///
    /// Covers `d_colo` as well, so a co-located cell is found even when
    /// `d_colo` is configured larger than `d_non_colo`.
    pub fn search_radius(&self) -> f64 {
        self.d_colo.max(self.d_non_colo)
    }
}

/// Outcome for a single 4G cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    source: CellRecord,
    category: Category,
    associated_cell: Option<String>,
    distance_m: Option<f64>,
    angle_diff_deg: Option<f64>,
    nearby_count: Option<usize>,
}

impl ClassificationResult {
    fn needs_planning(source: CellRecord) -> Self {
        Self {
            source,
            category: Category::NeedsPlanning,
            associated_cell: None,
            distance_m: None,
            angle_diff_deg: None,
            nearby_count: None,
        }
    }

    pub fn source(&self) -> &CellRecord {
        &self.source
    }

    pub fn into_source(self) -> CellRecord {
        self.source
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn associated_cell(&self) -> Option<&str> {
        self.associated_cell.as_deref()
    }

    /// Name of the suggested 5G cell, or `N/A`.
    pub fn associated_cell_name(&self) -> &str {
        self.associated_cell().unwrap_or(NOT_APPLICABLE)
    }

    /// Distance in meters to the nearest 5G candidate, if there was one.
    pub fn distance_m(&self) -> Option<f64> {
        self.distance_m
    }

    pub fn angle_diff_deg(&self) -> Option<f64> {
        self.angle_diff_deg
    }

    /// Number of 5G cells in the search radius; only set for non-co-located offloads.
    pub fn nearby_count(&self) -> Option<usize> {
        self.nearby_count
    }

    /// One-line human readable summary of the outcome.
    pub fn describe(&self) -> String {
        let title = self.category.title();
        match self.category {
            Category::CoLocatedOffload | Category::CoLocatedTune => format!(
                "{title} (cell: {}, distance: {:.2}m, angle: {:.2}°)",
                self.associated_cell_name(),
                self.distance_m.unwrap_or(f64::NAN),
                self.angle_diff_deg.unwrap_or(f64::NAN),
            ),
            Category::NonColocatedOffload => format!(
                "{title} ({} 5G cells in range, nearest: {:.2}m)",
                self.nearby_count.unwrap_or_default(),
                self.distance_m.unwrap_or(f64::NAN),
            ),
            Category::NeedsPlanning => title.to_owned(),
        }
    }
}

/// Classifies 4G cells against a fixed set of 5G cells.
///
/// The spatial index is built once in [`Classifier::new`] and never changes
/// afterwards, so a classifier can be shared between threads.
pub struct Classifier<'a> {
    five_g: &'a [CellRecord],
    index: CellIndex,
    thresholds: Thresholds,
}

impl<'a> Classifier<'a> {
    pub fn new(five_g: &'a [CellRecord], thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        let index = CellIndex::build(five_g);
        debug!(
            "indexed {} of {} 5G cells, search radius {}m",
            index.len(),
            five_g.len(),
            thresholds.search_radius()
        );
        Ok(Self {
            five_g,
            index,
            thresholds,
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn classify_one(&self, cell: &CellRecord) -> ClassificationResult {
        let radius = self.thresholds.search_radius();

        // the same candidate set yields both the nearest cell and the count
        let mut nearest: Option<(usize, f64)> = None;
        let mut count = 0;
        for idx in self.index.within(cell.latitude, cell.longitude, radius) {
            let other = &self.five_g[idx];
            let d = distance(cell.latitude, cell.longitude, other.latitude, other.longitude);
            if d > radius {
                continue;
            }
            count += 1;
            // candidates arrive in input order, so a tie keeps the earlier cell
            match nearest {
                Some((_, best)) if best <= d => {}
                _ => nearest = Some((idx, d)),
            }
        }

        let Some((idx, dist)) = nearest else {
            return ClassificationResult::needs_planning(cell.clone());
        };
        let nearest = &self.five_g[idx];
        let angle = bearing_difference(cell.azimuth, nearest.azimuth);

        let t = &self.thresholds;
        let (category, associated_cell, nearby_count) = if dist <= t.d_colo {
            let category = if angle <= t.theta_colo {
                Category::CoLocatedOffload
            } else {
                Category::CoLocatedTune
            };
            (category, Some(nearest.name.clone()), None)
        } else if dist <= t.d_non_colo && count >= t.n_non_colo {
            (
                Category::NonColocatedOffload,
                Some(nearest.name.clone()),
                Some(count),
            )
        } else {
            (Category::NeedsPlanning, None, None)
        };

        ClassificationResult {
            source: cell.clone(),
            category,
            associated_cell,
            distance_m: Some(dist),
            angle_diff_deg: Some(angle),
            nearby_count,
        }
    }
}

struct Progress<'p> {
    callback: Option<&'p mut dyn FnMut(usize, usize)>,
    total: usize,
}

impl Progress<'_> {
    fn report(&mut self, done: usize) {
        let Some(callback) = self.callback.as_deref_mut() else {
            return;
        };
        let total = self.total;
        if panic::catch_unwind(AssertUnwindSafe(|| callback(done, total))).is_err() {
            warn!("progress callback panicked at {done}/{total}, no further progress is reported");
            self.callback = None;
        }
    }
}

/// Classify every 4G cell, returning one result per input cell in input order.
///
/// `on_progress` is called with `(processed, total)` after each cell. It is
/// best effort: if it panics it is dropped and classification carries on.
pub fn classify(
    four_g: &[CellRecord],
    five_g: &[CellRecord],
    thresholds: Thresholds,
    on_progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<Vec<ClassificationResult>> {
    thresholds.validate()?;

    let mut progress = Progress {
        callback: on_progress,
        total: four_g.len(),
    };
    let mut results = Vec::with_capacity(four_g.len());

    if five_g.is_empty() {
        debug!("no 5G cells, all {} 4G cells need planning", four_g.len());
        for (i, cell) in four_g.iter().enumerate() {
            results.push(ClassificationResult::needs_planning(cell.clone()));
            progress.report(i + 1);
        }
        return Ok(results);
    }

    let classifier = Classifier::new(five_g, thresholds)?;
    for (i, cell) in four_g.iter().enumerate() {
        results.push(classifier.classify_one(cell));
        progress.report(i + 1);
    }

    Ok(results)
}

/// Same as [`classify`] without progress, spreading the 4G cells over the rayon pool.
pub fn classify_parallel(
    four_g: &[CellRecord],
    five_g: &[CellRecord],
    thresholds: Thresholds,
) -> Result<Vec<ClassificationResult>> {
    thresholds.validate()?;

    if five_g.is_empty() {
        return Ok(four_g
            .iter()
            .cloned()
            .map(ClassificationResult::needs_planning)
            .collect());
    }

    let classifier = Classifier::new(five_g, thresholds)?;
    Ok(four_g
        .par_iter()
        .map(|cell| classifier.classify_one(cell))
        .collect())
}
