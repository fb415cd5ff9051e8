//! Classification of 4G cells against nearby 5G cells.
//!
//! Every 4G cell is matched with the closest 5G cell inside a search radius
//! and sorted into an offload category based on distance and antenna bearing.

pub mod classify;
mod error;
pub mod geometry;
pub mod index;
pub mod model;
pub mod sector;
pub mod summary;

pub use classify::{classify, classify_parallel, Category, ClassificationResult, Classifier, Thresholds};
pub use error::{Error, Result};
pub use geometry::{bearing_difference, distance, sector_polygon, GeometryError};
pub use model::CellRecord;
pub use sector::SectorCache;
pub use summary::Summary;
