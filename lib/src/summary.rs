use serde::Serialize;

use crate::classify::{Category, ClassificationResult};

/// Number of 4G cells per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub co_located_offload: usize,
    pub co_located_tune: usize,
    pub non_colocated_offload: usize,
    pub needs_planning: usize,
}

impl Summary {
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add(result.category());
        }
        summary
    }

    pub fn add(&mut self, category: Category) {
        self.total += 1;
        *self.slot(category) += 1;
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::CoLocatedOffload => self.co_located_offload,
            Category::CoLocatedTune => self.co_located_tune,
            Category::NonColocatedOffload => self.non_colocated_offload,
            Category::NeedsPlanning => self.needs_planning,
        }
    }

    fn slot(&mut self, category: Category) -> &mut usize {
        match category {
            Category::CoLocatedOffload => &mut self.co_located_offload,
            Category::CoLocatedTune => &mut self.co_located_tune,
            Category::NonColocatedOffload => &mut self.non_colocated_offload,
            Category::NeedsPlanning => &mut self.needs_planning,
        }
    }
}
