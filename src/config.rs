//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::cluster::Kmeans;
use crate::features::{FeatureColumns, Scaling};
use crate::filter::TOP_CATEGORIES;
use crate::record::Attribute;

/// Algorithm settings for a [`crate::Session`].
///
/// Every field has a default, so a partial JSON object deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of k-means clusters.
    pub n_clusters: usize,
    /// Maximum k-means Lloyd rounds.
    pub max_iter: usize,
    /// k-means convergence tolerance on centroid movement.
    pub tol: f64,
    /// Seed for k-means++ initialization. `None` draws fresh randomness each run.
    pub seed: Option<u64>,
    /// Column preprocessing before PCA and k-means.
    pub scaling: Scaling,
    /// Feature matrix columns, by corpus field name, in order.
    pub feature_columns: Vec<String>,
    /// Rows in the category frequency table.
    pub top_categories: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            max_iter: 100,
            tol: 1e-6,
            seed: None,
            scaling: Scaling::None,
            feature_columns: Attribute::ALL.iter().map(|a| a.name().to_owned()).collect(),
            top_categories: TOP_CATEGORIES,
        }
    }
}

impl PipelineConfig {
    /// Parse from a JSON object; missing fields take their defaults.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builder form for the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder form for column scaling.
    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// The declared feature columns.
    pub fn columns(&self) -> FeatureColumns {
        FeatureColumns::new(self.feature_columns.iter().cloned())
    }

    /// A k-means clusterer with these settings.
    pub fn kmeans(&self) -> Kmeans {
        Kmeans::new(self.n_clusters)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
            .with_seed_opt(self.seed)
    }
}
