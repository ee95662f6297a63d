//! The recomputation graph.
//!
//! Three inputs drive three stages:
//!
//! | input changed  | stages rerun                                   |
//! |----------------|------------------------------------------------|
//! | record set     | extract + PCA + k-means, then score, then view |
//! | weight vector  | score, then view                               |
//! | filter params  | view                                           |
//!
//! Each stage is a pure function ([`compute_layout`], [`crate::score::score_records`],
//! [`crate::filter::aggregate`]). A [`Session`] owns the inputs, caches the outputs of the first
//! two stages, and recomputes the view on demand, so it is never stale.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::cluster::KmeansFit;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features;
use crate::filter::{self, FilterParams, FilteredView};
use crate::record::{AnalyzedRecord, Record};
use crate::reduce::{Pca, PcaFit};
use crate::score::{self, WeightVector};

/// Output of the record-set stage: projection and clustering of the same feature matrix.
#[derive(Debug, Clone)]
pub struct Layout {
    /// PCA fit; `coords[i]` belongs to record `i`.
    pub pca: PcaFit,
    /// k-means fit; `labels[i]` belongs to record `i`.
    pub kmeans: KmeansFit,
}

/// Per-cluster aggregate over the analyzed set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    /// Cluster id.
    pub cluster: usize,
    /// Number of records in the cluster.
    pub size: usize,
    /// Mean normalised score, `None` for an empty cluster.
    pub mean_score: Option<f64>,
    /// Mean PCA coordinates, `None` for an empty cluster.
    pub centroid: Option<[f64; 2]>,
}

/// Extract the feature matrix, then project and cluster it.
///
/// PCA and k-means see the identical (optionally scaled) matrix, so their outputs line up by
/// row. Fails with [`crate::Error::InsufficientData`] when PCA cannot run.
#[tracing::instrument(level = "debug", skip_all, fields(rows = records.len()))]
pub fn compute_layout<R: Borrow<Record>>(records: &[R], config: &PipelineConfig) -> Result<Layout> {
    let mut matrix = features::extract(records, &config.columns());
    config.scaling.apply(&mut matrix);

    let pca = Pca::new().fit(&matrix)?;
    let kmeans = config.kmeans().fit(&matrix)?;
    Ok(Layout { pca, kmeans })
}

/// Join records with their layout and scores by index.
pub fn merge(records: &[Arc<Record>], layout: &Layout, scores: &[f64]) -> Vec<AnalyzedRecord> {
    debug_assert_eq!(records.len(), layout.pca.coords.len());
    debug_assert_eq!(records.len(), layout.kmeans.labels.len());
    debug_assert_eq!(records.len(), scores.len());
    records
        .iter()
        .zip(&layout.pca.coords)
        .zip(&layout.kmeans.labels)
        .zip(scores)
        .map(|(((record, &projection), &cluster), &score)| AnalyzedRecord {
            record: Arc::clone(record),
            projection,
            cluster,
            score,
        })
        .collect()
}

/// Size, mean score, and projected centroid for every cluster id in `0..k`.
pub fn cluster_summaries(records: &[AnalyzedRecord], k: usize) -> Vec<ClusterSummary> {
    let mut acc = vec![(0usize, 0.0f64, [0.0f64; 2]); k];
    for r in records {
        if let Some((size, score, xy)) = acc.get_mut(r.cluster) {
            *size += 1;
            *score += r.score;
            xy[0] += r.projection[0];
            xy[1] += r.projection[1];
        }
    }
    acc.into_iter()
        .enumerate()
        .map(|(cluster, (size, score, xy))| {
            let n = size as f64;
            ClusterSummary {
                cluster,
                size,
                mean_score: (size > 0).then(|| score / n),
                centroid: (size > 0).then(|| [xy[0] / n, xy[1] / n]),
            }
        })
        .collect()
}

/// Session state for one explorer: inputs plus cached stage outputs.
#[derive(Debug, Clone)]
pub struct Session {
    config: PipelineConfig,
    records: Vec<Arc<Record>>,
    layout: Option<Layout>,
    weights: WeightVector,
    analyzed: Vec<AnalyzedRecord>,
    filter: FilterParams,
    pinned: Vec<String>,
}

impl Session {
    /// Empty session with the given settings, zero weights, and default filters.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            layout: None,
            weights: WeightVector::zero(),
            analyzed: Vec::new(),
            filter: FilterParams::default(),
            pinned: Vec::new(),
        }
    }

    /// Builder form of [`Session::set_weights`].
    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.set_weights(weights);
        self
    }

    /// Builder form of [`Session::set_filter`].
    pub fn with_filter(mut self, params: FilterParams) -> Self {
        self.filter = params;
        self
    }

    /// Algorithm settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the record set and rerun every stage.
    ///
    /// Cluster ids are not stable across runs, so any cluster selection is cleared. An empty
    /// record set is valid and yields an empty analysis. On error (for example
    /// [`crate::Error::InsufficientData`] with a single record) the records are kept but the
    /// analyzed set is empty until a usable record set is loaded.
    pub fn load_records(&mut self, records: Vec<Record>) -> Result<()> {
        self.records = records.into_iter().map(Arc::new).collect();
        self.layout = None;
        self.analyzed.clear();
        self.filter.cluster = None;

        if self.records.is_empty() {
            tracing::debug!("empty record set, nothing to analyze");
            return Ok(());
        }

        let layout = compute_layout(&self.records, &self.config)?;
        self.layout = Some(layout);
        self.rescore();
        tracing::info!(
            records = self.records.len(),
            clusters = self.config.n_clusters,
            "record set analyzed"
        );
        Ok(())
    }

    /// Replace the weight vector and rescore. Layout is reused.
    pub fn set_weights(&mut self, weights: WeightVector) {
        self.weights = weights;
        self.rescore();
    }

    fn rescore(&mut self) {
        let Some(layout) = &self.layout else {
            self.analyzed.clear();
            return;
        };
        let scores = score::score_records(&self.records, &self.weights);
        self.analyzed = merge(&self.records, layout, &scores);
    }

    /// Current weights.
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Replace all filter parameters.
    pub fn set_filter(&mut self, params: FilterParams) {
        self.filter = params;
    }

    /// Current filter parameters.
    pub fn filter(&self) -> &FilterParams {
        &self.filter
    }

    /// Set the minimum normalised score.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.filter.threshold = threshold;
    }

    /// Select one cluster, or `None` for all.
    pub fn select_cluster(&mut self, cluster: Option<usize>) {
        self.filter.cluster = cluster;
    }

    /// Add a category to the exclusion set. Returns false if it was already excluded.
    pub fn exclude_category(&mut self, category: impl Into<String>) -> bool {
        self.filter.excluded.insert(category.into())
    }

    /// Remove a category from the exclusion set. Returns false if it was not excluded.
    pub fn include_category(&mut self, category: &str) -> bool {
        self.filter.excluded.remove(category)
    }

    /// Filtered records and the category frequency table for the current inputs.
    pub fn view(&self) -> FilteredView<'_> {
        filter::aggregate(&self.analyzed, &self.filter, self.config.top_categories)
    }

    /// Every analyzed record, before filtering.
    pub fn analyzed(&self) -> &[AnalyzedRecord] {
        &self.analyzed
    }

    /// The loaded records.
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// Projection and clustering of the current record set, if computed.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Per-cluster aggregates over the full analyzed set.
    pub fn cluster_summaries(&self) -> Vec<ClusterSummary> {
        cluster_summaries(&self.analyzed, self.config.n_clusters)
    }

    /// Pin or unpin an article by title. Returns whether it is pinned afterwards.
    pub fn toggle_pin(&mut self, title: &str) -> bool {
        if let Some(pos) = self.pinned.iter().position(|t| t == title) {
            self.pinned.remove(pos);
            false
        } else {
            self.pinned.push(title.to_owned());
            true
        }
    }

    /// Whether a title is pinned.
    pub fn is_pinned(&self, title: &str) -> bool {
        self.pinned.iter().any(|t| t == title)
    }

    /// Pinned titles, oldest first.
    pub fn pinned(&self) -> &[String] {
        &self.pinned
    }

    /// Analyzed records whose titles are pinned.
    pub fn pinned_records(&self) -> impl Iterator<Item = &AnalyzedRecord> + '_ {
        self.analyzed
            .iter()
            .filter(move |r| self.is_pinned(r.record.title()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
