//! Filtering the analyzed set and ranking its categories.
//!
//! Three filters apply in order:
//!
//! 1. keep records whose normalised score is at least `threshold`;
//! 2. if a cluster is selected, keep only that cluster;
//! 3. drop records carrying any excluded category. Records with no categories always survive.
//!
//! The category frequency table is computed after step 2 but before step 3, so a user can see
//! what is common, exclude it, and still see it in the table to undo the exclusion.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::AnalyzedRecord;

/// Number of rows in the category frequency table.
pub const TOP_CATEGORIES: usize = 10;

/// User-controlled filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Minimum normalised composite score.
    pub threshold: f64,
    /// Restrict to one cluster id.
    pub cluster: Option<usize>,
    /// Category labels to exclude.
    pub excluded: BTreeSet<String>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            cluster: None,
            excluded: BTreeSet::new(),
        }
    }
}

impl FilterParams {
    /// Builder form for the score threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder form for the cluster selector.
    pub fn with_cluster(mut self, cluster: Option<usize>) -> Self {
        self.cluster = cluster;
        self
    }

    /// Builder form for adding one excluded category.
    pub fn excluding(mut self, category: impl Into<String>) -> Self {
        self.excluded.insert(category.into());
        self
    }
}

/// One row of the category frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category label.
    pub category: String,
    /// Occurrences across the counted records.
    pub count: usize,
}

/// The display-ready result of filtering.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    /// Records that passed every filter, in input order.
    pub records: Vec<&'a AnalyzedRecord>,
    /// Most frequent categories before category exclusion, most common first.
    pub top_categories: Vec<CategoryCount>,
}

/// Steps 1 and 2: score threshold and optional cluster selector.
pub fn threshold_and_cluster<'a, I>(records: I, params: &FilterParams) -> Vec<&'a AnalyzedRecord>
where
    I: IntoIterator<Item = &'a AnalyzedRecord>,
{
    records
        .into_iter()
        .filter(|r| r.score >= params.threshold)
        .filter(|r| params.cluster.map_or(true, |c| r.cluster == c))
        .collect()
}

/// Step 3: drop records that carry any excluded category.
pub fn exclude_categories<'a, I>(
    records: I,
    excluded: &BTreeSet<String>,
) -> Vec<&'a AnalyzedRecord>
where
    I: IntoIterator<Item = &'a AnalyzedRecord>,
{
    records
        .into_iter()
        .filter(|r| {
            excluded.is_empty() || !r.record.categories().iter().any(|c| excluded.contains(c))
        })
        .collect()
}

/// All three filters.
pub fn filter_records<'a, I>(records: I, params: &FilterParams) -> Vec<&'a AnalyzedRecord>
where
    I: IntoIterator<Item = &'a AnalyzedRecord>,
{
    exclude_categories(threshold_and_cluster(records, params), &params.excluded)
}

/// Count category occurrences and return the `limit` most frequent.
///
/// Ties keep first-seen order.
pub fn category_frequencies<'a, I>(records: I, limit: usize) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a AnalyzedRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for r in records {
        for cat in r.record.categories() {
            match index.get(cat.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(cat.as_str(), counts.len());
                    counts.push((cat.as_str(), 1));
                }
            }
        }
    }

    // Stable: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(category, count)| CategoryCount {
            category: category.to_owned(),
            count,
        })
        .collect()
}

/// Run the filters and build the frequency table.
#[tracing::instrument(level = "debug", skip_all, fields(rows = records.len()))]
pub fn aggregate<'a>(
    records: &'a [AnalyzedRecord],
    params: &FilterParams,
    top_n: usize,
) -> FilteredView<'a> {
    let selected = threshold_and_cluster(records, params);
    let top_categories = category_frequencies(selected.iter().copied(), top_n);
    let records = exclude_categories(selected, &params.excluded);
    tracing::debug!(kept = records.len(), "filtered");
    FilteredView {
        records,
        top_categories,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::record::Record;

    fn analyzed(title: &str, score: f64, cluster: usize, cats: &[&str]) -> AnalyzedRecord {
        AnalyzedRecord {
            record: Arc::new(Record::new(title, "").with_categories(cats.iter().copied())),
            projection: [0.0, 0.0],
            cluster,
            score,
        }
    }

    fn corpus() -> Vec<AnalyzedRecord> {
        vec![
            analyzed("a", 0.9, 0, &["ai", "bio"]),
            analyzed("b", 0.8, 1, &["ai"]),
            analyzed("c", 0.2, 0, &["ai", "energy"]),
            analyzed("d", 0.75, 0, &[]),
            analyzed("e", 1.0, 2, &["energy", "bio"]),
        ]
    }

    fn titles(rs: &[&AnalyzedRecord]) -> Vec<String> {
        rs.iter().map(|r| r.record.title().to_owned()).collect()
    }

    #[test]
    fn threshold_is_inclusive() {
        let data = corpus();
        let kept = threshold_and_cluster(&data, &FilterParams::default().with_threshold(0.8));
        assert_eq!(titles(&kept), ["a", "b", "e"]);
    }

    #[test]
    fn cluster_selector_narrows() {
        let data = corpus();
        let params = FilterParams::default().with_cluster(Some(0));
        assert_eq!(titles(&filter_records(&data, &params)), ["a", "d"]);
    }

    #[test]
    fn exclusion_spares_uncategorised_records() {
        let data = corpus();
        let params = FilterParams::default()
            .with_threshold(0.0)
            .excluding("ai")
            .excluding("bio")
            .excluding("energy");
        assert_eq!(titles(&filter_records(&data, &params)), ["d"]);
    }

    #[test]
    fn frequencies_rank_before_exclusion() {
        let data = corpus();
        let params = FilterParams::default().with_threshold(0.0).excluding("ai");
        let view = aggregate(&data, &params, TOP_CATEGORIES);

        assert_eq!(titles(&view.records), ["d", "e"]);
        assert_eq!(
            view.top_categories,
            vec![
                CategoryCount { category: "ai".into(), count: 3 },
                CategoryCount { category: "bio".into(), count: 2 },
                CategoryCount { category: "energy".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn frequencies_respect_cluster_selector() {
        let data = corpus();
        let params = FilterParams::default()
            .with_threshold(0.0)
            .with_cluster(Some(0))
            .excluding("bio");
        let view = aggregate(&data, &params, TOP_CATEGORIES);

        assert_eq!(titles(&view.records), ["c", "d"]);
        // Only cluster 0 (a, c, d) is counted; "b" and "e" would add ai, energy, and bio.
        assert_eq!(
            view.top_categories,
            vec![
                CategoryCount { category: "ai".into(), count: 2 },
                CategoryCount { category: "bio".into(), count: 1 },
                CategoryCount { category: "energy".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let data = vec![
            analyzed("x", 1.0, 0, &["zeta", "alpha"]),
            analyzed("y", 1.0, 0, &["mid"]),
        ];
        let table = category_frequencies(&data, 10);
        let names: Vec<_> = table.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn frequency_table_is_truncated() {
        let data: Vec<_> = (0..15)
            .map(|i| analyzed("r", 1.0, 0, &[format!("cat{i}").as_str()]))
            .collect();
        assert_eq!(category_frequencies(&data, TOP_CATEGORIES).len(), 10);
    }

    #[test]
    fn filtering_is_idempotent() {
        let data = corpus();
        let params = FilterParams::default().with_threshold(0.5).excluding("energy");
        let once = filter_records(&data, &params);
        let twice = filter_records(once.iter().copied(), &params);
        assert_eq!(titles(&once), titles(&twice));
    }
}
