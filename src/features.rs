//! Feature extraction: records to a dense numeric matrix.
//!
//! PCA and k-means both consume the same matrix, so the column order is fixed by a
//! [`FeatureColumns`] value and shared by every downstream stage. Missing values are replaced
//! with 0 rather than dropped, so the matrix always has one row per record.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::record::{Attribute, Record};
use crate::util;

/// An ordered list of feature columns.
///
/// Columns are declared by their corpus field names. A name that matches no numeric
/// [`Attribute`] is kept as a column of zeros so the requested shape is always honored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    names: Vec<String>,
    slots: Vec<Option<Attribute>>,
}

impl FeatureColumns {
    /// Declare columns by field name, in order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let slots = names
            .iter()
            .map(|name| {
                let slot = Attribute::from_name(name);
                if slot.is_none() {
                    tracing::warn!(column = %name, "unknown feature column, filling with zeros");
                }
                slot
            })
            .collect();
        Self { names, slots }
    }

    /// Declare columns from attributes, in order.
    pub fn from_attributes(attributes: &[Attribute]) -> Self {
        Self {
            names: attributes.iter().map(|a| a.name().to_owned()).collect(),
            slots: attributes.iter().copied().map(Some).collect(),
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names, in matrix order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for FeatureColumns {
    /// All 21 numeric attributes in canonical order.
    fn default() -> Self {
        Self::from_attributes(&Attribute::ALL)
    }
}

/// Build the `records.len() x columns.len()` feature matrix.
///
/// Missing, non-numeric, and non-finite values become 0.
#[tracing::instrument(level = "debug", skip_all, fields(rows = records.len(), cols = columns.len()))]
pub fn extract<R: Borrow<Record>>(records: &[R], columns: &FeatureColumns) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|r| {
            let r: &Record = r.borrow();
            columns
                .slots
                .iter()
                .map(|slot| slot.map_or(0.0, |attr| r.value_or_zero(attr)))
                .collect()
        })
        .collect()
}

/// Per-column preprocessing applied before PCA and k-means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Use raw values. Large-magnitude columns dominate both the projection and the clustering.
    #[default]
    None,
    /// Center each column and divide by its population standard deviation.
    ///
    /// Zero-variance columns are centered only.
    Standardize,
}

impl Scaling {
    /// Apply this scaling to a rectangular matrix in place.
    pub fn apply(self, data: &mut [Vec<f64>]) {
        match self {
            Scaling::None => {}
            Scaling::Standardize => standardize(data),
        }
    }
}

fn standardize(data: &mut [Vec<f64>]) {
    let Some(d) = data.first().map(Vec::len) else {
        return;
    };
    let means = util::column_means(data, d);
    let n = data.len() as f64;

    let mut stds = vec![0.0; d];
    for row in data.iter() {
        for ((s, x), m) in stds.iter_mut().zip(row).zip(&means) {
            *s += (x - m) * (x - m);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt();
    }

    for row in data.iter_mut() {
        for ((x, m), s) in row.iter_mut().zip(&means).zip(&stds) {
            *x -= m;
            if *s > f64::EPSILON {
                *x /= s;
            }
        }
    }
}
