//! User-tunable weight vector for the composite score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Attribute;

/// Per-attribute weights. Attributes without an entry weigh 0.
///
/// The weight only scales an attribute's contribution; whether it adds or subtracts is fixed by
/// [`Attribute::polarity`]. Serializes as a map keyed by corpus field name, so an external
/// preference store can round-trip it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector {
    weights: BTreeMap<Attribute, f64>,
}

impl WeightVector {
    /// Every weight 0, the explorer's starting state.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The same weight for every attribute.
    pub fn uniform(weight: f64) -> Self {
        Attribute::ALL.iter().fold(Self::zero(), |w, &a| w.with(a, weight))
    }

    /// Builder form of [`WeightVector::set`].
    pub fn with(mut self, attribute: Attribute, weight: f64) -> Self {
        self.set(attribute, weight);
        self
    }

    /// Set one weight. Non-finite weights are treated as 0.
    pub fn set(&mut self, attribute: Attribute, weight: f64) {
        if weight.is_finite() && weight != 0.0 {
            self.weights.insert(attribute, weight);
        } else {
            if !weight.is_finite() {
                tracing::warn!(%attribute, weight, "ignoring non-finite weight");
            }
            self.weights.remove(&attribute);
        }
    }

    /// Weight for an attribute (0 when unset).
    pub fn get(&self, attribute: Attribute) -> f64 {
        self.weights.get(&attribute).copied().unwrap_or(0.0)
    }

    /// Non-zero weights in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        self.weights.iter().map(|(&a, &w)| (a, w))
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// True when every weight is 0.
    pub fn is_zero(&self) -> bool {
        self.weights.is_empty()
    }

    /// Copy rescaled so the weights sum to 1. Returned unchanged when the sum is not positive.
    pub fn normalised(&self) -> Self {
        let sum = self.sum();
        if sum > 0.0 {
            self.iter().fold(Self::zero(), |w, (a, x)| w.with(a, x / sum))
        } else {
            self.clone()
        }
    }
}
