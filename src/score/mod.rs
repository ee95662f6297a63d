//! Composite viability score.
//!
//! ```text
//! S(r) = Σ_a sign(a) · value(r, a) · w(a)
//! ```
//!
//! `sign(a)` comes from [`Attribute::polarity`]: penalties (risks, durations, competition,
//! required investment) subtract and rewards add, regardless of the weight's sign. Attributes
//! missing from a record contribute 0. Raw scores are then min-max normalised across the
//! current record set, so a score is only meaningful relative to the other records.

mod normalise;
mod weights;

pub use normalise::{minmax_normalise, EPSILON};
pub use weights::WeightVector;

use std::borrow::Borrow;

use crate::record::{Attribute, Record};

/// Raw (unnormalised) composite score of one record.
pub fn composite(record: &Record, weights: &WeightVector) -> f64 {
    weights
        .iter()
        .map(|(attr, w)| attr.polarity().sign() * record.value_or_zero(attr) * w)
        .sum()
}

/// Raw composite scores for every record, in order.
pub fn raw_scores<R: Borrow<Record>>(records: &[R], weights: &WeightVector) -> Vec<f64> {
    records
        .iter()
        .map(|r| composite(r.borrow(), weights))
        .collect()
}

/// Composite scores normalised into `[0, 1]` across `records`.
#[tracing::instrument(level = "debug", skip_all, fields(rows = records.len()))]
pub fn score_records<R: Borrow<Record>>(records: &[R], weights: &WeightVector) -> Vec<f64> {
    minmax_normalise(&raw_scores(records, weights))
}

/// Per-attribute signed contributions to a record's raw score, largest magnitude first.
///
/// Useful for explaining why a record ranks where it does.
pub fn contributions(record: &Record, weights: &WeightVector) -> Vec<(Attribute, f64)> {
    let mut out: Vec<(Attribute, f64)> = weights
        .iter()
        .map(|(attr, w)| (attr, attr.polarity().sign() * record.value_or_zero(attr) * w))
        .filter(|(_, c)| *c != 0.0)
        .collect();
    out.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new("t", "a")
            .with_value(Attribute::Cagr, 10.0)
            .with_value(Attribute::AdoptionRisk, 4.0)
            .with_value(Attribute::RoiPercent, 20.0)
    }

    #[test]
    fn rewards_add_and_penalties_subtract() {
        let w = WeightVector::zero()
            .with(Attribute::Cagr, 1.0)
            .with(Attribute::AdoptionRisk, 0.5);
        assert!((composite(&record(), &w) - (10.0 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn weight_sign_does_not_flip_polarity() {
        // A negative weight on a penalty still scales `-value`; it does not make it a reward.
        let w = WeightVector::zero().with(Attribute::AdoptionRisk, -1.0);
        assert!((composite(&record(), &w) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn missing_attributes_contribute_nothing() {
        let w = WeightVector::zero()
            .with(Attribute::Novelty, 3.0)
            .with(Attribute::CompetitorsCount, 2.0);
        assert_eq!(composite(&record(), &w), 0.0);
    }

    #[test]
    fn zero_weights_score_everything_equal() {
        let records = vec![record(), Record::new("b", "")];
        let scores = score_records(&records, &WeightVector::zero());
        assert!(scores.iter().all(|s| s.abs() <= EPSILON));
    }

    #[test]
    fn normalised_scores_span_unit_interval() {
        let records = vec![
            Record::new("a", "").with_value(Attribute::RoiPercent, 1.0),
            Record::new("b", "").with_value(Attribute::RoiPercent, 2.0),
            Record::new("c", "").with_value(Attribute::RoiPercent, 3.0),
        ];
        let w = WeightVector::zero().with(Attribute::RoiPercent, 1.0);
        assert_eq!(raw_scores(&records, &w), vec![1.0, 2.0, 3.0]);
        let s = score_records(&records, &w);
        assert!(s[0].abs() < 1e-6);
        assert!((s[1] - 0.5).abs() < 1e-6);
        assert!((s[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn contributions_are_sorted_by_magnitude() {
        let w = WeightVector::zero()
            .with(Attribute::Cagr, 0.1)
            .with(Attribute::AdoptionRisk, 1.0)
            .with(Attribute::RoiPercent, 1.0);
        let c = contributions(&record(), &w);
        assert_eq!(c[0], (Attribute::RoiPercent, 20.0));
        assert_eq!(c[1], (Attribute::AdoptionRisk, -4.0));
        assert_eq!(c[2].0, Attribute::Cagr);
    }
}
