//! Typed article records.
//!
//! A [`Record`] has a fixed schema: a title, an abstract, a list of category labels, and one
//! optional value per [`Attribute`]. Records are built once when the corpus is loaded and never
//! mutated afterwards; the analysis stages wrap them in [`AnalyzedRecord`] instead of writing
//! derived fields back.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Whether an attribute raises or lowers the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Contributes `+value * weight`.
    Reward,
    /// Contributes `-value * weight`.
    Penalty,
}

impl Polarity {
    /// Multiplier applied to `value * weight`.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Reward => 1.0,
            Polarity::Penalty => -1.0,
        }
    }
}

/// Numeric attributes carried by every article record.
///
/// The serialized names match the field keys of the source corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Compound annual growth rate of the addressed market.
    #[serde(rename = "CAGR")]
    Cagr,
    /// Years until half of the target market adopts.
    #[serde(rename = "years_to_50pct_penetration")]
    YearsTo50PctPenetration,
    /// Technology readiness level.
    #[serde(rename = "TRL")]
    Trl,
    /// Years until technology readiness level 7.
    #[serde(rename = "time_to_TRL_7_years")]
    TimeToTrl7Years,
    /// Annual savings delivered to adopters, in USD.
    #[serde(rename = "usd_savings_per_year")]
    UsdSavingsPerYear,
    /// Return on investment, percent.
    #[serde(rename = "ROI_percent")]
    RoiPercent,
    /// Novelty, 1–10 rating.
    #[serde(rename = "novelty_1_to_10")]
    Novelty,
    /// Count of distinct related patents.
    #[serde(rename = "number_distinct_patents")]
    DistinctPatents,
    /// Probability of commercial success, percent.
    #[serde(rename = "commercialisation_success_probability_percent")]
    CommercialisationSuccessProbability,
    /// Years until break-even.
    #[serde(rename = "break_even_time_years")]
    BreakEvenTimeYears,
    /// Adoption risk, 1–10 rating.
    #[serde(rename = "adoption_risk_1_to_10")]
    AdoptionRisk,
    /// Technological risk, 1–10 rating.
    #[serde(rename = "technological_risk_1_to_10")]
    TechnologicalRisk,
    /// Number of competitors.
    #[serde(rename = "competitors_count")]
    CompetitorsCount,
    /// Market share after five years, percent.
    #[serde(rename = "5_year_market_share_percent")]
    FiveYearMarketShare,
    /// Disruption potential, 1–10 rating.
    #[serde(rename = "disruption_score_1_to_10")]
    DisruptionScore,
    /// Commercial viability as a standalone product, 1–10 rating.
    // The corpus spells it "commericality".
    #[serde(rename = "standalone_commericality_1_to_10")]
    StandaloneCommerciality,
    /// Improvement over existing solutions, 1–10 rating.
    #[serde(rename = "improvement_compared_to_existing_1_to_10")]
    ImprovementOverExisting,
    /// How far it enables or reshapes a market, 1–10 rating.
    #[serde(rename = "enables_or_reshapes_market_1_to_10")]
    EnablesOrReshapesMarket,
    /// Global market size, log-scaled USD.
    #[serde(rename = "global_market_size_USD_log")]
    GlobalMarketSizeLog,
    /// Expected annual revenue, log-scaled USD.
    #[serde(rename = "annual_revenue_USD_log")]
    AnnualRevenueLog,
    /// Required R&D investment, log-scaled USD.
    #[serde(rename = "rnd_investment_required_log")]
    RndInvestmentRequiredLog,
}

impl Attribute {
    /// Number of declared numeric attributes.
    pub const COUNT: usize = 21;

    /// Every attribute, in the canonical feature-matrix column order.
    pub const ALL: [Attribute; Attribute::COUNT] = [
        Attribute::Cagr,
        Attribute::YearsTo50PctPenetration,
        Attribute::Trl,
        Attribute::TimeToTrl7Years,
        Attribute::UsdSavingsPerYear,
        Attribute::RoiPercent,
        Attribute::Novelty,
        Attribute::DistinctPatents,
        Attribute::CommercialisationSuccessProbability,
        Attribute::BreakEvenTimeYears,
        Attribute::AdoptionRisk,
        Attribute::TechnologicalRisk,
        Attribute::CompetitorsCount,
        Attribute::FiveYearMarketShare,
        Attribute::DisruptionScore,
        Attribute::StandaloneCommerciality,
        Attribute::ImprovementOverExisting,
        Attribute::EnablesOrReshapesMarket,
        Attribute::GlobalMarketSizeLog,
        Attribute::AnnualRevenueLog,
        Attribute::RndInvestmentRequiredLog,
    ];

    /// Field key used by the source corpus.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Cagr => "CAGR",
            Attribute::YearsTo50PctPenetration => "years_to_50pct_penetration",
            Attribute::Trl => "TRL",
            Attribute::TimeToTrl7Years => "time_to_TRL_7_years",
            Attribute::UsdSavingsPerYear => "usd_savings_per_year",
            Attribute::RoiPercent => "ROI_percent",
            Attribute::Novelty => "novelty_1_to_10",
            Attribute::DistinctPatents => "number_distinct_patents",
            Attribute::CommercialisationSuccessProbability => {
                "commercialisation_success_probability_percent"
            }
            Attribute::BreakEvenTimeYears => "break_even_time_years",
            Attribute::AdoptionRisk => "adoption_risk_1_to_10",
            Attribute::TechnologicalRisk => "technological_risk_1_to_10",
            Attribute::CompetitorsCount => "competitors_count",
            Attribute::FiveYearMarketShare => "5_year_market_share_percent",
            Attribute::DisruptionScore => "disruption_score_1_to_10",
            Attribute::StandaloneCommerciality => "standalone_commericality_1_to_10",
            Attribute::ImprovementOverExisting => "improvement_compared_to_existing_1_to_10",
            Attribute::EnablesOrReshapesMarket => "enables_or_reshapes_market_1_to_10",
            Attribute::GlobalMarketSizeLog => "global_market_size_USD_log",
            Attribute::AnnualRevenueLog => "annual_revenue_USD_log",
            Attribute::RndInvestmentRequiredLog => "rnd_investment_required_log",
        }
    }

    /// Look up an attribute by its corpus field key.
    pub fn from_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.iter().copied().find(|a| a.name() == name)
    }

    /// Position of this attribute in [`Attribute::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign of this attribute's contribution to the composite score.
    ///
    /// Risks, durations, competition, and required investment are penalties; everything else
    /// is a reward. A new attribute must be given a polarity here explicitly.
    pub fn polarity(self) -> Polarity {
        match self {
            Attribute::YearsTo50PctPenetration
            | Attribute::TimeToTrl7Years
            | Attribute::BreakEvenTimeYears
            | Attribute::AdoptionRisk
            | Attribute::TechnologicalRisk
            | Attribute::CompetitorsCount
            | Attribute::RndInvestmentRequiredLog => Polarity::Penalty,
            Attribute::Cagr
            | Attribute::Trl
            | Attribute::UsdSavingsPerYear
            | Attribute::RoiPercent
            | Attribute::Novelty
            | Attribute::DistinctPatents
            | Attribute::CommercialisationSuccessProbability
            | Attribute::FiveYearMarketShare
            | Attribute::DisruptionScore
            | Attribute::StandaloneCommerciality
            | Attribute::ImprovementOverExisting
            | Attribute::EnablesOrReshapesMarket
            | Attribute::GlobalMarketSizeLog
            | Attribute::AnnualRevenueLog => Polarity::Reward,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One research article.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    title: String,
    abstract_text: String,
    categories: Vec<String>,
    values: [Option<f64>; Attribute::COUNT],
}

impl Record {
    /// Create a record with no categories and every attribute missing.
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            categories: Vec::new(),
            values: [None; Attribute::COUNT],
        }
    }

    /// Set one attribute value.
    pub fn with_value(mut self, attribute: Attribute, value: f64) -> Self {
        self.values[attribute.index()] = Some(value);
        self
    }

    /// Replace the category labels.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Article title. Pins are keyed by it.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Article abstract.
    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Category labels; empty when the article has none.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// True when the article carries at least one category.
    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Raw attribute value, if present in the source data.
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        self.values[attribute.index()]
    }

    /// Attribute value with missing or non-finite values replaced by 0.
    pub fn value_or_zero(&self, attribute: Attribute) -> f64 {
        match self.value(attribute) {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

/// Which derived value a scatter view colours points by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBy {
    /// Colour by cluster id.
    #[default]
    Cluster,
    /// Colour by normalized composite score.
    CompositeScore,
}

/// A record plus everything the pipeline derives for it.
#[derive(Debug, Clone)]
pub struct AnalyzedRecord {
    /// The source record, shared with the session's record set.
    pub record: Arc<Record>,
    /// Coordinates in the top-2 principal-component space.
    pub projection: [f64; 2],
    /// Cluster id in `0..k`. Only meaningful within one clustering run.
    pub cluster: usize,
    /// Composite score normalized over the current record set.
    pub score: f64,
}

impl AnalyzedRecord {
    /// Value a UI maps to a colour scale for the given mode.
    pub fn color_value(&self, by: ColorBy) -> f64 {
        match by {
            ColorBy::Cluster => self.cluster as f64,
            ColorBy::CompositeScore => self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_round_trip() {
        for (i, attr) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attr.index(), i);
            assert_eq!(Attribute::from_name(attr.name()), Some(*attr));
        }
        assert_eq!(Attribute::from_name("title"), None);
    }

    #[test]
    fn serde_names_match_corpus_keys() {
        for attr in Attribute::ALL {
            let json = serde_json::to_string(&attr).unwrap();
            assert_eq!(json, format!("\"{}\"", attr.name()));
        }
    }

    #[test]
    fn penalties_are_the_cost_and_risk_fields() {
        let penalties: Vec<_> = Attribute::ALL
            .iter()
            .filter(|a| a.polarity() == Polarity::Penalty)
            .map(|a| a.name())
            .collect();
        assert_eq!(
            penalties,
            vec![
                "years_to_50pct_penetration",
                "time_to_TRL_7_years",
                "break_even_time_years",
                "adoption_risk_1_to_10",
                "technological_risk_1_to_10",
                "competitors_count",
                "rnd_investment_required_log",
            ]
        );
    }

    #[test]
    fn missing_and_nan_values_read_as_zero() {
        let r = Record::new("t", "a")
            .with_value(Attribute::Cagr, f64::NAN)
            .with_value(Attribute::Trl, 4.0);
        assert_eq!(r.value(Attribute::Novelty), None);
        assert_eq!(r.value_or_zero(Attribute::Novelty), 0.0);
        assert_eq!(r.value_or_zero(Attribute::Cagr), 0.0);
        assert_eq!(r.value_or_zero(Attribute::Trl), 4.0);
    }

    #[test]
    fn color_value_follows_mode() {
        let a = AnalyzedRecord {
            record: Arc::new(Record::new("t", "a")),
            projection: [0.0, 0.0],
            cluster: 3,
            score: 0.25,
        };
        assert_eq!(a.color_value(ColorBy::Cluster), 3.0);
        assert_eq!(a.color_value(ColorBy::CompositeScore), 0.25);
    }
}
