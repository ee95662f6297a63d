//! Commercial-viability analysis for research articles.
//!
//! `sift` takes a set of article records carrying numeric commercial attributes and produces:
//! - a 2-D PCA projection of the attribute matrix ([`reduce`])
//! - k-means cluster labels over the same matrix ([`cluster`])
//! - a weighted composite score, min-max normalised across the set ([`score`])
//! - a filtered view with a category frequency table ([`filter`])
//!
//! [`Session`] wires these together and reruns only the stages whose inputs changed.
//!
//! ```
//! use sift::{Attribute, PipelineConfig, Record, Session, WeightVector};
//!
//! let records: Vec<Record> = (0..20)
//!     .map(|i| {
//!         Record::new(format!("paper {i}"), "")
//!             .with_value(Attribute::Cagr, i as f64)
//!             .with_value(Attribute::AdoptionRisk, (i % 4) as f64)
//!             .with_categories(["energy"])
//!     })
//!     .collect();
//!
//! let mut session = Session::new(PipelineConfig::default().with_seed(7));
//! session.load_records(records).unwrap();
//! session.set_weights(WeightVector::zero().with(Attribute::Cagr, 1.0));
//!
//! let view = session.view();
//! assert!(!view.records.is_empty());
//! assert_eq!(view.top_categories[0].category, "energy");
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod features;
pub mod filter;
pub mod load;
pub mod record;
pub mod reduce;
pub mod score;
pub mod session;

mod util;

pub use cluster::{Clustering, Kmeans, KmeansFit};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use features::{extract, FeatureColumns, Scaling};
pub use filter::{aggregate, CategoryCount, FilterParams, FilteredView};
pub use load::{records_from_json, records_from_value};
pub use record::{AnalyzedRecord, Attribute, ColorBy, Polarity, Record};
pub use reduce::{Pca, PcaFit};
pub use score::{score_records, WeightVector};
pub use session::{compute_layout, ClusterSummary, Layout, Session};
