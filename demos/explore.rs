//! Synthetic corpus through a full session: layout, scoring, filtering, pins.
//!
//! `RUST_LOG=sift=debug cargo run --example explore` shows each stage rerun.

use rand::prelude::*;
use sift::{Attribute, PipelineConfig, Record, Session, WeightVector};
use tracing_subscriber::EnvFilter;

const CATEGORIES: [&str; 5] = ["energy", "bio", "ai", "materials", "robotics"];

fn main() -> sift::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Three loose archetypes: mature/low-risk, hyped/high-risk, niche.
    let mut rng = StdRng::seed_from_u64(2024);
    let records: Vec<Record> = (0..120)
        .map(|i| {
            let kind = i % 3;
            let base = [7.0, 4.0, 2.0][kind];
            let risk = [2.0, 8.0, 5.0][kind];
            let mut r = Record::new(format!("article {i:03}"), "synthetic")
                .with_value(Attribute::Trl, base + rng.random_range(-1.0..1.0))
                .with_value(Attribute::Cagr, [8.0, 30.0, 12.0][kind] + rng.random_range(-3.0..3.0))
                .with_value(Attribute::RoiPercent, rng.random_range(5.0..60.0))
                .with_value(Attribute::AdoptionRisk, risk + rng.random_range(-1.0..1.0))
                .with_value(Attribute::TechnologicalRisk, risk + rng.random_range(-2.0..2.0));
            if i % 7 != 0 {
                r = r.with_categories([CATEGORIES[rng.random_range(0..CATEGORIES.len())]]);
            }
            r
        })
        .collect();

    let mut session = Session::new(PipelineConfig::default().with_seed(2024));
    session.load_records(records)?;

    if let Some(layout) = session.layout() {
        let [a, b] = layout.pca.explained_variance_ratio();
        println!("explained variance: PC1 {:.1}%, PC2 {:.1}%", a * 100.0, b * 100.0);
        println!("k-means: {} iterations, converged = {}", layout.kmeans.n_iter, layout.kmeans.converged);
    }

    session.set_weights(
        WeightVector::zero()
            .with(Attribute::Cagr, 1.0)
            .with(Attribute::RoiPercent, 0.5)
            .with(Attribute::AdoptionRisk, 3.0)
            .with(Attribute::TechnologicalRisk, 2.0),
    );

    println!("\n=== clusters ===");
    for c in session.cluster_summaries() {
        match (c.mean_score, c.centroid) {
            (Some(score), Some([x, y])) => println!(
                "  cluster {}: {:3} articles, mean score {:.3}, centroid ({:6.2}, {:6.2})",
                c.cluster, c.size, score, x, y
            ),
            _ => println!("  cluster {}: empty", c.cluster),
        }
    }

    session.set_threshold(0.6);
    session.exclude_category("bio");
    let view = session.view();
    println!("\n=== {} articles at score >= 0.6, excluding bio ===", view.records.len());
    for r in view.records.iter().take(10) {
        println!("  {:.3}  cluster {}  {}", r.score, r.cluster, r.record.title());
    }
    println!("\n=== top categories (before exclusion) ===");
    for c in &view.top_categories {
        println!("  {:10} {}", c.category, c.count);
    }

    if let Some(top) = view.records.first() {
        let title = top.record.title().to_owned();
        session.toggle_pin(&title);
    }
    println!("\npinned: {:?}", session.pinned());
    Ok(())
}
