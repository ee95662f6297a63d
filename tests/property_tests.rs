use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use sift::filter::{
    aggregate, category_frequencies, filter_records, threshold_and_cluster, FilterParams,
};
use sift::score::{minmax_normalise, EPSILON};
use sift::{extract, AnalyzedRecord, Attribute, FeatureColumns, Kmeans, Pca, Record};

const CATEGORIES: [&str; 4] = ["ai", "bio", "energy", "materials"];

fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::collection::vec(prop::option::of(-100.0f64..100.0), Attribute::COUNT),
        prop::collection::vec(0usize..CATEGORIES.len(), 0..3),
    )
        .prop_map(|(values, cats)| {
            let mut r = Record::new("r", "").with_categories(cats.into_iter().map(|c| CATEGORIES[c]));
            for (attr, v) in Attribute::ALL.iter().zip(values) {
                if let Some(v) = v {
                    r = r.with_value(*attr, v);
                }
            }
            r
        })
}

fn arb_analyzed() -> impl Strategy<Value = AnalyzedRecord> {
    (arb_record(), 0.0f64..=1.0, 0usize..5).prop_map(|(record, score, cluster)| AnalyzedRecord {
        record: Arc::new(record),
        projection: [0.0, 0.0],
        cluster,
        score,
    })
}

fn arb_params() -> impl Strategy<Value = FilterParams> {
    (
        0.0f64..=1.0,
        prop::option::of(0usize..5),
        prop::collection::btree_set(0usize..CATEGORIES.len(), 0..3),
    )
        .prop_map(|(threshold, cluster, excluded)| FilterParams {
            threshold,
            cluster,
            excluded: excluded.into_iter().map(|c| CATEGORIES[c].to_owned()).collect(),
        })
}

fn ptrs(rs: &[&AnalyzedRecord]) -> Vec<*const AnalyzedRecord> {
    rs.iter().map(|r| *r as *const _).collect()
}

proptest! {
    #[test]
    fn prop_extract_shape_is_total(records in prop::collection::vec(arb_record(), 0..20)) {
        let m = extract(&records, &FeatureColumns::default());
        prop_assert_eq!(m.len(), records.len());
        for row in &m {
            prop_assert_eq!(row.len(), Attribute::COUNT);
            prop_assert!(row.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn prop_pca_coords_are_centered(records in prop::collection::vec(arb_record(), 2..25)) {
        let m = extract(&records, &FeatureColumns::default());
        let fit = Pca::new().fit(&m).unwrap();
        prop_assert_eq!(fit.coords.len(), records.len());
        let n = fit.coords.len() as f64;
        for axis in 0..2 {
            let mean = fit.coords.iter().map(|c| c[axis]).sum::<f64>() / n;
            prop_assert!(mean.abs() < 1e-6, "axis {} mean {}", axis, mean);
        }
        prop_assert!(fit.explained_variance[0] + 1e-9 >= fit.explained_variance[1]);
    }

    #[test]
    fn prop_minmax_spans_unit_interval(raw in prop::collection::vec(-1e3f64..1e3, 1..50)) {
        let s = minmax_normalise(&raw);
        let lo = raw.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let smin = s.iter().copied().fold(f64::INFINITY, f64::min);
        let smax = s.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(smin.abs() < 1e-12);
        prop_assert!(smax <= 1.0);
        if hi - lo == 0.0 {
            prop_assert!(s.iter().all(|x| x.abs() <= EPSILON));
        } else if hi - lo > 1e-3 {
            prop_assert!(smax > 1.0 - 1e-5);
        }
    }

    #[test]
    fn prop_kmeans_seeded_is_deterministic(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 1..30),
        k in 1usize..7,
        seed in any::<u64>(),
    ) {
        let a = Kmeans::new(k).with_seed(seed).fit(&data).unwrap();
        let b = Kmeans::new(k).with_seed(seed).fit(&data).unwrap();
        prop_assert_eq!(&a.labels, &b.labels);
        prop_assert_eq!(a.labels.len(), data.len());
        prop_assert!(a.labels.iter().all(|&l| l < k));
        prop_assert_eq!(a.sizes.iter().sum::<usize>(), data.len());
    }

    #[test]
    fn prop_filter_is_idempotent(
        data in prop::collection::vec(arb_analyzed(), 0..30),
        params in arb_params(),
    ) {
        let once = filter_records(&data, &params);
        let twice = filter_records(once.iter().copied(), &params);
        prop_assert_eq!(ptrs(&once), ptrs(&twice));
    }

    #[test]
    fn prop_exclusion_round_trip(
        data in prop::collection::vec(arb_analyzed(), 0..30),
        params in arb_params(),
        extra in 0usize..CATEGORIES.len(),
    ) {
        let before = filter_records(&data, &params);
        let cat = CATEGORIES[extra].to_owned();
        if !params.excluded.contains(&cat) {
            let mut p = params.clone();
            p.excluded.insert(cat.clone());
            p.excluded.remove(&cat);
            prop_assert_eq!(ptrs(&before), ptrs(&filter_records(&data, &p)));
        }
    }

    #[test]
    fn prop_uncategorised_survive_exclusion(
        data in prop::collection::vec(arb_analyzed(), 0..30),
        threshold in 0.0f64..=1.0,
    ) {
        let all: BTreeSet<String> = CATEGORIES.iter().map(|c| (*c).to_owned()).collect();
        let params = FilterParams { threshold, cluster: None, excluded: all };
        let kept = filter_records(&data, &params);
        let expected = data
            .iter()
            .filter(|r| r.score >= threshold && !r.record.has_categories())
            .count();
        prop_assert_eq!(kept.len(), expected);
    }

    #[test]
    fn prop_aggregate_agrees_with_filters(
        data in prop::collection::vec(arb_analyzed(), 0..30),
        params in arb_params(),
        top_n in 0usize..12,
    ) {
        let view = aggregate(&data, &params, top_n);
        prop_assert_eq!(ptrs(&view.records), ptrs(&filter_records(&data, &params)));

        let selected = threshold_and_cluster(&data, &params);
        prop_assert_eq!(&view.top_categories, &category_frequencies(selected, top_n));
        prop_assert!(view.top_categories.len() <= top_n);
        if let Some(cluster) = params.cluster {
            let counted: usize = view.top_categories.iter().map(|c| c.count).sum();
            let in_cluster: usize = data
                .iter()
                .filter(|r| r.cluster == cluster && r.score >= params.threshold)
                .map(|r| r.record.categories().len())
                .sum();
            prop_assert!(counted <= in_cluster);
        }
    }
}
