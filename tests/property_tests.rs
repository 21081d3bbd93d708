//! Property-based tests using proptest.
//!
//! These tests check vote-share invariants over random symptom selections
//! from the bundled dataset.

use docrec::prelude::*;
use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::OnceLock;

fn context() -> &'static InferenceContext {
    static CONTEXT: OnceLock<InferenceContext> = OnceLock::new();
    CONTEXT.get_or_init(|| {
        let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
        let config = DocrecConfig::default().with_data_dir(data_dir);
        InferenceContext::load(&config).expect("bundled dataset trains")
    })
}

// Non-empty subsets of the symptom universe
fn selection_strategy() -> impl Strategy<Value = Vec<String>> {
    let universe = context().symptoms().to_vec();
    proptest::sample::subsequence(universe, 1..=6)
}

fn diseases_at(selection: &[String], threshold: u32) -> Vec<String> {
    let query = PredictionQuery::new(selection, threshold).expect("threshold in range");
    context()
        .predict(&query)
        .expect("known symptoms")
        .chances
        .into_iter()
        .map(|c| c.disease)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zero_threshold_reports_vote_shares(selection in selection_strategy()) {
        let query = PredictionQuery::new(&selection, 0).expect("valid threshold");
        let prediction = context().predict(&query).expect("known symptoms");
        prop_assert!(!prediction.chances.is_empty());

        let mut total = 0.0;
        for chance in &prediction.chances {
            let sixths = chance.chance * 6.0 / 100.0;
            prop_assert!((sixths - sixths.round()).abs() < 1e-9, "{}", chance.chance);
            prop_assert!((1.0..=6.0).contains(&sixths.round()));
            total += chance.chance;
        }
        prop_assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn prediction_is_idempotent(selection in selection_strategy(), threshold in 0u32..=100) {
        let query = PredictionQuery::new(&selection, threshold).expect("valid threshold");
        let first = context().predict(&query).expect("known symptoms");
        let second = context().predict(&query).expect("known symptoms");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn raising_threshold_never_adds_diseases(
        selection in selection_strategy(),
        low in 0u32..=100,
        high in 0u32..=100,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let loose = diseases_at(&selection, low);
        let strict = diseases_at(&selection, high);
        prop_assert!(strict.iter().all(|d| loose.contains(d)));
    }

    #[test]
    fn chances_are_sorted_descending(selection in selection_strategy()) {
        let query = PredictionQuery::new(&selection, 0).expect("valid threshold");
        let prediction = context().predict(&query).expect("known symptoms");
        for pair in prediction.chances.windows(2) {
            prop_assert!(pair[0].chance >= pair[1].chance);
        }
    }
}
