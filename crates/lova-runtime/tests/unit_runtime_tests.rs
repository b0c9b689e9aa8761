//! Unit tests for lova-runtime components working together

use lova_core::{InteractionRecord, NumericWeights, RawId, StrengthWeights};
use lova_runtime::{
    AlsConfig, ArtifactStore, DotProductEvaluator, Evaluator, Factorizer, IdIndexer,
    ImplicitAls, PreprocessConfig, Preprocessor, RuntimeError,
};
use lova_core::InteractionTable;
use tempfile::TempDir;

fn weights() -> StrengthWeights {
    StrengthWeights::new(
        NumericWeights::new().with("clicks", 1.0),
        vec![0.5, 1.0],
        0.5,
    )
}

fn training_records() -> Vec<InteractionRecord> {
    let mut records = Vec::new();
    for user in 0..6i64 {
        for item in 0..6i64 {
            // Two taste groups: users and items with the same parity interact
            if (user + item) % 2 == 0 {
                records.push(
                    InteractionRecord::new(user, item, 0b11u64)
                        .with_field("clicks", (1 + user + item) as f64),
                );
            }
        }
    }
    records
}

fn small_als() -> ImplicitAls {
    ImplicitAls::new(AlsConfig {
        factors: 3,
        iterations: 8,
        ..AlsConfig::default()
    })
    .unwrap()
}

// ========== Matrix assembly ==========

#[test]
fn test_duplicate_interactions_accumulate() {
    let records = vec![
        InteractionRecord::new(1i64, 1i64, 0b10u64).with_field("clicks", 4.0),
        InteractionRecord::new(1i64, 1i64, 0b10u64).with_field("clicks", 4.0),
        InteractionRecord::new(2i64, 1i64, 0b00u64).with_field("clicks", 0.0),
    ];
    let pre = Preprocessor::new(
        &records,
        PreprocessConfig::for_weights(&weights(), 1.0),
    )
    .unwrap();

    let strengths = pre.strengths(&weights()).unwrap();
    let single = strengths[0];
    assert_eq!(strengths[1], single);

    let matrix = pre.build_matrix(&weights()).unwrap();
    assert_eq!(matrix.shape(), (2, 1));
    assert_eq!(matrix.nnz(), 2);
    assert_eq!(matrix.get(0, 0), 2.0 * single);
}

#[test]
fn test_unweighted_fields_may_be_missing() {
    let mut records = training_records();
    records[0] = records[0].clone().with_field("extra", 1.0);

    let pre = Preprocessor::new(
        &records,
        PreprocessConfig::for_weights(&weights(), 1.0),
    )
    .unwrap();
    assert_eq!(pre.table().len(), records.len());
    assert!(!pre.table().has_column("extra"));
    assert!(pre.build_matrix(&weights()).is_ok());
}

#[test]
fn test_indexing_is_deterministic_and_injective() {
    let records = training_records();
    let table = InteractionTable::from_records(&records, ["clicks"]).unwrap();

    let first = IdIndexer::index(&table);
    let second = IdIndexer::index(&table);
    assert_eq!(first, second);

    let mut seen = std::collections::HashSet::new();
    for id in first.users.ids() {
        assert!(seen.insert(first.users.get(id).unwrap()));
    }
    assert_eq!(seen.len(), 6);
}

// ========== Evaluation ==========

#[test]
fn test_padding_row_does_not_change_mean() {
    let pre = Preprocessor::new(
        &training_records(),
        PreprocessConfig::for_weights(&weights(), 0.999),
    )
    .unwrap();
    let factors = small_als().fit(&pre.build_matrix(&weights()).unwrap()).unwrap();

    let holdout = vec![
        (RawId::Int(0), RawId::Int(2)),
        (RawId::Int(1), RawId::Int(3)),
        (RawId::Int(4), RawId::Int(0)),
    ];
    let mut padded = holdout.clone();
    padded.push((RawId::Int(1000), RawId::Int(2)));
    padded.push((RawId::Int(0), RawId::from("unknown")));

    let plain = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), pre.maps());
    let with_padding = DotProductEvaluator::new(padded.iter().map(|(u, i)| (u, i)), pre.maps());

    assert_eq!(with_padding.dropped(), 2);
    assert_eq!(
        plain.evaluate(&factors).unwrap(),
        with_padding.evaluate(&factors).unwrap()
    );
}

#[test]
fn test_only_unknown_ids_is_an_error() {
    let pre = Preprocessor::new(
        &training_records(),
        PreprocessConfig::for_weights(&weights(), 0.999),
    )
    .unwrap();
    let factors = small_als().fit(&pre.build_matrix(&weights()).unwrap()).unwrap();

    let holdout = vec![(RawId::Int(77), RawId::Int(78))];
    let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), pre.maps());
    assert!(matches!(
        evaluator.evaluate(&factors),
        Err(RuntimeError::EmptyEvaluationSet)
    ));
}

#[test]
fn test_fresh_fit_per_call() {
    let pre = Preprocessor::new(
        &training_records(),
        PreprocessConfig::for_weights(&weights(), 0.999),
    )
    .unwrap();
    let als = small_als();
    let matrix = pre.build_matrix(&weights()).unwrap();

    let first = als.fit(&matrix).unwrap();
    let _other = als
        .fit(&pre.build_matrix(&StrengthWeights { ratio: 5.0, ..weights() }).unwrap())
        .unwrap();
    let again = als.fit(&matrix).unwrap();
    assert_eq!(first, again);
}

// ========== Persistence ==========

#[test]
fn test_artifacts_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp_dir.path().join("run")).unwrap();

    let pre = Preprocessor::new(
        &training_records(),
        PreprocessConfig::for_weights(&weights(), 0.999),
    )
    .unwrap();
    let factors = small_als().fit(&pre.build_matrix(&weights()).unwrap()).unwrap();

    store.save_index_maps(pre.maps()).unwrap();
    store.save_factors(&factors).unwrap();

    assert_eq!(&store.load_index_maps().unwrap(), pre.maps());
    let restored = store.load_factors().unwrap();
    assert_eq!(restored.user_factors.dim(), factors.user_factors.dim());
    for (a, b) in restored.item_factors.iter().zip(factors.item_factors.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_missing_artifact_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp_dir.path()).unwrap();
    assert!(matches!(store.load_index_maps(), Err(RuntimeError::Io(_))));
}
