//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zift.
//! The Zift project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zift Featurizer Tests - Label Encoder
//!
//! End-to-end tests for the label encoder: training, unseen values in both
//! modes, determinism under shuffled input and persistence.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test label_encoder
//! ```

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use zift::annotation::ZiAnnotationStore;
use zift::components::index_map::ZiIndexMap;
use zift::featurizers::label_encoder::{
    label_encoder_factory, ZiLabelEncoderConfig, ZiLabelEncoderEstimator, ZiLabelEncoderTransformer,
};
use zift::scalar::ZiKey;
use zift::{fit_transformer, ZiError, ZiLoadable, ZiTransformer};

const FRUIT: [&str; 9] = [
    "orange", "apple", "orange", "grape", "carrot", "carrot", "peach", "banana", "orange",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn train(items: &[String], allow_missing_values: bool) -> ZiLabelEncoderTransformer<String> {
    let store = ZiAnnotationStore::new(1);
    let config = ZiLabelEncoderConfig {
        allow_missing_values,
        ..ZiLabelEncoderConfig::default()
    };
    let mut estimator = ZiLabelEncoderEstimator::<String>::new(store, 0, &config).unwrap();
    fit_transformer(&mut estimator, items).unwrap()
}

fn encode(transformer: &mut ZiLabelEncoderTransformer<String>, items: &[&str]) -> zift::Result<Vec<u32>> {
    items
        .iter()
        .map(|item| transformer.execute(&item.to_string()))
        .collect()
}

/// Tests numeric labels trained over several batches.
#[test]
fn test_numeric_labels() {
    let store = ZiAnnotationStore::new(1);
    let mut estimator =
        ZiLabelEncoderEstimator::<u32>::new(store, 0, &ZiLabelEncoderConfig::default()).unwrap();
    let mut transformer =
        fit_transformer(&mut estimator, &[10u32, 20, 10, 30, 10, 10, 11, 15, 18, 8]).unwrap();

    let labels: Vec<u32> = [11u32, 8, 10, 15, 20]
        .iter()
        .map(|value| transformer.execute(value).unwrap())
        .collect();
    assert_eq!(labels, vec![2, 0, 1, 3, 5]);
}

#[test]
fn test_string_labels() {
    let mut transformer = train(&strings(&FRUIT), false);
    assert_eq!(encode(&mut transformer, &["banana", "grape", "apple"]).unwrap(), vec![1, 3, 0]);
}

/// Tests that unseen values map to `0` when missing values are allowed.
///
/// Verifies that every known label is shifted by one to make room.
#[test]
fn test_unseen_value_non_throw_mode() {
    let mut transformer = train(&strings(&FRUIT), true);
    assert_eq!(
        encode(&mut transformer, &["banana", "grape", "apple", "hello"]).unwrap(),
        vec![2, 4, 1, 0]
    );
}

/// Tests that unseen values fail in the default mode.
#[test]
fn test_unseen_value_throw_mode() {
    let mut transformer = train(&strings(&FRUIT), false);
    let err = encode(&mut transformer, &["banana", "hello"]).unwrap_err();
    assert!(matches!(err, ZiError::NotFound { .. }));
    assert!(err.to_string().contains("'input' was not found"));
}

/// Tests that labels do not depend on the order of the training data.
#[test]
fn test_shuffled_training_is_deterministic() {
    let mut items = Vec::new();
    for fruit in ["apple", "grape", "orange"] {
        items.extend(std::iter::repeat(fruit.to_string()).take(3));
    }

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5 {
        items.shuffle(&mut rng);
        let mut transformer = train(&items, false);
        assert_eq!(encode(&mut transformer, &["apple", "grape", "orange"]).unwrap(), vec![0, 1, 2]);
    }
}

/// Tests persistence of a numeric encoder built from a direct map.
#[test]
fn test_numeric_round_trip() {
    let labels: ZiIndexMap<u32> = [(6u32, 1u32), (7, 2), (8, 3), (10, 4), (11, 5), (15, 6), (18, 7), (20, 8), (30, 9)]
        .into_iter()
        .map(|(value, label)| (ZiKey(value), label))
        .collect();
    let transformer = ZiLabelEncoderTransformer::<u32>::from_labels(labels, true);

    let bytes = transformer.to_bytes().unwrap();
    // Version, entry count, nine entries and the mode flag.
    assert_eq!(bytes.len(), 4 + 4 + 9 * 8 + 1);

    let mut loaded = ZiLabelEncoderTransformer::<u32>::from_bytes(&bytes).unwrap();
    assert_eq!(loaded, transformer);
    assert_eq!(loaded.execute(&30).unwrap(), 10);
    assert_eq!(loaded.execute(&31).unwrap(), 0);
}

#[test]
fn test_string_round_trip_after_training() {
    let mut transformer = train(&strings(&FRUIT), false);
    let mut loaded = ZiLabelEncoderTransformer::<String>::from_bytes(&transformer.to_bytes().unwrap()).unwrap();

    assert_eq!(loaded, transformer);
    assert_eq!(
        encode(&mut loaded, &FRUIT).unwrap(),
        encode(&mut transformer, &FRUIT).unwrap()
    );
}

/// Tests nullable inputs and the JSON factory.
#[test]
fn test_nullable_inputs_from_factory() {
    let store = ZiAnnotationStore::new(1);
    let config = serde_json::json!({ "allow_missing_values": true });
    let mut estimator = label_encoder_factory::<Option<f64>>(store, 0, &config).unwrap();
    let mut transformer =
        fit_transformer(&mut estimator, &[Some(2.5), None, Some(f64::NAN), Some(-1.0)]).unwrap();

    assert_eq!(transformer.labels().len(), 2);
    assert_eq!(transformer.execute(&Some(-1.0)).unwrap(), 1);
    assert_eq!(transformer.execute(&Some(2.5)).unwrap(), 2);
    assert_eq!(transformer.execute(&None).unwrap(), 0);
}

#[test]
fn test_factory_rejects_unknown_shape() {
    let store = ZiAnnotationStore::new(1);
    let config = serde_json::json!({ "allow_missing_values": "yes" });
    assert!(matches!(
        label_encoder_factory::<i64>(store, 0, &config),
        Err(ZiError::Serde(_))
    ));
}

/// Tests that negative zero finds the label trained for zero.
#[test]
fn test_negative_zero_matches_zero() {
    let store = ZiAnnotationStore::new(1);
    let mut estimator =
        ZiLabelEncoderEstimator::<f64>::new(store, 0, &ZiLabelEncoderConfig::default()).unwrap();
    let mut transformer = fit_transformer(&mut estimator, &[0.0f64, 1.0, -0.0]).unwrap();

    assert_eq!(transformer.labels().len(), 2);
    assert_eq!(transformer.execute(&-0.0).unwrap(), 0);
    assert_eq!(transformer.execute(&0.0).unwrap(), 0);
    assert_eq!(transformer.execute(&1.0).unwrap(), 1);
}

proptest! {
    /// Labels depend only on the set of distinct training values.
    #[test]
    fn prop_labels_ignore_training_order(mut values in proptest::collection::vec(-20i64..20, 1..60), seed in any::<u64>()) {
        let store = ZiAnnotationStore::new(1);
        let mut estimator = ZiLabelEncoderEstimator::<i64>::new(store, 0, &ZiLabelEncoderConfig::default()).unwrap();
        let reference = fit_transformer(&mut estimator, &values).unwrap();

        values.shuffle(&mut StdRng::seed_from_u64(seed));
        let store = ZiAnnotationStore::new(1);
        let mut estimator = ZiLabelEncoderEstimator::<i64>::new(store, 0, &ZiLabelEncoderConfig::default()).unwrap();
        let shuffled = fit_transformer(&mut estimator, &values).unwrap();

        prop_assert_eq!(reference.labels(), shuffled.labels());
        let mut sorted = values.clone();
        sorted.sort_unstable();
        sorted.dedup();
        for (expected, value) in sorted.iter().enumerate() {
            prop_assert_eq!(reference.labels().get(&ZiKey(*value)), Some(&(expected as u32)));
        }
    }
}
