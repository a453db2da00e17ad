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

//! # Zift Featurizer Tests - Numericalize
//!
//! Tests for numericalize: dense ids as floats, NaN for unknown input and
//! persistence of trained and hand-built maps.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test numericalize
//! ```

use zift::annotation::ZiAnnotationStore;
use zift::archive::ZiCArchive;
use zift::archive::ZiArchivable;
use zift::components::index_map::ZiIndexMap;
use zift::featurizers::numericalize::{
    numericalize_factory, ZiNumericalizeConfig, ZiNumericalizeEstimator, ZiNumericalizeTransformer,
};
use zift::scalar::ZiKey;
use zift::{fit_transformer, ZiError, ZiLoadable, ZiTransformer};

const TRAINING: [u32; 10] = [10, 20, 10, 30, 10, 10, 11, 15, 18, 8];

fn trained() -> ZiNumericalizeTransformer<u32> {
    let store = ZiAnnotationStore::new(1);
    let mut estimator =
        ZiNumericalizeEstimator::<u32>::new(store, 0, &ZiNumericalizeConfig::default()).unwrap();
    fit_transformer(&mut estimator, &TRAINING).unwrap()
}

fn numbers(transformer: &mut ZiNumericalizeTransformer<u32>, inputs: &[u32]) -> Vec<f64> {
    inputs.iter().map(|input| transformer.execute(input).unwrap()).collect()
}

/// Tests ids produced after training, before and after a reload.
#[test]
fn test_trained_ids_survive_reload() {
    let mut transformer = trained();
    let inputs = [11, 8, 10, 15, 20];
    assert_eq!(numbers(&mut transformer, &inputs), vec![2.0, 0.0, 1.0, 3.0, 5.0]);

    let mut loaded = ZiNumericalizeTransformer::<u32>::from_bytes(&transformer.to_bytes().unwrap()).unwrap();
    assert_eq!(numbers(&mut loaded, &inputs), vec![2.0, 0.0, 1.0, 3.0, 5.0]);
}

#[test]
fn test_string_ids() {
    let store = ZiAnnotationStore::new(1);
    let mut estimator =
        ZiNumericalizeEstimator::<String>::new(store, 0, &ZiNumericalizeConfig::default()).unwrap();
    let training: Vec<String> = ["orange", "apple", "orange", "grape", "carrot", "carrot", "peach", "banana", "orange"]
        .iter()
        .map(|item| item.to_string())
        .collect();
    let mut transformer = fit_transformer(&mut estimator, &training).unwrap();

    let ids: Vec<f64> = ["banana", "grape", "apple"]
        .iter()
        .map(|item| transformer.execute(&item.to_string()).unwrap())
        .collect();
    assert_eq!(ids, vec![1.0, 3.0, 0.0]);
}

/// Tests that unseen and missing inputs become NaN instead of failing.
#[test]
fn test_unknown_input_is_nan() {
    let mut transformer = trained();
    assert!(transformer.execute(&12).unwrap().is_nan());

    let store = ZiAnnotationStore::new(1);
    let mut estimator =
        numericalize_factory::<Option<f32>>(store, 0, &serde_json::json!({})).unwrap();
    let mut nullable = fit_transformer(&mut estimator, &[Some(1.5), None]).unwrap();
    assert_eq!(nullable.execute(&Some(1.5)).unwrap(), 0.0);
    assert!(nullable.execute(&None).unwrap().is_nan());
    assert!(nullable.execute(&Some(f32::NAN)).unwrap().is_nan());
}

/// Tests persistence of a hand-built map.
#[test]
fn test_direct_map_round_trip() {
    let labels: ZiIndexMap<u32> = [(6u32, 1u32), (7, 2), (8, 3), (10, 4), (11, 5), (15, 6), (18, 7), (20, 8), (30, 9)]
        .into_iter()
        .map(|(value, label)| (ZiKey(value), label))
        .collect();
    let transformer = ZiNumericalizeTransformer::<u32>::from_labels(labels);

    let bytes = transformer.to_bytes().unwrap();
    let loaded = ZiNumericalizeTransformer::<u32>::from_bytes(&bytes).unwrap();
    assert_eq!(loaded.labels(), transformer.labels());
}

/// Tests that archives from another major version are refused.
#[test]
fn test_version_error() {
    let mut archive = ZiCArchive::new();
    2u16.write_to(&mut archive);
    0u16.write_to(&mut archive);
    0u32.write_to(&mut archive);

    let err = ZiNumericalizeTransformer::<u32>::from_bytes(archive.as_bytes()).unwrap_err();
    assert!(matches!(err, ZiError::VersionMismatch { major: 2, .. }));
}
