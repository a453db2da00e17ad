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

//! # Zift Configuration Tests - Featurizer Descriptions
//!
//! Tests for featurizer descriptions stored in JSON and YAML files and
//! for building estimators from them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test featurizer_spec
//! ```

use std::fs;

use tempfile::TempDir;

use zift::annotation::ZiAnnotationStore;
use zift::featurizers::spec::{ZiFeaturizerKind, ZiFeaturizerSpec};
use zift::{fit_transformer, ZiError, ZiTransformer};

/// Tests loading a YAML description and training from it.
#[test]
fn test_yaml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fruit.yaml");
    fs::write(
        &path,
        "featurizer: label_encoder\ncolumn: 1\nconfig:\n  allow_missing_values: true\n",
    )
    .unwrap();

    let spec = ZiFeaturizerSpec::from_path(&path).unwrap();
    assert_eq!(spec.featurizer, ZiFeaturizerKind::LabelEncoder);
    assert_eq!(spec.column, 1);

    let store = ZiAnnotationStore::new(2);
    let mut estimator = spec.label_encoder::<String>(store.clone()).unwrap();
    let data: Vec<String> = ["pear", "fig"].iter().map(|s| s.to_string()).collect();
    let mut transformer = fit_transformer(&mut estimator, &data).unwrap();

    assert_eq!(transformer.execute(&"fig".to_string()).unwrap(), 1);
    assert_eq!(transformer.execute(&"kiwi".to_string()).unwrap(), 0);
    assert!(store.contains("IndexMapEstimator", 1));
    assert!(!store.contains("IndexMapEstimator", 0));
}

/// Tests loading a JSON description for the count vectorizer.
#[test]
fn test_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("words.json");
    fs::write(
        &path,
        r#"{"featurizer": "count_vectorizer", "config": {"analyzer": "word", "binary": true, "lower": false}}"#,
    )
    .unwrap();

    let spec = ZiFeaturizerSpec::from_path(&path).unwrap();
    let store = ZiAnnotationStore::new(1);
    let mut estimator = spec.count_vectorizer(store).unwrap();
    let documents = vec!["b a a".to_string(), "c".to_string()];
    let mut transformer = fit_transformer(&mut estimator, &documents).unwrap();

    let vector = transformer.execute(&"a a A c".to_string()).unwrap();
    assert_eq!(vector.num_elements, 3);
    assert_eq!(vector.values.len(), 2);
    assert!(vector.values.iter().all(|entry| entry.value == 1));
}

#[test]
fn test_files_without_yaml_extension_are_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spec.conf");
    fs::write(&path, "featurizer: numericalize\n").unwrap();
    assert!(matches!(ZiFeaturizerSpec::from_path(&path), Err(ZiError::Serde(_))));

    fs::write(&path, r#"{"featurizer": "numericalize"}"#).unwrap();
    assert_eq!(
        ZiFeaturizerSpec::from_path(&path).unwrap().featurizer,
        ZiFeaturizerKind::Numericalize
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        ZiFeaturizerSpec::from_path(&dir.path().join("absent.yml")),
        Err(ZiError::Io(_))
    ));
}

/// Tests validation of configurations against the named featurizer.
#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        ZiFeaturizerSpec::from_json_str(r#"{"featurizer": "one_hot_encoder"}"#),
        Err(ZiError::Serde(_))
    ));
    assert!(matches!(
        ZiFeaturizerSpec::from_yaml_str("featurizer: forward_fill_imputer\nconfig:\n  window: 2\n"),
        Err(ZiError::Serde(_))
    ));
    assert!(matches!(
        ZiFeaturizerSpec::from_yaml_str("featurizer: count_vectorizer\nconfig:\n  ngram_min: 3\n  ngram_max: 2\n"),
        Err(ZiError::InvalidArgument { .. })
    ));
    assert!(matches!(
        ZiFeaturizerSpec::from_yaml_str("featurizer: count_vectorizer\nconfig:\n  regex: '('\n"),
        Err(ZiError::InvalidArgument { .. })
    ));
}

#[test]
fn test_builder_checks_kind() {
    let spec = ZiFeaturizerSpec::from_json_str(r#"{"featurizer": "max_abs_scalar"}"#).unwrap();
    let store = ZiAnnotationStore::new(1);
    assert!(spec.max_abs_scalar::<f32>(store.clone()).is_ok());
    assert!(matches!(
        spec.numericalize::<f32>(store),
        Err(ZiError::InvalidArgument { .. })
    ));
}
