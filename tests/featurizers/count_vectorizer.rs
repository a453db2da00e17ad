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

//! # Zift Featurizer Tests - Count Vectorizer
//!
//! End-to-end tests for the count vectorizer: term counts as sparse
//! vectors, binary mode, document-frequency pruning, seeded vocabularies,
//! lowercasing and persistence.
//!
//! ## Test Categories
//!
//! - **Counting**: sparse output ordered by term index
//! - **Configuration**: binary, bounds, vocabulary, analyzers
//! - **Persistence**: save and load of trained transformers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test count_vectorizer
//! ```

use std::collections::BTreeMap;

use zift::annotation::ZiAnnotationStore;
use zift::featurizers::count_vectorizer::{
    count_vectorizer_factory, ZiCountVectorizerConfig, ZiCountVectorizerEstimator,
    ZiCountVectorizerTransformer, ZiSparseValue, ZiSparseVector,
};
use zift::strings::ZiAnalyzer;
use zift::{fit_transformer, ZiError, ZiLoadable, ZiTransformer};

const TRAINING: [&str; 3] = [
    "orange apple orange grape",
    "grape carrot carrot apple",
    "peach banana orange banana",
];

const QUERY: &str = "banana grape grape apple apple apple orange";

fn train(config: &ZiCountVectorizerConfig, documents: &[&str]) -> ZiCountVectorizerTransformer {
    let store = ZiAnnotationStore::new(1);
    let mut estimator = ZiCountVectorizerEstimator::new(store, 0, config).unwrap();
    let documents: Vec<String> = documents.iter().map(|document| document.to_string()).collect();
    fit_transformer(&mut estimator, &documents).unwrap()
}

fn sparse(num_elements: u64, entries: &[(u32, u64)]) -> ZiSparseVector<u32> {
    ZiSparseVector {
        num_elements,
        values: entries
            .iter()
            .map(|(value, index)| ZiSparseValue {
                value: *value,
                index: *index,
            })
            .collect(),
    }
}

/// Tests term counts over the full training vocabulary.
///
/// Verifies that the vector spans every trained term and that entries are
/// ordered by term index.
#[test]
fn test_counts() {
    let mut transformer = train(&ZiCountVectorizerConfig::default(), &TRAINING);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(6, &[(3, 0), (1, 1), (2, 3), (1, 4)])
    );
}

#[test]
fn test_binary() {
    let config = ZiCountVectorizerConfig {
        binary: true,
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &TRAINING);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(6, &[(1, 0), (1, 1), (1, 3), (1, 4)])
    );
}

/// Tests that `min_df` shrinks the vocabulary and re-indexes it densely.
#[test]
fn test_min_document_frequency() {
    let config = ZiCountVectorizerConfig {
        min_df: 0.5,
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &TRAINING);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(3, &[(3, 0), (2, 1), (1, 2)])
    );
}

/// Tests that a seeded vocabulary decides the output indices.
#[test]
fn test_seeded_vocabulary() {
    let vocabulary: BTreeMap<String, u32> = [("apple", 2u32), ("grape", 1), ("orange", 0)]
        .iter()
        .map(|(term, index)| (term.to_string(), *index))
        .collect();
    let config = ZiCountVectorizerConfig {
        min_df: 0.5,
        vocabulary: Some(vocabulary),
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &TRAINING);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(3, &[(1, 0), (2, 1), (3, 2)])
    );
}

/// Tests that the vector spans the largest seeded index even when the
/// seeded indices leave gaps.
#[test]
fn test_sparse_seeded_indices() {
    let vocabulary: BTreeMap<String, u32> = [("apple", 9u32), ("grape", 4), ("orange", 0)]
        .iter()
        .map(|(term, index)| (term.to_string(), *index))
        .collect();
    let config = ZiCountVectorizerConfig {
        min_df: 0.5,
        vocabulary: Some(vocabulary),
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &TRAINING);
    assert_eq!(transformer.labels().len(), 3);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(10, &[(1, 0), (2, 4), (3, 9)])
    );
}

/// Tests lowercasing at inference time.
#[test]
fn test_lowercasing() {
    let mut lowered = train(&ZiCountVectorizerConfig::default(), &TRAINING);
    assert_eq!(
        lowered.execute(&"BANANA Grape".to_string()).unwrap(),
        sparse(6, &[(1, 1), (1, 3)])
    );

    let config = ZiCountVectorizerConfig {
        lower: false,
        ..ZiCountVectorizerConfig::default()
    };
    let mut exact = train(&config, &TRAINING);
    assert_eq!(
        exact.execute(&"BANANA grape".to_string()).unwrap(),
        sparse(6, &[(1, 3)])
    );
}

#[test]
fn test_unknown_terms_give_empty_vector() {
    let mut transformer = train(&ZiCountVectorizerConfig::default(), &TRAINING);
    assert_eq!(transformer.execute(&"kiwi mango".to_string()).unwrap(), sparse(6, &[]));
    assert_eq!(transformer.execute(&String::new()).unwrap(), sparse(6, &[]));
}

#[test]
fn test_char_analyzer() {
    let config = ZiCountVectorizerConfig {
        analyzer: ZiAnalyzer::Char,
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &["ab", "bb"]);
    assert_eq!(
        transformer.execute(&"aab".to_string()).unwrap(),
        sparse(2, &[(2, 0), (1, 1)])
    );
}

/// Tests that a trained transformer survives save and load.
#[test]
fn test_round_trip() {
    let config = ZiCountVectorizerConfig {
        regex: Some("[a-z]+".to_string()),
        binary: true,
        ..ZiCountVectorizerConfig::default()
    };
    let mut transformer = train(&config, &TRAINING);
    let bytes = transformer.to_bytes().unwrap();
    let mut loaded = ZiCountVectorizerTransformer::from_bytes(&bytes).unwrap();

    assert_eq!(loaded, transformer);
    assert_eq!(loaded.parser().regex_pattern(), "[a-z]+");
    assert_eq!(
        loaded.execute(&QUERY.to_string()).unwrap(),
        transformer.execute(&QUERY.to_string()).unwrap()
    );
}

#[test]
fn test_corrupt_payload() {
    let transformer = train(&ZiCountVectorizerConfig::default(), &TRAINING);
    let mut bytes = transformer.to_bytes().unwrap();
    // Analyzer byte, empty regex, n-gram range.
    let analyzer_offset = bytes.len() - 13;
    bytes[analyzer_offset] = 9;
    assert!(matches!(
        ZiCountVectorizerTransformer::from_bytes(&bytes),
        Err(ZiError::CorruptArchive { .. })
    ));
}

#[test]
fn test_empty_vocabulary_is_rejected() {
    assert!(matches!(
        ZiCountVectorizerTransformer::new(BTreeMap::new(), false, true, ZiAnalyzer::Word, None, 1, 1),
        Err(ZiError::InvalidArgument { .. })
    ));
}

/// Tests the JSON factory.
#[test]
fn test_factory() {
    let store = ZiAnnotationStore::new(1);
    let config = serde_json::json!({ "binary": true, "top_k_terms": 2 });
    let mut estimator = count_vectorizer_factory(store, 0, &config).unwrap();
    let documents: Vec<String> = TRAINING.iter().map(|document| document.to_string()).collect();
    let mut transformer = fit_transformer(&mut estimator, &documents).unwrap();

    // apple, grape and orange tie at two documents; the first two in text order win.
    assert_eq!(transformer.labels().len(), 2);
    assert_eq!(
        transformer.execute(&QUERY.to_string()).unwrap(),
        sparse(2, &[(1, 0), (1, 1)])
    );
}
