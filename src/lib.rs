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

//! # Zift Core Library
//!
//! Streaming feature transformation: estimators learn from data one value at
//! a time, then produce transformers that map values to features and can be
//! persisted in a compact binary archive.
//!
//! ## Module Overview
//!
//! - **errors**: `ZiError`, `ZiErrorKind` and the crate `Result`
//! - **archive**: binary codec and version header
//! - **estimator**: training protocol shared by every estimator
//! - **transformer**: inference contract, save and load
//! - **annotation**: per-column store of training results
//! - **pipeline**: chains estimators that work on one column
//! - **components**: training-only building blocks (histogram, index map,
//!   document statistics, max-abs value)
//! - **featurizers**: label encoder, numericalize, forward-fill imputer,
//!   max-abs scalar, count vectorizer, tf-idf vectorizer
//! - **strings**: analyzers and n-gram tokenizers
//! - **select**: partial selection
//! - **scalar**: the closed set of value types
//! - **ffi**: C entry points over handle registries
//!
//! ## Quick Start
//!
//! ```rust
//! use zift::annotation::ZiAnnotationStore;
//! use zift::estimator::fit_transformer;
//! use zift::featurizers::label_encoder::{ZiLabelEncoderConfig, ZiLabelEncoderEstimator};
//! use zift::transformer::ZiTransformer;
//!
//! let store = ZiAnnotationStore::new(1);
//! let mut estimator =
//!     ZiLabelEncoderEstimator::<String>::new(store, 0, &ZiLabelEncoderConfig::default()).unwrap();
//! let data: Vec<String> = ["orange", "apple", "orange"].iter().map(|s| s.to_string()).collect();
//!
//! let mut transformer = fit_transformer(&mut estimator, &data).unwrap();
//! assert_eq!(transformer.execute(&"orange".to_string()).unwrap(), 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Nothing is retried
//! internally; at the C boundary errors become [`ffi::ZiCBoundaryError`]
//! values.

pub mod annotation;
pub mod archive;
pub mod components;
pub mod errors;
pub mod estimator;
pub mod featurizers;
pub mod ffi;
pub mod pipeline;
pub mod scalar;
pub mod select;
pub mod strings;
pub mod transformer;

pub use annotation::{ZiAnnotationStore, ZiAnnotationStoreRef, ZiAnnotationView};
pub use archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
pub use errors::{Result, ZiError, ZiErrorKind};
pub use estimator::{
    fit_transformer, train_over, ZiEstimator, ZiFitResult, ZiTrainingState, ZiTrainingTracker,
    ZiTransformerEstimator,
};
pub use pipeline::ZiCPipelineEstimator;
pub use transformer::{ZiLoadable, ZiTransformer};

pub use components::document_statistics::{
    ZiDocumentStatisticsAnnotation, ZiDocumentStatisticsConfig, ZiDocumentStatisticsEstimator,
    ZiDocumentStatisticsPolicy,
};
pub use components::histogram::{ZiHistogram, ZiHistogramEstimator};
pub use components::index_map::{create_index_map, ZiIndexMap, ZiIndexMapEstimator};
pub use components::max_abs_value::ZiMaxAbsValueEstimator;

pub use featurizers::count_vectorizer::{
    ZiCountVectorizerConfig, ZiCountVectorizerEstimator, ZiCountVectorizerTransformer, ZiSparseValue,
    ZiSparseVector,
};
pub use featurizers::forward_fill::{ZiForwardFillImputerEstimator, ZiForwardFillImputerTransformer};
pub use featurizers::label_encoder::{ZiLabelEncoderConfig, ZiLabelEncoderEstimator, ZiLabelEncoderTransformer};
pub use featurizers::max_abs_scalar::{ZiMaxAbsScalarConfig, ZiMaxAbsScalarEstimator, ZiMaxAbsScalarTransformer};
pub use featurizers::numericalize::{ZiNumericalizeConfig, ZiNumericalizeEstimator, ZiNumericalizeTransformer};
pub use featurizers::spec::{ZiFeaturizerKind, ZiFeaturizerSpec};
pub use featurizers::tfidf_vectorizer::{
    ZiNorm, ZiTfidfVectorizerConfig, ZiTfidfVectorizerEstimator, ZiTfidfVectorizerTransformer, ZiTfidfWeighting,
};
