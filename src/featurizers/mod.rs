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

//! # Featurizers Module
//!
//! Complete estimator/transformer pairs built from the training components.
//!
//! ## Featurizers
//!
//! - **label_encoder**: value to dense label, histogram then index map
//! - **numericalize**: value to label as `f64`, `NaN` when unknown
//! - **forward_fill**: missing values replaced by the last present value
//! - **max_abs_scalar**: division by the largest training magnitude
//! - **count_vectorizer**: document to sparse term counts
//! - **tfidf_vectorizer**: document to normalised tf-idf weights
//!
//! Every featurizer has a `serde` configuration struct and a factory taking
//! a JSON object; [`spec::ZiFeaturizerSpec`] reads named descriptions from
//! files.

pub mod count_vectorizer;
pub mod forward_fill;
pub mod label_encoder;
pub mod max_abs_scalar;
pub mod numericalize;
pub mod spec;
pub mod stage;
pub mod tfidf_vectorizer;
