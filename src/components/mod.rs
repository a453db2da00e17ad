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

//! # Components Module
//!
//! Training-only building blocks. Each component publishes one annotation
//! per column and produces no transformer of its own; featurizers chain them
//! through [`crate::pipeline::ZiCPipelineEstimator`].
//!
//! ## Components
//!
//! - **training**: policy trait and the generic annotation estimator
//! - **histogram**: occurrence count per distinct value
//! - **index_map**: dense id per distinct value
//! - **document_statistics**: document frequency of terms, with pruning
//! - **max_abs_value**: largest magnitude seen

pub mod document_statistics;
pub mod histogram;
pub mod index_map;
pub mod max_abs_value;
pub mod training;
