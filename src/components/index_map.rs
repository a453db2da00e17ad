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

//! # Index Map
//!
//! Dense id assignment over the keys of a histogram. Keys that are not in
//! the seed map receive ids in ascending key order, each id being the size
//! of the map at the time of insertion, so the result depends only on the
//! set of distinct keys and the seed.
//!
//! Seed ids are kept as given. A seed whose ids are not `0..len` can collide
//! with newly assigned ids; callers own the consistency of their seed.

use std::collections::BTreeMap;

use crate::annotation::ZiAnnotationView;
use crate::components::histogram::{ZiHistogram, ZiHistogramPolicy};
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::{Result, ZiError};
use crate::estimator::ZiFitResult;
use crate::scalar::{ZiKey, ZiNullable};

/// Dense id per distinct value.
pub type ZiIndexMap<T> = BTreeMap<ZiKey<T>, u32>;

/// Extends `existing` with every key of `histogram` it does not contain yet.
pub fn create_index_map<K: Ord + Clone, V>(
    histogram: &BTreeMap<K, V>,
    existing: BTreeMap<K, u32>,
) -> Result<BTreeMap<K, u32>> {
    let mut index_map = existing;
    for key in histogram.keys() {
        if index_map.contains_key(key) {
            continue;
        }
        let id = u32::try_from(index_map.len())
            .map_err(|_| ZiError::invalid_argument("index map exceeds u32 ids"))?;
        index_map.insert(key.clone(), id);
    }
    Ok(index_map)
}

/// Reads the histogram annotation and assigns ids; never needs data.
#[derive(Debug)]
pub struct ZiIndexMapPolicy<I: ZiNullable> {
    source: &'static str,
    existing: ZiIndexMap<I::Value>,
}

impl<I: ZiNullable> ZiIndexMapPolicy<I> {
    /// Builds ids from the histogram published by [`ZiHistogramPolicy`].
    pub fn new() -> Self {
        Self::with_existing(ZiIndexMap::new())
    }

    pub fn with_existing(existing: ZiIndexMap<I::Value>) -> Self {
        Self {
            source: <ZiHistogramPolicy<I> as ZiTrainingPolicy<I>>::NAME,
            existing,
        }
    }
}

impl<I: ZiNullable> Default for ZiIndexMapPolicy<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ZiNullable> ZiTrainingPolicy<I> for ZiIndexMapPolicy<I> {
    const NAME: &'static str = "IndexMapEstimator";
    type Annotation = ZiIndexMap<I::Value>;

    fn requires_training(&self) -> bool {
        false
    }

    fn fit(&mut self, _input: &I) -> Result<ZiFitResult> {
        Ok(ZiFitResult::Complete)
    }

    fn complete_training(&mut self, annotations: &ZiAnnotationView) -> Result<Self::Annotation> {
        let histogram = annotations.get::<ZiHistogram<I::Value>>(self.source)?;
        create_index_map(&histogram, std::mem::take(&mut self.existing))
    }
}

pub type ZiIndexMapEstimator<I> = ZiAnnotationEstimator<I, ZiIndexMapPolicy<I>>;
