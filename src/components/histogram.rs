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

use std::collections::BTreeMap;

use crate::annotation::ZiAnnotationView;
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::Result;
use crate::estimator::ZiFitResult;
use crate::scalar::{ZiKey, ZiNullable};

/// Occurrence count per distinct value.
pub type ZiHistogram<T> = BTreeMap<ZiKey<T>, u32>;

/// Counts every present value; missing values are skipped.
#[derive(Debug)]
pub struct ZiHistogramPolicy<I: ZiNullable> {
    histogram: ZiHistogram<I::Value>,
}

impl<I: ZiNullable> ZiHistogramPolicy<I> {
    pub fn new() -> Self {
        Self {
            histogram: BTreeMap::new(),
        }
    }
}

impl<I: ZiNullable> Default for ZiHistogramPolicy<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ZiNullable> ZiTrainingPolicy<I> for ZiHistogramPolicy<I> {
    const NAME: &'static str = "HistogramEstimator";
    type Annotation = ZiHistogram<I::Value>;

    fn fit(&mut self, input: &I) -> Result<ZiFitResult> {
        if let Some(value) = input.as_present() {
            let count = self.histogram.entry(ZiKey(value.clone())).or_insert(0);
            *count = count.saturating_add(1);
        }
        Ok(ZiFitResult::Continue)
    }

    fn complete_training(&mut self, _annotations: &ZiAnnotationView) -> Result<Self::Annotation> {
        Ok(std::mem::take(&mut self.histogram))
    }
}

/// Histogram estimator over a nullable input.
pub type ZiHistogramEstimator<I> = ZiAnnotationEstimator<I, ZiHistogramPolicy<I>>;
