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

use crate::annotation::ZiAnnotationView;
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::Result;
use crate::estimator::ZiFitResult;
use crate::scalar::ZiMaxAbsInput;

/// Running maximum of `|x|`, starting at zero. `NaN` inputs never win.
#[derive(Debug)]
pub struct ZiMaxAbsValuePolicy<T: ZiMaxAbsInput> {
    max_abs: T::Output,
}

impl<T: ZiMaxAbsInput> ZiMaxAbsValuePolicy<T> {
    pub fn new() -> Self {
        Self {
            max_abs: T::Output::default(),
        }
    }
}

impl<T: ZiMaxAbsInput> Default for ZiMaxAbsValuePolicy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ZiMaxAbsInput> ZiTrainingPolicy<T> for ZiMaxAbsValuePolicy<T> {
    const NAME: &'static str = "MaxAbsValueEstimator";
    type Annotation = T::Output;

    fn fit(&mut self, input: &T) -> Result<ZiFitResult> {
        let candidate = input.abs_widened();
        if candidate > self.max_abs {
            self.max_abs = candidate;
        }
        Ok(ZiFitResult::Continue)
    }

    fn complete_training(&mut self, _annotations: &ZiAnnotationView) -> Result<T::Output> {
        Ok(self.max_abs)
    }
}

pub type ZiMaxAbsValueEstimator<T> = ZiAnnotationEstimator<T, ZiMaxAbsValuePolicy<T>>;
