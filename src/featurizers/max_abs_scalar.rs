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

//! # Max Abs Scalar
//!
//! Scales every value by the largest magnitude seen during training, so
//! results fall in `[-1, 1]`. A column whose training values were all zero
//! passes values through, cast to the output type.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::components::max_abs_value::ZiMaxAbsValuePolicy;
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::Result;
use crate::estimator::ZiEstimator;
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::pipeline::ZiCPipelineEstimator;
use crate::scalar::ZiMaxAbsInput;
use crate::transformer::{ZiLoadable, ZiTransformer};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiMaxAbsScalarConfig {
    pub max_training_items: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZiMaxAbsScalarTransformer<T: ZiMaxAbsInput> {
    scale: T::Output,
}

impl<T: ZiMaxAbsInput> ZiMaxAbsScalarTransformer<T> {
    pub fn new(scale: T::Output) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> T::Output {
        self.scale
    }
}

impl<T: ZiMaxAbsInput> ZiTransformer for ZiMaxAbsScalarTransformer<T> {
    type Input = T;
    type Output = T::Output;

    fn name(&self) -> &'static str {
        "MaxAbsScalarTransformer"
    }

    fn execute(&mut self, input: &T) -> Result<T::Output> {
        let value = input.widen();
        if self.scale == T::Output::default() {
            return Ok(value);
        }
        Ok(value / self.scale)
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.scale.write_to(archive);
        Ok(())
    }
}

impl<T: ZiMaxAbsInput> ZiLoadable for ZiMaxAbsScalarTransformer<T> {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        Ok(Self::new(T::Output::read_from(reader)?))
    }
}

#[derive(Debug)]
pub struct ZiMaxAbsScalarFactory<T> {
    _input: PhantomData<fn(&T)>,
}

impl<T: ZiMaxAbsInput> ZiTransformerFactory<T> for ZiMaxAbsScalarFactory<T> {
    const NAME: &'static str = "MaxAbsScalarEstimator";
    type Transformer = ZiMaxAbsScalarTransformer<T>;

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        let scale = annotations.get::<T::Output>(<ZiMaxAbsValuePolicy<T> as ZiTrainingPolicy<T>>::NAME)?;
        Ok(ZiMaxAbsScalarTransformer::new(*scale))
    }
}

pub type ZiMaxAbsScalarEstimator<T> =
    ZiCPipelineEstimator<T, ZiTransformerStage<T, ZiMaxAbsScalarFactory<T>>>;

impl<T: ZiMaxAbsInput> ZiMaxAbsScalarEstimator<T> {
    pub fn new(store: ZiAnnotationStoreRef, column: usize, config: &ZiMaxAbsScalarConfig) -> Result<Self> {
        let mut max_abs = ZiAnnotationEstimator::new(store.clone(), column, ZiMaxAbsValuePolicy::<T>::new())?;
        if let Some(count) = config.max_training_items {
            max_abs = max_abs.with_max_training_items(count)?;
        }
        let last = ZiTransformerStage::with_factory(
            store,
            column,
            ZiMaxAbsScalarFactory {
                _input: PhantomData,
            },
        )?;
        Ok(ZiCPipelineEstimator::compose(
            "MaxAbsScalarEstimator",
            vec![Box::new(max_abs) as Box<dyn ZiEstimator<T>>],
            last,
        ))
    }
}

pub fn max_abs_scalar_factory<T: ZiMaxAbsInput>(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiMaxAbsScalarEstimator<T>> {
    let config: ZiMaxAbsScalarConfig = serde_json::from_value(config.clone())?;
    ZiMaxAbsScalarEstimator::new(store, column, &config)
}
