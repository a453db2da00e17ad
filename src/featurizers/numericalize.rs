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

//! # Numericalize
//!
//! Replaces a value by its dense label as a float. Values that were not
//! seen during training, and missing inputs, become `NaN`.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::components::index_map::{ZiIndexMap, ZiIndexMapPolicy};
use crate::components::training::ZiTrainingPolicy;
use crate::errors::Result;
use crate::featurizers::label_encoder::index_stages;
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::pipeline::ZiCPipelineEstimator;
use crate::scalar::{ZiKey, ZiNullable};
use crate::transformer::{ZiLoadable, ZiTransformer};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiNumericalizeConfig {
    pub max_training_items: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZiNumericalizeTransformer<I: ZiNullable> {
    labels: Arc<ZiIndexMap<I::Value>>,
}

impl<I: ZiNullable> ZiNumericalizeTransformer<I> {
    pub fn from_labels(labels: ZiIndexMap<I::Value>) -> Self {
        Self::from_shared(Arc::new(labels))
    }

    pub fn from_shared(labels: Arc<ZiIndexMap<I::Value>>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &ZiIndexMap<I::Value> {
        &self.labels
    }
}

impl<I: ZiNullable> ZiTransformer for ZiNumericalizeTransformer<I> {
    type Input = I;
    type Output = f64;

    fn name(&self) -> &'static str {
        "NumericalizeTransformer"
    }

    fn execute(&mut self, input: &I) -> Result<f64> {
        Ok(input
            .as_present()
            .and_then(|value| self.labels.get(&ZiKey(value.clone())))
            .map_or(f64::NAN, |label| f64::from(*label)))
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.labels.write_to(archive);
        Ok(())
    }
}

impl<I: ZiNullable> ZiLoadable for ZiNumericalizeTransformer<I> {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        Ok(Self::from_labels(ZiIndexMap::<I::Value>::read_from(reader)?))
    }
}

#[derive(Debug)]
pub struct ZiNumericalizeFactory<I> {
    _input: PhantomData<fn(&I)>,
}

impl<I: ZiNullable> ZiTransformerFactory<I> for ZiNumericalizeFactory<I> {
    const NAME: &'static str = "NumericalizeEstimator";
    type Transformer = ZiNumericalizeTransformer<I>;

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        let labels = annotations.get::<ZiIndexMap<I::Value>>(<ZiIndexMapPolicy<I> as ZiTrainingPolicy<I>>::NAME)?;
        Ok(ZiNumericalizeTransformer::from_shared(labels))
    }
}

pub type ZiNumericalizeEstimator<I> =
    ZiCPipelineEstimator<I, ZiTransformerStage<I, ZiNumericalizeFactory<I>>>;

impl<I: ZiNullable> ZiNumericalizeEstimator<I> {
    pub fn new(store: ZiAnnotationStoreRef, column: usize, config: &ZiNumericalizeConfig) -> Result<Self> {
        let stages = index_stages::<I>(&store, column, config.max_training_items)?;
        let last = ZiTransformerStage::with_factory(
            store,
            column,
            ZiNumericalizeFactory {
                _input: PhantomData,
            },
        )?;
        Ok(ZiCPipelineEstimator::compose("NumericalizeEstimator", stages, last))
    }
}

pub fn numericalize_factory<I: ZiNullable>(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiNumericalizeEstimator<I>> {
    let config: ZiNumericalizeConfig = serde_json::from_value(config.clone())?;
    ZiNumericalizeEstimator::new(store, column, &config)
}
