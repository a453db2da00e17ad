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

//! # Label Encoder
//!
//! Maps every distinct training value to a dense label.
//!
//! Training runs a histogram pass, then assigns ids in ascending value
//! order. At inference an unseen value is an error unless missing values are
//! allowed; in that mode unseen values map to `0` and every known label is
//! shifted up by one.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::components::histogram::ZiHistogramPolicy;
use crate::components::index_map::{ZiIndexMap, ZiIndexMapPolicy};
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::{Result, ZiError};
use crate::estimator::ZiEstimator;
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::pipeline::ZiCPipelineEstimator;
use crate::scalar::{ZiKey, ZiNullable};
use crate::transformer::{ZiLoadable, ZiTransformer};

/// Label encoder settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiLabelEncoderConfig {
    /// Map unseen values to `0` instead of failing.
    pub allow_missing_values: bool,
    /// Stop the histogram pass after this many items.
    pub max_training_items: Option<usize>,
}

/// Value to label lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiLabelEncoderTransformer<I: ZiNullable> {
    labels: Arc<ZiIndexMap<I::Value>>,
    allow_missing_values: bool,
}

impl<I: ZiNullable> ZiLabelEncoderTransformer<I> {
    pub fn from_labels(labels: ZiIndexMap<I::Value>, allow_missing_values: bool) -> Self {
        Self::from_shared(Arc::new(labels), allow_missing_values)
    }

    pub fn from_shared(labels: Arc<ZiIndexMap<I::Value>>, allow_missing_values: bool) -> Self {
        Self {
            labels,
            allow_missing_values,
        }
    }

    pub fn labels(&self) -> &ZiIndexMap<I::Value> {
        &self.labels
    }

    pub fn allow_missing_values(&self) -> bool {
        self.allow_missing_values
    }
}

impl<I: ZiNullable> ZiTransformer for ZiLabelEncoderTransformer<I> {
    type Input = I;
    type Output = u32;

    fn name(&self) -> &'static str {
        "LabelEncoderTransformer"
    }

    fn execute(&mut self, input: &I) -> Result<u32> {
        let label = input
            .as_present()
            .and_then(|value| self.labels.get(&ZiKey(value.clone())).copied());

        match (label, self.allow_missing_values) {
            (Some(label), false) => Ok(label),
            (Some(label), true) => Ok(label.saturating_add(1)),
            (None, true) => Ok(0),
            (None, false) => Err(ZiError::not_found("'input' was not found")),
        }
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.labels.write_to(archive);
        self.allow_missing_values.write_to(archive);
        Ok(())
    }
}

impl<I: ZiNullable> ZiLoadable for ZiLabelEncoderTransformer<I> {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let labels = ZiIndexMap::<I::Value>::read_from(reader)?;
        let allow_missing_values = bool::read_from(reader)?;
        Ok(Self::from_labels(labels, allow_missing_values))
    }
}

/// Final stage reading the index map of the column.
#[derive(Debug)]
pub struct ZiLabelEncoderFactory<I> {
    allow_missing_values: bool,
    _input: PhantomData<fn(&I)>,
}

impl<I: ZiNullable> ZiTransformerFactory<I> for ZiLabelEncoderFactory<I> {
    const NAME: &'static str = "LabelEncoderEstimator";
    type Transformer = ZiLabelEncoderTransformer<I>;

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        let labels = annotations.get::<ZiIndexMap<I::Value>>(<ZiIndexMapPolicy<I> as ZiTrainingPolicy<I>>::NAME)?;
        Ok(ZiLabelEncoderTransformer::from_shared(labels, self.allow_missing_values))
    }
}

pub type ZiLabelEncoderEstimator<I> =
    ZiCPipelineEstimator<I, ZiTransformerStage<I, ZiLabelEncoderFactory<I>>>;

impl<I: ZiNullable> ZiLabelEncoderEstimator<I> {
    pub fn new(store: ZiAnnotationStoreRef, column: usize, config: &ZiLabelEncoderConfig) -> Result<Self> {
        let stages = index_stages::<I>(&store, column, config.max_training_items)?;
        let last = ZiTransformerStage::with_factory(
            store,
            column,
            ZiLabelEncoderFactory {
                allow_missing_values: config.allow_missing_values,
                _input: PhantomData,
            },
        )?;
        Ok(ZiCPipelineEstimator::compose("LabelEncoderEstimator", stages, last))
    }
}

/// Histogram followed by index map, shared by the label-based featurizers.
pub(crate) fn index_stages<I: ZiNullable>(
    store: &ZiAnnotationStoreRef,
    column: usize,
    max_training_items: Option<usize>,
) -> Result<Vec<Box<dyn ZiEstimator<I>>>> {
    let mut histogram = ZiAnnotationEstimator::new(store.clone(), column, ZiHistogramPolicy::<I>::new())?;
    if let Some(count) = max_training_items {
        histogram = histogram.with_max_training_items(count)?;
    }
    let index_map = ZiAnnotationEstimator::new(store.clone(), column, ZiIndexMapPolicy::<I>::new())?;

    Ok(vec![
        Box::new(histogram) as Box<dyn ZiEstimator<I>>,
        Box::new(index_map) as Box<dyn ZiEstimator<I>>,
    ])
}

/// Builds a label encoder from a JSON configuration object.
pub fn label_encoder_factory<I: ZiNullable>(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiLabelEncoderEstimator<I>> {
    let config: ZiLabelEncoderConfig = serde_json::from_value(config.clone())?;
    ZiLabelEncoderEstimator::new(store, column, &config)
}
