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

//! # Forward Fill Imputer
//!
//! Replaces missing values with the most recent present value. The
//! transformer is stateful: every present input becomes the new fill value,
//! and a missing input before any present one stays missing.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::errors::Result;
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::scalar::ZiNullable;
use crate::transformer::{ZiLoadable, ZiTransformer};

/// Forward fill takes no settings; unknown keys are rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZiForwardFillImputerConfig {}

#[derive(Clone, Debug, PartialEq)]
pub struct ZiForwardFillImputerTransformer<I: ZiNullable> {
    last: Option<I::Value>,
}

impl<I: ZiNullable> ZiForwardFillImputerTransformer<I> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Value returned for the next missing input.
    pub fn last_value(&self) -> Option<&I::Value> {
        self.last.as_ref()
    }
}

impl<I: ZiNullable> Default for ZiForwardFillImputerTransformer<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ZiNullable> ZiTransformer for ZiForwardFillImputerTransformer<I> {
    type Input = I;
    type Output = Option<I::Value>;

    fn name(&self) -> &'static str {
        "ForwardFillImputerTransformer"
    }

    fn execute(&mut self, input: &I) -> Result<Option<I::Value>> {
        if let Some(value) = input.as_present() {
            self.last = Some(value.clone());
        }
        Ok(self.last.clone())
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.last.write_to(archive);
        Ok(())
    }
}

impl<I: ZiNullable> ZiLoadable for ZiForwardFillImputerTransformer<I> {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        Ok(Self {
            last: Option::<I::Value>::read_from(reader)?,
        })
    }
}

/// Creates a fresh imputer; the stage completes on its first `fit`.
#[derive(Debug)]
pub struct ZiForwardFillImputerFactory<I> {
    _input: PhantomData<fn(&I)>,
}

impl<I: ZiNullable> ZiTransformerFactory<I> for ZiForwardFillImputerFactory<I> {
    const NAME: &'static str = "ForwardFillImputerEstimator";
    type Transformer = ZiForwardFillImputerTransformer<I>;

    fn requires_training(&self) -> bool {
        true
    }

    fn create(&self, _annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        Ok(ZiForwardFillImputerTransformer::new())
    }
}

pub type ZiForwardFillImputerEstimator<I> = ZiTransformerStage<I, ZiForwardFillImputerFactory<I>>;

impl<I: ZiNullable> ZiForwardFillImputerEstimator<I> {
    pub fn new(store: ZiAnnotationStoreRef, column: usize) -> Result<Self> {
        ZiTransformerStage::with_factory(
            store,
            column,
            ZiForwardFillImputerFactory {
                _input: PhantomData,
            },
        )
    }
}

pub fn forward_fill_imputer_factory<I: ZiNullable>(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiForwardFillImputerEstimator<I>> {
    let _config: ZiForwardFillImputerConfig = serde_json::from_value(config.clone())?;
    ZiForwardFillImputerEstimator::new(store, column)
}
