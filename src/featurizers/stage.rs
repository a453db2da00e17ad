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

//! # Transformer Stages
//!
//! Final pipeline stage that turns the annotations of a column into a
//! transformer. The stage itself holds no trained state: every
//! `create_transformer` call asks its [`ZiTransformerFactory`] to build a
//! fresh transformer from the annotation store.

use std::marker::PhantomData;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::errors::Result;
use crate::estimator::{
    ZiEstimator, ZiFitResult, ZiTrainingState, ZiTrainingTracker, ZiTransformerEstimator,
};
use crate::transformer::ZiTransformer;

/// Builds transformers from published annotations.
pub trait ZiTransformerFactory<I>: Send {
    /// Estimator name of the stage.
    const NAME: &'static str;

    type Transformer: ZiTransformer;

    /// Stages that require training report `Complete` on their first `fit`
    /// instead of being complete right after `begin_training`.
    fn requires_training(&self) -> bool {
        false
    }

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer>;
}

/// Transformer estimator backed by a factory.
pub struct ZiTransformerStage<I, F> {
    tracker: ZiTrainingTracker,
    factory: F,
    annotations: ZiAnnotationView,
    _input: PhantomData<fn(&I)>,
}

impl<I, F: ZiTransformerFactory<I>> ZiTransformerStage<I, F> {
    pub fn with_factory(store: ZiAnnotationStoreRef, column: usize, factory: F) -> Result<Self> {
        Ok(Self {
            tracker: ZiTrainingTracker::new(),
            factory,
            annotations: ZiAnnotationView::new(store, column)?,
            _input: PhantomData,
        })
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn column(&self) -> usize {
        self.annotations.column()
    }
}

impl<I, F: ZiTransformerFactory<I>> ZiEstimator<I> for ZiTransformerStage<I, F> {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn state(&self) -> ZiTrainingState {
        self.tracker.state()
    }

    fn is_training_complete(&self) -> bool {
        self.tracker.is_training_complete()
    }

    fn begin_training(&mut self) -> Result<()> {
        self.tracker.begin(F::NAME, self.factory.requires_training())
    }

    fn fit_batch(&mut self, inputs: &[I]) -> Result<ZiFitResult> {
        self.tracker.check_fit(F::NAME, inputs.len())?;
        Ok(self.tracker.record(ZiFitResult::Complete))
    }

    fn on_data_completed(&mut self) -> Result<()> {
        self.tracker.data_completed(F::NAME)
    }

    fn complete_training(&mut self) -> Result<()> {
        self.tracker.check_complete(F::NAME)?;
        self.tracker.mark_finished();
        log::debug!("estimator '{}' finished training", F::NAME);
        Ok(())
    }
}

impl<I, F: ZiTransformerFactory<I>> ZiTransformerEstimator<I> for ZiTransformerStage<I, F> {
    type Transformer = F::Transformer;

    fn create_transformer(&self) -> Result<F::Transformer> {
        self.tracker.check_finished(F::NAME)?;
        self.factory.create(&self.annotations)
    }
}
