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

//! # Training-Only Estimators
//!
//! Estimators whose only output is an annotation. The per-value work is
//! supplied by a [`ZiTrainingPolicy`]; [`ZiAnnotationEstimator`] wraps it
//! with the training protocol, the optional training-item cap and the
//! annotation publishing.
//!
//! When the annotation store already holds this estimator's annotation for
//! the column, training is skipped and the existing annotation is reused.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::errors::{Result, ZiError};
use crate::estimator::{ZiEstimator, ZiFitResult, ZiTrainingState, ZiTrainingTracker};

/// Per-value behaviour of a training-only estimator.
pub trait ZiTrainingPolicy<I>: Send {
    /// Name the annotation is published under.
    const NAME: &'static str;

    type Annotation: Any + Send + Sync;

    /// Policies returning false never see `fit` and do all their work in
    /// `complete_training`.
    fn requires_training(&self) -> bool {
        true
    }

    fn fit(&mut self, input: &I) -> Result<ZiFitResult>;

    /// Produces the annotation. `annotations` gives access to annotations
    /// published earlier for the same column.
    fn complete_training(&mut self, annotations: &ZiAnnotationView) -> Result<Self::Annotation>;
}

/// Training-only estimator driven by a policy.
pub struct ZiAnnotationEstimator<I, P> {
    tracker: ZiTrainingTracker,
    policy: P,
    annotations: ZiAnnotationView,
    max_training_items: Option<usize>,
    remaining_items: Option<usize>,
    reused: bool,
    _input: PhantomData<fn(&I)>,
}

impl<I, P: ZiTrainingPolicy<I>> ZiAnnotationEstimator<I, P> {
    /// Fails with `InvalidArgument` when `column` is outside the store.
    pub fn new(store: ZiAnnotationStoreRef, column: usize, policy: P) -> Result<Self> {
        Ok(Self {
            tracker: ZiTrainingTracker::new(),
            policy,
            annotations: ZiAnnotationView::new(store, column)?,
            max_training_items: None,
            remaining_items: None,
            reused: false,
            _input: PhantomData,
        })
    }

    /// Stops training after `count` items; the `fit` call that consumes the
    /// last allowed item returns `Complete`.
    pub fn with_max_training_items(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ZiError::invalid_argument("max training items must be positive"));
        }
        self.max_training_items = Some(count);
        Ok(self)
    }

    pub fn column(&self) -> usize {
        self.annotations.column()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// True when training was skipped because the annotation already existed.
    pub fn reused_existing(&self) -> bool {
        self.reused
    }

    /// Reads the published annotation.
    pub fn annotation(&self) -> Result<Arc<P::Annotation>> {
        self.annotations.get(P::NAME)
    }
}

impl<I, P: ZiTrainingPolicy<I>> ZiEstimator<I> for ZiAnnotationEstimator<I, P> {
    fn name(&self) -> &'static str {
        P::NAME
    }

    fn state(&self) -> ZiTrainingState {
        self.tracker.state()
    }

    fn is_training_complete(&self) -> bool {
        self.tracker.is_training_complete()
    }

    fn begin_training(&mut self) -> Result<()> {
        let reused = self.annotations.contains(P::NAME);
        self.tracker
            .begin(P::NAME, self.policy.requires_training() && !reused)?;
        self.reused = reused;
        self.remaining_items = self.max_training_items;
        if reused {
            log::debug!(
                "estimator '{}' reuses the existing annotation for column {}",
                P::NAME,
                self.annotations.column()
            );
        }
        Ok(())
    }

    fn fit_batch(&mut self, inputs: &[I]) -> Result<ZiFitResult> {
        self.tracker.check_fit(P::NAME, inputs.len())?;

        let limit = self
            .remaining_items
            .map_or(inputs.len(), |remaining| remaining.min(inputs.len()));

        let mut result = ZiFitResult::Continue;
        let mut consumed = 0usize;
        for input in &inputs[..limit] {
            consumed += 1;
            result = self.policy.fit(input)?;
            if result != ZiFitResult::Continue {
                break;
            }
        }

        if let Some(remaining) = self.remaining_items.as_mut() {
            *remaining -= consumed;
            if *remaining == 0 {
                result = ZiFitResult::Complete;
            }
        }

        Ok(self.tracker.record(result))
    }

    fn on_data_completed(&mut self) -> Result<()> {
        self.tracker.data_completed(P::NAME)
    }

    fn complete_training(&mut self) -> Result<()> {
        self.tracker.check_complete(P::NAME)?;

        if !self.reused {
            let annotation = self.policy.complete_training(&self.annotations)?;
            self.annotations.publish(P::NAME, annotation)?;
        }

        self.tracker.mark_finished();
        log::info!(
            "estimator '{}' finished training for column {}",
            P::NAME,
            self.annotations.column()
        );
        Ok(())
    }
}
