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

//! # Zift Estimator Module
//!
//! This module defines the training protocol every estimator follows.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending --begin_training--> Training --complete_training--> Finished
//!                              |   ^
//!                              fit / fit_batch / on_data_completed
//! ```
//!
//! While in `Training` an estimator also knows whether it still wants data.
//! A `fit` call that returns [`ZiFitResult::Complete`], or an
//! `on_data_completed` call, flips it to "training complete"; further `fit`
//! calls are rejected until `complete_training` moves it to `Finished`.
//!
//! ## Implementing Estimators
//!
//! Implementations embed a [`ZiTrainingTracker`] and route every protocol
//! call through it, so state validation lives in one place:
//!
//! ```rust
//! use zift::estimator::{ZiEstimator, ZiFitResult, ZiTrainingState, ZiTrainingTracker};
//! use zift::errors::Result;
//!
//! struct CountEstimator {
//!     tracker: ZiTrainingTracker,
//!     count: usize,
//! }
//!
//! impl ZiEstimator<i32> for CountEstimator {
//!     fn name(&self) -> &'static str {
//!         "CountEstimator"
//!     }
//!
//!     fn state(&self) -> ZiTrainingState {
//!         self.tracker.state()
//!     }
//!
//!     fn is_training_complete(&self) -> bool {
//!         self.tracker.is_training_complete()
//!     }
//!
//!     fn begin_training(&mut self) -> Result<()> {
//!         self.tracker.begin(self.name(), true)
//!     }
//!
//!     fn fit_batch(&mut self, inputs: &[i32]) -> Result<ZiFitResult> {
//!         self.tracker.check_fit(self.name(), inputs.len())?;
//!         self.count += inputs.len();
//!         Ok(self.tracker.record(ZiFitResult::Continue))
//!     }
//!
//!     fn on_data_completed(&mut self) -> Result<()> {
//!         self.tracker.data_completed(self.name())
//!     }
//!
//!     fn complete_training(&mut self) -> Result<()> {
//!         self.tracker.check_complete(self.name())?;
//!         self.tracker.mark_finished();
//!         Ok(())
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::transformer::ZiTransformer;

/// Training state of an estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ZiTrainingState {
    /// `begin_training` has not been called.
    Pending = 1,
    /// `fit` may be invoked.
    Training = 2,
    /// `complete_training` has been called.
    Finished = 3,
}

/// Result of a single `fit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ZiFitResult {
    /// Training is complete; further `fit` calls fail.
    Complete = 1,
    /// Continue to provide training data.
    Continue = 2,
    /// Continue training, restarting from the first training item.
    ResetAndContinue = 3,
}

/// Protocol shared by every estimator.
///
/// One instance must only be driven by one caller at a time; estimators are
/// `Send` so different instances can be trained on different threads.
pub trait ZiEstimator<I>: Send {
    /// Name under which the estimator publishes its annotation.
    fn name(&self) -> &'static str;

    fn state(&self) -> ZiTrainingState;

    /// True once the estimator needs no more training data.
    fn is_training_complete(&self) -> bool;

    /// Moves a `Pending` estimator to `Training`.
    fn begin_training(&mut self) -> Result<()>;

    /// Feeds a single training item.
    fn fit(&mut self, input: &I) -> Result<ZiFitResult> {
        self.fit_batch(std::slice::from_ref(input))
    }

    /// Feeds a non-empty batch of training items.
    fn fit_batch(&mut self, inputs: &[I]) -> Result<ZiFitResult>;

    /// Signals that the current pass over the training data has ended.
    fn on_data_completed(&mut self) -> Result<()>;

    /// Finalizes training and publishes annotations.
    fn complete_training(&mut self) -> Result<()>;
}

/// Estimator that produces a transformer once finished.
pub trait ZiTransformerEstimator<I>: ZiEstimator<I> {
    type Transformer: ZiTransformer;

    /// Creates an inference object. May be called any number of times once
    /// training has finished; every call returns an independent transformer.
    fn create_transformer(&self) -> Result<Self::Transformer>;
}

/// State bookkeeping shared by the estimator implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZiTrainingTracker {
    state: ZiTrainingState,
    training_complete: bool,
}

impl Default for ZiTrainingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ZiTrainingTracker {
    pub fn new() -> Self {
        Self {
            state: ZiTrainingState::Pending,
            training_complete: false,
        }
    }

    pub fn state(&self) -> ZiTrainingState {
        self.state
    }

    pub fn is_training_complete(&self) -> bool {
        match self.state {
            ZiTrainingState::Pending => false,
            ZiTrainingState::Training => self.training_complete,
            ZiTrainingState::Finished => true,
        }
    }

    /// `Pending -> Training`. Estimators that need no data pass
    /// `requires_data = false` and are training-complete straight away.
    pub fn begin(&mut self, name: &str, requires_data: bool) -> Result<()> {
        if self.state != ZiTrainingState::Pending {
            return Err(ZiError::invalid_state(format!(
                "`begin_training` called on '{name}' which is already {:?}",
                self.state
            )));
        }

        self.state = ZiTrainingState::Training;
        self.training_complete = !requires_data;
        log::debug!("estimator '{name}' began training (requires data: {requires_data})");
        Ok(())
    }

    /// Validates a `fit` call carrying `len` items.
    pub fn check_fit(&self, name: &str, len: usize) -> Result<()> {
        if self.state != ZiTrainingState::Training || self.training_complete {
            return Err(ZiError::invalid_state(format!(
                "`fit` called on '{name}' which is not training (state {:?}, training complete: {})",
                self.state, self.training_complete
            )));
        }
        if len == 0 {
            return Err(ZiError::invalid_argument(format!(
                "`fit` called on '{name}' with an empty buffer"
            )));
        }
        Ok(())
    }

    /// Records the outcome of a `fit` call and returns it.
    pub fn record(&mut self, result: ZiFitResult) -> ZiFitResult {
        if result == ZiFitResult::Complete {
            self.training_complete = true;
        }
        result
    }

    /// Marks the estimator as needing no more data.
    pub fn mark_training_complete(&mut self) {
        self.training_complete = true;
    }

    /// Validates an `on_data_completed` call.
    pub fn check_data_completed(&self, name: &str) -> Result<()> {
        if self.state != ZiTrainingState::Training {
            return Err(ZiError::invalid_state(format!(
                "`on_data_completed` called on '{name}' which is {:?}",
                self.state
            )));
        }
        Ok(())
    }

    /// Validates an `on_data_completed` call and marks training complete.
    pub fn data_completed(&mut self, name: &str) -> Result<()> {
        self.check_data_completed(name)?;
        self.training_complete = true;
        Ok(())
    }

    /// Validates a `complete_training` call. A second call fails.
    pub fn check_complete(&self, name: &str) -> Result<()> {
        match self.state {
            ZiTrainingState::Training => Ok(()),
            ZiTrainingState::Pending => Err(ZiError::invalid_state(format!(
                "`complete_training` called on '{name}' before `begin_training`"
            ))),
            ZiTrainingState::Finished => Err(ZiError::invalid_state(format!(
                "`complete_training` called on '{name}' which has already finished"
            ))),
        }
    }

    pub fn mark_finished(&mut self) {
        self.state = ZiTrainingState::Finished;
        self.training_complete = true;
    }

    /// Validates a `create_transformer` call.
    pub fn check_finished(&self, name: &str) -> Result<()> {
        if self.state != ZiTrainingState::Finished {
            return Err(ZiError::invalid_state(format!(
                "`create_transformer` called on '{name}' which is {:?}",
                self.state
            )));
        }
        Ok(())
    }
}

/// Drives `estimator` over `items` until it stops asking for data.
///
/// Restarts from the first item on [`ZiFitResult::ResetAndContinue`] and
/// calls `on_data_completed` at the end of every pass. The estimator must
/// already be training; `complete_training` is left to the caller.
pub fn train_over<I, E>(estimator: &mut E, items: &[I]) -> Result<()>
where
    E: ZiEstimator<I> + ?Sized,
{
    let mut passes = 0usize;
    while !estimator.is_training_complete() {
        passes += 1;
        let mut reset = false;
        for item in items {
            match estimator.fit(item)? {
                ZiFitResult::Continue => {}
                ZiFitResult::Complete => break,
                ZiFitResult::ResetAndContinue => {
                    reset = true;
                    break;
                }
            }
        }

        if estimator.is_training_complete() {
            break;
        }
        if !reset {
            estimator.on_data_completed()?;
        }
    }

    log::debug!(
        "estimator '{}' consumed {passes} pass(es) over {} items",
        estimator.name(),
        items.len()
    );
    Ok(())
}

/// Runs the full lifecycle on `items` and returns the resulting transformer.
pub fn fit_transformer<I, E>(estimator: &mut E, items: &[I]) -> Result<E::Transformer>
where
    E: ZiTransformerEstimator<I>,
{
    if estimator.state() == ZiTrainingState::Pending {
        estimator.begin_training()?;
    }
    train_over(estimator, items)?;
    estimator.complete_training()?;
    estimator.create_transformer()
}
