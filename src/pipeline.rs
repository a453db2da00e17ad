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

//! # Zift Pipeline Module
//!
//! Chains estimators that work on the same column. Stages run strictly in
//! declaration order: a stage is driven to `Finished` before the next one
//! begins, so a later stage can read the annotations of every earlier one.
//!
//! ## Passes
//!
//! When a stage finishes in the middle of the data and the following stage
//! still needs data, `fit` answers [`ZiFitResult::ResetAndContinue`] and the
//! caller restarts from the first item. When a stage finishes at the end of
//! a pass (`on_data_completed`) the pipeline simply wants another pass.
//! Stages that need no data are begun and completed as soon as they become
//! current.
//!
//! The final stage is a [`ZiTransformerEstimator`]; its transformer is the
//! pipeline's transformer.

use crate::errors::{Result, ZiError};
use crate::estimator::{
    ZiEstimator, ZiFitResult, ZiTrainingState, ZiTrainingTracker, ZiTransformerEstimator,
};

/// Linear chain of annotation stages ending in a transformer stage.
pub struct ZiCPipelineEstimator<I, F> {
    name: &'static str,
    tracker: ZiTrainingTracker,
    stages: Vec<Box<dyn ZiEstimator<I>>>,
    last: F,
    current: usize,
}

impl<I, F: ZiTransformerEstimator<I>> ZiCPipelineEstimator<I, F> {
    /// Builds a pipeline named `name` from leading `stages` and the final stage.
    pub fn compose(name: &'static str, stages: Vec<Box<dyn ZiEstimator<I>>>, last: F) -> Self {
        ZiCPipelineEstimator {
            name,
            tracker: ZiTrainingTracker::new(),
            stages,
            last,
            current: 0,
        }
    }

    /// Number of stages including the final one.
    pub fn num_stages(&self) -> usize {
        self.stages.len() + 1
    }

    /// Index of the stage that receives the next `fit` call.
    pub fn current_stage(&self) -> usize {
        self.current
    }

    pub fn last_stage(&self) -> &F {
        &self.last
    }

    fn is_last(&self, index: usize) -> bool {
        index == self.stages.len()
    }

    fn stage_mut(&mut self, index: usize) -> &mut dyn ZiEstimator<I> {
        match self.stages.get_mut(index) {
            Some(stage) => stage.as_mut(),
            None => &mut self.last,
        }
    }

    /// Finishes the current stage and moves to the next one.
    fn finish_current(&mut self) -> Result<()> {
        let index = self.current;
        let stage = self.stage_mut(index);
        let name = stage.name();
        stage
            .complete_training()
            .map_err(|err| ZiError::estimator(name, err))?;
        self.current += 1;
        log::debug!("pipeline '{}' advanced past stage {index} ('{name}')", self.name);
        Ok(())
    }

    /// Begins stages that are pending and fast-forwards the ones that need no
    /// data. Returns true once the final stage is training-complete.
    fn advance(&mut self) -> Result<bool> {
        loop {
            let index = self.current;
            let stage = self.stage_mut(index);
            let name = stage.name();

            if stage.state() == ZiTrainingState::Pending {
                stage
                    .begin_training()
                    .map_err(|err| ZiError::estimator(name, err))?;
            }
            if !stage.is_training_complete() {
                return Ok(false);
            }
            if self.is_last(index) {
                return Ok(true);
            }
            self.finish_current()?;
        }
    }
}

impl<I, F: ZiTransformerEstimator<I>> ZiEstimator<I> for ZiCPipelineEstimator<I, F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn state(&self) -> ZiTrainingState {
        self.tracker.state()
    }

    fn is_training_complete(&self) -> bool {
        self.tracker.is_training_complete()
    }

    fn begin_training(&mut self) -> Result<()> {
        self.tracker.begin(self.name, true)?;
        if self.advance()? {
            self.tracker.mark_training_complete();
        }
        Ok(())
    }

    fn fit_batch(&mut self, inputs: &[I]) -> Result<ZiFitResult> {
        self.tracker.check_fit(self.name, inputs.len())?;

        let index = self.current;
        let stage = self.stage_mut(index);
        let name = stage.name();
        let result = stage
            .fit_batch(inputs)
            .map_err(|err| ZiError::estimator(name, err))?;

        let result = match result {
            ZiFitResult::Continue | ZiFitResult::ResetAndContinue => result,
            ZiFitResult::Complete if self.is_last(index) => ZiFitResult::Complete,
            ZiFitResult::Complete => {
                self.finish_current()?;
                if self.advance()? {
                    ZiFitResult::Complete
                } else {
                    ZiFitResult::ResetAndContinue
                }
            }
        };

        Ok(self.tracker.record(result))
    }

    fn on_data_completed(&mut self) -> Result<()> {
        self.tracker.check_data_completed(self.name)?;
        if self.tracker.is_training_complete() {
            return Ok(());
        }

        let index = self.current;
        let stage = self.stage_mut(index);
        let name = stage.name();
        stage
            .on_data_completed()
            .map_err(|err| ZiError::estimator(name, err))?;
        if !stage.is_training_complete() {
            return Ok(());
        }

        if self.is_last(index) {
            self.tracker.mark_training_complete();
            return Ok(());
        }

        self.finish_current()?;
        if self.advance()? {
            self.tracker.mark_training_complete();
        }
        Ok(())
    }

    fn complete_training(&mut self) -> Result<()> {
        self.tracker.check_complete(self.name)?;

        for index in self.current..=self.stages.len() {
            let stage = self.stage_mut(index);
            let name = stage.name();
            if stage.state() == ZiTrainingState::Pending {
                stage
                    .begin_training()
                    .map_err(|err| ZiError::estimator(name, err))?;
            }
            if stage.state() == ZiTrainingState::Training {
                stage
                    .complete_training()
                    .map_err(|err| ZiError::estimator(name, err))?;
            }
        }
        self.current = self.stages.len();

        self.tracker.mark_finished();
        log::info!(
            "pipeline '{}' finished training {} stage(s)",
            self.name,
            self.num_stages()
        );
        Ok(())
    }
}

impl<I, F: ZiTransformerEstimator<I>> ZiTransformerEstimator<I> for ZiCPipelineEstimator<I, F> {
    type Transformer = F::Transformer;

    fn create_transformer(&self) -> Result<Self::Transformer> {
        self.tracker.check_finished(self.name)?;
        self.last
            .create_transformer()
            .map_err(|err| ZiError::estimator(self.last.name(), err))
    }
}
