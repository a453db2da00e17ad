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

//! # Zift Transformer Module
//!
//! Inference objects produced by finished estimators or decoded from an
//! archive. A transformer never refers back to the estimator that created it.
//!
//! Most transformers are pure lookups; stateful ones (forward fill) mutate
//! private state in `execute`, which is why it takes `&mut self`.

use crate::archive::{read_version, write_version, ZiCArchive, ZiCArchiveReader};
use crate::errors::Result;

/// Contract every transformer fulfills.
pub trait ZiTransformer: Send {
    type Input;
    type Output;

    /// Name used in log lines and boundary errors.
    fn name(&self) -> &'static str;

    /// Maps one input to one output.
    fn execute(&mut self, input: &Self::Input) -> Result<Self::Output>;

    /// Drains outputs that could not be returned from `execute`.
    fn flush(&mut self) -> Result<Vec<Self::Output>> {
        Ok(Vec::new())
    }

    /// Writes the payload that follows the version header.
    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()>;

    /// Writes the version header and payload.
    fn save(&self, archive: &mut ZiCArchive) -> Result<()> {
        write_version(archive);
        self.save_payload(archive)?;
        archive.check()
    }

    /// Saves into a fresh byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut archive = ZiCArchive::new();
        self.save(&mut archive)?;
        Ok(archive.into_bytes())
    }
}

/// Transformers that can be rebuilt from an archive.
pub trait ZiLoadable: Sized {
    /// Reads the payload written by `save_payload`.
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self>;

    /// Checks the version header, then reads the payload.
    fn load(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        read_version(reader)?;
        Self::load_payload(reader)
    }

    /// Loads from a buffer that must contain exactly one transformer.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ZiCArchiveReader::new(bytes);
        let transformer = Self::load(&mut reader)?;
        reader.finish()?;
        Ok(transformer)
    }
}
