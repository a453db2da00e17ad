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

//! # Zift Annotation Module
//!
//! Finished estimators publish immutable summaries ("annotations") that
//! later estimators on the same column read. The store keeps one
//! write-once slot per (estimator name, column index).
//!
//! ## Sharing
//!
//! A store is created once per pipeline and handed to every estimator as a
//! [`ZiAnnotationStoreRef`]. Readers receive `Arc<T>` handles, so a published
//! annotation stays alive for as long as any transformer needs it.
//!
//! ```rust
//! use zift::annotation::ZiAnnotationStore;
//!
//! let store = ZiAnnotationStore::new(1);
//! store.publish("MaxAbsValueEstimator", 0, 4.0f64).unwrap();
//! let value = store.get::<f64>("MaxAbsValueEstimator", 0).unwrap();
//! assert_eq!(*value, 4.0);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::errors::{Result, ZiError};

type ZiAnnotationSlot = Arc<dyn Any + Send + Sync>;

/// Shared handle to an annotation store.
pub type ZiAnnotationStoreRef = Arc<ZiAnnotationStore>;

/// Per-column, write-once annotation map.
#[derive(Debug)]
pub struct ZiAnnotationStore {
    columns: Vec<RwLock<HashMap<String, ZiAnnotationSlot>>>,
}

impl ZiAnnotationStore {
    /// Creates a shared store with `num_columns` empty columns.
    pub fn new(num_columns: usize) -> ZiAnnotationStoreRef {
        Arc::new(Self {
            columns: (0..num_columns).map(|_| RwLock::new(HashMap::new())).collect(),
        })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, column: usize) -> Result<&RwLock<HashMap<String, ZiAnnotationSlot>>> {
        self.columns.get(column).ok_or_else(|| {
            ZiError::invalid_argument(format!(
                "column index {column} is out of range for {} column(s)",
                self.columns.len()
            ))
        })
    }

    /// Publishes `data` under `name` for `column`. Each slot is written once.
    pub fn publish<T: Any + Send + Sync>(&self, name: &str, column: usize, data: T) -> Result<()> {
        let mut slots = self
            .column(column)?
            .write()
            .map_err(|_| ZiError::internal("annotation store lock poisoned"))?;

        if slots.contains_key(name) {
            return Err(ZiError::invalid_state(format!(
                "annotation '{name}' was already published for column {column}"
            )));
        }

        slots.insert(name.to_string(), Arc::new(data));
        log::debug!("published annotation '{name}' for column {column}");
        Ok(())
    }

    /// Returns the annotation published under `name` for `column`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str, column: usize) -> Result<Arc<T>> {
        let slot = {
            let slots = self
                .column(column)?
                .read()
                .map_err(|_| ZiError::internal("annotation store lock poisoned"))?;
            slots.get(name).cloned()
        };

        let slot = slot.ok_or_else(|| {
            ZiError::not_found(format!(
                "annotation '{name}' has not been published for column {column}"
            ))
        })?;

        slot.downcast::<T>().map_err(|_| {
            ZiError::invalid_argument(format!(
                "annotation '{name}' for column {column} is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn contains(&self, name: &str, column: usize) -> bool {
        self.column(column)
            .ok()
            .and_then(|lock| lock.read().ok().map(|slots| slots.contains_key(name)))
            .unwrap_or(false)
    }
}

/// Read access to the annotations of a single column.
#[derive(Clone, Debug)]
pub struct ZiAnnotationView {
    store: ZiAnnotationStoreRef,
    column: usize,
}

impl ZiAnnotationView {
    /// Fails when `column` is outside the store.
    pub fn new(store: ZiAnnotationStoreRef, column: usize) -> Result<Self> {
        store.column(column)?;
        Ok(Self { store, column })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn store(&self) -> &ZiAnnotationStoreRef {
        &self.store
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.store.get(name, self.column)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name, self.column)
    }

    pub fn publish<T: Any + Send + Sync>(&self, name: &str, data: T) -> Result<()> {
        self.store.publish(name, self.column, data)
    }
}
