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

//! # Featurizer Descriptions
//!
//! Named featurizer descriptions read from JSON or YAML:
//!
//! ```json
//! { "featurizer": "label_encoder", "column": 0, "config": { "allow_missing_values": true } }
//! ```
//!
//! The `config` object is handed to the featurizer's factory unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::ZiAnnotationStoreRef;
use crate::components::document_statistics::ZiDocumentStatisticsPolicy;
use crate::errors::{Result, ZiError};
use crate::featurizers::count_vectorizer::{count_vectorizer_factory, ZiCountVectorizerConfig, ZiCountVectorizerEstimator};
use crate::featurizers::forward_fill::{
    forward_fill_imputer_factory, ZiForwardFillImputerConfig, ZiForwardFillImputerEstimator,
};
use crate::featurizers::label_encoder::{label_encoder_factory, ZiLabelEncoderConfig, ZiLabelEncoderEstimator};
use crate::featurizers::max_abs_scalar::{max_abs_scalar_factory, ZiMaxAbsScalarConfig, ZiMaxAbsScalarEstimator};
use crate::featurizers::numericalize::{numericalize_factory, ZiNumericalizeConfig, ZiNumericalizeEstimator};
use crate::featurizers::tfidf_vectorizer::{
    tfidf_vectorizer_factory, ZiTfidfVectorizerConfig, ZiTfidfVectorizerEstimator,
};
use crate::scalar::{ZiMaxAbsInput, ZiNullable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiFeaturizerKind {
    LabelEncoder,
    Numericalize,
    ForwardFillImputer,
    MaxAbsScalar,
    CountVectorizer,
    TfidfVectorizer,
}

fn empty_config() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiFeaturizerSpec {
    pub featurizer: ZiFeaturizerKind,
    #[serde(default)]
    pub column: usize,
    #[serde(default = "empty_config")]
    pub config: Value,
}

impl ZiFeaturizerSpec {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(source)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(source)
            .map_err(|err| ZiError::Serde(format!("Invalid YAML: {err}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reads `.yaml`/`.yml` files as YAML and everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Checks that `config` is accepted by the named featurizer.
    pub fn validate(&self) -> Result<()> {
        let config = self.config.clone();
        match self.featurizer {
            ZiFeaturizerKind::LabelEncoder => {
                serde_json::from_value::<ZiLabelEncoderConfig>(config)?;
            }
            ZiFeaturizerKind::Numericalize => {
                serde_json::from_value::<ZiNumericalizeConfig>(config)?;
            }
            ZiFeaturizerKind::ForwardFillImputer => {
                serde_json::from_value::<ZiForwardFillImputerConfig>(config)?;
            }
            ZiFeaturizerKind::MaxAbsScalar => {
                serde_json::from_value::<ZiMaxAbsScalarConfig>(config)?;
            }
            ZiFeaturizerKind::CountVectorizer => {
                let config = serde_json::from_value::<ZiCountVectorizerConfig>(config)?;
                ZiDocumentStatisticsPolicy::new(&config.document_statistics(), None)?;
            }
            ZiFeaturizerKind::TfidfVectorizer => {
                let config = serde_json::from_value::<ZiTfidfVectorizerConfig>(config)?;
                ZiDocumentStatisticsPolicy::new(&config.document_statistics(), None)?;
            }
        }
        Ok(())
    }

    fn ensure_kind(&self, kind: ZiFeaturizerKind) -> Result<()> {
        if self.featurizer != kind {
            return Err(ZiError::invalid_argument(format!(
                "featurizer description names {:?}, not {kind:?}",
                self.featurizer
            )));
        }
        Ok(())
    }

    pub fn label_encoder<I: ZiNullable>(&self, store: ZiAnnotationStoreRef) -> Result<ZiLabelEncoderEstimator<I>> {
        self.ensure_kind(ZiFeaturizerKind::LabelEncoder)?;
        label_encoder_factory(store, self.column, &self.config)
    }

    pub fn numericalize<I: ZiNullable>(&self, store: ZiAnnotationStoreRef) -> Result<ZiNumericalizeEstimator<I>> {
        self.ensure_kind(ZiFeaturizerKind::Numericalize)?;
        numericalize_factory(store, self.column, &self.config)
    }

    pub fn forward_fill_imputer<I: ZiNullable>(
        &self,
        store: ZiAnnotationStoreRef,
    ) -> Result<ZiForwardFillImputerEstimator<I>> {
        self.ensure_kind(ZiFeaturizerKind::ForwardFillImputer)?;
        forward_fill_imputer_factory(store, self.column, &self.config)
    }

    pub fn max_abs_scalar<T: ZiMaxAbsInput>(&self, store: ZiAnnotationStoreRef) -> Result<ZiMaxAbsScalarEstimator<T>> {
        self.ensure_kind(ZiFeaturizerKind::MaxAbsScalar)?;
        max_abs_scalar_factory(store, self.column, &self.config)
    }

    pub fn count_vectorizer(&self, store: ZiAnnotationStoreRef) -> Result<ZiCountVectorizerEstimator> {
        self.ensure_kind(ZiFeaturizerKind::CountVectorizer)?;
        count_vectorizer_factory(store, self.column, &self.config)
    }

    pub fn tfidf_vectorizer(&self, store: ZiAnnotationStoreRef) -> Result<ZiTfidfVectorizerEstimator> {
        self.ensure_kind(ZiFeaturizerKind::TfidfVectorizer)?;
        tfidf_vectorizer_factory(store, self.column, &self.config)
    }
}
