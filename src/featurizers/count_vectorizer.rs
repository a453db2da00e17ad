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

//! # Count Vectorizer
//!
//! Turns a document into a sparse vector of term counts over the
//! vocabulary learned by document statistics.
//!
//! Tokens are produced exactly as during training: optional lowercasing,
//! then the analyzer's normalisation and tokenization. Terms outside the
//! vocabulary are ignored; with `binary` set every present term counts once.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{ZiAnnotationStoreRef, ZiAnnotationView};
use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::components::document_statistics::{
    ZiDocumentStatisticsAnnotation, ZiDocumentStatisticsConfig, ZiDocumentStatisticsPolicy,
};
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::{Result, ZiError};
use crate::estimator::ZiEstimator;
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::pipeline::ZiCPipelineEstimator;
use crate::strings::{to_lower, ZiAnalyzer, ZiDocumentParser};
use crate::transformer::{ZiLoadable, ZiTransformer};

/// One non-zero entry of a sparse vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiSparseValue<T> {
    pub value: T,
    pub index: u64,
}

/// Sparse vector with entries sorted by index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiSparseVector<T> {
    pub num_elements: u64,
    pub values: Vec<ZiSparseValue<T>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiCountVectorizerConfig {
    pub lower: bool,
    pub analyzer: ZiAnalyzer,
    pub regex: Option<String>,
    pub max_df: f32,
    pub min_df: f32,
    pub top_k_terms: Option<u32>,
    pub vocabulary: Option<BTreeMap<String, u32>>,
    pub ngram_min: u32,
    pub ngram_max: u32,
    pub binary: bool,
    pub max_training_items: Option<usize>,
}

impl Default for ZiCountVectorizerConfig {
    fn default() -> Self {
        Self {
            lower: true,
            analyzer: ZiAnalyzer::Word,
            regex: None,
            max_df: 1.0,
            min_df: 0.0,
            top_k_terms: None,
            vocabulary: None,
            ngram_min: 1,
            ngram_max: 1,
            binary: false,
            max_training_items: None,
        }
    }
}

impl ZiCountVectorizerConfig {
    /// Document statistics settings used for training.
    pub fn document_statistics(&self) -> ZiDocumentStatisticsConfig {
        ZiDocumentStatisticsConfig {
            analyzer: self.analyzer,
            regex: self.regex.clone(),
            vocabulary: self.vocabulary.clone(),
            top_k: self.top_k_terms,
            min_df: self.min_df,
            max_df: self.max_df,
            ngram_min: self.ngram_min,
            ngram_max: self.ngram_max,
            lowercase: self.lower,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ZiCountVectorizerTransformer {
    labels: Arc<BTreeMap<String, u32>>,
    num_elements: u64,
    binary: bool,
    lower: bool,
    parser: ZiDocumentParser,
}

impl ZiCountVectorizerTransformer {
    pub fn new(
        labels: BTreeMap<String, u32>,
        binary: bool,
        lower: bool,
        analyzer: ZiAnalyzer,
        regex: Option<&str>,
        ngram_min: u32,
        ngram_max: u32,
    ) -> Result<Self> {
        Self::from_shared(
            Arc::new(labels),
            binary,
            lower,
            ZiDocumentParser::new(analyzer, regex, ngram_min, ngram_max)?,
        )
    }

    fn from_shared(
        labels: Arc<BTreeMap<String, u32>>,
        binary: bool,
        lower: bool,
        parser: ZiDocumentParser,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(ZiError::invalid_argument("count vectorizer index map is empty"));
        }
        let num_elements = vector_width(&labels);
        Ok(Self {
            labels,
            num_elements,
            binary,
            lower,
            parser,
        })
    }

    pub fn labels(&self) -> &BTreeMap<String, u32> {
        &self.labels
    }

    pub fn binary(&self) -> bool {
        self.binary
    }

    pub fn lower(&self) -> bool {
        self.lower
    }

    pub fn parser(&self) -> &ZiDocumentParser {
        &self.parser
    }
}

/// Width of the output vector: one past the largest vocabulary index.
pub(crate) fn vector_width(labels: &BTreeMap<String, u32>) -> u64 {
    labels.values().max().map_or(0, |index| u64::from(*index) + 1)
}

impl PartialEq for ZiCountVectorizerTransformer {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
            && self.binary == other.binary
            && self.lower == other.lower
            && self.parser.analyzer() == other.parser.analyzer()
            && self.parser.regex_pattern() == other.parser.regex_pattern()
            && self.parser.ngram_range() == other.parser.ngram_range()
    }
}

impl ZiTransformer for ZiCountVectorizerTransformer {
    type Input = String;
    type Output = ZiSparseVector<u32>;

    fn name(&self) -> &'static str {
        "CountVectorizerTransformer"
    }

    fn execute(&mut self, input: &String) -> Result<ZiSparseVector<u32>> {
        let lowered;
        let document: &str = if self.lower {
            lowered = to_lower(input);
            &lowered
        } else {
            input
        };

        let processed = self.parser.preprocess(document);
        let mut appearances: HashMap<&str, u32> = HashMap::new();
        self.parser.tokenize(&processed, |token| {
            *appearances.entry(token).or_insert(0) += 1;
        });

        let mut values: Vec<ZiSparseValue<u32>> = appearances
            .into_iter()
            .filter_map(|(term, count)| {
                self.labels.get(term).map(|index| ZiSparseValue {
                    value: if self.binary { 1 } else { count },
                    index: u64::from(*index),
                })
            })
            .collect();
        values.sort_by_key(|entry| entry.index);

        Ok(ZiSparseVector {
            num_elements: self.num_elements,
            values,
        })
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.labels.write_to(archive);
        self.binary.write_to(archive);
        self.lower.write_to(archive);
        self.parser.analyzer().as_u8().write_to(archive);
        self.parser.regex_pattern().to_string().write_to(archive);
        let (ngram_min, ngram_max) = self.parser.ngram_range();
        ngram_min.write_to(archive);
        ngram_max.write_to(archive);
        Ok(())
    }
}

impl ZiLoadable for ZiCountVectorizerTransformer {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let labels = BTreeMap::<String, u32>::read_from(reader)?;
        let binary = bool::read_from(reader)?;
        let lower = bool::read_from(reader)?;
        let analyzer = ZiAnalyzer::from_u8(u8::read_from(reader)?)
            .map_err(|err| ZiError::corrupt_archive(format!("invalid count vectorizer payload: {err}")))?;
        let regex = String::read_from(reader)?;
        let ngram_min = u32::read_from(reader)?;
        let ngram_max = u32::read_from(reader)?;

        let regex = (!regex.is_empty()).then_some(regex.as_str());
        Self::new(labels, binary, lower, analyzer, regex, ngram_min, ngram_max)
            .map_err(|err| ZiError::corrupt_archive(format!("invalid count vectorizer payload: {err}")))
    }
}

/// Reads the document statistics of the column and builds transformers that
/// share one vocabulary.
pub struct ZiCountVectorizerFactory {
    binary: bool,
    lower: bool,
    parser: ZiDocumentParser,
    labels: OnceLock<Arc<BTreeMap<String, u32>>>,
}

impl ZiCountVectorizerFactory {
    fn labels(&self, annotations: &ZiAnnotationView) -> Result<Arc<BTreeMap<String, u32>>> {
        if let Some(labels) = self.labels.get() {
            return Ok(Arc::clone(labels));
        }
        let statistics = annotations.get::<ZiDocumentStatisticsAnnotation>(
            <ZiDocumentStatisticsPolicy as ZiTrainingPolicy<String>>::NAME,
        )?;
        let labels = Arc::new(statistics.index_map());
        Ok(Arc::clone(self.labels.get_or_init(|| labels)))
    }
}

impl ZiTransformerFactory<String> for ZiCountVectorizerFactory {
    const NAME: &'static str = "CountVectorizerEstimator";
    type Transformer = ZiCountVectorizerTransformer;

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        ZiCountVectorizerTransformer::from_shared(
            self.labels(annotations)?,
            self.binary,
            self.lower,
            self.parser.clone(),
        )
    }
}

pub type ZiCountVectorizerEstimator =
    ZiCPipelineEstimator<String, ZiTransformerStage<String, ZiCountVectorizerFactory>>;

impl ZiCountVectorizerEstimator {
    pub fn new(store: ZiAnnotationStoreRef, column: usize, config: &ZiCountVectorizerConfig) -> Result<Self> {
        let policy = ZiDocumentStatisticsPolicy::new(&config.document_statistics(), None)?;
        let parser = policy.parser().clone();

        let mut statistics = ZiAnnotationEstimator::new(store.clone(), column, policy)?;
        if let Some(count) = config.max_training_items {
            statistics = statistics.with_max_training_items(count)?;
        }

        let last = ZiTransformerStage::with_factory(
            store,
            column,
            ZiCountVectorizerFactory {
                binary: config.binary,
                lower: config.lower,
                parser,
                labels: OnceLock::new(),
            },
        )?;

        Ok(ZiCPipelineEstimator::compose(
            "CountVectorizerEstimator",
            vec![Box::new(statistics) as Box<dyn ZiEstimator<String>>],
            last,
        ))
    }
}

pub fn count_vectorizer_factory(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiCountVectorizerEstimator> {
    let config: ZiCountVectorizerConfig = serde_json::from_value(config.clone())?;
    ZiCountVectorizerEstimator::new(store, column, &config)
}
