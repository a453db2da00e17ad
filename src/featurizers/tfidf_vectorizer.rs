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

//! # TF-IDF Vectorizer
//!
//! Weights the terms of a document by term frequency and inverse document
//! frequency, over the vocabulary learned by document statistics, and
//! returns the weights as a sparse vector ordered by term index.
//!
//! ## Weighting
//!
//! - `tf` is the count of the term in the document, `1` when `binary` is set,
//!   or `1 + ln(count)` with `sublinear_tf`.
//! - `idf` is `1 + ln((1 + n) / (1 + df))` with `smooth_idf`,
//!   `1 + ln((1 + n) / df)` without it, and `1` when `use_idf` is off, where
//!   `n` is the number of training documents and `df` the term's document
//!   frequency.
//! - The vector is then divided by its L1 or L2 norm, or left as is.
//!
//! Tokens are produced exactly as during training. Terms outside the
//! vocabulary are ignored, so a document without known terms yields an empty
//! vector.

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
use crate::featurizers::count_vectorizer::{vector_width, ZiSparseValue, ZiSparseVector};
use crate::featurizers::stage::{ZiTransformerFactory, ZiTransformerStage};
use crate::pipeline::ZiCPipelineEstimator;
use crate::strings::{to_lower, ZiAnalyzer, ZiDocumentParser};
use crate::transformer::{ZiLoadable, ZiTransformer};

/// Normalisation applied to the weighted vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ZiNorm {
    L1 = 1,
    L2 = 2,
    None = 3,
}

impl Default for ZiNorm {
    fn default() -> Self {
        ZiNorm::L2
    }
}

impl ZiNorm {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ZiNorm::L1),
            2 => Ok(ZiNorm::L2),
            3 => Ok(ZiNorm::None),
            other => Err(ZiError::invalid_argument(format!("unknown norm {other}"))),
        }
    }
}

/// Term weighting switches, persisted as a bit set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZiTfidfWeighting {
    pub binary: bool,
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
}

impl Default for ZiTfidfWeighting {
    fn default() -> Self {
        Self {
            binary: false,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl ZiTfidfWeighting {
    const BINARY: u32 = 1;
    const USE_IDF: u32 = 2;
    const SMOOTH_IDF: u32 = 4;
    const SUBLINEAR_TF: u32 = 8;

    pub fn bits(self) -> u32 {
        let mut bits = 0;
        if self.binary {
            bits |= Self::BINARY;
        }
        if self.use_idf {
            bits |= Self::USE_IDF;
        }
        if self.smooth_idf {
            bits |= Self::SMOOTH_IDF;
        }
        if self.sublinear_tf {
            bits |= Self::SUBLINEAR_TF;
        }
        bits
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        let known = Self::BINARY | Self::USE_IDF | Self::SMOOTH_IDF | Self::SUBLINEAR_TF;
        if bits & !known != 0 {
            return Err(ZiError::invalid_argument(format!("unknown tf-idf policy bits {bits:#x}")));
        }
        Ok(Self {
            binary: bits & Self::BINARY != 0,
            use_idf: bits & Self::USE_IDF != 0,
            smooth_idf: bits & Self::SMOOTH_IDF != 0,
            sublinear_tf: bits & Self::SUBLINEAR_TF != 0,
        })
    }

    fn term_frequency(self, count: u32) -> f64 {
        if self.binary {
            1.0
        } else if self.sublinear_tf {
            1.0 + f64::from(count).ln()
        } else {
            f64::from(count)
        }
    }

    fn inverse_document_frequency(self, document_frequency: u32, total_documents: u32) -> f64 {
        let documents = 1.0 + f64::from(total_documents);
        if !self.use_idf {
            1.0
        } else if self.smooth_idf {
            1.0 + (documents / (1.0 + f64::from(document_frequency))).ln()
        } else {
            1.0 + (documents / f64::from(document_frequency)).ln()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiTfidfVectorizerConfig {
    pub lower: bool,
    pub analyzer: ZiAnalyzer,
    pub regex: Option<String>,
    pub max_df: f32,
    pub min_df: f32,
    pub top_k_terms: Option<u32>,
    pub vocabulary: Option<BTreeMap<String, u32>>,
    pub ngram_min: u32,
    pub ngram_max: u32,
    pub norm: ZiNorm,
    pub binary: bool,
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
    pub max_training_items: Option<usize>,
}

impl Default for ZiTfidfVectorizerConfig {
    fn default() -> Self {
        let weighting = ZiTfidfWeighting::default();
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
            norm: ZiNorm::L2,
            binary: weighting.binary,
            use_idf: weighting.use_idf,
            smooth_idf: weighting.smooth_idf,
            sublinear_tf: weighting.sublinear_tf,
            max_training_items: None,
        }
    }
}

impl ZiTfidfVectorizerConfig {
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

    pub fn weighting(&self) -> ZiTfidfWeighting {
        ZiTfidfWeighting {
            binary: self.binary,
            use_idf: self.use_idf,
            smooth_idf: self.smooth_idf,
            sublinear_tf: self.sublinear_tf,
        }
    }
}

/// Vocabulary and document frequencies shared by every transformer created
/// from one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiTfidfVocabulary {
    labels: Arc<BTreeMap<String, u32>>,
    document_frequency: Arc<BTreeMap<String, u32>>,
    total_documents: u32,
}

impl ZiTfidfVocabulary {
    /// Every label needs a non-zero document frequency.
    pub fn new(
        labels: BTreeMap<String, u32>,
        document_frequency: BTreeMap<String, u32>,
        total_documents: u32,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(ZiError::invalid_argument("tf-idf index map is empty"));
        }
        if document_frequency.is_empty() {
            return Err(ZiError::invalid_argument("tf-idf document frequency map is empty"));
        }
        if total_documents == 0 {
            return Err(ZiError::invalid_argument("tf-idf total document count is zero"));
        }
        if let Some(term) = labels
            .keys()
            .find(|term| !matches!(document_frequency.get(*term), Some(count) if *count > 0))
        {
            return Err(ZiError::invalid_argument(format!(
                "term '{term}' has no document frequency"
            )));
        }
        Ok(Self {
            labels: Arc::new(labels),
            document_frequency: Arc::new(document_frequency),
            total_documents,
        })
    }

    fn from_annotation(statistics: &ZiDocumentStatisticsAnnotation) -> Result<Self> {
        let document_frequency = statistics
            .term_frequency_and_index()
            .iter()
            .map(|(term, (count, _))| (term.clone(), *count))
            .collect();
        Self::new(statistics.index_map(), document_frequency, statistics.total_documents())
    }

    pub fn labels(&self) -> &BTreeMap<String, u32> {
        &self.labels
    }

    pub fn document_frequency(&self) -> &BTreeMap<String, u32> {
        &self.document_frequency
    }

    pub fn total_documents(&self) -> u32 {
        self.total_documents
    }
}

#[derive(Clone, Debug)]
pub struct ZiTfidfVectorizerTransformer {
    vocabulary: ZiTfidfVocabulary,
    num_elements: u64,
    norm: ZiNorm,
    weighting: ZiTfidfWeighting,
    lower: bool,
    parser: ZiDocumentParser,
}

impl ZiTfidfVectorizerTransformer {
    pub fn new(
        vocabulary: ZiTfidfVocabulary,
        norm: ZiNorm,
        weighting: ZiTfidfWeighting,
        lower: bool,
        parser: ZiDocumentParser,
    ) -> Self {
        let num_elements = vector_width(&vocabulary.labels);
        Self {
            vocabulary,
            num_elements,
            norm,
            weighting,
            lower,
            parser,
        }
    }

    pub fn vocabulary(&self) -> &ZiTfidfVocabulary {
        &self.vocabulary
    }

    pub fn norm(&self) -> ZiNorm {
        self.norm
    }

    pub fn weighting(&self) -> ZiTfidfWeighting {
        self.weighting
    }

    fn weight(&self, count: u32, document_frequency: u32) -> f32 {
        let tf = self.weighting.term_frequency(count);
        let idf = self
            .weighting
            .inverse_document_frequency(document_frequency, self.vocabulary.total_documents);
        (tf * idf) as f32
    }
}

impl PartialEq for ZiTfidfVectorizerTransformer {
    fn eq(&self, other: &Self) -> bool {
        self.vocabulary == other.vocabulary
            && self.norm == other.norm
            && self.weighting == other.weighting
            && self.lower == other.lower
            && self.parser.analyzer() == other.parser.analyzer()
            && self.parser.regex_pattern() == other.parser.regex_pattern()
            && self.parser.ngram_range() == other.parser.ngram_range()
    }
}

impl ZiTransformer for ZiTfidfVectorizerTransformer {
    type Input = String;
    type Output = ZiSparseVector<f32>;

    fn name(&self) -> &'static str {
        "TfidfVectorizerTransformer"
    }

    fn execute(&mut self, input: &String) -> Result<ZiSparseVector<f32>> {
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

        let mut magnitude = 0.0f32;
        let mut values = Vec::with_capacity(appearances.len());
        for (term, count) in appearances {
            let (Some(index), Some(document_frequency)) = (
                self.vocabulary.labels.get(term),
                self.vocabulary.document_frequency.get(term),
            ) else {
                continue;
            };

            let weight = self.weight(count, *document_frequency);
            match self.norm {
                ZiNorm::L1 => magnitude += weight.abs(),
                ZiNorm::L2 => magnitude += weight * weight,
                ZiNorm::None => {}
            }
            values.push(ZiSparseValue {
                value: weight,
                index: u64::from(*index),
            });
        }

        let divisor = match self.norm {
            ZiNorm::L1 => magnitude,
            ZiNorm::L2 => magnitude.sqrt(),
            ZiNorm::None => 1.0,
        };
        // Zero only when no known term was found.
        if divisor > 0.0 {
            for entry in &mut values {
                entry.value /= divisor;
            }
        }
        values.sort_by_key(|entry| entry.index);

        Ok(ZiSparseVector {
            num_elements: self.num_elements,
            values,
        })
    }

    fn save_payload(&self, archive: &mut ZiCArchive) -> Result<()> {
        self.vocabulary.labels.write_to(archive);
        self.vocabulary.document_frequency.write_to(archive);
        self.vocabulary.total_documents.write_to(archive);
        self.norm.as_u8().write_to(archive);
        self.weighting.bits().write_to(archive);
        self.lower.write_to(archive);
        self.parser.analyzer().as_u8().write_to(archive);
        self.parser.regex_pattern().to_string().write_to(archive);
        let (ngram_min, ngram_max) = self.parser.ngram_range();
        ngram_min.write_to(archive);
        ngram_max.write_to(archive);
        Ok(())
    }
}

fn corrupt(err: ZiError) -> ZiError {
    ZiError::corrupt_archive(format!("invalid tf-idf vectorizer payload: {err}"))
}

impl ZiLoadable for ZiTfidfVectorizerTransformer {
    fn load_payload(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        let labels = BTreeMap::<String, u32>::read_from(reader)?;
        let document_frequency = BTreeMap::<String, u32>::read_from(reader)?;
        let total_documents = u32::read_from(reader)?;
        let norm = ZiNorm::from_u8(u8::read_from(reader)?).map_err(corrupt)?;
        let weighting = ZiTfidfWeighting::from_bits(u32::read_from(reader)?).map_err(corrupt)?;
        let lower = bool::read_from(reader)?;
        let analyzer = ZiAnalyzer::from_u8(u8::read_from(reader)?).map_err(corrupt)?;
        let regex = String::read_from(reader)?;
        let ngram_min = u32::read_from(reader)?;
        let ngram_max = u32::read_from(reader)?;

        let vocabulary = ZiTfidfVocabulary::new(labels, document_frequency, total_documents).map_err(corrupt)?;
        let regex = (!regex.is_empty()).then_some(regex.as_str());
        let parser = ZiDocumentParser::new(analyzer, regex, ngram_min, ngram_max).map_err(corrupt)?;
        Ok(Self::new(vocabulary, norm, weighting, lower, parser))
    }
}

/// Reads the document statistics of the column once and hands the same
/// vocabulary to every transformer it creates.
pub struct ZiTfidfVectorizerFactory {
    norm: ZiNorm,
    weighting: ZiTfidfWeighting,
    lower: bool,
    parser: ZiDocumentParser,
    vocabulary: OnceLock<ZiTfidfVocabulary>,
}

impl ZiTfidfVectorizerFactory {
    fn vocabulary(&self, annotations: &ZiAnnotationView) -> Result<ZiTfidfVocabulary> {
        if let Some(vocabulary) = self.vocabulary.get() {
            return Ok(vocabulary.clone());
        }
        let statistics = annotations.get::<ZiDocumentStatisticsAnnotation>(
            <ZiDocumentStatisticsPolicy as ZiTrainingPolicy<String>>::NAME,
        )?;
        let vocabulary = ZiTfidfVocabulary::from_annotation(&statistics)?;
        Ok(self.vocabulary.get_or_init(|| vocabulary).clone())
    }
}

impl ZiTransformerFactory<String> for ZiTfidfVectorizerFactory {
    const NAME: &'static str = "TfidfVectorizerEstimator";
    type Transformer = ZiTfidfVectorizerTransformer;

    fn create(&self, annotations: &ZiAnnotationView) -> Result<Self::Transformer> {
        Ok(ZiTfidfVectorizerTransformer::new(
            self.vocabulary(annotations)?,
            self.norm,
            self.weighting,
            self.lower,
            self.parser.clone(),
        ))
    }
}

pub type ZiTfidfVectorizerEstimator =
    ZiCPipelineEstimator<String, ZiTransformerStage<String, ZiTfidfVectorizerFactory>>;

impl ZiTfidfVectorizerEstimator {
    pub fn new(store: ZiAnnotationStoreRef, column: usize, config: &ZiTfidfVectorizerConfig) -> Result<Self> {
        let policy = ZiDocumentStatisticsPolicy::new(&config.document_statistics(), None)?;
        let parser = policy.parser().clone();

        let mut statistics = ZiAnnotationEstimator::new(store.clone(), column, policy)?;
        if let Some(count) = config.max_training_items {
            statistics = statistics.with_max_training_items(count)?;
        }

        let last = ZiTransformerStage::with_factory(
            store,
            column,
            ZiTfidfVectorizerFactory {
                norm: config.norm,
                weighting: config.weighting(),
                lower: config.lower,
                parser,
                vocabulary: OnceLock::new(),
            },
        )?;

        Ok(ZiCPipelineEstimator::compose(
            "TfidfVectorizerEstimator",
            vec![Box::new(statistics) as Box<dyn ZiEstimator<String>>],
            last,
        ))
    }
}

pub fn tfidf_vectorizer_factory(
    store: ZiAnnotationStoreRef,
    column: usize,
    config: &Value,
) -> Result<ZiTfidfVectorizerEstimator> {
    let config: ZiTfidfVectorizerConfig = serde_json::from_value(config.clone())?;
    ZiTfidfVectorizerEstimator::new(store, column, &config)
}
