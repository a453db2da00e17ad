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

//! # Zift Strings Module
//!
//! Document tokenization shared by document statistics and the count
//! vectorizer.
//!
//! ## Analyzers
//!
//! | Analyzer | Preprocessing | Tokens |
//! |---|---|---|
//! | `Word` + regex | none | regex matches |
//! | `Word`, n-gram `(1, 1)` | none | whitespace-separated words |
//! | `Word`, other range | punctuation normalised | word n-grams |
//! | `Char` | punctuation normalised | char n-grams |
//! | `Charwb` | normalised and padded | char n-grams inside ` word ` segments |
//!
//! Tokens are borrowed slices of the preprocessed document; n-grams of
//! every length in the configured range are emitted, lengths that do not
//! fit are skipped.

use std::borrow::Cow;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// Tokenization strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ZiAnalyzer {
    Word = 1,
    Char = 2,
    Charwb = 3,
}

impl Default for ZiAnalyzer {
    fn default() -> Self {
        ZiAnalyzer::Word
    }
}

impl ZiAnalyzer {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ZiAnalyzer::Word),
            2 => Ok(ZiAnalyzer::Char),
            3 => Ok(ZiAnalyzer::Charwb),
            other => Err(ZiError::invalid_argument(format!("unknown analyzer {other}"))),
        }
    }
}

/// ASCII whitespace including vertical tab.
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Replaces ASCII punctuation with spaces and collapses whitespace runs to
/// their first character.
pub fn replace_and_dedup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut previous_space = false;
    for c in input.chars() {
        let c = if c.is_ascii_punctuation() { ' ' } else { c };
        let space = is_space(c);
        if space && previous_space {
            continue;
        }
        previous_space = space;
        output.push(c);
    }
    output
}

/// Adds a leading and trailing space where missing. Empty input stays empty.
pub fn pad_with_spaces(input: &str) -> String {
    let (first, last) = match (input.chars().next(), input.chars().next_back()) {
        (Some(first), Some(last)) => (first, last),
        _ => return String::new(),
    };

    let mut output = String::with_capacity(input.len() + 2);
    if !is_space(first) {
        output.push(' ');
    }
    output.push_str(input);
    if !is_space(last) {
        output.push(' ');
    }
    output
}

pub fn to_lower(input: &str) -> String {
    input.to_lowercase()
}

/// Byte ranges of the whitespace-separated words of `input`.
fn word_spans(input: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (index, c) in input.char_indices() {
        match (is_space(c), start) {
            (true, Some(begin)) => {
                spans.push((begin, index));
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(begin) = start {
        spans.push((begin, input.len()));
    }
    spans
}

/// Emits every whitespace-separated word.
pub fn parse_words<'a>(input: &'a str, mut callback: impl FnMut(&'a str)) {
    for (begin, end) in word_spans(input) {
        callback(&input[begin..end]);
    }
}

/// Emits every non-empty regex match.
pub fn parse_regex<'a>(input: &'a str, regex: &Regex, mut callback: impl FnMut(&'a str)) {
    for found in regex.find_iter(input) {
        if !found.as_str().is_empty() {
            callback(found.as_str());
        }
    }
}

/// Emits word n-grams for every `n` in `[ngram_min, ngram_max]`, grouped by
/// `n`. Each n-gram spans from its first word's start to its last word's end.
pub fn parse_ngram_words<'a>(
    input: &'a str,
    ngram_min: usize,
    ngram_max: usize,
    mut callback: impl FnMut(&'a str),
) {
    let spans = word_spans(input);
    for n in ngram_min.max(1)..=ngram_max {
        if n > spans.len() {
            break;
        }
        for window in spans.windows(n) {
            callback(&input[window[0].0..window[n - 1].1]);
        }
    }
}

/// Emits char n-grams of every length in range at every char position.
pub fn parse_ngram_chars<'a>(
    input: &'a str,
    ngram_min: usize,
    ngram_max: usize,
    mut callback: impl FnMut(&'a str),
) {
    let mut bounds: Vec<usize> = input.char_indices().map(|(index, _)| index).collect();
    bounds.push(input.len());
    let chars = bounds.len() - 1;

    for offset in 0..chars {
        for n in ngram_min.max(1)..=ngram_max {
            if offset + n > chars {
                break;
            }
            callback(&input[bounds[offset]..bounds[offset + n]]);
        }
    }
}

/// Emits char n-grams inside every space-delimited ` word ` segment of a
/// padded document.
pub fn parse_ngram_chars_wb<'a>(
    input: &'a str,
    ngram_min: usize,
    ngram_max: usize,
    mut callback: impl FnMut(&'a str),
) {
    let spaces: Vec<usize> = input
        .char_indices()
        .filter(|(_, c)| is_space(*c))
        .map(|(index, _)| index)
        .collect();

    for pair in spaces.windows(2) {
        // Whitespace is ASCII, so `pair[1] + 1` is a char boundary.
        let segment = &input[pair[0]..pair[1] + 1];
        parse_ngram_chars(segment, ngram_min, ngram_max, &mut callback);
    }
}

/// Validated analyzer configuration that turns documents into tokens.
#[derive(Clone, Debug)]
pub struct ZiDocumentParser {
    analyzer: ZiAnalyzer,
    regex: Option<Regex>,
    ngram_min: u32,
    ngram_max: u32,
}

impl ZiDocumentParser {
    pub fn new(analyzer: ZiAnalyzer, regex: Option<&str>, ngram_min: u32, ngram_max: u32) -> Result<Self> {
        if ngram_min == 0 {
            return Err(ZiError::invalid_argument("ngram_min must be positive"));
        }
        if ngram_max == 0 {
            return Err(ZiError::invalid_argument("ngram_max must be positive"));
        }
        if ngram_min > ngram_max {
            return Err(ZiError::invalid_argument("ngram_min > ngram_max"));
        }

        let regex = match regex {
            Some(pattern) if !pattern.is_empty() => Some(Regex::new(pattern)?),
            _ => None,
        };

        Ok(Self {
            analyzer,
            regex,
            ngram_min,
            ngram_max,
        })
    }

    pub fn analyzer(&self) -> ZiAnalyzer {
        self.analyzer
    }

    /// The token pattern, or an empty string when none is configured.
    pub fn regex_pattern(&self) -> &str {
        self.regex.as_ref().map_or("", Regex::as_str)
    }

    pub fn ngram_range(&self) -> (u32, u32) {
        (self.ngram_min, self.ngram_max)
    }

    fn splits_on_whitespace(&self) -> bool {
        self.ngram_min == 1 && self.ngram_max == 1
    }

    /// Applies the analyzer's preprocessing.
    pub fn preprocess<'a>(&self, document: &'a str) -> Cow<'a, str> {
        match self.analyzer {
            ZiAnalyzer::Word if self.regex.is_some() || self.splits_on_whitespace() => {
                Cow::Borrowed(document)
            }
            ZiAnalyzer::Word | ZiAnalyzer::Char => Cow::Owned(replace_and_dedup(document)),
            ZiAnalyzer::Charwb => Cow::Owned(pad_with_spaces(&replace_and_dedup(document))),
        }
    }

    /// Tokenizes an already preprocessed document.
    pub fn tokenize<'a>(&self, processed: &'a str, callback: impl FnMut(&'a str)) {
        let (min, max) = (self.ngram_min as usize, self.ngram_max as usize);
        match (self.analyzer, &self.regex) {
            (ZiAnalyzer::Word, Some(regex)) => parse_regex(processed, regex, callback),
            (ZiAnalyzer::Word, None) if self.splits_on_whitespace() => parse_words(processed, callback),
            (ZiAnalyzer::Word, None) => parse_ngram_words(processed, min, max, callback),
            (ZiAnalyzer::Char, _) => parse_ngram_chars(processed, min, max, callback),
            (ZiAnalyzer::Charwb, _) => parse_ngram_chars_wb(processed, min, max, callback),
        }
    }

    /// Preprocesses and tokenizes `document`.
    pub fn for_each_token(&self, document: &str, mut callback: impl FnMut(&str)) {
        let processed = self.preprocess(document);
        self.tokenize(&processed, |token| callback(token));
    }
}
