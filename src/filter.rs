use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use snafu::ResultExt;

use crate::{
    error::{NotFoundSnafu, Result},
    normalize::Normalizer,
    tokenizer::WordTokenizer,
};

/// Drops stopwords and rewrites alternative spellings to a canonical form.
///
/// Stopwords are tested first, then the survivors go through the
/// alternative map. That matches the original pipeline and means an
/// alternative target that is itself a stopword survives filtering.
/// Substitution is one-shot, never transitive.
pub struct TokenFilter {
    stopwords: HashSet<String>,
    alternatives: HashMap<String, String>,
}

impl TokenFilter {
    pub fn new(stopwords: HashSet<String>, alternatives: HashMap<String, String>) -> Self {
        TokenFilter {
            stopwords,
            alternatives,
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn apply<'a>(&'a self, tokens: Vec<&'a str>) -> Vec<&'a str> {
        tokens
            .into_iter()
            .filter(|token| !self.stopwords.contains(*token))
            .map(|token| self.alternatives.get(token).map_or(token, String::as_str))
            .collect()
    }
}

/// Reads the stopword file and turns it into a membership set. The file
/// content goes through the same normalization and tokenization as the
/// chat text so set lookups match post-normalization tokens.
pub fn load_stopwords(
    path: &Path,
    normalizer: &Normalizer,
    tokenizer: &WordTokenizer,
) -> Result<HashSet<String>> {
    let raw = fs::read_to_string(path).context(NotFoundSnafu { path })?;
    let normalized = normalizer.normalize(&raw);

    Ok(tokenizer
        .tokenize(&normalized)
        .into_iter()
        .map(str::to_owned)
        .collect())
}
