// MIT License
// Copyright (c) 2024 Graham King

use std::collections::BTreeMap;
use std::fs;
use std::path;

use anyhow::Context;

/// Two adjacent words
pub type Bigram = (String, String);

/// president name -> speech title -> that speech's top bigrams
pub type TopBigrams = BTreeMap<String, BTreeMap<String, Vec<Bigram>>>;

/// Whatever finds the most common bigrams of each speech.
pub trait BigramSource {
    fn top_bigrams(&self) -> anyhow::Result<TopBigrams>;
}

/// Bigrams computed elsewhere and saved as JSON:
///
/// ```json
/// { "Abraham Lincoln": { "Inaugural Address": [["united", "states"]] } }
/// ```
pub struct BigramFile {
    path: path::PathBuf,
}

impl BigramFile {
    pub fn new<P: Into<path::PathBuf>>(path: P) -> Self {
        BigramFile { path: path.into() }
    }
}

impl BigramSource for BigramFile {
    fn top_bigrams(&self) -> anyhow::Result<TopBigrams> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("{}", self.path.display()))?;
        let bigrams: TopBigrams = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(bigrams)
    }
}

impl BigramSource for TopBigrams {
    fn top_bigrams(&self) -> anyhow::Result<TopBigrams> {
        Ok(self.clone())
    }
}

/// The text stored for a bigram
pub fn phrase(bigram: &Bigram) -> String {
    format!("{} {}", bigram.0, bigram.1)
}
