// MIT License
// Copyright (c) 2024 Graham King

use std::fs;
use std::path;

use anyhow::Context;

/// One entry of the speeches JSON file. Other keys in the entry are ignored.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeechRecord {
    #[serde(deserialize_with = "joined")]
    pub president: String,
    #[serde(deserialize_with = "joined")]
    pub title: String,
    #[serde(deserialize_with = "joined")]
    pub url: String,
}

// Scraped files sometimes hold a list of fragments where a string is expected
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Text {
    One(String),
    Many(Vec<String>),
}

fn joined<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text: Text = serde::Deserialize::deserialize(deserializer)?;
    Ok(match text {
        Text::One(s) => s,
        Text::Many(parts) => parts.concat(),
    })
}

pub fn read_speeches(filepath: &path::Path) -> anyhow::Result<Vec<SpeechRecord>> {
    let contents =
        fs::read_to_string(filepath).with_context(|| format!("{}", filepath.display()))?;
    let records: Vec<SpeechRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", filepath.display()))?;
    Ok(records)
}
