// MIT License
// Copyright (c) 2024 Graham King

pub const CREATE_PRESIDENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS presidents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    UNIQUE (name)
)
"#;

pub const CREATE_SPEECH_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS speeches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    speaker INTEGER NOT NULL,
    link TEXT NULL,
    sentiment TEXT NULL,
    FOREIGN KEY (speaker) REFERENCES presidents (id)
)
"#;

// Not unique, the same bigram can be in the top list of many speeches
pub const CREATE_COLLOCATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS collocations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phrase TEXT NOT NULL,
    sentiment_score TEXT NULL
)
"#;

pub const CREATE_SPEECH_COLLOCATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS speech_collocations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    speech_id INTEGER NOT NULL,
    phrase_id INTEGER NOT NULL,
    FOREIGN KEY (speech_id) REFERENCES speeches (id),
    FOREIGN KEY (phrase_id) REFERENCES collocations (id)
)
"#;

/// Parents first
pub const CREATE_ALL: &[&str] = &[
    CREATE_PRESIDENT_TABLE,
    CREATE_SPEECH_TABLE,
    CREATE_COLLOCATION_TABLE,
    CREATE_SPEECH_COLLOCATION_TABLE,
];

pub const DELETE_SPEECH_COLLOCATIONS: &str = "DELETE FROM speech_collocations";
pub const DELETE_COLLOCATIONS: &str = "DELETE FROM collocations";
pub const DELETE_SPEECHES: &str = "DELETE FROM speeches";
pub const DELETE_PRESIDENTS: &str = "DELETE FROM presidents";
