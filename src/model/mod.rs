// MIT License
// Copyright (c) 2024 Graham King

use std::fmt;
use std::path::Path;

use rusqlite::OptionalExtension;

mod db;

/// A lookup that should have matched a set number of rows did not.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no row in {table} where {column} = {value:?}")]
    NotFound {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("expected exactly one row in {table} where {column} = {value:?}, found {count}")]
    Ambiguous {
        table: &'static str,
        column: &'static str,
        value: String,
        count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct President {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speech {
    pub id: i64,
    pub title: String,
    pub speaker: i64,
    pub link: Option<String>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collocation {
    pub id: i64,
    pub phrase: String,
    pub sentiment_score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCollocation {
    pub id: i64,
    pub speech_id: i64,
    pub phrase_id: i64,
}

impl fmt::Display for President {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "president {} '{}'", self.id, self.name)
    }
}

impl fmt::Display for Speech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "speech {} '{}' by president {}",
            self.id, self.title, self.speaker
        )?;
        if let Some(sentiment) = &self.sentiment {
            write!(f, " ({sentiment})")?;
        }
        Ok(())
    }
}

impl fmt::Display for Collocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collocation {} '{}'", self.id, self.phrase)
    }
}

/// Row count of every table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub presidents: usize,
    pub speeches: usize,
    pub collocations: usize,
    pub speech_collocations: usize,
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "presidents:          {}", self.presidents)?;
        writeln!(f, "speeches:            {}", self.speeches)?;
        writeln!(f, "collocations:        {}", self.collocations)?;
        write!(f, "speech_collocations: {}", self.speech_collocations)
    }
}

/// Open the database file with foreign keys enforced.
pub fn open<P: AsRef<Path>>(db_path: P) -> anyhow::Result<rusqlite::Connection> {
    let db_conn = rusqlite::Connection::open(db_path)?;
    db_conn.pragma_update(None, "foreign_keys", true)?;
    Ok(db_conn)
}

pub fn create_all(db_conn: &rusqlite::Connection) -> anyhow::Result<()> {
    for stmt in db::CREATE_ALL {
        db_conn.execute(stmt, ())?;
    }
    Ok(())
}

/// Empty every table, children before parents.
pub fn clear_all(db_conn: &rusqlite::Connection) -> anyhow::Result<()> {
    clear_speeches(db_conn)?;
    db_conn.execute(db::DELETE_PRESIDENTS, ())?;
    Ok(())
}

/// Empty speeches and every collocation, presidents stay.
pub fn clear_speeches(db_conn: &rusqlite::Connection) -> anyhow::Result<()> {
    clear_collocations(db_conn)?;
    db_conn.execute(db::DELETE_SPEECHES, ())?;
    Ok(())
}

/// Empty the join table and the collocations it points at.
pub fn clear_collocations(db_conn: &rusqlite::Connection) -> anyhow::Result<()> {
    db_conn.execute(db::DELETE_SPEECH_COLLOCATIONS, ())?;
    db_conn.execute(db::DELETE_COLLOCATIONS, ())?;
    Ok(())
}

pub fn insert_president(db_conn: &rusqlite::Connection, name: &str) -> anyhow::Result<i64> {
    let id = db_conn.query_row(
        "INSERT INTO presidents (name) VALUES (?1) RETURNING (id)",
        [name],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}

pub fn insert_speech(
    db_conn: &rusqlite::Connection,
    title: &str,
    speaker: i64,
    link: Option<&str>,
    sentiment: Option<&str>,
) -> anyhow::Result<i64> {
    let id = db_conn.query_row(
        r#"INSERT INTO speeches (title, speaker, link, sentiment)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING (id)"#,
        (title, speaker, link, sentiment),
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}

pub fn insert_collocation(
    db_conn: &rusqlite::Connection,
    phrase: &str,
    sentiment_score: Option<&str>,
) -> anyhow::Result<i64> {
    let id = db_conn.query_row(
        "INSERT INTO collocations (phrase, sentiment_score) VALUES (?1, ?2) RETURNING (id)",
        (phrase, sentiment_score),
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}

pub fn insert_speech_collocation(
    db_conn: &rusqlite::Connection,
    speech_id: i64,
    phrase_id: i64,
) -> anyhow::Result<i64> {
    let id = db_conn.query_row(
        "INSERT INTO speech_collocations (speech_id, phrase_id) VALUES (?1, ?2) RETURNING (id)",
        (speech_id, phrase_id),
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}

/// Id of the president with exactly this name, case-sensitive
pub fn find_president(
    db_conn: &rusqlite::Connection,
    name: &str,
) -> anyhow::Result<Option<i64>> {
    let id = db_conn
        .query_row(
            "SELECT id FROM presidents WHERE name = ?1 ORDER BY id LIMIT 1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

/// The one president with this name. Zero or several matches is an error.
pub fn president_by_name(
    db_conn: &rusqlite::Connection,
    name: &str,
) -> anyhow::Result<President> {
    let mut stmt = db_conn.prepare("SELECT id, name FROM presidents WHERE name = ?1")?;
    let mut found = stmt
        .query_map([name], row_to_president)?
        .collect::<Result<Vec<_>, _>>()?;
    match found.len() {
        0 => Err(LookupError::NotFound {
            table: "presidents",
            column: "name",
            value: name.to_string(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        count => Err(LookupError::Ambiguous {
            table: "presidents",
            column: "name",
            value: name.to_string(),
            count,
        }
        .into()),
    }
}

/// Lowest id speech with this title. Titles are not unique, later ones are ignored.
pub fn first_speech_by_title(
    db_conn: &rusqlite::Connection,
    title: &str,
) -> anyhow::Result<Speech> {
    let speech = db_conn
        .query_row(
            r#"SELECT id, title, speaker, link, sentiment FROM speeches
            WHERE title = ?1
            ORDER BY id LIMIT 1"#,
            [title],
            row_to_speech,
        )
        .optional()?;
    speech.ok_or_else(|| {
        LookupError::NotFound {
            table: "speeches",
            column: "title",
            value: title.to_string(),
        }
        .into()
    })
}

pub fn all_presidents(db_conn: &rusqlite::Connection) -> anyhow::Result<Vec<President>> {
    let mut stmt = db_conn.prepare("SELECT id, name FROM presidents ORDER BY id")?;
    let rows = stmt.query_map((), row_to_president)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn all_speeches(db_conn: &rusqlite::Connection) -> anyhow::Result<Vec<Speech>> {
    let mut stmt = db_conn
        .prepare("SELECT id, title, speaker, link, sentiment FROM speeches ORDER BY id")?;
    let rows = stmt.query_map((), row_to_speech)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn all_collocations(db_conn: &rusqlite::Connection) -> anyhow::Result<Vec<Collocation>> {
    let mut stmt =
        db_conn.prepare("SELECT id, phrase, sentiment_score FROM collocations ORDER BY id")?;
    let rows = stmt.query_map((), |row| {
        Ok(Collocation {
            id: row.get(0)?,
            phrase: row.get(1)?,
            sentiment_score: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn all_speech_collocations(
    db_conn: &rusqlite::Connection,
) -> anyhow::Result<Vec<SpeechCollocation>> {
    let mut stmt = db_conn
        .prepare("SELECT id, speech_id, phrase_id FROM speech_collocations ORDER BY id")?;
    let rows = stmt.query_map((), |row| {
        Ok(SpeechCollocation {
            id: row.get(0)?,
            speech_id: row.get(1)?,
            phrase_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn counts(db_conn: &rusqlite::Connection) -> anyhow::Result<Counts> {
    let count = |table: &str| -> anyhow::Result<usize> {
        let n = db_conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), (), |row| {
            row.get::<_, usize>(0)
        })?;
        Ok(n)
    };
    Ok(Counts {
        presidents: count("presidents")?,
        speeches: count("speeches")?,
        collocations: count("collocations")?,
        speech_collocations: count("speech_collocations")?,
    })
}

/// Replace everything with a small fixed data set: three presidents,
/// one speech each, one collocation per speech.
pub fn test_data(db_conn: &mut rusqlite::Connection) -> anyhow::Result<()> {
    let tx = db_conn.transaction()?;
    clear_all(&tx)?;

    let fixtures = [
        (
            "Kanye West",
            "State of the Union (January 7, 2020)",
            "pos",
            "climb spaceship",
            "negative",
        ),
        (
            "Beyonce Knowles",
            "State of the Union (January 25, 2024)",
            "neg",
            "formation coordination",
            "neutral",
        ),
        (
            "Janelle Monae",
            "State of the Union (January 10, 2028)",
            "pos",
            "electric lady",
            "positive",
        ),
    ];
    for (name, title, sentiment, phrase, score) in fixtures {
        let prez_id = insert_president(&tx, name)?;
        let speech_id = insert_speech(&tx, title, prez_id, None, Some(sentiment))?;
        let phrase_id = insert_collocation(&tx, phrase, Some(score))?;
        insert_speech_collocation(&tx, speech_id, phrase_id)?;
    }

    tx.commit()?;
    Ok(())
}

fn row_to_president(row: &rusqlite::Row<'_>) -> rusqlite::Result<President> {
    Ok(President {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn row_to_speech(row: &rusqlite::Row<'_>) -> rusqlite::Result<Speech> {
    Ok(Speech {
        id: row.get(0)?,
        title: row.get(1)?,
        speaker: row.get(2)?,
        link: row.get(3)?,
        sentiment: row.get(4)?,
    })
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> rusqlite::Connection {
    let db_conn = open(":memory:").expect("in-memory db");
    create_all(&db_conn).expect("create tables");
    db_conn
}
