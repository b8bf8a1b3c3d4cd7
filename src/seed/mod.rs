// MIT License
// Copyright (c) 2024 Graham King

use std::path;

use crate::bigrams::{self, BigramFile, BigramSource};
use crate::model;

mod record;

pub use record::{read_speeches, SpeechRecord};

const DEFAULT_SPEECHES: &str = "allspeeches.json";
const DEFAULT_BIGRAMS: &str = "bigrams.json";

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Empty every table, then run steps 1, 2 and 3 in order
    All {
        /// JSON array of {president, title, url}
        #[clap(long, default_value = DEFAULT_SPEECHES)]
        speeches: path::PathBuf,
        /// JSON of president -> speech title -> [[word, word], ...]
        #[clap(long, default_value = DEFAULT_BIGRAMS)]
        bigrams: path::PathBuf,
    },

    /// 1. Add every president named in the speeches file who isn't in the db yet
    Presidents {
        #[clap(long, default_value = DEFAULT_SPEECHES)]
        speeches: path::PathBuf,
    },

    /// 2. Replace all speeches with the ones in the speeches file.
    ///    This also empties the collocations.
    Speeches {
        #[clap(long, default_value = DEFAULT_SPEECHES)]
        speeches: path::PathBuf,
    },

    /// 3. Replace all collocations with the top bigrams of each speech
    Collocations {
        #[clap(long, default_value = DEFAULT_BIGRAMS)]
        bigrams: path::PathBuf,
    },
}

pub fn run(db_path: &str, cmd: Commands) -> anyhow::Result<()> {
    let mut db_conn = model::open(db_path)?;
    model::create_all(&db_conn)?;

    match cmd {
        Commands::All { speeches, bigrams } => {
            let records = read_speeches(&speeches)?;
            model::clear_all(&db_conn)?;
            load_presidents(&mut db_conn, &records)?;
            load_speeches(&mut db_conn, &records)?;
            load_collocations(&mut db_conn, &BigramFile::new(bigrams))?;
        }
        Commands::Presidents { speeches } => {
            load_presidents(&mut db_conn, &read_speeches(&speeches)?)?;
        }
        Commands::Speeches { speeches } => {
            load_speeches(&mut db_conn, &read_speeches(&speeches)?)?;
        }
        Commands::Collocations { bigrams } => {
            load_collocations(&mut db_conn, &BigramFile::new(bigrams))?;
        }
    }
    Ok(())
}

/// Insert the president of each record unless one with that exact name
/// already exists. Returns how many were added.
pub fn load_presidents(
    db_conn: &mut rusqlite::Connection,
    records: &[SpeechRecord],
) -> anyhow::Result<usize> {
    let tx = db_conn.transaction()?;
    let mut added = 0;
    for r in records {
        // Check the table every time, a name can repeat within the file
        if model::find_president(&tx, &r.president)?.is_none() {
            model::insert_president(&tx, &r.president)?;
            added += 1;
        }
    }
    tx.commit()?;

    tracing::info!(records = records.len(), added, "loaded presidents");
    Ok(added)
}

/// Empty speeches and everything that hangs off them, then insert one speech
/// per record. Every record's president must already be loaded.
pub fn load_speeches(
    db_conn: &mut rusqlite::Connection,
    records: &[SpeechRecord],
) -> anyhow::Result<usize> {
    let tx = db_conn.transaction()?;
    model::clear_speeches(&tx)?;

    for r in records {
        let speaker = model::president_by_name(&tx, &r.president)?;
        model::insert_speech(&tx, &r.title, speaker.id, Some(&r.url), None)?;
    }
    tx.commit()?;

    tracing::info!(speeches = records.len(), "loaded speeches");
    Ok(records.len())
}

/// Replace all collocations with the top bigrams of each speech, linking each
/// one to its speech. Returns how many collocations were added.
pub fn load_collocations<S: BigramSource + ?Sized>(
    db_conn: &mut rusqlite::Connection,
    source: &S,
) -> anyhow::Result<usize> {
    let all_bigrams = source.top_bigrams()?;

    // Every title must resolve before anything is deleted
    let mut targets = Vec::new();
    for (prez, speeches) in &all_bigrams {
        for (title, speech_bigrams) in speeches {
            let speech = model::first_speech_by_title(db_conn, title)?;
            targets.push((prez, speech, speech_bigrams));
        }
    }

    let tx = db_conn.transaction()?;
    model::clear_collocations(&tx)?;
    tx.commit()?;

    let mut added = 0;
    for (prez, speech, speech_bigrams) in targets {
        // One speech at a time
        let tx = db_conn.transaction()?;
        for bigram in speech_bigrams {
            let phrase_id = model::insert_collocation(&tx, &bigrams::phrase(bigram), None)?;
            model::insert_speech_collocation(&tx, speech.id, phrase_id)?;
        }
        tx.commit()?;

        tracing::debug!(
            president = %prez,
            speech = %speech.title,
            bigrams = speech_bigrams.len(),
            "loaded speech collocations"
        );
        added += speech_bigrams.len();
    }

    tracing::info!(collocations = added, "loaded collocations");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::bigrams::{Bigram, TopBigrams};
    use crate::model::LookupError;

    fn record(president: &str, title: &str, url: &str) -> SpeechRecord {
        SpeechRecord {
            president: president.to_string(),
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn one_speech(president: &str, title: &str, bigrams: &[(&str, &str)]) -> TopBigrams {
        let pairs: Vec<Bigram> = bigrams
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        let mut speeches = BTreeMap::new();
        speeches.insert(title.to_string(), pairs);
        let mut out = TopBigrams::new();
        out.insert(president.to_string(), speeches);
        out
    }

    fn ada() -> Vec<SpeechRecord> {
        vec![record("Ada Lovelace", "Speech A", "http://x")]
    }

    #[test]
    fn presidents_twice_no_duplicates() {
        let mut db_conn = model::open_in_memory();
        let records = vec![
            record("Ada Lovelace", "Speech A", "http://a"),
            record("Charles Babbage", "Speech B", "http://b"),
            record("Ada Lovelace", "Speech C", "http://c"),
        ];

        assert_eq!(load_presidents(&mut db_conn, &records).unwrap(), 2);
        assert_eq!(load_presidents(&mut db_conn, &records).unwrap(), 0);

        let names: Vec<String> = model::all_presidents(&db_conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ada Lovelace", "Charles Babbage"]);
    }

    #[test]
    fn one_speech_per_record() {
        let mut db_conn = model::open_in_memory();
        let records = vec![
            record("Ada Lovelace", "Speech A", "http://a"),
            record("Charles Babbage", "Speech B", "http://b"),
            record("Ada Lovelace", "Speech C", "http://c"),
        ];
        load_presidents(&mut db_conn, &records).unwrap();
        assert_eq!(load_speeches(&mut db_conn, &records).unwrap(), 3);

        let presidents = model::all_presidents(&db_conn).unwrap();
        let speeches = model::all_speeches(&db_conn).unwrap();
        assert_eq!(speeches.len(), records.len());
        for (s, r) in speeches.iter().zip(&records) {
            let speaker = presidents.iter().find(|p| p.id == s.speaker).unwrap();
            assert_eq!(speaker.name, r.president);
            assert_eq!(s.title, r.title);
            assert_eq!(s.link.as_deref(), Some(r.url.as_str()));
        }
    }

    #[test]
    fn ada_lovelace_speech_a() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let prez = model::president_by_name(&db_conn, "Ada Lovelace").unwrap();
        let speeches = model::all_speeches(&db_conn).unwrap();
        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].title, "Speech A");
        assert_eq!(speeches[0].speaker, prez.id);
        assert_eq!(speeches[0].link.as_deref(), Some("http://x"));
    }

    #[test]
    fn speeches_reload_replaces() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();
        load_collocations(&mut db_conn, &one_speech("Ada Lovelace", "Speech A", &[("a", "b")]))
            .unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let c = model::counts(&db_conn).unwrap();
        assert_eq!(c.presidents, 1);
        assert_eq!(c.speeches, 1);
        assert_eq!(c.collocations, 0);
        assert_eq!(c.speech_collocations, 0);
    }

    #[test]
    fn speech_for_unknown_president_fails() {
        let mut db_conn = model::open_in_memory();
        let err = load_speeches(&mut db_conn, &ada()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LookupError>(),
            Some(LookupError::NotFound { table: "presidents", .. })
        ));
        assert_eq!(model::counts(&db_conn).unwrap().speeches, 0);
    }

    #[test]
    fn hello_world_collocation() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let source = one_speech("Ada Lovelace", "Speech A", &[("hello", "world")]);
        assert_eq!(load_collocations(&mut db_conn, &source).unwrap(), 1);

        let speech = model::first_speech_by_title(&db_conn, "Speech A").unwrap();
        let collocations = model::all_collocations(&db_conn).unwrap();
        assert_eq!(collocations.len(), 1);
        assert_eq!(collocations[0].phrase, "hello world");

        let links = model::all_speech_collocations(&db_conn).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].speech_id, speech.id);
        assert_eq!(links[0].phrase_id, collocations[0].id);
    }

    #[test]
    fn duplicate_phrases_stay_distinct() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let source = one_speech(
            "Ada Lovelace",
            "Speech A",
            &[("hello", "world"), ("hello", "world")],
        );
        load_collocations(&mut db_conn, &source).unwrap();

        let collocations = model::all_collocations(&db_conn).unwrap();
        assert_eq!(collocations.len(), 2);
        assert!(collocations.iter().all(|c| c.phrase == "hello world"));

        // Each join row points at the collocation inserted for it
        let links = model::all_speech_collocations(&db_conn).unwrap();
        let mut bound: Vec<i64> = links.iter().map(|l| l.phrase_id).collect();
        bound.sort();
        let mut ids: Vec<i64> = collocations.iter().map(|c| c.id).collect();
        ids.sort();
        assert_eq!(bound, ids);
    }

    #[test]
    fn collocations_twice_no_duplicates() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let source = one_speech("Ada Lovelace", "Speech A", &[("a", "b"), ("c", "d")]);
        load_collocations(&mut db_conn, &source).unwrap();
        load_collocations(&mut db_conn, &source).unwrap();

        let c = model::counts(&db_conn).unwrap();
        assert_eq!(c.collocations, 2);
        assert_eq!(c.speech_collocations, 2);
    }

    #[test]
    fn collocations_for_unknown_speech_fails() {
        let mut db_conn = model::open_in_memory();
        load_presidents(&mut db_conn, &ada()).unwrap();
        load_speeches(&mut db_conn, &ada()).unwrap();

        let loaded = one_speech("Ada Lovelace", "Speech A", &[("a", "b"), ("c", "d")]);
        load_collocations(&mut db_conn, &loaded).unwrap();

        let source = one_speech("Ada Lovelace", "Speech Z", &[("hello", "world")]);
        let err = load_collocations(&mut db_conn, &source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LookupError>(),
            Some(LookupError::NotFound { table: "speeches", .. })
        ));

        // Nothing was deleted
        let c = model::counts(&db_conn).unwrap();
        assert_eq!(c.collocations, 2);
        assert_eq!(c.speech_collocations, 2);
        let phrases: Vec<String> = model::all_collocations(&db_conn)
            .unwrap()
            .into_iter()
            .map(|c| c.phrase)
            .collect();
        assert_eq!(phrases, vec!["a b", "c d"]);
    }

    fn write_file(filepath: &path::Path, contents: &str) {
        std::fs::write(filepath, contents).unwrap();
    }

    #[test]
    fn run_all_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let speeches = dir.path().join("allspeeches.json");
        let bigrams = dir.path().join("bigrams.json");
        let db_path = dir.path().join("speechdb.db");
        write_file(
            &speeches,
            r#"[{"president":"Ada Lovelace","title":"Speech A","url":"http://x"},
                {"president":"Ada Lovelace","title":"Speech B","url":"http://y"}]"#,
        );
        write_file(
            &bigrams,
            r#"{"Ada Lovelace": {
                "Speech A": [["hello","world"]],
                "Speech B": [["analytical","engine"],["bernoulli","numbers"]]
            }}"#,
        );
        let db_str = db_path.to_str().unwrap();

        let cmd = || Commands::All {
            speeches: speeches.clone(),
            bigrams: bigrams.clone(),
        };
        run(db_str, cmd()).unwrap();
        run(db_str, cmd()).unwrap();

        let db_conn = model::open(&db_path).unwrap();
        assert_eq!(
            model::counts(&db_conn).unwrap(),
            model::Counts {
                presidents: 1,
                speeches: 2,
                collocations: 3,
                speech_collocations: 3,
            }
        );
    }

    #[test]
    fn run_all_replaces_previous_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let speeches = dir.path().join("allspeeches.json");
        let bigrams = dir.path().join("bigrams.json");
        let db_path = dir.path().join("speechdb.db");
        let db_str = db_path.to_str().unwrap();
        let cmd = || Commands::All {
            speeches: speeches.clone(),
            bigrams: bigrams.clone(),
        };

        write_file(
            &speeches,
            r#"[{"president":"Old Prez","title":"Old Speech","url":"http://old"}]"#,
        );
        write_file(&bigrams, r#"{"Old Prez": {"Old Speech": [["old","words"]]}}"#);
        run(db_str, cmd()).unwrap();

        write_file(
            &speeches,
            r#"[{"president":"New Prez","title":"New Speech","url":"http://new"}]"#,
        );
        write_file(&bigrams, r#"{"New Prez": {"New Speech": [["new","words"]]}}"#);
        run(db_str, cmd()).unwrap();

        let db_conn = model::open(&db_path).unwrap();
        let names: Vec<String> = model::all_presidents(&db_conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["New Prez"]);

        let speeches = model::all_speeches(&db_conn).unwrap();
        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].title, "New Speech");
        let phrases: Vec<String> = model::all_collocations(&db_conn)
            .unwrap()
            .into_iter()
            .map(|c| c.phrase)
            .collect();
        assert_eq!(phrases, vec!["new words"]);
    }
}
