// MIT License
// Copyright (c) 2024 Graham King

use clap::{Parser, Subcommand};
use std::env;
use std::fs;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod bigrams;
mod model;
mod seed;

const DB_NAME: &str = "speechdb.db";
const CFG_DIR: &str = ".config/speechdb";

#[derive(Parser)]
struct Cli {
    /// Sets a custom database path
    #[arg(long, value_name = "PATH")]
    db_path: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load presidents, speeches and their top bigrams
    Seed {
        #[clap(subcommand)]
        subcommand: seed::Commands,
    },
    /// Replace everything with three made-up presidents and their speeches
    TestData,
    /// Print how many rows each table has
    Counts,
    /// List every president, their speeches, and each speech's collocations
    Show,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let db_path = match cli.db_path {
        Some(db) => db,
        None => {
            let Ok(user_home) = env::var("HOME") else {
                eprintln!("$HOME not set");
                process::exit(1);
            };
            let cfg_dir = format!("{user_home}/{CFG_DIR}");
            fs::create_dir_all(&cfg_dir)?;
            format!("{cfg_dir}/{DB_NAME}")
        }
    };
    match cli.command {
        Commands::Seed { subcommand } => seed::run(&db_path, subcommand),
        Commands::TestData => {
            let mut db_conn = model::open(&db_path)?;
            model::create_all(&db_conn)?;
            model::test_data(&mut db_conn)?;
            println!("{}", model::counts(&db_conn)?);
            Ok(())
        }
        Commands::Counts => {
            let db_conn = model::open(&db_path)?;
            model::create_all(&db_conn)?;
            println!("{}", model::counts(&db_conn)?);
            Ok(())
        }
        Commands::Show => do_show(&db_path),
    }
}

fn do_show(db_path: &str) -> anyhow::Result<()> {
    let db_conn = model::open(db_path)?;
    model::create_all(&db_conn)?;

    let speeches = model::all_speeches(&db_conn)?;
    let collocations = model::all_collocations(&db_conn)?;
    let links = model::all_speech_collocations(&db_conn)?;
    for prez in model::all_presidents(&db_conn)? {
        println!("{prez}");
        for speech in speeches.iter().filter(|s| s.speaker == prez.id) {
            println!("  {speech}");
            let phrase_ids = links
                .iter()
                .filter(|l| l.speech_id == speech.id)
                .map(|l| l.phrase_id);
            for phrase_id in phrase_ids {
                if let Some(c) = collocations.iter().find(|c| c.id == phrase_id) {
                    println!("    {c}");
                }
            }
        }
    }
    Ok(())
}
