//! Dictionary tooling.
//!
//! `build-dict` converts a tab-separated phrase table into the main
//! dictionary file pair, `export-userdict` dumps a persisted user
//! dictionary to JSON or CSV.
//!
//! Table line format: `pinyin<TAB>phrase<TAB>freq`, syllables separated by
//! `'` or spaces, e.g. `ni'hao<TAB>你好<TAB>8000`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pyzy_core::dictionary::{MainDictBuilder, UserRecord, DESC_TABLE, PHRASE_TABLE};
use pyzy_core::pinyin::sequence_ids;
use redb::ReadableTable;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pyzy-tools")]
#[command(about = "Build and inspect pyzy dictionaries")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a text phrase table into the main dictionary file pair.
    BuildDict {
        /// Input table: pinyin<TAB>phrase<TAB>freq
        #[arg(long)]
        input: PathBuf,

        /// Output fst index; the payload file lands next to it with the
        /// `.phrases` extension
        #[arg(long, default_value = "main.fst")]
        out_fst: PathBuf,
    },

    /// Export a persisted user dictionary to JSON or CSV.
    ExportUserdict {
        /// Path to user-1.0.db
        #[arg(long)]
        db: PathBuf,

        /// Output format: json or csv
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::BuildDict { input, out_fst } => build_dict(&input, &out_fst),
        Command::ExportUserdict { db, format, output } => export_userdict(&db, &format, output),
    }
}

fn build_dict(input: &PathBuf, out_fst: &PathBuf) -> Result<()> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("open table {}", input.display()))?;
    let reader = BufReader::new(file);

    let mut builder = MainDictBuilder::new();
    let mut total = 0usize;
    let mut skipped = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(pinyin), Some(phrase)) = (fields.next(), fields.next()) else {
            anyhow::bail!("line {}: expected pinyin<TAB>phrase[<TAB>freq]", lineno + 1);
        };
        let freq: u32 = fields.next().unwrap_or("0").trim().parse().unwrap_or(0);
        match sequence_ids(pinyin) {
            Some(ids) => {
                builder.insert(&ids, phrase, freq);
                total += 1;
            }
            None => {
                eprintln!("line {}: unparsable pinyin {:?}, skipped", lineno + 1, pinyin);
                skipped += 1;
            }
        }
    }

    builder
        .write(out_fst)
        .with_context(|| format!("write {}", out_fst.display()))?;
    println!(
        "wrote {} ({} phrases, {} skipped)",
        out_fst.display(),
        total,
        skipped
    );
    Ok(())
}

fn export_userdict(db: &PathBuf, format: &str, output: Option<PathBuf>) -> Result<()> {
    let db = redb::Database::open(db).with_context(|| format!("open {}", db.display()))?;
    let tx = db.begin_read()?;

    let mut desc: Vec<(String, String)> = Vec::new();
    if let Ok(table) = tx.open_table(DESC_TABLE) {
        for item in table.iter()? {
            let (k, v) = item?;
            desc.push((k.value().to_string(), v.value().to_string()));
        }
    }

    let mut entries: Vec<UserRecord> = Vec::new();
    if let Ok(table) = tx.open_table(PHRASE_TABLE) {
        for item in table.iter()? {
            let (_, v) = item?;
            let rows: Vec<UserRecord> = bincode::deserialize(v.value())?;
            entries.extend(rows);
        }
    }
    entries.sort_by(|a, b| (b.user_freq, b.freq).cmp(&(a.user_freq, a.freq)));

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&serde_json::json!({
            "desc": desc.iter().cloned().collect::<std::collections::BTreeMap<_, _>>(),
            "phrases": entries,
        }))?,
        "csv" => {
            let mut out = String::from("phrase,freq,user_freq\n");
            for e in &entries {
                out.push_str(&format!("{},{},{}\n", e.text, e.freq, e.user_freq));
            }
            out
        }
        _ => anyhow::bail!("unsupported format: {}. Use 'json' or 'csv'", format),
    };

    match output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
