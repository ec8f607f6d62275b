// Seed data: the built-in demo records and JSONL import/export

use crate::models::{self, Post, User};
use crate::record::Record;
use crate::store::RecordStore;
use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The users every fresh dashboard starts with
pub fn demo_users() -> Vec<User> {
    let now = models::now();
    let user = |id: u64, name: &str, email: &str, role: &str| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        created_at: now,
        updated_at: now,
    };

    vec![
        user(1, "John Doe", "john@example.com", "admin"),
        user(2, "Jane Smith", "jane@example.com", "user"),
        user(3, "Bob Johnson", "bob@example.com", "user"),
    ]
}

/// The posts every fresh dashboard starts with
pub fn demo_posts() -> Vec<Post> {
    let now = models::now();
    let tags = |list: &[&str]| list.iter().map(|t| t.to_string()).collect::<Vec<_>>();

    vec![
        Post {
            id: 1,
            title: "Welcome to Our API".to_string(),
            content: "This is the first post demonstrating our REST API capabilities.".to_string(),
            author: "John Doe".to_string(),
            category: "announcement".to_string(),
            tags: tags(&["api", "welcome", "demo"]),
            likes: 15,
            created_at: now,
            updated_at: now,
        },
        Post {
            id: 2,
            title: "Getting Started with REST".to_string(),
            content: "Learn how to use REST APIs effectively with best practices.".to_string(),
            author: "Jane Smith".to_string(),
            category: "tutorial".to_string(),
            tags: tags(&["rest", "tutorial", "beginners"]),
            likes: 8,
            created_at: now,
            updated_at: now,
        },
    ]
}

/// Seed file for a collection: `{dir}/{collection}.jsonl`
pub fn seed_path<T: Record>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.jsonl", T::collection_name()))
}

/// Id sequence file for a collection: `{dir}/{collection}.seq`
pub fn seq_path<T: Record>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.seq", T::collection_name()))
}

/// Read a persisted id high-water mark; a missing file reads as 0
fn read_high_water(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Ok(0);
    }

    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    text.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid id sequence in {}", path.display()))
}

/// Read all records from a JSONL file, in file order
///
/// A missing file yields no records. Blank lines are ignored and malformed
/// lines are skipped with a warning.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSONL");

    Ok(records)
}

/// Write records to a JSONL file, replacing its contents
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;

    let mut writer = BufWriter::new(file);
    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(writer, "{}", json)?;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    Ok(())
}

/// Build a store from `{dir}/{collection}.jsonl`
///
/// The id sequence resumes after `{dir}/{collection}.seq` when that file exists.
pub fn load_store<T: Record>(dir: &Path) -> Result<RecordStore<T>> {
    let path = seed_path::<T>(dir);
    let records: Vec<T> = read_jsonl(&path)?;
    let high_water = read_high_water(&seq_path::<T>(dir))?;
    let store = RecordStore::with_records_from(records, high_water)
        .with_context(|| format!("Invalid seed data in {}", path.display()))?;
    Ok(store)
}

/// Write a store's records to `{dir}/{collection}.jsonl` and its id
/// high-water mark to `{dir}/{collection}.seq`
pub fn export_store<T: Record>(dir: &Path, store: &RecordStore<T>) -> Result<()> {
    std::fs::create_dir_all(dir).context("Failed to create export directory")?;
    let path = seed_path::<T>(dir);
    write_jsonl(&path, store.list())?;

    let seq = seq_path::<T>(dir);
    std::fs::write(&seq, format!("{}\n", store.high_water()))
        .with_context(|| format!("Failed to write {}", seq.display()))?;

    info!(file = ?path, count = store.len(), high_water = store.high_water(), "Exported records");
    Ok(())
}
