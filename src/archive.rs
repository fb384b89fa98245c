// Tweet archives: the local files the CLI reads tweets from.
//
// Fetching from Twitter is out of scope; tweets arrive as one file per user
// in a directory:
//   <dir>/<user>.txt   one tweet per line, blank lines skipped
//   <dir>/<user>.json  JSON array of strings
// File stems are normalized the same way user names are.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::store::normalize_user;

/// A user archive found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub user: String,
    pub path: PathBuf,
}

/// List the archives in `dir`, sorted by user name.
///
/// When both `<user>.txt` and `<user>.json` exist, the `.txt` file wins.
pub fn list_users(dir: &Path) -> Result<Vec<ArchiveEntry>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read tweet directory {}", dir.display()))?;

    let mut archives: Vec<ArchiveEntry> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext != "txt" && ext != "json" {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let user = normalize_user(stem);
        if user.is_empty() {
            continue;
        }

        match archives.iter_mut().find(|a| a.user == user) {
            Some(existing) if ext == "txt" => existing.path = path,
            Some(_) => {}
            None => archives.push(ArchiveEntry { user, path }),
        }
    }

    archives.sort_by(|a, b| a.user.cmp(&b.user));
    Ok(archives)
}

/// Find the archive for `user` in `dir`.
pub fn find_user(dir: &Path, user: &str) -> Result<ArchiveEntry> {
    let user = normalize_user(user);
    list_users(dir)?
        .into_iter()
        .find(|a| a.user == user)
        .with_context(|| {
            format!(
                "No tweet archive for @{} in {} (expected {}.txt or {}.json)",
                user,
                dir.display(),
                user,
                user
            )
        })
}

/// Read the tweets in one archive file.
pub fn load_tweets(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let tweets: Vec<String> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str::<Vec<String>>(&contents)
            .with_context(|| format!("{} is not a JSON array of strings", path.display()))?,
        _ => contents.lines().map(str::to_string).collect(),
    };

    let tweets: Vec<String> = tweets
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    debug!(path = %path.display(), tweets = tweets.len(), "Loaded tweet archive");
    Ok(tweets)
}

/// Find and read the archive for `user`.
pub fn load_user(dir: &Path, user: &str) -> Result<Vec<String>> {
    let entry = find_user(dir, user)?;
    load_tweets(&entry.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nasa.txt"), "one\n\n  \ntwo\n").unwrap();
        assert_eq!(load_user(dir.path(), "nasa").unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_json_array() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ElonMusk.json"), r#"["a", " ", "b"]"#).unwrap();
        assert_eq!(load_user(dir.path(), "@elonmusk").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.json"), r#"{"not": "a list"}"#).unwrap();
        assert!(load_user(dir.path(), "x").is_err());
    }

    #[test]
    fn test_missing_user_names_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_user(dir.path(), "ghost").unwrap_err();
        assert!(err.to_string().contains("ghost.txt"));
    }

    #[test]
    fn test_list_users_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zed.txt"), "z").unwrap();
        std::fs::write(dir.path().join("amy.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let users: Vec<String> = list_users(dir.path())
            .unwrap()
            .into_iter()
            .map(|a| a.user)
            .collect();
        assert_eq!(users, vec!["amy", "zed"]);
    }

    #[test]
    fn test_txt_preferred_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dup.json"), r#"["from json"]"#).unwrap();
        std::fs::write(dir.path().join("dup.txt"), "from txt").unwrap();
        assert_eq!(load_user(dir.path(), "dup").unwrap(), vec!["from txt"]);
    }
}
