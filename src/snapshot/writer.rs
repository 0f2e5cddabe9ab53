//! Status file persistence
//!
//! Writes the snapshot to a sibling temp file, then renames it over the
//! target so readers never see a half-written file. A sidecar lock file
//! (`.status.json.lock`) serializes writers against readers: writers hold it
//! exclusively across write + rename, readers hold it shared.

use crate::data::Snapshot;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Hidden sibling of `path`, e.g. `status.json` + `tmp` -> `.status.json.tmp`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "status.json".to_string());
    path.with_file_name(format!(".{}.{}", name, suffix))
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, "tmp")
}

fn lock_path(path: &Path) -> PathBuf {
    sibling_path(path, "lock")
}

fn open_lock(path: &Path) -> std::io::Result<File> {
    fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))
}

/// Overwrite `path` with the pretty-printed snapshot.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(snapshot)?;
    let tmp = temp_path(path);

    let lock = open_lock(path)
        .with_context(|| format!("Failed to open lock for {}", path.display()))?;
    lock.lock_exclusive()?; // Exclusive lock for writing

    let result = write_and_rename(&tmp, path, content.as_bytes());

    lock.unlock()?;

    result
}

fn write_and_rename(tmp: &Path, path: &Path, content: &[u8]) -> Result<()> {
    let file = File::create(tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;

    {
        let mut writer = BufWriter::new(&file);
        writer.write_all(content)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, path)
        .with_context(|| format!("Failed to write status to {}", path.display()))?;

    Ok(())
}

/// Read back a previously written snapshot, if one exists and parses.
pub fn read_snapshot(path: &Path) -> Option<Snapshot> {
    if !path.exists() {
        return None;
    }

    let lock = open_lock(path).ok()?;
    lock.lock_shared().ok()?; // Shared lock for reading

    let content = fs::read_to_string(path);

    let _ = lock.unlock();

    serde_json::from_str(&content.ok()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgentStatus, AgentStatusRecord, NO_SESSION_TASK};
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        Snapshot {
            title: "Office".into(),
            timestamp: 1_700_000_000_000,
            agents: vec![AgentStatusRecord {
                id: "a1".into(),
                name: "Ann".into(),
                sprite: "desk-with-pc.png".into(),
                role: String::new(),
                status: AgentStatus::Offline,
                task: NO_SESSION_TASK.into(),
                last_active: -1,
                session: None,
                tokens: 0,
            }],
        }
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("/srv/office/status.json")),
            PathBuf::from("/srv/office/.status.json.tmp")
        );
    }

    #[test]
    fn test_lock_path_is_hidden_sibling() {
        assert_eq!(
            lock_path(Path::new("/srv/office/status.json")),
            PathBuf::from("/srv/office/.status.json.lock")
        );
    }

    #[test]
    fn test_write_waits_for_reader_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        write_snapshot(&path, &snapshot()).unwrap();

        // A reader holding the shared lock must block the writer
        let reader = open_lock(&path).unwrap();
        reader.lock_shared().unwrap();

        let mut updated = snapshot();
        updated.timestamp += 1;
        let writer_path = path.clone();
        let handle = std::thread::spawn(move || write_snapshot(&writer_path, &updated));

        std::thread::sleep(std::time::Duration::from_millis(100));
        assert_eq!(read_snapshot_unlocked(&path).timestamp, snapshot().timestamp);

        reader.unlock().unwrap();
        handle.join().unwrap().unwrap();
        assert_eq!(read_snapshot(&path).unwrap().timestamp, snapshot().timestamp + 1);
    }

    fn read_snapshot_unlocked(path: &Path) -> Snapshot {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_write_is_pretty_and_unescaped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");

        write_snapshot(&path, &snapshot()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("尚未建立 session"));
        assert!(content.contains("\n  \"title\": \"Office\""));
        assert!(!dir.path().join(".status.json.tmp").exists());
    }

    #[test]
    fn test_write_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        fs::write(&path, "{\"stale\": true, \"padding\": \"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\"}").unwrap();

        write_snapshot(&path, &snapshot()).unwrap();

        assert_eq!(read_snapshot(&path), Some(snapshot()));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/status.json");
        write_snapshot(&path, &snapshot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_or_corrupt_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        assert!(read_snapshot(&path).is_none());

        fs::write(&path, "garbage").unwrap();
        assert!(read_snapshot(&path).is_none());
    }
}
