//! JSON file store backing the café documents.
//!
//! One pretty-printed UTF-8 JSON file per document in a flat data
//! directory. Writes are whole-file overwrites with no locking; when two
//! writers race on the same file the last completed write wins. That is an
//! accepted property of the single-admin deployment, not something the
//! store defends against.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::documents::DocumentKind;
use crate::error::{AppError, AppResult};

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+\.json$").unwrap());

#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    backup_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BackupReport {
    pub directory: String,
    pub files: usize,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Reject any filename outside the whitelist before it reaches the
    /// filesystem. This is the only defense against path traversal.
    pub fn check_filename(filename: &str) -> AppResult<()> {
        if FILENAME_RE.is_match(filename) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "invalid filename {:?}",
                filename
            )))
        }
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    pub async fn get(&self, filename: &str) -> AppResult<Value> {
        Self::check_filename(filename)?;
        read_document(&self.path_for(filename), filename).await
    }

    /// Full-document replace. Recognized documents are shape-validated
    /// first; unrecognized filenames pass through as-is.
    pub async fn put(&self, filename: &str, doc: &Value) -> AppResult<()> {
        Self::check_filename(filename)?;
        if let Some(kind) = DocumentKind::from_filename(filename) {
            kind.validate(doc)?;
        }
        write_document(&self.data_dir, &self.path_for(filename), doc).await?;
        debug!("wrote {}", filename);
        Ok(())
    }

    /// Shallow-merge `patch` into the item with the given id. Only the
    /// fields present in the patch are overwritten; `id` is never patched.
    pub async fn update_item(&self, filename: &str, id: u64, patch: &Value) -> AppResult<Value> {
        let items_key = self.items_key(filename)?;
        let patch = patch.as_object().ok_or_else(|| {
            AppError::BadRequest("patch body must be a JSON object".to_string())
        })?;

        let mut doc = self.get(filename).await?;
        let updated = {
            let item = find_item_mut(&mut doc, items_key, id, filename)?;
            let fields = item.as_object_mut().ok_or_else(|| {
                AppError::Internal(format!("{}: item {} is not an object", filename, id))
            })?;
            for (key, value) in patch {
                if key.as_str() != "id" {
                    fields.insert(key.clone(), value.clone());
                }
            }
            item.clone()
        };

        if let Some(kind) = DocumentKind::from_filename(filename) {
            kind.validate(&doc)?;
        }
        write_document(&self.data_dir, &self.path_for(filename), &doc).await?;
        Ok(updated)
    }

    /// Remove the item with the given id, preserving the order of the
    /// remaining items. Returns the removed item.
    pub async fn delete_item(&self, filename: &str, id: u64) -> AppResult<Value> {
        let items_key = self.items_key(filename)?;

        let mut doc = self.get(filename).await?;
        let items = doc
            .get_mut(items_key)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                AppError::Internal(format!("{}: missing {:?} array", filename, items_key))
            })?;
        let position = items
            .iter()
            .position(|item| item.get("id").and_then(Value::as_u64) == Some(id))
            .ok_or_else(|| {
                AppError::NotFound(format!("item {} not found in {}", id, filename))
            })?;
        let removed = items.remove(position);

        write_document(&self.data_dir, &self.path_for(filename), &doc).await?;
        Ok(removed)
    }

    /// Copy every `.json` file in the data directory into a fresh
    /// timestamped directory under the backup root.
    pub async fn backup(&self) -> AppResult<BackupReport> {
        let name = format!("backup-{}", Local::now().format("%Y%m%d-%H%M%S"));
        let target = self.backup_dir.join(&name);
        fs::create_dir_all(&target).await?;

        let mut files = 0;
        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(file_name) = path.file_name() {
                    fs::copy(&path, target.join(file_name)).await?;
                    files += 1;
                }
            }
        }

        info!("backed up {} files to {}", files, target.display());
        Ok(BackupReport {
            directory: name,
            files,
        })
    }

    /// Write the seed document for every recognized file that does not
    /// exist yet. Returns how many files were created.
    pub async fn seed_missing(&self) -> AppResult<usize> {
        let mut created = 0;
        for kind in DocumentKind::ALL {
            let path = self.path_for(kind.filename());
            if !path.exists() {
                write_document(&self.data_dir, &path, &kind.seed()).await?;
                info!("seeded {}", kind.filename());
                created += 1;
            }
        }
        Ok(created)
    }

    fn items_key(&self, filename: &str) -> AppResult<&'static str> {
        Self::check_filename(filename)?;
        let kind = DocumentKind::from_filename(filename).ok_or_else(|| {
            AppError::BadRequest(format!("{} does not support item operations", filename))
        })?;
        kind.items_key().ok_or_else(|| {
            AppError::BadRequest(format!("{} has no item array", filename))
        })
    }
}

async fn read_document(path: &Path, filename: &str) -> AppResult<Value> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("{} does not exist", filename)))
        }
        Err(err) => return Err(AppError::Io(err)),
    };
    serde_json::from_str(&text)
        .map_err(|err| AppError::Internal(format!("{} is not valid JSON: {}", filename, err)))
}

async fn write_document(data_dir: &Path, path: &Path, doc: &Value) -> AppResult<()> {
    fs::create_dir_all(data_dir).await?;
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    fs::write(path, text).await?;
    Ok(())
}

fn find_item_mut<'a>(
    doc: &'a mut Value,
    items_key: &str,
    id: u64,
    filename: &str,
) -> AppResult<&'a mut Value> {
    doc.get_mut(items_key)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| AppError::Internal(format!("{}: missing {:?} array", filename, items_key)))?
        .iter_mut()
        .find(|item| item.get("id").and_then(Value::as_u64) == Some(id))
        .ok_or_else(|| AppError::NotFound(format!("item {} not found in {}", id, filename)))
}
