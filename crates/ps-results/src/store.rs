//! On-disk layout of one sweep.
//!
//! ```text
//! <root>/manifest.json          sweep metadata
//! <root>/i<id>.<ext>            materialized instance config
//! <root>/i<id>/                 instance output directory
//! <root>/instance_docs.jsonl    one record per finished instance, appended
//! <root>/instance_docs.json     full record list, written once at the end
//! ```

use crate::types::{DocumentationRecord, SweepManifest};
use crate::{ResultsError, ResultsResult};
use ps_core::InstanceId;
use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const JOURNAL_FILE: &str = "instance_docs.jsonl";
pub const DOCUMENTATION_FILE: &str = "instance_docs.json";

pub struct SweepStore {
    root_dir: PathBuf,
    journal: Option<File>,
}

impl SweepStore {
    /// Create a fresh output root. An existing directory is a conflict, so
    /// results of separate sweeps never mix.
    pub fn create(root_dir: PathBuf) -> ResultsResult<Self> {
        if let Some(parent) = root_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        match fs::create_dir(&root_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ResultsError::OutputDirectoryConflict { path: root_dir });
            }
            Err(e) => return Err(e.into()),
        }

        let journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(root_dir.join(JOURNAL_FILE))?;

        Ok(Self {
            root_dir,
            journal: Some(journal),
        })
    }

    /// Open an existing sweep for reading.
    pub fn open(root_dir: PathBuf) -> Self {
        Self {
            root_dir,
            journal: None,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn instance_dir(&self, id: InstanceId) -> PathBuf {
        self.root_dir.join(id.stem())
    }

    pub fn config_path(&self, id: InstanceId, extension: &str) -> PathBuf {
        self.root_dir.join(format!("{}.{}", id.stem(), extension))
    }

    pub fn documentation_path(&self) -> PathBuf {
        self.root_dir.join(DOCUMENTATION_FILE)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.root_dir.join(JOURNAL_FILE)
    }

    pub fn create_instance_dir(&self, id: InstanceId) -> ResultsResult<PathBuf> {
        let dir = self.instance_dir(id);
        match fs::create_dir(&dir) {
            Ok(()) => Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(ResultsError::InstanceDirectoryConflict { path: dir })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_manifest(&self, manifest: &SweepManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.root_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<SweepManifest> {
        let content = fs::read_to_string(self.root_dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Append one record to the journal and push it to disk before returning.
    pub fn append_record(&mut self, record: &DocumentationRecord) -> ResultsResult<()> {
        let Some(journal) = self.journal.as_mut() else {
            return Err(ResultsError::ReadOnlyStore {
                path: self.root_dir.clone(),
            });
        };
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        journal.write_all(line.as_bytes())?;
        journal.flush()?;
        journal.sync_data()?;
        Ok(())
    }

    /// Write the complete record list. Goes through a temporary file so a
    /// reader never sees a half-written array.
    pub fn save_documentation(&self, records: &[DocumentationRecord]) -> ResultsResult<PathBuf> {
        let path = self.documentation_path();
        let tmp = self.root_dir.join(format!("{DOCUMENTATION_FILE}.tmp"));
        fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    /// Final record list if present, otherwise whatever the journal holds.
    pub fn load_documentation(&self) -> ResultsResult<Vec<DocumentationRecord>> {
        let final_path = self.documentation_path();
        if final_path.exists() {
            return load_documentation_file(&final_path);
        }
        let journal_path = self.journal_path();
        if journal_path.exists() {
            return load_documentation_file(&journal_path);
        }
        Err(ResultsError::DocumentationNotFound {
            path: self.root_dir.clone(),
        })
    }
}

/// Read a documentation file: a JSON array, or a `.jsonl` journal.
///
/// A journal whose last line is cut short (crash mid-write) yields the
/// records before it.
pub fn load_documentation_file(path: &Path) -> ResultsResult<Vec<DocumentationRecord>> {
    let content = fs::read_to_string(path)?;
    let is_journal = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
    if !is_journal {
        return Ok(serde_json::from_str(&content)?);
    }

    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut records = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        match serde_json::from_str::<DocumentationRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) if i + 1 == lines.len() && !content.ends_with('\n') => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "dropping truncated final journal line"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(records)
}

/// Export records as `;`-separated rows: instance id, one column per
/// dimension (taken from the first record), status.
///
/// A field containing `;`, `"`, or a line break is wrapped in double quotes
/// with each inner `"` doubled. This applies to header names too.
pub fn export_csv(records: &[DocumentationRecord], dest: &Path) -> ResultsResult<()> {
    let columns: Vec<String> = records
        .first()
        .map(|r| r.parameters.keys().cloned().collect())
        .unwrap_or_default();

    let mut out = String::from("instance_id");
    for column in &columns {
        out.push(';');
        out.push_str(&csv_field(column));
    }
    out.push_str(";status\n");

    for record in records {
        out.push_str(&record.instance_id.to_string());
        for column in &columns {
            out.push(';');
            match record.parameters.get(column) {
                Some(serde_json::Value::String(s)) => out.push_str(&csv_field(s)),
                Some(other) => out.push_str(&csv_field(&other.to_string())),
                None => {}
            }
        }
        out.push(';');
        out.push_str(record.status.label());
        out.push('\n');
    }

    fs::write(dest, out)?;
    Ok(())
}

fn csv_field(raw: &str) -> Cow<'_, str> {
    if raw.contains([';', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}
