use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use ttyprompt_common::config::ttyprompt_dir;
use ttyprompt_common::history::HistoryProvider;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default on-disk location: `~/.ttyprompt/history`.
pub fn default_history_path() -> PathBuf {
    ttyprompt_dir().join("history")
}

/// Bounded line history, optionally persisted to a plain text file
/// (one entry per line, oldest first).
#[derive(Debug, Clone)]
pub struct FileHistory {
    entries: Vec<String>,
    /// Navigation cursor in `0..=entries.len()`; `entries.len()` is the fresh line.
    index: usize,
    max_entries: usize,
    path: Option<PathBuf>,
}

impl FileHistory {
    /// A history that is never written anywhere.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            max_entries: DEFAULT_MAX_ENTRIES,
            path: None,
        }
    }

    /// Load the history stored at `path`, if any. A missing file is an empty history.
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Result<Self> {
        let path = path.into();
        let mut history = Self {
            entries: Vec::new(),
            index: 0,
            max_entries,
            path: Some(path.clone()),
        };
        if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read history {}", path.display()))?;
            for line in raw.lines() {
                history.append(line);
            }
            tracing::debug!(
                "loaded {} history entries from {}",
                history.entries.len(),
                path.display()
            );
        }
        history.index = history.entries.len();
        Ok(history)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn append(&mut self, line: &str) {
        if line.is_empty() || self.max_entries == 0 {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
            self.index = self.index.saturating_sub(overflow);
        }
    }
}

impl HistoryProvider for FileHistory {
    fn at_start(&self) -> bool {
        self.index == 0
    }

    fn at_penultimate(&self) -> bool {
        !self.entries.is_empty() && self.index == self.entries.len() - 1
    }

    fn past_end(&self) -> bool {
        self.index >= self.entries.len()
    }

    fn at_end(&self) -> bool {
        self.index == self.entries.len()
    }

    fn prev(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).cloned()
    }

    fn next(&mut self) -> Option<String> {
        if self.index >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).cloned()
    }

    fn reset(&mut self) {
        self.index = self.entries.len();
    }

    fn push(&mut self, line: &str) {
        self.append(line);
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let mut contents = self.entries.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(path, contents).with_context(|| format!("write history {}", path.display()))?;
        tracing::debug!("saved {} history entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}

impl Default for FileHistory {
    fn default() -> Self {
        Self::in_memory()
    }
}
