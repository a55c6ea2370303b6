// crates/ttyprompt/src/history.rs
//
// Drives a HistoryProvider from the line editor, remembering the fresh line
// while the user browses older entries.

use crate::line::LineBuffer;
use ttyprompt_common::history::HistoryProvider;

pub struct HistoryNavigator<'a> {
    history: &'a mut dyn HistoryProvider,
    /// The unsent line and its insert position, taken when browsing starts.
    saved: Option<(String, usize)>,
}

impl<'a> HistoryNavigator<'a> {
    pub fn new(history: &'a mut dyn HistoryProvider) -> Self {
        history.reset();
        Self {
            history,
            saved: None,
        }
    }

    /// Replace the line with the previous entry. Returns whether the line
    /// changed.
    pub fn scroll_up(&mut self, line: &mut LineBuffer) -> bool {
        if self.history.at_start() {
            return false;
        }
        if self.history.at_end() {
            self.saved = Some((line.text(), line.insert_position()));
        }
        match self.history.prev() {
            Some(entry) => {
                tracing::debug!("history: up");
                line.set(&entry);
                true
            }
            None => false,
        }
    }

    /// Replace the line with the next entry, or with the saved fresh line
    /// when stepping past the newest entry.
    pub fn scroll_down(&mut self, line: &mut LineBuffer) -> bool {
        if self.history.past_end() {
            return false;
        }
        if self.history.at_penultimate() {
            // Advance the pointer; the value comes from the snapshot.
            let _ = self.history.next();
            let (text, insert) = self.saved.take().unwrap_or_default();
            tracing::debug!("history: back to fresh line");
            line.set_with_position(&text, insert);
            return true;
        }
        match self.history.next() {
            Some(entry) => {
                tracing::debug!("history: down");
                line.set(&entry);
                true
            }
            None => false,
        }
    }

    /// Record an accepted line and get ready for the next prompt.
    pub fn accept(&mut self, line: &str) {
        if !line.is_empty() {
            self.history.push(line);
        }
        self.history.reset();
        self.saved = None;
    }

    /// Leave the history untouched, pointer reset.
    pub fn abandon(&mut self) {
        self.history.reset();
        self.saved = None;
    }
}
