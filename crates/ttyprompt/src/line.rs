// crates/ttyprompt/src/line.rs
//
// The line being edited: characters plus an insert position.

use unicode_width::UnicodeWidthChar;

/// Terminal cells taken by `c`. Zero-width and control characters count as
/// one so that every character occupies at least one addressable cell.
pub fn char_cells(c: char) -> usize {
    c.width().unwrap_or(1).max(1)
}

pub fn str_cells(s: &str) -> usize {
    s.chars().map(char_cells).sum()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    /// In `0..=chars.len()`.
    insert: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert_position(&self) -> usize {
        self.insert
    }

    pub fn at_end(&self) -> bool {
        self.insert == self.chars.len()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.insert, c);
        self.insert += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert(c);
        }
    }

    /// Delete the character before the insert position.
    pub fn backspace(&mut self) -> Option<char> {
        if self.insert == 0 {
            return None;
        }
        self.insert -= 1;
        Some(self.chars.remove(self.insert))
    }

    /// Replace the whole line and put the insert position at the end.
    pub fn set(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.insert = self.chars.len();
    }

    /// Replace the whole line, keeping the insert position where given.
    pub fn set_with_position(&mut self, text: &str, insert: usize) {
        self.chars = text.chars().collect();
        self.set_insert_position(insert);
    }

    pub fn set_insert_position(&mut self, insert: usize) {
        self.insert = insert.min(self.chars.len());
    }

    /// Step left, returning the character stepped over.
    pub fn move_left(&mut self) -> Option<char> {
        if self.insert == 0 {
            return None;
        }
        self.insert -= 1;
        Some(self.chars[self.insert])
    }

    /// Step right, returning the character stepped over.
    pub fn move_right(&mut self) -> Option<char> {
        let c = *self.chars.get(self.insert)?;
        self.insert += 1;
        Some(c)
    }

    /// What gets drawn: the text itself, or `echo` once per character.
    pub fn display(&self, echo: Option<&str>) -> String {
        match echo {
            Some(mask) => mask.repeat(self.chars.len()),
            None => self.text(),
        }
    }
}
