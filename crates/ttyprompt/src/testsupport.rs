// crates/ttyprompt/src/testsupport.rs
//
// A Terminal that replays scripted reads and records everything written, for
// driving prompts in tests and in downstream crates' tests.

use anyhow::{bail, Result};
use std::collections::VecDeque;
use ttyprompt_pty::terminal::Terminal;

#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    reads: VecDeque<Vec<u8>>,
    output: Vec<u8>,
    columns: u16,
    rows: u16,
    cursor: (u16, u16),
    raw: bool,
    open: bool,
    opened: usize,
    closed: usize,
}

impl ScriptedTerminal {
    /// A `columns` x `rows` terminal with the cursor at the top left.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            reads: VecDeque::new(),
            output: Vec::new(),
            columns,
            rows,
            cursor: (1, 1),
            raw: false,
            open: false,
            opened: 0,
            closed: 0,
        }
    }

    /// Report the cursor at `(row, col)` when queried.
    pub fn at(mut self, row: u16, col: u16) -> Self {
        self.cursor = (row, col);
        self
    }

    /// Start in raw mode.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Each byte is its own read, as from a person typing.
    pub fn keys(mut self, bytes: &[u8]) -> Self {
        self.push_keys(bytes);
        self
    }

    /// Each character is its own read, encoded as UTF-8.
    pub fn typed(mut self, text: &str) -> Self {
        self.push_typed(text);
        self
    }

    /// All of `bytes` arrive together (split into chunks the reader can hold).
    pub fn chunk(mut self, bytes: &[u8]) -> Self {
        self.push_chunk(bytes);
        self
    }

    pub fn push_keys(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().map(|&b| vec![b]));
    }

    pub fn push_typed(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            self.reads.push_back(c.encode_utf8(&mut buf).as_bytes().to_vec());
        }
    }

    pub fn push_chunk(&mut self, bytes: &[u8]) {
        self.reads.push_back(bytes.to_vec());
    }

    pub fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Output as a terminal with newline translation would receive it.
    pub fn screen_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.output.len());
        for &b in &self.output {
            if b == b'\n' {
                bytes.push(b'\r');
            }
            bytes.push(b);
        }
        bytes
    }

    /// Where the cursor is reported to start.
    pub fn start_position(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_count(&self) -> usize {
        self.opened
    }

    pub fn close_count(&self) -> usize {
        self.closed
    }
}

impl Terminal for ScriptedTerminal {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        self.opened += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.closed += 1;
        }
        Ok(())
    }

    fn set_raw_mode(&mut self, raw: bool) -> Result<bool> {
        if !self.open {
            bail!("scripted terminal is not open");
        }
        let was_raw = self.raw;
        self.raw = raw;
        Ok(was_raw)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.open {
            bail!("scripted terminal is not open");
        }
        let Some(mut next) = self.reads.pop_front() else {
            return Ok(0);
        };
        if next.len() > buf.len() {
            let rest = next.split_off(buf.len());
            self.reads.push_front(rest);
        }
        buf[..next.len()].copy_from_slice(&next);
        Ok(next.len())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        Ok(self.cursor)
    }
}
