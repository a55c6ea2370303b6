// crates/ttyprompt/src/escape.rs
//
// ANSI control sequences written by the line editor, and recognition of the
// sequences a terminal sends for arrow keys.

use ttyprompt_common::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    fn final_byte(self) -> char {
        match self {
            Direction::Up => 'A',
            Direction::Down => 'B',
            Direction::Right => 'C',
            Direction::Left => 'D',
        }
    }

    fn from_final_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(Direction::Up),
            b'B' => Some(Direction::Down),
            b'C' => Some(Direction::Right),
            b'D' => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Which part of the current row `ESC[<n>K` erases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMethod {
    CursorToEnd,
    BeginningToCursor,
    EntireLine,
}

/// One control sequence, kept without its leading ESC so it can be shown in
/// logs and test failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    raw: String,
}

impl Sequence {
    fn csi(body: impl std::fmt::Display) -> Self {
        Self {
            raw: format!("[{}", body),
        }
    }

    /// The sequence without ESC, e.g. `[3A`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The sequence as written to the terminal.
    pub fn escaped(&self) -> String {
        format!("\x1b{}", self.raw)
    }

    pub fn exec(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        out.write_all(self.escaped().as_bytes())
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.escaped())
    }
}

/// Relative cursor movement. A count of 0 or 1 is written without a number.
pub fn move_sequence(direction: Direction, count: usize) -> Sequence {
    if count <= 1 {
        Sequence::csi(direction.final_byte())
    } else {
        Sequence::csi(format!("{}{}", count, direction.final_byte()))
    }
}

pub fn erase_line(method: EraseMethod) -> Sequence {
    let n = match method {
        EraseMethod::CursorToEnd => 0,
        EraseMethod::BeginningToCursor => 1,
        EraseMethod::EntireLine => 2,
    };
    Sequence::csi(format!("{}K", n))
}

/// Erase from the cursor to the end of the screen.
pub fn erase_down() -> Sequence {
    Sequence::csi('J')
}

/// Absolute column on the current row (1-based).
pub fn move_to_column(col: u16) -> Sequence {
    Sequence::csi(format!("{}G", col.max(1)))
}

/// Absolute position (1-based row and column).
pub fn move_to(row: u16, col: u16) -> Sequence {
    Sequence::csi(format!("{};{}H", row.max(1), col.max(1)))
}

pub fn insert_chars(count: usize) -> Sequence {
    Sequence::csi(format!("{}@", count.max(1)))
}

pub fn delete_chars(count: usize) -> Sequence {
    Sequence::csi(format!("{}P", count.max(1)))
}

pub fn save_cursor() -> Sequence {
    Sequence {
        raw: "7".to_string(),
    }
}

pub fn restore_cursor() -> Sequence {
    Sequence {
        raw: "8".to_string(),
    }
}

/// A piece of terminal output: plain text or a control sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part<'a> {
    Text(&'a str),
    Seq(Sequence),
}

impl<'a> From<&'a str> for Part<'a> {
    fn from(text: &'a str) -> Self {
        Part::Text(text)
    }
}

impl From<Sequence> for Part<'_> {
    fn from(seq: Sequence) -> Self {
        Part::Seq(seq)
    }
}

/// Join text and sequences into one string for a single write.
pub fn concat<'a>(parts: impl IntoIterator<Item = Part<'a>>) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            Part::Text(text) => out.push_str(text),
            Part::Seq(seq) => out.push_str(&seq.escaped()),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Input side
// ---------------------------------------------------------------------------

/// Recognise a complete arrow key: `ESC [ A..D` (normal mode) or
/// `ESC O A..D` (application cursor mode).
pub fn arrow_key(bytes: &[u8]) -> Option<Direction> {
    match bytes {
        [keys::ESC, b'[' | b'O', last] => Direction::from_final_byte(*last),
        _ => None,
    }
}

fn is_csi_parameter(byte: u8) -> bool {
    (0x20..=0x3f).contains(&byte)
}

fn is_csi_final(byte: u8) -> bool {
    (0x40..=0x7e).contains(&byte)
}

/// Length of the escape sequence at the start of `bytes`, or `None` if it is
/// cut off. `bytes[0]` must be ESC.
fn escape_len(bytes: &[u8]) -> Option<usize> {
    match bytes.get(1) {
        None => None,
        Some(b'[') => {
            let mut i = 2;
            while let Some(&b) = bytes.get(i) {
                if is_csi_final(b) {
                    return Some(i + 1);
                }
                if !is_csi_parameter(b) {
                    // Malformed: drop the introducer only.
                    return Some(2);
                }
                i += 1;
            }
            None
        }
        Some(b'O') => bytes.get(2).map(|_| 3),
        Some(_) => Some(1),
    }
}

/// Index at which `bytes` ends in an unfinished escape sequence or UTF-8
/// character; everything from there on should wait for the next read.
/// Returns `bytes.len()` when nothing is cut off.
pub fn incomplete_tail(bytes: &[u8]) -> usize {
    if let Some(esc) = bytes.iter().rposition(|&b| b == keys::ESC) {
        if escape_len(&bytes[esc..]).is_none() {
            return esc;
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => bytes.len(),
    }
}

/// One piece of a read, in the order it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Printable bytes, possibly multi-byte characters.
    Text(&'a [u8]),
    /// A single control byte (below space, or DEL).
    Control(u8),
    /// A whole escape sequence. A sequence cut off at the end runs to the
    /// end of `bytes`.
    Escape(&'a [u8]),
}

/// Split `bytes` into text runs, control bytes and escape sequences.
pub fn split_input(bytes: &[u8]) -> Vec<Input<'_>> {
    let mut parts = Vec::new();
    let mut text_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b >= keys::SPACE && b != keys::BACKSPACE {
            i += 1;
            continue;
        }
        if text_from < i {
            parts.push(Input::Text(&bytes[text_from..i]));
        }
        if b == keys::ESC {
            let len = escape_len(&bytes[i..]).unwrap_or(bytes.len() - i);
            parts.push(Input::Escape(&bytes[i..i + len]));
            i += len;
        } else {
            parts.push(Input::Control(b));
            i += 1;
        }
        text_from = i;
    }
    if text_from < bytes.len() {
        parts.push(Input::Text(&bytes[text_from..]));
    }
    parts
}
