// crates/ttyprompt/src/render.rs
//
// Remembers what the prompt line currently shows so a redraw only rewrites
// the characters that changed, and where on screen each of them landed.

use crate::line::char_cells;

/// Screen cell of every drawn character, counted from the prompt start.
///
/// Cells run row after row. A wide character that does not fit in what is
/// left of a row starts on the next one; the cells it skipped still count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    starts: Vec<usize>,
    end: usize,
}

impl Layout {
    /// Lay out `chars` on rows of `columns` cells, the first character going
    /// `offset` cells into the first row.
    pub fn compute(chars: &[char], offset: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        let mut starts = Vec::with_capacity(chars.len());
        let mut cell = 0;
        for &c in chars {
            let width = char_cells(c);
            let used = (offset + cell) % columns;
            if width > 1 && width <= columns && used + width > columns {
                cell += columns - used;
            }
            starts.push(cell);
            cell += width;
        }
        Self { starts, end: cell }
    }

    pub fn start(&self, index: usize) -> Option<usize> {
        self.starts.get(index).copied()
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    drawn: Vec<char>,
    layout: Layout,
    /// Cells before the prompt start on its row.
    offset: usize,
    columns: usize,
}

impl RenderContext {
    /// `columns` wide screen, prompt starting in 1-based column `start_col`.
    pub fn new(columns: u16, start_col: u16) -> Self {
        Self {
            drawn: Vec::new(),
            layout: Layout::default(),
            offset: start_col.saturating_sub(1) as usize,
            columns: columns.max(1) as usize,
        }
    }

    pub fn drawn(&self) -> &[char] {
        &self.drawn
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// First cell of the drawn character at `index`, or the end cell past
    /// the last one.
    pub fn start_cell(&self, index: usize) -> usize {
        self.layout.start(index).unwrap_or(self.layout.end())
    }

    /// Where the cursor is left after writing the first `count` characters.
    pub fn end_of(&self, count: usize) -> usize {
        match count.checked_sub(1) {
            Some(last) if last < self.drawn.len() => {
                self.start_cell(last) + char_cells(self.drawn[last])
            }
            Some(_) => self.layout.end(),
            None => 0,
        }
    }

    pub fn end_cells(&self) -> usize {
        self.layout.end()
    }

    /// First cell and width of each drawn character from `index` on.
    pub fn spans(&self, index: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.drawn
            .iter()
            .enumerate()
            .skip(index)
            .map(|(i, &c)| (self.start_cell(i), char_cells(c)))
    }

    /// Last drawn character and its first cell.
    pub fn last_char(&self) -> Option<(char, usize)> {
        let c = *self.drawn.last()?;
        Some((c, self.start_cell(self.drawn.len() - 1)))
    }

    /// Index of the first character where `next` differs from what is drawn.
    pub fn diff_start(&self, next: &[char]) -> usize {
        first_difference(&self.drawn, next)
    }

    pub fn commit(&mut self, next: Vec<char>) {
        self.layout = Layout::compute(&next, self.offset, self.columns);
        self.drawn = next;
    }

    pub fn reset(&mut self) {
        self.drawn.clear();
        self.layout = Layout::default();
    }
}

pub fn first_difference(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
