// crates/ttyprompt/src/cursor.rs
//
// Tracks where the terminal cursor is, relative to the prompt and the input
// drawn after it, so that every movement can be written as one absolute
// positioning sequence.

use crate::escape::{self, Direction, Sequence};

/// 1-based screen coordinates. Ordered by row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone)]
pub struct CursorTracker {
    columns: u16,
    rows: u16,
    /// Where the question starts; everything else is computed from here.
    prompt_start: Position,
    /// First cell of the typed input, or `input_end` when nothing is typed.
    input_start: Position,
    current: Position,
    /// Where the cursor sits after the last rendered character.
    input_end: Position,
    /// Cells from `prompt_start` to `input_end`.
    end_cells: usize,
    /// Set when the terminal cursor was moved by output the tracker did not
    /// follow; the next `move_to` always writes.
    detached: bool,
    /// The cursor is past the last cell of a full row, waiting to wrap.
    /// Shares its coordinates with that last cell.
    pending: bool,
}

impl CursorTracker {
    /// `size` is `(columns, rows)`, as reported by the terminal.
    pub fn new(prompt_start: Position, size: (u16, u16)) -> Self {
        let columns = size.0.max(1);
        let rows = size.1.max(1);
        let start = Position::new(prompt_start.row.max(1), prompt_start.col.clamp(1, columns));
        Self {
            columns,
            rows,
            prompt_start: start,
            input_start: start,
            current: start,
            input_end: start,
            end_cells: 0,
            detached: false,
            pending: false,
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn prompt_start(&self) -> Position {
        self.prompt_start
    }

    pub fn input_start(&self) -> Position {
        self.input_start
    }

    pub fn current(&self) -> Position {
        self.current
    }

    pub fn input_end(&self) -> Position {
        self.input_end
    }

    fn offset(&self) -> usize {
        self.prompt_start.col as usize - 1
    }

    /// Whether `cells` cells after the prompt start finish exactly at the
    /// right margin.
    pub fn is_wrap_boundary(&self, cells: usize) -> bool {
        let abs = self.offset() + cells;
        abs > 0 && abs % self.columns as usize == 0
    }

    /// Screen position of the cell `cells` cells after the prompt start.
    ///
    /// With `at_end`, a cell count that lands exactly on the right margin
    /// resolves to the last column of the filled row (the terminal's pending
    /// wrap state) rather than column 1 of the next row.
    pub fn position_of_cell(&self, cells: usize, at_end: bool) -> Position {
        let cols = self.columns as usize;
        let abs = self.offset() + cells;
        let row = self.prompt_start.row as usize;
        if at_end && self.is_wrap_boundary(cells) {
            Position::new(clamp_row(row + abs / cols - 1), self.columns)
        } else {
            Position::new(clamp_row(row + abs / cols), (abs % cols + 1) as u16)
        }
    }

    /// Cells from the prompt start to `pos`.
    pub fn cell_of_position(&self, pos: Position) -> usize {
        let cols = self.columns as usize;
        let rows_down = pos.row.saturating_sub(self.prompt_start.row) as usize;
        (rows_down * cols + pos.col as usize).saturating_sub(1 + self.offset())
    }

    /// The cursor sits at the end of input and the terminal has not wrapped yet.
    pub fn end_is_pending(&self) -> bool {
        self.is_wrap_boundary(self.end_cells)
    }

    /// The terminal cursor is in the pending-wrap state at the end of input.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Cells from the prompt start to the cursor.
    pub fn current_cell(&self) -> usize {
        if self.pending {
            self.end_cells
        } else {
            self.cell_of_position(self.current)
        }
    }

    /// The cursor is after the last input cell.
    pub fn at_end(&self) -> bool {
        self.current >= self.input_end && (self.pending || !self.end_is_pending())
    }

    /// Recompute the end of input after a redraw, given the first cell of
    /// the typed input and the cell after the last drawn character. Returns
    /// how many rows the screen scrolled to make room; tracked positions are
    /// already shifted.
    pub fn recompute_input_end(&mut self, input_start_cells: usize, end_cells: usize) -> u16 {
        self.end_cells = end_cells;
        let unclamped_end_row = {
            let cols = self.columns as usize;
            let abs = self.offset() + self.end_cells;
            let mut row = self.prompt_start.row as usize + abs / cols;
            if self.is_wrap_boundary(self.end_cells) {
                row -= 1;
            }
            row
        };
        let overflow = unclamped_end_row.saturating_sub(self.rows as usize);
        if overflow > 0 {
            self.shift_up(overflow.min(u16::MAX as usize) as u16);
        }
        self.input_end = self.position_of_cell(self.end_cells, true);
        self.input_start = if input_start_cells >= end_cells {
            self.input_end
        } else {
            self.position_of_cell(input_start_cells, false)
        };
        if self.current > self.input_end {
            self.current = self.input_end;
        }
        overflow as u16
    }

    /// Move every tracked row up after the screen scrolled.
    pub fn shift_up(&mut self, count: u16) {
        for pos in [
            &mut self.prompt_start,
            &mut self.input_start,
            &mut self.current,
            &mut self.input_end,
        ] {
            pos.row = pos.row.saturating_sub(count).max(1);
        }
    }

    /// One cell in `direction`, bounded by the input. Returns whether the
    /// cursor moved.
    pub fn move_once(&mut self, direction: Direction) -> bool {
        let before = self.current;
        let cols = self.columns;
        let (start, end) = (self.input_start, self.input_end);
        if self.pending {
            match direction {
                // Back onto the last cell without changing coordinates.
                Direction::Left => {
                    self.pending = false;
                    return true;
                }
                Direction::Right | Direction::Down => return false,
                Direction::Up if before.row <= start.row => return false,
                Direction::Up => self.pending = false,
            }
        }
        let onto_pending_end = self.current == end && self.end_is_pending();
        let cur = &mut self.current;
        match direction {
            Direction::Left => {
                if *cur <= start {
                    return false;
                }
                if cur.col == 1 {
                    cur.row -= 1;
                    cur.col = cols;
                } else {
                    cur.col -= 1;
                }
            }
            Direction::Right => {
                if onto_pending_end {
                    self.pending = true;
                    return true;
                }
                if *cur >= end {
                    return false;
                }
                if cur.col >= cols {
                    cur.row += 1;
                    cur.col = 1;
                } else {
                    cur.col += 1;
                }
            }
            Direction::Up => {
                if cur.row <= start.row {
                    return false;
                }
                cur.row -= 1;
                if cur.row == start.row && cur.col < start.col {
                    cur.col = start.col;
                }
            }
            Direction::Down => {
                if cur.row >= end.row {
                    return false;
                }
                cur.row += 1;
                if cur.row == end.row && cur.col > end.col {
                    cur.col = end.col;
                }
            }
        }
        // Never step past the end of input.
        if *cur > end {
            *cur = end;
        }
        *cur != before
    }

    /// Up to `count` single steps. Returns one sequence for the net movement,
    /// or `None` if the cursor could not move at all.
    pub fn move_by(&mut self, direction: Direction, count: usize) -> Option<Sequence> {
        let mut moved = false;
        for _ in 0..count {
            if !self.move_once(direction) {
                break;
            }
            moved = true;
        }
        if !moved && !self.detached {
            return None;
        }
        self.detached = false;
        Some(self.sync_sequence())
    }

    /// Move to `pos`, clamped to the rendered prompt and input. `None` when
    /// already there.
    pub fn move_to(&mut self, pos: Position) -> Option<Sequence> {
        let target = pos.clamp(self.prompt_start, self.input_end);
        if target == self.current && !self.detached && !self.pending {
            return None;
        }
        self.current = target;
        self.detached = false;
        self.pending = false;
        Some(self.sync_sequence())
    }

    /// Record a position the cursor reached by writing text.
    pub fn assume(&mut self, pos: Position) {
        self.current = pos;
        self.detached = false;
        self.pending = false;
    }

    /// Record that the cursor is right after the last rendered character.
    pub fn assume_end(&mut self) {
        self.current = self.input_end;
        self.detached = false;
        self.pending = self.end_is_pending();
    }

    /// Forget where the terminal cursor is.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Absolute sequence for the tracked position.
    pub fn sync_sequence(&self) -> Sequence {
        escape::move_to(self.current.row, self.current.col)
    }

    /// Index of the character the cursor is on, given the first cell and
    /// width of each input character. A cursor inside a wide character, or
    /// on the cell skipped before one, maps to that character.
    pub fn insert_position(&self, spans: impl IntoIterator<Item = (usize, usize)>) -> usize {
        let at_end = self.at_end();
        let cell = self.cell_of_position(self.current);
        let mut count = 0;
        for (start, width) in spans {
            if !at_end && start + width > cell {
                return count;
            }
            count += 1;
        }
        count
    }
}

fn clamp_row(row: usize) -> u16 {
    row.clamp(1, u16::MAX as usize) as u16
}
