// crates/ttyprompt/src/editor.rs
//
// The blocking read loop behind every prompt: raw bytes in, an edited line
// out. All output for one keystroke is collected in `out` and written with a
// single call.

use crate::autocomplete::{self, Completion, CompletionState, Search, SuggestRequest, TableLayout};
use crate::cursor::{CursorTracker, Position};
use crate::escape::{self, Direction, EraseMethod, Input, Sequence};
use crate::history::HistoryNavigator;
use crate::line::LineBuffer;
use crate::render::RenderContext;
use crate::table::{clip_to_width, TableRenderer};
use anyhow::{bail, Context, Result};
use ttyprompt_common::config::{Behavior, Settings};
use ttyprompt_common::history::HistoryProvider;
use ttyprompt_common::keys;
use ttyprompt_pty::terminal::Terminal;

/// Longest recognised key sequence.
pub const READ_CHUNK: usize = 3;
/// Longest partial escape sequence carried between reads.
const MAX_PENDING: usize = 16;

pub const SIGINT_EXIT_CODE: i32 = 130;
pub const EOT_EXIT_CODE: i32 = 0;

/// How a prompt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Line(String),
    /// Ctrl-C with `sigint` off.
    Interrupted,
    /// The process should exit with this status.
    Exit(i32),
}

/// Collaborators for one session.
pub struct SessionContext<'a> {
    pub settings: &'a Settings,
    pub search: Option<&'a dyn Search>,
    pub history: Option<&'a mut dyn HistoryProvider>,
    pub table: &'a dyn TableRenderer,
}

/// Run one prompt on `term`. The terminal is opened here and always closed,
/// with its previous raw mode restored, before this returns.
pub fn run<T: Terminal>(term: &mut T, question: &str, ctx: SessionContext<'_>) -> Result<Answer> {
    term.open()?;
    let was_raw = match term.set_raw_mode(true) {
        Ok(was_raw) => was_raw,
        Err(e) => {
            let _ = term.close();
            return Err(e);
        }
    };
    tracing::debug!("prompt session start (masked: {})", ctx.settings.masked());

    let result = Session::start(term, question, ctx).and_then(|mut session| session.read_loop());

    let restored = term.set_raw_mode(was_raw);
    let closed = term.close();
    let answer = result?;
    restored?;
    closed?;
    tracing::debug!("prompt session end: {}", describe(&answer));
    Ok(answer)
}

fn describe(answer: &Answer) -> &'static str {
    match answer {
        Answer::Line(_) => "line",
        Answer::Interrupted => "interrupted",
        Answer::Exit(_) => "exit",
    }
}

struct Session<'t, 'a, T: Terminal> {
    term: &'t mut T,
    settings: &'a Settings,
    search: Option<&'a dyn Search>,
    history: Option<HistoryNavigator<'a>>,
    table: &'a dyn TableRenderer,

    prompt: Vec<char>,
    /// Drawn characters per masked character.
    echo_len: Option<usize>,
    line: LineBuffer,
    cursor: CursorTracker,
    render: RenderContext,
    completion: CompletionState,
    /// First row and row count of the drawn suggestion table.
    table_top: u16,
    table_rows: u16,
    /// Bytes of an escape sequence or character cut off by the last read.
    pending: Vec<u8>,
    out: String,
}

impl<'t, 'a, T: Terminal> Session<'t, 'a, T> {
    fn start(term: &'t mut T, question: &str, ctx: SessionContext<'a>) -> Result<Self> {
        let masked = ctx.settings.masked();
        // Only the last line of a multi-line question is part of the
        // editable area.
        let (lead, prompt) = match question.rfind('\n') {
            Some(i) => (&question[..=i], &question[i + 1..]),
            None => ("", question),
        };
        if !lead.is_empty() {
            term.write(lead.as_bytes())?;
        }

        let size = term.size();
        let (row, col) = term
            .cursor_position()
            .context("query cursor position")?;
        let cursor = CursorTracker::new(Position::new(row, col), size);
        tracing::debug!(
            "terminal {}x{}, prompt at row {} col {}",
            size.0,
            size.1,
            row,
            col
        );

        let history = if masked {
            None
        } else {
            ctx.history.map(HistoryNavigator::new)
        };
        let mut session = Self {
            term,
            settings: ctx.settings,
            search: ctx.search,
            history,
            table: ctx.table,
            prompt: prompt.chars().collect(),
            echo_len: ctx.settings.echo.as_deref().map(|e| e.chars().count()),
            line: LineBuffer::new(),
            render: RenderContext::new(cursor.columns(), cursor.prompt_start().col),
            cursor,
            completion: CompletionState::default(),
            table_top: 0,
            table_rows: 0,
            pending: Vec::new(),
            out: String::new(),
        };
        session.redraw();
        session.flush()?;
        Ok(session)
    }

    fn read_loop(&mut self) -> Result<Answer> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = self.term.read_bytes(&mut buf)?;
            if n == 0 {
                bail!("terminal closed while reading input");
            }
            let step = self.handle_input(&buf[..n]);
            self.flush()?;
            if let Some(answer) = step {
                return Ok(answer);
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        let out = std::mem::take(&mut self.out);
        self.term.write(out.as_bytes())
    }

    fn masked(&self) -> bool {
        self.echo_len.is_some()
    }

    fn autocomplete_enabled(&self) -> bool {
        self.search.is_some() && !self.masked()
    }

    // -----------------------------------------------------------------------
    // Input classification
    // -----------------------------------------------------------------------

    fn handle_input(&mut self, bytes: &[u8]) -> Option<Answer> {
        let mut chunk = std::mem::take(&mut self.pending);
        chunk.extend_from_slice(bytes);

        let complete = escape::incomplete_tail(&chunk);
        if complete < chunk.len() && chunk.len() - complete <= MAX_PENDING {
            self.pending = chunk.split_off(complete);
        }
        for part in escape::split_input(&chunk) {
            let answer = match part {
                Input::Control(byte) => self.handle_byte(byte),
                Input::Escape(seq) => {
                    self.handle_escape(seq);
                    None
                }
                Input::Text([byte]) => self.handle_byte(*byte),
                Input::Text(text) => {
                    let text = String::from_utf8_lossy(text);
                    if !self.masked() {
                        tracing::trace!("insert {:?}", text);
                    }
                    self.type_text(&text);
                    None
                }
            };
            if answer.is_some() {
                // Whatever followed the terminating key is not read.
                self.pending.clear();
                return answer;
            }
        }
        None
    }

    fn handle_escape(&mut self, seq: &[u8]) {
        match escape::arrow_key(seq) {
            Some(_) if self.masked() => tracing::trace!("arrow ignored while masked"),
            Some(direction) => {
                tracing::trace!("arrow {:?}", direction);
                self.handle_arrow(direction);
            }
            None => tracing::trace!("escape sequence ignored ({} bytes)", seq.len()),
        }
    }

    fn handle_byte(&mut self, byte: u8) -> Option<Answer> {
        if self.masked() {
            tracing::trace!("key (masked)");
        } else {
            tracing::trace!("key {:#04x}", byte);
        }
        let trigger = self.settings.autocomplete.trigger_key;
        match byte {
            keys::SIGINT => Some(self.interrupt()),
            keys::EOT if self.settings.eot && self.line.is_empty() => Some(self.end_of_transmission()),
            keys::ENTER | keys::LINE_FEED => Some(self.accept()),
            b if keys::is_backspace(b) => {
                self.backspace();
                None
            }
            b if b == trigger && self.autocomplete_enabled() => {
                self.complete(false);
                None
            }
            b if !(keys::SPACE..keys::BACKSPACE).contains(&b) => None,
            b => {
                self.type_text(&char::from(b).to_string());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Terminating keys
    // -----------------------------------------------------------------------

    fn accept(&mut self) -> Answer {
        self.clear_table();
        self.move_to_end();
        self.out.push('\n');
        let text = self.line.text();
        if let Some(history) = &mut self.history {
            history.accept(&text);
        }
        Answer::Line(text)
    }

    fn interrupt(&mut self) -> Answer {
        self.clear_table();
        self.move_to_end();
        self.out.push_str("^C\n");
        if let Some(history) = &mut self.history {
            history.abandon();
        }
        if self.settings.sigint {
            Answer::Exit(SIGINT_EXIT_CODE)
        } else {
            Answer::Interrupted
        }
    }

    fn end_of_transmission(&mut self) -> Answer {
        self.clear_table();
        self.out.push_str("exit\n");
        if let Some(history) = &mut self.history {
            history.abandon();
        }
        Answer::Exit(EOT_EXIT_CODE)
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    fn sticky_suggest(&self) -> bool {
        self.autocomplete_enabled() && self.settings.autocomplete.sticky_suggest()
    }

    fn type_text(&mut self, text: &str) {
        self.completion.reset();
        if self.sticky_suggest() {
            self.line.insert_str(text);
            self.complete(false);
        } else {
            self.clear_table();
            self.line.insert_str(text);
            self.redraw();
        }
    }

    fn backspace(&mut self) {
        if self.line.insert_position() == 0 {
            return;
        }
        self.completion.reset();
        if self.sticky_suggest() {
            self.line.backspace();
            self.complete(true);
        } else {
            self.clear_table();
            self.line.backspace();
            self.redraw();
        }
    }

    fn handle_arrow(&mut self, direction: Direction) {
        self.completion.reset();
        self.clear_table();
        match direction {
            Direction::Up | Direction::Down if self.history.is_some() => self.scroll_history(direction),
            Direction::Up | Direction::Down => self.move_vertical(direction),
            Direction::Left => {
                if self.line.move_left().is_some() {
                    self.step_cursor(direction);
                }
            }
            Direction::Right => {
                if self.line.move_right().is_some() {
                    self.step_cursor(direction);
                }
            }
        }
    }

    fn scroll_history(&mut self, direction: Direction) {
        let Some(history) = &mut self.history else {
            return;
        };
        let changed = match direction {
            Direction::Up => history.scroll_up(&mut self.line),
            _ => history.scroll_down(&mut self.line),
        };
        if changed {
            self.redraw();
        }
    }

    fn move_vertical(&mut self, direction: Direction) {
        let Some(seq) = self.cursor.move_by(direction, 1) else {
            return;
        };
        self.write_cursor_move(seq);
        let insert = self.cursor.insert_position(self.render.spans(self.prompt.len()));
        self.line.set_insert_position(insert);
        // Snap onto a character boundary.
        self.place_cursor();
    }

    /// Walk the cursor cell by cell onto the insert position.
    fn step_cursor(&mut self, direction: Direction) {
        let cells = self.cursor.current_cell().abs_diff(self.insert_cell());
        if let Some(seq) = self.cursor.move_by(direction, cells) {
            self.write_cursor_move(seq);
        }
    }

    /// Drawn index of the character at the insert position.
    fn drawn_index(&self, insert: usize) -> usize {
        self.prompt.len() + insert * self.echo_len.unwrap_or(1)
    }

    /// Cell the cursor belongs on for the current insert position.
    fn insert_cell(&self) -> usize {
        if self.line.at_end() {
            self.render.end_cells()
        } else {
            self.render.start_cell(self.drawn_index(self.line.insert_position()))
        }
    }

    // -----------------------------------------------------------------------
    // Autocomplete
    // -----------------------------------------------------------------------

    fn complete(&mut self, backspace: bool) {
        let Some(search) = self.search else {
            return;
        };
        let ac = self.settings.autocomplete;
        let buffer = self.line.text();
        let available_rows = self.available_rows();
        let completion = match ac.behavior {
            Behavior::Cycle => autocomplete::cycle(&mut self.completion, &buffer, search),
            Behavior::Suggest => autocomplete::suggest(
                &buffer,
                search,
                SuggestRequest {
                    fill: ac.fill,
                    sticky: ac.sticky,
                    backspace,
                    columns: ac.suggest_col_count,
                    available_rows,
                },
            ),
            Behavior::Hybrid => autocomplete::hybrid(
                &mut self.completion,
                &buffer,
                search,
                ac.suggest_col_count,
                available_rows,
            ),
        };
        self.apply_completion(completion);
    }

    fn apply_completion(&mut self, completion: Completion) {
        self.clear_table();
        if let Some(fill) = &completion.fill {
            self.line.set(fill);
        }
        self.redraw();
        if completion.signal {
            self.out.push('\t');
            // The tab moved the terminal cursor; put it back.
            self.cursor.detach();
            self.place_cursor();
        }
        if let Some(table) = &completion.table {
            self.draw_table(table);
            self.place_cursor();
        }
    }

    fn available_rows(&self) -> usize {
        self.cursor.rows().saturating_sub(self.cursor.input_end().row) as usize
    }

    fn draw_table(&mut self, layout: &TableLayout) {
        let columns = self.cursor.columns() as usize;
        let text = self.table.render(&layout.cells);
        let lines: Vec<String> = text.lines().map(|l| clip_to_width(l, columns)).collect();
        if lines.is_empty() {
            return;
        }
        self.move_to_end();
        for line in &lines {
            self.out.push('\n');
            self.out.push_str(line);
        }
        let rows = lines.len().min(u16::MAX as usize) as u16;
        let bottom = self.cursor.input_end().row as usize + rows as usize;
        let scrolled = bottom.saturating_sub(self.cursor.rows() as usize) as u16;
        if scrolled > 0 {
            self.cursor.shift_up(scrolled);
        }
        self.table_top = self.cursor.input_end().row + 1;
        self.table_rows = rows;
        self.cursor.detach();
        tracing::debug!("suggestion table: {} rows, {} omitted", rows, layout.omitted);
    }

    fn clear_table(&mut self) {
        if self.table_rows == 0 {
            return;
        }
        for row in self.table_top..self.table_top + self.table_rows {
            self.out.push_str(&escape::move_to(row, 1).escaped());
            self.out.push_str(&escape::erase_line(EraseMethod::EntireLine).escaped());
        }
        self.table_rows = 0;
        self.cursor.detach();
        self.place_cursor();
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    /// Bring the screen in line with the prompt and buffer, rewriting only
    /// from the first character that changed.
    fn redraw(&mut self) {
        let mut next = self.prompt.clone();
        match self.settings.echo.as_deref() {
            Some(mask) => next.extend(self.line.display(Some(mask)).chars()),
            None => next.extend_from_slice(self.line.chars()),
        }

        let drawn = self.render.drawn().len();
        let mut start = self.render.diff_start(&next);
        if start == next.len() && start == drawn && !self.render.is_empty() {
            self.place_cursor();
            return;
        }
        // The cell after a full row may not exist yet; restart from the
        // character before it so the terminal wraps on its own.
        if start > 0 && self.cursor.is_wrap_boundary(self.render.end_of(start)) {
            start -= 1;
        }
        if self.cursor.is_pending() {
            // Writing in the pending-wrap state would wrap first.
            self.cursor.detach();
        }
        let from = self.cursor.position_of_cell(self.render.end_of(start), false);
        if let Some(seq) = self.cursor.move_to(from) {
            self.out.push_str(&seq.escaped());
        }
        if start < drawn {
            self.out.push_str(&escape::erase_down().escaped());
            self.table_rows = 0;
        }
        self.out.extend(&next[start..]);
        self.render.commit(next);

        let scrolled = self.cursor.recompute_input_end(
            self.render.start_cell(self.prompt.len()),
            self.render.end_cells(),
        );
        if scrolled > 0 {
            tracing::trace!("input scrolled the screen by {} rows", scrolled);
        }
        self.cursor.assume_end();
        self.place_cursor();
    }

    /// Move the terminal cursor to the insert position.
    fn place_cursor(&mut self) {
        if self.line.at_end() {
            self.move_to_end();
            return;
        }
        let target = self.cursor.position_of_cell(self.insert_cell(), false);
        if let Some(seq) = self.cursor.move_to(target) {
            self.out.push_str(&seq.escaped());
        }
    }

    fn move_to_end(&mut self) {
        if !self.cursor.end_is_pending() {
            if let Some(seq) = self.cursor.move_to(self.cursor.input_end()) {
                self.out.push_str(&seq.escaped());
            }
        } else if !self.cursor.is_pending() || self.cursor.is_detached() {
            self.rewrite_last_char();
        }
    }

    /// Write a move the tracker already applied. The pending-wrap state can
    /// only be reached by output.
    fn write_cursor_move(&mut self, seq: Sequence) {
        if self.cursor.is_pending() {
            self.rewrite_last_char();
        } else {
            self.out.push_str(&seq.escaped());
        }
    }

    /// Reach the pending-wrap position at the end of a full row by writing
    /// the last character again.
    fn rewrite_last_char(&mut self) {
        let Some((c, first_cell)) = self.render.last_char() else {
            return;
        };
        let pos = self.cursor.position_of_cell(first_cell, false);
        self.out.push_str(&escape::move_to(pos.row, pos.col).escaped());
        self.out.push(c);
        self.cursor.assume_end();
    }
}
