// crates/ttyprompt/src/autocomplete.rs
//
// Completion behaviors. Each function decides what the line and the
// suggestion table should become; the editor does all terminal output.

/// Source of completion candidates for the current input.
pub trait Search {
    fn search(&self, query: &str) -> Vec<String>;
}

impl<F> Search for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn search(&self, query: &str) -> Vec<String> {
        self(query)
    }
}

/// A fixed candidate list, filtered by prefix.
#[derive(Debug, Clone, Default)]
pub struct PrefixSearch {
    candidates: Vec<String>,
}

impl PrefixSearch {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl Search for PrefixSearch {
    fn search(&self, query: &str) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|c| c.starts_with(query))
            .cloned()
            .collect()
    }
}

/// Longest prefix shared by every item. `None` for an empty list or when the
/// items share nothing.
pub fn common_starting_substring(items: &[String]) -> Option<String> {
    match items {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            // The lexicographic extremes bound the prefix of the whole set.
            let mut sorted: Vec<&String> = items.iter().collect();
            sorted.sort();
            let (first, last) = (sorted[0], sorted[sorted.len() - 1]);
            let prefix: String = first
                .chars()
                .zip(last.chars())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect();
            if prefix.is_empty() {
                None
            } else {
                Some(prefix)
            }
        }
    }
}

/// Suggestions arranged in rows of equal length, cut to fit the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub cells: Vec<Vec<String>>,
    /// Results shown as real entries, in order.
    pub shown: usize,
    /// Results replaced by the "more" indicator.
    pub omitted: usize,
}

impl TableLayout {
    pub fn rows(&self) -> usize {
        self.cells.len()
    }
}

pub fn more_indicator(omitted: usize) -> String {
    format!("{} more…", omitted)
}

/// Lay `results` out in `columns` columns. When they need more rows than
/// `available_rows`, keep one row less than fits and put a "N more…" cell in
/// the last slot.
pub fn layout_table(results: &[String], columns: usize, available_rows: usize) -> TableLayout {
    let columns = columns.max(1);
    let needed_rows = results.len().div_ceil(columns);

    let (mut flat, shown, omitted) = if needed_rows > available_rows {
        let max_rows = available_rows.saturating_sub(1).max(1);
        let shown = (max_rows * columns - 1).min(results.len());
        let omitted = results.len() - shown;
        let mut flat: Vec<String> = results[..shown].to_vec();
        flat.push(more_indicator(omitted));
        (flat, shown, omitted)
    } else {
        (results.to_vec(), results.len(), 0)
    };

    let padded = flat.len().div_ceil(columns) * columns;
    flat.resize(padded, String::new());
    let cells = flat.chunks(columns).map(|row| row.to_vec()).collect();
    TableLayout {
        cells,
        shown,
        omitted,
    }
}

/// Autocomplete state carried across a run of trigger presses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionState {
    pub cycle_index: usize,
    pub cycle_term: Option<String>,
}

impl CompletionState {
    pub fn reset(&mut self) {
        self.cycle_index = 0;
        self.cycle_term = None;
    }

    /// The term captured on the first trigger of a run.
    fn term(&mut self, buffer: &str) -> String {
        self.cycle_term
            .get_or_insert_with(|| buffer.to_string())
            .clone()
    }

    /// Pick the next result, wrapping over the first `modulus` entries.
    fn advance(&mut self, results: &[String], modulus: usize) -> String {
        let index = self.cycle_index % modulus;
        self.cycle_index = (index + 1) % modulus;
        results[index].clone()
    }
}

/// What one trigger press should do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Replace the whole line with this text.
    pub fill: Option<String>,
    /// Draw this table below the input.
    pub table: Option<TableLayout>,
    /// Nothing matched: write a tab as a visible no-op.
    pub signal: bool,
}

/// Options that shape the suggest behavior for one call.
#[derive(Debug, Clone, Copy)]
pub struct SuggestRequest {
    pub fill: bool,
    pub sticky: bool,
    pub backspace: bool,
    pub columns: usize,
    pub available_rows: usize,
}

/// Replace the line with each result of the first trigger's search in turn.
pub fn cycle(state: &mut CompletionState, buffer: &str, search: &dyn Search) -> Completion {
    let term = state.term(buffer);
    let results = search.search(&term);
    if results.is_empty() {
        tracing::debug!("cycle: no results");
        return Completion {
            signal: true,
            ..Completion::default()
        };
    }
    let fill = state.advance(&results, results.len());
    tracing::debug!("cycle: {} results, next index {}", results.len(), state.cycle_index);
    Completion {
        fill: Some(fill),
        ..Completion::default()
    }
}

/// List the results for the live buffer.
pub fn suggest(buffer: &str, search: &dyn Search, req: SuggestRequest) -> Completion {
    let results = search.search(buffer);
    tracing::debug!("suggest: {} results", results.len());
    if results.is_empty() {
        return Completion {
            signal: !req.sticky,
            ..Completion::default()
        };
    }
    if results.len() == 1 && !req.backspace {
        return Completion {
            fill: results.into_iter().next(),
            ..Completion::default()
        };
    }
    let fill = if req.fill && !req.backspace {
        common_starting_substring(&results)
            .filter(|prefix| prefix.chars().count() > buffer.chars().count())
    } else {
        None
    };
    Completion {
        fill,
        table: Some(layout_table(&results, req.columns, req.available_rows)),
        signal: false,
    }
}

/// Cycle through the first trigger's results while showing them as a table.
pub fn hybrid(
    state: &mut CompletionState,
    buffer: &str,
    search: &dyn Search,
    columns: usize,
    available_rows: usize,
) -> Completion {
    let term = state.term(buffer);
    let results = search.search(&term);
    if results.is_empty() {
        tracing::debug!("hybrid: no results");
        return Completion {
            signal: true,
            ..Completion::default()
        };
    }
    let table = layout_table(&results, columns, available_rows);
    // The "more" cell is not a result and is never selected.
    let modulus = if table.shown == 0 {
        results.len()
    } else {
        table.shown
    };
    let fill = state.advance(&results, modulus);
    tracing::debug!(
        "hybrid: {} results, {} shown, next index {}",
        results.len(),
        table.shown,
        state.cycle_index
    );
    Completion {
        fill: Some(fill),
        table: Some(table),
        signal: false,
    }
}
