use anyhow::Result;

/// Externally owned, stateful line history.
///
/// The provider keeps its own cursor into the entries. `reset()` parks it
/// one past the newest entry (the fresh, unsaved line), `prev()` walks
/// towards older entries and `next()` back towards the fresh line.
pub trait HistoryProvider {
    /// Cursor is on the oldest entry (or there are no entries).
    fn at_start(&self) -> bool;
    /// Cursor is on the newest entry: one `next()` returns to the fresh line.
    fn at_penultimate(&self) -> bool;
    /// Cursor cannot move any further towards the fresh line.
    fn past_end(&self) -> bool;
    /// Cursor is parked on the fresh line; navigation has not started.
    fn at_end(&self) -> bool;
    fn prev(&mut self) -> Option<String>;
    fn next(&mut self) -> Option<String>;
    fn reset(&mut self);
    fn push(&mut self, line: &str);
    fn save(&mut self) -> Result<()>;
}
