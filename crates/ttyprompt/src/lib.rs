pub mod autocomplete;
pub mod cursor;
pub mod editor;
pub mod escape;
pub mod history;
pub mod line;
pub mod prompt;
pub mod render;
pub mod table;
pub mod testsupport;

pub use autocomplete::{PrefixSearch, Search};
pub use editor::Answer;
pub use prompt::{CallArgs, Prompt, PromptOptions};
pub use ttyprompt_common::config::{AutocompleteConfig, Behavior, PromptConfig};
pub use ttyprompt_common::history::HistoryProvider;
