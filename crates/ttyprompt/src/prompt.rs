// crates/ttyprompt/src/prompt.rs
//
// The public entry point: a configured prompt that blocks until the user
// answers.

use crate::autocomplete::Search;
use crate::editor::{self, Answer, SessionContext};
use crate::table::{ColumnTable, TableRenderer};
use anyhow::Result;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use ttyprompt_common::config::PromptConfig;
use ttyprompt_common::history::HistoryProvider;
use ttyprompt_pty::terminal::{Terminal, TtyTerminal};

pub type SharedHistory = Rc<RefCell<dyn HistoryProvider>>;

/// Configuration plus the runtime hooks that cannot live in a config file.
#[derive(Clone, Default)]
pub struct PromptOptions {
    pub config: PromptConfig,
    pub search: Option<Rc<dyn Search>>,
    pub history: Option<SharedHistory>,
    pub table: Option<Rc<dyn TableRenderer>>,
}

impl PromptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn search(mut self, search: impl Search + 'static) -> Self {
        self.search = Some(Rc::new(search));
        self
    }

    pub fn history(mut self, history: SharedHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Take ownership of `provider` and share it with the prompt.
    pub fn history_provider(self, provider: impl HistoryProvider + 'static) -> Self {
        self.history(Rc::new(RefCell::new(provider)))
    }

    pub fn table(mut self, table: impl TableRenderer + 'static) -> Self {
        self.table = Some(Rc::new(table));
        self
    }

    /// Keep everything set here; take the rest from `fallback`.
    pub fn fill_from(self, fallback: &PromptOptions) -> PromptOptions {
        PromptOptions {
            config: self.config.fill_from(&fallback.config),
            search: self.search.or_else(|| fallback.search.clone()),
            history: self.history.or_else(|| fallback.history.clone()),
            table: self.table.or_else(|| fallback.table.clone()),
        }
    }
}

impl std::fmt::Debug for PromptOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOptions")
            .field("config", &self.config)
            .field("search", &self.search.is_some())
            .field("history", &self.history.is_some())
            .field("table", &self.table.is_some())
            .finish()
    }
}

impl From<PromptConfig> for PromptOptions {
    fn from(config: PromptConfig) -> Self {
        Self::new().config(config)
    }
}

/// Per-call arguments: an optional default and optional overrides.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub default: Option<String>,
    pub overrides: PromptOptions,
}

impl From<&str> for CallArgs {
    fn from(default: &str) -> Self {
        Self {
            default: Some(default.to_string()),
            ..Self::default()
        }
    }
}

impl From<String> for CallArgs {
    fn from(default: String) -> Self {
        Self {
            default: Some(default),
            ..Self::default()
        }
    }
}

impl From<PromptOptions> for CallArgs {
    fn from(overrides: PromptOptions) -> Self {
        Self {
            default: None,
            overrides,
        }
    }
}

impl From<PromptConfig> for CallArgs {
    fn from(config: PromptConfig) -> Self {
        PromptOptions::from(config).into()
    }
}

impl From<(&str, PromptOptions)> for CallArgs {
    fn from((default, overrides): (&str, PromptOptions)) -> Self {
        Self {
            default: Some(default.to_string()),
            overrides,
        }
    }
}

impl From<(&str, PromptConfig)> for CallArgs {
    fn from((default, config): (&str, PromptConfig)) -> Self {
        (default, PromptOptions::from(config)).into()
    }
}

impl From<()> for CallArgs {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// A reusable prompt. Each call opens the terminal, edits one line and
/// closes it again.
pub struct Prompt<T: Terminal = TtyTerminal> {
    terminal: RefCell<T>,
    options: PromptOptions,
}

impl Prompt<TtyTerminal> {
    /// A prompt on the controlling terminal. The configuration is validated
    /// here so mistakes surface before anything is drawn.
    pub fn new(options: impl Into<PromptOptions>) -> Result<Self> {
        Self::with_terminal(TtyTerminal::new(), options)
    }
}

impl<T: Terminal> Prompt<T> {
    pub fn with_terminal(terminal: T, options: impl Into<PromptOptions>) -> Result<Self> {
        let options = options.into();
        options.config.resolve()?;
        tracing::debug!("prompt created: {:?}", options);
        Ok(Self {
            terminal: RefCell::new(terminal),
            options,
        })
    }

    /// Ask `question`. `None` when interrupted with Ctrl-C; exits the process
    /// when configured to on Ctrl-C or Ctrl-D.
    pub fn ask(&self, question: &str) -> Result<Option<String>> {
        self.ask_with(question, ())
    }

    pub fn ask_with(&self, question: &str, args: impl Into<CallArgs>) -> Result<Option<String>> {
        match self.read(question, args)? {
            Answer::Line(line) => Ok(Some(line)),
            Answer::Interrupted => Ok(None),
            Answer::Exit(code) => {
                tracing::debug!("exiting with status {}", code);
                std::process::exit(code)
            }
        }
    }

    /// Ask with input fully hidden.
    pub fn hide(&self, question: &str) -> Result<Option<String>> {
        self.ask_with(question, PromptConfig::hidden())
    }

    /// The history shared by every call, for saving it.
    pub fn history(&self) -> Option<SharedHistory> {
        self.options.history.clone()
    }

    /// Like `ask_with`, but hands back how the prompt ended instead of
    /// exiting. An empty line already has the default applied.
    pub fn read(&self, question: &str, args: impl Into<CallArgs>) -> Result<Answer> {
        let CallArgs { default, overrides } = args.into();
        let options = overrides.fill_from(&self.options);
        let settings = options.config.resolve()?;

        let table: Rc<dyn TableRenderer> = options.table.clone().unwrap_or_else(|| Rc::new(ColumnTable));
        let mut history = match (&options.history, settings.masked()) {
            (Some(history), false) => Some(history.borrow_mut()),
            _ => None,
        };
        let ctx = SessionContext {
            settings: &settings,
            search: options.search.as_deref(),
            history: history.as_mut().map(provider),
            table: table.as_ref(),
        };

        let mut terminal = self.terminal.borrow_mut();
        let answer = editor::run(&mut *terminal, question, ctx)?;
        Ok(match answer {
            Answer::Line(line) if line.is_empty() => {
                Answer::Line(default.unwrap_or(settings.default_response))
            }
            other => other,
        })
    }

    pub fn terminal(&self) -> std::cell::Ref<'_, T> {
        self.terminal.borrow()
    }

    pub fn terminal_mut(&self) -> RefMut<'_, T> {
        self.terminal.borrow_mut()
    }

    pub fn into_terminal(self) -> T {
        self.terminal.into_inner()
    }
}

fn provider<'r>(
    guard: &'r mut RefMut<'_, dyn HistoryProvider + 'static>,
) -> &'r mut dyn HistoryProvider {
    &mut **guard
}
