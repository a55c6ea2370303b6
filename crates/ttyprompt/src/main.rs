// crates/ttyprompt/src/main.rs
//
// A short setup wizard showing the prompt API.

use anyhow::{bail, Context, Result};
use ttyprompt::{AutocompleteConfig, Behavior, PrefixSearch, Prompt, PromptConfig, PromptOptions};
use ttyprompt_common::config::{load_prompt_config, ttyprompt_dir};
use ttyprompt_store::history::{default_history_path, FileHistory, DEFAULT_MAX_ENTRIES};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FRUITS: &[&str] = &[
    "apple",
    "apricot",
    "avocado",
    "banana",
    "blackberry",
    "blueberry",
    "cherry",
    "cranberry",
    "grape",
    "grapefruit",
    "kiwi",
    "lemon",
    "lime",
    "mango",
    "melon",
    "orange",
    "papaya",
    "peach",
    "pear",
    "pineapple",
    "plum",
    "raspberry",
    "strawberry",
];

/// Logs go to a file: stdout belongs to the prompt.
fn init_logging() -> Result<()> {
    let dir = ttyprompt_dir().join("logs");
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(&dir, "ttyprompt.log");
    let filter = EnvFilter::try_from_env("TTYPROMPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(appender).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

fn parse_behavior(arg: Option<&str>) -> Result<Option<Behavior>> {
    match arg {
        None => Ok(None),
        Some("cycle") => Ok(Some(Behavior::Cycle)),
        Some("suggest") => Ok(Some(Behavior::Suggest)),
        Some("hybrid") => Ok(Some(Behavior::Hybrid)),
        Some(other) => bail!("unknown behavior {:?} (expected cycle, suggest or hybrid)", other),
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--version") {
        println!("ttyprompt-demo {}", env!("TTYPROMPT_VERSION"));
        return Ok(());
    }
    let behavior = parse_behavior(arg.as_deref())?;

    let config = load_prompt_config()?;
    let history = FileHistory::open(default_history_path(), DEFAULT_MAX_ENTRIES)?;
    let prompt = Prompt::new(PromptOptions::new().config(config).history_provider(history))?;

    let Some(name) = prompt.ask_with("What is your name? ", "stranger")? else {
        return Ok(());
    };
    let Some(password) = prompt.hide("Choose a password: ")? else {
        return Ok(());
    };

    let fruit_options = PromptOptions::new()
        .search(PrefixSearch::new(FRUITS.iter().copied()))
        .config(PromptConfig {
            autocomplete: AutocompleteConfig {
                behavior,
                fill: Some(true),
                ..Default::default()
            },
            ..Default::default()
        });
    let Some(fruit) = prompt.ask_with("Favourite fruit (TAB completes): ", fruit_options)? else {
        return Ok(());
    };

    if let Some(history) = prompt.history() {
        history.borrow_mut().save()?;
    }

    println!(
        "Hello {}. You like {}, and your password is {} characters long.",
        name,
        if fruit.is_empty() { "nothing" } else { &fruit },
        password.chars().count()
    );
    Ok(())
}
