use crate::error::ConfigError;
use crate::keys;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_SUGGEST_COL_COUNT: usize = 3;
pub const DEFAULT_TRIGGER_KEY: u8 = keys::TAB;

/// Returns the ttyprompt base directory: `~/.ttyprompt`, fallback `/tmp/ttyprompt`.
pub fn ttyprompt_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".ttyprompt"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ttyprompt"))
}

/// Location of the optional global config file.
pub fn config_path() -> PathBuf {
    std::env::var("TTYPROMPT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| ttyprompt_dir().join("prompt.toml"))
}

pub fn load_prompt_config() -> Result<PromptConfig, ConfigError> {
    load_prompt_config_from(config_path())
}

pub fn load_prompt_config_from(path: PathBuf) -> Result<PromptConfig, ConfigError> {
    if !path.exists() {
        return Ok(PromptConfig::default());
    }
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    match toml::from_str::<PromptConfig>(&contents) {
        Ok(config) => {
            tracing::debug!("loaded prompt config from {}", path.display());
            Ok(config)
        }
        Err(source) => Err(ConfigError::Parse { path, source }),
    }
}

// ---------------------------------------------------------------------------
// Partial config (every field optional, merged per field)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Each trigger replaces the line with the next match.
    #[default]
    Cycle,
    /// Each trigger lists matches below the line.
    Suggest,
    /// Cycle through matches while the list is shown.
    Hybrid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutocompleteConfig {
    pub behavior: Option<Behavior>,
    pub fill: Option<bool>,
    pub sticky: Option<bool>,
    pub suggest_col_count: Option<usize>,
    pub trigger_key: Option<u8>,
}

impl AutocompleteConfig {
    pub fn fill_from(self, fallback: &AutocompleteConfig) -> AutocompleteConfig {
        AutocompleteConfig {
            behavior: self.behavior.or(fallback.behavior),
            fill: self.fill.or(fallback.fill),
            sticky: self.sticky.or(fallback.sticky),
            suggest_col_count: self.suggest_col_count.or(fallback.suggest_col_count),
            trigger_key: self.trigger_key.or(fallback.trigger_key),
        }
    }
}

/// Prompt configuration as written by a caller or a config file.
///
/// Absent fields fall through to the next layer: per-call config over
/// global config over [`PromptConfig::defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Mask input, drawing this string once per typed character.
    pub echo: Option<String>,
    pub eot: Option<bool>,
    pub sigint: Option<bool>,
    pub default_response: Option<String>,
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
}

impl PromptConfig {
    pub fn defaults() -> Self {
        Self {
            echo: None,
            eot: Some(false),
            sigint: Some(false),
            default_response: Some(String::new()),
            autocomplete: AutocompleteConfig {
                behavior: Some(Behavior::Cycle),
                fill: Some(false),
                sticky: Some(false),
                suggest_col_count: Some(DEFAULT_SUGGEST_COL_COUNT),
                trigger_key: Some(DEFAULT_TRIGGER_KEY),
            },
        }
    }

    /// Config with only `echo` set to the empty string (fully hidden input).
    pub fn hidden() -> Self {
        Self {
            echo: Some(String::new()),
            ..Self::default()
        }
    }

    /// Keep every field that is set here; take the rest from `fallback`.
    pub fn fill_from(self, fallback: &PromptConfig) -> PromptConfig {
        PromptConfig {
            echo: self.echo.or_else(|| fallback.echo.clone()),
            eot: self.eot.or(fallback.eot),
            sigint: self.sigint.or(fallback.sigint),
            default_response: self
                .default_response
                .or_else(|| fallback.default_response.clone()),
            autocomplete: self.autocomplete.fill_from(&fallback.autocomplete),
        }
    }

    /// Validate and apply defaults.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let full = self.clone().fill_from(&PromptConfig::defaults());
        let ac = full.autocomplete;

        let suggest_col_count = ac.suggest_col_count.unwrap_or(DEFAULT_SUGGEST_COL_COUNT);
        if suggest_col_count == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        let trigger_key = ac.trigger_key.unwrap_or(DEFAULT_TRIGGER_KEY);
        if !trigger_key.is_ascii() {
            return Err(ConfigError::TriggerOutOfRange(trigger_key));
        }
        if let Some(role) = keys::reserved_role(trigger_key) {
            return Err(ConfigError::ReservedTrigger {
                key: trigger_key,
                role,
            });
        }

        Ok(Settings {
            echo: full.echo,
            eot: full.eot.unwrap_or(false),
            sigint: full.sigint.unwrap_or(false),
            default_response: full.default_response.unwrap_or_default(),
            autocomplete: AutocompleteSettings {
                behavior: ac.behavior.unwrap_or_default(),
                fill: ac.fill.unwrap_or(false),
                sticky: ac.sticky.unwrap_or(false),
                suggest_col_count,
                trigger_key,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub echo: Option<String>,
    pub eot: bool,
    pub sigint: bool,
    pub default_response: String,
    pub autocomplete: AutocompleteSettings,
}

impl Settings {
    pub fn masked(&self) -> bool {
        self.echo.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocompleteSettings {
    pub behavior: Behavior,
    pub fill: bool,
    pub sticky: bool,
    pub suggest_col_count: usize,
    pub trigger_key: u8,
}

impl AutocompleteSettings {
    /// Sticky mode only applies to the suggest behavior.
    pub fn sticky_suggest(&self) -> bool {
        self.sticky && self.behavior == Behavior::Suggest
    }
}
