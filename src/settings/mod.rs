//! Console appearance settings
//!
//! A flat string map persisted as one record. Persisted values are merged
//! over the defaults on load, so older records missing a key still work.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::store::Store;

/// Record key of the settings map
const SETTINGS_KEY: &str = "settings";

pub const PATH_COLOR: &str = "path-color";
pub const PROMPT_COLOR: &str = "prompt-color";
pub const COMMAND_COLOR: &str = "command-color";
pub const ARGS_COLOR: &str = "args-color";
pub const TITLE_COLOR: &str = "title-color";
pub const BACKGROUND_COLOR: &str = "background-color";
pub const OUTPUT_COLOR: &str = "output-color";
pub const PROMPT_SYMBOL: &str = "prompt-symbol";
pub const TITLE_TEXT: &str = "title-text";

/// Every key an imported theme must carry
pub const REQUIRED_KEYS: &[&str] = &[
    PATH_COLOR,
    PROMPT_COLOR,
    COMMAND_COLOR,
    ARGS_COLOR,
    TITLE_COLOR,
    BACKGROUND_COLOR,
    OUTPUT_COLOR,
    PROMPT_SYMBOL,
    TITLE_TEXT,
];

/// Color slots addressed as `c1`..`c7`
pub const COLOR_SLOTS: &[(&str, &str)] = &[
    ("c1", PATH_COLOR),
    ("c2", PROMPT_COLOR),
    ("c3", COMMAND_COLOR),
    ("c4", ARGS_COLOR),
    ("c5", TITLE_COLOR),
    ("c6", BACKGROUND_COLOR),
    ("c7", OUTPUT_COLOR),
];

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z0-9_-]*").unwrap();
}

fn defaults() -> BTreeMap<String, String> {
    [
        (PATH_COLOR, "#868686"),
        (PROMPT_COLOR, "#ffffff"),
        (COMMAND_COLOR, "#e74856"),
        (ARGS_COLOR, "#cbcbcb"),
        (TITLE_COLOR, "#e74856"),
        (BACKGROUND_COLOR, "#1e1e1e"),
        (OUTPUT_COLOR, "#ffffff"),
        (PROMPT_SYMBOL, "/>"),
        (TITLE_TEXT, "ratflix"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Accept `RRGGBB` or `#RRGGBB`, returning the `#`-prefixed form
pub fn normalize_hex_color(value: &str) -> Option<String> {
    let value = value.trim();
    let formatted = if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{}", value)
    };

    HEX_COLOR.is_match(&formatted).then_some(formatted)
}

/// Split `#RRGGBB` into its channels
pub fn hex_to_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = normalize_hex_color(value)?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

/// Resolve `c3`, `C3` or `color3` to its setting key
pub fn color_key(slot: &str) -> Option<&'static str> {
    let slot = slot.to_lowercase();
    let slot = slot.strip_prefix("color").map(|n| format!("c{}", n)).unwrap_or(slot);
    COLOR_SLOTS
        .iter()
        .find(|(name, _)| *name == slot)
        .map(|(_, key)| *key)
}

/// Snapshot of all settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Default for Settings {
    fn default() -> Self {
        Settings(defaults())
    }
}

impl Settings {
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn title(&self) -> &str {
        self.get(TITLE_TEXT)
    }

    pub fn prompt_symbol(&self) -> &str {
        self.get(PROMPT_SYMBOL)
    }

    /// Pretty JSON, as printed by `cust exp`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Parse an exported theme.
    ///
    /// Markdown code fences are ignored and keys exported by the web console
    /// (`--path-color`) are accepted. All required keys must be present.
    pub fn from_json(json: &str) -> Result<Self> {
        let cleaned = CODE_FENCE.replace_all(json, "");
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(cleaned.trim())
            .map_err(|_| ShellError::usage("Invalid JSON format. Please check your input."))?;

        let mut map = BTreeMap::new();
        for (key, value) in raw {
            let key = key.trim_start_matches("--").to_string();
            if !REQUIRED_KEYS.contains(&key.as_str()) {
                tracing::debug!("Ignoring unknown setting '{}' on import", key);
                continue;
            }
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            map.insert(key, value);
        }

        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(ShellError::usage(format!(
                "Invalid settings format: Missing required property '{}'",
                missing
            ))
            .into());
        }

        for (key, value) in map.iter_mut() {
            if key.ends_with("-color") {
                *value = normalize_hex_color(value).ok_or_else(|| {
                    ShellError::usage(format!("Invalid hex color code for {}: {}", key, value))
                })?;
            }
        }

        Ok(Settings(map))
    }
}

/// Settings view over the record store
pub struct SettingsStore<'a> {
    store: &'a Store,
}

impl<'a> SettingsStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Persisted overrides merged over the defaults
    pub fn load(&self) -> Result<Settings> {
        let mut settings = defaults();
        if let Some(saved) = self.store.get::<BTreeMap<String, String>>(SETTINGS_KEY)? {
            settings.extend(saved);
        }
        Ok(Settings(settings))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.store.put(SETTINGS_KEY, settings)
    }

    /// Set one color slot; returns the key and the normalized value
    pub fn set_color(&self, slot: &str, value: &str) -> Result<(&'static str, String)> {
        let key = color_key(slot)
            .ok_or_else(|| ShellError::usage("Invalid color index. Use c1 to c7"))?;
        let color = normalize_hex_color(value).ok_or_else(|| {
            ShellError::usage("Invalid hex color code. Use format: RRGGBB or #RRGGBB")
        })?;

        self.set(key, &color)?;
        Ok((key, color))
    }

    /// Set a free-text setting (title, prompt symbol)
    pub fn set(&self, key: &str, value: &str) -> Result<Settings> {
        let mut settings = self.load()?;
        settings.0.insert(key.to_string(), value.to_string());
        self.save(&settings)?;
        Ok(settings)
    }

    /// Drop all overrides
    pub fn reset(&self) -> Result<Settings> {
        self.store.remove(SETTINGS_KEY)?;
        Ok(Settings::default())
    }

    /// Replace every setting with an imported theme
    pub fn import(&self, json: &str) -> Result<Settings> {
        let settings = Settings::from_json(json)?;
        self.save(&settings)?;
        Ok(settings)
    }
}
