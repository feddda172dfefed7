//! `cust`: appearance settings

use crate::error::{Result, ShellError};
use crate::settings::{
    color_key, SettingsStore, ARGS_COLOR, BACKGROUND_COLOR, COMMAND_COLOR, OUTPUT_COLOR,
    PATH_COLOR, PROMPT_COLOR, PROMPT_SYMBOL, TITLE_COLOR, TITLE_TEXT,
};
use crate::shell::{Effect, Response};
use crate::store::Store;

const COLOR_LABELS: &[(&str, &str, &str)] = &[
    ("c1", PATH_COLOR, "Path color"),
    ("c2", PROMPT_COLOR, "Prompt color"),
    ("c3", COMMAND_COLOR, "Command color"),
    ("c4", ARGS_COLOR, "Arguments color"),
    ("c5", TITLE_COLOR, "Title color"),
    ("c6", BACKGROUND_COLOR, "Background color"),
    ("c7", OUTPUT_COLOR, "Text output color"),
];

pub(super) fn customize(store: &Store, argument: &str, out: &mut Response) -> Result<()> {
    let settings = SettingsStore::new(store);
    let (action, value) = match argument.split_once(char::is_whitespace) {
        Some((action, value)) => (action.to_lowercase(), value.trim()),
        None => (argument.to_lowercase(), ""),
    };

    let updated = match action.as_str() {
        "" => {
            let current = settings.load()?;
            out.line("Available customization commands:");
            out.line("");
            for (slot, key, label) in COLOR_LABELS {
                out.line(format!(
                    "cust {} - {} (current: {})",
                    slot,
                    label,
                    current.get(key)
                ));
            }
            out.line("");
            out.line(format!(
                "cust t - Change title text (current: {})",
                current.title()
            ));
            out.line(format!(
                "cust ps - Change prompt symbol (current: {})",
                current.prompt_symbol()
            ));
            out.line("cust r - Reset all settings to default");
            out.line("cust exp - Export settings to JSON");
            out.line("cust imp <json> - Import settings from JSON");
            out.line("");
            out.line("Example: cust c1 ff0000");
            return Ok(());
        }
        "exp" | "export" => {
            let json = settings.load()?.to_json()?;
            out.line("```json");
            out.lines.extend(json.lines().map(str::to_string));
            out.line("```");
            return Ok(());
        }
        "imp" | "import" => {
            if value.is_empty() {
                return Err(ShellError::usage("Usage: cust imp <json>").into());
            }
            let imported = settings.import(value)?;
            out.line("Theme imported successfully! New settings applied.");
            imported
        }
        "r" | "reset" => {
            let defaults = settings.reset()?;
            out.line("Settings reset to default");
            defaults
        }
        "t" | "title" => {
            if value.is_empty() {
                return Err(ShellError::usage("Usage: cust t <title text>").into());
            }
            let updated = settings.set(TITLE_TEXT, value)?;
            out.line(format!("Title updated to: {}", value));
            updated
        }
        "ps" => {
            if value.is_empty() {
                return Err(ShellError::usage("Usage: cust ps <symbol>").into());
            }
            let updated = settings.set(PROMPT_SYMBOL, value)?;
            out.line(format!("Prompt symbol updated to: {}", value));
            updated
        }
        slot if color_key(slot).is_some() => {
            let (key, color) = settings.set_color(slot, value)?;
            out.line(format!("Updated {} to {}", key, color));
            settings.load()?
        }
        _ => {
            return Err(
                ShellError::usage("Invalid format. Use: cust c[1-7] <hex color code>").into(),
            )
        }
    };

    tracing::debug!("Appearance settings changed via 'cust {}'", action);
    out.effect = Some(Effect::ApplySettings(updated));
    Ok(())
}
