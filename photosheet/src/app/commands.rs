use log::debug;
use photosheet_core::NotifyKind;
use serde::Deserialize;

/// Commands the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginCommand {
    /// Build a sheet from the current selection
    CreateSheet,
    /// Close the session
    Cancel,
}

/// Parse a command from one line of input
///
/// Accepts either a bare command word or a JSON message carrying it in `type`:
/// - `create-sheet` or `{"type": "create-sheet"}`
/// - `cancel` or `{"type": "cancel"}`
pub fn parse_command(input: &str) -> Option<PluginCommand> {
    let trimmed = input.trim();

    if trimmed.starts_with('{') {
        return match serde_json::from_str::<PluginCommand>(trimmed) {
            Ok(cmd) => Some(cmd),
            Err(e) => {
                debug!("Ignoring message {:?}: {}", trimmed, e);
                None
            }
        };
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "create-sheet" => Some(PluginCommand::CreateSheet),
        "cancel" => Some(PluginCommand::Cancel),
        _ => {
            if !trimmed.is_empty() {
                debug!("Ignoring unknown command {:?}", trimmed);
            }
            None
        }
    }
}

/// Format a host notification for the terminal
pub fn format_notification(message: &str, kind: NotifyKind) -> String {
    match kind {
        NotifyKind::Info => message.to_string(),
        NotifyKind::Error => format!("✗ {}", message),
    }
}
