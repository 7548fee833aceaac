use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show help
    Help,
    /// Show the active content catalog
    Profile,
    /// Exit the application
    Bye,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show available commands",
            SlashCommand::Profile => "show which reply catalog is active",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let head = rest.split_whitespace().next()?;

    SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(SlashCommand::Bye),
            "h" | "?" => Some(SlashCommand::Help),
            "p" | "catalog" => Some(SlashCommand::Profile),
            _ => None,
        })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Verfügbare Befehle: ");
    let commands: Vec<String> = SlashCommand::iter()
        .map(|command| format!("/{} ({})", command.command(), command.description()))
        .collect();
    help.push_str(&commands.join(", "));
    help.push_str(". Aliase: /q für /bye, /h für /help, /p für /profile.");

    help
}
