use super::ChatState;
use crate::core::error::ChatError;
use crate::display;
use crate::settings::{Model, Temperature};

use console::style;

pub trait CommandHandler {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct ModelCommand;
pub struct TemperatureCommand;
pub struct KnowledgeCommand;
pub struct SettingsCommand;
pub struct HistoryCommand;

pub struct HelpCommand {
    lines: Vec<&'static str>,
}

impl HelpCommand {
    pub const USAGE: &'static str = "/help - Show available commands";

    pub fn new(lines: Vec<&'static str>) -> Self {
        Self { lines }
    }
}

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = std::iter::once(title.to_string())
            .chain(self.lines.iter().map(|line| line.to_string()))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        Self::USAGE
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let settings = state.session.settings_mut();
        match args.first() {
            None => {
                let names: Vec<&str> = Model::ALL.iter().map(|m| m.as_str()).collect();
                Ok(Some(format!(
                    "Current model: {} (available: {})",
                    settings.model,
                    names.join(", ")
                )))
            }
            Some(name) => {
                settings.model = name.parse()?;
                tracing::info!(model = %settings.model, "model changed");
                Ok(Some(format!("Model changed to: {}", settings.model)))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

impl CommandHandler for TemperatureCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let settings = state.session.settings_mut();
        match args.first() {
            None => Ok(Some(format!("Current temperature: {}", settings.temperature))),
            Some(value) => {
                settings.temperature = value.parse::<Temperature>()?;
                Ok(Some(format!(
                    "Temperature set to: {}",
                    settings.temperature
                )))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/temperature <0.0-1.2> - Show or change the sampling temperature"
    }
}

impl CommandHandler for KnowledgeCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let available = state.session.has_knowledge();
        let settings = state.session.settings_mut();

        let include = match args.first().map(|a| a.to_lowercase()) {
            None => !settings.include_knowledge,
            Some(arg) if arg == "on" => true,
            Some(arg) if arg == "off" => false,
            Some(arg) => {
                return Err(ChatError::Input(format!(
                    "Unknown knowledge setting '{}'. Use: on or off",
                    arg
                )));
            }
        };
        settings.include_knowledge = include;

        let status = if include { "on" } else { "off" };
        if include && !available {
            Ok(Some(format!(
                "Knowledge base {} (no knowledge base file was found, nothing will be added)",
                status
            )))
        } else {
            Ok(Some(format!("Knowledge base {}", status)))
        }
    }

    fn help(&self) -> &'static str {
        "/kb [on|off] - Include the knowledge base in requests (toggles without argument)"
    }
}

impl CommandHandler for SettingsCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        display::display_settings(&state.session);
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/settings - Show the current model, temperature and knowledge settings"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        display::display_history(state.session.conversation());
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/history - Show the conversation so far"
    }
}
