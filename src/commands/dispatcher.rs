use super::{
    ChatState,
    handler::{
        HelpCommand, HistoryCommand, KnowledgeCommand, ModelCommand, QuitCommand,
        SettingsCommand, TemperatureCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::ChatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, ChatError> {
        self.registry.execute(command, args, state)
    }

    /// Splits a `/command arg...` line and runs it.
    pub fn execute_line(
        &self,
        line: &str,
        state: &mut ChatState,
    ) -> Result<Option<String>, ChatError> {
        let body = line.trim().trim_start_matches('/');
        let parts: Vec<&str> = body.split_whitespace().collect();
        match parts.split_first() {
            Some((command, args)) => self.execute(command, args, state),
            None => Err(ChatError::Input("Empty command".to_string())),
        }
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("model", ModelCommand);
    registry.register("temperature", TemperatureCommand);
    registry.register("kb", KnowledgeCommand);
    registry.register("settings", SettingsCommand);
    registry.register("history", HistoryCommand);

    let mut help_lines = registry.help_lines();
    help_lines.push(HelpCommand::USAGE);
    help_lines.sort_unstable();
    registry.register("help", HelpCommand::new(help_lines));

    CommandDispatcher::new(Arc::new(registry))
}
