use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::ChatError;
use crate::settings::Model;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::borrow::Cow;

pub type ChatEditor = Editor<ChatHelper, DefaultHistory>;

/// Completes slash commands and their arguments.
pub struct CommandCompleter {
    command_names: Vec<String>,
}

impl CommandCompleter {
    pub fn new(dispatcher: &CommandDispatcher) -> Self {
        Self {
            command_names: dispatcher.get_command_names(),
        }
    }

    fn argument_candidates(command: &str) -> Vec<String> {
        match command {
            "model" => Model::ALL.iter().map(|m| m.to_string()).collect(),
            "kb" => vec!["on".to_string(), "off".to_string()],
            _ => Vec::new(),
        }
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let Some(typed) = line[..pos].strip_prefix('/') else {
            return (pos, Vec::new());
        };

        let (start, options, prefix) = match typed.split_once(' ') {
            None => (1, self.command_names.clone(), typed),
            Some((command, rest)) if !rest.contains(' ') => {
                (pos - rest.len(), Self::argument_candidates(command), rest)
            }
            Some(_) => return (pos, Vec::new()),
        };

        let matches = options
            .into_iter()
            .filter(|option| option.starts_with(prefix))
            .map(|option| Pair {
                display: option.clone(),
                replacement: option,
            })
            .collect();
        (start, matches)
    }
}

/// Helper struct that combines the rustyline components
pub struct ChatHelper {
    completer: CommandCompleter,
    hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(dispatcher: &CommandDispatcher) -> Self {
        Self {
            completer: CommandCompleter::new(dispatcher),
            hinter: HistoryHinter {},
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.completer.candidates(line, pos))
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for ChatHelper {}

/// Creates a configured rustyline editor. History lives only as long as the
/// session.
pub fn create_editor(dispatcher: &CommandDispatcher) -> Result<ChatEditor, ChatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| ChatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(dispatcher)));

    Ok(editor)
}

/// Reads one line; `None` means the user asked to leave (Ctrl-C / Ctrl-D).
pub fn read_input(editor: &mut ChatEditor) -> Result<Option<String>, ChatError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        "> ".to_string()
    } else {
        style("> ").bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str())?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;

    fn completer() -> CommandCompleter {
        CommandCompleter::new(&create_command_registry())
    }

    fn replacements(result: (usize, Vec<Pair>)) -> (usize, Vec<String>) {
        (
            result.0,
            result.1.into_iter().map(|p| p.replacement).collect(),
        )
    }

    #[test]
    fn completes_command_names() {
        let (start, names) = replacements(completer().candidates("/te", 3));
        assert_eq!(start, 1);
        assert_eq!(names, vec!["temperature"]);
    }

    #[test]
    fn completes_model_argument() {
        let line = "/model gpt-4";
        let (start, names) = replacements(completer().candidates(line, line.len()));
        assert_eq!(start, 7);
        assert_eq!(names, vec!["gpt-4o-mini", "gpt-4.1-mini"]);
    }

    #[test]
    fn completes_knowledge_toggle() {
        let line = "/kb o";
        let (_, names) = replacements(completer().candidates(line, line.len()));
        assert_eq!(names, vec!["on", "off"]);
    }

    #[test]
    fn plain_text_has_no_completions() {
        let (_, names) = replacements(completer().candidates("hello", 5));
        assert!(names.is_empty());
    }
}
