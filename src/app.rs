use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::core::error::ChatError;
use crate::display::{self, TerminalSurface};
use crate::input;
use crate::session::{ChatSession, TurnOutcome};
use crate::stream::DisplaySurface;
use is_terminal::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct Application {
    pub state: ChatState,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(session: ChatSession, command_dispatcher: CommandDispatcher) -> Self {
        Self {
            state: ChatState::new(session),
            command_dispatcher,
        }
    }

    pub async fn run(&mut self) -> Result<(), ChatError> {
        display::display_header();
        display::display_settings(&self.state.session);

        if std::io::stdin().is_terminal() {
            self.run_interactive().await
        } else {
            self.run_scripted().await
        }
    }

    async fn run_interactive(&mut self) -> Result<(), ChatError> {
        let mut editor = input::create_editor(&self.command_dispatcher)?;

        while self.state.should_continue {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            self.handle_line(&line, &mut TerminalSurface::new()).await;
        }

        Ok(())
    }

    /// Every stdin line is one submission; used when input is piped in.
    async fn run_scripted(&mut self) -> Result<(), ChatError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while self.state.should_continue {
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !line.trim().is_empty() && !line.trim_start().starts_with('/') {
                display::display_message(&crate::conversation::Message::user(line.trim()));
            }
            self.handle_line(&line, &mut TerminalSurface::new()).await;
        }

        Ok(())
    }

    /// Runs a slash command or submits a chat turn. Errors are reported and
    /// never end the session.
    pub async fn handle_line<D>(&mut self, line: &str, surface: &mut D) -> Option<TurnOutcome>
    where
        D: DisplaySurface + ?Sized,
    {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.starts_with('/') {
            match self.command_dispatcher.execute_line(line, &mut self.state) {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => {}
                Err(e) => display::display_error(&e),
            }
            return None;
        }

        match self.state.session.submit(line, surface).await {
            Ok(outcome) => outcome,
            Err(e) => {
                display::display_error(&e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;
    use crate::conversation::Message;
    use crate::providers::Fragment;
    use crate::providers::scripted::{Script, ScriptedProvider};
    use crate::settings::{Model, Settings};
    use crate::stream::tests::RecordingSurface;

    fn app(provider: &ScriptedProvider, knowledge: &str) -> Application {
        let session = ChatSession::new(
            Box::new(provider.clone()),
            knowledge.to_string(),
            Settings::for_knowledge(knowledge),
        );
        Application::new(session, create_command_registry())
    }

    #[tokio::test]
    async fn commands_do_not_reach_the_model() {
        let provider = ScriptedProvider::new(vec![Script::reply(&["ok"])]);
        let mut app = app(&provider, "");
        let mut surface = RecordingSurface::default();

        assert!(app.handle_line("/model o4-mini", &mut surface).await.is_none());
        assert!(app.handle_line("/nonsense", &mut surface).await.is_none());
        assert!(provider.requests().is_empty());
        assert!(app.state.session.conversation().is_empty());

        app.handle_line("hello", &mut surface).await.unwrap();
        assert_eq!(provider.requests()[0].model, Model::O4Mini);
    }

    #[tokio::test]
    async fn session_survives_a_failed_stream() {
        let provider = ScriptedProvider::new(vec![
            Script::Stream(vec![
                Ok(Fragment::text("Par")),
                Ok(Fragment::text("tial")),
                Err(ChatError::Transport("connection reset".into())),
            ]),
            Script::reply(&["Done."]),
        ]);
        let mut app = app(&provider, "");
        let mut surface = RecordingSurface::default();

        let first = app.handle_line("one", &mut surface).await.unwrap();
        assert!(!first.is_complete());
        let second = app.handle_line("two", &mut surface).await.unwrap();
        assert!(second.is_complete());

        assert_eq!(
            app.state.session.conversation().snapshot(),
            &[
                Message::user("one"),
                Message::assistant("Partial"),
                Message::user("two"),
                Message::assistant("Done."),
            ]
        );
        assert!(app.state.should_continue);
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut app = app(&provider, "");
        let mut surface = RecordingSurface::default();

        assert!(app.handle_line("  \t ", &mut surface).await.is_none());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn quit_ends_the_loop() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut app = app(&provider, "");
        let mut surface = RecordingSurface::default();

        app.handle_line("/quit", &mut surface).await;
        assert!(!app.state.should_continue);
    }
}
