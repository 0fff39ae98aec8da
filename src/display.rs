use crate::conversation::{Conversation, Message, Role};
use crate::core::error::ChatError;
use crate::session::ChatSession;
use crate::settings::Model;
use crate::stream::DisplaySurface;
use console::{Term, style};
use is_terminal::IsTerminal;
use std::io::{self, Write};
use termimad::MadSkin;

pub const TITLE: &str = "Knowledge Base Chat";
pub const CAPTION: &str = "Stream responses • Session state • KB in user role";

fn box_width() -> usize {
    let terminal_width = Term::stdout().size().1 as usize;
    std::cmp::min(terminal_width.saturating_sub(4), 80).max(40)
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```") || text.contains('*') || text.contains('`') || text.contains('#')
}

/// Page header shown once at startup.
pub fn display_header() {
    println!("\n{}", style(TITLE).bold().magenta());
    println!("{}", style(CAPTION).dim());
}

/// The settings panel: model selector, temperature and knowledge toggle.
pub fn display_settings(session: &ChatSession) {
    let settings = session.settings();
    let width = box_width();

    let models: Vec<String> = Model::ALL
        .iter()
        .map(|m| {
            if *m == settings.model {
                style(format!("[{}]", m)).bold().green().to_string()
            } else {
                style(m.to_string()).dim().to_string()
            }
        })
        .collect();

    let knowledge = match (session.has_knowledge(), settings.include_knowledge) {
        (false, _) => style("no knowledge base found".to_string()).dim(),
        (true, true) => style(format!("on ({} bytes)", session.knowledge_len())).green(),
        (true, false) => style(format!("off ({} bytes available)", session.knowledge_len())).yellow(),
    };

    let header = "┌─ Settings ".to_string() + &"─".repeat(width.saturating_sub(12)) + "┐";
    let footer = "└".to_string() + &"─".repeat(width.saturating_sub(2)) + "┘";

    println!("{}", style(&header).dim().cyan());
    println!("│ {:<13} {}", style("Model").bold(), models.join(" "));
    println!(
        "│ {:<13} {} {}",
        style("Temperature").bold(),
        temperature_slider(settings.temperature.value()),
        settings.temperature
    );
    println!("│ {:<13} {}", style("Knowledge").bold(), knowledge);
    println!("{}", style(&footer).dim().cyan());
    println!(
        "{}",
        style("Type /help for commands, /quit to exit.").dim()
    );
}

fn temperature_slider(value: f32) -> String {
    let position = (value * 10.0).round() as usize;
    let track: String = (0..=12)
        .map(|i| if i == position { '●' } else { '─' })
        .collect();
    style(track).cyan().to_string()
}

fn role_tag(role: Role) -> String {
    match role {
        Role::User => style("🧑 user").bold().cyan().to_string(),
        Role::Assistant => style("🤖 assistant").bold().blue().to_string(),
    }
}

/// Renders one history entry, with markdown formatting when it has any.
pub fn display_message(message: &Message) {
    println!("\n{}", role_tag(message.role()));
    display_markdown(message.content());
}

pub fn display_markdown(text: &str) {
    if looks_like_markdown(text) {
        MadSkin::default().print_text(text);
    } else {
        println!("{}", text);
    }
}

/// Re-renders the whole conversation.
pub fn display_history(conversation: &Conversation) {
    if conversation.is_empty() {
        println!("{}", style("No messages yet.").dim());
        return;
    }
    for message in conversation.snapshot() {
        display_message(message);
    }
}

pub fn display_error(error: &ChatError) {
    eprintln!(
        "{} {}",
        style("⚠️ ").bold().red(),
        style(error.to_string()).red()
    );
}

/// Terminal rows `text` occupies when wrapped at `columns`.
fn rows_taken(text: &str, columns: usize) -> usize {
    let columns = columns.max(1);
    text.split('\n')
        .map(|line| console::measure_text_width(line).div_ceil(columns).max(1))
        .sum()
}

#[derive(Debug, PartialEq, Eq)]
enum Redraw<'a> {
    Append(&'a str),
    Replace,
}

fn redraw<'a>(shown: &str, text: &'a str) -> Redraw<'a> {
    match text.strip_prefix(shown) {
        Some(rest) => Redraw::Append(rest),
        None => Redraw::Replace,
    }
}

/// Streams an assistant reply onto stdout.
///
/// Renders that extend what is already on screen are appended; anything
/// else clears the reply and draws it again.
pub struct TerminalSurface {
    term: Term,
    shown: String,
    started: bool,
    interactive: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            shown: String::new(),
            started: false,
            interactive: io::stdout().is_terminal(),
        }
    }

    fn start(&mut self) {
        if !self.started {
            println!("\n{}", role_tag(Role::Assistant));
            self.started = true;
        }
    }

    fn clear_shown(&mut self) {
        if self.shown.is_empty() {
            return;
        }
        let rows = rows_taken(&self.shown, self.term.size().1 as usize);
        self.term.write_line("").ok();
        self.term.clear_last_lines(rows).ok();
        self.shown.clear();
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for TerminalSurface {
    fn render(&mut self, text: &str) {
        self.start();
        match redraw(&self.shown, text) {
            Redraw::Append(rest) => print!("{}", rest),
            Redraw::Replace if self.interactive => {
                self.clear_shown();
                print!("{}", text);
            }
            // no cursor control when piped; start the reply over on a new line
            Redraw::Replace => print!("\n{}", text),
        }
        io::stdout().flush().ok();
        self.shown = text.to_string();
    }

    fn finish(&mut self, text: &str) {
        self.start();
        if self.interactive && looks_like_markdown(text) {
            self.clear_shown();
            MadSkin::default().print_text(text);
        } else if !text.ends_with('\n') {
            println!();
        }
        io::stdout().flush().ok();
        self.shown = text.to_string();
    }

    fn show_error(&mut self, error: &ChatError) {
        display_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_markdown() {
        assert!(looks_like_markdown("# Title"));
        assert!(looks_like_markdown("use `cargo`"));
        assert!(!looks_like_markdown("plain answer"));
    }

    #[test]
    fn growing_text_is_appended() {
        assert_eq!(redraw("", "Hel"), Redraw::Append("Hel"));
        assert_eq!(redraw("Hel", "Hello"), Redraw::Append("lo"));
        assert_eq!(redraw("Hello", "Hello"), Redraw::Append(""));
    }

    #[test]
    fn rewritten_text_is_replaced() {
        assert_eq!(redraw("Hello", "Help"), Redraw::Replace);
        assert_eq!(redraw("Hello", "Hell"), Redraw::Replace);
    }

    #[test]
    fn counts_wrapped_rows() {
        assert_eq!(rows_taken("short", 80), 1);
        assert_eq!(rows_taken("one\ntwo\n", 80), 3);
        assert_eq!(rows_taken(&"x".repeat(25), 10), 3);
        assert_eq!(rows_taken(&"x".repeat(20), 10), 2);
        assert_eq!(rows_taken(&style("colored").red().to_string(), 7), 1);
        assert_eq!(rows_taken("any", 0), 3);
    }

    #[test]
    fn slider_marks_current_value() {
        let slider = console::strip_ansi_codes(&temperature_slider(0.3)).to_string();
        assert_eq!(slider.chars().count(), 13);
        assert_eq!(slider.chars().position(|c| c == '●'), Some(3));
    }
}
