use crate::config::UiConfig;
use crate::dispatcher::{IgnoreReason, ResponseDispatcher, Submission};
use crate::events::DispatcherEvent;
use crate::ui::conversation::commands::get_help_text;
use crate::ui::conversation::{
    ConversationComposer, ConversationHistory, ConversationResult, SlashCommand, TypingIndicator,
};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tracing::debug;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Redraw,
    Exit,
}

/// Wires the input collector and the history view to the dispatcher
#[derive(Debug)]
pub struct ConversationManager {
    dispatcher: ResponseDispatcher,
    composer: ConversationComposer,
    ui: UiConfig,
    notice: Option<String>,
    tick: u64,
}

impl ConversationManager {
    pub fn new(dispatcher: ResponseDispatcher, ui: UiConfig) -> Self {
        Self {
            dispatcher,
            composer: ConversationComposer::new("Schreibe deine Nachricht..."),
            ui,
            notice: None,
            tick: 0,
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        match self.composer.handle_key(key) {
            ConversationResult::Submitted(input) => self.handle_input(&input),
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::Redraw,
        }
    }

    pub fn handle_paste(&mut self, text: &str) -> ConversationAction {
        self.composer.handle_paste(text);
        ConversationAction::Redraw
    }

    /// Forward text from the composer to the dispatcher
    pub fn handle_input(&mut self, input: &str) -> ConversationAction {
        self.notice = None;
        match self.dispatcher.submit(input) {
            Submission::Accepted { .. } => {}
            Submission::Ignored(IgnoreReason::Composing) => {
                self.notice = Some("Einen Moment, SpendCast antwortet noch.".to_string());
            }
            Submission::Ignored(reason) => {
                debug!(?reason, "input not forwarded");
            }
        }
        self.sync_composer();
        ConversationAction::Redraw
    }

    /// Advance the typing animation and apply replies that are due
    pub fn on_tick(&mut self) -> ConversationAction {
        let events = self.dispatcher.poll_replies();
        self.sync_composer();

        if self.dispatcher.is_composing() {
            self.tick = self.tick.wrapping_add(1);
            return ConversationAction::Redraw;
        }

        if events
            .iter()
            .any(|event| matches!(event, DispatcherEvent::MessageAppended { .. }))
        {
            ConversationAction::Redraw
        } else {
            ConversationAction::None
        }
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        match command {
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::Redraw
            }
            SlashCommand::Profile => {
                let profile = self.dispatcher.profile();
                self.notice = Some(format!("Katalog: {} ({})", profile, profile.description()));
                ConversationAction::Redraw
            }
            SlashCommand::Bye => {
                self.dispatcher.shutdown();
                ConversationAction::Exit
            }
        }
    }

    fn sync_composer(&mut self) {
        self.composer.set_disabled(self.dispatcher.is_composing());
    }

    pub fn dispatcher(&self) -> &ResponseDispatcher {
        &self.dispatcher
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Stop pending replies before the view goes away
    pub fn shutdown(&mut self) {
        self.dispatcher.shutdown();
    }

    /// Render header, history, notice line and composer
    pub fn render(&self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(5),    // History
                Constraint::Length(2), // Notice
                Constraint::Length(3), // Composer
            ])
            .split(frame.size());

        frame.render_widget(header(), chunks[0]);

        let typing = self
            .dispatcher
            .is_composing()
            .then(|| TypingIndicator::new(self.tick));
        let history = ConversationHistory::new(self.dispatcher.messages())
            .typing(typing)
            .show_timestamps(self.ui.show_timestamps);
        frame.render_widget(history, chunks[1]);

        if let Some(notice) = &self.notice {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    notice.as_str(),
                    Style::default().fg(Color::Yellow),
                )))
                .wrap(Wrap { trim: true }),
                chunks[2],
            );
        }

        frame.render_widget(&self.composer, chunks[3]);
    }
}

fn header() -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            "PostFinance SpendCast",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Rede mit deinen Finanzen.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
}
