use crate::config::UiConfig;
use crate::dispatcher::ResponseDispatcher;
use crate::error::{Result, SpendcastError};
use crate::events::TuiEvent;
use crate::ui::conversation::{ConversationAction, ConversationManager};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{debug, info, warn};

type ChatTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode plus alternate screen, restored when dropped
struct TerminalGuard {
    terminal: ChatTerminal,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(terminal_error(e));
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(terminal_error)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to disable raw mode");
        }
        if let Err(e) = execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        ) {
            warn!(error = %e, "failed to leave alternate screen");
        }
        let _ = self.terminal.show_cursor();
    }
}

fn terminal_error(e: io::Error) -> SpendcastError {
    SpendcastError::TerminalError(e.to_string())
}

/// Map a crossterm event onto the chat's own event type
fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(TuiEvent::Key(key)),
        Event::Paste(text) => Some(TuiEvent::Paste(text)),
        Event::Resize(width, height) => Some(TuiEvent::Resize(width, height)),
        _ => None,
    }
}

fn is_interrupt(event: &TuiEvent) -> bool {
    matches!(
        event,
        TuiEvent::Key(key)
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
    )
}

fn apply(manager: &mut ConversationManager, event: TuiEvent) -> ConversationAction {
    if is_interrupt(&event) {
        manager.shutdown();
        return ConversationAction::Exit;
    }

    match event {
        TuiEvent::Key(key) => manager.handle_key(key),
        TuiEvent::Paste(text) => manager.handle_paste(&text),
        TuiEvent::Resize(..) => ConversationAction::Redraw,
    }
}

/// Run the interactive chat until the user leaves
pub async fn run(dispatcher: ResponseDispatcher, ui: UiConfig) -> Result<()> {
    let tick_rate = Duration::from_millis(ui.tick_rate_ms.max(16));
    let mut manager = ConversationManager::new(dispatcher, ui);
    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    info!(tick_ms = tick_rate.as_millis() as u64, "chat view started");

    let mut action = ConversationAction::Redraw;
    loop {
        match action {
            ConversationAction::Exit => break,
            ConversationAction::Redraw => {
                guard
                    .terminal
                    .draw(|frame| manager.render(frame))
                    .map_err(terminal_error)?;
            }
            ConversationAction::None => {}
        }

        action = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => match translate(event) {
                    Some(event) => apply(&mut manager, event),
                    None => ConversationAction::None,
                },
                Some(Err(e)) => return Err(terminal_error(e)),
                None => {
                    debug!("terminal event stream closed");
                    ConversationAction::Exit
                }
            },
            _ = ticker.tick() => manager.on_tick(),
        };
    }

    manager.shutdown();
    info!(messages = manager.dispatcher().len(), "chat view closed");
    Ok(())
}
