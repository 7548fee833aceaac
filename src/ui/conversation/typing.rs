use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Animated "is composing" indicator, advanced once per UI tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingIndicator {
    tick: u64,
}

impl TypingIndicator {
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }

    pub fn dots(&self) -> &'static str {
        match self.tick % 4 {
            0 => ".",
            1 => "..",
            2 => "...",
            _ => "   ",
        }
    }

    pub fn line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled("🤖 ", Style::default().fg(Color::Yellow)),
            Span::styled("SpendCast schreibt", Style::default().fg(Color::Gray)),
            Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
        ])
    }
}
