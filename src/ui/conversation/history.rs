//! Conversation history display component

use crate::events::Origin;
use crate::message::{MediaRef, Message};
use crate::ui::conversation::typing::TypingIndicator;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Fixed badge shown on every video card
const VIDEO_BADGE: &str = "3:45";
const VIDEO_TAGS: &[&str] = &["Ausgabenanalyse", "Spartipps", "Personalisiert"];
const PODCAST_TAGS: &[&str] = &["Audio", "Budgetberatung", "Personalisiert"];
const CREATOR: &str = "PostFinance SpendCast";

/// Read-only view over the dispatcher's log, always scrolled to the bottom
#[derive(Debug, Clone, Copy)]
pub struct ConversationHistory<'a> {
    messages: &'a [Message],
    typing: Option<TypingIndicator>,
    show_timestamps: bool,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            typing: None,
            show_timestamps: true,
        }
    }

    /// Show the typing indicator below the last message
    pub fn typing(mut self, typing: Option<TypingIndicator>) -> Self {
        self.typing = typing;
        self
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// Every line of the conversation, oldest first
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line<'static>> = Vec::new();

        for message in self.messages {
            all_lines.extend(self.render_message(message, width));
            // spacing between messages
            all_lines.push(Line::from(""));
        }

        if let Some(typing) = self.typing {
            all_lines.push(typing.line());
        }

        all_lines
    }

    fn render_message(&self, message: &Message, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let mut header = format!("{} {}", message.origin.icon(), message.origin.display_name());
        if self.show_timestamps {
            header.push_str(&format!(" · {}", message.display_time()));
        }
        lines.push(Line::from(vec![Span::styled(
            header,
            Style::default().fg(Color::DarkGray),
        )]));

        let content_style = content_style(message.origin);
        for content_line in wrap_text(&message.text, width.saturating_sub(2) as usize) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, content_style),
            ]));
        }

        if let Some(media) = &message.media {
            lines.extend(render_media_card(media));
        }

        lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Verlauf");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines = self.lines(inner_area.width);

        // Determine the range of lines to display from the bottom
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

fn render_media_card(media: &MediaRef) -> Vec<Line<'static>> {
    let accent = Style::default().fg(Color::Yellow);
    let muted = Style::default().fg(Color::DarkGray);
    let title_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    match media {
        MediaRef::Video { title, .. } => {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("▶ Video · {VIDEO_BADGE}"), accent),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(title.clone(), title_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{CREATOR} • Heute erstellt"), muted),
            ]));
            lines.push(tag_line(VIDEO_TAGS));
        }
        MediaRef::Podcast {
            title, duration, ..
        } => {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("🎧 Podcast · {duration}"), accent),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(title.clone(), title_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(CREATOR, muted),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("0:00 {} {duration}", "─".repeat(20)), muted),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled("Heute erstellt • Finanzanalyse", muted),
            ]));
            lines.push(tag_line(PODCAST_TAGS));
        }
    }
    lines
}

fn tag_line(tags: &[&'static str]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for tag in tags {
        spans.push(Span::styled(
            format!("[{tag}]"),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Get content style based on origin
fn content_style(origin: Origin) -> Style {
    match origin {
        Origin::User => Style::default().fg(Color::Cyan),
        Origin::Assistant => Style::default().fg(Color::Gray),
    }
}

/// Wrap text to fit within the given width, counting characters
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            // Words wider than the line are hard-split
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let piece_width = piece.len();
                if current_width == 0 {
                    current_line.extend(piece);
                    current_width = piece_width;
                } else if current_width + 1 + piece_width <= width {
                    current_line.push(' ');
                    current_line.extend(piece);
                    current_width += 1 + piece_width;
                } else {
                    lines.push(std::mem::take(&mut current_line));
                    current_line.extend(piece);
                    current_width = piece_width;
                }
            }
        }

        lines.push(current_line);
    }

    lines
}
