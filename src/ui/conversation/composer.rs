use crate::ui::conversation::commands::{
    CommandEntry, SlashCommand, command_entries, parse_slash_command,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    /// Trimmed, non-empty text ready for the dispatcher
    Submitted(String),
    Command(SlashCommand),
    None,
}

/// State for the text area within the composer.
///
/// `cursor_position` counts characters, not bytes, so umlauts edit correctly.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor_position)
            .map(|(index, _)| index)
            .unwrap_or(self.content.len())
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.content.insert(index, c);
        self.cursor_position += 1;
    }

    fn insert_str(&mut self, text: &str) {
        let index = self.byte_index();
        self.content.insert_str(index, text);
        self.cursor_position += text.chars().count();
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        if self.cursor_position == 0 {
            return false;
        }
        self.cursor_position -= 1;
        let index = self.byte_index();
        self.content.remove(index);
        true
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        if self.cursor_position >= self.char_count() {
            return false;
        }
        let index = self.byte_index();
        self.content.remove(index);
        true
    }

    fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }
}

/// Input collector: edits a draft and hands trimmed text to the dispatcher.
///
/// While disabled the draft stays editable but Enter does not submit.
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    disabled: bool,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            disabled: false,
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.state.insert_char('\n');
                } else if self.show_command_palette {
                    if self.apply_selected_command() {
                        return ConversationResult::None;
                    }
                    // No matching command, send the draft as text
                    self.close_command_palette();
                    return self.submit();
                } else {
                    return self.submit();
                }
            }
            KeyCode::Up if self.show_command_palette => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette => self.move_command_selection(1),
            KeyCode::Esc if self.show_command_palette => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette => {
                self.apply_selected_command();
            }
            KeyCode::Char(c) => {
                if c == '/' && self.state.content.is_empty() {
                    self.state.insert_char(c);
                    self.open_command_palette();
                    return ConversationResult::None;
                }

                self.state.insert_char(c);

                if self.show_command_palette {
                    if self.state.content.starts_with('/') && !c.is_whitespace() {
                        self.refresh_command_palette();
                    } else {
                        self.close_command_palette();
                    }
                }
            }
            KeyCode::Backspace => {
                if self.state.backspace() {
                    self.sync_command_palette();
                }
            }
            KeyCode::Delete => {
                if self.state.delete() {
                    self.sync_command_palette();
                }
            }
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor_position < self.state.char_count() {
                    self.state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.char_count();
            }
            _ => {}
        }

        ConversationResult::None
    }

    /// Insert pasted text at the cursor
    pub fn handle_paste(&mut self, text: &str) {
        self.state.insert_str(text);
        self.sync_command_palette();
    }

    fn submit(&mut self) -> ConversationResult {
        let trimmed = self.state.content.trim();
        if trimmed.is_empty() {
            return ConversationResult::None;
        }

        // Commands are handled locally and stay available while disabled
        if let Some(command) = parse_slash_command(trimmed) {
            self.state.clear();
            self.close_command_palette();
            return ConversationResult::Command(command);
        }

        if self.disabled {
            return ConversationResult::None;
        }

        let submitted = trimmed.to_string();
        self.state.clear();
        self.close_command_palette();
        ConversationResult::Submitted(submitted)
    }

    fn sync_command_palette(&mut self) {
        if !self.show_command_palette {
            return;
        }
        if self.state.content.starts_with('/') {
            self.refresh_command_palette();
        } else {
            self.close_command_palette();
        }
    }

    fn open_command_palette(&mut self) {
        self.show_command_palette = true;
        self.selected_command = Some(0);
        self.refresh_command_palette();
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self) {
        let query = self.state.content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        self.selected_command = if self.filtered_commands.is_empty() {
            None
        } else {
            let index = self.selected_command.unwrap_or(0);
            Some(index.min(self.filtered_commands.len() - 1))
        };
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);

        self.selected_command = Some(next as usize);
    }

    fn apply_selected_command(&mut self) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        self.state.content = format!("/{}", entry.keyword);
        self.state.cursor_position = self.state.char_count();
        self.close_command_palette();
        true
    }

    /// Block or allow submissions, mirrors the dispatcher's composing flag
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_command_palette_open(&self) -> bool {
        self.show_command_palette
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Clear content
    pub fn clear(&mut self) {
        self.state.clear();
        self.close_command_palette();
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = self.state.content.clone();
            content.insert(self.state.byte_index(), '▌');

            for (i, line_text) in content.split('\n').enumerate() {
                if i < inner_area.height as usize {
                    let line = Line::from(vec![Span::raw(line_text)]);
                    buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
                }
            }
        }

        if self.show_command_palette {
            let palette_height = (self.filtered_commands.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Befehle")
                .style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            for (index, entry) in self.filtered_commands.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if self.selected_command == Some(index) {
                    Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" · ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

impl ConversationComposer {
    fn title(&self) -> &'static str {
        if self.disabled {
            "SpendCast schreibt…"
        } else {
            "Nachricht"
        }
    }
}
