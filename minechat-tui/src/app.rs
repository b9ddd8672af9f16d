//! Application state for the TUI.

use std::collections::VecDeque;

use minechat_sdk::StatusEvent;

/// Maximum number of lines kept in the conversation pane.
const MAX_MESSAGES: usize = 1000;

/// A single line in the conversation pane.
#[derive(Debug, Clone)]
pub struct BufferLine {
    pub timestamp: String,
    pub text: String,
    pub is_system: bool,
}

/// Top-level application state: the conversation buffer, the status
/// panel labels, and the input line.
pub struct App {
    pub messages: VecDeque<BufferLine>,
    /// Scroll offset from the bottom (0 = at bottom).
    pub scroll: u16,
    /// Current input line and cursor position (in characters).
    pub input: String,
    pub cursor: usize,
    /// Status panel labels, driven by the status queue.
    pub nickname: String,
    pub read_state: &'static str,
    pub write_state: &'static str,
    pub should_quit: bool,
}

impl App {
    pub fn new(nickname: &str) -> Self {
        Self {
            messages: VecDeque::new(),
            scroll: 0,
            input: String::new(),
            cursor: 0,
            nickname: nickname.to_string(),
            read_state: "no connection",
            write_state: "no connection",
            should_quit: false,
        }
    }

    pub fn push_chat(&mut self, text: String) {
        self.push(BufferLine {
            timestamp: now_str(),
            text,
            is_system: false,
        });
    }

    pub fn push_system(&mut self, text: &str) {
        self.push(BufferLine {
            timestamp: now_str(),
            text: text.to_string(),
            is_system: true,
        });
    }

    /// Preload a line of saved history without timestamping it again (the
    /// history file already carries timestamps).
    pub fn push_history(&mut self, text: String) {
        self.push(BufferLine {
            timestamp: String::new(),
            text,
            is_system: false,
        });
    }

    fn push(&mut self, line: BufferLine) {
        self.messages.push_back(line);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
        // Auto-scroll to bottom when a new line arrives
        self.scroll = 0;
    }

    /// Update the status panel from an engine event.
    pub fn apply_status(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::ReadStateChanged(state) => self.read_state = state.label(),
            StatusEvent::WriteStateChanged(state) => self.write_state = state.label(),
            StatusEvent::NicknameReceived(nickname) => self.nickname = nickname,
        }
    }

    // ── Input editing ──

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = char_to_byte(&self.input, self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = char_to_byte(&self.input, self.cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    /// Take and clear the input line.
    pub fn input_take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        let max = self.messages.len() as u16;
        self.scroll = (self.scroll + lines).min(max);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

fn now_str() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use minechat_sdk::ConnectionState;

    use super::*;

    #[test]
    fn status_events_update_labels() {
        let mut app = App::new("unknown");
        assert_eq!(app.read_state, "no connection");

        app.apply_status(StatusEvent::ReadStateChanged(ConnectionState::Established));
        app.apply_status(StatusEvent::WriteStateChanged(ConnectionState::Initiated));
        app.apply_status(StatusEvent::NicknameReceived("Brave Rabbit".into()));

        assert_eq!(app.read_state, "connection established");
        assert_eq!(app.write_state, "connection establishment...");
        assert_eq!(app.nickname, "Brave Rabbit");
    }

    #[test]
    fn buffer_is_capped() {
        let mut app = App::new("unknown");
        for i in 0..(MAX_MESSAGES + 10) {
            app.push_chat(format!("line {i}"));
        }
        assert_eq!(app.messages.len(), MAX_MESSAGES);
        assert_eq!(app.messages.front().unwrap().text, "line 10");
    }

    #[test]
    fn input_editing_is_char_based() {
        let mut app = App::new("unknown");
        for c in "héllo".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.backspace();
        assert_eq!(app.input, "hélo");
        assert_eq!(app.input_take(), "hélo");
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
    }
}
