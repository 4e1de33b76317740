//! Conversation history owned by the chat session.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local};

/// Width at which history rows are clipped.
const MAX_ROW_CHARS: usize = 80;

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person at the terminal.
    User,
    /// The agent.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Assistant => f.write_str("Assistant"),
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Speaker.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Local>,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// Ordered list of turns.
#[derive(Debug, Clone)]
pub struct Transcript {
    started: DateTime<Local>,
    turns: Vec<Turn>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Local::now(),
            turns: Vec::new(),
        }
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drops every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Returns the turns in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Whether there is anything to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Renders the history table, or `None` when empty.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        if self.turns.is_empty() {
            return None;
        }

        let mut out = format!(
            "Chat History (Session started: {})\n{:<8}  {:<10}  Message\n",
            self.started.format("%H:%M:%S"),
            "Time",
            "Role"
        );
        for turn in &self.turns {
            let _ = writeln!(
                out,
                "{:<8}  {:<10}  {}",
                turn.timestamp.format("%H:%M:%S"),
                turn.role.to_string(),
                clip(&single_line(&turn.content))
            );
        }
        Some(out)
    }
}

/// Clips text longer than the row width to 77 characters plus "...".
#[must_use]
pub fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_ROW_CHARS {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_ROW_CHARS - 3).collect();
    clipped.push_str("...");
    clipped
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
