//! Terminal input shared by the chat loop and elicitation prompts.
//!
//! Both the chat loop and the MCP client's elicitation handler read lines
//! from the same stdin. [`LineInput`] wraps one buffered reader behind a
//! Tokio mutex so they can share it; they never read at the same time.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;

use crate::tools::Elicitation;

type BoxedLines = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

/// A cloneable handle to a line-oriented input stream.
#[derive(Clone)]
pub struct LineInput {
    lines: Arc<Mutex<BoxedLines>>,
}

impl LineInput {
    /// Reads from process stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Reads from any buffered reader.
    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let boxed: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(boxed.lines())),
        }
    }

    /// Reads the next line without its terminator. `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Prints an elicitation question and reads the answer.
///
/// An empty answer declines; end of input cancels.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub async fn prompt_choice(
    input: &LineInput,
    out: &mut (dyn Write + Send),
    message: &str,
) -> io::Result<Elicitation> {
    writeln!(out, "\n{message}")?;
    write!(out, "Your choice (press Enter to skip): ")?;
    out.flush()?;

    Ok(match input.read_line().await? {
        None => Elicitation::Cancel,
        Some(answer) if answer.trim().is_empty() => Elicitation::Decline,
        Some(answer) => Elicitation::Accept(answer.trim().to_string()),
    })
}
