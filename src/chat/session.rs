//! The interactive chat loop.
//!
//! ```text
//! AwaitingInput ──line──► Processing ──reply──► Displaying ──► AwaitingInput
//!       │
//!       └── quit / EOF / Ctrl-C ──► Finished
//! ```

use std::future::Future;
use std::io::{self, Write};

use super::agent::Agent;
use super::console::LineInput;
use super::prompts::REPHRASE_HINT;
use super::transcript::{Role, Transcript, Turn};

/// Printed when the session ends.
pub const GOODBYE: &str = "Goodbye! Thanks for using the Wikipedia Research Assistant.";

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave the session.
    Quit,
    /// Show the transcript.
    History,
    /// Reset the transcript.
    Clear,
    /// Nothing was typed.
    Empty,
    /// A question for the agent.
    Message(String),
}

impl Command {
    /// Classifies one line of input. Commands are case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" | "q" => Self::Quit,
            "history" | "hist" | "h" => Self::History,
            "clear" | "clear history" | "reset" => Self::Clear,
            _ => Self::Message(trimmed.to_string()),
        }
    }
}

/// Where the loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to type.
    AwaitingInput,
    /// The agent is working on a message.
    Processing,
    /// A reply is being shown.
    Displaying,
    /// The session has ended.
    Finished,
}

/// One chat session with an agent.
pub struct ChatSession<A, O> {
    agent: A,
    input: LineInput,
    output: O,
    transcript: Transcript,
    state: SessionState,
}

impl<A: Agent, O: Write> ChatSession<A, O> {
    /// Creates a session reading from `input` and writing to `output`.
    pub fn new(agent: A, input: LineInput, output: O) -> Self {
        Self {
            agent,
            input,
            output,
            transcript: Transcript::new(),
            state: SessionState::AwaitingInput,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The conversation so far.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Gives the agent back, e.g. to shut down its MCP session.
    pub fn into_agent(self) -> A {
        self.agent
    }

    /// Runs until quit, end of input, or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Runs until quit, end of input, or `interrupt` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    pub async fn run_until<F>(&mut self, interrupt: F) -> io::Result<()>
    where
        F: Future,
    {
        tokio::pin!(interrupt);

        while self.state != SessionState::Finished {
            write!(self.output, "\nYou: ")?;
            self.output.flush()?;

            let line = tokio::select! {
                _ = &mut interrupt => None,
                line = self.input.read_line() => Some(line?),
            };

            let line = match line {
                Some(Some(line)) => line,
                Some(None) => {
                    self.finish()?;
                    break;
                }
                None => {
                    tracing::info!("Interrupted while waiting for input");
                    self.finish()?;
                    break;
                }
            };

            match Command::parse(&line) {
                Command::Empty => {}
                Command::Quit => self.finish()?,
                Command::History => self.show_history()?,
                Command::Clear => {
                    self.transcript.clear();
                    writeln!(self.output, "Chat history cleared.")?;
                }
                Command::Message(text) => {
                    self.state = SessionState::Processing;
                    writeln!(self.output, "Thinking...")?;
                    self.output.flush()?;

                    let outcome = tokio::select! {
                        _ = &mut interrupt => None,
                        reply = self.agent.respond(self.transcript.turns(), &text) => Some(reply),
                    };

                    match outcome {
                        None => {
                            tracing::info!("Interrupted while processing");
                            self.finish()?;
                        }
                        Some(Ok(reply)) => {
                            self.state = SessionState::Displaying;
                            self.transcript.push(Turn::now(Role::User, text));
                            writeln!(self.output, "\nAssistant: {reply}")?;
                            self.transcript.push(Turn::now(Role::Assistant, reply));
                            self.state = SessionState::AwaitingInput;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Agent failed");
                            writeln!(self.output, "\nError processing your request: {e}")?;
                            writeln!(self.output, "{REPHRASE_HINT}")?;
                            self.state = SessionState::AwaitingInput;
                        }
                    }
                }
            }
        }

        self.output.flush()
    }

    fn show_history(&mut self) -> io::Result<()> {
        match self.transcript.render() {
            Some(table) => write!(self.output, "\n{table}"),
            None => writeln!(self.output, "No chat history yet"),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.state = SessionState::Finished;
        writeln!(self.output, "\n{GOODBYE}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chat::error::AgentError;

    struct FakeAgent {
        replies: VecDeque<Result<String, AgentError>>,
        history_lengths: Vec<usize>,
    }

    impl FakeAgent {
        fn new(replies: Vec<Result<String, AgentError>>) -> Self {
            Self {
                replies: replies.into(),
                history_lengths: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Agent for FakeAgent {
        async fn respond(&mut self, history: &[Turn], input: &str) -> Result<String, AgentError> {
            self.history_lengths.push(history.len());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok(format!("echo: {input}")))
        }
    }

    async fn run_session(script: &'static str, agent: FakeAgent) -> (String, ChatSession<FakeAgent, Vec<u8>>) {
        let mut session = ChatSession::new(agent, LineInput::from_reader(script.as_bytes()), Vec::new());
        session
            .run_until(std::future::pending::<()>())
            .await
            .unwrap();
        let output = String::from_utf8(session.output.clone()).unwrap();
        (output, session)
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::parse("QUIT"), Command::Quit);
        assert_eq!(Command::parse(" exit "), Command::Quit);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("Hist"), Command::History);
        assert_eq!(Command::parse("h"), Command::History);
        assert_eq!(Command::parse("Clear History"), Command::Clear);
        assert_eq!(Command::parse("reset"), Command::Clear);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse("  What is Rust? "),
            Command::Message("What is Rust?".to_string())
        );
    }

    #[tokio::test]
    async fn quit_says_goodbye() {
        let (output, session) = run_session("quit\n", FakeAgent::new(Vec::new())).await;
        assert!(output.contains(GOODBYE));
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[tokio::test]
    async fn end_of_input_finishes() {
        let (output, session) = run_session("", FakeAgent::new(Vec::new())).await;
        assert!(output.contains(GOODBYE));
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[tokio::test]
    async fn messages_are_recorded_with_prior_history() {
        let (output, session) =
            run_session("first\n\nsecond\nquit\n", FakeAgent::new(Vec::new())).await;

        assert!(output.contains("Assistant: echo: first"));
        assert!(output.contains("Assistant: echo: second"));
        assert_eq!(session.transcript().turns().len(), 4);
        assert_eq!(session.into_agent().history_lengths, vec![0, 2]);
    }

    #[tokio::test]
    async fn history_before_any_message() {
        let (output, _) = run_session("history\nq\n", FakeAgent::new(Vec::new())).await;
        assert!(output.contains("No chat history yet"));
    }

    #[tokio::test]
    async fn history_shows_turns_and_clear_resets() {
        let (output, session) =
            run_session("hello\nh\nreset\nquit\n", FakeAgent::new(Vec::new())).await;
        assert!(output.contains("Chat History (Session started: "));
        assert!(output.contains("Chat history cleared."));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn agent_failure_is_reported_and_loop_continues() {
        let agent = FakeAgent::new(vec![Err(AgentError::TooManyToolRounds(2))]);
        let (output, session) = run_session("broken\nworks\nquit\n", agent).await;

        assert!(output.contains(
            "Error processing your request: Gave up after 2 rounds of tool calls without an answer"
        ));
        assert!(output.contains(REPHRASE_HINT));
        assert!(output.contains("Assistant: echo: works"));
        assert_eq!(session.transcript().turns().len(), 2);
    }

    #[tokio::test]
    async fn interrupt_ends_the_session() {
        let (reader, _writer) = tokio::io::duplex(64);
        let input = LineInput::from_reader(tokio::io::BufReader::new(reader));
        let mut session = ChatSession::new(FakeAgent::new(Vec::new()), input, Vec::new());

        session.run_until(async {}).await.unwrap();

        assert_eq!(session.state(), SessionState::Finished);
        assert!(String::from_utf8(session.output.clone()).unwrap().contains(GOODBYE));
    }
}
