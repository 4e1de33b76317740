//! Fixed text shown by the chat client.

/// System prompt for the research assistant.
pub const SYSTEM_PROMPT: &str = "\
You are a research assistant with access to Wikipedia through tools.

- Use search_wikipedia to find candidate articles before fetching one you are unsure about.
- Use get_article_summary for quick answers and get_article_content when detail is needed.
- Use get_article_info for metadata such as categories, links and the article URL.
- Use interactive_search when a topic is ambiguous and the user should choose.
- Use smart_summarize when the user asks for a polished overview.

Base your answers on the retrieved text, name the articles you used, and say so when
Wikipedia does not cover something. Keep answers concise.";

/// Shown when the chat session starts.
#[must_use]
pub fn welcome(server_name: &str) -> String {
    format!(
        "Wikipedia Research Assistant\n\
         Connected to: {server_name}\n\
         \n\
         Ask a question, or type:\n\
         \x20 history  show this session's messages\n\
         \x20 clear    forget the conversation so far\n\
         \x20 quit     leave (Ctrl-C works too)"
    )
}

/// Printed by `wiki-chat info`.
pub const INFO: &str = "\
Wikipedia Research Assistant

A chat client that answers questions using Wikipedia through an MCP server.

Tools provided by the wikipedia-mcp server:
  search_wikipedia           find articles by keyword
  get_article_summary        first sentences of an article
  get_article_content        full text, truncated at a sentence boundary
  get_article_info           title, URL, lengths, categories, link count
  smart_summarize            summary rewritten by the language model
  interactive_search         search, then ask you which article you meant
  get_article_with_progress  full text with progress reporting

Chat commands:
  history, hist, h           show the conversation
  clear, clear history, reset  start over
  quit, exit, q              leave

Environment:
  OPENAI_API_KEY             use OpenAI (gpt-4o-mini)
  OLLAMA_MODEL, OLLAMA_BASE_URL  use a local Ollama server instead";

/// Shown when the environment check fails.
pub const ERROR_HELP: &str = "\
To fix this, set one of the following, for example in a .env file:

  OPENAI_API_KEY=sk-...

or, for a local model:

  OLLAMA_MODEL=llama3.2
  OLLAMA_BASE_URL=http://localhost:11434

Also make sure the wikipedia-mcp binary is installed next to wiki-chat,
or set chat.server_command in the config file.";

/// Printed after an agent failure.
pub const REPHRASE_HINT: &str = "Please try rephrasing your question or check your connection.";
