//! Prompt assembly and output formatting for retrieval-augmented answers.
//!
//! docmem does not call a text generator itself. It retrieves the
//! relevant fragments, builds the prompt handed to the generator, and
//! formats the generator's answer for the terminal.
//!
//! # Prompt layout
//!
//! ```text
//! {query}
//!
//! Relevant document fragments:
//! {chunk 1}
//!
//! {chunk 2}
//!
//! Answer concisely.
//! ```

use anyhow::Result;

use crate::retriever::Retriever;

/// Column width used for terminal output.
pub const DEFAULT_WRAP_WIDTH: usize = 100;

/// Build the generator prompt from a query and its retrieved chunks.
pub fn build_prompt<S: AsRef<str>>(query: &str, chunks: &[S]) -> String {
    let combined = chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{query}\n\nRelevant document fragments:\n{combined}\n\nAnswer concisely.")
}

/// Retrieve `top_k` chunks for `query` and assemble the prompt.
pub async fn prompt_for(retriever: &Retriever<'_>, query: &str, top_k: usize) -> Result<String> {
    let chunks = retriever.retrieve(query, top_k).await?;
    tracing::debug!(chunks = chunks.len(), "assembling prompt");
    Ok(build_prompt(query, &chunks))
}

/// Greedy word wrap to `width` columns.
///
/// Runs of whitespace (newlines included) collapse to single spaces.
/// Words longer than `width` are split. A width of `0` returns the text
/// unchanged.
pub fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            let piece_len = piece.len();
            let needed = if line_len == 0 { piece_len } else { line_len + 1 + piece_len };
            if needed > width && line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(piece);
            line_len += piece_len;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}
