//! Fixed-window text chunker.
//!
//! Splits document text into contiguous, non-overlapping windows of at
//! most `size` characters. Each window is trimmed of surrounding
//! whitespace and windows that become empty are dropped.
//!
//! Sizes are measured in Unicode scalar values (`char`s), so a window
//! never splits a multi-byte character.
//!
//! # Example
//!
//! ```rust
//! use docmem_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("abcdef", 4);
//! assert_eq!(chunks, vec!["abcd".to_string(), "ef".to_string()]);
//! ```

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Split `text` into trimmed windows of at most `size` characters.
///
/// # Guarantees
///
/// - Windows are taken left to right with no overlap and no gap.
/// - Every returned chunk is at most `size` characters long.
/// - Whitespace-only windows are omitted, not replaced by placeholders.
/// - Identical input always yields the identical sequence.
/// - `size == 0` yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .nth(size)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let window = remaining[..split_at].trim();
        if !window.is_empty() {
            chunks.push(window.to_string());
        }
        remaining = &remaining[split_at..];
    }

    chunks
}
