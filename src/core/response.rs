//! Discord message splitting
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Line-aware chunking for provider replies that exceed one message

/// Discord message content limit (bytes are a safe upper bound for chars)
pub const MESSAGE_LIMIT: usize = 2000;

/// Split `text` into pieces of at most `max_size` bytes.
///
/// Prefers breaking at newlines and never splits inside a UTF-8 character.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        // +1 for the newline we re-insert between lines
        let needed = if current.is_empty() { line.len() } else { line.len() + 1 };

        if current.len() + needed <= max_size {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() > max_size {
            let mut pieces = split_on_char_boundaries(line, max_size);
            // Keep the tail open so following short lines can join it
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current = last;
            }
        } else {
            current.push_str(line);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_on_char_boundaries(line: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Chunk text for message content (2000 character limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}
