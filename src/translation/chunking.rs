/*!
 * Splitting long texts into overlapping chunks.
 *
 * Texts longer than the chunk size are cut near the size limit, preferring a
 * sentence end and then whitespace. Consecutive chunks overlap so that a
 * sentence cut at a chunk edge still reaches the engines whole in one of them.
 * All sizes are counted in characters.
 */

use log::debug;

/// Default maximum chunk size in characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;
/// Default overlap between consecutive chunks in characters
pub const DEFAULT_OVERLAP_CHARS: usize = 100;

/// How far back from the size limit a sentence end is looked for
const SENTENCE_SEARCH_CHARS: usize = 200;
/// How far back from the size limit whitespace is looked for
const WHITESPACE_SEARCH_CHARS: usize = 100;

const SENTENCE_ENDS: [char; 6] = ['。', '！', '？', '.', '!', '?'];
const BREAKING_SPACES: [char; 3] = [' ', '\n', '\t'];

/// Splits texts into chunks no longer than a character budget.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_chars: usize,
    overlap_chars: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_CHARS, DEFAULT_OVERLAP_CHARS)
    }
}

impl TextChunker {
    /// Create a chunker; the size is at least one character and the overlap
    /// stays below the size.
    pub fn new(max_chunk_chars: usize, overlap_chars: usize) -> Self {
        let max_chunk_chars = max_chunk_chars.max(1);
        Self {
            max_chunk_chars,
            overlap_chars: overlap_chars.min(max_chunk_chars - 1),
        }
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    /// Whether `text` is split into more than one chunk.
    pub fn needs_split(&self, text: &str) -> bool {
        text.chars().count() > self.max_chunk_chars
    }

    /// Split `text` into trimmed, non-empty chunks.
    ///
    /// Texts within the budget come back unchanged as a single chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        if !self.needs_split(text) {
            return vec![text.to_string()];
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let mut end = start + self.max_chunk_chars;

            if end < total {
                end = self.break_point(&chars, start, end);
            } else {
                end = total;
            }

            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            if end == total {
                break;
            }
            start = (start + 1).max(end.saturating_sub(self.overlap_chars));
        }

        debug!("Split a {}-char text into {} chunk(s)", total, chunks.len());
        chunks
    }

    /// End of the chunk starting at `start` with size limit `limit` (< text length).
    ///
    /// Looks back from the limit, never into the first half of the chunk,
    /// for a sentence end (kept in the chunk) and then for whitespace.
    fn break_point(&self, chars: &[char], start: usize, limit: usize) -> usize {
        let half = start + self.max_chunk_chars / 2;

        let sentence_floor = half.max(limit.saturating_sub(SENTENCE_SEARCH_CHARS));
        if let Some(i) = (sentence_floor + 1..=limit).rev().find(|&i| SENTENCE_ENDS.contains(&chars[i])) {
            return i + 1;
        }

        let space_floor = half.max(limit.saturating_sub(WHITESPACE_SEARCH_CHARS));
        if let Some(i) = (space_floor + 1..=limit).rev().find(|&i| BREAKING_SPACES.contains(&chars[i])) {
            return i;
        }

        limit
    }
}

/// Join translated chunks, with a space between chunks that end and start in
/// ASCII text and nothing between CJK text.
pub fn join_chunks<S: AsRef<str>>(parts: &[S]) -> String {
    let mut joined = String::new();

    for part in parts.iter().map(|p| -> &str { p.as_ref() }).filter(|p| !p.is_empty()) {
        let previous_ascii = joined.chars().next_back().is_some_and(|c| c.is_ascii());
        let next_ascii = part.chars().next().is_some_and(|c| c.is_ascii());
        if previous_ascii && next_ascii {
            joined.push(' ');
        }
        joined.push_str(part);
    }

    joined
}
