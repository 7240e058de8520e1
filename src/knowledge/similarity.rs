/*!
 * Character sequence similarity.
 *
 * Ratcliff/Obershelp "gestalt pattern matching": find the longest common
 * block, recurse on both sides of it, and report `2 * M / (|a| + |b|)` where
 * `M` is the total number of matched characters. Lengths are in characters,
 * not bytes, so CJK text scores the same as Latin text.
 */

/// Similarity ratio between two strings (0.0 - 1.0).
///
/// Two empty strings are identical (1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a_chars, &b_chars);
    (2.0 * matched as f32 / total as f32).clamp(0.0, 1.0)
}

/// First `count` characters of a string.
pub fn char_prefix(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Total size of all matching blocks.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    // Explicit stack of (a_lo, a_hi, b_lo, b_hi) ranges still to examine
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;

        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common block within the given ranges.
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best = (a_lo, b_lo, 0);
    // Two-row dynamic programming over common suffix lengths
    let width = b_hi - b_lo + 1;
    let mut prev_row = vec![0usize; width];
    let mut curr_row = vec![0usize; width];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let col = j - b_lo + 1;
            curr_row[col] = if a[i] == b[j] { prev_row[col - 1] + 1 } else { 0 };

            let len = curr_row[col];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
        curr_row.iter_mut().for_each(|v| *v = 0);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequenceRatio_identical_shouldBeOne() {
        assert_eq!(sequence_ratio("打酱油", "打酱油"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn test_sequenceRatio_disjoint_shouldBeZero() {
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_sequenceRatio_knownValues_shouldMatchGestaltScore() {
        // "abcd" vs "bcde": common block "bcd" => 2 * 3 / 8
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-6);
        // Matching blocks "a" and "c" => 2 * 2 / 6
        assert!((sequence_ratio("abc", "axc") - 2.0 * 2.0 / 6.0).abs() < 1e-6);
        // CJK counts characters, not bytes
        assert!((sequence_ratio("打酱油", "去打酱油") - 6.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_sequenceRatio_partialOverlap_shouldStayInUnitRange() {
        let pairs = [("kitten", "sitting"), ("今天天气", "今天下雨"), ("hello", "olleh")];
        for (a, b) in pairs {
            let ab = sequence_ratio(a, b);
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_charPrefix_shouldCountCharacters() {
        assert_eq!(char_prefix("打酱油去了", 2), "打酱");
        assert_eq!(char_prefix("ab", 10), "ab");
        assert_eq!(char_prefix("abc", 0), "");
    }
}
