/*!
 * Mixed-language detection.
 *
 * A `LanguageSegmenter` splits text into script runs and reports whether the
 * text mixes Han characters with Latin-script words. The default
 * `ScriptSegmenter` works purely on character classes.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Latin-script word tokens, allowing trailing digits and `+`/`#` (e.g. `C++`, `C#`)
static LATIN_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+#]*").expect("valid latin token pattern"));

/// Runs of CJK unified ideographs
static HAN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]+").expect("valid han run pattern"));

/// Whether a text mixes languages, and which foreign tokens it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedLanguageSignal {
    /// Text contains both Han runs and Latin words
    pub is_mixed: bool,
    /// Latin tokens in order of first appearance
    pub foreign_tokens: Vec<String>,
}

impl MixedLanguageSignal {
    /// Signal for a single-language text.
    pub fn monolingual() -> Self {
        Self::default()
    }
}

/// Produces a mixed-language signal for a text.
pub trait LanguageSegmenter: Send + Sync + std::fmt::Debug {
    /// Analyse `text`
    fn segment(&self, text: &str) -> MixedLanguageSignal;
}

/// Script-class based segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSegmenter;

impl ScriptSegmenter {
    /// Han runs of the text in order.
    pub fn han_runs(text: &str) -> Vec<&str> {
        HAN_RUN.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl LanguageSegmenter for ScriptSegmenter {
    fn segment(&self, text: &str) -> MixedLanguageSignal {
        let mut foreign_tokens: Vec<String> = Vec::new();
        for token in LATIN_TOKEN.find_iter(text) {
            if !foreign_tokens.iter().any(|t| t == token.as_str()) {
                foreign_tokens.push(token.as_str().to_string());
            }
        }

        let has_han = HAN_RUN.is_match(text);
        MixedLanguageSignal {
            is_mixed: has_han && !foreign_tokens.is_empty(),
            foreign_tokens,
        }
    }
}
