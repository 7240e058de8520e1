/*!
 * Text feature extraction shared by scoring and engine selection.
 *
 * Features are cheap substring checks against immutable marker tables plus
 * the mixed-language signal of a `LanguageSegmenter`.
 */

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::mixed_language::{LanguageSegmenter, MixedLanguageSignal, ScriptSegmenter};

/// Upper length (chars) of a simple text
const SIMPLE_MAX_CHARS: usize = 50;
/// Upper length (chars) of a medium text
const MEDIUM_MAX_CHARS: usize = 200;

/// Length bucket of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    /// Bucket for a character count.
    pub fn for_length(chars: usize) -> Self {
        if chars > MEDIUM_MAX_CHARS {
            Complexity::Complex
        } else if chars > SIMPLE_MAX_CHARS {
            Complexity::Medium
        } else {
            Complexity::Simple
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        };
        write!(f, "{}", name)
    }
}

/// Register of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Neutral,
    Formal,
}

/// Marker tables used for feature detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMarkers {
    /// Internet slang and idioms
    pub cultural: Vec<String>,
    /// Technical vocabulary
    pub technical: Vec<String>,
    /// Polite or formal register
    pub formal: Vec<String>,
}

impl Default for FeatureMarkers {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            cultural: owned(&["仨尖儿", "坐11路", "打酱油", "吃瓜", "躺平", "内卷", "凡尔赛", "yyds", "绝绝子", "破防"]),
            technical: owned(&[
                "API", "HTTP", "JSON", "XML", "数据库", "算法", "编程", "代码", "CPU", "GPU", "AI", "ML", "NLP",
            ]),
            formal: owned(&["请", "您", "敬", "谨", "此致", "敬礼"]),
        }
    }
}

/// Features of a source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFeatures {
    /// Length in characters
    pub length: usize,
    /// Length bucket
    pub complexity: Complexity,
    /// Contains cultural or idiomatic expressions
    pub cultural_elements: bool,
    /// Contains technical terms
    pub technical_terms: bool,
    /// Register
    pub formality: Formality,
    /// Mixed-language signal
    pub mixed_language: MixedLanguageSignal,
}

impl TextFeatures {
    /// Whether the text is written in a formal register.
    pub fn is_formal(&self) -> bool {
        self.formality == Formality::Formal
    }

    /// Short human-readable summary used in scoring prompts.
    pub fn summary(&self) -> String {
        format!(
            "长度={}, 复杂度={}, 文化元素={}, 技术术语={}, 正式={}, 混合语言={}",
            self.length,
            self.complexity,
            self.cultural_elements,
            self.technical_terms,
            self.is_formal(),
            self.mixed_language.is_mixed
        )
    }
}

/// Extracts `TextFeatures` from source texts.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    markers: FeatureMarkers,
    segmenter: Arc<dyn LanguageSegmenter>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureMarkers::default(), Arc::new(ScriptSegmenter))
    }
}

impl FeatureExtractor {
    /// Create an extractor from marker tables and a segmenter.
    pub fn new(markers: FeatureMarkers, segmenter: Arc<dyn LanguageSegmenter>) -> Self {
        Self { markers, segmenter }
    }

    /// Mixed-language signal of a text.
    pub fn mixed_language(&self, text: &str) -> MixedLanguageSignal {
        self.segmenter.segment(text)
    }

    /// Analyse a text.
    pub fn analyze(&self, text: &str) -> TextFeatures {
        let length = text.chars().count();
        let contains_any = |markers: &[String]| markers.iter().any(|m| text.contains(m.as_str()));

        TextFeatures {
            length,
            complexity: Complexity::for_length(length),
            cultural_elements: contains_any(&self.markers.cultural),
            technical_terms: contains_any(&self.markers.technical),
            formality: if contains_any(&self.markers.formal) {
                Formality::Formal
            } else {
                Formality::Neutral
            },
            mixed_language: self.segmenter.segment(text),
        }
    }
}
