/*!
 * Data model for the scene-tagged knowledge base.
 *
 * One `KnowledgeBase` document is stored per scene. Each document holds an ordered
 * list of `ExpressionRecord`s plus scene keywords and translation guidelines.
 */

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code used when a record has no translation for the requested target
pub const FALLBACK_TRANSLATION_LANGUAGE: &str = "en";

const TRANSLATION_KEY_PREFIX: &str = "translation_";

/// A topical scene and the keywords that identify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Scene identifier, also the document file stem
    pub id: String,

    /// Human readable name shown in prompts
    #[serde(default)]
    pub display_name: String,

    /// Keywords matched as substrings
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Scene weight
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl SceneDefinition {
    /// Create a scene definition with weight 1.0.
    pub fn new(id: &str, display_name: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            weight: 1.0,
        }
    }

    /// Override the weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// Translations of an expression keyed by ISO language code.
///
/// Serialized flattened into the record as `translation_<code>` keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationMap(BTreeMap<String, String>);

impl TranslationMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the translation for a language code.
    pub fn insert(&mut self, code: &str, translation: &str) {
        self.0.insert(code.to_lowercase(), translation.to_string());
    }

    /// Translation for a language code.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(&code.to_lowercase()).map(String::as_str)
    }

    /// Whether no translation is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stored translations.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for TranslationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|(code, text)| (format!("{}{}", TRANSLATION_KEY_PREFIX, code), text)),
        )
    }
}

impl<'de> Deserialize<'de> for TranslationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Receives every key not claimed by a named field of ExpressionRecord
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let map = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let code = key.strip_prefix(TRANSLATION_KEY_PREFIX)?;
                let text = value.as_str()?;
                (!code.is_empty()).then(|| (code.to_lowercase(), text.to_string()))
            })
            .collect();
        Ok(Self(map))
    }
}

/// A stored expression with its meaning, translations and usage guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRecord {
    /// Expression as it appears in source text
    #[serde(default)]
    pub source: String,

    /// Alternative spellings
    #[serde(default)]
    pub variants: Vec<String>,

    /// Actual meaning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,

    /// Hint for translators
    #[serde(rename = "translation_hint", default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Usage context tag
    #[serde(rename = "context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Example sentence in the source language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_source: Option<String>,

    /// Example sentence translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_target: Option<String>,

    /// Cultural background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_note: Option<String>,

    /// RFC 3339 timestamp of automatic learning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_at: Option<String>,

    /// Whether the record was added by the learner
    #[serde(default)]
    pub auto_learned: bool,

    /// Translations by language code
    #[serde(flatten)]
    pub translations: TranslationMap,
}

impl ExpressionRecord {
    /// Create a record with only a source expression.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Translation for the target language code, falling back to English.
    pub fn translation_for(&self, code: Option<&str>) -> Option<&str> {
        code.and_then(|c| self.translations.get(c))
            .filter(|t| !t.is_empty())
            .or_else(|| self.translations.get(FALLBACK_TRANSLATION_LANGUAGE))
            .filter(|t| !t.is_empty())
    }

    /// Whether `phrase` equals the source or one of the variants.
    pub fn is_known_as(&self, phrase: &str) -> bool {
        self.source == phrase || self.variants.iter().any(|v| v == phrase)
    }
}

/// Knowledge document for one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Scene identifier
    #[serde(default)]
    pub scene: String,

    /// Scene description
    #[serde(default)]
    pub description: String,

    /// Scene keywords, also used as a relevance signal
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Expressions in insertion order
    #[serde(default)]
    pub expressions: Vec<ExpressionRecord>,

    /// Translation guidelines
    #[serde(rename = "translation_guidelines", default)]
    pub guidelines: Vec<String>,
}

impl KnowledgeBase {
    /// Create an empty document shell for a scene.
    pub fn empty(scene: &str, description: &str) -> Self {
        Self {
            scene: scene.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Whether a record with this source already exists.
    pub fn contains_source(&self, source: &str) -> bool {
        self.expressions.iter().any(|e| e.source == source)
    }

    /// Whether the phrase is a known source or variant.
    pub fn knows_phrase(&self, phrase: &str) -> bool {
        self.expressions.iter().any(|e| e.is_known_as(phrase))
    }
}

/// A scene detected in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMatch {
    /// Scene identifier
    pub scene: String,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// An expression retrieved for a text.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    /// Retrieved record
    pub expression: ExpressionRecord,
    /// Scene the record belongs to
    pub scene: String,
    /// Display name of the scene
    pub scene_name: String,
    /// Relevance to the text (0.0 - 1.0)
    pub relevance: f32,
}

/// Where a learned candidate came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Source text the phrase was found in
    pub original_text: String,
    /// Translation of the source text
    pub translated_text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
    /// RFC 3339 detection time
    pub detected_at: String,
}

/// A phrase proposed for addition to a scene's knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Proposed expression
    pub phrase: String,
    /// Scene it was detected in
    pub scene: String,
    /// Heuristic confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Origin of the candidate
    pub provenance: Provenance,
    /// Free-text analysis supplied with the translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Meaning extracted from the rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}
