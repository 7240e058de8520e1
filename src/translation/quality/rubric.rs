/*!
 * LLM rubric scoring.
 *
 * The LLM is asked to rate both translations on the four quality dimensions
 * in a fixed line format. Parsing is forgiving: unknown lines are ignored and
 * any dimension the response does not rate keeps the neutral score.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::metrics::{Dimension, QualityScore, ScorePair};
use super::{QualityScorer, ScoringRequest};
use crate::language_utils::prompt_language_name;
use crate::providers::TextCompletion;
use crate::translation::prompts::PromptTemplate;

/// Leading decimal number of a rubric value
static SCORE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)").expect("valid score pattern"));

/// Rubric label of an engine name (`deepl` becomes `DeepL`).
pub fn engine_label(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "deepl" => "DeepL".to_string(),
        "deepseek" => "DeepSeek".to_string(),
        _ => name.to_string(),
    }
}

/// Scores both translations with an LLM rubric call.
#[derive(Debug, Clone)]
pub struct RubricScorer {
    completion: Arc<dyn TextCompletion>,
}

impl RubricScorer {
    /// Create a scorer backed by a text completion capability.
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Rubric prompt for a scoring request.
    pub fn prompt(request: &ScoringRequest<'_>) -> String {
        let first_engine = engine_label(request.phrase_engine);
        let second_engine = engine_label(request.llm_engine);
        let features = request.features.summary();
        let source_language = prompt_language_name(request.source_language);

        PromptTemplate::new(PromptTemplate::QUALITY_RUBRIC).render(&[
            ("first_engine", &first_engine),
            ("second_engine", &second_engine),
            ("source_language", &source_language),
            ("features", &features),
            ("first_translation", request.phrase_translation),
            ("second_translation", request.llm_translation),
            ("text", request.text),
        ])
    }
}

#[async_trait]
impl QualityScorer for RubricScorer {
    fn name(&self) -> &str {
        "rubric"
    }

    async fn score(&self, request: &ScoringRequest<'_>) -> Option<ScorePair> {
        let prompt = Self::prompt(request);
        let Some(response) = self.completion.complete_text(&prompt).await else {
            warn!("Rubric scoring call failed, falling back to the next scorer");
            return None;
        };

        let scores = parse_rubric(
            &response,
            &engine_label(request.phrase_engine),
            &engine_label(request.llm_engine),
        );
        debug!(
            "Rubric scores: {} {:.2}, {} {:.2}",
            request.phrase_engine,
            scores.phrase.overall(),
            request.llm_engine,
            scores.llm.overall()
        );
        Some(scores)
    }
}

/// Parse a rubric response into a score pair.
///
/// Sections start at a line containing `<label>评分` (case-insensitive) and
/// last until the next section. Lines such as `- 准确性: 0.8` set a dimension;
/// both ASCII and full-width colons are accepted.
pub fn parse_rubric(response: &str, phrase_label: &str, llm_label: &str) -> ScorePair {
    #[derive(Clone, Copy)]
    enum Section {
        Phrase,
        Llm,
    }

    let phrase_heading = format!("{}评分", phrase_label.to_lowercase());
    let llm_heading = format!("{}评分", llm_label.to_lowercase());

    // Longer heading first, in case one label is a prefix of the other
    let mut headings = [(phrase_heading, Section::Phrase), (llm_heading, Section::Llm)];
    headings.sort_by_key(|(heading, _)| std::cmp::Reverse(heading.len()));

    let mut pair = ScorePair::default();
    let mut section = None;

    for line in response.lines().map(str::trim) {
        let lowered = line.to_lowercase();
        if let Some((_, heading_section)) = headings.iter().find(|(heading, _)| lowered.contains(heading.as_str())) {
            section = Some(*heading_section);
            continue;
        }

        let Some(current) = section else {
            continue;
        };
        let Some((dimension, value)) = parse_dimension_line(line) else {
            continue;
        };

        let score: &mut QualityScore = match current {
            Section::Phrase => &mut pair.phrase,
            Section::Llm => &mut pair.llm,
        };
        score.set(dimension, value);
    }

    pair
}

/// Dimension and value of a `- 准确性: 0.8` line.
fn parse_dimension_line(line: &str) -> Option<(Dimension, f32)> {
    let (label, value) = line.split_once([':', '：'])?;
    let dimension = Dimension::ALL.into_iter().find(|d| label.contains(d.rubric_label()))?;
    let captures = SCORE_VALUE.captures(value)?;
    let value = captures.get(1)?.as_str().parse::<f32>().ok()?;
    Some((dimension, value))
}
