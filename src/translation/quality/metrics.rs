/*!
 * Quality metrics for comparing candidate translations.
 *
 * A `QualityScore` rates one translation on four dimensions:
 * - Accuracy: meaning carried over
 * - Fluency: natural target-language phrasing
 * - Cultural adaptation: idioms and references handled
 * - Completeness: nothing left out
 *
 * The overall score is a fixed weighted sum and is never stored, so it can not
 * drift from the dimension scores.
 */

use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

/// Weight of accuracy in the overall score
pub const ACCURACY_WEIGHT: f32 = 0.3;
/// Weight of fluency in the overall score
pub const FLUENCY_WEIGHT: f32 = 0.25;
/// Weight of cultural adaptation in the overall score
pub const CULTURAL_WEIGHT: f32 = 0.25;
/// Weight of completeness in the overall score
pub const COMPLETENESS_WEIGHT: f32 = 0.2;

/// Score assumed for a dimension nobody rated
pub const NEUTRAL_SCORE: f32 = 0.5;

/// A scored quality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Accuracy,
    Fluency,
    CulturalAdaptation,
    Completeness,
}

impl Dimension {
    /// All dimensions in rubric order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Accuracy,
        Dimension::Fluency,
        Dimension::CulturalAdaptation,
        Dimension::Completeness,
    ];

    /// Label used by the scoring rubric.
    pub fn rubric_label(&self) -> &'static str {
        match self {
            Dimension::Accuracy => "准确性",
            Dimension::Fluency => "流畅性",
            Dimension::CulturalAdaptation => "文化适应性",
            Dimension::Completeness => "完整性",
        }
    }
}

/// Quality score of a single translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScore {
    accuracy: f32,
    fluency: f32,
    cultural_adaptation: f32,
    completeness: f32,
}

impl Default for QualityScore {
    fn default() -> Self {
        Self::uniform(NEUTRAL_SCORE)
    }
}

impl QualityScore {
    /// Create a score; every dimension is clamped to [0, 1].
    pub fn new(accuracy: f32, fluency: f32, cultural_adaptation: f32, completeness: f32) -> Self {
        Self {
            accuracy: clamp_unit(accuracy),
            fluency: clamp_unit(fluency),
            cultural_adaptation: clamp_unit(cultural_adaptation),
            completeness: clamp_unit(completeness),
        }
    }

    /// Same score on every dimension.
    pub fn uniform(score: f32) -> Self {
        Self::new(score, score, score, score)
    }

    /// Score of one dimension.
    pub fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Accuracy => self.accuracy,
            Dimension::Fluency => self.fluency,
            Dimension::CulturalAdaptation => self.cultural_adaptation,
            Dimension::Completeness => self.completeness,
        }
    }

    /// Set one dimension, clamped to [0, 1].
    pub fn set(&mut self, dimension: Dimension, score: f32) {
        let score = clamp_unit(score);
        match dimension {
            Dimension::Accuracy => self.accuracy = score,
            Dimension::Fluency => self.fluency = score,
            Dimension::CulturalAdaptation => self.cultural_adaptation = score,
            Dimension::Completeness => self.completeness = score,
        }
    }

    /// Shift one dimension by `delta`, clamped to [0, 1].
    pub fn adjust(&mut self, dimension: Dimension, delta: f32) {
        self.set(dimension, self.get(dimension) + delta);
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn fluency(&self) -> f32 {
        self.fluency
    }

    pub fn cultural_adaptation(&self) -> f32 {
        self.cultural_adaptation
    }

    pub fn completeness(&self) -> f32 {
        self.completeness
    }

    /// Weighted overall score (0.0 - 1.0).
    pub fn overall(&self) -> f32 {
        let overall = self.accuracy * ACCURACY_WEIGHT
            + self.fluency * FLUENCY_WEIGHT
            + self.cultural_adaptation * CULTURAL_WEIGHT
            + self.completeness * COMPLETENESS_WEIGHT;
        clamp_unit(overall)
    }
}

impl Serialize for QualityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QualityScore", 5)?;
        state.serialize_field("accuracy", &self.accuracy)?;
        state.serialize_field("fluency", &self.fluency)?;
        state.serialize_field("cultural_adaptation", &self.cultural_adaptation)?;
        state.serialize_field("completeness", &self.completeness)?;
        state.serialize_field("overall", &self.overall())?;
        state.end()
    }
}

/// Scores of the phrase-engine and LLM-engine translations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScorePair {
    /// Score of the phrase-based engine's translation
    pub phrase: QualityScore,
    /// Score of the LLM engine's translation
    pub llm: QualityScore,
}

impl ScorePair {
    /// Absolute difference of the overall scores.
    pub fn gap(&self) -> f32 {
        (self.phrase.overall() - self.llm.overall()).abs()
    }
}

fn clamp_unit(score: f32) -> f32 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}
