/*!
 * Tests for quality scores and scoring strategies
 */

use std::sync::Arc;
use translore::providers::mock::MockCompletion;
use translore::translation::FeatureExtractor;
use translore::translation::quality::{
    FeatureScorer, QualityScore, QualityScorer, RubricScorer, ScoringRequest, parse_rubric,
    score_with_chain,
};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

/// Test the weighted overall score
#[test]
fn test_qualityScore_overall_shouldBeWeightedSum() {
    let score = QualityScore::new(0.9, 0.8, 0.6, 1.0);
    assert!(approx(score.overall(), 0.3 * 0.9 + 0.25 * 0.8 + 0.25 * 0.6 + 0.2 * 1.0));

    let clamped = QualityScore::new(1.5, -0.2, f32::NAN, 0.5);
    assert_eq!(clamped.accuracy(), 1.0);
    assert_eq!(clamped.fluency(), 0.0);
    assert_eq!(clamped.cultural_adaptation(), 0.0);
    assert!(approx(clamped.overall(), 0.3 + 0.1));
}

/// Test rubric parsing with loosely formatted responses
#[test]
fn test_parseRubric_withLooseFormatting_shouldReadScores() {
    let response = "好的，下面是评分。\n\
        **deepl评分**\n准确性：0.85\n流畅性: 0.7/1.0\n\n\
        **DEEPSEEK评分**\n准确性: 0.6\n文化适应性: 0.95\n";

    let pair = parse_rubric(response, "DeepL", "DeepSeek");
    assert!(approx(pair.phrase.accuracy(), 0.85));
    assert!(approx(pair.phrase.fluency(), 0.7));
    assert!(approx(pair.phrase.cultural_adaptation(), 0.5));
    assert!(approx(pair.llm.accuracy(), 0.6));
    assert!(approx(pair.llm.cultural_adaptation(), 0.95));
    assert!(approx(pair.llm.completeness(), 0.5));
}

/// Test that a failed rubric call hands over to the feature table
#[tokio::test]
async fn test_scoreWithChain_withFailedRubric_shouldUseFeatureTable() {
    let features = FeatureExtractor::default().analyze("请把API文档发给我");
    let request = ScoringRequest {
        text: "请把API文档发给我",
        source_language: "zh",
        target_language: "en",
        phrase_engine: "deepl",
        phrase_translation: "Please send me the API documentation",
        llm_engine: "deepseek",
        llm_translation: "Send me the API docs, please",
        features: &features,
    };

    let completion = Arc::new(MockCompletion::failing());
    let chain: Vec<Box<dyn QualityScorer>> = vec![
        Box::new(RubricScorer::new(completion.clone())),
        Box::new(FeatureScorer),
    ];

    let (name, scores) = score_with_chain(&chain, &request).await.unwrap();
    assert_eq!(name, "features");
    assert_eq!(completion.call_count(), 1);
    // Technical and formal: phrase accuracy and fluency both get the bonus
    assert!(approx(scores.phrase.accuracy(), 0.8));
    assert!(approx(scores.phrase.fluency(), 0.9));
    assert!(scores.phrase.overall() > scores.llm.overall());
}
