/*!
 * Integration tests for engine arbitration with mock engines
 */

use rand::Rng;
use std::sync::Arc;
use translore::providers::mock::{MockCompletion, MockEngine};
use translore::translation::quality::{FeatureScorer, QualityScorer, RubricScorer};
use translore::translation::{EngineRole, TranslationArbitrator};

fn rubric_response(phrase: f32, llm: f32) -> String {
    format!(
        "DeepL评分:\n- 准确性: {p:.2}\n- 流畅性: {p:.2}\n- 文化适应性: {p:.2}\n- 完整性: {p:.2}\n\n\
         DeepSeek评分:\n- 准确性: {l:.2}\n- 流畅性: {l:.2}\n- 文化适应性: {l:.2}\n- 完整性: {l:.2}\n",
        p = phrase,
        l = llm
    )
}

fn with_rubric(phrase: MockEngine, llm: MockEngine, completion: Arc<MockCompletion>) -> TranslationArbitrator {
    let scorers: Vec<Box<dyn QualityScorer>> = vec![
        Box::new(RubricScorer::new(completion)),
        Box::new(FeatureScorer),
    ];
    TranslationArbitrator::new(Arc::new(phrase), Arc::new(llm)).with_scorers(scorers)
}

/// Test that both engines are called concurrently
#[tokio::test]
async fn test_arbitrate_withSlowEngines_shouldCallThemConcurrently() {
    let engines = TranslationArbitrator::new(
        Arc::new(MockEngine::slow("deepl", 200)),
        Arc::new(MockEngine::slow("deepseek", 200)),
    );

    let started = std::time::Instant::now();
    let decision = engines.arbitrate("你好", "zh", "en").await;

    assert!(decision.succeeded());
    assert!(started.elapsed() < std::time::Duration::from_millis(390));
}

/// Test that a single working engine wins on either side
#[tokio::test]
async fn test_arbitrate_withOneWorkingEngine_shouldUseItSymmetrically() {
    let engines = TranslationArbitrator::new(
        Arc::new(MockEngine::working("deepl")),
        Arc::new(MockEngine::failing("deepseek")),
    );
    let decision = engines.arbitrate("你好", "zh", "en").await;
    assert_eq!(decision.text, "[deepl:en] 你好");
    assert_eq!(decision.method, "deepl_only");
    assert_eq!(decision.confidence, 0.8);
    assert_eq!(decision.chosen, Some(EngineRole::Phrase));

    let engines = TranslationArbitrator::new(
        Arc::new(MockEngine::failing("deepl")),
        Arc::new(MockEngine::working("deepseek")),
    );
    let decision = engines.arbitrate("你好", "zh", "en").await;
    assert_eq!(decision.text, "[deepseek:en] 你好");
    assert_eq!(decision.method, "deepseek_only");
    assert_eq!(decision.confidence, 0.8);
    assert_eq!(decision.chosen, Some(EngineRole::Llm));
}

/// Test that two failing engines give the failed decision
#[tokio::test]
async fn test_arbitrate_withBothEnginesFailing_shouldReturnFailed() {
    let engines = TranslationArbitrator::new(
        Arc::new(MockEngine::failing("deepl")),
        Arc::new(MockEngine::empty("deepseek")),
    );
    let decision = engines.arbitrate("你好", "zh", "en").await;

    assert_eq!(decision.text, "");
    assert_eq!(decision.method, "failed");
    assert_eq!(decision.confidence, 0.0);
    assert!(!decision.succeeded());
    assert!(engines.back_translate(&decision, "zh", "en").await.is_none());
}

/// Test that plain short text at tied feature scores goes to the phrase engine
#[tokio::test]
async fn test_arbitrate_withPlainShortText_shouldDefaultToPhraseEngine() {
    let engines = TranslationArbitrator::new(
        Arc::new(MockEngine::working("deepl")),
        Arc::new(MockEngine::working("deepseek")),
    );
    let decision = engines.arbitrate("今天天气不错", "zh", "en").await;

    assert_eq!(decision.method, "deepl_default");
    assert!((decision.confidence - 0.7).abs() < 1e-5);
    assert_eq!(decision.text, "[deepl:en] 今天天气不错");
}

/// Test that the higher rubric score wins whenever the gap is decisive
#[tokio::test]
async fn test_arbitrate_withRandomDecisiveRubricScores_shouldPickHigherScore() {
    let mut rng = rand::rng();
    let mut checked = 0;

    while checked < 25 {
        let phrase: f32 = rng.random_range(0.0..=1.0);
        let llm: f32 = rng.random_range(0.0..=1.0);
        // Keep clear of the boundary after two-decimal rounding
        if (phrase - llm).abs() <= 0.25 {
            continue;
        }
        checked += 1;

        let completion = Arc::new(MockCompletion::replying(rubric_response(phrase, llm)));
        let engines = with_rubric(
            MockEngine::working("deepl"),
            MockEngine::working("deepseek"),
            completion,
        );
        // Cultural and technical markers must not matter past the gap
        let decision = engines.arbitrate("躺平的程序员写API代码", "zh", "en").await;

        if phrase > llm {
            assert_eq!(decision.method, "deepl_selected");
            assert_eq!(decision.chosen, Some(EngineRole::Phrase));
        } else {
            assert_eq!(decision.method, "deepseek_selected");
            assert_eq!(decision.chosen, Some(EngineRole::Llm));
        }
        let scores = decision.scores.unwrap();
        let expected = scores.phrase.overall().max(scores.llm.overall());
        assert!((decision.confidence - expected).abs() < 1e-5);
    }
}

/// Test the tie-break when the rubric finds no decisive gap
#[tokio::test]
async fn test_arbitrate_withCloseRubricScores_shouldApplyTieBreak() {
    let completion = Arc::new(MockCompletion::replying(rubric_response(0.8, 0.75)));
    let engines = with_rubric(
        MockEngine::working("deepl"),
        MockEngine::working("deepseek"),
        completion.clone(),
    );

    let decision = engines.arbitrate("他最近躺平了", "zh", "en").await;
    assert_eq!(decision.method, "deepseek_cultural");
    assert_eq!(decision.confidence, 0.9);
    assert_eq!(completion.call_count(), 1);
    assert!(completion.prompts()[0].contains("他最近躺平了"));
}

/// Test back-translation with the engine that lost
#[tokio::test]
async fn test_backTranslate_afterArbitration_shouldUseTheOtherEngine() {
    let phrase = MockEngine::working("deepl");
    let llm = MockEngine::working("deepseek");
    let engines = TranslationArbitrator::new(Arc::new(phrase.clone()), Arc::new(llm.clone()));

    let decision = engines.arbitrate("今天天气不错", "zh", "en").await;
    assert_eq!(decision.chosen, Some(EngineRole::Phrase));

    let back = engines.back_translate(&decision, "zh", "en").await;
    assert_eq!(back.as_deref(), Some("[deepseek:zh] [deepl:en] 今天天气不错"));
    assert_eq!(phrase.request_count(), 1);
    assert_eq!(llm.request_count(), 2);
}
