/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::sync::Arc;
use translore::app_controller::Controller;
use translore::providers::mock::{MockCompletion, MockEngine};
use translore::translation::{EngineRole, SemanticVerdict};

use crate::common;

/// Test the controller initialization with a configuration
#[test]
fn test_withConfig_withValidConfig_shouldInitialize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(&temp_dir.path().join("knowledge_base"));

    let controller = Controller::with_config(config)?;
    assert!(controller.is_initialized());
    assert_eq!(controller.config().knowledge.top_k, 5);
    Ok(())
}

/// Test the full translate, back-translate, judge and learn workflow
#[tokio::test]
async fn test_translate_withMockEngines_shouldProduceFullReport() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let mut config = common::test_config(&dir);
    config.knowledge.learn = true;

    let phrase = MockEngine::fixed("deepl", "I took bus 11 to go shopping today");
    let completion = Arc::new(MockCompletion::replying("Today I walked to the mall"));
    let controller = Controller::with_engines(config, Arc::new(phrase.clone()), completion.clone())?;

    let report = controller.translate("今天坐11路去逛街").await?;

    // Neutral rubric scores, so the idiom decides
    assert!(report.succeeded() && !report.is_chunked());
    let decision = &report.chunks[0].decision;
    assert_eq!(decision.method, "deepseek_cultural");
    assert_eq!(decision.chosen, Some(EngineRole::Llm));
    assert_eq!(decision.text, "Today I walked to the mall");
    assert_eq!(decision.phrase_output.as_deref(), Some("I took bus 11 to go shopping today"));
    assert_eq!(report.translation, "Today I walked to the mall");

    // The phrase engine translates back
    assert_eq!(report.back_translation.as_deref(), Some("I took bus 11 to go shopping today"));
    assert_eq!(phrase.request_count(), 2);

    let drift = report.drift.expect("drift report");
    assert_eq!(drift.verdict, SemanticVerdict::Unknown);
    assert_eq!(drift.similarity, 0.0);
    assert!(!drift.is_consistent);

    // LLM translation, rubric and drift judge
    assert_eq!(completion.call_count(), 3);
    assert!(completion.prompts()[0].contains("【相关知识库】") || completion.prompts()[0].contains("【场景识别】"));

    let learned = report.learned.expect("learned candidate");
    assert_eq!(learned.phrase, "今天坐");
    let document = common::read_scene_document(&dir, "daily_life")?;
    assert!(document.expressions.iter().any(|e| e.source == "今天坐"));
    Ok(())
}

/// Test that a run where both engines fail stops after arbitration
#[tokio::test]
async fn test_translate_withFailingEngines_shouldSkipBackTranslation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let completion = Arc::new(MockCompletion::failing());
    let controller = Controller::with_engines(
        common::test_config(&dir),
        Arc::new(MockEngine::failing("deepl")),
        completion.clone(),
    )?;

    let report = controller.translate("你好").await?;
    assert!(!report.succeeded());
    assert_eq!(report.chunks[0].decision.method, "failed");
    assert!(report.translation.is_empty());
    assert!(report.back_translation.is_none());
    assert!(report.drift.is_none());
    assert!(report.learned.is_none());
    assert_eq!(completion.call_count(), 1);
    Ok(())
}

/// Test that a long text is arbitrated and back-translated chunk by chunk
#[tokio::test]
async fn test_translate_withLongText_shouldTranslateEachChunk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let mut config = common::test_config(&dir);
    config.chunking.max_chunk_chars = 10;
    config.chunking.overlap_chars = 0;

    let phrase = MockEngine::working("deepl");
    let completion = Arc::new(MockCompletion::replying("Nice weather"));
    let controller = Controller::with_engines(config, Arc::new(phrase.clone()), completion.clone())?;

    let report = controller.translate("今天天气很好。我们去公园散步吧").await?;

    assert!(report.is_chunked());
    let sources: Vec<&str> = report.chunks.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(sources, vec!["今天天气很好。", "我们去公园散步吧"]);

    // Neutral rubric scores and no markers, so the phrase engine wins each chunk
    assert!(report.chunks.iter().all(|c| c.decision.method == "deepl_default"));
    assert_eq!(report.translation, "[deepl:en] 今天天气很好。[deepl:en] 我们去公园散步吧");

    // The LLM translates each chunk back, the joined text is judged once
    assert!(report.chunks.iter().all(|c| c.back_translation.as_deref() == Some("Nice weather")));
    assert_eq!(report.back_translation.as_deref(), Some("Nice weather Nice weather"));
    assert!(report.drift.is_some());
    assert_eq!(phrase.request_count(), 2);
    assert_eq!(completion.call_count(), 7);
    Ok(())
}

/// Test prompt and scene inspection through the controller
#[test]
fn test_promptAndScenes_withFixtureKnowledge_shouldExposeRetrieval() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let controller = Controller::with_engines(
        common::test_config(&dir),
        Arc::new(MockEngine::working("deepl")),
        Arc::new(MockCompletion::failing()),
    )?;

    let enhanced = controller.prompt("这个接口返回的数据不对", true);
    assert!(enhanced.contains("【相关知识库】"));
    assert!(enhanced.contains("interface"));

    let plain = controller.prompt("这个接口返回的数据不对", false);
    assert!(!plain.contains("【相关知识库】"));
    assert!(plain.contains("翻译分析要求："));
    assert!(!plain.contains("混合语言"));
    assert!(plain.ends_with("原文：这个接口返回的数据不对"));

    let mixed = controller.prompt("我喜欢看NBA比赛", false);
    assert!(mixed.contains("注意：文本包含混合语言内容"));

    let report = controller.scenes("这个接口返回的数据不对");
    assert!(report.scenes.iter().any(|s| s.scene == "technology"));
    assert_eq!(report.expressions[0].expression.source, "接口");
    Ok(())
}

/// Test that disabling enhanced prompts sends the plain request
#[test]
fn test_prompt_withEnhancementDisabled_shouldBeBasic() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let mut config = common::test_config(&dir);
    config.knowledge.use_enhanced_prompts = false;
    let controller = Controller::with_engines(
        config,
        Arc::new(MockEngine::working("deepl")),
        Arc::new(MockCompletion::failing()),
    )?;

    let prompt = controller.prompt("这个接口返回的数据不对", true);
    assert!(prompt.contains("只返回翻译结果，不要添加任何解释"));
    assert!(!prompt.contains("【相关知识库】"));
    Ok(())
}
