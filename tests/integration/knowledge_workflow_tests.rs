/*!
 * Integration tests for learning into and retrieving from a knowledge directory
 */

use anyhow::Result;
use std::sync::Arc;
use translore::knowledge::{
    ExpressionRecord, KnowledgeLearner, KnowledgeRetriever, KnowledgeStore, SceneCatalog,
    SceneClassifier,
};
use translore::translation::PromptComposer;

use crate::common;

struct Pipeline {
    store: Arc<KnowledgeStore>,
    learner: KnowledgeLearner,
    retriever: Arc<KnowledgeRetriever>,
}

fn pipeline(dir: &std::path::Path, auto_flush: bool) -> Pipeline {
    let store = Arc::new(KnowledgeStore::open(dir));
    let classifier = Arc::new(SceneClassifier::new(SceneCatalog::default()));
    Pipeline {
        learner: KnowledgeLearner::new(store.clone(), classifier.clone(), auto_flush),
        retriever: Arc::new(KnowledgeRetriever::new(store.clone(), classifier)),
        store,
    }
}

/// Test that learning the same phrase twice persists a single record
#[test]
fn test_learn_twiceThenFlush_shouldPersistOneEntry() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let pipeline = pipeline(&dir, false);

    let original = "今天坐11路去逛街";
    let first = pipeline.learner.learn(original, "Walked to the mall today", "zh", "en", None).unwrap();
    let second = pipeline.learner.learn(original, "Walked to the mall today", "zh", "en", None).unwrap();
    assert_eq!(first.phrase, "今天坐");
    assert_eq!(first.scene, "daily_life");
    assert_eq!(second.phrase, first.phrase);
    assert_eq!(pipeline.learner.pending()["daily_life"].len(), 2);

    assert!(pipeline.learner.flush());
    assert!(pipeline.learner.pending().is_empty());

    let document = common::read_scene_document(&dir, "daily_life")?;
    let learned: Vec<_> = document.expressions.iter().filter(|e| e.source == "今天坐").collect();
    assert_eq!(learned.len(), 1);
    assert_eq!(document.expressions.len(), 3);

    let record = learned[0];
    assert!(record.auto_learned);
    assert_eq!(record.translations.get("en"), Some("Walked to the mall today"));
    assert_eq!(record.meaning.as_deref(), Some("待完善"));
    assert_eq!(record.hint.as_deref(), Some("AI自动学习"));
    assert_eq!(record.example_source.as_deref(), Some(original));
    assert!(document.keywords.contains(&"今天坐".to_string()));
    Ok(())
}

/// Test that flushed records are visible to retrieval after the reload
#[test]
fn test_flush_shouldReloadStoreForRetrieval() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let pipeline = pipeline(&dir, true);

    let rationale = "这是北京口语，意思：步行前往。";
    let candidate = pipeline
        .learner
        .learn("今天坐11路去逛街", "Walked to the mall today", "zh", "英语", Some(rationale))
        .unwrap();
    assert_eq!(candidate.meaning.as_deref(), Some("步行前往"));
    assert!(pipeline.learner.pending().is_empty());

    let snapshot = pipeline.store.get("daily_life").unwrap();
    let record = snapshot.expressions.iter().find(|e| e.source == "今天坐").unwrap();
    assert_eq!(record.meaning.as_deref(), Some("步行前往"));
    assert_eq!(record.cultural_note.as_deref(), Some(rationale));

    let results = pipeline.retriever.retrieve_default("今天坐公交去逛街");
    assert!(results.iter().any(|r| r.expression.source == "今天坐"));
    Ok(())
}

/// Test manual staging into a scene without a document
#[test]
fn test_stageExpression_withNewScene_shouldCreateDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let pipeline = pipeline(&dir, false);

    let mut record = ExpressionRecord::new("帽子戏法");
    record.translations.insert("en", "hat-trick");
    assert!(pipeline.learner.stage_expression("sports", record.clone()));
    assert!(pipeline.learner.stage_expression("sports", record));
    assert!(pipeline.learner.flush());

    let document = common::read_scene_document(&dir, "sports")?;
    assert_eq!(document.scene, "sports");
    assert_eq!(document.description, "体育");
    assert_eq!(document.expressions.len(), 1);
    assert!(!document.expressions[0].auto_learned);
    assert_eq!(document.expressions[0].context.as_deref(), Some("待分类"));

    let results = pipeline.retriever.retrieve_default("上半场他就完成了帽子戏法，比赛结束了");
    assert_eq!(results[0].expression.source, "帽子戏法");
    Ok(())
}

/// Test that sports text is never classified as technology
#[test]
fn test_detectScenes_withNbaText_shouldExcludeTechnology() {
    let classifier = SceneClassifier::new(SceneCatalog::default());
    let scenes = classifier.detect_scenes("我喜欢看NBA比赛");

    assert!(scenes.iter().all(|s| s.scene != "technology"));
    assert_eq!(scenes[0].scene, "sports");
}

/// Test a knowledge-enhanced prompt built from the fixture directory
#[test]
fn test_composer_withFixtureKnowledge_shouldIncludeExpressionAndGuidelines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let pipeline = pipeline(&dir, false);
    let composer = PromptComposer::new(pipeline.retriever.clone());

    let prompt = composer.build("我只是来打酱油的", "zh", "en", true, 5);
    assert!(prompt.contains("【场景识别】"));
    assert!(prompt.contains("日常生活"));
    assert!(prompt.contains("【相关知识库】"));
    assert!(prompt.contains("打酱油"));
    assert!(prompt.contains("just passing by"));
    assert!(prompt.contains("【翻译指导原则】"));
    assert!(prompt.contains("保留口语色彩"));
    assert!(prompt.ends_with("原文：我只是来打酱油的"));

    let knowledge = prompt.find("【相关知识库】").unwrap();
    let requirements = prompt.find("【翻译要求】").unwrap();
    assert!(knowledge < requirements);
    Ok(())
}
