/*!
 * Tests for the knowledge store, scene classification and retrieval
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use translore::knowledge::{KnowledgeRetriever, KnowledgeStore, SceneCatalog, SceneClassifier};

use crate::common;

fn retriever_over(dir: &std::path::Path) -> KnowledgeRetriever {
    let store = Arc::new(KnowledgeStore::open(dir));
    let classifier = Arc::new(SceneClassifier::new(SceneCatalog::default()));
    KnowledgeRetriever::new(store, classifier)
}

/// Test loading every scene document of a directory
#[test]
fn test_open_withFixtureDirectory_shouldLoadEveryScene() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    fs::write(dir.join("broken.json"), "{ not json")?;
    fs::write(dir.join("notes.txt"), "ignored")?;

    let store = KnowledgeStore::open(&dir);
    let scenes = store.scenes();
    assert!(scenes.contains(&"daily_life".to_string()));
    assert!(scenes.contains(&"technology".to_string()));
    assert!(!scenes.contains(&"broken".to_string()));

    let daily_life = store.get("daily_life").unwrap();
    assert_eq!(daily_life.expressions.len(), 2);
    assert_eq!(daily_life.expressions[0].translations.get("en"), Some("just passing by"));
    Ok(())
}

/// Test that a colloquial expression is retrieved for its scene
#[test]
fn test_retrieve_withColloquialText_shouldReturnMatchingExpression() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let retriever = retriever_over(&dir);

    let results = retriever.retrieve_default("我只是来打酱油的");
    assert!(!results.is_empty());
    assert_eq!(results[0].expression.source, "打酱油");
    assert_eq!(results[0].scene, "daily_life");
    assert_eq!(results[0].scene_name, "日常生活");
    Ok(())
}

/// Test the bounds of retrieval results over a range of inputs
#[test]
fn test_retrieve_withVariousTexts_shouldRespectTopKAndFloor() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let retriever = retriever_over(&dir);

    let texts = [
        "我只是来打酱油的",
        "今天坐11路去上班，顺便打酱油",
        "API接口返回JSON数据",
        "这个接口的代码需要部署到服务器",
        "我喜欢看NBA比赛",
        "",
    ];
    for text in texts {
        for (top_k, min_confidence) in [(1, 0.15), (5, 0.15), (5, 0.5), (10, 0.0)] {
            let results = retriever.retrieve(text, None, top_k, min_confidence);
            assert!(results.len() <= top_k, "too many results for {:?}", text);
            for pair in results.windows(2) {
                assert!(pair[0].relevance >= pair[1].relevance);
            }
            for result in &results {
                assert!(result.relevance >= min_confidence);
                assert!((0.0..=1.0).contains(&result.relevance));
            }
        }
    }
    Ok(())
}

/// Test that guideline collection is stable and de-duplicated
#[test]
fn test_getTranslationGuidelines_shouldBeIdempotentAndOrdered() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = common::knowledge_fixture(temp_dir.path())?;
    let retriever = retriever_over(&dir);

    let scenes = vec!["daily_life".to_string(), "technology".to_string(), "sports".to_string()];
    let first = retriever.get_translation_guidelines(&scenes);
    let second = retriever.get_translation_guidelines(&scenes);

    assert_eq!(first, vec!["保留口语色彩", "俚语意译优先", "术语保持一致"]);
    assert_eq!(first, second);
    Ok(())
}

/// Test that scene confidences are sorted and above the floor
#[test]
fn test_detectScenes_withVariousTexts_shouldBeSortedAboveFloor() {
    let classifier = SceneClassifier::new(SceneCatalog::default());
    let texts = [
        "患者在医院接受手术治疗",
        "这篇论文的研究方法和实验数据",
        "我们的商业模式需要一个抓手来形成闭环",
        "这个接口的代码需要部署到服务器",
        "随便说点什么",
    ];

    for text in texts {
        let scenes = classifier.detect_scenes(text);
        for scene in &scenes {
            assert!(scene.confidence >= 0.15);
        }
        for pair in scenes.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
    assert!(classifier.detect_scenes("随便说点什么").is_empty());
}
