/*!
 * Common test utilities for the translore test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use translore::app_config::Config;
use translore::knowledge::{ExpressionRecord, KnowledgeBase};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Routes log output through the test harness
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes a scene document as `<scene>.json` into `dir`
pub fn write_scene_document(dir: &Path, document: &KnowledgeBase) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", document.scene));
    fs::write(&path, serde_json::to_string_pretty(document)?)?;
    Ok(path)
}

/// Reads a scene document back from `dir`
pub fn read_scene_document(dir: &Path, scene: &str) -> Result<KnowledgeBase> {
    let content = fs::read_to_string(dir.join(format!("{}.json", scene)))?;
    Ok(serde_json::from_str(&content)?)
}

/// Daily-life document with two colloquial expressions
pub fn daily_life_knowledge() -> KnowledgeBase {
    let mut document = KnowledgeBase::empty("daily_life", "日常生活");
    document.keywords = vec!["打酱油".to_string(), "坐11路".to_string()];

    let mut soy_sauce = ExpressionRecord::new("打酱油");
    soy_sauce.meaning = Some("与自己无关，只是路过".to_string());
    soy_sauce.translations.insert("en", "just passing by");
    soy_sauce.hint = Some("不要直译为买酱油".to_string());
    soy_sauce.example_source = Some("我只是来打酱油的".to_string());
    soy_sauce.example_target = Some("I'm just passing by".to_string());

    let mut walking = ExpressionRecord::new("坐11路");
    walking.variants = vec!["11路公交".to_string()];
    walking.meaning = Some("步行".to_string());
    walking.translations.insert("en", "go on foot");

    document.expressions = vec![soy_sauce, walking];
    document.guidelines = vec![
        "保留口语色彩".to_string(),
        "俚语意译优先".to_string(),
    ];
    document
}

/// Technology document with one expression
pub fn technology_knowledge() -> KnowledgeBase {
    let mut document = KnowledgeBase::empty("technology", "科技");
    document.keywords = vec!["接口".to_string(), "API".to_string()];

    let mut api = ExpressionRecord::new("接口");
    api.variants = vec!["API".to_string()];
    api.meaning = Some("程序间的调用约定".to_string());
    api.translations.insert("en", "interface");

    document.expressions = vec![api];
    document.guidelines = vec!["术语保持一致".to_string(), "保留口语色彩".to_string()];
    document
}

/// Writes both fixture documents and returns the knowledge directory
pub fn knowledge_fixture(root: &Path) -> Result<PathBuf> {
    let dir = root.join("knowledge_base");
    write_scene_document(&dir, &daily_life_knowledge())?;
    write_scene_document(&dir, &technology_knowledge())?;
    Ok(dir)
}

/// Default configuration pointing at `knowledge_dir`, with learning off and auto-flush on
pub fn test_config(knowledge_dir: &Path) -> Config {
    let mut config = Config::default();
    config.knowledge.path = knowledge_dir.to_path_buf();
    config.engines.deepl.api_key = "test-key:fx".to_string();
    config.engines.deepseek.api_key = "test-key".to_string();
    config
}
