/*!
 * Scene classification for source texts.
 *
 * A scene is detected when any of its keywords occurs in the text. The score
 * combines the fraction of matched keywords with the scene weight, and only
 * scenes above a fixed floor are reported.
 */

use super::model::{SceneDefinition, SceneMatch};

/// Scenes scoring below this are never reported
pub const MIN_SCENE_CONFIDENCE: f32 = 0.15;

/// Ordered collection of scene definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCatalog {
    scenes: Vec<SceneDefinition>,
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self::new(vec![
            SceneDefinition::new(
                "daily_life",
                "日常生活",
                &[
                    "三尖儿", "仨尖儿", "坐11路", "打酱油", "走亲戚", "遛弯", "打牌", "买菜",
                    "做饭", "逛街", "聊天", "唠嗑", "串门",
                ],
            ),
            SceneDefinition::new(
                "business",
                "商务",
                &[
                    "落地", "闭环", "赋能", "抓手", "痛点", "打法", "布局", "赛道", "盈利",
                    "商业模式", "战略", "执行", "KPI", "ROI",
                ],
            ),
            SceneDefinition::new(
                "technology",
                "科技",
                &[
                    "接口", "API", "前端", "后端", "数据库", "部署", "上线", "代码", "算法",
                    "架构", "系统", "服务器", "客户端", "编程",
                ],
            ),
            SceneDefinition::new(
                "sports",
                "体育",
                &["比赛", "运动员", "得分", "进球", "训练", "教练", "球队", "冠军"],
            ),
            SceneDefinition::new(
                "medical",
                "医疗",
                &["患者", "诊断", "治疗", "药物", "症状", "医生", "医院", "手术"],
            ),
            SceneDefinition::new(
                "academic",
                "学术",
                &["研究", "论文", "实验", "数据", "分析", "结论", "方法", "理论"],
            ),
        ])
    }
}

impl SceneCatalog {
    /// Create a catalog from scene definitions, keeping their order.
    pub fn new(scenes: Vec<SceneDefinition>) -> Self {
        Self { scenes }
    }

    /// Catalog from an optional override, falling back to the built-in scenes.
    pub fn from_override(scenes: Option<Vec<SceneDefinition>>) -> Self {
        match scenes {
            Some(scenes) if !scenes.is_empty() => Self::new(scenes),
            _ => Self::default(),
        }
    }

    /// All scenes in catalog order.
    pub fn scenes(&self) -> &[SceneDefinition] {
        &self.scenes
    }

    /// Look up a scene by id.
    pub fn get(&self, scene_id: &str) -> Option<&SceneDefinition> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    /// Display name of a scene, or the id itself when unknown.
    pub fn display_name<'a>(&'a self, scene_id: &'a str) -> &'a str {
        match self.get(scene_id) {
            Some(scene) if !scene.display_name.is_empty() => &scene.display_name,
            _ => scene_id,
        }
    }
}

/// Keyword-based scene classifier.
#[derive(Debug, Clone, Default)]
pub struct SceneClassifier {
    catalog: SceneCatalog,
}

impl SceneClassifier {
    /// Create a classifier over the given catalog.
    pub fn new(catalog: SceneCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog used by this classifier.
    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    /// Display name of a scene, or the id itself when unknown.
    pub fn display_name<'a>(&'a self, scene_id: &'a str) -> &'a str {
        self.catalog.display_name(scene_id)
    }

    /// Detect the scenes of a text, highest confidence first.
    ///
    /// Scenes with equal confidence keep catalog order.
    pub fn detect_scenes(&self, text: &str) -> Vec<SceneMatch> {
        let mut matches: Vec<SceneMatch> = self
            .catalog
            .scenes()
            .iter()
            .filter_map(|scene| {
                let confidence = score_scene(scene, text)?;
                (confidence >= MIN_SCENE_CONFIDENCE).then(|| SceneMatch {
                    scene: scene.id.clone(),
                    confidence,
                })
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches
    }

    /// Ids of detected scenes whose confidence reaches `min_confidence`.
    pub fn detect_scene_ids(&self, text: &str, min_confidence: f32) -> Vec<String> {
        self.detect_scenes(text)
            .into_iter()
            .filter(|m| m.confidence >= min_confidence)
            .map(|m| m.scene)
            .collect()
    }
}

/// Score a single scene, `None` when no keyword occurs in the text.
fn score_scene(scene: &SceneDefinition, text: &str) -> Option<f32> {
    if scene.keywords.is_empty() {
        return None;
    }

    let hits = scene
        .keywords
        .iter()
        .filter(|k| !k.is_empty() && text.contains(k.as_str()))
        .count();
    if hits == 0 {
        return None;
    }

    let match_ratio = hits as f32 / scene.keywords.len() as f32;
    let avg_weight = (hits as f32 * scene.weight) / hits as f32;
    let score = match_ratio * 0.8 + (avg_weight / 10.0).min(0.2);
    Some(score.clamp(0.0, 1.0))
}
