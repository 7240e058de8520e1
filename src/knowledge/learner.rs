/*!
 * Learning new expressions from translation pairs.
 *
 * The learner looks for short CJK phrases in a source text that the primary
 * scene's knowledge base does not know yet, stages the best one, and merges
 * staged records into the scene documents on flush. Documents only ever grow:
 * records are appended and an existing `source` is never overwritten.
 */

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Local;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use super::model::{Candidate, ExpressionRecord, KnowledgeBase, Provenance};
use super::scenes::SceneClassifier;
use super::store::KnowledgeStore;
use crate::errors::KnowledgeError;
use crate::language_utils::resolve_language_code;

/// Runs of 2 to 6 CJK unified ideographs
static PHRASE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]{2,6}").expect("valid phrase regex"));

/// Meaning markers tried in order against a rationale
static MEANING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"含义[：:]\s*([^。]+)", r"意思[：:]\s*([^。]+)", r"指的是\s*([^。]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("valid meaning regex"))
        .collect()
});

/// Characters typical of colloquial expressions
const COLLOQUIAL_MARKERS: [char; 5] = ['儿', '子', '打', '坐', '走'];

const BASE_CONFIDENCE: f32 = 0.3;
const COLLOQUIAL_BONUS: f32 = 0.3;
const SHORT_PHRASE_BONUS: f32 = 0.2;
const SHORT_PHRASE_MAX_CHARS: usize = 4;

const DEFAULT_MEANING: &str = "待完善";
const DEFAULT_HINT: &str = "AI自动学习";
const DEFAULT_CONTEXT: &str = "待分类";
const DEFAULT_CULTURAL_NOTE: &str = "自动学习";
const DEFAULT_TRANSLATION_LANGUAGE: &str = "en";

/// Detects, stages and persists new expressions.
#[derive(Debug)]
pub struct KnowledgeLearner {
    store: Arc<KnowledgeStore>,
    classifier: Arc<SceneClassifier>,
    auto_flush: bool,

    /// Staged records by scene
    pending: Mutex<BTreeMap<String, Vec<ExpressionRecord>>>,
}

impl KnowledgeLearner {
    /// Create a learner writing into `store`.
    pub fn new(store: Arc<KnowledgeStore>, classifier: Arc<SceneClassifier>, auto_flush: bool) -> Self {
        Self {
            store,
            classifier,
            auto_flush,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Whether staging flushes immediately.
    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Propose the most likely new expression of `original`.
    ///
    /// Returns `None` when no scene is detected or every phrase is already known.
    pub fn observe(
        &self,
        original: &str,
        translated: &str,
        source_lang: &str,
        target_lang: &str,
        rationale: Option<&str>,
    ) -> Option<Candidate> {
        let scene = self.classifier.detect_scenes(original).into_iter().next()?.scene;

        let snapshot = self.store.snapshot();
        let known = snapshot.get(&scene);

        let mut best: Option<(String, f32)> = None;
        for phrase in PHRASE_PATTERN.find_iter(original).map(|m| m.as_str()) {
            if known.is_some_and(|kb| kb.knows_phrase(phrase)) {
                continue;
            }
            let confidence = phrase_confidence(phrase);
            if best.as_ref().is_none_or(|(_, c)| confidence > *c) {
                best = Some((phrase.to_string(), confidence));
            }
        }
        let (phrase, confidence) = best?;

        debug!("Candidate expression '{}' in scene {} ({:.2})", phrase, scene, confidence);

        let rationale = rationale.map(str::trim).filter(|r| !r.is_empty());
        Some(Candidate {
            phrase,
            scene,
            confidence,
            provenance: Provenance {
                original_text: original.to_string(),
                translated_text: translated.to_string(),
                source_language: source_lang.to_string(),
                target_language: target_lang.to_string(),
                detected_at: Local::now().to_rfc3339(),
            },
            meaning: rationale.and_then(extract_meaning),
            rationale: rationale.map(str::to_string),
        })
    }

    /// Observe a translation pair and stage the candidate, flushing if enabled.
    pub fn learn(
        &self,
        original: &str,
        translated: &str,
        source_lang: &str,
        target_lang: &str,
        rationale: Option<&str>,
    ) -> Option<Candidate> {
        let candidate = self.observe(original, translated, source_lang, target_lang, rationale)?;
        self.stage(&candidate.scene, candidate_record(&candidate));
        if self.auto_flush && !self.flush() {
            error!("Failed to persist learned expression '{}'", candidate.phrase);
        }
        Some(candidate)
    }

    /// Stage a hand-written record for a scene.
    ///
    /// Returns the flush result when auto-flush is enabled, otherwise `true`.
    pub fn stage_expression(&self, scene: &str, record: ExpressionRecord) -> bool {
        self.stage(scene, manual_record(record));
        if self.auto_flush {
            return self.flush();
        }
        true
    }

    /// Staged records by scene.
    pub fn pending(&self) -> BTreeMap<String, Vec<ExpressionRecord>> {
        self.pending.lock().clone()
    }

    /// Drop every staged record.
    pub fn clear_pending(&self) {
        self.pending.lock().clear();
    }

    /// Merge staged records into their scene documents.
    ///
    /// Scenes are written independently; a failing scene keeps its staged
    /// records. Returns `true` only when every scene was written.
    pub fn flush(&self) -> bool {
        let mut pending = self.pending.lock();
        if pending.is_empty() {
            return true;
        }

        let mut all_written = true;
        let mut written = Vec::new();

        for (scene, records) in pending.iter() {
            match self.merge_scene(scene, records) {
                Ok(added) => {
                    info!("Updated knowledge base {} ({} new expression(s))", scene, added);
                    written.push(scene.clone());
                }
                Err(e) => {
                    error!("Failed to update knowledge base {}: {}", scene, e);
                    all_written = false;
                }
            }
        }

        for scene in &written {
            pending.remove(scene);
        }
        drop(pending);

        if !written.is_empty() {
            self.store.reload();
        }
        all_written
    }

    fn stage(&self, scene: &str, record: ExpressionRecord) {
        self.pending
            .lock()
            .entry(scene.to_string())
            .or_default()
            .push(record);
    }

    /// Append unseen records to the on-disk document of a scene.
    fn merge_scene(&self, scene: &str, records: &[ExpressionRecord]) -> Result<usize, KnowledgeError> {
        let mut document = match self.store.read_document(scene)? {
            Some(document) => document,
            None => KnowledgeBase::empty(scene, self.classifier.display_name(scene)),
        };
        // The file stem decides where the document is written
        document.scene = scene.to_string();

        let mut existing: HashSet<String> =
            document.expressions.iter().map(|e| e.source.clone()).collect();
        let mut added = 0;

        for record in records {
            if !existing.insert(record.source.clone()) {
                debug!("Skipping known expression '{}' in {}", record.source, scene);
                continue;
            }
            if !document.keywords.contains(&record.source) {
                document.keywords.push(record.source.clone());
            }
            document.expressions.push(record.clone());
            added += 1;
        }

        self.store.write_document(&document)?;
        Ok(added)
    }
}

/// Heuristic likelihood that a phrase is a special expression.
pub fn phrase_confidence(phrase: &str) -> f32 {
    let mut confidence = BASE_CONFIDENCE;
    if phrase.chars().any(|c| COLLOQUIAL_MARKERS.contains(&c)) {
        confidence += COLLOQUIAL_BONUS;
    }
    if phrase.chars().count() <= SHORT_PHRASE_MAX_CHARS {
        confidence += SHORT_PHRASE_BONUS;
    }
    confidence.min(1.0)
}

/// Meaning stated in a free-text analysis, if any.
pub fn extract_meaning(rationale: &str) -> Option<String> {
    MEANING_PATTERNS.iter().find_map(|re| {
        re.captures(rationale)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|m| !m.is_empty())
    })
}

/// Record persisted for a learned candidate.
fn candidate_record(candidate: &Candidate) -> ExpressionRecord {
    let provenance = &candidate.provenance;
    let target_code = resolve_language_code(&provenance.target_language)
        .unwrap_or_else(|| DEFAULT_TRANSLATION_LANGUAGE.to_string());

    let mut record = ExpressionRecord::new(&candidate.phrase);
    record.meaning = Some(
        candidate
            .meaning
            .clone()
            .unwrap_or_else(|| DEFAULT_MEANING.to_string()),
    );
    record.translations.insert(&target_code, &provenance.translated_text);
    record.hint = Some(DEFAULT_HINT.to_string());
    record.context = Some(DEFAULT_CONTEXT.to_string());
    record.example_source = Some(provenance.original_text.clone());
    record.example_target = Some(provenance.translated_text.clone());
    record.cultural_note = Some(
        candidate
            .rationale
            .clone()
            .unwrap_or_else(|| DEFAULT_CULTURAL_NOTE.to_string()),
    );
    record.learned_at = Some(provenance.detected_at.clone());
    record.auto_learned = true;
    record
}

/// Fill the defaults of a hand-written record, keeping every given field.
fn manual_record(mut record: ExpressionRecord) -> ExpressionRecord {
    record.meaning.get_or_insert_with(|| DEFAULT_MEANING.to_string());
    record.hint.get_or_insert_with(|| DEFAULT_HINT.to_string());
    record.context.get_or_insert_with(|| DEFAULT_CONTEXT.to_string());
    record
        .cultural_note
        .get_or_insert_with(|| DEFAULT_CULTURAL_NOTE.to_string());
    record.learned_at.get_or_insert_with(|| Local::now().to_rfc3339());
    record
}
