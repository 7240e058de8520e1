use anyhow::{Context, Result, anyhow};
use futures::future::join;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::app_config::Config;
use crate::knowledge::{
    Candidate, KnowledgeLearner, KnowledgeRetriever, KnowledgeStore, RetrievalResult, SceneCatalog,
    SceneClassifier, SceneMatch,
};
use crate::providers::deepl::DeepL;
use crate::providers::deepseek::DeepSeek;
use crate::providers::retry::RetryPolicy;
use crate::providers::{Provider, TextCompletion, TranslationEngine};
use crate::translation::engines::DEEPSEEK_ENGINE_NAME;
use crate::translation::quality::{FeatureScorer, QualityScorer, RubricScorer};
use crate::translation::{
    ArbitrationDecision, DriftJudge, DriftReport, LlmTranslationEngine, PromptComposer, PromptMode,
    TextChunker, TranslationArbitrator, join_chunks,
};

// @module: Application controller for the translate, back-translate and judge workflow

/// Arbitration and back-translation of one chunk of the input
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    /// Chunk of the source text
    pub source: String,
    /// Arbitration outcome for the chunk
    pub decision: ArbitrationDecision,
    /// Back-translation of the chosen text by the other engine
    pub back_translation: Option<String>,
}

/// Outcome of one run of the translation workflow
#[derive(Debug, Clone, Serialize)]
pub struct TranslationReport {
    /// Text that was translated
    pub source_text: String,
    /// Chosen translations of the translated chunks, joined
    pub translation: String,
    /// One entry per chunk; a single entry unless the text was split
    pub chunks: Vec<ChunkReport>,
    /// Joined back-translations of the chunks
    pub back_translation: Option<String>,
    /// Drift between the source text and its back-translation
    pub drift: Option<DriftReport>,
    /// Expression learned from the pair, if learning is enabled
    pub learned: Option<Candidate>,
}

impl TranslationReport {
    /// Whether at least one chunk was translated.
    pub fn succeeded(&self) -> bool {
        self.chunks.iter().any(|c| c.decision.succeeded())
    }

    /// Whether the text was split into several chunks.
    pub fn is_chunked(&self) -> bool {
        self.chunks.len() > 1
    }
}

/// Detected scenes and retrieved knowledge for a text
#[derive(Debug, Clone)]
pub struct SceneReport {
    /// Detected scenes, best first
    pub scenes: Vec<SceneMatch>,
    /// Retrieved expression records, most relevant first
    pub expressions: Vec<RetrievalResult>,
}

/// Remote clients kept for connection checks
#[derive(Debug)]
struct RemoteClients {
    deepl: Arc<DeepL>,
    deepseek: Arc<DeepSeek>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    retriever: Arc<KnowledgeRetriever>,
    composer: PromptComposer,
    chunker: TextChunker,
    arbitrator: TranslationArbitrator,
    drift: DriftJudge,
    learner: KnowledgeLearner,
    remotes: Option<RemoteClients>,
}

impl Controller {
    // @method: Create a new controller with the remote engines described by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let retry = RetryPolicy::from_config(&config.retry);
        let deepl = Arc::new(DeepL::new(&config.engines.deepl, retry));
        let deepseek = Arc::new(DeepSeek::new(&config.engines.deepseek, retry));

        let mut controller = Self::with_engines(config, deepl.clone(), deepseek.clone())?;
        controller.remotes = Some(RemoteClients { deepl, deepseek });
        Ok(controller)
    }

    /// Create a controller over injected engines.
    ///
    /// `phrase_engine` is the phrase-based engine; `completion` backs the LLM
    /// engine, the rubric scorer and the drift judge.
    pub fn with_engines(
        config: Config,
        phrase_engine: Arc<dyn TranslationEngine>,
        completion: Arc<dyn TextCompletion>,
    ) -> Result<Self> {
        let knowledge = &config.knowledge;
        std::fs::create_dir_all(&knowledge.path).with_context(|| {
            format!("Failed to create knowledge directory: {}", knowledge.path.display())
        })?;

        let store = Arc::new(KnowledgeStore::open(&knowledge.path));
        let classifier = Arc::new(SceneClassifier::new(SceneCatalog::from_override(knowledge.scenes.clone())));
        let retriever = Arc::new(KnowledgeRetriever::new(store.clone(), classifier.clone()));
        let composer = PromptComposer::new(retriever.clone()).with_min_confidence(knowledge.min_confidence);
        debug!("Knowledge store loaded with {} scene(s)", store.scenes().len());

        let prompt_mode = PromptMode::from_flags(knowledge.use_enhanced_prompts, knowledge.use_rag);
        let llm_engine = Arc::new(LlmTranslationEngine::new(
            DEEPSEEK_ENGINE_NAME,
            completion.clone(),
            composer.clone(),
            prompt_mode,
            knowledge.top_k,
        ));
        let scorers: Vec<Box<dyn QualityScorer>> = vec![
            Box::new(RubricScorer::new(completion.clone())),
            Box::new(FeatureScorer),
        ];
        let arbitrator = TranslationArbitrator::new(phrase_engine, llm_engine).with_scorers(scorers);
        let drift = DriftJudge::new(completion, config.drift.similarity_threshold);
        let learner = KnowledgeLearner::new(store, classifier, knowledge.auto_flush);
        let chunker = TextChunker::new(config.chunking.max_chunk_chars, config.chunking.overlap_chars);

        Ok(Self {
            config,
            retriever,
            composer,
            chunker,
            arbitrator,
            drift,
            learner,
            remotes: None,
        })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// The configuration the controller was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The learner writing into the knowledge store
    pub fn learner(&self) -> &KnowledgeLearner {
        &self.learner
    }

    /// Translate, back-translate with the other engine and judge the drift.
    ///
    /// Long texts are arbitrated and back-translated chunk by chunk; the drift
    /// is judged on the whole text against the joined back-translations.
    pub async fn translate(&self, text: &str) -> Result<TranslationReport> {
        if text.trim().is_empty() {
            return Err(anyhow!("Nothing to translate: the input text is empty"));
        }
        let source = self.config.source_language.as_str();
        let target = self.config.target_language.as_str();

        let pieces = self.chunker.split(text);
        if pieces.len() > 1 {
            info!("Long text ({} chars) split into {} chunks", text.chars().count(), pieces.len());
        }

        let mut chunks = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.into_iter().enumerate() {
            let decision = self.arbitrator.arbitrate(&piece, source, target).await;
            let back_translation = if decision.succeeded() {
                debug!("Chunk {} translated with {}", index + 1, decision.method);
                self.arbitrator.back_translate(&decision, source, target).await
            } else {
                warn!("Both engines failed to translate chunk {}", index + 1);
                None
            };
            chunks.push(ChunkReport {
                source: piece,
                decision,
                back_translation,
            });
        }

        let translated: Vec<&str> = chunks
            .iter()
            .filter(|c| c.decision.succeeded())
            .map(|c| c.decision.text.as_str())
            .collect();
        if translated.is_empty() {
            return Ok(TranslationReport {
                source_text: text.to_string(),
                translation: String::new(),
                chunks,
                back_translation: None,
                drift: None,
                learned: None,
            });
        }
        let translation = join_chunks(&translated);

        let backs: Vec<&str> = chunks.iter().filter_map(|c| c.back_translation.as_deref()).collect();
        let back_translation = (!backs.is_empty()).then(|| join_chunks(&backs));
        let drift = match back_translation.as_deref() {
            Some(back) => Some(self.drift.judge(text, back, source).await),
            None => {
                warn!("Back-translation failed, skipping the drift check");
                None
            }
        };

        let learned = if self.config.knowledge.learn {
            self.learner.learn(text, &translation, source, target, None)
        } else {
            None
        };

        if let Some(report) = &drift {
            info!(
                "Drift: similarity {:.2} ({}), threshold {:.2}",
                report.similarity, report.level, report.threshold
            );
        }

        Ok(TranslationReport {
            source_text: text.to_string(),
            translation,
            chunks,
            back_translation,
            drift,
            learned,
        })
    }

    /// Prompt the LLM engine would receive for `text`, with retrieval on or off.
    pub fn prompt(&self, text: &str, use_rag: bool) -> String {
        let knowledge = &self.config.knowledge;
        PromptMode::from_flags(knowledge.use_enhanced_prompts, use_rag).compose(
            &self.composer,
            text,
            &self.config.source_language,
            &self.config.target_language,
            knowledge.top_k,
        )
    }

    /// Scenes detected in `text` and the knowledge retrieved for it.
    pub fn scenes(&self, text: &str) -> SceneReport {
        let knowledge = &self.config.knowledge;
        SceneReport {
            scenes: self.retriever.classifier().detect_scenes(text),
            expressions: self
                .retriever
                .retrieve(text, None, knowledge.top_k, knowledge.min_confidence),
        }
    }

    /// Test the connection to both remote services.
    pub async fn check_connections(&self) -> Result<()> {
        let remotes = self
            .remotes
            .as_ref()
            .ok_or_else(|| anyhow!("Controller was built without remote engines"))?;

        let (deepl, deepseek) = join(remotes.deepl.test_connection(), remotes.deepseek.test_connection()).await;
        deepl.context("DeepL connection test failed")?;
        deepseek.context("DeepSeek connection test failed")?;

        info!("Both translation engines are reachable");
        Ok(())
    }
}
