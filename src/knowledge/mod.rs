/*!
 * Scene-tagged knowledge base.
 *
 * This module contains the pieces of the retrieval pipeline:
 * - `store`: per-scene documents loaded from a directory
 * - `scenes`: keyword-based scene classification
 * - `retriever`: relevance-scored lookup of expression records
 * - `learner`: mining and persisting new expressions
 */

pub mod learner;
pub mod model;
pub mod retriever;
pub mod scenes;
pub mod similarity;
pub mod store;

pub use learner::KnowledgeLearner;
pub use model::{
    Candidate, ExpressionRecord, KnowledgeBase, Provenance, RetrievalResult, SceneDefinition,
    SceneMatch, TranslationMap,
};
pub use retriever::KnowledgeRetriever;
pub use scenes::{SceneCatalog, SceneClassifier};
pub use store::KnowledgeStore;
