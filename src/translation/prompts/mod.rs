/*!
 * Prompt engineering for translation.
 *
 * This module provides:
 * - Prompt templates for translation, rubric scoring and drift judging
 * - Knowledge-enhanced prompt composition based on detected scenes
 */

pub mod composer;
pub mod templates;

// Re-export main types
pub use composer::PromptComposer;
pub use templates::{PromptTemplate, basic_prompt};
