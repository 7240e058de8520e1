/*!
 * Prompt templates for translation, rubric scoring and drift judging.
 *
 * Templates use `{placeholder}` variables filled by `PromptTemplate::render`
 * in a single pass, so inserted values are never scanned for placeholders.
 * The fixed blocks of the knowledge-enhanced prompt live here as constants so
 * the composer only decides which blocks appear.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A `{name}` placeholder
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder pattern"));

/// Heading of the detected scenes block
pub const SCENE_HEADING: &str = "【场景识别】\n";
/// Heading of the retrieved knowledge block
pub const KNOWLEDGE_HEADING: &str = "【相关知识库】\n以下是与文本相关的场景知识，请参考：\n\n";
/// Heading of the guidelines block
pub const GUIDELINES_HEADING: &str = "【翻译指导原则】\n";
/// Heading of the requirements block
pub const REQUIREMENTS_HEADING: &str = "【翻译要求】\n";

/// Fixed requirements of a knowledge-enhanced translation
pub const REQUIREMENTS: [&str; 5] = [
    "仔细分析文本中的场景特定表达，参考上述知识库提供的翻译指导",
    "对于文化特定表达，要理解其实际含义而非字面意思",
    "确保翻译准确且符合目标语言习惯",
    "保持原文的语调和情感",
    "只返回翻译结果，不要添加解释",
];

/// Heading of the analysis block of the prompt used without retrieval
pub const ANALYSIS_HEADING: &str = "翻译分析要求：\n";

/// What the LLM should analyse before translating when no knowledge is retrieved
pub const ANALYSIS_REQUIREMENTS: [&str; 4] = [
    "仔细分析文本中的文化特定表达、习语、网络用语等",
    "理解字面意义与实际意义的差异",
    "识别可能的文化背景和语境",
    "考虑目标语言的文化适应性",
];

/// Heading of the principles block of the prompt used without retrieval
pub const PRINCIPLES_HEADING: &str = "翻译原则：\n";

/// Translation principles when no knowledge is retrieved
pub const TRANSLATION_PRINCIPLES: [&str; 4] = [
    "保持原文的语调和情感",
    "确保翻译自然流畅",
    "对于文化特定表达，提供准确且符合目标语言习惯的翻译",
    "只返回翻译结果，不要添加解释",
];

/// Notice inserted before the requirements for mixed-language texts
pub const MIXED_LANGUAGE_NOTICE: &str = "\n注意：文本包含混合语言内容，请按以下要求处理：\n\
1. 保持英语专有名词、缩写、品牌名等不翻译\n\
2. 确保翻译自然流畅，符合目标语言习惯\n\
3. 对于技术术语，优先使用目标语言的标准译法\n\n";

/// A prompt template with `{name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: &'static str,
}

impl PromptTemplate {
    /// Opening instruction of every translation prompt.
    pub const TRANSLATION_HEADER: &'static str = "请将以下{source_language}文本翻译成{target_language}。\n\n";

    /// Plain translation request.
    pub const BASIC_TRANSLATION: &'static str =
        "请将以下{source_language}文本翻译成{target_language}，只返回翻译结果，不要添加任何解释：\n\n{text}";

    /// Rubric comparison of two candidate translations.
    pub const QUALITY_RUBRIC: &'static str = r#"请对以下两个翻译进行详细的质量评估：

原文 ({source_language}): {text}

{first_engine}翻译: {first_translation}
{second_engine}翻译: {second_translation}

文本特征: {features}

请从以下维度分别评分（0.0-1.0）：
1. 准确性 - 是否准确传达原文含义
2. 流畅性 - 是否自然流畅
3. 文化适应性 - 是否符合目标语言文化
4. 完整性 - 是否完整传达所有信息

请按以下格式回答：
{first_engine}评分:
- 准确性: [分数]
- 流畅性: [分数]
- 文化适应性: [分数]
- 完整性: [分数]

{second_engine}评分:
- 准确性: [分数]
- 流畅性: [分数]
- 文化适应性: [分数]
- 完整性: [分数]

推荐引擎: [{first_engine}/{second_engine}/混合]
推荐理由: [详细说明]"#;

    /// Semantic similarity of an original and its back-translation.
    pub const SEMANTIC_DRIFT: &'static str = r#"请分析以下两个{source_language}文本的语义相似度：

文本1: "{original}"
文本2: "{back_translated}"

请从语义角度分析这两个文本是否表达相同的含义，忽略：
- 量词差异（如"一只"vs"一条"）
- 标点符号差异
- 语序轻微变化
- 同义词替换
- 表达方式差异

请按以下格式回答：
相似度分数: [0.0-1.0之间的数字]
语义含义: [identical/similar/different]
分析说明: [详细说明为什么给出这个分数]
置信度: [0.0-1.0之间的数字]

示例：
相似度分数: 0.95
语义含义: identical
分析说明: 两个文本表达完全相同的含义，只是量词从"一只"变为"一条"，在中文中都是正确的表达方式
置信度: 0.9"#;

    /// Create a new prompt template.
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Render the template, replacing each `{name}` with its value.
    ///
    /// Unknown placeholders are left as they are.
    pub fn render(&self, variables: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(self.template, |caps: &Captures<'_>| {
                variables
                    .iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
            })
            .into_owned()
    }
}

/// Opening instruction for a language pair.
pub fn translation_header(source_language: &str, target_language: &str) -> String {
    PromptTemplate::new(PromptTemplate::TRANSLATION_HEADER)
        .render(&[("source_language", source_language), ("target_language", target_language)])
}

/// Plain "translate and only return the translation" prompt.
pub fn basic_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    PromptTemplate::new(PromptTemplate::BASIC_TRANSLATION).render(&[
        ("source_language", source_language),
        ("target_language", target_language),
        ("text", text),
    ])
}

/// Requirements block with its heading and trailing blank line.
pub fn requirements_block() -> String {
    numbered_block(REQUIREMENTS_HEADING, &REQUIREMENTS)
}

/// Heading followed by `1. item` lines and a blank line.
pub fn numbered_block(heading: &str, items: &[&str]) -> String {
    let mut block = heading.to_string();
    for (i, item) in items.iter().enumerate() {
        block.push_str(&format!("{}. {}\n", i + 1, item));
    }
    block.push('\n');
    block
}
