use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The workflow accepts languages as ISO 639-1/639-2 codes, English names
/// ("Vietnamese") or Chinese names ("越南语"). Everything is resolved to ISO 639-1
/// where possible so knowledge records (`translation_<code>`) and provider codes
/// can be looked up uniformly.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// Languages of the translation workflow: (ISO 639-1, English name, Chinese name)
const WORKFLOW_LANGUAGES: &[(&str, &str, &str)] = &[
    ("zh", "Chinese", "中文"),
    ("en", "English", "英语"),
    ("vi", "Vietnamese", "越南语"),
    ("ms", "Malay", "马来语"),
    ("th", "Thai", "泰语"),
    ("id", "Indonesian", "印尼语"),
    ("tl", "Filipino", "菲律宾语"),
    ("my", "Burmese", "缅甸语"),
    ("lo", "Lao", "老挝语"),
    ("km", "Khmer", "柬埔寨语"),
];

/// Map an ISO 639-2/B code to its ISO 639-2/T counterpart
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Resolve a language given as code, English name or Chinese name to its
/// ISO 639-1 code (or ISO 639-2/T when no 2-letter code exists)
pub fn resolve_language_code(language: &str) -> Option<String> {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((code, _, _)) = WORKFLOW_LANGUAGES
        .iter()
        .find(|(_, english, chinese)| english.eq_ignore_ascii_case(trimmed) || *chinese == trimmed)
    {
        return Some((*code).to_string());
    }

    if let Ok(part2t) = normalize_to_part2t(trimmed) {
        let lang = Language::from_639_3(&part2t)?;
        return Some(lang.to_639_1().map(str::to_string).unwrap_or(part2t));
    }

    Language::from_name(trimmed)
        .map(|lang| lang.to_639_1().map(str::to_string).unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language descriptions (codes or names) represent the same language
pub fn language_codes_match(language1: &str, language2: &str) -> bool {
    match (resolve_language_code(language1), resolve_language_code(language2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code or name
pub fn get_language_name(language: &str) -> Result<String> {
    let code = resolve_language_code(language)
        .ok_or_else(|| anyhow!("Unknown language: {}", language))?;

    if let Some((_, english, _)) = WORKFLOW_LANGUAGES.iter().find(|(c, _, _)| *c == code) {
        return Ok((*english).to_string());
    }

    let part2t = normalize_to_part2t(&code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part2t))?;
    Ok(lang.to_name().to_string())
}

/// Name used inside the Chinese-language prompts.
///
/// Workflow languages get their Chinese name, other valid languages their English
/// name, and anything unrecognised is passed through unchanged.
pub fn prompt_language_name(language: &str) -> String {
    let Some(code) = resolve_language_code(language) else {
        return language.trim().to_string();
    };

    WORKFLOW_LANGUAGES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, chinese)| (*chinese).to_string())
        .or_else(|| get_language_name(&code).ok())
        .unwrap_or_else(|| language.trim().to_string())
}
