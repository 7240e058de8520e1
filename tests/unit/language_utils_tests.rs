/*!
 * Tests for language utility functions
 */

use translore::language_utils::{
    get_language_name, language_codes_match, normalize_to_part2t, prompt_language_name,
    resolve_language_code,
};

/// Test resolution of codes and names to ISO 639-1
#[test]
fn test_resolveLanguageCode_withCodesAndNames_shouldReturnPart1() {
    assert_eq!(resolve_language_code("zh").as_deref(), Some("zh"));
    assert_eq!(resolve_language_code("中文").as_deref(), Some("zh"));
    assert_eq!(resolve_language_code("english").as_deref(), Some("en"));
    assert_eq!(resolve_language_code("eng").as_deref(), Some("en"));
    assert_eq!(resolve_language_code("   ").as_deref(), None);
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalizeToPart2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert!(normalize_to_part2t("xyz").is_err());
}

/// Test matching across different descriptions of the same language
#[test]
fn test_languageCodesMatch_withNamesAndCodes_shouldMatch() {
    assert!(language_codes_match("英语", "en"));
    assert!(language_codes_match("eng", "English"));
    assert!(!language_codes_match("en", "zh"));
    assert!(!language_codes_match("xyz", "xyz"));
}

/// Test English names and prompt names
#[test]
fn test_languageNames_shouldUseEnglishAndChineseForms() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert!(get_language_name("xyz").is_err());

    assert_eq!(prompt_language_name("zh"), "中文");
    assert_eq!(prompt_language_name("en"), "英语");
    assert_eq!(prompt_language_name("not a language"), "not a language");
}
