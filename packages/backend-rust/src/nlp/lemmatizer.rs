use async_trait::async_trait;

use super::{Lemmatizer, NlpError};

struct SuffixRule {
    suffix: &'static str,
    replacement: &'static str,
    min_stem: usize,
}

const fn rule(suffix: &'static str, replacement: &'static str, min_stem: usize) -> SuffixRule {
    SuffixRule {
        suffix,
        replacement,
        min_stem,
    }
}

// Longest suffix first; the first matching rule wins. Identity rules
// (`ss` -> `ss`) shield endings from the shorter rules below them.
const EN_RULES: &[SuffixRule] = &[
    rule("sses", "ss", 1),
    rule("ches", "ch", 1),
    rule("shes", "sh", 1),
    rule("xes", "x", 1),
    rule("ies", "y", 2),
    rule("ied", "y", 2),
    rule("ing", "", 3),
    rule("ed", "", 3),
    rule("ss", "ss", 0),
    rule("us", "us", 0),
    rule("s", "", 2),
];

const SV_RULES: &[SuffixRule] = &[
    rule("orna", "a", 2),
    rule("arna", "", 2),
    rule("erna", "", 2),
    rule("or", "a", 2),
    rule("ar", "", 2),
    rule("er", "", 2),
    rule("en", "", 2),
    rule("et", "", 2),
];

const DE_RULES: &[SuffixRule] = &[
    rule("ungen", "ung", 3),
    rule("ern", "", 3),
    rule("en", "", 3),
    rule("er", "", 3),
    rule("es", "", 3),
    rule("e", "", 3),
];

const EN_IRREGULAR: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("has", "have"),
    ("had", "have"),
    ("did", "do"),
    ("does", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("ran", "run"),
    ("saw", "see"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("better", "good"),
];

const SV_IRREGULAR: &[(&str, &str)] = &[
    ("är", "vara"),
    ("var", "vara"),
    ("varit", "vara"),
    ("har", "ha"),
    ("hade", "ha"),
    ("gick", "gå"),
    ("sa", "säga"),
    ("män", "man"),
    ("barnen", "barn"),
];

const DE_IRREGULAR: &[(&str, &str)] = &[
    ("bin", "sein"),
    ("bist", "sein"),
    ("ist", "sein"),
    ("sind", "sein"),
    ("war", "sein"),
    ("hat", "haben"),
    ("hast", "haben"),
    ("ging", "gehen"),
    ("häuser", "haus"),
];

/// Dictionary-free lemmatizer: an irregular-form table plus ordered
/// suffix-stripping rules per language (`en`, `sv`, `de`). Tokens of
/// other languages come back lowercased.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleLemmatizer;

impl RuleLemmatizer {
    pub fn lemma(token: &str, language: &str) -> String {
        let word = token.trim().to_lowercase();
        if !word.chars().all(char::is_alphabetic) {
            return word;
        }

        let (irregular, rules) = match language.trim().to_lowercase().as_str() {
            "en" => (EN_IRREGULAR, EN_RULES),
            "sv" => (SV_IRREGULAR, SV_RULES),
            "de" => (DE_IRREGULAR, DE_RULES),
            _ => return word,
        };

        if let Some((_, base)) = irregular.iter().find(|(form, _)| *form == word) {
            return (*base).to_string();
        }

        for rule in rules {
            let Some(stem) = word.strip_suffix(rule.suffix) else {
                continue;
            };
            if stem.chars().count() < rule.min_stem {
                continue;
            }
            let mut base = format!("{stem}{}", rule.replacement);
            if language.eq_ignore_ascii_case("en") && matches!(rule.suffix, "ing" | "ed") {
                undouble_final_consonant(&mut base);
            }
            return base;
        }
        word
    }
}

fn undouble_final_consonant(stem: &mut String) {
    let mut tail = stem.chars().rev();
    if let (Some(last), Some(prev)) = (tail.next(), tail.next()) {
        if last == prev && !"aeiouylsz".contains(last) {
            stem.pop();
        }
    }
}

#[async_trait]
impl Lemmatizer for RuleLemmatizer {
    async fn lemmatize(&self, token: &str, language: &str) -> Result<String, NlpError> {
        Ok(Self::lemma(token, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swedish_plural_and_definite_forms() {
        assert_eq!(RuleLemmatizer::lemma("Hundar", "sv"), "hund");
        assert_eq!(RuleLemmatizer::lemma("hundarna", "sv"), "hund");
        assert_eq!(RuleLemmatizer::lemma("flickor", "sv"), "flicka");
        assert_eq!(RuleLemmatizer::lemma("flickorna", "sv"), "flicka");
        assert_eq!(RuleLemmatizer::lemma("bilen", "sv"), "bil");
        assert_eq!(RuleLemmatizer::lemma("huset", "sv"), "hus");
        assert_eq!(RuleLemmatizer::lemma("är", "sv"), "vara");
    }

    #[test]
    fn test_english_inflections() {
        assert_eq!(RuleLemmatizer::lemma("cats", "en"), "cat");
        assert_eq!(RuleLemmatizer::lemma("studies", "en"), "study");
        assert_eq!(RuleLemmatizer::lemma("running", "en"), "run");
        assert_eq!(RuleLemmatizer::lemma("played", "en"), "play");
        assert_eq!(RuleLemmatizer::lemma("glass", "en"), "glass");
        assert_eq!(RuleLemmatizer::lemma("went", "en"), "go");
    }

    #[test]
    fn test_german_endings() {
        assert_eq!(RuleLemmatizer::lemma("Hunde", "de"), "hund");
        assert_eq!(RuleLemmatizer::lemma("Kindern", "de"), "kind");
        assert_eq!(RuleLemmatizer::lemma("Frauen", "de"), "frau");
        assert_eq!(RuleLemmatizer::lemma("ist", "de"), "sein");
    }

    #[test]
    fn test_short_words_and_unknown_languages_pass_through() {
        assert_eq!(RuleLemmatizer::lemma("is", "fr"), "is");
        assert_eq!(RuleLemmatizer::lemma("Bus", "en"), "bus");
        assert_eq!(RuleLemmatizer::lemma("3.14", "en"), "3.14");
        assert_eq!(RuleLemmatizer::lemma("bar", "sv"), "bar");
    }
}
