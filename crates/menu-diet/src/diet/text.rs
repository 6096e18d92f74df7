//! Text normalization and keyword matching shared by the rule registry and the scorer.

use regex::Regex;
use tracing::warn;

/// Characters that end a clause when looking backwards from a hit.
const CLAUSE_BREAKS: &[char] = &[',', ';', '.', '(', ')', '/', '|', ':', '!', '?'];

/// Lower-case, strip accents and zero-width characters, collapse whitespace.
pub fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let mut folded = String::with_capacity(cleaned.len());
    for ch in cleaned.chars().flat_map(char::to_lowercase) {
        fold_char(ch, &mut folded);
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_char(ch: char, out: &mut String) {
    let replacement = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'ç' | 'č' | 'ć' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        'ł' => "l",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => "-",
        // combining diacritical marks left over from decomposed input
        '\u{0300}'..='\u{036f}' => "",
        other => {
            out.push(other);
            return;
        }
    };
    out.push_str(replacement);
}

/// Normalize every entry of a rule list, dropping blanks and duplicates while keeping order.
pub fn normalize_list<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for entry in entries {
        let value = normalize_text(entry);
        if !value.is_empty() && !normalized.contains(&value) {
            normalized.push(value);
        }
    }
    normalized
}

/// A normalized term compiled into a word-boundary pattern. Hyphens and any run of
/// whitespace between the term's words are interchangeable, and simple plurals match.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    pattern: Regex,
}

impl TermMatcher {
    pub fn new(term: &str) -> Option<Self> {
        let term = normalize_text(term);
        let words: Vec<&str> = term
            .split(|ch: char| ch.is_whitespace() || ch == '-')
            .filter(|word| !word.is_empty())
            .collect();
        let (first, last) = match (words.first(), words.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return None,
        };

        let mut source = String::new();
        if first.starts_with(is_word_char) {
            source.push_str(r"\b");
        }
        source.push_str(
            &words
                .iter()
                .map(|word| regex::escape(word))
                .collect::<Vec<_>>()
                .join(r"[\s\-]*"),
        );
        if last.chars().count() >= 3 && last.chars().all(char::is_alphabetic) {
            source.push_str("(?:s|es)?");
        }
        if last.ends_with(is_word_char) {
            source.push_str(r"\b");
        }

        match Regex::new(&source) {
            Ok(pattern) => Some(Self { term, pattern }),
            Err(err) => {
                warn!(term = %term, error = %err, "skipping uncompilable rule term");
                None
            }
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// `text` must already be normalized.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte ranges of every occurrence in normalized `text`.
    pub fn occurrences(&self, text: &str) -> Vec<(usize, usize)> {
        self.pattern
            .find_iter(text)
            .map(|found| (found.start(), found.end()))
            .collect()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Compile a list of terms, silently skipping ones that normalize to nothing.
pub fn compile_terms(terms: &[String]) -> Vec<TermMatcher> {
    terms
        .iter()
        .filter_map(|term| TermMatcher::new(term))
        .collect()
}

/// Compile raw regular expressions (contradiction and contamination phrases).
pub fn compile_patterns(sources: &[String]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|source| match Regex::new(source) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!(pattern = %source, error = %err, "skipping invalid phrase pattern");
                None
            }
        })
        .collect()
}

/// Text from the start of the clause containing `start` up to `start`.
pub fn clause_before(text: &str, start: usize) -> &str {
    let prefix = &text[..start];
    match prefix.rfind(CLAUSE_BREAKS) {
        Some(idx) => &prefix[idx + 1..],
        None => prefix,
    }
}

/// Up to `count` whitespace-separated words preceding `start` within its clause, nearest first.
pub fn words_before(text: &str, start: usize, count: usize) -> Vec<&str> {
    clause_before(text, start)
        .split_whitespace()
        .rev()
        .take(count)
        .collect()
}

/// Up to `count` words following `end`, stopping at the clause boundary.
pub fn words_after(text: &str, end: usize, count: usize) -> Vec<&str> {
    let suffix = &text[end..];
    let clause = match suffix.find(CLAUSE_BREAKS) {
        Some(idx) => &suffix[..idx],
        None => suffix,
    };
    clause
        .split(|ch: char| ch.is_whitespace() || ch == '-')
        .filter(|word| !word.is_empty())
        .take(count)
        .collect()
}

/// Split a provider allergen string into normalized tokens.
pub fn allergen_tokens(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    normalize_list(raw.split([',', ';', '|']))
}
