//! Rule-based sentence splitter tuned for 19th-century German prose.
//!
//! Splits on `.`, `!` and `?` while holding back on abbreviations, initials,
//! ordinal numbers (dates like `am 19. März`) and material inside paired
//! delimiters. Works directly on byte positions so the produced spans index
//! into the caller's text without copying.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{SentenceSegmenter, SentenceSpan, trim_span};

static ABBREVIATIONS: &[&str] = &[
    "z. B.",
    "z.B.",
    "d. h.",
    "d.h.",
    "u. a.",
    "u.a.",
    "u. s. w.",
    "usw.",
    "bzw.",
    "vgl.",
    "ebd.",
    "a. a. O.",
    "Bd.",
    "Bde.",
    "Tl.",
    "Abt.",
    "S.",
    "Sp.",
    "Nr.",
    "No.",
    "Anm.",
    "Kap.",
    "Abs.",
    "Art.",
    "Aufl.",
    "Hrsg.",
    "Jh.",
    "ca.",
    "resp.",
    "etc.",
    "sog.",
    "geb.",
    "gest.",
    "Dr.",
    "Prof.",
    "St.",
    "Mr.",
    "Mrs.",
    "Thlr.",
    "Sgr.",
    "Pfd.",
    "Mk.",
    "f.",
    "ff.",
    "pp.",
];

static ABBREVIATION_SET: Lazy<HashSet<String>> = Lazy::new(|| {
    let mut set = HashSet::new();
    for &abbr in ABBREVIATIONS {
        set.insert(abbr.to_string());
        set.insert(abbr.to_lowercase());
    }
    set
});

/// Bracket pairs whose content never ends a sentence. Quotes are not listed:
/// a sentence may legitimately end inside quotation marks, handled by the
/// trailing-punctuation rule instead.
static PAIRED_DELIMITERS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// Closing punctuation pulled into a sentence right after its terminator.
const TRAILING_PUNCTUATION: &[char] = &['“', '«', '"', '\'', ')', ']'];

/// Punctuation that, as the next non-space character, marks a new sentence.
const OPENING_PUNCTUATION: &[char] = &['„', '»', '"', '('];

/// Longest match first so `u. a.` wins over `u.`.
const PEEK_LENGTHS: &[usize] = &[8, 7, 6, 5, 4, 3, 2];

/// Deterministic rule-based backend; the default segmenter.
#[derive(Debug, Default)]
pub struct RuleSegmenter;

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<SentenceSpan> {
        SentenceScanner::new(text).collect()
    }
}

fn tail_is_abbreviation(sentence: &str) -> bool {
    let Some(last) = sentence.trim_end().split_whitespace().last() else {
        return false;
    };
    is_initial(last) || is_abbreviation_like(last)
}

/// Short numbers before a period are ordinals (`am 19. März`), four-digit
/// years are not.
fn tail_is_ordinal_number(sentence: &str) -> bool {
    let trimmed = sentence.trim_end();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let Some(last) = trimmed.split_whitespace().last() else {
        return false;
    };
    !last.is_empty() && last.len() <= 2 && last.chars().all(|c| c.is_ascii_digit())
}

fn is_abbreviation_like(word: &str) -> bool {
    let trimmed = word.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '"' | '\'' | '“' | '«'));
    if trimmed.is_empty() {
        return true;
    }
    if ABBREVIATION_SET.contains(trimmed) || ABBREVIATION_SET.contains(trimmed.to_lowercase().as_str())
    {
        return true;
    }
    // Tail words arrive without a trailing dot consumed yet.
    let dotted = format!("{trimmed}.");
    ABBREVIATION_SET.contains(dotted.as_str())
        || ABBREVIATION_SET.contains(dotted.to_lowercase().as_str())
}

fn is_initial(fragment: &str) -> bool {
    let mut chars = fragment.trim().chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(first), Some('.'), None) if first.is_uppercase()
    )
}

#[derive(Debug)]
struct SentenceScanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> SentenceScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn is_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Byte length of the next `n` characters, capped at the remaining input.
    fn byte_len_of_chars(&self, n: usize) -> usize {
        self.remaining()
            .char_indices()
            .nth(n)
            .map_or(self.remaining().len(), |(idx, _)| idx)
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.remaining().trim_start();
        self.position += self.remaining().len() - trimmed.len();
    }

    fn maybe_consume_abbreviation(&mut self) -> bool {
        let prev_is_word = self.input[..self.position]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphabetic());
        if prev_is_word {
            return false;
        }

        for &len in PEEK_LENGTHS {
            let byte_len = self.byte_len_of_chars(len);
            let ahead = &self.remaining()[..byte_len];
            if ahead.chars().count() < len {
                continue;
            }
            if ABBREVIATION_SET.contains(ahead) {
                self.position += byte_len;
                return true;
            }
        }
        false
    }

    /// Consume a number, including internal dots (`1.000`), leaving a final
    /// dot in place so the terminator logic can inspect it.
    fn maybe_consume_digits(&mut self) -> bool {
        let remaining = self.remaining();
        if !remaining.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }

        let mut end = 0;
        let mut last_was_dot = false;
        for ch in remaining.chars() {
            match ch {
                '0'..='9' => {
                    end += ch.len_utf8();
                    last_was_dot = false;
                }
                '.' if !last_was_dot => {
                    end += ch.len_utf8();
                    last_was_dot = true;
                }
                _ => break,
            }
        }
        if last_was_dot && end > 1 {
            end -= 1;
        }
        if end == 0 {
            return false;
        }
        self.position += end;
        true
    }

    fn maybe_consume_delimited(&mut self) -> bool {
        const MAX_DELIMITER_SEARCH: usize = 1000;

        let remaining = self.remaining();
        for &(open, close) in PAIRED_DELIMITERS {
            if !remaining.starts_with(open) {
                continue;
            }

            let mut depth = 0usize;
            let mut end = 0usize;
            for ch in remaining.chars() {
                if ch == open {
                    depth += 1;
                } else if ch == close {
                    depth -= 1;
                    if depth == 0 {
                        self.position += end + ch.len_utf8();
                        return true;
                    }
                }
                end += ch.len_utf8();
                if end > MAX_DELIMITER_SEARCH {
                    break;
                }
            }
        }
        false
    }

    fn next_sentence(&mut self) -> Option<SentenceSpan> {
        self.skip_whitespace();
        if self.is_end() {
            return None;
        }
        let start = self.position;

        while !self.is_end() {
            if self.maybe_consume_abbreviation() {
                continue;
            }
            if self.maybe_consume_digits() {
                continue;
            }
            if self.maybe_consume_delimited() {
                continue;
            }

            let ch = self.remaining().chars().next()?;
            self.position += ch.len_utf8();

            if matches!(ch, '.' | '!' | '?') {
                let sentence = &self.input[start..self.position];
                if ch == '.' && (tail_is_abbreviation(sentence) || tail_is_ordinal_number(sentence))
                {
                    continue;
                }

                // Closing quotes and brackets belong to the ending sentence.
                while let Some(next) = self.remaining().chars().next() {
                    if TRAILING_PUNCTUATION.contains(&next) {
                        self.position += next.len_utf8();
                    } else {
                        break;
                    }
                }

                let next_non_space = self.remaining().chars().find(|c| !c.is_whitespace());
                let should_break = match next_non_space {
                    None => true,
                    Some(next) => {
                        next.is_uppercase()
                            || next.is_ascii_digit()
                            || OPENING_PUNCTUATION.contains(&next)
                    }
                };
                if should_break {
                    break;
                }
            }
        }

        trim_span(self.input, start, self.position)
    }
}

impl Iterator for SentenceScanner<'_> {
    type Item = SentenceSpan;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sentence()
    }
}
