//! Heuristic spam scorer
//!
//! Additive point system over four independent signals, capped at 1.0.
//! Weights are summed in tenths so that totals stay exact.

use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::types::*;

/// Matches the scheme of an http or https link (case-sensitive)
const LINK_PATTERN: &str = r"https?://";

/// Minimum length of a run of one character that counts as repetition
const REPEAT_RUN: usize = 5;

/// Score cap, in tenths
const MAX_TENTHS: u32 = 10;

/// Heuristic spam scorer
pub struct HeuristicScorer {
    link_pattern: Regex,
}

impl HeuristicScorer {
    /// Create a new heuristic scorer
    pub fn new() -> Self {
        Self {
            link_pattern: Regex::new(LINK_PATTERN).expect("LINK_PATTERN is a valid regex"),
        }
    }

    /// Score a message. Empty input scores 0.
    pub fn score(&self, text: &str) -> HeuristicScore {
        if text.is_empty() {
            return HeuristicScore::zero();
        }

        let signals: Vec<SpamSignal> = SpamSignal::ALL
            .into_iter()
            .filter(|signal| self.check_signal(*signal, text))
            .collect();

        let tenths: u32 = signals.iter().map(SpamSignal::weight_tenths).sum();
        let score = f64::from(tenths.min(MAX_TENTHS)) / 10.0;

        debug!(
            "Heuristic score {:.1} (signals: {:?})",
            score,
            signals.iter().map(SpamSignal::name).collect::<Vec<_>>()
        );

        HeuristicScore { score, signals }
    }

    fn check_signal(&self, signal: SpamSignal, text: &str) -> bool {
        match signal {
            SpamSignal::Links => self.count_links(text) > 1,
            SpamSignal::RepeatedChars => has_repeated_run(text, REPEAT_RUN),
            SpamSignal::AllCaps => is_all_caps(text),
            SpamSignal::RepeatedWords => has_repeated_words(text),
        }
    }

    /// Count link schemes in the text
    fn count_links(&self, text: &str) -> usize {
        self.link_pattern.find_iter(text).count()
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// True if some character other than a newline repeats `run` or more times in a row
fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut previous: Option<char> = None;
    let mut length = 0;

    for c in text.chars() {
        if c == '\n' {
            previous = None;
            length = 0;
            continue;
        }

        if previous == Some(c) {
            length += 1;
        } else {
            previous = Some(c);
            length = 1;
        }

        if length >= run {
            return true;
        }
    }

    false
}

/// True if the text has at least one cased character and all cased
/// characters are uppercase.
///
/// Text without letters ("1234!!") is not considered uppercase. Titlecase
/// letters such as 'ǅ' are cased but not uppercase.
fn is_all_caps(text: &str) -> bool {
    let mut has_upper = false;

    for c in text.chars() {
        if c.is_lowercase() || is_titlecase(c) {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }

    has_upper
}

/// Neither upper nor lower case, yet with a distinct lowercase form
fn is_titlecase(c: char) -> bool {
    !c.is_uppercase() && !c.is_lowercase() && !c.to_lowercase().eq(std::iter::once(c))
}

/// True if any whitespace-separated word (case-insensitive) appears more than once
fn has_repeated_words(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();

    lowered.split_whitespace().any(|word| !seen.insert(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_scores_zero() {
        let scorer = HeuristicScorer::new();
        let result = scorer.score("");
        assert_eq!(result.score, 0.0);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn test_plain_text_scores_zero() {
        let scorer = HeuristicScorer::new();
        let result = scorer.score("When is the assignment due for chapter four?");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_single_link_does_not_fire() {
        let scorer = HeuristicScorer::new();
        let result = scorer.score("see https://example.com for details");
        assert!(!result.has(SpamSignal::Links));
    }

    #[test]
    fn test_two_links_fire() {
        let scorer = HeuristicScorer::new();
        let result = scorer.score("see https://a.com and http://b.com");
        assert!(result.has(SpamSignal::Links));
        assert_eq!(result.score, 0.4);
    }

    #[test]
    fn test_link_scheme_is_case_sensitive() {
        let scorer = HeuristicScorer::new();
        assert_eq!(scorer.count_links("HTTP://A.COM HTTPS://B.COM"), 0);
        assert_eq!(scorer.count_links("http://a https://b httpx://c"), 2);
    }

    #[test]
    fn test_repeated_run() {
        assert!(has_repeated_run("soooooo good", 5));
        assert!(has_repeated_run("!!!!!", 5));
        assert!(!has_repeated_run("soooo good", 5));
        assert!(!has_repeated_run("", 5));
    }

    #[test]
    fn test_repeated_run_spaces_count_newlines_do_not() {
        assert!(has_repeated_run("a     b", 5));
        assert!(!has_repeated_run("a\n\n\n\n\nb", 5));
        assert!(!has_repeated_run("aaa\naa", 5));
    }

    #[test]
    fn test_all_caps() {
        assert!(is_all_caps("FREE MONEY NOW"));
        assert!(is_all_caps("BUY 2 GET 1!"));
        assert!(is_all_caps("ÉCOLE"));
        assert!(!is_all_caps("Free money"));
        assert!(!is_all_caps("1234 !!"));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_titlecase_letters_are_not_uppercase() {
        assert!(!is_all_caps("Aǅ"));
        assert!(!is_all_caps("ǅ"));
        assert!(!is_all_caps("ǈUBLJANA"));
        assert!(is_all_caps("ǄA"));
        // uncased letters are skipped
        assert!(is_all_caps("A 漢字"));
        assert!(!is_all_caps("漢字"));
    }

    #[test]
    fn test_repeated_words_case_insensitive() {
        assert!(has_repeated_words("Buy buy"));
        assert!(has_repeated_words("one two\tthree\nTWO"));
        assert!(!has_repeated_words("one two three"));
        assert!(!has_repeated_words("   "));
    }

    #[test]
    fn test_signals_add_up() {
        let scorer = HeuristicScorer::new();
        // caps (0.2) + repeated word (0.1) + run (0.3)
        let result = scorer.score("WIN WIN AAAAAA");
        assert_eq!(result.score, 0.6);
        assert_eq!(
            result.signals,
            vec![SpamSignal::RepeatedChars, SpamSignal::AllCaps, SpamSignal::RepeatedWords]
        );
    }

    #[test]
    fn test_weights_sum_to_cap() {
        let total: u32 = SpamSignal::ALL.iter().map(SpamSignal::weight_tenths).sum();
        assert_eq!(total, MAX_TENTHS);
    }
}
