//! # Text Normalizer
//! Shared tokenization for training and scoring.
//!
//! Both the indexer and the scorer go through [`normalize`]; a word counted
//! under one spelling and looked up under another would silently read as 0.
//!
//! Steps:
//! 1. Replace each markup entry (ASCII case-insensitive), then each ASCII
//!    punctuation character, with a single space (literal substring
//!    replacement, table order).
//! 2. Lower-case the whole string.
//! 3. Split on whitespace runs.

/// HTML line breaks first, so `<br />` goes as one unit before `<`, `/`, `>`
/// are handled on their own. Matched in any letter case.
const MARKUP: [&str; 3] = ["<br />", "<br/>", "<br>"];

/// Every ASCII punctuation character, one table entry each.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Normalize raw text into an ordered sequence of lowercase word tokens.
///
/// Total over any input: empty or punctuation-only text yields an empty `Vec`.
pub fn normalize(text: &str) -> Vec<String> {
    strip_markup(text)
        .replace(|c: char| PUNCTUATION.contains(c), " ")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Replace every markup span with a space, whatever its letter case.
///
/// ASCII folding keeps byte offsets, so spans found in the folded copy index
/// the original text directly.
fn strip_markup(text: &str) -> String {
    let folded = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut resume = 0;
    for (i, ch) in text.char_indices() {
        if i < resume {
            continue;
        }
        match MARKUP.iter().find(|m| folded[i..].starts_with(**m)) {
            Some(m) => {
                out.push(' ');
                resume = i + m.len();
            }
            None => out.push(ch),
        }
    }
    out
}

/// Tokens joined by single spaces. Feeding the result back through
/// [`normalize`] yields the same tokens.
pub fn normalize_to_string(text: &str) -> String {
    normalize(text).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_br_markup_and_punctuation() {
        let toks = normalize("Great film!<br /><br />Loved it, really.");
        assert_eq!(toks, vec!["great", "film", "loved", "it", "really"]);
    }

    #[test]
    fn upper_case_markup_leaves_no_br_token() {
        assert_eq!(normalize("ok<BR />fine"), vec!["ok", "fine"]);
        assert_eq!(normalize("ok<br>fine"), vec!["ok", "fine"]);
    }

    #[test]
    fn mixed_case_markup_leaves_no_br_token() {
        assert_eq!(normalize("ok<Br />fine"), vec!["ok", "fine"]);
        assert_eq!(normalize("ok<bR>fine"), vec!["ok", "fine"]);
        assert_eq!(normalize("a<bR/>b<Br>c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn markup_next_to_multibyte_text() {
        assert_eq!(normalize("café<BR />über"), vec!["café", "über"]);
        assert_eq!(normalize("<b>bold</b>"), vec!["b", "bold", "b"]);
    }

    #[test]
    fn apostrophes_split_contractions() {
        assert_eq!(normalize("Don't"), vec!["don", "t"]);
    }

    #[test]
    fn lowercases_unicode() {
        assert_eq!(normalize("ÉCOLE Straße"), vec!["école", "straße"]);
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \t\n").is_empty());
        assert!(normalize("?!...<br />").is_empty());
    }

    #[test]
    fn keeps_repeats_and_order() {
        assert_eq!(normalize("bad, bad movie"), vec!["bad", "bad", "movie"]);
    }
}
