// tests/normalize_props.rs
use review_polarity::{normalize, normalize_to_string};

const SAMPLES: &[&str] = &[
    "",
    "This is awful movie!",
    "Great film!<br /><br />Loved it, really.",
    "  MIXED   case\tand\nnewlines  ",
    "don't-stop (ever) -- \"quoted\" [brackets] {braces}",
    "ÉCOLE, Straße; naïve café",
    "?!...<br/>",
    "a<BR>b<br>c",
    "ok<Br />fine<bR>",
];

#[test]
fn normalization_is_idempotent() {
    for s in SAMPLES {
        let once = normalize(s);
        let twice = normalize(&normalize_to_string(s));
        assert_eq!(once, twice, "not idempotent for {s:?}");
    }
}

#[test]
fn tokens_are_lowercase_and_punctuation_free() {
    for s in SAMPLES {
        for tok in normalize(s) {
            assert!(!tok.is_empty());
            assert_eq!(tok, tok.to_lowercase(), "token {tok:?} from {s:?}");
            assert!(
                !tok.chars().any(|c| c.is_ascii_punctuation() || c.is_whitespace()),
                "token {tok:?} from {s:?}"
            );
        }
    }
}

#[test]
fn original_prompt_example() {
    assert_eq!(normalize("This is awful movie!"), vec!["this", "is", "awful", "movie"]);
}
