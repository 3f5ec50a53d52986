//! The ranking-JSON parser cascade (spec §4.4, §9). Models do not reliably
//! emit clean JSON: they wrap it in prose, use single quotes, leave a
//! trailing comma, or both. Rather than reject on the first hiccup, the
//! oracle tries progressively looser interpretations of the same text
//! before giving up and asking the caller to retry the whole completion.

use delib_core::CandidateIndex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoJsonFound,
    #[error("response JSON has no \"ranking\" array")]
    MissingRankingField,
    #[error("ranking has length {got}, expected {expected}")]
    WrongLength { expected: usize, got: usize },
    #[error("ranking is not a permutation of 1..={k}")]
    NotAPermutation { k: usize },
}

/// Parses a model's ranking response into zero-based `CandidateIndex`
/// order. The model is prompted to emit 1-based candidate numbers; this is
/// the single place that 1-based/0-based conversion happens so the rest of
/// the engine never sees model-facing indexing.
///
/// Tries, in order: a strict full-text JSON parse, a JSON parse of the
/// first balanced `{...}` substring, then a relaxed literal evaluator
/// tolerating single-quoted keys and trailing commas. The first stage that
/// yields a syntactically valid JSON object is the only one consulted for
/// the `ranking` field — a later stage is not tried once a JSON object was
/// found but failed validation, since stage order is about JSON tolerance,
/// not about mistaken-length recovery.
pub fn extract_ranking(text: &str, k: usize) -> Result<Vec<CandidateIndex>, ParseError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        return ranking_from_value(&value, k);
    }

    if let Some(substring) = first_balanced_braces(text) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(substring) {
            return ranking_from_value(&value, k);
        }
        if let Some(value) = relaxed_parse(substring) {
            return ranking_from_value(&value, k);
        }
    }

    Err(ParseError::NoJsonFound)
}

fn ranking_from_value(value: &serde_json::Value, k: usize) -> Result<Vec<CandidateIndex>, ParseError> {
    let array = value
        .get("ranking")
        .and_then(serde_json::Value::as_array)
        .ok_or(ParseError::MissingRankingField)?;

    if array.len() != k {
        return Err(ParseError::WrongLength {
            expected: k,
            got: array.len(),
        });
    }

    let mut one_based = Vec::with_capacity(k);
    for entry in array {
        let n = entry.as_i64().ok_or(ParseError::NotAPermutation { k })?;
        one_based.push(n);
    }

    let mut seen = vec![false; k];
    for &n in &one_based {
        if n < 1 || n as usize > k {
            return Err(ParseError::NotAPermutation { k });
        }
        let slot = &mut seen[(n - 1) as usize];
        if *slot {
            return Err(ParseError::NotAPermutation { k });
        }
        *slot = true;
    }

    Ok(one_based
        .into_iter()
        .map(|n| CandidateIndex::new((n - 1) as u32))
        .collect())
}

/// Finds the first `{...}` span with balanced braces, ignoring braces
/// inside double-quoted strings. Returns `None` if no closing brace ever
/// balances the first opening one.
fn first_balanced_braces(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// A relaxed literal evaluator: rewrites single-quoted keys/strings to
/// double-quoted ones and drops trailing commas before `}`/`]`, then hands
/// the result to `serde_json`. This is intentionally narrow — it is not a
/// general JS-literal evaluator, only enough to cover the two deviations
/// models actually produce.
fn relaxed_parse(text: &str) -> Option<serde_json::Value> {
    let requoted = requote_single_quotes(text);
    let trimmed = strip_trailing_commas(&requoted);
    serde_json::from_str(&trimmed).ok()
}

fn requote_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_double = false;
    while let Some(c) = chars.next() {
        match c {
            '"' if !in_double => {
                in_double = true;
                out.push(c);
            }
            '"' if in_double => {
                in_double = false;
                out.push(c);
            }
            '\'' if !in_double => out.push('"'),
            _ => out.push(c),
        }
    }
    out
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses_directly() {
        let got = extract_ranking(r#"{"ranking":[3,1,2]}"#, 3).unwrap();
        assert_eq!(
            got,
            vec![CandidateIndex::new(2), CandidateIndex::new(0), CandidateIndex::new(1)]
        );
    }

    #[test]
    fn balanced_substring_inside_prose() {
        let text = "Sure, here is my answer: {\"ranking\": [2, 1]} hope that helps!";
        let got = extract_ranking(text, 2).unwrap();
        assert_eq!(got, vec![CandidateIndex::new(1), CandidateIndex::new(0)]);
    }

    #[test]
    fn relaxed_parse_handles_single_quotes_and_trailing_comma() {
        let text = "{'ranking': [1, 3, 2,],}";
        let got = extract_ranking(text, 3).unwrap();
        assert_eq!(
            got,
            vec![CandidateIndex::new(0), CandidateIndex::new(2), CandidateIndex::new(1)]
        );
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = extract_ranking(r#"{"ranking":[1,2]}"#, 3).unwrap_err();
        assert_eq!(err, ParseError::WrongLength { expected: 3, got: 2 });
    }

    #[test]
    fn non_permutation_is_rejected() {
        let err = extract_ranking(r#"{"ranking":[1,1,2]}"#, 3).unwrap_err();
        assert_eq!(err, ParseError::NotAPermutation { k: 3 });
    }

    #[test]
    fn no_json_at_all_is_rejected() {
        let err = extract_ranking("I cannot comply with that request.", 3).unwrap_err();
        assert_eq!(err, ParseError::NoJsonFound);
    }
}
