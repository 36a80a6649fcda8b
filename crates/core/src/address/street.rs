//! Street line and secondary segment normalization

use postkit_domain::{Diagnostic, DiagnosticCode};

use super::segment::{Normalized, Segment, Token};
use super::tables::{
    designator_abbreviation, is_designator, looks_like_unit_value, DIRECTIONALS, PO_BOX, SUFFIXES,
};

/// Uppercased token with `.` removed, keeping its normalized offsets
#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    text: String,
    start: usize,
    end: usize,
}

fn clean(text: &str) -> String {
    text.chars().filter(|c| *c != '.').flat_map(char::to_uppercase).collect()
}

/// Split a token such as `APT-4B` or `STE#200` at the designator boundary
fn words(tokens: &[Token<'_>]) -> Vec<Word> {
    let mut words = Vec::with_capacity(tokens.len());
    for token in tokens {
        let text = clean(token.text);
        if text.is_empty() {
            continue;
        }
        if let Some(cut) = text.find(['-', '#']).filter(|&cut| cut > 0) {
            let (head, tail) = text.split_at(cut);
            let raw_cut = token.text.find(['-', '#']).unwrap_or(token.text.len());
            if is_designator(head) && tail.len() > 1 {
                words.push(Word {
                    text: head.to_string(),
                    start: token.start,
                    end: token.start + raw_cut,
                });
                words.push(Word {
                    text: tail.to_string(),
                    start: token.start + raw_cut,
                    end: token.end(),
                });
                continue;
            }
        }
        words.push(Word { text, start: token.start, end: token.end() });
    }
    words
}

/// Value text following a designator: leading `#` and `-` are dropped
fn unit_value(words: &[Word]) -> Vec<&str> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.text.trim_start_matches(['#', '-']) } else { w.text.as_str() })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Render a designator and its value, reporting designators without a
/// canonical abbreviation
fn render_secondary(
    designator: &Word,
    value: &[&str],
    normalized: &Normalized,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let label = if designator.text.starts_with('#') {
        "#".to_string()
    } else if let Some(abbreviation) = designator_abbreviation(&designator.text) {
        abbreviation.to_string()
    } else {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::UnknownSecondary,
            format!("unrecognized secondary designator '{}'", designator.text),
            Some(normalized.original_span(designator.start, designator.end)),
        ));
        designator.text.clone()
    };

    if value.is_empty() {
        label
    } else {
        format!("{label} {}", value.join(" "))
    }
}

/// Result of normalizing the street segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StreetParts {
    pub primary: String,
    /// Inline secondaries in textual order
    pub secondaries: Vec<String>,
}

/// Find the right-most designator in `words[..end]` whose remainder reads
/// as a unit value, returning its index
fn rightmost_designator(words: &[Word], end: usize) -> Option<usize> {
    (0..end).rev().find_map(|i| {
        let word = &words[i];
        if word.text.starts_with('#') {
            let mut value: Vec<&str> = vec![&word.text[1..]];
            value.extend(words[i + 1..end].iter().map(|w| w.text.as_str()));
            value.retain(|t| !t.is_empty());
            if !looks_like_unit_value(&value) {
                return None;
            }
            // `APT #5` keeps the word designator
            if i > 0 && is_designator(&words[i - 1].text) {
                return Some(i - 1);
            }
            return Some(i);
        }
        if is_designator(&word.text) && looks_like_unit_value(&unit_value(&words[i + 1..end])) {
            return Some(i);
        }
        None
    })
}

/// Normalize the street segment into a primary line and inline secondaries
pub(crate) fn normalize_street(
    segment: &Segment<'_>,
    normalized: &Normalized,
    diagnostics: &mut Vec<Diagnostic>,
) -> StreetParts {
    let upper = segment.text.to_uppercase();
    if let Some(captures) = PO_BOX.captures(&upper) {
        return StreetParts {
            primary: format!("PO BOX {}", &captures[1]),
            secondaries: Vec::new(),
        };
    }

    let words = words(&segment.tokens());
    let mut end = words.len();
    let mut peeled = Vec::new();
    while let Some(at) = rightmost_designator(&words, end) {
        let designator = &words[at];
        let value = if designator.text.starts_with('#') {
            let mut value = vec![&designator.text[1..]];
            value.extend(words[at + 1..end].iter().map(|w| w.text.as_str()));
            value.retain(|t| !t.is_empty());
            value
        } else {
            unit_value(&words[at + 1..end])
        };
        peeled.push(render_secondary(designator, &value, normalized, diagnostics));
        end = at;
    }
    peeled.reverse();

    let primary = normalize_primary(&words[..end]);
    if primary.is_empty() {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::EmptyStreet,
            "street line has no primary address after removing secondaries",
            Some(normalized.original_span(segment.start, segment.end())),
        ));
    }

    StreetParts { primary, secondaries: peeled }
}

/// Directionals are rewritten everywhere; only the final word is checked
/// against the suffix table
fn normalize_primary(words: &[Word]) -> String {
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let text = word.text.as_str();
            if let Some(direction) = DIRECTIONALS.get(text) {
                return (*direction).to_string();
            }
            if i == last {
                if let Some(suffix) = SUFFIXES.get(text) {
                    return (*suffix).to_string();
                }
            }
            text.to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a middle segment; `Some` carries the rendered secondary
pub(crate) fn secondary_segment(
    segment: &Segment<'_>,
    normalized: &Normalized,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let cleaned = clean(segment.text);
    let words = words(&segment.tokens());
    let first = words.first()?;

    if cleaned.starts_with('#') {
        let value: Vec<&str> = cleaned[1..]
            .split(' ')
            .map(|t| t.trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .collect();
        let hash = Word { text: "#".to_string(), start: first.start, end: first.start + 1 };
        return Some(render_secondary(&hash, &value, normalized, diagnostics));
    }

    if let Some((keyword, rest)) = leading_keyword(&cleaned) {
        let value: Vec<&str> = rest
            .trim_start_matches([' ', '-', '#'])
            .split(' ')
            .filter(|t| !t.is_empty())
            .collect();
        let designator = Word {
            text: keyword.to_string(),
            start: first.start,
            end: first.start + keyword.len().min(first.end - first.start),
        };
        return Some(render_secondary(&designator, &value, normalized, diagnostics));
    }

    if is_designator(&first.text) {
        let value = unit_value(&words[1..]);
        if looks_like_unit_value(&value) {
            return Some(render_secondary(first, &value, normalized, diagnostics));
        }
    }
    None
}

/// A mapped designator keyword at the start of `text`, followed by a space,
/// hyphen, `#` or the end of the text
fn leading_keyword(text: &str) -> Option<(&str, &str)> {
    const KEYWORDS: [&str; 12] = [
        "APARTMENT", "APT", "UNIT", "SUITE", "STE", "ROOM", "RM", "FLOOR", "FL", "BUILDING",
        "BLDG", "LOT",
    ];
    KEYWORDS.iter().find_map(|keyword| {
        let rest = text.strip_prefix(keyword)?;
        match rest.chars().next() {
            None | Some(' ' | '-' | '#') => Some((&text[..keyword.len()], rest)),
            Some(_) => None,
        }
    })
}
