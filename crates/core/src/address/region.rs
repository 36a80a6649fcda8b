//! State and ZIP extraction from the last segment

use postkit_domain::{Diagnostic, DiagnosticCode};

use super::segment::{Normalized, Segment};
use super::tables::{is_known_state, STATE_ZIP};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Region {
    pub state: String,
    pub zip_code: String,
    pub zip_plus4: String,
}

/// Match a segment against the `ST NNNNN[-NNNN]` pattern
///
/// Only ASCII letters and digits qualify. Case folding is ASCII-only so a
/// ligature never expands into a state code.
pub(crate) fn match_region(segment: &Segment<'_>) -> Option<Region> {
    let upper = segment.text.to_ascii_uppercase();
    let captures = STATE_ZIP.captures(&upper)?;
    Some(Region {
        state: captures[1].to_string(),
        zip_code: captures[2].to_string(),
        zip_plus4: captures.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

/// Report a state code outside the allowed set; the code is still kept
pub(crate) fn check_state(
    region: &Region,
    segment: &Segment<'_>,
    normalized: &Normalized,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !is_known_state(&region.state) {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::UnknownState,
            format!("unknown state code '{}'", region.state),
            Some(normalized.original_span(segment.start, segment.start + 2)),
        ));
    }
}

/// Diagnostic for a last segment that is not a state/ZIP pair
pub(crate) fn region_mismatch(segment: &Segment<'_>, normalized: &Normalized) -> Diagnostic {
    let span = Some(normalized.original_span(segment.start, segment.end()));
    if segment.text.chars().any(char::is_numeric) {
        Diagnostic::new(
            DiagnosticCode::InvalidStateZip,
            format!("'{}' is not a valid state and ZIP code", segment.text),
            span,
        )
    } else {
        Diagnostic::new(DiagnosticCode::MissingStateZip, "no state and ZIP code segment", span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_segment(input: &str) -> (Normalized, usize) {
        let normalized = Normalized::new(input);
        let count = normalized.segments().len();
        (normalized, count - 1)
    }

    #[test]
    fn test_match_zip_plus4() {
        let (normalized, last) = last_segment("x, ny 10001-1234");
        let segments = normalized.segments();
        let region = match_region(&segments[last]).unwrap();
        assert_eq!(region.state, "NY");
        assert_eq!(region.zip_code, "10001");
        assert_eq!(region.zip_plus4, "1234");
    }

    #[test]
    fn test_unknown_state_span() {
        let input = "x, ZZ 62704";
        let (normalized, last) = last_segment(input);
        let segments = normalized.segments();
        let region = match_region(&segments[last]).unwrap();
        let mut diagnostics = Vec::new();
        check_state(&region, &segments[last], &normalized, &mut diagnostics);
        let span = diagnostics[0].span.unwrap();
        assert_eq!(&input[span.start..span.end], "ZZ");
    }

    #[test]
    fn test_mismatch_codes() {
        let (normalized, last) = last_segment("x, Springfield");
        let segments = normalized.segments();
        assert!(match_region(&segments[last]).is_none());
        assert_eq!(
            region_mismatch(&segments[last], &normalized).code,
            DiagnosticCode::MissingStateZip
        );

        let (normalized, last) = last_segment("x, IL 627");
        let segments = normalized.segments();
        assert_eq!(
            region_mismatch(&segments[last], &normalized).code,
            DiagnosticCode::InvalidStateZip
        );
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        let arabic_indic = "x, IL \u{661}\u{662}\u{663}\u{664}\u{665}";
        let full_width = "x, IL \u{ff11}\u{ff12}\u{ff13}\u{ff14}\u{ff15}";
        for input in [arabic_indic, full_width] {
            let (normalized, last) = last_segment(input);
            let segments = normalized.segments();
            assert!(match_region(&segments[last]).is_none(), "{input}");
            assert_eq!(
                region_mismatch(&segments[last], &normalized).code,
                DiagnosticCode::InvalidStateZip
            );
        }
    }

    #[test]
    fn test_ligature_is_not_a_state() {
        let (normalized, last) = last_segment("x, \u{fb00} 12345");
        let segments = normalized.segments();
        assert!(match_region(&segments[last]).is_none());
    }
}
