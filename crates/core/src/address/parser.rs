//! Segment-based free-form address parser

use postkit_domain::{CanonicalAddress, Diagnostic, DiagnosticCode, ParsedAddress};
use tracing::trace;

use super::region::{check_state, match_region, region_mismatch};
use super::segment::{Normalized, Segment};
use super::street::{normalize_street, secondary_segment};

/// Parse a free-form address into its canonical form
///
/// Never fails: every problem is reported as a diagnostic on the result,
/// and the address carries whatever could be recovered.
///
/// # Examples
///
/// ```
/// use postkit_core::address::parse;
///
/// let parsed = parse("PO Box 123, Anytown, NY 12345");
/// assert!(parsed.diagnostics.is_empty());
/// assert_eq!(parsed.address.street_address, "PO BOX 123");
/// ```
pub fn parse(input: &str) -> ParsedAddress {
    let normalized = Normalized::new(input);
    let mut diagnostics = Vec::new();

    if normalized.is_empty() {
        diagnostics.push(Diagnostic::new(DiagnosticCode::EmptyInput, "input is empty", None));
        return ParsedAddress::new(CanonicalAddress::default(), diagnostics);
    }

    let segments = normalized.segments();
    if segments.len() < 3 {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::InsufficientSegments,
            format!(
                "expected street, city and state/ZIP segments, found {} segment(s)",
                segments.len()
            ),
            None,
        ));
    }

    let Some((street_segment, rest)) = segments.split_first() else {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::MissingStreet,
            "no street segment found",
            None,
        ));
        return ParsedAddress::new(CanonicalAddress::default(), diagnostics);
    };

    let mut address = CanonicalAddress::default();
    let street = normalize_street(street_segment, &normalized, &mut diagnostics);
    address.street_address = street.primary;
    let mut secondaries = street.secondaries;

    let (middle, last): (&[Segment<'_>], Option<&Segment<'_>>) = match rest.split_last() {
        Some((last, middle)) => (middle, Some(last)),
        None => (&[], None),
    };

    let mut cities: Vec<&str> = Vec::new();
    for segment in middle {
        match secondary_segment(segment, &normalized, &mut diagnostics) {
            Some(secondary) => secondaries.push(secondary),
            None => cities.push(segment.text),
        }
    }

    match last {
        Some(segment) => match match_region(segment) {
            Some(region) => {
                check_state(&region, segment, &normalized, &mut diagnostics);
                address.state = region.state;
                address.zip_code = region.zip_code;
                address.zip_plus4 = region.zip_plus4;
            }
            None => {
                diagnostics.push(region_mismatch(segment, &normalized));
                cities.push(segment.text);
            }
        },
        None => diagnostics.push(Diagnostic::new(
            DiagnosticCode::MissingStateZip,
            "no state and ZIP code segment",
            None,
        )),
    }

    address.secondary_address = secondaries.join(" ");
    if cities.is_empty() {
        diagnostics.push(Diagnostic::new(DiagnosticCode::MissingCity, "no city segment", None));
    } else {
        address.city = cities.join(" ").to_uppercase();
    }

    trace!(diagnostics = diagnostics.len(), "address parsed");
    ParsedAddress::new(address, diagnostics)
}
