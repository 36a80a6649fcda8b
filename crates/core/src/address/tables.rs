//! Fixed lookup tables for street normalization
//!
//! Abbreviations follow USPS Publication 28 (appendices B and C).

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Directional words and their two-letter forms
pub(crate) static DIRECTIONALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("N", "N"),
        ("S", "S"),
        ("E", "E"),
        ("W", "W"),
        ("NE", "NE"),
        ("NW", "NW"),
        ("SE", "SE"),
        ("SW", "SW"),
        ("NORTH", "N"),
        ("SOUTH", "S"),
        ("EAST", "E"),
        ("WEST", "W"),
        ("NORTHEAST", "NE"),
        ("NORTHWEST", "NW"),
        ("SOUTHEAST", "SE"),
        ("SOUTHWEST", "SW"),
    ])
});

/// Street suffix words and their canonical abbreviations
pub(crate) static SUFFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ALLEY", "ALY"),
        ("ALY", "ALY"),
        ("AVENUE", "AVE"),
        ("AVE", "AVE"),
        ("AV", "AVE"),
        ("AVEN", "AVE"),
        ("BEND", "BND"),
        ("BND", "BND"),
        ("BOULEVARD", "BLVD"),
        ("BLVD", "BLVD"),
        ("BOUL", "BLVD"),
        ("BYPASS", "BYP"),
        ("BYP", "BYP"),
        ("CENTER", "CTR"),
        ("CTR", "CTR"),
        ("CIRCLE", "CIR"),
        ("CIR", "CIR"),
        ("COURT", "CT"),
        ("CT", "CT"),
        ("COVE", "CV"),
        ("CV", "CV"),
        ("CREEK", "CRK"),
        ("CRK", "CRK"),
        ("CROSSING", "XING"),
        ("XING", "XING"),
        ("DRIVE", "DR"),
        ("DR", "DR"),
        ("EXPRESSWAY", "EXPY"),
        ("EXPY", "EXPY"),
        ("FREEWAY", "FWY"),
        ("FWY", "FWY"),
        ("GROVE", "GRV"),
        ("GRV", "GRV"),
        ("HEIGHTS", "HTS"),
        ("HTS", "HTS"),
        ("HIGHWAY", "HWY"),
        ("HWY", "HWY"),
        ("HILL", "HL"),
        ("HL", "HL"),
        ("HOLLOW", "HOLW"),
        ("HOLW", "HOLW"),
        ("JUNCTION", "JCT"),
        ("JCT", "JCT"),
        ("LANE", "LN"),
        ("LN", "LN"),
        ("LOOP", "LOOP"),
        ("MANOR", "MNR"),
        ("MNR", "MNR"),
        ("MEADOWS", "MDWS"),
        ("MDWS", "MDWS"),
        ("PARKWAY", "PKWY"),
        ("PKWY", "PKWY"),
        ("PIKE", "PIKE"),
        ("PLACE", "PL"),
        ("PL", "PL"),
        ("PLAZA", "PLZ"),
        ("PLZ", "PLZ"),
        ("POINT", "PT"),
        ("PT", "PT"),
        ("RIDGE", "RDG"),
        ("RDG", "RDG"),
        ("ROAD", "RD"),
        ("RD", "RD"),
        ("ROUTE", "RTE"),
        ("RTE", "RTE"),
        ("ROW", "ROW"),
        ("RUN", "RUN"),
        ("SQUARE", "SQ"),
        ("SQ", "SQ"),
        ("STREET", "ST"),
        ("STR", "ST"),
        ("ST", "ST"),
        ("TERRACE", "TER"),
        ("TER", "TER"),
        ("TRACE", "TRCE"),
        ("TRCE", "TRCE"),
        ("TRAIL", "TRL"),
        ("TRL", "TRL"),
        ("TURNPIKE", "TPKE"),
        ("TPKE", "TPKE"),
        ("VIEW", "VW"),
        ("VW", "VW"),
        ("VILLAGE", "VLG"),
        ("VLG", "VLG"),
        ("WALK", "WALK"),
        ("WAY", "WAY"),
    ])
});

/// Secondary designators with a canonical abbreviation
pub(crate) static DESIGNATORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("APARTMENT", "APT"),
        ("APT", "APT"),
        ("UNIT", "UNIT"),
        ("SUITE", "STE"),
        ("STE", "STE"),
        ("ROOM", "RM"),
        ("RM", "RM"),
        ("FLOOR", "FL"),
        ("FL", "FL"),
        ("BUILDING", "BLDG"),
        ("BLDG", "BLDG"),
        ("LOT", "LOT"),
    ])
});

/// Unit designators recognized but left unabbreviated
pub(crate) static UNMAPPED_DESIGNATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "DEPT",
        "DEPARTMENT",
        "TRLR",
        "TRAILER",
        "SPACE",
        "SPC",
        "HNGR",
        "HANGAR",
        "OFC",
        "OFFICE",
        "SLIP",
    ])
});

/// Standalone words accepted as a unit value
pub(crate) static UNIT_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "PH",
        "PENTHOUSE",
        "REAR",
        "FRONT",
        "UPPER",
        "LOWER",
        "BSMT",
        "BASEMENT",
        "LOBBY",
    ])
});

/// States, DC, territories and military codes
pub(crate) static STATES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
        "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
        "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
        "VA", "WA", "WV", "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP", "AA", "AE", "AP",
    ])
});

pub(crate) static STATE_ZIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]{2})\s+([0-9]{5})(?:[-\s]([0-9]{4}))?$")
        .expect("STATE_ZIP should compile - this is a bug")
});

pub(crate) static PO_BOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:P\s*\.?\s*O\s*\.?|POST\s+OFFICE)\s*BOX\s*#?\s*([A-Z0-9]+)$")
        .expect("PO_BOX should compile - this is a bug")
});

/// Canonical abbreviation for a mapped designator
pub(crate) fn designator_abbreviation(word: &str) -> Option<&'static str> {
    DESIGNATORS.get(word).copied()
}

/// True for mapped and unmapped designators alike
pub(crate) fn is_designator(word: &str) -> bool {
    DESIGNATORS.contains_key(word) || UNMAPPED_DESIGNATORS.contains(word)
}

pub(crate) fn is_known_state(code: &str) -> bool {
    STATES.contains(code)
}

/// Whether the tokens following a designator read as a unit value
///
/// A digit anywhere qualifies, as does a single token of at most three
/// characters or one of the standalone unit words.
pub(crate) fn looks_like_unit_value(tokens: &[&str]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    if tokens.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())) {
        return true;
    }
    match tokens {
        [single] => single.chars().count() <= 3 || UNIT_WORDS.contains(single),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_value_rules() {
        assert!(looks_like_unit_value(&["4B"]));
        assert!(looks_like_unit_value(&["A"]));
        assert!(looks_like_unit_value(&["REAR"]));
        assert!(looks_like_unit_value(&["WING", "7"]));
        assert!(!looks_like_unit_value(&["LANE"]));
        assert!(!looks_like_unit_value(&["NORTH", "WING"]));
        assert!(!looks_like_unit_value(&[]));
    }

    #[test]
    fn test_tables_consistent() {
        for abbreviation in DESIGNATORS.values() {
            assert_eq!(DESIGNATORS.get(abbreviation), Some(abbreviation));
        }
        for canonical in SUFFIXES.values() {
            assert_eq!(SUFFIXES.get(canonical), Some(canonical));
        }
        assert!(DESIGNATORS.keys().all(|k| !UNMAPPED_DESIGNATORS.contains(k)));
        assert_eq!(STATES.len(), 59);
    }

    #[test]
    fn test_state_zip_pattern() {
        assert!(STATE_ZIP.is_match("NY 10001"));
        assert!(STATE_ZIP.is_match("NY 10001-1234"));
        assert!(STATE_ZIP.is_match("NY 10001 1234"));
        assert!(!STATE_ZIP.is_match("NY 1000"));
        assert!(!STATE_ZIP.is_match("NEW YORK 10001"));
    }

    #[test]
    fn test_po_box_pattern() {
        for text in ["PO BOX 123", "P.O. BOX 123", "P O BOX 123", "POBOX 123", "POST OFFICE BOX #9"] {
            assert!(PO_BOX.is_match(text), "{text}");
        }
        assert!(!PO_BOX.is_match("POLK BOX 1"));
    }
}
