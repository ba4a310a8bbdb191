//! Purpose: Validate document numbers typed by hand when scanning does not work.
//! Exports: `is_document_number`, `manual_entry`.
//! Role: Universal recovery path; bypasses delimiter and scheme logic entirely.
//! Invariants: Accepts exactly 7 or 8 ASCII digits after trimming surrounding whitespace.

use crate::core::parse::{FailureKind, ParseFailure, ParseOptions};
use crate::core::record::IdentityRecord;

pub fn is_document_number(value: &str) -> bool {
    (7..=8).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Builds a record with only the document number set.
pub fn manual_entry(input: &str) -> Result<IdentityRecord, ParseFailure> {
    let options = ParseOptions::default();
    let value = input.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseFailure::new(
            FailureKind::EmptyOrInvalidInput,
            input,
            &options,
        ));
    }
    IdentityRecord::new(value).ok_or_else(|| {
        ParseFailure::new(FailureKind::DocumentNumberOutOfRange, input, &options)
            .with_offending(value)
    })
}

#[cfg(test)]
mod tests {
    use super::{is_document_number, manual_entry};
    use crate::core::parse::FailureKind;
    use crate::core::record::UNAVAILABLE;

    #[test]
    fn accepts_seven_and_eight_digits() {
        assert!(is_document_number("1234567"));
        assert!(is_document_number("12345678"));
        assert!(!is_document_number("123456"));
        assert!(!is_document_number("123456789"));
        assert!(!is_document_number("1234567 "));
        assert!(!is_document_number("١٢٣٤٥٦٧"));
    }

    #[test]
    fn manual_entry_builds_minimal_record() {
        let record = manual_entry(" 38437748\n").expect("valid");
        assert_eq!(record.document_number(), "38437748");
        assert_eq!(record.surname(), UNAVAILABLE);
        assert_eq!(record.given_name(), UNAVAILABLE);
        assert_eq!(record.sex_code_str(), UNAVAILABLE);
        assert_eq!(record.birth_date(), UNAVAILABLE);
    }

    #[test]
    fn manual_entry_rejects_wrong_lengths() {
        let short = manual_entry("123456").expect_err("6 digits");
        assert_eq!(short.kind(), FailureKind::DocumentNumberOutOfRange);
        assert_eq!(short.offending(), Some("123456"));

        let long = manual_entry("123456789").expect_err("9 digits");
        assert_eq!(long.kind(), FailureKind::DocumentNumberOutOfRange);
    }

    #[test]
    fn manual_entry_rejects_non_digits_and_blank() {
        assert_eq!(
            manual_entry("38.437.748").expect_err("dots").kind(),
            FailureKind::EmptyOrInvalidInput
        );
        assert_eq!(
            manual_entry("   ").expect_err("blank").kind(),
            FailureKind::EmptyOrInvalidInput
        );
    }
}
