// Contract tests for the public parsing surface.
use dniscan::api::{
    DelimiterScheme, FailureKind, ParseOptions, Provenance, SchemePriority, UNAVAILABLE,
    is_document_number, manual_entry, parse, scan, to_iso_date,
};

const DNI_PAYLOAD: &str =
    "00610299988@JAIME@FEDERICO NICOLAS@M@38437748@C@22/09/1994@28/09/2019@204";

#[test]
fn card_payload_yields_full_record() {
    let record = parse(DNI_PAYLOAD).expect("parse");
    assert_eq!(record.document_number(), "38437748");
    assert_eq!(record.surname(), "JAIME");
    assert_eq!(record.given_name(), "FEDERICO NICOLAS");
    assert_eq!(record.sex_code_str(), "M");
    assert_eq!(record.birth_date(), "22/09/1994");
}

#[test]
fn unstructured_payload_yields_minimal_record() {
    let record = parse("XYZ 38437748 ABC").expect("parse");
    assert_eq!(record.document_number(), "38437748");
    assert_eq!(record.surname(), UNAVAILABLE);
    assert_eq!(record.given_name(), UNAVAILABLE);
    assert_eq!(record.sex_code_str(), UNAVAILABLE);
    assert_eq!(record.birth_date(), UNAVAILABLE);
}

#[test]
fn failure_kinds() {
    let cases = [
        ("no digits here", FailureKind::NoDocumentNumberFound),
        ("123456789", FailureKind::DocumentNumberOutOfRange),
        ("ref 123456 only", FailureKind::DocumentNumberOutOfRange),
        ("date 22/09/1994 code 204", FailureKind::NoDocumentNumberFound),
        ("", FailureKind::EmptyOrInvalidInput),
        ("   ", FailureKind::EmptyOrInvalidInput),
    ];
    for (raw, kind) in cases {
        let failure = parse(raw).expect_err(raw);
        assert_eq!(failure.kind(), kind, "payload {raw:?}");
    }
}

#[test]
fn success_never_carries_malformed_number() {
    let payloads = [
        DNI_PAYLOAD,
        "A|1234567|B",
        "XYZ 38437748 ABC",
        "1234567890 then 7654321",
        "A@B@C@F@12345678901@x 2345678 y",
        "pipe|99|then 11111111",
    ];
    for raw in payloads {
        let record = parse(raw).expect(raw);
        assert!(
            is_document_number(record.document_number()),
            "payload {raw:?} gave {}",
            record.document_number()
        );
    }
}

#[test]
fn mixed_delimiters_follow_configured_priority() {
    let raw = "A|7654321|B@C@D@M@12345678";
    let default = scan(raw, &ParseOptions::default()).expect("default");
    assert_eq!(default.scheme, DelimiterScheme::AtSign);
    assert_eq!(default.record.document_number(), "12345678");

    let pipe_first = scan(
        raw,
        &ParseOptions {
            priority: SchemePriority::PipeFirst,
            ..ParseOptions::default()
        },
    )
    .expect("pipe first");
    assert_eq!(pipe_first.scheme, DelimiterScheme::Pipe);
    assert_eq!(pipe_first.record.document_number(), "7654321");
}

#[test]
fn out_of_range_failure_lists_candidates() {
    let failure = parse("scan 123456 and 123456789").expect_err("fail");
    assert_eq!(failure.kind(), FailureKind::DocumentNumberOutOfRange);
    assert_eq!(failure.offending(), Some("123456"));
    let values: Vec<&str> = failure
        .candidates()
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(values, vec!["123456", "123456789"]);
    assert!(failure.candidates().iter().all(|c| !c.selected));
    assert!(
        failure
            .candidates()
            .iter()
            .all(|c| c.provenance == Provenance::Pattern)
    );
}

#[test]
fn number_after_ordinal_sign_is_found() {
    let record = parse("DNI N\u{BA}38437748").expect("parse");
    assert_eq!(record.document_number(), "38437748");
    let record = parse("APELLIDO \u{D1}ANDU 38437748\u{E9}").expect("parse");
    assert_eq!(record.document_number(), "38437748");
}

#[test]
fn truncated_excerpt_is_marked_and_bounded() {
    let raw = format!("{} no number", "x".repeat(300));
    let failure = parse(&raw).expect_err("fail");
    assert!(failure.truncated());
    assert!(failure.excerpt().ends_with("..."));
    assert_eq!(failure.excerpt().len(), 200);
}

#[test]
fn iso_date_helper() {
    assert_eq!(to_iso_date("22/09/1994"), "1994-09-22");
    assert_eq!(to_iso_date("unavailable"), "");
    assert_eq!(to_iso_date("22-09-1994"), "");
}

#[test]
fn manual_entry_lengths() {
    assert!(manual_entry("1234567").is_ok());
    assert!(manual_entry("12345678").is_ok());
    assert!(manual_entry("123456").is_err());
    assert!(manual_entry("123456789").is_err());
}

#[test]
fn repeated_parses_agree() {
    for raw in [DNI_PAYLOAD, "no digits here", "123456789", "A|1234567|B"] {
        assert_eq!(parse(raw), parse(raw));
    }
}
