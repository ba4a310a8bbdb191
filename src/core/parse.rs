//! Purpose: Turn a decoded PDF417 payload into an `IdentityRecord` or a typed failure.
//! Exports: `parse`, `scan`, `Scan`, `ParseOptions`, `ParseFailure`, `FailureKind`.
//! Role: Pure parser core; callers own logging, presentation, and lookups.
//! Invariants: Deterministic and side-effect free; identical input yields identical output.
//! Invariants: Success always carries a document number matching `^\d{7,8}$`.
//! Invariants: Positional matches win; whole-payload scanning runs only as a fallback.
use std::error::Error as StdError;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::{Error, ErrorKind};
use crate::core::manual::is_document_number;
use crate::core::record::{Candidate, IdentityRecord, Provenance, SexCode};
use crate::core::scheme::{self, DelimiterScheme, SchemePriority};

pub const DEFAULT_EXCERPT_BYTES: usize = 200;

const CANDIDATE_LEN: std::ops::RangeInclusive<usize> = 6..=9;

const EXCERPT_SUFFIX: &str = "...";

// Digit runs long enough to be worth reporting. The boundary is ASCII-only so
// `Nº38437748` or an accented neighbour still delimits the run.
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{6,}(?-u:\b)").expect("static digit-run pattern")
});

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseOptions {
    pub priority: SchemePriority,
    pub excerpt_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            priority: SchemePriority::default(),
            excerpt_bytes: DEFAULT_EXCERPT_BYTES,
        }
    }
}

/// Successful parse plus the diagnostics gathered on the way.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scan {
    pub record: IdentityRecord,
    pub scheme: DelimiterScheme,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    EmptyOrInvalidInput,
    NoDocumentNumberFound,
    DocumentNumberOutOfRange,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::EmptyOrInvalidInput => "EmptyOrInvalidInput",
            FailureKind::NoDocumentNumberFound => "NoDocumentNumberFound",
            FailureKind::DocumentNumberOutOfRange => "DocumentNumberOutOfRange",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FailureKind::EmptyOrInvalidInput => "payload is empty or not readable text",
            FailureKind::NoDocumentNumberFound => "no document number found in payload",
            FailureKind::DocumentNumberOutOfRange => "document number must have 7 or 8 digits",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            FailureKind::EmptyOrInvalidInput => {
                "Scan the PDF417 code on the back of the card again, or enter the number manually."
            }
            FailureKind::NoDocumentNumberFound => {
                "Improve lighting and focus, then rescan; or enter the number manually."
            }
            FailureKind::DocumentNumberOutOfRange => {
                "Check the digits shown and enter the 7 or 8 digit number manually."
            }
        }
    }

    pub fn error_kind(self) -> ErrorKind {
        match self {
            FailureKind::EmptyOrInvalidInput => ErrorKind::EmptyInput,
            FailureKind::NoDocumentNumberFound => ErrorKind::NoDocumentNumber,
            FailureKind::DocumentNumberOutOfRange => ErrorKind::DocumentNumberOutOfRange,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseFailure {
    kind: FailureKind,
    excerpt: String,
    truncated: bool,
    offending: Option<String>,
    scheme: Option<DelimiterScheme>,
    candidates: Vec<Candidate>,
}

impl ParseFailure {
    pub(crate) fn new(kind: FailureKind, raw: &str, options: &ParseOptions) -> Self {
        let truncated = raw.len() > options.excerpt_bytes;
        Self {
            kind,
            truncated,
            excerpt: excerpt_of(raw, options.excerpt_bytes),
            offending: None,
            scheme: None,
            candidates: Vec::new(),
        }
    }

    pub(crate) fn with_offending(mut self, value: impl Into<String>) -> Self {
        self.offending = Some(value.into());
        self
    }

    fn with_scheme(mut self, scheme: DelimiterScheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Prefix of the raw payload, at most `excerpt_bytes` long including the
    /// `...` marker added when the payload was cut.
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The digit run that looked like a document number but had the wrong length.
    ///
    /// Any word-bounded run of six or more digits qualifies, so this can be
    /// longer than every entry in `candidates()`, which stop at nine digits.
    pub fn offending(&self) -> Option<&str> {
        self.offending.as_deref()
    }

    pub fn scheme(&self) -> Option<DelimiterScheme> {
        self.scheme
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())?;
        if let Some(offending) = &self.offending {
            write!(f, " (found: {offending})")?;
        }
        Ok(())
    }
}

impl StdError for ParseFailure {}

impl From<ParseFailure> for Error {
    fn from(failure: ParseFailure) -> Self {
        let mut message = failure.kind.message().to_string();
        if let Some(offending) = failure.offending() {
            message.push_str(&format!(" (found: {offending})"));
        }
        let mut err = Error::new(failure.kind.error_kind())
            .with_message(message)
            .with_hint(failure.kind.hint());
        if !failure.excerpt.is_empty() {
            err = err.with_excerpt(failure.excerpt);
        }
        err
    }
}

pub fn parse(raw: &str) -> Result<IdentityRecord, ParseFailure> {
    scan(raw, &ParseOptions::default()).map(|scan| scan.record)
}

pub fn scan(raw: &str, options: &ParseOptions) -> Result<Scan, ParseFailure> {
    if !raw.chars().any(|c| !c.is_whitespace() && !c.is_control()) {
        return Err(ParseFailure::new(
            FailureKind::EmptyOrInvalidInput,
            raw,
            options,
        ));
    }

    let scheme = scheme::detect(raw, options.priority);
    let fields = scheme::segment(raw, scheme);
    let positional = Positional::extract(scheme, &fields);

    let mut candidates = Vec::new();
    let mut positional_start = None;
    let mut positional_near_miss = None;
    let mut document_number = None;

    if let Some((index, value)) = positional.document {
        if value.bytes().all(|b| b.is_ascii_digit()) {
            if is_document_number(value) {
                document_number = Some(value);
            } else if value.len() >= *CANDIDATE_LEN.start() {
                positional_near_miss = Some(value);
            }
            if CANDIDATE_LEN.contains(&value.len()) {
                positional_start = Some(offset_in(raw, value));
                candidates.push(Candidate {
                    value: value.to_string(),
                    provenance: Provenance::Position(index),
                    selected: document_number.is_some(),
                });
            }
        }
    }

    if document_number.is_none() {
        let mut first_near_miss = None;
        for found in DIGIT_RUN.find_iter(raw) {
            let run = found.as_str();
            let selected = document_number.is_none() && is_document_number(run);
            if selected {
                document_number = Some(run);
            } else if first_near_miss.is_none() {
                first_near_miss = Some(run);
            }
            if CANDIDATE_LEN.contains(&run.len()) && positional_start != Some(found.start()) {
                candidates.push(Candidate {
                    value: run.to_string(),
                    provenance: Provenance::Pattern,
                    selected,
                });
            }
        }

        if document_number.is_none() {
            let failure = match positional_near_miss.or(first_near_miss) {
                Some(run) => ParseFailure::new(FailureKind::DocumentNumberOutOfRange, raw, options)
                    .with_offending(run),
                None => ParseFailure::new(FailureKind::NoDocumentNumberFound, raw, options),
            };
            return Err(failure.with_scheme(scheme).with_candidates(candidates));
        }
    }

    let record = document_number
        .and_then(|number| IdentityRecord::new(number))
        .ok_or_else(|| {
            ParseFailure::new(FailureKind::NoDocumentNumberFound, raw, options).with_scheme(scheme)
        })?
        .with_surname(positional.surname.map(str::to_string))
        .with_given_name(positional.given_name.map(str::to_string))
        .with_sex_code(positional.sex_code.and_then(SexCode::from_field))
        .with_birth_date(positional.birth_date.map(str::to_string));

    Ok(Scan {
        record,
        scheme,
        candidates,
    })
}

#[derive(Default)]
struct Positional<'a> {
    document: Option<(usize, &'a str)>,
    surname: Option<&'a str>,
    given_name: Option<&'a str>,
    sex_code: Option<&'a str>,
    birth_date: Option<&'a str>,
}

impl<'a> Positional<'a> {
    fn extract(scheme: DelimiterScheme, fields: &[&'a str]) -> Self {
        match scheme {
            DelimiterScheme::AtSign if fields.len() >= 5 => Self {
                document: field(fields, 4).map(|value| (4, value)),
                surname: field(fields, 1),
                given_name: field(fields, 2),
                sex_code: field(fields, 3),
                birth_date: field(fields, 6),
            },
            DelimiterScheme::Pipe => Self {
                document: field(fields, 1).map(|value| (1, value)),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

fn field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

// `part` must be a subslice of `whole`.
fn offset_in(whole: &str, part: &str) -> usize {
    part.as_ptr() as usize - whole.as_ptr() as usize
}

fn bounded_prefix(raw: &str, max: usize) -> &str {
    if raw.len() <= max {
        return raw;
    }
    let mut end = max;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

fn excerpt_of(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    if max <= EXCERPT_SUFFIX.len() {
        return EXCERPT_SUFFIX[..max].to_string();
    }
    format!(
        "{}{EXCERPT_SUFFIX}",
        bounded_prefix(raw, max - EXCERPT_SUFFIX.len())
    )
}
