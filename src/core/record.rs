//! Purpose: Identity values produced by the payload parser and the manual-entry path.
//! Exports: `IdentityRecord`, `SexCode`, `Candidate`, `Provenance`, `UNAVAILABLE`, `to_iso_date`.
//! Role: Plain data carried from the parser to callers; no parsing logic lives here.
//! Invariants: `IdentityRecord::document_number` always matches `^\d{7,8}$`.
//! Invariants: Missing fields read back as `UNAVAILABLE`, never as empty strings.

use crate::core::manual::is_document_number;

/// Sentinel returned for any field the parser could not locate.
pub const UNAVAILABLE: &str = "unavailable";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SexCode {
    Male,
    Female,
}

impl SexCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SexCode::Male => "M",
            SexCode::Female => "F",
        }
    }

    pub fn from_field(field: &str) -> Option<Self> {
        match field.trim() {
            "M" | "m" => Some(SexCode::Male),
            "F" | "f" => Some(SexCode::Female),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdentityRecord {
    document_number: String,
    surname: Option<String>,
    given_name: Option<String>,
    sex_code: Option<SexCode>,
    birth_date: Option<String>,
}

impl IdentityRecord {
    /// Returns `None` unless `document_number` is 7 or 8 ASCII digits.
    pub fn new(document_number: impl Into<String>) -> Option<Self> {
        let document_number = document_number.into();
        if !is_document_number(&document_number) {
            return None;
        }
        Some(Self {
            document_number,
            surname: None,
            given_name: None,
            sex_code: None,
            birth_date: None,
        })
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn surname(&self) -> &str {
        self.surname.as_deref().unwrap_or(UNAVAILABLE)
    }

    pub fn given_name(&self) -> &str {
        self.given_name.as_deref().unwrap_or(UNAVAILABLE)
    }

    pub fn sex_code(&self) -> Option<SexCode> {
        self.sex_code
    }

    pub fn sex_code_str(&self) -> &str {
        self.sex_code.map(SexCode::as_str).unwrap_or(UNAVAILABLE)
    }

    pub fn birth_date(&self) -> &str {
        self.birth_date.as_deref().unwrap_or(UNAVAILABLE)
    }

    /// Birth date as `YYYY-MM-DD`, or an empty string when unknown.
    pub fn birth_date_iso(&self) -> String {
        to_iso_date(self.birth_date())
    }

    pub(crate) fn with_surname(mut self, value: Option<String>) -> Self {
        self.surname = value;
        self
    }

    pub(crate) fn with_given_name(mut self, value: Option<String>) -> Self {
        self.given_name = value;
        self
    }

    pub(crate) fn with_sex_code(mut self, value: Option<SexCode>) -> Self {
        self.sex_code = value;
        self
    }

    pub(crate) fn with_birth_date(mut self, value: Option<String>) -> Self {
        self.birth_date = value;
        self
    }
}

/// Where a candidate document number was found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
    /// Field index within the delimiter-split payload.
    Position(usize),
    /// Found by scanning the whole payload.
    Pattern,
}

impl Provenance {
    pub fn label(self) -> String {
        match self {
            Provenance::Position(index) => format!("position:{index}"),
            Provenance::Pattern => "pattern".to_string(),
        }
    }
}

/// A standalone 6 to 9 digit run seen while looking for the document number.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub value: String,
    pub provenance: Provenance,
    pub selected: bool,
}

impl Candidate {
    pub fn is_document_number(&self) -> bool {
        is_document_number(&self.value)
    }
}

/// Converts `DD/MM/YYYY` to `YYYY-MM-DD`; anything else yields `""`.
pub fn to_iso_date(birth_date: &str) -> String {
    let parts: Vec<&str> = birth_date.split('/').collect();
    match parts.as_slice() {
        [day, month, year] => format!("{year}-{month}-{day}"),
        _ => String::new(),
    }
}
