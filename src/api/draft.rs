//! Purpose: Map a scanned identity into the patient registration form shape.
//! Exports: `RegistrationDraft`.
//! Role: Prefill handoff for callers routing unknown patients to registration.
//! Invariants: Field names match the registration form (`dni`, `nombre`, `apellido`, `sexo`, `fecnac`).
//! Invariants: Unknown names are empty strings; unknown sex defaults to `M`; `fecnac` is ISO or empty.

use serde::Serialize;

use crate::core::record::{IdentityRecord, SexCode, UNAVAILABLE};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RegistrationDraft {
    #[serde(rename = "dni")]
    pub document_number: String,
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "fecnac")]
    pub birth_date: String,
}

impl RegistrationDraft {
    pub fn from_record(record: &IdentityRecord) -> Self {
        Self {
            document_number: record.document_number().to_string(),
            given_name: known(record.given_name()),
            surname: known(record.surname()),
            sex: record
                .sex_code()
                .unwrap_or(SexCode::Male)
                .as_str()
                .to_string(),
            birth_date: record.birth_date_iso(),
        }
    }
}

fn known(value: &str) -> String {
    if value == UNAVAILABLE {
        String::new()
    } else {
        value.to_string()
    }
}
