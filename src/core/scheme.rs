//! Purpose: Detect how a decoded payload is segmented and split it into positional fields.
//! Exports: `DelimiterScheme`, `SchemePriority`, `detect`, `segment`.
//! Role: Table-driven scheme selection used by the payload parser.
//! Invariants: Exactly one scheme is selected per payload; the first delimiter present wins.
//! Invariants: `Unstructured` always segments to a single field holding the whole payload.

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DelimiterScheme {
    /// Fields separated by `@` (the national ID card layout).
    AtSign,
    /// Fields separated by `|`.
    Pipe,
    Unstructured,
}

impl DelimiterScheme {
    pub fn delimiter(self) -> Option<char> {
        match self {
            DelimiterScheme::AtSign => Some('@'),
            DelimiterScheme::Pipe => Some('|'),
            DelimiterScheme::Unstructured => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DelimiterScheme::AtSign => "at_sign",
            DelimiterScheme::Pipe => "pipe",
            DelimiterScheme::Unstructured => "unstructured",
        }
    }
}

/// Order in which delimiters are tested when a payload contains more than one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SchemePriority {
    #[default]
    AtSignFirst,
    PipeFirst,
}

impl SchemePriority {
    pub fn order(self) -> [DelimiterScheme; 2] {
        match self {
            SchemePriority::AtSignFirst => [DelimiterScheme::AtSign, DelimiterScheme::Pipe],
            SchemePriority::PipeFirst => [DelimiterScheme::Pipe, DelimiterScheme::AtSign],
        }
    }
}

pub fn detect(raw: &str, priority: SchemePriority) -> DelimiterScheme {
    priority
        .order()
        .into_iter()
        .find(|scheme| scheme.delimiter().is_some_and(|delim| raw.contains(delim)))
        .unwrap_or(DelimiterScheme::Unstructured)
}

pub fn segment(raw: &str, scheme: DelimiterScheme) -> Vec<&str> {
    match scheme.delimiter() {
        Some(delim) => raw.split(delim).collect(),
        None => vec![raw],
    }
}
