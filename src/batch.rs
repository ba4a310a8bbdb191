//! Purpose: Parse newline-delimited payload streams for `dniscan batch`.
//! Exports: `ErrorPolicy`, `BatchConfig`, `BatchOutcome`, `BatchFailure`, `BatchRecord`, `run_batch`.
//! Role: Input engine used by the CLI; isolates line handling and failure policy from main.
//! Invariants: One payload per line; blank lines are ignored and not counted.
//! Invariants: Per-line buffering is capped at `max_record_bytes` (+ line terminator).
//! Invariants: Skip mode continues at the next line; stop mode returns the first failure.
use std::io::{self, BufRead, BufReader, Read};

use bstr::ByteSlice;
use dniscan::api::{Error, ErrorKind, ParseFailure, ParseOptions, Scan, scan};
use tracing::debug;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorPolicy {
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug)]
pub struct BatchConfig {
    pub errors: ErrorPolicy,
    pub max_record_bytes: usize,
    pub max_snippet_bytes: usize,
    pub options: ParseOptions,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

/// A parsed or rejected payload, reported for every readable line.
#[derive(Debug)]
pub struct BatchRecord {
    pub line: u64,
    pub result: Result<Scan, ParseFailure>,
}

#[derive(Clone, Debug)]
pub struct BatchFailure {
    pub line: u64,
    pub error_kind: String,
    pub message: String,
    pub snippet: Option<String>,
}

fn io_error(err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to read payload input")
        .with_source(err)
}

pub fn run_batch<R, F, N>(
    reader: R,
    config: BatchConfig,
    mut on_record: F,
    mut on_failure: N,
) -> Result<BatchOutcome, Error>
where
    R: Read,
    F: FnMut(BatchRecord) -> Result<(), Error>,
    N: FnMut(BatchFailure),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut outcome = BatchOutcome::default();
    let mut line_no = 0u64;

    loop {
        let Some(truncated) = read_bounded_line(&mut reader, &mut buf, config.max_record_bytes)
            .map_err(io_error)?
        else {
            break;
        };
        line_no += 1;
        let text = buf.to_str_lossy();
        let payload = text.trim_end_matches(['\n', '\r']);
        if payload.trim().is_empty() {
            continue;
        }
        outcome.records_total += 1;

        if truncated || payload.len() > config.max_record_bytes {
            outcome.failed += 1;
            debug!(line = line_no, "payload exceeds size limit");
            let snippet = truncate_snippet(payload, config.max_snippet_bytes);
            match config.errors {
                ErrorPolicy::Stop => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("payload exceeds size limit")
                        .with_hint("Provide one decoded payload per line.")
                        .with_excerpt(snippet)
                        .with_line(line_no));
                }
                ErrorPolicy::Skip => {
                    on_failure(BatchFailure {
                        line: line_no,
                        error_kind: "Oversize".to_string(),
                        message: "payload exceeds size limit".to_string(),
                        snippet: Some(snippet),
                    });
                    continue;
                }
            }
        }

        let result = scan(payload, &config.options);
        let failure = match &result {
            Ok(scan) => {
                outcome.ok += 1;
                debug!(
                    line = line_no,
                    scheme = scan.scheme.label(),
                    candidates = scan.candidates.len(),
                    "parsed payload"
                );
                None
            }
            Err(failure) => {
                outcome.failed += 1;
                debug!(line = line_no, kind = failure.kind().label(), "payload rejected");
                Some(failure.clone())
            }
        };
        on_record(BatchRecord {
            line: line_no,
            result,
        })?;

        let Some(failure) = failure else {
            continue;
        };
        match config.errors {
            ErrorPolicy::Stop => return Err(Error::from(failure).with_line(line_no)),
            ErrorPolicy::Skip => on_failure(BatchFailure {
                line: line_no,
                error_kind: failure.kind().label().to_string(),
                message: failure.to_string(),
                snippet: Some(truncate_snippet(
                    failure.excerpt(),
                    config.max_snippet_bytes,
                )),
            }),
        }
    }

    Ok(outcome)
}

/// Reads one line into `buf`, keeping at most `max + 2` bytes (room for `\r\n`).
/// Returns `None` at EOF, otherwise whether bytes were dropped.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<Option<bool>> {
    buf.clear();
    let cap = max.saturating_add(2);
    let mut read_any = false;
    let mut truncated = false;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        read_any = true;
        let (used, done) = match available.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        let room = cap.saturating_sub(buf.len());
        if used > room {
            truncated = true;
        }
        buf.extend_from_slice(&available[..used.min(room)]);
        reader.consume(used);
        if done {
            break;
        }
    }
    Ok(read_any.then_some(truncated))
}

fn truncate_snippet(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let suffix = "...";
    if max <= suffix.len() {
        return suffix[..max].to_string();
    }
    let mut take = max - suffix.len();
    while !input.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{suffix}", &input[..take])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config(errors: ErrorPolicy) -> BatchConfig {
        BatchConfig {
            errors,
            max_record_bytes: 64,
            max_snippet_bytes: 16,
            options: ParseOptions::default(),
        }
    }

    fn collect(
        input: &str,
        errors: ErrorPolicy,
    ) -> (Result<BatchOutcome, Error>, Vec<BatchRecord>, Vec<BatchFailure>) {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        let result = run_batch(
            Cursor::new(input.as_bytes().to_vec()),
            config(errors),
            |record| {
                records.push(record);
                Ok(())
            },
            |failure| failures.push(failure),
        );
        (result, records, failures)
    }

    #[test]
    fn skip_mode_reports_every_line() {
        let input = "A@B@C@M@12345678\n\nno digits\r\nXYZ 7654321\n";
        let (result, records, failures) = collect(input, ErrorPolicy::Skip);
        let outcome = result.expect("outcome");
        assert_eq!(
            outcome,
            BatchOutcome {
                records_total: 3,
                ok: 2,
                failed: 1
            }
        );
        let lines: Vec<u64> = records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].line, 3);
        assert_eq!(failures[0].error_kind, "NoDocumentNumberFound");
    }

    #[test]
    fn stop_mode_returns_first_failure_with_line() {
        let input = "XYZ 7654321\n123456789\nXYZ 1234567\n";
        let (result, records, failures) = collect(input, ErrorPolicy::Stop);
        let err = result.expect_err("stop");
        assert_eq!(err.kind(), ErrorKind::DocumentNumberOutOfRange);
        assert_eq!(err.line(), Some(2));
        assert_eq!(records.len(), 2);
        assert!(failures.is_empty());
    }

    #[test]
    fn oversize_lines_are_skipped() {
        let long = format!("{} 12345678", "x".repeat(100));
        let input = format!("{long}\nXYZ 7654321\n");
        let (result, records, failures) = collect(&input, ErrorPolicy::Skip);
        let outcome = result.expect("outcome");
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.ok, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
        assert_eq!(failures[0].error_kind, "Oversize");
        assert!(failures[0].snippet.as_deref().unwrap_or("").ends_with("..."));
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let (result, records, _) = collect("XYZ 7654321", ErrorPolicy::Stop);
        assert_eq!(result.expect("outcome").ok, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn latin1_bytes_are_decoded_lossily() {
        let mut bytes = b"1@PE".to_vec();
        bytes.push(0xD1);
        bytes.extend_from_slice(b"A@ANA@F@12345678\n");
        let mut records = Vec::new();
        let outcome = run_batch(
            Cursor::new(bytes),
            config(ErrorPolicy::Stop),
            |record| {
                records.push(record);
                Ok(())
            },
            |_| {},
        )
        .expect("outcome");
        assert_eq!(outcome.ok, 1);
        let scan = records[0].result.as_ref().expect("scan");
        assert_eq!(scan.record.document_number(), "12345678");
        assert_eq!(scan.record.surname(), "PE\u{FFFD}A");
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let snippet = truncate_snippet("abcdeñghijklmnop", 8);
        assert_eq!(snippet, "abcde...");
        let snippet = truncate_snippet("abcdñfghijklmnop", 8);
        assert_eq!(snippet, "abcd...");
    }
}
