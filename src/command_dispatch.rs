//! Purpose: Hold top-level CLI command dispatch for `dniscan`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Parse failures are reports (stdout) plus a non-zero exit code, not errors.
//! Invariants: Helpers in `main.rs` own output formatting.

use super::*;
use tracing::debug;

pub(super) fn dispatch_command(
    command: Command,
    options: ParseOptions,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "dniscan", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Parse { payload, prefill } => {
            let payload = read_payload_arg(payload)?;
            match scan(&payload, &options) {
                Ok(scan) => {
                    debug!(
                        scheme = scan.scheme.label(),
                        candidates = scan.candidates.len(),
                        "parsed payload"
                    );
                    let value = if prefill {
                        draft_json(&RegistrationDraft::from_record(&scan.record))?
                    } else {
                        scan_json(&scan)
                    };
                    emit_json(value, color_mode);
                    Ok(RunOutcome::ok())
                }
                Err(failure) => {
                    debug!(
                        kind = failure.kind().label(),
                        candidates = failure.candidates().len(),
                        "payload rejected"
                    );
                    emit_json(failure_json(&failure), color_mode);
                    Ok(RunOutcome::with_code(failure_exit_code(&failure)))
                }
            }
        }
        Command::Batch {
            file,
            errors,
            max_line_bytes,
        } => {
            if max_line_bytes == 0 {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("--max-line-bytes must be greater than zero")
                    .with_hint("Use a positive byte limit, e.g. --max-line-bytes 65536."));
            }
            let reader = open_batch_reader(file.as_deref())?;
            let config = BatchConfig {
                errors: error_policy_to_batch(errors),
                max_record_bytes: max_line_bytes,
                max_snippet_bytes: DEFAULT_MAX_SNIPPET_BYTES,
                options,
            };
            let outcome = run_batch(
                reader,
                config,
                |record| {
                    emit_jsonl(&batch_record_json(&record));
                    Ok(())
                },
                |failure| batch_failure_notice(&failure, color_mode),
            )?;
            if config.errors == ErrorPolicy::Skip && outcome.failed > 0 {
                batch_summary_notice(&outcome, color_mode);
            }
            Ok(RunOutcome::ok())
        }
        Command::Manual { number, prefill } => match manual_entry(&number) {
            Ok(record) => {
                let value = if prefill {
                    draft_json(&RegistrationDraft::from_record(&record))?
                } else {
                    manual_json(&record)
                };
                emit_json(value, color_mode);
                Ok(RunOutcome::ok())
            }
            Err(failure) => {
                emit_json(failure_json(&failure), color_mode);
                Ok(RunOutcome::with_code(failure_exit_code(&failure)))
            }
        },
        Command::IsoDate { date } => {
            println!("{}", to_iso_date(&date));
            Ok(RunOutcome::ok())
        }
    }
}
