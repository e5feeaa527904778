use std::fmt::Write;

use shared::protocol::{Notice, WorkflowSnapshot};

/// Plain-text view of a snapshot: stage table, listing, then checks once the
/// validation phase is open.
pub fn snapshot(snapshot: &WorkflowSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "stages:");
    for entry in &snapshot.stages {
        let marker = if entry.stage == snapshot.active_stage {
            '>'
        } else {
            ' '
        };
        let lock = if entry.enabled { "" } else { " (locked)" };
        let _ = writeln!(out, "{marker} {:<9} {}{lock}", entry.stage.as_str(), entry.status);
    }

    if !snapshot.current_files.is_empty() {
        let _ = writeln!(out, "files:");
        for file in &snapshot.current_files {
            let mark = if snapshot.is_selected(&file.name) {
                'x'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                "  [{mark}] {} ({} bytes, {})",
                file.name,
                file.size_bytes,
                file.modified_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    if snapshot.validation_phase_enabled {
        let _ = writeln!(out, "checks:");
        for (check, status) in &snapshot.validation_statuses {
            let _ = writeln!(out, "  {:<20} {status}", check.as_str());
        }
    }

    if let Some(Notice::NoFilesFound { stage }) = &snapshot.notice {
        let _ = writeln!(out, "note: no files found for {stage}");
    }
    if snapshot.loading {
        let _ = writeln!(out, "busy: an operation is still running");
    }
    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
