use crate::error::{GridError, Result};
use crate::table::{cell_text, Row};
use std::io::Write;
use std::process::{Command, Stdio};

type ClipboardProgram = (&'static str, &'static [&'static str]);

const MACOS: &[ClipboardProgram] = &[("pbcopy", &[])];
const WINDOWS: &[ClipboardProgram] = &[("clip", &[])];
const UNIX: &[ClipboardProgram] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Clipboard programs to try, in order, for the current OS.
fn candidates() -> &'static [ClipboardProgram] {
    if cfg!(target_os = "macos") {
        MACOS
    } else if cfg!(target_os = "windows") {
        WINDOWS
    } else {
        UNIX
    }
}

/// Copies text to the system clipboard by piping it into the platform's clipboard
/// program (pbcopy, clip, wl-copy, xclip or xsel).
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut last_error = None;
    for (program, args) in candidates() {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error
        .unwrap_or_else(|| GridError::Clipboard("No clipboard program available".to_string())))
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| GridError::Clipboard(format!("Failed to spawn {}: {}", program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(GridError::Clipboard(format!(
                "Failed to write to {}: {}",
                program, e
            )));
        }
    }

    let status = child
        .wait()
        .map_err(|e| GridError::Clipboard(format!("Failed to wait for {}: {}", program, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(GridError::Clipboard(format!("{} exited with error", program)))
    }
}

/// Rows as tab-separated lines, ready to paste into a spreadsheet.
pub fn rows_to_text(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| {
            row.values()
                .map(|v| cell_text(Some(v)))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
