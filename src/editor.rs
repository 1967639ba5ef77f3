//! External editor sessions over scratch files
//!
//! Journal plaintext never lives anywhere durable: it is written to a
//! uniquely named scratch file in the system temp directory, the user's
//! editor is run against that path with inherited stdio, and the scratch
//! file is removed on every exit path once its contents are no longer
//! needed.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::error::{CryptkeeperError, ErrorCategory, ErrorKind, Result};

/// Editor used when none is requested or the requested one is unsupported.
pub const DEFAULT_EDITOR: &str = "vim";

/// Editors known to behave correctly when run against a scratch file.
const SUPPORTED_EDITORS: [&str; 5] = ["vim", "vi", "code", "vsc", "nano"];

/// Trait for deciding which editor command to run.
pub trait EditorResolver {
    fn resolve(&self) -> String;
}

/// Resolves the user's requested editor against the supported set.
///
/// Unsupported or absent requests silently degrade to [`DEFAULT_EDITOR`];
/// this is a safety policy, never a user-facing error.
pub struct PreferredEditorResolver {
    requested: Option<String>,
}

impl PreferredEditorResolver {
    pub fn new(requested: Option<&str>) -> Self {
        Self {
            requested: requested.map(str::to_string),
        }
    }
}

impl EditorResolver for PreferredEditorResolver {
    fn resolve(&self) -> String {
        match &self.requested {
            Some(name) if SUPPORTED_EDITORS.contains(&name.as_str()) => name.clone(),
            _ => DEFAULT_EDITOR.to_string(),
        }
    }
}

/// Returns an arbitrary editor command unchecked (for testing).
pub struct ConstantEditorResolver {
    editor: String,
}

impl ConstantEditorResolver {
    pub fn new(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
        }
    }
}

impl EditorResolver for ConstantEditorResolver {
    fn resolve(&self) -> String {
        self.editor.clone()
    }
}

/// Build the argument list for an editor invocation.
///
/// GUI editors detach from the terminal by default; `--wait` keeps the
/// process blocking until the user closes the file. Without it the flow
/// would race past the editor and capture an empty entry.
fn editor_args(editor: &str, scratch: &Path) -> Vec<OsString> {
    let mut args = Vec::new();

    if editor.contains("code") || editor.contains("vsc") {
        args.push(OsString::from("--wait"));
    }
    args.push(scratch.as_os_str().to_os_string());

    args
}

/// Run the resolved editor against a scratch file and wait for it to exit.
///
/// The spawned process inherits stdin/stdout/stderr so the user interacts
/// with the editor directly. A missing executable and a failing editor are
/// distinct errors; neither is swallowed.
fn open_editor(scratch: &Path, resolver: &dyn EditorResolver) -> Result<()> {
    let editor = resolver.resolve();

    let status = Command::new(&editor)
        .args(editor_args(&editor, scratch))
        .status()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CryptkeeperError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::EditorNotFound,
                    format!("editor '{}' not found on the search path", editor),
                    e,
                )
            } else {
                CryptkeeperError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::EditorFailed,
                    format!("failed to run editor '{}'", editor),
                    e,
                )
            }
        })?;

    if !status.success() {
        return Err(CryptkeeperError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EditorFailed,
            format!("editor '{}' exited with {}", editor, status),
        ));
    }

    Ok(())
}

fn scratch_error(msg: &str, err: io::Error) -> CryptkeeperError {
    CryptkeeperError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::ScratchFileIo,
        msg,
        err,
    )
}

/// Compose a journal entry in the user's editor and return the bytes.
///
/// The scratch file is created empty with owner-only permissions, handed
/// to the editor, read back after the editor exits, and removed when the
/// guard drops - on the error paths too.
pub fn capture_input(resolver: &dyn EditorResolver) -> Result<Vec<u8>> {
    let scratch =
        NamedTempFile::new().map_err(|e| scratch_error("failed to create scratch file", e))?;

    open_editor(scratch.path(), resolver)?;

    let contents = fs::read(scratch.path())
        .map_err(|e| scratch_error("failed to read scratch file back", e))?;

    Ok(contents)
}

/// Display plaintext in the user's editor for viewing.
///
/// The plaintext is written to a scratch file that is removed once the
/// editor exits; nothing is captured back.
pub fn display_output(plaintext: &[u8], resolver: &dyn EditorResolver) -> Result<()> {
    let mut scratch =
        NamedTempFile::new().map_err(|e| scratch_error("failed to create scratch file", e))?;

    scratch
        .write_all(plaintext)
        .and_then(|_| scratch.flush())
        .map_err(|e| scratch_error("failed to write scratch file", e))?;

    open_editor(scratch.path(), resolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_editor_is_kept() {
        for name in SUPPORTED_EDITORS {
            let resolver = PreferredEditorResolver::new(Some(name));
            assert_eq!(resolver.resolve(), name);
        }
    }

    #[test]
    fn test_unsupported_editor_degrades_to_default() {
        let resolver = PreferredEditorResolver::new(Some("emacs"));
        assert_eq!(resolver.resolve(), DEFAULT_EDITOR);
    }

    #[test]
    fn test_empty_request_degrades_to_default() {
        assert_eq!(PreferredEditorResolver::new(Some("")).resolve(), DEFAULT_EDITOR);
        assert_eq!(PreferredEditorResolver::new(None).resolve(), DEFAULT_EDITOR);
    }

    #[test]
    fn test_editor_args_plain() {
        let args = editor_args("vim", Path::new("/tmp/scratch"));
        assert_eq!(args, vec![OsString::from("/tmp/scratch")]);
    }

    #[test]
    fn test_editor_args_wait_flag() {
        for editor in ["code", "vsc", "/usr/local/bin/code"] {
            let args = editor_args(editor, Path::new("/tmp/scratch"));
            assert_eq!(
                args,
                vec![OsString::from("--wait"), OsString::from("/tmp/scratch")]
            );
        }
    }

    #[test]
    fn test_missing_editor_is_fatal() {
        let resolver = ConstantEditorResolver::new("cryptkeeper-no-such-editor-2e41");
        let err = capture_input(&resolver).expect_err("expected missing editor to fail");
        assert_eq!(err.kind, Some(ErrorKind::EditorNotFound));
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_editor_is_propagated() {
        let resolver = ConstantEditorResolver::new("false");
        let err = capture_input(&resolver).expect_err("expected failing editor to error");
        assert_eq!(err.kind, Some(ErrorKind::EditorFailed));
    }

    #[test]
    #[cfg(unix)]
    fn test_capture_with_noop_editor_returns_empty() {
        // `true` exits successfully without touching the scratch file.
        let resolver = ConstantEditorResolver::new("true");
        let contents = capture_input(&resolver).unwrap();
        assert!(contents.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_display_with_noop_editor() {
        let resolver = ConstantEditorResolver::new("true");
        display_output(b"decrypted entry", &resolver).unwrap();
    }
}
