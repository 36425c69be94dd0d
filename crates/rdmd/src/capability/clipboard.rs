//! System clipboard access.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use tracing::debug;

use super::{CAPABILITY_TARGET, CapabilityError};

/// Reads and writes the host clipboard.
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform helper fails.
    fn copy(&self, text: &str) -> Result<(), CapabilityError>;

    /// Returns the current clipboard contents.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform helper fails.
    fn paste(&self) -> Result<Vec<u8>, CapabilityError>;
}

struct HelperCommand {
    program: &'static str,
    args: &'static [&'static str],
}

#[cfg(target_os = "macos")]
const COPY_HELPER: Option<HelperCommand> = Some(HelperCommand {
    program: "pbcopy",
    args: &[],
});
#[cfg(target_os = "macos")]
const PASTE_HELPER: Option<HelperCommand> = Some(HelperCommand {
    program: "pbpaste",
    args: &[],
});

#[cfg(all(unix, not(target_os = "macos")))]
const COPY_HELPER: Option<HelperCommand> = Some(HelperCommand {
    program: "xclip",
    args: &["-in", "-selection", "clipboard"],
});
#[cfg(all(unix, not(target_os = "macos")))]
const PASTE_HELPER: Option<HelperCommand> = Some(HelperCommand {
    program: "xclip",
    args: &["-out", "-selection", "clipboard"],
});

#[cfg(not(unix))]
const COPY_HELPER: Option<HelperCommand> = None;
#[cfg(not(unix))]
const PASTE_HELPER: Option<HelperCommand> = None;

/// Clipboard backed by `pbcopy`/`pbpaste` on macOS and `xclip` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandClipboard;

impl Clipboard for CommandClipboard {
    fn copy(&self, text: &str) -> Result<(), CapabilityError> {
        let helper = COPY_HELPER.ok_or(CapabilityError::Unsupported {
            capability: "copy",
        })?;
        let program = helper.program;
        debug!(target: CAPABILITY_TARGET, program, bytes = text.len(), "copying to clipboard");

        let mut child = Command::new(program)
            .args(helper.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CapabilityError::Spawn { program, source })?;

        feed_and_wait(&mut child, program, text)
    }

    fn paste(&self) -> Result<Vec<u8>, CapabilityError> {
        let helper = PASTE_HELPER.ok_or(CapabilityError::Unsupported {
            capability: "paste",
        })?;
        let program = helper.program;
        let output = Command::new(program)
            .args(helper.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| CapabilityError::Spawn { program, source })?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(CapabilityError::Failed {
                program,
                status: output.status,
            })
        }
    }
}

/// Writes `text` to the helper's stdin and waits for it to exit.
///
/// The child is always reaped, including when the helper stops reading early.
fn feed_and_wait(child: &mut Child, program: &'static str, text: &str) -> Result<(), CapabilityError> {
    // Dropping stdin closes the pipe so the helper sees end-of-input.
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
    if let Err(source) = written {
        drop(child.kill());
        drop(child.wait());
        return Err(CapabilityError::Io { program, source });
    }

    let status = child
        .wait()
        .map_err(|source| CapabilityError::Io { program, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(CapabilityError::Failed { program, status })
    }
}

/// In-memory clipboard for exercising the dispatcher.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryClipboard {
    contents: std::sync::Mutex<Vec<u8>>,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), CapabilityError> {
        let mut contents = self.contents.lock().expect("clipboard mutex poisoned");
        *contents = text.as_bytes().to_vec();
        Ok(())
    }

    fn paste(&self) -> Result<Vec<u8>, CapabilityError> {
        Ok(self.contents.lock().expect("clipboard mutex poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_round_trips_text() {
        let clipboard = MemoryClipboard::default();
        clipboard.copy("test 1 2 3").expect("copy");
        assert_eq!(clipboard.paste().expect("paste"), b"test 1 2 3".to_vec());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn helper_that_stops_reading_is_reaped() {
        let mut child = Command::new("true")
            .stdin(Stdio::piped())
            .spawn()
            .expect("spawn helper");
        let pid = child.id();
        let text = "x".repeat(1024 * 1024);

        let error = feed_and_wait(&mut child, "true", &text).expect_err("pipe closes early");
        assert!(matches!(error, CapabilityError::Io { .. }));
        assert!(
            !std::path::Path::new(&format!("/proc/{pid}")).exists(),
            "helper {pid} was left unreaped"
        );
    }

    #[test]
    fn memory_clipboard_starts_empty() {
        let clipboard = MemoryClipboard::default();
        assert!(clipboard.paste().expect("paste").is_empty());
    }
}
