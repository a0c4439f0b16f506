//! Host capability checks: is an OCR engine installed, which models exist.
//!
//! These are questions about the machine, not business logic. They sit
//! behind [`HostCapabilities`] so the workflow can be driven in tests with a
//! fake host, and neither check ever fails: a missing binary is a normal,
//! expected answer.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// What the host machine can do for us.
pub trait HostCapabilities: Send + Sync {
    /// Whether the OCR engine can be invoked.
    fn ocr_available(&self) -> bool;

    /// Locally installed model identifiers. Empty when unknown.
    fn list_models(&self) -> Vec<String>;
}

/// Checks the real host via `PATH` lookup and the `ollama` CLI.
#[derive(Debug, Clone)]
pub struct SystemHost {
    ocr_binary: String,
    ollama_binary: String,
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl SystemHost {
    pub fn new(ocr_binary: impl Into<String>) -> Self {
        Self {
            ocr_binary: ocr_binary.into(),
            ollama_binary: "ollama".to_string(),
        }
    }

    pub fn with_ollama_binary(mut self, binary: impl Into<String>) -> Self {
        self.ollama_binary = binary.into();
        self
    }
}

impl HostCapabilities for SystemHost {
    fn ocr_available(&self) -> bool {
        let found = find_executable(&self.ocr_binary);
        debug!("OCR binary '{}' found: {:?}", self.ocr_binary, found);
        found.is_some()
    }

    fn list_models(&self) -> Vec<String> {
        match Command::new(&self.ollama_binary).arg("list").output() {
            Ok(out) if out.status.success() => {
                parse_model_list(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                debug!("'{} list' exited with {}", self.ollama_binary, out.status);
                Vec::new()
            }
            Err(e) => {
                debug!("'{} list' could not run: {}", self.ollama_binary, e);
                Vec::new()
            }
        }
    }
}

/// Parse `ollama list` output: drop the header line, keep the first token
/// of every remaining non-blank line.
pub fn parse_model_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Search `PATH` for an executable named `name`.
///
/// A name containing a path separator is checked as-is.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| executable_names(name).map(move |n| dir.join(n)))
        .find(|p| is_executable(p))
}

fn executable_names(name: &str) -> impl Iterator<Item = String> + '_ {
    let exts: &[&str] = if cfg!(windows) { &["", ".exe", ".cmd", ".bat"] } else { &[""] };
    exts.iter().map(move |ext| format!("{name}{ext}"))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Display name for a binary path, for log lines.
pub fn binary_label(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_model_list_skips_header() {
        let out = "NAME                ID              SIZE      MODIFIED\n\
                   llama3.2:3b         a80c4f17acd5    2.0 GB    3 days ago\n\
                   \n\
                   gemma:2b            b50d6c999e59    1.7 GB    2 weeks ago\n";
        assert_eq!(parse_model_list(out), vec!["llama3.2:3b", "gemma:2b"]);
    }

    #[test]
    fn parse_model_list_header_only_is_empty() {
        assert!(parse_model_list("NAME ID SIZE MODIFIED\n").is_empty());
        assert!(parse_model_list("").is_empty());
    }

    #[test]
    fn missing_binaries_are_not_errors() {
        let host = SystemHost::new("definitely-not-a-real-ocr-binary-xyz")
            .with_ollama_binary("definitely-not-a-real-ollama-xyz");
        assert!(!host.ocr_available());
        assert!(host.list_models().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn find_executable_checks_explicit_paths() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-ocr");
        std::fs::write(&bin, "#!/bin/sh\n").unwrap();

        assert!(find_executable(bin.to_str().unwrap()).is_none());

        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_executable(bin.to_str().unwrap()), Some(bin.clone()));
        assert_eq!(binary_label(&bin), "fake-ocr");
    }
}
