//! `gio` command-line attribute backend
//!
//! Reads with `gio info -a <attribute> <path>` and writes with
//! `gio set -t string <path> <attribute> <value>`.

use std::path::Path;
use std::process::{Command, Output};

use crate::store::StoreError;
use crate::store::positions::AttributeBackend;

#[derive(Debug, Clone)]
pub struct GioBackend {
    program: String,
}

impl GioBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, path: &Path, command: &mut Command) -> Result<Output, StoreError> {
        let output = command.output().map_err(|source| StoreError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(StoreError::CommandFailed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl AttributeBackend for GioBackend {
    fn read(&self, path: &Path, attribute: &str) -> Result<Option<String>, StoreError> {
        let output = self.run(
            path,
            Command::new(&self.program)
                .args(["info", "-a", attribute])
                .arg(path),
        )?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(extract_attribute(&stdout, attribute).map(str::to_string))
    }

    fn write(&self, path: &Path, attribute: &str, value: &str) -> Result<(), StoreError> {
        self.run(
            path,
            Command::new(&self.program)
                .args(["set", "-t", "string"])
                .arg(path)
                .args([attribute, value]),
        )?;
        Ok(())
    }
}

/// Finds `attribute` in `gio info` output
///
/// Attribute lines look like `  metadata::caja-icon-position: 64,64`.
fn extract_attribute<'a>(stdout: &'a str, attribute: &str) -> Option<&'a str> {
    stdout.lines().find_map(|line| {
        line.trim_start()
            .strip_prefix(attribute)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTRIBUTE: &str = "metadata::caja-icon-position";

    #[test]
    fn extracts_attribute_value() {
        let stdout = "uri: file:///home/user/Desktop/a.txt\n\
                      local path: /home/user/Desktop/a.txt\n\
                      unix mount: /dev/sda1 / ext4 rw\n\
                      attributes:\n  \
                      metadata::caja-icon-position: 64,128\n";
        assert_eq!(extract_attribute(stdout, ATTRIBUTE), Some("64,128"));
    }

    #[test]
    fn absent_attribute_yields_none() {
        let stdout = "uri: file:///home/user/Desktop/a.txt\nattributes:\n";
        assert_eq!(extract_attribute(stdout, ATTRIBUTE), None);
    }

    #[test]
    fn similar_attribute_names_do_not_match() {
        let stdout = "attributes:\n  metadata::caja-icon-position-timestamp: 1700000000\n";
        assert_eq!(extract_attribute(stdout, ATTRIBUTE), None);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let backend = GioBackend::new("icon-layout-no-such-program");
        let result = backend.read(Path::new("/tmp/a"), ATTRIBUTE);
        assert!(matches!(result, Err(StoreError::Spawn { .. })));
    }
}
