//! Icon position store
//!
//! Loads and saves one `"<x>,<y>"` position per desktop file through an
//! [`AttributeBackend`]. Files without a stored position are not icons as far
//! as the layout is concerned and are omitted, never defaulted to the origin.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::core::VirtualPoint;
use crate::domain::layout::IconPosition;
use crate::store::StoreError;

/// External per-file key/value attribute mechanism
pub trait AttributeBackend {
    /// Reads `attribute` for `path`; `Ok(None)` when the attribute is absent
    fn read(&self, path: &Path, attribute: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` as a string attribute
    fn write(&self, path: &Path, attribute: &str, value: &str) -> Result<(), StoreError>;
}

/// Parses a stored `"<int>,<int>"` value
pub fn parse_position(value: &str) -> Result<VirtualPoint, StoreError> {
    let malformed = || StoreError::MalformedPosition {
        value: value.to_string(),
    };

    let (x, y) = value.trim().split_once(',').ok_or_else(malformed)?;
    let x = x.parse::<i32>().map_err(|_| malformed())?;
    let y = y.parse::<i32>().map_err(|_| malformed())?;

    Ok(VirtualPoint::new(x, y))
}

/// Formats a position the way [`parse_position`] reads it
pub fn format_position(point: VirtualPoint) -> String {
    format!("{},{}", point.x, point.y)
}

#[derive(Debug)]
pub struct PositionStore<B> {
    backend: B,
    desktop_dir: PathBuf,
    attribute: String,
}

impl<B: AttributeBackend> PositionStore<B> {
    pub fn new(backend: B, desktop_dir: impl Into<PathBuf>, attribute: impl Into<String>) -> Self {
        Self {
            backend,
            desktop_dir: desktop_dir.into(),
            attribute: attribute.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Lists the regular files directly under the desktop directory
    ///
    /// Symlinks are followed, so a link to a file counts as a file while links
    /// to directories and dangling links are skipped. The result is sorted by
    /// path so load order is stable between runs.
    fn desktop_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let list_err = |source| StoreError::ListDirectory {
            path: self.desktop_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.desktop_dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_file() => files.push(entry.path()),
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %entry.path().display(), "cannot stat desktop entry: {err}");
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Loads every stored icon position
    ///
    /// Only a failure to list the directory is an error. Per-file read or parse
    /// failures are logged and the file is skipped.
    pub fn load_all(&self) -> Result<Vec<IconPosition>, StoreError> {
        let files = self.desktop_files()?;
        let mut positions = Vec::with_capacity(files.len());

        for path in files {
            match self.load_one(&path) {
                Ok(Some(position)) => positions.push(IconPosition { path, position }),
                Ok(None) => debug!(path = %path.display(), "no stored position"),
                Err(err) => warn!(path = %path.display(), "skipping icon: {err}"),
            }
        }

        info!(
            dir = %self.desktop_dir.display(),
            icons = positions.len(),
            "loaded icon positions"
        );
        Ok(positions)
    }

    fn load_one(&self, path: &Path) -> Result<Option<VirtualPoint>, StoreError> {
        match self.backend.read(path, &self.attribute)? {
            Some(value) => parse_position(&value).map(Some),
            None => Ok(None),
        }
    }

    /// Persists one position
    pub fn save(&self, path: &Path, position: VirtualPoint) -> Result<(), StoreError> {
        let value = format_position(position);
        self.backend.write(path, &self.attribute, &value)?;
        debug!(path = %path.display(), %value, "position saved");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory backend recording every write
    #[derive(Debug, Default)]
    pub(crate) struct MemoryBackend {
        pub values: RefCell<HashMap<PathBuf, String>>,
        pub writes: RefCell<Vec<(PathBuf, String)>>,
        pub fail_writes: bool,
    }

    impl MemoryBackend {
        pub fn with_values<I, P>(values: I) -> Self
        where
            I: IntoIterator<Item = (P, &'static str)>,
            P: Into<PathBuf>,
        {
            let backend = Self::default();
            for (path, value) in values {
                backend.values.borrow_mut().insert(path.into(), value.to_string());
            }
            backend
        }
    }

    impl AttributeBackend for MemoryBackend {
        fn read(&self, path: &Path, _attribute: &str) -> Result<Option<String>, StoreError> {
            Ok(self.values.borrow().get(path).cloned())
        }

        fn write(&self, path: &Path, _attribute: &str, value: &str) -> Result<(), StoreError> {
            self.writes
                .borrow_mut()
                .push((path.to_path_buf(), value.to_string()));
            if self.fail_writes {
                return Err(StoreError::CommandFailed {
                    program: "memory".to_string(),
                    path: path.to_path_buf(),
                    detail: "write rejected".to_string(),
                });
            }
            self.values
                .borrow_mut()
                .insert(path.to_path_buf(), value.to_string());
            Ok(())
        }
    }

    const ATTRIBUTE: &str = "metadata::caja-icon-position";

    #[test]
    fn parses_well_formed_values() {
        assert_eq!(parse_position("64,128").unwrap(), VirtualPoint::new(64, 128));
        assert_eq!(parse_position("-1280,5").unwrap(), VirtualPoint::new(-1280, 5));
        assert_eq!(parse_position(" 10,20\n").unwrap(), VirtualPoint::new(10, 20));
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "10", "10,", ",20", "a,b", "1,2,3", "1.5,2", "10, 20"] {
            assert!(
                matches!(parse_position(value), Err(StoreError::MalformedPosition { .. })),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn format_matches_stored_layout() {
        assert_eq!(format_position(VirtualPoint::new(120, -220)), "120,-220");
    }

    #[test]
    fn load_all_skips_malformed_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = dir.path().join("a.desktop");
        let broken = dir.path().join("b.txt");
        let good_c = dir.path().join("c.pdf");
        let unplaced = dir.path().join("d.png");
        for path in [&good_a, &broken, &good_c, &unplaced] {
            fs::write(path, b"").unwrap();
        }

        let backend = MemoryBackend::with_values([
            (good_a.clone(), "100,200"),
            (broken.clone(), "garbage"),
            (good_c.clone(), "300,400"),
        ]);
        let store = PositionStore::new(backend, dir.path(), ATTRIBUTE);

        let positions = store.load_all().unwrap();
        assert_eq!(
            positions,
            vec![
                IconPosition::new(good_a, 100, 200),
                IconPosition::new(good_c, 300, 400),
            ]
        );
        assert!(
            positions.iter().all(|p| p.position != VirtualPoint::new(0, 0)),
            "Malformed entries must not default to the origin"
        );
    }

    #[test]
    fn load_all_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("folder");
        fs::create_dir(&nested).unwrap();

        let backend = MemoryBackend::with_values([(nested, "1,1")]);
        let store = PositionStore::new(backend, dir.path(), ATTRIBUTE);

        assert!(store.load_all().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn load_all_follows_file_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let target = target_dir.path().join("report.pdf");
        fs::write(&target, b"").unwrap();

        let linked_file = dir.path().join("report.pdf");
        let linked_dir = dir.path().join("projects");
        let dangling = dir.path().join("gone.txt");
        symlink(&target, &linked_file).unwrap();
        symlink(target_dir.path(), &linked_dir).unwrap();
        symlink(dir.path().join("nowhere"), &dangling).unwrap();

        let backend = MemoryBackend::with_values([
            (linked_file.clone(), "5,6"),
            (linked_dir, "7,8"),
            (dangling, "9,9"),
        ]);
        let store = PositionStore::new(backend, dir.path(), ATTRIBUTE);

        assert_eq!(store.load_all().unwrap(), vec![IconPosition::new(linked_file, 5, 6)]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(
            MemoryBackend::default(),
            dir.path().join("does-not-exist"),
            ATTRIBUTE,
        );
        assert!(matches!(store.load_all(), Err(StoreError::ListDirectory { .. })));
    }

    #[test]
    fn save_writes_formatted_value() {
        let store = PositionStore::new(MemoryBackend::default(), "/desk", ATTRIBUTE);
        store
            .save(Path::new("/desk/a"), VirtualPoint::new(120, 220))
            .unwrap();

        let writes = store.backend().writes.borrow();
        assert_eq!(writes.as_slice(), &[(PathBuf::from("/desk/a"), "120,220".to_string())]);
    }
}
