//! CONTEXT: Tests for the filesystem stubs the runtime links against
//! OWNERS: @port-team
//! STATUS: Functional
//! TEST_COVERAGE: 3 integration tests (1 property)
//!
//! TEST_SCENARIOS:
//!   - open_reports_enoent()
//!   - nothing_is_importable(): property over arbitrary paths
//!   - builtin_open_returns_none()

use proptest::prelude::*;

use keel::storage::ENOENT;
use keel::{ImportStat, NoFilesystem, StorageError, StorageProvider};

#[test]
fn open_reports_enoent() {
    let err = NoFilesystem.open_source_file("main.py").unwrap_err();
    assert_eq!(err, StorageError::NotFound);
    assert_eq!(err.errno(), ENOENT);
    assert_eq!(err.to_string(), "no such file or directory");
}

proptest! {
    #[test]
    fn nothing_is_importable(path in "[a-z_/.]{0,32}") {
        prop_assert_eq!(NoFilesystem.stat_import_path(&path), ImportStat::NoExist);
        prop_assert!(NoFilesystem.open_source_file(&path).is_err());
    }
}

#[test]
fn builtin_open_returns_none() {
    assert!(NoFilesystem.builtin_open("data.txt", "w").is_none());
    assert!(NoFilesystem.builtin_open("", "").is_none());
}
