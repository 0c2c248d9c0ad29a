// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Storage capability seen by the runtime's file and import hooks
//! OWNERS: @port-team
//! PUBLIC API: StorageProvider, NoFilesystem, ImportStat, StorageError
//! INVARIANTS: NoFilesystem never performs I/O; absence is always reported as not-found

use core::convert::Infallible;

use thiserror::Error;

/// POSIX `ENOENT`, the errno the runtime raises for a missing file.
pub const ENOENT: i32 = 2;

/// Result of probing an import path. Discriminants match the runtime's enum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum ImportStat {
    NoExist = 0,
    Dir = 1,
    File = 2,
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum StorageError {
    #[error("no such file or directory")]
    NotFound,
}

impl StorageError {
    pub const fn errno(self) -> i32 {
        match self {
            StorageError::NotFound => ENOENT,
        }
    }
}

/// Filesystem operations the runtime may ask for.
pub trait StorageProvider {
    /// Handle to a source file opened for the compiler.
    type Source;
    /// Handle returned by the `open()` builtin.
    type File;

    fn open_source_file(&self, name: &str) -> Result<Self::Source, StorageError>;
    fn stat_import_path(&self, path: &str) -> ImportStat;
    /// `None` is the runtime's inert "no value" result.
    fn builtin_open(&self, path: &str, mode: &str) -> Option<Self::File>;
}

/// The only provider on this board: code is frozen into flash.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFilesystem;

impl StorageProvider for NoFilesystem {
    type Source = Infallible;
    type File = Infallible;

    fn open_source_file(&self, _name: &str) -> Result<Infallible, StorageError> {
        Err(StorageError::NotFound)
    }

    fn stat_import_path(&self, _path: &str) -> ImportStat {
        ImportStat::NoExist
    }

    fn builtin_open(&self, _path: &str, _mode: &str) -> Option<Infallible> {
        None
    }
}
