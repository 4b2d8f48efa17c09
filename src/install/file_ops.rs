//! File service: copies, writes and removals between symbolic directories.
//!
//! Callers name directory roles, never literal paths. Operations return a
//! status code (0 = success) the way the setup phases report them.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::error::{STATUS_OK, SetupError};

/// Symbolic directory roles resolved by the file service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileDirectory {
    /// Configuration source directory (operator supplied files such as IdP metadata)
    Config,
    /// Host runtime directory the ADFS process reads from
    AdfsDir,
    /// Distribution directory holding the assemblies of the version being installed
    Dist,
    /// Backup folder of this run
    Backup,
}

/// File operations consumed by extractors, backup and install
pub trait FileService {
    /// Literal path of `filename` in `dir`
    fn path(&self, dir: FileDirectory, filename: &str) -> PathBuf;

    fn exists(&self, dir: FileDirectory, filename: &str) -> bool {
        self.path(dir, filename).is_file()
    }

    fn read_to_string(&self, dir: FileDirectory, filename: &str) -> io::Result<String> {
        fs::read_to_string(self.path(dir, filename))
    }

    fn copy_file(&self, from: FileDirectory, to: FileDirectory, filename: &str) -> i32;

    fn write_file(&self, dir: FileDirectory, filename: &str, contents: &str) -> i32;

    /// Remove a file; a file that is already gone counts as success
    fn remove_file(&self, dir: FileDirectory, filename: &str) -> i32;
}

/// Literal directories behind the roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    pub config: PathBuf,
    pub adfs: PathBuf,
    pub dist: PathBuf,
    pub backup: PathBuf,
}

impl DirectoryLayout {
    pub fn dir(&self, dir: FileDirectory) -> &Path {
        match dir {
            FileDirectory::Config => &self.config,
            FileDirectory::AdfsDir => &self.adfs,
            FileDirectory::Dist => &self.dist,
            FileDirectory::Backup => &self.backup,
        }
    }
}

/// Status code for an I/O failure, Win32 style where a mapping exists
pub fn status_from_io(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => 2,
        io::ErrorKind::PermissionDenied => 5,
        _ => err.raw_os_error().filter(|c| *c != STATUS_OK).unwrap_or(1),
    }
}

/// Turn a file service status into a typed error carrying the path
pub fn check_status(code: i32, path: PathBuf) -> Result<(), SetupError> {
    if code == STATUS_OK {
        Ok(())
    } else {
        Err(SetupError::FileOperation { path, code })
    }
}

/// Write file atomically to prevent corruption
pub(crate) fn write_file_atomic(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)
}

/// Real filesystem implementation
#[derive(Debug, Clone)]
pub struct FsFileService {
    layout: DirectoryLayout,
}

impl FsFileService {
    pub fn new(layout: DirectoryLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    fn ensure_dir(&self, dir: FileDirectory) -> io::Result<()> {
        fs::create_dir_all(self.layout.dir(dir))
    }
}

impl FileService for FsFileService {
    fn path(&self, dir: FileDirectory, filename: &str) -> PathBuf {
        self.layout.dir(dir).join(filename)
    }

    fn copy_file(&self, from: FileDirectory, to: FileDirectory, filename: &str) -> i32 {
        let src = self.path(from, filename);
        let dest = self.path(to, filename);

        let result = self
            .ensure_dir(to)
            .and_then(|()| fs::copy(&src, &dest).map(|_| ()));

        match result {
            Ok(()) => {
                debug!("Copied {} to {}", src.display(), dest.display());
                STATUS_OK
            }
            Err(e) => {
                warn!("Failed to copy {} to {}: {e}", src.display(), dest.display());
                status_from_io(&e)
            }
        }
    }

    fn write_file(&self, dir: FileDirectory, filename: &str, contents: &str) -> i32 {
        let dest = self.path(dir, filename);

        let result = self
            .ensure_dir(dir)
            .and_then(|()| write_file_atomic(&dest, contents));

        match result {
            Ok(()) => {
                debug!("Wrote {}", dest.display());
                STATUS_OK
            }
            Err(e) => {
                warn!("Failed to write {}: {e}", dest.display());
                status_from_io(&e)
            }
        }
    }

    fn remove_file(&self, dir: FileDirectory, filename: &str) -> i32 {
        let target = self.path(dir, filename);
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!("Removed {}", target.display());
                STATUS_OK
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => STATUS_OK,
            Err(e) => {
                warn!("Failed to remove {}: {e}", target.display());
                status_from_io(&e)
            }
        }
    }
}
