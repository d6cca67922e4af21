//! Board persistence: load/save by id, decoupled from the mutation rules.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::board::Board;
use crate::error::StoreError;

pub trait BoardStore {
    /// Exclusive hold on one board, released on drop. Callers keep it across
    /// the whole load -> save cycle.
    type Lock;

    fn lock(&self, id: &str) -> Result<Self::Lock, StoreError>;
    /// `Ok(None)` when the board has never been saved.
    fn load(&self, id: &str) -> Result<Option<Board>, StoreError>;
    fn save(&self, board: &Board) -> Result<(), StoreError>;
}

/// Board ids double as file names, so keep them to a safe alphabet.
pub fn validate_board_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: Mutex<HashMap<String, Board>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardStore for MemoryStore {
    /// Nothing outside this process can see the map; the gateway's in-process
    /// lock is enough.
    type Lock = ();

    fn lock(&self, _id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<Board>, StoreError> {
        let boards = self.boards.lock().unwrap_or_else(|e| e.into_inner());
        Ok(boards.get(id).cloned())
    }

    fn save(&self, board: &Board) -> Result<(), StoreError> {
        let mut boards = self.boards.lock().unwrap_or_else(|e| e.into_inner());
        boards.insert(board.id().to_string(), board.clone());
        Ok(())
    }
}

/// One pretty-printed JSON document per board: `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_board_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }
}

/// `flock` on `<dir>/<id>.lock`. Dropping the file handle releases it.
#[derive(Debug)]
pub struct BoardFileLock {
    _file: File,
}

/// Blocking exclusive flock. Locks taken through separate `open` calls
/// conflict even inside one process.
fn flock_exclusive(file: &File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        loop {
            // SAFETY: flock is a standard POSIX call and fd is a valid
            // descriptor owned by `file` for the duration of the call.
            #[allow(unsafe_code)]
            let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
            if result == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(())
    }
}

impl BoardStore for JsonFileStore {
    type Lock = BoardFileLock;

    fn lock(&self, id: &str) -> Result<BoardFileLock, StoreError> {
        validate_board_id(id)?;
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.dir.join(format!("{id}.lock")))?;
        flock_exclusive(&file)?;
        Ok(BoardFileLock { _file: file })
    }

    fn load(&self, id: &str) -> Result<Option<Board>, StoreError> {
        let p = self.path_for(id)?;
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p)?;
        Ok(Some(serde_json::from_str(&s)?))
    }

    fn save(&self, board: &Board) -> Result<(), StoreError> {
        let p = self.path_for(board.id())?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(board)?;
        // Uniquely named temp file, then rename: readers never see a partial
        // document and concurrent savers never share a temp path.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&p).map_err(|e| e.error)?;
        Ok(())
    }
}
