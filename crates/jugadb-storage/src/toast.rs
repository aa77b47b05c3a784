//! TOAST chunk store (spec.md §4.4): values whose encoded length exceeds
//! `TOAST_CHUNK_SIZE` are split into `TOAST_CHUNK_SIZE`-byte chunks and
//! appended to a table's `.toast` file; the row keeps only a
//! `{chunk_id, length}` descriptor. `toast_concat` reassembles the bytes.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use jugadb_types::size::TOAST_CHUNK_SIZE;
use jugadb_types::ToastRef;

#[derive(Debug, thiserror::Error)]
pub enum ToastError {
    #[error("I/O error in TOAST store: {0}")]
    Io(#[from] io::Error),
    #[error("TOAST reference missing: chunk {0}")]
    MissingChunk(u32),
}

/// One table's out-of-line large-value store. Chunks are appended, never
/// rewritten in place; deletion reclaims a chunk id for GC only when a
/// future compaction pass is added (none is, per spec.md §1 non-goals on
/// vacuuming/compaction).
pub struct ToastStore {
    file: File,
    next_chunk_id: u32,
}

impl ToastStore {
    pub fn open(path: &Path) -> Result<Self, ToastError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        let next_chunk_id = (file.metadata()?.len() / TOAST_CHUNK_SIZE as u64) as u32;
        Ok(Self { file, next_chunk_id })
    }

    /// Writes `bytes` as one or more `TOAST_CHUNK_SIZE` chunks, returning a
    /// reference to the first chunk and the total byte length.
    pub fn write(&mut self, bytes: &[u8]) -> Result<ToastRef, ToastError> {
        let chunk_id = self.next_chunk_id;
        let mut writer = BufWriter::new(&mut self.file);
        writer.seek(SeekFrom::Start(chunk_id as u64 * TOAST_CHUNK_SIZE as u64))?;

        let mut written = 0usize;
        for chunk in bytes.chunks(TOAST_CHUNK_SIZE) {
            let mut padded = vec![0u8; TOAST_CHUNK_SIZE];
            padded[..chunk.len()].copy_from_slice(chunk);
            writer.write_all(&padded)?;
            written += chunk.len();
            self.next_chunk_id += 1;
        }
        writer.flush()?;

        Ok(ToastRef {
            chunk_id,
            length: written as u32,
        })
    }

    /// Reassembles the bytes referenced by `descriptor` (spec.md §4.4
    /// `toast_concat`).
    pub fn read(&mut self, descriptor: ToastRef) -> Result<Vec<u8>, ToastError> {
        let chunk_count = descriptor.length.div_ceil(TOAST_CHUNK_SIZE as u32) as u64;
        let start = descriptor.chunk_id as u64 * TOAST_CHUNK_SIZE as u64;
        let total_len = chunk_count * TOAST_CHUNK_SIZE as u64;
        if self.file.metadata()?.len() < start + total_len {
            return Err(ToastError::MissingChunk(descriptor.chunk_id));
        }

        let mut reader = BufReader::new(&mut self.file);
        reader.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; total_len as usize];
        reader.read_exact(&mut buf)?;
        buf.truncate(descriptor.length as usize);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reassembles_large_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ToastStore::open(&dir.path().join("t.toast")).unwrap();

        let payload: Vec<u8> = (0..(TOAST_CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let descriptor = store.write(&payload).unwrap();
        let round_tripped = store.read(descriptor).unwrap();
        assert_eq!(round_tripped, payload);
    }

    #[test]
    fn multiple_values_do_not_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ToastStore::open(&dir.path().join("t.toast")).unwrap();

        let a = store.write(&vec![1u8; TOAST_CHUNK_SIZE + 10]).unwrap();
        let b = store.write(&vec![2u8; 50]).unwrap();

        assert_eq!(store.read(a).unwrap(), vec![1u8; TOAST_CHUNK_SIZE + 10]);
        assert_eq!(store.read(b).unwrap(), vec![2u8; 50]);
    }
}
