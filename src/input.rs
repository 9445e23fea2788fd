//! Byte sources the decoder pulls instruction bytes from.
//!
//! An [`Input`] is either a finite in-memory buffer with a cursor, or a
//! sequential reader (an open file, stdin, a socket). Both variants count the
//! bytes consumed since they were attached; that count is the *position* the
//! decoder reports offsets against.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::DisassemblyError;

/// Where instruction bytes come from.
pub enum Input {
    /// A finite buffer with a read cursor.
    Buffer {
        /// Owned copy of the bytes.
        data: Vec<u8>,
        /// Index of the next byte to hand out.
        pos: usize,
    },
    /// A sequential reader. Bytes handed back with [`Input::unread`] are kept
    /// in `pending` and served before the reader is touched again.
    Stream {
        reader: Box<dyn Read + Send>,
        pending: VecDeque<u8>,
        eof: bool,
        consumed: u64,
    },
}

impl Input {
    /// Wrap a byte buffer, cursor at 0.
    pub fn buffer(data: impl Into<Vec<u8>>) -> Self {
        Input::Buffer {
            data: data.into(),
            pos: 0,
        }
    }

    /// Wrap a sequential reader.
    pub fn reader<R: Read + Send + 'static>(reader: R) -> Self {
        Input::Stream {
            reader: Box::new(BufReader::new(reader)),
            pending: VecDeque::new(),
            eof: false,
            consumed: 0,
        }
    }

    /// Open `path` for sequential binary reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DisassemblyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DisassemblyError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::reader(file))
    }

    /// Bytes consumed since the source was attached.
    pub fn position(&self) -> u64 {
        match self {
            Input::Buffer { pos, .. } => *pos as u64,
            Input::Stream { consumed, .. } => *consumed,
        }
    }

    /// True for the sequential variant.
    pub fn is_stream(&self) -> bool {
        matches!(self, Input::Stream { .. })
    }

    /// True when no further byte can be produced. A stream reports `true`
    /// only after its reader has signalled end-of-data and nothing is pending.
    pub fn is_exhausted(&self) -> bool {
        match self {
            Input::Buffer { data, pos } => *pos >= data.len(),
            Input::Stream { pending, eof, .. } => *eof && pending.is_empty(),
        }
    }

    /// Next byte, or `None` at end-of-data.
    pub fn next_byte(&mut self) -> Option<u8> {
        match self {
            Input::Buffer { data, pos } => {
                let b = data.get(*pos).copied()?;
                *pos += 1;
                Some(b)
            }
            Input::Stream {
                reader,
                pending,
                eof,
                consumed,
            } => {
                if let Some(b) = pending.pop_front() {
                    *consumed += 1;
                    return Some(b);
                }
                if *eof {
                    return None;
                }
                let b = read_one(reader.as_mut(), eof)?;
                *consumed += 1;
                Some(b)
            }
        }
    }

    /// Hand back the most recently consumed `bytes` so they are produced
    /// again, in order, by the following reads.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match self {
            Input::Buffer { pos, .. } => {
                *pos = pos.saturating_sub(bytes.len());
            }
            Input::Stream {
                pending, consumed, ..
            } => {
                for &b in bytes.iter().rev() {
                    pending.push_front(b);
                }
                *consumed = consumed.saturating_sub(bytes.len() as u64);
            }
        }
    }

    /// Advance by up to `n` bytes without decoding them. Returns how many
    /// bytes were actually skipped.
    pub fn skip(&mut self, n: u64) -> u64 {
        match self {
            Input::Buffer { data, pos } => {
                let avail = (data.len() - *pos) as u64;
                let step = n.min(avail);
                *pos += step as usize;
                step
            }
            Input::Stream { .. } => {
                let mut skipped = 0;
                while skipped < n {
                    if self.next_byte().is_none() {
                        break;
                    }
                    skipped += 1;
                }
                skipped
            }
        }
    }

    /// Move a buffer cursor to `to` (clamped to the buffer length).
    pub fn seek(&mut self, to: u64) -> Result<(), DisassemblyError> {
        match self {
            Input::Buffer { data, pos } => {
                *pos = usize::try_from(to).unwrap_or(usize::MAX).min(data.len());
                Ok(())
            }
            Input::Stream { .. } => Err(DisassemblyError::NotSeekable),
        }
    }
}

/// Pull a single byte out of `reader`, retrying on `Interrupted`. Any other
/// failure is logged and treated as end-of-data.
fn read_one(reader: &mut dyn Read, eof: &mut bool) -> Option<u8> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                *eof = true;
                return None;
            }
            Ok(_) => return Some(buf[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("input stream read failed, treating as end of data: {}", e);
                *eof = true;
                return None;
            }
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Buffer { data, pos } => f
                .debug_struct("Buffer")
                .field("len", &data.len())
                .field("pos", pos)
                .finish(),
            Input::Stream {
                pending,
                eof,
                consumed,
                ..
            } => f
                .debug_struct("Stream")
                .field("pending", &pending.len())
                .field("eof", eof)
                .field("consumed", consumed)
                .finish(),
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Input::buffer(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_reads_in_order() {
        let mut input = Input::buffer(vec![1, 2, 3]);
        assert_eq!(input.next_byte(), Some(1));
        assert_eq!(input.next_byte(), Some(2));
        assert_eq!(input.position(), 2);
        assert_eq!(input.next_byte(), Some(3));
        assert_eq!(input.next_byte(), None);
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_buffer_skip_is_clamped() {
        let mut input = Input::buffer(vec![0u8; 4]);
        assert_eq!(input.skip(3), 3);
        assert_eq!(input.skip(10), 1);
        assert_eq!(input.position(), 4);
        assert_eq!(input.next_byte(), None);
    }

    #[test]
    fn test_buffer_seek_and_unread() {
        let mut input = Input::buffer(vec![10, 20, 30]);
        input.seek(2).unwrap();
        assert_eq!(input.next_byte(), Some(30));
        input.unread(&[30]);
        assert_eq!(input.position(), 2);
        input.seek(100).unwrap();
        assert_eq!(input.position(), 3);
    }

    #[test]
    fn test_stream_unread_replays_bytes() {
        let mut input = Input::reader(Cursor::new(vec![1u8, 2, 3, 4]));
        assert_eq!(input.next_byte(), Some(1));
        assert_eq!(input.next_byte(), Some(2));
        assert_eq!(input.next_byte(), Some(3));
        input.unread(&[2, 3]);
        assert_eq!(input.position(), 1);
        assert_eq!(input.next_byte(), Some(2));
        assert_eq!(input.next_byte(), Some(3));
        assert_eq!(input.next_byte(), Some(4));
        assert_eq!(input.next_byte(), None);
        assert_eq!(input.position(), 4);
    }

    #[test]
    fn test_stream_exhausted_only_after_eof() {
        let mut input = Input::reader(Cursor::new(vec![7u8]));
        assert!(!input.is_exhausted());
        assert_eq!(input.next_byte(), Some(7));
        assert!(!input.is_exhausted());
        assert_eq!(input.next_byte(), None);
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_stream_skip_past_end() {
        let mut input = Input::reader(Cursor::new(vec![1u8, 2]));
        assert_eq!(input.skip(5), 2);
        assert_eq!(input.next_byte(), None);
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_stream_is_not_seekable() {
        let mut input = Input::reader(Cursor::new(vec![1u8]));
        assert!(matches!(input.seek(0), Err(DisassemblyError::NotSeekable)));
        assert_eq!(input.next_byte(), Some(1));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Input::open("/definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, DisassemblyError::SourceUnavailable { .. }));
    }
}
