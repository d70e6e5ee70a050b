use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Identifies a message by the SHA-256 of its raw bytes, so that moving a
/// mail from `new` to `cur` or changing its flags keeps the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct StreamHasher<R: Read> {
    hasher: Sha256,
    input: R,
}

impl<R: Read> StreamHasher<R> {
    pub fn new(input: R) -> Self {
        StreamHasher {
            hasher: Sha256::default(),
            input,
        }
    }

    pub fn get_result(self) -> MessageId {
        MessageId(hex::encode(self.hasher.finalize()))
    }
}

impl<R: Read> Read for StreamHasher<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let size = self.input.read(buf)?;
        self.hasher.update(&buf[..size]);
        Ok(size)
    }
}

/// Reads a whole message file, hashing it on the way.
pub fn read_message(path: &Path) -> io::Result<(Vec<u8>, MessageId)> {
    let mut hasher = StreamHasher::new(File::open(path)?);
    let mut raw = vec![];
    hasher.read_to_end(&mut raw)?;
    Ok((raw, hasher.get_result()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_hasher() {
        let mut hasher = StreamHasher::new(&b"abc"[..]);
        let mut buf = vec![];
        hasher.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"abc");
        assert_eq!(
            hasher.get_result().as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_read_message() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("1.host");
        let moved = dir.path().join("1.host:2,S");
        std::fs::write(&first, "Subject: x\n\nbody\n").unwrap();
        std::fs::write(&moved, "Subject: x\n\nbody\n").unwrap();

        let (raw, id) = read_message(&first).unwrap();
        assert_eq!(raw, b"Subject: x\n\nbody\n");
        assert_eq!(read_message(&moved).unwrap().1, id);
    }
}
