use std::io;

/// An in memory sink that accepts a limited number of bytes, writes past the
/// limit are cut short and then fail.
pub struct Sink {
    buf: Vec<u8>,
    capacity: usize,
}

impl Sink {
    pub fn unbounded() -> Self {
        Self::with_capacity(usize::MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            capacity,
        }
    }

    /// The bytes accepted so far.
    pub fn contents(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or("<invalid utf-8>")
    }
}

impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.buf.len();
        if room == 0 && !buf.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "sink is full"));
        }
        let n = room.min(buf.len());
        self.buf.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
