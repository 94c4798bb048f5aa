use std::fmt;
use std::io;

/// The output sink of a render, either a string or an I/O writer.
pub struct Formatter<'a> {
    out: &'a mut (dyn fmt::Write + 'a),
}

/// Adapts an [`io::Write`] into a [`fmt::Write`], keeping the last I/O error
/// so it can be reported instead of the opaque [`fmt::Error`].
pub struct Writer<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<'a> Formatter<'a> {
    pub fn with_string(out: &'a mut String) -> Self {
        Self { out }
    }

    pub fn with_writer<W>(out: &'a mut Writer<W>) -> Self
    where
        W: io::Write,
    {
        Self { out }
    }
}

impl fmt::Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }
}

impl<W> Writer<W>
where
    W: io::Write,
{
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    pub fn take_err(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<W> fmt::Write for Writer<W>
where
    W: io::Write,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
