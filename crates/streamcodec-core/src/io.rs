use std::io::{self, ErrorKind, Read, Write};

/// Borrowed stream wrapper that counts transferred bytes and keeps the first
/// error the caller's stream raised.
///
/// Formats are free to swallow or rewrap I/O errors; holding on to the
/// original lets the codec report the stream fault as-is.
pub(crate) struct Tracked<'a, S: ?Sized> {
    inner: &'a mut S,
    bytes: u64,
    fault: Option<io::Error>,
}

impl<'a, S: ?Sized> Tracked<'a, S> {
    pub(crate) fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            bytes: 0,
            fault: None,
        }
    }

    /// Bytes transferred and the stream fault, if any.
    pub(crate) fn finish(self) -> (u64, Option<io::Error>) {
        (self.bytes, self.fault)
    }

    fn record(&mut self, err: io::Error) -> io::Error {
        let relay = io::Error::new(err.kind(), err.to_string());
        if self.fault.is_none() {
            self.fault = Some(err);
        }
        relay
    }
}

impl<S: Read + ?Sized> Read for Tracked<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    self.bytes += n as u64;
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.record(err)),
            }
        }
    }
}

impl<S: Write + ?Sized> Write for Tracked<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.inner.write(buf) {
                Ok(n) => {
                    self.bytes += n as u64;
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.record(err)),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|err| self.record(err))
    }
}
