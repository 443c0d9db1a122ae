//! `OutputBuffer`: Single-syscall output buffer for escape sequences.

use std::io::{self, Write};

/// Pre-allocated buffer that escape sequences are queued into.
///
/// Everything a render pass emits lands here first and is then written in
/// a single `write_all` so the terminal never shows a half-drawn frame.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer length.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write the contents to `writer` in one call and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails. The buffer is
    /// emptied either way.
    pub fn drain_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let result = writer.write_all(&self.data).and_then(|()| writer.flush());
        self.data.clear();
        result
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_buffer_accumulates() {
        let mut out = OutputBuffer::with_capacity(16);
        out.write_str("ab");
        out.write_all(b"c").unwrap();
        write!(out, "{}", 42).unwrap();
        assert_eq!(out.len(), 5);

        let mut sink = Vec::new();
        out.drain_to(&mut sink).unwrap();
        assert_eq!(sink, b"abc42");
    }

    #[test]
    fn test_output_buffer_drain() {
        let mut out = OutputBuffer::new();
        out.write_str("\x1b[H");
        let mut sink = Vec::new();
        out.drain_to(&mut sink).unwrap();
        assert_eq!(sink, b"\x1b[H");
        assert_eq!(out.len(), 0);
    }
}
