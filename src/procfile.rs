//! Read-once file over the report.
//!
//! Mirrors a `/proc` entry whose read handler renders the whole report on the
//! first read at offset 0 and reports end-of-file afterwards.

use std::io;

use tracing::trace;

use crate::datas::Datas;
use crate::error::{Error, Result};

/// An open handle on the report.
pub struct ReadOnce<'a> {
    datas: &'a Datas,
    offset: u64,
}

impl<'a> ReadOnce<'a> {
    /// Open a handle at offset 0.
    pub fn open(datas: &'a Datas) -> Self {
        Self { datas, offset: 0 }
    }

    /// Bytes delivered so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Copy the report and its terminator into `buf`.
    ///
    /// Returns the number of bytes copied, or 0 once the report has been
    /// delivered. A buffer too short for the whole report fails without
    /// moving the offset.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.offset > 0 {
            return Ok(0);
        }

        let bytes = self.datas.report()?.to_bytes_with_nul();
        if buf.len() < bytes.len() {
            return Err(Error::BufferTooSmall {
                needed: bytes.len(),
                available: buf.len(),
            });
        }

        buf[..bytes.len()].copy_from_slice(&bytes);
        self.offset += bytes.len() as u64;
        trace!(bytes = bytes.len(), "report read");
        Ok(bytes.len())
    }
}

impl io::Read for ReadOnce<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ReadOnce::read(self, buf).map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}
