//! Big-endian primitive reads over a seekable binary source.
//!
//! The reader knows the table directory once it has been loaded and can
//! seek straight to a named table. Short reads surface as format errors
//! since they always mean a truncated or lying file.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{FolioError, Result};

/// A four byte sfnt table tag such as `*b"glyf"`.
pub type Tag = [u8; 4];

/// One entry of the sfnt table directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

pub struct TableReader<R> {
    inner: R,
    tables: BTreeMap<Tag, TableRecord>,
}

impl<R: Read + Seek> TableReader<R> {
    pub fn new(inner: R) -> Self {
        TableReader {
            inner,
            tables: BTreeMap::new(),
        }
    }

    pub fn set_directory(&mut self, tables: BTreeMap<Tag, TableRecord>) {
        self.tables = tables;
    }

    pub fn directory(&self) -> &BTreeMap<Tag, TableRecord> {
        &self.tables
    }

    pub fn has_table(&self, tag: &Tag) -> bool {
        self.tables.contains_key(tag)
    }

    /// Position the reader at the start of `tag`.
    pub fn seek_table(&mut self, tag: &Tag) -> Result<TableRecord> {
        let record = *self
            .tables
            .get(tag)
            .ok_or_else(|| FolioError::format(format!("Table not found: '{}'", tag_name(tag))))?;
        self.seek_to(record.offset as u64)?;
        Ok(record)
    }

    /// Read the whole of `tag` into memory.
    pub fn read_table(&mut self, tag: &Tag) -> Result<Vec<u8>> {
        let record = self.seek_table(tag)?;
        self.read_bytes(record.length as usize)
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn skip(&mut self, n: i64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(n))?;
        Ok(())
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(i16::from_be_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf).map_err(truncated)?;
        Ok(u32::from_be_bytes(buf))
    }
}

pub fn tag_name(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

fn truncated(e: io::Error) -> FolioError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FolioError::format("Unexpected end of data")
    } else {
        FolioError::Io(e)
    }
}
