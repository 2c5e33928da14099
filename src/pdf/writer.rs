//! # Object Writer
//!
//! Appends indirect objects to an output buffer and remembers where each one
//! starts. Objects 1 (page tree) and 2 (resources) are reserved and written
//! late with an explicit id; everything else gets the next free id.
//!
//! ```text
//! %PDF-1.3
//! 3 0 obj ... endobj      <- new_object(None)
//! 1 0 obj ... endobj      <- new_object(Some(1))
//! xref                    <- finish()
//! trailer
//! %%EOF
//! ```

use std::io::Write as IoWrite;

use super::flate;

pub struct PdfWriter {
    buffer: Vec<u8>,
    /// Byte offset of each object, indexed by id. Slot 0 is the free entry.
    offsets: Vec<usize>,
    /// Highest id handed out so far.
    n: usize,
    compress: bool,
}

impl PdfWriter {
    pub fn new(compress: bool) -> Self {
        PdfWriter {
            buffer: Vec::new(),
            offsets: vec![0; 3],
            n: 2,
            compress: compress && flate::AVAILABLE,
        }
    }

    /// Highest object id allocated so far.
    pub fn current_id(&self) -> usize {
        self.n
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append one line.
    pub fn out(&mut self, line: &str) {
        self.buffer.extend_from_slice(line.as_bytes());
        self.buffer.push(b'\n');
    }

    /// Append one line of raw bytes.
    pub fn out_bytes(&mut self, line: &[u8]) {
        self.buffer.extend_from_slice(line);
        self.buffer.push(b'\n');
    }

    /// Start an object, with the next free id unless `id` is given.
    pub fn new_object(&mut self, id: Option<usize>) -> usize {
        let id = id.unwrap_or_else(|| {
            self.n += 1;
            self.n
        });
        if self.offsets.len() <= id {
            self.offsets.resize(id + 1, 0);
        }
        self.offsets[id] = self.buffer.len();
        let _ = writeln!(self.buffer, "{} 0 obj", id);
        id
    }

    pub fn end_object(&mut self) {
        self.out("endobj");
    }

    pub fn put_stream(&mut self, data: &[u8]) {
        self.out("stream");
        self.out_bytes(data);
        self.out("endstream");
    }

    /// Write a complete stream object, deflated when compression is on.
    /// `/Length` is always the size of the bytes written.
    pub fn put_stream_object(&mut self, data: &[u8]) -> usize {
        let packed = if self.compress { flate::deflate(data) } else { None };
        let id = self.new_object(None);
        match packed {
            Some(packed) => {
                self.out(&format!("<</Filter /FlateDecode /Length {}>>", packed.len()));
                self.put_stream(&packed);
            }
            None => {
                self.out(&format!("<</Length {}>>", data.len()));
                self.put_stream(data);
            }
        }
        self.end_object();
        id
    }

    /// Write the cross-reference table and trailer and return the file.
    pub fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_offset = self.buffer.len();
        let _ = write!(self.buffer, "xref\n0 {}\n", self.n + 1);
        self.buffer.extend_from_slice(b"0000000000 65535 f \n");
        for i in 1..=self.n {
            let _ = writeln!(self.buffer, "{:010} 00000 n ", self.offsets[i]);
        }
        let _ = write!(
            self.buffer,
            "trailer\n<<\n/Size {}\n/Root {} 0 R\n/Info {} 0 R\n>>\nstartxref\n{}\n%%EOF\n",
            self.n + 1,
            root,
            info,
            xref_offset
        );
        self.buffer
    }
}
