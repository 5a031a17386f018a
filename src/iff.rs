use thiserror::Error;

/// Size of a chunk header: a 4-byte tag followed by a 4-byte payload length.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    /// A header read at `offset` would consume bytes past the buffer's end.
    #[error("header at 0x{offset:08X} reaches past the end of the buffer")]
    OutOfBounds { offset: usize },

    /// The declared size of the chunk at `offset` wraps the address range.
    #[error("chunk at 0x{offset:08X} declares size 0x{size:08X}, which overflows the cursor")]
    Truncated { offset: usize, size: u32 },
}

/// One chunk header, decoded into an owned value. Both fields are stored
/// first-byte-least-significant in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: [u8; 4],
    /// Payload length in bytes, excluding the header itself.
    pub size: u32,
}

impl ChunkHeader {
    /// The tag as a raw 32-bit value, byte 0 in bits 0-7.
    pub fn tag_value(&self) -> u32 {
        u32::from_le_bytes(self.tag)
    }

    /// The tag as four characters. Non-printable bytes are rendered as-is,
    /// not escaped.
    pub fn tag_string(&self) -> String {
        self.tag.iter().map(|&b| b as char).collect()
    }
}

/// Decodes the header starting at `offset`, or fails if fewer than
/// [`HEADER_SIZE`] bytes remain there.
pub fn read_header_at(buf: &[u8], offset: usize) -> Result<ChunkHeader, WalkError> {
    match offset.checked_add(HEADER_SIZE) {
        Some(end) if end <= buf.len() => {}
        _ => return Err(WalkError::OutOfBounds { offset }),
    }

    let mut tag = [0u8; 4];
    let mut size = [0u8; 4];
    tag.copy_from_slice(&buf[offset..offset + 4]);
    size.copy_from_slice(&buf[offset + 4..offset + 8]);

    Ok(ChunkHeader {
        tag,
        size: u32::from_le_bytes(size),
    })
}

/// Walks the back-to-back (header, payload) records between `start` and
/// `end`, yielding each header with its absolute offset. Each declared size
/// is trusted to locate the next record; the walk ends as soon as the cursor
/// reaches `end`, and yields one error (then fuses) if a header read would
/// leave the buffer.
pub struct ChunkWalker<'a> {
    buf: &'a [u8],
    cursor: usize,
    end: usize,
    index: usize,
    padded: bool,
    done: bool,
}

impl<'a> ChunkWalker<'a> {
    pub fn new(buf: &'a [u8], start: usize, end: usize) -> ChunkWalker<'a> {
        ChunkWalker {
            buf,
            cursor: start,
            end,
            index: 0,
            padded: false,
            done: false,
        }
    }

    /// Step over the padding byte after odd-sized payloads, as RIFF-family
    /// containers require. The default walk assumes no padding.
    pub fn padded(mut self) -> ChunkWalker<'a> {
        self.padded = true;
        self
    }
}

/// A header together with its position in the walked region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    pub index: usize,
    pub offset: usize,
    pub header: ChunkHeader,
}

impl Iterator for ChunkWalker<'_> {
    type Item = Result<ChunkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.end {
            return None;
        }

        let offset = self.cursor;
        let header = match read_header_at(self.buf, offset) {
            Ok(header) => header,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        let size = header.size as usize;
        let pad = if self.padded { size & 1 } else { 0 };
        let next = self
            .cursor
            .checked_add(HEADER_SIZE)
            .and_then(|c| c.checked_add(size))
            .and_then(|c| c.checked_add(pad));
        match next {
            Some(next) => self.cursor = next,
            None => {
                self.done = true;
                return Some(Err(WalkError::Truncated {
                    offset,
                    size: header.size,
                }));
            }
        }

        let entry = ChunkEntry {
            index: self.index,
            offset,
            header,
        };
        self.index += 1;
        Some(Ok(entry))
    }
}
