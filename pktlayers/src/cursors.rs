use bytes::Buf;

/// A read cursor over a borrowed frame.
///
/// Slices handed out by the cursor keep the lifetime of the underlying
/// buffer rather than the lifetime of the cursor, which is what allows
/// no-copy layers to outlive the decode step that produced them.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// A cursor at the start of `buf`.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// The whole buffer, including the bytes already consumed.
    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// The unread bytes.
    #[inline]
    pub fn chunk_shared_lifetime(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Consume `cnt` bytes and return them.
    ///
    /// # Panics
    /// Panics if fewer than `cnt` bytes remain.
    #[inline]
    pub fn split_to(&mut self, cnt: usize) -> &'a [u8] {
        assert!(cnt <= self.remaining());
        let head = &self.buf[self.pos..self.pos + cnt];
        self.pos += cnt;
        head
    }
}

impl<'a> Buf for Cursor<'a> {
    #[inline]
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining());
        self.pos += cnt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor() {
        let b = [10; 1000];
        for c_pos in 0..1001 {
            let mut cursor = Cursor::new(&b[..]);
            cursor.advance(c_pos);

            assert_eq!(c_pos, cursor.cursor());
            assert_eq!(cursor.buf(), &b[..]);
            assert_eq!(cursor.remaining(), 1000 - c_pos);
            assert_eq!(cursor.chunk(), &b[c_pos..]);
        }
    }

    #[test]
    fn test_split_to() {
        let b: Vec<u8> = (0..=255).collect();
        let mut cursor = Cursor::new(&b[..]);

        let head = cursor.split_to(14);
        assert_eq!(head, &b[..14]);
        assert_eq!(cursor.cursor(), 14);

        let head = cursor.split_to(4);
        assert_eq!(head, &b[14..18]);
        assert_eq!(cursor.chunk_shared_lifetime(), &b[18..]);

        let rest = cursor.split_to(cursor.remaining());
        assert_eq!(rest, &b[18..]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    #[should_panic]
    fn test_split_past_end() {
        let b = [0u8; 3];
        let mut cursor = Cursor::new(&b[..]);
        cursor.split_to(4);
    }
}
