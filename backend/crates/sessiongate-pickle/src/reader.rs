//! Bounds-checked cursor over the input slice.

use crate::error::{DecodeError, DecodeResult, LimitKind};

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn take(&mut self, len: usize, context: &'static str) -> DecodeResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::Truncated {
                offset: self.pos,
                context,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, context: &'static str) -> DecodeResult<u8> {
        Ok(self.array::<1>(context)?[0])
    }

    pub(crate) fn u16_le(&mut self, context: &'static str) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.array(context)?))
    }

    pub(crate) fn u32_le(&mut self, context: &'static str) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.array(context)?))
    }

    pub(crate) fn i32_le(&mut self, context: &'static str) -> DecodeResult<i32> {
        Ok(i32::from_le_bytes(self.array(context)?))
    }

    pub(crate) fn u64_le(&mut self, context: &'static str) -> DecodeResult<u64> {
        Ok(u64::from_le_bytes(self.array(context)?))
    }

    pub(crate) fn f64_be(&mut self, context: &'static str) -> DecodeResult<f64> {
        Ok(f64::from_be_bytes(self.array(context)?))
    }

    /// Bytes up to (not including) the next `\n`, consuming the newline.
    pub(crate) fn line(&mut self, max_len: usize, context: &'static str) -> DecodeResult<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let window = &rest[..rest.len().min(max_len.saturating_add(1))];
        match window.iter().position(|b| *b == b'\n') {
            Some(len) => {
                let line = &rest[..len];
                self.pos += len + 1;
                Ok(line)
            },
            None if window.len() > max_len => Err(DecodeError::limit(LimitKind::StringLen, max_len)),
            None => Err(DecodeError::Truncated {
                offset: self.pos,
                context,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_past_end_is_truncated() {
        let mut reader = Reader::new(b"\x01\x02");
        assert_eq!(reader.u8("op").unwrap(), 1);
        assert!(matches!(
            reader.u32_le("len"),
            Err(DecodeError::Truncated { offset: 1, .. })
        ));
    }

    #[test]
    fn test_line_reading() {
        let mut reader = Reader::new(b"12\n34");
        assert_eq!(reader.line(16, "line").unwrap(), b"12");
        assert!(matches!(reader.line(16, "line"), Err(DecodeError::Truncated { .. })));

        let mut reader = Reader::new(b"123456789\n");
        assert!(matches!(
            reader.line(4, "line"),
            Err(DecodeError::LimitExceeded { limit: LimitKind::StringLen, .. })
        ));
    }
}
