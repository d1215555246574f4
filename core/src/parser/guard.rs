//! Structural check of a DICOM Part 10 byte stream
//!
//! Walks element headers (file meta group, then data set) without decoding
//! values, so that broken lengths and offsets are reported as typed
//! failures before the stream reaches the decoder.

use crate::error::ParseFailure;
use dicom_core::Tag;
use dicom_dictionary_std::uids;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";
const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

const ITEM: Tag = Tag(0xFFFE, 0xE000);
const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);
const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

// VRs whose explicit header carries 2 reserved bytes and a 32-bit length
const LONG_VRS: [&[u8; 2]; 13] = [
    b"OB", b"OD", b"OF", b"OL", b"OV", b"OW", b"SQ", b"SV", b"UC", b"UN", b"UR", b"UT", b"UV",
];

/// Returns the stream starting at the `DICM` magic code
///
/// Accepts both the standard 128-byte preamble layout and streams that
/// begin directly with the magic code.
pub fn strip_preamble(bytes: &[u8]) -> Result<&[u8], ParseFailure> {
    if bytes.len() >= PREAMBLE_LEN + MAGIC.len() && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4] == MAGIC
    {
        return Ok(&bytes[PREAMBLE_LEN..]);
    }
    if bytes.starts_with(MAGIC) {
        return Ok(bytes);
    }
    if bytes.len() < PREAMBLE_LEN + MAGIC.len() {
        return Err(ParseFailure::UnsupportedFormat(format!(
            "{} bytes is too short for a DICOM file",
            bytes.len()
        )));
    }
    Err(ParseFailure::UnsupportedFormat(
        "missing DICM magic code".to_string(),
    ))
}

/// Checks every element header of a stream that starts at the magic code
pub fn check(stream: &[u8]) -> Result<(), ParseFailure> {
    let mut scanner = Scanner {
        bytes: stream,
        pos: MAGIC.len(),
        explicit: true,
        big_endian: false,
    };

    let transfer_syntax = scanner.meta_group()?;
    match transfer_syntax.as_str() {
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN => return Ok(()),
        uids::IMPLICIT_VR_LITTLE_ENDIAN => scanner.explicit = false,
        EXPLICIT_VR_BIG_ENDIAN => scanner.big_endian = true,
        _ => {}
    }

    scanner.elements(stream.len(), false)
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    explicit: bool,
    big_endian: bool,
}

impl<'a> Scanner<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseFailure> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(ParseFailure::Truncated { offset: self.pos }),
        }
    }

    fn u16(&mut self) -> Result<u16, ParseFailure> {
        let b = self.take(2)?;
        let raw = [b[0], b[1]];
        Ok(if self.big_endian {
            u16::from_be_bytes(raw)
        } else {
            u16::from_le_bytes(raw)
        })
    }

    fn u32(&mut self) -> Result<u32, ParseFailure> {
        let b = self.take(4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(if self.big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    }

    fn tag(&mut self) -> Result<Tag, ParseFailure> {
        Ok(Tag(self.u16()?, self.u16()?))
    }

    fn peek_group(&self) -> Option<u16> {
        let b = self.bytes.get(self.pos..self.pos + 2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads the header following `tag`, returning (is sequence, length)
    fn header(&mut self, tag: Tag) -> Result<(bool, u32), ParseFailure> {
        if tag.0 == 0xFFFE {
            return Ok((false, self.u32()?));
        }
        if !self.explicit {
            let length = self.u32()?;
            return Ok((length == UNDEFINED_LENGTH, length));
        }
        let vr = self.take(2)?;
        let vr = [vr[0], vr[1]];
        if LONG_VRS.contains(&&vr) {
            self.take(2)?;
            let length = self.u32()?;
            Ok((&vr == b"SQ" || length == UNDEFINED_LENGTH, length))
        } else {
            Ok((false, u32::from(self.u16()?)))
        }
    }

    /// Validates a 32-bit length and returns the end offset of the value
    fn value_end(&self, tag: Tag, offset: usize, length: u32) -> Result<usize, ParseFailure> {
        if (length as i32) < 0 {
            return Err(ParseFailure::NegativeLength { tag, offset });
        }
        let length = length as usize;
        let available = self.bytes.len().saturating_sub(self.pos);
        if length > available {
            return Err(ParseFailure::OutOfRange {
                tag,
                offset,
                length,
                available,
            });
        }
        Ok(self.pos + length)
    }

    /// File meta group: always explicit VR little endian
    fn meta_group(&mut self) -> Result<String, ParseFailure> {
        let mut transfer_syntax = String::new();
        while self.peek_group() == Some(0x0002) {
            let offset = self.pos;
            let tag = self.tag()?;
            let (_, length) = self.header(tag)?;
            let end = self.value_end(tag, offset, length)?;
            if tag == TRANSFER_SYNTAX_UID {
                let raw = &self.bytes[self.pos..end];
                transfer_syntax = String::from_utf8_lossy(raw)
                    .trim_end_matches(&['\0', ' '][..])
                    .to_string();
            }
            self.pos = end;
        }
        if transfer_syntax.is_empty() {
            return Err(ParseFailure::Malformed(
                "file meta group has no transfer syntax".to_string(),
            ));
        }
        Ok(transfer_syntax)
    }

    /// Walks elements up to `end`; inside an undefined-length item the walk
    /// stops at the item delimiter instead
    fn elements(&mut self, end: usize, in_item: bool) -> Result<(), ParseFailure> {
        loop {
            if self.pos >= end {
                if in_item && end == self.bytes.len() {
                    return Err(ParseFailure::Truncated { offset: self.pos });
                }
                return Ok(());
            }
            let offset = self.pos;
            let tag = self.tag()?;
            let (is_sequence, length) = self.header(tag)?;

            if tag == ITEM_DELIMITATION {
                if in_item {
                    return Ok(());
                }
                return Err(ParseFailure::Malformed(format!(
                    "item delimiter outside an item at offset {}",
                    offset
                )));
            }

            if length == UNDEFINED_LENGTH {
                self.items(None, tag == PIXEL_DATA)?;
                continue;
            }

            let value_end = self.value_end(tag, offset, length)?;
            if is_sequence && self.explicit {
                self.items(Some(value_end), false)?;
            }
            self.pos = value_end;
        }
    }

    /// Walks sequence items, either up to `end` or until the sequence
    /// delimiter; fragments of encapsulated pixel data are skipped whole
    fn items(&mut self, end: Option<usize>, fragments: bool) -> Result<(), ParseFailure> {
        loop {
            if let Some(end) = end {
                if self.pos >= end {
                    return Ok(());
                }
            }
            let offset = self.pos;
            let tag = self.tag()?;
            let length = self.u32()?;

            if tag == SEQUENCE_DELIMITATION {
                return Ok(());
            }
            if tag != ITEM {
                return Err(ParseFailure::Malformed(format!(
                    "unexpected element {} inside a sequence at offset {}",
                    tag, offset
                )));
            }

            if length == UNDEFINED_LENGTH {
                self.elements(self.bytes.len(), true)?;
                continue;
            }

            let item_end = self.value_end(tag, offset, length)?;
            if !fragments {
                self.elements(item_end, false)?;
            }
            self.pos = item_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal explicit VR little endian stream starting at the magic code
    fn stream_with(dataset: &[u8]) -> Vec<u8> {
        let ts = b"1.2.840.10008.1.2.1\0";
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0x02, 0x00, 0x10, 0x00]);
        bytes.extend_from_slice(b"UI");
        bytes.extend_from_slice(&(ts.len() as u16).to_le_bytes());
        bytes.extend_from_slice(ts);
        bytes.extend_from_slice(dataset);
        bytes
    }

    fn short_element(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    fn long_header(group: u16, element: u16, vr: &[u8; 2], length: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes
    }

    fn item_header(element: u16, length: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xFFFE_u16.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes
    }

    #[test]
    fn test_strip_preamble() {
        let mut with_preamble = vec![0u8; PREAMBLE_LEN];
        with_preamble.extend_from_slice(b"DICMrest");
        assert_eq!(strip_preamble(&with_preamble).unwrap(), b"DICMrest");
        assert_eq!(strip_preamble(b"DICMrest").unwrap(), b"DICMrest");
    }

    #[test]
    fn test_strip_preamble_rejects_non_dicom() {
        assert!(matches!(
            strip_preamble(b"not dicom"),
            Err(ParseFailure::UnsupportedFormat(_))
        ));
        let mut wrong_magic = vec![0u8; PREAMBLE_LEN];
        wrong_magic.extend_from_slice(b"NOTM");
        assert!(matches!(
            strip_preamble(&wrong_magic),
            Err(ParseFailure::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_check_valid_stream() {
        let mut dataset = short_element(0x0008, 0x0060, b"CS", b"CT");
        dataset.extend(short_element(0x0020, 0x000D, b"UI", b"1.2.3\0"));
        assert_eq!(check(&stream_with(&dataset)), Ok(()));
    }

    #[test]
    fn test_check_negative_length() {
        let dataset = long_header(0x0009, 0x1010, b"OB", 0xFFFF_FFF0);
        let err = check(&stream_with(&dataset)).unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::NegativeLength { tag, .. } if tag == Tag(0x0009, 0x1010)
        ));
        assert_eq!(err.to_string(), "Negative length");
    }

    #[test]
    fn test_check_out_of_range() {
        let mut dataset = long_header(0x0009, 0x1010, b"OB", 64);
        dataset.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            check(&stream_with(&dataset)),
            Err(ParseFailure::OutOfRange {
                length: 64,
                available: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_check_truncated_header() {
        let dataset = [0x08, 0x00, 0x60];
        assert!(matches!(
            check(&stream_with(&dataset)),
            Err(ParseFailure::Truncated { .. })
        ));
    }

    #[test]
    fn test_check_missing_transfer_syntax() {
        assert!(matches!(
            check(b"DICM"),
            Err(ParseFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_check_nested_undefined_length_sequences() {
        let inner = short_element(0x0008, 0x1155, b"UI", b"1.2.3.4\0");

        let mut dataset = long_header(0x3006, 0x0010, b"SQ", UNDEFINED_LENGTH);
        dataset.extend(item_header(0xE000, UNDEFINED_LENGTH));
        dataset.extend(long_header(0x3006, 0x0016, b"SQ", UNDEFINED_LENGTH));
        dataset.extend(item_header(0xE000, inner.len() as u32));
        dataset.extend(inner);
        dataset.extend(item_header(0xE0DD, 0));
        dataset.extend(item_header(0xE00D, 0));
        dataset.extend(item_header(0xE0DD, 0));

        assert_eq!(check(&stream_with(&dataset)), Ok(()));
    }

    #[test]
    fn test_check_negative_length_inside_sequence() {
        let mut dataset = long_header(0x300C, 0x0002, b"SQ", UNDEFINED_LENGTH);
        dataset.extend(item_header(0xE000, UNDEFINED_LENGTH));
        dataset.extend(long_header(0x0009, 0x1010, b"UN", 0x8000_0000));
        assert!(matches!(
            check(&stream_with(&dataset)),
            Err(ParseFailure::NegativeLength { .. })
        ));
    }

    #[test]
    fn test_check_unterminated_item() {
        let mut dataset = long_header(0x300C, 0x0002, b"SQ", UNDEFINED_LENGTH);
        dataset.extend(item_header(0xE000, UNDEFINED_LENGTH));
        dataset.extend(short_element(0x0008, 0x1155, b"UI", b"1.2\0"));
        assert!(matches!(
            check(&stream_with(&dataset)),
            Err(ParseFailure::Truncated { .. })
        ));
    }
}
