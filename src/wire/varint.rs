//! CompactSize variable-length integers
//!
//! The element-count prefix on the wire uses the classic CompactSize
//! encoding: one byte up to 0xFC, then a marker byte (0xFD/0xFE/0xFF)
//! followed by a little-endian u16/u32/u64. Reads enforce canonical form,
//! so every value has exactly one accepted encoding.

use crate::error::FilterError;

/// Append the CompactSize encoding of `value`
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xFC => out.push(value as u8),
        0xFD..=0xFFFF => {
            out.push(0xFD);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            out.push(0xFE);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xFF);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Read a CompactSize value, returning it with the number of bytes consumed
///
/// # Errors
///
/// Returns `MalformedRecord` on a truncated buffer or a non-canonical
/// encoding (a value carried in a wider form than it needs).
pub fn read_varint(data: &[u8]) -> Result<(u64, usize), FilterError> {
    let (&marker, rest) = data
        .split_first()
        .ok_or_else(|| FilterError::MalformedRecord("empty varint".into()))?;

    match marker {
        0xFD => {
            let value = u64::from(u16::from_le_bytes(take_bytes(rest)?));
            if value < 0xFD {
                return Err(FilterError::MalformedRecord(
                    "non-canonical varint: u16 form for small value".into(),
                ));
            }
            Ok((value, 3))
        }
        0xFE => {
            let value = u64::from(u32::from_le_bytes(take_bytes(rest)?));
            if value <= 0xFFFF {
                return Err(FilterError::MalformedRecord(
                    "non-canonical varint: u32 form for small value".into(),
                ));
            }
            Ok((value, 5))
        }
        0xFF => {
            let value = u64::from_le_bytes(take_bytes(rest)?);
            if value <= 0xFFFF_FFFF {
                return Err(FilterError::MalformedRecord(
                    "non-canonical varint: u64 form for small value".into(),
                ));
            }
            Ok((value, 9))
        }
        small => Ok((u64::from(small), 1)),
    }
}

fn take_bytes<const N: usize>(data: &[u8]) -> Result<[u8; N], FilterError> {
    let bytes = data
        .get(..N)
        .ok_or_else(|| FilterError::MalformedRecord("truncated varint".into()))?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u64) -> (Vec<u8>, u64, usize) {
        let mut encoded = Vec::new();
        write_varint(&mut encoded, value);
        let (decoded, consumed) = read_varint(&encoded).unwrap();
        (encoded, decoded, consumed)
    }

    #[test]
    fn test_boundary_values_round_trip() {
        for value in [
            0u64,
            1,
            0xFC,
            0xFD,
            0xFFFF,
            0x1_0000,
            u64::from(u32::MAX),
            u64::from(u32::MAX) + 1,
            u64::MAX,
        ] {
            let (encoded, decoded, consumed) = round_trip(value);
            assert_eq!(decoded, value);
            assert_eq!(consumed, encoded.len(), "Whole encoding consumed");
        }
    }

    #[test]
    fn test_encoding_widths() {
        assert_eq!(round_trip(0xFC).0.len(), 1);
        assert_eq!(round_trip(0xFD).0.len(), 3);
        assert_eq!(round_trip(0xFFFF).0.len(), 3);
        assert_eq!(round_trip(0x1_0000).0.len(), 5);
        assert_eq!(round_trip(u64::from(u32::MAX) + 1).0.len(), 9);
    }

    #[test]
    fn test_single_byte_layout() {
        let mut encoded = Vec::new();
        write_varint(&mut encoded, 0x42);
        assert_eq!(encoded, vec![0x42]);
    }

    #[test]
    fn test_marker_layouts_are_little_endian() {
        let mut encoded = Vec::new();
        write_varint(&mut encoded, 0x1234);
        assert_eq!(encoded, vec![0xFD, 0x34, 0x12]);

        encoded.clear();
        write_varint(&mut encoded, 0x0102_0304);
        assert_eq!(encoded, vec![0xFE, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_rejects_non_canonical_forms() {
        // 16 fits in one byte; the u16 form must be refused
        assert!(read_varint(&[0xFD, 0x10, 0x00]).is_err());
        // 0xFFFF fits in the u16 form; the u32 form must be refused
        assert!(read_varint(&[0xFE, 0xFF, 0xFF, 0x00, 0x00]).is_err());
        // u32::MAX fits in the u32 form; the u64 form must be refused
        assert!(read_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert!(read_varint(&[]).is_err());
        assert!(read_varint(&[0xFD, 0x01]).is_err());
        assert!(read_varint(&[0xFE, 0x01, 0x02, 0x03]).is_err());
        assert!(read_varint(&[0xFF, 0x01]).is_err());
    }
}
