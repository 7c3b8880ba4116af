//! Bounds-checked little-endian reads

use super::MetadataError;

pub(crate) fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], MetadataError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            MetadataError::Malformed(format!(
                "read of {len} bytes at {offset:#x} runs past end ({:#x})",
                data.len()
            ))
        })
}

pub(crate) fn u8_at(data: &[u8], offset: usize) -> Result<u8, MetadataError> {
    Ok(slice(data, offset, 1)?[0])
}

pub(crate) fn u16_at(data: &[u8], offset: usize) -> Result<u16, MetadataError> {
    let b = slice(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn u32_at(data: &[u8], offset: usize) -> Result<u32, MetadataError> {
    let b = slice(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn u64_at(data: &[u8], offset: usize) -> Result<u64, MetadataError> {
    let b = slice(data, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(b);
    Ok(u64::from_le_bytes(raw))
}

/// Index-sized cell: 2 or 4 bytes.
pub(crate) fn index_at(data: &[u8], offset: usize, size: usize) -> Result<u32, MetadataError> {
    match size {
        2 => u16_at(data, offset).map(u32::from),
        4 => u32_at(data, offset),
        other => Err(MetadataError::Malformed(format!("invalid cell size {other}"))),
    }
}

/// ECMA-335 compressed unsigned integer. Returns the value and its encoded length.
pub(crate) fn compressed_u32(data: &[u8], offset: usize) -> Result<(u32, usize), MetadataError> {
    let first = u8_at(data, offset)?;
    if first & 0x80 == 0 {
        Ok((u32::from(first), 1))
    } else if first & 0xC0 == 0x80 {
        let second = u8_at(data, offset + 1)?;
        Ok(((u32::from(first & 0x3F) << 8) | u32::from(second), 2))
    } else if first & 0xE0 == 0xC0 {
        let b = slice(data, offset + 1, 3)?;
        let value = (u32::from(first & 0x1F) << 24)
            | (u32::from(b[0]) << 16)
            | (u32::from(b[1]) << 8)
            | u32::from(b[2]);
        Ok((value, 4))
    } else {
        Err(MetadataError::Malformed(format!(
            "invalid compressed integer prefix {first:#04x} at {offset:#x}"
        )))
    }
}
