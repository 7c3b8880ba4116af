//! Metadata root, stream headers and heaps

use super::bytes::{compressed_u32, slice, u16_at, u32_at};
use super::MetadataError;

const METADATA_SIGNATURE: u32 = 0x424A_5342;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Streams<'a> {
    pub tables: Option<&'a [u8]>,
    pub strings: &'a [u8],
    pub blobs: &'a [u8],
}

pub(crate) fn read_streams(metadata: &[u8]) -> Result<Streams<'_>, MetadataError> {
    if u32_at(metadata, 0)? != METADATA_SIGNATURE {
        return Err(MetadataError::Malformed("missing metadata signature".into()));
    }
    let version_len = u32_at(metadata, 12)? as usize;
    let header = 16 + version_len;
    let stream_count = u16_at(metadata, header + 2)? as usize;

    let mut streams = Streams::default();
    let mut at = header + 4;
    for _ in 0..stream_count {
        let offset = u32_at(metadata, at)? as usize;
        let size = u32_at(metadata, at + 4)? as usize;
        let name_start = at + 8;
        let name_len = metadata
            .get(name_start..)
            .and_then(|rest| rest.iter().position(|&b| b == 0))
            .ok_or_else(|| MetadataError::Malformed("unterminated stream name".into()))?;
        let name = &metadata[name_start..name_start + name_len];
        at = name_start + (name_len + 4) / 4 * 4;

        let body = slice(metadata, offset, size)?;
        match name {
            b"#~" => streams.tables = Some(body),
            b"#-" => {
                return Err(MetadataError::Unsupported(
                    "uncompressed (#-) table stream".into(),
                ))
            }
            b"#Strings" => streams.strings = body,
            b"#Blob" => streams.blobs = body,
            _ => {}
        }
    }
    Ok(streams)
}

/// NUL-terminated UTF-8 string at `index` in the `#Strings` heap.
pub(crate) fn heap_string(strings: &[u8], index: u32) -> Result<String, MetadataError> {
    let start = index as usize;
    let rest = strings
        .get(start..)
        .ok_or_else(|| MetadataError::Malformed(format!("string index {index:#x} out of range")))?;
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
}

/// Length-prefixed blob at `index` in the `#Blob` heap.
pub(crate) fn heap_blob(blobs: &[u8], index: u32) -> Result<&[u8], MetadataError> {
    if index == 0 {
        return Ok(&[]);
    }
    let (len, prefix) = compressed_u32(blobs, index as usize)?;
    slice(blobs, index as usize + prefix, len as usize)
}
