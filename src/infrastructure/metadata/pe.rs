//! PE/COFF image headers
//!
//! Just enough of the portable executable format to find the CLI metadata.

use super::bytes::{slice, u16_at, u32_at};
use super::MetadataError;

const DOS_SIGNATURE: &[u8; 2] = b"MZ";
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
const E_LFANEW_OFFSET: usize = 0x3C;
const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;
const PE32_MAGIC: u16 = 0x10b;
const PE32_PLUS_MAGIC: u16 = 0x20b;
const CLI_HEADER_DIRECTORY: usize = 14;

#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_pointer: u32,
    raw_size: u32,
}

/// The metadata blob (starting at the `BSJB` root) of a managed image.
pub(crate) fn cli_metadata(data: &[u8]) -> Result<&[u8], MetadataError> {
    if data.len() < 0x40 || &data[..2] != DOS_SIGNATURE {
        return Err(MetadataError::NotPortableExecutable(
            "missing MZ signature".into(),
        ));
    }
    let pe_offset = u32_at(data, E_LFANEW_OFFSET)? as usize;
    let signature = slice(data, pe_offset, 4)
        .map_err(|_| MetadataError::NotPortableExecutable("PE header out of range".into()))?;
    if signature != PE_SIGNATURE {
        return Err(MetadataError::NotPortableExecutable(
            "missing PE signature".into(),
        ));
    }

    let coff = pe_offset + 4;
    let section_count = u16_at(data, coff + 2)? as usize;
    let optional_size = u16_at(data, coff + 16)? as usize;
    let optional = coff + COFF_HEADER_SIZE;

    let (count_offset, directory_offset) = match u16_at(data, optional)? {
        PE32_MAGIC => (92, 96),
        PE32_PLUS_MAGIC => (108, 112),
        other => {
            return Err(MetadataError::NotPortableExecutable(format!(
                "unknown optional header magic {other:#x}"
            )))
        }
    };
    let directory_count = u32_at(data, optional + count_offset)? as usize;
    if directory_count <= CLI_HEADER_DIRECTORY {
        return Err(MetadataError::NotManaged);
    }
    let cli_entry = optional + directory_offset + CLI_HEADER_DIRECTORY * 8;
    let cli_rva = u32_at(data, cli_entry)?;
    if cli_rva == 0 {
        return Err(MetadataError::NotManaged);
    }

    let sections = read_sections(data, optional + optional_size, section_count)?;
    let cli_header = rva_to_offset(&sections, cli_rva)?;
    let metadata_rva = u32_at(data, cli_header + 8)?;
    let metadata_size = u32_at(data, cli_header + 12)? as usize;
    let metadata_offset = rva_to_offset(&sections, metadata_rva)?;
    slice(data, metadata_offset, metadata_size)
}

fn read_sections(data: &[u8], start: usize, count: usize) -> Result<Vec<Section>, MetadataError> {
    (0..count)
        .map(|i| {
            let at = start + i * SECTION_HEADER_SIZE;
            Ok(Section {
                virtual_size: u32_at(data, at + 8)?,
                virtual_address: u32_at(data, at + 12)?,
                raw_size: u32_at(data, at + 16)?,
                raw_pointer: u32_at(data, at + 20)?,
            })
        })
        .collect()
}

fn rva_to_offset(sections: &[Section], rva: u32) -> Result<usize, MetadataError> {
    sections
        .iter()
        .find(|s| {
            let extent = s.virtual_size.max(s.raw_size);
            rva >= s.virtual_address && rva - s.virtual_address < extent
        })
        .map(|s| (rva - s.virtual_address) as usize + s.raw_pointer as usize)
        .ok_or_else(|| MetadataError::Malformed(format!("RVA {rva:#x} is not inside any section")))
}
