//! `#~` table stream layout
//!
//! Row widths depend on heap sizes and on the row counts of every table a
//! column can point into, so the whole schema is sized before any cell is read.

use super::bytes::{index_at, u32_at, u64_at, u8_at};
use super::MetadataError;

pub(crate) const TYPE_REF: u8 = 0x01;
pub(crate) const TYPE_DEF: u8 = 0x02;
pub(crate) const METHOD_PTR: u8 = 0x05;
pub(crate) const METHOD_DEF: u8 = 0x06;
pub(crate) const TYPE_SPEC: u8 = 0x1B;
pub(crate) const ASSEMBLY: u8 = 0x20;
pub(crate) const NESTED_CLASS: u8 = 0x29;
pub(crate) const GENERIC_PARAM: u8 = 0x2A;

/// Highest table id the schema below knows how to size.
const LAST_KNOWN_TABLE: usize = 0x2C;
const TABLE_COUNT: usize = LAST_KNOWN_TABLE + 1;
const UNUSED: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodedIndex {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    Implementation,
    CustomAttributeType,
    ResolutionScope,
    TypeOrMethodDef,
}

impl CodedIndex {
    fn tables(self) -> &'static [u8] {
        match self {
            Self::TypeDefOrRef => &[0x02, 0x01, 0x1B],
            Self::HasConstant => &[0x04, 0x08, 0x17],
            Self::HasCustomAttribute => &[
                0x06, 0x04, 0x01, 0x02, 0x08, 0x09, 0x0A, 0x00, 0x0E, 0x17, 0x14, 0x11, 0x1A,
                0x1B, 0x20, 0x23, 0x26, 0x27, 0x28, 0x2A, 0x2C, 0x2B,
            ],
            Self::HasFieldMarshal => &[0x04, 0x08],
            Self::HasDeclSecurity => &[0x02, 0x06, 0x20],
            Self::MemberRefParent => &[0x02, 0x01, 0x1A, 0x06, 0x1B],
            Self::HasSemantics => &[0x14, 0x17],
            Self::MethodDefOrRef => &[0x06, 0x0A],
            Self::MemberForwarded => &[0x04, 0x06],
            Self::Implementation => &[0x26, 0x23, 0x27],
            Self::CustomAttributeType => &[UNUSED, UNUSED, 0x06, 0x0A, UNUSED],
            Self::ResolutionScope => &[0x00, 0x1A, 0x23, 0x01],
            Self::TypeOrMethodDef => &[0x02, 0x06],
        }
    }

    fn tag_bits(self) -> u32 {
        match self {
            Self::HasFieldMarshal
            | Self::HasSemantics
            | Self::MethodDefOrRef
            | Self::MemberForwarded
            | Self::TypeOrMethodDef => 1,
            Self::TypeDefOrRef
            | Self::HasConstant
            | Self::HasDeclSecurity
            | Self::Implementation
            | Self::ResolutionScope => 2,
            Self::MemberRefParent | Self::CustomAttributeType => 3,
            Self::HasCustomAttribute => 5,
        }
    }

    /// Splits a coded value into `(table, row)`. Row 0 means a null reference.
    pub(crate) fn decode(self, value: u32) -> Option<(u8, u32)> {
        let bits = self.tag_bits();
        let tag = (value & ((1 << bits) - 1)) as usize;
        let table = *self.tables().get(tag)?;
        if table == UNUSED {
            return None;
        }
        Some((table, value >> bits))
    }
}

#[derive(Debug, Clone, Copy)]
enum Col {
    U16,
    U32,
    Str,
    Guid,
    Blob,
    Table(u8),
    Coded(CodedIndex),
}

fn schema(table: usize) -> &'static [Col] {
    use CodedIndex::*;
    use Col::*;
    match table {
        0x00 => &[U16, Str, Guid, Guid, Guid],
        0x01 => &[Coded(ResolutionScope), Str, Str],
        0x02 => &[U32, Str, Str, Coded(TypeDefOrRef), Table(0x04), Table(0x06)],
        0x03 => &[Table(0x04)],
        0x04 => &[U16, Str, Blob],
        0x05 => &[Table(0x06)],
        0x06 => &[U32, U16, U16, Str, Blob, Table(0x08)],
        0x07 => &[Table(0x08)],
        0x08 => &[U16, U16, Str],
        0x09 => &[Table(0x02), Coded(TypeDefOrRef)],
        0x0A => &[Coded(MemberRefParent), Str, Blob],
        // type byte plus one byte of padding
        0x0B => &[U16, Coded(HasConstant), Blob],
        0x0C => &[Coded(HasCustomAttribute), Coded(CustomAttributeType), Blob],
        0x0D => &[Coded(HasFieldMarshal), Blob],
        0x0E => &[U16, Coded(HasDeclSecurity), Blob],
        0x0F => &[U16, U32, Table(0x02)],
        0x10 => &[U32, Table(0x04)],
        0x11 => &[Blob],
        0x12 => &[Table(0x02), Table(0x14)],
        0x13 => &[Table(0x14)],
        0x14 => &[U16, Str, Coded(TypeDefOrRef)],
        0x15 => &[Table(0x02), Table(0x17)],
        0x16 => &[Table(0x17)],
        0x17 => &[U16, Str, Blob],
        0x18 => &[U16, Table(0x06), Coded(HasSemantics)],
        0x19 => &[Table(0x02), Coded(MethodDefOrRef), Coded(MethodDefOrRef)],
        0x1A => &[Str],
        0x1B => &[Blob],
        0x1C => &[U16, Coded(MemberForwarded), Str, Table(0x1A)],
        0x1D => &[U32, Table(0x04)],
        0x1E => &[U32, U32],
        0x1F => &[U32],
        0x20 => &[U32, U16, U16, U16, U16, U32, Blob, Str, Str],
        0x21 => &[U32],
        0x22 => &[U32, U32, U32],
        0x23 => &[U16, U16, U16, U16, U32, Blob, Str, Str, Blob],
        0x24 => &[U32, Table(0x23)],
        0x25 => &[U32, U32, U32, Table(0x23)],
        0x26 => &[U32, Str, Blob],
        0x27 => &[U32, U32, Str, Str, Coded(Implementation)],
        0x28 => &[U32, U32, Str, Coded(Implementation)],
        0x29 => &[Table(0x02), Table(0x02)],
        0x2A => &[U16, U16, Coded(TypeOrMethodDef), Str],
        0x2B => &[Coded(MethodDefOrRef), Blob],
        0x2C => &[Table(0x2A), Coded(TypeDefOrRef)],
        _ => &[],
    }
}

#[derive(Debug)]
struct Layout {
    offset: usize,
    row_size: usize,
    /// `(offset within row, width)` per column
    columns: Vec<(usize, usize)>,
}

#[derive(Debug)]
pub(crate) struct Tables<'a> {
    data: &'a [u8],
    rows: [u32; TABLE_COUNT],
    layouts: Vec<Layout>,
}

impl<'a> Tables<'a> {
    pub(crate) fn parse(data: &'a [u8]) -> Result<Self, MetadataError> {
        let heap_sizes = u8_at(data, 6)?;
        let valid = u64_at(data, 8)?;
        if valid >> TABLE_COUNT != 0 {
            return Err(MetadataError::Unsupported(format!(
                "tables beyond {LAST_KNOWN_TABLE:#x} present (valid mask {valid:#x})"
            )));
        }

        let mut rows = [0u32; TABLE_COUNT];
        let mut at = 24;
        for (table, count) in rows.iter_mut().enumerate() {
            if valid & (1 << table) != 0 {
                *count = u32_at(data, at)?;
                at += 4;
            }
        }
        if heap_sizes & 0x40 != 0 {
            at += 4;
        }
        if rows[METHOD_PTR as usize] != 0 {
            return Err(MetadataError::Unsupported("method pointer table".into()));
        }

        let heap = |flag: u8| if heap_sizes & flag != 0 { 4 } else { 2 };
        let (string_size, guid_size, blob_size) = (heap(0x01), heap(0x02), heap(0x04));

        let width = |col: Col| match col {
            Col::U16 => 2,
            Col::U32 => 4,
            Col::Str => string_size,
            Col::Guid => guid_size,
            Col::Blob => blob_size,
            Col::Table(t) => {
                if rows[t as usize] < 1 << 16 {
                    2
                } else {
                    4
                }
            }
            Col::Coded(coded) => {
                let largest = coded
                    .tables()
                    .iter()
                    .filter(|&&t| t != UNUSED)
                    .map(|&t| rows[t as usize])
                    .max()
                    .unwrap_or(0);
                if largest < 1 << (16 - coded.tag_bits()) {
                    2
                } else {
                    4
                }
            }
        };

        let mut layouts = Vec::with_capacity(TABLE_COUNT);
        let mut offset = at;
        for (table, &count) in rows.iter().enumerate() {
            let mut columns = Vec::new();
            let mut row_size = 0;
            for &col in schema(table) {
                let w = width(col);
                columns.push((row_size, w));
                row_size += w;
            }
            layouts.push(Layout {
                offset,
                row_size,
                columns,
            });
            offset = row_size
                .checked_mul(count as usize)
                .and_then(|len| offset.checked_add(len))
                .ok_or_else(|| MetadataError::Malformed("table sizes overflow".into()))?;
        }
        if offset > data.len() {
            return Err(MetadataError::Malformed(format!(
                "tables need {offset:#x} bytes but the stream holds {:#x}",
                data.len()
            )));
        }

        Ok(Self {
            data,
            rows,
            layouts,
        })
    }

    pub(crate) fn rows(&self, table: u8) -> u32 {
        self.rows.get(table as usize).copied().unwrap_or(0)
    }

    /// Raw value of column `col` in 1-based `row`.
    pub(crate) fn cell(&self, table: u8, row: u32, col: usize) -> Result<u32, MetadataError> {
        if row == 0 || row > self.rows(table) {
            return Err(MetadataError::Malformed(format!(
                "row {row} out of range for table {table:#x}"
            )));
        }
        let layout = &self.layouts[table as usize];
        let &(within, width) = layout.columns.get(col).ok_or_else(|| {
            MetadataError::Malformed(format!("column {col} out of range for table {table:#x}"))
        })?;
        let at = layout.offset + (row as usize - 1) * layout.row_size + within;
        index_at(self.data, at, width)
    }
}
