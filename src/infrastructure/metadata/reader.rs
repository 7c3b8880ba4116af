//! Type extraction from parsed metadata tables

use std::collections::{HashMap, HashSet};

use crate::domain::ports::{ModuleMetadata, TypeInfo};

use super::bytes::{compressed_u32, u8_at};
use super::root::{heap_blob, heap_string, read_streams, Streams};
use super::tables::{
    CodedIndex, Tables, ASSEMBLY, GENERIC_PARAM, METHOD_DEF, NESTED_CLASS, TYPE_DEF, TYPE_REF,
    TYPE_SPEC,
};
use super::{pe, MetadataError};

const VISIBILITY_MASK: u32 = 0x07;
const VISIBILITY_PUBLIC: u32 = 0x01;
const VISIBILITY_NESTED_PUBLIC: u32 = 0x02;
const TYPE_INTERFACE: u32 = 0x20;
const TYPE_ABSTRACT: u32 = 0x80;

const METHOD_ACCESS_MASK: u32 = 0x07;
const METHOD_PUBLIC: u32 = 0x06;
const METHOD_STATIC: u32 = 0x10;
const SIG_HAS_THIS: u8 = 0x20;

const ELEMENT_GENERIC_INST: u8 = 0x15;
const ELEMENT_CLASS: u8 = 0x12;
const ELEMENT_VALUE_TYPE: u8 = 0x11;

const RESOLUTION_SCOPE_TYPE_REF: u8 = TYPE_REF;

/// Reads every type definition of a managed image.
pub(crate) fn read_module(image: &[u8]) -> Result<ModuleMetadata, MetadataError> {
    let metadata = pe::cli_metadata(image)?;
    let streams = read_streams(metadata)?;
    let stream = streams
        .tables
        .ok_or_else(|| MetadataError::Malformed("missing #~ table stream".into()))?;
    let tables = Tables::parse(stream)?;
    ModuleReader::new(tables, streams)?.read()
}

struct ModuleReader<'a> {
    tables: Tables<'a>,
    strings: &'a [u8],
    blobs: &'a [u8],
    /// nested TypeDef row -> enclosing TypeDef row
    enclosing: HashMap<u32, u32>,
    generic_owners: HashSet<u32>,
}

impl<'a> ModuleReader<'a> {
    fn new(tables: Tables<'a>, streams: Streams<'a>) -> Result<Self, MetadataError> {
        let mut enclosing = HashMap::new();
        for row in 1..=tables.rows(NESTED_CLASS) {
            enclosing.insert(
                tables.cell(NESTED_CLASS, row, 0)?,
                tables.cell(NESTED_CLASS, row, 1)?,
            );
        }

        let mut generic_owners = HashSet::new();
        for row in 1..=tables.rows(GENERIC_PARAM) {
            let owner = tables.cell(GENERIC_PARAM, row, 2)?;
            if let Some((TYPE_DEF, type_row)) = CodedIndex::TypeOrMethodDef.decode(owner) {
                generic_owners.insert(type_row);
            }
        }

        Ok(Self {
            tables,
            strings: streams.strings,
            blobs: streams.blobs,
            enclosing,
            generic_owners,
        })
    }

    fn read(&self) -> Result<ModuleMetadata, MetadataError> {
        let assembly_name = if self.tables.rows(ASSEMBLY) > 0 {
            Some(self.string(ASSEMBLY, 1, 7)?)
        } else {
            None
        };

        let types = (1..=self.tables.rows(TYPE_DEF))
            .map(|row| self.type_info(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModuleMetadata {
            assembly_name,
            types,
        })
    }

    fn type_info(&self, row: u32) -> Result<TypeInfo, MetadataError> {
        let flags = self.tables.cell(TYPE_DEF, row, 0)?;
        let (namespace, name) = self.type_def_name(row)?;
        let extends = self.tables.cell(TYPE_DEF, row, 3)?;

        Ok(TypeInfo {
            is_exported: self.is_exported(row)?,
            is_abstract: flags & TYPE_ABSTRACT != 0,
            is_interface: flags & TYPE_INTERFACE != 0,
            is_generic_definition: self.generic_owners.contains(&row) || name.contains('`'),
            has_public_default_ctor: self.has_public_default_ctor(row)?,
            base_type: self.type_def_or_ref_name(extends)?,
            namespace,
            name,
        })
    }

    fn string(&self, table: u8, row: u32, col: usize) -> Result<String, MetadataError> {
        heap_string(self.strings, self.tables.cell(table, row, col)?)
    }

    /// Ancestors of a TypeDef from outermost down to `row` itself.
    fn nesting_chain(&self, row: u32) -> Vec<u32> {
        let mut chain = vec![row];
        let mut current = row;
        while let Some(&outer) = self.enclosing.get(&current) {
            if chain.contains(&outer) {
                break;
            }
            chain.push(outer);
            current = outer;
        }
        chain.reverse();
        chain
    }

    fn type_def_name(&self, row: u32) -> Result<(String, String), MetadataError> {
        let chain = self.nesting_chain(row);
        let namespace = self.string(TYPE_DEF, chain[0], 2)?;
        let names = chain
            .iter()
            .map(|&r| self.string(TYPE_DEF, r, 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((namespace, names.join("+")))
    }

    fn is_exported(&self, row: u32) -> Result<bool, MetadataError> {
        for (depth, &r) in self.nesting_chain(row).iter().enumerate() {
            let visibility = self.tables.cell(TYPE_DEF, r, 0)? & VISIBILITY_MASK;
            let expected = if depth == 0 {
                VISIBILITY_PUBLIC
            } else {
                VISIBILITY_NESTED_PUBLIC
            };
            if visibility != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn type_ref_name(&self, row: u32) -> Result<String, MetadataError> {
        let mut names = Vec::new();
        let mut current = row;
        loop {
            names.push(self.string(TYPE_REF, current, 1)?);
            let scope = self.tables.cell(TYPE_REF, current, 0)?;
            match CodedIndex::ResolutionScope.decode(scope) {
                Some((RESOLUTION_SCOPE_TYPE_REF, outer))
                    if outer != 0 && outer != current && names.len() <= 64 =>
                {
                    current = outer;
                }
                _ => break,
            }
        }
        names.reverse();
        let namespace = self.string(TYPE_REF, current, 2)?;
        Ok(qualify(&namespace, &names.join("+")))
    }

    fn type_def_or_ref_name(&self, coded: u32) -> Result<Option<String>, MetadataError> {
        match CodedIndex::TypeDefOrRef.decode(coded) {
            Some((_, 0)) | None => Ok(None),
            Some((TYPE_DEF, row)) => {
                let (namespace, name) = self.type_def_name(row)?;
                Ok(Some(qualify(&namespace, &name)))
            }
            Some((TYPE_REF, row)) => self.type_ref_name(row).map(Some),
            Some((TYPE_SPEC, row)) => self.type_spec_name(row),
            Some(_) => Ok(None),
        }
    }

    /// Generic instantiations resolve to their open definition; other specs have no name.
    fn type_spec_name(&self, row: u32) -> Result<Option<String>, MetadataError> {
        let blob = heap_blob(self.blobs, self.tables.cell(TYPE_SPEC, row, 0)?)?;
        if blob.len() < 3 || blob[0] != ELEMENT_GENERIC_INST {
            return Ok(None);
        }
        if !matches!(u8_at(blob, 1)?, ELEMENT_CLASS | ELEMENT_VALUE_TYPE) {
            return Ok(None);
        }
        let (coded, _) = compressed_u32(blob, 2)?;
        match CodedIndex::TypeDefOrRef.decode(coded) {
            Some((TYPE_SPEC, _)) => Ok(None),
            _ => self.type_def_or_ref_name(coded),
        }
    }

    fn has_public_default_ctor(&self, row: u32) -> Result<bool, MetadataError> {
        let method_count = self.tables.rows(METHOD_DEF);
        let start = self.tables.cell(TYPE_DEF, row, 5)?.max(1);
        let end = if row < self.tables.rows(TYPE_DEF) {
            self.tables.cell(TYPE_DEF, row + 1, 5)?
        } else {
            method_count + 1
        };
        let end = end.min(method_count + 1);

        for method in start..end {
            if self.string(METHOD_DEF, method, 3)? != ".ctor" {
                continue;
            }
            let flags = self.tables.cell(METHOD_DEF, method, 2)?;
            if flags & METHOD_ACCESS_MASK != METHOD_PUBLIC || flags & METHOD_STATIC != 0 {
                continue;
            }
            let signature = heap_blob(self.blobs, self.tables.cell(METHOD_DEF, method, 4)?)?;
            if signature.len() < 2 || signature[0] & SIG_HAS_THIS == 0 {
                continue;
            }
            if compressed_u32(signature, 1)?.0 == 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}
