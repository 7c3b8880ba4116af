//! Synthesized managed PE images.
//!
//! Builds the smallest PE32 file the metadata reader accepts: one `.text`
//! section holding a CLI header followed by an ECMA-335 metadata root with
//! `#~`, `#Strings` and `#Blob` streams. Every index is 2 bytes wide.

#![allow(dead_code)]

pub const PUBLIC: u32 = 0x0000_0001;
pub const NOT_PUBLIC: u32 = 0x0000_0000;
pub const NESTED_PUBLIC: u32 = 0x0000_0002;
pub const NESTED_PRIVATE: u32 = 0x0000_0003;
pub const INTERFACE: u32 = 0x0000_0020;
pub const ABSTRACT: u32 = 0x0000_0080;

const TABLE_MODULE: u8 = 0x00;
const TABLE_TYPE_REF: u8 = 0x01;
const TABLE_TYPE_DEF: u8 = 0x02;
const TABLE_METHOD_DEF: u8 = 0x06;
const TABLE_TYPE_SPEC: u8 = 0x1B;
const TABLE_ASSEMBLY: u8 = 0x20;
const TABLE_NESTED_CLASS: u8 = 0x29;
const TABLE_GENERIC_PARAM: u8 = 0x2A;

/// A `TypeDefOrRef` target.
#[derive(Debug, Clone, Copy)]
pub enum Base {
    Def(u16),
    Ref(u16),
    Spec(u16),
}

impl Base {
    fn coded(self) -> u16 {
        match self {
            Base::Def(row) => row << 2,
            Base::Ref(row) => (row << 2) | 1,
            Base::Spec(row) => (row << 2) | 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: &'static str,
    pub flags: u16,
    pub signature: Vec<u8>,
}

impl Method {
    /// `public instance void .ctor()`
    pub fn public_ctor() -> Self {
        Self {
            name: ".ctor",
            flags: 0x1886,
            signature: vec![0x20, 0x00, 0x01],
        }
    }

    /// `public instance void .ctor(string)`
    pub fn ctor_with_argument() -> Self {
        Self {
            name: ".ctor",
            flags: 0x1886,
            signature: vec![0x20, 0x01, 0x01, 0x0E],
        }
    }

    pub fn private_ctor() -> Self {
        Self {
            name: ".ctor",
            flags: 0x1881,
            signature: vec![0x20, 0x00, 0x01],
        }
    }

    pub fn static_ctor_named_ctor() -> Self {
        Self {
            name: ".ctor",
            flags: 0x1896,
            signature: vec![0x00, 0x00, 0x01],
        }
    }

    pub fn public_method(name: &'static str) -> Self {
        Self {
            name,
            flags: 0x0086,
            signature: vec![0x20, 0x00, 0x01],
        }
    }
}

struct TypeDefRow {
    flags: u32,
    name: u16,
    namespace: u16,
    extends: u16,
    method_list: u16,
}

struct MethodRow {
    flags: u16,
    name: u16,
    signature: u16,
}

pub struct ImageBuilder {
    strings: Vec<u8>,
    blobs: Vec<u8>,
    type_refs: Vec<[u16; 3]>,
    type_defs: Vec<TypeDefRow>,
    methods: Vec<MethodRow>,
    type_specs: Vec<u16>,
    nested: Vec<(u16, u16)>,
    generic_params: Vec<(u16, u16)>,
    assembly: Option<u16>,
    table_stream_name: &'static str,
}

impl ImageBuilder {
    /// Starts with the `<Module>` pseudo type in TypeDef row 1.
    pub fn new(assembly_name: Option<&str>) -> Self {
        let mut builder = Self {
            strings: vec![0],
            blobs: vec![0],
            type_refs: Vec::new(),
            type_defs: Vec::new(),
            methods: Vec::new(),
            type_specs: Vec::new(),
            nested: Vec::new(),
            generic_params: Vec::new(),
            assembly: None,
            table_stream_name: "#~",
        };
        builder.assembly = assembly_name.map(|name| builder.string(name));
        builder.type_def("", "<Module>", NOT_PUBLIC, None, Vec::new());
        builder
    }

    /// Emit the tables under the uncompressed `#-` stream name.
    pub fn with_uncompressed_tables(mut self) -> Self {
        self.table_stream_name = "#-";
        self
    }

    fn string(&mut self, value: &str) -> u16 {
        if value.is_empty() {
            return 0;
        }
        let index = self.strings.len() as u16;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        index
    }

    fn blob(&mut self, bytes: &[u8]) -> u16 {
        let index = self.blobs.len() as u16;
        self.blobs.push(bytes.len() as u8);
        self.blobs.extend_from_slice(bytes);
        index
    }

    pub fn type_ref(&mut self, namespace: &str, name: &str) -> Base {
        let row = [0, self.string(name), self.string(namespace)];
        self.type_refs.push(row);
        Base::Ref(self.type_refs.len() as u16)
    }

    /// A TypeRef scoped to another TypeRef (a nested type of another module).
    pub fn nested_type_ref(&mut self, outer: Base, name: &str) -> Base {
        let Base::Ref(outer_row) = outer else {
            panic!("nested type refs are scoped to a type ref");
        };
        let row = [(outer_row << 2) | 3, self.string(name), 0];
        self.type_refs.push(row);
        Base::Ref(self.type_refs.len() as u16)
    }

    /// `class Definition<object>`
    pub fn generic_instance(&mut self, definition: Base) -> Base {
        let coded = definition.coded();
        assert!(coded < 0x80, "fixture keeps coded indexes in one byte");
        let blob = self.blob(&[0x15, 0x12, coded as u8, 0x01, 0x1C]);
        self.type_specs.push(blob);
        Base::Spec(self.type_specs.len() as u16)
    }

    /// Appends a TypeDef row and its methods; returns the row number.
    pub fn type_def(
        &mut self,
        namespace: &str,
        name: &str,
        flags: u32,
        extends: Option<Base>,
        methods: Vec<Method>,
    ) -> u16 {
        let row = TypeDefRow {
            flags,
            name: self.string(name),
            namespace: self.string(namespace),
            extends: extends.map(Base::coded).unwrap_or(0),
            method_list: self.methods.len() as u16 + 1,
        };
        for method in methods {
            let name = self.string(method.name);
            let signature = self.blob(&method.signature);
            self.methods.push(MethodRow {
                flags: method.flags,
                name,
                signature,
            });
        }
        self.type_defs.push(row);
        self.type_defs.len() as u16
    }

    pub fn nest(&mut self, inner: u16, outer: u16) {
        self.nested.push((inner, outer));
    }

    pub fn generic_param(&mut self, owner: u16, name: &str) {
        let name = self.string(name);
        self.generic_params.push((owner << 1, name));
    }

    fn tables(&self) -> Vec<u8> {
        let mut counts: Vec<(u8, u32)> = vec![(TABLE_MODULE, 1)];
        let mut push = |table: u8, rows: usize| {
            if rows > 0 {
                counts.push((table, rows as u32));
            }
        };
        push(TABLE_TYPE_REF, self.type_refs.len());
        push(TABLE_TYPE_DEF, self.type_defs.len());
        push(TABLE_METHOD_DEF, self.methods.len());
        push(TABLE_TYPE_SPEC, self.type_specs.len());
        push(TABLE_ASSEMBLY, usize::from(self.assembly.is_some()));
        push(TABLE_NESTED_CLASS, self.nested.len());
        push(TABLE_GENERIC_PARAM, self.generic_params.len());

        let valid = counts.iter().fold(0u64, |mask, (t, _)| mask | (1 << t));
        let mut out = Vec::new();
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&[2, 0, 0, 1]);
        out.extend_from_slice(&valid.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        for (_, rows) in &counts {
            out.extend_from_slice(&rows.to_le_bytes());
        }

        let u16s = |out: &mut Vec<u8>, values: &[u16]| {
            for v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        };

        // Module: generation, name, mvid, encid, encbaseid
        u16s(&mut out, &[0, 0, 0, 0, 0]);
        for row in &self.type_refs {
            u16s(&mut out, row);
        }
        for row in &self.type_defs {
            out.extend_from_slice(&row.flags.to_le_bytes());
            u16s(&mut out, &[row.name, row.namespace, row.extends, 1, row.method_list]);
        }
        for row in &self.methods {
            out.extend_from_slice(&0u32.to_le_bytes());
            u16s(&mut out, &[0, row.flags, row.name, row.signature, 1]);
        }
        for blob in &self.type_specs {
            u16s(&mut out, &[*blob]);
        }
        if let Some(name) = self.assembly {
            out.extend_from_slice(&0x8004u32.to_le_bytes());
            u16s(&mut out, &[1, 0, 0, 0]);
            out.extend_from_slice(&0u32.to_le_bytes());
            u16s(&mut out, &[0, name, 0]);
        }
        for (inner, outer) in &self.nested {
            u16s(&mut out, &[*inner, *outer]);
        }
        for (owner, name) in &self.generic_params {
            u16s(&mut out, &[0, 0, *owner, *name]);
        }
        out
    }

    fn metadata(&self) -> Vec<u8> {
        let streams: Vec<(&str, Vec<u8>)> = vec![
            (self.table_stream_name, self.tables()),
            ("#Strings", self.strings.clone()),
            ("#Blob", self.blobs.clone()),
        ];
        let version = b"v4.0.30319\0\0";
        let padded_name = |name: &str| (name.len() + 4) / 4 * 4;
        let header_len = 16
            + version.len()
            + 4
            + streams
                .iter()
                .map(|(name, _)| 8 + padded_name(name))
                .sum::<usize>();

        let mut out = Vec::new();
        out.extend_from_slice(&0x424A_5342u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(version.len() as u32).to_le_bytes());
        out.extend_from_slice(version);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let mut offset = header_len;
        for (name, data) in &streams {
            let size = (data.len() + 3) / 4 * 4;
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(size as u32).to_le_bytes());
            let mut raw = name.as_bytes().to_vec();
            raw.resize(padded_name(name), 0);
            out.extend_from_slice(&raw);
            offset += size;
        }
        for (_, data) in &streams {
            let mut data = data.clone();
            data.resize((data.len() + 3) / 4 * 4, 0);
            out.extend_from_slice(&data);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let metadata = self.metadata();
        let mut text = Vec::new();
        text.extend_from_slice(&72u32.to_le_bytes());
        text.extend_from_slice(&2u16.to_le_bytes());
        text.extend_from_slice(&5u16.to_le_bytes());
        text.extend_from_slice(&(TEXT_RVA + 72).to_le_bytes());
        text.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        text.extend_from_slice(&1u32.to_le_bytes());
        text.resize(72, 0);
        text.extend_from_slice(&metadata);
        pe_image(&text, Some((TEXT_RVA, 72)))
    }
}

const TEXT_RVA: u32 = 0x2000;
const FILE_ALIGNMENT: usize = 0x200;

/// PE32 image with one `.text` section; `cli` is the CLI directory entry.
fn pe_image(text: &[u8], cli: Option<(u32, u32)>) -> Vec<u8> {
    let mut file = vec![0u8; FILE_ALIGNMENT];
    file[..2].copy_from_slice(b"MZ");
    file[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());

    let put16 = |file: &mut Vec<u8>, at: usize, v: u16| file[at..at + 2].copy_from_slice(&v.to_le_bytes());
    let put32 = |file: &mut Vec<u8>, at: usize, v: u32| file[at..at + 4].copy_from_slice(&v.to_le_bytes());

    file[0x80..0x84].copy_from_slice(b"PE\0\0");
    let coff = 0x84;
    put16(&mut file, coff, 0x014C);
    put16(&mut file, coff + 2, 1);
    put16(&mut file, coff + 16, 0xE0);
    put16(&mut file, coff + 18, 0x2102);

    let optional = coff + 20;
    put16(&mut file, optional, 0x010B);
    put32(&mut file, optional + 92, 16);
    if let Some((rva, size)) = cli {
        put32(&mut file, optional + 96 + 14 * 8, rva);
        put32(&mut file, optional + 96 + 14 * 8 + 4, size);
    }

    let raw_size = text.len().div_ceil(FILE_ALIGNMENT) * FILE_ALIGNMENT;
    let section = optional + 0xE0;
    file[section..section + 5].copy_from_slice(b".text");
    put32(&mut file, section + 8, text.len() as u32);
    put32(&mut file, section + 12, TEXT_RVA);
    put32(&mut file, section + 16, raw_size as u32);
    put32(&mut file, section + 20, FILE_ALIGNMENT as u32);

    file.extend_from_slice(text);
    file.resize(FILE_ALIGNMENT + raw_size, 0);
    file
}

/// A native PE image with no CLI header.
pub fn native_image() -> Vec<u8> {
    pe_image(&[0xC3; 16], None)
}
