use crate::annotation::Annotation;
use crate::code::{parse_code_attribute, CodeSummary};
use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const VOLATILE: u16 = 0x0040;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

/// A decoded class file. Names are in internal (slash) form at this layer;
/// the graph model converts to dotted form.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    /// Visible and invisible annotations, in declaration order.
    pub annotations: Vec<Annotation>,
    pub source_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
    /// Per-parameter annotations, indexed by descriptor parameter position.
    /// Empty for fields and for methods without parameter annotations.
    pub parameter_annotations: Vec<Vec<Annotation>>,
    /// Present for methods with a `Code` attribute.
    pub code: Option<CodeSummary>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class_idx = reader.read_u2()?;
        let super_class = if super_class_idx == 0 {
            None
        } else {
            Some(cp.get_class_name(super_class_idx)?)
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp, MemberKind::Field)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp, MemberKind::Method)?);
        }

        let class_attrs = parse_attributes(&mut reader, &cp, AttributeTarget::Class)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            annotations: class_attrs.annotations,
            source_file: class_attrs.source_file,
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & access::INTERFACE != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & access::ABSTRACT != 0
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags & access::ENUM != 0
    }
}

#[derive(Clone, Copy, PartialEq)]
enum MemberKind {
    Field,
    Method,
}

fn parse_member(reader: &mut Reader<'_>, cp: &ConstantPool, kind: MemberKind) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let target = match kind {
        MemberKind::Field => AttributeTarget::Field,
        MemberKind::Method => AttributeTarget::Method,
    };
    let attrs = parse_attributes(reader, cp, target)?;

    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        annotations: attrs.annotations,
        parameter_annotations: attrs.parameter_annotations,
        code: attrs.code,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    code: Option<CodeSummary>,
    source_file: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum AttributeTarget {
    Class,
    Field,
    Method,
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        let mut sub = Reader::new(info);
        match name {
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let num = sub.read_u2()? as usize;
                for _ in 0..num {
                    parsed.annotations.push(Annotation::parse(&mut sub, cp)?);
                }
                sub.ensure_empty()?;
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations"
                if target == AttributeTarget::Method =>
            {
                let num_params = sub.read_u1()? as usize;
                if parsed.parameter_annotations.len() < num_params {
                    parsed.parameter_annotations.resize(num_params, Vec::new());
                }
                for param in parsed.parameter_annotations.iter_mut().take(num_params) {
                    let num = sub.read_u2()? as usize;
                    for _ in 0..num {
                        param.push(Annotation::parse(&mut sub, cp)?);
                    }
                }
                sub.ensure_empty()?;
            }
            "Code" if target == AttributeTarget::Method => {
                parsed.code = Some(parse_code_attribute(info, cp)?);
            }
            "SourceFile" if target == AttributeTarget::Class => {
                parsed.source_file = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
                sub.ensure_empty()?;
            }
            _ => {
                // Unknown attribute: intentionally skipped.
            }
        }
    }

    Ok(parsed)
}
