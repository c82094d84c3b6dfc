use crate::constant_pool::{ConstantPool, CpInfo};
use crate::descriptor::internal_to_binary;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// A runtime-visible or -invisible annotation use site.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Raw type descriptor, e.g. `Ljavax/inject/Singleton;`.
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    /// Dotted annotation class name, e.g. `javax.inject.Singleton`.
    ///
    /// Returns the raw descriptor when it is not in `L…;` form (never the
    /// case for classfiles produced by a conforming compiler).
    pub fn binary_name(&self) -> String {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
            .map(internal_to_binary)
            .unwrap_or_else(|| self.type_descriptor.clone())
    }

    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

        let pair_count = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(pair_count);
        for _ in 0..pair_count {
            let name = cp.get_utf8(reader.read_u2()?)?.to_string();
            let value = ElementValue::parse(reader, cp)?;
            elements.push((name, value));
        }

        Ok(Self {
            type_descriptor,
            elements,
        })
    }
}

/// An annotation element value.
///
/// The scanner only ever consults class-literal and string values, but the
/// whole tree must be parsed to advance the reader past the attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Int(i64),
    Float(f64),
    Boolean(bool),
    Char(char),
    Str(String),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class(String),
    Nested(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let tag = reader.read_u1()? as char;
        match tag {
            'B' | 'I' | 'S' => Ok(ElementValue::Int(i64::from(read_int(reader, cp)?))),
            'Z' => Ok(ElementValue::Boolean(read_int(reader, cp)? != 0)),
            'C' => {
                let raw = read_int(reader, cp)?;
                let ch = char::from_u32(raw as u32)
                    .ok_or(Error::MalformedAttribute("RuntimeVisibleAnnotations"))?;
                Ok(ElementValue::Char(ch))
            }
            'J' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Long(v) => Ok(ElementValue::Int(*v)),
                    other => Err(mismatch(idx, "Long", other)),
                }
            }
            'F' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Float(v) => Ok(ElementValue::Float(f64::from(*v))),
                    other => Err(mismatch(idx, "Float", other)),
                }
            }
            'D' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Double(v) => Ok(ElementValue::Float(*v)),
                    other => Err(mismatch(idx, "Double", other)),
                }
            }
            's' => {
                let idx = reader.read_u2()?;
                Ok(ElementValue::Str(cp.get_utf8(idx)?.to_string()))
            }
            'e' => {
                let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
                let const_name = cp.get_utf8(reader.read_u2()?)?.to_string();
                Ok(ElementValue::Enum {
                    type_descriptor,
                    const_name,
                })
            }
            'c' => Ok(ElementValue::Class(
                cp.get_utf8(reader.read_u2()?)?.to_string(),
            )),
            '@' => Ok(ElementValue::Nested(Box::new(Annotation::parse(
                reader, cp,
            )?))),
            '[' => {
                let len = reader.read_u2()? as usize;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(ElementValue::parse(reader, cp)?);
                }
                Ok(ElementValue::Array(values))
            }
            _ => Err(Error::MalformedAttribute("RuntimeVisibleAnnotations")),
        }
    }
}

fn read_int(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<i32> {
    let idx = reader.read_u2()?;
    match cp.get(idx)? {
        CpInfo::Integer(v) => Ok(*v),
        other => Err(mismatch(idx, "Integer", other)),
    }
}

fn mismatch(index: u16, expected: &'static str, found: &CpInfo) -> Error {
    Error::ConstantPoolTypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}
