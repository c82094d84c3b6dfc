//! JVM type-descriptor grammar: parse, emit, and name-form helpers.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn code(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal (slash-form) class name.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// The element type after stripping any number of array dimensions.
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::Array(inner) => inner.element_type(),
            other => other,
        }
    }

    /// Dotted name of the (array-stripped) object type, if this is one.
    pub fn object_binary_name(&self) -> Option<String> {
        match self.element_type() {
            FieldType::Object(internal) => Some(internal_to_binary(internal)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.code()),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(inner) => write!(f, "[{inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let rest = desc
        .strip_prefix('(')
        .ok_or_else(|| Error::InvalidDescriptor(desc.to_string()))?;

    let mut rest = rest;
    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, tail) = parse_field_type(rest)?;
        params.push(param);
        rest = tail;
    }

    let (return_type, rest) = if let Some(tail) = rest.strip_prefix('V') {
        (ReturnType::Void, tail)
    } else {
        let (ty, tail) = parse_field_type(rest)?;
        (ReturnType::Type(ty), tail)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let first = input
        .bytes()
        .next()
        .ok_or_else(|| Error::InvalidDescriptor(input.to_string()))?;
    match first {
        b'B' => Ok((FieldType::Base(BaseType::Byte), &input[1..])),
        b'C' => Ok((FieldType::Base(BaseType::Char), &input[1..])),
        b'D' => Ok((FieldType::Base(BaseType::Double), &input[1..])),
        b'F' => Ok((FieldType::Base(BaseType::Float), &input[1..])),
        b'I' => Ok((FieldType::Base(BaseType::Int), &input[1..])),
        b'J' => Ok((FieldType::Base(BaseType::Long), &input[1..])),
        b'S' => Ok((FieldType::Base(BaseType::Short), &input[1..])),
        b'Z' => Ok((FieldType::Base(BaseType::Boolean), &input[1..])),
        b'L' => match input.find(';') {
            Some(end) if end > 1 => Ok((
                FieldType::Object(input[1..end].to_string()),
                &input[end + 1..],
            )),
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        b'[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}

/// `java/util/Map` → `java.util.Map`.
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `java.util.Map` → `java/util/Map`.
pub fn binary_to_internal(binary: &str) -> String {
    binary.replace('.', "/")
}

/// Dotted object name behind a raw field descriptor, stripping arrays.
///
/// `[[Ljava/util/HashMap;` → `Some("java.util.HashMap")`; primitives and
/// primitive arrays return `None`.
pub fn descriptor_object_name(descriptor: &str) -> Option<String> {
    parse_field_descriptor(descriptor)
        .ok()
        .and_then(|ty| ty.object_binary_name())
}

/// Human-readable type for reports: `Ljava/util/HashMap;` → `java.util.HashMap`,
/// `[I` → `int[]`, `Z` → `boolean`.
pub fn descriptor_display_name(descriptor: &str) -> String {
    match parse_field_descriptor(descriptor) {
        Ok(ty) => field_type_display(&ty),
        Err(_) => descriptor.to_string(),
    }
}

fn field_type_display(ty: &FieldType) -> String {
    match ty {
        FieldType::Base(base) => match base {
            BaseType::Byte => "byte".to_string(),
            BaseType::Char => "char".to_string(),
            BaseType::Double => "double".to_string(),
            BaseType::Float => "float".to_string(),
            BaseType::Int => "int".to_string(),
            BaseType::Long => "long".to_string(),
            BaseType::Short => "short".to_string(),
            BaseType::Boolean => "boolean".to_string(),
        },
        FieldType::Object(internal) => internal_to_binary(internal),
        FieldType::Array(inner) => format!("{}[]", field_type_display(inner)),
    }
}

/// Last dotted segment: `java.util.HashMap` → `HashMap`.
pub fn simple_name(binary: &str) -> &str {
    binary.rsplit('.').next().unwrap_or(binary)
}
