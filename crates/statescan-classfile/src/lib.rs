#![forbid(unsafe_code)]

//! Parsing of JVM `.class` byte blobs into the structures the class graph
//! consumes: names, hierarchy, annotations, member shapes, and per-method
//! invocation / field-access / class-literal summaries.

pub mod assembler;

mod annotation;
mod classfile;
mod code;
mod constant_pool;
mod descriptor;
mod error;
mod reader;

pub use crate::annotation::{Annotation, ElementValue};
pub use crate::classfile::{access, ClassFile, ClassMember};
pub use crate::code::CodeSummary;
pub use crate::constant_pool::MemberRef;
pub use crate::descriptor::{
    binary_to_internal, descriptor_display_name, descriptor_object_name, internal_to_binary,
    parse_field_descriptor, parse_method_descriptor, simple_name, BaseType, FieldType,
    MethodDescriptor, ReturnType,
};
pub use crate::error::{Error, Result};
