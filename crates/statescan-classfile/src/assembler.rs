//! Minimal class-file writer.
//!
//! Produces well-formed `.class` byte vectors for the structures the decoder
//! cares about: hierarchy, annotations, fields, methods, and simple method
//! bodies. The scanner's test suites use it in place of compiled fixtures,
//! and re-decoding its output pins the decoder's semantic identity.
//!
//! It is intentionally not a general-purpose backend: bodies are built from
//! a small opcode vocabulary and verification-correctness of emitted
//! bytecode is out of scope.

use std::collections::HashMap;

/// Java 8 classfile version.
const MAJOR_VERSION: u16 = 52;

#[derive(Clone, PartialEq, Eq, Hash)]
enum Entry {
    Utf8(String),
    Class(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef { interface: bool, class: u16, nat: u16 },
}

#[derive(Default)]
struct Pool {
    entries: Vec<Entry>,
    dedup: HashMap<Entry, u16>,
}

impl Pool {
    fn intern(&mut self, entry: Entry) -> u16 {
        if let Some(&index) = self.dedup.get(&entry) {
            return index;
        }
        self.entries.push(entry.clone());
        let index = self.entries.len() as u16; // 1-based
        self.dedup.insert(entry, index);
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        self.intern(Entry::Utf8(text.to_string()))
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.intern(Entry::Class(name))
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.intern(Entry::NameAndType(name, descriptor))
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::FieldRef(class, nat))
    }

    fn method_ref(&mut self, interface: bool, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::MethodRef {
            interface,
            class,
            nat,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_u16(out, self.entries.len() as u16 + 1);
        for entry in &self.entries {
            match entry {
                Entry::Utf8(text) => {
                    out.push(1);
                    // Tests only use ASCII identifiers; plain UTF-8 suffices.
                    push_u16(out, text.len() as u16);
                    out.extend_from_slice(text.as_bytes());
                }
                Entry::Class(name) => {
                    out.push(7);
                    push_u16(out, *name);
                }
                Entry::NameAndType(name, descriptor) => {
                    out.push(12);
                    push_u16(out, *name);
                    push_u16(out, *descriptor);
                }
                Entry::FieldRef(class, nat) => {
                    out.push(9);
                    push_u16(out, *class);
                    push_u16(out, *nat);
                }
                Entry::MethodRef {
                    interface,
                    class,
                    nat,
                } => {
                    out.push(if *interface { 11 } else { 10 });
                    push_u16(out, *class);
                    push_u16(out, *nat);
                }
            }
        }
    }
}

/// One instruction in a synthesized method body.
#[derive(Clone)]
pub enum Op {
    InvokeVirtual { owner: String, name: String, descriptor: String },
    InvokeSpecial { owner: String, name: String, descriptor: String },
    InvokeStatic { owner: String, name: String, descriptor: String },
    InvokeInterface { owner: String, name: String, descriptor: String },
    GetStatic { owner: String, name: String, descriptor: String },
    PutStatic { owner: String, name: String, descriptor: String },
    GetField { owner: String, name: String, descriptor: String },
    PutField { owner: String, name: String, descriptor: String },
    /// `ldc_w` of a class literal (internal name).
    LoadClass(String),
    /// `new` of the given class.
    New(String),
    /// Raw instruction bytes appended verbatim.
    Raw(Vec<u8>),
}

impl Op {
    pub fn invoke_virtual(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeVirtual {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn invoke_special(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeSpecial {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn invoke_static(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeStatic {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn invoke_interface(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeInterface {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn get_static(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::GetStatic {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn put_field(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::PutField {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn load_class(internal_name: &str) -> Self {
        Op::LoadClass(internal_name.into())
    }
}

#[derive(Clone)]
pub struct FieldDef {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    /// Annotation type descriptors, e.g. `Ljavax/inject/Inject;`.
    pub annotations: Vec<String>,
}

#[derive(Clone)]
pub struct MethodDef {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<String>,
    pub parameter_annotations: Vec<Vec<String>>,
    pub body: Vec<Op>,
}

impl MethodDef {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn annotated(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    pub fn parameter_annotations(mut self, per_param: Vec<Vec<&str>>) -> Self {
        self.parameter_annotations = per_param
            .into_iter()
            .map(|anns| anns.into_iter().map(str::to_string).collect())
            .collect();
        self
    }

    pub fn body(mut self, ops: Vec<Op>) -> Self {
        self.body = ops;
        self
    }
}

/// Builder for a synthesized class. Names are internal (slash) form.
pub struct ClassBuilder {
    access_flags: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    annotations: Vec<String>,
    source_file: Option<String>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl ClassBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            access_flags: super::access::PUBLIC,
            this_class: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            annotations: Vec::new(),
            source_file: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = Some(internal_name.to_string());
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn annotated(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    pub fn source_file(mut self, name: &str) -> Self {
        self.source_file = Some(name.to_string());
        self
    }

    pub fn field(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(FieldDef {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotated_field(
        mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        annotations: Vec<&str>,
    ) -> Self {
        self.fields.push(FieldDef {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: annotations.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();

        let this_class = pool.class(&self.this_class);
        let super_class = self.super_class.as_deref().map(|name| pool.class(name));
        let interfaces: Vec<u16> = self
            .interfaces
            .iter()
            .map(|name| pool.class(name))
            .collect();

        let fields: Vec<(u16, u16, u16, Vec<Attribute>)> = self
            .fields
            .iter()
            .map(|field| {
                let name = pool.utf8(&field.name);
                let descriptor = pool.utf8(&field.descriptor);
                let mut attrs = Vec::new();
                if !field.annotations.is_empty() {
                    attrs.push(annotations_attribute(&mut pool, &field.annotations));
                }
                (field.access_flags, name, descriptor, attrs)
            })
            .collect();

        let methods: Vec<(u16, u16, u16, Vec<Attribute>)> = self
            .methods
            .iter()
            .map(|method| {
                let name = pool.utf8(&method.name);
                let descriptor = pool.utf8(&method.descriptor);
                let mut attrs = Vec::new();
                if !method.annotations.is_empty() {
                    attrs.push(annotations_attribute(&mut pool, &method.annotations));
                }
                if !method.parameter_annotations.is_empty() {
                    attrs.push(parameter_annotations_attribute(
                        &mut pool,
                        &method.parameter_annotations,
                    ));
                }
                attrs.push(code_attribute(&mut pool, &method.body));
                (method.access_flags, name, descriptor, attrs)
            })
            .collect();

        let mut class_attrs = Vec::new();
        if !self.annotations.is_empty() {
            class_attrs.push(annotations_attribute(&mut pool, &self.annotations));
        }
        if let Some(source_file) = &self.source_file {
            let name = pool.utf8("SourceFile");
            let value = pool.utf8(source_file);
            let mut body = Vec::new();
            push_u16(&mut body, value);
            class_attrs.push(Attribute { name, body });
        }

        let mut out = Vec::new();
        push_u32(&mut out, 0xCAFEBABE);
        push_u16(&mut out, 0); // minor
        push_u16(&mut out, MAJOR_VERSION);
        pool.write(&mut out);
        push_u16(&mut out, self.access_flags);
        push_u16(&mut out, this_class);
        push_u16(&mut out, super_class.unwrap_or(0));
        push_u16(&mut out, interfaces.len() as u16);
        for interface in interfaces {
            push_u16(&mut out, interface);
        }

        for member_list in [fields, methods] {
            push_u16(&mut out, member_list.len() as u16);
            for (access, name, descriptor, attrs) in member_list {
                push_u16(&mut out, access);
                push_u16(&mut out, name);
                push_u16(&mut out, descriptor);
                write_attributes(&mut out, &attrs);
            }
        }

        write_attributes(&mut out, &class_attrs);
        out
    }
}

struct Attribute {
    name: u16,
    body: Vec<u8>,
}

fn write_attributes(out: &mut Vec<u8>, attrs: &[Attribute]) {
    push_u16(out, attrs.len() as u16);
    for attr in attrs {
        push_u16(out, attr.name);
        push_u32(out, attr.body.len() as u32);
        out.extend_from_slice(&attr.body);
    }
}

fn annotations_attribute(pool: &mut Pool, descriptors: &[String]) -> Attribute {
    let name = pool.utf8("RuntimeVisibleAnnotations");
    let mut body = Vec::new();
    push_u16(&mut body, descriptors.len() as u16);
    for descriptor in descriptors {
        let type_index = pool.utf8(descriptor);
        push_u16(&mut body, type_index);
        push_u16(&mut body, 0); // no element pairs
    }
    Attribute { name, body }
}

fn parameter_annotations_attribute(pool: &mut Pool, per_param: &[Vec<String>]) -> Attribute {
    let name = pool.utf8("RuntimeVisibleParameterAnnotations");
    let mut body = Vec::new();
    body.push(per_param.len() as u8);
    for annotations in per_param {
        push_u16(&mut body, annotations.len() as u16);
        for descriptor in annotations {
            let type_index = pool.utf8(descriptor);
            push_u16(&mut body, type_index);
            push_u16(&mut body, 0);
        }
    }
    Attribute { name, body }
}

fn code_attribute(pool: &mut Pool, ops: &[Op]) -> Attribute {
    let mut code = Vec::new();
    for op in ops {
        match op {
            Op::InvokeVirtual { owner, name, descriptor } => {
                let index = pool.method_ref(false, owner, name, descriptor);
                code.push(0xb6);
                push_u16(&mut code, index);
            }
            Op::InvokeSpecial { owner, name, descriptor } => {
                let index = pool.method_ref(false, owner, name, descriptor);
                code.push(0xb7);
                push_u16(&mut code, index);
            }
            Op::InvokeStatic { owner, name, descriptor } => {
                let index = pool.method_ref(false, owner, name, descriptor);
                code.push(0xb8);
                push_u16(&mut code, index);
            }
            Op::InvokeInterface { owner, name, descriptor } => {
                let index = pool.method_ref(true, owner, name, descriptor);
                code.push(0xb9);
                push_u16(&mut code, index);
                code.push(1); // count
                code.push(0);
            }
            Op::GetStatic { owner, name, descriptor } => {
                field_access(pool, &mut code, 0xb2, owner, name, descriptor);
            }
            Op::PutStatic { owner, name, descriptor } => {
                field_access(pool, &mut code, 0xb3, owner, name, descriptor);
            }
            Op::GetField { owner, name, descriptor } => {
                field_access(pool, &mut code, 0xb4, owner, name, descriptor);
            }
            Op::PutField { owner, name, descriptor } => {
                field_access(pool, &mut code, 0xb5, owner, name, descriptor);
            }
            Op::LoadClass(internal_name) => {
                let index = pool.class(internal_name);
                code.push(0x13); // ldc_w
                push_u16(&mut code, index);
            }
            Op::New(internal_name) => {
                let index = pool.class(internal_name);
                code.push(0xbb);
                push_u16(&mut code, index);
            }
            Op::Raw(bytes) => code.extend_from_slice(bytes),
        }
    }
    code.push(0xb1); // return

    let name = pool.utf8("Code");
    let mut body = Vec::new();
    push_u16(&mut body, 8); // max_stack
    push_u16(&mut body, 8); // max_locals
    push_u32(&mut body, code.len() as u32);
    body.extend_from_slice(&code);
    push_u16(&mut body, 0); // exception_table_length
    push_u16(&mut body, 0); // attributes_count
    Attribute { name, body }
}

fn field_access(
    pool: &mut Pool,
    code: &mut Vec<u8>,
    opcode: u8,
    owner: &str,
    name: &str,
    descriptor: &str,
) {
    let index = pool.field_ref(owner, name, descriptor);
    code.push(opcode);
    push_u16(code, index);
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
