//! The per-class analysis model. All names at this layer are dotted FQNs;
//! slash-form never escapes the decoder.

use std::collections::BTreeSet;

use statescan_classfile::{
    access, descriptor_display_name, descriptor_object_name, internal_to_binary,
    parse_method_descriptor, Annotation, ClassFile, ClassMember, MemberRef,
};

use crate::wellknown;

#[derive(Debug, Clone)]
pub struct ClassShape {
    pub fqn: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Class-level annotation FQNs.
    pub annotations: BTreeSet<String>,
    pub fields: Vec<FieldShape>,
    pub methods: Vec<MethodShape>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub is_enum: bool,
    pub is_project_local: bool,
    pub source_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: String,
    /// Raw JVM descriptor, e.g. `Ljava/util/HashMap;`.
    pub descriptor: String,
    pub annotations: BTreeSet<String>,
    pub is_static: bool,
    pub is_final: bool,
    pub is_private: bool,
    pub is_volatile: bool,
    pub is_synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct MethodShape {
    pub name: String,
    pub descriptor: String,
    pub annotations: BTreeSet<String>,
    /// Populated only for injection-relevant methods; see
    /// [`MethodShape::wants_parameters`].
    pub parameters: Vec<ParameterShape>,
    pub invocations: BTreeSet<MethodRef>,
    pub field_accesses: BTreeSet<FieldRef>,
    /// Class literals in bytecode order (pairing matters for DI discovery).
    pub class_constants: Vec<String>,
    pub is_static: bool,
    pub is_public: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ParameterShape {
    pub index: u16,
    /// Dotted FQN of the (array-stripped) object type; `None` for primitives.
    pub type_fqn: Option<String>,
    pub annotations: BTreeSet<String>,
}

/// Reserved method names.
pub const CONSTRUCTOR: &str = "<init>";
pub const STATIC_INITIALIZER: &str = "<clinit>";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Wrapper types the JDK guarantees immutable; a `static final` field of one
/// of these is a constant, not shared state.
const IMMUTABLE_VALUE_TYPES: &[&str] = &[
    "java.lang.String",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.math.BigDecimal",
    "java.math.BigInteger",
];

impl FieldShape {
    /// Dotted FQN of the field's object type after array stripping.
    pub fn object_type(&self) -> Option<String> {
        descriptor_object_name(&self.descriptor)
    }

    /// Human-readable type for reports, e.g. `java.util.HashMap` or `long[]`.
    pub fn type_display(&self) -> String {
        descriptor_display_name(&self.descriptor)
    }

    fn is_primitive(&self) -> bool {
        !self.descriptor.starts_with('L') && !self.descriptor.starts_with('[')
    }

    /// `static final` primitive, string, or boxed primitive: a true constant.
    pub fn is_constant(&self) -> bool {
        if !self.is_static || !self.is_final {
            return false;
        }
        if self.is_primitive() {
            return true;
        }
        match self.object_type() {
            Some(fqn) => {
                // Arrays of immutable elements are still mutable slots.
                !self.descriptor.starts_with('[')
                    && (IMMUTABLE_VALUE_TYPES.contains(&fqn.as_str())
                        || fqn.starts_with("java.time."))
            }
            None => false,
        }
    }

    /// A static field whose referent can change across requests.
    pub fn is_static_mutable(&self) -> bool {
        self.is_static && !self.is_constant()
    }

    /// An instance field that may carry mutable state: either reassignable or
    /// typed to something other than an immutable value type.
    pub fn is_potentially_mutable(&self) -> bool {
        if self.is_static {
            return false;
        }
        if !self.is_final {
            return true;
        }
        match self.object_type() {
            Some(fqn) => {
                !IMMUTABLE_VALUE_TYPES.contains(&fqn.as_str()) && !fqn.starts_with("java.time.")
            }
            None => self.descriptor.starts_with('['),
        }
    }

    /// Logging fields are conventional and excluded from state findings.
    pub fn is_logger(&self) -> bool {
        if self.name.eq_ignore_ascii_case("log") || self.name.eq_ignore_ascii_case("logger") {
            return true;
        }
        self.object_type()
            .is_some_and(|fqn| fqn.contains("Log"))
    }
}

impl MethodShape {
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR
    }

    /// The parameter-metadata memory gate: retain parameters only for
    /// methods carrying an injection/provider annotation, or constructors
    /// with any parameter annotation.
    fn wants_parameters(member: &ClassMember) -> bool {
        let annotated_for_injection = member.annotations.iter().any(|ann| {
            let fqn = ann.binary_name();
            wellknown::is_injection_annotation(&fqn) || wellknown::is_provider_annotation(&fqn)
        });
        if annotated_for_injection {
            return true;
        }
        member.name == CONSTRUCTOR
            && member
                .parameter_annotations
                .iter()
                .any(|anns| !anns.is_empty())
    }
}

impl ClassShape {
    pub fn from_classfile(class: &ClassFile, is_project_local: bool) -> Self {
        let fqn = internal_to_binary(&class.this_class);
        let superclass = class.super_class.as_deref().map(internal_to_binary);
        let interfaces = class
            .interfaces
            .iter()
            .map(|name| internal_to_binary(name))
            .collect();

        let fields = class.fields.iter().map(field_shape).collect();
        let methods = class.methods.iter().map(method_shape).collect();

        Self {
            fqn,
            superclass,
            interfaces,
            annotations: annotation_names(&class.annotations),
            fields,
            methods,
            is_interface: class.is_interface(),
            is_abstract: class.is_abstract(),
            is_enum: class.is_enum(),
            is_project_local,
            source_file: class.source_file.clone(),
        }
    }

    /// The method named `name`, if any overload exists.
    pub fn method(&self, name: &str) -> Option<&MethodShape> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_interface && !self.is_abstract
    }
}

fn field_shape(member: &ClassMember) -> FieldShape {
    FieldShape {
        name: member.name.clone(),
        descriptor: member.descriptor.clone(),
        annotations: annotation_names(&member.annotations),
        is_static: member.access_flags & access::STATIC != 0,
        is_final: member.access_flags & access::FINAL != 0,
        is_private: member.access_flags & access::PRIVATE != 0,
        is_volatile: member.access_flags & access::VOLATILE != 0,
        is_synthetic: member.access_flags & access::SYNTHETIC != 0,
    }
}

fn method_shape(member: &ClassMember) -> MethodShape {
    let parameters = if MethodShape::wants_parameters(member) {
        parameter_shapes(member)
    } else {
        Vec::new()
    };

    let mut invocations = BTreeSet::new();
    let mut field_accesses = BTreeSet::new();
    let mut class_constants = Vec::new();
    if let Some(code) = &member.code {
        for invocation in &code.invocations {
            if let Some(owner) = ref_owner(invocation) {
                invocations.insert(MethodRef {
                    owner,
                    name: invocation.name.clone(),
                    descriptor: invocation.descriptor.clone(),
                });
            }
        }
        for acc in &code.field_accesses {
            if let Some(owner) = ref_owner(acc) {
                field_accesses.insert(FieldRef {
                    owner,
                    name: acc.name.clone(),
                    descriptor: acc.descriptor.clone(),
                });
            }
        }
        for constant in &code.class_constants {
            if let Some(fqn) = class_constant_name(constant) {
                class_constants.push(fqn);
            }
        }
    }

    MethodShape {
        name: member.name.clone(),
        descriptor: member.descriptor.clone(),
        annotations: annotation_names(&member.annotations),
        parameters,
        invocations,
        field_accesses,
        class_constants,
        is_static: member.access_flags & access::STATIC != 0,
        is_public: member.access_flags & access::PUBLIC != 0,
        is_abstract: member.access_flags & access::ABSTRACT != 0,
    }
}

fn parameter_shapes(member: &ClassMember) -> Vec<ParameterShape> {
    let Ok(descriptor) = parse_method_descriptor(&member.descriptor) else {
        return Vec::new();
    };

    descriptor
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| ParameterShape {
            index: index as u16,
            type_fqn: param.object_binary_name(),
            annotations: member
                .parameter_annotations
                .get(index)
                .map(|anns| annotation_names(anns))
                .unwrap_or_default(),
        })
        .collect()
}

fn annotation_names(annotations: &[Annotation]) -> BTreeSet<String> {
    annotations.iter().map(Annotation::binary_name).collect()
}

/// Owner of a member reference as a dotted class name. Array owners (e.g.
/// `clone()` on `[Ljava/lang/Object;`) collapse to the element class;
/// primitive-array owners are dropped.
fn ref_owner(member: &MemberRef) -> Option<String> {
    if member.owner.starts_with('[') {
        descriptor_object_name(&member.owner)
    } else {
        Some(internal_to_binary(&member.owner))
    }
}

/// An `ldc` class literal, which may itself be an array descriptor.
fn class_constant_name(internal: &str) -> Option<String> {
    if internal.starts_with('[') {
        descriptor_object_name(internal)
    } else {
        Some(internal_to_binary(internal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(descriptor: &str, is_static: bool, is_final: bool) -> FieldShape {
        FieldShape {
            name: "f".to_string(),
            descriptor: descriptor.to_string(),
            annotations: BTreeSet::new(),
            is_static,
            is_final,
            is_private: false,
            is_volatile: false,
            is_synthetic: false,
        }
    }

    #[test]
    fn constants_are_not_static_mutable() {
        assert!(!field("I", true, true).is_static_mutable());
        assert!(!field("Ljava/lang/String;", true, true).is_static_mutable());
        assert!(!field("Ljava/lang/Integer;", true, true).is_static_mutable());
    }

    #[test]
    fn mutable_statics_are_flagged() {
        assert!(field("Ljava/util/HashMap;", true, true).is_static_mutable());
        assert!(field("Ljava/lang/Object;", true, false).is_static_mutable());
        assert!(field("I", true, false).is_static_mutable());
        // Arrays are mutable even when the element type is immutable.
        assert!(field("[Ljava/lang/String;", true, true).is_static_mutable());
    }

    #[test]
    fn instance_fields_are_never_static_mutable() {
        assert!(!field("Ljava/util/HashMap;", false, false).is_static_mutable());
        assert!(field("Ljava/util/HashMap;", false, false).is_potentially_mutable());
        assert!(!field("Ljava/lang/String;", false, true).is_potentially_mutable());
    }

    #[test]
    fn logger_fields_are_recognized() {
        let mut f = field("Lorg/slf4j/Logger;", true, true);
        f.name = "LOG".to_string();
        assert!(f.is_logger());

        let mut g = field("Lcom/example/Thing;", true, true);
        g.name = "logger".to_string();
        assert!(g.is_logger());

        let mut h = field("Ljava/util/HashMap;", true, true);
        h.name = "cache".to_string();
        assert!(!h.is_logger());
    }
}
