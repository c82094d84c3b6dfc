use statescan_classfile::assembler::{ClassBuilder, MethodDef, Op};
use statescan_classfile::{access, ClassFile, Error, MemberRef};

#[test]
fn parse_simple_class() {
    let bytes = ClassBuilder::new("com/example/Simple")
        .source_file("Simple.java")
        .field(access::PRIVATE, "f", "I")
        .method(MethodDef::new(access::PUBLIC, "m", "()V"))
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Simple");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
    assert_eq!(class.source_file.as_deref(), Some("Simple.java"));
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "f");
    assert_eq!(class.fields[0].descriptor, "I");
    assert!(class.fields[0].code.is_none());

    let m = class.methods.iter().find(|m| m.name == "m").unwrap();
    assert_eq!(m.descriptor, "()V");
    assert!(m.code.is_some());
}

#[test]
fn parse_hierarchy_and_flags() {
    let bytes = ClassBuilder::new("com/example/Worker")
        .super_class("com/example/AbstractWorker")
        .interface("java/lang/Runnable")
        .interface("java/io/Closeable")
        .access_flags(access::PUBLIC | access::ABSTRACT)
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(
        class.super_class.as_deref(),
        Some("com/example/AbstractWorker")
    );
    assert_eq!(
        class.interfaces,
        vec!["java/lang/Runnable".to_string(), "java/io/Closeable".to_string()]
    );
    assert!(class.is_abstract());
    assert!(!class.is_interface());
    assert!(!class.is_enum());
}

#[test]
fn parse_class_and_member_annotations() {
    let bytes = ClassBuilder::new("com/example/Annotated")
        .annotated("Ljavax/inject/Singleton;")
        .annotated_field(
            access::PRIVATE,
            "pool",
            "Lcom/example/Pool;",
            vec!["Ljavax/inject/Inject;"],
        )
        .method(
            MethodDef::new(access::PUBLIC, "<init>", "(Lcom/example/Pool;)V")
                .annotated("Ljavax/inject/Inject;")
                .parameter_annotations(vec![vec!["Lcom/example/Primary;"]]),
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.annotations.len(), 1);
    assert_eq!(class.annotations[0].binary_name(), "javax.inject.Singleton");

    let field = &class.fields[0];
    assert_eq!(field.annotations[0].binary_name(), "javax.inject.Inject");

    let ctor = class.methods.iter().find(|m| m.name == "<init>").unwrap();
    assert_eq!(ctor.annotations[0].binary_name(), "javax.inject.Inject");
    assert_eq!(ctor.parameter_annotations.len(), 1);
    assert_eq!(
        ctor.parameter_annotations[0][0].binary_name(),
        "com.example.Primary"
    );
}

#[test]
fn code_scan_records_invocations_fields_and_class_literals() {
    let bytes = ClassBuilder::new("com/example/Module")
        .method(MethodDef::new(access::PUBLIC, "configure", "()V").body(vec![
            Op::load_class("com/example/Api"),
            Op::invoke_virtual("com/example/Module", "bind", "(Ljava/lang/Class;)Lcom/example/Binder;"),
            Op::load_class("com/example/ApiImpl"),
            Op::invoke_interface("com/example/Binder", "to", "(Ljava/lang/Class;)V"),
            Op::get_static("com/example/Registry", "INSTANCE", "Lcom/example/Registry;"),
            Op::put_field("com/example/Module", "installed", "Z"),
            Op::invoke_static("com/example/Util", "helper", "()V"),
        ]))
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    let code = class.methods[0].code.as_ref().unwrap();

    assert_eq!(
        code.class_constants,
        vec!["com/example/Api".to_string(), "com/example/ApiImpl".to_string()]
    );
    assert_eq!(
        code.invocations,
        vec![
            MemberRef {
                owner: "com/example/Module".into(),
                name: "bind".into(),
                descriptor: "(Ljava/lang/Class;)Lcom/example/Binder;".into(),
            },
            MemberRef {
                owner: "com/example/Binder".into(),
                name: "to".into(),
                descriptor: "(Ljava/lang/Class;)V".into(),
            },
            MemberRef {
                owner: "com/example/Util".into(),
                name: "helper".into(),
                descriptor: "()V".into(),
            },
        ]
    );
    assert_eq!(code.field_accesses.len(), 2);
    assert_eq!(code.field_accesses[0].name, "INSTANCE");
    assert_eq!(code.field_accesses[1].name, "installed");
}

#[test]
fn code_scan_steps_over_switches_and_wide() {
    // tableswitch at pc 0: opcode, 3 pad bytes, default, low=0, high=1, two
    // jump offsets; then lookupswitch with one pair; then wide iinc; then a
    // field access that must still be seen.
    let mut raw = Vec::new();
    raw.push(0xaa);
    raw.extend_from_slice(&[0, 0, 0]); // padding to offset 4
    raw.extend_from_slice(&0i32.to_be_bytes()); // default
    raw.extend_from_slice(&0i32.to_be_bytes()); // low
    raw.extend_from_slice(&1i32.to_be_bytes()); // high
    raw.extend_from_slice(&0i32.to_be_bytes());
    raw.extend_from_slice(&0i32.to_be_bytes());
    // pc is now 24; lookupswitch operands pad to the next multiple of 4.
    raw.push(0xab);
    raw.extend_from_slice(&[0, 0, 0]);
    raw.extend_from_slice(&0i32.to_be_bytes()); // default
    raw.extend_from_slice(&1i32.to_be_bytes()); // npairs
    raw.extend_from_slice(&7i32.to_be_bytes()); // match
    raw.extend_from_slice(&0i32.to_be_bytes()); // offset
    raw.extend_from_slice(&[0xc4, 0x84, 0x00, 0x01, 0x00, 0x05]); // wide iinc

    let bytes = ClassBuilder::new("com/example/Switchy")
        .method(MethodDef::new(access::PUBLIC, "m", "()V").body(vec![
            Op::Raw(raw),
            Op::get_static("com/example/Registry", "INSTANCE", "Lcom/example/Registry;"),
        ]))
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    let code = class.methods[0].code.as_ref().unwrap();
    assert_eq!(code.field_accesses.len(), 1);
    assert_eq!(code.field_accesses[0].owner, "com/example/Registry");
}

#[test]
fn truncated_body_does_not_fail_the_class() {
    // A lone getstatic opcode with no operand bytes.
    let bytes = ClassBuilder::new("com/example/Trunc")
        .method(MethodDef::new(access::PUBLIC, "m", "()V").body(vec![Op::Raw(vec![0xb2])]))
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    let code = class.methods[0].code.as_ref().unwrap();
    assert!(code.field_accesses.is_empty());
}

#[test]
fn enum_access_flags_surface() {
    let bytes = ClassBuilder::new("com/example/Color")
        .super_class("java/lang/Enum")
        .access_flags(access::PUBLIC | access::ENUM | access::FINAL)
        .field(
            access::STATIC | access::FINAL | access::SYNTHETIC,
            "$VALUES",
            "[Lcom/example/Color;",
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert!(class.is_enum());
    assert_eq!(class.fields[0].name, "$VALUES");
}

#[test]
fn rejects_bad_magic_and_truncation() {
    assert!(matches!(
        ClassFile::parse(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0]),
        Err(Error::InvalidMagic(0xDEADBEEF))
    ));
    assert!(matches!(
        ClassFile::parse(&[0xCA, 0xFE, 0xBA]),
        Err(Error::UnexpectedEof)
    ));

    let good = ClassBuilder::new("com/example/Simple").build();
    assert!(ClassFile::parse(&good[..good.len() - 3]).is_err());
}
