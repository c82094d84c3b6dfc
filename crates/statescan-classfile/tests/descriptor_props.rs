use proptest::prelude::*;
use statescan_classfile::{
    parse_field_descriptor, parse_method_descriptor, BaseType, FieldType, MethodDescriptor,
    ReturnType,
};

const PROPTEST_CASES: u32 = 512;

fn arb_base_type() -> impl Strategy<Value = BaseType> {
    prop::sample::select(vec![
        BaseType::Byte,
        BaseType::Char,
        BaseType::Double,
        BaseType::Float,
        BaseType::Int,
        BaseType::Long,
        BaseType::Short,
        BaseType::Boolean,
    ])
}

fn arb_internal_name() -> impl Strategy<Value = String> {
    // Slash-separated segments of plausible Java identifiers, plus the odd
    // nested-class `$` to keep the grammar honest.
    prop::collection::vec("[A-Za-z][A-Za-z0-9_$]{0,8}", 1..4)
        .prop_map(|segments| segments.join("/"))
}

fn arb_field_type() -> impl Strategy<Value = FieldType> {
    let leaf = prop_oneof![
        arb_base_type().prop_map(FieldType::Base),
        arb_internal_name().prop_map(FieldType::Object),
    ];
    leaf.prop_recursive(3, 8, 2, |inner| {
        inner.prop_map(|ty| FieldType::Array(Box::new(ty)))
    })
}

fn arb_method_descriptor() -> impl Strategy<Value = MethodDescriptor> {
    let ret = prop_oneof![
        Just(ReturnType::Void),
        arb_field_type().prop_map(ReturnType::Type),
    ];
    (prop::collection::vec(arb_field_type(), 0..6), ret)
        .prop_map(|(params, return_type)| MethodDescriptor {
            params,
            return_type,
        })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn field_descriptor_round_trips(ty in arb_field_type()) {
        let rendered = ty.to_string();
        let reparsed = parse_field_descriptor(&rendered).unwrap();
        prop_assert_eq!(reparsed, ty);
    }

    #[test]
    fn method_descriptor_round_trips(desc in arb_method_descriptor()) {
        let rendered = desc.to_string();
        let reparsed = parse_method_descriptor(&rendered).unwrap();
        prop_assert_eq!(reparsed, desc);
    }

    #[test]
    fn rendered_descriptors_parse_uniquely(a in arb_field_type(), b in arb_field_type()) {
        // Emission is injective: distinct types never render identically.
        if a != b {
            prop_assert_ne!(a.to_string(), b.to_string());
        }
    }
}
