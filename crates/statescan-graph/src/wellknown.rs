//! Well-known DI annotation names shared by the shape gate and the binding
//! resolver. These are structural facts about the ecosystems the scanner
//! understands, not user configuration.

pub const INJECT_ANNOTATIONS: &[&str] = &[
    "javax.inject.Inject",
    "jakarta.inject.Inject",
    "com.google.inject.Inject",
    "org.springframework.beans.factory.annotation.Autowired",
];

pub const PROVIDES_ANNOTATIONS: &[&str] = &[
    "com.google.inject.Provides",
    "dagger.Provides",
];

pub const PRODUCES_ANNOTATIONS: &[&str] = &[
    "javax.enterprise.inject.Produces",
    "jakarta.enterprise.inject.Produces",
];

pub const QUALIFIER_META_ANNOTATIONS: &[&str] = &[
    "javax.inject.Qualifier",
    "jakarta.inject.Qualifier",
    "com.google.inject.BindingAnnotation",
];

pub fn is_injection_annotation(fqn: &str) -> bool {
    INJECT_ANNOTATIONS.contains(&fqn)
}

pub fn is_provider_annotation(fqn: &str) -> bool {
    PROVIDES_ANNOTATIONS.contains(&fqn) || PRODUCES_ANNOTATIONS.contains(&fqn)
}

pub fn is_provides_annotation(fqn: &str) -> bool {
    PROVIDES_ANNOTATIONS.contains(&fqn)
}

pub fn is_produces_annotation(fqn: &str) -> bool {
    PRODUCES_ANNOTATIONS.contains(&fqn)
}

pub fn is_qualifier_meta_annotation(fqn: &str) -> bool {
    QUALIFIER_META_ANNOTATIONS.contains(&fqn)
}
