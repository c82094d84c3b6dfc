//! Dependency-injection binding discovery.
//!
//! Turns the declarations compiled into the project's bytecode (Guice-style
//! `configure` modules, `@Provides`/`@Produces` methods, `@Inject`
//! constructor and method parameters) into an interface-to-implementation
//! table the reachability engine can dispatch through. Interfaces with
//! several implementations and no explicit binding stay unresolved; the
//! ambiguity is recorded, never guessed away.

mod resolver;

use std::collections::{BTreeSet, HashMap};

use statescan_graph::{ClassGraph, ClassShape, MethodShape, ParameterShape};
use statescan_graph::wellknown;

pub use crate::resolver::resolve_bindings;

/// Lookup key: a required type plus an optional qualifier annotation FQN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub type_fqn: String,
    pub qualifier: Option<String>,
}

impl BindingKey {
    pub fn new(type_fqn: impl Into<String>) -> Self {
        Self {
            type_fqn: type_fqn.into(),
            qualifier: None,
        }
    }

    pub fn qualified(type_fqn: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            type_fqn: type_fqn.into(),
            qualifier: Some(qualifier.into()),
        }
    }

    fn unqualified(&self) -> BindingKey {
        BindingKey::new(self.type_fqn.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingScope {
    Unscoped,
    Singleton,
}

/// How a binding was discovered, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// `bind(X.class).to(Y.class)` in a module `configure` method.
    Configure,
    /// A `@Provides`-family method.
    Provider,
    /// A CDI-style `@Produces` method.
    Producer,
    /// Synthesized: the interface has exactly one concrete subtype.
    SingleImpl,
}

#[derive(Debug, Clone)]
pub struct Binding {
    /// Concrete implementation FQN.
    pub target: String,
    pub scope: BindingScope,
    pub source: BindingSource,
    /// The module class that declared the binding, when one did.
    pub module: Option<String>,
}

/// The resolved binding table plus the ambiguities found along the way.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<BindingKey, Vec<Binding>>,
    /// Interfaces/abstract classes with several concrete subtypes and no
    /// explicit binding.
    ambiguous: BTreeSet<String>,
}

impl BindingTable {
    /// Resolve a key, falling back to the unqualified key when the
    /// qualified one is unbound.
    pub fn resolve(&self, key: &BindingKey) -> &[Binding] {
        if let Some(bindings) = self.bindings.get(key) {
            return bindings;
        }
        if key.qualifier.is_some() {
            if let Some(bindings) = self.bindings.get(&key.unqualified()) {
                return bindings;
            }
        }
        &[]
    }

    pub fn resolve_type(&self, type_fqn: &str) -> &[Binding] {
        self.bindings
            .get(&BindingKey::new(type_fqn))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_ambiguous(&self, type_fqn: &str) -> bool {
        self.ambiguous.contains(type_fqn)
    }

    pub fn ambiguous_types(&self) -> impl Iterator<Item = &str> {
        self.ambiguous.iter().map(String::as_str)
    }

    /// Classes bound in singleton scope, with the declaring module.
    pub fn singleton_targets(&self) -> Vec<(&str, Option<&str>)> {
        let mut out: Vec<(&str, Option<&str>)> = self
            .bindings
            .values()
            .flatten()
            .filter(|binding| binding.scope == BindingScope::Singleton)
            .map(|binding| (binding.target.as_str(), binding.module.as_deref()))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn insert(&mut self, key: BindingKey, binding: Binding) {
        self.bindings.entry(key).or_default().push(binding);
    }

    fn contains_key(&self, key: &BindingKey) -> bool {
        self.bindings.contains_key(key)
    }

    fn mark_ambiguous(&mut self, type_fqn: String) {
        self.ambiguous.insert(type_fqn);
    }
}

/// One `@Inject`-style parameter: where it was declared and what it asks for.
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    pub method_name: String,
    pub key: BindingKey,
}

/// Injection points declared by a class: parameters of constructors and
/// methods carrying an inject-family annotation.
pub fn injection_points(graph: &ClassGraph, shape: &ClassShape) -> Vec<InjectionPoint> {
    let mut out = Vec::new();
    for method in &shape.methods {
        if !is_injectable(method) {
            continue;
        }
        for param in &method.parameters {
            let Some(type_fqn) = &param.type_fqn else {
                continue;
            };
            let key = match parameter_qualifier(graph, param) {
                Some(qualifier) => BindingKey::qualified(type_fqn.clone(), qualifier),
                None => BindingKey::new(type_fqn.clone()),
            };
            out.push(InjectionPoint {
                method_name: method.name.clone(),
                key,
            });
        }
    }
    out
}

fn is_injectable(method: &MethodShape) -> bool {
    method
        .annotations
        .iter()
        .any(|ann| wellknown::is_injection_annotation(ann))
}

/// The qualifier tag of a parameter: the FQN of any parameter annotation
/// whose own class is meta-annotated as a qualifier.
fn parameter_qualifier(graph: &ClassGraph, param: &ParameterShape) -> Option<String> {
    param.annotations.iter().find_map(|ann| {
        let annotation_class = graph.get(ann)?;
        annotation_class
            .annotations
            .iter()
            .any(|meta| wellknown::is_qualifier_meta_annotation(meta))
            .then(|| ann.clone())
    })
}
