//! Binding discovery passes, in precedence order: explicit module
//! `configure` declarations (followed through `install` chains and
//! `super.configure()`), provider/producer methods, then single-
//! implementation inference for whatever is still unbound.

use std::collections::{BTreeSet, VecDeque};

use statescan_catalog::Catalog;
use statescan_graph::wellknown;
use statescan_graph::{ClassGraph, ClassShape, MethodShape, CONSTRUCTOR};
use tracing::debug;

use crate::{Binding, BindingKey, BindingScope, BindingSource, BindingTable};

pub fn resolve_bindings(graph: &ClassGraph, catalog: &Catalog) -> BindingTable {
    let mut table = BindingTable::default();

    collect_module_bindings(graph, catalog, &mut table);
    collect_provider_bindings(graph, catalog, &mut table);
    infer_single_implementations(graph, &mut table);

    debug!(
        bindings = table.len(),
        ambiguous = table.ambiguous_types().count(),
        "binding table resolved"
    );
    table
}

/// Walk project-local module classes and every module they reach through
/// `install(new M())` or `super.configure()`, extracting `bind`/`to` pairs
/// from each `configure` body.
fn collect_module_bindings(graph: &ClassGraph, catalog: &Catalog, table: &mut BindingTable) {
    let mut queue: VecDeque<String> = graph
        .project_classes()
        .filter(|shape| is_module_class(graph, catalog, shape))
        .map(|shape| shape.fqn.clone())
        .collect();
    let mut visited: BTreeSet<String> = BTreeSet::new();

    while let Some(module_fqn) = queue.pop_front() {
        if !visited.insert(module_fqn.clone()) {
            continue;
        }
        let Some(shape) = graph.get(&module_fqn) else {
            continue;
        };
        let Some(configure) = configure_method(shape) else {
            continue;
        };

        for (key, binding) in configure_pair_bindings(&module_fqn, configure, catalog) {
            table.insert(key, binding);
        }

        // `install(new OtherModule())` pulls that module's bindings in; the
        // constructed module classes show up as `<init>` invocation targets
        // in the same body.
        let installs = configure
            .invocations
            .iter()
            .any(|inv| inv.name == "install");
        if installs {
            for inv in &configure.invocations {
                if inv.name != CONSTRUCTOR || inv.owner == module_fqn {
                    continue;
                }
                if graph
                    .get(&inv.owner)
                    .is_some_and(|owner| is_module_class(graph, catalog, owner))
                {
                    queue.push_back(inv.owner.clone());
                }
            }
        }

        // `super.configure()` (or delegation to another module's configure)
        // inherits that hierarchy's bindings.
        for inv in &configure.invocations {
            if inv.name == "configure" && inv.owner != module_fqn && graph.contains(&inv.owner) {
                queue.push_back(inv.owner.clone());
            }
        }
    }
}

fn is_module_class(graph: &ClassGraph, catalog: &Catalog, shape: &ClassShape) -> bool {
    if catalog.is_module_type(&shape.fqn) {
        return true;
    }
    graph
        .supertype_names(&shape.fqn)
        .iter()
        .any(|name| catalog.is_module_type(name))
}

fn configure_method(shape: &ClassShape) -> Option<&MethodShape> {
    shape
        .methods
        .iter()
        .find(|m| m.name == "configure" && m.descriptor == "()V")
}

/// Pair consecutive class literals of a `configure` body into bindings.
///
/// A literal naming a singleton scope annotation marks the most recent
/// binding instead of consuming a pair slot, so
/// `bind(X).to(Y).in(Singleton.class)` leaves the next pair intact. A
/// trailing unpaired literal is a self-binding (`bind(X).asEagerSingleton()`).
fn configure_pair_bindings(
    module_fqn: &str,
    configure: &MethodShape,
    catalog: &Catalog,
) -> Vec<(BindingKey, Binding)> {
    let mut out: Vec<(BindingKey, Binding)> = Vec::new();
    let mut pending: Option<String> = None;

    for constant in &configure.class_constants {
        if is_scope_constant(constant, catalog) {
            if let Some((_, binding)) = out.last_mut() {
                binding.scope = BindingScope::Singleton;
            }
            continue;
        }
        match pending.take() {
            None => pending = Some(constant.clone()),
            Some(bound_type) => out.push((
                BindingKey::new(bound_type),
                Binding {
                    target: constant.clone(),
                    scope: BindingScope::Unscoped,
                    source: BindingSource::Configure,
                    module: Some(module_fqn.to_string()),
                },
            )),
        }
    }

    if let Some(self_bound) = pending {
        out.push((
            BindingKey::new(self_bound.clone()),
            Binding {
                target: self_bound,
                scope: BindingScope::Unscoped,
                source: BindingSource::Configure,
                module: Some(module_fqn.to_string()),
            },
        ));
    }

    if configure
        .invocations
        .iter()
        .any(|inv| inv.name == "asEagerSingleton")
    {
        if let Some((_, binding)) = out.last_mut() {
            binding.scope = BindingScope::Singleton;
        }
    }

    out
}

fn is_scope_constant(fqn: &str, catalog: &Catalog) -> bool {
    catalog.is_singleton_annotation(fqn)
        || fqn == "com.google.inject.Singleton"
        || fqn.ends_with(".Singleton")
}

/// `@Provides` / `@Produces` methods bind their return type to the
/// declaring class: the provider is the concrete origin of the value.
fn collect_provider_bindings(graph: &ClassGraph, catalog: &Catalog, table: &mut BindingTable) {
    for shape in graph.project_classes() {
        for method in &shape.methods {
            let source = if method
                .annotations
                .iter()
                .any(|ann| wellknown::is_provides_annotation(ann))
            {
                BindingSource::Provider
            } else if method
                .annotations
                .iter()
                .any(|ann| wellknown::is_produces_annotation(ann))
            {
                BindingSource::Producer
            } else {
                continue;
            };

            let Some(return_type) = method_return_type(method) else {
                continue;
            };

            let scope = if method
                .annotations
                .iter()
                .any(|ann| catalog.is_singleton_annotation(ann))
            {
                BindingScope::Singleton
            } else {
                BindingScope::Unscoped
            };

            table.insert(
                BindingKey::new(return_type),
                Binding {
                    target: shape.fqn.clone(),
                    scope,
                    source,
                    module: Some(shape.fqn.clone()),
                },
            );
        }
    }
}

fn method_return_type(method: &MethodShape) -> Option<String> {
    use statescan_classfile::{parse_method_descriptor, ReturnType};
    match parse_method_descriptor(&method.descriptor).ok()?.return_type {
        ReturnType::Void => None,
        ReturnType::Type(ty) => ty.object_binary_name(),
    }
}

/// For every unbound interface/abstract class with exactly one concrete
/// subtype in the graph, synthesize the obvious binding. Several concrete
/// subtypes make the type ambiguous; that is recorded, not guessed.
fn infer_single_implementations(graph: &ClassGraph, table: &mut BindingTable) {
    for shape in graph.classes() {
        if !shape.is_interface && !shape.is_abstract {
            continue;
        }
        let key = BindingKey::new(shape.fqn.clone());
        if table.contains_key(&key) {
            continue;
        }

        let concrete: Vec<String> = graph
            .all_subtypes(&shape.fqn)
            .into_iter()
            .filter(|subtype| graph.get(subtype).is_some_and(ClassShape::is_concrete))
            .collect();

        match concrete.len() {
            0 => {}
            1 => {
                table.insert(
                    key,
                    Binding {
                        target: concrete.into_iter().next().unwrap(),
                        scope: BindingScope::Unscoped,
                        source: BindingSource::SingleImpl,
                        module: None,
                    },
                );
            }
            _ => table.mark_ambiguous(shape.fqn.clone()),
        }
    }
}
