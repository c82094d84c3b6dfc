//! Bounded BFS from project roots toward catalogue leaf categories.
//!
//! One walk per root discovers every category: each newly reached class is
//! tested against all seven leaf sets (including through its supertype
//! names, so a subtype of a leaf counts), and the first path found per
//! category is kept, shortest by construction.

use std::collections::{HashMap, VecDeque};

use statescan_catalog::{Catalog, LeafCategory};
use statescan_di::{injection_points, BindingSource, BindingTable};
use statescan_graph::{ClassGraph, ClassShape};
use tracing::debug;

use crate::report::{EdgeKind, PathStep};

pub const DEFAULT_MAX_DEPTH: usize = 6;

/// A root-to-leaf path for one leaf category.
#[derive(Debug, Clone)]
pub struct ReachablePath {
    pub root: String,
    pub category: LeafCategory,
    pub leaf: String,
    pub steps: Vec<PathStep>,
    /// True when any step depended on a single-implementation inference
    /// rather than an explicit binding.
    pub inferred: bool,
    /// Modules whose bindings the path dispatched through.
    pub modules: Vec<String>,
    /// `Fqn#method` tags when the root is an endpoint class.
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone)]
struct Edge {
    target: String,
    member: String,
    kind: EdgeKind,
    inferred: bool,
    module: Option<String>,
}

pub fn compute_reachability(
    graph: &ClassGraph,
    bindings: &BindingTable,
    catalog: &Catalog,
    max_depth: usize,
) -> Vec<ReachablePath> {
    let adjacency = build_adjacency(graph, bindings);
    let masks = category_masks(graph, catalog);

    let mut roots: Vec<&ClassShape> = graph.project_classes().collect();
    roots.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    let mut paths = Vec::new();
    for root in roots {
        walk_root(root, graph, catalog, &adjacency, &masks, max_depth, &mut paths);
    }
    debug!(paths = paths.len(), "reachability computed");
    paths
}

const ALL_CATEGORIES: u8 = (1 << LeafCategory::ALL.len()) - 1;

fn category_bit(category: LeafCategory) -> u8 {
    1 << LeafCategory::ALL
        .iter()
        .position(|c| *c == category)
        .expect("category listed in ALL")
}

/// Per-class category membership, tested on the class name and all its
/// supertype names so that subtypes of a configured leaf count as leaves.
fn category_masks(graph: &ClassGraph, catalog: &Catalog) -> HashMap<String, u8> {
    let mut masks = HashMap::with_capacity(graph.len());
    for shape in graph.classes() {
        let mut mask = 0u8;
        for category in LeafCategory::ALL {
            let bit = category_bit(category);
            if catalog.matches_category(category, &shape.fqn)
                || graph
                    .supertype_names(&shape.fqn)
                    .iter()
                    .any(|name| catalog.matches_category(category, name))
            {
                mask |= bit;
            }
        }
        if mask != 0 {
            masks.insert(shape.fqn.clone(), mask);
        }
    }
    masks
}

fn build_adjacency<'a>(
    graph: &'a ClassGraph,
    bindings: &BindingTable,
) -> HashMap<&'a str, Vec<Edge>> {
    let mut adjacency: HashMap<&str, Vec<Edge>> = HashMap::with_capacity(graph.len());
    for shape in graph.classes() {
        adjacency.insert(shape.fqn.as_str(), class_edges(shape, graph, bindings));
    }
    adjacency
}

fn class_edges(shape: &ClassShape, graph: &ClassGraph, bindings: &BindingTable) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut push = |edge: Edge| {
        if edge.target != shape.fqn
            && !edges
                .iter()
                .any(|existing: &Edge| existing.target == edge.target && existing.kind == edge.kind)
        {
            edges.push(edge);
        }
    };

    // Field-typed edges, element type after array stripping.
    for field in &shape.fields {
        if let Some(type_fqn) = field.object_type() {
            if graph.contains(&type_fqn) {
                push(Edge {
                    target: type_fqn,
                    member: field.name.clone(),
                    kind: EdgeKind::Field,
                    inferred: false,
                    module: None,
                });
            }
        }
    }

    // State held in a base class is held by the child.
    if let Some(superclass) = &shape.superclass {
        if graph.contains(superclass) {
            push(Edge {
                target: superclass.clone(),
                member: "extends".to_string(),
                kind: EdgeKind::Inheritance,
                inferred: false,
                module: None,
            });
        }
    }
    for interface in &shape.interfaces {
        if graph.contains(interface) {
            push(Edge {
                target: interface.clone(),
                member: "implements".to_string(),
                kind: EdgeKind::Inheritance,
                inferred: false,
                module: None,
            });
        }
    }

    // Invocation targets, expanded through bindings for polymorphic owners.
    for method in &shape.methods {
        for invocation in &method.invocations {
            let Some(owner) = graph.get(&invocation.owner) else {
                continue;
            };
            push(Edge {
                target: owner.fqn.clone(),
                member: invocation.name.clone(),
                kind: EdgeKind::Invocation,
                inferred: false,
                module: None,
            });
            if owner.is_interface || owner.is_abstract {
                for binding in bindings.resolve_type(&owner.fqn) {
                    if graph.contains(&binding.target) {
                        push(Edge {
                            target: binding.target.clone(),
                            member: invocation.name.clone(),
                            kind: EdgeKind::Invocation,
                            inferred: binding.source == BindingSource::SingleImpl,
                            module: binding.module.clone(),
                        });
                    }
                }
            }
        }
    }

    // Injected constructor/setter parameters resolved through the table;
    // an unbound but known parameter type is its own target.
    for point in injection_points(graph, shape) {
        let resolved = bindings.resolve(&point.key);
        if resolved.is_empty() {
            if graph.contains(&point.key.type_fqn) {
                push(Edge {
                    target: point.key.type_fqn.clone(),
                    member: point.method_name.clone(),
                    kind: EdgeKind::DiBinding,
                    inferred: false,
                    module: None,
                });
            }
        } else {
            for binding in resolved {
                if graph.contains(&binding.target) {
                    push(Edge {
                        target: binding.target.clone(),
                        member: point.method_name.clone(),
                        kind: EdgeKind::DiBinding,
                        inferred: binding.source == BindingSource::SingleImpl,
                        module: binding.module.clone(),
                    });
                }
            }
        }
    }

    edges
}

struct Incoming {
    parent: String,
    member: String,
    kind: EdgeKind,
    inferred: bool,
    module: Option<String>,
}

#[allow(clippy::too_many_arguments)]
fn walk_root(
    root: &ClassShape,
    graph: &ClassGraph,
    catalog: &Catalog,
    adjacency: &HashMap<&str, Vec<Edge>>,
    masks: &HashMap<String, u8>,
    max_depth: usize,
    paths: &mut Vec<ReachablePath>,
) {
    let endpoints = endpoint_tags(root, catalog);

    let mut visited: HashMap<String, Option<Incoming>> = HashMap::new();
    visited.insert(root.fqn.clone(), None);
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((root.fqn.clone(), 0));
    let mut found = 0u8;

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth || found == ALL_CATEGORIES {
            continue;
        }
        let Some(edges) = adjacency.get(current.as_str()) else {
            continue;
        };
        for edge in edges {
            if visited.contains_key(&edge.target) {
                continue;
            }
            visited.insert(
                edge.target.clone(),
                Some(Incoming {
                    parent: current.clone(),
                    member: edge.member.clone(),
                    kind: edge.kind,
                    inferred: edge.inferred,
                    module: edge.module.clone(),
                }),
            );

            if let Some(mask) = masks.get(&edge.target) {
                for category in LeafCategory::ALL {
                    let bit = category_bit(category);
                    if mask & bit != 0 && found & bit == 0 {
                        found |= bit;
                        paths.push(reconstruct_path(
                            root,
                            category,
                            &edge.target,
                            &visited,
                            &endpoints,
                        ));
                    }
                }
            }
            queue.push_back((edge.target.clone(), depth + 1));
        }
    }
}

fn reconstruct_path(
    root: &ClassShape,
    category: LeafCategory,
    leaf: &str,
    visited: &HashMap<String, Option<Incoming>>,
    endpoints: &[String],
) -> ReachablePath {
    // Walk leaf -> root, then reverse into outgoing-edge steps.
    let mut links: Vec<(&str, &Incoming)> = Vec::new();
    let mut current = leaf;
    while let Some(Some(incoming)) = visited.get(current) {
        links.push((current, incoming));
        current = incoming.parent.as_str();
    }
    links.reverse();

    let mut steps = Vec::with_capacity(links.len() + 1);
    let mut inferred = false;
    let mut modules = Vec::new();
    let mut from = root.fqn.as_str();
    for (class, incoming) in &links {
        steps.push(PathStep {
            class_fqn: from.to_string(),
            member: Some(incoming.member.clone()),
            edge: Some(incoming.kind),
        });
        inferred |= incoming.inferred;
        if let Some(module) = &incoming.module {
            if !modules.contains(module) {
                modules.push(module.clone());
            }
        }
        from = class;
    }
    steps.push(PathStep {
        class_fqn: leaf.to_string(),
        member: None,
        edge: None,
    });

    ReachablePath {
        root: root.fqn.clone(),
        category,
        leaf: leaf.to_string(),
        steps,
        inferred,
        modules,
        endpoints: endpoints.to_vec(),
    }
}

/// `Fqn#method` for each endpoint-annotated method; a class-level-only
/// endpoint annotation contributes the bare FQN.
fn endpoint_tags(shape: &ClassShape, catalog: &Catalog) -> Vec<String> {
    let mut tags: Vec<String> = shape
        .methods
        .iter()
        .filter(|method| {
            method
                .annotations
                .iter()
                .any(|ann| catalog.is_endpoint_annotation(ann))
        })
        .map(|method| format!("{}#{}", shape.fqn, method.name))
        .collect();
    tags.sort();
    tags.dedup();

    if tags.is_empty()
        && shape
            .annotations
            .iter()
            .any(|ann| catalog.is_endpoint_annotation(ann))
    {
        tags.push(shape.fqn.clone());
    }
    tags
}
