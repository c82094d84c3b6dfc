use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::model::ClassShape;

/// The unified class graph: every decoded class keyed by dotted FQN, plus
/// the inverted subtype index built once after ingest.
///
/// The graph is not required to contain the JDK; lookups for absent classes
/// simply return `None`.
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<String, ClassShape>,
    subtypes: HashMap<String, BTreeSet<String>>,
}

impl ClassGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with first-insert-wins semantics: project artifacts are
    /// enumerated before dependencies, so a project class always shadows a
    /// coincident dependency class. Returns whether the shape was kept.
    pub fn insert(&mut self, shape: ClassShape) -> bool {
        match self.classes.entry(shape.fqn.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(shape);
                true
            }
        }
    }

    pub fn get(&self, fqn: &str) -> Option<&ClassShape> {
        self.classes.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassShape> {
        self.classes.values()
    }

    pub fn project_classes(&self) -> impl Iterator<Item = &ClassShape> {
        self.classes.values().filter(|shape| shape.is_project_local)
    }

    /// Rebuild the inverted subtype index. Must run after all inserts; the
    /// graph is treated as immutable afterwards.
    pub fn build_subtype_index(&mut self) {
        let mut subtypes: HashMap<String, BTreeSet<String>> = HashMap::new();
        for shape in self.classes.values() {
            if let Some(superclass) = &shape.superclass {
                subtypes
                    .entry(superclass.clone())
                    .or_default()
                    .insert(shape.fqn.clone());
            }
            for interface in &shape.interfaces {
                subtypes
                    .entry(interface.clone())
                    .or_default()
                    .insert(shape.fqn.clone());
            }
        }
        self.subtypes = subtypes;
    }

    pub fn direct_subtypes(&self, fqn: &str) -> impl Iterator<Item = &str> {
        self.subtypes
            .get(fqn)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Transitive closure of `direct_subtypes`. Never contains `fqn` itself
    /// (adversarial cyclic hierarchies are bounded by the visited set).
    pub fn all_subtypes(&self, fqn: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut queue: VecDeque<&str> = self.direct_subtypes(fqn).collect();
        while let Some(current) = queue.pop_front() {
            if current == fqn || !out.insert(current.to_string()) {
                continue;
            }
            queue.extend(self.direct_subtypes(current));
        }
        out
    }

    /// Names of all supertypes (superclasses and interfaces, transitive).
    /// Includes names absent from the graph, which terminate their branch.
    pub fn supertype_names(&self, fqn: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        if let Some(shape) = self.get(fqn) {
            queue.extend(shape.superclass.iter().cloned());
            queue.extend(shape.interfaces.iter().cloned());
        }
        while let Some(current) = queue.pop_front() {
            if current == fqn || !out.insert(current.clone()) {
                continue;
            }
            if let Some(shape) = self.get(&current) {
                queue.extend(shape.superclass.iter().cloned());
                queue.extend(shape.interfaces.iter().cloned());
            }
        }
        out
    }

    /// Reflexive subtype check by name: is `candidate` the same class as
    /// `ancestor` or somewhere below it?
    pub fn is_subtype_of(&self, candidate: &str, ancestor: &str) -> bool {
        candidate == ancestor || self.supertype_names(candidate).contains(ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet as Set;

    fn shape(fqn: &str, superclass: Option<&str>, interfaces: &[&str]) -> ClassShape {
        ClassShape {
            fqn: fqn.to_string(),
            superclass: superclass.map(str::to_string),
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            annotations: Set::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_interface: false,
            is_abstract: false,
            is_enum: false,
            is_project_local: true,
            source_file: None,
        }
    }

    #[test]
    fn first_insert_wins() {
        let mut graph = ClassGraph::new();
        assert!(graph.insert(shape("com.example.A", Some("java.lang.Object"), &[])));
        let mut dupe = shape("com.example.A", Some("com.example.Other"), &[]);
        dupe.is_project_local = false;
        assert!(!graph.insert(dupe));
        assert!(graph.get("com.example.A").unwrap().is_project_local);
    }

    #[test]
    fn subtype_closure_is_transitive_and_irreflexive() {
        let mut graph = ClassGraph::new();
        graph.insert(shape("a.Base", None, &[]));
        graph.insert(shape("a.Mid", Some("a.Base"), &[]));
        graph.insert(shape("a.Leaf", Some("a.Mid"), &["a.Marker"]));
        graph.insert(shape("a.Other", None, &["a.Marker"]));
        graph.build_subtype_index();

        let subtypes = graph.all_subtypes("a.Base");
        assert_eq!(
            subtypes,
            ["a.Mid", "a.Leaf"].iter().map(|s| s.to_string()).collect::<Set<_>>()
        );
        assert!(!graph.all_subtypes("a.Base").contains("a.Base"));

        let marker = graph.all_subtypes("a.Marker");
        assert!(marker.contains("a.Leaf"));
        assert!(marker.contains("a.Other"));
    }

    #[test]
    fn cyclic_hierarchy_is_bounded() {
        let mut graph = ClassGraph::new();
        graph.insert(shape("x.A", Some("x.B"), &[]));
        graph.insert(shape("x.B", Some("x.A"), &[]));
        graph.build_subtype_index();

        let subtypes = graph.all_subtypes("x.A");
        assert!(subtypes.contains("x.B"));
        assert!(!subtypes.contains("x.A"));
        assert!(graph.is_subtype_of("x.A", "x.B"));
    }

    #[test]
    fn supertype_names_include_absent_classes() {
        let mut graph = ClassGraph::new();
        graph.insert(shape(
            "a.Child",
            Some("a.Parent"),
            &["java.io.Serializable"],
        ));
        graph.insert(shape("a.Parent", Some("java.lang.Object"), &[]));
        graph.build_subtype_index();

        let supers = graph.supertype_names("a.Child");
        assert!(supers.contains("a.Parent"));
        assert!(supers.contains("java.lang.Object"));
        assert!(supers.contains("java.io.Serializable"));
        assert!(graph.is_subtype_of("a.Child", "java.io.Serializable"));
    }
}
