//! Inheritance graph.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: the `TypeHash` of every registered class and interface
//! - Edges: from a supertype to each direct subtype, labelled `Extends` or
//!   `Implements`
//!
//! Edges pointing at unregistered names are left out; the structural checks
//! report those as `UnknownType`.

use objmodel_core::{DeclEntry, TypeHash};
use petgraph::algo::{has_path_connecting, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

/// Kind of a supertype edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupertypeEdge {
    /// Class to superclass.
    Extends,
    /// Class or interface to an implemented or super-interface.
    Implements,
}

/// Graph of all supertype relations in a declaration table.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    graph: DiGraph<TypeHash, SupertypeEdge>,
    nodes: FxHashMap<TypeHash, NodeIndex>,
}

impl Hierarchy {
    /// Build the graph from registered entries, in registration order.
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a DeclEntry> + Clone) -> Self {
        let mut hierarchy = Hierarchy::default();
        for entry in entries.clone() {
            let hash = entry.type_hash();
            let node = hierarchy.graph.add_node(hash);
            hierarchy.nodes.insert(hash, node);
        }

        for entry in entries {
            let Some(&sub) = hierarchy.nodes.get(&entry.type_hash()) else {
                continue;
            };
            let supertypes: Vec<(&str, SupertypeEdge)> = match entry {
                DeclEntry::Class(class) => class
                    .superclass
                    .iter()
                    .map(|s| (s.as_str(), SupertypeEdge::Extends))
                    .chain(
                        class
                            .interfaces
                            .iter()
                            .map(|i| (i.as_str(), SupertypeEdge::Implements)),
                    )
                    .collect(),
                DeclEntry::Interface(interface) => interface
                    .supers
                    .iter()
                    .map(|s| (s.as_str(), SupertypeEdge::Implements))
                    .collect(),
            };
            for (name, kind) in supertypes {
                if let Some(&sup) = hierarchy.nodes.get(&TypeHash::from_name(name)) {
                    hierarchy.graph.add_edge(sup, sub, kind);
                }
            }
        }

        hierarchy
    }

    /// Every group of types that inherit from each other, including a type
    /// listing itself as a supertype.
    pub fn cycles(&self) -> Vec<Vec<TypeHash>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|scc| {
                let mut hashes: Vec<TypeHash> = scc.into_iter().map(|n| self.graph[n]).collect();
                hashes.sort();
                hashes
            })
            .collect()
    }

    /// All types ordered so every supertype precedes its subtypes.
    ///
    /// Returns the hash of a type on a cycle if the graph is not acyclic.
    pub fn base_first(&self) -> Result<Vec<TypeHash>, TypeHash> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| self.graph[cycle.node_id()])
    }

    /// Whether `sub` is `sup` or inherits from it, directly or transitively.
    pub fn is_subtype(&self, sub: TypeHash, sup: TypeHash) -> bool {
        match (self.nodes.get(&sub), self.nodes.get(&sup)) {
            (Some(&sub), Some(&sup)) => has_path_connecting(&self.graph, sup, sub, None),
            _ => false,
        }
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.nodes.contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::{ClassDecl, InterfaceDecl};

    fn entries() -> Vec<DeclEntry> {
        vec![
            InterfaceDecl::new("Drawable").into(),
            ClassDecl::new("Shape").open().with_interface("Drawable").into(),
            ClassDecl::new("Mordor").with_superclass("Shape").into(),
        ]
    }

    #[test]
    fn base_first_orders_supertypes_before_subtypes() {
        let hierarchy = Hierarchy::build(&entries());
        let order = hierarchy.base_first().unwrap();
        let pos = |name: &str| {
            order
                .iter()
                .position(|h| *h == TypeHash::from_name(name))
                .unwrap()
        };
        assert!(pos("Drawable") < pos("Shape"));
        assert!(pos("Shape") < pos("Mordor"));
    }

    #[test]
    fn subtype_is_transitive_and_reflexive() {
        let hierarchy = Hierarchy::build(&entries());
        let mordor = TypeHash::from_name("Mordor");
        let drawable = TypeHash::from_name("Drawable");
        assert!(hierarchy.is_subtype(mordor, drawable));
        assert!(hierarchy.is_subtype(mordor, mordor));
        assert!(!hierarchy.is_subtype(drawable, mordor));
    }

    #[test]
    fn detects_cycles() {
        let entries: Vec<DeclEntry> = vec![
            ClassDecl::new("A").open().with_superclass("B").into(),
            ClassDecl::new("B").open().with_superclass("A").into(),
            ClassDecl::new("Self").open().with_superclass("Self").into(),
            ClassDecl::new("Fine").into(),
        ];
        let hierarchy = Hierarchy::build(&entries);
        assert_eq!(hierarchy.cycles().len(), 2);
        assert!(hierarchy.base_first().is_err());
    }

    #[test]
    fn unknown_supertypes_are_skipped() {
        let entries: Vec<DeclEntry> = vec![ClassDecl::new("Orphan").with_superclass("Missing").into()];
        let hierarchy = Hierarchy::build(&entries);
        assert_eq!(hierarchy.len(), 1);
        assert!(hierarchy.base_first().is_ok());
    }
}
