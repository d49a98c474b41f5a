use crate::MoleculeGraph;
use petgraph::graph::NodeIndex;

/// Formal charge carried by the atom that received the proton.
pub const PROTONATION_CHARGE: i8 = 1;

/// The atoms to emphasize in a depiction: at most one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HighlightSet(Option<NodeIndex>);

impl HighlightSet {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn single(atom: NodeIndex) -> Self {
        Self(Some(atom))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> usize {
        self.0.iter().count()
    }

    pub fn contains(&self, atom: NodeIndex) -> bool {
        self.0 == Some(atom)
    }

    pub fn atom(&self) -> Option<NodeIndex> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.0.iter().copied()
    }
}

/// Picks the protonation site of a protonated structure: the first atom, in
/// atom-index order, whose formal charge is exactly +1.
///
/// Other charges (-1, +2, ...) never qualify, and any later +1 atoms are
/// ignored. Returns an empty set when no atom carries +1.
pub fn protonation_site(graph: &MoleculeGraph) -> HighlightSet {
    graph
        .node_indices()
        .find(|&node| graph[node].charge == PROTONATION_CHARGE)
        .map(HighlightSet::single)
        .unwrap_or_default()
}
