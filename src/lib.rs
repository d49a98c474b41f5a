use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

mod element;
pub use element::*;

mod parse;
pub use parse::*;

mod protonation;
pub use protonation::*;

mod layout;
pub use layout::*;

mod visualize;
pub use visualize::*;

mod toolkit;
pub use toolkit::*;

mod dataset;
pub use dataset::*;

mod session;
pub use session::*;

mod view;
pub use view::*;

mod report;
pub use report::*;

mod config;
pub use config::*;

pub mod server;

/// An atom as written in a SMILES string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    /// Formal charge.
    pub charge: i8,
    /// Hydrogen count written inside a bracket atom. `None` for atoms
    /// outside brackets, whose hydrogens are implied by valence.
    pub hydrogens: Option<u8>,
    pub isotope: Option<u16>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            hydrogens: None,
            isotope: None,
        }
    }

    pub fn aromatic(element: Element) -> Self {
        Self {
            aromatic: true,
            ..Self::new(element)
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// Bond order counted in half bonds, so aromatic bonds stay integral.
    pub fn half_order(&self) -> u8 {
        match self {
            Bond::Single => 2,
            Bond::Double => 4,
            Bond::Triple => 6,
            Bond::Aromatic => 3,
        }
    }
}

/// Atoms in SMILES order; the node index is the atom index.
pub type MoleculeGraph = petgraph::graph::UnGraph<Atom, Bond>;

/// Number of hydrogens attached to `node`: the bracket count when one was
/// written, otherwise the implicit count from the element's default valences.
pub fn hydrogen_count(graph: &MoleculeGraph, node: NodeIndex) -> u8 {
    let atom = &graph[node];
    if let Some(hydrogens) = atom.hydrogens {
        return hydrogens;
    }

    let mut used: u32 = 0;
    let mut aromatic_bonds = 0;
    for edge in graph.edges(node) {
        match edge.weight() {
            Bond::Aromatic => aromatic_bonds += 1,
            bond => used += bond.half_order() as u32 / 2,
        }
    }
    // An aromatic atom contributes one electron per aromatic bond plus one
    // shared by the ring system.
    if aromatic_bonds > 0 || atom.aromatic {
        used += aromatic_bonds + 1;
    }

    atom.element
        .default_valences()
        .iter()
        .map(|&valence| valence as u32)
        .find(|&valence| valence >= used)
        .map(|valence| (valence - used) as u8)
        .unwrap_or(0)
}

/// Installs the global `tracing` subscriber. Calling it again is harmless.
pub fn init_logging(level: &str) {
    let level = level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
