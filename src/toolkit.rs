//! The two chemistry capabilities the viewer depends on, behind traits so the
//! interaction layer does not care how they are provided.

use crate::{depict, parse_smiles, HighlightSet, MoleculeGraph, Svg, DEFAULT_IMAGE_SIZE};
use anyhow::Result;

/// Turns structure notation into a molecular graph.
pub trait StructureParser {
    fn parse(&self, notation: &str) -> Result<MoleculeGraph>;
}

/// Draws a molecular graph, emphasizing the highlighted atoms.
pub trait DepictionRenderer {
    fn render(&self, graph: &MoleculeGraph, highlight: &HighlightSet) -> Result<Svg>;
}

/// SMILES parser backed by [`parse_smiles`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesParser;

impl StructureParser for SmilesParser {
    fn parse(&self, notation: &str) -> Result<MoleculeGraph> {
        parse_smiles(notation)
    }
}

/// Fixed-size square SVG renderer backed by [`depict`].
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub size: u32,
}

impl SvgRenderer {
    pub fn new(size: u32) -> Self {
        Self { size }
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_SIZE)
    }
}

impl DepictionRenderer for SvgRenderer {
    fn render(&self, graph: &MoleculeGraph, highlight: &HighlightSet) -> Result<Svg> {
        depict(graph, highlight, self.size)
    }
}
