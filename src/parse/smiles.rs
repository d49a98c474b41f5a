use crate::{Atom, Bond, Bond::*, Element, MoleculeGraph};
use anyhow::{Context, Result};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

use super::bracket::parse_bracket_atom;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("Empty SMILES string")]
    Empty,
    #[error("Branch start '(' at position {0} (followed by {1}) without a current atom")]
    BranchNoCurrentAtom(usize, String),
    #[error("Branch end ')' at position {0} (followed by {1}) without a matching '('")]
    BranchEndNoStart(usize, String),
    #[error("Branch opened at position {0} is never closed")]
    UnclosedBranch(usize),
    #[error("Ring closure {0} at position {1} without a current atom")]
    RingClosureNoCurrentAtom(u8, usize),
    #[error("Ring closure {0} at position {1} would bond an atom to itself or duplicate a bond")]
    InvalidRingClosure(u8, usize),
    #[error("Ring closure {0} is never closed")]
    UnclosedRing(u8),
    #[error("Unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("Invalid bracket atom '[{1}]' at position {0}")]
    InvalidBracket(usize, String),
    #[error("Unknown element symbol '{1}' at position {0}")]
    UnknownElement(usize, String),
    #[error("Bond '{1}' at position {0} does not join two atoms")]
    DanglingBond(usize, char),
    #[error("Unexpected character '{1}' at position {0}")]
    UnexpectedChar(usize, char),
}

/// Parses a SMILES string into a MoleculeGraph.
///
/// Surrounding whitespace is trimmed and anything after the first inner
/// whitespace (a molecule title) is ignored.
pub fn parse_smiles(smiles: &str) -> Result<MoleculeGraph> {
    parse_smiles_helper(smiles).context(format!("Failed to parse SMILES string {smiles}"))
}

/// A bond symbol that has been read but not yet used.
#[derive(Clone, Copy)]
struct PendingBond {
    bond: Bond,
    symbol: char,
    position: usize,
}

/// Bond to use between two atoms when no bond symbol was written.
fn implied_bond(graph: &MoleculeGraph, a: NodeIndex, b: NodeIndex) -> Bond {
    if graph[a].is_aromatic() && graph[b].is_aromatic() {
        Aromatic
    } else {
        Single
    }
}

struct Builder {
    graph: MoleculeGraph,
    current_atom: Option<NodeIndex>,
    pending: Option<PendingBond>,
    // Implicit bonds between aromatic atoms; demoted to single if not in a ring.
    implicit_aromatic: Vec<EdgeIndex>,
}

impl Builder {
    fn add_atom(&mut self, atom: Atom) -> Result<(), SmilesError> {
        let new_atom = self.graph.add_node(atom);
        match (self.current_atom, self.pending.take()) {
            (Some(prev_atom), Some(pending)) => {
                self.graph.add_edge(prev_atom, new_atom, pending.bond);
            }
            (Some(prev_atom), None) => {
                let bond = implied_bond(&self.graph, prev_atom, new_atom);
                let edge = self.graph.add_edge(prev_atom, new_atom, bond);
                if bond == Aromatic {
                    self.implicit_aromatic.push(edge);
                }
            }
            (None, Some(pending)) => {
                return Err(SmilesError::DanglingBond(pending.position, pending.symbol));
            }
            (None, None) => {}
        }
        self.current_atom = Some(new_atom);
        Ok(())
    }

    fn check_no_pending(&self) -> Result<(), SmilesError> {
        match self.pending {
            Some(pending) => Err(SmilesError::DanglingBond(pending.position, pending.symbol)),
            None => Ok(()),
        }
    }
}

fn parse_smiles_helper(smiles: &str) -> Result<MoleculeGraph, SmilesError> {
    let body = smiles.split_whitespace().next().unwrap_or("");
    let chars: Vec<char> = body.chars().collect();
    if chars.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut builder = Builder {
        graph: MoleculeGraph::new_undirected(),
        current_atom: None,
        pending: None,
        implicit_aromatic: Vec::new(),
    };
    let mut branch_stack: Vec<(NodeIndex, usize)> = Vec::new();
    // Ring number -> (opening atom, bond written at the opening, position)
    let mut ring_map: BTreeMap<u8, (NodeIndex, Option<PendingBond>, usize)> = BTreeMap::new();
    let rest = |i: usize| chars[i..].iter().collect::<String>();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                builder.check_no_pending()?;
                match builder.current_atom {
                    Some(atom) => branch_stack.push((atom, i)),
                    None => return Err(SmilesError::BranchNoCurrentAtom(i, rest(i))),
                }
                i += 1;
            }
            ')' => {
                builder.check_no_pending()?;
                match branch_stack.pop() {
                    Some((atom, _)) => builder.current_atom = Some(atom),
                    None => return Err(SmilesError::BranchEndNoStart(i, rest(i))),
                }
                i += 1;
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                if builder.pending.is_some() {
                    return Err(SmilesError::UnexpectedChar(i, c));
                }
                let bond = match c {
                    '=' => Double,
                    '#' => Triple,
                    ':' => Aromatic,
                    // Directional bonds only carry stereo information.
                    _ => Single,
                };
                builder.pending = Some(PendingBond {
                    bond,
                    symbol: c,
                    position: i,
                });
                i += 1;
            }
            '0'..='9' | '%' => {
                let (ring_number, width) = if c == '%' {
                    match (chars.get(i + 1), chars.get(i + 2)) {
                        (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                            let tens = a.to_digit(10).unwrap_or(0) as u8;
                            let ones = b.to_digit(10).unwrap_or(0) as u8;
                            (tens * 10 + ones, 3)
                        }
                        _ => return Err(SmilesError::UnexpectedChar(i, c)),
                    }
                } else {
                    (c.to_digit(10).unwrap_or(0) as u8, 1)
                };

                let current = builder
                    .current_atom
                    .ok_or(SmilesError::RingClosureNoCurrentAtom(ring_number, i))?;
                let pending = builder.pending.take();

                if let Some((start_atom, opening_bond, _)) = ring_map.remove(&ring_number) {
                    if start_atom == current || builder.graph.find_edge(start_atom, current).is_some() {
                        return Err(SmilesError::InvalidRingClosure(ring_number, i));
                    }
                    match pending.or(opening_bond) {
                        Some(written) => {
                            builder.graph.add_edge(current, start_atom, written.bond);
                        }
                        None => {
                            let bond = implied_bond(&builder.graph, start_atom, current);
                            let edge = builder.graph.add_edge(current, start_atom, bond);
                            if bond == Aromatic {
                                builder.implicit_aromatic.push(edge);
                            }
                        }
                    }
                } else {
                    ring_map.insert(ring_number, (current, pending, i));
                }
                i += width;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|offset| i + offset)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let atom = parse_bracket_atom(&content, i)?;
                builder.add_atom(atom)?;
                i = end + 1;
            }
            '.' => {
                // The next atom starts a new, disconnected fragment.
                builder.check_no_pending()?;
                builder.current_atom = None;
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == '*' => {
                // Two-letter organic-subset symbols (Cl, Br) win over one letter.
                let candidate: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let (element, aromatic, width) = match Element::from_organic_subset(&candidate) {
                    Some((element, aromatic)) if candidate.len() == 2 => (element, aromatic, 2),
                    _ => {
                        let single = c.to_string();
                        let (element, aromatic) = Element::from_organic_subset(&single)
                            .ok_or_else(|| SmilesError::UnknownElement(i, single.clone()))?;
                        (element, aromatic, 1)
                    }
                };
                let atom = if aromatic {
                    Atom::aromatic(element)
                } else {
                    Atom::new(element)
                };
                builder.add_atom(atom)?;
                i += width;
            }
            _ => return Err(SmilesError::UnexpectedChar(i, c)),
        }
    }

    builder.check_no_pending()?;
    if let Some(&(_, position)) = branch_stack.last() {
        return Err(SmilesError::UnclosedBranch(position));
    }
    if let Some((&ring_number, _)) = ring_map.iter().next() {
        return Err(SmilesError::UnclosedRing(ring_number));
    }
    if builder.graph.node_count() == 0 {
        return Err(SmilesError::Empty);
    }

    let Builder {
        mut graph,
        implicit_aromatic,
        ..
    } = builder;
    for edge in implicit_aromatic {
        if !in_ring(&graph, edge) {
            graph[edge] = Single;
        }
    }
    Ok(graph)
}

/// Whether the two ends of `edge` stay connected once the edge is removed.
fn in_ring(graph: &MoleculeGraph, edge: EdgeIndex) -> bool {
    let Some((from, to)) = graph.edge_endpoints(edge) else {
        return false;
    };
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        for neighbor_edge in graph.edges(node) {
            if neighbor_edge.id() == edge {
                continue;
            }
            let other = if neighbor_edge.source() == node {
                neighbor_edge.target()
            } else {
                neighbor_edge.source()
            };
            queue.push_back(other);
        }
    }
    false
}
