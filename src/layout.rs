//! Deterministic 2D coordinates for depicting a molecular graph.
//!
//! Each connected fragment is seeded with classical multidimensional scaling
//! over ideal inter-atomic distances, then relaxed by stress majorization.
//! Fragments are laid out left to right.

use crate::MoleculeGraph;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, VecDeque};
use std::ops::{Add, Mul, Sub};
use tracing::*;

pub const BOND_LENGTH: f64 = 1.0;

/// Horizontal space between disconnected fragments.
const FRAGMENT_GAP: f64 = 1.5;
const POWER_ITERATIONS: usize = 200;
const STRESS_ITERATIONS: usize = 300;
const STRESS_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).length()
    }

    /// Unit vector in the same direction, or the zero vector.
    pub fn normalized(&self) -> Point {
        let length = self.length();
        if length > f64::EPSILON {
            *self * (1.0 / length)
        } else {
            Point::default()
        }
    }

    pub fn perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Smallest and largest corner of the box holding `points`.
pub fn bounds(points: &[Point]) -> (Point, Point) {
    if points.is_empty() {
        return (Point::default(), Point::default());
    }
    points.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}

/// Computes a 2D position for every atom, indexed by atom index.
pub fn compute_coordinates(graph: &MoleculeGraph) -> Vec<Point> {
    let mut positions = vec![Point::default(); graph.node_count()];
    let mut offset_x = 0.0;

    for fragment in connected_components(graph) {
        let local = layout_fragment(graph, &fragment);
        let (min, max) = bounds(&local);
        let shift = Point::new(offset_x - min.x, -(min.y + max.y) / 2.0);
        for (node, point) in fragment.iter().zip(&local) {
            positions[node.index()] = *point + shift;
        }
        offset_x += (max.x - min.x) + FRAGMENT_GAP;
    }

    positions
}

/// Fragments in order of their lowest atom index, each in breadth-first order.
fn connected_components(graph: &MoleculeGraph) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; graph.node_count()];
    let mut components = Vec::new();

    for start in graph.node_indices() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            component.push(node);
            let mut neighbors: Vec<_> = graph.neighbors(node).collect();
            neighbors.sort();
            for neighbor in neighbors {
                if !seen[neighbor.index()] {
                    seen[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Bond-count distances between every pair of atoms in a fragment.
fn hop_matrix(graph: &MoleculeGraph, fragment: &[NodeIndex]) -> Vec<Vec<usize>> {
    let local: BTreeMap<NodeIndex, usize> = fragment
        .iter()
        .enumerate()
        .map(|(i, node)| (*node, i))
        .collect();

    fragment
        .iter()
        .map(|&start| {
            let mut hops = vec![usize::MAX; fragment.len()];
            hops[local[&start]] = 0;
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                let here = hops[local[&node]];
                for neighbor in graph.neighbors(node) {
                    let slot = &mut hops[local[&neighbor]];
                    if *slot == usize::MAX {
                        *slot = here + 1;
                        queue.push_back(neighbor);
                    }
                }
            }
            hops
        })
        .collect()
}

/// Target separation for atoms `hops` bonds apart, assuming a zigzag
/// chain with 120 degree bond angles.
fn ideal_distance(hops: usize) -> f64 {
    match hops {
        0 => 0.0,
        1 => BOND_LENGTH,
        n => n as f64 * BOND_LENGTH * 3f64.sqrt() / 2.0,
    }
}

fn layout_fragment(graph: &MoleculeGraph, fragment: &[NodeIndex]) -> Vec<Point> {
    let n = fragment.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![Point::default()],
        2 => return vec![Point::default(), Point::new(BOND_LENGTH, 0.0)],
        _ => {}
    }

    let hops = hop_matrix(graph, fragment);
    let target: Vec<Vec<f64>> = hops
        .iter()
        .map(|row| row.iter().map(|&h| ideal_distance(h)).collect())
        .collect();

    let mut points = classical_scaling(&target);
    // Break symmetries MDS cannot: collinear chains and atoms that project
    // onto the same point.
    for (i, point) in points.iter_mut().enumerate() {
        let zigzag = if hops[0][i] % 2 == 0 { 0.05 } else { -0.05 };
        let angle = i as f64 * 2.399_963;
        *point = *point + Point::new(0.01 * angle.cos(), zigzag + 0.01 * angle.sin());
    }

    let sweeps = stress_majorization(&mut points, &target);
    debug!("Laid out fragment of {n} atoms in {sweeps} sweeps");
    points
}

/// Classical multidimensional scaling onto the two dominant axes.
fn classical_scaling(target: &[Vec<f64>]) -> Vec<Point> {
    let n = target.len();
    let squared: Vec<Vec<f64>> = target
        .iter()
        .map(|row| row.iter().map(|d| d * d).collect())
        .collect();
    let row_mean: Vec<f64> = squared
        .iter()
        .map(|row| row.iter().sum::<f64>() / n as f64)
        .collect();
    let grand_mean = row_mean.iter().sum::<f64>() / n as f64;

    let mut gram: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| -0.5 * (squared[i][j] - row_mean[i] - row_mean[j] + grand_mean))
                .collect()
        })
        .collect();

    let (first_value, first) = dominant_eigenpair(&gram);
    for i in 0..n {
        for j in 0..n {
            gram[i][j] -= first_value * first[i] * first[j];
        }
    }
    let (second_value, second) = dominant_eigenpair(&gram);

    let sx = first_value.max(0.0).sqrt();
    let sy = second_value.max(0.0).sqrt();
    (0..n)
        .map(|i| Point::new(first[i] * sx, second[i] * sy))
        .collect()
}

/// Largest (algebraic) eigenvalue of a symmetric matrix and its unit
/// eigenvector, by power iteration on a positively shifted matrix.
fn dominant_eigenpair(matrix: &[Vec<f64>]) -> (f64, Vec<f64>) {
    let n = matrix.len();
    let shift = matrix
        .iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max);

    let multiply = |v: &[f64]| -> Vec<f64> {
        matrix
            .iter()
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum::<f64>())
            .collect()
    };
    let normalize = |v: &mut Vec<f64>| -> f64 {
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        norm
    };

    let mut vector: Vec<f64> = (0..n)
        .map(|i| 1.0 + ((i * 7 + 3) % 11) as f64 / 11.0)
        .collect();
    normalize(&mut vector);

    for _ in 0..POWER_ITERATIONS {
        let mut next = multiply(&vector);
        next.iter_mut()
            .zip(&vector)
            .for_each(|(x, v)| *x += shift * v);
        if normalize(&mut next) <= f64::EPSILON {
            break;
        }
        vector = next;
    }

    let product = multiply(&vector);
    let value = product.iter().zip(&vector).map(|(a, b)| a * b).sum::<f64>();
    (value, vector)
}

/// Gauss-Seidel stress majorization with weights `1/d^2`. Returns the number
/// of sweeps performed.
fn stress_majorization(points: &mut [Point], target: &[Vec<f64>]) -> usize {
    let n = points.len();
    for sweep in 1..=STRESS_ITERATIONS {
        let mut largest_move: f64 = 0.0;
        for i in 0..n {
            let mut weight_sum = 0.0;
            let mut accumulated = Point::default();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let ideal = target[i][j];
                let weight = 1.0 / (ideal * ideal);
                let delta = points[i] - points[j];
                let current = delta.length();
                let push = if current > 1e-9 {
                    delta * (ideal / current)
                } else {
                    Point::default()
                };
                accumulated = accumulated + (points[j] + push) * weight;
                weight_sum += weight;
            }
            let moved = accumulated * (1.0 / weight_sum);
            largest_move = largest_move.max(moved.distance(&points[i]));
            points[i] = moved;
        }
        if largest_move < STRESS_TOLERANCE {
            return sweep;
        }
    }
    STRESS_ITERATIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;
    use petgraph::visit::EdgeRef;

    fn layout(smiles: &str) -> (MoleculeGraph, Vec<Point>) {
        let graph = parse_smiles(smiles).expect("Failed to parse SMILES");
        let points = compute_coordinates(&graph);
        (graph, points)
    }

    fn bond_lengths(graph: &MoleculeGraph, points: &[Point]) -> Vec<f64> {
        graph
            .edge_references()
            .map(|e| points[e.source().index()].distance(&points[e.target().index()]))
            .collect()
    }

    fn closest_pair(points: &[Point]) -> f64 {
        let mut closest = f64::INFINITY;
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                closest = closest.min(points[i].distance(&points[j]));
            }
        }
        closest
    }

    #[test]
    fn test_empty_and_single_atom() {
        assert!(compute_coordinates(&MoleculeGraph::new_undirected()).is_empty());
        let (_, points) = layout("C");
        assert_eq!(points, vec![Point::default()]);
    }

    #[test]
    fn test_benzene_is_regular() {
        let (graph, points) = layout("c1ccccc1");
        for length in bond_lengths(&graph, &points) {
            assert!((0.8..1.25).contains(&length), "bond length {length}");
        }
        // Opposite atoms sit across the ring, not folded onto each other.
        assert!(points[0].distance(&points[3]) > 1.5);
        assert!(closest_pair(&points) > 0.7);
    }

    #[test]
    fn test_chain_is_not_collinear() {
        let (graph, points) = layout("CCCCCC");
        for length in bond_lengths(&graph, &points) {
            assert!((0.8..1.25).contains(&length), "bond length {length}");
        }
        let (min, max) = bounds(&points);
        assert!(max.y - min.y > 0.2);
    }

    #[test]
    fn test_branched_atoms_are_separated() {
        let (_, points) = layout("CC(C)(C)C");
        assert!(closest_pair(&points) > 0.6);
        let (_, points) = layout("C[N+](C)(C)C");
        assert!(closest_pair(&points) > 0.6);
    }

    #[test]
    fn test_fragments_side_by_side() {
        let (_, points) = layout("CCO.[Na+]");
        let (_, first_max) = bounds(&points[..3]);
        assert!(points[3].x > first_max.x + 1.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (_, first) = layout("CC(=O)Nc1ccc(O)cc1");
        let (_, second) = layout("CC(=O)Nc1ccc(O)cc1");
        assert_eq!(first, second);
    }
}
