use crate::{bounds, compute_coordinates, hydrogen_count, Bond, HighlightSet, MoleculeGraph, Point};
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::fmt::{Display, Formatter, Result as FmtResult, Write as FmtWrite};
use std::path::Path;
use tracing::*;

/// Default width and height of a depiction, in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 400;

/// Fill used behind highlighted atoms.
pub const HIGHLIGHT_COLOR: &str = "#FF8080";

/// A rendered SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Svg {
    width: u32,
    height: u32,
    document: String,
}

impl Svg {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_str(&self) -> &str {
        &self.document
    }

    /// Writes the document to `output`.
    pub fn save(&self, output: &Path) -> Result<()> {
        std::fs::write(output, &self.document)
            .with_context(|| format!("Failed to write SVG file {}", output.display()))?;
        info!("SVG saved to {}", output.display());
        Ok(())
    }

    /// The document as a `data:` URI, suitable for an `<img src=...>`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            general_purpose::STANDARD.encode(self.document.as_bytes())
        )
    }
}

impl Display for Svg {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.document)
    }
}

/// Renders the graph as a `size` x `size` SVG, emphasizing the atoms in
/// `highlight`.
pub fn depict(graph: &MoleculeGraph, highlight: &HighlightSet, size: u32) -> Result<Svg> {
    let mut document = String::new();
    generate_svg(&mut document, graph, highlight, size)
        .context("Failed to write SVG document")?;
    debug!(
        "Depicted {} atoms ({} highlighted) at {size}px",
        graph.node_count(),
        highlight.len()
    );
    Ok(Svg {
        width: size,
        height: size,
        document,
    })
}

/// Maps graph coordinates onto the canvas.
struct Canvas {
    scale: f64,
    center: Point,
    middle: Point,
}

impl Canvas {
    fn fit(points: &[Point], size: u32) -> Self {
        let size = size as f64;
        let padding = size * 0.08;
        let (min, max) = bounds(points);
        let span_x = (max.x - min.x).max(f64::EPSILON);
        let span_y = (max.y - min.y).max(f64::EPSILON);
        // Small molecules stop growing at a comfortable bond length.
        let scale = ((size - 2.0 * padding) / span_x)
            .min((size - 2.0 * padding) / span_y)
            .min(size / 6.0);
        Self {
            scale,
            center: Point::new(size / 2.0, size / 2.0),
            middle: Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0),
        }
    }

    /// SVG y grows downwards.
    fn project(&self, point: Point) -> Point {
        let offset = (point - self.middle) * self.scale;
        Point::new(self.center.x + offset.x, self.center.y - offset.y)
    }
}

/// Text pieces of an atom label: symbol with isotope, hydrogens, charge.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Label {
    symbol: String,
    hydrogens: u8,
    charge: String,
}

impl Label {
    /// Label text with the hydrogen count as a subscript and the charge as a
    /// superscript.
    fn markup(&self) -> String {
        let mut text = self.symbol.clone();
        match self.hydrogens {
            0 => {}
            1 => text.push('H'),
            n => text.push_str(&format!(
                "H<tspan baseline-shift=\"sub\" font-size=\"70%\">{n}</tspan>"
            )),
        }
        if !self.charge.is_empty() {
            text.push_str(&format!(
                "<tspan baseline-shift=\"super\" font-size=\"70%\">{}</tspan>",
                self.charge
            ));
        }
        text
    }
}

fn charge_to_string(charge: i8) -> String {
    match charge {
        0 => String::new(),
        1 => "+".to_string(),
        -1 => "-".to_string(),
        c if c > 0 => format!("{c}+"),
        c => format!("{}-", -(c as i16)),
    }
}

/// Carbons are drawn as bare vertices unless something about them needs
/// spelling out.
fn atom_label(graph: &MoleculeGraph, node: NodeIndex) -> Option<Label> {
    let atom = &graph[node];
    let isolated = graph.neighbors(node).next().is_none();
    if atom.element == crate::Element::C && atom.charge == 0 && atom.isotope.is_none() && !isolated {
        return None;
    }
    let symbol = match atom.isotope {
        Some(isotope) => format!("{isotope}{}", atom.element.symbol()),
        None => atom.element.symbol().to_string(),
    };
    Some(Label {
        symbol,
        hydrogens: hydrogen_count(graph, node),
        charge: charge_to_string(atom.charge),
    })
}

/// Maps bond types to the number of strokes drawn and whether the extra
/// stroke is dashed.
fn bond_to_style(bond: &Bond) -> (usize, bool) {
    match bond {
        Bond::Single => (1, false),
        Bond::Double => (2, false),
        Bond::Triple => (3, false),
        Bond::Aromatic => (2, true),
    }
}

fn line(out: &mut String, from: Point, to: Point, color: &str, width: f64, dashed: bool) -> FmtResult {
    write!(
        out,
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{color}\" stroke-width=\"{width:.1}\" stroke-linecap=\"round\"",
        from.x, from.y, to.x, to.y
    )?;
    if dashed {
        write!(out, " stroke-dasharray=\"{:.1},{:.1}\"", width * 2.0, width * 2.0)?;
    }
    writeln!(out, "/>")
}

/// A stroke split at its midpoint so each half takes its atom's color.
fn split_line(
    out: &mut String,
    from: Point,
    to: Point,
    colors: (&str, &str),
    width: f64,
) -> FmtResult {
    let middle = (from + to) * 0.5;
    if colors.0 == colors.1 {
        return line(out, from, to, colors.0, width, false);
    }
    line(out, from, middle, colors.0, width, false)?;
    line(out, middle, to, colors.1, width, false)
}

/// Direction, perpendicular to the bond, towards the rest of the molecule
/// around it. Ring bonds point into the ring.
fn inner_side(graph: &MoleculeGraph, points: &[Point], a: NodeIndex, b: NodeIndex) -> Point {
    let along = points[b.index()] - points[a.index()];
    let normal = along.perpendicular().normalized();
    let middle = (points[a.index()] + points[b.index()]) * 0.5;
    let pull = graph
        .neighbors(a)
        .filter(|&n| n != b)
        .chain(graph.neighbors(b).filter(|&n| n != a))
        .fold(Point::default(), |acc, n| acc + (points[n.index()] - middle));
    if pull.dot(&normal) < 0.0 {
        normal * -1.0
    } else {
        normal
    }
}

fn generate_svg(
    out: &mut String,
    graph: &MoleculeGraph,
    highlight: &HighlightSet,
    size: u32,
) -> FmtResult {
    writeln!(
        out,
        "<svg version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">"
    )?;
    writeln!(out, "<rect width=\"{size}\" height=\"{size}\" fill=\"white\"/>")?;

    let points = compute_coordinates(graph);
    let canvas = Canvas::fit(&points, size);
    let projected: Vec<Point> = points.iter().map(|p| canvas.project(*p)).collect();
    let bond_px = canvas.scale;
    let stroke = (bond_px * 0.04).clamp(1.0, 3.0);
    let font_size = (bond_px * 0.4).clamp(8.0, 28.0);
    let labels: Vec<Option<Label>> = graph.node_indices().map(|n| atom_label(graph, n)).collect();

    for node in highlight.iter() {
        if let Some(center) = projected.get(node.index()) {
            writeln!(
                out,
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{HIGHLIGHT_COLOR}\"/>",
                center.x,
                center.y,
                bond_px * 0.35
            )?;
        }
    }

    for edge in graph.edge_references() {
        let (a, b) = (edge.source(), edge.target());
        let mut from = projected[a.index()];
        let mut to = projected[b.index()];
        let direction = (to - from).normalized();
        let trim = font_size * 0.6;
        if (to - from).length() > 2.0 * trim {
            if labels[a.index()].is_some() {
                from = from + direction * trim;
            }
            if labels[b.index()].is_some() {
                to = to - direction * trim;
            }
        }

        let colors = (graph[a].element.color(), graph[b].element.color());
        let gap = bond_px * 0.16;
        match bond_to_style(edge.weight()) {
            (1, _) => split_line(out, from, to, colors, stroke)?,
            (2, false) => {
                let offset = direction.perpendicular() * (gap / 2.0);
                split_line(out, from + offset, to + offset, colors, stroke)?;
                split_line(out, from - offset, to - offset, colors, stroke)?;
            }
            (2, true) => {
                split_line(out, from, to, colors, stroke)?;
                let inward = inner_side(graph, &points, a, b);
                // Canvas y is flipped relative to layout y.
                let offset = Point::new(inward.x, -inward.y) * gap;
                let shorten = (to - from) * 0.15;
                line(out, from + offset + shorten, to + offset - shorten, "black", stroke, true)?;
            }
            _ => {
                let offset = direction.perpendicular() * gap;
                split_line(out, from, to, colors, stroke)?;
                split_line(out, from + offset, to + offset, colors, stroke)?;
                split_line(out, from - offset, to - offset, colors, stroke)?;
            }
        }
    }

    for (node, label) in graph.node_indices().zip(&labels) {
        let Some(label) = label else { continue };
        let at = projected[node.index()];
        writeln!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"{font_size:.1}\" text-anchor=\"middle\" dominant-baseline=\"central\" fill=\"{}\">{}</text>",
            at.x,
            at.y,
            graph[node].element.color(),
            label.markup()
        )?;
    }

    writeln!(out, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_smiles, protonation_site};

    const SUB: &str = "<tspan baseline-shift=\"sub\" font-size=\"70%\">";
    const SUP: &str = "<tspan baseline-shift=\"super\" font-size=\"70%\">";

    fn label_of(smiles: &str, atom: usize) -> Option<String> {
        let graph = parse_smiles(smiles).expect("Failed to parse SMILES");
        atom_label(&graph, NodeIndex::new(atom)).map(|label| label.markup())
    }

    #[test]
    fn test_atom_labels() {
        assert_eq!(label_of("CCO", 0), None);
        assert_eq!(label_of("CCO", 2), Some("OH".to_string()));
        assert_eq!(label_of("CN", 1), Some(format!("NH{SUB}2</tspan>")));
        assert_eq!(
            label_of("C[NH3+]", 1),
            Some(format!("NH{SUB}3</tspan>{SUP}+</tspan>"))
        );
        assert_eq!(label_of("CC(=O)[O-]", 3), Some(format!("O{SUP}-</tspan>")));
        assert_eq!(label_of("C", 0), Some(format!("CH{SUB}4</tspan>")));
        assert_eq!(label_of("[13CH3]C", 0), Some(format!("13CH{SUB}3</tspan>")));
        assert_eq!(label_of("[Fe+2]", 0), Some(format!("Fe{SUP}2+</tspan>")));
        assert_eq!(label_of("[O-2]", 0), Some(format!("O{SUP}2-</tspan>")));
    }

    #[test]
    fn test_bond_styles() {
        assert_eq!(bond_to_style(&Bond::Single), (1, false));
        assert_eq!(bond_to_style(&Bond::Double), (2, false));
        assert_eq!(bond_to_style(&Bond::Triple), (3, false));
        assert_eq!(bond_to_style(&Bond::Aromatic), (2, true));
    }

    #[test]
    fn draw_ethanol() {
        let molecule = parse_smiles("CCO").expect("Failed to parse SMILES");
        let svg = depict(&molecule, &HighlightSet::empty(), DEFAULT_IMAGE_SIZE)
            .expect("Failed to depict");

        assert_eq!((svg.width(), svg.height()), (400, 400));
        assert!(svg.as_str().starts_with("<svg"));
        assert!(svg.as_str().trim_end().ends_with("</svg>"));
        assert!(svg.as_str().contains("width=\"400\""));
        assert!(svg.as_str().matches("<line").count() >= 2);
        assert!(svg.as_str().contains(">O"));
        assert!(!svg.as_str().contains(HIGHLIGHT_COLOR));
    }

    #[test]
    fn draw_protonated_amine() {
        let molecule = parse_smiles("CC[NH3+]").expect("Failed to parse SMILES");
        let highlight = protonation_site(&molecule);
        let svg = depict(&molecule, &highlight, 300).expect("Failed to depict");

        assert!(svg.as_str().contains("width=\"300\""));
        assert_eq!(svg.as_str().matches(HIGHLIGHT_COLOR).count(), 1);
        assert!(svg.as_str().contains(">N"));
        assert!(svg.as_str().contains(">+</tspan>"));
    }

    #[test]
    fn draw_benzene_dashes() {
        let molecule = parse_smiles("c1ccccc1").expect("Failed to parse SMILES");
        let svg = depict(&molecule, &HighlightSet::empty(), 400).expect("Failed to depict");
        assert_eq!(svg.as_str().matches("stroke-dasharray").count(), 6);
    }

    #[test]
    fn draw_empty_graph() {
        let svg = depict(&MoleculeGraph::new_undirected(), &HighlightSet::empty(), 400)
            .expect("Failed to depict");
        assert!(!svg.as_str().contains("<line"));
        assert!(svg.as_str().contains("<rect"));
    }

    #[test]
    fn test_data_uri() {
        let molecule = parse_smiles("C").expect("Failed to parse SMILES");
        let svg = depict(&molecule, &HighlightSet::empty(), 100).expect("Failed to depict");
        let uri = svg.to_data_uri();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
        let encoded = uri.trim_start_matches("data:image/svg+xml;base64,");
        let decoded = general_purpose::STANDARD.decode(encoded).expect("valid base64");
        assert_eq!(decoded, svg.as_str().as_bytes());
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ammonium.svg");
        let molecule = parse_smiles("[NH4+]").expect("Failed to parse SMILES");
        let svg = depict(&molecule, &protonation_site(&molecule), 200).expect("Failed to depict");
        svg.save(&path).expect("Failed to save SVG");
        let written = std::fs::read_to_string(&path).expect("svg file");
        assert_eq!(written, svg.as_str());
    }
}
