//! The page shown for a session and a dropdown selection.

use crate::{
    protonation_site, DepictionRenderer, HighlightSet, Session, StructureParser, Svg,
};
use tracing::*;

pub const AWAITING_UPLOAD_PROMPT: &str = "Awaiting your CSV file upload...";
pub const NEUTRAL_UNAVAILABLE: &str = "Could not generate image for this neutral SMILES.";
pub const PROTONATED_UNAVAILABLE: &str = "Could not generate image for this protonated SMILES.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Nothing uploaded yet.
    AwaitingUpload,
    /// The last upload was rejected; no selector is offered.
    UploadError(String),
    /// The upload was valid but held no drawable rows.
    NoStructures,
    Ready(PairView),
}

/// A selected neutral structure next to its protonated forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairView {
    pub options: Vec<String>,
    pub selected: String,
    pub neutral: StructurePanel,
    pub protonated: Vec<StructurePanel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePanel {
    pub label: String,
    pub smiles: String,
    /// Whether the panel starts open.
    pub expanded: bool,
    pub depiction: Depiction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Depiction {
    Rendered { svg: Svg, highlight: HighlightSet },
    Unavailable(String),
}

impl Depiction {
    pub fn svg(&self) -> Option<&Svg> {
        match self {
            Depiction::Rendered { svg, .. } => Some(svg),
            Depiction::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.svg().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Neutral,
    Protonated,
}

impl Role {
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            Role::Neutral => NEUTRAL_UNAVAILABLE,
            Role::Protonated => PROTONATED_UNAVAILABLE,
        }
    }
}

/// Parses and draws one structure. Neutral structures are drawn plainly;
/// protonated structures highlight their protonation site. Failures are
/// logged and turned into a warning for this structure alone.
pub fn depict_structure(
    smiles: &str,
    role: Role,
    parser: &impl StructureParser,
    renderer: &impl DepictionRenderer,
) -> Depiction {
    let graph = match parser.parse(smiles) {
        Ok(graph) => graph,
        Err(e) => {
            warn!("{:?} structure {smiles:?} could not be parsed: {e:#}", role);
            return Depiction::Unavailable(role.unavailable_message().to_string());
        }
    };

    let highlight = match role {
        Role::Neutral => HighlightSet::empty(),
        Role::Protonated => protonation_site(&graph),
    };
    if role == Role::Protonated && highlight.is_empty() {
        debug!("No +1 atom in protonated structure {smiles:?}");
    }

    match renderer.render(&graph, &highlight) {
        Ok(svg) => Depiction::Rendered { svg, highlight },
        Err(e) => {
            warn!("{:?} structure {smiles:?} could not be drawn: {e:#}", role);
            Depiction::Unavailable(role.unavailable_message().to_string())
        }
    }
}

/// Builds the page for the current session. `selection` is the neutral
/// structure requested from the dropdown; an absent or unknown selection
/// falls back to the first option.
pub fn build_page(
    session: &Session,
    selection: Option<&str>,
    parser: &impl StructureParser,
    renderer: &impl DepictionRenderer,
) -> Page {
    if let Some(message) = session.error() {
        return Page::UploadError(message.to_string());
    }
    let Some(dataset) = session.dataset() else {
        return Page::AwaitingUpload;
    };

    let options = dataset.neutral_options();
    let selected = match selection {
        Some(requested) if options.contains(&requested) => requested,
        _ => match options.first() {
            Some(first) => *first,
            None => return Page::NoStructures,
        },
    };
    debug!("Building page for {selected:?}");

    let neutral = StructurePanel {
        label: "Neutral Molecule".to_string(),
        smiles: selected.to_string(),
        expanded: true,
        depiction: depict_structure(selected, Role::Neutral, parser, renderer),
    };

    let protonated = dataset
        .protonated_forms(selected)
        .into_iter()
        .enumerate()
        .map(|(i, smiles)| StructurePanel {
            label: format!("Protonated Form #{}", i + 1),
            smiles: smiles.to_string(),
            expanded: i == 0,
            depiction: depict_structure(smiles, Role::Protonated, parser, renderer),
        })
        .collect();

    Page::Ready(PairView {
        options: options.into_iter().map(str::to_string).collect(),
        selected: selected.to_string(),
        neutral,
        protonated,
    })
}
