//! Batch rendering of a whole dataset to SVG files plus a CSV manifest.

use crate::{depict_structure, Dataset, Depiction, DepictionRenderer, Role, StructureParser};
use anyhow::{Context, Result};
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::*;

pub const MANIFEST_FILE: &str = "manifest.csv";

/// Counts of what a batch run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub groups: usize,
    pub rendered: usize,
    pub unavailable: usize,
}

/// Renders every neutral structure and its protonated forms under `out_dir`:
/// `group_<n>/neutral.svg`, `group_<n>/protonated_<i>.svg`, and a
/// `manifest.csv` describing each structure. Structures that cannot be drawn
/// are listed as unavailable and the run continues.
pub fn render_dataset(
    dataset: &Dataset,
    out_dir: &Path,
    parser: &impl StructureParser,
    renderer: &impl DepictionRenderer,
) -> Result<RenderSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let manifest_path = out_dir.join(MANIFEST_FILE);
    let mut wtr = Writer::from_path(&manifest_path)
        .with_context(|| format!("Failed to create manifest {}", manifest_path.display()))?;
    wtr.write_record([
        "group",
        "role",
        "form",
        "smiles",
        "highlight_atom",
        "file",
        "status",
    ])?;

    let mut summary = RenderSummary::default();
    for (n, record) in dataset.records().iter().enumerate() {
        let group = n + 1;
        let group_dir = PathBuf::from(format!("group_{group}"));
        fs::create_dir_all(out_dir.join(&group_dir))
            .with_context(|| format!("Failed to create {}", group_dir.display()))?;

        let structures = std::iter::once((Role::Neutral, 0, &record.neutral)).chain(
            record
                .protonated
                .iter()
                .enumerate()
                .map(|(i, smiles)| (Role::Protonated, i + 1, smiles)),
        );

        for (role, form, smiles) in structures {
            let (role_name, file_name) = match role {
                Role::Neutral => ("neutral", "neutral.svg".to_string()),
                Role::Protonated => ("protonated", format!("protonated_{form}.svg")),
            };
            let form = form.to_string();

            match depict_structure(smiles, role, parser, renderer) {
                Depiction::Rendered { svg, highlight } => {
                    let relative = group_dir.join(&file_name);
                    let path = out_dir.join(&relative);
                    svg.save(&path)?;
                    let file = relative.to_string_lossy().into_owned();
                    let highlight_atom = highlight
                        .atom()
                        .map(|atom| atom.index().to_string())
                        .unwrap_or_default();
                    wtr.write_record([
                        group.to_string().as_str(),
                        role_name,
                        form.as_str(),
                        smiles.as_str(),
                        highlight_atom.as_str(),
                        file.as_str(),
                        "rendered",
                    ])?;
                    summary.rendered += 1;
                }
                Depiction::Unavailable(message) => {
                    warn!("Group {group} {role_name} {form}: {message}");
                    wtr.write_record([
                        group.to_string().as_str(),
                        role_name,
                        form.as_str(),
                        smiles.as_str(),
                        "",
                        "",
                        "unavailable",
                    ])?;
                    summary.unavailable += 1;
                }
            }
        }

        info!(
            "Rendered group {group} ({} protonated forms) for {}",
            record.protonated.len(),
            record.neutral
        );
        summary.groups += 1;
    }

    wtr.flush()?;
    info!(
        "Manifest written to {} ({} rendered, {} unavailable)",
        manifest_path.display(),
        summary.rendered,
        summary.unavailable
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SmilesParser, SvgRenderer};
    use csv::ReaderBuilder;

    fn manifest(out_dir: &Path) -> Vec<Vec<String>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(out_dir.join(MANIFEST_FILE))
            .expect("Failed to open manifest");
        rdr.records()
            .map(|record| {
                record
                    .expect("Failed to read manifest record")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_render_dataset() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dataset = Dataset::from_rows([
            ("CCN", "CC[NH3+]"),
            ("c1ccncc1", "c1cc[nH+]cc1"),
            ("CCN", "C[NH2+]C"),
        ]);

        let summary =
            render_dataset(&dataset, dir.path(), &SmilesParser, &SvgRenderer::new(300))
                .expect("Failed to render dataset");
        assert_eq!(
            summary,
            RenderSummary {
                groups: 2,
                rendered: 5,
                unavailable: 0
            }
        );

        for file in [
            "group_1/neutral.svg",
            "group_1/protonated_1.svg",
            "group_1/protonated_2.svg",
            "group_2/neutral.svg",
            "group_2/protonated_1.svg",
        ] {
            let svg = fs::read_to_string(dir.path().join(file)).expect("Missing SVG file");
            assert!(svg.starts_with("<svg"), "{file} is not an SVG document");
        }

        let rows = manifest(dir.path());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][..5], ["1", "neutral", "0", "CCN", ""]);
        assert_eq!(rows[1][..5], ["1", "protonated", "1", "CC[NH3+]", "2"]);
        assert_eq!(rows[2][..5], ["1", "protonated", "2", "C[NH2+]C", "1"]);
        assert_eq!(rows[4][..5], ["2", "protonated", "1", "c1cc[nH+]cc1", "3"]);
        assert!(rows.iter().all(|row| row[6] == "rendered"));
    }

    #[test]
    fn test_unparsable_structures_are_listed() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dataset = Dataset::from_rows([("CCN", "CC[NH3+"), ("CCN", "CC[NH3+]")]);

        let summary = render_dataset(&dataset, dir.path(), &SmilesParser, &SvgRenderer::default())
            .expect("Failed to render dataset");
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.unavailable, 1);

        let rows = manifest(dir.path());
        assert_eq!(
            rows[1],
            ["1", "protonated", "1", "CC[NH3+", "", "", "unavailable"]
        );
        assert_eq!(rows[2][6], "rendered");
        assert!(!dir.path().join("group_1/protonated_1.svg").exists());
        assert!(dir.path().join("group_1/protonated_2.svg").exists());
    }
}
