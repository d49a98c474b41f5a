//! HTML rendering of a [`Page`].

use crate::{Depiction, Page, PairView, StructurePanel, AWAITING_UPLOAD_PROMPT};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Molecule Pair Visualizer";
pub const HEADING: &str = "🔬 Neutral & Protonated Molecule Visualizer";
const INTRO: &str = "This app visualizes neutral molecules and their corresponding protonated forms \
from a CSV file. Upload your <code>dft_input_pairs.csv</code> to begin.";
const NO_STRUCTURES: &str = "The uploaded file contains no neutral/protonated pairs.";

const GLOBAL_STYLES: &str = r#"
body {
		font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif;
		background: #f5f7fa;
		color: #333;
		margin: 20px;
		padding: 0;
}
.container {
		max-width: 1200px;
		margin: 30px auto;
		background: #ffffff;
		padding: 40px;
		border-radius: 8px;
		box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
}
h1 {
		font-size: 2.2rem;
		margin-bottom: 20px;
		color: #222;
}
label {
		font-weight: bold;
		display: block;
		margin-bottom: 5px;
}
select {
		width: 100%;
		padding: 10px;
		font-size: 1rem;
		border: 1px solid #ccc;
		border-radius: 4px;
}
code {
		display: block;
		background: #f0f2f6;
		padding: 8px 12px;
		border-radius: 4px;
		overflow-x: auto;
}
p code {
		display: inline;
		padding: 2px 4px;
}
img {
		display: block;
		width: 100%;
		height: auto;
		margin: 15px auto;
		border: 1px solid #ddd;
		border-radius: 4px;
}
details {
		border: 1px solid #ddd;
		border-radius: 4px;
		padding: 10px 15px;
		margin-bottom: 15px;
}
summary {
		cursor: pointer;
		font-weight: bold;
}
.columns {
		display: grid;
		grid-template-columns: 1fr 1fr;
		gap: 40px;
		margin-top: 30px;
}
.upload {
		display: flex;
		gap: 20px;
		align-items: center;
		margin-bottom: 30px;
}
.upload form {
		margin: 0;
}
button {
		padding: 8px 14px;
		background-color: #007BFF;
		color: #fff;
		border: none;
		border-radius: 4px;
		cursor: pointer;
}
button:hover {
		background-color: #0056b3;
}
.info, .warning, .alert {
		padding: 15px;
		border-radius: 4px;
		margin-bottom: 20px;
}
.info {
		background-color: #e8f0fe;
		color: #0b4b8c;
}
.warning {
		background-color: #fff8e1;
		color: #8a6d00;
}
.alert {
		background-color: #f44336;
		color: white;
}
"#;

const UPLOAD_SCRIPT: &str = r#"
function uploadFile(input) {
		var file = input.files[0];
		if (!file) {
				return;
		}
		fetch('/upload?name=' + encodeURIComponent(file.name), {
				method: 'POST',
				body: file
		}).then(function () {
				window.location.href = '/';
		});
}
"#;

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The full document for `page`. `file_name` is the name of the last upload.
pub fn render_document(page: &Page, file_name: Option<&str>) -> String {
    let upload_status = match file_name {
        Some(name) => format!("<span>Loaded <strong>{}</strong></span>", escape(name)),
        None => String::new(),
    };
    let body = render_page(page);
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<title>{PAGE_TITLE}</title>
		<style>
			{GLOBAL_STYLES}
		</style>
		<script>
			{UPLOAD_SCRIPT}
		</script>
	</head>
	<body>
		<div class="container">
			<h1>{HEADING}</h1>
			<p>{INTRO}</p>
			<div class="upload">
				<label for="file">Choose your CSV file
					<input type="file" id="file" accept=".csv,text/csv" onchange="uploadFile(this);">
				</label>
				{upload_status}
				<form action="/reset" method="post"><button type="submit">Clear</button></form>
			</div>
			{body}
		</div>
	</body>
</html>
"#
    )
}

fn render_page(page: &Page) -> String {
    match page {
        Page::AwaitingUpload => format!(r#"<div class="info">{AWAITING_UPLOAD_PROMPT}</div>"#),
        Page::UploadError(message) => {
            format!(r#"<div class="alert">{}</div>"#, escape(message))
        }
        Page::NoStructures => format!(r#"<div class="info">{NO_STRUCTURES}</div>"#),
        Page::Ready(view) => render_pair(view),
    }
}

fn render_pair(view: &PairView) -> String {
    let mut html = String::new();

    html.push_str(r#"<form action="/" method="get">"#);
    html.push_str(r#"<label for="neutral">Select a Neutral Molecule to Visualize:</label>"#);
    html.push_str(r#"<select id="neutral" name="neutral" onchange="this.form.submit();">"#);
    for option in &view.options {
        let selected = if *option == view.selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{val}"{selected}>{desc}</option>"#,
            val = escape(option),
            desc = escape(option)
        );
    }
    html.push_str("</select>");
    html.push_str(r#"<noscript><button type="submit">Show</button></noscript>"#);
    html.push_str("</form>");

    html.push_str(r#"<div class="columns">"#);

    html.push_str("<div>");
    html.push_str("<h2>Neutral Molecule</h2>");
    html.push_str(&render_panel_body(&view.neutral));
    html.push_str("</div>");

    html.push_str("<div>");
    html.push_str("<h2>Corresponding Protonated Forms</h2>");
    for panel in &view.protonated {
        let open = if panel.expanded { " open" } else { "" };
        let _ = write!(
            html,
            "<details{open}><summary>{}</summary>{}</details>",
            escape(&panel.label),
            render_panel_body(panel)
        );
    }
    html.push_str("</div>");

    html.push_str("</div>");
    html
}

fn render_panel_body(panel: &StructurePanel) -> String {
    let image = match &panel.depiction {
        Depiction::Rendered { svg, .. } => format!(
            r#"<img src="{}" alt="{}"/>"#,
            svg.to_data_uri(),
            escape(&panel.smiles)
        ),
        Depiction::Unavailable(message) => {
            format!(r#"<div class="warning">{}</div>"#, escape(message))
        }
    };
    format!("<code>{}</code>{image}", escape(&panel.smiles))
}

/// A standalone error document, used when the server cannot serve the page.
pub fn error_page(error: impl std::fmt::Display) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<title>Error</title>
		<style>
			{GLOBAL_STYLES}
		</style>
	</head>
	<body>
		<div class="container">
			<h1>Error</h1>
			<p>{}</p>
			<a href="/">Go back</a>
		</div>
	</body>
</html>
"#,
        escape(&error.to_string()).replace('\n', "<br>")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, Session, SmilesParser, SvgRenderer};

    #[test]
    fn test_escape() {
        assert_eq!(escape("C[NH3+]"), "C[NH3+]");
        assert_eq!(
            escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_awaiting_upload() {
        let html = render_document(&Page::AwaitingUpload, None);
        assert!(html.contains("<title>Molecule Pair Visualizer</title>"));
        assert!(html.contains(HEADING));
        assert!(html.contains("Awaiting your CSV file upload..."));
        assert!(!html.contains("<select"));
    }

    #[test]
    fn test_upload_error_has_no_selector() {
        let page = Page::UploadError("Error: bad <file>".to_string());
        let html = render_document(&page, Some("pairs.csv"));
        assert!(html.contains(r#"<div class="alert">Error: bad &lt;file&gt;</div>"#));
        assert!(html.contains("fetch('/upload?name=' + encodeURIComponent(file.name)"));
        assert!(html.contains("<strong>pairs.csv</strong>"));
        assert!(!html.contains("<select"));
    }

    #[test]
    fn test_ready_page() {
        let mut session = Session::new();
        session.set_dataset(Dataset::from_rows([
            ("CCN", "CC[NH3+]"),
            ("CCN", "C[NH2+]C"),
            ("CCO", "CC[OH2+]"),
            ("CCN", "C1CC"),
        ]));
        let page = crate::build_page(&session, Some("CCN"), &SmilesParser, &SvgRenderer::default());
        let html = render_document(&page, None);

        assert!(html.contains(r#"<option value="CCN" selected>CCN</option>"#));
        assert!(html.contains(r#"<option value="CCO">CCO</option>"#));
        assert!(html.contains("<h2>Neutral Molecule</h2>"));
        assert!(html.contains("<h2>Corresponding Protonated Forms</h2>"));
        assert!(html.contains("<details open><summary>Protonated Form #1</summary>"));
        assert!(html.contains("<details><summary>Protonated Form #2</summary>"));
        assert!(html.contains("<details><summary>Protonated Form #3</summary>"));
        assert_eq!(html.matches("data:image/svg+xml;base64,").count(), 3);
        assert!(html.contains("Could not generate image for this protonated SMILES."));
    }
}
