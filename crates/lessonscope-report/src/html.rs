//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use lessonscope_core::model::Section;
use lessonscope_core::report::Analysis;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape a multi-line field value, keeping its line breaks.
fn html_lines(s: &str) -> String {
    html_escape(s).replace('\n', "<br>\n")
}

/// Generate an HTML page for an analysis.
pub fn generate_html(analysis: &Analysis) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Assessment Analysis</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Assessment Analysis</h1>\n");
    let selection = analysis
        .selection
        .map(|s| format!(" ({s})"))
        .unwrap_or_default();
    html.push_str(&format!(
        "<p class=\"meta\">Model: <strong>{}</strong>{} | {} of 9 fields filled | {}</p>\n",
        html_escape(&analysis.model),
        html_escape(&selection),
        analysis.record.filled_count(),
        analysis.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if !analysis.unrecognized_headers.is_empty() || analysis.discarded_lines > 0 {
        html.push_str("<section class=\"warnings\">\n<h2>Parser notes</h2>\n<ul>\n");
        for header in &analysis.unrecognized_headers {
            html.push_str(&format!(
                "<li>Unrecognized heading: <code>{}</code></li>\n",
                html_escape(header)
            ));
        }
        if analysis.discarded_lines > 0 {
            html.push_str(&format!(
                "<li>{} line(s) outside any recognized heading were skipped</li>\n",
                analysis.discarded_lines
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Parsed record, grouped by section
    html.push_str("<section class=\"parsed\">\n");
    html.push_str("<h2>Parsed Analysis</h2>\n");
    for section in Section::ALL {
        html.push_str(&format!("<h3>{}</h3>\n", html_escape(section.title())));
        html.push_str("<table>\n<thead><tr><th>Field</th><th>Content</th></tr></thead>\n<tbody>\n");
        for field in section.fields() {
            let value = analysis.record.get(field);
            let class = if value.is_empty() { " class=\"empty\"" } else { "" };
            html.push_str(&format!(
                "<tr{}><td>{}</td><td>{}</td></tr>\n",
                class,
                html_escape(field.key()),
                html_lines(value)
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Full model output
    html.push_str("<section class=\"raw-output\">\n");
    html.push_str("<details>\n<summary>Full Model Output</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(&analysis.raw_output));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(analysis).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(analysis: &Analysis, path: &Path) -> Result<()> {
    let html = generate_html(analysis);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #9ca3af; --warn: #fef3c7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --muted: #6b7280; --warn: #78350f; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.warnings { background: var(--warn); padding: 0.5rem 1rem; border-radius: 8px; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
td:first-child { white-space: nowrap; font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
tr.empty td:last-child { color: var(--muted); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; white-space: pre-wrap; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
