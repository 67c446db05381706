use crate::application::{CapabilityError, PrintSink, PrintView};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const PRINT_STYLES: &str = "body { font-family: Arial, sans-serif; margin: 20px; }
.text-primary { color: #2563eb !important; }
.fw-bold { font-weight: bold; }
.mb-3 { margin-bottom: 1rem; }
.p-4 { padding: 1.5rem; }
.border { border: 1px solid #ccc; }
.rounded { border-radius: 8px; }";

/// Print sink that writes a standalone HTML report for the system's print dialog.
#[derive(Debug, Clone)]
pub struct HtmlPrintSink {
    path: PathBuf,
}

impl HtmlPrintSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(view: &PrintView) -> String {
        let rows: String = view
            .entries
            .iter()
            .map(|entry| {
                format!(
                    "      <p class=\"mb-3\"><span class=\"fw-bold\">{}:</span> {}</p>\n",
                    escape_html(&entry.label),
                    escape_html(&entry.value)
                )
            })
            .collect();

        format!(
            "<html>\n  <head>\n    <title>{}</title>\n    <style>\n{}\n    </style>\n  </head>\n  <body>\n    <div class=\"p-4 border rounded\">\n      <h2 class=\"text-primary\">{}</h2>\n{}    </div>\n  </body>\n</html>\n",
            escape_html(&view.title),
            PRINT_STYLES,
            escape_html(&view.heading),
            rows
        )
    }
}

impl PrintSink for HtmlPrintSink {
    fn open(&mut self, view: &PrintView) -> Result<(), CapabilityError> {
        fs::write(&self.path, Self::render(view))
            .map_err(|err| CapabilityError::Failed(format!("{}: {}", self.path.display(), err)))?;
        info!(path = %self.path.display(), "print view written");
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultEntry;
    use tempfile::tempdir;

    fn view() -> PrintView {
        PrintView {
            title: "Animal Health Report".to_string(),
            heading: "Latest assessment".to_string(),
            entries: vec![ResultEntry {
                label: "Status".to_string(),
                value: "<Critical> & urgent".to_string(),
            }],
        }
    }

    #[test]
    fn test_render_escapes_content() {
        let html = HtmlPrintSink::render(&view());
        assert!(html.contains("<title>Animal Health Report</title>"));
        assert!(html.contains("&lt;Critical&gt; &amp; urgent"));
        assert!(html.contains("font-family: Arial"));
    }

    #[test]
    fn test_open_writes_file() {
        let dir = tempdir().expect("tempdir");
        let mut sink = HtmlPrintSink::new(dir.path().join("report.html"));
        sink.open(&view()).expect("print");
        let written = fs::read_to_string(sink.path()).expect("read back");
        assert!(written.contains("Latest assessment"));
    }

    #[test]
    fn test_open_reports_failure() {
        let dir = tempdir().expect("tempdir");
        let mut sink = HtmlPrintSink::new(dir.path().join("missing").join("report.html"));
        assert!(matches!(sink.open(&view()), Err(CapabilityError::Failed(_))));
    }
}
