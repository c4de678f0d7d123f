pub mod html;
pub mod markdown;
pub mod pdf;

use std::collections::HashMap;
use std::fmt;

use crate::error::RenderError;
use crate::model::okr::{Objective, OkrDocument};
use pdf::PdfEngine;

pub const MARKDOWN_TEMPLATE: &str = "okr_markdown";
pub const DOC_TEMPLATE: &str = "okr_doc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Markdown,
    /// Word-compatible HTML
    Doc,
    Pdf,
    RawJson,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Doc => "html",
            OutputFormat::Pdf => "pdf",
            OutputFormat::RawJson => "json",
        }
    }

    /// Human label used in confirmations, e.g. "OKR Markdown report".
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "Markdown",
            OutputFormat::Doc => "Word-compatible HTML",
            OutputFormat::Pdf => "PDF",
            OutputFormat::RawJson => "JSON",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Doc => "doc",
            OutputFormat::Pdf => "pdf",
            OutputFormat::RawJson => "raw-json",
        })
    }
}

/// Values a template can draw on.
pub struct Bindings<'a> {
    pub objectives: &'a [Objective],
    pub generated_at: String,
}

impl<'a> Bindings<'a> {
    pub fn new(document: &'a OkrDocument) -> Self {
        Self {
            objectives: &document.objectives,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub type TemplateFn = fn(&Bindings<'_>) -> String;

/// Named templates, looked up per render.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<&'static str, TemplateFn>,
}

impl TemplateRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(MARKDOWN_TEMPLATE, markdown::render);
        registry.register(DOC_TEMPLATE, html::render);
        registry
    }

    pub fn register(&mut self, id: &'static str, template: TemplateFn) {
        self.templates.insert(id, template);
    }

    pub fn render(&self, id: &str, bindings: &Bindings<'_>) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(id)
            .ok_or_else(|| RenderError::TemplateMissing(id.to_string()))?;
        Ok(template(bindings))
    }
}

/// Turns a canonical document into output bytes.
///
/// Every entry point degrades to an empty result and logs on failure; the
/// caller decides what an empty result means.
pub struct DocumentRenderer {
    templates: TemplateRegistry,
    pdf: Box<dyn PdfEngine>,
}

impl DocumentRenderer {
    pub fn new(templates: TemplateRegistry, pdf: Box<dyn PdfEngine>) -> Self {
        Self { templates, pdf }
    }

    pub fn render_markdown(&self, document: &OkrDocument) -> String {
        self.render_template(MARKDOWN_TEMPLATE, document, "markdown")
    }

    pub fn render_html(&self, document: &OkrDocument) -> String {
        self.render_template(DOC_TEMPLATE, document, "word-compatible HTML")
    }

    pub async fn render_pdf(&self, document: &OkrDocument) -> Vec<u8> {
        let html = self.render_html(document);
        if html.is_empty() {
            tracing::error!("no HTML to convert; skipping PDF export");
            return Vec::new();
        }
        match self.pdf.render_pdf(&html).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(engine = self.pdf.name(), "Failed to generate PDF: {e}");
                Vec::new()
            }
        }
    }

    pub fn render_json(&self, document: &OkrDocument) -> String {
        render_json(document)
    }

    pub async fn render(&self, format: OutputFormat, document: &OkrDocument) -> Vec<u8> {
        match format {
            OutputFormat::Markdown => self.render_markdown(document).into_bytes(),
            OutputFormat::Doc => self.render_html(document).into_bytes(),
            OutputFormat::Pdf => self.render_pdf(document).await,
            OutputFormat::RawJson => self.render_json(document).into_bytes(),
        }
    }

    fn render_template(&self, id: &str, document: &OkrDocument, what: &str) -> String {
        match self.templates.render(id, &Bindings::new(document)) {
            Ok(out) => out,
            Err(e) => {
                tracing::error!("Failed to format {what}: {e}");
                String::new()
            }
        }
    }
}

/// Pretty JSON with two-space indent and declaration-order keys.
pub fn render_json(document: &OkrDocument) -> String {
    match serde_json::to_string_pretty(document) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to format JSON: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::okr::Hypothesis;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    /// Engine that echoes the HTML back, or fails on demand.
    pub struct FakePdf {
        pub fail: bool,
    }

    #[async_trait]
    impl PdfEngine for FakePdf {
        fn name(&self) -> &str {
            "fake"
        }

        async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
            if self.fail {
                return Err(RenderError::Pdf("engine crashed".into()));
            }
            let mut out = b"%PDF-1.4\n".to_vec();
            out.extend_from_slice(html.as_bytes());
            Ok(out)
        }
    }

    pub fn sample_document() -> OkrDocument {
        OkrDocument {
            objectives: vec![Objective {
                id: 1,
                title: "Grow engagement".into(),
                state: "Active".into(),
                objective: "Users come back weekly".into(),
                key_results: vec!["DAU +20%".into(), "Session +10%".into()],
                method_of_measure: "Analytics".into(),
                objective_outcome: String::new(),
                link: "https://dev.azure.com/acme/okrs/_workitems/edit/1".into(),
                hypotheses: vec![
                    Hypothesis {
                        id: 11,
                        title: "Badges".into(),
                        state: "Testing".into(),
                        hypothesis: "Badges boost DAU".into(),
                        ..Default::default()
                    },
                    Hypothesis {
                        id: 12,
                        title: "Reminders".into(),
                        state: "New".into(),
                        hypothesis: "Reminders lift sessions".into(),
                        ..Default::default()
                    },
                ],
            }],
        }
    }

    fn renderer(fail_pdf: bool) -> DocumentRenderer {
        DocumentRenderer::new(
            TemplateRegistry::builtin(),
            Box::new(FakePdf { fail: fail_pdf }),
        )
    }

    #[test]
    fn json_round_trip_is_stable() {
        let r = renderer(false);
        let doc = sample_document();
        let first = r.render_json(&doc);
        let reparsed: OkrDocument = serde_json::from_str(&first).unwrap();
        assert_eq!(r.render_json(&reparsed), first);
    }

    #[test]
    fn json_uses_two_space_indent_and_field_order() {
        let json = render_json(&sample_document());
        assert!(json.starts_with("{\n  \"objectives\": [\n    {\n      \"id\": 1,"));
        let title = json.find("\"title\"").unwrap();
        let hypotheses = json.find("\"hypotheses\"").unwrap();
        assert!(title < hypotheses);
    }

    #[test]
    fn missing_template_degrades_to_empty() {
        let r = DocumentRenderer::new(TemplateRegistry::default(), Box::new(FakePdf { fail: false }));
        assert_eq!(r.render_markdown(&sample_document()), "");
        assert_eq!(r.render_html(&sample_document()), "");
    }

    #[test]
    fn registry_reports_missing_template() {
        let doc = sample_document();
        let err = TemplateRegistry::default()
            .render("okr_slides", &Bindings::new(&doc))
            .unwrap_err();
        assert_eq!(err.to_string(), "template 'okr_slides' not found");
    }

    #[tokio::test]
    async fn pdf_is_built_from_html() {
        let bytes = renderer(false).render_pdf(&sample_document()).await;
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF"));
        assert!(text.contains("<table"));
    }

    #[tokio::test]
    async fn pdf_engine_failure_yields_no_bytes() {
        assert!(renderer(true).render_pdf(&sample_document()).await.is_empty());
    }

    #[tokio::test]
    async fn pdf_without_html_template_yields_no_bytes() {
        let r = DocumentRenderer::new(TemplateRegistry::default(), Box::new(FakePdf { fail: false }));
        assert!(r.render_pdf(&sample_document()).await.is_empty());
    }

    #[tokio::test]
    async fn render_dispatches_by_format() {
        let r = renderer(false);
        let doc = sample_document();
        let md = r.render(OutputFormat::Markdown, &doc).await;
        assert!(String::from_utf8(md).unwrap().starts_with("# Objectives and Key Results"));
        let json = r.render(OutputFormat::RawJson, &doc).await;
        assert!(String::from_utf8(json).unwrap().starts_with('{'));
    }

    #[test]
    fn extensions_match_formats() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Doc.extension(), "html");
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::RawJson.extension(), "json");
        assert_eq!(OutputFormat::RawJson.to_string(), "raw-json");
    }
}
