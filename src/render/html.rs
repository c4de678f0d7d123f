//! Word-compatible HTML. Plain tables and paragraphs, Office namespaces,
//! inline styles only, so the file opens cleanly in a word processor and
//! prints well through the PDF engine.

use super::Bindings;
use crate::model::okr::{Hypothesis, Objective};

const STYLE: &str = r#"body { font-family: Calibri, Arial, sans-serif; font-size: 11pt; }
h1 { font-size: 20pt; }
h2 { font-size: 16pt; margin-top: 18pt; page-break-before: auto; }
h3 { font-size: 13pt; }
table { border-collapse: collapse; width: 100%; margin-bottom: 12pt; }
th, td { border: 1px solid #999999; padding: 4pt; vertical-align: top; text-align: left; }
th { background: #e7e6e6; }
table.fields th { width: 25%; }
p.generated { color: #666666; font-size: 9pt; }"#;

pub fn render(bindings: &Bindings<'_>) -> String {
    let body: String = bindings.objectives.iter().map(objective_section).collect();
    format!(
        r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word" xmlns="http://www.w3.org/TR/REC-html40">
<head>
<meta charset="utf-8">
<title>Objectives and Key Results</title>
<!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View><w:Zoom>100</w:Zoom></w:WordDocument></xml><![endif]-->
<style>
{STYLE}
</style>
</head>
<body>
<h1>Objectives and Key Results</h1>
<p class="generated">Generated {generated_at}</p>
{body}</body>
</html>
"#,
        generated_at = escape(&bindings.generated_at),
    )
}

fn objective_section(obj: &Objective) -> String {
    let key_results = if obj.key_results.is_empty() {
        String::new()
    } else {
        let items: String = obj
            .key_results
            .iter()
            .map(|kr| format!("<li>{}</li>", escape(kr)))
            .collect();
        format!("<ul>{items}</ul>")
    };

    let mut html = format!(
        r#"<h2>Objective: {title} (ID: {id})</h2>
<table class="fields">
{state}{link}{objective}<tr><th>Key Results</th><td>{key_results}</td></tr>
{method}{outcome}</table>
"#,
        title = escape(&obj.title),
        id = obj.id,
        state = field_row("State", &escape(&obj.state)),
        link = field_row("Link", &link(&obj.link)),
        objective = field_row("Objective", &escape(&obj.objective)),
        method = field_row("Method of Measure", &escape(&obj.method_of_measure)),
        outcome = field_row("Objective Outcome", &escape(&obj.objective_outcome)),
    );

    if !obj.hypotheses.is_empty() {
        html.push_str(
            "<h3>Hypotheses</h3>\n<table class=\"hypotheses\">\n<tr><th>ID</th><th>Title</th><th>State</th><th>Hypothesis</th><th>Hypothesis Context</th><th>Link</th><th>Method of Measuring Hypothesis</th><th>Hypothesis Outcome</th></tr>\n",
        );
        for hyp in &obj.hypotheses {
            html.push_str(&hypothesis_row(hyp));
        }
        html.push_str("</table>\n");
    }
    html
}

fn hypothesis_row(hyp: &Hypothesis) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        hyp.id,
        escape(&hyp.title),
        escape(&hyp.state),
        escape(&hyp.hypothesis),
        escape(&hyp.hypothesis_context),
        link(&hyp.link),
        escape(&hyp.method_of_measuring_hypothesis),
        escape(&hyp.hypothesis_outcome),
    )
}

fn field_row(label: &str, value: &str) -> String {
    format!("<tr><th>{label}</th><td>{value}</td></tr>\n")
}

fn link(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let url = escape(url);
    format!(r#"<a href="{url}">{url}</a>"#)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::okr::OkrDocument;
    use crate::render::tests::sample_document;

    fn html(doc: &OkrDocument) -> String {
        render(&Bindings::new(doc))
    }

    #[test]
    fn is_word_compatible_document() {
        let out = html(&sample_document());
        assert!(out.starts_with("<html xmlns:o=\"urn:schemas-microsoft-com:office:office\""));
        assert!(out.contains("<meta charset=\"utf-8\">"));
        assert!(out.trim_end().ends_with("</html>"));
    }

    #[test]
    fn objective_fields_render_as_table_rows() {
        let out = html(&sample_document());
        assert!(out.contains("<h2>Objective: Grow engagement (ID: 1)</h2>"));
        assert!(out.contains("<tr><th>State</th><td>Active</td></tr>"));
        assert!(out.contains("<li>DAU +20%</li><li>Session +10%</li>"));
        assert!(out.contains("<tr><th>Objective Outcome</th><td></td></tr>"));
    }

    #[test]
    fn hypotheses_rows_follow_supplied_order() {
        let out = html(&sample_document());
        let first = out.find("<td>Badges</td>").unwrap();
        let second = out.find("<td>Reminders</td>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn no_hypotheses_table_when_empty() {
        let mut doc = sample_document();
        doc.objectives[0].hypotheses.clear();
        assert!(!html(&doc).contains("Hypotheses"));
    }

    #[test]
    fn escapes_markup_in_values() {
        let mut doc = sample_document();
        doc.objectives[0].title = "R&D <fast> \"now\"".into();
        let out = html(&doc);
        assert!(out.contains("R&amp;D &lt;fast&gt; &quot;now&quot;"));
        assert!(!out.contains("<fast>"));
    }

    #[test]
    fn links_become_anchors() {
        let out = html(&sample_document());
        assert!(out.contains(
            r#"<a href="https://dev.azure.com/acme/okrs/_workitems/edit/1">"#
        ));
    }
}
