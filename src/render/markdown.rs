use super::Bindings;
use crate::model::okr::{Hypothesis, Objective};

pub fn render(bindings: &Bindings<'_>) -> String {
    let mut md = String::from("# Objectives and Key Results\n\n");
    for obj in bindings.objectives {
        md.push_str(&objective_block(obj));
    }
    md
}

fn objective_block(obj: &Objective) -> String {
    let mut md = format!(
        r#"## Objective: {title} (ID: {id})

**State:** {state}

**Link:** {link}

**Objective:** {objective}

**Key Results:**
{key_results}
**Method of Measure:** {method}

**Objective Outcome:** {outcome}

"#,
        title = inline(&obj.title),
        id = obj.id,
        state = inline(&obj.state),
        link = inline(&obj.link),
        objective = inline(&obj.objective),
        key_results = key_result_list(&obj.key_results),
        method = inline(&obj.method_of_measure),
        outcome = inline(&obj.objective_outcome),
    );

    if !obj.hypotheses.is_empty() {
        md.push_str("### Hypotheses\n\n");
        for hyp in &obj.hypotheses {
            md.push_str(&hypothesis_block(hyp));
        }
    }
    md
}

fn key_result_list(key_results: &[String]) -> String {
    key_results.iter().map(|kr| format!("- {}\n", inline(kr))).collect()
}

/// Fold a multi-line value onto one line so it stays inside its labelled
/// paragraph or list item.
fn inline(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn hypothesis_block(hyp: &Hypothesis) -> String {
    format!(
        r#"#### {title} (ID: {id})

- **State:** {state}
- **Hypothesis:** {hypothesis}
- **Hypothesis Context:** {context}
- **Link:** {link}
- **Method of Measuring Hypothesis:** {method}
- **Hypothesis Outcome:** {outcome}

"#,
        title = inline(&hyp.title),
        id = hyp.id,
        state = inline(&hyp.state),
        hypothesis = inline(&hyp.hypothesis),
        context = inline(&hyp.hypothesis_context),
        link = inline(&hyp.link),
        method = inline(&hyp.method_of_measuring_hypothesis),
        outcome = inline(&hyp.hypothesis_outcome),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::okr::OkrDocument;
    use crate::render::tests::sample_document;
    use pretty_assertions::assert_eq;

    fn md(doc: &OkrDocument) -> String {
        render(&Bindings::new(doc))
    }

    fn minimal() -> OkrDocument {
        serde_json::from_str(
            r#"{"objectives":[{"id":1,"title":"T","state":"New","objective":"O","key_results":["K1"],"method_of_measure":"M","objective_outcome":"","link":"http://x","hypotheses":[]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_document_has_fields_and_no_hypotheses_section() {
        let out = md(&minimal());
        assert!(out.contains("T"));
        assert!(out.contains("New"));
        assert!(out.contains("K1"));
        assert!(!out.contains("Hypotheses"));
    }

    #[test]
    fn minimal_document_layout() {
        let expected = concat!(
            "# Objectives and Key Results\n\n",
            "## Objective: T (ID: 1)\n\n",
            "**State:** New\n\n",
            "**Link:** http://x\n\n",
            "**Objective:** O\n\n",
            "**Key Results:**\n",
            "- K1\n\n",
            "**Method of Measure:** M\n\n",
            "**Objective Outcome:** \n\n",
        );
        assert_eq!(md(&minimal()), expected);
    }

    #[test]
    fn hypotheses_listed_in_supplied_order() {
        let out = md(&sample_document());
        assert!(out.contains("### Hypotheses"));
        let first = out.find("#### Badges (ID: 11)").unwrap();
        let second = out.find("#### Reminders (ID: 12)").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_optional_fields_keep_labels() {
        let out = md(&sample_document());
        assert!(out.contains("**Objective Outcome:** \n"));
        assert!(out.contains("- **Hypothesis Context:** \n"));
        assert!(out.contains("- **Hypothesis Outcome:** \n"));
    }

    #[test]
    fn empty_document_is_just_the_heading() {
        let out = md(&OkrDocument::default());
        assert_eq!(out, "# Objectives and Key Results\n\n");
        assert!(!out.contains("Objective:"));
    }

    #[test]
    fn multi_line_values_stay_on_their_labelled_line() {
        let mut doc = minimal();
        let obj = &mut doc.objectives[0];
        obj.objective = "Users come back\n\n## not a heading\r\n".into();
        obj.key_results = vec!["DAU +20%\n- Session".into()];
        obj.hypotheses = vec![Hypothesis {
            id: 5,
            title: "Badges\nv2".into(),
            hypothesis_context: "pilot\n\n**bold**".into(),
            ..Hypothesis::default()
        }];

        let out = md(&doc);
        assert!(out.contains("**Objective:** Users come back ## not a heading\n\n**Key Results:**\n"));
        assert!(out.contains("**Key Results:**\n- DAU +20% - Session\n\n**Method of Measure:** M"));
        assert!(out.contains("#### Badges v2 (ID: 5)\n"));
        assert!(out.contains("- **Hypothesis Context:** pilot **bold**\n- **Link:**"));
        assert!(!out.contains("\n## not a heading"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let doc = sample_document();
        assert_eq!(md(&doc), md(&doc));
    }
}
