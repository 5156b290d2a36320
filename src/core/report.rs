use crate::core::changes::SchemaDiffReport;

/// Renders the comment body for a diff report. Pure and deterministic: the
/// same report and header always yield a byte-identical body. The header is
/// reproduced verbatim as the first line because the locator matches on it.
pub fn render_report(report: &SchemaDiffReport, header: &str) -> String {
    let mut body = String::new();
    body.push_str(header);
    body.push_str("\n\n");
    body.push_str("<details>\n<summary>\nView schema changes\n</summary>\n\n");
    body.push_str("```diff\n");
    body.push_str(&strip_preamble(&report.diff_no_color));
    body.push_str("\n```\n</details>\n");

    if !report.breaking_changes.is_empty() {
        body.push_str("\n### 🚨 Breaking Changes\n\n");
        for change in &report.breaking_changes {
            body.push_str("- ");
            body.push_str(&change.description);
            body.push('\n');
        }
    }

    if !report.dangerous_changes.is_empty() {
        body.push_str("\n### ⚠️ Dangerous Changes\n\n");
        for change in &report.dangerous_changes {
            body.push_str("- ");
            body.push_str(&change.description);
            body.push('\n');
        }
    }

    body
}

/// Drops the two `---`/`+++` preamble lines the diff provider prepends; the
/// remainder is shown unchanged.
fn strip_preamble(diff: &str) -> String {
    diff.lines().skip(2).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::changes::SchemaChange;

    fn report(breaking: Vec<&str>, dangerous: Vec<&str>) -> SchemaDiffReport {
        SchemaDiffReport {
            breaking_changes: breaking.into_iter().map(SchemaChange::new).collect(),
            dangerous_changes: dangerous.into_iter().map(SchemaChange::new).collect(),
            diff: String::new(),
            diff_no_color: "--- old.graphql\n+++ new.graphql\n@@ -1,3 +1,2 @@\n type Query {\n-  version: String\n }\n".to_string(),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = report(vec!["Field `x` was removed"], vec![]);
        assert_eq!(
            render_report(&report, "## Schema Diff"),
            render_report(&report, "## Schema Diff")
        );
    }

    #[test]
    fn header_is_the_first_line() {
        let report = report(vec![], vec![]);
        let body = render_report(&report, "## Schema Diff");
        assert_eq!(body.lines().next(), Some("## Schema Diff"));
        assert!(body.starts_with("## Schema Diff\n"));
    }

    #[test]
    fn preamble_is_stripped_and_remainder_unchanged() {
        let report = report(vec![], vec![]);
        let body = render_report(&report, "# H");
        assert!(!body.contains("--- old.graphql"));
        assert!(!body.contains("+++ new.graphql"));
        assert!(body.contains("```diff\n@@ -1,3 +1,2 @@\n type Query {\n-  version: String\n }\n```"));
    }

    #[test]
    fn empty_lists_omit_their_sections() {
        let report = report(vec![], vec![]);
        let body = render_report(&report, "# H");
        assert!(!body.contains("Breaking Changes"));
        assert!(!body.contains("Dangerous Changes"));
    }

    #[test]
    fn breaking_section_precedes_dangerous_section() {
        let report = report(vec!["a"], vec!["b"]);
        let body = render_report(&report, "# H");
        let breaking = body.find("### 🚨 Breaking Changes").unwrap();
        let dangerous = body.find("### ⚠️ Dangerous Changes").unwrap();
        assert!(breaking < dangerous);
        assert!(body.contains("- a\n"));
        assert!(body.contains("- b\n"));
    }

    #[test]
    fn single_breaking_change_example() {
        let report = report(vec!["field `x` was removed"], vec![]);
        let body = render_report(&report, "## Schema Diff");
        assert!(body.starts_with("## Schema Diff"));
        assert!(body.contains("### 🚨 Breaking Changes\n\n- field `x` was removed\n"));
        assert!(!body.contains("Dangerous Changes"));
    }

    #[test]
    fn collapsible_section_wraps_the_diff() {
        let report = report(vec![], vec![]);
        let body = render_report(&report, "# H");
        assert!(body.contains("<details>\n<summary>\nView schema changes\n</summary>"));
        assert!(body.contains("</details>"));
    }
}
