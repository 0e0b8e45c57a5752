//! Strict parsers for the two hub document types the gate consumes: the
//! project index at `/index.xml` and per-analysis warning reports.
//!
//! Parsing is all-or-nothing. A document with the wrong root element or a
//! warning without a significance is rejected outright; we never hand the
//! evaluator a partially-parsed report.

use roxmltree::{Document, Node};

use crate::error::{Error, Result};

/// One project as listed by the hub index. `url` is relative to the hub base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub url: String,
}

/// The hub's `/index.xml` document.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    pub projects: Vec<Project>,
}

impl ProjectIndex {
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !root.has_tag_name("projects") {
            return Err(Error::Parse(format!(
                "expected a <projects> index document, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut projects = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("project")) {
            projects.push(Project {
                name: required_field(&node, "name")?,
                url: required_field(&node, "url")?,
            });
        }

        Ok(ProjectIndex { projects })
    }

    /// Exact-name lookup. An absent project is a configuration error, not an
    /// empty result; the caller named a project the hub does not have.
    pub fn project_by_name(&self, name: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::Config(format!("project '{name}' not found in the hub index")))
    }
}

/// One hub warning. Only `significance` feeds the gate conditions; the rest
/// identifies the warning for downstream reporting.
#[derive(Debug, Clone)]
pub struct Warning {
    pub significance: String,
    pub rank: Option<String>,
    pub warning_class: Option<String>,
    pub file: Option<String>,
    pub line: Option<String>,
    pub procedure: Option<String>,
    pub score: Option<String>,
    pub url: Option<String>,
}

/// A parsed analysis report: one instance per fetched URL+filter combination.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub warnings: Vec<Warning>,
}

impl Analysis {
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !root.has_tag_name("analysis") {
            return Err(Error::Parse(format!(
                "expected an <analysis> report document, found <{}>",
                root.tag_name().name()
            )));
        }

        // Hubs emit warnings either inside a <warnings> container or directly
        // under the root; descendant traversal accepts both shapes.
        let mut warnings = Vec::new();
        for node in root.descendants().filter(|n| n.has_tag_name("warning")) {
            warnings.push(Warning {
                significance: required_field(&node, "significance")?,
                rank: field(&node, "rank"),
                warning_class: field(&node, "class"),
                file: field(&node, "file"),
                line: field(&node, "line"),
                procedure: field(&node, "procedure"),
                score: field(&node, "score"),
                url: field(&node, "url"),
            });
        }

        Ok(Analysis { warnings })
    }
}

/// Hub documents carry fields as attributes or as child elements depending
/// on hub version; accept either.
fn field(node: &Node, name: &str) -> Option<String> {
    if let Some(value) = node.attribute(name) {
        return Some(value.to_string());
    }
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
}

fn required_field(node: &Node, name: &str) -> Result<String> {
    field(node, name).ok_or_else(|| {
        Error::Parse(format!(
            "<{}> element is missing '{name}'",
            node.tag_name().name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<?xml version="1.0"?>
<projects>
  <project><name>coreutils</name><url>/analysis/11.xml</url></project>
  <project><name>kernel</name><url>/analysis/42.xml</url></project>
</projects>"#;

    #[test]
    fn parses_project_index() {
        let index = ProjectIndex::parse(INDEX).unwrap();
        assert_eq!(index.projects.len(), 2);
        assert_eq!(
            index.project_by_name("kernel").unwrap(),
            &Project {
                name: "kernel".to_string(),
                url: "/analysis/42.xml".to_string(),
            }
        );
    }

    #[test]
    fn missing_project_is_a_config_error() {
        let index = ProjectIndex::parse(INDEX).unwrap();
        match index.project_by_name("no-such-project") {
            Err(Error::Config(msg)) => assert!(msg.contains("no-such-project")),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn parses_attribute_style_warnings() {
        let report = Analysis::parse(
            r#"<analysis><warnings>
                 <warning significance="red" rank="1" file="a.c" line="10"/>
                 <warning significance="yellow"/>
               </warnings></analysis>"#,
        )
        .unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].significance, "red");
        assert_eq!(report.warnings[0].file.as_deref(), Some("a.c"));
        assert_eq!(report.warnings[1].rank, None);
    }

    #[test]
    fn parses_element_style_warnings_without_container() {
        let report = Analysis::parse(
            r#"<analysis>
                 <warning><significance>red</significance><procedure>main</procedure></warning>
               </analysis>"#,
        )
        .unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].procedure.as_deref(), Some("main"));
    }

    #[test]
    fn warning_without_significance_is_rejected() {
        let result = Analysis::parse(r#"<analysis><warning rank="1"/></analysis>"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn wrong_root_element_is_rejected() {
        assert!(matches!(
            Analysis::parse("<projects/>"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            ProjectIndex::parse("<analysis/>"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(matches!(
            Analysis::parse("<analysis><warning"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn empty_report_parses_to_no_warnings() {
        let report = Analysis::parse("<analysis/>").unwrap();
        assert!(report.warnings.is_empty());
    }
}
