//! GraphML export for graph tooling (Gephi, yEd, networkx).

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::graph::KnowledgeGraph;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
"#;

/// Serializes a graph as a directed GraphML document.
///
/// Keys are numbered `d0..dn` in the networkx manner: `d0` is the node kind
/// (`label`), followed by one key per attribute name in sorted order, and a
/// final edge key for the relation.
pub fn to_graphml(graph: &KnowledgeGraph) -> String {
    let attribute_names: BTreeSet<&str> = graph
        .nodes()
        .flat_map(|n| n.attributes.keys().map(String::as_str))
        .collect();

    let mut out = String::from(HEADER);
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        r#"  <key id="d0" for="node" attr.name="label" attr.type="string"/>"#
    );
    let attribute_keys: Vec<(&str, String)> = attribute_names
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, format!("d{}", i + 1)))
        .collect();
    for (name, key) in &attribute_keys {
        let _ = writeln!(
            out,
            r#"  <key id="{}" for="node" attr.name="{}" attr.type="string"/>"#,
            key,
            escape(name)
        );
    }
    let relation_key = format!("d{}", attribute_keys.len() + 1);
    let _ = writeln!(
        out,
        r#"  <key id="{}" for="edge" attr.name="relation" attr.type="string"/>"#,
        relation_key
    );

    out.push_str("  <graph edgedefault=\"directed\">\n");
    for node in graph.nodes() {
        let _ = writeln!(out, r#"    <node id="{}">"#, escape(&node.key.id()));
        let _ = writeln!(out, r#"      <data key="d0">{}</data>"#, node.kind());
        for (name, key) in &attribute_keys {
            if let Some(value) = node.attribute(name) {
                let _ = writeln!(out, r#"      <data key="{}">{}</data>"#, key, escape(value));
            }
        }
        out.push_str("    </node>\n");
    }
    for edge in graph.edges() {
        let _ = writeln!(
            out,
            r#"    <edge source="{}" target="{}">"#,
            escape(&edge.source.id()),
            escape(&edge.target.id())
        );
        let _ = writeln!(
            out,
            r#"      <data key="{}">{}</data>"#,
            relation_key, edge.relation
        );
        out.push_str("    </edge>\n");
    }
    out.push_str("  </graph>\n</graphml>\n");
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => out.push(char::REPLACEMENT_CHARACTER),
            _ => out.push(ch),
        }
    }
    out
}

/// Characters XML 1.0 allows in a document.
fn is_xml_char(c: char) -> bool {
    let code = c as u32;
    (code >= 0x20 && code != 0xFFFE && code != 0xFFFF) || matches!(c, '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::models::Record;

    #[test]
    fn test_graphml_structure() {
        let graph = build(&[Record::new("1")
            .with_title("Tax & Spend <Amendment>")
            .with_category("Economy")
            .with_act(true)]);
        let xml = to_graphml(&graph);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<key id="d0" for="node" attr.name="label""#));
        // Attribute keys are sorted: name, title.
        assert!(xml.contains(r#"<key id="d1" for="node" attr.name="name""#));
        assert!(xml.contains(r#"<key id="d2" for="node" attr.name="title""#));
        assert!(xml.contains(r#"<key id="d3" for="edge" attr.name="relation""#));
        assert!(xml.contains(r#"<node id="Bill_1">"#));
        assert!(xml.contains("Tax &amp; Spend &lt;Amendment&gt;"));
        assert!(xml.contains(r#"<edge source="Bill_1" target="Outcome_Passed">"#));
        assert!(xml.contains(r#"<data key="d3">HAS_OUTCOME</data>"#));
        assert_eq!(xml.matches("<node ").count(), graph.node_count());
        assert_eq!(xml.matches("<edge ").count(), graph.edge_count());
        assert!(xml.trim_end().ends_with("</graphml>"));
    }

    #[test]
    fn test_control_characters_replaced() {
        let graph = build(&[Record::new("1").with_title("A\u{1}B\tC")]);
        let xml = to_graphml(&graph);
        assert!(!xml.contains('\u{1}'));
        assert!(xml.contains("A\u{FFFD}B\tC"));
    }

    #[test]
    fn test_empty_graph_is_valid_document() {
        let xml = to_graphml(&build(&[]));
        assert!(xml.contains(r#"<key id="d1" for="edge" attr.name="relation""#));
        assert!(xml.contains("<graph edgedefault=\"directed\">"));
    }
}
