//! RDF-style triple export.
//!
//! Every edge becomes `(source id, relation, target id)`. Every node
//! attribute becomes `(node id, has<Attr>, literal)`, e.g. `hasTitle`, so
//! attribute values never leak into node ids.

use std::fmt::Write as _;

use serde::Serialize;

use crate::graph::KnowledgeGraph;

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Term {
    /// Another node, by id.
    Node(String),
    /// A literal attribute value.
    Literal(String),
}

impl Term {
    pub fn as_str(&self) -> &str {
        match self {
            Term::Node(s) | Term::Literal(s) => s,
        }
    }
}

/// A `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

/// Reserved predicate for an attribute: `title` → `hasTitle`.
pub fn attribute_predicate(attribute: &str) -> String {
    let mut chars = attribute.chars();
    match chars.next() {
        Some(first) => format!("has{}{}", first.to_uppercase(), chars.as_str()),
        None => "has".to_string(),
    }
}

/// Flattens a graph into triples: attribute triples per node (in node order),
/// then one triple per edge.
pub fn to_triples(graph: &KnowledgeGraph) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(graph.node_count() + graph.edge_count());

    for node in graph.nodes() {
        let subject = node.key.id();
        for (name, value) in &node.attributes {
            triples.push(Triple {
                subject: subject.clone(),
                predicate: attribute_predicate(name),
                object: Term::Literal(value.clone()),
            });
        }
    }

    for edge in graph.edges() {
        triples.push(Triple {
            subject: edge.source.id(),
            predicate: edge.relation.to_string(),
            object: Term::Node(edge.target.id()),
        });
    }

    triples
}

/// Renders triples as N-Triples, resolving ids and predicates against `base_iri`.
pub fn render_ntriples(triples: &[Triple], base_iri: &str) -> String {
    let mut out = String::new();
    for triple in triples {
        let object = match &triple.object {
            Term::Node(id) => iri(base_iri, id),
            Term::Literal(value) => literal(value),
        };
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{} {} {} .",
            iri(base_iri, &triple.subject),
            iri(base_iri, &triple.predicate),
            object
        );
    }
    out
}

/// Renders triples as plain `subject → predicate → object` lines.
pub fn render_facts(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        let _ = writeln!(
            out,
            "{} → {} → {}",
            triple.subject,
            triple.predicate,
            triple.object.as_str()
        );
    }
    out
}

fn iri(base: &str, local: &str) -> String {
    let mut out = String::with_capacity(base.len() + local.len() + 2);
    out.push('<');
    out.push_str(base);
    for ch in local.chars() {
        if ch.is_control() || " <>\"{}|^`\\%".contains(ch) {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{:02X}", byte);
            }
        } else {
            out.push(ch);
        }
    }
    out.push('>');
    out
}

fn literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
