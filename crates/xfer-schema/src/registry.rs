//! # Schema Registry
//!
//! Arena of node schemas addressed by [`SchemaId`], plus the id of the
//! root schema. A registry can only be obtained through
//! [`RegistryBuilder::build`], which enforces the structural rules every
//! later validation relies on:
//!
//! - schema ids are unique, and field names are unique within a schema;
//! - every field descriptor satisfies its own invariants (optionality
//!   agrees with `Required`, constraints fit the target type);
//! - every nested reference, and the root, resolves;
//! - the reference graph is acyclic, so validation always terminates.
//!
//! Violating any of these is a startup error, never a runtime surprise.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::constraint::Constraint;
use crate::descriptor::{FieldDescriptor, FieldType};
use crate::error::SchemaDefinitionError;
use crate::schema::{NodeSchema, SchemaId};

/// Immutable, verified set of node schemas with a designated root.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    root: NodeSchema,
    nodes: BTreeMap<SchemaId, NodeSchema>,
}

impl SchemaRegistry {
    /// Start building a registry whose root schema is `root`.
    pub fn builder(root: impl Into<SchemaId>) -> RegistryBuilder {
        RegistryBuilder {
            root: root.into(),
            nodes: Vec::new(),
        }
    }

    /// A registry whose root has no fields. Useful for evaluating single
    /// fields in isolation.
    pub fn empty() -> Self {
        Self {
            root: NodeSchema::new("Empty"),
            nodes: BTreeMap::new(),
        }
    }

    /// The root schema.
    pub fn root(&self) -> &NodeSchema {
        &self.root
    }

    /// Look up a schema by id.
    pub fn get(&self, id: &SchemaId) -> Option<&NodeSchema> {
        if self.root.id() == id {
            Some(&self.root)
        } else {
            self.nodes.get(id)
        }
    }

    /// All schemas, root first, the rest ordered by id.
    pub fn schemas(&self) -> impl Iterator<Item = &NodeSchema> {
        std::iter::once(&self.root).chain(self.nodes.values())
    }

    /// Number of schemas, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() + 1
    }

    /// Always false: a registry has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Render the schema tree, starting at the root, as indented text.
    pub fn render_tree(&self) -> String {
        self.render(false)
    }

    /// Like [`render_tree`](Self::render_tree), with each line followed by
    /// the node or field description, when there is one.
    pub fn render_annotated_tree(&self) -> String {
        self.render(true)
    }

    fn render(&self, annotate: bool) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}", self.root.id());
        if annotate {
            push_note(&mut out, self.root.description());
        }
        out.push('\n');
        self.render_fields(&self.root, 1, annotate, &mut out);
        out
    }

    fn render_fields(&self, node: &NodeSchema, depth: usize, annotate: bool, out: &mut String) {
        let indent = "  ".repeat(depth);
        for field in node.fields() {
            let presence = if field.is_optional() { "optional" } else { "required" };
            let checks: Vec<String> = field
                .constraints()
                .iter()
                .filter(|c| {
                    !matches!(
                        c,
                        Constraint::Required | Constraint::Nested(_) | Constraint::DateFormat(_)
                    )
                })
                .map(ToString::to_string)
                .collect();
            let _ = write!(out, "{indent}{}: {} {presence}", field.name(), field.target());
            if !checks.is_empty() {
                let _ = write!(out, " [{}]", checks.join(", "));
            }
            let child = field.nested_schema().and_then(|id| self.get(id));
            if annotate {
                let note = field
                    .description()
                    .or_else(|| child.and_then(NodeSchema::description));
                push_note(out, note);
            }
            out.push('\n');
            if let Some(child) = child {
                self.render_fields(child, depth + 1, annotate, out);
            }
        }
    }
}

fn push_note(out: &mut String, note: Option<&str>) {
    if let Some(note) = note {
        let _ = write!(out, "  # {note}");
    }
}

/// Accumulates node schemas and verifies them on [`build`](Self::build).
#[derive(Debug)]
pub struct RegistryBuilder {
    root: SchemaId,
    nodes: Vec<NodeSchema>,
}

impl RegistryBuilder {
    /// Add a node schema.
    pub fn node(mut self, schema: NodeSchema) -> Self {
        self.nodes.push(schema);
        self
    }

    /// Verify every structural rule and produce the registry.
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaDefinitionError` found. Checks run in this
    /// order: duplicate schema ids, per-schema field checks, reference
    /// resolution, root resolution, cycle detection.
    pub fn build(self) -> Result<SchemaRegistry, SchemaDefinitionError> {
        let mut nodes: BTreeMap<SchemaId, NodeSchema> = BTreeMap::new();
        for node in self.nodes {
            check_fields(&node)?;
            let id = node.id().clone();
            if nodes.insert(id.clone(), node).is_some() {
                return Err(SchemaDefinitionError::DuplicateSchema(id.to_string()));
            }
        }

        for node in nodes.values() {
            for target in node.fields().iter().filter_map(FieldDescriptor::nested_schema) {
                if !nodes.contains_key(target) {
                    return Err(SchemaDefinitionError::UnknownSchema {
                        from: node.id().to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }

        if !nodes.contains_key(&self.root) {
            return Err(SchemaDefinitionError::UnknownSchema {
                from: "(root)".to_string(),
                target: self.root.to_string(),
            });
        }

        detect_cycles(&nodes)?;

        let root = nodes
            .remove(&self.root)
            .ok_or_else(|| SchemaDefinitionError::UnknownSchema {
                from: "(root)".to_string(),
                target: self.root.to_string(),
            })?;

        tracing::debug!(root = %root.id(), schemas = nodes.len() + 1, "schema registry built");
        Ok(SchemaRegistry { root, nodes })
    }
}

fn check_fields(node: &NodeSchema) -> Result<(), SchemaDefinitionError> {
    let mut seen = BTreeSet::new();
    for field in node.fields() {
        if !seen.insert(field.name()) {
            return Err(SchemaDefinitionError::DuplicateField {
                schema: node.id().to_string(),
                field: field.name().to_string(),
            });
        }
        field.check_invariants(node.id())?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over nested references. Reports the first cycle
/// found as `A -> B -> A`.
fn detect_cycles(nodes: &BTreeMap<SchemaId, NodeSchema>) -> Result<(), SchemaDefinitionError> {
    fn visit<'a>(
        id: &'a SchemaId,
        nodes: &'a BTreeMap<SchemaId, NodeSchema>,
        marks: &mut BTreeMap<&'a SchemaId, Mark>,
        stack: &mut Vec<&'a SchemaId>,
    ) -> Result<(), SchemaDefinitionError> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|s| *s == id).unwrap_or(0);
                let mut chain: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                chain.push(id.to_string());
                return Err(SchemaDefinitionError::Cycle(chain.join(" -> ")));
            }
            None => {}
        }

        marks.insert(id, Mark::Visiting);
        stack.push(id);
        if let Some(node) = nodes.get(id) {
            for target in node.fields().iter().filter_map(|f| match f.target() {
                FieldType::Record(t) => Some(t),
                _ => None,
            }) {
                visit(target, nodes, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(id, Mark::Done);
        Ok(())
    }

    let mut marks = BTreeMap::new();
    let mut stack = Vec::new();
    for id in nodes.keys() {
        visit(id, nodes, &mut marks, &mut stack)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> NodeSchema {
        NodeSchema::new(id).field(FieldDescriptor::text("name").required())
    }

    #[test]
    fn builds_a_tree() {
        let reg = SchemaRegistry::builder("Root")
            .node(NodeSchema::new("Root").field(FieldDescriptor::record("child", "Child")))
            .node(leaf("Child"))
            .build()
            .unwrap();
        assert_eq!(reg.root().id().as_str(), "Root");
        assert!(reg.get(&SchemaId::from("Child")).is_some());
        assert!(reg.get(&SchemaId::from("Root")).is_some());
        assert_eq!(reg.len(), 2);
        let tree = reg.render_tree();
        assert!(tree.contains("child: record(Child) optional"));
        assert!(tree.contains("    name: text required"));
    }

    #[test]
    fn annotated_tree_shows_descriptions() {
        let reg = SchemaRegistry::builder("Root")
            .node(
                NodeSchema::new("Root")
                    .describe("Top level")
                    .field(FieldDescriptor::record("child", "Child"))
                    .field(FieldDescriptor::text("code").max_length(3).describe("Short code")),
            )
            .node(leaf("Child").describe("Nested party"))
            .build()
            .unwrap();
        let tree = reg.render_annotated_tree();
        assert!(tree.starts_with("Root  # Top level\n"));
        assert!(tree.contains("child: record(Child) optional  # Nested party\n"));
        assert!(tree.contains("code: text optional [max_length(3)]  # Short code\n"));
        assert!(tree.contains("    name: text required\n"));
        assert!(!reg.render_tree().contains('#'));
    }

    #[test]
    fn rejects_unknown_reference() {
        let err = SchemaRegistry::builder("Root")
            .node(NodeSchema::new("Root").field(FieldDescriptor::record("x", "Missing")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::UnknownSchema { ref target, .. } if target == "Missing"));
    }

    #[test]
    fn rejects_unknown_root() {
        let err = SchemaRegistry::builder("Nope").node(leaf("Root")).build().unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::UnknownSchema { ref from, .. } if from == "(root)"));
    }

    #[test]
    fn rejects_cycles() {
        let err = SchemaRegistry::builder("A")
            .node(NodeSchema::new("A").field(FieldDescriptor::record("b", "B")))
            .node(NodeSchema::new("B").field(FieldDescriptor::record("a", "A")))
            .build()
            .unwrap_err();
        let SchemaDefinitionError::Cycle(chain) = err else {
            panic!("expected cycle");
        };
        assert_eq!(chain, "A -> B -> A");
    }

    #[test]
    fn rejects_self_reference() {
        let err = SchemaRegistry::builder("A")
            .node(NodeSchema::new("A").field(FieldDescriptor::record("me", "A")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::Cycle(_)));
    }

    #[test]
    fn rejects_duplicates() {
        let err = SchemaRegistry::builder("A")
            .node(leaf("A"))
            .node(leaf("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::DuplicateSchema(_)));

        let err = SchemaRegistry::builder("A")
            .node(
                NodeSchema::new("A")
                    .field(FieldDescriptor::text("name"))
                    .field(FieldDescriptor::text("name")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::DuplicateField { .. }));
    }
}
