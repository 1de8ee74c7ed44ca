//! Translation of validator error trees into field-addressed details.
//!
//! Each [`ErrorNode`] is matched against the schema document by walking its
//! keyword path. The first terminal keyword found on the way decides the
//! message, preferring the authored `description` of the node that owns the
//! keyword. Nodes without a terminal keyword hand over to their causes.

use serde_json::Value;

use crate::detail::{DetailSet, ErrorDetail, ValidationError};
use crate::document::Schema;
use crate::report::ErrorNode;

/// Keywords whose failure is reported directly, ending the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Required,
    Minimum,
    Maximum,
    MaxItems,
    Pattern,
    Enum,
}

impl Terminal {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let terminal = match keyword {
            "required" => Self::Required,
            "minimum" => Self::Minimum,
            "maximum" => Self::Maximum,
            "maxItems" => Self::MaxItems,
            "pattern" => Self::Pattern,
            "enum" => Self::Enum,
            _ => return None,
        };
        Some(terminal)
    }

    fn render(self, node: &Schema, raw: &str) -> String {
        match self {
            Self::Pattern => format!(
                "must match pattern `{}`",
                node.pattern.as_deref().unwrap_or_default()
            ),
            Self::Enum => format!("must be one of `{}`", enum_values(&node.enum_)),
            _ => raw.to_string(),
        }
    }
}

// Keywords the engine accepts without special wording.
const PASS_THROUGH_KEYWORDS: [&str; 16] = [
    "type",
    "format",
    "minLength",
    "maxLength",
    "minItems",
    "uniqueItems",
    "const",
    "additionalProperties",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minProperties",
    "maxProperties",
    "propertyNames",
    "contains",
    "dependencies",
];

/// One step of a keyword path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'p> {
    /// `properties/<key>`
    Property(&'p str),
    /// `allOf/<i>`, `anyOf/<i>` or `oneOf/<i>`
    Branch(&'p str, usize),
    /// `items`, `not`, `if`, `then` or `else`
    Child(&'p str),
}

/// Advance the cursor by one segment. `None` when the document has no such node.
pub fn descend<'s>(cursor: &'s Schema, segment: Segment<'_>) -> Option<&'s Schema> {
    match segment {
        Segment::Property(key) => cursor.property(key),
        Segment::Branch(keyword, index) => cursor.branch(keyword, index),
        Segment::Child(keyword) => cursor.child(keyword),
    }
}

enum Walk<'s> {
    Terminal(&'s Schema, Terminal),
    Open,
}

/// Classify one node without looking at its causes.
///
/// Returns the detail when the keyword path ends in a terminal keyword.
///
/// # Panics
///
/// Panics when the keyword path names a keyword outside the supported
/// vocabulary or does not match the document.
pub fn classify(node: &ErrorNode, schema: &Schema) -> Option<ErrorDetail> {
    match walk(schema, &node.keyword_path) {
        Walk::Terminal(owner, terminal) => {
            let message = owner
                .description
                .clone()
                .unwrap_or_else(|| terminal.render(owner, &node.message));
            Some(detail_at(&node.instance_path, message))
        }
        Walk::Open => None,
    }
}

/// Translate an error tree into a sorted, de-duplicated error.
pub fn translate(root: &ErrorNode, schema: &Schema) -> ValidationError {
    let mut details = DetailSet::new();
    collect(root, schema, &mut details);
    details.into_error()
}

fn collect(node: &ErrorNode, schema: &Schema, details: &mut DetailSet) {
    if let Some(detail) = classify(node, schema) {
        for message in detail.messages {
            details.push(detail.kind, &detail.field, message);
        }
        return;
    }

    if node.causes.is_empty() {
        if !node.message.is_empty() {
            let detail = detail_at(&node.instance_path, node.message.clone());
            for message in detail.messages {
                details.push(detail.kind, &detail.field, message);
            }
        }
        return;
    }

    for cause in &node.causes {
        collect(cause, schema, details);
    }
}

fn walk<'s>(schema: &'s Schema, keyword_path: &str) -> Walk<'s> {
    let segments = pointer_segments(keyword_path);
    let mut cursor = schema;
    let mut iter = segments.iter().map(String::as_str);

    while let Some(segment) = iter.next() {
        let step = match segment {
            "properties" => match iter.next() {
                Some(key) => Segment::Property(key),
                None => return Walk::Open,
            },
            "allOf" | "anyOf" | "oneOf" => match iter.next() {
                Some(index) => {
                    let index = index.parse().unwrap_or_else(|_| {
                        panic!("invalid {segment} index '{index}' in keyword path '{keyword_path}'")
                    });
                    Segment::Branch(segment, index)
                }
                // the combinator as a whole failed; its causes say why
                None => return Walk::Open,
            },
            "items" | "not" | "if" | "then" | "else" => Segment::Child(segment),
            keyword => {
                if let Some(terminal) = Terminal::from_keyword(keyword) {
                    return Walk::Terminal(cursor, terminal);
                }
                if PASS_THROUGH_KEYWORDS.contains(&keyword) {
                    return Walk::Open;
                }
                panic!("unsupported schema keyword '{keyword}' in keyword path '{keyword_path}'");
            }
        };

        cursor = descend(cursor, step).unwrap_or_else(|| {
            panic!("keyword path '{keyword_path}' does not match the schema document")
        });
    }

    Walk::Open
}

fn detail_at(instance_path: &str, message: String) -> ErrorDetail {
    let field = field_path(instance_path);
    if field.is_empty() {
        ErrorDetail::entity(vec![message])
    } else {
        ErrorDetail::field(field, vec![message])
    }
}

/// Render a JSON pointer as a dotted path with bracketed indexes.
///
/// `/config/add/headers/0` becomes `config.add.headers[0]`.
pub fn field_path(pointer: &str) -> String {
    let mut field = String::new();
    for segment in pointer_segments(pointer) {
        if !field.is_empty() && segment.parse::<usize>().is_ok() {
            field.push('[');
            field.push_str(&segment);
            field.push(']');
        } else {
            if !field.is_empty() {
                field.push('.');
            }
            field.push_str(&segment);
        }
    }
    field
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    match pointer.strip_prefix('/') {
        Some(rest) => rest
            .split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect(),
        None => Vec::new(),
    }
}

fn enum_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::detail::ErrorType;

    const AT_LEAST_ONE: &str = "at least one of custom_id or username must be set";

    fn consumer_schema() -> Schema {
        Schema {
            any_of: vec![
                Schema::requiring(&["custom_id"]).with_description(AT_LEAST_ONE),
                Schema::requiring(&["username"]).with_description(AT_LEAST_ONE),
            ],
            ..Schema::object()
        }
        .with_property("id", Schema::string())
        .with_property("username", Schema::string())
        .with_property("custom_id", Schema::string())
        .with_property(
            "tags",
            Schema {
                max_items: Some(2),
                ..Schema::array(Schema {
                    pattern: Some("^[a-z]+$".to_string()),
                    ..Schema::string()
                })
            },
        )
        .with_property(
            "protocol",
            Schema {
                enum_: vec![json!("http"), json!("https")],
                ..Schema::string()
            },
        )
        .with_required(&["id"])
    }

    #[test]
    fn any_of_descriptions_merge_into_one_entity_detail() {
        let root = ErrorNode::root(vec![
            ErrorNode::new("", "/required", "missing properties: 'id'"),
            ErrorNode::new("", "/anyOf", "{} is not valid under any of the schemas").with_causes(
                vec![
                    ErrorNode::new("", "/anyOf/0/required", "missing properties: 'custom_id'"),
                    ErrorNode::new("", "/anyOf/1/required", "missing properties: 'username'"),
                ],
            ),
        ]);

        let err = translate(&root, &consumer_schema());
        assert_eq!(
            err.details(),
            &[ErrorDetail::entity(vec![
                "missing properties: 'id'".to_string(),
                AT_LEAST_ONE.to_string(),
            ])]
        );
    }

    #[test]
    fn pattern_and_enum_messages_are_synthesized() {
        let root = ErrorNode::root(vec![
            ErrorNode::new(
                "/tags/1",
                "/properties/tags/items/pattern",
                "\"X\" does not match \"^[a-z]+$\"",
            ),
            ErrorNode::new("/protocol", "/properties/protocol/enum", "raw enum text"),
        ]);

        let err = translate(&root, &consumer_schema());
        assert_eq!(
            err.field_detail("tags[1]").unwrap().messages,
            vec!["must match pattern `^[a-z]+$`"]
        );
        assert_eq!(
            err.field_detail("protocol").unwrap().messages,
            vec!["must be one of `http, https`"]
        );
        let fields: Vec<&str> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["protocol", "tags[1]"]);
    }

    #[test]
    fn raw_message_passes_for_terminals_without_description() {
        let node = ErrorNode::new("/tags", "/properties/tags/maxItems", "has more than 2 items");
        let detail = classify(&node, &consumer_schema()).unwrap();
        assert_eq!(detail.kind, ErrorType::Field);
        assert_eq!(detail.field, "tags");
        assert_eq!(detail.messages, vec!["has more than 2 items"]);
    }

    #[test]
    fn leaf_without_terminal_keeps_raw_message() {
        let node = ErrorNode::new("/id", "/properties/id/type", "5 is not of type \"string\"");
        assert!(classify(&node, &consumer_schema()).is_none());

        let err = translate(&ErrorNode::root(vec![node]), &consumer_schema());
        assert_eq!(
            err.field_detail("id").unwrap().messages,
            vec!["5 is not of type \"string\""]
        );
    }

    #[test]
    fn first_terminal_wins_over_causes() {
        let schema = Schema {
            all_of: vec![Schema::requiring(&["a"]).with_description("need a")],
            ..Schema::object()
        };
        let node = ErrorNode::new("", "/allOf/0/required", "missing properties: 'a'")
            .with_causes(vec![ErrorNode::new("/x", "/properties/x/type", "ignored")]);

        let err = translate(&ErrorNode::root(vec![node]), &schema);
        assert_eq!(err.details(), &[ErrorDetail::entity(vec!["need a".to_string()])]);
    }

    #[test]
    fn conditional_branches_resolve_their_own_nodes() {
        let schema = Schema {
            if_: Some(Box::new(Schema::requiring(&["url"]))),
            then: Some(Box::new(Schema::object().with_property(
                "path",
                Schema {
                    pattern: Some("^/".to_string()),
                    ..Schema::string()
                }
                .with_description("must be a path"),
            ))),
            else_: Some(Box::new(Schema::object().with_property(
                "path",
                Schema {
                    pattern: Some("^[a-z]+$".to_string()),
                    ..Schema::string()
                },
            ))),
            ..Schema::object()
        }
        .with_property("url", Schema::string())
        .with_property("path", Schema::string());

        let then = ErrorNode::new("/path", "/then/properties/path/pattern", "raw pattern text");
        let detail = classify(&then, &schema).unwrap();
        assert_eq!(detail.kind, ErrorType::Field);
        assert_eq!(detail.field, "path");
        assert_eq!(detail.messages, vec!["must be a path"]);

        let otherwise = ErrorNode::new("/path", "/else/properties/path/pattern", "raw pattern text");
        assert_eq!(
            classify(&otherwise, &schema).unwrap().messages,
            vec!["must match pattern `^[a-z]+$`"]
        );
    }

    #[test]
    fn descend_follows_every_segment_kind() {
        let schema = consumer_schema();
        let branch = descend(&schema, Segment::Branch("anyOf", 1)).unwrap();
        assert_eq!(branch.required, vec!["username"]);
        let tags = descend(&schema, Segment::Property("tags")).unwrap();
        let item = descend(tags, Segment::Child("items")).unwrap();
        assert!(item.pattern.is_some());
        assert!(descend(&schema, Segment::Child("then")).is_none());
    }

    #[test]
    fn field_paths_render_indexes_in_brackets() {
        assert_eq!(field_path(""), "");
        assert_eq!(field_path("/port"), "port");
        assert_eq!(field_path("/config/add/headers/0"), "config.add.headers[0]");
        assert_eq!(field_path("/a~1b/c~0d"), "a/b.c~d");
        assert_eq!(field_path("/routes/2/paths/0"), "routes[2].paths[0]");
    }

    #[test]
    #[should_panic(expected = "unsupported schema keyword")]
    fn unknown_keyword_panics() {
        let node = ErrorNode::new("/id", "/properties/id/$ref", "whatever");
        let _ = classify(&node, &consumer_schema());
    }

    #[test]
    #[should_panic(expected = "does not match the schema document")]
    fn path_outside_document_panics() {
        let node = ErrorNode::new("/x", "/properties/missing/maximum", "whatever");
        let _ = classify(&node, &consumer_schema());
    }
}
