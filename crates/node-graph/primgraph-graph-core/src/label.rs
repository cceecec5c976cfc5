//! Expression-label placeholders.
//!
//! Labels may embed two placeholder forms, recognized syntactically:
//!
//! - `[value <paramName>]`: replaced with the named parameter's current
//!   static value rendered as text.
//! - `[python <expr>]`: recognized but left in place; evaluating the
//!   expression language is a collaborator's job, not ours.
//!
//! Resolution never fails: an unknown parameter or a malformed token is
//! left verbatim so a UI refresh cannot be aborted by label text.

use crate::graph::Graph;
use crate::ids::NodeId;

/// One lexed span of a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `[value name]` with the inner name.
    Value(&'a str),
    /// `[python expr]` with the inner expression.
    Python(&'a str),
}

/// Split `text` into literal spans and placeholder tokens. Brackets that do
/// not open a recognized placeholder stay literal; nesting is not supported
/// (the token ends at the first `]`).
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let (head, tail) = rest.split_at(open);
        let token = match parse_token(tail) {
            Some(t) => t,
            None => {
                // Not a placeholder: consume past the bracket and continue.
                if !head.is_empty() {
                    segments.push(Segment::Literal(head));
                }
                let (bracket, after) = tail.split_at(1);
                segments.push(Segment::Literal(bracket));
                rest = after;
                continue;
            }
        };
        if !head.is_empty() {
            segments.push(Segment::Literal(head));
        }
        let (segment, consumed) = token;
        segments.push(segment);
        rest = &tail[consumed..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Try to read a placeholder at the start of `text` (which begins with
/// `[`). Returns the segment and the number of bytes consumed.
fn parse_token(text: &str) -> Option<(Segment<'_>, usize)> {
    let close = text.find(']')?;
    let inner = &text[1..close];
    if inner.contains('[') {
        return None;
    }
    let consumed = close + 1;
    if let Some(name) = inner.strip_prefix("value ") {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        return Some((Segment::Value(name), consumed));
    }
    if let Some(expr) = inner.strip_prefix("python ") {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }
        return Some((Segment::Python(expr), consumed));
    }
    None
}

/// Resolve `[value name]` placeholders against `node`'s parameters,
/// leaving unknown names and `[python ...]` tokens in place.
pub fn resolve_label(graph: &Graph, node: NodeId, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in scan(text) {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Value(name) => match graph.parameter(node, name) {
                Some(param) => out.push_str(&param.value().to_string()),
                None => {
                    out.push_str("[value ");
                    out.push_str(name);
                    out.push(']');
                }
            },
            Segment::Python(expr) => {
                out.push_str("[python ");
                out.push_str(expr);
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use primgraph_api_core::Value;

    use crate::parameter::Parameter;

    #[test]
    fn scan_recognizes_both_forms() {
        let segments = scan("prim [value primName] via [python 1 + 1]!");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("prim "),
                Segment::Value("primName"),
                Segment::Literal(" via "),
                Segment::Python("1 + 1"),
                Segment::Literal("!"),
            ]
        );
    }

    #[test]
    fn unknown_bracket_text_stays_literal() {
        let segments = scan("array[0] and [weird]");
        assert!(segments.iter().all(|s| matches!(s, Segment::Literal(_))));
    }

    #[test]
    fn resolve_substitutes_known_parameters() {
        let mut graph = Graph::new();
        let node = graph.add_node("sphere1", "Sphere");
        graph
            .add_parameter(node, Parameter::new("primName", "string", Value::text("ball")))
            .expect("add parameter");
        let label = resolve_label(&graph, node, "<[value primName]>");
        assert_eq!(label, "<ball>");
    }

    #[test]
    fn resolve_leaves_unresolved_tokens_in_place() {
        let mut graph = Graph::new();
        let node = graph.add_node("a", "Sphere");
        let text = "[value missing] [python 2 ** 8]";
        assert_eq!(resolve_label(&graph, node, text), text);
    }
}
