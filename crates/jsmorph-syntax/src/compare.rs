//! Structural comparison of subtrees.

use serde_json::Value;

use crate::ast::{Ast, NodeId};

/// Two subtrees are structurally equal when their JSON renderings match.
/// Node identity is ignored.
pub fn structurally_equal(ast: &Ast, a: NodeId, b: NodeId) -> bool {
    a == b || ast.to_value(a) == ast.to_value(b)
}

/// Partial similarity of a sample against an actual value.
///
/// Every key present in an object sample must be present and similar in
/// `actual`; keys the sample omits are not checked. An empty array in the
/// sample matches any array. Non-empty arrays compare index by index over
/// the sample's length. `null` only matches `null`. Scalars must be equal.
pub fn is_similar(sample: &Value, actual: &Value) -> bool {
    match (sample, actual) {
        (Value::Object(sample), Value::Object(actual)) => sample.iter().all(|(key, expected)| {
            actual
                .get(key)
                .is_some_and(|found| is_similar(expected, found))
        }),
        (Value::Array(sample), Value::Array(actual)) => {
            sample.is_empty()
                || sample.iter().enumerate().all(|(i, expected)| {
                    actual.get(i).is_some_and(|found| is_similar(expected, found))
                })
        }
        (Value::Array(_), _) | (Value::Object(_), _) => false,
        (sample, actual) => sample == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_array_is_wildcard() {
        let sample = json!({"type": "CallExpression", "arguments": []});
        let actual = json!({"type": "CallExpression", "arguments": [{"type": "ThisExpression"}]});
        assert!(is_similar(&sample, &actual));
    }

    #[test]
    fn test_omitted_keys_are_ignored() {
        let sample = json!({"type": "IdentifierExpression"});
        let actual = json!({"type": "IdentifierExpression", "name": "x"});
        assert!(is_similar(&sample, &actual));
        assert!(!is_similar(&actual, &sample));
    }

    #[test]
    fn test_scalar_mismatch() {
        assert!(!is_similar(&json!({"name": "a"}), &json!({"name": "b"})));
        assert!(is_similar(&json!(null), &json!(null)));
        assert!(!is_similar(&json!(null), &json!({"type": "ThisExpression"})));
        assert!(!is_similar(&json!([1]), &json!({"a": 1})));
    }
}
