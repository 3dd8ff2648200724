//! Small expression-level cleanups, each run to a fixed point.

use jsmorph_syntax::ast::UnaryOperator;
use jsmorph_syntax::codegen::is_identifier_name;
use jsmorph_syntax::{Ast, Node, NodeId};

use super::RefactorPass;
use crate::error::Result;
use crate::session::{Replacer, Session};

const COMPUTED_MEMBER: &str = r#"ComputedMemberExpression[expression.type="LiteralStringExpression"]"#;
const COMPUTED_TARGET: &str =
    r#"ComputedMemberAssignmentTarget[expression.type="LiteralStringExpression"]"#;
const COMPUTED_NAME: &str = r#"ComputedPropertyName[expression.type="LiteralStringExpression"]"#;

/// Turns `a["b"]` into `a.b` wherever the key is a valid identifier name,
/// and `{ ["b"]: 1 }` into `{ b: 1 }`.
pub struct ConvertComputedToStaticPass;

impl ConvertComputedToStaticPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConvertComputedToStaticPass {
    fn default() -> Self {
        Self::new()
    }
}

fn string_key(ast: &Ast, expression: NodeId) -> Option<String> {
    match &ast[expression] {
        Node::LiteralStringExpression { value } => Some(value.clone()),
        _ => None,
    }
}

impl RefactorPass for ConvertComputedToStaticPass {
    fn name(&self) -> &'static str {
        "convert-computed-to-static"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        let mut converted = 0;

        session.replace_recursive(
            COMPUTED_MEMBER,
            Replacer::with(|ast: &mut Ast, id| {
                let node = match &ast[id] {
                    Node::ComputedMemberExpression { object, expression } => {
                        string_key(ast, *expression)
                            .filter(|key| is_identifier_name(key))
                            .map(|property| Node::StaticMemberExpression {
                                object: *object,
                                property,
                            })
                    }
                    _ => None,
                };
                match node {
                    Some(node) => {
                        converted += 1;
                        ast.alloc(node)
                    }
                    None => id,
                }
            }),
        )?;

        session.replace_recursive(
            COMPUTED_TARGET,
            Replacer::with(|ast: &mut Ast, id| {
                let node = match &ast[id] {
                    Node::ComputedMemberAssignmentTarget { object, expression } => {
                        string_key(ast, *expression)
                            .filter(|key| is_identifier_name(key))
                            .map(|property| Node::StaticMemberAssignmentTarget {
                                object: *object,
                                property,
                            })
                    }
                    _ => None,
                };
                match node {
                    Some(node) => {
                        converted += 1;
                        ast.alloc(node)
                    }
                    None => id,
                }
            }),
        )?;

        // Any string is a valid static property name.
        session.replace_recursive(
            COMPUTED_NAME,
            Replacer::with(|ast: &mut Ast, id| {
                let value = match &ast[id] {
                    Node::ComputedPropertyName { expression } => string_key(ast, *expression),
                    _ => None,
                };
                match value {
                    Some(value) => {
                        converted += 1;
                        ast.alloc(Node::StaticPropertyName { value })
                    }
                    None => id,
                }
            }),
        )?;

        Ok(converted)
    }
}

/// Folds `lit ? a : b` into whichever branch the literal selects.
pub struct CompressConditionalPass;

impl CompressConditionalPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompressConditionalPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RefactorPass for CompressConditionalPass {
    fn name(&self) -> &'static str {
        "compress-conditional"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        let mut folded = 0;
        session.replace_recursive(
            "ConditionalExpression",
            Replacer::with(|ast: &mut Ast, id| {
                let Node::ConditionalExpression {
                    test,
                    consequent,
                    alternate,
                } = &ast[id]
                else {
                    return id;
                };
                match truthiness(ast, *test) {
                    Some(true) => {
                        folded += 1;
                        *consequent
                    }
                    Some(false) => {
                        folded += 1;
                        *alternate
                    }
                    None => id,
                }
            }),
        )?;
        Ok(folded)
    }
}

/// The boolean value of a literal expression, if it is one.
fn truthiness(ast: &Ast, id: NodeId) -> Option<bool> {
    if !ast.is_literal(id) {
        return None;
    }
    match &ast[id] {
        Node::LiteralStringExpression { value } => Some(!value.is_empty()),
        Node::LiteralNumericExpression { value } => Some(*value != 0.0 && !value.is_nan()),
        Node::LiteralBooleanExpression { value } => Some(*value),
        Node::LiteralNullExpression => Some(false),
        Node::UnaryExpression { operator, operand } => {
            let Node::LiteralNumericExpression { value } = ast[*operand] else {
                return None;
            };
            match operator {
                UnaryOperator::Minus | UnaryOperator::Plus => Some(value != 0.0 && !value.is_nan()),
                UnaryOperator::Not => Some(value == 0.0 || value.is_nan()),
                UnaryOperator::BitNot => Some(!to_int32(value) != 0),
                UnaryOperator::Typeof | UnaryOperator::Delete => Some(true),
                UnaryOperator::Void => Some(false),
            }
        }
        _ => None,
    }
}

fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc() as i64) as i32
}

/// Drops literal left operands of the comma operator: `0, x` becomes `x`.
pub struct CompressCommaPass;

impl CompressCommaPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompressCommaPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RefactorPass for CompressCommaPass {
    fn name(&self) -> &'static str {
        "compress-comma"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        let mut dropped = 0;
        session.replace_recursive(
            r#"BinaryExpression[operator=","]"#,
            Replacer::with(|ast: &mut Ast, id| match &ast[id] {
                Node::BinaryExpression { left, right, .. } if ast.is_literal(*left) => {
                    dropped += 1;
                    *right
                }
                _ => id,
            }),
        )?;
        Ok(dropped)
    }
}

/// Spells out minified booleans: `!0` becomes `true` and `!1` becomes
/// `false`.
pub struct ExpandBooleanPass;

impl ExpandBooleanPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExpandBooleanPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RefactorPass for ExpandBooleanPass {
    fn name(&self) -> &'static str {
        "expand-boolean"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        let truthy = session.replace(
            r#"UnaryExpression[operator="!"][operand.value=0]"#,
            Replacer::with(|ast: &mut Ast, _| ast.alloc(Node::LiteralBooleanExpression { value: true })),
        )?;
        let falsy = session.replace(
            r#"UnaryExpression[operator="!"][operand.value=1]"#,
            Replacer::with(|ast: &mut Ast, _| ast.alloc(Node::LiteralBooleanExpression { value: false })),
        )?;
        session.apply();
        Ok(truthy + falsy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pass: &mut dyn RefactorPass, source: &str) -> (usize, String) {
        let mut session = Session::parse(source).unwrap();
        let changes = session.run_pass(pass).unwrap();
        (changes, session.print().unwrap())
    }

    #[test]
    fn test_computed_members_become_static() {
        // The first round's outer replacement still holds the original inner
        // member, which converts again in the second round.
        let (changes, output) = run(&mut ConvertComputedToStaticPass::new(), r#"a["b"]["c"];"#);
        assert_eq!(changes, 3);
        assert_eq!(output, "a.b.c;\n");
    }

    #[test]
    fn test_invalid_identifier_keys_stay_computed() {
        let (changes, output) = run(&mut ConvertComputedToStaticPass::new(), r#"a["b-c"] = x["1"];"#);
        assert_eq!(changes, 0);
        assert_eq!(output, "a[\"b-c\"] = x[\"1\"];\n");
    }

    #[test]
    fn test_assignment_targets_and_property_names() {
        let (changes, output) =
            run(&mut ConvertComputedToStaticPass::new(), r#"a["b"] = { ["c d"]: 1 };"#);
        assert_eq!(changes, 2);
        assert_eq!(output, "a.b = { \"c d\": 1 };\n");
    }

    #[test]
    fn test_conditional_with_literal_test() {
        let (changes, output) = run(&mut CompressConditionalPass::new(), "x = 1 ? a : b; y = '' ? a : b; z = c ? a : b;");
        assert_eq!(changes, 2);
        assert_eq!(output, "x = a;\ny = b;\nz = c ? a : b;\n");
    }

    #[test]
    fn test_nested_conditionals_fold_fully() {
        let (_, output) = run(&mut CompressConditionalPass::new(), "x = !0 ? (0 ? a : b) : c;");
        assert_eq!(output, "x = b;\n");
    }

    #[test]
    fn test_comma_with_literal_left() {
        let (changes, output) = run(&mut CompressCommaPass::new(), "x = (0, f)(); y = (g(), h);");
        assert_eq!(changes, 1);
        assert_eq!(output, "x = f();\ny = (g(), h);\n");
    }

    #[test]
    fn test_boolean_expansion() {
        let (changes, output) = run(&mut ExpandBooleanPass::new(), "a = !0; b = !1; c = !2;");
        assert_eq!(changes, 2);
        assert_eq!(output, "a = true;\nb = false;\nc = !2;\n");
    }
}
