use std::fmt;
use std::str::FromStr;

use super::node::Node;

macro_rules! node_kinds {
    ($($name:ident),* $(,)?) => {
        /// Fieldless mirror of [`Node`], used for selector type matching and
        /// diagnostics.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($name,)*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)*
                }
            }
        }

        impl Node {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $(Node::$name { .. } => NodeKind::$name,)*
                }
            }
        }
    };
}

node_kinds! {
    Script,
    Block,
    FunctionBody,
    FormalParameters,
    VariableDeclarationStatement,
    VariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    ForStatement,
    BlockStatement,
    EmptyStatement,
    DebuggerStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    FunctionDeclaration,
    ClassDeclaration,
    Method,
    DataProperty,
    ShorthandProperty,
    StaticPropertyName,
    ComputedPropertyName,
    FunctionExpression,
    ArrowExpression,
    ClassExpression,
    IdentifierExpression,
    LiteralStringExpression,
    LiteralNumericExpression,
    LiteralBooleanExpression,
    LiteralNullExpression,
    ThisExpression,
    ArrayExpression,
    ObjectExpression,
    SpreadElement,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    AssignmentExpression,
    CompoundAssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    StaticMemberExpression,
    ComputedMemberExpression,
    AssignmentTargetIdentifier,
    StaticMemberAssignmentTarget,
    ComputedMemberAssignmentTarget,
    BindingIdentifier,
    BindingWithDefault,
    ArrayBinding,
    ObjectBinding,
    BindingPropertyIdentifier,
    BindingPropertyProperty,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeKind(pub String);

impl fmt::Display for UnknownNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node type '{}'", self.0)
    }
}

impl std::error::Error for UnknownNodeKind {}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.name().parse::<NodeKind>(), Ok(*kind));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert!("Nope".parse::<NodeKind>().is_err());
        assert_eq!(
            NodeKind::ComputedMemberExpression.to_string(),
            "ComputedMemberExpression"
        );
    }
}
