//! Operator and declaration-kind enums shared by the parser and printer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

impl VariableDeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableDeclarationKind::Var => "var",
            VariableDeclarationKind::Let => "let",
            VariableDeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Comma,
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    In,
    InstanceOf,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Comma => ",",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::InstanceOf => "instanceof",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        }
    }

    /// Binding strength; higher binds tighter. The comma operator is the
    /// loosest and is handled outside of precedence climbing.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Comma => precedence::SEQUENCE,
            BinaryOperator::LogicalOr => precedence::LOGICAL_OR,
            BinaryOperator::LogicalAnd => precedence::LOGICAL_AND,
            BinaryOperator::BitOr => precedence::BIT_OR,
            BinaryOperator::BitXor => precedence::BIT_XOR,
            BinaryOperator::BitAnd => precedence::BIT_AND,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::StrictEqual
            | BinaryOperator::StrictNotEqual => precedence::EQUALITY,
            BinaryOperator::LessThan
            | BinaryOperator::LessThanEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanEqual
            | BinaryOperator::In
            | BinaryOperator::InstanceOf => precedence::RELATIONAL,
            BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => precedence::SHIFT,
            BinaryOperator::Add | BinaryOperator::Sub => precedence::ADDITIVE,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => {
                precedence::MULTIPLICATIVE
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }

    /// Keyword operators need a space before their operand.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::Delete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundAssignmentOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitOr,
    BitXor,
    BitAnd,
}

impl CompoundAssignmentOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            CompoundAssignmentOperator::Add => "+=",
            CompoundAssignmentOperator::Sub => "-=",
            CompoundAssignmentOperator::Mul => "*=",
            CompoundAssignmentOperator::Div => "/=",
            CompoundAssignmentOperator::Rem => "%=",
            CompoundAssignmentOperator::Shl => "<<=",
            CompoundAssignmentOperator::Shr => ">>=",
            CompoundAssignmentOperator::UShr => ">>>=",
            CompoundAssignmentOperator::BitOr => "|=",
            CompoundAssignmentOperator::BitXor => "^=",
            CompoundAssignmentOperator::BitAnd => "&=",
        }
    }
}

/// Expression precedence levels used by both the parser and the printer.
pub mod precedence {
    pub const SEQUENCE: u8 = 0;
    pub const ASSIGNMENT: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const LOGICAL_OR: u8 = 3;
    pub const LOGICAL_AND: u8 = 4;
    pub const BIT_OR: u8 = 5;
    pub const BIT_XOR: u8 = 6;
    pub const BIT_AND: u8 = 7;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const UNARY: u8 = 13;
    pub const POSTFIX: u8 = 14;
    pub const CALL: u8 = 15;
    pub const PRIMARY: u8 = 16;
}
