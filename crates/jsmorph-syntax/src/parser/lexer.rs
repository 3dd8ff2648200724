//! Tokenizer built on `logos`.
//!
//! Whitespace and comments are skipped, but each token records whether a
//! line break preceded it so the parser can apply automatic semicolon
//! insertion.

use logos::Logos;

use super::ParseError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Tok {
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,

    // Keywords
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("class")]
    Class,
    #[token("extends")]
    Extends,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("debugger")]
    Debugger,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("typeof")]
    Typeof,
    #[token("void")]
    Void,
    #[token("delete")]
    Delete,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("in")]
    In,
    #[token("instanceof")]
    Instanceof,

    // Punctuators
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("=>")]
    Arrow,
    #[token("=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("===")]
    EqEqEq,
    #[token("!=")]
    NotEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token(">>>=")]
    UShrAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"0[xX][0-9a-fA-F]+", parse_hex)]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| unescape(lex.slice()))]
    String(String),

    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Tok {
    /// Keyword tokens that may still appear as property names (`a.new`,
    /// `{ delete: 1 }`).
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Tok::Var => "var",
            Tok::Let => "let",
            Tok::Const => "const",
            Tok::Function => "function",
            Tok::Class => "class",
            Tok::Extends => "extends",
            Tok::Return => "return",
            Tok::If => "if",
            Tok::Else => "else",
            Tok::While => "while",
            Tok::For => "for",
            Tok::Break => "break",
            Tok::Continue => "continue",
            Tok::Throw => "throw",
            Tok::Debugger => "debugger",
            Tok::New => "new",
            Tok::This => "this",
            Tok::Typeof => "typeof",
            Tok::Void => "void",
            Tok::Delete => "delete",
            Tok::True => "true",
            Tok::False => "false",
            Tok::Null => "null",
            Tok::In => "in",
            Tok::Instanceof => "instanceof",
            _ => return None,
        };
        Some(text)
    }
}

fn parse_hex(lex: &mut logos::Lexer<Tok>) -> Option<f64> {
    u64::from_str_radix(&lex.slice()[2..], 16)
        .ok()
        .map(|v| v as f64)
}

/// Strips the quotes of a string literal and resolves its escapes.
fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            'u' => {
                let rest = chars.as_str();
                let (hex, consumed) = if let Some(braced) = rest.strip_prefix('{') {
                    let end = braced.find('}')?;
                    (&braced[..end], end + 2)
                } else {
                    (rest.get(..4)?, 4)
                };
                out.push(char::from_u32(u32::from_str_radix(hex, 16).ok()?)?);
                chars = rest[consumed..].chars();
            }
            other => out.push(other),
        }
    }
    Some(out)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub start: usize,
    pub end: usize,
    pub newline_before: bool,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Tok::lexer(source);
    let mut tokens = Vec::new();
    let mut last_end = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let tok = result.map_err(|_| ParseError::InvalidToken { offset: span.start })?;
        let gap = &source[last_end..span.start];
        tokens.push(Token {
            tok,
            start: span.start,
            end: span.end,
            newline_before: gap.contains(['\n', '\u{2028}', '\u{2029}']),
        });
        last_end = span.end;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Tok> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.tok)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("var variable = new_"),
            vec![
                Tok::Var,
                Tok::Ident("variable".into()),
                Tok::Assign,
                Tok::Ident("new_".into()),
            ]
        );
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a >>>= b !== c"),
            vec![
                Tok::Ident("a".into()),
                Tok::UShrAssign,
                Tok::Ident("b".into()),
                Tok::NotEqEq,
                Tok::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 2.5 .5 0xff 1e3"),
            vec![
                Tok::Number(1.0),
                Tok::Number(2.5),
                Tok::Number(0.5),
                Tok::Number(255.0),
                Tok::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"'a\'b' "A\n" "\x41""#),
            vec![
                Tok::String("a'b".into()),
                Tok::String("A\n".into()),
                Tok::String("A".into()),
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = tokenize("a // line\n/* block */ b /* x\n */ c").unwrap();
        let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            tokenize("a # b"),
            Err(ParseError::InvalidToken { offset: 2 })
        ));
    }
}
