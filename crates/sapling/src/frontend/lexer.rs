//! Lexer implementation using logos

use std::fmt;

use logos::Logos;

use crate::ast::Position;

use super::{ParseError, SourceLocation};

/// Sapling token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // Keywords
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("func")]
    Func,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("import")]
    Import,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    // Literals
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok(), priority = 3)]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 2)]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    // Assignment
    #[token(":=")]
    Declare,
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // Arithmetic
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
    #[token("**")]
    StarStar,

    // Comparison and matching
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("=~")]
    Match,
    #[token("!~")]
    NotMatch,

    // Logic and pipes
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
}

/// Strip the quotes from a string literal and process escapes.
///
/// Returns `None` for an unknown escape, which the lexer reports as an
/// error at the literal.
fn unescape(literal: &str) -> Option<String> {
    let inner = &literal[1..literal.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next()? {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            '0' => result.push('\0'),
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            '\'' => result.push('\''),
            _ => return None,
        }
    }
    Some(result)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Float(n) => write!(f, "{n:?}"),
            Token::Int(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Ident(name) => write!(f, "{name}"),
            other => f.write_str(other.symbol()),
        }
    }
}

impl Token {
    fn symbol(&self) -> &'static str {
        match self {
            Token::Var => "var",
            Token::Const => "const",
            Token::Func => "func",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::In => "in",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Import => "import",
            Token::True => "true",
            Token::False => "false",
            Token::Nil => "nil",
            Token::Float(_) => "float",
            Token::Int(_) => "int",
            Token::Str(_) => "string",
            Token::Ident(_) => "identifier",
            Token::Declare => ":=",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StarStar => "**",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::Match => "=~",
            Token::NotMatch => "!~",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::Pipe => "|",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semi => ";",
            Token::Dot => ".",
            Token::Question => "?",
        }
    }
}

/// Byte offset to line/column mapping for one source text.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub(crate) fn position(&self, source: &str, offset: usize) -> Position {
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line - 1];
        let column = source[line_start..offset].chars().count() + 1;
        Position::new(line, column)
    }
}

/// Tokenize source code
///
/// # Errors
///
/// Returns a [`ParseError`] at the first character that starts no token.
pub fn tokenize(source: &str, file: &str) -> Result<Vec<(Token, Position)>, ParseError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let pos = index.position(source, lexer.span().start);
        match result {
            Ok(token) => tokens.push((token, pos)),
            Err(_) => {
                return Err(ParseError::new(format!(
                    "unexpected character: {:?}",
                    lexer.slice()
                ))
                .with_location(SourceLocation::new(file, pos.line, pos.column)));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source, "test")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(kinds("").is_empty());
        assert!(kinds("  // only a comment\n# another").is_empty());
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            kinds("for format func"),
            vec![Token::For, Token::Ident("format".into()), Token::Func]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 1.5 2.5e3"),
            vec![Token::Int(42), Token::Float(1.5), Token::Float(2500.0)]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#""a\n\"b\"" 'it\'s'"#),
            vec![Token::Str("a\n\"b\"".into()), Token::Str("it's".into())]
        );
    }

    #[test]
    fn test_loop_and_ternary_tokens() {
        assert_eq!(
            kinds("in inner ? :"),
            vec![Token::In, Token::Ident("inner".into()), Token::Question, Token::Colon]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds(":= == =~ !~ ** ++ || |"),
            vec![
                Token::Declare,
                Token::EqEq,
                Token::Match,
                Token::NotMatch,
                Token::StarStar,
                Token::PlusPlus,
                Token::OrOr,
                Token::Pipe,
            ]
        );
    }

    #[test]
    fn test_positions_are_line_and_column() {
        let tokens = tokenize("x := 1\n  y", "test").unwrap();
        assert_eq!(tokens[0].1, Position::new(1, 1));
        assert_eq!(tokens[1].1, Position::new(1, 3));
        assert_eq!(tokens[3].1, Position::new(2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("x := @", "test").unwrap_err();
        assert!(err.message.contains("unexpected character"));
        assert_eq!(err.location.unwrap().column, 6);
    }

    #[test]
    fn test_bad_escape_is_error() {
        assert!(tokenize(r#""\q""#, "test").is_err());
    }
}
