//! Token types produced by the lexer.

use std::fmt;

use script_core::Span;

/// A token from the source text. `lexeme` is allocated in the compilation
/// arena, so the original source string can be dropped once lexing ends.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'a str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    Identifier,

    // Type names (§3).
    KwNull,
    KwInteger,
    KwFloat,
    KwString,
    KwKey,
    KwVector,
    KwQuaternion,
    KwList,

    // Control keywords.
    KwDefault,
    KwState,
    KwJump,
    KwReturn,
    KwIf,
    KwElse,
    KwFor,
    KwDo,
    KwWhile,
    KwTrue,
    KwFalse,

    // Punctuation.
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    At,

    // Operators.
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Eq,
    EqEq,
    BangEq,
    Less,
    LessEq,
    LessLess,
    Greater,
    GreaterEq,
    GreaterGreater,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    Eof,
}

/// Map an identifier's text to a keyword kind, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "null" => TokenKind::KwNull,
        "integer" => TokenKind::KwInteger,
        "float" => TokenKind::KwFloat,
        "string" => TokenKind::KwString,
        "key" => TokenKind::KwKey,
        "vector" => TokenKind::KwVector,
        "quaternion" => TokenKind::KwQuaternion,
        "list" => TokenKind::KwList,
        "default" => TokenKind::KwDefault,
        "state" => TokenKind::KwState,
        "jump" => TokenKind::KwJump,
        "return" => TokenKind::KwReturn,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "for" => TokenKind::KwFor,
        "do" => TokenKind::KwDo,
        "while" => TokenKind::KwWhile,
        "TRUE" => TokenKind::KwTrue,
        "FALSE" => TokenKind::KwFalse,
        _ => return None,
    })
}
