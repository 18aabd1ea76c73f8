//! Converts source text into a stream of [`Token`]s.
//!
//! Lexemes are copied into the compilation arena so the lexer does not need
//! to borrow the source string for longer than lexing itself takes.

use script_core::{Arena, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use crate::error::{ParseError, ParseErrorKind};

pub struct Lexer<'src, 'a> {
    cursor: Cursor<'src>,
    arena: &'a Arena,
}

impl<'src, 'a> Lexer<'src, 'a> {
    pub fn new(source: &'src str, arena: &'a Arena) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
        }
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        self.skip_trivia()?;

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Ok(self.make(TokenKind::Eof, start_line, start_col, start_offset));
        };

        match c {
            '"' => self.scan_string(start_line, start_col, start_offset),
            c if c.is_ascii_digit() => Ok(self.scan_number(start_line, start_col, start_offset)),
            c if is_ident_start(c) => Ok(self.scan_identifier(start_line, start_col, start_offset)),
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            while self.cursor.check(|c| c.is_ascii_whitespace()) {
                self.cursor.advance();
            }
            if self.cursor.check_str("//") {
                while self.cursor.peek().is_some_and(|c| c != '\n') {
                    self.cursor.advance();
                }
                continue;
            }
            if self.cursor.check_str("/*") {
                let line = self.cursor.line();
                let col = self.cursor.column();
                let start_offset = self.cursor.offset();
                self.cursor.advance();
                self.cursor.advance();
                while !self.cursor.is_eof() && !self.cursor.check_str("*/") {
                    self.cursor.advance();
                }
                if self.cursor.is_eof() {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedComment,
                        Span::new(line, col, self.cursor.offset() - start_offset),
                    ));
                }
                self.cursor.advance();
                self.cursor.advance();
                continue;
            }
            break;
        }
        Ok(())
    }

    fn make(&self, kind: TokenKind, line: u32, col: u32, start_offset: u32) -> Token<'a> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(line, col, len);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    fn scan_string(
        &mut self,
        line: u32,
        col: u32,
        start_offset: u32,
    ) -> Result<Token<'a>, ParseError> {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.advance() {
                Some('"') => break,
                Some('\\') => {
                    self.cursor.advance();
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedString,
                        Span::new(line, col, self.cursor.offset() - start_offset),
                    ));
                }
            }
        }
        Ok(self.make(TokenKind::StringLiteral, line, col, start_offset))
    }

    fn scan_number(&mut self, line: u32, col: u32, start_offset: u32) -> Token<'a> {
        if self.cursor.check_str("0x") || self.cursor.check_str("0X") {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            return self.make(TokenKind::IntLiteral, line, col, start_offset);
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.make(kind, line, col, start_offset)
    }

    fn scan_identifier(&mut self, line: u32, col: u32, start_offset: u32) -> Token<'a> {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice_from(start_offset);
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make(kind, line, col, start_offset)
    }

    fn scan_operator(
        &mut self,
        line: u32,
        col: u32,
        start_offset: u32,
    ) -> Result<Token<'a>, ParseError> {
        let c = self.cursor.advance().unwrap();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '@' => TokenKind::At,
            '+' => self.one_or_eq(TokenKind::Plus, TokenKind::PlusEq),
            '-' => self.one_or_eq(TokenKind::Minus, TokenKind::MinusEq),
            '*' => self.one_or_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.one_or_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.one_or_eq(TokenKind::Percent, TokenKind::PercentEq),
            '~' => TokenKind::Tilde,
            '!' => self.one_or_eq(TokenKind::Bang, TokenKind::BangEq),
            '=' => self.one_or_eq(TokenKind::Eq, TokenKind::EqEq),
            '<' if self.cursor.eat('<') => TokenKind::LessLess,
            '<' => self.one_or_eq(TokenKind::Less, TokenKind::LessEq),
            '>' if self.cursor.eat('>') => TokenKind::GreaterGreater,
            '>' => self.one_or_eq(TokenKind::Greater, TokenKind::GreaterEq),
            '&' if self.cursor.eat('&') => TokenKind::AmpAmp,
            '&' => TokenKind::Amp,
            '|' if self.cursor.eat('|') => TokenKind::PipePipe,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedChar(other),
                    Span::new(line, col, self.cursor.offset() - start_offset),
                ));
            }
        };
        Ok(self.make(kind, line, col, start_offset))
    }

    fn one_or_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.cursor.eat('=') { with_eq } else { plain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let arena = Arena::new();
        let mut lexer = Lexer::new(src, &arena);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_integer_declaration() {
        assert_eq!(
            tokens("integer N = 2 + 3 * 4;"),
            vec![
                TokenKind::KwInteger,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Star,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lexes_float_literal() {
        assert_eq!(tokens("3.14"), vec![TokenKind::FloatLiteral]);
        assert_eq!(tokens("3"), vec![TokenKind::IntLiteral]);
    }

    #[test]
    fn lexes_compound_assign_and_skips_comments() {
        assert_eq!(
            tokens("x += 1; // trailing\n/* block */ y"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusEq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let arena = Arena::new();
        let mut lexer = Lexer::new("\"abc", &arena);
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let arena = Arena::new();
        let mut lexer = Lexer::new("x; /* never closed", &arena);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Semicolon);
        assert_eq!(
            lexer.next_token().unwrap_err().kind,
            ParseErrorKind::UnterminatedComment
        );
    }
}
