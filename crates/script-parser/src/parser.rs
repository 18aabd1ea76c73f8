//! Recursive-descent parser: tokens to a bound [`Node`] tree.
//!
//! Symbol resolution happens inline as the tree is built, not as a later
//! pass: every lexical scope is a [`SymbolTable`] pushed onto a stack that
//! mirrors the AST's own parent chain, and an identifier reference is
//! resolved against that stack (falling back to the builtin catalog) the
//! moment it is parsed. Global storage is the one place this can't be
//! single-pass — a later global may be referenced by an earlier one's
//! initializer — so global names are pre-declared into the script's root
//! table in a lightweight first pass before the real parse begins.

use script_core::ast::{self, BinOpKind, Node, NodeKind};
use script_core::{
    Arena, BinaryOp, Diagnostic, DiagnosticBuffer, DiagnosticCode, Span, Symbol, SymbolKind,
    SymbolSubKind, SymbolTable, Type, TypeKind, TypeRegistry, UnaryOp, parse_string,
};

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    arena: &'a Arena,
    builtins: &'a SymbolTable<'a>,
    diagnostics: &'a DiagnosticBuffer,
    scopes: Vec<&'a SymbolTable<'a>>,
}

/// Parse a complete script. `builtins` is consulted for names not found in
/// any lexical scope; `diagnostics` collects unresolved-symbol and other
/// recoverable errors encountered while parsing.
pub fn parse_script<'a>(
    arena: &'a Arena,
    source: &str,
    builtins: &'a SymbolTable<'a>,
    diagnostics: &'a DiagnosticBuffer,
) -> Result<&'a Node<'a>, ParseError> {
    let mut lexer = Lexer::new(source, arena);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }

    let root_scope = arena.alloc(SymbolTable::new());
    let mut parser = Parser {
        tokens,
        pos: 0,
        arena,
        builtins,
        diagnostics,
        scopes: vec![root_scope],
    };
    parser.predeclare_globals();
    parser.parse_script_root(root_scope)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token<'a> {
        self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Token<'a> {
        self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token<'a> {
        let tok = self.peek();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'a>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected,
                    found: format!("{:?}", found.kind),
                },
                found.span,
            ))
        }
    }

    fn type_keyword(&self, kind: TokenKind) -> Option<TypeKind> {
        Some(match kind {
            TokenKind::KwNull => TypeKind::Null,
            TokenKind::KwInteger => TypeKind::Integer,
            TokenKind::KwFloat => TypeKind::Float,
            TokenKind::KwString => TypeKind::String,
            TokenKind::KwKey => TypeKind::Key,
            TokenKind::KwVector => TypeKind::Vector,
            TokenKind::KwQuaternion => TypeKind::Quaternion,
            TokenKind::KwList => TypeKind::List,
            _ => return None,
        })
    }

    fn current_scope(&self) -> &'a SymbolTable<'a> {
        self.scopes.last().copied().expect("scope stack is never empty")
    }

    // ---- Phase 1: pre-declare global names ----

    fn predeclare_globals(&mut self) {
        let mut depth: i32 = 0;
        let mut i = 0usize;
        while i < self.tokens.len() {
            let tok = self.tokens[i];
            match tok.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ if depth == 0 => {
                    if let Some(kind) = self.type_keyword(tok.kind) {
                        if let Some(name_tok) = self.tokens.get(i + 1) {
                            if name_tok.kind == TokenKind::Identifier {
                                let is_function = self
                                    .tokens
                                    .get(i + 2)
                                    .is_some_and(|t| t.kind == TokenKind::LParen);
                                let sym_kind = if is_function {
                                    SymbolKind::Function
                                } else {
                                    SymbolKind::Variable
                                };
                                let name = self.arena.alloc_str(name_tok.lexeme);
                                let symbol = self.arena.alloc(Symbol::new(
                                    name,
                                    TypeRegistry::get(kind),
                                    sym_kind,
                                    SymbolSubKind::Global,
                                ));
                                self.current_scope().define(symbol);
                            }
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    // ---- Script / top level ----

    fn parse_script_root(&mut self, root_scope: &'a SymbolTable<'a>) -> Result<&'a Node<'a>, ParseError> {
        let start = self.peek().span;
        let root = ast::script(self.arena, start);
        root.set_scope(root_scope);

        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::KwDefault) || self.check(TokenKind::KwState) {
                let state = self.parse_state()?;
                root.append_child(state);
            } else {
                let storage = self.parse_global_storage()?;
                root.append_child(storage);
            }
        }
        Ok(root)
    }

    fn parse_global_storage(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.peek().span;
        let type_tok = self.advance();
        let ty = self
            .type_keyword(type_tok.kind)
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::Expected {
                        expected: "a type name",
                        found: format!("{:?}", type_tok.kind),
                    },
                    type_tok.span,
                )
            })?;
        let name_tok = self.expect(TokenKind::Identifier, "an identifier")?;
        let name = self.arena.alloc_str(name_tok.lexeme);

        let storage = ast::global_storage(self.arena, start);
        let symbol = self
            .current_scope()
            .lookup(name, if self.check(TokenKind::LParen) {
                SymbolKind::Function
            } else {
                SymbolKind::Variable
            })
            .expect("global was pre-declared in predeclare_globals");

        if self.check(TokenKind::LParen) {
            let func = ast::global_function(self.arena, name, Span::new(start.line, start.col, 0));
            func.set_symbol(symbol);
            symbol.declaring_node.set(Some(func));
            self.parse_function_tail(func, TypeRegistry::get(ty))?;
            storage.append_child(func);
        } else {
            let var = ast::global_variable(self.arena, name, Span::new(start.line, start.col, 0));
            var.set_ty(TypeRegistry::get(ty));
            var.set_symbol(symbol);
            symbol.declaring_node.set(Some(var));
            if self.check(TokenKind::Eq) {
                self.advance();
                let init = self.parse_expression()?;
                var.append_child(init);
            }
            self.expect(TokenKind::Semicolon, "`;`")?;
            storage.append_child(var);
        }
        Ok(storage)
    }

    /// Parses `(<params>) <body>` after a function/event name has already
    /// been consumed, defining parameters into a fresh scope pushed for the
    /// duration of the body.
    fn parse_function_tail(
        &mut self,
        owner: &'a Node<'a>,
        return_type: &'static Type,
    ) -> Result<(), ParseError> {
        owner.set_ty(return_type);
        self.expect(TokenKind::LParen, "`(`")?;
        let scope = self.arena.alloc(SymbolTable::new());
        owner.set_scope(scope);
        self.scopes.push(scope);

        if !self.check(TokenKind::RParen) {
            loop {
                let ptype_tok = self.advance();
                let ptype = self.type_keyword(ptype_tok.kind).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::Expected {
                            expected: "a parameter type",
                            found: format!("{:?}", ptype_tok.kind),
                        },
                        ptype_tok.span,
                    )
                })?;
                let pname_tok = self.expect(TokenKind::Identifier, "a parameter name")?;
                let pname = self.arena.alloc_str(pname_tok.lexeme);

                let param_node = ast::declaration(self.arena, pname, pname_tok.span);
                param_node.set_ty(TypeRegistry::get(ptype));
                let psym = self.arena.alloc(Symbol::new(
                    pname,
                    TypeRegistry::get(ptype),
                    SymbolKind::Variable,
                    SymbolSubKind::Parameter,
                ));
                psym.declaring_node.set(Some(param_node));
                param_node.set_symbol(psym);
                scope.define(psym);
                owner.append_child(param_node);

                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;

        let body = self.parse_compound_statement_inner(scope)?;
        owner.append_child(body);
        self.scopes.pop();
        Ok(())
    }

    fn parse_state(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.peek().span;
        let name: &str = if self.check(TokenKind::KwDefault) {
            self.advance();
            "default"
        } else {
            self.expect(TokenKind::KwState, "`state`")?;
            let name_tok = self.expect(TokenKind::Identifier, "a state name")?;
            name_tok.lexeme
        };
        let name = self.arena.alloc_str(name);
        let state = ast::state(self.arena, name, start);

        self.expect(TokenKind::LBrace, "`{`")?;
        while !self.check(TokenKind::RBrace) {
            let handler = self.parse_event_handler()?;
            state.append_child(handler);
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(state)
    }

    fn parse_event_handler(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let name_tok = self.expect(TokenKind::Identifier, "an event name")?;
        let name = self.arena.alloc_str(name_tok.lexeme);
        let handler = ast::event_handler(self.arena, name, name_tok.span);

        let event_sym = self.builtins.lookup(name, SymbolKind::Event);
        if let Some(sym) = event_sym {
            handler.set_symbol(sym);
        } else {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::UnresolvedSymbol,
                name_tok.span,
                format!("unknown event `{name}`"),
            ));
        }

        self.parse_function_tail(handler, TypeRegistry::get(TypeKind::Null))?;
        Ok(handler)
    }

    // ---- Statements ----

    fn parse_compound_statement_inner(
        &mut self,
        scope: &'a SymbolTable<'a>,
    ) -> Result<&'a Node<'a>, ParseError> {
        let start = self.expect(TokenKind::LBrace, "`{`")?.span;
        let block = ast::compound_statement(self.arena, start);
        block.set_scope(scope);
        while !self.check(TokenKind::RBrace) {
            let stmt = self.parse_statement()?;
            block.append_child(stmt);
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(block)
    }

    fn parse_compound_statement(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let scope = self.arena.alloc(SymbolTable::new());
        self.scopes.push(scope);
        let block = self.parse_compound_statement_inner(scope);
        self.scopes.pop();
        block
    }

    fn parse_statement(&mut self) -> Result<&'a Node<'a>, ParseError> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::KwJump => self.parse_jump(),
            TokenKind::At => self.parse_label(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwDo => self.parse_do(),
            TokenKind::KwWhile => self.parse_while(),
            kind if self.type_keyword(kind).is_some() => self.parse_local_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_local_declaration(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.peek().span;
        let ty_tok = self.advance();
        let ty = self.type_keyword(ty_tok.kind).unwrap();
        let name_tok = self.expect(TokenKind::Identifier, "an identifier")?;
        let name = self.arena.alloc_str(name_tok.lexeme);

        let decl = ast::declaration(self.arena, name, start);
        decl.set_ty(TypeRegistry::get(ty));
        let symbol = self.arena.alloc(Symbol::new(
            name,
            TypeRegistry::get(ty),
            SymbolKind::Variable,
            SymbolSubKind::Local,
        ));
        symbol.declaring_node.set(Some(decl));
        decl.set_symbol(symbol);

        if self.check(TokenKind::Eq) {
            self.advance();
            let init = self.parse_expression()?;
            decl.append_child(init);
        }
        self.expect(TokenKind::Semicolon, "`;`")?;

        // Locals become visible to sibling statements only after their own
        // initializer has been parsed, so a local can never reference
        // itself the way a global pre-declaration permits.
        self.current_scope().define(symbol);
        Ok(decl)
    }

    fn parse_jump(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        let label_tok = self.expect(TokenKind::Identifier, "a label name")?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(ast::jump_statement(
            self.arena,
            self.arena.alloc_str(label_tok.lexeme),
            start,
        ))
    }

    fn parse_label(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        let name_tok = self.expect(TokenKind::Identifier, "a label name")?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(ast::label(self.arena, self.arena.alloc_str(name_tok.lexeme), start))
    }

    fn parse_return(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        let node = ast::return_statement(self.arena, start);
        if !self.check(TokenKind::Semicolon) {
            let value = self.parse_expression()?;
            node.append_child(value);
        }
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(node)
    }

    fn parse_if(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        self.expect(TokenKind::LParen, "`(`")?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;
        let node = ast::if_stmt(self.arena, start);
        node.append_child(cond);
        node.append_child(self.parse_statement()?);
        if self.check(TokenKind::KwElse) {
            self.advance();
            node.append_child(self.parse_statement()?);
        }
        Ok(node)
    }

    fn parse_for(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        self.expect(TokenKind::LParen, "`(`")?;
        let scope = self.arena.alloc(SymbolTable::new());
        self.scopes.push(scope);

        let node = ast::for_stmt(self.arena, start);
        node.set_scope(scope);

        if !self.check(TokenKind::Semicolon) {
            if self.type_keyword(self.peek().kind).is_some() {
                node.append_child(self.parse_local_declaration()?);
            } else {
                let expr = self.parse_expression()?;
                let stmt = ast::expression_statement(self.arena, expr.span);
                stmt.append_child(expr);
                self.expect(TokenKind::Semicolon, "`;`")?;
                node.append_child(stmt);
            }
        } else {
            self.advance();
        }

        if !self.check(TokenKind::Semicolon) {
            node.append_child(self.parse_expression()?);
        }
        self.expect(TokenKind::Semicolon, "`;`")?;

        if !self.check(TokenKind::RParen) {
            node.append_child(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen, "`)`")?;

        node.append_child(self.parse_statement()?);
        self.scopes.pop();
        Ok(node)
    }

    fn parse_do(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        let node = ast::do_stmt(self.arena, start);
        node.append_child(self.parse_statement()?);
        self.expect(TokenKind::KwWhile, "`while`")?;
        self.expect(TokenKind::LParen, "`(`")?;
        node.append_child(self.parse_expression()?);
        self.expect(TokenKind::RParen, "`)`")?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(node)
    }

    fn parse_while(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        self.expect(TokenKind::LParen, "`(`")?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;
        let node = ast::while_stmt(self.arena, start);
        node.append_child(cond);
        node.append_child(self.parse_statement()?);
        Ok(node)
    }

    fn parse_expression_statement(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        let stmt = ast::expression_statement(self.arena, expr.span);
        stmt.append_child(expr);
        Ok(stmt)
    }

    // ---- Expressions ----

    fn parse_expression(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let lhs = self.parse_logical_or()?;
        let op = match self.peek().kind {
            TokenKind::Eq => Some(BinOpKind::Assign),
            TokenKind::PlusEq => Some(BinOpKind::CompoundAssign(BinaryOp::Add)),
            TokenKind::MinusEq => Some(BinOpKind::CompoundAssign(BinaryOp::Sub)),
            TokenKind::StarEq => Some(BinOpKind::CompoundAssign(BinaryOp::Mul)),
            TokenKind::SlashEq => Some(BinOpKind::CompoundAssign(BinaryOp::Div)),
            TokenKind::PercentEq => Some(BinOpKind::CompoundAssign(BinaryOp::Mod)),
            _ => None,
        };
        let Some(op) = op else { return Ok(lhs) };
        self.advance();
        let rhs = self.parse_assignment()?;
        let node = ast::binary_expr(self.arena, op, lhs.span);
        node.append_child(lhs);
        node.append_child(rhs);
        Ok(node)
    }

    fn parse_binary_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        mut next: impl FnMut(&mut Self) -> Result<&'a Node<'a>, ParseError>,
    ) -> Result<&'a Node<'a>, ParseError> {
        let mut lhs = next(self)?;
        loop {
            let matched = ops.iter().find(|(tok, _)| self.check(*tok));
            let Some(&(_, op)) = matched else { break };
            self.advance();
            let rhs = next(self)?;
            let node = ast::binary_expr(self.arena, BinOpKind::Op(op), lhs.span);
            node.append_child(lhs);
            node.append_child(rhs);
            lhs = node;
        }
        Ok(lhs)
    }

    fn parse_logical_or(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(&[(TokenKind::PipePipe, BinaryOp::LogicalOr)], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(&[(TokenKind::AmpAmp, BinaryOp::LogicalAnd)], Self::parse_bitwise_or)
    }

    fn parse_bitwise_or(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(&[(TokenKind::Pipe, BinaryOp::BitwiseOr)], Self::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(&[(TokenKind::Caret, BinaryOp::BitwiseXor)], Self::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(&[(TokenKind::Amp, BinaryOp::BitwiseAnd)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::EqEq, BinaryOp::Equal),
                (TokenKind::BangEq, BinaryOp::NotEqual),
            ],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::LessEq, BinaryOp::LessEqual),
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::GreaterEq, BinaryOp::GreaterEqual),
            ],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::LessLess, BinaryOp::ShiftLeft),
                (TokenKind::GreaterGreater, BinaryOp::ShiftRight),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::LogicalNot),
            TokenKind::Tilde => Some(UnaryOp::BitwiseNot),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span;
            let operand = self.parse_unary()?;
            let node = ast::unary_expr(self.arena, op, start);
            node.append_child(operand);
            return Ok(node);
        }

        // `(<type>) expr` typecast: only when `(` is immediately followed by
        // a type name and `)`.
        if self.check(TokenKind::LParen) {
            if let Some(ty) = self.type_keyword(self.peek_at(1).kind) {
                if self.peek_at(2).kind == TokenKind::RParen {
                    let start = self.advance().span;
                    self.advance();
                    self.advance();
                    let operand = self.parse_unary()?;
                    let node = ast::typecast_expr(self.arena, TypeRegistry::get(ty), start);
                    node.append_child(operand);
                    return Ok(node);
                }
            }
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.check(TokenKind::Dot) {
            self.advance();
            let member_tok = self.expect(TokenKind::Identifier, "a member name (x, y, z, or s)")?;
            let member = member_tok
                .lexeme
                .chars()
                .next()
                .filter(|_| member_tok.lexeme.len() == 1);
            let Some(member) = member else {
                return Err(ParseError::new(
                    ParseErrorKind::Expected {
                        expected: "a single-character member name",
                        found: member_tok.lexeme.to_string(),
                    },
                    member_tok.span,
                ));
            };

            if expr.kind == NodeKind::LvalueExpression {
                let symbol = expr.symbol();
                let node = ast::lvalue_expr(self.arena, Some(member), expr.span);
                if let Some(symbol) = symbol {
                    node.set_symbol(symbol);
                }
                node.set_ty(TypeRegistry::get(TypeKind::Float));
                expr = node;
            } else {
                return Err(ParseError::new(
                    ParseErrorKind::Expected {
                        expected: "a vector or quaternion lvalue before `.`",
                        found: format!("{:?}", expr.kind),
                    },
                    member_tok.span,
                ));
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = if let Some(hex) = tok.lexeme.strip_prefix("0x").or_else(|| tok.lexeme.strip_prefix("0X")) {
                    i32::from_str_radix(hex, 16).map_err(|_| {
                        ParseError::new(ParseErrorKind::InvalidInteger(tok.lexeme.to_string()), tok.span)
                    })?
                } else {
                    tok.lexeme.parse::<i32>().map_err(|_| {
                        ParseError::new(ParseErrorKind::InvalidInteger(tok.lexeme.to_string()), tok.span)
                    })?
                };
                Ok(ast::integer_constant(self.arena, value, tok.span))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value = tok.lexeme.parse::<f32>().map_err(|_| {
                    ParseError::new(ParseErrorKind::InvalidFloat(tok.lexeme.to_string()), tok.span)
                })?;
                Ok(ast::float_constant(self.arena, value, tok.span))
            }
            TokenKind::StringLiteral => {
                self.advance();
                let bytes = parse_string(self.arena, tok.lexeme);
                Ok(ast::string_constant(self.arena, bytes, tok.span))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok(ast::integer_constant(self.arena, 1, tok.span))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok(ast::integer_constant(self.arena, 0, tok.span))
            }
            TokenKind::Less => self.parse_vector_or_quaternion(),
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "`)`")?;
                let node = ast::parenthesis_expr(self.arena, tok.span);
                node.append_child(inner);
                Ok(node)
            }
            TokenKind::Identifier => self.parse_identifier_or_call(),
            _ => Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected: "an expression",
                    found: format!("{:?}", tok.kind),
                },
                tok.span,
            )),
        }
    }

    fn parse_vector_or_quaternion(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span; // `<`
        let mut components = vec![self.parse_expression()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            components.push(self.parse_expression()?);
        }
        self.expect(TokenKind::Greater, "`>`")?;

        let node = if components.len() == 3 {
            ast::vector_expr(self.arena, start)
        } else if components.len() == 4 {
            ast::quaternion_expr(self.arena, start)
        } else {
            return Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected: "3 components for a vector or 4 for a quaternion",
                    found: format!("{} components", components.len()),
                },
                start,
            ));
        };
        for c in components {
            node.append_child(c);
        }
        Ok(node)
    }

    fn parse_list_literal(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let start = self.advance().span;
        let node = ast::list_expr(self.arena, start);
        if !self.check(TokenKind::RBracket) {
            loop {
                node.append_child(self.parse_expression()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(node)
    }

    fn parse_identifier_or_call(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let name_tok = self.advance();
        let name = name_tok.lexeme;

        if self.check(TokenKind::LParen) {
            self.advance();
            let node = ast::function_expr(self.arena, self.arena.alloc_str(name), name_tok.span);
            if !self.check(TokenKind::RParen) {
                loop {
                    node.append_child(self.parse_expression()?);
                    if !self.check(TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
            }
            self.expect(TokenKind::RParen, "`)`")?;

            if let Some(sym) = self.builtins.lookup(name, SymbolKind::Function) {
                node.set_symbol(sym);
                node.set_ty(sym.ty);
            } else if let Some(sym) = self.lookup_in_scopes(name, SymbolKind::Function) {
                node.set_symbol(sym);
                node.set_ty(sym.ty);
            } else {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UnresolvedSymbol,
                    name_tok.span,
                    format!("unresolved function `{name}`"),
                ));
            }
            return Ok(node);
        }

        let symbol = self
            .builtins
            .lookup(name, SymbolKind::Variable)
            .or_else(|| self.lookup_in_scopes(name, SymbolKind::Variable));

        let node = ast::lvalue_expr(self.arena, None, name_tok.span);
        match symbol {
            Some(sym) => {
                node.set_symbol(sym);
                node.set_ty(sym.ty);
                node.set_static(sym.is_builtin());
                sym.add_reference();
            }
            None => {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UnresolvedSymbol,
                    name_tok.span,
                    format!("unresolved identifier `{name}`"),
                ));
            }
        }
        Ok(node)
    }

    fn lookup_in_scopes(&self, name: &str, kind: SymbolKind) -> Option<&'a Symbol<'a>> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name, kind))
    }
}
