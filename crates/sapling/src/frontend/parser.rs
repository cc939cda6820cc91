//! Pratt parser producing the closed AST.
//!
//! Statements are parsed by recursive descent; expressions by precedence
//! climbing. Newlines carry no meaning and `;` separators are optional.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::{
    AssignOp, BinaryOp, Block, Case, ExprKind, Expression, ForEach, ForLoop, FunctionLiteral,
    IfExpr, Position, PostfixOp, PrefixOp, Program, Statement, StmtKind, SwitchExpr,
};

use super::lexer::{tokenize, Token};
use super::{ParseError, SourceLocation};

type PResult<T> = Result<T, ParseError>;

/// Binding power, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Pipe,
    Ternary,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Power,
    Prefix,
    Call,
}

fn infix_precedence(token: &Token) -> Precedence {
    match token {
        Token::Pipe => Precedence::Pipe,
        Token::Question => Precedence::Ternary,
        Token::OrOr => Precedence::Or,
        Token::AndAnd => Precedence::And,
        Token::EqEq | Token::NotEq | Token::Match | Token::NotMatch => Precedence::Equals,
        Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Star | Token::Slash | Token::Percent => Precedence::Product,
        Token::StarStar => Precedence::Power,
        Token::LParen | Token::LBracket | Token::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Mod,
        Token::StarStar => BinaryOp::Pow,
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        Token::Match => BinaryOp::Match,
        Token::NotMatch => BinaryOp::NotMatch,
        Token::AndAnd => BinaryOp::And,
        Token::OrOr => BinaryOp::Or,
        _ => return None,
    })
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Declare => AssignOp::Declare,
        Token::Assign => AssignOp::Assign,
        Token::PlusAssign => AssignOp::Add,
        Token::MinusAssign => AssignOp::Sub,
        Token::StarAssign => AssignOp::Mul,
        Token::SlashAssign => AssignOp::Div,
        _ => return None,
    })
}

/// Parser state.
pub struct Parser<'a> {
    tokens: Vec<(Token, Position)>,
    pos: usize,
    source: &'a str,
    file: &'a str,
}

impl<'a> Parser<'a> {
    /// Tokenize `source` and prepare to parse it.
    ///
    /// # Errors
    ///
    /// Returns the lexer's error if `source` contains an invalid token.
    pub fn new(source: &'a str, file: &'a str) -> PResult<Self> {
        Ok(Parser {
            tokens: tokenize(source, file)?,
            pos: 0,
            source,
            file,
        })
    }

    /// Parse the whole token stream as a program.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error encountered.
    pub fn parse_program(mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        self.skip_semis();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
            self.skip_semis();
        }
        Ok(Program::new(statements))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token cursor
    // ═══════════════════════════════════════════════════════════════════

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(t, _)| t)
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    /// Position of the next token, or just past the last one.
    fn current_pos(&self) -> Position {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some((_, pos)) => *pos,
            None => Position::new(1, 1),
        }
    }

    fn advance(&mut self) -> Option<(Token, Position)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, context: &str) -> PResult<Position> {
        if self.check(&token) {
            let pos = self.current_pos();
            self.pos += 1;
            Ok(pos)
        } else {
            Err(self.unexpected(&format!("'{}' {}", token, context)))
        }
    }

    fn expect_ident(&mut self, context: &str) -> PResult<(String, Position)> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                let pos = self.current_pos();
                self.pos += 1;
                Ok((name, pos))
            }
            _ => Err(self.unexpected(&format!("identifier {}", context))),
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(&Token::Semi) {}
    }

    fn error_at(&self, pos: Position, message: impl Into<String>) -> ParseError {
        let mut err = ParseError::new(message)
            .with_location(SourceLocation::new(self.file, pos.line, pos.column));
        if let Some(line) = self.source.lines().nth(pos.line.saturating_sub(1)) {
            err = err.with_snippet(format!(
                "{}\n{:>width$}",
                line,
                "^",
                width = pos.column
            ));
        }
        err
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(found) => self.error_at(
                self.current_pos(),
                format!("expected {}, found '{}'", expected, found),
            ),
            None => self.error_at(
                self.current_pos(),
                format!("expected {}, found end of input", expected),
            ),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn parse_statement(&mut self) -> PResult<Statement> {
        let pos = self.current_pos();
        let kind = match self.peek().cloned() {
            Some(Token::Var) | Some(Token::Const) => {
                let is_const = self.check(&Token::Const);
                self.pos += 1;
                let (name, _) = self.expect_ident("after declaration keyword")?;
                self.expect(Token::Assign, "in declaration")?;
                let value = self.parse_expression(Precedence::Lowest)?;
                if is_const {
                    StmtKind::Const { name, value }
                } else {
                    StmtKind::Var { name, value }
                }
            }
            Some(Token::Return) => {
                self.pos += 1;
                let value = if self.starts_expression() {
                    Some(self.parse_expression(Precedence::Lowest)?)
                } else {
                    None
                };
                StmtKind::Return(value)
            }
            Some(Token::Break) => {
                self.pos += 1;
                StmtKind::Break
            }
            Some(Token::Continue) => {
                self.pos += 1;
                StmtKind::Continue
            }
            Some(Token::Import) => {
                self.pos += 1;
                let (name, _) = self.expect_ident("after 'import'")?;
                StmtKind::Import { name }
            }
            Some(Token::Func) if matches!(self.peek_nth(1), Some(Token::Ident(_))) => {
                self.pos += 1;
                StmtKind::Function(Arc::new(self.parse_function_rest(pos)?))
            }
            // Block-ending expressions end the statement, so a following
            // `[` or `(` starts a new statement instead of indexing or calling.
            Some(Token::If | Token::For | Token::Switch) => {
                StmtKind::Expression(self.parse_prefix()?)
            }
            Some(Token::Ident(name)) => {
                let next = self.peek_nth(1).cloned();
                if let Some(op) = next.as_ref().and_then(assign_op) {
                    self.pos += 2;
                    let value = self.parse_expression(Precedence::Lowest)?;
                    StmtKind::Assign { name, op, value }
                } else if let Some(Token::PlusPlus | Token::MinusMinus) = next {
                    let op = if next == Some(Token::PlusPlus) {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    self.pos += 2;
                    StmtKind::Postfix { name, op }
                } else {
                    self.parse_expression_statement()?
                }
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Statement::new(kind, pos))
    }

    /// An expression, or `target[index] = value`.
    fn parse_expression_statement(&mut self) -> PResult<StmtKind> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.check(&Token::Assign) {
            return Ok(StmtKind::Expression(expr));
        }
        match expr.kind {
            ExprKind::Index { left, index } => {
                self.pos += 1;
                let value = self.parse_expression(Precedence::Lowest)?;
                Ok(StmtKind::SetItem {
                    target: *left,
                    index: *index,
                    value,
                })
            }
            _ => Err(self.error_at(self.current_pos(), "cannot assign to this expression")),
        }
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Int(_)
                    | Token::Float(_)
                    | Token::Str(_)
                    | Token::Ident(_)
                    | Token::True
                    | Token::False
                    | Token::Nil
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Minus
                    | Token::Bang
                    | Token::Func
                    | Token::If
                    | Token::For
                    | Token::Switch
            )
        )
    }

    fn parse_block(&mut self) -> PResult<Block> {
        let pos = self.expect(Token::LBrace, "to open block")?;
        let mut statements = Vec::new();
        self.skip_semis();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("'}' to close block"));
            }
            statements.push(self.parse_statement()?);
            self.skip_semis();
        }
        self.pos += 1;
        Ok(Block::new(statements, pos))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    fn parse_expression(&mut self, precedence: Precedence) -> PResult<Expression> {
        let mut left = self.parse_prefix()?;
        while let Some(token) = self.peek() {
            if infix_precedence(token) <= precedence {
                break;
            }
            left = self.parse_infix(left)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> PResult<Expression> {
        let Some((token, pos)) = self.advance() else {
            return Err(self.unexpected("expression"));
        };
        let kind = match token {
            Token::Int(n) => ExprKind::Int(n),
            Token::Float(n) => ExprKind::Float(n),
            Token::Str(s) => ExprKind::Str(s),
            Token::True => ExprKind::Bool(true),
            Token::False => ExprKind::Bool(false),
            Token::Nil => ExprKind::Nil,
            Token::Ident(name) => ExprKind::Ident(name),
            Token::LParen => {
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(Token::RParen, "to close parenthesized expression")?;
                return Ok(inner);
            }
            Token::LBracket => ExprKind::List(self.parse_expression_list(Token::RBracket)?),
            Token::LBrace => self.parse_map_rest()?,
            Token::Minus => ExprKind::Prefix {
                op: PrefixOp::Neg,
                right: Box::new(self.parse_expression(Precedence::Prefix)?),
            },
            Token::Bang => ExprKind::Prefix {
                op: PrefixOp::Not,
                right: Box::new(self.parse_expression(Precedence::Prefix)?),
            },
            Token::Func => ExprKind::Function(Arc::new(self.parse_function_rest(pos)?)),
            Token::If => ExprKind::If(Box::new(self.parse_if_rest()?)),
            Token::For => ExprKind::For(Box::new(self.parse_for_rest()?)),
            Token::Switch => ExprKind::Switch(Box::new(self.parse_switch_rest()?)),
            other => {
                return Err(self.error_at(pos, format!("unexpected token '{}'", other)));
            }
        };
        Ok(Expression::new(kind, pos))
    }

    fn parse_infix(&mut self, left: Expression) -> PResult<Expression> {
        let Some((token, pos)) = self.advance() else {
            return Ok(left);
        };
        let start = left.pos;
        match token {
            Token::Pipe => {
                let right = self.parse_expression(Precedence::Pipe)?;
                let mut stages = match left.kind {
                    ExprKind::Pipe(stages) => stages,
                    _ => vec![left],
                };
                stages.push(right);
                Ok(Expression::new(ExprKind::Pipe(stages), start))
            }
            // Branches bind tighter than a pipe, so `c ? a : b ? x : y`
            // nests to the right.
            Token::Question => {
                let consequence = self.parse_expression(Precedence::Pipe)?;
                self.expect(Token::Colon, "in ternary expression")?;
                let alternative = self.parse_expression(Precedence::Pipe)?;
                Ok(Expression::new(
                    ExprKind::Ternary {
                        condition: Box::new(left),
                        consequence: Box::new(consequence),
                        alternative: Box::new(alternative),
                    },
                    start,
                ))
            }
            Token::LParen => {
                let args = self.parse_expression_list(Token::RParen)?;
                let kind = match left.kind {
                    ExprKind::GetAttr { object, name } => ExprKind::MethodCall {
                        object,
                        method: name,
                        args,
                    },
                    other => ExprKind::Call {
                        function: Box::new(Expression::new(other, start)),
                        args,
                    },
                };
                Ok(Expression::new(kind, start))
            }
            Token::LBracket => {
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect(Token::RBracket, "to close index")?;
                Ok(Expression::new(
                    ExprKind::Index {
                        left: Box::new(left),
                        index: Box::new(index),
                    },
                    start,
                ))
            }
            Token::Dot => {
                let (name, _) = self.expect_ident("after '.'")?;
                Ok(Expression::new(
                    ExprKind::GetAttr {
                        object: Box::new(left),
                        name,
                    },
                    start,
                ))
            }
            other => {
                let Some(op) = binary_op(&other) else {
                    return Err(self.error_at(pos, format!("unexpected token '{}'", other)));
                };
                // `**` is right-associative.
                let right_precedence = match op {
                    BinaryOp::Pow => Precedence::Product,
                    _ => infix_precedence(&other),
                };
                let right = self.parse_expression(right_precedence)?;
                Ok(Expression::new(
                    ExprKind::Infix {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    pos,
                ))
            }
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_expression_list(&mut self, close: Token) -> PResult<Vec<Expression>> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if self.eat(&Token::Comma) {
                if self.eat(&close) {
                    break;
                }
            } else {
                self.expect(close, "to close list")?;
                break;
            }
        }
        Ok(items)
    }

    fn parse_map_rest(&mut self) -> PResult<ExprKind> {
        let mut entries = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(ExprKind::Map(entries));
        }
        loop {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect(Token::Colon, "after map key")?;
            let value = self.parse_expression(Precedence::Lowest)?;
            entries.push((key, value));
            if self.eat(&Token::Comma) {
                if self.eat(&Token::RBrace) {
                    break;
                }
            } else {
                self.expect(Token::RBrace, "to close map")?;
                break;
            }
        }
        Ok(ExprKind::Map(entries))
    }

    /// Everything after `func`: optional name, parameters, body.
    fn parse_function_rest(&mut self, pos: Position) -> PResult<FunctionLiteral> {
        let name = match self.peek() {
            Some(Token::Ident(_)) => Some(self.expect_ident("as function name")?.0),
            _ => None,
        };
        self.expect(Token::LParen, "to open parameter list")?;
        let mut parameters = Vec::new();
        let mut defaults = IndexMap::new();
        while !self.eat(&Token::RParen) {
            let (param, param_pos) = self.expect_ident("as parameter name")?;
            if parameters.contains(&param) {
                return Err(self.error_at(param_pos, format!("duplicate parameter '{}'", param)));
            }
            if self.eat(&Token::Assign) {
                defaults.insert(param.clone(), self.parse_expression(Precedence::Lowest)?);
            }
            parameters.push(param);
            if !self.eat(&Token::Comma) {
                self.expect(Token::RParen, "to close parameter list")?;
                break;
            }
        }
        let body = self.parse_block()?;
        Ok(FunctionLiteral {
            name,
            parameters,
            defaults,
            body,
            pos,
        })
    }

    /// Everything after `if`.
    fn parse_if_rest(&mut self) -> PResult<IfExpr> {
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block()?;
        let alternative = if self.eat(&Token::Else) {
            if self.check(&Token::If) {
                let pos = self.current_pos();
                self.pos += 1;
                let nested = Expression::new(ExprKind::If(Box::new(self.parse_if_rest()?)), pos);
                Some(Block::new(
                    vec![Statement::new(StmtKind::Expression(nested), pos)],
                    pos,
                ))
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(IfExpr {
            condition,
            consequence,
            alternative,
        })
    }

    /// Whether the `(` at the cursor encloses a `;` at its own nesting level.
    fn paren_has_semicolon(&self) -> bool {
        let mut depth = 0usize;
        for (token, _) in &self.tokens[self.pos..] {
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                Token::Semi if depth == 1 => return true,
                _ => {}
            }
        }
        false
    }

    /// Whether the cursor is at `name in` or `name, index in`.
    fn at_each_header(&self, offset: usize) -> bool {
        match (self.peek_nth(offset), self.peek_nth(offset + 1)) {
            (Some(Token::Ident(_)), Some(Token::In)) => true,
            (Some(Token::Ident(_)), Some(Token::Comma)) => matches!(
                (self.peek_nth(offset + 2), self.peek_nth(offset + 3)),
                (Some(Token::Ident(_)), Some(Token::In))
            ),
            _ => false,
        }
    }

    /// `name[, index] in iterable`, optionally parenthesized.
    fn parse_each_header(&mut self) -> PResult<ForEach> {
        let parenthesized = self.eat(&Token::LParen);
        let (name, _) = self.expect_ident("as loop variable")?;
        let index = if self.eat(&Token::Comma) {
            let (index, pos) = self.expect_ident("as loop index")?;
            if index == name {
                return Err(self.error_at(pos, format!("duplicate loop variable '{}'", index)));
            }
            Some(index)
        } else {
            None
        };
        self.expect(Token::In, "after loop variables")?;
        let iterable = self.parse_expression(Precedence::Lowest)?;
        if parenthesized {
            self.expect(Token::RParen, "to close loop header")?;
        }
        Ok(ForEach {
            name,
            index,
            iterable,
        })
    }

    /// Everything after `for`.
    fn parse_for_rest(&mut self) -> PResult<ForLoop> {
        if self.check(&Token::LBrace) {
            return Ok(ForLoop {
                init: None,
                condition: None,
                post: None,
                each: None,
                body: self.parse_block()?,
            });
        }

        if self.at_each_header(0) || (self.check(&Token::LParen) && self.at_each_header(1)) {
            let each = self.parse_each_header()?;
            return Ok(ForLoop {
                init: None,
                condition: None,
                post: None,
                each: Some(each),
                body: self.parse_block()?,
            });
        }

        let parenthesized = self.check(&Token::LParen) && self.paren_has_semicolon();
        if parenthesized {
            self.pos += 1;
        }
        let header_end = if parenthesized {
            Token::RParen
        } else {
            Token::LBrace
        };

        let first = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_statement()?)
        };

        if !self.eat(&Token::Semi) {
            let Some(Statement {
                kind: StmtKind::Expression(condition),
                ..
            }) = first
            else {
                return Err(self.unexpected("loop condition"));
            };
            return Ok(ForLoop {
                init: None,
                condition: Some(condition),
                post: None,
                each: None,
                body: self.parse_block()?,
            });
        }

        let condition = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.expect(Token::Semi, "after loop condition")?;
        let post = if self.check(&header_end) {
            None
        } else {
            Some(self.parse_statement()?)
        };
        if parenthesized {
            self.expect(Token::RParen, "to close loop header")?;
        }
        Ok(ForLoop {
            init: first,
            condition,
            post,
            each: None,
            body: self.parse_block()?,
        })
    }

    /// Everything after `switch`.
    fn parse_switch_rest(&mut self) -> PResult<SwitchExpr> {
        let subject = self.parse_expression(Precedence::Lowest)?;
        self.expect(Token::LBrace, "to open switch body")?;
        let mut cases = Vec::new();
        let mut seen_default = false;
        loop {
            let pos = self.current_pos();
            let (exprs, is_default) = match self.peek().cloned() {
                Some(Token::Case) => {
                    self.pos += 1;
                    let mut exprs = vec![self.parse_expression(Precedence::Lowest)?];
                    while self.eat(&Token::Comma) {
                        exprs.push(self.parse_expression(Precedence::Lowest)?);
                    }
                    (exprs, false)
                }
                Some(Token::Default) => {
                    if seen_default {
                        return Err(self.error_at(pos, "multiple default cases in switch"));
                    }
                    seen_default = true;
                    self.pos += 1;
                    (Vec::new(), true)
                }
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("'case', 'default' or '}'")),
            };
            self.expect(Token::Colon, "after case")?;
            let mut statements = Vec::new();
            self.skip_semis();
            while !matches!(
                self.peek(),
                Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace) | None
            ) {
                statements.push(self.parse_statement()?);
                self.skip_semis();
            }
            cases.push(Case {
                exprs,
                body: Block::new(statements, pos),
                is_default,
                pos,
            });
        }
        Ok(SwitchExpr { subject, cases })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        Parser::new(source, "test").unwrap().parse_program().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        match Parser::new(source, "test").and_then(Parser::parse_program) {
            Ok(program) => panic!("expected a parse error, got {:?}", program),
            Err(err) => err,
        }
    }

    fn only_expr(source: &str) -> ExprKind {
        let mut program = parse(source);
        assert_eq!(program.statements.len(), 1);
        match program.statements.remove(0).kind {
            StmtKind::Expression(expr) => expr.kind,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_product_over_sum() {
        let ExprKind::Infix { op, right, .. } = only_expr("1 + 2 * 3") else {
            panic!("expected infix");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Infix { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_power_is_right_associative() {
        let ExprKind::Infix { left, right, .. } = only_expr("2 ** 3 ** 2") else {
            panic!("expected infix");
        };
        assert_eq!(left.kind, ExprKind::Int(2));
        assert!(matches!(right.kind, ExprKind::Infix { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn test_pipe_flattens_stages() {
        let ExprKind::Pipe(stages) = only_expr("5 | add(1) | mul(2)") else {
            panic!("expected pipe");
        };
        assert_eq!(stages.len(), 3);
        assert!(matches!(stages[1].kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_method_call() {
        let ExprKind::MethodCall { method, args, .. } = only_expr("xs.append(1, 2)") else {
            panic!("expected method call");
        };
        assert_eq!(method, "append");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_assignment_forms() {
        let program = parse("x := 1; x = 2; x += 3; x++; xs[0] = 4; var y = 5; const z = 6");
        let kinds: Vec<_> = program.statements.iter().map(|s| &s.kind).collect();
        assert!(matches!(kinds[0], StmtKind::Assign { op: AssignOp::Declare, .. }));
        assert!(matches!(kinds[1], StmtKind::Assign { op: AssignOp::Assign, .. }));
        assert!(matches!(kinds[2], StmtKind::Assign { op: AssignOp::Add, .. }));
        assert!(matches!(kinds[3], StmtKind::Postfix { op: PostfixOp::Increment, .. }));
        assert!(matches!(kinds[4], StmtKind::SetItem { .. }));
        assert!(matches!(kinds[5], StmtKind::Var { .. }));
        assert!(matches!(kinds[6], StmtKind::Const { .. }));
    }

    #[test]
    fn test_function_with_defaults() {
        let program = parse("func f(a, b = 2) { return a + b }");
        let StmtKind::Function(literal) = &program.statements[0].kind else {
            panic!("expected function declaration");
        };
        assert_eq!(literal.name.as_deref(), Some("f"));
        assert_eq!(literal.parameters, vec!["a", "b"]);
        assert_eq!(literal.defaults.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_for_forms() {
        let ExprKind::For(simple) = only_expr("for { break }") else {
            panic!("expected for");
        };
        assert!(simple.is_simple());

        let ExprKind::For(cond) = only_expr("for (true) { break }") else {
            panic!("expected for");
        };
        assert!(cond.condition.is_some() && cond.init.is_none());

        let ExprKind::For(three) = only_expr("for (i := 0; i < 3; i++) { }") else {
            panic!("expected for");
        };
        assert!(three.init.is_some() && three.condition.is_some() && three.post.is_some());

        let ExprKind::For(bare) = only_expr("for i := 0; i < 3; i++ { }") else {
            panic!("expected for");
        };
        assert!(!bare.is_simple());
    }

    #[test]
    fn test_for_each_forms() {
        let ExprKind::For(each) = only_expr("for x in xs { }") else {
            panic!("expected for");
        };
        let header = each.each.as_ref().unwrap();
        assert_eq!(header.name, "x");
        assert_eq!(header.index, None);
        assert!(!each.is_simple());

        let ExprKind::For(pair) = only_expr("for (k, v in {\"a\": 1}) { }") else {
            panic!("expected for");
        };
        assert_eq!(pair.each.unwrap().index.as_deref(), Some("v"));
    }

    #[test]
    fn test_duplicate_loop_variable_rejected() {
        let err = parse_err("for x, x in xs { }");
        assert!(err.message.contains("duplicate loop variable"));
    }

    #[test]
    fn test_ternary_binds_below_logic() {
        let ExprKind::Ternary {
            condition,
            alternative,
            ..
        } = only_expr("a && b ? 1 : c ? 2 : 3")
        else {
            panic!("expected ternary");
        };
        assert!(matches!(condition.kind, ExprKind::Infix { op: BinaryOp::And, .. }));
        assert!(matches!(alternative.kind, ExprKind::Ternary { .. }));
    }

    #[test]
    fn test_ternary_then_pipe() {
        assert!(matches!(only_expr("ok ? 1 : 2 | f"), ExprKind::Pipe(_)));
    }

    #[test]
    fn test_else_if_chain() {
        let ExprKind::If(if_expr) = only_expr("if a { 1 } else if b { 2 } else { 3 }") else {
            panic!("expected if");
        };
        let alternative = if_expr.alternative.unwrap();
        assert!(matches!(
            &alternative.statements[0].kind,
            StmtKind::Expression(Expression { kind: ExprKind::If(_), .. })
        ));
    }

    #[test]
    fn test_switch_cases() {
        let ExprKind::Switch(switch) =
            only_expr("switch x { case 1, 2: \"low\" case 3: \"three\" default: \"other\" }")
        else {
            panic!("expected switch");
        };
        assert_eq!(switch.cases.len(), 3);
        assert_eq!(switch.cases[0].exprs.len(), 2);
        assert!(switch.cases[2].is_default);
    }

    #[test]
    fn test_multiple_defaults_rejected() {
        let err = parse_err("switch x { default: 1 default: 2 }");
        assert!(err.message.contains("multiple default"));
    }

    #[test]
    fn test_return_without_value() {
        let program = parse("func f() { return }");
        let StmtKind::Function(literal) = &program.statements[0].kind else {
            panic!("expected function declaration");
        };
        assert_eq!(literal.body.statements[0].kind, StmtKind::Return(None));
    }

    #[test]
    fn test_error_location_and_snippet() {
        let err = parse_err("x := (1 + 2");
        let location = err.location.clone().unwrap();
        assert_eq!(location.line, 1);
        assert!(err.message.contains("')'"));
        assert!(err.snippet.is_some());
    }

    #[test]
    fn test_loop_statement_ends_before_list() {
        let program = parse("for x { }\n[1, 2]");
        assert_eq!(program.statements.len(), 2);
        assert!(matches!(
            &program.statements[1].kind,
            StmtKind::Expression(Expression { kind: ExprKind::List(_), .. })
        ));
    }

    #[test]
    fn test_cannot_assign_to_call() {
        let err = parse_err("f() = 1");
        assert!(err.message.contains("cannot assign"));
    }
}
