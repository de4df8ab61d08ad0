//! Recursive descent parser for calculated-field formulas.
//!
//! GRAMMAR:
//!   expression     --> additive
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/" | "%") unary )*
//!   unary          --> ("-" | "+") unary | primary
//!   primary        --> NUMBER | COLUMN | "(" expression ")"
//!
//! Both the parser's own recursion (parentheses, prefix signs) and the height of the tree it
//! builds are capped at `MAX_DEPTH`, so evaluating and dropping an `Expr` never recurses deeper.

use super::lexer::{Lexer, Token};
use super::{BinaryOp, Expr, FormulaError};

const MAX_DEPTH: usize = 256;

/// An expression together with the height of its tree.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }

    fn neg(inner: Node) -> Result<Self, FormulaError> {
        let height = checked_height(inner.height + 1)?;
        Ok(Self {
            expr: Expr::Neg(Box::new(inner.expr)),
            height,
        })
    }

    fn binary(op: BinaryOp, left: Node, right: Node) -> Result<Self, FormulaError> {
        let height = checked_height(left.height.max(right.height) + 1)?;
        Ok(Self {
            expr: Expr::Binary {
                op,
                left: Box::new(left.expr),
                right: Box::new(right.expr),
            },
            height,
        })
    }
}

fn checked_height(height: usize) -> Result<usize, FormulaError> {
    if height > MAX_DEPTH {
        Err(FormulaError::TooDeep(MAX_DEPTH))
    } else {
        Ok(height)
    }
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &str, columns: &'a [&'a str]) -> Self {
        let mut lexer = Lexer::new(input, columns);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            nesting: 0,
        }
    }

    pub(crate) fn parse(&mut self) -> Result<Expr, FormulaError> {
        if self.current == Token::Eof {
            return Err(FormulaError::Empty);
        }
        let node = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(FormulaError::UnexpectedToken(format!("{:?}", self.current)));
        }
        Ok(node.expr)
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(FormulaError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn parse_additive(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Node::binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, FormulaError> {
        match self.current {
            Token::Minus => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary()?;
                self.leave();
                Node::neg(inner)
            }
            Token::Plus => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary()?;
                self.leave();
                Ok(inner)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Node, FormulaError> {
        let node = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(v) => Node::leaf(Expr::Number(v)),
            Token::Column(idx) => Node::leaf(Expr::Column(idx)),
            Token::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_additive()?;
                self.leave();
                if self.current != Token::RParen {
                    return Err(FormulaError::UnexpectedToken(format!(
                        "expected ')', found {:?}",
                        self.current
                    )));
                }
                inner
            }
            Token::Ident(name) => return Err(FormulaError::UnknownColumn(name)),
            Token::Eof => return Err(FormulaError::UnexpectedEnd),
            other => return Err(FormulaError::UnexpectedToken(format!("{other:?}"))),
        };
        self.advance();
        Ok(node)
    }
}
