//! Arithmetic formulas for calculated fields.
//!
//! Formulas are parsed once against a list of column names and then evaluated per row. Only
//! numeric literals, column references, `+ - * / %`, unary minus and parentheses are accepted;
//! there is no function call or code execution surface.
//!
//! ```rust
//! use dashboard_data_engine::formula::Formula;
//!
//! let formula = Formula::parse("(revenue - cost) / revenue * 100", &["revenue", "cost"]).unwrap();
//! let margin = formula.evaluate(|col| [200.0, 150.0][col]).unwrap();
//! assert_eq!(margin, 25.0);
//! ```

mod lexer;
mod parser;

use thiserror::Error;

/// Why a formula could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    /// Column index into the names the formula was parsed against.
    Column(usize),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
}

impl Formula {
    /// Parse `text`, resolving column references against `columns` (by position).
    pub fn parse(text: &str, columns: &[&str]) -> Result<Self, FormulaError> {
        let expr = parser::Parser::new(text, columns).parse()?;
        Ok(Self { expr })
    }

    /// Evaluate with `lookup` supplying the numeric value of column `idx`.
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, FormulaError>
    where
        F: Fn(usize) -> f64,
    {
        let v = eval(&self.expr, &lookup)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(FormulaError::NonFinite)
        }
    }
}

fn eval(expr: &Expr, lookup: &dyn Fn(usize) -> f64) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(v) => Ok(*v),
        Expr::Column(idx) => Ok(lookup(*idx)),
        Expr::Neg(inner) => Ok(-eval(inner, lookup)?),
        Expr::Binary { op, left, right } => {
            let l = eval(left, lookup)?;
            let r = eval(right, lookup)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div | BinaryOp::Rem if r == 0.0 => Err(FormulaError::DivisionByZero),
                BinaryOp::Div => Ok(l / r),
                BinaryOp::Rem => Ok(l % r),
            }
        }
    }
}
