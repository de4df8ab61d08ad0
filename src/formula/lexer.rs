//! Turns formula text into tokens.
//!
//! Column references are resolved here: at each position the lexer first looks for the longest
//! known column name (so `Unit Price * Qty` works when `Unit Price` is a column), then for a
//! `[Bracketed Name]`. Names that start with a digit must be bracketed, since a leading digit
//! always begins a numeric literal.

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    /// Index of a resolved column.
    Column(usize),
    /// An identifier that is not a known column.
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Illegal(char),
    Eof,
}

pub(crate) struct Lexer<'a> {
    input: Vec<char>,
    pos: usize,
    // (name chars, column index), longest first.
    columns: Vec<(Vec<char>, usize)>,
    names: &'a [&'a str],
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &str, names: &'a [&'a str]) -> Self {
        let mut columns: Vec<(Vec<char>, usize)> = names
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_empty())
            .map(|(i, n)| (n.chars().collect(), i))
            .collect();
        columns.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            input: input.chars().collect(),
            pos: 0,
            columns,
            names,
        }
    }

    pub(crate) fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(&ch) = self.input.get(self.pos) else {
            return Token::Eof;
        };

        if !ch.is_ascii_digit() && ch != '.' {
            if let Some(tok) = self.read_column_name() {
                return tok;
            }
        }

        self.pos += 1;
        match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => self.read_bracketed(),
            c if c.is_ascii_digit() || c == '.' => self.read_number(c),
            c if is_ident_char(c) => self.read_identifier(c),
            c => Token::Illegal(c),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.input.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_column_name(&mut self) -> Option<Token> {
        let rest = &self.input[self.pos..];
        let (len, idx) = self.columns.iter().find_map(|(name, idx)| {
            if !rest.starts_with(name) {
                return None;
            }
            // `cost` must not swallow the head of `costs`.
            let ends_in_word = name.last().is_some_and(|c| is_ident_char(*c));
            let next_is_word = rest.get(name.len()).is_some_and(|c| is_ident_char(*c));
            if ends_in_word && next_is_word {
                None
            } else {
                Some((name.len(), *idx))
            }
        })?;
        self.pos += len;
        Some(Token::Column(idx))
    }

    fn read_bracketed(&mut self) -> Token {
        let start = self.pos;
        while self.input.get(self.pos).is_some_and(|c| *c != ']') {
            self.pos += 1;
        }
        if self.pos >= self.input.len() {
            return Token::Illegal('[');
        }
        let name: String = self.input[start..self.pos].iter().collect();
        self.pos += 1;
        match self.names.iter().position(|n| *n == name) {
            Some(idx) => Token::Column(idx),
            None => Token::Ident(name),
        }
    }

    fn read_number(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(&c) = self.input.get(self.pos) {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        match text.parse::<f64>() {
            Ok(v) => Token::Number(v),
            Err(_) => Token::Illegal(first),
        }
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(&c) = self.input.get(self.pos) {
            if is_ident_char(c) {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Ident(text)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
