//! Math expression compilation and evaluation.
//!
//! Axis transforms and the curve fitter both take user-entered
//! expressions ("x^2", "A*exp(-B*x)+C"). Expressions are compiled once
//! into an [`Expr`] tree and then evaluated against a variable scope.
//!
//! Grammar: `+ - * / ^` with the usual precedence, `^` right
//! associative, unary minus, parentheses, single-argument function
//! calls, and the constants `pi` and `e`.

use std::collections::HashMap;
use std::fmt;

/// A compiled expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

/// Built-in single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Sign,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "exp" => Func::Exp,
            "ln" => Func::Ln,
            "log" | "log10" => Func::Log10,
            "log2" => Func::Log2,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "round" => Func::Round,
            "sign" => Func::Sign,
            _ => return None,
        })
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Log10 => v.log10(),
            Func::Log2 => v.log2(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
            Func::Floor => v.floor(),
            Func::Ceil => v.ceil(),
            Func::Round => v.round(),
            Func::Sign => {
                if v > 0.0 {
                    1.0
                } else if v < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Expression compile or evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError(pub String);

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExprError {}

impl Expr {
    /// Compile an expression string.
    pub fn compile(src: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_sum()?;
        match parser.peek() {
            Token::End => Ok(expr),
            tok => Err(ExprError(format!("unexpected token {tok:?}"))),
        }
    }

    /// Evaluate against a variable scope. Unknown variables are an
    /// error; non-finite results are returned as-is for the caller to
    /// filter.
    pub fn eval(&self, scope: &HashMap<String, f64>) -> Result<f64, ExprError> {
        Ok(match self {
            Expr::Const(v) => *v,
            Expr::Var(name) => *scope
                .get(name)
                .ok_or_else(|| ExprError(format!("unknown variable '{name}'")))?,
            Expr::Neg(a) => -a.eval(scope)?,
            Expr::Add(a, b) => a.eval(scope)? + b.eval(scope)?,
            Expr::Sub(a, b) => a.eval(scope)? - b.eval(scope)?,
            Expr::Mul(a, b) => a.eval(scope)? * b.eval(scope)?,
            Expr::Div(a, b) => a.eval(scope)? / b.eval(scope)?,
            Expr::Pow(a, b) => a.eval(scope)?.powf(b.eval(scope)?),
            Expr::Call(f, a) => f.apply(a.eval(scope)?),
        })
    }

    /// Collect the distinct variable names referenced by the tree.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(name) => {
                if !out.iter().any(|v| v == name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(a) | Expr::Call(_, a) => a.collect_vars(out),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    End,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent suffix, only when followed by a digit
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError(format!("bad number '{text}'")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c => return Err(ExprError(format!("unexpected character '{c}'"))),
        }
    }
    tokens.push(Token::End);
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn next(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn parse_sum(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_product()?;
        loop {
            match self.peek() {
                Token::Plus => {
                    self.next();
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.parse_product()?));
                }
                Token::Minus => {
                    self.next();
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.parse_product()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_product(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Token::Star => {
                    self.next();
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.parse_unary()?));
                }
                Token::Slash => {
                    self.next();
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.parse_unary()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if *self.peek() == Token::Minus {
            self.next();
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_power()
    }

    // right associative: 2^3^2 == 2^(3^2)
    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_atom()?;
        if *self.peek() == Token::Caret {
            self.next();
            let exp = self.parse_unary()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Token::Number(v) => Ok(Expr::Const(v)),
            Token::Ident(name) => {
                if *self.peek() == Token::LParen {
                    let func = Func::from_name(&name)
                        .ok_or_else(|| ExprError(format!("unknown function '{name}'")))?;
                    self.next();
                    let arg = self.parse_sum()?;
                    match self.next() {
                        Token::RParen => Ok(Expr::Call(func, Box::new(arg))),
                        tok => Err(ExprError(format!("expected ')', found {tok:?}"))),
                    }
                } else {
                    match name.as_str() {
                        "pi" => Ok(Expr::Const(std::f64::consts::PI)),
                        "e" => Ok(Expr::Const(std::f64::consts::E)),
                        _ => Ok(Expr::Var(name)),
                    }
                }
            }
            Token::LParen => {
                let inner = self.parse_sum()?;
                match self.next() {
                    Token::RParen => Ok(inner),
                    tok => Err(ExprError(format!("expected ')', found {tok:?}"))),
                }
            }
            tok => Err(ExprError(format!("unexpected token {tok:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(src: &str, vars: &[(&str, f64)]) -> f64 {
        let scope: HashMap<String, f64> =
            vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Expr::compile(src).unwrap().eval(&scope).unwrap()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_relative_eq!(eval("1+2*3", &[]), 7.0);
        assert_relative_eq!(eval("(1+2)*3", &[]), 9.0);
        assert_relative_eq!(eval("2^3^2", &[]), 512.0);
        assert_relative_eq!(eval("-2^2", &[]), -4.0);
        assert_relative_eq!(eval("10-4-3", &[]), 3.0);
    }

    #[test]
    fn variables_and_functions() {
        assert_relative_eq!(eval("A*x+B", &[("A", 2.0), ("x", 3.0), ("B", 1.0)]), 7.0);
        assert_relative_eq!(eval("exp(0)", &[]), 1.0);
        assert_relative_eq!(eval("sqrt(x)", &[("x", 16.0)]), 4.0);
        assert_relative_eq!(eval("sin(pi/2)", &[]), 1.0);
        assert_relative_eq!(eval("log(1000)", &[]), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn scientific_notation_literals() {
        assert_relative_eq!(eval("1.5e3", &[]), 1500.0);
        assert_relative_eq!(eval("2e-2", &[]), 0.02);
        // bare "e" is still Euler's constant
        assert_relative_eq!(eval("e", &[]), std::f64::consts::E);
    }

    #[test]
    fn collects_distinct_variables() {
        let expr = Expr::compile("A*x^2 + B*x + A").unwrap();
        let mut vars = expr.variables();
        vars.sort();
        assert_eq!(vars, vec!["A".to_string(), "B".to_string(), "x".to_string()]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Expr::compile("2*").is_err());
        assert!(Expr::compile("foo(1)").is_err());
        assert!(Expr::compile("(1+2").is_err());
        assert!(Expr::compile("1 $ 2").is_err());
    }

    #[test]
    fn unknown_variable_is_an_eval_error() {
        let expr = Expr::compile("x+y").unwrap();
        let scope: HashMap<String, f64> = [("x".to_string(), 1.0)].into();
        assert!(expr.eval(&scope).is_err());
    }
}
