//! Recursive-descent parser for assertion snippets.
//!
//! Grammar, loosest to tightest binding:
//! `||` — `&&` — equality — comparison — `+` — unary `!` — postfix
//! (member access and calls) — primary.

use super::EvalError;
use super::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Ident(String),
    Member {
        object: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Not(Box<Expr>),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
}

/// Hard cap on grouping and unary nesting. Author-supplied snippets are
/// untrusted; without a cap, deeply nested parens overflow the parse stack
/// and abort the whole process instead of failing one test.
pub(super) const MAX_DEPTH: usize = 64;

/// Upper bound on snippet size, in tokens. Keeps hostile inputs from
/// building arbitrarily large trees in the first place; tearing down a huge
/// left-leaning tree recurses per node just like walking it does.
pub(super) const MAX_TOKENS: usize = 4096;

pub fn parse(tokens: &[Token]) -> Result<Expr, EvalError> {
    if tokens.len() > MAX_TOKENS {
        return Err(EvalError::SnippetTooLarge);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    if parser.pos != tokens.len() {
        return Err(EvalError::UnexpectedToken(format!(
            "{:?}",
            tokens[parser.pos]
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(EvalError::NestingTooDeep)
        } else {
            Ok(())
        }
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), EvalError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(EvalError::UnexpectedToken(format!("{token:?}"))),
            None => Err(EvalError::UnexpectedEnd),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        self.descend()?;
        let expr = self.parse_or_inner();
        self.ascend();
        expr
    }

    fn parse_or_inner(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_equality()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::StrictEq) | Some(Token::LooseEq) => BinaryOp::Eq,
                Some(Token::StrictNe) | Some(Token::LooseNe) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&Token::Plus) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Add,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        if self.peek() == Some(&Token::Bang) {
            self.advance();
            self.descend()?;
            let operand = self.parse_unary();
            self.ascend();
            return Ok(Expr::Not(Box::new(operand?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let name = match self.advance() {
                        Some(Token::Ident(name)) => name.clone(),
                        Some(token) => {
                            return Err(EvalError::UnexpectedToken(format!("{token:?}")));
                        }
                        None => return Err(EvalError::UnexpectedEnd),
                    };
                    expr = Expr::Member {
                        object: Box::new(expr),
                        name,
                    };
                }
                Some(Token::LParen) => {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.parse_or()?);
                            match self.peek() {
                                Some(Token::Comma) => {
                                    self.advance();
                                }
                                _ => break,
                            }
                        }
                    }
                    self.expect(&Token::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Str(value)) => Ok(Expr::Str(value.clone())),
            Some(Token::Num(value)) => Ok(Expr::Num(*value)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Null) => Ok(Expr::Null),
            Some(Token::Ident(name)) => Ok(Expr::Ident(name.clone())),
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(token) => Err(EvalError::UnexpectedToken(format!("{token:?}"))),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Expr, EvalError> {
        parse(&tokenize(source)?)
    }

    #[test]
    fn test_parse_member_call_chain() {
        let expr = parse_str("document.querySelector('h1').textContent").unwrap();
        let Expr::Member { object, name } = expr else {
            panic!("expected member access");
        };
        assert_eq!(name, "textContent");
        assert!(matches!(*object, Expr::Call { .. }));
    }

    #[test]
    fn test_parse_precedence() {
        // `a === b && c` groups the equality first.
        let expr = parse_str("1 === 2 && true").unwrap();
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::And);
        assert!(matches!(
            *left,
            Expr::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_call_arguments() {
        let expr = parse_str("resolveAfter(100, true)").unwrap();
        let Expr::Call { args, .. } = expr else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_parse_parenthesized() {
        let expr = parse_str("!(1 < 2)").unwrap();
        assert!(matches!(expr, Expr::Not(_)));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            parse_str("1 2"),
            Err(EvalError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_dangling_operator_rejected() {
        assert_eq!(parse_str("1 &&"), Err(EvalError::UnexpectedEnd));
    }

    #[test]
    fn test_deep_paren_nesting_rejected_not_fatal() {
        let depth = 1_000;
        let snippet = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_str(&snippet), Err(EvalError::NestingTooDeep));
    }

    #[test]
    fn test_deep_bang_nesting_rejected_not_fatal() {
        let snippet = format!("{}true", "!".repeat(1_000));
        assert_eq!(parse_str(&snippet), Err(EvalError::NestingTooDeep));
    }

    #[test]
    fn test_oversized_snippet_rejected_before_parsing() {
        let depth = 200_000;
        let snippet = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_str(&snippet), Err(EvalError::SnippetTooLarge));
    }

    #[test]
    fn test_reasonable_nesting_still_parses() {
        let snippet = format!("{}1 < 2{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_str(&snippet).is_ok());
    }
}
