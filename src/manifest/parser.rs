//! Recursive-descent parser for build files.
//!
//! Operates on the token stream produced by [`super::lexer`], not on source
//! text, and performs no error recovery: the first failure aborts the run.
//! Value forms the translation cannot use — dict literals, nested calls such
//! as `glob(...)` and `select(...)`, and references to variables the source
//! system injected — evaluate to an empty list, mirroring the original
//! interpreter's tolerance. Each such evaluation is logged at debug level so
//! dropped constructs stay diagnosable.

use std::ops::Range;

use indexmap::IndexMap;
use logos::Logos as _;
use tracing::debug;

use super::diagnostics::ParseError;
use super::lexer::Token;
use crate::ast::{RuleInvocation, Value};

/// Parse `src` into its top-level rule invocations, in file order.
pub(crate) fn parse(name: &str, src: &str) -> Result<Vec<RuleInvocation>, ParseError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(src).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::new(
                    name,
                    src,
                    (span.start, span.len()),
                    "unrecognised character",
                    "not part of the build-rule language",
                ));
            }
        }
    }
    Parser {
        name,
        src,
        tokens,
        pos: 0,
    }
    .file()
}

struct Parser<'src> {
    name: &'src str,
    src: &'src str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

impl Parser<'_> {
    fn file(mut self) -> Result<Vec<RuleInvocation>, ParseError> {
        let mut invocations = Vec::new();
        while self.pos < self.tokens.len() {
            let callee = self.expect_ident("a rule name")?;
            match self.peek() {
                Some(Token::LParen) => {
                    let (args, attrs) = self.call_arguments()?;
                    invocations.push(RuleInvocation {
                        rule: callee,
                        args,
                        attrs,
                    });
                }
                Some(Token::Eq) => {
                    // Module-level assignment; the bound value is never
                    // consulted again.
                    self.pos += 1;
                    let _ = self.expression()?;
                    debug!(name = %callee, "discarding module-level assignment");
                }
                _ => {
                    return Err(self.unexpected("'(' to open a rule call"));
                }
            }
        }
        Ok(invocations)
    }

    /// Parse `( arg, ... )` after the callee name has been consumed.
    fn call_arguments(&mut self) -> Result<(Vec<Value>, IndexMap<String, Value>), ParseError> {
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        let mut attrs = IndexMap::new();
        loop {
            if matches!(self.peek(), Some(Token::RParen)) {
                self.pos += 1;
                break;
            }
            if self.at_keyword_argument() {
                let key = self.expect_ident("an attribute name")?;
                self.expect(&Token::Eq, "'='")?;
                let value = self.expression()?;
                attrs.insert(key, value);
            } else {
                args.push(self.expression()?);
            }
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok((args, attrs))
    }

    /// One or more terms joined by `+`.
    fn expression(&mut self) -> Result<Value, ParseError> {
        let mut value = self.term()?;
        while matches!(self.peek(), Some(Token::Plus)) {
            self.pos += 1;
            value = concat(value, self.term()?);
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Value, ParseError> {
        let token = match self.bump() {
            Some(entry) => entry,
            None => return Err(self.unexpected("a value")),
        };
        match token {
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Int(n) => Ok(Value::Int(n)),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::LBracket => self.list(),
            Token::LBrace => self.dict(),
            Token::Ident(name) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    // Nested call in value position: glob(), select(), and
                    // friends have no translation target.
                    let _ = self.call_arguments()?;
                    debug!(call = %name, "nested call evaluates to an empty list");
                } else {
                    debug!(variable = %name, "variable reference evaluates to an empty list");
                }
                Ok(Value::List(Vec::new()))
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("a value"))
            }
        }
    }

    /// The remainder of a `[...]` literal after the opening bracket.
    fn list(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        loop {
            if matches!(self.peek(), Some(Token::RBracket)) {
                self.pos += 1;
                break;
            }
            items.push(self.expression()?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RBracket) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
        Ok(Value::List(items))
    }

    /// The remainder of a `{...}` literal after the opening brace.
    ///
    /// Dict literals only occur inside `select` branches; the entries are
    /// parsed for well-formedness and discarded.
    fn dict(&mut self) -> Result<Value, ParseError> {
        loop {
            if matches!(self.peek(), Some(Token::RBrace)) {
                self.pos += 1;
                break;
            }
            let _ = self.expression()?;
            self.expect(&Token::Colon, "':'")?;
            let _ = self.expression()?;
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
        debug!("dict literal evaluates to an empty list");
        Ok(Value::List(Vec::new()))
    }

    fn at_keyword_argument(&self) -> bool {
        matches!(self.peek(), Some(Token::Ident(_)))
            && matches!(self.peek_next(), Some(Token::Eq))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(token, _)| token)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, describe: &str) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(describe))
        }
    }

    fn expect_ident(&mut self, describe: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(describe)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => ParseError::new(
                self.name,
                self.src,
                (span.start, span.len()),
                format!("expected {expected}, found {token}"),
                format!("expected {expected}"),
            ),
            None => ParseError::new(
                self.name,
                self.src,
                (self.src.len(), 0),
                format!("expected {expected}, found end of file"),
                "file ends here",
            ),
        }
    }
}

/// Evaluate `lhs + rhs`.
///
/// Like-typed operands concatenate or add; mixed operands coerce to lists
/// and concatenate, keeping the function total.
fn concat(lhs: Value, rhs: Value) -> Value {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
        (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        (a, b) => {
            let mut items = into_items(a);
            items.extend(into_items(b));
            Value::List(items)
        }
    }
}

fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        other => vec![other],
    }
}
