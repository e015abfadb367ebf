//! Logos-based lexer for the restricted build-rule language.
//!
//! The language is a small subset of Starlark: rule calls with keyword
//! arguments, string/integer/boolean literals, lists, dict literals, `+`
//! concatenation, and `#` comments. Anything else is a lexical error and
//! aborts the run.

use logos::Logos;
use std::fmt;

/// Resolve the escapes in a quoted literal and drop the surrounding quotes.
fn unquote(raw: &str) -> String {
    let quote = raw.chars().next().unwrap_or('"');
    let inner = raw
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped @ ('\\' | '"' | '\'')) => out.push(escaped),
            // Unknown escapes pass through verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// A lexical token of the build-rule language.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `=`
    #[token("=")]
    Eq,
    /// `+`
    #[token("+")]
    Plus,
    /// `:`
    #[token(":")]
    Colon,
    /// Boolean literal `True`.
    #[token("True", priority = 10)]
    True,
    /// Boolean literal `False`.
    #[token("False", priority = 10)]
    False,
    /// An identifier: a rule name, keyword-argument name, or variable
    /// reference.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
    /// An integer literal.
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    /// A single- or double-quoted string literal, unescaped.
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| unquote(lex.slice()))]
    Str(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::LBrace => write!(f, "'{{'"),
            Self::RBrace => write!(f, "'}}'"),
            Self::Comma => write!(f, "','"),
            Self::Eq => write!(f, "'='"),
            Self::Plus => write!(f, "'+'"),
            Self::Colon => write!(f, "':'"),
            Self::True => write!(f, "'True'"),
            Self::False => write!(f, "'False'"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Int(value) => write!(f, "integer {value}"),
            Self::Str(value) => write!(f, "string \"{value}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos as _;

    fn lex(src: &str) -> Vec<Token> {
        Token::lexer(src)
            .collect::<Result<Vec<_>, _>>()
            .expect("lexes cleanly")
    }

    #[test]
    fn lexes_a_rule_call() {
        let tokens = lex("cc_library(\n    name = \"picopb\",  # runtime\n)");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("cc_library".to_owned()),
                Token::LParen,
                Token::Ident("name".to_owned()),
                Token::Eq,
                Token::Str("picopb".to_owned()),
                Token::Comma,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn resolves_string_escapes() {
        let tokens = lex(r#""a\"b\\c""#);
        assert_eq!(tokens, vec![Token::Str("a\"b\\c".to_owned())]);
    }

    #[test]
    fn keywords_win_over_identifiers() {
        let tokens = lex("True Falsey");
        assert_eq!(
            tokens,
            vec![Token::True, Token::Ident("Falsey".to_owned())]
        );
    }
}
