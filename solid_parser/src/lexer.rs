//! Lexer for Solid source code
//!
//! Wraps the logos-generated lexer and validates the pieces logos cannot:
//! string escapes, numeric separators and float exponents.

use logos::Logos;

use crate::error::LexError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Escapes accepted inside single-quoted strings
const ESCAPES: &[u8] = b"'\\ntr0";

/// Solid lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    peeked: Option<Result<SpannedToken<'a>, LexError>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, LexError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, LexError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, LexError>> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        let span = self.source_map.span(range.start, range.end);
        let text = &self.source[range.start..range.end];

        Some(match result {
            Ok(Token::Quote) => {
                // logos only falls back to a lone quote when the literal never closes
                let end = self.source.len();
                self.inner.bump(end - range.end);
                Err(LexError::UnterminatedString {
                    span: self.source_map.span(range.start, end),
                })
            }
            Ok(Token::String) => self
                .check_escapes(text, range.start)
                .map(|()| SpannedToken::new(Token::String, span, text)),
            Ok(Token::Integer) => {
                check_separators(text, span).map(|()| SpannedToken::new(Token::Integer, span, text))
            }
            Ok(Token::Float) => check_exponent(text, span)
                .and_then(|()| check_separators(text, span))
                .map(|()| SpannedToken::new(Token::Float, span, text)),
            Ok(token) => Ok(SpannedToken::new(token, span, text)),
            Err(()) => Err(LexError::UnrecognizedCharacter {
                character: text.to_string(),
                span,
            }),
        })
    }

    /// Reject escape sequences other than those in [`ESCAPES`].
    /// Uses memchr to jump between backslashes.
    fn check_escapes(&self, text: &str, offset: usize) -> Result<(), LexError> {
        let bytes = text.as_bytes();
        let mut pos = 0;
        while let Some(found) = memchr::memchr(b'\\', &bytes[pos..]) {
            pos += found;
            let Some(&escaped) = bytes.get(pos + 1) else {
                break;
            };
            if !ESCAPES.contains(&escaped) {
                let width = text[pos + 1..].chars().next().map_or(1, char::len_utf8);
                let start = offset + pos;
                return Err(LexError::InvalidEscape {
                    sequence: text[pos..pos + 1 + width].to_string(),
                    span: self.source_map.span(start, start + 1 + width),
                });
            }
            pos += 2;
        }
        Ok(())
    }

    /// Collect all tokens
    pub fn collect_all(mut self) -> Vec<Result<SpannedToken<'a>, LexError>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.inner.span().end)
            .field("peeked", &self.peeked)
            .finish()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// A `_` must sit between two digits
fn check_separators(text: &str, span: Span) -> Result<(), LexError> {
    let bytes = text.as_bytes();
    let misplaced = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'_'
            && !(i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if misplaced {
        Err(LexError::InvalidSeparator {
            literal: text.to_string(),
            span,
        })
    } else {
        Ok(())
    }
}

/// An exponent marker must be followed by at least one digit
fn check_exponent(text: &str, span: Span) -> Result<(), LexError> {
    let Some(marker) = text.find(['e', 'E']) else {
        return Ok(());
    };
    let digits = text[marker + 1..].trim_start_matches(['+', '-']);
    if digits.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LexError::MalformedExponent {
            literal: text.to_string(),
            span,
        })
    }
}

/// Tokenize source code into a vector of spanned tokens
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, LexError>> {
    Lexer::new(source).collect_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("let unfixed x: int = 1 + 2.5;"),
            vec![
                Token::KwLet,
                Token::KwUnfixed,
                Token::Identifier,
                Token::Colon,
                Token::KwInt,
                Token::Eq,
                Token::Integer,
                Token::Plus,
                Token::Float,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = tokenize("foo +\n  bar")
            .into_iter()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].span.start, tokens[0].span.end), (0, 3));
        assert_eq!(tokens[0].text, "foo");
        assert_eq!((tokens[2].span.start_line, tokens[2].span.start_column), (2, 3));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r"'a\'b\n' 'bad\q'");
        assert!(tokens[0].is_ok());
        match &tokens[1] {
            Err(LexError::InvalidEscape { sequence, span }) => {
                assert_eq!(sequence, r"\q");
                assert_eq!(span.start_column, 14);
            }
            other => panic!("expected invalid escape, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("1; 'never closed");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(
            tokens[2],
            Err(LexError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_numeric_separators() {
        assert!(tokenize("1_000_000")[0].is_ok());
        assert!(tokenize("3.141_592")[0].is_ok());
        for bad in ["1__0", "1_", "1_.5", "1._5"] {
            let first = &tokenize(bad)[0];
            assert!(
                matches!(first, Err(LexError::InvalidSeparator { .. })),
                "{bad} should be rejected, got {first:?}"
            );
        }
    }

    #[test]
    fn test_malformed_exponent() {
        assert!(tokenize("2.5e10")[0].is_ok());
        assert!(tokenize("2.5E-3")[0].is_ok());
        assert!(matches!(
            tokenize("2.5e")[0],
            Err(LexError::MalformedExponent { .. })
        ));
        assert!(matches!(
            tokenize("2.5e+_")[0],
            Err(LexError::MalformedExponent { .. })
        ));
    }

    #[test]
    fn test_unrecognized_character() {
        let tokens = tokenize("1 # 2");
        assert!(matches!(
            &tokens[1],
            Err(LexError::UnrecognizedCharacter { character, .. }) if character == "#"
        ));
        assert!(tokens[2].is_ok());
    }

    #[test]
    fn test_peek() {
        let mut lexer = Lexer::new("a b");

        let peeked = lexer.peek().unwrap().as_ref().unwrap();
        assert_eq!(peeked.text, "a");
        let next = lexer.next_token().unwrap().unwrap();
        assert_eq!(next.text, "a");
        let next = lexer.next_token().unwrap().unwrap();
        assert_eq!(next.text, "b");
        assert!(lexer.next_token().is_none());
    }
}
