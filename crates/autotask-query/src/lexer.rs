//! Lexer (tokenizer) for filter expressions.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{QueryError, QueryResult};

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// Comma separating `in` list values.
    Comma,

    /// The AND keyword.
    And,

    /// The OR keyword.
    Or,

    /// A comparison operator keyword.
    Operator(OperatorKeyword),

    /// A quoted string with the quotes stripped.
    Str(String),

    /// A numeric literal, kept in raw text form until coercion.
    Number(String),

    /// A bareword identifier (field name or unquoted value).
    Ident(String),
}

impl Token {
    /// Returns a short human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::OpenParen => "(".to_string(),
            Token::CloseParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Operator(kw) => kw.as_str().to_string(),
            Token::Str(s) => format!("'{s}'"),
            Token::Number(n) => n.clone(),
            Token::Ident(i) => i.clone(),
        }
    }
}

/// A comparison operator keyword recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKeyword {
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `gt`
    Gt,
    /// `ge`
    Ge,
    /// `lt`
    Lt,
    /// `le`
    Le,
    /// `like` (wildcard-polymorphic)
    Like,
    /// `contains`
    Contains,
    /// `in`
    In,
}

impl OperatorKeyword {
    /// Returns the canonical keyword spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKeyword::Eq => "eq",
            OperatorKeyword::Ne => "ne",
            OperatorKeyword::Gt => "gt",
            OperatorKeyword::Ge => "ge",
            OperatorKeyword::Lt => "lt",
            OperatorKeyword::Le => "le",
            OperatorKeyword::Like => "like",
            OperatorKeyword::Contains => "contains",
            OperatorKeyword::In => "in",
        }
    }
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// Maps a lowercased keyword to its token, if it is a keyword.
fn keyword_token(lower: &str) -> Option<Token> {
    match lower {
        "and" => Some(Token::And),
        "or" => Some(Token::Or),
        "eq" => Some(Token::Operator(OperatorKeyword::Eq)),
        "ne" => Some(Token::Operator(OperatorKeyword::Ne)),
        "gt" => Some(Token::Operator(OperatorKeyword::Gt)),
        "ge" => Some(Token::Operator(OperatorKeyword::Ge)),
        "lt" => Some(Token::Operator(OperatorKeyword::Lt)),
        "le" => Some(Token::Operator(OperatorKeyword::Le)),
        "like" => Some(Token::Operator(OperatorKeyword::Like)),
        "contains" => Some(Token::Operator(OperatorKeyword::Contains)),
        "in" => Some(Token::Operator(OperatorKeyword::In)),
        _ => None,
    }
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads an identifier (alphanumeric word, underscores and dots allowed).
    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                ident.push(self.next_char().unwrap());
            } else {
                break;
            }
        }
        ident
    }

    /// Reads a quoted string (single or double quotes), stripping the quotes.
    fn read_quoted_string(&mut self, quote_char: char) -> String {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        while let Some(c) = self.next_char() {
            if c == quote_char {
                break;
            }
            // Handle escape sequences
            if c == '\\' {
                if let Some(escaped) = self.next_char() {
                    result.push(escaped);
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    /// Reads a numeric literal (digits with an optional single decimal point).
    /// The sign, if any, has already been consumed by the caller.
    fn read_number(&mut self, mut raw: String) -> String {
        let mut seen_dot = false;
        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                raw.push(self.next_char().unwrap());
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                raw.push(self.next_char().unwrap());
            } else {
                break;
            }
        }
        raw
    }

    /// Returns the next token with its position, or None at end of input.
    pub fn next_token(&mut self) -> QueryResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(&c) = self.peek() else {
            return Ok(None);
        };
        let token_start = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                Token::OpenParen
            }
            ')' => {
                self.next_char();
                Token::CloseParen
            }
            ',' => {
                self.next_char();
                Token::Comma
            }

            // Quoted strings
            '"' | '\'' => Token::Str(self.read_quoted_string(c)),

            // Dash-prefixed operator alias (`-eq`, `-and`, ...) or a signed
            // number. A dash followed by anything else is unsupported.
            '-' | '+' => {
                let sign = c;
                self.next_char();
                match self.peek() {
                    Some(&d) if d.is_ascii_digit() => {
                        Token::Number(self.read_number(sign.to_string()))
                    }
                    Some(&a) if sign == '-' && a.is_alphabetic() => {
                        let word = self.read_identifier();
                        let lower = word.to_lowercase();
                        keyword_token(&lower).ok_or_else(|| {
                            QueryError::unsupported_operator(format!("-{word}"), token_start)
                        })?
                    }
                    _ => {
                        return Err(QueryError::Syntax {
                            character: sign,
                            position: token_start,
                        })
                    }
                }
            }

            // Numeric literal
            _ if c.is_ascii_digit() => Token::Number(self.read_number(String::new())),

            // Keywords and bareword identifiers
            _ if c.is_alphabetic() || c == '_' => {
                let word = self.read_identifier();
                let lower = word.to_lowercase();
                keyword_token(&lower).unwrap_or(Token::Ident(word))
            }

            other => {
                return Err(QueryError::Syntax {
                    character: other,
                    position: token_start,
                })
            }
        };

        Ok(Some(PositionedToken {
            token,
            position: token_start,
        }))
    }

    /// Collects all tokens, failing on the first unrecognized character.
    pub fn tokenize(mut self) -> QueryResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(positioned) = self.next_token()? {
            tokens.push(positioned);
        }
        Ok(tokens)
    }
}
