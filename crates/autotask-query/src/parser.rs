//! Recursive descent parser for filter expressions.

use crate::ast::{ComparisonOp, FilterNode, FilterTree, FilterValue};
use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, OperatorKeyword, PositionedToken, Token};

/// Parser for Autotask filter expressions.
///
/// This parser implements a recursive descent parser for the filter grammar.
/// It supports field comparisons with the API's operator set, `in` value
/// lists, `like` wildcard matching, and boolean operators with proper
/// precedence.
///
/// # Grammar
///
/// ```text
/// expression ::= term ("or" term)*
/// term       ::= factor ("and" factor)*
/// factor     ::= "(" expression ")" | comparison
/// comparison ::= identifier operator (value | "(" value_list ")")
/// value_list ::= value ("," value)*
/// value      ::= quoted_string | number | identifier
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `and` - binary, left-associative
/// 2. `or` - binary, left-associative
///
/// Consecutive same-kind conjunctions fold into one flat group rather than
/// a nested binary tree, matching the flat-list filter wire format.
///
/// # Example
///
/// ```
/// use autotask_query_rs::{QueryParser, FilterNode, GroupOp};
///
/// let tree = QueryParser::parse("a eq 1 and b eq 2 or c eq 3").unwrap();
///
/// // "and" binds tighter than "or".
/// match tree.root() {
///     FilterNode::Group { op: GroupOp::Or, items } => assert_eq!(items.len(), 2),
///     other => panic!("expected OR at the root, got {other:?}"),
/// }
/// ```
pub struct QueryParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl QueryParser {
    /// Compiles a filter expression string into a filter tree.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyExpression` if the input contains no tokens.
    ///
    /// Returns `QueryError::Syntax` for characters the tokenizer does not
    /// recognize, `QueryError::UnsupportedOperator` for operator tokens
    /// outside the supported set, and `QueryError::UnexpectedToken` when a
    /// token is left over after the top-level expression (for example an
    /// extra closing parenthesis).
    pub fn parse(input: &str) -> QueryResult<FilterTree> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyExpression);
        }

        let tokens = Lexer::new(trimmed).tokenize()?;
        if tokens.is_empty() {
            return Err(QueryError::EmptyExpression);
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };
        let root = parser.parse_expression()?;

        // Anything left over means the expression was malformed.
        if let Some(remaining) = parser.peek() {
            return Err(QueryError::unexpected_token(
                remaining.token.describe(),
                remaining.position,
            ));
        }

        Ok(FilterTree::new(root))
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<&PositionedToken> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &Token) -> bool {
        self.peek().map(|pt| &pt.token) == Some(expected)
    }

    /// Parses OR expressions: `term ("or" term)*`
    fn parse_expression(&mut self) -> QueryResult<FilterNode> {
        let mut left = self.parse_term()?;

        while self.check(&Token::Or) {
            self.advance(); // consume 'or'
            let right = self.parse_term()?;
            left = FilterNode::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `factor ("and" factor)*`
    fn parse_term(&mut self) -> QueryResult<FilterNode> {
        let mut left = self.parse_factor()?;

        while self.check(&Token::And) {
            self.advance(); // consume 'and'
            let right = self.parse_factor()?;
            left = FilterNode::and(left, right);
        }

        Ok(left)
    }

    /// Parses primary expressions: `"(" expression ")" | comparison`
    fn parse_factor(&mut self) -> QueryResult<FilterNode> {
        if self.check(&Token::OpenParen) {
            self.advance(); // consume '('
            let inner = self.parse_expression()?;
            if !self.check(&Token::CloseParen) {
                return Err(QueryError::UnclosedParenthesis);
            }
            self.advance(); // consume ')'
            return Ok(inner);
        }

        self.parse_comparison()
    }

    /// Parses a comparison: `identifier operator (value | "(" value_list ")")`
    fn parse_comparison(&mut self) -> QueryResult<FilterNode> {
        let field = {
            let token = self.advance().ok_or(QueryError::UnexpectedEndOfInput)?;
            match &token.token {
                Token::Ident(name) => name.clone(),
                other => {
                    return Err(QueryError::unexpected_token(
                        other.describe(),
                        token.position,
                    ))
                }
            }
        };

        let keyword = {
            let token = self.advance().ok_or(QueryError::UnexpectedEndOfInput)?;
            match &token.token {
                Token::Operator(kw) => *kw,
                // A bareword in operator position is an operator the
                // grammar does not support, not a generic parse failure.
                Token::Ident(word) => {
                    return Err(QueryError::unsupported_operator(
                        word.clone(),
                        token.position,
                    ))
                }
                other => {
                    return Err(QueryError::unexpected_token(
                        other.describe(),
                        token.position,
                    ))
                }
            }
        };

        match keyword {
            OperatorKeyword::In => {
                let values = self.parse_value_list()?;
                Ok(FilterNode::Comparison {
                    field,
                    op: ComparisonOp::In,
                    value: FilterValue::List(values),
                    udf: false,
                })
            }
            OperatorKeyword::Like => {
                let value = self.parse_value()?;
                let (op, value) = map_like(value);
                Ok(FilterNode::Comparison {
                    field,
                    op,
                    value,
                    udf: false,
                })
            }
            _ => {
                let op = match keyword {
                    OperatorKeyword::Eq => ComparisonOp::Eq,
                    OperatorKeyword::Ne => ComparisonOp::NotEq,
                    OperatorKeyword::Gt => ComparisonOp::Gt,
                    OperatorKeyword::Ge => ComparisonOp::Gte,
                    OperatorKeyword::Lt => ComparisonOp::Lt,
                    OperatorKeyword::Le => ComparisonOp::Lte,
                    OperatorKeyword::Contains => ComparisonOp::Contains,
                    OperatorKeyword::Like | OperatorKeyword::In => unreachable!(),
                };
                let value = self.parse_value()?;
                Ok(FilterNode::Comparison {
                    field,
                    op,
                    value,
                    udf: false,
                })
            }
        }
    }

    /// Parses a parenthesized, comma-separated value list for `in`.
    fn parse_value_list(&mut self) -> QueryResult<Vec<FilterValue>> {
        {
            let token = self.advance().ok_or(QueryError::UnexpectedEndOfInput)?;
            if token.token != Token::OpenParen {
                return Err(QueryError::unexpected_token(
                    token.token.describe(),
                    token.position,
                ));
            }
        }

        if self.check(&Token::CloseParen) {
            return Err(QueryError::EmptyValueList);
        }

        let mut values = Vec::new();
        loop {
            values.push(self.parse_value()?);

            let token = self.advance().ok_or(QueryError::UnclosedParenthesis)?;
            match &token.token {
                Token::Comma => continue,
                Token::CloseParen => return Ok(values),
                other => {
                    return Err(QueryError::unexpected_token(
                        other.describe(),
                        token.position,
                    ))
                }
            }
        }
    }

    /// Parses a single value, coercing it to a typed filter value.
    fn parse_value(&mut self) -> QueryResult<FilterValue> {
        let token = self.advance().ok_or(QueryError::UnexpectedEndOfInput)?;
        match &token.token {
            Token::Str(s) => Ok(FilterValue::String(s.clone())),
            Token::Number(raw) => Ok(coerce_number(raw)),
            // A bareword in value position stays a raw string.
            Token::Ident(word) => Ok(FilterValue::String(word.clone())),
            other => Err(QueryError::unexpected_token(
                other.describe(),
                token.position,
            )),
        }
    }
}

/// Coerces a raw numeric literal: integer pattern first, then decimal,
/// anything else stays a raw string.
fn coerce_number(raw: &str) -> FilterValue {
    if let Ok(n) = raw.parse::<i64>() {
        FilterValue::Int(n)
    } else if let Ok(f) = raw.parse::<f64>() {
        FilterValue::Float(f)
    } else {
        FilterValue::String(raw.to_string())
    }
}

/// Maps a `like` value onto a concrete operator based on its `*` wildcards.
///
/// `*x*` becomes `contains`, a trailing `*` becomes `beginsWith`, a leading
/// `*` becomes `endsWith`, and a value without wildcards defaults to
/// `contains`. Non-string values also default to `contains`.
fn map_like(value: FilterValue) -> (ComparisonOp, FilterValue) {
    let FilterValue::String(s) = value else {
        return (ComparisonOp::Contains, value);
    };

    let starts = s.starts_with('*');
    let ends = s.ends_with('*');

    if starts && ends && s.len() > 1 {
        let inner = &s[1..s.len() - 1];
        (ComparisonOp::Contains, FilterValue::String(inner.to_string()))
    } else if ends {
        let prefix = &s[..s.len() - 1];
        (
            ComparisonOp::BeginsWith,
            FilterValue::String(prefix.to_string()),
        )
    } else if starts {
        let suffix = &s[1..];
        (
            ComparisonOp::EndsWith,
            FilterValue::String(suffix.to_string()),
        )
    } else {
        (ComparisonOp::Contains, FilterValue::String(s))
    }
}
