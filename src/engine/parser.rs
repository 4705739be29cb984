use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i64 as parse_i64, multispace1, not_line_ending, satisfy},
    combinator::{all_consuming, not, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use tracing::{debug, error, trace};

use crate::engine::ast::Value;
use crate::engine::eval::LispError;

const SYMBOL_INITIAL_CHARS: &str = "!$%&*/:<=>?@^_~+-";
const SYMBOL_SUBSEQUENT_CHARS: &str = "!$%&*/:<=>?@^_~+-.#";

fn is_symbol_initial(c: char) -> bool {
    c.is_alphabetic() || SYMBOL_INITIAL_CHARS.contains(c)
}

fn is_symbol_subsequent(c: char) -> bool {
    c.is_alphanumeric() || SYMBOL_SUBSEQUENT_CHARS.contains(c)
}

// Consumes whitespace and `;` line comments. Always succeeds.
fn skip_ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((multispace1, recognize(pair(char(';'), not_line_ending))))),
    )
    .parse(input)
}

// An integer that is not immediately followed by symbol characters, so `12ab` is rejected.
fn parse_number_raw(input: &str) -> IResult<&str, Value> {
    terminated(parse_i64, not(satisfy(is_symbol_subsequent)))
        .map(Value::Number)
        .parse(input)
}

fn parse_bool_raw(input: &str) -> IResult<&str, Value> {
    terminated(
        alt((value(Value::Bool(true), tag("#t")), value(Value::Bool(false), tag("#f")))),
        not(satisfy(is_symbol_subsequent)),
    )
    .parse(input)
}

fn parse_symbol_raw(input: &str) -> IResult<&str, Value> {
    recognize(pair(satisfy(is_symbol_initial), many0(satisfy(is_symbol_subsequent))))
        .map(|s: &str| Value::Atom(s.to_string()))
        .parse(input)
}

// `(`, any number of expressions, `)`. Recursive with `expr_raw`.
fn list_raw(input: &str) -> IResult<&str, Value> {
    delimited(
        char('('),
        many0(preceded(skip_ws, expr_raw)),
        preceded(skip_ws, char(')')),
    )
    .map(Value::List)
    .parse(input)
}

fn expr_raw(input: &str) -> IResult<&str, Value> {
    alt((parse_number_raw, parse_bool_raw, list_raw, parse_symbol_raw)).parse(input)
}

/// Parses a single expression, consuming surrounding whitespace and comments.
/// The unparsed rest of the input is returned alongside the value.
#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
pub fn parse_expr(input: &str) -> IResult<&str, Value> {
    trace!("Attempting to parse expression");
    delimited(skip_ws, expr_raw, skip_ws).parse(input)
}

/// Parses every top-level expression in `input`. The whole input must be consumed.
#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
pub fn parse_program(input: &str) -> Result<Vec<Value>, LispError> {
    let result = all_consuming(terminated(many0(parse_expr), skip_ws)).parse(input);
    match result {
        Ok((_, forms)) => {
            debug!(count = forms.len(), "Parsed top-level forms");
            Ok(forms)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let message = describe_syntax_error(input, e.input);
            error!(%message, "Syntax error");
            Err(LispError::Syntax(message))
        }
        Err(nom::Err::Incomplete(_)) => Err(LispError::Syntax("incomplete input".to_string())),
    }
}

/// Turns the unparsed remainder of `input` into a short message.
fn describe_syntax_error(input: &str, remaining: &str) -> String {
    let position = input.len().saturating_sub(remaining.len());
    let rest = remaining.trim_start();
    if rest.starts_with(')') {
        return format!("unexpected ')' at position {}", input.len() - rest.len());
    }
    if paren_depth(rest) > 0 {
        return "missing ')'".to_string();
    }
    let snippet: String = rest.chars().take(10).collect();
    format!("invalid syntax near '{}' at position {}", snippet, position)
}

/// Net count of unclosed parentheses, ignoring comment text.
pub fn paren_depth(source: &str) -> i64 {
    let mut depth = 0;
    for line in source.lines() {
        let code = line.split(';').next().unwrap_or("");
        for c in code.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
    }
    depth
}
