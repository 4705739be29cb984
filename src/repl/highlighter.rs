use crate::engine::parser::paren_depth;
use crate::engine::special_forms::is_special_form;
use lazy_static::lazy_static;
use owo_colors::OwoColorize;
use regex::Regex;
use rustyline::highlight::Highlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Hinter};
use std::borrow::Cow::{self, Borrowed, Owned};

lazy_static! {
    // Comments, single parentheses, or a run of anything else up to the next delimiter.
    static ref TOKEN_RE: Regex = Regex::new(r"(;.*)|([()])|([^\s();]+)").expect("token regex is valid");
    static ref NUMBER_RE: Regex = Regex::new(r"^-?\d+$").expect("number regex is valid");
}

/// Wraps each token of `line` in ANSI colors. Plain symbols are left unstyled.
pub fn highlight_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    let mut last_end = 0;
    for caps in TOKEN_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&line[last_end..whole.start()]);
        let token = whole.as_str();
        if caps.get(1).is_some() {
            out.push_str(&token.bright_black().to_string());
        } else if caps.get(2).is_some() {
            out.push_str(&token.blue().to_string());
        } else if NUMBER_RE.is_match(token) {
            out.push_str(&token.magenta().to_string());
        } else if token == "#t" || token == "#f" {
            out.push_str(&token.yellow().to_string());
        } else if is_special_form(token) {
            out.push_str(&token.cyan().bold().to_string());
        } else {
            out.push_str(token);
        }
        last_end = whole.end();
    }
    out.push_str(&line[last_end..]);
    out
}

/// rustyline helper: syntax colors plus multi-line input while parentheses are open.
#[derive(Helper, Completer, Hinter, Default)]
pub struct ReplHelper;

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            return Borrowed(line);
        }
        Owned(highlight_line(line))
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        if paren_depth(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}
