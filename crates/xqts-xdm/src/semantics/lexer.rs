//! Shared winnow building blocks for the small grammars used by assertions

use winnow::ModalResult;
use winnow::ascii::multispace0;
use winnow::combinator::opt;
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

pub(crate) type Input<'a> = &'a str;
pub(crate) type PResult<T> = ModalResult<T>;

/// Skip whitespace
pub(crate) fn ws(input: &mut Input<'_>) -> PResult<()> {
    multispace0.void().parse_next(input)
}

/// A lexical QName or NCName, also accepting the characters of numeric literals
pub(crate) fn name<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, ':' | '-' | '_' | '.')
    })
    .parse_next(input)
}

/// A string literal in single or double quotes; a doubled quote stands for itself
pub(crate) fn quoted(input: &mut Input<'_>) -> PResult<String> {
    let mut quote = one_of(['"', '\'']).parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk = take_till(0.., quote).parse_next(input)?;
        out.push_str(chunk);
        quote.parse_next(input)?;
        if opt(quote).parse_next(input)?.is_some() {
            out.push(quote);
        } else {
            return Ok(out);
        }
    }
}
