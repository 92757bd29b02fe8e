//! Tokeniser for the CEL-subset grammar.

use crate::error::{Error, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, satisfy},
    combinator::{opt, recognize, value},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i64),
    Uint(u64),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Null,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

/// Split `input` into a flat token stream, skipping whitespace between
/// tokens. A filter string with no tokens at all (blank, or all whitespace)
/// yields an empty `Vec`; the grammar rejects that shape, not this function.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        let (next, token) = lex_token(rest)
            .map_err(|_| Error::ParseError(format!("unexpected input near {:?}", truncate(rest))))?;
        tokens.push(token);
        rest = next.trim_start();
    }
    Ok(tokens)
}

fn truncate(s: &str) -> &str {
    let end = s.char_indices().nth(24).map(|(i, _)| i).unwrap_or(s.len());
    &s[..end]
}

fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((
        lex_string,
        lex_bytes,
        lex_number,
        lex_symbol,
        lex_ident_or_keyword,
    ))(input)
}

fn lex_symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::AndAnd, tag("&&")),
        value(Token::OrOr, tag("||")),
        value(Token::EqEq, tag("==")),
        value(Token::NotEq, tag("!=")),
        value(Token::Le, tag("<=")),
        value(Token::Ge, tag(">=")),
        value(Token::Bang, tag("!")),
        value(Token::Lt, tag("<")),
        value(Token::Gt, tag(">")),
        value(Token::LParen, tag("(")),
        value(Token::RParen, tag(")")),
        value(Token::LBracket, tag("[")),
        value(Token::RBracket, tag("]")),
        value(Token::Comma, tag(",")),
        value(Token::Dot, tag(".")),
        value(Token::Plus, tag("+")),
        value(Token::Minus, tag("-")),
        value(Token::Star, tag("*")),
        value(Token::Slash, tag("/")),
        value(Token::Percent, tag("%")),
    ))(input)
}

fn ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn ident_cont(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex_ident_or_keyword(input: &str) -> IResult<&str, Token> {
    let (rest, name) = recognize(pair(satisfy(ident_start), many0(satisfy(ident_cont))))(input)?;
    let token = match name {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "null" => Token::Null,
        "in" => Token::In,
        other => Token::Ident(other.to_string()),
    };
    Ok((rest, token))
}

fn lex_number(input: &str) -> IResult<&str, Token> {
    let (rest, int_part) = digit1(input)?;
    let (rest, frac) = opt(pair(char('.'), digit1))(rest)?;
    let (rest, exp) = opt(tuple((
        alt((char('e'), char('E'))),
        opt(alt((char('+'), char('-')))),
        digit1,
    )))(rest)?;

    if frac.is_some() || exp.is_some() {
        let mut text = int_part.to_string();
        if let Some((_, digits)) = frac {
            text.push('.');
            text.push_str(digits);
        }
        if let Some((e, sign, digits)) = exp {
            text.push(e);
            if let Some(sign) = sign {
                text.push(sign);
            }
            text.push_str(digits);
        }
        let value: f64 = text
            .parse()
            .map_err(|_| nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Float)))?;
        return Ok((rest, Token::Double(value)));
    }

    if let Ok((after_suffix, _)) = alt((char('u'), char('U')))(rest) {
        let value: u64 = int_part
            .parse()
            .map_err(|_| nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
        return Ok((after_suffix, Token::Uint(value)));
    }

    let value: i64 = int_part
        .parse()
        .map_err(|_| nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    Ok((rest, Token::Int(value)))
}

fn lex_string(input: &str) -> IResult<&str, Token> {
    let (rest, quote) = alt((char('\''), char('"')))(input)?;
    let (rest, decoded) = take_quoted_body(rest, quote)?;
    Ok((rest, Token::Str(decoded)))
}

fn lex_bytes(input: &str) -> IResult<&str, Token> {
    let (rest, _) = alt((tag("b'"), tag("b\"")))(input)?;
    let quote = input.as_bytes()[1] as char;
    let (rest, decoded) = take_quoted_body(rest, quote)?;
    Ok((rest, Token::Bytes(decoded.into_bytes())))
}

/// Consume characters up to and including the closing `quote`, decoding the
/// handful of backslash escapes CEL string/bytes literals support. Anything
/// else is a lex failure: an unterminated literal.
fn take_quoted_body(input: &str, quote: char) -> IResult<&str, String> {
    let mut out = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Ok((&input[idx + c.len_utf8()..], out));
        }
        if c == '\\' {
            match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '0')) => out.push('\0'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '\'')) => out.push('\''),
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => out.push(other),
                None => {
                    return Err(nom::Err::Error(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Eof,
                    )))
                }
            }
            continue;
        }
        out.push(c);
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Eof,
    )))
}
