use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1},
    combinator::{map, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::{ParamValue, Params, TreeDef, TreeRootDef, TreeSource};
use crate::error::ParseError;

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn line_comment(i: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), opt(is_not("\n\r"))))(i)
}

/// Whitespace, newlines and comments.
fn sp(i: &str) -> IResult<&str, ()> {
    value((), many0(alt((value((), multispace1), line_comment))))(i)
}

fn number(i: &str) -> IResult<&str, ParamValue> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(i)?;
    let parsed = if text.contains('.') {
        text.parse().ok().map(ParamValue::Float)
    } else {
        text.parse().ok().map(ParamValue::Int)
    };
    match parsed {
        Some(val) => Ok((rest, val)),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            i,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn str_literal(i: &str) -> IResult<&str, ParamValue> {
    let (r, val) = delimited(
        char('"'),
        opt(escaped_transform(
            is_not("\\\""),
            '\\',
            alt((
                value("\\", char('\\')),
                value("\"", char('"')),
                value("\n", char('n')),
            )),
        )),
        char('"'),
    )(i)?;
    Ok((r, ParamValue::Str(val.unwrap_or_default())))
}

fn boolean(i: &str) -> IResult<&str, ParamValue> {
    let (r, word) = identifier(i)?;
    match word {
        "true" => Ok((r, ParamValue::Bool(true))),
        "false" => Ok((r, ParamValue::Bool(false))),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            i,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn param(i: &str) -> IResult<&str, (&str, ParamValue)> {
    let (i, name) = identifier(i)?;
    let (i, _) = delimited(sp, char('='), sp)(i)?;
    let (i, val) = alt((number, str_literal, boolean))(i)?;
    Ok((i, (name, val)))
}

fn params(i: &str) -> IResult<&str, Params> {
    map(
        delimited(
            pair(char('('), sp),
            separated_list0(delimited(sp, char(','), sp), param),
            pair(sp, char(')')),
        ),
        |params| params.into_iter().collect(),
    )(i)
}

fn children(i: &str) -> IResult<&str, Vec<TreeDef>> {
    delimited(
        pair(char('{'), sp),
        many0(terminated(tree_node, sp)),
        char('}'),
    )(i)
}

pub(super) fn tree_node(i: &str) -> IResult<&str, TreeDef> {
    let (i, ty) = identifier(i)?;
    let (i, params) = opt(preceded(sp, params))(i)?;
    let (i, children) = opt(preceded(sp, children))(i)?;

    Ok((
        i,
        TreeDef {
            ty: ty.to_owned(),
            params: params.unwrap_or_default(),
            children: children.unwrap_or_default(),
        },
    ))
}

fn tree_root(i: &str) -> IResult<&str, TreeRootDef> {
    let (i, _) = terminated(tag("tree"), multispace1)(i)?;
    let (i, name) = identifier(i)?;
    let (i, _) = delimited(sp, char('='), sp)(i)?;
    let (i, root) = tree_node(i)?;

    Ok((
        i,
        TreeRootDef {
            name: name.to_owned(),
            root,
        },
    ))
}

/// Parses a source made of `tree name = Node (param = value) { children }` definitions.
pub fn parse_file(source: &str) -> Result<TreeSource, ParseError> {
    let (rest, tree_defs) =
        preceded(sp, many0(terminated(tree_root, sp)))(source).map_err(|err| match err {
            nom::Err::Incomplete(_) => ParseError::Incomplete(String::new()),
            nom::Err::Error(e) | nom::Err::Failure(e) => ParseError::Syntax(snippet(e.input)),
        })?;

    if !rest.is_empty() {
        return Err(ParseError::Incomplete(snippet(rest)));
    }

    Ok(TreeSource { tree_defs })
}

/// The beginning of the offending input, for error messages.
fn snippet(i: &str) -> String {
    i.lines().next().unwrap_or_default().chars().take(40).collect()
}
