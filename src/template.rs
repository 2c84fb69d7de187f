//! Embedding dice results inside larger human-readable text: delimited
//! regions are evaluated as roll expressions and replaced by their result.

use crate::grammar::{self, Boundary};
use crate::parse::{self, ast};
use crate::roll::{RResult, RollContext, RollError, UniformSource};

/// Replaces every unescaped `open ... close` region of `text` with the total
/// of the roll expression inside it. Interiors are classified with the
/// lenient roll scan, so stray surrounding text never promotes prose into a
/// roll; an interior that is neither a roll nor plain arithmetic is an
/// error. An `escape` character immediately before `open` suppresses the
/// region; the escape itself is stripped once all regions are processed. An
/// unmatched `open` is left verbatim.
pub fn expand<R: UniformSource>(
    ctx: &mut RollContext<R>,
    text: &str,
    open: char,
    close: char,
    escape: char,
) -> RResult<String> {
    expand_with(ctx, text, open, close, escape, |ctx, expression| {
        let rolled = ctx.roll(expression)?;
        Ok(rolled.total()?.to_string())
    })
}

/// Like [`expand`], but renders each region as boolean text.
pub fn expand_bool<R: UniformSource>(
    ctx: &mut RollContext<R>,
    text: &str,
    open: char,
    close: char,
    escape: char,
) -> RResult<String> {
    expand_with(ctx, text, open, close, escape, |ctx, expression| {
        let rolled = ctx.roll(expression)?;
        Ok(rolled.as_bool()?.to_string())
    })
}

fn expand_with<R, F>(
    ctx: &mut RollContext<R>,
    text: &str,
    open: char,
    close: char,
    escape: char,
    render: F,
) -> RResult<String>
where
    R: UniformSource,
    F: Fn(&mut RollContext<R>, &ast::Expression) -> RResult<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let i = match find_unescaped(rest, open, escape) {
            Some(i) => i,
            None => {
                out.push_str(rest);
                break;
            }
        };
        out.push_str(&rest[..i]);
        let after = &rest[i + open.len_utf8()..];
        let j = match after.find(close) {
            Some(j) => j,
            None => {
                out.push_str(&rest[i..]);
                break;
            }
        };
        let interior = after[..j].trim();
        if !grammar::contains_roll(interior, Boundary::Lenient) && !grammar::is_arithmetic(interior)
        {
            return Err(
                RollError::value_error("region is neither a roll nor arithmetic")
                    .in_expression(interior),
            );
        }
        let expression =
            parse::parse(interior).map_err(|e| RollError::from(e).in_expression(interior))?;
        out.push_str(&render(ctx, &expression)?);
        rest = &after[j + close.len_utf8()..];
    }

    let escaped = format!("{}{}", escape, open);
    Ok(out.replace(&escaped, &open.to_string()))
}

fn find_unescaped(s: &str, open: char, escape: char) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (i, c) in s.char_indices() {
        if c == open && prev != Some(escape) {
            return Some(i);
        }
        prev = Some(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::ctx::Limits;
    use crate::roll::source::StepSource;

    fn ctx() -> RollContext<StepSource> {
        RollContext::new(Limits::default(), StepSource::new(0, 1))
    }

    #[test]
    fn test_expand_single_region() {
        // 3d6 draws 1, 2, 3.
        let out = expand(&mut ctx(), "damage: [3d6+2]!", '[', ']', '\\').unwrap();
        assert_eq!(out, "damage: 8!");
    }

    #[test]
    fn test_expand_multiple_regions_share_the_source() {
        let out = expand(&mut ctx(), "[1d6] then [1d6]", '[', ']', '\\').unwrap();
        assert_eq!(out, "1 then 2");
    }

    #[test]
    fn test_escaped_open_is_left_and_stripped() {
        let out = expand(&mut ctx(), r"\[not a roll] and [1d6]", '[', ']', '\\').unwrap();
        assert_eq!(out, "[not a roll] and 1");
    }

    #[test]
    fn test_unmatched_open_is_verbatim() {
        let out = expand(&mut ctx(), "broken [1d6", '[', ']', '\\').unwrap();
        assert_eq!(out, "broken [1d6");
    }

    #[test]
    fn test_expand_bool_relational() {
        // 1d20 draws 1.
        let out = expand_bool(&mut ctx(), "hit: [1d20 > 10]", '[', ']', '\\').unwrap();
        assert_eq!(out, "hit: false");
    }

    #[test]
    fn test_malformed_interior_names_the_text() {
        let err = expand(&mut ctx(), "[1d]", '[', ']', '\\').unwrap_err();
        assert!(matches!(err, RollError::Evaluation { .. }));
    }

    #[test]
    fn test_arithmetic_interior_is_evaluated() {
        let out = expand(&mut ctx(), "count: [2+3]", '[', ']', '\\').unwrap();
        assert_eq!(out, "count: 5");
    }

    #[test]
    fn test_prose_interior_is_rejected() {
        // "no dice" never scans as a roll, even leniently.
        let err = expand(&mut ctx(), "[no dice]", '[', ']', '\\').unwrap_err();
        assert!(matches!(err, RollError::Evaluation { .. }));
    }
}
