//! This module provides the parser for transition programs, utilizing the `pest` crate.
//! The grammar in `grammar.pest` tokenizes each line into fields and strips comments;
//! this module turns those fields into typed rules and reports malformed lines.

use crate::types::{Direction, Transition, TuringMachineError, COMMENT_MARKER};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ProgramParser;

/// A single rule line of a program, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    /// 1-based line number in the source text.
    pub line: usize,
    pub state: String,
    pub symbol: char,
    pub transition: Transition,
}

/// Parses program text into its rule lines.
///
/// Comments and blank lines are dropped. Every remaining line must have exactly five
/// fields: `state symbol write direction next_state`.
///
/// # Returns
///
/// * `Ok(Vec<ParsedRule>)` with the rules in order of appearance.
/// * `Err(TuringMachineError::MalformedLine)` if a line has the wrong number of fields.
/// * `Err(TuringMachineError::InvalidSymbol)` if a symbol field is not one character.
/// * `Err(TuringMachineError::UnsupportedDirection)` for an unknown direction token.
pub fn parse(input: &str) -> Result<Vec<ParsedRule>, TuringMachineError> {
    let root = ProgramParser::parse(Rule::program, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or(TuringMachineError::EmptyProgram)?;

    let mut rules = Vec::new();

    for pair in root.into_inner() {
        if pair.as_rule() != Rule::line {
            continue;
        }

        if let Some(rule) = parse_line(pair)? {
            rules.push(rule);
        }
    }

    Ok(rules)
}

/// Parses a single `line` pair, returning `None` for blank and comment-only lines.
fn parse_line(pair: Pair<Rule>) -> Result<Option<ParsedRule>, TuringMachineError> {
    let (line, _) = pair.as_span().start_pos().line_col();
    let content = strip_comment(pair.as_str());

    let fields: Vec<&str> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::field)
        .map(|p| p.as_str())
        .collect();

    match fields.as_slice() {
        [] => Ok(None),
        [state, symbol, write, direction, next_state] => Ok(Some(ParsedRule {
            line,
            state: state.to_string(),
            symbol: parse_symbol(symbol, line)?,
            transition: Transition {
                write: parse_symbol(write, line)?,
                direction: parse_direction(direction, line)?,
                next_state: next_state.to_string(),
            },
        })),
        _ => Err(TuringMachineError::MalformedLine {
            line,
            fields: fields.len(),
            content: content.to_string(),
        }),
    }
}

/// Parses a symbol field, which must be exactly one character.
fn parse_symbol(token: &str, line: usize) -> Result<char, TuringMachineError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(TuringMachineError::InvalidSymbol {
            line,
            token: token.to_string(),
        }),
    }
}

/// Parses a direction field.
fn parse_direction(token: &str, line: usize) -> Result<Direction, TuringMachineError> {
    Direction::from_token(token).ok_or_else(|| TuringMachineError::UnsupportedDirection {
        line,
        token: token.to_string(),
    })
}

/// Returns the part of a line before the comment marker, trimmed.
fn strip_comment(line: &str) -> &str {
    line.split(COMMENT_MARKER).next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_program() {
        let input = "start 1 1 r start\nstart B 1 r halt\n";

        let rules = parse(input).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[0],
            ParsedRule {
                line: 1,
                state: "start".into(),
                symbol: '1',
                transition: Transition {
                    write: '1',
                    direction: Direction::Right,
                    next_state: "start".into(),
                },
            }
        );
        assert_eq!(rules[1].symbol, 'B');
        assert_eq!(rules[1].transition.next_state, "halt");
    }

    #[test]
    fn test_parse_strips_comments_and_blank_lines() {
        let input = r#"
; Set up tally
0 * * l 1

1 B B l 2 ; move to the start
   ; indented comment
2 B 0 r 3
"#;

        let rules = parse(input).unwrap();
        let lines: Vec<usize> = rules.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5, 7]);
        assert_eq!(rules[1].transition.next_state, "2");
    }

    #[test]
    fn test_parse_accepts_tabs_and_crlf() {
        let input = "a\tx\ty\tR\tb\r\nb  y  y  *  halt  \r\n";

        let rules = parse(input).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].transition.write, 'y');
        assert_eq!(rules[1].transition.direction, Direction::Stay);
        assert_eq!(rules[1].line, 2);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("; nothing here\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_too_few_fields() {
        let error = parse("start 1 1 r start\nstart B 1 r ; missing next state\n").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::MalformedLine {
                line: 2,
                fields: 4,
                content: "start B 1 r".into(),
            }
        );
    }

    #[test]
    fn test_parse_too_many_fields() {
        let error = parse("a b c R d e").unwrap_err();
        assert!(matches!(
            error,
            TuringMachineError::MalformedLine { line: 1, fields: 6, .. }
        ));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let error = parse("a b c X d").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::UnsupportedDirection {
                line: 1,
                token: "X".into(),
            }
        );
    }

    #[test]
    fn test_parse_multi_character_symbol() {
        let error = parse("a bb c R d").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::InvalidSymbol {
                line: 1,
                token: "bb".into(),
            }
        );
    }

    #[test]
    fn test_parse_direction_case_insensitive() {
        let rules = parse("a x x L a\na y y l a\na z z R a\na w w r a").unwrap();
        let directions: Vec<Direction> = rules.iter().map(|r| r.transition.direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Left,
                Direction::Left,
                Direction::Right,
                Direction::Right
            ]
        );
    }
}
