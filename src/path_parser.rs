//! Parser for path data.

use std::fmt;
use std::iter::Enumerate;
use std::str;
use std::str::Bytes;

use crate::path_builder::*;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Token {
    Number(f64),
    Command(u8),
    Comma,
}

use crate::path_parser::Token::{Comma, Command, Number};

#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    ci: Enumerate<Bytes<'a>>,
    current: Option<(usize, u8)>,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LexError {
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

impl<'a> Lexer<'_> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        let mut ci = input.bytes().enumerate();
        let current = ci.next();
        Lexer {
            input: input.as_bytes(),
            ci,
            current,
        }
    }

    fn current_pos(&self) -> usize {
        match self.current {
            None => self.input.len(),
            Some((pos, _)) => pos,
        }
    }

    fn advance(&mut self) {
        self.current = self.ci.next();
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        let mut found_some = false;
        while let Some((_, c)) = self.current {
            if !pred(c) {
                break;
            }
            found_some = true;
            self.advance();
        }
        found_some
    }

    fn advance_over_optional(&mut self, needle: u8) -> bool {
        match self.current {
            Some((_, c)) if c == needle => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn advance_over_digits(&mut self) -> bool {
        self.advance_while(|c| c.is_ascii_digit())
    }

    fn advance_over_simple_number(&mut self) -> bool {
        let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
        let found_digit = self.advance_over_digits();
        let _ = self.advance_over_optional(b'.');
        self.advance_over_digits() || found_digit
    }

    fn match_number(&mut self, start_pos: usize) -> Result<Token, LexError> {
        if !self.advance_over_simple_number() && start_pos != self.current_pos() {
            match self.current {
                None => return Err(LexError::UnexpectedEof),
                Some((_pos, c)) => return Err(LexError::UnexpectedByte(c)),
            }
        }
        if self.advance_over_optional(b'e') || self.advance_over_optional(b'E') {
            let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
            let _ = self.advance_over_digits();
        }
        let end_pos = self.current_pos();

        // All the bytes in the range are ASCII, which we checked above
        let n = str::from_utf8(&self.input[start_pos..end_pos])
            .map_err(|_| LexError::ParseFloatError)?
            .parse::<f64>()
            .map_err(|_| LexError::ParseFloatError)?;

        // Overflowing exponents parse as infinity; those are not coordinates
        if n.is_finite() {
            Ok(Number(n))
        } else {
            Err(LexError::ParseFloatError)
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        // eat whitespace
        self.advance_while(|c| c.is_ascii_whitespace());

        match self.current {
            // commas are separators
            Some((pos, b',')) => {
                self.advance();
                Some((pos, Ok(Comma)))
            }

            // alphabetic chars are commands
            Some((pos, c)) if c.is_ascii_alphabetic() => {
                let token = Command(c);
                self.advance();
                Some((pos, Ok(token)))
            }

            Some((pos, c)) if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => {
                Some((pos, self.match_number(pos)))
            }

            Some((pos, c)) => {
                self.advance();
                Some((pos, Err(LexError::UnexpectedByte(c))))
            }

            None => None,
        }
    }
}

pub struct PathParser<'b> {
    tokens: Lexer<'b>,
    current_pos_and_token: Option<(usize, Result<Token, LexError>)>,

    builder: &'b mut PathBuilder,

    // Current point; adjusted at every command
    current_x: f64,
    current_y: f64,

    // Last control point from previous cubic curve command, used to reflect
    // the new control point for smooth cubic curve commands.
    cubic_reflection_x: f64,
    cubic_reflection_y: f64,

    // Last control point from previous quadratic curve command, used to reflect
    // the new control point for smooth quadratic curve commands.
    quadratic_reflection_x: f64,
    quadratic_reflection_y: f64,

    // Start point of current subpath (i.e. position of last moveto);
    // used for closepath.
    subpath_start_x: f64,
    subpath_start_y: f64,

    // No moveto seen yet; drawto commands are errors until one appears.
    before_first_moveto: bool,

    // A closepath ended the last subpath; the next drawto starts a new one
    // at the subpath's start point.
    needs_implicit_moveto: bool,
}

// This is a recursive descent parser for path data, as specified in
// https://www.w3.org/TR/SVG/paths.html#PathDataBNF
// Some peculiarities:
//
// - Optional commas are allowed inside coordinate pairs, and between
// coordinate pairs.  So, for example, these are equivalent:
//
//     M 10 20 30 40
//     M 10, 20 30, 40
//     M 10, 20, 30, 40
//
// - Whitespace is optional.  These are equivalent:
//
//     M10,20 30,40
//     M10,20,30,40
//
//   These are also equivalent:
//
//     M-10,20-30-40
//     M -10 20 -30 -40
//
//     M.1-2,3E2-4
//     M 0.1 -2 300 -4
//
// Unlike a strict parser, errors do not stop parsing.  The offending
// command is dropped, we skip ahead to the next command letter, and the
// current point carries on from the last segment that was emitted.
impl<'b> PathParser<'b> {
    pub fn new(builder: &'b mut PathBuilder, path_str: &'b str) -> PathParser<'b> {
        let mut lexer = Lexer::new(path_str);
        let pt = lexer.next();
        PathParser {
            tokens: lexer,
            current_pos_and_token: pt,

            builder,

            current_x: 0.0,
            current_y: 0.0,

            cubic_reflection_x: 0.0,
            cubic_reflection_y: 0.0,

            quadratic_reflection_x: 0.0,
            quadratic_reflection_y: 0.0,

            subpath_start_x: 0.0,
            subpath_start_y: 0.0,

            before_first_moveto: true,
            needs_implicit_moveto: false,
        }
    }

    // The match_* methods consume the requested token and return its value, or fail
    // without advancing, so a caller can try one kind of token and then another.

    fn match_command(&mut self) -> Result<u8, ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => Ok(*c),
            Some((pos, Ok(t))) => Err(ParseError::new(*pos, UnexpectedToken(*t))),
            Some((pos, Err(e))) => Err(ParseError::new(*pos, LexError(*e))),
            None => Err(ParseError::new(self.tokens.input.len(), UnexpectedEof)),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn match_number(&mut self) -> Result<f64, ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Ok(*n),
            Some((pos, Ok(t))) => Err(ParseError::new(*pos, UnexpectedToken(*t))),
            Some((pos, Err(e))) => Err(ParseError::new(*pos, LexError(*e))),
            None => Err(ParseError::new(self.tokens.input.len(), UnexpectedEof)),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn match_comma(&mut self) -> Result<(), ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Comma))) => Ok(()),
            Some((pos, Ok(t))) => Err(ParseError::new(*pos, UnexpectedToken(*t))),
            Some((pos, Err(e))) => Err(ParseError::new(*pos, LexError(*e))),
            None => Err(ParseError::new(self.tokens.input.len(), UnexpectedEof)),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn eat_optional_comma(&mut self) {
        let _ = self.match_comma();
    }

    // Convenience function; like match_number, but eats a leading comma if present.
    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.eat_optional_comma();
        self.match_number()
    }

    // peek_* methods are the twins of match_*, but don't consume the token, and so
    // can't return ParseError

    fn peek_command(&self) -> Option<u8> {
        match &self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => Some(*c),
            _ => None,
        }
    }

    fn peek_number(&self) -> Option<f64> {
        match &self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Some(*n),
            _ => None,
        }
    }

    fn current_position(&self) -> usize {
        match self.current_pos_and_token {
            Some((pos, _)) => pos,
            None => self.tokens.input.len(),
        }
    }

    /// This is the entry point for parsing a given blob of path data.
    ///
    /// Returns the errors for every part of the data that had to be skipped.
    pub fn parse(&mut self) -> Result<(), Vec<ParseError>> {
        let mut errors = Vec::new();

        while self.current_pos_and_token.is_some() {
            if let Err(e) = self.command() {
                errors.push(e);
                self.skip_to_next_command();
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    // Discards tokens up to the next command letter, which is where parsing resumes
    // after an error.  Letters that are not commands are discarded too, since they
    // belong to the part that was already reported.  Every lexer step consumes input,
    // so this always terminates.
    fn skip_to_next_command(&mut self) {
        while self.current_pos_and_token.is_some()
            && !self.peek_command().map_or(false, is_command_letter)
        {
            self.current_pos_and_token = self.tokens.next();
        }
    }

    fn command(&mut self) -> Result<(), ParseError> {
        let pos = self.current_position();
        let cmd = self.match_command()?;
        let absolute = cmd.is_ascii_uppercase();

        match cmd.to_ascii_uppercase() {
            b'M' => self.moveto_argument_sequence(absolute),

            _ if self.before_first_moveto => Err(ParseError::new(pos, UnexpectedCommand(cmd))),

            b'Z' => {
                self.emit_close_path();
                Ok(())
            }
            b'L' => self.lineto_argument_sequence(absolute),
            b'H' => self.horizontal_lineto_argument_sequence(absolute),
            b'V' => self.vertical_lineto_argument_sequence(absolute),
            b'C' => self.curveto_argument_sequence(absolute),
            b'S' => self.smooth_curveto_argument_sequence(absolute),
            b'Q' => self.quadratic_curveto_argument_sequence(absolute),
            b'T' => self.smooth_quadratic_curveto_argument_sequence(absolute),
            b'A' => Err(ParseError::new(pos, UnsupportedArc)),
            _ => Err(ParseError::new(pos, UnexpectedCommand(cmd))),
        }
    }

    fn coordinate_pair(&mut self) -> Result<(f64, f64), ParseError> {
        Ok((self.match_number()?, self.match_comma_number()?))
    }

    fn set_current_point(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;

        self.cubic_reflection_x = self.current_x;
        self.cubic_reflection_y = self.current_y;

        self.quadratic_reflection_x = self.current_x;
        self.quadratic_reflection_y = self.current_y;
    }

    fn set_cubic_reflection_and_current_point(&mut self, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.cubic_reflection_x = x3;
        self.cubic_reflection_y = y3;

        self.current_x = x4;
        self.current_y = y4;

        self.quadratic_reflection_x = self.current_x;
        self.quadratic_reflection_y = self.current_y;
    }

    fn set_quadratic_reflection_and_current_point(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.quadratic_reflection_x = a;
        self.quadratic_reflection_y = b;

        self.current_x = c;
        self.current_y = d;

        self.cubic_reflection_x = self.current_x;
        self.cubic_reflection_y = self.current_y;
    }

    fn ensure_subpath(&mut self) {
        if self.needs_implicit_moveto {
            self.needs_implicit_moveto = false;
            self.builder.move_to(self.current_x, self.current_y);
        }
    }

    fn emit_move_to(&mut self, x: f64, y: f64) {
        self.set_current_point(x, y);

        self.subpath_start_x = self.current_x;
        self.subpath_start_y = self.current_y;

        self.before_first_moveto = false;
        self.needs_implicit_moveto = false;

        self.builder.move_to(self.current_x, self.current_y);
    }

    fn emit_line_to(&mut self, x: f64, y: f64) {
        self.ensure_subpath();
        self.set_current_point(x, y);

        self.builder.line_to(self.current_x, self.current_y);
    }

    fn emit_curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.ensure_subpath();
        self.set_cubic_reflection_and_current_point(x3, y3, x4, y4);

        self.builder.curve_to(x2, y2, x3, y3, x4, y4);
    }

    fn emit_quadratic_curve_to(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.ensure_subpath();

        // raise quadratic Bézier to cubic
        let x2 = (self.current_x + 2.0 * a) / 3.0;
        let y2 = (self.current_y + 2.0 * b) / 3.0;
        let x4 = c;
        let y4 = d;
        let x3 = (x4 + 2.0 * a) / 3.0;
        let y3 = (y4 + 2.0 * b) / 3.0;

        self.set_quadratic_reflection_and_current_point(a, b, c, d);

        self.builder.curve_to(x2, y2, x3, y3, x4, y4);
    }

    fn emit_close_path(&mut self) {
        // A second closepath in a row has nothing to close
        if self.needs_implicit_moveto {
            return;
        }

        let (x, y) = (self.subpath_start_x, self.subpath_start_y);
        self.set_current_point(x, y);
        self.needs_implicit_moveto = true;

        self.builder.close_path();
    }

    fn should_break_arg_sequence(&mut self) -> bool {
        if self.match_comma().is_ok() {
            // if there is a comma (indicating we should continue to loop), eat the comma
            // so we're ready at the next start of the loop to process the next token.
            false
        } else {
            // continue to process args in the sequence unless the next token is a comma
            self.peek_number().is_none()
        }
    }

    fn moveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        let (mut x, mut y) = self.coordinate_pair()?;

        if !absolute {
            x += self.current_x;
            y += self.current_y;
        }

        self.emit_move_to(x, y);

        if self.match_comma().is_ok() || self.peek_number().is_some() {
            self.lineto_argument_sequence(absolute)
        } else {
            Ok(())
        }
    }

    fn lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x, mut y) = self.coordinate_pair()?;

            if !absolute {
                x += self.current_x;
                y += self.current_y;
            }

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn horizontal_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut x = self.match_number()?;

            if !absolute {
                x += self.current_x;
            }

            let y = self.current_y;

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn vertical_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut y = self.match_number()?;

            if !absolute {
                y += self.current_y;
            }

            let x = self.current_x;

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x2, mut y2) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x3, mut y3) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x4, mut y4) = self.coordinate_pair()?;

            if !absolute {
                x2 += self.current_x;
                y2 += self.current_y;
                x3 += self.current_x;
                y3 += self.current_y;
                x4 += self.current_x;
                y4 += self.current_y;
            }

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn smooth_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x3, mut y3) = self.coordinate_pair()?;
            self.eat_optional_comma();
            let (mut x4, mut y4) = self.coordinate_pair()?;

            if !absolute {
                x3 += self.current_x;
                y3 += self.current_y;
                x4 += self.current_x;
                y4 += self.current_y;
            }

            let (x2, y2) = (
                self.current_x + self.current_x - self.cubic_reflection_x,
                self.current_y + self.current_y - self.cubic_reflection_y,
            );

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn quadratic_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut a, mut b) = self.coordinate_pair()?;
            self.eat_optional_comma();
            let (mut c, mut d) = self.coordinate_pair()?;

            if !absolute {
                a += self.current_x;
                b += self.current_y;
                c += self.current_x;
                d += self.current_y;
            }

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn smooth_quadratic_curveto_argument_sequence(
        &mut self,
        absolute: bool,
    ) -> Result<(), ParseError> {
        loop {
            let (mut c, mut d) = self.coordinate_pair()?;

            if !absolute {
                c += self.current_x;
                d += self.current_y;
            }

            let (a, b) = (
                self.current_x + self.current_x - self.quadratic_reflection_x,
                self.current_y + self.current_y - self.quadratic_reflection_y,
            );

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }
}

fn is_command_letter(c: u8) -> bool {
    b"MmZzLlHhVvCcSsQqTtAa".contains(&c)
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    UnexpectedToken(Token),
    UnexpectedCommand(u8),
    UnexpectedEof,
    LexError(LexError),
    UnsupportedArc,
}

#[derive(Debug, PartialEq)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    fn new(pos: usize, k: ErrorKind) -> ParseError {
        ParseError {
            position: pos,
            kind: k,
        }
    }

    /// Whether this error comes from a feature we skip on purpose, rather than bad data.
    pub fn is_unsupported(&self) -> bool {
        self.kind == UnsupportedArc
    }
}

use crate::path_parser::ErrorKind::*;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self.kind {
            UnexpectedToken(_t) => "unexpected token",
            UnexpectedCommand(_c) => "unexpected command",
            UnexpectedEof => "unexpected end of data",
            LexError(_le) => "error processing token",
            UnsupportedArc => "elliptical arcs are not supported",
        };
        write!(f, "error at position {}: {}", self.position, description)
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    fn find_error_pos(s: &str) -> Option<usize> {
        s.find('^')
    }

    fn make_parse_result(
        error_pos_str: &str,
        error_kind: Option<ErrorKind>,
    ) -> Option<ParseError> {
        if let Some(pos) = find_error_pos(error_pos_str) {
            Some(ParseError {
                position: pos,
                kind: error_kind.unwrap(),
            })
        } else {
            assert!(error_kind.is_none());
            None
        }
    }

    // Checks the recovered segments and the first error, if any.
    fn test_parser(
        path_str: &str,
        error_pos_str: &str,
        expected_segments: &[PathSegment],
        expected_error_kind: Option<ErrorKind>,
    ) {
        let expected_error = make_parse_result(error_pos_str, expected_error_kind);

        let mut builder = PathBuilder::default();
        let result = builder.parse(path_str);

        let path = builder.into_path();
        let segments = path.iter().collect::<Vec<_>>();

        assert_eq!(expected_segments, segments.as_slice());
        assert_eq!(expected_error, result.err().and_then(|e| e.into_iter().next()));
    }

    fn moveto(x: f64, y: f64) -> PathSegment {
        PathSegment::MoveTo(x, y)
    }

    fn lineto(x: f64, y: f64) -> PathSegment {
        PathSegment::LineTo(x, y)
    }

    fn curveto(x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) -> PathSegment {
        PathSegment::CubicTo(CubicBezierCurve {
            pt1: (x2, y2),
            pt2: (x3, y3),
            to: (x4, y4),
        })
    }

    fn closepath() -> PathSegment {
        PathSegment::ClosePath
    }

    fn assert_segments_approx_eq(actual: &[PathSegment], expected: &[PathSegment]) {
        use float_cmp::approx_eq;

        let close = |a: (f64, f64), b: (f64, f64)| {
            approx_eq!(f64, a.0, b.0, epsilon = 0.01) && approx_eq!(f64, a.1, b.1, epsilon = 0.01)
        };

        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            let same = match (a, e) {
                (PathSegment::MoveTo(ax, ay), PathSegment::MoveTo(ex, ey))
                | (PathSegment::LineTo(ax, ay), PathSegment::LineTo(ex, ey)) => {
                    close((*ax, *ay), (*ex, *ey))
                }
                (PathSegment::CubicTo(ac), PathSegment::CubicTo(ec)) => {
                    close(ac.pt1, ec.pt1) && close(ac.pt2, ec.pt2) && close(ac.to, ec.to)
                }
                (PathSegment::ClosePath, PathSegment::ClosePath) => true,
                _ => false,
            };
            assert!(same, "{a:?} != {e:?}");
        }
    }

    #[test]
    fn handles_empty_data() {
        test_parser(
            "",
            "",
            &Vec::<PathSegment>::new(),
            None,
        );
    }

    #[test]
    fn handles_numbers() {
        test_parser(
            "M 10 20",
            "",
            &vec![moveto(10.0, 20.0)],
            None,
        );

        test_parser(
            "M -10 -20",
            "",
            &vec![moveto(-10.0, -20.0)],
            None,
        );

        test_parser(
            "M .10 0.20",
            "",
            &vec![moveto(0.10, 0.20)],
            None,
        );

        test_parser(
            "M-.10-0.20",
            "",
            &vec![moveto(-0.10, -0.20)],
            None,
        );

        test_parser(
            "M10.5.50",
            "",
            &vec![moveto(10.5, 0.50)],
            None,
        );

        test_parser(
            "M .10E1 .20e-4",
            "",
            &vec![moveto(1.0, 0.000020)],
            None,
        );
    }

    #[test]
    fn splits_concatenated_numbers() {
        test_parser(
            "M-10,20-30-40",
            "",
            &vec![moveto(-10.0, 20.0), lineto(-30.0, -40.0)],
            None,
        );

        test_parser(
            "M.1-2,3E2-4",
            "",
            &vec![moveto(0.1, -2.0), lineto(300.0, -4.0)],
            None,
        );
    }

    #[test]
    fn handles_simple_line() {
        test_parser(
            "M0,0 L10,10",
            "",
            &vec![moveto(0.0, 0.0), lineto(10.0, 10.0)],
            None,
        );
    }

    #[test]
    fn handles_relative_moveto_lineto_sequences() {
        test_parser(
            "m10 20 30 40",
            "",
            &vec![moveto(10.0, 20.0), lineto(40.0, 60.0)],
            None,
        );

        test_parser(
            "M10 20 l 1 1 h 5 v -2 H 0 V 0",
            "",
            &vec![
                moveto(10.0, 20.0),
                lineto(11.0, 21.0),
                lineto(16.0, 21.0),
                lineto(16.0, 19.0),
                lineto(0.0, 19.0),
                lineto(0.0, 0.0),
            ],
            None,
        );
    }

    #[test]
    fn handles_curveto() {
        test_parser(
            "M10 20 C 30,40 50 60-70,80",
            "",
            &vec![
                moveto(10.0, 20.0),
                curveto(30.0, 40.0, 50.0, 60.0, -70.0, 80.0),
            ],
            None,
        );

        test_parser(
            "M10 20 c 30,40 50 60-70,80,90 100,110 120,130,140",
            "",
            &vec![
                moveto(10.0, 20.0),
                curveto(40.0, 60.0, 60.0, 80.0, -60.0, 100.0),
                curveto(30.0, 200.0, 50.0, 220.0, 70.0, 240.0),
            ],
            None,
        );
    }

    #[test]
    fn converts_quadratic_to_cubic() {
        let mut builder = PathBuilder::default();
        assert!(builder.parse("M0,0 Q5,10 10,0").is_ok());
        let segments = builder.into_path().iter().collect::<Vec<_>>();

        assert_segments_approx_eq(
            &segments,
            &[moveto(0.0, 0.0), curveto(3.33, 6.67, 6.67, 6.67, 10.0, 0.0)],
        );
    }

    #[test]
    fn smooth_curveto_reflects_previous_control_point() {
        test_parser(
            "M10 20 C 30 40 50 60 70 80 S 110 120 130 140",
            "",
            &vec![
                moveto(10.0, 20.0),
                curveto(30.0, 40.0, 50.0, 60.0, 70.0, 80.0),
                curveto(90.0, 100.0, 110.0, 120.0, 130.0, 140.0),
            ],
            None,
        );
    }

    #[test]
    fn smooth_curveto_after_line_uses_current_point() {
        test_parser(
            "M10 20 L 70 80 S 110 120 130 140",
            "",
            &vec![
                moveto(10.0, 20.0),
                lineto(70.0, 80.0),
                curveto(70.0, 80.0, 110.0, 120.0, 130.0, 140.0),
            ],
            None,
        );
    }

    #[test]
    fn smooth_curveto_after_quadratic_uses_current_point() {
        let mut builder = PathBuilder::default();
        assert!(builder.parse("M0 0 Q 30 30 60 0 S 90 30 120 0").is_ok());
        let segments = builder.into_path().iter().collect::<Vec<_>>();

        assert_segments_approx_eq(
            &segments,
            &[
                moveto(0.0, 0.0),
                curveto(20.0, 20.0, 40.0, 20.0, 60.0, 0.0),
                curveto(60.0, 0.0, 90.0, 30.0, 120.0, 0.0),
            ],
        );
    }

    #[test]
    fn smooth_quadratic_reflects_previous_control_point() {
        let mut builder = PathBuilder::default();
        assert!(builder.parse("M0 0 Q 30 30 60 0 T 120 0").is_ok());
        let segments = builder.into_path().iter().collect::<Vec<_>>();

        // The reflected control point is (90, -30)
        assert_segments_approx_eq(
            &segments,
            &[
                moveto(0.0, 0.0),
                curveto(20.0, 20.0, 40.0, 20.0, 60.0, 0.0),
                curveto(80.0, -20.0, 100.0, -20.0, 120.0, 0.0),
            ],
        );
    }

    #[test]
    fn smooth_quadratic_after_cubic_uses_current_point() {
        test_parser(
            "M0 0 C 10 10 20 10 30 0 T 90 0",
            "",
            &vec![
                moveto(0.0, 0.0),
                curveto(10.0, 10.0, 20.0, 10.0, 30.0, 0.0),
                curveto(30.0, 0.0, 50.0, 0.0, 90.0, 0.0),
            ],
            None,
        );
    }

    #[test]
    fn closepath_resets_current_point() {
        test_parser(
            "M10 20 l 10 0 z l 0 5",
            "",
            &vec![
                moveto(10.0, 20.0),
                lineto(20.0, 20.0),
                closepath(),
                moveto(10.0, 20.0),
                lineto(10.0, 25.0),
            ],
            None,
        );

        test_parser(
            "M10 20 L 30 40 Z Z",
            "",
            &vec![moveto(10.0, 20.0), lineto(30.0, 40.0), closepath()],
            None,
        );
    }

    #[test]
    fn skips_malformed_segment_and_continues() {
        test_parser(
            "M10 20 L 30 x L 40 50",
            "            ^",
            &vec![moveto(10.0, 20.0), lineto(40.0, 50.0)],
            Some(ErrorKind::UnexpectedToken(Command(b'x'))),
        );

        test_parser(
            "M10 20 L 30 L 40 50",
            "            ^",
            &vec![moveto(10.0, 20.0), lineto(40.0, 50.0)],
            Some(ErrorKind::UnexpectedToken(Command(b'L'))),
        );
    }

    #[test]
    fn reports_each_skipped_part_once() {
        let mut builder = PathBuilder::default();
        let errors = builder.parse("M 0 0 L 10 x L 20 20 y 1 L 30 30").unwrap_err();

        assert_eq!(
            errors,
            vec![
                ParseError::new(11, ErrorKind::UnexpectedToken(Command(b'x'))),
                ParseError::new(21, ErrorKind::UnexpectedCommand(b'y')),
            ]
        );

        assert_eq!(
            builder.into_path().iter().collect::<Vec<_>>(),
            vec![moveto(0.0, 0.0), lineto(20.0, 20.0), lineto(30.0, 30.0)]
        );
    }

    #[test]
    fn skips_arcs_and_keeps_current_point() {
        test_parser(
            "M10 20 A 5 5 0 0 1 30 40 L 50 60",
            "       ^",
            &vec![moveto(10.0, 20.0), lineto(50.0, 60.0)],
            Some(ErrorKind::UnsupportedArc),
        );

        test_parser(
            "M10 20 a 5 5 0 0 1 30 40 l 5 5",
            "       ^",
            &vec![moveto(10.0, 20.0), lineto(15.0, 25.0)],
            Some(ErrorKind::UnsupportedArc),
        );
    }

    #[test]
    fn drawto_before_moveto_is_skipped() {
        test_parser(
            "L 10 10 M 1 2",
            "^",
            &vec![moveto(1.0, 2.0)],
            Some(ErrorKind::UnexpectedCommand(b'L')),
        );

        test_parser(
            "5 M 1 2",
            "^",
            &vec![moveto(1.0, 2.0)],
            Some(ErrorKind::UnexpectedToken(Number(5.0))),
        );
    }

    #[test]
    fn errors_on_truncated_data() {
        test_parser(
            "M10 20 L 30",
            "           ^",
            &vec![moveto(10.0, 20.0)],
            Some(ErrorKind::UnexpectedEof),
        );

        test_parser(
            "M10 20 C 1 2 3 4 5",
            "                  ^",
            &vec![moveto(10.0, 20.0)],
            Some(ErrorKind::UnexpectedEof),
        );
    }

    #[test]
    fn errors_on_bad_bytes() {
        test_parser(
            "M10 20 L 30 # 40 50 L 1 1",
            "            ^",
            &vec![moveto(10.0, 20.0), lineto(1.0, 1.0)],
            Some(ErrorKind::LexError(LexError::UnexpectedByte(b'#'))),
        );

        test_parser(
            "M 1e999 2",
            "  ^",
            &vec![],
            Some(ErrorKind::LexError(LexError::ParseFloatError)),
        );
    }

    #[test]
    fn serialized_path_reparses_identically() {
        let inputs = [
            "M0,0 L10,10",
            "M0,0 Q5,10 10,0 T 20 0",
            "m 1 1 c 1 2 3 4 5 6 s 1 1 2 2 z l 3 3",
            "M-10,20-30-40 H 5 V 7 z",
        ];

        for input in &inputs {
            let mut builder = PathBuilder::default();
            let _ = builder.parse(input);
            let path = builder.into_path();

            let mut reparsed = PathBuilder::default();
            assert!(reparsed.parse(&path.to_string()).is_ok());
            let reparsed = reparsed.into_path();

            assert!(path.iter().eq(reparsed.iter()), "{input}");
        }
    }

    mod serialization {
        use super::*;
        use proptest::prelude::*;

        // Eighths are exact in binary, so printing and reparsing loses nothing.
        fn coord() -> impl Strategy<Value = f64> {
            (-8000..8000i32).prop_map(|n| f64::from(n) / 8.0)
        }

        #[derive(Debug, Clone)]
        enum Step {
            Line(f64, f64),
            Curve(f64, f64, f64, f64, f64, f64),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (coord(), coord()).prop_map(|(x, y)| Step::Line(x, y)),
                (coord(), coord(), coord(), coord(), coord(), coord())
                    .prop_map(|(a, b, c, d, e, f)| Step::Curve(a, b, c, d, e, f)),
            ]
        }

        fn subpath() -> impl Strategy<Value = ((f64, f64), Vec<Step>, bool)> {
            ((coord(), coord()), prop::collection::vec(step(), 1..5), any::<bool>())
        }

        proptest! {
            #[test]
            fn serialized_path_reparses_to_the_same_segments(
                subpaths in prop::collection::vec(subpath(), 1..4)
            ) {
                let mut builder = PathBuilder::default();

                for ((x, y), steps, closed) in &subpaths {
                    builder.move_to(*x, *y);

                    for step in steps {
                        match *step {
                            Step::Line(x, y) => builder.line_to(x, y),
                            Step::Curve(a, b, c, d, e, f) => builder.curve_to(a, b, c, d, e, f),
                        }
                    }

                    if *closed {
                        builder.close_path();
                    }
                }

                let path = builder.into_path();

                let mut reparsed = PathBuilder::default();
                prop_assert!(reparsed.parse(&path.to_string()).is_ok());
                let reparsed = reparsed.into_path();

                prop_assert!(path.iter().eq(reparsed.iter()));
            }
        }
    }
}
