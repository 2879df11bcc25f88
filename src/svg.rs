//! SVG path parser
//!
//! Only straight line commands are understood, curves must be flattened before
//! the path reaches the rasterizer.
//!
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{Point, Scalar, Transform};
use std::{
    fmt,
    io::{Cursor, Read},
    str::FromStr,
};

/// Possible SVG path commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvgPathCmd {
    MoveTo(Point),
    LineTo(Point),
    Close(Point),
}

impl SvgPathCmd {
    /// Get destination point of the SVG command
    pub fn dst(&self) -> Point {
        use SvgPathCmd::*;
        *match self {
            MoveTo(dst) => dst,
            LineTo(dst) => dst,
            Close(dst) => dst,
        }
    }
}

struct Parser<I> {
    input: I,
    input_buffer: Option<u8>,
}

impl<I: Read> Parser<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            input_buffer: None,
        }
    }

    // consume single byte from the input
    pub fn parse_byte(&mut self) -> Result<Option<u8>, SvgParserError> {
        match self.input_buffer.take() {
            None => {
                let mut byte = [0; 1];
                if self.input.read(&mut byte)? != 0 {
                    Ok(Some(byte[0]))
                } else {
                    Ok(None)
                }
            }
            byte => Ok(byte),
        }
    }

    // put byte into input buffer, at most one byte is cached
    pub fn unparse_byte(&mut self, byte: u8) {
        debug_assert!(self.input_buffer.is_none());
        self.input_buffer = Some(byte);
    }

    // consume input while `pred` predicate is true
    pub fn parse_while(
        &mut self,
        mut pred: impl FnMut(u8) -> bool,
        mut proc: impl FnMut(u8),
    ) -> Result<usize, SvgParserError> {
        let mut count = 0;
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !pred(byte) {
                self.unparse_byte(byte);
                break;
            }
            count += 1;
            proc(byte);
        }
        Ok(count)
    }

    // consume at most one byte from the input, if predicate returns true
    pub fn parse_once(
        &mut self,
        pred: impl FnOnce(u8) -> bool,
        proc: impl FnOnce(u8),
    ) -> Result<bool, SvgParserError> {
        let byte = match self.parse_byte()? {
            None => return Ok(false),
            Some(byte) => byte,
        };
        if pred(byte) {
            proc(byte);
            Ok(true)
        } else {
            self.unparse_byte(byte);
            Ok(false)
        }
    }

    // consume separators from the input
    pub fn parse_separators(&mut self) -> Result<(), SvgParserError> {
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b',') {
                self.unparse_byte(byte);
                break;
            }
        }
        Ok(())
    }

    // parse single scalar value from the input
    pub fn parse_scalar(&mut self) -> Result<Scalar, SvgParserError> {
        self.parse_separators()?;

        let mut mantissa: i64 = 0;
        let mut exponent: i64 = 0;
        let mut sign = 1;

        fn push_digit(value: &mut i64, byte: u8) {
            let digit = byte - b'0';
            *value = value.wrapping_mul(10).wrapping_add(digit as i64);
        }

        self.parse_once(
            |byte| matches!(byte, b'-' | b'+'),
            |byte| {
                if byte == b'-' {
                    sign = -1
                }
            },
        )?;
        let whole = self.parse_while(
            |byte| byte.is_ascii_digit(),
            |byte| push_digit(&mut mantissa, byte),
        )?;
        let matches_dot = self.parse_once(|byte| matches!(byte, b'.'), |_| {})?;
        let frac = if matches_dot {
            self.parse_while(
                |byte| byte.is_ascii_digit(),
                |byte| {
                    push_digit(&mut mantissa, byte);
                    exponent -= 1;
                },
            )?
        } else {
            0
        };
        mantissa *= sign;

        if whole + frac == 0 {
            return Err(SvgParserError::InvalidScalar);
        }

        let matches_exp = self.parse_once(|byte| matches!(byte, b'e' | b'E'), |_| {})?;
        if matches_exp {
            let mut sci: i64 = 0;
            let mut sci_sign = 1;
            self.parse_once(
                |byte| matches!(byte, b'-' | b'+'),
                |byte| {
                    if byte == b'-' {
                        sci_sign = -1
                    }
                },
            )?;
            if self.parse_while(
                |byte| byte.is_ascii_digit(),
                |byte| push_digit(&mut sci, byte),
            )? == 0
            {
                return Err(SvgParserError::InvalidScalar);
            }
            exponent = exponent.wrapping_add(sci_sign * sci)
        }

        let ten: Scalar = 10.0;
        Ok((mantissa as Scalar) * ten.powi(exponent as i32))
    }
}

/// Path parser for SVG encoded path
///
/// See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
pub struct SvgPathParser<I> {
    parser: Parser<I>,
    // previous operation
    prev_op: Option<u8>,
    // current position from which next relative line will start
    position: Point,
    // current sub-path starting position
    subpath_start: Point,
}

impl<I: Read> SvgPathParser<I> {
    pub fn new(input: I) -> Self {
        Self {
            parser: Parser::new(input),
            prev_op: None,
            position: Point::new(0.0, 0.0),
            subpath_start: Point::new(0.0, 0.0),
        }
    }

    // parse pair of scalars and convert it to a point
    fn parse_point(&mut self) -> Result<Point, SvgParserError> {
        let point = Point::new(self.parser.parse_scalar()?, self.parser.parse_scalar()?);
        match self.prev_op {
            Some(cmd) if cmd.is_ascii_lowercase() => Ok(point + self.position),
            _ => Ok(point),
        }
    }

    // parse svg command, none indicates end of input
    fn parse_op(&mut self) -> Result<Option<u8>, SvgParserError> {
        let op = match self.parser.parse_byte()? {
            None => return Ok(None),
            Some(op) => op,
        };
        match op {
            b'M' | b'm' | b'L' | b'l' | b'V' | b'v' | b'H' | b'h' | b'Z' | b'z' => {
                self.prev_op = if op == b'm' {
                    Some(b'l')
                } else if op == b'M' {
                    Some(b'L')
                } else if op == b'Z' || op == b'z' {
                    None
                } else {
                    Some(op)
                };
                Ok(Some(op))
            }
            b'C' | b'c' | b'S' | b's' | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' => {
                Err(SvgParserError::UnsupportedCmd(op))
            }
            byte => {
                self.parser.unparse_byte(byte);
                match self.prev_op {
                    Some(op) => Ok(Some(op)),
                    None => Err(SvgParserError::InvalidCmd(op)),
                }
            }
        }
    }

    /// Parse single SVG path command from the input
    pub fn parse_cmd(&mut self) -> Result<Option<SvgPathCmd>, SvgParserError> {
        self.parser.parse_separators()?;
        let op = match self.parse_op()? {
            None => return Ok(None),
            Some(op) => op,
        };
        let cmd = match op {
            b'M' | b'm' => {
                let dst = self.parse_point()?;
                self.subpath_start = dst;
                SvgPathCmd::MoveTo(dst)
            }
            b'L' | b'l' => SvgPathCmd::LineTo(self.parse_point()?),
            b'V' | b'v' => {
                let y = self.parser.parse_scalar()?;
                let p0 = self.position;
                let p1 = if op == b'v' {
                    Point::new(p0.x(), p0.y() + y)
                } else {
                    Point::new(p0.x(), y)
                };
                SvgPathCmd::LineTo(p1)
            }
            b'H' | b'h' => {
                let x = self.parser.parse_scalar()?;
                let p0 = self.position;
                let p1 = if op == b'h' {
                    Point::new(p0.x() + x, p0.y())
                } else {
                    Point::new(x, p0.y())
                };
                SvgPathCmd::LineTo(p1)
            }
            b'Z' | b'z' => SvgPathCmd::Close(self.subpath_start),
            _ => return Err(SvgParserError::InvalidCmd(op)),
        };
        self.position = cmd.dst();
        Ok(Some(cmd))
    }
}

impl<I: Read> Iterator for SvgPathParser<I> {
    type Item = Result<SvgPathCmd, SvgParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_cmd().transpose()
    }
}

// maximum length of matrix | translate(X|Y)? | scale(X|Y)?
const TRANSFORM_BUF: usize = 10;

struct SvgTransformParser<I> {
    parser: Parser<I>,
    buf: [u8; TRANSFORM_BUF],
    buf_len: usize,
}

impl<I: Read> SvgTransformParser<I> {
    fn new(input: I) -> Self {
        Self {
            parser: Parser::new(input),
            buf: [0; TRANSFORM_BUF],
            buf_len: 0,
        }
    }

    fn parse_ident(&mut self) -> Result<&[u8], SvgParserError> {
        self.buf_len = 0;
        self.parser.parse_while(
            |b| b.is_ascii_alphabetic(),
            |b| {
                self.buf[self.buf_len] = b;
                self.buf_len = (self.buf_len + 1) % TRANSFORM_BUF;
            },
        )?;

        Ok(&self.buf[..self.buf_len])
    }

    fn parse_transform(&mut self) -> Result<Option<Transform>, SvgParserError> {
        enum Op {
            Matrix,
            Translate,
            TranslateX,
            TranslateY,
            Scale,
            ScaleX,
            ScaleY,
        }

        self.parser.parse_separators()?;
        match self.parser.parse_byte()? {
            None => return Ok(None),
            Some(b) => self.parser.unparse_byte(b),
        }

        let op = match self.parse_ident()? {
            b"matrix" => Op::Matrix,
            b"translate" => Op::Translate,
            b"translateX" => Op::TranslateX,
            b"translateY" => Op::TranslateY,
            b"scale" => Op::Scale,
            b"scaleX" => Op::ScaleX,
            b"scaleY" => Op::ScaleY,
            _ => {
                return Err(SvgParserError::InvalidTransformOp);
            }
        };

        self.parser.parse_separators()?;
        if !matches!(self.parser.parse_byte()?, Some(b'(')) {
            return Err(SvgParserError::BracketExpected);
        }

        let tr = match op {
            Op::Matrix => {
                let m00 = self.parser.parse_scalar()?;
                let m10 = self.parser.parse_scalar()?;
                let m01 = self.parser.parse_scalar()?;
                let m11 = self.parser.parse_scalar()?;
                let m02 = self.parser.parse_scalar()?;
                let m12 = self.parser.parse_scalar()?;
                Transform::new(m00, m01, m02, m10, m11, m12)
            }
            Op::Translate => {
                let tx = self.parser.parse_scalar()?;
                let ty = self.parser.parse_scalar().unwrap_or(0.0);
                Transform::new_translate(tx, ty)
            }
            Op::TranslateX => Transform::new_translate(self.parser.parse_scalar()?, 0.0),
            Op::TranslateY => Transform::new_translate(0.0, self.parser.parse_scalar()?),
            Op::Scale => {
                let sx = self.parser.parse_scalar()?;
                let sy = self.parser.parse_scalar().unwrap_or(sx);
                Transform::new_scale(sx, sy)
            }
            Op::ScaleX => Transform::new_scale(self.parser.parse_scalar()?, 1.0),
            Op::ScaleY => Transform::new_scale(1.0, self.parser.parse_scalar()?),
        };

        self.parser.parse_separators()?;
        if !matches!(self.parser.parse_byte()?, Some(b')')) {
            return Err(SvgParserError::BracketExpected);
        }

        Ok(Some(tr))
    }
}

impl FromStr for Transform {
    type Err = SvgParserError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tr = Transform::identity();
        let mut parser = SvgTransformParser::new(Cursor::new(text));
        while let Some(tr_next) = parser.parse_transform()? {
            tr = tr * tr_next;
        }
        Ok(tr)
    }
}

/// Error while parsing path in the SVG format
#[derive(Debug)]
pub enum SvgParserError {
    /// Failed to parse SVG command
    InvalidCmd(u8),
    /// Curve command found, only straight lines are supported
    UnsupportedCmd(u8),
    /// Failed to parse scalar value
    InvalidScalar,
    /// Invalid transform operation
    InvalidTransformOp,
    /// Invalid Fill Rule
    InvalidFillRule,
    /// Bracket expected,
    BracketExpected,
    /// IO error propagated while reading input stream
    IoError(std::io::Error),
}

impl fmt::Display for SvgParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgParserError::InvalidCmd(op) => {
                write!(f, "SvgPathParser::InvalidCmd({:?})", *op as char)
            }
            SvgParserError::UnsupportedCmd(op) => {
                write!(f, "SvgPathParser::UnsupportedCmd({:?})", *op as char)
            }
            _ => write!(f, "SvgPathParser::{:?}", self),
        }
    }
}

impl From<std::io::Error> for SvgParserError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}

impl From<SvgParserError> for std::io::Error {
    fn from(error: SvgParserError) -> Self {
        match error {
            SvgParserError::IoError(error) => error,
            _ => Self::new(std::io::ErrorKind::InvalidData, error),
        }
    }
}

impl std::error::Error for SvgParserError {}
