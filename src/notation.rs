//! Commutator notation: parsing, validation, inversion and expansion.
//!
//! Accepted forms are `[A, B]` and `[S: [A, B]]` where `A` and `B` are
//! single-space separated face turns and `S` may also contain whole-cube
//! rotations. Nothing is normalized: stray or doubled whitespace is an error.

use std::fmt;

use thiserror::Error;

/// A face of the cube that can be turned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Face {
    U,
    L,
    F,
    R,
    D,
    B,
}

impl Face {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'U' => Some(Face::U),
            b'L' => Some(Face::L),
            b'F' => Some(Face::F),
            b'R' => Some(Face::R),
            b'D' => Some(Face::D),
            b'B' => Some(Face::B),
            _ => None,
        }
    }
}

/// Axis of a whole-cube rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Axis {
    #[strum(to_string = "x")]
    X,
    #[strum(to_string = "y")]
    Y,
    #[strum(to_string = "z")]
    Z,
}

impl Axis {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'x' => Some(Axis::X),
            b'y' => Some(Axis::Y),
            b'z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// One token of an algorithm: a face turn or a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Turn { face: Face, half: bool, prime: bool },
    Rotation { axis: Axis, prime: bool },
}

impl Token {
    pub fn is_rotation(&self) -> bool {
        matches!(self, Token::Rotation { .. })
    }

    /// Half turns undo themselves; everything else flips its prime.
    pub fn inverse(&self) -> Self {
        match *self {
            Token::Turn {
                half: true,
                face,
                prime,
            } => Token::Turn {
                face,
                half: true,
                prime,
            },
            Token::Turn { face, prime, .. } => Token::Turn {
                face,
                half: false,
                prime: !prime,
            },
            Token::Rotation { axis, prime } => Token::Rotation {
                axis,
                prime: !prime,
            },
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Turn { face, half, prime } => {
                write!(f, "{face}")?;
                if *half {
                    f.write_str("2")?;
                }
                if *prime {
                    f.write_str("'")?;
                }
                Ok(())
            }
            Token::Rotation { axis, prime } => {
                write!(f, "{axis}")?;
                if *prime {
                    f.write_str("'")?;
                }
                Ok(())
            }
        }
    }
}

/// An ordered list of tokens, rendered space separated
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MoveSequence(Vec<Token>);

impl MoveSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reverse order and invert every token
    pub fn inverse(&self) -> Self {
        Self(self.0.iter().rev().map(Token::inverse).collect())
    }

    pub fn extend_from(&mut self, other: &MoveSequence) {
        self.0.extend_from_slice(&other.0);
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// A parsed commutator, with or without setup moves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Commutator {
    Pure {
        a: MoveSequence,
        b: MoveSequence,
    },
    Setup {
        setup: MoveSequence,
        a: MoveSequence,
        b: MoveSequence,
    },
}

impl Commutator {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Parser::new(text).commutator()
    }

    /// Swap the two halves of the inner commutator, keeping any setup.
    pub fn inverse(&self) -> Self {
        match self {
            Commutator::Pure { a, b } => Commutator::Pure {
                a: b.clone(),
                b: a.clone(),
            },
            Commutator::Setup { setup, a, b } => Commutator::Setup {
                setup: setup.clone(),
                a: b.clone(),
                b: a.clone(),
            },
        }
    }

    /// `A B A' B'`, wrapped in `S ... S'` for the setup form.
    pub fn expand(&self) -> MoveSequence {
        match self {
            Commutator::Pure { a, b } => expand_pure(a, b),
            Commutator::Setup { setup, a, b } => {
                let mut moves = setup.clone();
                moves.extend_from(&expand_pure(a, b));
                moves.extend_from(&setup.inverse());
                moves
            }
        }
    }
}

fn expand_pure(a: &MoveSequence, b: &MoveSequence) -> MoveSequence {
    let mut moves = a.clone();
    moves.extend_from(b);
    moves.extend_from(&a.inverse());
    moves.extend_from(&b.inverse());
    moves
}

impl fmt::Display for Commutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commutator::Pure { a, b } => write!(f, "[{a}, {b}]"),
            Commutator::Setup { setup, a, b } => write!(f, "[{setup}: [{a}, {b}]]"),
        }
    }
}

/// What the parser was looking for when it gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Expected {
    #[strum(to_string = "'['")]
    OpenBracket,
    #[strum(to_string = "']'")]
    CloseBracket,
    #[strum(to_string = "a face turn (U L F R D B)")]
    Turn,
    #[strum(to_string = "a face turn or rotation")]
    TurnOrRotation,
    #[strum(to_string = "', '")]
    Comma,
    #[strum(to_string = "', ' or ': '")]
    Separator,
    #[strum(to_string = "a single space")]
    Space,
    #[strum(to_string = "end of input")]
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid commutator: expected {expected} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub expected: Expected,
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn error(&self, expected: Expected) -> ParseError {
        ParseError {
            position: self.pos,
            expected,
        }
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8, expected: Expected) -> Result<(), ParseError> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn commutator(mut self) -> Result<Commutator, ParseError> {
        self.expect(b'[', Expected::OpenBracket)?;
        let (first, first_rotation) = self.sequence(true)?;

        let parsed = match self.peek() {
            Some(b',') => {
                if let Some(at) = first_rotation {
                    return Err(ParseError {
                        position: at,
                        expected: Expected::Turn,
                    });
                }
                self.pos += 1;
                self.expect(b' ', Expected::Space)?;
                let (b, _) = self.sequence(false)?;
                self.expect(b']', Expected::CloseBracket)?;
                Commutator::Pure { a: first, b }
            }
            Some(b':') => {
                self.pos += 1;
                self.expect(b' ', Expected::Space)?;
                self.expect(b'[', Expected::OpenBracket)?;
                let (a, _) = self.sequence(false)?;
                self.expect(b',', Expected::Comma)?;
                self.expect(b' ', Expected::Space)?;
                let (b, _) = self.sequence(false)?;
                self.expect(b']', Expected::CloseBracket)?;
                self.expect(b']', Expected::CloseBracket)?;
                Commutator::Setup { setup: first, a, b }
            }
            _ => return Err(self.error(Expected::Separator)),
        };

        if self.pos != self.src.len() {
            return Err(self.error(Expected::End));
        }
        Ok(parsed)
    }

    /// One or more tokens joined by single spaces. Also reports where the
    /// first rotation was seen so the caller can reject it in pure form.
    fn sequence(
        &mut self,
        allow_rotations: bool,
    ) -> Result<(MoveSequence, Option<usize>), ParseError> {
        let mut tokens = Vec::new();
        let mut first_rotation = None;
        loop {
            let start = self.pos;
            let token = self.token(allow_rotations)?;
            if token.is_rotation() && first_rotation.is_none() {
                first_rotation = Some(start);
            }
            tokens.push(token);
            if !self.eat(b' ') {
                break;
            }
        }
        Ok((MoveSequence(tokens), first_rotation))
    }

    fn token(&mut self, allow_rotations: bool) -> Result<Token, ParseError> {
        let expected = if allow_rotations {
            Expected::TurnOrRotation
        } else {
            Expected::Turn
        };
        let b = self.peek().ok_or_else(|| self.error(expected))?;

        if let Some(face) = Face::from_byte(b) {
            self.pos += 1;
            let half = self.eat(b'2');
            let prime = self.eat(b'\'');
            return Ok(Token::Turn { face, half, prime });
        }
        if allow_rotations {
            if let Some(axis) = Axis::from_byte(b) {
                self.pos += 1;
                let prime = self.eat(b'\'');
                return Ok(Token::Rotation { axis, prime });
            }
        }
        Err(self.error(expected))
    }
}

/// True iff `text` is exactly a pure or setup commutator.
pub fn validate(text: &str) -> bool {
    Commutator::parse(text).is_ok()
}

/// `[A, B]` becomes `[B, A]`; `[S: [A, B]]` becomes `[S: [B, A]]`.
pub fn invert(text: &str) -> Result<String, ParseError> {
    Ok(Commutator::parse(text)?.inverse().to_string())
}

/// The primitive move sequence the commutator stands for.
pub fn expand(text: &str) -> Result<MoveSequence, ParseError> {
    Ok(Commutator::parse(text)?.expand())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn validates_pure_and_setup_forms() {
        assert!(validate("[R, U]"));
        assert!(validate("[R U R', D2]"));
        assert!(validate("[R2' U, D]"));
        assert!(validate("[D: [R U R', D]]"));
        assert!(validate("[x y' R: [U, L2]]"));
        assert!(validate("[x: [U, L]]"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(!validate(""));
        assert!(!validate("[R, U"));
        assert!(!validate("R, U]"));
        assert!(!validate("[R,  U]"));
        assert!(!validate("[R  U, D]"));
        assert!(!validate("[R,U]"));
        assert!(!validate(" [R, U]"));
        assert!(!validate("[R, U] "));
        assert!(!validate("[R , U]"));
        assert!(!validate("[R U , D]"));
        assert!(!validate("[: [R, U]]"));
        assert!(!validate("[ : [R, U]]"));
        assert!(!validate("[M, U]"));
        assert!(!validate("[r, U]"));
        assert!(!validate("[R, U]]"));
        assert!(!validate("[D: [R, U]"));
        assert!(!validate("[D:[R, U]]"));
    }

    #[test]
    fn rotations_only_allowed_in_setup() {
        assert!(!validate("[x, U]"));
        assert!(!validate("[R, y]"));
        assert!(!validate("[D: [x, U]]"));
        assert!(!validate("[x2: [R, U]]"));
    }

    #[test]
    fn error_points_at_offending_position() {
        let err = Commutator::parse("[R, Q]").unwrap_err();
        assert_eq!(err.position, 4);
        assert_eq!(err.expected, Expected::Turn);

        let err = Commutator::parse("[R U]").unwrap_err();
        assert_eq!(err.expected, Expected::Separator);

        let err = Commutator::parse("[x R, U]").unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(err.expected, Expected::Turn);

        assert_matches!(
            Commutator::parse("[R, U]x"),
            Err(ParseError {
                position: 6,
                expected: Expected::End
            })
        );
    }

    #[test]
    fn invert_swaps_halves() {
        assert_eq!(invert("[R, U]").unwrap(), "[U, R]");
        assert_eq!(invert("[R U R', D2]").unwrap(), "[D2, R U R']");
    }

    #[test]
    fn invert_keeps_setup() {
        assert_eq!(
            invert("[x U': [R D R', U2]]").unwrap(),
            "[x U': [U2, R D R']]"
        );
    }

    #[test]
    fn double_inverse_is_identity() {
        for text in ["[R, U]", "[R U R', D2]", "[y: [L' D L, U]]", "[R2' F, B]"] {
            let c = Commutator::parse(text).unwrap();
            assert_eq!(c.inverse().inverse(), c);
            assert_eq!(invert(&invert(text).unwrap()).unwrap(), text);
        }
    }

    #[test]
    fn invert_rejects_invalid() {
        assert_matches!(invert("R U"), Err(ParseError { .. }));
        assert_matches!(expand("[R, U"), Err(ParseError { .. }));
    }

    #[test]
    fn expands_pure_commutator() {
        assert_eq!(expand("[R, U]").unwrap().to_string(), "R U R' U'");
        assert_eq!(
            expand("[R U R', D2]").unwrap().to_string(),
            "R U R' D2 R U' R' D2"
        );
    }

    #[test]
    fn expands_setup_commutator() {
        assert_eq!(
            expand("[x D': [R, U]]").unwrap().to_string(),
            "x D' R U R' U' D x'"
        );
    }

    #[test]
    fn half_turns_are_self_inverse() {
        let seq = expand("[R2, U2']").unwrap();
        assert_eq!(seq.to_string(), "R2 U2' R2 U2'");
    }

    #[test]
    fn expanded_length_follows_form() {
        let pure = Commutator::parse("[R U R', D2 F]").unwrap();
        assert_eq!(pure.expand().len(), 2 * (3 + 2));

        let setup = Commutator::parse("[x U: [R U R', D]]").unwrap();
        assert_eq!(setup.expand().len(), 2 * 2 + 2 * (3 + 1));
    }

    #[test]
    fn display_round_trips_parsed_text() {
        for text in ["[R, U]", "[x y' R2: [U', L2]]", "[D2' F, B U]"] {
            assert_eq!(Commutator::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn non_ascii_input_is_rejected() {
        assert!(!validate("[R, Ü]"));
        assert!(!validate("[R’, U]"));
    }
}
