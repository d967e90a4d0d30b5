//! Textual declarations of movement rules.
//!
//! One statement per rule, terminated by `;`:
//!
//! ```text
//! take-move(1, 0) repeat;              # rook ray
//! move(0, 1) repeat(2) when(unmoved);  # pawn double step
//! take(1, 1) repeat(5) skip when(even-turn);
//! ```
//!
//! `take-move`, `move` and `take` give the direction and the mode. A rule
//! takes one step unless `repeat` (unbounded) or `repeat(n)` says otherwise.
//! `skip` lets the scan pass occupied squares and `when(name)` attaches one
//! of the named preconditions.

use thiserror::Error;

use crate::coord::Coord;
use crate::rule::{preconditions, Mode, MovementRule, Precondition};

/// Why a rule script was rejected. `statement` counts from 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("statement {statement}: unknown word `{word}`")]
    UnknownWord { statement: usize, word: String },
    #[error("statement {statement}: `{word}` expects {expected}")]
    BadArguments {
        statement: usize,
        word: String,
        expected: &'static str,
    },
    #[error("statement {statement}: no take-move/move/take direction")]
    MissingDirection { statement: usize },
    #[error("statement {statement}: more than one direction")]
    DuplicateDirection { statement: usize },
    #[error("statement {statement}: direction (0, 0) never leaves the square")]
    ZeroDirection { statement: usize },
    #[error("statement {statement}: direction components must lie within ±{}", MAX_COMPONENT)]
    DirectionOutOfRange { statement: usize },
    #[error("statement {statement}: repeat count must be at least 1")]
    ZeroRepeat { statement: usize },
    #[error("statement {statement}: unknown precondition `{name}`")]
    UnknownPrecondition { statement: usize, name: String },
}

/// Largest direction component a script may declare.
pub const MAX_COMPONENT: i32 = i16::MAX as i32;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Direction(Mode, i32, i32),
    Repeat(Option<u32>),
    Skip,
    When(String),
    Semicolon,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    statement: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            statement: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_comment(&mut self) {
        let bytes = self.input.as_bytes();
        if self.pos < bytes.len() && bytes[self.pos] == b'#' {
            while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
        }
    }

    fn read_word(&mut self) -> &'a str {
        let rest = &self.input[self.pos..];
        let end = rest
            .find(|ch: char| ch.is_whitespace() || ";(),#".contains(ch))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Arguments of `word(a, b)`; `None` when no parenthesis follows.
    fn read_args(&mut self) -> Option<Vec<&'a str>> {
        self.skip_whitespace();
        let bytes = self.input.as_bytes();
        if self.pos >= bytes.len() || bytes[self.pos] != b'(' {
            return None;
        }
        self.pos += 1; // consume '('

        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b')' {
            self.pos += 1;
        }
        let inner = &self.input[start..self.pos];
        if self.pos < bytes.len() {
            self.pos += 1; // consume ')'
        }

        Some(
            inner
                .split(',')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .collect(),
        )
    }

    fn next_token(&mut self) -> Option<Result<Token, ScriptError>> {
        loop {
            self.skip_whitespace();
            self.skip_comment();
            self.skip_whitespace();

            let bytes = self.input.as_bytes();
            if self.pos >= bytes.len() {
                return None;
            }

            match bytes[self.pos] {
                b';' => {
                    self.pos += 1;
                    self.statement += 1;
                    return Some(Ok(Token::Semicolon));
                }
                b'#' => continue,
                _ => {}
            }

            let word = self.read_word();
            if word.is_empty() {
                // stray ',' or ')'
                let stray = self.input[self.pos..].chars().next().unwrap_or(')');
                return Some(Err(ScriptError::UnknownWord {
                    statement: self.statement,
                    word: stray.to_string(),
                }));
            }
            let args = self.read_args();
            return Some(self.parse_token(word, args));
        }
    }

    fn parse_token(&self, word: &str, args: Option<Vec<&str>>) -> Result<Token, ScriptError> {
        let statement = self.statement;
        let bad = |expected: &'static str| ScriptError::BadArguments {
            statement,
            word: word.to_string(),
            expected,
        };

        let direction = |mode: Mode| -> Result<Token, ScriptError> {
            match args.as_deref() {
                Some([dx, dy]) => {
                    let dx = dx.parse::<i32>().map_err(|_| bad("two integers"))?;
                    let dy = dy.parse::<i32>().map_err(|_| bad("two integers"))?;
                    Ok(Token::Direction(mode, dx, dy))
                }
                _ => Err(bad("two integers")),
            }
        };

        match word {
            "take-move" => direction(Mode::Either),
            "move" => direction(Mode::MoveOnly),
            "take" => direction(Mode::AttackOnly),
            "repeat" => match args.as_deref() {
                None | Some([]) => Ok(Token::Repeat(None)),
                Some([n]) => {
                    let n = n.parse::<u32>().map_err(|_| bad("a step count"))?;
                    if n == 0 {
                        return Err(ScriptError::ZeroRepeat { statement });
                    }
                    Ok(Token::Repeat(Some(n)))
                }
                _ => Err(bad("at most one step count")),
            },
            "skip" => match args.as_deref() {
                None | Some([]) => Ok(Token::Skip),
                _ => Err(bad("no arguments")),
            },
            "when" => match args.as_deref() {
                Some([name]) => Ok(Token::When(name.to_string())),
                _ => Err(bad("a precondition name")),
            },
            _ => Err(ScriptError::UnknownWord {
                statement,
                word: word.to_string(),
            }),
        }
    }
}

/// Look up a named precondition.
pub fn precondition(name: &str) -> Option<Precondition> {
    let found: Precondition = match name {
        "always" => preconditions::always,
        "unmoved" => preconditions::unmoved,
        "moved" => preconditions::moved,
        "even-turn" => preconditions::even_turn,
        "odd-turn" => preconditions::odd_turn,
        _ => return None,
    };
    Some(found)
}

/// Partially read statement.
#[derive(Default)]
struct Pending {
    direction: Option<(Mode, Coord)>,
    max_steps: Option<Option<u32>>,
    skipping: bool,
    precondition: Option<Precondition>,
    empty: bool,
}

impl Pending {
    fn fresh() -> Self {
        Self {
            empty: true,
            ..Self::default()
        }
    }

    fn finish(self, statement: usize) -> Result<Option<MovementRule>, ScriptError> {
        if self.empty {
            return Ok(None);
        }
        let (mode, direction) = self
            .direction
            .ok_or(ScriptError::MissingDirection { statement })?;
        Ok(Some(MovementRule {
            direction,
            max_steps: self.max_steps.unwrap_or(Some(1)),
            skipping: self.skipping,
            mode,
            precondition: self.precondition.unwrap_or(preconditions::always),
        }))
    }
}

/// Parse a rule script into its rules, in declaration order.
pub fn parse(script: &str) -> Result<Vec<MovementRule>, ScriptError> {
    let mut lexer = Lexer::new(script);
    let mut rules = Vec::new();
    let mut pending = Pending::fresh();

    while let Some(token) = lexer.next_token() {
        let statement = lexer.statement;
        match token? {
            Token::Semicolon => {
                // the lexer already advanced past this statement
                if let Some(rule) = std::mem::replace(&mut pending, Pending::fresh())
                    .finish(statement - 1)?
                {
                    rules.push(rule);
                }
                continue;
            }
            Token::Direction(mode, dx, dy) => {
                if pending.direction.is_some() {
                    return Err(ScriptError::DuplicateDirection { statement });
                }
                if dx == 0 && dy == 0 {
                    return Err(ScriptError::ZeroDirection { statement });
                }
                let bound = MAX_COMPONENT.unsigned_abs();
                if dx.unsigned_abs() > bound || dy.unsigned_abs() > bound {
                    return Err(ScriptError::DirectionOutOfRange { statement });
                }
                pending.direction = Some((mode, Coord::new(dx, dy)));
            }
            Token::Repeat(max) => pending.max_steps = Some(max),
            Token::Skip => pending.skipping = true,
            Token::When(name) => {
                let found = precondition(&name)
                    .ok_or(ScriptError::UnknownPrecondition { statement, name })?;
                pending.precondition = Some(found);
            }
        }
        pending.empty = false;
    }

    // a trailing statement without ';'
    if let Some(rule) = pending.finish(lexer.statement)? {
        rules.push(rule);
    }

    Ok(rules)
}
