use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Board coordinate or direction vector.
///
/// `x` is the file (0 = `a`), `y` is the rank (0 = `1`), origin at the
/// bottom-left. A coordinate carries no validity of its own; whether it lies
/// on a board depends on that board's extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parse algebraic notation such as `"e4"`.
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        text.parse()
    }

    /// Algebraic notation, `None` when a component is negative.
    pub fn notation(self) -> Option<String> {
        if self.x < 0 || self.y < 0 {
            return None;
        }
        Some(format!("{}{}", file_letters(self.x), self.y + 1))
    }

    /// `self + direction * k`, or `None` when a component overflows.
    pub fn checked_offset(self, direction: Coord, k: i32) -> Option<Coord> {
        let x = direction.x.checked_mul(k)?.checked_add(self.x)?;
        let y = direction.y.checked_mul(k)?.checked_add(self.y)?;
        Some(Coord::new(x, y))
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Coord {
        self + -rhs
    }
}

impl Neg for Coord {
    type Output = Coord;

    #[inline]
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;

    #[inline]
    fn mul(self, k: i32) -> Coord {
        Coord::new(self.x * k, self.y * k)
    }
}

/// Position text that could not be read as a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("empty position")]
    Empty,
    #[error("position {0:?} has no file letters")]
    MissingFile(String),
    #[error("position {0:?} has no rank number")]
    MissingRank(String),
    #[error("position {0:?} is not letters followed by digits")]
    Malformed(String),
    #[error("rank in {0:?} must start at 1")]
    ZeroRank(String),
}

impl FromStr for Coord {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NotationError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() {
            return Err(NotationError::MissingFile(s.to_string()));
        }
        if digits.is_empty() {
            return Err(NotationError::MissingRank(s.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NotationError::Malformed(s.to_string()));
        }

        // bijective base 26: a..z, aa..az, ba..
        let mut file: i64 = 0;
        for b in letters.bytes() {
            file = file * 26 + i64::from(b - b'a' + 1);
            if file > i64::from(i32::MAX) {
                return Err(NotationError::Malformed(s.to_string()));
            }
        }
        let rank: i32 = digits
            .parse()
            .map_err(|_| NotationError::Malformed(s.to_string()))?;
        if rank == 0 {
            return Err(NotationError::ZeroRank(s.to_string()));
        }

        Ok(Coord::new((file - 1) as i32, rank - 1))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notation() {
            Some(text) => f.write_str(&text),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

/// File letters for a zero-based file index.
pub fn file_letters(file: i32) -> String {
    let mut n = file as i64 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push((b'a' + rem) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

/// The eight king steps around the origin.
pub const KING_STEPS: [Coord; 8] = [
    Coord { x: 0, y: 1 },
    Coord { x: 1, y: 0 },
    Coord { x: 0, y: -1 },
    Coord { x: -1, y: 0 },
    Coord { x: 1, y: 1 },
    Coord { x: -1, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: -1, y: -1 },
];

/// The eight knight leaps.
pub const KNIGHT_LEAPS: [Coord; 8] = [
    Coord { x: 1, y: 2 },
    Coord { x: -1, y: 2 },
    Coord { x: 1, y: -2 },
    Coord { x: -1, y: -2 },
    Coord { x: 2, y: 1 },
    Coord { x: -2, y: 1 },
    Coord { x: 2, y: -1 },
    Coord { x: -2, y: -1 },
];
