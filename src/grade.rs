use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade of a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::S,
            75..=84 => Self::A,
            65..=74 => Self::B,
            55..=64 => Self::C,
            _ => Self::D,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::S => "Perfect! Professional level! 🏆",
            Self::A => "Excellent! Keep it up! ⭐",
            Self::B => "Good! Keep pushing! 👍",
            Self::C => "Pass! Keep working at it! 💪",
            Self::D => "Needs work! Practice more! 📚",
        }
    }
}

/// Grade and message of a total score.
pub fn get_grade(score: u8) -> (Grade, &'static str) {
    let grade = Grade::from_score(score);
    (grade, grade.message())
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(letter)
    }
}
