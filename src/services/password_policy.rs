//! Password strength scoring shared by the reset form and the confirm endpoint.

pub const MIN_LENGTH: usize = 8;
pub const MIN_SCORE: u8 = 3;
pub const MAX_SCORE: u8 = 6;

const SYMBOLS: &str = "@$!%*?&";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Good,
    Better,
    Strong,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Good => "Good",
            Strength::Better => "Better",
            Strength::Strong => "Strong",
        }
    }
}

/// One point each for: length >= 8, uppercase, lowercase, digit, symbol, length >= 12.
pub fn score(password: &str) -> u8 {
    let len = password.chars().count();
    [
        len >= MIN_LENGTH,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SYMBOLS.contains(c)),
        len >= 12,
    ]
    .iter()
    .filter(|hit| **hit)
    .count() as u8
}

pub fn rating(score: u8) -> Strength {
    match score {
        0..=2 => Strength::Weak,
        3 => Strength::Good,
        4 | 5 => Strength::Better,
        _ => Strength::Strong,
    }
}

pub fn strength(password: &str) -> Strength {
    rating(score(password))
}

/// Reasons a new password is refused, in the order they are checked.
pub fn check(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_LENGTH {
        return Err("Password must be at least 8 characters");
    }
    if score(password) < MIN_SCORE {
        return Err("Please choose a stronger password (min. 8 chars, mix of letters, numbers & a symbol)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands() {
        assert_eq!(rating(0), Strength::Weak);
        assert_eq!(rating(2), Strength::Weak);
        assert_eq!(rating(3), Strength::Good);
        assert_eq!(rating(4), Strength::Better);
        assert_eq!(rating(5), Strength::Better);
        assert_eq!(rating(6), Strength::Strong);
    }

    #[test]
    fn scores_each_criterion() {
        assert_eq!(score(""), 0);
        assert_eq!(score("abc"), 1);
        assert_eq!(score("abcdefgh"), 2);
        assert_eq!(score("Abcdefgh"), 3);
        assert_eq!(score("Abcdefg1"), 4);
        assert_eq!(score("Abcdefg1!"), 5);
        assert_eq!(score("Abcdefg1!xyz"), 6);
        assert_eq!(strength("Abcdefg1!xyz").label(), "Strong");
    }

    #[test]
    fn adding_criteria_never_lowers_score() {
        let steps = ["a", "aB", "aB3", "aB3$", "aB3$aaaa", "aB3$aaaaaaaa"];
        let scores: Vec<u8> = steps.iter().map(|p| score(p)).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*scores.last().unwrap(), MAX_SCORE);
    }

    #[test]
    fn check_requires_length_and_score() {
        assert!(check("Ab1").is_err());
        assert!(check("abcdefgh").is_err());
        assert!(check("Abcdefgh").is_ok());
    }
}
