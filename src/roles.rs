use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROLE_COUNT: usize = 5;

/// Roles in the order they are listed to users.
pub const DISPLAY_ORDER: [Role; ROLE_COUNT] = [Role::Gold, Role::Mid, Role::Exp, Role::Jg, Role::Roam];

/// A lane in a five-player lineup.
///
/// Variants are declared in token order, so `Ord` (and every `BTreeMap<Role, _>`)
/// walks roles lexicographically: `exp, gold, jg, mid, roam`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Exp,
    Gold,
    Jg,
    Mid,
    Roam,
}

impl Role {
    pub const ALL: [Role; ROLE_COUNT] = [Role::Exp, Role::Gold, Role::Jg, Role::Mid, Role::Roam];

    pub fn token(self) -> &'static str {
        match self {
            Role::Exp => "exp",
            Role::Gold => "gold",
            Role::Jg => "jg",
            Role::Mid => "mid",
            Role::Roam => "roam",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Role::Exp => "⚔️",
            Role::Gold => "👑",
            Role::Jg => "🗡️",
            Role::Mid => "🔮",
            Role::Roam => "🛡️",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role token '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exp" => Ok(Role::Exp),
            "gold" => Ok(Role::Gold),
            "jg" => Ok(Role::Jg),
            "mid" => Ok(Role::Mid),
            "roam" => Ok(Role::Roam),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gold", Role::Gold)]
    #[case(" MID ", Role::Mid)]
    #[case("Jg", Role::Jg)]
    fn parses_tokens_case_insensitively(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(input.parse::<Role>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_token() {
        assert_eq!("support".parse::<Role>(), Err(UnknownRole("support".to_string())));
    }

    #[test]
    fn ordering_is_lexicographic_by_token() {
        let mut tokens: Vec<&str> = Role::ALL.iter().map(|r| r.token()).collect();
        let listed = tokens.clone();
        tokens.sort();
        assert_eq!(tokens, listed);
    }

    #[test]
    fn display_order_covers_every_role_once() {
        let mut roles = DISPLAY_ORDER.to_vec();
        roles.sort();
        assert_eq!(roles, Role::ALL.to_vec());
    }
}
