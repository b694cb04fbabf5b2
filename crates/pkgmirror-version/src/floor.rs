use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[vV]?(?<major>[0-9]+)").expect("valid leading component regex"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version floor: {0:?}")]
pub struct FloorError(pub String);

/// Leading numeric component of a version string (`"10.2rc1"` -> `10`).
pub fn leading_component(version: &str) -> Option<u64> {
    LEADING_REGEX
        .captures(version)
        .and_then(|caps| caps.name("major"))
        .and_then(|m| m.as_str().parse().ok())
}

/// Minimum leading version component a release must reach to be mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionFloor {
    major: u64,
}

impl VersionFloor {
    pub fn new(major: u64) -> Self { Self { major } }

    pub fn parse(s: &str) -> Result<Self, FloorError> {
        leading_component(s)
            .map(Self::new)
            .ok_or_else(|| FloorError(s.to_string()))
    }

    pub fn major(&self) -> u64 { self.major }

    /// Whether a release version clears the floor.
    ///
    /// Versions without a numeric leading component are admitted.
    pub fn admits(&self, version: &str) -> bool {
        leading_component(version).is_none_or(|major| major >= self.major)
    }
}

impl std::str::FromStr for VersionFloor {
    type Err = FloorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { VersionFloor::parse(s) }
}

impl std::fmt::Display for VersionFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.major)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_component() {
        assert_eq!(leading_component("1.5"), Some(1));
        assert_eq!(leading_component("10.2rc1"), Some(10));
        assert_eq!(leading_component("2"), Some(2));
        assert_eq!(leading_component(" v3.0 "), Some(3));
        assert_eq!(leading_component("2013-01-01"), Some(2013));
        assert_eq!(leading_component("dev"), None);
        assert_eq!(leading_component(""), None);
    }

    #[test]
    fn test_parse_floor_file_contents() {
        assert_eq!(VersionFloor::parse("2\n").unwrap(), VersionFloor::new(2));
        assert_eq!(VersionFloor::parse("2.5").unwrap(), VersionFloor::new(2));
        assert_eq!(VersionFloor::parse("latest"), Err(FloorError("latest".into())));
        assert!(VersionFloor::parse("").is_err());
    }

    #[test]
    fn test_admits() {
        let floor = VersionFloor::new(2);
        assert!(!floor.admits("1.5"));
        assert!(!floor.admits("0.9b1"));
        assert!(floor.admits("2.0"));
        assert!(floor.admits("2"));
        assert!(floor.admits("11.0"));
    }

    #[test]
    fn test_admits_compares_numerically() {
        let floor = VersionFloor::new(9);
        assert!(floor.admits("10.0"));
        assert!(!floor.admits("8.99"));
    }

    #[test]
    fn test_non_numeric_release_admitted() {
        let floor = VersionFloor::new(100);
        assert!(floor.admits("unknown"));
    }
}
