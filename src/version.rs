//! Game versions and their data pack formats.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Known game versions and the pack format they expect.
const PACK_FORMATS: &[((u16, u16, u16), u8)] = &[
    ((1, 13, 0), 4),
    ((1, 14, 1), 4),
    ((1, 15, 1), 5),
    ((1, 16, 1), 5),
    ((1, 16, 2), 6),
    ((1, 16, 3), 6),
    ((1, 16, 4), 6),
    ((1, 16, 5), 6),
    ((1, 17, 0), 7),
    ((1, 17, 1), 7),
    ((1, 18, 0), 8),
    ((1, 18, 1), 8),
    ((1, 18, 2), 9),
    ((1, 19, 0), 10),
    ((1, 19, 1), 10),
    ((1, 19, 2), 10),
    ((1, 19, 4), 12),
    ((1, 20, 0), 15),
    ((1, 20, 1), 15),
    ((1, 20, 2), 18),
    ((1, 20, 3), 26),
    ((1, 20, 4), 26),
    ((1, 20, 5), 41),
    ((1, 20, 6), 41),
    ((1, 21, 0), 48),
    ((1, 21, 1), 48),
    ((1, 21, 4), 61),
    ((1, 21, 5), 71),
];

/// A game version, `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u16,
    minor: u16,
    patch: u16,
}

impl Version {
    /// Lowest version with data pack support.
    pub const MIN: Self = Self::new(1, 13, 0);
    /// Highest version in the pack format table.
    pub const MAX: Self = Self::new(1, 21, 5);

    /// Create a version from its parts.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Major version number.
    #[must_use]
    pub fn major(&self) -> u16 {
        self.major
    }

    /// Minor version number.
    #[must_use]
    pub fn minor(&self) -> u16 {
        self.minor
    }

    /// Patch version number.
    #[must_use]
    pub fn patch(&self) -> u16 {
        self.patch
    }

    /// Get the pack format of this version, if it is known.
    #[must_use]
    pub fn pack_format(&self) -> Option<u8> {
        PACK_FORMATS
            .iter()
            .find(|(v, _)| *v == (self.major, self.minor, self.patch))
            .map(|(_, format)| *format)
    }

    /// Get the pack format of this version or fail.
    ///
    /// # Errors
    /// - If the version is not in the pack format table
    pub fn require_pack_format(&self) -> Result<u8, VersionError> {
        self.pack_format()
            .ok_or(VersionError::UnknownPackFormat(*self))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('.')
            .map(str::parse::<u16>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::Parse(s.to_string()))?;
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(VersionError::Parse(s.to_string())),
        }
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("1.21.4".parse::<Version>(), Ok(Version::new(1, 21, 4)));
        assert_eq!("1.21".parse::<Version>(), Ok(Version::new(1, 21, 0)));
        assert!("1".parse::<Version>().is_err());
        assert!("1.x.2".parse::<Version>().is_err());
        assert_eq!(Version::new(1, 20, 0).to_string(), "1.20.0");
    }

    #[test]
    fn test_pack_format() {
        assert_eq!(Version::new(1, 21, 4).pack_format(), Some(61));
        assert_eq!(Version::new(1, 20, 1).pack_format(), Some(15));
        assert_eq!(Version::new(1, 21, 2).pack_format(), None);
        assert_eq!(
            Version::new(1, 21, 2).require_pack_format(),
            Err(VersionError::UnknownPackFormat(Version::new(1, 21, 2)))
        );
    }

    #[test]
    fn test_ordering() {
        assert!(Version::new(1, 20, 6) < Version::new(1, 21, 0));
        assert!(Version::MIN < Version::MAX);
    }
}
