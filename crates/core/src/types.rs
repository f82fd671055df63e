//! Common types used throughout the decoder

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Refined metadata format version
///
/// The on-disk header only carries the major number. Several structurally
/// incompatible layouts share major 24, so the loader refines it into a
/// sub-version (24.1, 24.2, 24.4) from structural evidence. Versions order
/// lexicographically: `24 < 24.1 < 24.2 < 24.4 < 25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormatVersion {
    major: u16,
    minor: u16,
}

impl FormatVersion {
    pub const V16: FormatVersion = FormatVersion::new(16, 0);
    pub const V19: FormatVersion = FormatVersion::new(19, 0);
    pub const V20: FormatVersion = FormatVersion::new(20, 0);
    pub const V21: FormatVersion = FormatVersion::new(21, 0);
    pub const V22: FormatVersion = FormatVersion::new(22, 0);
    pub const V23: FormatVersion = FormatVersion::new(23, 0);
    pub const V24: FormatVersion = FormatVersion::new(24, 0);
    pub const V24_1: FormatVersion = FormatVersion::new(24, 1);
    pub const V24_2: FormatVersion = FormatVersion::new(24, 2);
    pub const V24_3: FormatVersion = FormatVersion::new(24, 3);
    pub const V24_4: FormatVersion = FormatVersion::new(24, 4);
    pub const V24_5: FormatVersion = FormatVersion::new(24, 5);
    pub const V26: FormatVersion = FormatVersion::new(26, 0);
    pub const V27: FormatVersion = FormatVersion::new(27, 0);
    pub const V28: FormatVersion = FormatVersion::new(28, 0);
    pub const V29: FormatVersion = FormatVersion::new(29, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub const fn major(&self) -> u16 {
        self.major
    }

    pub const fn minor(&self) -> u16 {
        self.minor
    }

    /// Same major version with the sub-version cleared
    pub const fn base(&self) -> Self {
        Self::new(self.major, 0)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl FromStr for FormatVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || crate::Error::parse(format!("invalid format version '{}'", s));
        let (major, minor) = match s.trim().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s.trim(), "0"),
        };
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;
        if minor > 9 {
            return Err(invalid());
        }
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for FormatVersion {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<FormatVersion> for String {
    fn from(value: FormatVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_version_ordering() {
        assert!(FormatVersion::V24 < FormatVersion::V24_1);
        assert!(FormatVersion::V24_1 < FormatVersion::V24_2);
        assert!(FormatVersion::V24_4 < FormatVersion::V24_5);
        assert!(FormatVersion::V24_5 < FormatVersion::new(25, 0));
        assert!(FormatVersion::V23 < FormatVersion::V24);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(FormatVersion::V24.to_string(), "24");
        assert_eq!(FormatVersion::V24_1.to_string(), "24.1");
        assert_eq!("24.2".parse::<FormatVersion>().unwrap(), FormatVersion::V24_2);
        assert_eq!("29".parse::<FormatVersion>().unwrap(), FormatVersion::V29);
        assert!("24.x".parse::<FormatVersion>().is_err());
        assert!("24.10".parse::<FormatVersion>().is_err());
    }

    #[test]
    fn test_base() {
        assert_eq!(FormatVersion::V24_4.base(), FormatVersion::V24);
    }
}
