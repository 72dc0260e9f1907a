//! Process-wide, read-only-per-run configuration, threaded explicitly
//! into the passes that consult it.

use crate::error::FatalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target language version. Gates which keywords are legal: using an
/// out-of-range keyword is itself a reported error, not a parse abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetVersion {
    V1_0,
    V1_1,
}

impl TargetVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetVersion::V1_0 => "1.0",
            TargetVersion::V1_1 => "1.1",
        }
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetVersion {
    type Err = FatalError;

    fn from_str(s: &str) -> Result<TargetVersion, FatalError> {
        match s {
            "1.0" => Ok(TargetVersion::V1_0),
            "1.1" => Ok(TargetVersion::V1_1),
            other => Err(FatalError::Version(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Interleave `<!-- Line: N -->` comments in the generated markup.
    pub line_comments: bool,
    /// Report "could not find variable" advisories. Suppressing them
    /// still sets the undefined-seen flag on the compilation.
    pub warn_undefined: bool,
    /// Produce the depth-first symbol listing.
    pub show_symbols: bool,
    /// Policy: undefined references make the run count as failed.
    pub strict_undefined: bool,
    /// Target language version.
    pub target: TargetVersion,
    /// Namespace prefix used on every generated tag.
    pub prefix: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            line_comments: false,
            warn_undefined: true,
            show_symbols: false,
            strict_undefined: false,
            target: TargetVersion::V1_0,
            prefix: "xsl".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_and_orders() {
        assert_eq!("1.0".parse::<TargetVersion>().unwrap(), TargetVersion::V1_0);
        assert_eq!("1.1".parse::<TargetVersion>().unwrap(), TargetVersion::V1_1);
        assert!(TargetVersion::V1_0 < TargetVersion::V1_1);
        assert!("2.0".parse::<TargetVersion>().is_err());
    }
}
