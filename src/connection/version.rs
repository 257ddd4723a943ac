use std::fmt;
use std::str::FromStr;

use super::SqlAnywhereConnection;
use crate::driver::{ConnectionAttribute, DriverClient};
use crate::error::SqlAnywhereDbError;
use crate::runner::QueryRunner;

/// A dotted server version such as `17.0.10.5963`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl FromStr for ServerVersion {
    type Err = SqlAnywhereDbError;

    /// Missing trailing components default to zero; anything after the
    /// numeric prefix of a component is ignored (`"12.0.1-beta"` parses).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u32; 4];
        let mut seen = 0;
        for (slot, piece) in parts.iter_mut().zip(s.trim().split('.')) {
            let digits: String = piece.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            *slot = digits.parse().map_err(|_| {
                SqlAnywhereDbError::Other(format!("version component out of range: {piece}"))
            })?;
            seen += 1;
        }
        if seen == 0 {
            return Err(SqlAnywhereDbError::Other(format!(
                "unrecognized server version: {s:?}"
            )));
        }
        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            build: parts[3],
        })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

impl<D: DriverClient, R: QueryRunner> SqlAnywhereConnection<D, R> {
    /// The server version reported by the write driver, or an empty string
    /// when the driver does not expose it.
    #[must_use]
    pub fn server_version(&self) -> String {
        self.write
            .attribute(ConnectionAttribute::ServerVersion)
            .unwrap_or_default()
    }

    /// The server version parsed into components; `None` when absent or unparsable.
    #[must_use]
    pub fn parsed_server_version(&self) -> Option<ServerVersion> {
        self.server_version().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_versions() {
        let full: ServerVersion = "17.0.10.5963".parse().unwrap();
        assert_eq!(
            full,
            ServerVersion {
                major: 17,
                minor: 0,
                patch: 10,
                build: 5963
            }
        );
        let short: ServerVersion = "3.45".parse().unwrap();
        assert_eq!((short.major, short.minor, short.patch), (3, 45, 0));
        assert_eq!(short.to_string(), "3.45.0.0");
    }

    #[test]
    fn ignores_suffixes_and_rejects_garbage() {
        let v: ServerVersion = "12.0.1-beta".parse().unwrap();
        assert_eq!(v.patch, 1);
        assert!("".parse::<ServerVersion>().is_err());
        assert!("unknown".parse::<ServerVersion>().is_err());
    }

    #[test]
    fn versions_order_numerically() {
        let a: ServerVersion = "9.0.2".parse().unwrap();
        let b: ServerVersion = "17.0".parse().unwrap();
        assert!(a < b);
    }
}
