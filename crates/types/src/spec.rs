//! `<package>` / `<package>=<version>` CLI spec parsing (spec §6).

use crate::version::Version;

/// A user-provided package reference: a bare name, or `name=version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<Version>,
}

impl PackageSpec {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((name, version)) if !version.is_empty() => Self {
                name: name.to_string(),
                version: Some(Version::new(version)),
            },
            _ => Self {
                name: s.to_string(),
                version: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_name() {
        let spec = PackageSpec::parse("foo");
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.version, None);
    }

    #[test]
    fn parses_name_and_version() {
        let spec = PackageSpec::parse("foo=1.0");
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.version, Some(Version::new("1.0")));
    }
}
