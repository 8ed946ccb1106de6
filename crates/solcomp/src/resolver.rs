//! Version selection

use crate::catalog::VersionCatalog;
use crate::constraint::VersionConstraint;
use crate::error::{SolcError, SolcResult};
use semver::Version;

/// Select the highest catalog version satisfying `constraint`.
pub fn resolve(catalog: &VersionCatalog, constraint: &VersionConstraint) -> SolcResult<Version> {
    catalog
        .iter()
        .filter(|version| constraint.matches(version))
        .max()
        .cloned()
        .ok_or_else(|| SolcError::NoSatisfyingVersion {
            constraint: constraint.to_string(),
        })
}

/// Whether the flag set for `version` requests metadata and method hashes.
/// Those outputs exist for releases strictly newer than 0.4.6.
pub fn supports_metadata_output(version: &Version) -> bool {
    *version > Version::new(0, 4, 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog(ids: &[&str]) -> VersionCatalog {
        VersionCatalog::from_identifiers(ids)
    }

    #[test]
    fn test_caret_selects_newest_patch() {
        let constraint = VersionConstraint::parse("^0.8.0").unwrap();
        let version = resolve(&catalog(&["0.8.21", "0.8.0", "0.7.6"]), &constraint).unwrap();
        assert_eq!(version, Version::new(0, 8, 21));
    }

    #[test]
    fn test_bounded_range_selects_newest_in_range() {
        let constraint = VersionConstraint::parse(">=0.4.6 <0.5.0").unwrap();
        let version = resolve(&catalog(&["0.4.26", "0.4.6", "0.4.5"]), &constraint).unwrap();
        assert_eq!(version, Version::new(0, 4, 26));
    }

    #[test]
    fn test_no_satisfying_version() {
        let constraint = VersionConstraint::parse("^0.9.0").unwrap();
        let err = resolve(&catalog(&["0.8.21", "0.8.0"]), &constraint).unwrap_err();
        match err {
            SolcError::NoSatisfyingVersion { constraint } => assert_eq!(constraint, "^0.9.0"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_catalog_never_resolves() {
        let constraint = VersionConstraint::parse("*").unwrap();
        assert!(resolve(&VersionCatalog::default(), &constraint).is_err());
    }

    #[test]
    fn test_metadata_threshold() {
        assert!(!supports_metadata_output(&Version::new(0, 4, 5)));
        assert!(!supports_metadata_output(&Version::new(0, 4, 6)));
        assert!(supports_metadata_output(&Version::new(0, 4, 7)));
        assert!(supports_metadata_output(&Version::new(0, 8, 21)));
    }

    fn version_strategy() -> impl Strategy<Value = Version> {
        (0u64..2, 0u64..10, 0u64..30).prop_map(|(major, minor, patch)| Version::new(major, minor, patch))
    }

    proptest! {
        #[test]
        fn property_resolve_returns_maximum_satisfying(
            versions in proptest::collection::vec(version_strategy(), 0..40),
            lower in version_strategy(),
        ) {
            let catalog = VersionCatalog::from_versions(versions);
            let constraint = VersionConstraint::parse(&format!(">={lower}")).unwrap();
            let expected = catalog.iter().filter(|v| **v >= lower).max().cloned();

            match resolve(&catalog, &constraint) {
                Ok(version) => {
                    prop_assert_eq!(Some(version.clone()), expected);
                    prop_assert!(catalog.iter().all(|v| !constraint.matches(v) || *v <= version));
                }
                Err(SolcError::NoSatisfyingVersion { .. }) => prop_assert!(expected.is_none()),
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
