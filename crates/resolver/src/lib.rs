#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The Resolver (spec §4.2): deterministic dependency resolution over
//! the package index, producing a reverse-topological install plan.
//!
//! Implemented as an iterative depth-first traversal with an explicit
//! stack rather than recursion, so call depth is bounded and
//! [`ResolverError::DependencyCycle`] is detectable on every input
//! (spec §9 design note "Recursive resolution").

use spm_errors::{Error, ResolverError};
use spm_types::{Index, Requirement, Version};
use std::collections::{HashMap, HashSet};

/// One (package, chosen version) pair in the resolved install plan, in
/// reverse-topological order (dependencies before dependents).
pub type Plan = Vec<(String, Version)>;

struct Frame {
    name: String,
    requirement: Requirement,
    children: Vec<(String, Requirement)>,
    child_idx: usize,
    entered: bool,
}

impl Frame {
    fn new(name: String, requirement: Requirement) -> Self {
        Self {
            name,
            requirement,
            children: Vec::new(),
            child_idx: 0,
            entered: false,
        }
    }
}

/// Resolve `root` under `root_requirement` against `index`.
///
/// # Errors
///
/// - [`Error::PackageNotFound`] if a referenced package name is absent
///   from the index.
/// - [`ResolverError::NoSatisfyingVersion`] if no version of a package
///   satisfies its requirement.
/// - [`ResolverError::VersionConflict`] if two requirements on the same
///   package cannot both be satisfied by one chosen version.
/// - [`ResolverError::DependencyCycle`] if resolution revisits a
///   package that is still being visited.
pub fn resolve(index: &Index, root: &str, root_requirement: &Requirement) -> Result<Plan, Error> {
    let mut chosen: HashMap<String, Version> = HashMap::new();
    let mut visiting: HashSet<String> = HashSet::new();
    let mut output: Plan = Vec::new();
    let mut stack: Vec<Frame> = vec![Frame::new(root.to_string(), root_requirement.clone())];

    while !stack.is_empty() {
        let top = stack.len() - 1;

        if !stack[top].entered {
            let name = stack[top].name.clone();
            let requirement = stack[top].requirement.clone();

            if visiting.contains(&name) {
                return Err(ResolverError::DependencyCycle { package: name }.into());
            }
            visiting.insert(name.clone());

            if let Some(existing) = chosen.get(&name).cloned() {
                if !requirement.matches(&existing) {
                    return Err(ResolverError::VersionConflict {
                        package: name,
                        chosen: existing.to_string(),
                        requirement: requirement.to_string(),
                    }
                    .into());
                }
                // Already chosen and compatible: dependencies were
                // already visited when it was first chosen.
                visiting.remove(&name);
                stack.pop();
                continue;
            }

            let entry = index
                .get(&name)
                .ok_or_else(|| Error::PackageNotFound(name.clone()))?;

            let best = entry
                .satisfying(&requirement)
                .max_by(|a, b| a.version.cmp(&b.version))
                .cloned()
                .ok_or_else(|| ResolverError::NoSatisfyingVersion {
                    package: name.clone(),
                    requirement: requirement.to_string(),
                })?;

            chosen.insert(name.clone(), best.version.clone());
            stack[top].children = best.dependency_requirements();
            stack[top].entered = true;
        }

        let top = stack.len() - 1;
        let child_idx = stack[top].child_idx;
        if child_idx < stack[top].children.len() {
            let (dep_name, dep_req) = stack[top].children[child_idx].clone();
            stack[top].child_idx += 1;
            stack.push(Frame::new(dep_name, dep_req));
        } else {
            let name = stack[top].name.clone();
            visiting.remove(&name);
            let version = chosen
                .get(&name)
                .cloned()
                .expect("version recorded before children are visited");
            output.push((name, version));
            stack.pop();
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::{PackageEntry, VersionRecord};
    use std::collections::BTreeMap;

    fn entry(author: &str, versions: Vec<(&str, BTreeMap<String, String>)>) -> PackageEntry {
        PackageEntry {
            author: author.to_string(),
            license: "MIT".to_string(),
            description: String::new(),
            versions: versions
                .into_iter()
                .map(|(v, depends)| VersionRecord {
                    version: Version::new(v),
                    url: format!("https://example.invalid/{v}.archive"),
                    sha256: None,
                    depends,
                })
                .collect(),
        }
    }

    fn deps(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_no_deps() {
        let mut index = Index::default();
        index
            .packages
            .insert("foo".to_string(), entry("a", vec![("1.0", BTreeMap::new())]));

        let plan = resolve(&index, "foo", &Requirement::Any).unwrap();
        assert_eq!(plan, vec![("foo".to_string(), Version::new("1.0"))]);
    }

    #[test]
    fn picks_maximum_satisfying_version() {
        let mut index = Index::default();
        index.packages.insert(
            "foo".to_string(),
            entry(
                "a",
                vec![
                    ("1.0", BTreeMap::new()),
                    ("1.1", BTreeMap::new()),
                    ("2.0", BTreeMap::new()),
                ],
            ),
        );

        let plan = resolve(&index, "foo", &Requirement::from(">=1.0")).unwrap();
        assert_eq!(plan, vec![("foo".to_string(), Version::new("2.0"))]);
    }

    #[test]
    fn dependencies_come_before_dependents() {
        let mut index = Index::default();
        index.packages.insert(
            "a".to_string(),
            entry("x", vec![("1.0", deps(&[("b", "")]))]),
        );
        index
            .packages
            .insert("b".to_string(), entry("x", vec![("1.0", BTreeMap::new())]));

        let plan = resolve(&index, "a", &Requirement::Any).unwrap();
        assert_eq!(
            plan,
            vec![
                ("b".to_string(), Version::new("1.0")),
                ("a".to_string(), Version::new("1.0")),
            ]
        );
    }

    #[test]
    fn conflicting_requirements_on_shared_dep_fail() {
        // a depends on c>=1.0, b depends on c=1.0, c has 1.0 and 1.1.
        let mut index = Index::default();
        index.packages.insert(
            "a".to_string(),
            entry("x", vec![("1.0", deps(&[("c", ">=1.0")]))]),
        );
        index.packages.insert(
            "b".to_string(),
            entry("x", vec![("1.0", deps(&[("c", "=1.0")]))]),
        );
        index.packages.insert(
            "c".to_string(),
            entry("x", vec![("1.0", BTreeMap::new()), ("1.1", BTreeMap::new())]),
        );

        // Resolve a combined root that depends on both a and b, mirroring
        // `install a b`.
        index.packages.insert(
            "root".to_string(),
            entry("x", vec![("1.0", deps(&[("a", ""), ("b", "")]))]),
        );

        let err = resolve(&index, "root", &Requirement::Any).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolver(ResolverError::VersionConflict { .. })
        ));
    }

    #[test]
    fn cycle_is_detected() {
        let mut index = Index::default();
        index.packages.insert(
            "a".to_string(),
            entry("x", vec![("1.0", deps(&[("b", "")]))]),
        );
        index.packages.insert(
            "b".to_string(),
            entry("x", vec![("1.0", deps(&[("a", "")]))]),
        );

        let err = resolve(&index, "a", &Requirement::Any).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolver(ResolverError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn unknown_package_fails() {
        let index = Index::default();
        let err = resolve(&index, "missing", &Requirement::Any).unwrap_err();
        assert!(matches!(err, Error::PackageNotFound(_)));
    }

    #[test]
    fn no_satisfying_version_fails() {
        let mut index = Index::default();
        index
            .packages
            .insert("foo".to_string(), entry("a", vec![("1.0", BTreeMap::new())]));

        let err = resolve(&index, "foo", &Requirement::from(">=2.0")).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolver(ResolverError::NoSatisfyingVersion { .. })
        ));
    }
}
