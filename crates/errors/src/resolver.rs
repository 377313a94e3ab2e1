use thiserror::Error;

/// Errors from dependency resolution (spec §4.2).
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no version of {package} satisfies {requirement}")]
    NoSatisfyingVersion { package: String, requirement: String },

    #[error("version conflict on {package}: already chose {chosen}, but {requirement} is also required")]
    VersionConflict {
        package: String,
        chosen: String,
        requirement: String,
    },

    #[error("dependency cycle detected at {package}")]
    DependencyCycle { package: String },
}
