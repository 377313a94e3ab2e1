#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Lifecycle Controller (spec §2): orchestrates the lock manager, index
//! store, resolver, store, state journal, manifest, and sandbox crates
//! into the operations the CLI exposes one-to-one.

mod context;
mod install;
mod maintenance;
mod query;
mod remove;
mod run;
mod switch;
mod types;
mod update;
mod upgrade;
mod verify;

pub use context::OpsCtx;
pub use install::{install, install_plan, load_index, resolve_plan};
pub use maintenance::clean;
pub use query::{deps, info, list, refresh, search};
pub use remove::{remove, remove_versions, target_versions};
pub use run::run;
pub use switch::switch;
pub use types::{
    InstallOutcome, InstallReport, ListEntry, OutdatedEntry, PackageInfoReport, RemoveReport,
    SearchEntry, UpdateReport,
};
pub use update::{outdated, pin, unpin, update};
pub use upgrade::{upgrade, UpgradeReport};
pub use verify::verify;
