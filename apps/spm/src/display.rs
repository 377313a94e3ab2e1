//! Renders an operation's final result, either as plain text or (with
//! `--json`) as serialized JSON (spec §2.4).

use serde::Serialize;
use spm_ops::{
    InstallReport, ListEntry, OutdatedEntry, PackageInfoReport, RemoveReport, SearchEntry,
    UpdateReport, UpgradeReport,
};
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Install(InstallReport),
    Remove(RemoveReport),
    Update(UpdateReport),
    Upgrade(UpgradeReport),
    Search(Vec<SearchEntry>),
    Info(PackageInfoReport),
    List(Vec<ListEntry>),
    Outdated(Vec<OutdatedEntry>),
    Deps(BTreeMap<String, String>),
    Message(String),
}

pub struct OutputRenderer {
    json: bool,
}

impl OutputRenderer {
    #[must_use]
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, output: &CommandOutput) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(output)?);
            return Ok(());
        }

        match output {
            CommandOutput::Install(report) => {
                for outcome in &report.installed {
                    if outcome.skipped {
                        println!("{}={} already installed", outcome.package, outcome.version);
                    } else {
                        println!("installed {}={}", outcome.package, outcome.version);
                    }
                }
            }
            CommandOutput::Remove(report) => {
                println!("removed {}: {}", report.package, report.removed_versions.join(", "));
            }
            CommandOutput::Update(report) => {
                for (package, from, to) in &report.updated {
                    println!("updated {package}: {from} -> {to}");
                }
                println!("{} package(s) unchanged", report.unchanged);
            }
            CommandOutput::Upgrade(report) => {
                if report.upgraded {
                    println!("upgraded engine {} -> {}", report.from, report.to);
                } else {
                    println!("engine already at {}", report.from);
                }
            }
            CommandOutput::Search(entries) => {
                for entry in entries {
                    println!("{}  {}", entry.package, entry.description);
                }
            }
            CommandOutput::Info(info) => {
                println!("{}", info.package);
                println!("  author:      {}", info.author);
                println!("  license:     {}", info.license);
                println!("  description: {}", info.description);
                println!("  available:   {}", info.available_versions.join(", "));
                println!("  installed:   {}", info.installed_versions.join(", "));
                if let Some(current) = &info.current_version {
                    println!("  current:     {current}");
                }
            }
            CommandOutput::List(entries) => {
                for entry in entries {
                    let marker = if entry.current { "*" } else { " " };
                    let pin = if entry.pinned { " (pinned)" } else { "" };
                    println!("{marker} {}={}{pin}", entry.package, entry.version);
                }
            }
            CommandOutput::Outdated(entries) => {
                for entry in entries {
                    println!("{}: {} -> {}", entry.package, entry.current, entry.latest);
                }
            }
            CommandOutput::Deps(deps) => {
                for (name, requirement) in deps {
                    println!("{name} {requirement}");
                }
            }
            CommandOutput::Message(message) => println!("{message}"),
        }
        Ok(())
    }
}
