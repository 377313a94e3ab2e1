#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Parses and serializes the per-artifact package manifest (spec §3, §6).
//!
//! The manifest is a small, hand-rolled, line-oriented text format with
//! four sections (`[metadata]`, `[description]`, `[specs]`, `[sandbox]`,
//! `[install]`) and two kinds of key lines: a *primary key line* — a
//! bare word that opens a list or map (`binaries`, `depends`,
//! `extra_paths`, `commands`, `long`) — and *nested key/value lines*,
//! indented underneath it, which are either `key = value` pairs (for
//! `depends`) or bare values (for everything else). A plain
//! `key = value` line outside of any nested block assigns a scalar
//! field directly. This is spec §6's "primary key line" / "nested
//! key/value line" addressing made literal.

use spm_errors::Error;
use spm_types::{Manifest, SandboxProfile};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Default)]
struct Builder {
    name: String,
    version: String,
    authors: String,
    license: String,
    binaries: Vec<String>,
    summary: String,
    long: Vec<String>,
    depends: BTreeMap<String, String>,
    network: bool,
    graphical: bool,
    device: bool,
    extra_paths: Vec<String>,
    commands: Vec<String>,
}

/// Parse a manifest from its textual form.
///
/// # Errors
///
/// Returns [`Error::Manifest`] if a required field is missing or a line
/// cannot be classified.
pub fn parse_str(text: &str) -> Result<Manifest, Error> {
    let mut builder = Builder::default();
    let mut section: Option<&str> = None;
    let mut primary_key: Option<String> = None;

    for raw_line in text.lines() {
        if raw_line.trim().is_empty() || raw_line.trim_start().starts_with('#') {
            continue;
        }

        let indented = raw_line.starts_with(' ') || raw_line.starts_with('\t');
        let line = raw_line.trim();

        if indented {
            let key = primary_key.as_deref().ok_or_else(|| {
                Error::Manifest(format!("nested line with no primary key open: {line}"))
            })?;
            apply_nested(&mut builder, section, key, line)?;
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section = Some(match name {
                "metadata" => "metadata",
                "description" => "description",
                "specs" => "specs",
                "sandbox" => "sandbox",
                "install" => "install",
                other => return Err(Error::Manifest(format!("unknown section [{other}]"))),
            });
            primary_key = None;
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            apply_scalar(&mut builder, section, key.trim(), value.trim())?;
            primary_key = None;
        } else {
            primary_key = Some(line.to_string());
        }
    }

    if builder.name.is_empty() || builder.version.is_empty() {
        return Err(Error::Manifest(
            "manifest missing required name/version".to_string(),
        ));
    }

    Ok(Manifest {
        name: builder.name,
        version: builder.version,
        authors: builder.authors,
        license: builder.license,
        summary: builder.summary,
        long_description: builder.long.join("\n"),
        depends: builder.depends,
        binaries: builder.binaries,
        sandbox: SandboxProfile {
            network: builder.network,
            graphical: builder.graphical,
            device: builder.device,
            extra_paths: builder.extra_paths,
        },
        install: builder.commands,
    })
}

fn apply_scalar(
    builder: &mut Builder,
    section: Option<&str>,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    match (section, key) {
        (Some("metadata"), "name") => builder.name = value.to_string(),
        (Some("metadata"), "version") => builder.version = value.to_string(),
        (Some("metadata"), "authors") => builder.authors = value.to_string(),
        (Some("metadata"), "license") => builder.license = value.to_string(),
        (Some("description"), "summary") => builder.summary = value.to_string(),
        (Some("sandbox"), "network") => builder.network = parse_bool(value)?,
        (Some("sandbox"), "graphical") => builder.graphical = parse_bool(value)?,
        (Some("sandbox"), "device") => builder.device = parse_bool(value)?,
        _ => {
            return Err(Error::Manifest(format!(
                "unexpected key `{key}` in section {section:?}"
            )))
        }
    }
    Ok(())
}

fn apply_nested(
    builder: &mut Builder,
    section: Option<&str>,
    primary_key: &str,
    line: &str,
) -> Result<(), Error> {
    match (section, primary_key) {
        (Some("metadata"), "binaries") => builder.binaries.push(line.to_string()),
        (Some("description"), "long") => builder.long.push(line.to_string()),
        (Some("specs"), "depends") => {
            let (name, req) = line
                .split_once('=')
                .ok_or_else(|| Error::Manifest(format!("malformed depends line: {line}")))?;
            builder
                .depends
                .insert(name.trim().to_string(), req.trim().to_string());
        }
        (Some("sandbox"), "extra_paths") => builder.extra_paths.push(line.to_string()),
        (Some("install"), "commands") => builder.commands.push(line.to_string()),
        _ => {
            return Err(Error::Manifest(format!(
                "unexpected nested key `{primary_key}` in section {section:?}"
            )))
        }
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, Error> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::Manifest(format!("expected true/false, got `{other}`"))),
    }
}

/// Serialize a manifest back to its textual form (used by `spm-builder`).
#[must_use]
pub fn write_string(manifest: &Manifest) -> String {
    let mut out = String::new();
    out.push_str("[metadata]\n");
    out.push_str(&format!("name = {}\n", manifest.name));
    out.push_str(&format!("version = {}\n", manifest.version));
    out.push_str(&format!("authors = {}\n", manifest.authors));
    out.push_str(&format!("license = {}\n", manifest.license));
    if !manifest.binaries.is_empty() {
        out.push_str("binaries\n");
        for bin in &manifest.binaries {
            out.push_str(&format!("  {bin}\n"));
        }
    }

    out.push_str("\n[description]\n");
    out.push_str(&format!("summary = {}\n", manifest.summary));
    if !manifest.long_description.is_empty() {
        out.push_str("long\n");
        for line in manifest.long_description.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }

    out.push_str("\n[specs]\n");
    if !manifest.depends.is_empty() {
        out.push_str("depends\n");
        for (name, req) in &manifest.depends {
            out.push_str(&format!("  {name} = {req}\n"));
        }
    }

    out.push_str("\n[sandbox]\n");
    out.push_str(&format!("network = {}\n", manifest.sandbox.network));
    out.push_str(&format!("graphical = {}\n", manifest.sandbox.graphical));
    out.push_str(&format!("device = {}\n", manifest.sandbox.device));
    if !manifest.sandbox.extra_paths.is_empty() {
        out.push_str("extra_paths\n");
        for path in &manifest.sandbox.extra_paths {
            out.push_str(&format!("  {path}\n"));
        }
    }

    out.push_str("\n[install]\n");
    if !manifest.install.is_empty() {
        out.push_str("commands\n");
        for command in &manifest.install {
            out.push_str(&format!("  {command}\n"));
        }
    }

    out
}

/// Load and parse a manifest file from disk.
///
/// # Errors
///
/// Returns [`Error::Manifest`] on a missing or malformed file.
pub async fn load_file(path: &Path) -> Result<Manifest, Error> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| Error::Manifest(format!("manifest not found at {}", path.display())))?;
    parse_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[metadata]
name = foo
version = 1.0
authors = Jane Doe
license = MIT
binaries
  foo
  foo-cli

[description]
summary = A tool for foo
long
  First paragraph.
  Second paragraph.

[specs]
depends
  bar = >=1.0
  baz = =2.0

[sandbox]
network = true
graphical = false
device = false
extra_paths
  /dev/foo

[install]
commands
  ./configure
  make
  make install
"#;

    #[test]
    fn parses_full_sample() {
        let manifest = parse_str(SAMPLE).unwrap();
        assert_eq!(manifest.name, "foo");
        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.binaries, vec!["foo", "foo-cli"]);
        assert_eq!(manifest.summary, "A tool for foo");
        assert_eq!(manifest.long_description, "First paragraph.\nSecond paragraph.");
        assert_eq!(manifest.depends.get("bar").unwrap(), ">=1.0");
        assert!(manifest.sandbox.network);
        assert!(!manifest.sandbox.graphical);
        assert_eq!(manifest.sandbox.extra_paths, vec!["/dev/foo"]);
        assert_eq!(manifest.install, vec!["./configure", "make", "make install"]);
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = parse_str("[metadata]\nversion = 1.0\n").unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn round_trips_through_writer() {
        let manifest = parse_str(SAMPLE).unwrap();
        let text = write_string(&manifest);
        let reparsed = parse_str(&text).unwrap();
        assert_eq!(reparsed.name, manifest.name);
        assert_eq!(reparsed.depends, manifest.depends);
        assert_eq!(reparsed.install, manifest.install);
    }
}
