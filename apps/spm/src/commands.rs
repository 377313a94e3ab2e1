//! Maps parsed [`Commands`] onto `spm-ops` calls and a [`CommandOutput`].

use crate::cli::Commands;
use crate::display::CommandOutput;
use crate::error::CliError;
use spm_ops::OpsCtx;
use spm_types::PackageSpec;

/// The outcome of dispatching a command: either a report to render, or
/// (for `run`) a process exit status to propagate directly.
pub enum Dispatch {
    Report(CommandOutput),
    ExitStatus(std::process::ExitStatus),
}

/// # Errors
///
/// Propagates whatever the underlying `spm-ops` call returns, plus
/// [`CliError::InvalidArguments`] for malformed CLI input that the
/// engine itself does not validate (e.g. an empty spec list).
pub async fn dispatch(command: Commands, ctx: &OpsCtx) -> Result<Dispatch, CliError> {
    let output = match command {
        Commands::Refresh => {
            spm_ops::refresh(ctx).await?;
            CommandOutput::Message("index refreshed".to_string())
        }

        Commands::Install { specs } => {
            if specs.is_empty() {
                return Err(CliError::InvalidArguments(
                    "install requires at least one package spec".to_string(),
                ));
            }
            let specs: Vec<PackageSpec> = specs.iter().map(|s| PackageSpec::parse(s)).collect();
            CommandOutput::Install(spm_ops::install(ctx, &specs).await?)
        }

        Commands::Remove { spec, yes: _ } => {
            let spec = PackageSpec::parse(&spec);
            CommandOutput::Remove(spm_ops::remove(ctx, &spec).await?)
        }

        Commands::Update => CommandOutput::Update(spm_ops::update(ctx).await?),

        Commands::Switch { package, version } => {
            spm_ops::switch(ctx, &package, &version).await?;
            CommandOutput::Message(format!("switched {package} to {version}"))
        }

        Commands::Upgrade => CommandOutput::Upgrade(spm_ops::upgrade(ctx).await?),

        Commands::Run { spec, binary, args } => {
            let spec = PackageSpec::parse(&spec);
            let status = spm_ops::run(ctx, &spec, &binary, &args).await?;
            return Ok(Dispatch::ExitStatus(status));
        }

        Commands::Build {
            name,
            source_dir,
            output_dir,
        } => {
            let source_dir = source_dir.unwrap_or_else(|| std::path::PathBuf::from("."));
            let path = spm_builder::build(&name, &source_dir, output_dir.as_deref()).await?;
            CommandOutput::Message(format!("built {}", path.display()))
        }

        Commands::Search { query } => CommandOutput::Search(spm_ops::search(ctx, &query).await?),

        Commands::Info { package } => CommandOutput::Info(spm_ops::info(ctx, &package).await?),

        Commands::List => CommandOutput::List(spm_ops::list(ctx).await?),

        Commands::Clean => {
            spm_ops::clean(ctx).await?;
            CommandOutput::Message("cache cleaned".to_string())
        }

        Commands::Pin { package, version } => {
            spm_ops::pin(ctx, &package, &version).await?;
            CommandOutput::Message(format!("pinned {package}={version}"))
        }

        Commands::Unpin { package } => {
            spm_ops::unpin(ctx, &package).await?;
            CommandOutput::Message(format!("unpinned {package}"))
        }

        Commands::Outdated => CommandOutput::Outdated(spm_ops::outdated(ctx).await?),

        Commands::Verify { package } => {
            spm_ops::verify(ctx, &package).await?;
            CommandOutput::Message(format!("{package} verified"))
        }

        Commands::Deps { spec } => {
            let spec = PackageSpec::parse(&spec);
            CommandOutput::Deps(spm_ops::deps(ctx, &spec).await?)
        }
    };

    Ok(Dispatch::Report(output))
}

/// Whether `command` mutates shared state and is therefore worth
/// covering with a spinner while it runs (spec §5: optional visual
/// spinners; readers finish near-instantly and don't need one).
#[must_use]
pub fn is_long_running(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Install { .. }
            | Commands::Remove { .. }
            | Commands::Update
            | Commands::Upgrade
            | Commands::Build { .. }
            | Commands::Refresh
    )
}
