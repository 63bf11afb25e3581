//! Solve command

use crate::SolveArgs;
use anyhow::{Context, Result};
use depsolve_core::{ResolveError, ResolveRequest, StderrReporter, resolve};
use depsolve_schema::{JobAction, JobFlags, RemoveRecord, Resolution};
use serde::Serialize;
use serde_json::value::RawValue;
use std::process::ExitCode;

#[derive(Serialize)]
struct Output<'a> {
    install: Vec<InstallOutput<'a>>,
    remove: &'a [RemoveRecord],
}

#[derive(Serialize)]
struct InstallOutput<'a> {
    repo: &'a str,
    file_name: &'a str,
    metadata: &'a RawValue,
}

/// Merge the request file (if any) with command-line arguments.
pub fn build_request(args: SolveArgs, quiet: bool) -> Result<ResolveRequest> {
    let mut request = match &args.config {
        Some(path) => ResolveRequest::load(path)?,
        None => ResolveRequest::default(),
    };

    request.repositories.extend(args.repos);
    if args.installed.is_some() {
        request.installed = args.installed;
    }
    if args.update {
        request.job_flags = request.job_flags.with_action(JobAction::Update);
    }
    if args.weak {
        request.job_flags = request.job_flags | JobFlags::WEAK;
    }
    request.options.extend(args.options);
    request.jobs.extend(args.jobs);
    request.quiet |= quiet;

    Ok(request)
}

/// Render a resolution as pretty JSON, embedding metadata verbatim.
pub fn render(resolution: &Resolution) -> Result<String> {
    let install = resolution
        .installs
        .iter()
        .map(|record| {
            let metadata: &RawValue = serde_json::from_str(&record.metadata)
                .with_context(|| format!("Metadata of '{}' is not valid JSON", record.file_name))?;
            Ok(InstallOutput {
                repo: &record.repo,
                file_name: &record.file_name,
                metadata,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let output = Output {
        install,
        remove: &resolution.removes,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Run a resolve and print the outcome.
///
/// An unsatisfiable request is not an error of the tool: its problems go to
/// stderr and the exit code is 1.
pub fn solve(args: SolveArgs, quiet: bool) -> Result<ExitCode> {
    let request = build_request(args, quiet)?;
    tracing::debug!(
        "Resolving {} job(s) against {} repositories",
        request.jobs.len(),
        request.repositories.len()
    );

    match resolve(&request, &StderrReporter) {
        Ok(resolution) => {
            println!("{}", render(&resolution)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ResolveError::Unsatisfiable { problems }) => {
            // The reporter is silenced in quiet mode; problems are still owed.
            if request.quiet {
                for problem in &problems {
                    eprintln!("Problem: {problem}");
                }
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
