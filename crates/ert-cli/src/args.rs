use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ert-fm - arma el manifest del forward model y consulta su status
#[derive(Parser, Debug)]
#[command(name = "ert-fm")]
#[command(version)]
#[command(about = "Forward model manifest writer and status reader", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write jobs.json for a run
    Manifest(ManifestArgs),
    /// Read status.json of a run
    Status(StatusArgs),
}

#[derive(clap::Args, Debug)]
pub struct ManifestArgs {
    /// Directory with job configuration files (default: ERT_JOB_DIR)
    #[arg(long = "job-dir")]
    pub job_dir: Option<PathBuf>,

    /// Root for per-job license paths (default: ERT_LICENSE_ROOT)
    #[arg(long = "license-root")]
    pub license_root: Option<PathBuf>,

    /// Run directory where jobs.json is written
    #[arg(long = "run-path")]
    pub run_path: PathBuf,

    /// Run identifier (default: random uuid)
    #[arg(long = "run-id")]
    pub run_id: Option<String>,

    /// Data root recorded in the manifest (default: the run path)
    #[arg(long = "data-root")]
    pub data_root: Option<String>,

    /// Job to append, in order. Private arguments: NAME(<KEY>=value,...)
    #[arg(long = "job", required = true)]
    pub jobs: Vec<String>,

    /// Global substitution, e.g. --define "<ITER>=0"
    #[arg(long = "define", value_parser = parse_key_value)]
    pub defines: Vec<(String, String)>,

    /// Global environment variable
    #[arg(long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Path entry prepended to a variable by the runner
    #[arg(long = "update-path", value_parser = parse_key_value)]
    pub update_path: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Run directory containing status.json
    #[arg(long = "run-path")]
    pub run_path: PathBuf,

    /// Keep polling until the status file is readable
    #[arg(long = "wait")]
    pub wait: bool,
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Separa `NAME(<A>=1,<B>=x)` en nombre y argumentos privados.
pub fn parse_job_spec(raw: &str) -> Result<(String, Vec<(String, String)>), String> {
    let Some((name, rest)) = raw.split_once('(') else {
        return Ok((raw.trim().to_string(), Vec::new()));
    };
    let body = rest.strip_suffix(')')
                   .ok_or_else(|| format!("unterminated argument list in '{raw}'"))?;
    let args = body.split(',')
                   .map(str::trim)
                   .filter(|a| !a.is_empty())
                   .map(parse_key_value)
                   .collect::<Result<Vec<_>, _>>()?;
    Ok((name.trim().to_string(), args))
}
