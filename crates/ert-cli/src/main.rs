//! CLI `ert-fm`.
//!
//! Códigos de salida: 0 ok, 1 error de serialización o lectura, 2 error de
//! configuración o de jobs, 3 status todavía no disponible, 4 la corrida
//! tiene jobs fallidos.

mod args;

use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use clap::Parser;
use ert_forward::{EnvironmentVarlist, ForwardModel, ForwardModelStatus, StatusLoad, SubstitutionList};
use ertflow::config::{init_dotenv, CONFIG};
use ertflow::errors::CoreError;
use log::info;
use uuid::Uuid;

use args::{parse_job_spec, Cli, Command, ManifestArgs, StatusArgs};

const EXIT_NOT_READY: i32 = 3;
const EXIT_FAILED_JOBS: i32 = 4;

fn main() {
    init_dotenv();
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::Manifest(args) => write_manifest(args),
        Command::Status(args) => show_status(args),
    };
    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("[ert-fm] {e}");
            exit(e.exit_code());
        }
    }
}

fn write_manifest(args: ManifestArgs) -> Result<i32, CoreError> {
    let job_dir = args.job_dir
                      .or_else(|| CONFIG.job_dir.clone())
                      .ok_or_else(|| CoreError::Config("no job directory: pass --job-dir or set ERT_JOB_DIR".into()))?;
    let license_root: Option<PathBuf> = args.license_root.or_else(|| CONFIG.license_root.clone());
    let registry = ertflow::load_registry(&job_dir, license_root.as_deref())?;

    let mut model = ForwardModel::new(&registry);
    for spec in &args.jobs {
        let (name, private) = parse_job_spec(spec).map_err(CoreError::Config)?;
        model.add_job_with_args(&name, private.into_iter().collect())?;
    }

    let run_path = args.run_path.display().to_string();
    let mut global: SubstitutionList = args.defines.into_iter().collect();
    if global.get("<RUNPATH>").is_none() {
        global.add("<RUNPATH>", run_path.as_str());
    }
    let mut varlist: EnvironmentVarlist = args.env.into_iter().collect();
    for (var, path) in args.update_path {
        varlist.update_path(var, path);
    }

    let run_id = args.run_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let data_root = args.data_root.unwrap_or(run_path);
    std::fs::create_dir_all(&args.run_path)?;
    let path = model.write_manifest(&args.run_path, &run_id, &data_root, &global, &varlist)?;
    info!("run {run_id}: {} jobs written to {}", model.len(), path.display());
    println!("{}", path.display());
    Ok(0)
}

fn show_status(args: StatusArgs) -> Result<i32, CoreError> {
    let load = if args.wait {
        ForwardModelStatus::poll(&args.run_path, CONFIG.status_retries, CONFIG.status_interval)?
    } else {
        ForwardModelStatus::poll(&args.run_path, 0, Duration::ZERO)?
    };

    let status = match load {
        StatusLoad::Ready(status) => status,
        StatusLoad::Absent => {
            eprintln!("[ert-fm] no status file in {}", args.run_path.display());
            return Ok(EXIT_NOT_READY);
        }
        StatusLoad::NotReady => {
            eprintln!("[ert-fm] status file in {} is still being written", args.run_path.display());
            return Ok(EXIT_NOT_READY);
        }
    };

    for job in &status.jobs {
        let error = job.error.as_deref().map(|e| format!(" ({e})")).unwrap_or_default();
        println!("{:<24} {}{error}", job.name, job.status);
    }
    if status.failed_jobs().next().is_some() {
        return Ok(EXIT_FAILED_JOBS);
    }
    Ok(0)
}
