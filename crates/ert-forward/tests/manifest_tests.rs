//! Serialización del forward model a `jobs.json`.
//!
//! Los jobs de prueba se escriben como archivos de configuración reales en un
//! directorio temporal, junto a sus ejecutables, para recorrer el mismo
//! camino de carga que una corrida.

use std::fs;
use std::path::Path;

use ert_forward::{EnvironmentVarlist, ForwardModel, Manifest, SerializationError, SubstitutionList, JOBS_FILE};
use ert_jobs::{JobDefinition, JobRegistry};
use serde_json::{json, Value};

struct JobFixture {
    name: &'static str,
    executable: &'static str,
    body: &'static str,
    license_root: &'static str,
}

const JOBS: [JobFixture; 4] = [JobFixture { name: "PERLIN",
                                            executable: "perlin.py",
                                            body: "MAX_RUNNING 30\nSTDIN input4thewin\nSTDOUT perlin.stdout\n\
                                                   STDERR perlin.stderr\nEXECUTABLE perlin.py\n\
                                                   TARGET_FILE my_target_file\nERROR_FILE error_file\n\
                                                   START_FILE some_start_file\nARGLIST -speed hyper\n\
                                                   ENV TARGET flatland\nMAX_RUNNING_MINUTES 12\n",
                                            license_root: "this/is/my/license" },
                               JobFixture { name: "AGGREGATOR",
                                            executable: "aggregator.py",
                                            body: "MAX_RUNNING 14\nSTDIN illgiveyousome\n\
                                                   STDOUT aggregator.stdout\nSTDERR aggregator.stderr\n\
                                                   EXECUTABLE aggregator.py\nTARGET_FILE target\n\
                                                   ERROR_FILE None\nSTART_FILE eple\nARGLIST -o\n\
                                                   ENV STATE awesome\nMAX_RUNNING_MINUTES 1\n",
                                            license_root: "I/will/pay/ya/tomorrow" },
                               JobFixture { name: "PI",
                                            executable: "pi.py",
                                            body: "MAX_RUNNING 30\nSTDIN input4thewin\nSTDOUT pi.stdout\n\
                                                   STDERR pi.stderr\nEXECUTABLE pi.py\n\
                                                   TARGET_FILE my_target_file\nERROR_FILE error_file\n\
                                                   START_FILE some_start_file\nARGLIST -p 8\n\
                                                   ENV LOCATION earth\nMAX_RUNNING_MINUTES 12\n",
                                            license_root: "license" },
                               JobFixture { name: "OPTIMUS",
                                            executable: "optimus.py",
                                            body: "MAX_RUNNING 14\nSTDIN illgiveyousome\nSTDOUT optimus.stdout\n\
                                                   STDERR optimus.stderr\nEXECUTABLE optimus.py\n\
                                                   TARGET_FILE target\nERROR_FILE None\nSTART_FILE eple\n\
                                                   ARGLIST -help\nENV PATH /ubertools/4.1\n\
                                                   MAX_RUNNING_MINUTES 1\n",
                                            license_root: "license" }];

fn load_fixture(dir: &Path, fixture: &JobFixture) -> JobDefinition {
    fs::write(dir.join(fixture.executable), "").unwrap();
    let cfg = dir.join(fixture.name);
    fs::write(&cfg, fixture.body).unwrap();
    JobDefinition::from_file(&cfg, None, Some(Path::new(fixture.license_root))).expect("load fixture")
}

fn fixture_registry(dir: &Path) -> JobRegistry {
    let mut registry = JobRegistry::new();
    for fixture in &JOBS {
        registry.register(load_fixture(dir, fixture)).unwrap();
    }
    registry
}

fn read_manifest(run_path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(run_path.join(JOBS_FILE)).unwrap()).unwrap()
}

fn write(model: &ForwardModel<'_>, run_path: &Path, run_id: &str, varlist: &EnvironmentVarlist) -> Value {
    model.write_manifest(run_path, run_id, "data_root", &SubstitutionList::new(), varlist)
         .expect("write manifest");
    read_manifest(run_path)
}

#[test]
fn no_jobs() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = fixture_registry(tmp.path());
    let model = ForwardModel::new(&registry);

    let manifest = write(&model, tmp.path(), "test_no_jobs_id", &EnvironmentVarlist::new());

    assert_eq!(manifest["run_id"], "test_no_jobs_id");
    assert_eq!(manifest["jobList"], json!([]));
    assert_eq!(manifest["DATA_ROOT"], "data_root");
    assert!(manifest.get("global_environment").is_some());
    assert!(manifest.get("global_update_path").is_some());
}

#[test]
fn one_job_at_a_time() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = fixture_registry(tmp.path());

    for fixture in &JOBS {
        let mut model = ForwardModel::new(&registry);
        model.add_job(fixture.name).unwrap();
        let manifest = write(&model, tmp.path(), "test_one_job", &EnvironmentVarlist::new());

        let jobs = manifest["jobList"].as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        let lower = fixture.name.to_lowercase();
        assert_eq!(job["name"], fixture.name);
        assert!(job["executable"].as_str().unwrap().ends_with(fixture.executable));
        assert_eq!(job["stdout"], format!("{lower}.stdout"));
        assert_eq!(job["stderr"], format!("{lower}.stderr"));
        assert_eq!(job["license_path"], format!("{}/{}", fixture.license_root, fixture.name));
    }
}

#[test]
fn all_jobs_keep_every_field() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = fixture_registry(tmp.path());
    let mut model = ForwardModel::new(&registry);
    for fixture in &JOBS {
        model.add_job(fixture.name).unwrap();
    }

    let manifest = write(&model, tmp.path(), "run_all", &EnvironmentVarlist::new());
    let perlin = &manifest["jobList"][0];

    assert_eq!(manifest["jobList"].as_array().unwrap().len(), 4);
    assert_eq!(perlin["target_file"], "my_target_file");
    assert_eq!(perlin["error_file"], "error_file");
    assert_eq!(perlin["start_file"], "some_start_file");
    assert_eq!(perlin["stdin"], "input4thewin");
    assert_eq!(perlin["max_running_minutes"], 12);
    assert_eq!(perlin["max_running"], 30);
    assert_eq!(perlin["argList"], json!(["-speed", "hyper"]));
    assert_eq!(perlin["environment"], json!({"TARGET": "flatland"}));
    assert!(perlin.get("min_arg").is_none());
    assert!(perlin.get("arg_types").is_none());
    assert_eq!(manifest["jobList"][3]["environment"], json!({"PATH": "/ubertools/4.1"}));
    assert_eq!(manifest["jobList"][1]["error_file"], "None");
}

#[test]
fn unset_optional_fields_serialize_as_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = JobRegistry::new();
    registry.register(JobDefinition::parse("EXECUTABLE /bin/echo\n", None, None).unwrap()).unwrap();
    let mut model = ForwardModel::new(&registry);
    model.add_job("default_job_name").unwrap();

    let manifest = write(&model, tmp.path(), "nulls", &EnvironmentVarlist::new());
    let job = &manifest["jobList"][0];

    assert_eq!(job["name"], "default_job_name");
    assert_eq!(job["stdout"], "default_job_name.stdout");
    assert_eq!(job["stderr"], "default_job_name.stderr");
    for key in ["target_file", "error_file", "start_file", "stdin", "license_path", "environment"] {
        assert_eq!(job[key], Value::Null, "{key} should be null");
    }
    assert_eq!(job["max_running_minutes"], 0);
    assert_eq!(job["max_running"], 0);
    assert_eq!(job["argList"], json!([]));
}

#[test]
fn repeated_job_gets_indexed_streams() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = JobRegistry::new();
    registry.register(JobDefinition::parse("EXECUTABLE /bin/echo\n", Some("ECHO"), None).unwrap()).unwrap();
    registry.register(JobDefinition::parse("EXECUTABLE /bin/true\n", Some("TRUE"), None).unwrap()).unwrap();
    let mut model = ForwardModel::new(&registry);
    model.add_job("ECHO").unwrap();
    model.add_job("TRUE").unwrap();
    model.add_job("ECHO").unwrap();

    let manifest = write(&model, tmp.path(), "repeat", &EnvironmentVarlist::new());
    let jobs = &manifest["jobList"];

    assert_eq!(jobs[0]["stdout"], "ECHO.stdout.0");
    assert_eq!(jobs[0]["stderr"], "ECHO.stderr.0");
    assert_eq!(jobs[1]["stdout"], "TRUE.stdout");
    assert_eq!(jobs[2]["stdout"], "ECHO.stdout.1");
    assert_eq!(jobs[2]["stderr"], "ECHO.stderr.1");
}

#[test]
fn arg_types_are_transferred() {
    let tmp = tempfile::tempdir().unwrap();
    let body = "EXECUTABLE ls\nMIN_ARG 2\nMAX_ARG 6\nARG_TYPE 0 INT\nARG_TYPE 1 FLOAT\nARG_TYPE 2 STRING\n\
                ARG_TYPE 3 BOOL\nARG_TYPE 4 RUNTIME_FILE\nARG_TYPE 5 RUNTIME_INT\nENV KEY1 VALUE2\nENV KEY2 VALUE2\n";
    let cfg = tmp.path().join("FWD_MODEL");
    fs::write(&cfg, body).unwrap();
    let mut registry = JobRegistry::new();
    registry.register(JobDefinition::from_file(&cfg, None, None).unwrap()).unwrap();
    let mut model = ForwardModel::new(&registry);
    model.add_job("FWD_MODEL").unwrap();

    let manifest = write(&model, tmp.path(), "test_no_jobs_id", &EnvironmentVarlist::new());
    let job = &manifest["jobList"][0];

    assert_eq!(job["min_arg"], 2);
    assert_eq!(job["max_arg"], 6);
    assert_eq!(job["arg_types"], json!(["INT", "FLOAT", "STRING", "BOOL", "RUNTIME_FILE", "RUNTIME_INT"]));
    assert_eq!(job["environment"], json!({"KEY1": "VALUE2", "KEY2": "VALUE2"}));
}

#[test]
fn global_environment_is_expanded() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = JobRegistry::new();
    let model = ForwardModel::new(&registry);
    let varlist: EnvironmentVarlist =
        [("FIRST", "TheFirstValue"), ("SECOND", "TheSecondValue"), ("THIRD", "$FIRST:$SECOND")].into_iter().collect();

    let manifest = write(&model, tmp.path(), "test_no_jobs_id", &varlist);
    let env = &manifest["global_environment"];

    assert_eq!(env["FIRST"], "TheFirstValue");
    assert_eq!(env["SECOND"], "TheSecondValue");
    assert_eq!(env["THIRD"], "TheFirstValue:TheSecondValue");
    assert_eq!(manifest["global_update_path"], json!({}));
}

#[test]
fn update_path_section_carries_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = JobRegistry::new();
    let model = ForwardModel::new(&registry);
    let mut varlist = EnvironmentVarlist::new();
    varlist.update_path("PATH", "/opt/flow/bin");

    let manifest = write(&model, tmp.path(), "update", &varlist);
    assert_eq!(manifest["global_update_path"], json!({"PATH": "/opt/flow/bin"}));
}

#[test]
fn substitutions_follow_precedence() {
    let tmp = tempfile::tempdir().unwrap();
    let body = "EXECUTABLE <BIN>/sim\nDEFAULT <CASE> base\nARGLIST <CASE> <ITER> <RUNPATH>\n\
                TARGET_FILE <RUNPATH>/done\nENV OUT <RUNPATH>/out\n";
    let mut registry = JobRegistry::new();
    registry.register(JobDefinition::parse(body, Some("SIM"), None).unwrap()).unwrap();

    let mut model = ForwardModel::new(&registry);
    model.add_job("SIM").unwrap();
    model.add_job_with_args("SIM", [("<CASE>", "pred"), ("<ITER>", "9")].into_iter().collect())
         .unwrap();

    let global: SubstitutionList =
        [("<BIN>", "/opt"), ("<ITER>", "0"), ("<RUNPATH>", "/scratch/r0"), ("<CASE>", "global")].into_iter()
                                                                                                 .collect();
    let manifest = model.manifest("subst", "data_root", &global, &EnvironmentVarlist::new()).unwrap();

    let first = &manifest.job_list[0];
    assert_eq!(first.executable, "/opt/sim");
    assert_eq!(first.arg_list, ["base", "0", "/scratch/r0"]);
    assert_eq!(first.target_file.as_deref(), Some("/scratch/r0/done"));
    assert_eq!(first.environment.as_ref().unwrap()["OUT"], "/scratch/r0/out");
    assert_eq!(manifest.job_list[1].arg_list, ["pred", "9", "/scratch/r0"]);
}

#[test]
fn missing_executable_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = JobRegistry::new();
    registry.register(JobDefinition::parse("ARGLIST a\n", Some("NOEXE"), None).unwrap()).unwrap();
    let mut model = ForwardModel::new(&registry);
    model.add_job("NOEXE").unwrap();

    let err = model.write_manifest(tmp.path(), "bad", "data_root", &SubstitutionList::new(), &EnvironmentVarlist::new())
                   .unwrap_err();

    assert!(matches!(err, SerializationError::MissingExecutable(ref n) if n == "NOEXE"));
    assert!(!tmp.path().join(JOBS_FILE).exists());
}

#[test]
fn cyclic_environment_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = JobRegistry::new();
    let model = ForwardModel::new(&registry);
    let varlist: EnvironmentVarlist = [("A", "$B"), ("B", "$A")].into_iter().collect();

    let err = model.write_manifest(tmp.path(), "cycle", "data_root", &SubstitutionList::new(), &varlist)
                   .unwrap_err();

    assert!(matches!(err, SerializationError::CyclicEnvironment(_)));
    assert!(!tmp.path().join(JOBS_FILE).exists());
}

#[test]
fn previous_manifest_is_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = fixture_registry(tmp.path());
    let mut model = ForwardModel::new(&registry);
    model.add_job("PI").unwrap();
    write(&model, tmp.path(), "first", &EnvironmentVarlist::new());

    let empty = ForwardModel::new(&registry);
    let manifest = write(&empty, tmp.path(), "second", &EnvironmentVarlist::new());

    assert_eq!(manifest["run_id"], "second");
    assert_eq!(manifest["jobList"], json!([]));
}

#[test]
fn written_manifest_loads_back() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = fixture_registry(tmp.path());
    let mut model = ForwardModel::new(&registry);
    model.add_job("AGGREGATOR").unwrap();

    let built = model.manifest("reload", "data_root", &SubstitutionList::new(), &EnvironmentVarlist::new())
                     .unwrap();
    built.write_to(tmp.path()).unwrap();

    assert_eq!(Manifest::load(tmp.path()).unwrap(), built);
}

#[test]
fn failed_write_leaves_no_temporary_file() {
    let tmp = tempfile::tempdir().unwrap();
    // Un directorio no vacío en el lugar de jobs.json hace fallar el rename.
    let blocker = tmp.path().join(JOBS_FILE);
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("keep"), "").unwrap();

    let registry = JobRegistry::new();
    let model = ForwardModel::new(&registry);
    let err = model.write_manifest(tmp.path(), "blocked", "data_root", &SubstitutionList::new(), &EnvironmentVarlist::new())
                   .unwrap_err();

    assert!(matches!(err, SerializationError::Io { .. }));
    let entries: Vec<String> = fs::read_dir(tmp.path()).unwrap()
                                                       .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                                                       .collect();
    assert_eq!(entries, [JOBS_FILE]);
}

#[test]
fn successful_write_leaves_only_the_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = JobRegistry::new();
    let model = ForwardModel::new(&registry);
    write(&model, tmp.path(), "clean", &EnvironmentVarlist::new());

    let entries: Vec<String> = fs::read_dir(tmp.path()).unwrap()
                                                       .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                                                       .collect();
    assert_eq!(entries, [JOBS_FILE]);
}
