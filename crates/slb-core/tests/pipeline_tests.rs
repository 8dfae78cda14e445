use pretty_assertions::assert_eq;
use slb_catalog::{FilterKind, ServiceKey, SnapshotStore};
use slb_core::{query_dependencies, run_plan, EngineConfig, RunConfig, RunError, RunOptions, RunOutcome};
use slb_plan::{Action, DISABLE_SCRIPT, ENABLE_SCRIPT};
use slb_test_utils::{kernel_driver, user_service, StoreBuilder};
use std::fs;
use std::path::Path;

const SVCHOST: &str = r"%SystemRoot%\System32\svchost.exe -k netsvcs -p";

fn machine() -> StoreBuilder {
    StoreBuilder::new()
        .service(user_service("RpcSs").start(2).image_path(SVCHOST))
        .service(user_service("AudioSrv").start(2).depends_on(["RpcSs", "AudioEndpointBuilder"]).image_path(SVCHOST))
        .service(user_service("AudioEndpointBuilder").start(2).image_path(SVCHOST))
        .service(user_service("WSearch").start(2).image_path(SVCHOST))
        .service(user_service("Spooler").start(2).image_path(SVCHOST))
        .service(kernel_driver("Ksthunk").start(3).image_path(r"\SystemRoot\System32\drivers\ksthunk.sys"))
        .filter("{4d36e96c-e325-11ce-bfc1-08002be10318}", FilterKind::Upper, &["ksthunk", "partmgr"])
        .file(r"c:\windows\system32\svchost.exe", "Microsoft Corporation")
        .file(r"c:\windows\system32\drivers\ksthunk.sys", "Microsoft Corporation")
        .bare_file(r"C:\Windows\System32\mobsync.exe")
}

fn config(toml: &str) -> RunConfig {
    toml.parse().unwrap()
}

fn options(out: &Path) -> RunOptions {
    RunOptions::new().with_output_dir(out)
}

fn read(dir: &Path, script: &str) -> String {
    fs::read_to_string(dir.join(script)).unwrap()
}

#[test]
fn allow_list_run_writes_both_scripts() {
    let out = tempfile::tempdir().unwrap();
    let store = machine().build();
    let config = config(
        r#"
        enabled_services = ["rpcss", "AUDIOSRV", "AudioEndpointBuilder"]
        individual_disabled_services = ["Ksthunk"]
        rename_binaries = ['\Windows\System32\mobsync.exe']
        "#,
    );

    let outcome = run_plan(&store, &config, &options(out.path())).unwrap();
    let RunOutcome::Written { build_dir, plan } = outcome else {
        panic!("expected scripts");
    };

    assert!(build_dir.starts_with(out.path()));
    assert_eq!(
        plan.forward().first(),
        Some(&Action::KillProcess {
            image: "mobsync.exe".into()
        })
    );

    let disable = read(&build_dir, DISABLE_SCRIPT);
    let enable = read(&build_dir, ENABLE_SCRIPT);

    assert!(disable.starts_with("@echo off\n"));
    assert!(disable.contains(r#"reg.exe add "HKLM\%HIVE%\Services\Spooler" /v "Start" /t REG_DWORD /d "4" /f"#));
    assert!(disable.contains(r#"reg.exe add "HKLM\%HIVE%\Services\WSearch" /v "Start" /t REG_DWORD /d "4" /f"#));
    assert!(disable.contains(r#"reg.exe add "HKLM\%HIVE%\Services\Ksthunk" /v "Start" /t REG_DWORD /d "4" /f"#));
    assert!(disable.contains(r#"/v "UpperFilters" /t REG_MULTI_SZ /d "partmgr" /f"#));
    assert!(!disable.contains(r"\Services\RpcSs"));

    assert!(enable.contains(r#"reg.exe add "HKLM\%HIVE%\Services\Ksthunk" /v "Start" /t REG_DWORD /d "3" /f"#));
    assert!(enable.contains(r#"/v "UpperFilters" /t REG_MULTI_SZ /d "ksthunk\0partmgr" /f"#));
    assert!(enable.contains(r#"REN "%DRIVE_LETTER%:\Windows\System32\mobsync.exee" "mobsync.exe""#));
    assert!(!enable.contains("taskkill"));
    assert!(enable.ends_with("shutdown /r /f /t 0\n"));
}

#[test]
fn conflicts_abort_before_writing() {
    let out = tempfile::tempdir().unwrap();
    let store = machine().build();
    let config = config(r#"enabled_services = ["AudioSrv"]"#);

    let err = run_plan(&store, &config, &options(&out.path().join("build"))).unwrap_err();

    let RunError::Conflict(report) = err else {
        panic!("expected conflict, got {err}");
    };
    assert_eq!(report.missing_dependencies.len(), 1);
    assert_eq!(
        report.missing_dependencies[&ServiceKey::new("audiosrv")]
            .iter()
            .map(ServiceKey::as_str)
            .collect::<Vec<_>>(),
        ["audioendpointbuilder", "rpcss"]
    );
    assert!(!out.path().join("build").exists());
}

#[test]
fn explicit_disables_only_without_allow_list() {
    let out = tempfile::tempdir().unwrap();
    let store = machine().build();
    let config = config(r#"individual_disabled_services = ["wsearch"]"#);

    let RunOutcome::Written { plan, .. } = run_plan(&store, &config, &options(out.path())).unwrap() else {
        panic!("expected scripts");
    };

    assert_eq!(
        plan.forward(),
        &[Action::SetStartValue {
            service: "WSearch".into(),
            value: 4
        }]
    );
}

#[test]
fn vendor_gate_blocks_unrecognized_services() {
    let out = tempfile::tempdir().unwrap();
    let store = machine()
        .service(user_service("AcmeAgent").start(2).image_path(r"C:\Acme\agent.exe"))
        .file(r"c:\acme\agent.exe", "Acme")
        .build();
    let config = config(r#"individual_disabled_services = ["AcmeAgent", "WSearch"]"#);

    let err = run_plan(&store, &config, &options(out.path())).unwrap_err();
    let RunError::VendorWarning(review) = &err else {
        panic!("expected vendor warning, got {err}");
    };
    assert_eq!(review.third_party.len(), 1);
    assert!(err.hint().is_some());

    let suppressed = options(out.path()).with_suppress_vendor_warning(true);
    assert!(matches!(
        run_plan(&store, &config, &suppressed).unwrap(),
        RunOutcome::Written { .. }
    ));
}

#[test]
fn disable_running_restricts_to_running_services() {
    let out = tempfile::tempdir().unwrap();
    let store = machine().running("Spooler").build();
    let config = config(r#"individual_disabled_services = ["Spooler", "WSearch"]"#);

    let RunOutcome::Written { plan, .. } =
        run_plan(&store, &config, &options(out.path()).with_disable_running(true)).unwrap()
    else {
        panic!("expected scripts");
    };

    assert_eq!(
        plan.forward(),
        &[Action::SetStartValue {
            service: "Spooler".into(),
            value: 4
        }]
    );
}

#[test]
fn nothing_to_do_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let build = out.path().join("build");
    let store: SnapshotStore = StoreBuilder::new().service(user_service("Fax")).build();
    let config = config(r#"individual_disabled_services = ["Fax", "NotInstalled"]"#);

    let outcome = run_plan(&store, &config, &options(&build).with_suppress_vendor_warning(true)).unwrap();

    assert_eq!(outcome, RunOutcome::NoChanges);
    assert!(!build.exists());
}

#[test]
fn engine_type_table_is_honoured() {
    let out = tempfile::tempdir().unwrap();
    let store = StoreBuilder::new()
        .service(user_service("Keep").start(2))
        .service(user_service("Odd").type_code(1024).start(2))
        .build();
    let config = config(
        r#"
        enabled_services = ["Keep"]
        [engine]
        user_mode_types = [32, 1024]
        "#,
    );

    let RunOutcome::Written { plan, .. } =
        run_plan(&store, &config, &options(out.path()).with_suppress_vendor_warning(true)).unwrap()
    else {
        panic!("expected scripts");
    };

    assert_eq!(
        plan.forward(),
        &[Action::SetStartValue {
            service: "Odd".into(),
            value: 4
        }]
    );
}

#[test]
fn dependency_query() {
    let store = machine().build();
    let engine = EngineConfig::default();

    let report = query_dependencies(&store, &engine, "audiosrv", false).unwrap();
    assert_eq!(report.summary(), "AudioSrv depends on AudioEndpointBuilder, RpcSs");
    assert_eq!(
        report.tree.render(),
        vec![
            "AudioSrv".to_string(),
            "  AudioEndpointBuilder".to_string(),
            "  RpcSs".to_string(),
        ]
    );

    let report = query_dependencies(&store, &engine, "RpcSs", true).unwrap();
    assert_eq!(report.summary(), "RpcSs has 0 dependencies");

    let err = query_dependencies(&store, &engine, "Nope", false).unwrap_err();
    assert_eq!(err.to_string(), "Nope not exists as a service");
}
