use std::{
    fs,
    path::{Path, PathBuf},
};

use junit_reporter::prelude::*;
use pretty_assertions::assert_eq;


use lib::{
    buffer::Buffer, engine::ScriptedEngine, fs::CountingFs, generic, mismatch, passed,
    sanitize_console_output,
};

fn recording(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/report/recordings")
        .join(name)
}

fn options(output: &Path) -> ReporterOptions {
    ReporterOptions::new()
        .with_output(output)
        .with_color(ColorSetting::Never)
}

fn report_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn math_module() {
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = ScriptedEngine::new()
        .module("math")
        .test("addsNumbers", vec![passed()])
        .test("dividesByZero", vec![generic("unexpected exception")]);

    let result = JUnitReporter::new(&mut engine, options(tmp.path()))
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[]);
    assert!(matches!(result, Err(Error::TestFailures { failed: 1, total: 2 })));
    assert_eq!(engine.module_runs, 1);
    assert_eq!(engine.file_runs, 0);

    assert_eq!(report_names(tmp.path()), ["math.xml"]);
    let xml = fs::read_to_string(tmp.path().join("math.xml")).unwrap();
    assert!(xml.contains(r#"<testsuite name="math" errors="1" failures="0" tests="2">"#));
    assert!(xml.contains(r#"<testcase name="addsNumbers"/>"#));
    assert_eq!(xml.matches("<failure ").count(), 1);

    let divides = xml.find(r#"<testcase name="dividesByZero">"#).unwrap();
    let failure = xml
        .find(r#"<failure message="unexpected exception">Error: unexpected exception"#)
        .unwrap();
    assert!(divides < failure);
}

#[test]
fn one_file_per_module() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine::new()
        .module("zeta")
        .test("last", vec![passed()])
        .module("alpha")
        .test("first", vec![passed()])
        .test("second", vec![passed(), passed()]);

    JUnitReporter::new(engine, options(tmp.path()))
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[])
        .unwrap();

    assert_eq!(report_names(tmp.path()), ["alpha.xml", "zeta.xml"]);
    let alpha = fs::read_to_string(tmp.path().join("alpha.xml")).unwrap();
    assert!(alpha.contains(r#"<testsuite name="alpha" errors="0" failures="0" tests="2">"#));
}

#[test]
fn missing_output_touches_nothing() {
    let fs = CountingFs::default();
    let console = Buffer::default();
    let mut engine = ScriptedEngine::new().module("m").test("t", vec![passed()]);

    let err = JUnitReporter::new(&mut engine, ReporterOptions::new())
        .with_fs(&fs)
        .with_sink(WriteSink::new(console.clone()))
        .run(&[])
        .unwrap_err();

    assert!(matches!(err, Error::NoOutput));
    assert_eq!(engine.calls(), 0);
    assert_eq!(fs.create_calls(), 0);
    assert_eq!(fs.write_calls(), 0);
    assert_eq!(console.try_to_string().unwrap(), "");
}

#[test]
fn empty_output_counts_as_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let fs = CountingFs::default();
    let mut engine = ScriptedEngine::new().module("m").test("t", vec![passed()]);

    let err = JUnitReporter::new(&mut engine, options(Path::new("")))
        .with_cwd(tmp.path())
        .with_fs(&fs)
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[])
        .unwrap_err();

    assert!(matches!(err, Error::NoOutput));
    assert_eq!(engine.calls(), 0);
    assert_eq!(fs.create_calls(), 0);
    assert_eq!(fs.write_calls(), 0);
    assert_eq!(report_names(tmp.path()), Vec::<String>::new());
}

#[test]
fn directory_failure_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("reports");
    let fs = CountingFs::failing_create();
    let console = Buffer::default();
    let mut engine = ScriptedEngine::new()
        .module("a")
        .test("t", vec![passed()])
        .module("b")
        .test("t", vec![passed()]);

    let err = JUnitReporter::new(&mut engine, options(&output))
        .with_fs(&fs)
        .with_sink(WriteSink::new(console.clone()))
        .run(&[])
        .unwrap_err();

    assert!(matches!(&err, Error::CreateDir { path, .. } if *path == output));
    assert_eq!(engine.calls(), 1);
    assert_eq!(fs.create_calls(), 1);
    assert_eq!(fs.write_calls(), 0);
    assert!(!output.exists());
    assert_eq!(console.try_to_string().unwrap(), "");
}

#[test]
fn test_before_any_module_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let fs = CountingFs::default();
    let engine = ScriptedEngine::new().test("orphan", vec![generic("lost")]);

    let err = JUnitReporter::new(engine, options(tmp.path()))
        .with_fs(&fs)
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[])
        .unwrap_err();

    assert!(matches!(err, Error::NoCurrentModule { test } if test == "orphan"));
    assert_eq!(fs.create_calls(), 0);
    assert_eq!(report_names(tmp.path()), Vec::<String>::new());
}

#[test]
fn passing_run_prints_ok_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let console = Buffer::default();
    let engine = ScriptedEngine::new()
        .module("clean")
        .test("a", vec![passed()])
        .test("b", vec![passed()]);

    JUnitReporter::new(engine, options(tmp.path()))
        .with_sink(WriteSink::new(console.clone()))
        .run(&[])
        .unwrap();

    assert_eq!(
        sanitize_console_output(&console.try_to_string().unwrap()),
        "Writing <tmp>/clean.xml\n\nOK: 2 assertions (<duration>)\n"
    );
}

#[test]
fn replays_recorded_files() {
    let tmp = tempfile::tempdir().unwrap();
    let console = Buffer::default();

    let err = JUnitReporter::new(ReplayEngine::new(std::io::empty()), options(tmp.path()))
        .with_sink(WriteSink::new(console.clone()))
        .run(&[recording("math.json"), recording("strings.json")])
        .unwrap_err();
    assert!(matches!(err, Error::TestFailures { failed: 3, total: 9 }));

    assert_eq!(
        sanitize_console_output(&console.try_to_string().unwrap()),
        concat!(
            "Writing <tmp>/math.xml\n",
            "Writing <tmp>/strings.xml\n",
            "Writing <tmp>/strings_unicode.xml\n",
            "\n",
            "FAILURES: 3/9 assertions failed (<duration>)\n",
        )
    );

    let math = fs::read_to_string(tmp.path().join("math.xml")).unwrap();
    assert!(math.contains(r#"<testsuite name="math" errors="1" failures="1" tests="3">"#));
    assert!(math.contains(concat!(
        r#"<failure message="unexpected exception">"#,
        "RangeError: unexpected exception\n",
        "    at divide (math.js:12:9)</failure>"
    )));
    assert!(math.contains(concat!(
        r#"<failure message="0.5 rounds up">"#,
        "AssertionError: 0 equal 1\n",
        "    at round (math.js:30:5)</failure>"
    )));

    let strings = fs::read_to_string(tmp.path().join("strings.xml")).unwrap();
    assert!(strings.contains(r#"<testcase name="escape &lt;&amp;&gt;"/>"#));

    let unicode = fs::read_to_string(tmp.path().join("strings_unicode.xml")).unwrap();
    assert!(unicode.contains(r#"<testsuite name="strings/unicode" errors="0" failures="0" tests="1">"#));
}

#[test]
fn testspec_is_passed_to_the_engine() {
    let tmp = tempfile::tempdir().unwrap();
    let mut options = options(tmp.path());
    options.testspec = Some("rounding".into());

    let err = JUnitReporter::new(ReplayEngine::new(std::io::empty()), options)
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[recording("math.json"), recording("strings.json")])
        .unwrap_err();
    assert!(matches!(err, Error::TestFailures { failed: 1, total: 2 }));

    let math = fs::read_to_string(tmp.path().join("math.xml")).unwrap();
    assert!(math.contains(r#"errors="0" failures="1" tests="1""#));
    assert!(math.contains(r#"<testcase name="rounding - half up">"#));

    let strings = fs::read_to_string(tmp.path().join("strings.xml")).unwrap();
    assert!(strings.contains(r#"tests="0""#));
}

#[test]
fn files_are_resolved_before_dispatch() {
    let tmp = tempfile::tempdir().unwrap();
    let mut options = options(Path::new("out"));
    options.test_full_spec = Some("math - adds".into());
    let mut engine = ScriptedEngine::new().module("m");

    JUnitReporter::new(&mut engine, options)
        .with_cwd(tmp.path())
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[PathBuf::from("./results/../a.json"), tmp.path().join("b.json")])
        .unwrap();

    assert_eq!(engine.file_runs, 1);
    assert_eq!(engine.module_runs, 0);
    assert_eq!(engine.files, [tmp.path().join("a.json"), tmp.path().join("b.json")]);
    assert_eq!(
        engine.spec,
        Some(TestSpec {
            testspec: None,
            test_full_spec: Some("math - adds".into()),
        })
    );
    assert_eq!(report_names(&tmp.path().join("out")), ["m.xml"]);
}

#[test]
fn restarted_module_replaces_earlier_results() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine::new()
        .module("dup")
        .test("old", vec![generic("boom")])
        .module("dup")
        .test("new", vec![passed()]);

    let err = JUnitReporter::new(engine, options(tmp.path()))
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[])
        .unwrap_err();
    // the run still saw the failed assertion
    assert!(matches!(err, Error::TestFailures { failed: 1, total: 2 }));

    assert_eq!(report_names(tmp.path()), ["dup.xml"]);
    let xml = fs::read_to_string(tmp.path().join("dup.xml")).unwrap();
    assert!(xml.contains(r#"<testsuite name="dup" errors="0" failures="0" tests="1">"#));
    assert!(!xml.contains("old"));
}

#[test]
fn existing_reports_are_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("m.xml"), "stale report from an earlier run").unwrap();

    JUnitReporter::new(
        ScriptedEngine::new().module("m").test("t", vec![passed()]),
        options(tmp.path()),
    )
    .with_sink(WriteSink::new(Buffer::default()))
    .run(&[])
    .unwrap();

    let xml = fs::read_to_string(tmp.path().join("m.xml")).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(!xml.contains("stale"));
}

#[test]
fn module_names_stay_inside_output() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("out");
    let engine = ScriptedEngine::new()
        .module("../escape")
        .test("t", vec![mismatch("1", "2")]);

    let _ = JUnitReporter::new(engine, options(&output))
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[]);

    assert_eq!(report_names(&output), [".._escape.xml"]);
    assert!(!tmp.path().join("escape.xml").exists());
    let xml = fs::read_to_string(output.join(".._escape.xml")).unwrap();
    assert!(xml.contains(r#"<failure message="1 == 2">AssertionError: 1 == 2"#));
}

#[test]
#[cfg(target_os = "linux")]
fn module_names_differing_in_case_get_their_own_files() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine::new()
        .module("Math")
        .test("upper", vec![passed()])
        .module("math")
        .test("lower", vec![passed()]);

    JUnitReporter::new(engine, options(tmp.path()))
        .with_sink(WriteSink::new(Buffer::default()))
        .run(&[])
        .unwrap();

    assert_eq!(report_names(tmp.path()), ["Math.xml", "math.xml"]);
    let lower = fs::read_to_string(tmp.path().join("math.xml")).unwrap();
    assert!(lower.contains(r#"<testcase name="lower"/>"#));
}

#[test]
fn automatic_color_follows_the_sink() {
    let tmp = tempfile::tempdir().unwrap();
    let run = |sink: WriteSink<Buffer>| {
        JUnitReporter::new(
            ScriptedEngine::new().module("m").test("t", vec![passed()]),
            ReporterOptions::new().with_output(tmp.path()),
        )
        .with_sink(sink)
        .run(&[])
        .unwrap();
    };

    let captured = Buffer::default();
    run(WriteSink::new(captured.clone()));
    let output = captured.try_to_string().unwrap();
    assert!(output.ends_with("\nOK: 1 assertions (42ms)\n"));
    assert!(!output.contains('\x1b'));

    let terminal = Buffer::default();
    run(WriteSink::new(terminal.clone()).with_terminal(true));
    assert!(
        terminal
            .try_to_string()
            .unwrap()
            .contains("\x1b[1m\x1b[32mOK: \x1b[39m\x1b[22m1 assertions")
    );
}
