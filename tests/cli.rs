use assert_cmd::Command;
use std::io::Write;

fn graph_file(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(&mut f, "{body}").unwrap();
    f.flush().unwrap();
    f
}

fn run_stdout(args: &[&str]) -> String {
    let mut cmd = Command::cargo_bin("maxclq").unwrap();
    let assert = cmd.args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn solves_k5_from_dimacs() {
    let f = graph_file(
        "c complete graph on five vertices\n\
         p edge 5 10\n\
         e 1 2\ne 1 3\ne 1 4\ne 1 5\n\
         e 2 3\ne 2 4\ne 2 5\n\
         e 3 4\ne 3 5\n\
         e 4 5",
    );

    let out = run_stdout(&[
        f.path().to_str().unwrap(),
        "--parallelism",
        "2",
        "--probe",
    ]);
    assert!(out.contains("size: 5"), "unexpected output:\n{out}");
    assert!(out.contains("proven: true"));
    assert!(out.contains("members: [0, 1, 2, 3, 4]"));
    assert!(out.contains("nodes:"));
}

#[test]
fn independent_set_mode_runs_on_the_complement() {
    // Star K_{1,3}: clique number 2, independence number 3
    let f = graph_file("p edge 4 3\ne 1 2\ne 1 3\ne 1 4");

    let direct = run_stdout(&[f.path().to_str().unwrap()]);
    assert!(direct.contains("size: 2"), "unexpected output:\n{direct}");

    let is = run_stdout(&[f.path().to_str().unwrap(), "--independent-set"]);
    assert!(is.contains("size: 3"), "unexpected output:\n{is}");
    assert!(is.contains("members: [1, 2, 3]"));
}

#[test]
fn rejects_a_malformed_file() {
    let f = graph_file("p edge 2 1\ne 1 5");
    Command::cargo_bin("maxclq")
        .unwrap()
        .arg(f.path().to_str().unwrap())
        .assert()
        .failure();
}
