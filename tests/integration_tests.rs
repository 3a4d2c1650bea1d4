//! Integration tests for the symsweep CLI

use assert_cmd::Command;
use predicates::prelude::*;

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("symsweep").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compilation database"))
        .stdout(predicate::str::contains("--only-under"))
        .stdout(predicate::str::contains("--extra-arg-before"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("symsweep").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("symsweep"));
}

/// Test unknown flags are usage errors
#[test]
fn test_invalid_flag() {
    let mut cmd = Command::cargo_bin("symsweep").unwrap();
    cmd.arg("--no-such-flag")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[cfg(unix)]
mod sweep {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::process::Stdio;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Stand-in for find-all-symbols. Per-file mode writes `<name>.yaml` into
    /// the output dir (and fails for `bad.*`); merge mode concatenates them.
    const FAKE_TOOL: &str = r#"#!/bin/sh
dir=$(dirname "$0")/..
echo "$@" >> "$dir/invocations.log"
case "$1" in
  -merge-dir=*)
    stage="${1#-merge-dir=}"
    echo "$stage" > "$dir/staging.path"
    if [ -n "$FAKE_MERGE_EXIT" ]; then exit "$FAKE_MERGE_EXIT"; fi
    cat "$stage"/*.yaml > "$2" 2>/dev/null || : > "$2"
    exit 0
    ;;
esac
out="${2#-output-dir=}"
name=$(basename "$1")
case "$name" in
  bad.*) exit 7 ;;
esac
echo "- $1" > "$out/$name.yaml"
"#;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(files: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            let tool = dir.path().join("bin").join("find-all-symbols");
            fs::create_dir_all(tool.parent().unwrap()).unwrap();
            fs::write(&tool, FAKE_TOOL).unwrap();
            fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

            let build = dir.path().join("build");
            fs::create_dir_all(&build).unwrap();
            let entries: Vec<serde_json::Value> = files
                .iter()
                .map(|f| {
                    let file = dir.path().join(f);
                    fs::create_dir_all(file.parent().unwrap()).unwrap();
                    fs::write(&file, "int x;\n").unwrap();
                    serde_json::json!({
                        "directory": build,
                        "command": format!("c++ -c {}", file.display()),
                        "file": file,
                    })
                })
                .collect();
            fs::write(
                build.join("compile_commands.json"),
                serde_json::to_string_pretty(&entries).unwrap(),
            )
            .unwrap();

            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn tool(&self) -> PathBuf {
            self.root().join("bin").join("find-all-symbols")
        }

        fn output(&self) -> PathBuf {
            self.root().join("symbols.yaml")
        }

        fn command(&self) -> Command {
            let mut cmd = Command::cargo_bin("symsweep").unwrap();
            cmd.current_dir(self.root())
                .env("HOME", self.root())
                .env_remove("RUST_LOG")
                .arg("--binary")
                .arg(self.tool())
                .arg("-o")
                .arg(self.output());
            cmd
        }

        fn invocations(&self) -> Vec<String> {
            fs::read_to_string(self.root().join("invocations.log"))
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn per_file_invocations(&self) -> Vec<String> {
            self.invocations()
                .into_iter()
                .filter(|l| !l.starts_with("-merge-dir="))
                .collect()
        }

        fn merge_invocations(&self) -> Vec<String> {
            self.invocations()
                .into_iter()
                .filter(|l| l.starts_with("-merge-dir="))
                .collect()
        }

        fn staging_path(&self) -> PathBuf {
            PathBuf::from(
                fs::read_to_string(self.root().join("staging.path"))
                    .unwrap()
                    .trim(),
            )
        }
    }

    #[test]
    fn test_sweep_sources_and_merge() {
        let project = Project::new(&["src/a.cpp", "src/b.cpp", "res/app.rc", "src/c.cpp"]);

        project
            .command()
            .args(["-j", "2", "-p", "build"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Merge is finished"))
            .stdout(predicate::str::contains("symbols.yaml"));

        assert_eq!(project.per_file_invocations().len(), 3);
        assert_eq!(project.merge_invocations().len(), 1);
        assert!(!project.staging_path().exists());

        let merged = fs::read_to_string(project.output()).unwrap();
        for name in ["a.cpp", "b.cpp", "c.cpp"] {
            assert!(merged.contains(name), "{name} missing from merged output");
        }
        assert!(!merged.contains("app.rc"));
    }

    #[test]
    fn test_database_found_by_walking_up() {
        let project = Project::new(&["src/a.c"]);
        let nested = project.root().join("build").join("deep");
        fs::create_dir_all(&nested).unwrap();

        project
            .command()
            .current_dir(&nested)
            .assert()
            .success();

        let calls = project.per_file_invocations();
        assert_eq!(calls.len(), 1);
        let build = project.root().join("build").canonicalize().unwrap();
        assert!(calls[0].contains(&format!("-p={}", build.display())));
    }

    #[test]
    fn test_echoes_each_invocation() {
        let project = Project::new(&["src/a.cc"]);

        project
            .command()
            .args(["-p", "build", "--extra-arg=-DFOO"])
            .assert()
            .success()
            .stdout(predicate::str::contains("src/a.cc -output-dir="))
            .stdout(predicate::str::contains("--extra-arg=-DFOO"));
    }

    #[test]
    fn test_only_under_and_exclude() {
        let project = Project::new(&[
            "lib/keep.c",
            "lib-extra/sibling.c",
            "lib/gen/generated.c",
            "app/main.c",
        ]);

        project
            .command()
            .args(["-p", "build", "--only-under", "lib", "--exclude", "*/gen/*"])
            .assert()
            .success();

        let calls = project.per_file_invocations();
        assert_eq!(calls.len(), 1, "{calls:?}");
        assert!(calls[0].contains("lib/keep.c"));
    }

    #[test]
    fn test_bad_file_is_tolerated() {
        let project = Project::new(&["src/bad.c", "src/good.c"]);

        project
            .command()
            .args(["-j", "1", "-p", "build"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bad.c"))
            .stdout(predicate::str::contains("Merge is finished"));

        assert_eq!(project.per_file_invocations().len(), 2);
        let merged = fs::read_to_string(project.output()).unwrap();
        assert!(merged.contains("good.c"));
    }

    #[test]
    fn test_merge_failure_propagates_status() {
        let project = Project::new(&["src/a.c", "src/b.c"]);

        project
            .command()
            .args(["-p", "build"])
            .env("FAKE_MERGE_EXIT", "5")
            .assert()
            .code(5)
            .stderr(predicate::str::contains("merge failed"));

        assert_eq!(project.per_file_invocations().len(), 2);
        assert!(!project.staging_path().exists());
    }

    #[test]
    fn test_missing_binary_fails_before_work() {
        let project = Project::new(&["src/a.c"]);

        Command::cargo_bin("symsweep")
            .unwrap()
            .current_dir(project.root())
            .env("HOME", project.root())
            .args(["--binary", "/no/such/find-all-symbols", "-p", "build"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("binary not found"));

        assert!(project.invocations().is_empty());
    }

    #[test]
    fn test_non_executable_binary_fails_before_work() {
        let project = Project::new(&["src/a.c"]);
        fs::set_permissions(project.tool(), fs::Permissions::from_mode(0o644)).unwrap();

        project
            .command()
            .args(["-p", "build"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not executable"));

        assert!(project.invocations().is_empty());
    }

    #[test]
    fn test_closed_stdout_does_not_hang() {
        let names: Vec<String> = (0..40).map(|i| format!("src/f{i}.c")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let project = Project::new(&refs);

        let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("symsweep"))
            .current_dir(project.root())
            .env("HOME", project.root())
            .env_remove("RUST_LOG")
            .arg("--binary")
            .arg(project.tool())
            .arg("-o")
            .arg(project.output())
            .args(["-j", "1", "-p", "build"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        // Reader goes away immediately, like `symsweep | head -n 0`
        drop(child.stdout.take());

        let deadline = Instant::now() + Duration::from_secs(60);
        let status = loop {
            if let Some(status) = child.try_wait().unwrap() {
                break status;
            }
            if Instant::now() > deadline {
                child.kill().unwrap();
                panic!("symsweep did not finish with stdout closed");
            }
            std::thread::sleep(Duration::from_millis(50));
        };

        assert!(status.success());
        assert_eq!(project.per_file_invocations().len(), 40);
        assert!(project.output().exists());
    }

    #[test]
    fn test_missing_database_fails() {
        let project = Project::new(&["src/a.c"]);
        let empty = project.root().join("empty");
        fs::create_dir_all(&empty).unwrap();

        project
            .command()
            .args(["-p"])
            .arg(&empty)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("compilation database"));

        assert!(project.invocations().is_empty());
    }

    #[test]
    fn test_config_file_supplies_settings() {
        let project = Project::new(&["src/a.c", "src/skip_me.c"]);
        fs::write(
            project.root().join("symsweep.toml"),
            "build_path = \"build\"\nexclude = [\"*skip_me*\"]\njobs = 3\n",
        )
        .unwrap();

        project.command().assert().success();

        let calls = project.per_file_invocations();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("src/a.c"));
    }

    #[test]
    fn test_quiet_suppresses_transcript() {
        let project = Project::new(&["src/a.c"]);

        project
            .command()
            .args(["-q", "-p", "build"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        assert!(project.output().exists());
    }
}
