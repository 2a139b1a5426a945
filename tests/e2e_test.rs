/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn npm_project(root: &Path) {
    write(
        root,
        "package.json",
        r#"{ "name": "web", "version": "1.0.0", "dependencies": { "leftpad": "^1.0.0" } }"#,
    );
    write(
        root,
        "package-lock.json",
        r#"{
            "name": "web",
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "web", "version": "1.0.0" },
                "node_modules/leftpad": { "version": "1.3.0", "integrity": "sha512-AQKr" }
            }
        }"#,
    );
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("bomgraph")
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("--disable-npm"))
            .stdout(predicate::str::contains("--no-dev-dependencies"))
            .stdout(predicate::str::contains("--disable-dotnet"));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("bomgraph")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: malformed --metadata value
    #[test]
    fn test_exit_code_invalid_metadata() {
        cargo_bin_cmd!("bomgraph")
            .args(["--metadata", "novalue"])
            .assert()
            .code(2);
    }

    /// Exit code 2: non-existent input path
    #[test]
    fn test_exit_code_nonexistent_input() {
        cargo_bin_cmd!("bomgraph")
            .args(["-i", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid input path"));
    }

    /// Exit code 1: the analysis reported an error diagnostic
    #[test]
    fn test_exit_code_analysis_errors() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "web", "version": "1.0.0" }"#,
        );

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("error: Could not read package-lock.json"))
            .stderr(predicate::str::contains("Path: package-lock.json"));

        assert!(!temp_dir.path().join("web.bomgraph.json").exists());
    }

    /// Exit code 4: nothing to report
    #[test]
    fn test_exit_code_empty_bom() {
        let temp_dir = TempDir::new().unwrap();

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .assert()
            .code(4);
    }

    /// Exit code 4: the only matching analyzer is disabled
    #[test]
    fn test_disabled_analyzer_yields_empty_bom() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .arg("--disable-npm")
            .assert()
            .code(4);
    }
}

mod output_tests {
    use super::*;

    #[test]
    fn test_default_output_file() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .args(["--name", "shop", "--version", "2.0.0"])
            .assert()
            .code(0);

        let output = fs::read_to_string(temp_dir.path().join("shop.bomgraph.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["name"], "shop");
        assert_eq!(json["version"], "2.0.0");
        assert_eq!(json["toolName"], "bomgraph");
        assert_eq!(json["components"].as_array().unwrap().len(), 2);
        assert_eq!(json["dependencies"][0]["ref"], "pkg:bomgraph/npm/web@1.0.0");
        assert_eq!(json["dependencies"][0]["dependsOn"][0], "pkg:npm/leftpad@1.3.0");
    }

    #[test]
    fn test_stdout_output() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .args(["-o", "-", "--metadata", "team=payments"])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("\"toolName\": \"bomgraph\""))
            .stdout(predicate::str::contains("\"key\": \"team\""))
            .stdout(predicate::str::contains("pkg:npm/leftpad@1.3.0"));
    }

    #[test]
    fn test_explicit_output_path() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());
        let output_path = temp_dir.path().join("out").join("bom.json");
        fs::create_dir_all(output_path.parent().unwrap()).unwrap();

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .arg("-o")
            .arg(&output_path)
            .assert()
            .code(0);

        assert!(output_path.exists());
    }
}

mod config_file_tests {
    use super::*;

    #[test]
    fn test_discovered_config_applies() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());
        write(
            temp_dir.path(),
            "legacy/package.json",
            r#"{ "name": "legacy", "version": "0.1.0" }"#,
        );
        write(
            temp_dir.path(),
            "bomgraph.config.yml",
            "name: configured\nexclude_paths:\n  - legacy\nformat: markdown\n",
        );

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .assert()
            .code(0)
            .stderr(predicate::str::contains("Unknown config field 'format'"));

        let output = fs::read_to_string(temp_dir.path().join("configured.bomgraph.json")).unwrap();
        assert!(!output.contains("legacy"));
    }

    #[test]
    fn test_command_line_name_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());
        write(temp_dir.path(), "bomgraph.config.yml", "name: configured\n");

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .args(["--name", "cli"])
            .assert()
            .code(0);

        assert!(temp_dir.path().join("cli.bomgraph.json").exists());
        assert!(!temp_dir.path().join("configured.bomgraph.json").exists());
    }

    #[test]
    fn test_explicit_config_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());
        let config_path = temp_dir.path().join("broken.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .arg("--config")
            .arg(&config_path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Invalid configuration file"));
    }

    #[test]
    fn test_configured_disabled_analyzer() {
        let temp_dir = TempDir::new().unwrap();
        npm_project(temp_dir.path());
        write(
            temp_dir.path(),
            "bomgraph.config.yml",
            "disabled_analyzers:\n  - npm\n",
        );

        cargo_bin_cmd!("bomgraph")
            .arg("-i")
            .arg(temp_dir.path())
            .assert()
            .code(4);
    }
}
