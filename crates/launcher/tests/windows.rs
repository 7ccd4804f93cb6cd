#![cfg(windows)]

use std::{
    env,
    error::Error,
    fs,
    path::PathBuf,
    process::{Command, Output},
};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

struct Install {
    dir: TempDir,
    launcher: PathBuf,
}

impl Install {
    fn new() -> Result<Self, Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let launcher = dir.path().join("python3-utf8.exe");

        fs::copy(env!("CARGO_BIN_EXE_python3-utf8"), &launcher)?;

        Ok(Self { dir, launcher })
    }

    /// Installs the system shell as `python.exe`, so `/c ...` arguments run shell commands.
    fn shell_interpreter(&self) -> Result<&Self, Box<dyn Error>> {
        let shell = env::var_os("ComSpec")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows\System32\cmd.exe"));

        fs::copy(shell, self.dir.path().join("python.exe"))?;

        Ok(self)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.launcher);
        command
            .args(args)
            .env_remove("PYTHONIOENCODING")
            .env_remove("PYTHON3_UTF8_INTERPRETER")
            .env_remove("PYTHON3_UTF8_PROPAGATE_EXIT_CODE")
            .env_remove("PYTHON3_UTF8_LOG");

        command
    }

    fn run(&self, args: &[&str]) -> Result<Output, Box<dyn Error>> {
        Ok(self.command(args).output()?)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn interpreter_exit_code_is_discarded() -> TestResult {
    let install = Install::new()?;
    install.shell_interpreter()?;

    let output = install.run(&["/c", "exit", "3"])?;

    assert_eq!(output.status.code(), Some(0));

    Ok(())
}

#[test]
fn interpreter_exit_code_is_propagated_on_request() -> TestResult {
    let install = Install::new()?;
    install.shell_interpreter()?;

    let output = install
        .command(&["/c", "exit", "3"])
        .env("PYTHON3_UTF8_PROPAGATE_EXIT_CODE", "true")
        .output()?;

    assert_eq!(output.status.code(), Some(3));

    Ok(())
}

#[test]
fn interpreter_sees_utf8_encoding() -> TestResult {
    let install = Install::new()?;
    install.shell_interpreter()?;

    let output = install
        .command(&["/c", "echo", "%PYTHONIOENCODING%"])
        .env("PYTHONIOENCODING", "latin-1")
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "utf-8");

    Ok(())
}

#[test]
fn missing_interpreter_reports_create_process_error() -> TestResult {
    let install = Install::new()?;

    let output = install.run(&["-c", "print(1)"])?;
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();

    // ERROR_FILE_NOT_FOUND
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(lines.len(), 2, "unexpected stdout: {stdout:?}");
    assert_eq!(lines[0], "CreateProcessW() failed: 2");
    assert!(lines[1].starts_with("Started ["), "{}", lines[1]);
    assert!(
        lines[1].ends_with(r"\python.exe -c print(1) ]"),
        "{}",
        lines[1]
    );

    Ok(())
}
