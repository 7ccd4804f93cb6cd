use std::io;

use python3_utf8_env::EnvError;
use thiserror::Error;

use crate::launch::Launch;

/// Exit code for every failure other than a failed spawn.
pub const GENERIC_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{api}() failed: {code}")]
    Spawn {
        api: &'static str,
        code: i32,
        launch_line: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for the interpreter to exit")]
    Wait(#[source] io::Error),

    #[error("unable to determine the path of the launcher executable")]
    CurrentExe(#[source] io::Error),

    #[error(transparent)]
    Environment(#[from] EnvError),

    #[cfg(windows)]
    #[error("unable to set {name} for the interpreter")]
    SetEnvironment {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub fn spawn(api: &'static str, launch: &Launch, source: io::Error) -> Self {
        Self::Spawn {
            api,
            code: source.raw_os_error().unwrap_or(GENERIC_FAILURE),
            launch_line: launch.launch_line().to_string_lossy().into_owned(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { code, .. } => *code,
            _ => GENERIC_FAILURE,
        }
    }

    /// The two lines printed on stdout when the interpreter could not be started.
    pub fn spawn_diagnostic(&self) -> Option<String> {
        match self {
            Self::Spawn {
                launch_line, ..
            } => Some(format!("{self}\nStarted [{launch_line}]\n")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsString, path::PathBuf};

    use expect_test::expect;

    use super::*;

    fn missing_interpreter() -> LaunchError {
        let launch = Launch::new(
            PathBuf::from("/opt/python/bin/python3"),
            ["-c", "print(1)"].map(OsString::from),
        );

        LaunchError::spawn("spawn", &launch, io::Error::from_raw_os_error(2))
    }

    #[test]
    fn spawn_failure_exits_with_os_error_code() {
        assert_eq!(missing_interpreter().exit_code(), 2);
    }

    #[test]
    fn spawn_failure_diagnostic() {
        let diagnostic = missing_interpreter().spawn_diagnostic().unwrap();

        expect![[r#"
            spawn() failed: 2
            Started [/opt/python/bin/python3 -c print(1) ]
        "#]]
        .assert_eq(&diagnostic);
    }

    #[test]
    fn spawn_failure_without_os_code_is_still_nonzero() {
        let launch = Launch::new(PathBuf::from("python3"), Vec::<OsString>::new());
        let error = LaunchError::spawn("spawn", &launch, io::Error::other("no code"));

        assert_eq!(error.exit_code(), GENERIC_FAILURE);
    }

    #[test]
    fn other_failures_have_no_diagnostic() {
        let error = LaunchError::Wait(io::Error::other("interrupted"));

        assert_eq!(error.exit_code(), GENERIC_FAILURE);
        assert!(error.spawn_diagnostic().is_none());
    }
}
