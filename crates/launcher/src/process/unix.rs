#![cfg(unix)]

use std::{
    os::unix::process::ExitStatusExt,
    process::{Command, ExitStatus, Stdio},
};

use python3_utf8_env::{CommandExt, InterpreterVars};

use crate::{error::LaunchError, launch::Launch};

const SPAWN_API: &str = "spawn";

pub struct Child {
    inner: std::process::Child,
}

impl Child {
    pub fn spawn(launch: &Launch, vars: InterpreterVars) -> Result<Self, LaunchError> {
        let mut command = Command::new(launch.interpreter());
        command
            .args(launch.args())
            .with_env_vars(vars)?
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        match command.spawn() {
            Ok(inner) => Ok(Self { inner }),
            Err(source) => Err(LaunchError::spawn(SPAWN_API, launch, source)),
        }
    }

    pub fn id(&self) -> u32 {
        self.inner.id()
    }

    pub fn wait(mut self) -> Result<i32, LaunchError> {
        let status = self.inner.wait().map_err(LaunchError::Wait)?;
        Ok(exit_code(status))
    }
}

/// Shell convention: a child killed by signal N reports 128 + N.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}
