use std::io::{self, Write};

use python3_utf8_env::{InterpreterVars, LauncherVars};
use tracing::{debug, info};

use crate::{
    error::{GENERIC_FAILURE, LaunchError},
    launch::{DEFAULT_INTERPRETER, Launch},
    process::Child,
};

mod error;
mod launch;
mod process;

pub type LauncherResult<T> = color_eyre::Result<T>;

fn run() -> LauncherResult<i32> {
    let vars: LauncherVars =
        python3_utf8_env::deserialize_from_env().map_err(LaunchError::Environment)?;

    python3_utf8_telemetry::install(vars.log.as_deref());
    debug!(version = env!("CARGO_PKG_VERSION"), ?vars, "launcher started");

    let self_path = std::env::current_exe().map_err(LaunchError::CurrentExe)?;
    let file_name = vars.interpreter.as_deref().unwrap_or(DEFAULT_INTERPRETER);

    let launch = Launch::new(
        launch::interpreter_path(&self_path, file_name),
        std::env::args_os().skip(1),
    );

    debug!(launch_line = ?launch.launch_line(), "launching interpreter");

    let child = Child::spawn(&launch, InterpreterVars::default())?;
    let exit_code = child.wait()?;

    info!(exit_code, "interpreter exited");

    // The interpreter's status is only reported when asked for.
    Ok(if vars.propagate_exit_code { exit_code } else { 0 })
}

fn main() {
    python3_utf8_telemetry::install_error_handler();

    let exit_code = match run() {
        Ok(exit_code) => exit_code,
        Err(report) => {
            let spawn_failure = report
                .downcast_ref::<LaunchError>()
                .and_then(|error| Some((error.spawn_diagnostic()?, error.exit_code())));

            match spawn_failure {
                Some((diagnostic, exit_code)) => {
                    let mut stdout = io::stdout().lock();
                    let _ = stdout.write_all(diagnostic.as_bytes());
                    let _ = stdout.flush();

                    exit_code
                }
                None => {
                    eprintln!("Error: {report:?}");
                    GENERIC_FAILURE
                }
            }
        }
    };

    std::process::exit(exit_code);
}
