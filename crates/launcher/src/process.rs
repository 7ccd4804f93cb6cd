mod unix;
mod windows;

use python3_utf8_env::InterpreterVars;
use tracing::{debug, instrument};

#[cfg(unix)]
use self::unix::Child as OsChild;
#[cfg(windows)]
use self::windows::Child as OsChild;

use crate::{error::LaunchError, launch::Launch};

/// The running interpreter. Standard streams are inherited from the launcher.
pub struct Child(OsChild);

impl Child {
    #[instrument(skip_all, fields(interpreter = ?launch.interpreter()))]
    pub fn spawn(launch: &Launch, vars: InterpreterVars) -> Result<Self, LaunchError> {
        let child = OsChild::spawn(launch, vars)?;
        debug!(pid = child.id(), "interpreter started");

        Ok(Self(child))
    }

    /// Blocks until the interpreter terminates and returns its exit code.
    pub fn wait(self) -> Result<i32, LaunchError> {
        self.0.wait()
    }
}
