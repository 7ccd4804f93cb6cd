use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

#[cfg(windows)]
pub const DEFAULT_INTERPRETER: &str = "python.exe";

#[cfg(not(windows))]
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Resolves `file_name` in the directory that contains `self_path`.
pub fn interpreter_path(self_path: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
    match self_path.parent() {
        Some(dir) => dir.join(file_name.as_ref()),
        None => PathBuf::from(file_name.as_ref()),
    }
}

/// An interpreter invocation with the arguments forwarded from the launcher.
#[derive(Debug)]
pub struct Launch {
    interpreter: PathBuf,
    args: Vec<OsString>,
}

impl Launch {
    pub fn new(interpreter: PathBuf, args: impl IntoIterator<Item = OsString>) -> Self {
        Self {
            interpreter,
            args: args.into_iter().collect(),
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Every argument followed by a single space. Nothing is quoted or escaped.
    pub fn argument_string(&self) -> OsString {
        let mut joined = OsString::new();

        for arg in &self.args {
            joined.push(arg);
            joined.push(" ");
        }

        joined
    }

    /// The full command line handed to process creation: interpreter, a space, then
    /// [`Launch::argument_string`].
    pub fn launch_line(&self) -> OsString {
        let mut line = self.interpreter.clone().into_os_string();
        line.push(" ");
        line.push(self.argument_string());
        line
    }
}
