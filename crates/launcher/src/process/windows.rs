#![cfg(windows)]

use std::{io, iter, mem, os::windows::ffi::OsStrExt};

use python3_utf8_env::InterpreterVars;
use windows::{
    Win32::{
        Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0, WIN32_ERROR},
        System::{
            Console::{
                GetStdHandle, STD_ERROR_HANDLE, STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
            },
            Environment::SetEnvironmentVariableW,
            Threading::{
                CREATE_UNICODE_ENVIRONMENT, CreateProcessW, GetExitCodeProcess, INFINITE,
                PROCESS_INFORMATION, STARTF_USESTDHANDLES, STARTUPINFOW, WaitForSingleObject,
            },
        },
    },
    core::{HSTRING, PCWSTR, PWSTR},
};

use crate::{error::LaunchError, launch::Launch};

const SPAWN_API: &str = "CreateProcessW";

struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

pub struct Child {
    id: u32,
    process: OwnedHandle,
    _thread: OwnedHandle,
}

impl Child {
    pub fn spawn(launch: &Launch, vars: InterpreterVars) -> Result<Self, LaunchError> {
        // Set on the launcher itself, the child inherits our environment block.
        for (name, value) in python3_utf8_env::serialize_prefixed(vars)? {
            let (wide_name, wide_value) = (HSTRING::from(name.as_str()), HSTRING::from(value));
            let result = unsafe { SetEnvironmentVariableW(&wide_name, &wide_value) };

            result.map_err(|e| LaunchError::SetEnvironment {
                name,
                source: os_error(e),
            })?;
        }

        // CreateProcessW may write into the command line buffer.
        let mut command_line: Vec<u16> = launch
            .launch_line()
            .encode_wide()
            .chain(iter::once(0))
            .collect();

        let startup_info = STARTUPINFOW {
            cb: mem::size_of::<STARTUPINFOW>() as u32,
            dwFlags: STARTF_USESTDHANDLES,
            hStdInput: std_handle(STD_INPUT_HANDLE),
            hStdOutput: std_handle(STD_OUTPUT_HANDLE),
            hStdError: std_handle(STD_ERROR_HANDLE),
            ..Default::default()
        };
        let mut process_info = PROCESS_INFORMATION::default();

        let created = unsafe {
            CreateProcessW(
                PCWSTR::null(),
                Some(PWSTR(command_line.as_mut_ptr())),
                None,
                None,
                true,
                CREATE_UNICODE_ENVIRONMENT,
                None,
                PCWSTR::null(),
                &startup_info,
                &mut process_info,
            )
        };

        if let Err(e) = created {
            return Err(LaunchError::spawn(SPAWN_API, launch, os_error(e)));
        }

        Ok(Self {
            id: process_info.dwProcessId,
            process: OwnedHandle(process_info.hProcess),
            _thread: OwnedHandle(process_info.hThread),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn wait(self) -> Result<i32, LaunchError> {
        if unsafe { WaitForSingleObject(self.process.0, INFINITE) } != WAIT_OBJECT_0 {
            return Err(LaunchError::Wait(io::Error::last_os_error()));
        }

        let mut exit_code = 0u32;
        unsafe { GetExitCodeProcess(self.process.0, &mut exit_code) }
            .map_err(|e| LaunchError::Wait(os_error(e)))?;

        Ok(exit_code as i32)
    }
}

fn std_handle(kind: STD_HANDLE) -> HANDLE {
    unsafe { GetStdHandle(kind) }.unwrap_or_default()
}

/// Converts a failed call's error into an `io::Error` carrying the plain Win32 code
/// (`2`, not the `0x80070002` HRESULT it arrives wrapped in).
fn os_error(error: windows::core::Error) -> io::Error {
    match WIN32_ERROR::from_error(&error) {
        Some(code) => io::Error::from_raw_os_error(code.0 as i32),
        None => io::Error::other(error),
    }
}
