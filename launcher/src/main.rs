//! The zigup default-pointer launcher.
//!
//! This binary is never run directly by a user. `zigup` copies the compiled
//! artifact to `<zig_symlink_path>`/`<zls_symlink_path>` and splices an
//! absolute target path into the null-terminated buffer that follows
//! [`MARKER`] inside the file on disk (see `app::default_pointer::windows` in
//! the root crate). When the spliced copy is executed, it locates that same
//! marker in its own binary, reads the target path back out, and re-execs the
//! target with the launcher's own argv, forwarding stdio and the child's exit
//! code.

include!("marker.rs");

use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, ExitCode, Stdio};

/// Padding included so the marker + buffer survive whatever the linker does
/// to adjacent rodata; `#[used]` keeps the whole thing from being stripped.
#[used]
#[unsafe(no_mangle)]
static ZIGUP_LAUNCHER_PAYLOAD: ([u8; 42], [u8; PATH_BUF_LEN]) = (*MARKER, [0u8; PATH_BUF_LEN]);

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            let _ = writeln!(std::io::stderr(), "zigup-launcher: {msg}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<u8, String> {
    let target = read_spliced_target()?;
    if target.is_empty() {
        return Err("no default toolchain set (launcher payload is empty)".to_string());
    }

    let mut args = std::env::args_os();
    args.next(); // argv[0]

    #[cfg(windows)]
    install_console_handler();

    let mut child = Command::new(&target)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| format!("failed to launch {}: {e}", target.to_string_lossy()))?;

    #[cfg(windows)]
    {
        RUNNING_CHILD.with(|cell| *cell.borrow_mut() = Some(child.id()));
    }

    let status = child
        .wait()
        .map_err(|e| format!("failed to wait on {}: {e}", target.to_string_lossy()))?;

    match status.code() {
        Some(code) => Ok(code as u8),
        None => Err(format!("{} terminated by signal", target.to_string_lossy())),
    }
}

/// Locates [`MARKER`] in this executable's own file on disk and reads the
/// null-terminated path buffer that follows it.
fn read_spliced_target() -> Result<OsString, String> {
    let exe = std::env::current_exe().map_err(|e| format!("current_exe failed: {e}"))?;
    let bytes = std::fs::read(&exe).map_err(|e| format!("failed to read {}: {e}", exe.display()))?;

    let mut offsets = bytes
        .windows(MARKER.len())
        .enumerate()
        .filter(|(_, w)| *w == &MARKER[..])
        .map(|(i, _)| i);

    let first = offsets
        .next()
        .ok_or_else(|| "launcher payload marker not found (corrupt shim)".to_string())?;
    if offsets.next().is_some() {
        return Err("launcher payload marker found more than once (corrupt shim)".to_string());
    }

    let buf_start = first + MARKER.len();
    let buf_end = (buf_start + PATH_BUF_LEN).min(bytes.len());
    let buf = &bytes[buf_start..buf_end];

    if buf.len() < PATH_BUF_LEN {
        return Err("launcher payload buffer truncated (corrupt shim)".to_string());
    }

    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| "launcher payload missing null terminator (corrupt shim)".to_string())?;

    let path_str = std::str::from_utf8(&buf[..nul])
        .map_err(|e| format!("launcher payload is not valid UTF-8: {e}"))?;
    Ok(OsString::from(path_str))
}

#[cfg(windows)]
thread_local! {
    static RUNNING_CHILD: std::cell::RefCell<Option<u32>> = std::cell::RefCell::new(None);
}

/// Forwards Ctrl-C / Ctrl-Break to the spawned child before the launcher's
/// own default handler would tear down the process tree, per spec.md §4.6.
#[cfg(windows)]
fn install_console_handler() {
    use windows_sys::Win32::Foundation::{BOOL, FALSE, TRUE};
    use windows_sys::Win32::System::Console::SetConsoleCtrlHandler;
    use windows_sys::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

    unsafe extern "system" fn handler(_ctrl_type: u32) -> BOOL {
        RUNNING_CHILD.with(|cell| {
            if let Some(pid) = *cell.borrow() {
                unsafe {
                    let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
                    if !handle.is_null() {
                        TerminateProcess(handle, 1);
                    }
                }
            }
        });
        TRUE
    }

    unsafe {
        SetConsoleCtrlHandler(Some(handler), TRUE);
    }
    let _ = FALSE; // silence unused-import churn across cfg combinations
}
