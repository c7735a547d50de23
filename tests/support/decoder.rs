use std::path::{Path, PathBuf};

/// Stand-in decoder that copies its `-i` argument (the 4th) to stdout as-is.
pub const PASSTHROUGH: &str = "exec cat \"$4\"";
/// Emits the input, complains on stderr, then exits non-zero.
pub const FAILING: &str = "cat \"$4\"\necho 'decode exploded' >&2\nexit 3";
/// Records its pid next to the input, emits the input, then hangs on to stdout
/// until killed.
pub const LINGERING: &str = "echo $$ > \"$4.pid\"\ncat \"$4\"\nexec sleep 30";
/// Like [`LINGERING`] but closes stdout first, so readers see EOF while the
/// process keeps running.
pub const LINGERING_DETACHED: &str = "echo $$ > \"$4.pid\"\ncat \"$4\"\nexec sleep 30 >&-";

/// Pid written by [`LINGERING`] or [`LINGERING_DETACHED`] for `input`.
pub fn recorded_pid(input: &Path) -> u32 {
    let mut path = input.as_os_str().to_owned();
    path.push(".pid");
    std::fs::read_to_string(PathBuf::from(path))
        .expect("read decoder pid file")
        .trim()
        .parse()
        .expect("decoder pid")
}

/// Whether `pid` still names a live process.
pub fn process_alive(pid: u32) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("kill -0 {pid}"))
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Install an executable `/bin/sh` script in `dir` and return its path.
pub fn install_fake_decoder(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake decoder");
    let mut permissions = std::fs::metadata(&path)
        .expect("fake decoder metadata")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).expect("make fake decoder executable");
    path
}
