//! Shared helpers for the judge integration tests.
//!
//! Bots are small `/bin/sh` scripts written into a tempdir, so every test
//! exercises the real process pipeline end-to-end.

#![allow(dead_code)]

use gomoku_judge::config::JudgeConfig;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes an executable `/bin/sh` bot script into `dir`.
pub fn script_bot(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create bot script");
    writeln!(file, "#!/bin/sh").expect("write shebang");
    file.write_all(body.as_bytes()).expect("write bot body");
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("make script executable");
    }

    path
}

/// A config with short deadlines so failure paths finish quickly.
pub fn fast_config() -> JudgeConfig {
    JudgeConfig::new(2, 2, 1, 3, 10)
}
