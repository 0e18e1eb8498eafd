//! Access to photo metadata through an external tag tool.
//!
//! The pipeline only talks to [`MetadataGateway`]; [`ExifTool`] is the
//! subprocess-backed implementation used by the binary.

use crate::config::ToolConfig;
use crate::error::{PhotoGpsError, Result};
use crate::timestamp;
use regex::Regex;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::debug;

fn updated_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+) image files? updated").expect("static pattern")
    })
}

/// Sum of the `N image files updated` counts, if the tool printed any.
fn updated_count(lines: &[String]) -> Option<u64> {
    lines
        .iter()
        .filter_map(|l| updated_pattern().captures(l))
        .filter_map(|c| c[1].parse::<u64>().ok())
        .reduce(|a, b| a + b)
}

pub trait MetadataGateway {
    /// Capture time in epoch seconds, or `None` when the file carries none.
    fn read_creation_time(&self, path: &Path) -> Result<Option<i64>>;

    fn has_location_tag(&self, path: &Path) -> Result<bool>;

    /// Copies the location tag group from `src` into `dst` and returns the
    /// tool's console output.
    ///
    /// Fails with [`PhotoGpsError::SourceMissingLocationTag`] if `src` has no
    /// location tags at call time.
    fn copy_location_tag(&self, src: &Path, dst: &Path) -> Result<Vec<String>>;

    /// Deletes the backup files the tool left behind under `root`.
    fn strip_original_backups(&self, root: &Path) -> Result<Vec<String>>;

    /// The cleanup invocation as an operator would type it.
    fn strip_command(&self, root: &Path) -> String {
        format!("exiftool -r -delete_original! '{}'", root.display())
    }

    /// Checks that the tool can be run at all.
    fn probe(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct ToolOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(self.stderr.trim_end());
        }
        out
    }
}

/// Runs `exiftool` (or a compatible program) once per operation.
#[derive(Debug, Clone)]
pub struct ExifTool {
    config: ToolConfig,
}

impl ExifTool {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    fn run(&self, args: &[&OsStr]) -> Result<ToolOutput> {
        let command = self.describe(args);
        debug!(%command, "running metadata tool");
        let output = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => PhotoGpsError::ToolNotFound {
                    program: self.config.program.clone(),
                },
                _ => PhotoGpsError::ExternalToolFailure {
                    command: command.clone(),
                    output: e.to_string(),
                },
            })?;

        let result = ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        // Killed by a signal: nothing the caller can interpret.
        if output.status.code().is_none() {
            return Err(PhotoGpsError::ExternalToolFailure {
                command,
                output: result.combined(),
            });
        }
        Ok(result)
    }

    fn run_checked(&self, args: &[&OsStr]) -> Result<ToolOutput> {
        let output = self.run(args)?;
        if !output.success {
            return Err(PhotoGpsError::ExternalToolFailure {
                command: self.describe(args),
                output: output.combined(),
            });
        }
        Ok(output)
    }

    fn describe(&self, args: &[&OsStr]) -> String {
        let mut parts = vec![self.config.program.clone()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

impl MetadataGateway for ExifTool {
    fn read_creation_time(&self, path: &Path) -> Result<Option<i64>> {
        let output = self.run(&[OsStr::new(&self.config.creation_tag), path.as_os_str()])?;
        Ok(output
            .stdout
            .lines()
            .next()
            .and_then(timestamp::parse_creation_line))
    }

    fn has_location_tag(&self, path: &Path) -> Result<bool> {
        let output = self.run(&[OsStr::new(&self.config.location_tag), path.as_os_str()])?;
        Ok(!output.lines().is_empty())
    }

    fn copy_location_tag(&self, src: &Path, dst: &Path) -> Result<Vec<String>> {
        if !self.has_location_tag(src)? {
            return Err(PhotoGpsError::SourceMissingLocationTag(src.to_path_buf()));
        }
        let args = [
            OsStr::new("-tagsFromFile"),
            src.as_os_str(),
            OsStr::new(&self.config.location_tag),
            dst.as_os_str(),
        ];
        let output = self.run_checked(&args)?;
        let lines = output.lines();
        // Exit 0 with nothing written, e.g. "Warning: No writable tags set".
        if updated_count(&lines) == Some(0) {
            return Err(PhotoGpsError::ExternalToolFailure {
                command: self.describe(&args),
                output: output.combined(),
            });
        }
        Ok(lines)
    }

    fn strip_original_backups(&self, root: &Path) -> Result<Vec<String>> {
        let output = self.run_checked(&[
            OsStr::new("-r"),
            OsStr::new("-delete_original!"),
            root.as_os_str(),
        ])?;
        Ok(output.lines())
    }

    fn strip_command(&self, root: &Path) -> String {
        format!(
            "{} -r -delete_original! '{}'",
            self.config.program,
            root.display()
        )
    }

    fn probe(&self) -> Result<()> {
        self.run_checked(&[OsStr::new("-ver")]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // A child forked while another test still holds a script open for
    // writing fails with ETXTBSY; spawns in this module take turns.
    static SPAWN: Mutex<()> = Mutex::new(());

    fn spawn_lock() -> MutexGuard<'static, ()> {
        SPAWN.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tool(program: &str) -> ExifTool {
        ExifTool::new(ToolConfig {
            program: program.to_string(),
            ..ToolConfig::default()
        })
    }

    #[test]
    fn missing_program_is_tool_not_found() {
        let _guard = spawn_lock();
        let err = tool("photogps-no-such-tool-7c1f").probe().unwrap_err();
        assert!(matches!(err, PhotoGpsError::ToolNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn strip_command_names_root() {
        let cmd = tool("exiftool").strip_command(Path::new("/photos/trip"));
        assert_eq!(cmd, "exiftool -r -delete_original! '/photos/trip'");
    }

    #[test]
    fn combined_output_keeps_stderr() {
        let out = ToolOutput {
            success: false,
            stdout: "    0 image files updated\n".into(),
            stderr: "Error: File not found - x.jpg\n".into(),
        };
        assert_eq!(
            out.combined(),
            "    0 image files updated\nError: File not found - x.jpg"
        );
        assert_eq!(out.lines(), vec!["    0 image files updated".to_string()]);
    }

    #[test]
    fn counts_updated_files() {
        let lines = |v: &[&str]| v.iter().map(|l| l.to_string()).collect::<Vec<_>>();
        assert_eq!(updated_count(&lines(&["    1 image files updated"])), Some(1));
        assert_eq!(
            updated_count(&lines(&["    0 image files updated", "    1 image files unchanged"])),
            Some(0)
        );
        assert_eq!(updated_count(&lines(&["Warning: something"])), None);
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use tempfile::TempDir;

        const DATED: &str = "/photos/dated.jpg";
        const SRC: &str = "/photos/src.jpg";
        const DST: &str = "/photos/dst.jpg";

        /// A stand-in for exiftool that logs its arguments, one call per line.
        struct FakeTool {
            dir: TempDir,
            tool: ExifTool,
        }

        impl FakeTool {
            /// `copy` is the shell branch run for `-tagsFromFile`.
            fn new(copy: &str) -> Self {
                let dir = tempfile::tempdir().unwrap();
                let script = dir.path().join("exiftool");
                let body = format!(
                    r#"#!/bin/sh
printf '%s\n' "$*" >> '{log}'
case "$1" in
  -CreateDate)
    if [ "$2" = '{DATED}' ]; then echo 'Create Date                     : 2015:06:14 12:34:56'; fi ;;
  "-GPS*")
    if [ "$2" = '{SRC}' ]; then echo 'GPS Latitude                    : 52.37 N'; fi ;;
  -tagsFromFile)
    {copy} ;;
  -r)
    echo '    2 image files deleted' ;;
esac
exit 0
"#,
                    log = dir.path().join("calls.log").display(),
                );
                fs::write(&script, body).unwrap();
                fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
                let tool = tool(script.to_str().unwrap());
                Self { dir, tool }
            }

            fn calls(&self) -> Vec<String> {
                fs::read_to_string(self.dir.path().join("calls.log"))
                    .unwrap_or_default()
                    .lines()
                    .map(str::to_string)
                    .collect()
            }
        }

        fn p(s: &str) -> PathBuf {
            PathBuf::from(s)
        }

        #[test]
        fn reads_presence_from_stdout_only() {
            let _guard = spawn_lock();
            let fake = FakeTool::new("true");

            assert_eq!(
                fake.tool.read_creation_time(&p(DATED)).unwrap(),
                Some(1_434_285_296)
            );
            assert_eq!(fake.tool.read_creation_time(&p(DST)).unwrap(), None);
            assert!(fake.tool.has_location_tag(&p(SRC)).unwrap());
            assert!(!fake.tool.has_location_tag(&p(DST)).unwrap());
            assert_eq!(fake.calls()[0], format!("-CreateDate {DATED}"));
        }

        #[test]
        fn copy_passes_source_filter_then_destination() {
            let _guard = spawn_lock();
            let fake = FakeTool::new("echo '    1 image files updated'");

            let lines = fake.tool.copy_location_tag(&p(SRC), &p(DST)).unwrap();
            assert_eq!(lines, vec!["    1 image files updated".to_string()]);
            assert_eq!(
                fake.calls(),
                vec![
                    format!("-GPS* {SRC}"),
                    format!("-tagsFromFile {SRC} -GPS* {DST}"),
                ]
            );
        }

        #[test]
        fn copy_from_untagged_source_is_refused() {
            let _guard = spawn_lock();
            let fake = FakeTool::new("echo '    1 image files updated'");

            let err = fake.tool.copy_location_tag(&p(DST), &p(SRC)).unwrap_err();
            assert!(matches!(err, PhotoGpsError::SourceMissingLocationTag(ref s) if *s == p(DST)));
            assert!(fake.calls().iter().all(|c| !c.starts_with("-tagsFromFile")));
        }

        #[test]
        fn non_zero_exit_attaches_stdout_and_stderr() {
            let _guard = spawn_lock();
            let fake = FakeTool::new(
                "echo '    0 image files updated'; echo 'Error: Not a valid JPG' >&2; exit 1",
            );

            match fake.tool.copy_location_tag(&p(SRC), &p(DST)).unwrap_err() {
                PhotoGpsError::ExternalToolFailure { command, output } => {
                    assert!(command.ends_with(&format!("-tagsFromFile {SRC} -GPS* {DST}")));
                    assert!(output.contains("0 image files updated"));
                    assert!(output.contains("Error: Not a valid JPG"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn zero_files_updated_is_a_failure() {
            let _guard = spawn_lock();
            let fake = FakeTool::new(
                "echo 'Warning: No writable tags set' >&2; echo '    0 image files updated'",
            );

            let err = fake.tool.copy_location_tag(&p(SRC), &p(DST)).unwrap_err();
            assert!(!err.is_fatal());
            match err {
                PhotoGpsError::ExternalToolFailure { output, .. } => {
                    assert!(output.contains("No writable tags set"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn strip_deletes_backups_recursively() {
            let _guard = spawn_lock();
            let fake = FakeTool::new("true");

            let lines = fake.tool.strip_original_backups(&p("/photos")).unwrap();
            assert_eq!(lines, vec!["    2 image files deleted".to_string()]);
            assert_eq!(fake.calls(), vec!["-r -delete_original! /photos".to_string()]);
            fake.tool.probe().unwrap();
        }
    }
}
