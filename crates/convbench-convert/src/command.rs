//! Converter backed by an external command-line program.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use convbench_core::{ConversionInput, ConvertError, Converter};

/// Default wall-clock bound on one subprocess conversion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Converter`] that shells out to an external program.
///
/// `{input}` and `{output}` placeholders in the argument list are replaced
/// with per-invocation temp-file paths before the program runs; `{outdir}`
/// expands to the invocation's working directory (for tools that only take
/// an output directory, LibreOffice style). Availability means the
/// configured program resolves to an executable.
///
/// The wall-clock timeout lives here: the dispatching layer above carries
/// none, so an unbounded subprocess would stall its whole batch.
pub struct CommandConverter {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    output_extension: String,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            output_extension: "pdf".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into();
        self
    }

    async fn run(&self, input: &ConversionInput) -> Result<Vec<u8>, ConvertError> {
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join(input.file_name());
        tokio::fs::write(&input_path, input.bytes()).await?;
        let output_path = workdir
            .path()
            .join(format!("{}.{}", input.stem(), self.output_extension));

        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(
                arg.replace("{input}", &input_path.to_string_lossy())
                    .replace("{output}", &output_path.to_string_lossy())
                    .replace("{outdir}", &workdir.path().to_string_lossy()),
            );
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            converter = %self.name,
            program = %self.program.display(),
            "spawning converter process"
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ConvertError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Failed(format!(
                "{} exited with {}: {}",
                self.name,
                output.status,
                stderr.trim()
            )));
        }

        tokio::fs::read(&output_path).await.map_err(|e| {
            ConvertError::Failed(format!("{} produced no output file: {e}", self.name))
        })
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        // Explicit paths must point at an executable; bare program names
        // are resolved against PATH.
        if self.program.components().count() > 1 {
            is_executable(&self.program)
        } else {
            resolve_on_path(&self.program).is_some()
        }
    }

    fn convert<'a>(
        &'a self,
        input: &'a ConversionInput,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, ConvertError>> + Send + 'a>> {
        Box::pin(self.run(input))
    }

    fn output_extension(&self) -> &str {
        &self.output_extension
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn resolve_on_path(program: &Path) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ConversionInput {
        ConversionInput::new("doc.txt", b"payload bytes".to_vec())
    }

    #[test]
    fn availability_probes_path_and_filesystem() {
        let on_path = CommandConverter::new("sh", "sh", vec![]);
        assert!(on_path.is_available());

        let missing = CommandConverter::new("ghost", "/nonexistent/converter", vec![]);
        assert!(!missing.is_available());

        let bare_missing = CommandConverter::new("ghost2", "definitely-not-a-binary", vec![]);
        assert!(!bare_missing.is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_command_round_trips_bytes() {
        let converter = CommandConverter::new(
            "copy",
            "sh",
            vec!["-c".into(), "cp {input} {output}".into()],
        )
        .with_output_extension("pdf");

        let out = converter.convert(&input()).await.unwrap();
        assert_eq!(out, b"payload bytes");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_stderr() {
        let converter = CommandConverter::new(
            "doomed",
            "sh",
            vec!["-c".into(), "echo render error >&2; exit 3".into()],
        );

        let err = converter.convert(&input()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("doomed"), "{message}");
        assert!(message.contains("render error"), "{message}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_output_file_is_a_failure() {
        // Command succeeds but writes nothing.
        let converter = CommandConverter::new("noop", "sh", vec!["-c".into(), "true".into()]);
        let err = converter.convert(&input()).await.unwrap_err();
        assert!(err.to_string().contains("produced no output file"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let converter = CommandConverter::new("sleepy", "sh", vec!["-c".into(), "sleep 5".into()])
            .with_timeout(Duration::from_millis(100));

        let err = converter.convert(&input()).await.unwrap_err();
        assert!(matches!(err, ConvertError::Timeout(_)));
    }
}
