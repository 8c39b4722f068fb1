//! Conversion of certificate markup into PDF documents.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use certificate_core::PageOptions;
use tokio::process::Command;

/// Default time allowed for a single conversion.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum stderr bytes kept in a conversion error.
const MAX_STDERR_BYTES: usize = 2048;

/// Errors raised while converting markup to a document.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Converter produced no PDF output")]
    EmptyOutput,
}

/// Turns HTML markup into a fixed-layout document.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, markup: &str, options: &PageOptions) -> Result<Vec<u8>, ConvertError>;
}

/// Converter driving a headless Chromium through `--print-to-pdf`.
///
/// Page options reach the browser as an injected `@page` stylesheet.
#[derive(Debug, Clone)]
pub struct ChromiumConverter {
    executable: PathBuf,
    timeout: Duration,
}

impl ChromiumConverter {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl DocumentConverter for ChromiumConverter {
    async fn convert(&self, markup: &str, options: &PageOptions) -> Result<Vec<u8>, ConvertError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("certificate.html");
        let output = workdir.path().join("certificate.pdf");

        tokio::fs::write(&input, options.apply(markup)).await?;

        let result = tokio::time::timeout(self.timeout, self.command(&input, &output).output())
            .await
            .map_err(|_| ConvertError::Timeout(self.timeout))??;

        if !result.status.success() {
            let mut stderr = String::from_utf8_lossy(&result.stderr).into_owned();
            if stderr.len() > MAX_STDERR_BYTES {
                let mut cut = MAX_STDERR_BYTES;
                while !stderr.is_char_boundary(cut) {
                    cut -= 1;
                }
                stderr.truncate(cut);
            }
            return Err(ConvertError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }

        let pdf = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConvertError::EmptyOutput),
            Err(e) => return Err(e.into()),
        };

        if !pdf.starts_with(b"%PDF") {
            return Err(ConvertError::EmptyOutput);
        }

        Ok(pdf)
    }
}
