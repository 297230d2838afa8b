//! Repomix-backed context provider.
//!
//! Runs the packer (by default `npx repomix -i .env`) in the project directory
//! and returns the file it writes. Nothing is cached: every call re-runs the
//! command, so the output always reflects the working tree as it is now.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use lumina_core::context::provider::ContextProvider;
use lumina_types::config::ContextConfig;
use lumina_types::error::ContextError;

/// Context provider that shells out to repomix.
#[derive(Debug, Clone)]
pub struct RepomixContextProvider {
    command: String,
    args: Vec<String>,
    output_file: PathBuf,
    working_dir: Option<PathBuf>,
}

impl RepomixContextProvider {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            output_file: PathBuf::from(&config.output_file),
            working_dir: config.working_dir.clone(),
        }
    }

    /// Where the packed output is read from.
    pub fn output_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) => dir.join(&self.output_file),
            None => self.output_file.clone(),
        }
    }
}

impl ContextProvider for RepomixContextProvider {
    fn name(&self) -> &str {
        "repomix"
    }

    async fn generate_output(&self) -> Result<String, ContextError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            // Timeouts and cancellation drop this future; the child must not outlive it.
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| ContextError::Failed(format!("failed to run repomix: {e}")))?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ContextError::Failed(format!(
                "failed to run repomix: {} (output: {combined})",
                output.status
            )));
        }

        let path = self.output_path();
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            ContextError::Failed(format!("failed to read repomix output file: {e}"))
        })?;
        // Packed sources may hold arbitrary bytes; the blob is opaque.
        let content = String::from_utf8_lossy(&bytes).into_owned();

        debug!(path = %path.display(), bytes = content.len(), "Repomix output read");
        Ok(content)
    }
}
