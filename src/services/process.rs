use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::models::{Candidate, UserProfile};
use crate::services::scorer::{parse_candidates, ScorerError};

/// Scorer backed by a local inference script
///
/// Runs `<python> <script> --model <model> --profile <json> --top_k <k>` and
/// reads a JSON array of candidates from stdout. The model is considered
/// available when the model file exists.
#[derive(Debug, Clone)]
pub struct ProcessScorer {
    python_path: String,
    script_path: PathBuf,
    model_path: PathBuf,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessScorer {
    pub fn new(
        python_path: impl Into<String>,
        script_path: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            python_path: python_path.into(),
            script_path: script_path.into(),
            model_path: model_path.into(),
            working_dir: None,
            timeout,
        }
    }

    /// Run the script from `dir` instead of the service's working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub async fn is_available(&self) -> bool {
        tokio::fs::try_exists(&self.model_path).await.unwrap_or(false)
    }

    pub async fn recommend(
        &self,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<Candidate>, ScorerError> {
        let profile_json = serde_json::to_string(profile)?;

        let mut cmd = Command::new(&self.python_path);
        cmd.arg(&self.script_path)
            .arg("--model")
            .arg(&self.model_path)
            .arg("--profile")
            .arg(&profile_json)
            .arg("--top_k")
            .arg(top_k.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            "Running scorer: {} {} (top_k={})",
            self.python_path,
            self.script_path.display(),
            top_k
        );

        // Dropping the output future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ScorerError::Timeout(self.timeout.as_secs()))?
            .map_err(ScorerError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("Scorer process failed: {}", stderr);
            return Err(ScorerError::ProcessFailed {
                code: output.status.code(),
                stderr,
            });
        }

        parse_candidates(&output.stdout)
    }
}
