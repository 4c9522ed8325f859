//! Uploads bank statements to the analysis service.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::analysis::FinanceAnalysis;
use crate::error::AnalysisError;

const DEFAULT_FAILURE: &str = "Failed to analyze statements";

#[derive(Deserialize)]
struct AnalysisEnvelope {
    result: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct AnalysisClient {
    http: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// POST every file as a `files` multipart field and return the
    /// validated analysis.
    pub async fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<FinanceAnalysis, AnalysisError> {
        if paths.is_empty() {
            return Err(AnalysisError::NoFiles);
        }

        let mut form = Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| AnalysisError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name(path)));
        }

        tracing::info!(files = paths.len(), endpoint = %self.endpoint, "Uploading statements");
        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            tracing::error!(status = status.as_u16(), %message, "Statement analysis failed");
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: AnalysisEnvelope = resp.json().await?;
        let analysis: FinanceAnalysis = serde_json::from_value(envelope.result)
            .map_err(|e| AnalysisError::Malformed(e.to_string()))?;
        analysis.validate()?;
        Ok(analysis)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".into())
}
