//! Exam API seam used by the dashboard

use crate::dashboard::view::ExamRecord;
use crate::error::{ClinicError, Result};
use crate::registry::{ExamRegistry, ExamStore, NewExam};
use async_trait::async_trait;
use serde::Deserialize;

/// Path of the exam collection
pub const EXAMS_PATH: &str = "/exames";

/// Operations the dashboard needs from the registry
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// Fetch every exam
    async fn list_exams(&self) -> Result<Vec<ExamRecord>>;

    /// Register a new exam
    async fn create_exam(&self, request: &NewExam) -> Result<ExamRecord>;
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Exam API over HTTP
#[derive(Debug, Clone)]
pub struct HttpExamApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExamApi {
    /// Client for a server such as `http://127.0.0.1:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Client reusing an existing `reqwest` client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, EXAMS_PATH)
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    async fn list_exams(&self) -> Result<Vec<ExamRecord>> {
        let url = self.url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClinicError::network(&url, e.to_string()))?
            .error_for_status()?;

        Ok(response.json::<Vec<ExamRecord>>().await?)
    }

    async fn create_exam(&self, request: &NewExam) -> Result<ExamRecord> {
        let url = self.url();
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClinicError::network(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // A body that is not a JSON object is a broken exchange, not a rejection.
            let body = response
                .json::<ErrorBody>()
                .await
                .map_err(|e| ClinicError::Serialization(format!("{status} error body: {e}")))?;
            return Err(ClinicError::server(status.as_u16(), body.message));
        }

        Ok(response.json::<ExamRecord>().await?)
    }
}

/// In-process access, used when the dashboard runs next to the registry
#[async_trait]
impl<S: ExamStore> ExamApi for ExamRegistry<S> {
    async fn list_exams(&self) -> Result<Vec<ExamRecord>> {
        Ok(ExamRegistry::<S>::list_exams(self)
            .into_iter()
            .map(ExamRecord::from)
            .collect())
    }

    async fn create_exam(&self, request: &NewExam) -> Result<ExamRecord> {
        ExamRegistry::<S>::create_exam(self, request.clone()).map(ExamRecord::from)
    }
}

#[async_trait]
impl<A: ExamApi + ?Sized> ExamApi for std::sync::Arc<A> {
    async fn list_exams(&self) -> Result<Vec<ExamRecord>> {
        (**self).list_exams().await
    }

    async fn create_exam(&self, request: &NewExam) -> Result<ExamRecord> {
        (**self).create_exam(request).await
    }
}
