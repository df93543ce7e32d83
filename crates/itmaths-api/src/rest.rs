//! REST client for the remote exam platform.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use itmaths_core::error::BackendError;
use itmaths_core::model::{Choice, Exam, Question};
use itmaths_core::shuffle::choice_label;
use itmaths_core::traits::{ExamBackend, HistoryEntry, SubmitRequest};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the exam platform's REST API.
pub struct RestBackend {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                BackendError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::AuthenticationFailed(body));
        }
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::NotFound(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status,
                message: body,
            });
        }

        Ok(response)
    }
}

/// Question as served on the wire. The correct short-answer value may be a
/// JSON number or a string; both normalize to the model's raw string.
#[derive(Debug, Deserialize)]
struct QuestionDto {
    id: u64,
    question_type: String,
    content: String,
    #[serde(default)]
    choices: Vec<ChoiceDto>,
    #[serde(default)]
    short_answer: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChoiceDto {
    id: u64,
    #[serde(default)]
    label: Option<String>,
    content: String,
    #[serde(default)]
    correct: bool,
}

impl QuestionDto {
    fn into_model(self) -> Result<Question, BackendError> {
        let kind = self.question_type.parse().map_err(|e: String| {
            BackendError::ApiError {
                status: 0,
                message: format!("question {}: {e}", self.id),
            }
        })?;

        let choices = self
            .choices
            .into_iter()
            .enumerate()
            .map(|(index, c)| Choice {
                id: c.id,
                label: c.label.unwrap_or_else(|| choice_label(index)),
                content: c.content,
                correct: c.correct,
            })
            .collect();

        let short_answer = self.short_answer.map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(Question {
            id: self.id,
            kind,
            content: self.content,
            choices,
            short_answer,
        })
    }
}

fn decode_error(e: reqwest::Error) -> BackendError {
    BackendError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}

#[async_trait]
impl ExamBackend for RestBackend {
    fn name(&self) -> &str {
        "rest"
    }

    #[instrument(skip(self))]
    async fn list_exams(&self) -> Result<Vec<Exam>, BackendError> {
        let response = self.send(self.get("/api/exams")).await?;
        response.json().await.map_err(decode_error)
    }

    #[instrument(skip(self))]
    async fn fetch_exam(&self, exam_id: u64) -> Result<Exam, BackendError> {
        let response = self.send(self.get(&format!("/api/exams/{exam_id}"))).await?;
        response.json().await.map_err(decode_error)
    }

    #[instrument(skip(self))]
    async fn fetch_questions(&self, exam_id: u64) -> Result<Vec<Question>, BackendError> {
        let response = self
            .send(self.get(&format!("/api/exams/{exam_id}/questions")))
            .await?;
        let dtos: Vec<QuestionDto> = response.json().await.map_err(decode_error)?;
        dtos.into_iter().map(QuestionDto::into_model).collect()
    }

    #[instrument(skip(self, request), fields(exam_id = request.exam_id))]
    async fn submit_result(&self, request: &SubmitRequest) -> Result<(), BackendError> {
        let builder = self
            .authorize(
                self.client
                    .post(format!("{}/api/exams/{}/results", self.base_url, request.exam_id)),
            )
            .json(request);
        self.send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, user: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        let response = self
            .send(self.get(&format!("/api/users/{user}/history")))
            .await?;
        response.json().await.map_err(decode_error)
    }

    #[instrument(skip(self))]
    async fn delete_history(&self, user: &str) -> Result<(), BackendError> {
        let builder = self.authorize(
            self.client
                .delete(format!("{}/api/users/{user}/history", self.base_url)),
        );
        self.send(builder).await?;
        Ok(())
    }
}
