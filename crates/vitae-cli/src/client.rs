//! Async HTTP client wrapping the resume builder's JSON API.

use std::{
  path::PathBuf,
  sync::{Arc, RwLock},
  time::Duration,
};

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};
use vitae_core::{
  backend::ResumeBackend,
  document::ResumeDocument,
  wire::{
    JobDescriptionRequest, JobDescriptionResponse, NewAccount, NewVersion, PdfUpload,
    ResumeDetail, ResumeId, ResumeRecord, ResumeSubmission, ShareId, ShareLink,
    ShareRequest, SharedResume, SharedView, SkillsRequest, SkillsResponse, SummaryRequest,
    SummaryResponse, Template, TemplateId, User, VersionId, VersionRecord, VersionSummary,
  },
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("not logged in or session expired; run `vitae login`")]
  Unauthorized,

  #[error("server returned {status}: {detail}")]
  Status { status: u16, detail: String },

  #[error("malformed response from {endpoint}: {source}")]
  Malformed {
    endpoint: String,
    #[source]
    source:   serde_json::Error,
  },

  #[error("request to {endpoint} failed: {source}")]
  Transport {
    endpoint: String,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{0}")]
  InvalidUpload(String),

  #[error("token file {path:?}: {source}")]
  TokenFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

// ─── Token store ─────────────────────────────────────────────────────────────

/// Bearer token persisted in a file between invocations.
#[derive(Debug)]
pub struct TokenStore {
  path:  PathBuf,
  token: RwLock<Option<String>>,
}

impl TokenStore {
  /// Read the token file at `path`; a missing file means logged out.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let token = match std::fs::read_to_string(&path) {
      Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(source) => return Err(ClientError::TokenFile { path, source }),
    };
    Ok(Self {
      path,
      token: RwLock::new(token),
    })
  }

  pub fn get(&self) -> Option<String> {
    self.token.read().ok().and_then(|t| t.clone())
  }

  pub fn save(&self, token: &str) -> Result<()> {
    let io_err = |source: std::io::Error| ClientError::TokenFile {
      path: self.path.clone(),
      source,
    };
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&self.path, token).map_err(io_err)?;
    if let Ok(mut slot) = self.token.write() {
      *slot = Some(token.to_string());
    }
    Ok(())
  }

  /// Forget the token in memory and on disk.
  pub fn clear(&self) -> Result<()> {
    if let Ok(mut slot) = self.token.write() {
      *slot = None;
    }
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(ClientError::TokenFile {
        path: self.path.clone(),
        source,
      }),
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:   String,
  pub token_path: PathBuf,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  detail: serde_json::Value,
}

/// Pull a human-readable message out of an error body. FastAPI wraps it in
/// `{"detail": …}`; anything else is returned trimmed.
fn error_detail(body: &str) -> String {
  match serde_json::from_str::<ErrorBody>(body) {
    Ok(ErrorBody {
      detail: serde_json::Value::String(s),
    }) => s,
    Ok(ErrorBody { detail }) => detail.to_string(),
    Err(_) => body.trim().to_string(),
  }
}

/// Async HTTP client for the resume API.
///
/// Cheap to clone: the inner [`reqwest::Client`] and token store are shared.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  tokens:   Arc<TokenStore>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .map_err(|source| ClientError::Transport {
        endpoint: config.base_url.clone(),
        source,
      })?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      tokens: Arc::new(TokenStore::open(config.token_path)?),
    })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  pub fn is_logged_in(&self) -> bool { self.tokens.get().is_some() }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.tokens.get() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and map every non-2xx status to an error. A 401 clears the
  /// stored token.
  async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Response> {
    debug!(endpoint, "sending request");
    let resp = self
      .auth(req)
      .send()
      .await
      .map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
      })?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
      warn!(endpoint, "unauthorized; clearing stored token");
      self.tokens.clear()?;
      return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      let detail = error_detail(&body);
      warn!(endpoint, status = status.as_u16(), %detail, "request failed");
      return Err(ClientError::Status {
        status: status.as_u16(),
        detail,
      });
    }
    Ok(resp)
  }

  /// Send `req` and decode the JSON body as `T`.
  async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, req: RequestBuilder) -> Result<T> {
    let resp = self.send(endpoint, req).await?;
    let body = resp.text().await.map_err(|source| ClientError::Transport {
      endpoint: endpoint.to_string(),
      source,
    })?;
    serde_json::from_str(&body).map_err(|source| ClientError::Malformed {
      endpoint: endpoint.to_string(),
      source,
    })
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /auth/token`: exchange credentials for a bearer token and store it.
  pub async fn login(&self, email: &str, password: &str) -> Result<()> {
    let endpoint = "POST /auth/token";
    let resp = self
      .client
      .post(self.url("/auth/token"))
      .form(&[("username", email), ("password", password)])
      .send()
      .await
      .map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
      })?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
      return Err(ClientError::Status {
        status: status.as_u16(),
        detail: error_detail(&body),
      });
    }
    let token: TokenResponse =
      serde_json::from_str(&body).map_err(|source| ClientError::Malformed {
        endpoint: endpoint.to_string(),
        source,
      })?;
    self.tokens.save(&token.access_token)
  }

  pub fn logout(&self) -> Result<()> { self.tokens.clear() }

  /// `POST /auth/register`: create an account. Does not log in.
  pub async fn register(&self, email: &str, password: &str) -> Result<User> {
    let account = NewAccount {
      email:    email.to_string(),
      password: password.to_string(),
    };
    self
      .fetch(
        "POST /auth/register",
        self.client.post(self.url("/auth/register")).json(&account),
      )
      .await
  }

  /// `GET /auth/me`
  pub async fn current_user(&self) -> Result<User> {
    self
      .fetch("GET /auth/me", self.client.get(self.url("/auth/me")))
      .await
  }
}

impl ResumeBackend for ApiClient {
  type Error = ClientError;

  // ── Resumes ───────────────────────────────────────────────────────────────

  /// `GET /resume/list`
  async fn list_resumes(&self) -> Result<Vec<ResumeRecord>> {
    self
      .fetch("GET /resume/list", self.client.get(self.url("/resume/list")))
      .await
  }

  /// `GET /resume/{id}`
  async fn get_resume(&self, id: ResumeId) -> Result<ResumeDetail> {
    self
      .fetch(
        "GET /resume/{id}",
        self.client.get(self.url(&format!("/resume/{id}"))),
      )
      .await
  }

  /// `POST /resume/create_with_content`
  async fn create_resume(&self, submission: ResumeSubmission) -> Result<ResumeRecord> {
    self
      .fetch(
        "POST /resume/create_with_content",
        self
          .client
          .post(self.url("/resume/create_with_content"))
          .json(&submission),
      )
      .await
  }

  /// `PUT /resume/{id}`
  async fn update_resume(
    &self,
    id: ResumeId,
    submission: ResumeSubmission,
  ) -> Result<ResumeRecord> {
    self
      .fetch(
        "PUT /resume/{id}",
        self
          .client
          .put(self.url(&format!("/resume/{id}")))
          .json(&submission),
      )
      .await
  }

  /// `DELETE /resume/{id}`
  async fn delete_resume(&self, id: ResumeId) -> Result<()> {
    self
      .send(
        "DELETE /resume/{id}",
        self.client.delete(self.url(&format!("/resume/{id}"))),
      )
      .await?;
    Ok(())
  }

  // ── Versions ──────────────────────────────────────────────────────────────

  /// `GET /resume/versions/{resume_id}`
  async fn list_versions(&self, resume_id: ResumeId) -> Result<Vec<VersionSummary>> {
    self
      .fetch(
        "GET /resume/versions/{id}",
        self
          .client
          .get(self.url(&format!("/resume/versions/{resume_id}"))),
      )
      .await
  }

  /// `POST /resume/version/create`
  async fn create_version(&self, version: NewVersion) -> Result<VersionRecord> {
    self
      .fetch(
        "POST /resume/version/create",
        self
          .client
          .post(self.url("/resume/version/create"))
          .json(&version),
      )
      .await
  }

  /// `GET /resume/download/{version_id}`
  async fn download_pdf(&self, version_id: VersionId) -> Result<Bytes> {
    let endpoint = "GET /resume/download/{id}";
    let resp = self
      .send(
        endpoint,
        self
          .client
          .get(self.url(&format!("/resume/download/{version_id}"))),
      )
      .await?;
    resp.bytes().await.map_err(|source| ClientError::Transport {
      endpoint: endpoint.to_string(),
      source,
    })
  }

  // ── Templates ─────────────────────────────────────────────────────────────

  /// `GET /template/list`
  async fn list_templates(&self) -> Result<Vec<Template>> {
    self
      .fetch("GET /template/list", self.client.get(self.url("/template/list")))
      .await
  }

  /// `GET /template/{id}`
  async fn get_template(&self, id: TemplateId) -> Result<Template> {
    self
      .fetch(
        "GET /template/{id}",
        self.client.get(self.url(&format!("/template/{id}"))),
      )
      .await
  }

  // ── Generation ────────────────────────────────────────────────────────────

  /// `POST /ai/generate-summary`
  async fn generate_summary(&self, request: SummaryRequest) -> Result<SummaryResponse> {
    self
      .fetch(
        "POST /ai/generate-summary",
        self
          .client
          .post(self.url("/ai/generate-summary"))
          .json(&request),
      )
      .await
  }

  /// `POST /ai/generate-job-descriptions`
  async fn improve_job(
    &self,
    request: JobDescriptionRequest,
  ) -> Result<JobDescriptionResponse> {
    self
      .fetch(
        "POST /ai/generate-job-descriptions",
        self
          .client
          .post(self.url("/ai/generate-job-descriptions"))
          .json(&request),
      )
      .await
  }

  /// `POST /ai/get-relevant-skills`
  async fn suggest_skills(&self, request: SkillsRequest) -> Result<SkillsResponse> {
    self
      .fetch(
        "POST /ai/get-relevant-skills",
        self
          .client
          .post(self.url("/ai/get-relevant-skills"))
          .json(&request),
      )
      .await
  }

  // ── Import ────────────────────────────────────────────────────────────────

  /// `POST /resume/upload-pdf` (multipart field `file`)
  async fn import_pdf(&self, upload: PdfUpload) -> Result<ResumeDocument> {
    upload.validate().map_err(ClientError::InvalidUpload)?;

    let endpoint = "POST /resume/upload-pdf";
    let part = multipart::Part::bytes(upload.bytes.to_vec())
      .file_name(upload.file_name)
      .mime_str("application/pdf")
      .map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
      })?;
    let form = multipart::Form::new().part("file", part);
    self
      .fetch(
        endpoint,
        self.client.post(self.url("/resume/upload-pdf")).multipart(form),
      )
      .await
  }

  // ── Sharing ───────────────────────────────────────────────────────────────

  /// `POST /share/generate`
  async fn create_share_link(&self, request: ShareRequest) -> Result<ShareLink> {
    self
      .fetch(
        "POST /share/generate",
        self.client.post(self.url("/share/generate")).json(&request),
      )
      .await
  }

  /// `GET /share/list`
  async fn list_share_links(&self) -> Result<Vec<ShareLink>> {
    self
      .fetch("GET /share/list", self.client.get(self.url("/share/list")))
      .await
  }

  /// `PUT /share/deactivate/{id}`
  async fn deactivate_share_link(&self, id: ShareId) -> Result<()> {
    let _: bool = self
      .fetch(
        "PUT /share/deactivate/{id}",
        self.client.put(self.url(&format!("/share/deactivate/{id}"))),
      )
      .await?;
    Ok(())
  }

  /// `GET /share/resume/{token}`
  async fn get_shared_resume(&self, token: String) -> Result<SharedResume> {
    let view: SharedView = self
      .fetch(
        "GET /share/resume/{token}",
        self.client.get(self.url(&format!("/share/resume/{token}"))),
      )
      .await?;
    Ok(view.resume)
  }
}
