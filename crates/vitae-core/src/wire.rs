//! Request and response schemas exchanged with the backend.
//!
//! Every collaborator call has an explicit pair here; responses are
//! deserialized into these types at the boundary and anything that does not
//! fit is rejected there.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::document::ResumeDocument;

/// Backend-assigned resume identifier.
pub type ResumeId = i64;
/// Backend-assigned template identifier.
pub type TemplateId = i64;
/// Backend-assigned version identifier.
pub type VersionId = i64;
/// Backend-assigned share link identifier.
pub type ShareId = i64;

/// Title used when the user leaves the title blank.
pub const DEFAULT_TITLE: &str = "My Resume";

/// Largest PDF accepted for import.
pub const MAX_PDF_BYTES: usize = 5 * 1024 * 1024;

// ─── Resumes ─────────────────────────────────────────────────────────────────

/// The unit handed to persistence on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSubmission {
  pub title:               String,
  pub current_template_id: Option<TemplateId>,
  pub content:             ResumeDocument,
}

/// A persisted resume as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
  pub id:                  ResumeId,
  pub user_id:             i64,
  pub title:               String,
  pub current_template_id: Option<TemplateId>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

/// A persisted resume fetched for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDetail {
  #[serde(flatten)]
  pub record:   ResumeRecord,
  /// Latest content; absent for a resume created without content.
  #[serde(default)]
  pub content:  Option<ResumeDocument>,
  #[serde(default)]
  pub versions: Vec<VersionRecord>,
}

// ─── Versions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
  pub id:             VersionId,
  pub resume_id:      ResumeId,
  pub version_number: Option<i32>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// One row of the version listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
  pub resume_id:      ResumeId,
  pub version_number: i32,
  #[serde(default)]
  pub description:    Option<String>,
}

/// The version number that follows every entry in `versions`.
pub fn next_version_number(versions: &[VersionSummary]) -> i32 {
  versions.iter().map(|v| v.version_number).max().unwrap_or(0) + 1
}

/// Input to [`ResumeBackend::create_version`](crate::backend::ResumeBackend::create_version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVersion {
  pub resume_id:      ResumeId,
  pub version_number: i32,
  pub description:    Option<String>,
  pub content:        ResumeDocument,
}

// ─── Templates ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
  pub id:          TemplateId,
  pub name:        String,
  pub description: String,
  /// e.g. "software_engineer"; templates without one are "general".
  pub role_type:   Option<String>,
  #[serde(default)]
  pub is_default:  bool,
  /// Only populated by the detail endpoint.
  #[serde(default)]
  pub html_content: Option<String>,
  #[serde(default)]
  pub css_content:  Option<String>,
}

impl Template {
  pub fn role(&self) -> &str { self.role_type.as_deref().unwrap_or("general") }
}

/// Group templates by role type, keeping first-seen order of roles and of
/// templates within a role.
pub fn group_by_role(templates: &[Template]) -> Vec<(&str, Vec<&Template>)> {
  let mut groups: Vec<(&str, Vec<&Template>)> = Vec::new();
  for template in templates {
    match groups.iter().position(|(role, _)| *role == template.role()) {
      Some(i) => groups[i].1.push(template),
      None => groups.push((template.role(), vec![template])),
    }
  }
  groups
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// `POST /ai/generate-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
  pub job_title:        String,
  pub experience_years: i32,
  pub skills:           Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
  pub content: String,
}

/// `POST /ai/generate-job-descriptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionRequest {
  pub job_title:        String,
  pub company_name:     String,
  pub responsibilities: Vec<String>,
  pub years_experience: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionResponse {
  pub descriptions: Vec<String>,
}

/// Seniority hint for skill suggestions.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExperienceLevel {
  Junior,
  #[default]
  MidLevel,
  Senior,
}

/// `POST /ai/get-relevant-skills`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsRequest {
  pub job_title:        String,
  pub experience_level: ExperienceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsResponse {
  pub skills: Vec<String>,
}

// ─── PDF import ──────────────────────────────────────────────────────────────

/// A PDF file selected for import.
#[derive(Debug, Clone)]
pub struct PdfUpload {
  pub file_name: String,
  pub bytes:     Bytes,
}

impl PdfUpload {
  /// Check the upload before anything is sent: non-empty, PDF magic, size
  /// limit. Returns a user-facing message on failure.
  pub fn validate(&self) -> Result<(), String> {
    if self.bytes.is_empty() {
      return Err("Please select a PDF file to upload.".into());
    }
    if !self.bytes.starts_with(b"%PDF-") {
      return Err("Please select a PDF file.".into());
    }
    if self.bytes.len() > MAX_PDF_BYTES {
      return Err("File size exceeds 5MB limit.".into());
    }
    Ok(())
  }
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

/// `POST /share/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRequest {
  pub resume_id:       ResumeId,
  pub version_id:      Option<VersionId>,
  pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
  pub id:              ShareId,
  pub resume_id:       ResumeId,
  pub share_token:     String,
  pub created_at:      DateTime<Utc>,
  #[serde(default)]
  pub version_id:      Option<VersionId>,
  #[serde(default)]
  pub expiration_date: Option<DateTime<Utc>>,
}

impl ShareLink {
  /// Public URL for this link under `base_url`.
  pub fn url(&self, base_url: &str) -> String {
    format!(
      "{}/share/resume/{}",
      base_url.trim_end_matches('/'),
      self.share_token
    )
  }
}

/// `GET /share/resume/{token}` wraps the shared resume in `{"resume": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedView {
  pub resume: SharedResume,
}

/// A resume as the recipient of a share link sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedResume {
  pub id:       ResumeId,
  pub title:    String,
  pub version:  SharedVersion,
  pub template: SharedTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedVersion {
  pub id:             VersionId,
  pub version_number: Option<i32>,
  #[serde(default)]
  pub label:          Option<String>,
  /// Sent without a timezone, so kept as text.
  pub created_at:     String,
  #[serde(default)]
  pub content:        ResumeDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedTemplate {
  pub id:   Option<TemplateId>,
  pub name: String,
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
  pub email:    String,
  pub password: String,
}

/// The account behind the current token (`GET /auth/me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub email:      String,
  #[serde(default)]
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn template(id: TemplateId, role: Option<&str>) -> Template {
    Template {
      id,
      name: format!("t{id}"),
      description: String::new(),
      role_type: role.map(str::to_string),
      is_default: false,
      html_content: None,
      css_content: None,
    }
  }

  #[test]
  fn templates_group_by_role_in_first_seen_order() {
    let templates = [
      template(1, Some("data_scientist")),
      template(2, None),
      template(3, Some("data_scientist")),
    ];
    let groups = group_by_role(&templates);
    let summary: Vec<(&str, Vec<TemplateId>)> = groups
      .iter()
      .map(|(role, ts)| (*role, ts.iter().map(|t| t.id).collect()))
      .collect();
    assert_eq!(summary, vec![("data_scientist", vec![1, 3]), ("general", vec![2])]);
  }

  #[test]
  fn next_version_number_follows_the_highest() {
    let v = |n| VersionSummary {
      resume_id:      1,
      version_number: n,
      description:    None,
    };
    assert_eq!(next_version_number(&[]), 1);
    assert_eq!(next_version_number(&[v(1), v(3), v(2)]), 4);
  }

  #[test]
  fn experience_level_uses_kebab_case() {
    let req = SkillsRequest {
      job_title:        "Data Scientist".into(),
      experience_level: ExperienceLevel::default(),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["experience_level"], "mid-level");
    assert_eq!("senior".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Senior);
  }

  #[test]
  fn resume_detail_accepts_missing_content() {
    let detail: ResumeDetail = serde_json::from_value(serde_json::json!({
      "id": 7,
      "user_id": 1,
      "title": "Draft",
      "current_template_id": null,
      "created_at": "2024-03-01T10:00:00Z",
      "updated_at": "2024-03-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(detail.record.id, 7);
    assert!(detail.content.is_none());
    assert!(detail.versions.is_empty());
  }

  #[test]
  fn summary_response_requires_content() {
    let r = serde_json::from_str::<SummaryResponse>(r#"{"text":"hi"}"#);
    assert!(r.is_err());
  }

  #[test]
  fn pdf_upload_validation() {
    let ok = PdfUpload {
      file_name: "cv.pdf".into(),
      bytes:     Bytes::from_static(b"%PDF-1.7 ..."),
    };
    assert!(ok.validate().is_ok());

    let not_pdf = PdfUpload {
      file_name: "cv.pdf".into(),
      bytes:     Bytes::from_static(b"PK\x03\x04"),
    };
    assert!(not_pdf.validate().is_err());

    let mut big = b"%PDF-".to_vec();
    big.resize(MAX_PDF_BYTES + 1, b' ');
    let too_big = PdfUpload {
      file_name: "cv.pdf".into(),
      bytes:     Bytes::from(big),
    };
    assert_eq!(too_big.validate().unwrap_err(), "File size exceeds 5MB limit.");
  }

  #[test]
  fn share_url_joins_base_and_token() {
    let link = ShareLink {
      id:              1,
      resume_id:       2,
      share_token:     "abc".into(),
      created_at:      Utc::now(),
      version_id:      None,
      expiration_date: None,
    };
    assert_eq!(
      link.url("http://localhost:8000/"),
      "http://localhost:8000/share/resume/abc"
    );
  }

  #[test]
  fn shared_view_accepts_naive_timestamps_and_partial_content() {
    let body = r#"{"resume": {
      "id": 3,
      "title": "Backend CV",
      "version": {
        "id": 9,
        "version_number": 2,
        "label": null,
        "created_at": "2024-05-01T12:00:00.123456",
        "content": {"summary": "Builds things"}
      },
      "template": {"id": null, "name": "Default"}
    }}"#;
    let view: SharedView = serde_json::from_str(body).unwrap();
    let resume = view.resume;
    assert_eq!(resume.title, "Backend CV");
    assert_eq!(resume.version.version_number, Some(2));
    assert_eq!(resume.version.content.summary, "Builds things");
    assert!(resume.version.content.skills.is_empty());
    assert_eq!(resume.template.id, None);
  }
}
