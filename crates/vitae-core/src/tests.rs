//! Form session tests against an in-memory backend.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
};

use bytes::Bytes;
use chrono::Utc;

use crate::{
  Error,
  backend::ResumeBackend,
  document::{EntrySection, ResumeDocument, WorkExperience},
  session::{AlertLevel, FormSession, Operation, PendingCall, SessionState},
  wire::{
    DEFAULT_TITLE, ExperienceLevel, JobDescriptionRequest, JobDescriptionResponse,
    NewVersion, PdfUpload, ResumeDetail, ResumeId, ResumeRecord, ResumeSubmission,
    ShareId, ShareLink, ShareRequest, SharedResume, SkillsRequest, SkillsResponse,
    SummaryRequest, SummaryResponse, Template, TemplateId, VersionId, VersionRecord,
    VersionSummary,
  },
};

// ─── Fake backend ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake backend failure in {0}")]
struct FakeError(&'static str);

#[derive(Default)]
struct FakeState {
  calls:        Vec<&'static str>,
  failing:      HashSet<&'static str>,
  summary:      String,
  descriptions: Vec<String>,
  skills:       Vec<String>,
  detail:       Option<ResumeDetail>,
  parsed:       ResumeDocument,
  versions:     Vec<VersionSummary>,
  summaries:    Vec<SummaryRequest>,
  submissions:  Vec<(Option<ResumeId>, ResumeSubmission)>,
  new_versions: Vec<NewVersion>,
}

#[derive(Default)]
struct FakeBackend {
  state: Mutex<FakeState>,
}

impl FakeBackend {
  fn with(f: impl FnOnce(&mut FakeState)) -> Arc<Self> {
    let backend = Self::default();
    f(&mut backend.state.lock().unwrap());
    Arc::new(backend)
  }

  fn record(&self, call: &'static str) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(call);
    if state.failing.contains(call) {
      return Err(FakeError(call));
    }
    Ok(())
  }

  fn calls(&self) -> Vec<&'static str> { self.state.lock().unwrap().calls.clone() }

  fn set_failing(&self, call: &'static str, failing: bool) {
    let mut state = self.state.lock().unwrap();
    if failing {
      state.failing.insert(call);
    } else {
      state.failing.remove(call);
    }
  }
}

fn record(id: ResumeId, title: &str) -> ResumeRecord {
  ResumeRecord {
    id,
    user_id: 1,
    title: title.to_string(),
    current_template_id: None,
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

impl ResumeBackend for FakeBackend {
  type Error = FakeError;

  async fn list_resumes(&self) -> Result<Vec<ResumeRecord>, FakeError> {
    self.record("list_resumes")?;
    Ok(Vec::new())
  }

  async fn get_resume(&self, id: ResumeId) -> Result<ResumeDetail, FakeError> {
    self.record("get_resume")?;
    let detail = self.state.lock().unwrap().detail.clone();
    detail.filter(|d| d.record.id == id).ok_or(FakeError("get_resume"))
  }

  async fn create_resume(
    &self,
    submission: ResumeSubmission,
  ) -> Result<ResumeRecord, FakeError> {
    self.record("create_resume")?;
    let title = submission.title.clone();
    self.state.lock().unwrap().submissions.push((None, submission));
    Ok(record(42, &title))
  }

  async fn update_resume(
    &self,
    id: ResumeId,
    submission: ResumeSubmission,
  ) -> Result<ResumeRecord, FakeError> {
    self.record("update_resume")?;
    let title = submission.title.clone();
    self.state.lock().unwrap().submissions.push((Some(id), submission));
    Ok(record(id, &title))
  }

  async fn delete_resume(&self, _id: ResumeId) -> Result<(), FakeError> {
    self.record("delete_resume")
  }

  async fn list_versions(
    &self,
    _resume_id: ResumeId,
  ) -> Result<Vec<VersionSummary>, FakeError> {
    self.record("list_versions")?;
    Ok(self.state.lock().unwrap().versions.clone())
  }

  async fn create_version(&self, version: NewVersion) -> Result<VersionRecord, FakeError> {
    self.record("create_version")?;
    let out = VersionRecord {
      id:             100 + i64::from(version.version_number),
      resume_id:      version.resume_id,
      version_number: Some(version.version_number),
      created_at:     Utc::now(),
      updated_at:     Utc::now(),
    };
    self.state.lock().unwrap().new_versions.push(version);
    Ok(out)
  }

  async fn download_pdf(&self, _version_id: VersionId) -> Result<Bytes, FakeError> {
    self.record("download_pdf")?;
    Ok(Bytes::from_static(b"%PDF-1.7"))
  }

  async fn list_templates(&self) -> Result<Vec<Template>, FakeError> {
    self.record("list_templates")?;
    Ok(Vec::new())
  }

  async fn get_template(&self, _id: TemplateId) -> Result<Template, FakeError> {
    self.record("get_template")?;
    Err(FakeError("get_template"))
  }

  async fn generate_summary(
    &self,
    request: SummaryRequest,
  ) -> Result<SummaryResponse, FakeError> {
    self.record("generate_summary")?;
    let mut state = self.state.lock().unwrap();
    state.summaries.push(request);
    Ok(SummaryResponse {
      content: state.summary.clone(),
    })
  }

  async fn improve_job(
    &self,
    _request: JobDescriptionRequest,
  ) -> Result<JobDescriptionResponse, FakeError> {
    self.record("improve_job")?;
    Ok(JobDescriptionResponse {
      descriptions: self.state.lock().unwrap().descriptions.clone(),
    })
  }

  async fn suggest_skills(
    &self,
    _request: SkillsRequest,
  ) -> Result<SkillsResponse, FakeError> {
    self.record("suggest_skills")?;
    Ok(SkillsResponse {
      skills: self.state.lock().unwrap().skills.clone(),
    })
  }

  async fn import_pdf(&self, _upload: PdfUpload) -> Result<ResumeDocument, FakeError> {
    self.record("import_pdf")?;
    Ok(self.state.lock().unwrap().parsed.clone())
  }

  async fn create_share_link(&self, request: ShareRequest) -> Result<ShareLink, FakeError> {
    self.record("create_share_link")?;
    Ok(ShareLink {
      id:              1,
      resume_id:       request.resume_id,
      share_token:     "tok".into(),
      created_at:      Utc::now(),
      version_id:      request.version_id,
      expiration_date: request.expiration_date,
    })
  }

  async fn list_share_links(&self) -> Result<Vec<ShareLink>, FakeError> {
    self.record("list_share_links")?;
    Ok(Vec::new())
  }

  async fn deactivate_share_link(&self, _id: ShareId) -> Result<(), FakeError> {
    self.record("deactivate_share_link")
  }

  async fn get_shared_resume(&self, _token: String) -> Result<SharedResume, FakeError> {
    self.record("get_shared_resume")?;
    Err(FakeError("get_shared_resume"))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn session(backend: &Arc<FakeBackend>) -> FormSession<FakeBackend> {
  FormSession::new(Arc::clone(backend))
}

/// A session with name, email and a complete primary job.
fn filled(backend: &Arc<FakeBackend>) -> FormSession<FakeBackend> {
  let mut s = session(backend);
  s.edit("personal_info.name", "Ada Lovelace").unwrap();
  s.edit("personal_info.email", "ada@example.com").unwrap();
  s.edit("work_experience[0].title", "Engineer").unwrap();
  s.edit("work_experience[0].company", "Analytical Engines").unwrap();
  s.edit("work_experience[0].start_date", "2019").unwrap();
  s.edit("work_experience[0].end_date", "2023").unwrap();
  s.edit("work_experience[0].responsibilities[0]", "Wrote programs")
    .unwrap();
  s
}

fn pdf() -> PdfUpload {
  PdfUpload {
    file_name: "cv.pdf".into(),
    bytes:     Bytes::from_static(b"%PDF-1.4 fake"),
  }
}

// ─── Editing ─────────────────────────────────────────────────────────────────

#[test]
fn new_session_starts_from_empty_document() {
  let backend = Arc::new(FakeBackend::default());
  let s = session(&backend);
  assert_eq!(s.document(), &ResumeDocument::empty());
  assert_eq!(s.title(), DEFAULT_TITLE);
  assert_eq!(s.state(), SessionState::Editing);
  assert!(s.resume_id().is_none());
}

#[test]
fn rejected_edit_keeps_document_and_warns() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  let before = s.document().clone();

  assert!(matches!(
    s.edit("work_experience[3].title", "x"),
    Err(Error::IndexOutOfRange { .. })
  ));
  assert!(s.edit("personal_info.nickname", "x").is_err());
  assert!(matches!(
    s.remove_entry(EntrySection::Education, 0),
    Err(Error::FloorViolation(_))
  ));

  assert_eq!(s.document(), &before);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Warning));
}

#[test]
fn estimated_years_reads_work_history() {
  let backend = Arc::new(FakeBackend::default());
  let s = filled(&backend);
  assert_eq!(s.estimated_years(), 4);
}

// ─── Generation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_requires_name_and_job_title() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);
  s.edit("personal_info.name", "Ada").unwrap();

  let err = s.generate_summary().await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(err.is_local());
  assert!(backend.calls().is_empty());
  assert!(!s.is_busy(Operation::Summary));
}

#[tokio::test]
async fn summary_request_uses_placeholder_skills() {
  let backend = FakeBackend::with(|st| st.summary = "Seasoned engineer.".into());
  let mut s = filled(&backend);

  s.generate_summary().await.unwrap();

  assert_eq!(s.document().summary, "Seasoned engineer.");
  let state = backend.state.lock().unwrap();
  let request = &state.summaries[0];
  assert_eq!(request.job_title, "Engineer");
  assert_eq!(request.experience_years, 4);
  assert_eq!(request.skills, vec!["your key skills"]);
}

#[tokio::test]
async fn failed_summary_leaves_document_and_allows_retry() {
  let backend = FakeBackend::with(|st| {
    st.summary = "Generated.".into();
    st.failing.insert("generate_summary");
  });
  let mut s = filled(&backend);
  s.edit("summary", "Mine").unwrap();
  let before = s.document().clone();

  let err = s.generate_summary().await.unwrap_err();
  assert!(matches!(err, Error::Collaborator(_)));
  assert_eq!(s.document(), &before);
  assert!(!s.is_busy(Operation::Summary));
  let Some(alert) = s.alert() else { panic!("expected an alert") };
  assert_eq!(alert.level, AlertLevel::Danger);

  backend.set_failing("generate_summary", false);
  s.generate_summary().await.unwrap();
  assert_eq!(s.document().summary, "Generated.");
}

#[tokio::test]
async fn second_begin_of_same_operation_is_busy() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);

  let call = s.begin_summary().unwrap();
  assert!(matches!(s.begin_summary(), Err(Error::Busy(Operation::Summary))));
  // Other operations are independent.
  let skills = s.begin_suggest_skills(ExperienceLevel::Senior).unwrap();
  assert_eq!(s.in_flight(), vec![Operation::Summary, Operation::Skills]);

  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();
  assert!(!s.is_busy(Operation::Summary));
  assert!(s.is_busy(Operation::Skills));
  s.begin_summary().unwrap();

  let completion = skills.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();
  assert!(!s.is_busy(Operation::Skills));
}

#[tokio::test]
async fn merge_applies_to_document_at_completion() {
  let backend = FakeBackend::with(|st| st.summary = "Generated.".into());
  let mut s = filled(&backend);

  let call = s.begin_summary().unwrap();
  // The user keeps typing while the request is in flight.
  s.edit("personal_info.phone", "555-0100").unwrap();
  s.add_skill("Rust").unwrap();

  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  let doc = s.document();
  assert_eq!(doc.summary, "Generated.");
  assert_eq!(doc.personal_info.phone, "555-0100");
  assert_eq!(doc.skills, vec!["Rust"]);
}

#[tokio::test]
async fn improve_job_requires_filled_entry() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  s.edit("work_experience[0].responsibilities[0]", "   ").unwrap();

  assert!(matches!(s.improve_job(0).await, Err(Error::Validation(_))));
  assert!(matches!(
    s.improve_job(5).await,
    Err(Error::IndexOutOfRange { index: 5, .. })
  ));
  assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn improve_job_replaces_responsibilities() {
  let backend = FakeBackend::with(|st| {
    st.descriptions = vec!["Designed the first algorithm".into(), "Led reviews".into()];
  });
  let mut s = filled(&backend);

  let call = s.begin_improve_job(0).unwrap();
  assert_eq!(s.improving_job(), Some(0));
  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  assert_eq!(s.improving_job(), None);
  assert_eq!(s.document().work_experience[0].responsibilities, vec![
    "Designed the first algorithm",
    "Led reviews"
  ]);
}

#[tokio::test]
async fn improve_job_with_empty_result_is_a_no_op() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  let before = s.document().clone();

  s.improve_job(0).await.unwrap();

  assert_eq!(s.document(), &before);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Info));
}

/// Three complete jobs: "First", "Second" and "Third".
fn three_jobs(backend: &Arc<FakeBackend>) -> FormSession<FakeBackend> {
  let mut s = filled(backend);
  s.edit("work_experience[0].title", "First").unwrap();
  s.edit("work_experience[0].responsibilities[0]", "First duty").unwrap();
  for (i, title) in [(1, "Second"), (2, "Third")] {
    s.add_entry(EntrySection::WorkExperience);
    s.edit(&format!("work_experience[{i}].title"), title).unwrap();
    s.edit(&format!("work_experience[{i}].company"), "Babbage & Co").unwrap();
    s.edit(
      &format!("work_experience[{i}].responsibilities[0]"),
      format!("{title} duty"),
    )
    .unwrap();
  }
  s
}

#[tokio::test]
async fn improve_job_removed_while_in_flight_is_discarded() {
  let backend = FakeBackend::with(|st| st.descriptions = vec!["Generated".into()]);
  let mut s = three_jobs(&backend);

  let call = s.begin_improve_job(1).unwrap();
  s.remove_entry(EntrySection::WorkExperience, 1).unwrap();
  assert_eq!(s.improving_job(), None);
  let before = s.document().clone();

  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  assert_eq!(s.document(), &before);
  let third = &s.document().work_experience[1];
  assert_eq!(third.title, "Third");
  assert_eq!(third.responsibilities, vec!["Third duty"]);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Info));
  assert!(!s.is_busy(Operation::ImproveJob));
}

#[tokio::test]
async fn improve_job_follows_its_entry_when_earlier_jobs_go() {
  let backend = FakeBackend::with(|st| st.descriptions = vec!["Generated".into()]);
  let mut s = three_jobs(&backend);

  let call = s.begin_improve_job(2).unwrap();
  s.remove_entry(EntrySection::WorkExperience, 1).unwrap();
  assert_eq!(s.improving_job(), Some(1));

  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  let jobs = &s.document().work_experience;
  assert_eq!(jobs.len(), 2);
  assert_eq!(jobs[0].responsibilities, vec!["First duty"]);
  assert_eq!(jobs[1].title, "Third");
  assert_eq!(jobs[1].responsibilities, vec!["Generated"]);
}

#[tokio::test]
async fn improve_job_is_dropped_when_document_is_replaced() {
  let parsed = ResumeDocument {
    work_experience: vec![WorkExperience {
      title: "Imported".into(),
      responsibilities: vec!["Imported duty".into()],
      ..WorkExperience::default()
    }],
    ..ResumeDocument::default()
  };
  let backend = FakeBackend::with(|st| {
    st.descriptions = vec!["Generated".into()];
    st.parsed = parsed;
  });
  let mut s = three_jobs(&backend);

  let improve = s.begin_improve_job(0).unwrap();
  let import = s.begin_import(pdf()).unwrap();
  let completion = import.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();
  let completion = improve.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  let jobs = &s.document().work_experience;
  assert_eq!(jobs.len(), 1);
  assert_eq!(jobs[0].responsibilities, vec!["Imported duty"]);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Info));
}

#[tokio::test]
async fn suggested_skills_merge_without_duplicates() {
  let backend = FakeBackend::with(|st| {
    st.skills = vec!["python".into(), "SQL".into(), "Python".into()];
  });
  let mut s = filled(&backend);
  s.add_skill("Python").unwrap();

  s.suggest_skills(ExperienceLevel::default()).await.unwrap();

  assert_eq!(s.document().skills, vec!["Python", "SQL"]);
  let Some(alert) = s.alert() else { panic!("expected an alert") };
  assert_eq!(alert.message, "Added 1 suggested skills to your resume.");
}

#[tokio::test]
async fn skills_need_a_primary_job_title() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);
  assert!(matches!(
    s.suggest_skills(ExperienceLevel::Junior).await,
    Err(Error::Validation(_))
  ));
  assert!(backend.calls().is_empty());
}

// ─── Load and import ─────────────────────────────────────────────────────────

#[tokio::test]
async fn load_hydrates_and_normalizes() {
  let content = ResumeDocument {
    summary: "Stored".into(),
    work_experience: vec![WorkExperience {
      title: "Engineer".into(),
      ..WorkExperience::default()
    }],
    ..ResumeDocument::default()
  };
  let backend = FakeBackend::with(|st| {
    st.detail = Some(ResumeDetail {
      record:   record(7, "Stored resume"),
      content:  Some(content),
      versions: Vec::new(),
    });
  });
  let mut s = session(&backend);

  s.load(7).await.unwrap();

  assert_eq!(s.resume_id(), Some(7));
  assert_eq!(s.title(), "Stored resume");
  assert_eq!(s.state(), SessionState::Saved);
  let doc = s.document();
  assert_eq!(doc.summary, "Stored");
  assert_eq!(doc.education.len(), 1);
  assert_eq!(doc.work_experience[0].responsibilities, vec![""]);
}

#[tokio::test]
async fn failed_load_keeps_fresh_document() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);

  assert!(matches!(s.load(9).await, Err(Error::Collaborator(_))));
  assert_eq!(s.document(), &ResumeDocument::empty());
  assert!(s.resume_id().is_none());
}

#[tokio::test]
async fn import_checks_file_before_uploading() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);
  let upload = PdfUpload {
    file_name: "cv.docx".into(),
    bytes:     Bytes::from_static(b"PK\x03\x04"),
  };

  assert!(matches!(s.import_pdf(upload).await, Err(Error::Validation(_))));
  assert!(backend.calls().is_empty());
  assert!(!s.is_busy(Operation::Import));
}

#[tokio::test]
async fn import_replaces_document() {
  let parsed = ResumeDocument {
    personal_info: crate::document::PersonalInfo {
      name: "Grace Hopper".into(),
      ..Default::default()
    },
    skills: vec!["COBOL".into()],
    ..ResumeDocument::default()
  };
  let backend = FakeBackend::with(|st| st.parsed = parsed);
  let mut s = filled(&backend);

  s.import_pdf(pdf()).await.unwrap();

  let doc = s.document();
  assert_eq!(doc.personal_info.name, "Grace Hopper");
  assert_eq!(doc.skills, vec!["COBOL"]);
  assert_eq!(doc.work_experience.len(), 1);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Success));
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_requires_name_and_email() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);
  s.edit("personal_info.email", "ada@example.com").unwrap();

  let err = s.submit().await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(backend.calls().is_empty());
  assert_eq!(s.state(), SessionState::Editing);
}

#[tokio::test]
async fn submit_creates_then_updates() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  s.set_title("   ");
  s.set_template(Some(3));

  s.submit().await.unwrap();
  assert_eq!(s.resume_id(), Some(42));
  assert_eq!(s.state(), SessionState::Saved);

  s.edit("summary", "Updated").unwrap();
  assert_eq!(s.state(), SessionState::Editing);
  s.submit().await.unwrap();

  assert_eq!(backend.calls(), vec!["create_resume", "update_resume"]);
  let state = backend.state.lock().unwrap();
  let (first_id, first) = &state.submissions[0];
  assert_eq!(*first_id, None);
  assert_eq!(first.title, DEFAULT_TITLE);
  assert_eq!(first.current_template_id, Some(3));
  let (second_id, second) = &state.submissions[1];
  assert_eq!(*second_id, Some(42));
  assert_eq!(second.content.summary, "Updated");
}

#[tokio::test]
async fn failed_submit_stays_editing() {
  let backend = FakeBackend::with(|st| {
    st.failing.insert("create_resume");
  });
  let mut s = filled(&backend);

  assert!(s.submit().await.is_err());
  assert_eq!(s.state(), SessionState::Editing);
  assert!(s.resume_id().is_none());
  assert!(!s.is_busy(Operation::Submit));
}

#[tokio::test]
async fn submit_accepts_any_non_empty_name_and_email() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = session(&backend);
  s.edit("personal_info.name", " ").unwrap();
  s.edit("personal_info.email", " ").unwrap();

  s.submit().await.unwrap();
  assert_eq!(backend.calls(), vec!["create_resume"]);
}

#[tokio::test]
async fn edits_made_while_saving_stay_unsaved() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);

  let call = s.begin_submit().unwrap();
  s.edit("summary", "typed after save started").unwrap();
  let completion = call.execute(backend.as_ref()).await;
  s.complete(completion).unwrap();

  assert_eq!(s.resume_id(), Some(42));
  assert_eq!(s.state(), SessionState::Editing);
  assert_eq!(s.alert().map(|a| a.level), Some(AlertLevel::Info));
  let state = backend.state.lock().unwrap();
  assert_eq!(state.submissions[0].1.content.summary, "");
}

#[tokio::test]
async fn pending_submit_targets_existing_resume() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  s.submit().await.unwrap();

  let Ok(PendingCall::Submit { resume_id, .. }) = s.begin_submit() else {
    panic!("expected a submit call");
  };
  assert_eq!(resume_id, Some(42));
}

// ─── Versions and sharing ────────────────────────────────────────────────────

#[tokio::test]
async fn versions_and_shares_need_a_saved_resume() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);

  assert!(matches!(s.save_version(None).await, Err(Error::Validation(_))));
  assert!(matches!(s.create_share_link().await, Err(Error::Validation(_))));
  assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn save_version_numbers_after_existing() {
  let backend = FakeBackend::with(|st| {
    st.versions = vec![
      VersionSummary {
        resume_id:      42,
        version_number: 1,
        description:    None,
      },
      VersionSummary {
        resume_id:      42,
        version_number: 2,
        description:    Some("tailored".into()),
      },
    ];
  });
  let mut s = filled(&backend);
  s.submit().await.unwrap();

  let version = s.save_version(Some("final".into())).await.unwrap();

  assert_eq!(version.version_number, Some(3));
  let state = backend.state.lock().unwrap();
  let created = &state.new_versions[0];
  assert_eq!(created.resume_id, 42);
  assert_eq!(created.description.as_deref(), Some("final"));
  assert_eq!(created.content.personal_info.name, "Ada Lovelace");
}

#[tokio::test]
async fn share_link_for_saved_resume() {
  let backend = Arc::new(FakeBackend::default());
  let mut s = filled(&backend);
  s.submit().await.unwrap();

  let link = s.create_share_link().await.unwrap();
  assert_eq!(link.resume_id, 42);
  assert_eq!(link.url("http://localhost:3000"), "http://localhost:3000/share/resume/tok");
}
