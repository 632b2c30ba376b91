//! Form session: the owned state of one resume being edited.
//!
//! Synchronous edits replace the held document atomically. Calls to the
//! backend are split in three steps so the front end can keep editing while
//! a request is in flight:
//!
//! 1. `begin_*` validates, raises the operation's busy flag and returns a
//!    [`PendingCall`];
//! 2. [`PendingCall::execute`] performs the request (it may be spawned);
//! 3. [`FormSession::complete`] lowers the flag and merges the result into
//!    the document as it is at that moment, or reports the failure.
//!
//! The `async` convenience methods (`generate_summary`, `submit`, …) chain
//! the three steps.

use std::{collections::HashSet, sync::Arc};

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  address::FieldAddress,
  backend::ResumeBackend,
  document::{EntrySection, ResumeDocument},
  experience,
  wire::{
    DEFAULT_TITLE, ExperienceLevel, JobDescriptionRequest, JobDescriptionResponse,
    NewVersion, PdfUpload, ResumeDetail, ResumeId, ResumeRecord, ResumeSubmission,
    ShareLink, ShareRequest, SkillsRequest, SkillsResponse, SummaryRequest,
    SummaryResponse, TemplateId, VersionRecord, next_version_number,
  },
};

/// Skills sent for summary generation when the resume lists none.
const PLACEHOLDER_SKILLS: &str = "your key skills";

// ─── Operations and alerts ───────────────────────────────────────────────────

/// A kind of backend call. At most one call of each kind is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Operation {
  #[strum(to_string = "loading")]
  Load,
  #[strum(to_string = "PDF import")]
  Import,
  #[strum(to_string = "summary generation")]
  Summary,
  #[strum(to_string = "job description improvement")]
  ImproveJob,
  #[strum(to_string = "skill suggestion")]
  Skills,
  #[strum(to_string = "saving")]
  Submit,
  #[strum(to_string = "version snapshot")]
  Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AlertLevel {
  Success,
  Info,
  Warning,
  Danger,
}

/// The message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
  pub level:   AlertLevel,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  /// The document differs from what was last persisted (or was never saved).
  Editing,
  /// The document matches the last accepted submission or load.
  Saved,
}

// ─── Pending calls ───────────────────────────────────────────────────────────

/// A backend request prepared by a `begin_*` method.
#[derive(Debug, Clone)]
pub enum PendingCall {
  Load(ResumeId),
  Import(PdfUpload),
  Summary(SummaryRequest),
  ImproveJob(JobDescriptionRequest),
  Skills(SkillsRequest),
  Submit {
    resume_id:  Option<ResumeId>,
    submission: ResumeSubmission,
  },
}

/// The outcome of a [`PendingCall`], fed back through
/// [`FormSession::complete`].
#[derive(Debug)]
pub enum Completion<E> {
  Load(Result<ResumeDetail, E>),
  Import(Result<ResumeDocument, E>),
  Summary(Result<SummaryResponse, E>),
  ImproveJob(Result<JobDescriptionResponse, E>),
  Skills(Result<SkillsResponse, E>),
  Submit(Result<ResumeRecord, E>),
}

impl PendingCall {
  pub fn operation(&self) -> Operation {
    match self {
      Self::Load(_) => Operation::Load,
      Self::Import(_) => Operation::Import,
      Self::Summary(_) => Operation::Summary,
      Self::ImproveJob(_) => Operation::ImproveJob,
      Self::Skills(_) => Operation::Skills,
      Self::Submit { .. } => Operation::Submit,
    }
  }

  /// Perform the request. Never touches a session.
  pub async fn execute<B: ResumeBackend>(self, backend: &B) -> Completion<B::Error> {
    debug!(operation = %self.operation(), "executing backend call");
    match self {
      Self::Load(id) => Completion::Load(backend.get_resume(id).await),
      Self::Import(upload) => Completion::Import(backend.import_pdf(upload).await),
      Self::Summary(request) => {
        Completion::Summary(backend.generate_summary(request).await)
      }
      Self::ImproveJob(request) => {
        Completion::ImproveJob(backend.improve_job(request).await)
      }
      Self::Skills(request) => Completion::Skills(backend.suggest_skills(request).await),
      Self::Submit {
        resume_id: Some(id),
        submission,
      } => Completion::Submit(backend.update_resume(id, submission).await),
      Self::Submit {
        resume_id: None,
        submission,
      } => Completion::Submit(backend.create_resume(submission).await),
    }
  }
}

impl<E> Completion<E> {
  pub fn operation(&self) -> Operation {
    match self {
      Self::Load(_) => Operation::Load,
      Self::Import(_) => Operation::Import,
      Self::Summary(_) => Operation::Summary,
      Self::ImproveJob(_) => Operation::ImproveJob,
      Self::Skills(_) => Operation::Skills,
      Self::Submit(_) => Operation::Submit,
    }
  }
}

// ─── FormSession ─────────────────────────────────────────────────────────────

/// The state of one resume form.
pub struct FormSession<B: ResumeBackend> {
  backend:     Arc<B>,
  document:    ResumeDocument,
  title:       String,
  template_id: Option<TemplateId>,
  /// Set once the resume exists on the backend; submissions then update it.
  resume_id:   Option<ResumeId>,
  state:       SessionState,
  /// Bumped by every change to the document, title or template.
  revision:    u64,
  /// Revision captured by the submission in flight.
  submitted:   Option<u64>,
  busy:        HashSet<Operation>,
  /// Job currently being improved. Follows the job when earlier entries are
  /// removed; cleared when the job itself is removed or the document is
  /// replaced, which discards the improvement.
  improving:   Option<usize>,
  alert:       Option<Alert>,
}

impl<B: ResumeBackend> FormSession<B> {
  /// A session for a new resume, starting from [`ResumeDocument::empty`].
  pub fn new(backend: Arc<B>) -> Self {
    Self {
      backend,
      document: ResumeDocument::empty(),
      title: DEFAULT_TITLE.to_string(),
      template_id: None,
      resume_id: None,
      state: SessionState::Editing,
      revision: 0,
      submitted: None,
      busy: HashSet::new(),
      improving: None,
      alert: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn backend(&self) -> &Arc<B> { &self.backend }

  pub fn document(&self) -> &ResumeDocument { &self.document }

  pub fn title(&self) -> &str { &self.title }

  pub fn template_id(&self) -> Option<TemplateId> { self.template_id }

  pub fn resume_id(&self) -> Option<ResumeId> { self.resume_id }

  pub fn state(&self) -> SessionState { self.state }

  pub fn alert(&self) -> Option<&Alert> { self.alert.as_ref() }

  /// Remove and return the current alert (the user dismissed it).
  pub fn take_alert(&mut self) -> Option<Alert> { self.alert.take() }

  pub fn is_busy(&self, operation: Operation) -> bool {
    self.busy.contains(&operation)
  }

  /// Operations currently in flight, in declaration order.
  pub fn in_flight(&self) -> Vec<Operation> {
    Operation::iter().filter(|op| self.busy.contains(op)).collect()
  }

  /// The job whose descriptions are being improved, if any.
  pub fn improving_job(&self) -> Option<usize> { self.improving }

  /// Estimated total years of experience, the default for summary requests.
  pub fn estimated_years(&self) -> i32 {
    experience::estimate_total_years(
      &self.document.work_experience,
      experience::current_year(),
    )
  }

  // ── Internal helpers ──────────────────────────────────────────────────

  fn raise(&mut self, level: AlertLevel, message: impl Into<String>) {
    self.alert = Some(Alert {
      level,
      message: message.into(),
    });
  }

  /// Record a change that has not been persisted.
  fn touch(&mut self) {
    self.revision = self.revision.wrapping_add(1);
    self.state = SessionState::Editing;
  }

  /// Swap in a new document produced from the current one.
  fn replace(&mut self, next: ResumeDocument) {
    self.document = next;
    self.touch();
  }

  /// Apply a document-level operation; on failure keep the current document
  /// and surface the error as a warning.
  fn apply(&mut self, op: impl FnOnce(&ResumeDocument) -> Result<ResumeDocument>) -> Result<()> {
    match op(&self.document) {
      Ok(next) => {
        self.replace(next);
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "edit rejected");
        self.raise(AlertLevel::Warning, e.to_string());
        Err(e)
      }
    }
  }

  fn refuse(&mut self, message: &str) -> Error {
    warn!(message, "request refused locally");
    self.raise(AlertLevel::Warning, message);
    Error::Validation(message.to_string())
  }

  /// Fail with [`Error::Busy`] while `operation` is in flight.
  fn ensure_idle(&mut self, operation: Operation) -> Result<()> {
    if self.busy.contains(&operation) {
      let err = Error::Busy(operation);
      self.raise(AlertLevel::Warning, err.to_string());
      return Err(err);
    }
    Ok(())
  }

  fn acquire(&mut self, operation: Operation) -> Result<()> {
    self.ensure_idle(operation)?;
    self.busy.insert(operation);
    Ok(())
  }

  fn release(&mut self, operation: Operation) {
    self.busy.remove(&operation);
    if operation == Operation::ImproveJob {
      self.improving = None;
    }
  }

  fn collaborator_failure(&mut self, message: &str, e: B::Error) -> Error {
    warn!(error = %e, "{message}");
    self.raise(AlertLevel::Danger, message);
    Error::Collaborator(Box::new(e))
  }

  // ── Hydration ─────────────────────────────────────────────────────────

  /// Replace the document wholesale (a fetched resume or a parsed PDF),
  /// restoring the form invariants.
  pub fn hydrate(&mut self, document: ResumeDocument) {
    if self.improving.take().is_some() {
      debug!("document replaced; pending job improvement will be discarded");
    }
    self.replace(document.normalized());
  }

  pub fn set_title(&mut self, title: impl Into<String>) {
    self.title = title.into();
    self.touch();
  }

  pub fn set_template(&mut self, template_id: Option<TemplateId>) {
    self.template_id = template_id;
    self.touch();
  }

  // ── Field edits ───────────────────────────────────────────────────────

  /// Parse `path` and replace the leaf it names.
  pub fn edit(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
    let value = value.into();
    self.apply(|doc| doc.set(path.parse()?, value))
  }

  pub fn set(&mut self, address: FieldAddress, value: impl Into<String>) -> Result<()> {
    let value = value.into();
    self.apply(|doc| doc.set(address, value))
  }

  pub fn add_entry(&mut self, section: EntrySection) {
    let next = self.document.add_entry(section);
    self.replace(next);
  }

  pub fn remove_entry(&mut self, section: EntrySection, index: usize) -> Result<()> {
    self.apply(|doc| doc.remove_entry(section, index))?;
    if section == EntrySection::WorkExperience {
      self.improving = match self.improving {
        Some(job) if job == index => None,
        Some(job) if job > index => Some(job - 1),
        other => other,
      };
    }
    Ok(())
  }

  pub fn add_responsibility(&mut self, job: usize) -> Result<()> {
    self.apply(|doc| doc.add_responsibility(job))
  }

  pub fn remove_responsibility(&mut self, job: usize, resp: usize) -> Result<()> {
    self.apply(|doc| doc.remove_responsibility(job, resp))
  }

  pub fn add_skill(&mut self, skill: &str) -> Result<()> {
    self.apply(|doc| doc.add_skill(skill))
  }

  pub fn remove_skill(&mut self, index: usize) -> Result<()> {
    self.apply(|doc| doc.remove_skill(index))
  }

  // ── Begin ─────────────────────────────────────────────────────────────

  /// Fetch an existing resume for editing.
  pub fn begin_load(&mut self, id: ResumeId) -> Result<PendingCall> {
    self.acquire(Operation::Load)?;
    Ok(PendingCall::Load(id))
  }

  /// Upload a PDF for parsing. The file is checked locally first.
  pub fn begin_import(&mut self, upload: PdfUpload) -> Result<PendingCall> {
    self.ensure_idle(Operation::Import)?;
    if let Err(message) = upload.validate() {
      return Err(self.refuse(&message));
    }
    self.acquire(Operation::Import)?;
    Ok(PendingCall::Import(upload))
  }

  pub fn begin_summary(&mut self) -> Result<PendingCall> {
    self.ensure_idle(Operation::Summary)?;
    let doc = &self.document;
    let job_title = doc.primary_job().map(|j| j.title.trim()).unwrap_or_default();
    if doc.personal_info.name.trim().is_empty() || job_title.is_empty() {
      return Err(self.refuse(
        "Please add your name and at least one job title to generate a summary.",
      ));
    }

    let skills = if doc.skills.is_empty() {
      vec![PLACEHOLDER_SKILLS.to_string()]
    } else {
      doc.skills.clone()
    };
    let request = SummaryRequest {
      job_title: job_title.to_string(),
      experience_years: self.estimated_years(),
      skills,
    };
    self.acquire(Operation::Summary)?;
    Ok(PendingCall::Summary(request))
  }

  pub fn begin_improve_job(&mut self, job: usize) -> Result<PendingCall> {
    self.ensure_idle(Operation::ImproveJob)?;
    let Some(entry) = self.document.work_experience.get(job) else {
      let len = self.document.work_experience.len();
      let err = Error::IndexOutOfRange {
        what: "work_experience",
        index: job,
        len,
      };
      self.raise(AlertLevel::Warning, err.to_string());
      return Err(err);
    };

    let responsibilities = entry.filled_responsibilities();
    if entry.title.trim().is_empty()
      || entry.company.trim().is_empty()
      || responsibilities.is_empty()
    {
      return Err(self.refuse(
        "Please add job title, company, and at least one responsibility to improve.",
      ));
    }

    let request = JobDescriptionRequest {
      job_title: entry.title.clone(),
      company_name: entry.company.clone(),
      responsibilities,
      years_experience: experience::years_in_role(entry, experience::current_year()),
    };
    self.acquire(Operation::ImproveJob)?;
    self.improving = Some(job);
    Ok(PendingCall::ImproveJob(request))
  }

  pub fn begin_suggest_skills(&mut self, level: ExperienceLevel) -> Result<PendingCall> {
    self.ensure_idle(Operation::Skills)?;
    let job_title = self
      .document
      .primary_job()
      .map(|j| j.title.trim().to_string())
      .unwrap_or_default();
    if job_title.is_empty() {
      return Err(
        self.refuse("Please add at least one job title to suggest relevant skills."),
      );
    }
    self.acquire(Operation::Skills)?;
    Ok(PendingCall::Skills(SkillsRequest {
      job_title,
      experience_level: level,
    }))
  }

  /// Package the document for persistence. Name and email are required.
  pub fn begin_submit(&mut self) -> Result<PendingCall> {
    self.ensure_idle(Operation::Submit)?;
    let info = &self.document.personal_info;
    if info.name.is_empty() || info.email.is_empty() {
      return Err(self.refuse("Please fill in your name and email address."));
    }

    let title = match self.title.trim() {
      "" => DEFAULT_TITLE.to_string(),
      t => t.to_string(),
    };
    let submission = ResumeSubmission {
      title,
      current_template_id: self.template_id,
      content: self.document.clone(),
    };
    self.acquire(Operation::Submit)?;
    self.submitted = Some(self.revision);
    Ok(PendingCall::Submit {
      resume_id: self.resume_id,
      submission,
    })
  }

  // ── Complete ──────────────────────────────────────────────────────────

  /// Apply the outcome of a call started with a `begin_*` method.
  ///
  /// The busy flag is always lowered. On failure the document is left
  /// exactly as it is.
  pub fn complete(&mut self, completion: Completion<B::Error>) -> Result<()> {
    let improving = self.improving;
    self.release(completion.operation());

    match completion {
      Completion::Load(Ok(detail)) => {
        info!(resume_id = detail.record.id, "resume loaded");
        self.title = detail.record.title;
        self.template_id = detail.record.current_template_id;
        self.resume_id = Some(detail.record.id);
        self.hydrate(detail.content.unwrap_or_else(ResumeDocument::empty));
        self.state = SessionState::Saved;
        self.alert = None;
        Ok(())
      }
      Completion::Load(Err(e)) => {
        Err(self.collaborator_failure("Failed to load resume data. Please try again.", e))
      }

      Completion::Import(Ok(parsed)) => {
        info!("parsed PDF imported");
        self.hydrate(parsed);
        self.raise(
          AlertLevel::Success,
          "Resume parsed successfully! You can now edit the extracted information.",
        );
        Ok(())
      }
      Completion::Import(Err(e)) => {
        let message = format!("Failed to upload and parse the PDF: {e}");
        Err(self.collaborator_failure(&message, e))
      }

      Completion::Summary(Ok(response)) => {
        info!(chars = response.content.len(), "summary merged");
        let next = self.document.merge_summary(response.content);
        self.replace(next);
        self.raise(
          AlertLevel::Success,
          "Summary generated successfully! Feel free to edit it further.",
        );
        Ok(())
      }
      Completion::Summary(Err(e)) => Err(self.collaborator_failure(
        "Failed to generate summary. Please try again or write your own.",
        e,
      )),

      Completion::ImproveJob(Ok(response)) => {
        let Some(job) = improving else {
          info!("improved job was removed or replaced; descriptions discarded");
          self.raise(
            AlertLevel::Info,
            "The job was removed before its improved descriptions arrived.",
          );
          return Ok(());
        };
        if response.descriptions.is_empty() {
          self.raise(AlertLevel::Info, "No improved descriptions were returned.");
          return Ok(());
        }
        let lines = response.descriptions.len();
        self.apply(|doc| doc.merge_responsibilities(job, response.descriptions))?;
        info!(job, lines, "job descriptions merged");
        self.raise(AlertLevel::Success, "Job descriptions improved successfully!");
        Ok(())
      }
      Completion::ImproveJob(Err(e)) => Err(self.collaborator_failure(
        "Failed to improve job descriptions. Please try again or edit them manually.",
        e,
      )),

      Completion::Skills(Ok(response)) => {
        if response.skills.is_empty() {
          self.raise(AlertLevel::Info, "No skill suggestions were returned.");
          return Ok(());
        }
        let (next, added) = self.document.merge_skills(&response.skills);
        self.replace(next);
        info!(added, "skills merged");
        self.raise(
          AlertLevel::Success,
          format!("Added {added} suggested skills to your resume."),
        );
        Ok(())
      }
      Completion::Skills(Err(e)) => Err(self.collaborator_failure(
        "Failed to suggest skills. Please try again or add them manually.",
        e,
      )),

      Completion::Submit(Ok(record)) => {
        info!(resume_id = record.id, "resume saved");
        self.resume_id = Some(record.id);
        if self.submitted.take() == Some(self.revision) {
          self.state = SessionState::Saved;
          self.raise(AlertLevel::Success, "Resume saved successfully!");
        } else {
          self.raise(
            AlertLevel::Info,
            "Resume saved. Changes made while saving are not saved yet.",
          );
        }
        Ok(())
      }
      Completion::Submit(Err(e)) => {
        self.submitted = None;
        Err(self.collaborator_failure("Failed to save resume. Please try again.", e))
      }
    }
  }

  // ── Convenience ───────────────────────────────────────────────────────

  /// Execute `call` against this session's backend and complete it.
  pub async fn run(&mut self, call: PendingCall) -> Result<()> {
    let backend = Arc::clone(&self.backend);
    let completion = call.execute(backend.as_ref()).await;
    self.complete(completion)
  }

  pub async fn load(&mut self, id: ResumeId) -> Result<()> {
    let call = self.begin_load(id)?;
    self.run(call).await
  }

  pub async fn import_pdf(&mut self, upload: PdfUpload) -> Result<()> {
    let call = self.begin_import(upload)?;
    self.run(call).await
  }

  pub async fn generate_summary(&mut self) -> Result<()> {
    let call = self.begin_summary()?;
    self.run(call).await
  }

  pub async fn improve_job(&mut self, job: usize) -> Result<()> {
    let call = self.begin_improve_job(job)?;
    self.run(call).await
  }

  pub async fn suggest_skills(&mut self, level: ExperienceLevel) -> Result<()> {
    let call = self.begin_suggest_skills(level)?;
    self.run(call).await
  }

  pub async fn submit(&mut self) -> Result<()> {
    let call = self.begin_submit()?;
    self.run(call).await
  }

  // ── Saved-resume actions ──────────────────────────────────────────────

  fn require_saved(&mut self, action: &str) -> Result<ResumeId> {
    match self.resume_id {
      Some(id) => Ok(id),
      None => Err(self.refuse(&format!("Save the resume before {action}."))),
    }
  }

  /// Snapshot the current document as the next version of the saved resume.
  pub async fn save_version(&mut self, description: Option<String>) -> Result<VersionRecord> {
    let resume_id = self.require_saved("creating a version")?;
    self.acquire(Operation::Version)?;

    let backend = Arc::clone(&self.backend);
    let content = self.document.clone();
    let result: Result<VersionRecord, B::Error> = async {
      let existing = backend.list_versions(resume_id).await?;
      let version = NewVersion {
        resume_id,
        version_number: next_version_number(&existing),
        description,
        content,
      };
      backend.create_version(version).await
    }
    .await;
    self.release(Operation::Version);

    match result {
      Ok(record) => {
        info!(resume_id, version_id = record.id, "version created");
        self.raise(AlertLevel::Success, "Version saved.");
        Ok(record)
      }
      Err(e) => Err(self.collaborator_failure("Failed to save version. Please try again.", e)),
    }
  }

  /// Create a public share link for the saved resume.
  pub async fn create_share_link(&mut self) -> Result<ShareLink> {
    let resume_id = self.require_saved("sharing it")?;
    let request = ShareRequest {
      resume_id,
      version_id: None,
      expiration_date: None,
    };
    let result = self.backend.create_share_link(request).await;
    match result {
      Ok(link) => {
        info!(resume_id, "share link created");
        Ok(link)
      }
      Err(e) => {
        Err(self.collaborator_failure("Failed to create share link. Please try again.", e))
      }
    }
  }
}
