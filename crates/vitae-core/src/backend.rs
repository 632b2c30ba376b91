//! The `ResumeBackend` trait: every remote collaborator the form talks to.
//!
//! Implemented over HTTP by `vitae-cli`'s `ApiClient` and by in-memory fakes
//! in tests. The form session depends on this abstraction only.

use std::future::Future;

use bytes::Bytes;

use crate::{
  document::ResumeDocument,
  wire::{
    JobDescriptionRequest, JobDescriptionResponse, NewVersion, PdfUpload, ResumeDetail,
    ResumeId, ResumeRecord, ResumeSubmission, ShareId, ShareLink, ShareRequest,
    SharedResume, SkillsRequest, SkillsResponse, SummaryRequest, SummaryResponse, Template,
    TemplateId, VersionId, VersionRecord, VersionSummary,
  },
};

/// Persistence, generation, import and sharing, as one collaborator.
///
/// All methods return `Send` futures so calls can be spawned onto a
/// multi-threaded runtime while the form stays interactive.
pub trait ResumeBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Resumes ───────────────────────────────────────────────────────────

  /// All resumes owned by the current user.
  fn list_resumes(
    &self,
  ) -> impl Future<Output = Result<Vec<ResumeRecord>, Self::Error>> + Send + '_;

  /// A single resume with its latest content.
  fn get_resume(
    &self,
    id: ResumeId,
  ) -> impl Future<Output = Result<ResumeDetail, Self::Error>> + Send + '_;

  /// Persist a new resume together with its content.
  fn create_resume(
    &self,
    submission: ResumeSubmission,
  ) -> impl Future<Output = Result<ResumeRecord, Self::Error>> + Send + '_;

  /// Replace title, template and content of an existing resume.
  fn update_resume(
    &self,
    id: ResumeId,
    submission: ResumeSubmission,
  ) -> impl Future<Output = Result<ResumeRecord, Self::Error>> + Send + '_;

  fn delete_resume(
    &self,
    id: ResumeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Versions ──────────────────────────────────────────────────────────

  fn list_versions(
    &self,
    resume_id: ResumeId,
  ) -> impl Future<Output = Result<Vec<VersionSummary>, Self::Error>> + Send + '_;

  fn create_version(
    &self,
    version: NewVersion,
  ) -> impl Future<Output = Result<VersionRecord, Self::Error>> + Send + '_;

  /// Server-rendered PDF of a stored version.
  fn download_pdf(
    &self,
    version_id: VersionId,
  ) -> impl Future<Output = Result<Bytes, Self::Error>> + Send + '_;

  // ── Templates ─────────────────────────────────────────────────────────

  fn list_templates(
    &self,
  ) -> impl Future<Output = Result<Vec<Template>, Self::Error>> + Send + '_;

  fn get_template(
    &self,
    id: TemplateId,
  ) -> impl Future<Output = Result<Template, Self::Error>> + Send + '_;

  // ── Generation ────────────────────────────────────────────────────────

  fn generate_summary(
    &self,
    request: SummaryRequest,
  ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send + '_;

  fn improve_job(
    &self,
    request: JobDescriptionRequest,
  ) -> impl Future<Output = Result<JobDescriptionResponse, Self::Error>> + Send + '_;

  fn suggest_skills(
    &self,
    request: SkillsRequest,
  ) -> impl Future<Output = Result<SkillsResponse, Self::Error>> + Send + '_;

  // ── Import ────────────────────────────────────────────────────────────

  /// Upload a PDF and receive the parsed document fragment.
  fn import_pdf(
    &self,
    upload: PdfUpload,
  ) -> impl Future<Output = Result<ResumeDocument, Self::Error>> + Send + '_;

  // ── Sharing ───────────────────────────────────────────────────────────

  fn create_share_link(
    &self,
    request: ShareRequest,
  ) -> impl Future<Output = Result<ShareLink, Self::Error>> + Send + '_;

  /// Links created for the current user's resumes.
  fn list_share_links(
    &self,
  ) -> impl Future<Output = Result<Vec<ShareLink>, Self::Error>> + Send + '_;

  /// Stop a link from resolving.
  fn deactivate_share_link(
    &self,
    id: ShareId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The resume behind a public link. Needs no login.
  fn get_shared_resume(
    &self,
    token: String,
  ) -> impl Future<Output = Result<SharedResume, Self::Error>> + Send + '_;
}
