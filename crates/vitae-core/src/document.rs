//! The resume document, the content tree edited by a form session.
//!
//! Every field carries a serde default so partial JSON from collaborators (a
//! parsed PDF without projects, say) still deserializes. Call
//! [`ResumeDocument::normalized`] after hydrating to restore the invariants
//! the form relies on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── Personal info ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
  pub name:     String,
  pub email:    String,
  pub phone:    String,
  pub location: String,
  pub linkedin: String,
  pub website:  String,
}

// ─── Repeated entries ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
  pub title:            String,
  pub company:          String,
  /// Free text, e.g. "January 2020".
  pub start_date:       String,
  /// Free text; "Present" marks a current role.
  pub end_date:         String,
  pub responsibilities: Vec<String>,
}

impl WorkExperience {
  /// The entry appended by "add job": empty fields, one empty responsibility.
  pub fn blank() -> Self {
    Self {
      responsibilities: vec![String::new()],
      ..Self::default()
    }
  }

  /// Responsibilities with blank lines dropped, as sent to the generator.
  pub fn filled_responsibilities(&self) -> Vec<String> {
    self
      .responsibilities
      .iter()
      .filter(|r| !r.trim().is_empty())
      .cloned()
      .collect()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
  pub degree:      String,
  pub institution: String,
  pub start_date:  String,
  pub end_date:    String,
  /// GPA, honours, coursework.
  pub details:     String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
  pub name:        String,
  pub date:        String,
  pub description: String,
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// The sections holding repeated entries that can be added and removed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntrySection {
  WorkExperience,
  Education,
  Projects,
}

impl EntrySection {
  /// Whether the section must always keep at least one entry.
  pub fn has_floor(self) -> bool {
    matches!(self, Self::WorkExperience | Self::Education)
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// The in-memory resume content tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
  pub personal_info:   PersonalInfo,
  pub summary:         String,
  /// Index 0 is the primary job used for AI prompts.
  pub work_experience: Vec<WorkExperience>,
  pub education:       Vec<Education>,
  pub skills:          Vec<String>,
  pub projects:        Vec<Project>,
}

impl ResumeDocument {
  /// A fresh document for a new resume: one blank job, one blank education
  /// entry, nothing else.
  pub fn empty() -> Self {
    Self {
      work_experience: vec![WorkExperience::blank()],
      education: vec![Education::default()],
      ..Self::default()
    }
  }

  /// Restore the form invariants on a hydrated document: at least one job,
  /// at least one education entry, at least one responsibility per job.
  pub fn normalized(mut self) -> Self {
    if self.work_experience.is_empty() {
      self.work_experience.push(WorkExperience::blank());
    }
    if self.education.is_empty() {
      self.education.push(Education::default());
    }
    for job in &mut self.work_experience {
      if job.responsibilities.is_empty() {
        job.responsibilities.push(String::new());
      }
    }
    self
  }

  /// The primary job, if present.
  pub fn primary_job(&self) -> Option<&WorkExperience> {
    self.work_experience.first()
  }

  /// Number of entries in `section`.
  pub fn entry_count(&self, section: EntrySection) -> usize {
    match section {
      EntrySection::WorkExperience => self.work_experience.len(),
      EntrySection::Education => self.education.len(),
      EntrySection::Projects => self.projects.len(),
    }
  }
}
