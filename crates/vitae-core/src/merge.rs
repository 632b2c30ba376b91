//! Merging generated fragments into a document.
//!
//! Each merge touches one region of the document and leaves every other
//! field as it was. Like the edit operations, merges return a new document.

use std::collections::HashSet;

use crate::{Error, Result, document::ResumeDocument};

impl ResumeDocument {
  /// Replace the summary with generated text.
  pub fn merge_summary(&self, text: impl Into<String>) -> Self {
    Self {
      summary: text.into(),
      ..self.clone()
    }
  }

  /// Replace the responsibilities of job `job` with a generated list.
  ///
  /// An empty `lines` is a no-op: the document is returned unchanged.
  pub fn merge_responsibilities(&self, job: usize, lines: Vec<String>) -> Result<Self> {
    let len = self.work_experience.len();
    if job >= len {
      return Err(Error::IndexOutOfRange {
        what: "work_experience",
        index: job,
        len,
      });
    }
    let mut next = self.clone();
    if !lines.is_empty() {
      next.work_experience[job].responsibilities = lines;
    }
    Ok(next)
  }

  /// Union `suggested` into the skill list, comparing case-insensitively.
  ///
  /// Existing skills keep their position and casing. Suggestions whose key is
  /// not present yet are appended in the order given; repeats inside
  /// `suggested` collapse onto their first occurrence. Returns the merged
  /// document and the number of skills appended.
  pub fn merge_skills<S: AsRef<str>>(&self, suggested: &[S]) -> (Self, usize) {
    let mut seen: HashSet<String> =
      self.skills.iter().map(|s| s.to_lowercase()).collect();

    let mut next = self.clone();
    let before = next.skills.len();
    for skill in suggested {
      let skill = skill.as_ref();
      if seen.insert(skill.to_lowercase()) {
        next.skills.push(skill.to_string());
      }
    }
    let added = next.skills.len() - before;
    (next, added)
  }
}
