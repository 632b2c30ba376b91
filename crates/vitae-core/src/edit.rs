//! Field edits and collection operators on [`ResumeDocument`].
//!
//! Every operation takes `&self` and returns a new document. The receiver is
//! never modified, so a caller holding the previous document can swap the
//! result in atomically or drop it on error.

use crate::{
  Error, Result,
  address::{EducationField, FieldAddress, PersonalField, ProjectField, WorkField},
  document::{
    Education, EntrySection, PersonalInfo, Project, ResumeDocument, WorkExperience,
  },
};

fn out_of_range(what: &'static str, index: usize, len: usize) -> Error {
  Error::IndexOutOfRange { what, index, len }
}

fn entry<'a, T>(items: &'a [T], what: &'static str, index: usize) -> Result<&'a T> {
  items.get(index).ok_or_else(|| out_of_range(what, index, items.len()))
}

fn entry_mut<'a, T>(
  items: &'a mut [T],
  what: &'static str,
  index: usize,
) -> Result<&'a mut T> {
  let len = items.len();
  items.get_mut(index).ok_or_else(|| out_of_range(what, index, len))
}

// ─── Leaf access ─────────────────────────────────────────────────────────────

impl PersonalInfo {
  fn field(&self, field: PersonalField) -> &String {
    match field {
      PersonalField::Name => &self.name,
      PersonalField::Email => &self.email,
      PersonalField::Phone => &self.phone,
      PersonalField::Location => &self.location,
      PersonalField::Linkedin => &self.linkedin,
      PersonalField::Website => &self.website,
    }
  }

  fn field_mut(&mut self, field: PersonalField) -> &mut String {
    match field {
      PersonalField::Name => &mut self.name,
      PersonalField::Email => &mut self.email,
      PersonalField::Phone => &mut self.phone,
      PersonalField::Location => &mut self.location,
      PersonalField::Linkedin => &mut self.linkedin,
      PersonalField::Website => &mut self.website,
    }
  }
}

impl WorkExperience {
  fn field(&self, field: WorkField) -> Result<&String> {
    Ok(match field {
      WorkField::Title => &self.title,
      WorkField::Company => &self.company,
      WorkField::StartDate => &self.start_date,
      WorkField::EndDate => &self.end_date,
      WorkField::Responsibility(i) => entry(&self.responsibilities, "responsibility", i)?,
    })
  }

  fn field_mut(&mut self, field: WorkField) -> Result<&mut String> {
    Ok(match field {
      WorkField::Title => &mut self.title,
      WorkField::Company => &mut self.company,
      WorkField::StartDate => &mut self.start_date,
      WorkField::EndDate => &mut self.end_date,
      WorkField::Responsibility(i) => {
        entry_mut(&mut self.responsibilities, "responsibility", i)?
      }
    })
  }
}

impl Education {
  fn field_mut(&mut self, field: EducationField) -> &mut String {
    match field {
      EducationField::Degree => &mut self.degree,
      EducationField::Institution => &mut self.institution,
      EducationField::StartDate => &mut self.start_date,
      EducationField::EndDate => &mut self.end_date,
      EducationField::Details => &mut self.details,
    }
  }

  fn field(&self, field: EducationField) -> &String {
    match field {
      EducationField::Degree => &self.degree,
      EducationField::Institution => &self.institution,
      EducationField::StartDate => &self.start_date,
      EducationField::EndDate => &self.end_date,
      EducationField::Details => &self.details,
    }
  }
}

impl Project {
  fn field(&self, field: ProjectField) -> &String {
    match field {
      ProjectField::Name => &self.name,
      ProjectField::Date => &self.date,
      ProjectField::Description => &self.description,
    }
  }

  fn field_mut(&mut self, field: ProjectField) -> &mut String {
    match field {
      ProjectField::Name => &mut self.name,
      ProjectField::Date => &mut self.date,
      ProjectField::Description => &mut self.description,
    }
  }
}

impl ResumeDocument {
  fn resolve(&self, address: FieldAddress) -> Result<&String> {
    match address {
      FieldAddress::Personal(field) => Ok(self.personal_info.field(field)),
      FieldAddress::Summary => Ok(&self.summary),
      FieldAddress::Work { index, field } => {
        entry(&self.work_experience, "work_experience", index)?.field(field)
      }
      FieldAddress::Education { index, field } => {
        Ok(entry(&self.education, "education", index)?.field(field))
      }
      FieldAddress::Project { index, field } => {
        Ok(entry(&self.projects, "projects", index)?.field(field))
      }
      FieldAddress::Skill(index) => entry(&self.skills, "skills", index),
    }
  }

  fn resolve_mut(&mut self, address: FieldAddress) -> Result<&mut String> {
    match address {
      FieldAddress::Personal(field) => Ok(self.personal_info.field_mut(field)),
      FieldAddress::Summary => Ok(&mut self.summary),
      FieldAddress::Work { index, field } => {
        entry_mut(&mut self.work_experience, "work_experience", index)?.field_mut(field)
      }
      FieldAddress::Education { index, field } => {
        Ok(entry_mut(&mut self.education, "education", index)?.field_mut(field))
      }
      FieldAddress::Project { index, field } => {
        Ok(entry_mut(&mut self.projects, "projects", index)?.field_mut(field))
      }
      FieldAddress::Skill(index) => entry_mut(&mut self.skills, "skills", index),
    }
  }

  /// Read the leaf at `address`, or `None` if an index does not resolve.
  pub fn get(&self, address: FieldAddress) -> Option<&str> {
    self.resolve(address).ok().map(String::as_str)
  }

  /// Return a copy of the document with the leaf at `address` replaced.
  ///
  /// Fails with [`Error::IndexOutOfRange`] when an index in `address` does
  /// not exist in this document.
  pub fn set(&self, address: FieldAddress, value: impl Into<String>) -> Result<Self> {
    let mut next = self.clone();
    *next.resolve_mut(address)? = value.into();
    Ok(next)
  }

  // ── Repeated entries ──────────────────────────────────────────────────

  /// Append the blank template for `section`.
  pub fn add_entry(&self, section: EntrySection) -> Self {
    let mut next = self.clone();
    match section {
      EntrySection::WorkExperience => next.work_experience.push(WorkExperience::blank()),
      EntrySection::Education => next.education.push(Education::default()),
      EntrySection::Projects => next.projects.push(Project::default()),
    }
    next
  }

  /// Remove entry `index` from `section`.
  ///
  /// The first job and the first education entry can never be removed, so
  /// those sections never become empty.
  pub fn remove_entry(&self, section: EntrySection, index: usize) -> Result<Self> {
    let len = self.entry_count(section);
    if index >= len {
      return Err(out_of_range(section.into(), index, len));
    }
    if section.has_floor() && index == 0 {
      return Err(Error::FloorViolation(section.into()));
    }

    let mut next = self.clone();
    match section {
      EntrySection::WorkExperience => {
        next.work_experience.remove(index);
      }
      EntrySection::Education => {
        next.education.remove(index);
      }
      EntrySection::Projects => {
        next.projects.remove(index);
      }
    }
    Ok(next)
  }

  // ── Responsibilities ──────────────────────────────────────────────────

  /// Append an empty responsibility line to job `job`.
  pub fn add_responsibility(&self, job: usize) -> Result<Self> {
    let mut next = self.clone();
    entry_mut(&mut next.work_experience, "work_experience", job)?
      .responsibilities
      .push(String::new());
    Ok(next)
  }

  /// Remove responsibility `resp` of job `job`, keeping at least one line.
  pub fn remove_responsibility(&self, job: usize, resp: usize) -> Result<Self> {
    let mut next = self.clone();
    let lines = &mut entry_mut(&mut next.work_experience, "work_experience", job)?
      .responsibilities;
    if resp >= lines.len() {
      return Err(out_of_range("responsibility", resp, lines.len()));
    }
    if lines.len() <= 1 {
      return Err(Error::FloorViolation("responsibility"));
    }
    lines.remove(resp);
    Ok(next)
  }

  // ── Skills ────────────────────────────────────────────────────────────

  /// Append a single user-typed skill. Surrounding whitespace is trimmed;
  /// blank input is refused.
  pub fn add_skill(&self, skill: &str) -> Result<Self> {
    let skill = skill.trim();
    if skill.is_empty() {
      return Err(Error::Validation("skill must not be blank".into()));
    }
    let mut next = self.clone();
    next.skills.push(skill.to_string());
    Ok(next)
  }

  pub fn remove_skill(&self, index: usize) -> Result<Self> {
    let mut next = self.clone();
    if index >= next.skills.len() {
      return Err(out_of_range("skills", index, next.skills.len()));
    }
    next.skills.remove(index);
    Ok(next)
  }
}
