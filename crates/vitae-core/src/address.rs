//! Typed field addresses.
//!
//! A [`FieldAddress`] names exactly one scalar leaf of a
//! [`ResumeDocument`](crate::document::ResumeDocument). Its text form is the
//! one form widgets use as input names:
//!
//! ```text
//! personal_info.email
//! work_experience[2].responsibilities[0]
//! skills[4]
//! ```
//!
//! Text is checked against the grammar
//! `segment ("." segment | "[" digits "]")*` with `segment = [a-zA-Z_]+`
//! before being mapped onto the document schema. Index bounds are not known
//! here; they are checked when the address is resolved against a document.

use std::{fmt, str::FromStr};

use strum::{Display, EnumString};

use crate::{Error, Result};

// ─── Field tags ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PersonalField {
  Name,
  Email,
  Phone,
  Location,
  Linkedin,
  Website,
}

/// A leaf inside a work-experience entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkField {
  Title,
  Company,
  StartDate,
  EndDate,
  /// One line of the `responsibilities` list.
  Responsibility(usize),
}

impl WorkField {
  fn scalar(name: &str) -> Option<Self> {
    match name {
      "title" => Some(Self::Title),
      "company" => Some(Self::Company),
      "start_date" => Some(Self::StartDate),
      "end_date" => Some(Self::EndDate),
      _ => None,
    }
  }
}

impl fmt::Display for WorkField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Title => f.write_str("title"),
      Self::Company => f.write_str("company"),
      Self::StartDate => f.write_str("start_date"),
      Self::EndDate => f.write_str("end_date"),
      Self::Responsibility(i) => write!(f, "responsibilities[{i}]"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EducationField {
  Degree,
  Institution,
  StartDate,
  EndDate,
  Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ProjectField {
  Name,
  Date,
  Description,
}

// ─── FieldAddress ────────────────────────────────────────────────────────────

/// The address of one scalar leaf in a resume document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAddress {
  Personal(PersonalField),
  Summary,
  Work { index: usize, field: WorkField },
  Education { index: usize, field: EducationField },
  Project { index: usize, field: ProjectField },
  Skill(usize),
}

impl fmt::Display for FieldAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Personal(field) => write!(f, "personal_info.{field}"),
      Self::Summary => f.write_str("summary"),
      Self::Work { index, field } => write!(f, "work_experience[{index}].{field}"),
      Self::Education { index, field } => write!(f, "education[{index}].{field}"),
      Self::Project { index, field } => write!(f, "projects[{index}].{field}"),
      Self::Skill(index) => write!(f, "skills[{index}]"),
    }
  }
}

impl FromStr for FieldAddress {
  type Err = Error;

  fn from_str(path: &str) -> Result<Self> {
    use Segment::{Index, Key};

    let segments = tokenize(path)?;
    let unknown = || Error::UnknownField(path.to_string());

    let address = match segments.as_slice() {
      [Key("personal_info"), Key(field)] => {
        Self::Personal(field.parse().map_err(|_| unknown())?)
      }
      [Key("summary")] => Self::Summary,
      [
        Key("work_experience"),
        Index(index),
        Key("responsibilities"),
        Index(sub),
      ] => Self::Work {
        index: *index,
        field: WorkField::Responsibility(*sub),
      },
      [Key("work_experience"), Index(index), Key(field)] => Self::Work {
        index: *index,
        field: WorkField::scalar(field).ok_or_else(unknown)?,
      },
      [Key("education"), Index(index), Key(field)] => Self::Education {
        index: *index,
        field: field.parse().map_err(|_| unknown())?,
      },
      [Key("projects"), Index(index), Key(field)] => Self::Project {
        index: *index,
        field: field.parse().map_err(|_| unknown())?,
      },
      [Key("skills"), Index(index)] => Self::Skill(*index),
      _ => return Err(unknown()),
    };
    Ok(address)
  }
}

// ─── Tokenizer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
  Key(&'a str),
  Index(usize),
}

fn is_segment_byte(b: u8) -> bool { b.is_ascii_alphabetic() || b == b'_' }

/// Consume a `[a-zA-Z_]+` run starting at `pos`.
fn take_key<'a>(path: &'a str, pos: &mut usize) -> Option<&'a str> {
  let bytes = path.as_bytes();
  let start = *pos;
  while *pos < bytes.len() && is_segment_byte(bytes[*pos]) {
    *pos += 1;
  }
  (*pos > start).then(|| &path[start..*pos])
}

/// Split `path` into key and index segments, enforcing the address grammar.
fn tokenize(path: &str) -> Result<Vec<Segment<'_>>> {
  let malformed = |reason| Error::MalformedAddress {
    path: path.to_string(),
    reason,
  };

  let bytes = path.as_bytes();
  let mut segments = Vec::new();
  let mut pos = 0;

  let first = take_key(path, &mut pos).ok_or_else(|| malformed("expected a field name"))?;
  segments.push(Segment::Key(first));

  while pos < bytes.len() {
    match bytes[pos] {
      b'.' => {
        pos += 1;
        let key = take_key(path, &mut pos)
          .ok_or_else(|| malformed("expected a field name after '.'"))?;
        segments.push(Segment::Key(key));
      }
      b'[' => {
        pos += 1;
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
          pos += 1;
        }
        if pos == start {
          return Err(malformed("expected digits after '['"));
        }
        if bytes.get(pos) != Some(&b']') {
          return Err(malformed("unterminated index"));
        }
        let index = path[start..pos]
          .parse()
          .map_err(|_| malformed("index too large"))?;
        segments.push(Segment::Index(index));
        pos += 1;
      }
      _ => return Err(malformed("unexpected character")),
    }
  }

  Ok(segments)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(path: &str) -> Result<FieldAddress> { path.parse() }

  #[test]
  fn parses_every_section() {
    assert_eq!(
      parse("personal_info.email").unwrap(),
      FieldAddress::Personal(PersonalField::Email)
    );
    assert_eq!(parse("summary").unwrap(), FieldAddress::Summary);
    assert_eq!(
      parse("work_experience[2].start_date").unwrap(),
      FieldAddress::Work {
        index: 2,
        field: WorkField::StartDate,
      }
    );
    assert_eq!(
      parse("work_experience[2].responsibilities[0]").unwrap(),
      FieldAddress::Work {
        index: 2,
        field: WorkField::Responsibility(0),
      }
    );
    assert_eq!(
      parse("education[0].details").unwrap(),
      FieldAddress::Education {
        index: 0,
        field: EducationField::Details,
      }
    );
    assert_eq!(
      parse("projects[11].description").unwrap(),
      FieldAddress::Project {
        index: 11,
        field: ProjectField::Description,
      }
    );
    assert_eq!(parse("skills[3]").unwrap(), FieldAddress::Skill(3));
  }

  #[test]
  fn display_round_trips() {
    for path in [
      "personal_info.linkedin",
      "summary",
      "work_experience[0].end_date",
      "work_experience[1].responsibilities[7]",
      "education[4].institution",
      "projects[0].name",
      "skills[12]",
    ] {
      assert_eq!(parse(path).unwrap().to_string(), path);
    }
  }

  #[test]
  fn grammar_violations_are_malformed() {
    for path in [
      "",
      ".summary",
      "summary.",
      "work_experience[]",
      "work_experience[a].title",
      "work_experience[0.title",
      "work_experience[0]title",
      "work-experience[0].title",
      "skills[99999999999999999999999]",
      "personal_info..name",
      "summary ",
    ] {
      assert!(
        matches!(parse(path), Err(Error::MalformedAddress { .. })),
        "{path:?} should be malformed"
      );
    }
  }

  #[test]
  fn well_formed_but_unknown_paths_are_rejected() {
    for path in [
      "personal_info.age",
      "personal_info",
      "summary[0]",
      "work_experience[0]",
      "work_experience[0].responsibilities",
      "work_experience.title",
      "education[0].gpa",
      "projects[0].url",
      "skills",
      "hobbies[0].name",
    ] {
      assert!(
        matches!(parse(path), Err(Error::UnknownField(_))),
        "{path:?} should be unknown"
      );
    }
  }
}
