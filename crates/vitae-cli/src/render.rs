//! Plain-text rendering of documents, alerts and listings.
//!
//! Every editable line is prefixed with the field address that `set` accepts,
//! so the form can be edited by copying the left-hand column.

use std::fmt::Write as _;

use vitae_core::{
  document::ResumeDocument,
  session::{Alert, AlertLevel},
  wire::{ResumeRecord, ShareLink, SharedResume, Template, VersionSummary},
};

const LABEL_WIDTH: usize = 44;

/// One editable leaf: its address and current value.
pub type Field = (String, String);

/// The document as titled sections of editable fields, in display order.
pub fn sections(doc: &ResumeDocument) -> Vec<(&'static str, Vec<Field>)> {
  fn leaf(address: String, value: &str) -> Field { (address, value.to_string()) }

  let info = &doc.personal_info;
  let personal = [
    ("name", &info.name),
    ("email", &info.email),
    ("phone", &info.phone),
    ("location", &info.location),
    ("linkedin", &info.linkedin),
    ("website", &info.website),
  ]
  .into_iter()
  .map(|(name, value)| leaf(format!("personal_info.{name}"), value))
  .collect();

  let mut work = Vec::new();
  for (i, job) in doc.work_experience.iter().enumerate() {
    let prefix = format!("work_experience[{i}]");
    work.push(leaf(format!("{prefix}.title"), &job.title));
    work.push(leaf(format!("{prefix}.company"), &job.company));
    work.push(leaf(format!("{prefix}.start_date"), &job.start_date));
    work.push(leaf(format!("{prefix}.end_date"), &job.end_date));
    for (j, line) in job.responsibilities.iter().enumerate() {
      work.push(leaf(format!("{prefix}.responsibilities[{j}]"), line));
    }
  }

  let mut education = Vec::new();
  for (i, edu) in doc.education.iter().enumerate() {
    let prefix = format!("education[{i}]");
    education.push(leaf(format!("{prefix}.degree"), &edu.degree));
    education.push(leaf(format!("{prefix}.institution"), &edu.institution));
    education.push(leaf(format!("{prefix}.start_date"), &edu.start_date));
    education.push(leaf(format!("{prefix}.end_date"), &edu.end_date));
    education.push(leaf(format!("{prefix}.details"), &edu.details));
  }

  let skills = doc
    .skills
    .iter()
    .enumerate()
    .map(|(i, skill)| leaf(format!("skills[{i}]"), skill))
    .collect();

  let mut projects = Vec::new();
  for (i, project) in doc.projects.iter().enumerate() {
    let prefix = format!("projects[{i}]");
    projects.push(leaf(format!("{prefix}.name"), &project.name));
    projects.push(leaf(format!("{prefix}.date"), &project.date));
    projects.push(leaf(format!("{prefix}.description"), &project.description));
  }

  vec![
    ("Personal info", personal),
    ("Summary", vec![leaf("summary".into(), &doc.summary)]),
    ("Work experience", work),
    ("Education", education),
    ("Skills", skills),
    ("Projects", projects),
  ]
}

// ─── Document ────────────────────────────────────────────────────────────────

/// The whole document, section by section.
pub fn document(doc: &ResumeDocument) -> String {
  let mut out = String::new();
  for (i, (title, fields)) in sections(doc).iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let _ = writeln!(out, "{title}");
    if fields.is_empty() {
      out.push_str("  (none)\n");
    }
    for (address, value) in fields {
      let shown = if value.is_empty() { "-" } else { value.as_str() };
      let _ = writeln!(out, "  {address:<width$} {shown}", width = LABEL_WIDTH);
    }
  }
  out
}

// ─── Alerts ──────────────────────────────────────────────────────────────────

pub fn alert(alert: &Alert) -> String {
  let tag = match alert.level {
    AlertLevel::Success => "ok",
    AlertLevel::Info => "info",
    AlertLevel::Warning => "warning",
    AlertLevel::Danger => "error",
  };
  format!("[{tag}] {}", alert.message)
}

// ─── Listings ────────────────────────────────────────────────────────────────

pub fn resumes(records: &[ResumeRecord]) -> String {
  if records.is_empty() {
    return "No resumes yet. Run `vitae edit` to create one.\n".to_string();
  }
  let mut out = String::new();
  for r in records {
    let _ = writeln!(
      out,
      "{:>6}  {:<32}  updated {}",
      r.id,
      r.title,
      r.updated_at.format("%Y-%m-%d %H:%M")
    );
  }
  out
}

/// Templates grouped by role, as produced by
/// [`group_by_role`](vitae_core::wire::group_by_role).
pub fn templates(groups: &[(&str, Vec<&Template>)]) -> String {
  if groups.is_empty() {
    return "No templates match.\n".to_string();
  }
  let mut out = String::new();
  for (role, templates) in groups {
    let _ = writeln!(out, "{}", role.replace('_', " "));
    for t in templates {
      let default = if t.is_default { " (default)" } else { "" };
      let _ = writeln!(out, "  {:>4}  {}{default}  {}", t.id, t.name, t.description);
    }
  }
  out
}

pub fn versions(versions: &[VersionSummary]) -> String {
  if versions.is_empty() {
    return "No versions saved.\n".to_string();
  }
  let mut out = String::new();
  for v in versions {
    let _ = writeln!(
      out,
      "  v{:<4} {}",
      v.version_number,
      v.description.as_deref().unwrap_or("")
    );
  }
  out
}

pub fn share_links(links: &[ShareLink], base_url: &str) -> String {
  if links.is_empty() {
    return "No share links.\n".to_string();
  }
  let mut out = String::new();
  for link in links {
    let expires = link
      .expiration_date
      .map(|d| format!("  expires {}", d.format("%Y-%m-%d")))
      .unwrap_or_default();
    let _ = writeln!(
      out,
      "{:>6}  resume {:<6} {}{expires}",
      link.id,
      link.resume_id,
      link.url(base_url)
    );
  }
  out
}

/// A resume opened through a public link.
pub fn shared(resume: &SharedResume) -> String {
  let version = resume
    .version
    .version_number
    .map_or_else(|| "latest".to_string(), |n| format!("v{n}"));
  format!(
    "{} ({version}, template {})\n\n{}",
    resume.title,
    resume.template.name,
    document(&resume.version.content)
  )
}
