//! Interactive form: command grammar, dispatcher and key handling.
//!
//! Commands typed into the command bar are split shell-style and parsed with
//! clap. Backend calls are started through the session's `begin_*` methods
//! and executed on spawned tasks; their completions come back over a channel
//! and are applied between key presses, so the form stays editable while a
//! request runs.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;
use vitae_core::{
  backend::ResumeBackend,
  document::EntrySection,
  session::{Completion, FormSession, PendingCall, SessionState},
  wire::{ExperienceLevel, PdfUpload, TemplateId},
};

use crate::render;

// ─── Grammar ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "form",
  no_binary_name = true,
  disable_version_flag = true
)]
pub struct Input {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
  /// Print the document with the address of every field.
  Show,
  /// Replace a field, e.g. `set work_experience[0].title "Data Engineer"`.
  Set {
    path:  String,
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    value: Vec<String>,
  },
  /// Append a blank entry to work_experience, education or projects.
  Add { section: EntrySection },
  /// Remove an entry by index.
  Remove { section: EntrySection, index: usize },
  /// Add or remove responsibility lines of a job.
  Resp {
    #[command(subcommand)]
    action: RespAction,
  },
  /// Add or remove skills.
  Skill {
    #[command(subcommand)]
    action: SkillAction,
  },
  /// Set the resume title.
  Title {
    #[arg(num_args = 0.., trailing_var_arg = true)]
    words: Vec<String>,
  },
  /// Choose a template by id; no id clears it.
  Template { id: Option<TemplateId> },
  /// Generate a professional summary.
  Summary,
  /// Rewrite the responsibilities of a job.
  Improve { job: usize },
  /// Suggest skills for the primary job title.
  Skills {
    #[arg(long, default_value_t = ExperienceLevel::default())]
    level: ExperienceLevel,
  },
  /// Replace the document with the contents of a PDF resume.
  Import { file: PathBuf },
  /// Save the resume.
  Save,
  /// Snapshot the saved resume as a new version.
  Version {
    #[arg(num_args = 0.., trailing_var_arg = true)]
    description: Vec<String>,
  },
  /// Create a public share link for the saved resume.
  Share,
  /// Show the estimated years of experience.
  Years,
  /// Show save state and requests in flight.
  Status,
  /// Leave the form.
  #[command(alias = "exit")]
  Quit,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum RespAction {
  Add { job: usize },
  Remove { job: usize, index: usize },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SkillAction {
  Add {
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    name: Vec<String>,
  },
  Remove { index: usize },
}

/// Split a line into words. Single and double quotes group words; a
/// backslash escapes the next character outside single quotes.
pub fn split_line(line: &str) -> Result<Vec<String>> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quote: Option<char> = None;
  let mut chars = line.chars();

  while let Some(c) = chars.next() {
    match (quote, c) {
      (Some(q), c) if c == q => quote = None,
      (Some('"') | None, '\\') => {
        let Some(next) = chars.next() else {
          bail!("trailing backslash");
        };
        current.push(next);
        in_word = true;
      }
      (Some(_), c) => current.push(c),
      (None, '"' | '\'') => {
        quote = Some(c);
        in_word = true;
      }
      (None, c) if c.is_whitespace() => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      (None, c) => {
        current.push(c);
        in_word = true;
      }
    }
  }

  if let Some(q) = quote {
    bail!("unterminated {q} quote");
  }
  if in_word {
    words.push(current);
  }
  Ok(words)
}

/// Quote `value` so [`split_line`] reads it back as one word.
pub fn quote(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    if matches!(c, '"' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('"');
  out
}

// ─── FormApp ─────────────────────────────────────────────────────────────────

/// What the event loop should do after a line.
#[derive(Debug, PartialEq)]
pub enum Flow {
  Continue(Option<String>),
  Quit,
}

/// Which part of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Fields,
  Command,
}

/// Output lines kept for the output pane.
const LOG_LIMIT: usize = 500;

pub struct FormApp<B: ResumeBackend + 'static> {
  session:  FormSession<B>,
  tx:       mpsc::UnboundedSender<Completion<B::Error>>,
  /// Base URL used to print share links.
  base_url: String,

  /// Current keyboard focus.
  pub focus:        Focus,
  /// Text typed into the command bar.
  pub command:      String,
  /// Cursor within the flattened field list.
  pub field_cursor: usize,
  /// Output of commands and completions, oldest first.
  pub log:          Vec<String>,
  /// One-line message shown in the status bar.
  pub status_msg:   String,
}

impl<B: ResumeBackend + 'static> FormApp<B> {
  /// Wrap `session`. Completions of spawned calls arrive on the returned
  /// receiver and must be passed to [`FormApp::on_completion`].
  pub fn new(
    session: FormSession<B>,
    base_url: impl Into<String>,
  ) -> (Self, mpsc::UnboundedReceiver<Completion<B::Error>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Self {
      session,
      tx,
      base_url: base_url.into(),
      focus: Focus::Fields,
      command: String::new(),
      field_cursor: 0,
      log: Vec::new(),
      status_msg: String::new(),
    };
    (app, rx)
  }

  pub fn session(&self) -> &FormSession<B> { &self.session }

  /// Append `text` to the output pane; its last line becomes the status.
  pub fn push_output(&mut self, text: &str) {
    for line in text.lines() {
      self.log.push(line.to_string());
    }
    if let Some(last) = text.lines().rev().find(|l| !l.trim().is_empty()) {
      self.status_msg = last.to_string();
    }
    if self.log.len() > LOG_LIMIT {
      let excess = self.log.len() - LOG_LIMIT;
      self.log.drain(..excess);
    }
  }

  /// Run `call` on a spawned task.
  fn spawn(&self, call: PendingCall) {
    let backend = Arc::clone(self.session.backend());
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let completion = call.execute(backend.as_ref()).await;
      // A closed channel means the form was left; the result is discarded.
      let _ = tx.send(completion);
    });
  }

  /// Apply a finished call and describe the outcome.
  pub fn on_completion(&mut self, completion: Completion<B::Error>) -> String {
    let operation = completion.operation();
    if let Err(e) = self.session.complete(completion) {
      debug!(%operation, error = %e, "call completed with error");
    }
    match self.session.take_alert() {
      Some(alert) => render::alert(&alert),
      None => format!("{operation} finished"),
    }
  }

  /// Parse and run one input line.
  pub async fn handle_line(&mut self, line: &str) -> Flow {
    let words = match split_line(line) {
      Ok(words) if words.is_empty() => return Flow::Continue(None),
      Ok(words) => words,
      Err(e) => return Flow::Continue(Some(format!("error: {e}"))),
    };
    let command = match Input::try_parse_from(words) {
      Ok(input) => input.command,
      Err(e) => return Flow::Continue(Some(e.render().to_string())),
    };
    if command == Command::Quit {
      return Flow::Quit;
    }

    let result = self.dispatch(command).await;
    let alert = self.session.take_alert();
    let mut out = Vec::new();
    match result {
      Ok(Some(text)) => out.push(text),
      Ok(None) => {}
      // The session already raised an alert for its own errors.
      Err(e) if alert.is_none() => out.push(format!("error: {e:#}")),
      Err(_) => {}
    }
    if let Some(alert) = alert {
      out.push(render::alert(&alert));
    }
    Flow::Continue((!out.is_empty()).then(|| out.join("\n")))
  }

  async fn dispatch(&mut self, command: Command) -> Result<Option<String>> {
    let s = &mut self.session;
    let out = match command {
      Command::Show => {
        let state = match s.state() {
          SessionState::Editing => "unsaved changes",
          SessionState::Saved => "saved",
        };
        let template = s
          .template_id()
          .map_or_else(|| "none".to_string(), |id| id.to_string());
        Some(format!(
          "{} (template {template}, {state})\n\n{}",
          s.title(),
          render::document(s.document())
        ))
      }
      Command::Set { path, value } => {
        s.edit(&path, value.join(" "))?;
        None
      }
      Command::Add { section } => {
        s.add_entry(section);
        let index = s.document().entry_count(section) - 1;
        Some(format!("added {section}[{index}]"))
      }
      Command::Remove { section, index } => {
        s.remove_entry(section, index)?;
        None
      }
      Command::Resp { action } => {
        match action {
          RespAction::Add { job } => s.add_responsibility(job)?,
          RespAction::Remove { job, index } => s.remove_responsibility(job, index)?,
        }
        None
      }
      Command::Skill { action } => {
        match action {
          SkillAction::Add { name } => s.add_skill(&name.join(" "))?,
          SkillAction::Remove { index } => s.remove_skill(index)?,
        }
        None
      }
      Command::Title { words } => {
        s.set_title(words.join(" "));
        None
      }
      Command::Template { id } => {
        s.set_template(id);
        None
      }

      Command::Summary => {
        let call = s.begin_summary()?;
        self.spawn(call);
        Some("Generating summary…".into())
      }
      Command::Improve { job } => {
        let call = s.begin_improve_job(job)?;
        self.spawn(call);
        Some(format!("Improving descriptions of job {job}…"))
      }
      Command::Skills { level } => {
        let call = s.begin_suggest_skills(level)?;
        self.spawn(call);
        Some(format!("Suggesting {level} skills…"))
      }
      Command::Import { file } => {
        let upload = read_upload(&file).await?;
        let call = self.session.begin_import(upload)?;
        self.spawn(call);
        Some(format!("Parsing {}…", file.display()))
      }
      Command::Save => {
        let call = s.begin_submit()?;
        self.spawn(call);
        Some("Saving…".into())
      }

      Command::Version { description } => {
        let description = Some(description.join(" ")).filter(|d| !d.is_empty());
        let version = s.save_version(description).await?;
        version
          .version_number
          .map(|n| format!("created version {n}"))
      }
      Command::Share => {
        let link = s.create_share_link().await?;
        Some(link.url(&self.base_url))
      }

      Command::Years => Some(format!(
        "estimated experience: {} years",
        s.estimated_years()
      )),
      Command::Status => {
        let mut lines = vec![match s.resume_id() {
          Some(id) => format!("resume {id}"),
          None => "new resume (not saved yet)".to_string(),
        }];
        if s.state() == SessionState::Editing {
          lines.push("unsaved changes".into());
        }
        for op in s.in_flight() {
          lines.push(format!("{op} in progress"));
        }
        if let Some(job) = s.improving_job() {
          lines.push(format!("improving job {job}"));
        }
        Some(lines.join("\n"))
      }
      Command::Quit => None,
    };
    Ok(out)
  }

  /// Apply every completion that has arrived, without waiting.
  pub fn drain_completions(
    &mut self,
    completions: &mut mpsc::UnboundedReceiver<Completion<B::Error>>,
  ) {
    while let Ok(completion) = completions.try_recv() {
      let out = self.on_completion(completion);
      self.push_output(&out);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// The address and value under the field cursor.
  pub fn selected_field(&self) -> Option<render::Field> {
    let fields: Vec<render::Field> = render::sections(self.session.document())
      .into_iter()
      .flat_map(|(_, fields)| fields)
      .collect();
    let last = fields.len().checked_sub(1)?;
    fields.into_iter().nth(self.field_cursor.min(last))
  }

  fn field_count(&self) -> usize {
    render::sections(self.session.document())
      .iter()
      .map(|(_, fields)| fields.len())
      .sum()
  }

  /// Process a key event. Returns `false` to leave the form.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    match self.focus {
      Focus::Command => self.handle_command_key(key).await,
      Focus::Fields => self.handle_field_key(key),
    }
  }

  async fn handle_command_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.command.clear();
        self.focus = Focus::Fields;
      }
      KeyCode::Enter => {
        let line = std::mem::take(&mut self.command);
        self.focus = Focus::Fields;
        if line.trim().is_empty() {
          return true;
        }
        self.log.push(format!("> {line}"));
        match self.handle_line(&line).await {
          Flow::Quit => return false,
          Flow::Continue(Some(out)) => self.push_output(&out),
          Flow::Continue(None) => self.status_msg.clear(),
        }
      }
      KeyCode::Backspace => {
        self.command.pop();
      }
      KeyCode::Char(c) => self.command.push(c),
      _ => {}
    }
    true
  }

  fn handle_field_key(&mut self, key: KeyEvent) -> bool {
    let count = self.field_count();
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.field_cursor + 1 < count {
          self.field_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.field_cursor = self.field_cursor.min(count.saturating_sub(1)).saturating_sub(1);
      }
      KeyCode::Home | KeyCode::Char('g') => self.field_cursor = 0,
      KeyCode::End | KeyCode::Char('G') => self.field_cursor = count.saturating_sub(1),
      // Edit the selected field through the command bar.
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some((address, value)) = self.selected_field() {
          self.command = format!("set {address} {}", quote(&value));
          self.focus = Focus::Command;
        }
      }
      KeyCode::Char(':') => {
        self.command.clear();
        self.focus = Focus::Command;
      }
      _ => {}
    }
    true
  }
}

/// Load a PDF from disk for import.
pub async fn read_upload(path: &Path) -> Result<PdfUpload> {
  let bytes = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading {}", path.display()))?;
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "resume.pdf".to_string());
  Ok(PdfUpload {
    file_name,
    bytes: Bytes::from(bytes),
  })
}
