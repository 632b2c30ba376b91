//! `vitae`: build and manage resumes from the terminal.
//!
//! # Usage
//!
//! ```
//! vitae register --email ada@example.com
//! vitae login --email ada@example.com
//! vitae edit                       # new resume, interactive form
//! vitae edit --id 7                # continue an existing one
//! vitae edit --import cv.pdf       # start from a parsed PDF
//! vitae list
//! vitae templates --filter data
//! vitae download 12 -o resume.pdf
//! vitae share create 7
//! vitae share view s3cr3t
//! ```

mod app;
mod client;
mod render;
mod settings;
mod ui;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::FormApp;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, ClientError};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vitae_core::{
  backend::ResumeBackend,
  session::{Completion, FormSession, SessionState},
  wire::{ResumeId, ShareId, ShareRequest, Template, TemplateId, VersionId, group_by_role},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vitae", author, version, about = "Build and manage resumes from the terminal")]
struct Cli {
  /// Path to a TOML config file (base_url, token_path).
  #[arg(short, long, value_name = "FILE", default_value = settings::DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  /// Base URL of the resume API; overrides the config file.
  #[arg(long, env = "VITAE_URL")]
  url: Option<String>,

  /// Where the login token is stored; overrides the config file.
  #[arg(long, env = "VITAE_TOKEN_FILE", value_name = "FILE")]
  token_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Create an account.
  Register {
    #[arg(long)]
    email: String,
  },
  /// Log in and store the access token.
  Login {
    #[arg(long)]
    email: String,
  },
  /// Forget the stored access token.
  Logout,
  /// Show the account you are logged in as.
  Whoami,
  /// List your resumes.
  List,
  /// Delete a resume.
  Delete {
    id:  ResumeId,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// List templates grouped by role.
  Templates {
    /// Fuzzy filter on name, description and role.
    #[arg(long)]
    filter: Option<String>,
    /// Print the full markup of one template.
    #[arg(long, value_name = "ID")]
    show: Option<TemplateId>,
  },
  /// List the saved versions of a resume.
  Versions { id: ResumeId },
  /// Manage public share links.
  Share {
    #[command(subcommand)]
    action: ShareCmd,
  },
  /// Download the rendered PDF of a version.
  Download {
    version: VersionId,
    #[arg(short, long, default_value = "resume.pdf")]
    output:  PathBuf,
  },
  /// Open the interactive form.
  Edit {
    /// Continue editing an existing resume.
    #[arg(long, conflicts_with = "import")]
    id:       Option<ResumeId>,
    /// Start from a PDF resume.
    #[arg(long, value_name = "FILE")]
    import:   Option<PathBuf>,
    #[arg(long)]
    template: Option<TemplateId>,
    #[arg(long)]
    title:    Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum ShareCmd {
  /// Create a public link for a resume.
  Create {
    id:      ResumeId,
    /// Share a specific version instead of the latest content.
    #[arg(long)]
    version: Option<VersionId>,
  },
  /// List your share links.
  List,
  /// Deactivate a share link.
  Revoke { id: ShareId },
  /// Show the resume behind a share token.
  View { token: String },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so they never mix with command output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // CLI flags override the config file, which overrides defaults.
  let settings = Settings::load(&cli.config)?;
  let config = ApiConfig {
    base_url:   cli.url.unwrap_or(settings.base_url),
    token_path: cli
      .token_file
      .map(|p| settings::expand_tilde(&p))
      .unwrap_or(settings.token_path),
  };
  tracing::debug!(?config, "resolved settings");
  let client = ApiClient::new(config).context("failed to build API client")?;

  match cli.command {
    Cmd::Register { email } => {
      let password = read_password()?;
      client
        .register(&email, &password)
        .await
        .context("registration failed")?;
      println!("Registered {email}. Run `vitae login --email {email}` to log in.");
    }
    Cmd::Login { email } => {
      let password = read_password()?;
      client.login(&email, &password).await.context("login failed")?;
      println!("Logged in as {email}.");
    }
    Cmd::Logout => {
      client.logout().context("failed to remove token")?;
      println!("Logged out.");
    }
    Cmd::Whoami => {
      let user = client
        .current_user()
        .await
        .context("failed to fetch account")?;
      println!(
        "{} (id {}, member since {})",
        user.email,
        user.id,
        user.created_at.format("%Y-%m-%d")
      );
    }
    Cmd::List => {
      let resumes = client.list_resumes().await.context("failed to list resumes")?;
      print!("{}", render::resumes(&resumes));
    }
    Cmd::Delete { id, yes } => {
      if !yes
        && !confirm(
          "Are you sure you want to delete this resume?",
          &mut io::stdin().lock(),
        )?
      {
        println!("Kept resume {id}.");
        return Ok(());
      }
      client
        .delete_resume(id)
        .await
        .with_context(|| format!("failed to delete resume {id}"))?;
      println!("Deleted resume {id}.");
    }
    Cmd::Templates { filter, show } => templates(&client, filter, show).await?,
    Cmd::Versions { id } => {
      let versions = client
        .list_versions(id)
        .await
        .with_context(|| format!("failed to list versions of resume {id}"))?;
      print!("{}", render::versions(&versions));
    }
    Cmd::Share { action } => share(&client, action).await?,
    Cmd::Download { version, output } => {
      let bytes = client
        .download_pdf(version)
        .await
        .with_context(|| format!("failed to download version {version}"))?;
      tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
      println!("Wrote {} ({} bytes).", output.display(), bytes.len());
    }
    Cmd::Edit {
      id,
      import,
      template,
      title,
    } => edit(client, id, import, template, title).await?,
  }

  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn templates(
  client: &ApiClient,
  filter: Option<String>,
  show: Option<TemplateId>,
) -> Result<()> {
  if let Some(id) = show {
    let template = client
      .get_template(id)
      .await
      .with_context(|| format!("failed to fetch template {id}"))?;
    println!("{}: {}\n", template.name, template.description);
    println!("{}", template.html_content.unwrap_or_default());
    if let Some(css) = template.css_content {
      println!("\n<style>\n{css}\n</style>");
    }
    return Ok(());
  }

  let all = client.list_templates().await.context("failed to list templates")?;
  let matcher = SkimMatcherV2::default();
  let visible: Vec<Template> = match filter.as_deref() {
    None | Some("") => all,
    Some(query) => all
      .into_iter()
      .filter(|t| {
        matcher.fuzzy_match(&t.name, query).is_some()
          || matcher.fuzzy_match(&t.description, query).is_some()
          || matcher.fuzzy_match(t.role(), query).is_some()
      })
      .collect(),
  };
  print!("{}", render::templates(&group_by_role(&visible)));
  Ok(())
}

async fn share(client: &ApiClient, action: ShareCmd) -> Result<()> {
  match action {
    ShareCmd::Create { id, version } => {
      let link = client
        .create_share_link(ShareRequest {
          resume_id:       id,
          version_id:      version,
          expiration_date: None,
        })
        .await
        .context("failed to create share link")?;
      println!("{}", link.url(client.base_url()));
    }
    ShareCmd::List => {
      let links = client
        .list_share_links()
        .await
        .context("failed to list share links")?;
      print!("{}", render::share_links(&links, client.base_url()));
    }
    ShareCmd::Revoke { id } => {
      client
        .deactivate_share_link(id)
        .await
        .with_context(|| format!("failed to deactivate share link {id}"))?;
      println!("Share link {id} deactivated.");
    }
    ShareCmd::View { token } => {
      let resume = client
        .get_shared_resume(token)
        .await
        .context("failed to open share link")?;
      print!("{}", render::shared(&resume));
    }
  }
  Ok(())
}

async fn edit(
  client: ApiClient,
  id: Option<ResumeId>,
  import: Option<PathBuf>,
  template: Option<TemplateId>,
  title: Option<String>,
) -> Result<()> {
  let logged_in = client.is_logged_in();
  let base_url = client.base_url().to_string();
  let mut session = FormSession::new(Arc::new(client));

  if let Some(id) = id {
    session
      .load(id)
      .await
      .with_context(|| format!("failed to load resume {id}"))?;
  }
  if let Some(path) = import {
    let upload = app::read_upload(&path).await?;
    session
      .import_pdf(upload)
      .await
      .with_context(|| format!("failed to import {}", path.display()))?;
  }
  if let Some(title) = title {
    session.set_title(title);
  }
  if template.is_some() {
    session.set_template(template);
  }

  let alert = session.take_alert();
  let (mut app, mut completions) = FormApp::new(session, base_url);
  if !logged_in {
    app.push_output("[warning] Not logged in: saving and generation need `vitae login` first.");
  }
  if let Some(alert) = alert {
    app.push_output(&render::alert(&alert));
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app, &mut completions).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  let pending = app.session().in_flight();
  if !pending.is_empty() {
    tracing::warn!(?pending, "leaving with requests in flight; their results are discarded");
  }
  if app.session().state() == SessionState::Editing {
    println!("Unsaved changes were discarded.");
  }
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut FormApp<ApiClient>,
  completions: &mut mpsc::UnboundedReceiver<Completion<ClientError>>,
) -> Result<()> {
  loop {
    app.drain_completions(completions);
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }
  Ok(())
}

// ─── Prompts ──────────────────────────────────────────────────────────────────

/// Ask a yes/no question; anything but `y` or `yes` is a no.
fn confirm(question: &str, input: &mut impl BufRead) -> Result<bool> {
  print!("{question} [y/N] ");
  io::stdout().flush().ok();
  let mut line = String::new();
  input.read_line(&mut line).context("reading answer")?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Read a password from stdin.
fn read_password() -> Result<String> {
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading password")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
