//! TUI rendering: header, field and output panes, status and command bars.

pub mod fields;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use vitae_core::{backend::ResumeBackend, session::SessionState};

use crate::app::{Focus, FormApp};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<B: ResumeBackend + 'static>(f: &mut Frame, app: &FormApp<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
      Constraint::Length(1), // command bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
  draw_command(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let session = app.session();
  let template = session
    .template_id()
    .map_or_else(|| "none".to_string(), |id| id.to_string());
  let left = Span::styled(
    format!(" vitae  {}  (template {template})", session.title()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} ", Local::now().format("%Y-%m-%d")),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  fields::draw(f, cols[0], app);
  draw_output(f, cols[1], app);
}

/// Tail of the output log, newest line at the bottom.
fn draw_output<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let block = Block::default()
    .title(" Output ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.log.is_empty() {
    f.render_widget(
      Paragraph::new("Press : to type a command, `help` lists them.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let visible = inner.height as usize;
  let start = app.log.len().saturating_sub(visible);
  let lines: Vec<Line> = app.log[start..]
    .iter()
    .map(|l| Line::from(Span::styled(l.as_str(), output_style(l))))
    .collect();
  f.render_widget(Paragraph::new(lines), inner);
}

/// Colour a log line by the alert tag it starts with.
fn output_style(line: &str) -> Style {
  if line.starts_with("[ok]") {
    Style::default().fg(Color::Green)
  } else if line.starts_with("[warning]") {
    Style::default().fg(Color::Yellow)
  } else if line.starts_with("[error]") || line.starts_with("error:") {
    Style::default().fg(Color::Red)
  } else if line.starts_with("> ") {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default()
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let session = app.session();
  let (mode_label, hints) = match app.focus {
    Focus::Fields => ("FORM", "↑↓/jk move  Enter edit field  : command  q quit"),
    Focus::Command => ("COMMAND", "Enter run  Esc cancel"),
  };

  let mut state = match session.state() {
    SessionState::Editing => "unsaved".to_string(),
    SessionState::Saved => "saved".to_string(),
  };
  for op in session.in_flight() {
    state.push_str(&format!(", {op}…"));
  }

  let message = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!(" {state} "), Style::default().fg(Color::Yellow)),
    Span::styled(
      format!(" {message}"),
      Style::default().fg(Color::Gray).patch(output_style(&message)),
    ),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Command bar ──────────────────────────────────────────────────────────────

fn draw_command<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let text = match app.focus {
    Focus::Command => format!(":{}_", app.command),
    Focus::Fields => String::new(),
  };
  f.render_widget(
    Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
    area,
  );
}
