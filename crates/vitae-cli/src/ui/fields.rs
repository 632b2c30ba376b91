//! Field list pane: every editable leaf of the document, grouped by section.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};
use vitae_core::backend::ResumeBackend;

use crate::{
  app::{Focus, FormApp},
  render,
};

const ADDRESS_WIDTH: usize = 40;

/// Render the field list into `area`.
pub fn draw<B: ResumeBackend + 'static>(f: &mut Frame, area: Rect, app: &FormApp<B>) {
  let session = app.session();
  let sections = render::sections(session.document());
  let improving = session
    .improving_job()
    .map(|job| format!("work_experience[{job}].title"));

  let border = match app.focus {
    Focus::Fields => Color::Cyan,
    Focus::Command => Color::DarkGray,
  };
  let block = Block::default()
    .title(" Resume ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut items: Vec<ListItem> = Vec::new();
  let mut selected = None;
  let mut last_field = None;
  let mut field_index = 0usize;
  for (title, fields) in &sections {
    items.push(ListItem::new(Line::from(Span::styled(
      *title,
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ))));
    if fields.is_empty() {
      items.push(ListItem::new(Span::styled(
        "  (none)",
        Style::default().fg(Color::DarkGray),
      )));
    }
    for (address, value) in fields {
      if field_index == app.field_cursor {
        selected = Some(items.len());
      }
      last_field = Some(items.len());
      field_index += 1;

      let mut spans = vec![
        Span::styled(
          format!("  {address:<width$} ", width = ADDRESS_WIDTH),
          Style::default().fg(Color::DarkGray),
        ),
        if value.is_empty() {
          Span::styled("-", Style::default().fg(Color::DarkGray))
        } else {
          Span::raw(value.clone())
        },
      ];
      if improving.as_deref() == Some(address.as_str()) {
        spans.push(Span::styled(
          "  improving…",
          Style::default().fg(Color::Yellow),
        ));
      }
      items.push(ListItem::new(Line::from(spans)));
    }
  }

  // A cursor past the end (after a removal) sticks to the last field.
  let mut state = ListState::default();
  state.select(selected.or(last_field));
  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}
