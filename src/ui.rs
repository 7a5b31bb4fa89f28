use crate::app::App;
use crate::models::{Job, PipelineStep};
use crate::state::{FetchPhase, Page};
use crate::view;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use std::fmt::Write as _;

pub fn draw(f: &mut Frame<'_>, app: &App) {
    let size = f.size();
    let now = Utc::now();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    draw_tabs(f, chunks[0], app);
    draw_action_bar(f, chunks[1], app.state.page);
    draw_body(f, chunks[2], app, now);
    draw_status(f, chunks[3], app);
}

fn draw_tabs(f: &mut Frame<'_>, area: Rect, app: &App) {
    let titles = ["Jobs", "Detail", "Logs", "Settings"]
        .into_iter()
        .map(|t| Line::from(Span::styled(t, Style::default().fg(Color::Cyan))))
        .collect::<Vec<_>>();
    let idx = match app.state.page {
        Page::Jobs => 0,
        Page::Detail => 1,
        Page::Logs => 2,
        Page::Settings => 3,
    };
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Pages"))
        .select(idx)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_action_bar(f: &mut Frame<'_>, area: Rect, page: Page) {
    let (primary, secondary) = match page {
        Page::Jobs => (
            vec![("Enter", "Open job"), ("j/k", "Select")],
            vec![("r", "Refresh"), ("h", "Help"), ("q", "Quit")],
        ),
        Page::Detail => (
            vec![("Enter", "Expand/collapse step"), ("j/k", "Select step")],
            vec![("r", "Refresh"), ("h", "Help"), ("q", "Quit")],
        ),
        Page::Logs => (
            vec![("3", "Reload logs")],
            vec![("r", "Refresh"), ("h", "Help"), ("q", "Quit")],
        ),
        Page::Settings => (vec![], vec![("h", "Help"), ("q", "Quit")]),
    };

    let primary_line = action_line(primary, true);
    let secondary_line = action_line(secondary, false);
    let para = Paragraph::new(vec![primary_line, secondary_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Actions — {}", page_label(page))),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_body(f: &mut Frame<'_>, area: Rect, app: &App, now: DateTime<Utc>) {
    match app.state.page {
        Page::Jobs => draw_jobs(f, area, app),
        Page::Detail => draw_detail(f, area, app, now),
        Page::Logs => draw_logs(f, area, app),
        Page::Settings => draw_settings(f, area, app),
    }
}

fn draw_jobs(f: &mut Frame<'_>, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .state
        .jobs
        .iter()
        .map(|job| {
            // Duration is only meaningful once the job is terminal.
            let duration = job
                .duration
                .filter(|_| job.status.is_terminal())
                .map(|secs| format!(" {secs}s"))
                .unwrap_or_default();
            let line = Line::from(vec![
                Span::raw(format!("{} ", job.status.glyph())),
                Span::raw(format!("{} • {} ({})", job.id, job.repo_name, job.branch)),
                Span::styled(
                    format!(" [{}]", job.status.label()),
                    Style::default().fg(job.status.color()),
                ),
                Span::styled(duration, Style::default().fg(Color::DarkGray)),
            ]);
            ListItem::new(line)
        })
        .collect();
    let mut list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Jobs"))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    if let Some(idx) = app.state.job_index {
        list = list.highlight_symbol("➤ ");
        f.render_stateful_widget(list, area, &mut make_state(idx));
    } else {
        f.render_widget(list, area);
    }
}

fn draw_detail(f: &mut Frame<'_>, area: Rect, app: &App, now: DateTime<Utc>) {
    match app.state.job_phase {
        FetchPhase::Loading => {
            draw_notice(f, area, "Loading job details...", Color::Gray);
            return;
        }
        FetchPhase::NotFound => {
            draw_notice(f, area, "Job not found", Color::Red);
            return;
        }
        FetchPhase::Idle => {
            draw_notice(f, area, "No job loaded — pick one on the Jobs page", Color::Gray);
            return;
        }
        FetchPhase::Loaded => {}
    }
    let Some(job) = &app.state.job else {
        draw_notice(f, area, "No job loaded — pick one on the Jobs page", Color::Gray);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)].as_ref())
        .split(area);
    draw_job_header(f, rows[0], job, now);
    draw_steps(f, rows[1], app, job, now);
}

fn draw_job_header(f: &mut Frame<'_>, area: Rect, job: &Job, now: DateTime<Utc>) {
    let short_sha: String = job.commit_sha.chars().take(8).collect();
    let duration = view::format_duration(view::elapsed_secs(job.started_at, job.completed_at, now));
    let started = job
        .started_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "Not started".to_string());
    let text = vec![
        Line::from(vec![
            Span::raw(format!("{} ", job.status.glyph())),
            Span::styled(
                format!("Job {}", job.id),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  [{}]", job.status.label()),
                Style::default()
                    .fg(job.status.color())
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            job.repo_url.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(format!(
            "Branch: {} • Commit: {} • Duration: {} • Started: {}",
            job.branch, short_sha, duration, started
        )),
    ];
    let para = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(view::repo_display_name(&job.repo_url)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_steps(f: &mut Frame<'_>, area: Rect, app: &App, job: &Job, now: DateTime<Utc>) {
    let mut lines: Vec<Line> = Vec::new();
    for (idx, step) in job.steps.iter().enumerate() {
        let selected = app.state.step_index == Some(idx);
        let expanded = app.state.expanded.contains(&step.name);
        lines.push(step_title_line(step, selected, expanded, now));
        lines.push(Line::from(Span::styled(
            format!("     $ {}", step.run),
            Style::default().fg(Color::DarkGray),
        )));
        if expanded {
            if step.logs.is_empty() {
                lines.push(Line::from(Span::styled(
                    "     No logs yet...",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            } else {
                for log in &step.logs {
                    lines.push(Line::from(Span::styled(
                        format!("     {log}"),
                        Style::default().fg(view::classify_log_line(log).color()),
                    )));
                }
            }
            if step.status == crate::models::StepStatus::Running {
                lines.push(Line::from(Span::styled(
                    "     ▋",
                    Style::default().fg(Color::Green),
                )));
            }
        }
    }
    let para = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pipeline Steps"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn step_title_line(
    step: &PipelineStep,
    selected: bool,
    expanded: bool,
    now: DateTime<Utc>,
) -> Line<'static> {
    let marker = if selected { "➤ " } else { "  " };
    let arrow = if expanded { "▼" } else { "▶" };
    let duration = view::elapsed_secs(step.started_at, step.completed_at, now)
        .map(|secs| format!(" {secs}s"))
        .unwrap_or_default();
    let mut spans = vec![
        Span::raw(marker.to_string()),
        Span::raw(format!("{} {} ", step.status.glyph(), arrow)),
        Span::styled(
            step.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" [{}]", step.status.label()),
            Style::default().fg(step.status.color()),
        ),
        Span::styled(duration, Style::default().fg(Color::DarkGray)),
    ];
    if selected {
        for span in &mut spans {
            span.style = span.style.bg(Color::Blue);
        }
    }
    Line::from(spans)
}

fn draw_logs(f: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(job) = &app.state.job else {
        draw_notice(f, area, "No job loaded — pick one on the Jobs page", Color::Gray);
        return;
    };
    let live = view::should_poll(job.status);
    let mut title = "Job Execution Logs".to_string();
    if live {
        title.push_str(" • LIVE");
    }

    // Tail the lines to the viewport; the newest output stays visible.
    let capacity = area.height.saturating_sub(2) as usize;
    let reserved = if live { 1 } else { 0 };
    let visible = capacity.saturating_sub(reserved);
    let start = job.logs.len().saturating_sub(visible);

    let mut lines: Vec<Line> = Vec::new();
    if job.logs.is_empty() {
        lines.push(Line::from(Span::styled(
            "No logs available",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    } else {
        for (offset, log) in job.logs[start..].iter().enumerate() {
            let number = start + offset + 1;
            lines.push(Line::from(vec![
                Span::styled(format!("{number:>4} "), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    log.clone(),
                    Style::default().fg(view::classify_log_line(log).color()),
                ),
            ]));
        }
    }
    if live {
        lines.push(Line::from(Span::styled(
            "▋",
            Style::default().fg(Color::Green),
        )));
    }
    let para = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(if live {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    f.render_widget(para, area);
}

fn draw_settings(f: &mut Frame<'_>, area: Rect, app: &App) {
    let text: Vec<Line> = vec![
        Line::from(format!("Job source: {}", app.source.describe())),
        Line::from(format!(
            "Auto-refresh: every {}s while a job is running",
            app.refresh_interval.as_secs()
        )),
        Line::from(format!("jobdash v{}", env!("CARGO_PKG_VERSION"))),
        Line::from("Read-only dashboard"),
    ];
    let para = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame<'_>, area: Rect, app: &App) {
    let mut line = format!("Status: {}", app.state.status);
    if app.state.refreshing {
        line.push_str(" • refreshing");
    }
    if let Some(err) = &app.state.last_error {
        let _ = write!(line, " • Error: {}", err);
    }
    let para = Paragraph::new(line)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_notice(f: &mut Frame<'_>, area: Rect, message: &str, color: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Percentage(40),
            ]
            .as_ref(),
        )
        .split(area);
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(block, area);
    let para = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    f.render_widget(para, rows[1]);
}

fn page_label(page: Page) -> &'static str {
    match page {
        Page::Jobs => "Jobs",
        Page::Detail => "Detail",
        Page::Logs => "Logs",
        Page::Settings => "Settings",
    }
}

fn action_line(items: Vec<(&str, &str)>, emphasize: bool) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();
    for (idx, (key, label)) in items.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default()
                .bg(if emphasize { Color::Green } else { Color::Blue })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn make_state(selected: usize) -> ListState {
    let mut state = ListState::default();
    state.select(Some(selected));
    state
}
