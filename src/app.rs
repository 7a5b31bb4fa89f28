use crate::{
    api::{ApiError, JobSource},
    state::{AppState, FetchPhase, Page},
    ui, view,
};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::time::interval;
use tracing::warn;

pub struct App {
    pub state: AppState,
    pub source: JobSource,
    pub refresh_interval: Duration,
}

impl App {
    pub fn new(source: JobSource, refresh_interval: Duration) -> Self {
        Self {
            state: AppState {
                status: "Ready".to_string(),
                ..Default::default()
            },
            source,
            refresh_interval,
        }
    }

    pub async fn run(&mut self, initial_job: Option<String>) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let mut reader = EventStream::new();
        let mut ticker = interval(self.refresh_interval);
        self.load_jobs().await;
        if let Some(job_id) = initial_job {
            self.open_job(&job_id).await;
        }

        // The tick arm awaits its fetch before the next select, so ticks never
        // overlap an in-flight request and the newest snapshot always wins.
        loop {
            terminal.draw(|f| ui::draw(f, self))?;
            tokio::select! {
                maybe_event = reader.next() => {
                    if let Some(Ok(evt)) = maybe_event {
                        if self.handle_event(evt).await {
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.poll_tick().await;
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    async fn handle_event(&mut self, evt: Event) -> bool {
        match evt {
            Event::Key(key) => self.handle_key(key).await,
            _ => false,
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => {
                self.refresh_all().await;
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.state.status =
                    "Keys: tab/←/→ pages • 1-4 jump • ↑↓/j/k move • Enter open/toggle • r refresh • q quit"
                        .into();
            }
            KeyCode::Tab | KeyCode::Right => {
                self.set_page(self.state.page.next()).await;
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.set_page(self.state.page.prev()).await;
            }
            KeyCode::Char('1') => self.set_page(Page::Jobs).await,
            KeyCode::Char('2') => self.set_page(Page::Detail).await,
            KeyCode::Char('3') => self.set_page(Page::Logs).await,
            KeyCode::Char('4') => self.set_page(Page::Settings).await,
            KeyCode::Down | KeyCode::Char('j') => self.handle_move(1),
            KeyCode::Up | KeyCode::Char('k') => self.handle_move(-1),
            KeyCode::Enter | KeyCode::Char(' ') => self.handle_activate().await,
            _ => {}
        }
        false
    }

    async fn set_page(&mut self, page: Page) {
        self.state.page = page;
        // Opening (or re-selecting) the log viewer pulls the freshest lines
        // through the dedicated logs endpoint.
        if page == Page::Logs {
            self.refresh_logs().await;
        }
    }

    fn handle_move(&mut self, delta: i32) {
        match self.state.page {
            Page::Jobs => self.state.select_job(delta),
            Page::Detail => self.state.select_step(delta),
            _ => {}
        }
    }

    async fn handle_activate(&mut self) {
        match self.state.page {
            Page::Jobs => {
                if let Some(job_id) = self.state.selected_job_id().map(str::to_string) {
                    self.open_job(&job_id).await;
                }
            }
            Page::Detail => self.state.toggle_selected_step(),
            _ => {}
        }
    }

    /// One poll cycle. Re-fetching is gated on the latest snapshot being
    /// `running`; it stops on its own once the job goes terminal.
    async fn poll_tick(&mut self) {
        let live = self.state.job_phase == FetchPhase::Loaded
            && self
                .state
                .job
                .as_ref()
                .map(|job| view::should_poll(job.status))
                .unwrap_or(false);
        if live {
            self.refresh_job().await;
        }
    }

    async fn refresh_all(&mut self) {
        self.state.last_error = None;
        self.state.status = "Refreshing...".to_string();
        self.load_jobs().await;
        if self.state.job.is_some() {
            self.refresh_job().await;
        }
    }

    async fn load_jobs(&mut self) {
        self.state.refreshing = true;
        match self.source.jobs().await {
            Ok(data) => {
                self.state.jobs = data;
                if self.state.jobs.is_empty() {
                    self.state.job_index = None;
                } else if self
                    .state
                    .job_index
                    .map(|idx| idx >= self.state.jobs.len())
                    .unwrap_or(true)
                {
                    self.state.job_index = Some(0);
                }
                self.state.status = format!("{} jobs", self.state.jobs.len());
            }
            Err(err) => self.set_error(err),
        }
        self.state.refreshing = false;
    }

    async fn open_job(&mut self, job_id: &str) {
        self.state.page = Page::Detail;
        if self.state.job.as_ref().map(|j| j.id.as_str()) != Some(job_id) {
            self.state.job = None;
            self.state.step_index = None;
            self.state.expanded.clear();
        }
        self.state.job_phase = FetchPhase::Loading;
        self.fetch_job(job_id).await;
    }

    async fn refresh_job(&mut self) {
        if let Some(job_id) = self.state.job.as_ref().map(|j| j.id.clone()) {
            self.fetch_job(&job_id).await;
        }
    }

    async fn fetch_job(&mut self, job_id: &str) {
        match self.source.job(job_id).await {
            Ok(job) => {
                self.state.replace_job(job);
                self.state.status = format!("Job {job_id}");
            }
            Err(err) if err.is_not_found() => {
                self.state.job_phase = FetchPhase::NotFound;
                self.state.status = format!("Job {job_id} not found");
            }
            Err(err) => {
                // Stale snapshot beats a blank screen; keep whatever we had.
                self.set_error(err);
                self.state.job_phase = if self.state.job.is_some() {
                    FetchPhase::Loaded
                } else {
                    FetchPhase::Idle
                };
            }
        }
    }

    /// One-shot pull of the whole-job log lines through the dedicated logs
    /// endpoint, run when the log viewer is opened. The poll ticks afterwards
    /// carry full snapshots, logs included.
    async fn refresh_logs(&mut self) {
        let Some(job_id) = self.state.job.as_ref().map(|j| j.id.clone()) else {
            return;
        };
        match self.source.job_logs(&job_id).await {
            Ok(logs) => {
                if let Some(job) = self.state.job.as_mut() {
                    job.logs = logs;
                }
            }
            Err(err) => self.set_error(err),
        }
    }

    fn set_error(&mut self, err: ApiError) {
        warn!(error = %err, "fetch failed");
        self.state.last_error = Some(err.to_string());
    }
}
