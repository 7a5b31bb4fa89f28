use crate::models::{Job, JobSummary};
use crate::view;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Jobs,
    Detail,
    Logs,
    Settings,
}

impl Page {
    pub fn next(self) -> Self {
        match self {
            Page::Jobs => Page::Detail,
            Page::Detail => Page::Logs,
            Page::Logs => Page::Settings,
            Page::Settings => Page::Jobs,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Page::Jobs => Page::Settings,
            Page::Detail => Page::Jobs,
            Page::Logs => Page::Detail,
            Page::Settings => Page::Logs,
        }
    }
}

/// Where the current job fetch stands. `NotFound` is its own display state,
/// separate from transport failures which leave the last snapshot up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    NotFound,
}

#[derive(Debug, Default, Clone)]
pub struct AppState {
    pub page: Page,
    pub jobs: Vec<JobSummary>,
    pub job_index: Option<usize>,
    /// Latest job snapshot; replaced wholesale on every successful fetch.
    pub job: Option<Job>,
    pub job_phase: FetchPhase,
    /// Names of steps whose log panes are expanded.
    pub expanded: HashSet<String>,
    pub step_index: Option<usize>,
    pub status: String,
    pub last_error: Option<String>,
    pub refreshing: bool,
}

impl AppState {
    pub fn select_job(&mut self, delta: i32) {
        self.job_index = move_index(self.job_index, self.jobs.len(), delta);
    }

    pub fn select_step(&mut self, delta: i32) {
        let len = self.job.as_ref().map(|j| j.steps.len()).unwrap_or(0);
        self.step_index = move_index(self.step_index, len, delta);
    }

    pub fn selected_job_id(&self) -> Option<&str> {
        self.job_index
            .and_then(|idx| self.jobs.get(idx))
            .map(|j| j.id.as_str())
    }

    pub fn selected_step_name(&self) -> Option<&str> {
        let job = self.job.as_ref()?;
        self.step_index
            .and_then(|idx| job.steps.get(idx))
            .map(|s| s.name.as_str())
    }

    pub fn toggle_selected_step(&mut self) {
        if let Some(name) = self.selected_step_name().map(str::to_string) {
            self.expanded = view::toggle_expansion(&self.expanded, &name);
        }
    }

    /// Installs a fresh snapshot, keeping expansion state keyed by step name.
    pub fn replace_job(&mut self, job: Job) {
        if self.step_index.map(|idx| idx >= job.steps.len()).unwrap_or(true) {
            self.step_index = if job.steps.is_empty() { None } else { Some(0) };
        }
        self.job = Some(job);
        self.job_phase = FetchPhase::Loaded;
    }
}

fn move_index(current: Option<usize>, len: usize, delta: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let idx = current.unwrap_or(0) as i32 + delta;
    let idx = idx.clamp(0, (len as i32) - 1);
    Some(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PipelineStep;

    fn job_with_steps(names: &[&str]) -> Job {
        Job {
            id: "j1".into(),
            steps: names
                .iter()
                .map(|name| PipelineStep {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn move_index_clamps_at_both_ends() {
        assert_eq!(move_index(None, 0, 1), None);
        assert_eq!(move_index(None, 3, 1), Some(1));
        assert_eq!(move_index(Some(0), 3, -1), Some(0));
        assert_eq!(move_index(Some(2), 3, 1), Some(2));
    }

    #[test]
    fn toggling_the_selected_step_flips_its_pane() {
        let mut state = AppState::default();
        state.replace_job(job_with_steps(&["build", "test"]));
        assert_eq!(state.step_index, Some(0));

        state.toggle_selected_step();
        assert!(state.expanded.contains("build"));
        state.toggle_selected_step();
        assert!(!state.expanded.contains("build"));
    }

    #[test]
    fn replacing_a_snapshot_keeps_selection_in_bounds() {
        let mut state = AppState::default();
        state.replace_job(job_with_steps(&["a", "b", "c"]));
        state.select_step(2);
        assert_eq!(state.step_index, Some(2));

        state.replace_job(job_with_steps(&["a"]));
        assert_eq!(state.step_index, Some(0));
        assert_eq!(state.job_phase, FetchPhase::Loaded);
    }

    #[test]
    fn expansion_survives_snapshot_replacement() {
        let mut state = AppState::default();
        state.replace_job(job_with_steps(&["build", "test"]));
        state.toggle_selected_step();
        state.replace_job(job_with_steps(&["build", "test", "deploy"]));
        assert!(state.expanded.contains("build"));
    }

    #[test]
    fn pages_cycle_both_ways() {
        let mut page = Page::Jobs;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, Page::Jobs);
        assert_eq!(Page::Jobs.prev(), Page::Settings);
    }
}
