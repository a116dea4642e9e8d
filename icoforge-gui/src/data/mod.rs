mod config;

pub use config::Config;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use druid::{im::Vector, Data, Lens};
use icoforge_core::util;

#[derive(Clone, Data, Lens)]
pub struct AppState {
    pub config: Config,
    pub inputs: Vector<InputFile>,
    pub size_input: String,
    pub job: Job,
    pub alerts: Vector<Alert>,
}

impl AppState {
    pub fn default_with_config(config: Config) -> Self {
        Self {
            config,
            inputs: Vector::new(),
            size_input: String::new(),
            job: Job {
                state: JobState::Idle,
                progress: 0.0,
                log: Vector::new(),
            },
            alerts: Vector::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.job.state == JobState::Running
    }

    pub fn begin_job(&mut self, total: usize) {
        self.job.state = JobState::Running;
        self.job.progress = 0.0;
        self.job.log.clear();
        self.job.push_log(format!("Converting {} images…", total));
    }

    pub fn finish_job(&mut self) {
        self.job.state = JobState::Idle;
    }
}

impl AppState {
    pub fn stage_input(&mut self, path: PathBuf) {
        if self
            .inputs
            .iter()
            .any(|file| file.path.as_ref() == &path)
        {
            self.info_alert(format!("Already staged: {}", path.display()));
            return;
        }
        if !util::has_supported_extension(&path) {
            self.error_alert(format!("Unsupported image format: {}", path.display()));
            return;
        }
        if !path.is_file() {
            self.error_alert(format!("Cannot open file: {}", path.display()));
            return;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.inputs.push_back(InputFile {
            path: Arc::new(path),
            name: name.into(),
        });
    }

    pub fn remove_input(&mut self, file: &InputFile) {
        self.inputs.retain(|staged| staged.path != file.path);
    }

    pub fn add_size_from_input(&mut self) {
        const MAX_EDITOR_SIZE: u32 = 1024;

        let raw = self.size_input.trim().to_string();
        if raw.is_empty() {
            return;
        }
        match raw.parse::<u32>() {
            Ok(0) => self.error_alert("Size must be a positive number of pixels"),
            Ok(size) if size > MAX_EDITOR_SIZE => {
                self.error_alert(format!("Sizes above {} px are not supported", MAX_EDITOR_SIZE));
            }
            Ok(size) => {
                if self.config.sizes.contains(&size) {
                    self.error_alert(format!("Size {} is already configured", size));
                } else {
                    // The size set is kept in descending order, the order the
                    // converter processes it in.
                    let index = self
                        .config
                        .sizes
                        .iter()
                        .position(|&other| other < size)
                        .unwrap_or(self.config.sizes.len());
                    self.config.sizes.insert(index, size);
                    self.size_input.clear();
                }
            }
            Err(_) => self.error_alert(format!("Not a valid size: {:?}", raw)),
        }
    }

    pub fn remove_size(&mut self, size: u32) {
        self.config.sizes.retain(|&other| other != size);
    }

    pub fn reset_sizes(&mut self) {
        self.config.sizes = util::DEFAULT_SIZES.iter().copied().collect();
    }
}

#[derive(Clone, Data, Lens)]
pub struct InputFile {
    #[data(eq)]
    pub path: Arc<PathBuf>,
    pub name: Arc<str>,
}

#[derive(Clone, Data, Lens)]
pub struct Job {
    pub state: JobState,
    pub progress: f64,
    pub log: Vector<Arc<str>>,
}

impl Job {
    pub fn push_log(&mut self, line: impl Into<Arc<str>>) {
        self.log.push_back(line.into());
    }
}

#[derive(Clone, Copy, Data, Eq, PartialEq)]
pub enum JobState {
    Idle,
    Running,
}

const ALERT_DURATION: Duration = Duration::from_secs(5);
static ALERT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Data, Lens)]
pub struct Alert {
    pub id: usize,
    pub message: Arc<str>,
    pub style: AlertStyle,
    #[data(ignore)]
    pub created_at: Instant,
}

#[derive(Clone, Copy, Data, Eq, PartialEq)]
pub enum AlertStyle {
    Error,
    Info,
}

impl AppState {
    pub fn error_alert(&mut self, message: impl Into<Arc<str>>) {
        self.add_alert(message, AlertStyle::Error);
    }

    pub fn info_alert(&mut self, message: impl Into<Arc<str>>) {
        self.add_alert(message, AlertStyle::Info);
    }

    pub fn cleanup_alerts(&mut self) {
        let now = Instant::now();
        self.alerts
            .retain(|alert| now.duration_since(alert.created_at) < ALERT_DURATION);
    }

    fn add_alert(&mut self, message: impl Into<Arc<str>>, style: AlertStyle) {
        let alert = Alert {
            id: ALERT_ID.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            style,
            created_at: Instant::now(),
        };
        self.alerts.push_back(alert);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn state() -> AppState {
        AppState::default_with_config(Config::default())
    }

    #[test]
    fn cleanup_drops_only_expired_alerts() {
        let mut state = state();
        state.error_alert("stale");
        state.alerts[0].created_at = Instant::now() - (ALERT_DURATION + Duration::from_secs(1));
        state.info_alert("fresh");

        state.cleanup_alerts();

        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.alerts[0].message.as_ref(), "fresh");
    }

    #[test]
    fn staging_rejects_duplicates_and_unsupported_files() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, b"").unwrap();
        let text = dir.path().join("notes.txt");
        fs::write(&text, b"").unwrap();

        let mut state = state();
        state.stage_input(image.clone());
        state.stage_input(image.clone());
        state.stage_input(text);
        state.stage_input(dir.path().join("missing.png"));

        assert_eq!(state.inputs.len(), 1);
        assert_eq!(state.inputs[0].path.as_ref(), &image);
        // One duplicate notice, plus one alert per rejected file.
        assert_eq!(state.alerts.len(), 3);
    }

    #[test]
    fn size_editor_keeps_a_descending_duplicate_free_set() {
        let mut state = state();
        state.config.sizes = Vector::new();

        for input in ["64", "256", "64", "0", "4096", "sixteen", "16"] {
            state.size_input = input.to_string();
            state.add_size_from_input();
        }

        let sizes: Vec<u32> = state.config.sizes.iter().copied().collect();
        assert_eq!(sizes, vec![256, 64, 16]);
        // Duplicate, zero, oversize, and unparsable entries each alert.
        assert_eq!(state.alerts.len(), 4);
        // Accepted entries clear the input box, rejected ones keep it.
        assert_eq!(state.size_input, "");
    }
}
