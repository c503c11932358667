use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::ids::CaseId;
use crate::shared::logging::{append_engine_log_line, engine_log_path};
use crate::workflow::error::EngineError;
use crate::workflow::store::WorkflowInstance;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed persistence adapter for workflow instances. One JSON document
/// per case under the state root; writes are atomic and logged.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshotStore {
    state_root: PathBuf,
}

impl WorkflowSnapshotStore {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    pub fn save(&self, instance: &WorkflowInstance) -> Result<(), EngineError> {
        let path = self.case_path(&instance.case_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let body = serde_json::to_vec_pretty(instance).map_err(|e| json_error(&path, e))?;
        atomic_write_file(&path, &body).map_err(|e| io_error(&path, e))?;
        let line = format!(
            "case_id={} event=snapshot_saved current_step={} steps={}",
            instance.case_id,
            instance.current_step_id,
            instance.steps.len()
        );
        append_engine_log_line(&self.state_root, &line)
            .map_err(|e| io_error(engine_log_path(&self.state_root).as_path(), e))
    }

    /// Loads a case's persisted instance; a missing file means the case has
    /// never been saved, not a failure.
    pub fn load(&self, case_id: &CaseId) -> Result<Option<WorkflowInstance>, EngineError> {
        let path = self.case_path(case_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&path, source)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| json_error(&path, e))
    }

    fn case_path(&self, case_id: &CaseId) -> PathBuf {
        self.state_root
            .join("workflows/cases")
            .join(format!("{case_id}.json"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> EngineError {
    EngineError::Json {
        path: path.display().to_string(),
        source,
    }
}
