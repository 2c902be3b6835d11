use crate::errors::GoalError;
use crate::models::{Goal, GoalId, StoredDocument, StoredGoals};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

/// Owns the ordered goal collection and its on-disk copy.
///
/// Every [`GoalStore::persist`] bumps `revision`, which is what renderers
/// compare to know the board changed.
#[derive(Debug)]
pub struct GoalStore {
    path: PathBuf,
    goals: Vec<Goal>,
    revision: u64,
}

impl GoalStore {
    /// Reads the stored collection. Missing, unreadable or malformed data
    /// yields an empty collection; the failure is only logged.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let goals = match fs::read(&path).await {
            Ok(bytes) => match decode_goals(&bytes) {
                Ok(goals) => goals,
                Err(err) => {
                    error!("failed to parse goals file: {err}");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read goals file: {err}");
                Vec::new()
            }
        };

        Self {
            path,
            goals,
            revision: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all(&self) -> &[Goal] {
        &self.goals
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn position(&self, id: GoalId) -> Option<usize> {
        self.goals.iter().position(|goal| goal.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<GoalId> {
        self.goals.get(index).map(|goal| goal.id)
    }

    pub(crate) fn get_mut(&mut self, id: GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    pub(crate) fn push(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    pub(crate) fn remove(&mut self, id: GoalId) -> Option<Goal> {
        let index = self.position(id)?;
        Some(self.goals.remove(index))
    }

    /// Overwrites the stored copy with the full collection.
    pub async fn persist(&mut self) -> Result<(), GoalError> {
        let payload = serde_json::to_vec_pretty(&StoredGoals { goals: &self.goals })?;
        fs::write(&self.path, payload)
            .await
            .map_err(|source| GoalError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        self.revision += 1;
        debug!(revision = self.revision, goals = self.goals.len(), "goals persisted");
        Ok(())
    }
}

/// Parses a stored document and checks the collection invariants.
pub fn decode_goals(bytes: &[u8]) -> Result<Vec<Goal>, GoalError> {
    let goals = serde_json::from_slice::<StoredDocument>(bytes)?.into_goals();

    let mut seen = HashSet::with_capacity(goals.len());
    for (index, goal) in goals.iter().enumerate() {
        if goal.name.trim().is_empty() {
            return Err(GoalError::MalformedState(format!(
                "goal {index} has an empty name"
            )));
        }
        if goal.target_days == 0 {
            return Err(GoalError::MalformedState(format!(
                "goal {index} has a zero day target"
            )));
        }
        if !seen.insert(goal.id) {
            return Err(GoalError::MalformedState(format!(
                "duplicate goal id {}",
                goal.id
            )));
        }
    }

    Ok(goals)
}
