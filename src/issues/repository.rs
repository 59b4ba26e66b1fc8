//! In-memory issue storage.

use dashmap::DashMap;
use thiserror::Error;

use super::model::Issue;

/// Errors from repository operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("issue {0} already exists")]
    Duplicate(u64),

    #[error("issue {0} not found")]
    NotFound(u64),
}

/// In-memory issue repository shared across request handlers.
///
/// Stands in for the persistence engine; the service treats record storage
/// as an external collaborator behind this interface.
#[derive(Default)]
pub struct IssueRepository {
    issues: DashMap<u64, Issue>,
}

impl IssueRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// All issues, ordered by id.
    pub fn list(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self.issues.iter().map(|e| e.value().clone()).collect();
        issues.sort_by_key(|i| i.id);
        issues
    }

    /// Fetch one issue by id.
    pub fn get(&self, id: u64) -> Option<Issue> {
        self.issues.get(&id).map(|e| e.value().clone())
    }

    /// Insert a new issue. Fails when the id is already taken.
    pub fn insert(&self, issue: Issue) -> Result<(), RepositoryError> {
        match self.issues.entry(issue.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(RepositoryError::Duplicate(issue.id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(issue);
                Ok(())
            }
        }
    }

    /// Replace an existing issue.
    pub fn update(&self, issue: Issue) -> Result<(), RepositoryError> {
        match self.issues.entry(issue.id) {
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                slot.insert(issue);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(_) => Err(RepositoryError::NotFound(issue.id)),
        }
    }

    /// Remove an issue by id, returning it if it existed.
    pub fn remove(&self, id: u64) -> Option<Issue> {
        self.issues.remove(&id).map(|(_, issue)| issue)
    }

    /// Number of stored issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
