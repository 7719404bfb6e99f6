//! In-memory application repository.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{ApplicationRepository, VersionedApplication};
use crate::error::{EngineError, EngineResult};
use crate::models::Application;

/// A repository keeping applications in a shared map.
///
/// Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<Uuid, VersionedApplication>>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored applications.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.records()?.len())
    }

    /// Returns whether no applications are stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.records()?.is_empty())
    }

    fn records(&self) -> EngineResult<MutexGuard<'_, HashMap<Uuid, VersionedApplication>>> {
        self.records
            .lock()
            .map_err(|_| EngineError::RepositoryUnavailable {
                message: "application store lock poisoned".to_string(),
            })
    }
}

impl ApplicationRepository for InMemoryRepository {
    fn insert(&self, application: Application) -> EngineResult<VersionedApplication> {
        let mut records = self.records()?;
        if let Some(existing) = records.get(&application.id) {
            return Err(EngineError::ConcurrentModification {
                id: application.id,
                expected: 0,
                found: existing.version,
            });
        }

        let stored = VersionedApplication {
            application,
            version: 1,
        };
        records.insert(stored.application.id, stored.clone());
        Ok(stored)
    }

    fn fetch(&self, id: Uuid) -> EngineResult<Option<VersionedApplication>> {
        Ok(self.records()?.get(&id).cloned())
    }

    fn update(
        &self,
        application: Application,
        expected_version: u64,
    ) -> EngineResult<VersionedApplication> {
        let mut records = self.records()?;
        let id = application.id;
        let current = records
            .get_mut(&id)
            .ok_or(EngineError::ApplicationNotFound { id })?;
        if current.version != expected_version {
            return Err(EngineError::ConcurrentModification {
                id,
                expected: expected_version,
                found: current.version,
            });
        }

        current.application = application;
        current.version += 1;
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employment;

    fn application() -> Application {
        Application::new(None, Employment::default())
    }

    #[test]
    fn test_insert_starts_at_version_one() {
        let repository = InMemoryRepository::new();
        let stored = repository.insert(application()).unwrap();

        assert_eq!(stored.version, 1);
        assert_eq!(repository.len().unwrap(), 1);
        assert_eq!(
            repository.fetch(stored.application.id).unwrap(),
            Some(stored)
        );
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let repository = InMemoryRepository::new();
        let application = application();
        repository.insert(application.clone()).unwrap();

        let result = repository.insert(application);
        assert!(matches!(
            result,
            Err(EngineError::ConcurrentModification { found: 1, .. })
        ));
    }

    #[test]
    fn test_update_bumps_version() {
        let repository = InMemoryRepository::new();
        let stored = repository.insert(application()).unwrap();

        let updated = repository.update(stored.application, 1).unwrap();
        assert_eq!(updated.version, 2);
    }

    #[test]
    fn test_stale_update_is_rejected() {
        let repository = InMemoryRepository::new();
        let stored = repository.insert(application()).unwrap();
        repository.update(stored.application.clone(), 1).unwrap();

        let result = repository.update(stored.application, 1);
        match result {
            Err(EngineError::ConcurrentModification {
                expected, found, ..
            }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("Expected ConcurrentModification, got {:?}", other),
        }
    }

    #[test]
    fn test_update_of_unknown_application_fails() {
        let repository = InMemoryRepository::new();
        let result = repository.update(application(), 1);
        assert!(matches!(result, Err(EngineError::ApplicationNotFound { .. })));
    }

    #[test]
    fn test_fetch_unknown_is_none() {
        let repository = InMemoryRepository::new();
        assert!(repository.fetch(Uuid::new_v4()).unwrap().is_none());
        assert!(repository.is_empty().unwrap());
    }
}
