//! Application storage and the recalculation service.
//!
//! [`ApplicationRepository`] is the storage seam. Every stored application
//! carries a version that increases on each successful update; an update names
//! the version it was based on and is refused if the stored one has moved.
//! [`BenefitService`] builds the load, calculate and commit cycle on top of it.

mod memory;
mod service;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::Application;

pub use memory::InMemoryRepository;
pub use service::BenefitService;

/// An application together with its stored version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedApplication {
    /// The stored application.
    pub application: Application,
    /// Version of the stored record, starting at 1.
    pub version: u64,
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    /// Stores a new application at version 1.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::ConcurrentModification`](crate::error::EngineError::ConcurrentModification)
    /// if an application with the same id is already stored.
    fn insert(&self, application: Application) -> EngineResult<VersionedApplication>;

    /// Loads an application, or `None` if it is not stored.
    fn fetch(&self, id: Uuid) -> EngineResult<Option<VersionedApplication>>;

    /// Replaces a stored application and bumps its version.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::ApplicationNotFound`](crate::error::EngineError::ApplicationNotFound)
    /// if the application is not stored, and with
    /// [`EngineError::ConcurrentModification`](crate::error::EngineError::ConcurrentModification)
    /// if its version is no longer `expected_version`.
    fn update(
        &self,
        application: Application,
        expected_version: u64,
    ) -> EngineResult<VersionedApplication>;
}
