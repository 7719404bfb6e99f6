//! Service composing the repository and the benefit calculator.
//!
//! Every mutating operation follows the same cycle: load the application and
//! its version, apply the change and recalculate on the loaded copy, then
//! commit against the loaded version. Nothing is written unless the whole
//! cycle succeeds. A per-application in-flight guard keeps two recalculations
//! of the same application from overlapping inside one service, and the
//! version check catches writers that bypass it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};
use uuid::Uuid;

use super::{ApplicationRepository, VersionedApplication};
use crate::calculation::{BenefitCalculator, CalculationOutcome};
use crate::config::BenefitConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Application, ApplicationStatus};

/// Benefit calculation on top of an application repository.
pub struct BenefitService<R> {
    repository: Arc<R>,
    calculator: BenefitCalculator,
    in_flight: Mutex<HashSet<Uuid>>,
}

/// Marks an application as being recalculated until dropped.
struct InFlight<'a> {
    ids: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        ids.remove(&self.id);
    }
}

impl<R> BenefitService<R>
where
    R: ApplicationRepository,
{
    /// Creates a service over `repository` calculating with `config`.
    pub fn new(repository: Arc<R>, config: BenefitConfig) -> Self {
        Self {
            repository,
            calculator: BenefitCalculator::new(config),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Stores a new application.
    pub fn submit(&self, application: Application) -> EngineResult<VersionedApplication> {
        let stored = self.repository.insert(application)?;
        info!(
            application_id = %stored.application.id,
            status = ?stored.application.status(),
            "Application stored"
        );
        Ok(stored)
    }

    /// Loads an application.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::ApplicationNotFound`] if it is not stored.
    pub fn get(&self, id: Uuid) -> EngineResult<VersionedApplication> {
        self.repository
            .fetch(id)?
            .ok_or(EngineError::ApplicationNotFound { id })
    }

    /// Moves an application to `status` and recalculates it.
    ///
    /// Leaving draft creates the calculation, so the first submission is
    /// calculated right away.
    pub fn set_status(&self, id: Uuid, status: ApplicationStatus) -> EngineResult<CalculationOutcome> {
        self.commit(id, false, |application| application.set_status(status))
    }

    /// Applies a handler edit and recalculates.
    ///
    /// If the edit or the recalculation fails, nothing is stored.
    pub fn update<F>(&self, id: Uuid, edit: F) -> EngineResult<CalculationOutcome>
    where
        F: FnOnce(&mut Application) -> EngineResult<()>,
    {
        self.commit(id, false, edit)
    }

    /// Recalculates an application without changing its inputs.
    pub fn recalculate(&self, id: Uuid, override_status: bool) -> EngineResult<CalculationOutcome> {
        self.commit(id, override_status, |_| Ok(()))
    }

    /// Stores a copy of an application for renewed handling.
    ///
    /// The copy gets a new id and is recalculated regardless of its status.
    pub fn clone_application(&self, id: Uuid) -> EngineResult<VersionedApplication> {
        let source = self.get(id)?;
        let mut clone = source.application.clone_for_handling();
        let outcome = self.calculator.calculate(&mut clone, true)?;
        info!(
            source_id = %id,
            application_id = %clone.id,
            state = ?outcome.state,
            "Application cloned"
        );
        self.repository.insert(clone)
    }

    fn begin(&self, id: Uuid) -> EngineResult<InFlight<'_>> {
        let mut ids = self
            .in_flight
            .lock()
            .map_err(|_| EngineError::RepositoryUnavailable {
                message: "in-flight registry lock poisoned".to_string(),
            })?;
        if !ids.insert(id) {
            warn!(application_id = %id, "Recalculation already in progress");
            return Err(EngineError::CalculationLocked { id });
        }
        Ok(InFlight {
            ids: &self.in_flight,
            id,
        })
    }

    fn commit<F>(&self, id: Uuid, override_status: bool, edit: F) -> EngineResult<CalculationOutcome>
    where
        F: FnOnce(&mut Application) -> EngineResult<()>,
    {
        let _in_flight = self.begin(id)?;
        let VersionedApplication {
            mut application,
            version,
        } = self.get(id)?;

        edit(&mut application)?;
        let outcome = self.calculator.calculate(&mut application, override_status)?;

        let stored = self.repository.update(application, version).inspect_err(|err| {
            warn!(application_id = %id, error = %err, "Commit rejected");
        })?;
        info!(
            application_id = %id,
            version = stored.version,
            state = ?outcome.state,
            "Application committed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::CalculationState;
    use crate::models::{BenefitType, Employment, StateAidMaxPercentage};
    use crate::repository::InMemoryRepository;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn service() -> (BenefitService<InMemoryRepository>, Arc<InMemoryRepository>) {
        let repository = Arc::new(InMemoryRepository::new());
        let service = BenefitService::new(repository.clone(), BenefitConfig::default());
        (service, repository)
    }

    fn employee_application() -> Application {
        Application::new(
            Some(BenefitType::EmployeeBenefit),
            Employment {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
                ..Employment::default()
            },
        )
    }

    #[test]
    fn test_leaving_draft_calculates() {
        let (service, _) = service();
        let id = service.submit(employee_application()).unwrap().application.id;

        let outcome = service.set_status(id, ApplicationStatus::Received).unwrap();

        assert_eq!(outcome.state, CalculationState::Calculated);
        let stored = service.get(id).unwrap();
        assert_eq!(stored.version, 2);
        // 366 days -> 12.03 months
        assert_eq!(
            stored
                .application
                .calculation
                .as_ref()
                .unwrap()
                .calculated_benefit_amount(),
            Some(dec("6015"))
        );
    }

    #[test]
    fn test_failed_edit_stores_nothing() {
        let (service, _) = service();
        let id = service.submit(employee_application()).unwrap().application.id;
        service.set_status(id, ApplicationStatus::Handling).unwrap();

        let result = service.update(id, |application| {
            application.benefit_type = Some(BenefitType::SalaryBenefit);
            application.set_status(ApplicationStatus::Draft)
        });

        assert!(matches!(
            result,
            Err(EngineError::InvalidStatusTransition { .. })
        ));
        let stored = service.get(id).unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(
            stored.application.benefit_type,
            Some(BenefitType::EmployeeBenefit)
        );
    }

    #[test]
    fn test_overlapping_recalculation_is_locked() {
        let (service, _) = service();
        let id = service.submit(employee_application()).unwrap().application.id;
        service.set_status(id, ApplicationStatus::Handling).unwrap();

        let result = service.update(id, |_| match service.recalculate(id, false) {
            Err(err) => Err(err),
            Ok(_) => Ok(()),
        });

        assert!(matches!(result, Err(EngineError::CalculationLocked { .. })));
        // the guard is released afterwards
        assert!(service.recalculate(id, false).is_ok());
    }

    #[test]
    fn test_write_behind_the_service_is_detected() {
        let (service, repository) = service();
        let id = service.submit(employee_application()).unwrap().application.id;
        service.set_status(id, ApplicationStatus::Handling).unwrap();

        let result = service.update(id, |application| {
            let mut other = application.clone();
            if let Some(calculation) = other.calculation.as_mut() {
                calculation.state_aid_max_percentage = Some(StateAidMaxPercentage::Seventy);
            }
            repository.update(other, 2)?;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(EngineError::ConcurrentModification {
                expected: 2,
                found: 3,
                ..
            })
        ));
        let stored = service.get(id).unwrap();
        assert_eq!(
            stored
                .application
                .calculation
                .as_ref()
                .unwrap()
                .state_aid_max_percentage,
            Some(StateAidMaxPercentage::Seventy)
        );
    }

    #[test]
    fn test_clone_is_recalculated_under_new_id() {
        let (service, repository) = service();
        let id = service.submit(employee_application()).unwrap().application.id;
        service.set_status(id, ApplicationStatus::Handling).unwrap();
        service.set_status(id, ApplicationStatus::Accepted).unwrap();

        let clone = service.clone_application(id).unwrap();

        assert_ne!(clone.application.id, id);
        assert_eq!(clone.version, 1);
        let calculation = clone.application.calculation.as_ref().unwrap();
        assert_eq!(calculation.calculated_benefit_amount(), Some(dec("6015")));
        assert_eq!(calculation.instalments().len(), 1);
        assert_eq!(repository.len().unwrap(), 2);
    }

    #[test]
    fn test_unknown_application_is_not_found() {
        let (service, _) = service();
        let result = service.recalculate(Uuid::new_v4(), false);
        assert!(matches!(result, Err(EngineError::ApplicationNotFound { .. })));
    }
}
