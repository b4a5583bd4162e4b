//! KPI services

use chrono::NaiveDate;
use pb_contracts::base::UserContext;
use pb_contracts::kpis::KpiContract;
use pb_contracts::Contract;
use pb_core::result::ServiceResult;
use pb_core::traits::Id;
use pb_models::{KpiPeriod, KpiStatus, KpiTarget, Priority};

/// Parameters for creating a KPI target
#[derive(Debug, Clone)]
pub struct KpiParams {
    pub title: String,
    pub department_id: Id,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: KpiPeriod,
    pub priority: Priority,
    pub assignee_ids: Vec<Id>,
}

/// Service for creating KPI targets
pub struct CreateKpiService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateKpiService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub fn call(&self, params: KpiParams) -> ServiceResult<KpiTarget> {
        let kpi = KpiTarget {
            id: None,
            title: params.title,
            department_id: params.department_id,
            target_value: params.target_value,
            current_value: params.current_value,
            unit: params.unit,
            start_date: params.start_date,
            end_date: params.end_date,
            period: params.period,
            priority: params.priority,
            status: KpiStatus::Active,
            created_by: self.user.user_id(),
            assignee_ids: params.assignee_ids,
            created_at: None,
            updated_at: None,
        };

        let contract = KpiContract::new(self.user);
        if let Err(errors) = contract.validate(&kpi) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::success(kpi)
    }
}

/// Service for recording a progress value against a KPI
pub struct RecordProgressService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> RecordProgressService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Validate the value and return the KPI with the value applied.
    /// Assignees may record progress on their own KPIs; managers on any
    /// KPI of their department.
    pub fn call(&self, mut kpi: KpiTarget, value: f64) -> ServiceResult<KpiTarget> {
        if !value.is_finite() {
            return ServiceResult::failure_with_message("Progress value must be a finite number");
        }

        let allowed = self.user.can_manage_department(kpi.department_id)
            || kpi.assignee_ids.contains(&self.user.user_id());
        if !allowed {
            return ServiceResult::failure_with_message(
                "Only assignees and department managers can record progress",
            );
        }

        if kpi.status != KpiStatus::Active {
            return ServiceResult::failure_with_message(
                "Progress can only be recorded on active KPIs",
            );
        }

        kpi.current_value += value;
        // Reaching the target completes the record
        if kpi.target_value > 0.0 && kpi.current_value >= kpi.target_value {
            kpi.status = KpiStatus::Completed;
        }

        ServiceResult::success(kpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockUser {
        id: Id,
        admin: bool,
    }

    impl UserContext for MockUser {
        fn user_id(&self) -> Id {
            self.id
        }
        fn is_admin(&self) -> bool {
            self.admin
        }
        fn department_id(&self) -> Option<Id> {
            None
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    fn params() -> KpiParams {
        KpiParams {
            title: "Ship 12 releases".into(),
            department_id: 2,
            target_value: 12.0,
            current_value: 0.0,
            unit: "releases".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            period: KpiPeriod::Yearly,
            priority: Priority::High,
            assignee_ids: vec![4],
        }
    }

    #[test]
    fn test_create_kpi_as_admin() {
        let admin = MockUser { id: 1, admin: true };
        let service = CreateKpiService::new(&admin);

        let result = service.call(params());
        assert!(result.is_success());
        let kpi = result.result.unwrap();
        assert_eq!(kpi.status, KpiStatus::Active);
        assert_eq!(kpi.created_by, 1);
    }

    #[test]
    fn test_create_kpi_without_permission() {
        let employee = MockUser { id: 4, admin: false };
        let service = CreateKpiService::new(&employee);

        let result = service.call(params());
        assert!(result.is_failure());
    }

    #[test]
    fn test_assignee_records_progress() {
        let admin = MockUser { id: 1, admin: true };
        let kpi = CreateKpiService::new(&admin).call(params()).result.unwrap();

        let assignee = MockUser { id: 4, admin: false };
        let service = RecordProgressService::new(&assignee);

        let result = service.call(kpi, 3.0);
        assert!(result.is_success());
        assert_eq!(result.result.unwrap().current_value, 3.0);
    }

    #[test]
    fn test_reaching_target_completes_kpi() {
        let admin = MockUser { id: 1, admin: true };
        let kpi = CreateKpiService::new(&admin).call(params()).result.unwrap();

        let service = RecordProgressService::new(&admin);
        let result = service.call(kpi, 12.0);

        assert!(result.is_success());
        assert_eq!(result.result.unwrap().status, KpiStatus::Completed);
    }

    #[test]
    fn test_outsider_cannot_record_progress() {
        let admin = MockUser { id: 1, admin: true };
        let kpi = CreateKpiService::new(&admin).call(params()).result.unwrap();

        let outsider = MockUser { id: 99, admin: false };
        let service = RecordProgressService::new(&outsider);

        assert!(service.call(kpi, 1.0).is_failure());
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let admin = MockUser { id: 1, admin: true };
        let kpi = CreateKpiService::new(&admin).call(params()).result.unwrap();

        let service = RecordProgressService::new(&admin);
        assert!(service.call(kpi, f64::NAN).is_failure());
    }
}
