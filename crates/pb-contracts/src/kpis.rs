//! KPI target contracts

use pb_core::error::ValidationErrors;
use pb_models::KpiTarget;

use crate::base::{validate_title, Contract, UserContext, ValidationResult};

/// Contract for creating or updating a KPI target
pub struct KpiContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> KpiContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    fn validate_target_value(&self, entity: &KpiTarget, errors: &mut ValidationErrors) {
        if entity.target_value <= 0.0 {
            errors.add("target_value", "must be greater than 0");
        }
        if !entity.target_value.is_finite() || !entity.current_value.is_finite() {
            errors.add("target_value", "must be a finite number");
        }
    }

    fn validate_dates(&self, entity: &KpiTarget, errors: &mut ValidationErrors) {
        if entity.end_date < entity.start_date {
            errors.add("end_date", "must be on or after start date");
        }
    }

    fn validate_unit(&self, entity: &KpiTarget, errors: &mut ValidationErrors) {
        if entity.unit.trim().is_empty() {
            errors.add("unit", "can't be blank");
        }
    }

    fn validate_user_allowed(&self, entity: &KpiTarget, errors: &mut ValidationErrors) {
        if !self.user.can_manage_department(entity.department_id) {
            errors.add_base("Only department managers and administrators can manage KPI targets");
        }
    }
}

impl<'a, U: UserContext> Contract<KpiTarget> for KpiContract<'a, U> {
    fn validate(&self, entity: &KpiTarget) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_title(&entity.title, &mut errors);
        self.validate_target_value(entity, &mut errors);
        self.validate_dates(entity, &mut errors);
        self.validate_unit(entity, &mut errors);
        self.validate_user_allowed(entity, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(
            attribute,
            "title"
                | "department_id"
                | "target_value"
                | "current_value"
                | "unit"
                | "start_date"
                | "end_date"
                | "period"
                | "priority"
                | "status"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pb_core::traits::Id;

    struct MockUser {
        admin: bool,
        department: Option<Id>,
        manager: bool,
    }

    impl UserContext for MockUser {
        fn user_id(&self) -> Id {
            1
        }
        fn is_admin(&self) -> bool {
            self.admin
        }
        fn department_id(&self) -> Option<Id> {
            self.department
        }
        fn has_role(&self, role: &str) -> bool {
            self.manager && role == "department_manager"
        }
    }

    fn kpi() -> KpiTarget {
        KpiTarget {
            title: "Resolve 200 tickets".into(),
            department_id: 3,
            target_value: 200.0,
            current_value: 0.0,
            unit: "tickets".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            created_by: 1,
            ..Default::default()
        }
    }

    fn manager_of(department: Id) -> MockUser {
        MockUser {
            admin: false,
            department: Some(department),
            manager: true,
        }
    }

    #[test]
    fn test_valid_kpi() {
        let user = manager_of(3);
        let contract = KpiContract::new(&user);
        assert!(contract.validate(&kpi()).is_ok());
    }

    #[test]
    fn test_non_positive_target_rejected() {
        let user = manager_of(3);
        let contract = KpiContract::new(&user);

        let mut entity = kpi();
        entity.target_value = 0.0;
        let errors = contract.validate(&entity).unwrap_err();
        assert!(errors.has_error("target_value"));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let user = manager_of(3);
        let contract = KpiContract::new(&user);

        let mut entity = kpi();
        entity.end_date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let errors = contract.validate(&entity).unwrap_err();
        assert!(errors.has_error("end_date"));
    }

    #[test]
    fn test_wrong_department_manager_rejected() {
        let user = manager_of(9);
        let contract = KpiContract::new(&user);

        let errors = contract.validate(&kpi()).unwrap_err();
        assert!(!errors.base_errors.is_empty());
    }

    #[test]
    fn test_admin_allowed_everywhere() {
        let user = MockUser {
            admin: true,
            department: None,
            manager: false,
        };
        let contract = KpiContract::new(&user);
        assert!(contract.validate(&kpi()).is_ok());
    }
}
