//! Profile services
//!
//! Deactivation produces a transfer plan: the departing user's open
//! tickets and KPI ownership move to a named successor before the
//! profile goes inactive.

use pb_contracts::base::UserContext;
use pb_contracts::profiles::ProfileContract;
use pb_contracts::Contract;
use pb_core::result::ServiceResult;
use pb_core::traits::Id;
use pb_models::Profile;

/// Parameters for creating a profile
#[derive(Debug, Clone)]
pub struct ProfileParams {
    pub email: String,
    pub name: String,
    pub department_id: Option<Id>,
}

/// Service for creating profiles
pub struct CreateProfileService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateProfileService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub fn call(&self, params: ProfileParams) -> ServiceResult<Profile> {
        let profile = Profile {
            id: None,
            email: params.email,
            name: params.name,
            department_id: params.department_id,
            active: true,
            created_at: None,
            updated_at: None,
        };

        let contract = ProfileContract::new(self.user);
        if let Err(errors) = contract.validate(&profile) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::success(profile)
    }
}

/// What to move where when a profile is deactivated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub from_user: Id,
    pub to_user: Id,
}

/// Service for deactivating a profile with work transfer
pub struct DeactivateProfileService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeactivateProfileService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Validate the deactivation and produce the transfer plan. The
    /// successor must be a different, active profile.
    pub fn call(&self, profile: &Profile, successor: &Profile) -> ServiceResult<TransferPlan> {
        if !self.user.is_admin() {
            return ServiceResult::failure_with_message(
                "Only administrators can deactivate profiles",
            );
        }

        let (Some(from_user), Some(to_user)) = (profile.id, successor.id) else {
            return ServiceResult::failure_with_message("Both profiles must be persisted");
        };

        if from_user == to_user {
            return ServiceResult::failure_with_message(
                "Work cannot be transferred to the departing user",
            );
        }

        if !successor.active {
            return ServiceResult::failure_with_message(
                "Work cannot be transferred to an inactive profile",
            );
        }

        ServiceResult::success(TransferPlan { from_user, to_user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAdmin;

    impl UserContext for MockAdmin {
        fn user_id(&self) -> Id {
            1
        }
        fn is_admin(&self) -> bool {
            true
        }
        fn department_id(&self) -> Option<Id> {
            None
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    fn persisted(id: Id, active: bool) -> Profile {
        let mut profile = Profile::new(format!("user{id}@example.com"), format!("User {id}"));
        profile.id = Some(id);
        profile.active = active;
        profile
    }

    #[test]
    fn test_create_profile() {
        let service = CreateProfileService::new(&MockAdmin);
        let result = service.call(ProfileParams {
            email: "ada@example.com".into(),
            name: "Ada Lovelace".into(),
            department_id: Some(2),
        });

        assert!(result.is_success());
        assert!(result.result.unwrap().active);
    }

    #[test]
    fn test_deactivation_produces_plan() {
        let service = DeactivateProfileService::new(&MockAdmin);
        let result = service.call(&persisted(3, true), &persisted(4, true));

        assert!(result.is_success());
        assert_eq!(
            result.result.unwrap(),
            TransferPlan {
                from_user: 3,
                to_user: 4
            }
        );
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let service = DeactivateProfileService::new(&MockAdmin);
        assert!(service.call(&persisted(3, true), &persisted(3, true)).is_failure());
    }

    #[test]
    fn test_transfer_to_inactive_rejected() {
        let service = DeactivateProfileService::new(&MockAdmin);
        assert!(service.call(&persisted(3, true), &persisted(4, false)).is_failure());
    }
}
