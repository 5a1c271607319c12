use super::*;
use crate::services::username::is_valid_username;

#[test]
fn service_errors_convert_into_seed_errors() {
    let err: SeedError = account::AccountError::NotFound.into();
    assert!(matches!(err, SeedError::Account(account::AccountError::NotFound)));

    let err: SeedError = project::ProjectError::Forbidden.into();
    assert!(matches!(err, SeedError::Project(project::ProjectError::Forbidden)));

    let err: SeedError = sqlx::Error::PoolClosed.into();
    assert!(matches!(err, SeedError::Db(_)));
}

#[test]
fn demo_credentials_pass_their_own_validators() {
    assert!(account::normalize_email(DEMO_EMAIL).is_some());
    assert!(is_valid_username(DEMO_USERNAME));
    assert!(DEMO_PASSWORD.len() >= 6);
}

#[test]
fn sample_projects_are_well_formed() {
    let drafts = sample_projects();
    assert_eq!(drafts.len(), 2);
    for draft in &drafts {
        assert!(!draft.title.is_empty());
        assert!(draft.team_size >= 1);
        assert!(!draft.status.is_empty());
    }
}
