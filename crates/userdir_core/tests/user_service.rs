use rusqlite::Connection;
use userdir_core::db::open_db_in_memory;
use userdir_core::model::user::now_epoch_ms;
use userdir_core::{
    ConflictField, CreateUserRequest, NewUser, RepoError, RepoOp, RepoResult, ServiceError,
    SqliteUserRepository, UpdateUserRequest, User, UserId, UserRepository, UserService,
};
use uuid::Uuid;

fn service(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::new(conn))
}

fn john() -> CreateUserRequest {
    CreateUserRequest {
        name: "John".to_string(),
        surname: "Doe".to_string(),
        email: "john@x.com".to_string(),
        phone_number: "1234567890".to_string(),
    }
}

fn jane() -> CreateUserRequest {
    CreateUserRequest {
        name: "Jane".to_string(),
        surname: "Roe".to_string(),
        email: "jane@x.com".to_string(),
        phone_number: "0987654321".to_string(),
    }
}

fn user_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let before = now_epoch_ms();
    let id = service.create(&john()).unwrap();
    let after = now_epoch_ms();

    let user = service.find_by_id(id).unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.name, "John");
    assert_eq!(user.surname, "Doe");
    assert_eq!(user.email, "john@x.com");
    assert_eq!(user.phone_number, "1234567890");
    assert!(user.created_at >= before && user.created_at <= after);
}

#[test]
fn create_with_invalid_fields_reports_all_violations() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let request = CreateUserRequest {
        name: "J".to_string(),
        email: "nope".to_string(),
        ..john()
    };
    let err = service.create(&request).unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "Validation failed");
    match err {
        ServiceError::ValidationFailed(errors) => {
            assert!(errors.has("Name", "min"));
            assert!(errors.has("Email", "email"));
            assert_eq!(errors.violations().len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(user_count(&conn), 0);
}

#[test]
fn create_with_duplicate_email_conflicts_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.create(&john()).unwrap();

    let request = CreateUserRequest {
        email: "john@x.com".to_string(),
        ..jane()
    };
    let err = service.create(&request).unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(ConflictField::Email)));
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.message(), "User with this email already exists");
    assert_eq!(user_count(&conn), 1);
}

#[test]
fn create_with_duplicate_phone_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.create(&john()).unwrap();

    let request = CreateUserRequest {
        phone_number: "1234567890".to_string(),
        ..jane()
    };
    let err = service.create(&request).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Conflict(ConflictField::PhoneNumber)
    ));
    assert_eq!(err.message(), "User with this phone nubmer already exists");
    assert_eq!(user_count(&conn), 1);
}

#[test]
fn partial_update_changes_only_supplied_field() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service
        .create(&CreateUserRequest {
            email: "a@x.com".to_string(),
            ..john()
        })
        .unwrap();
    let original = service.find_by_id(id).unwrap();

    let request = UpdateUserRequest {
        name: Some("NewName".to_string()),
        email: Some(String::new()),
        ..UpdateUserRequest::default()
    };
    let updated = service.update(id, &request).unwrap();

    assert_eq!(updated.name, "NewName");
    assert_eq!(updated.surname, original.surname);
    assert_eq!(updated.email, "a@x.com");
    assert_eq!(updated.phone_number, original.phone_number);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(service.find_by_id(id).unwrap(), updated);
}

#[test]
fn update_with_no_fields_is_bad_request_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.create(&john()).unwrap();
    let original = service.find_by_id(id).unwrap();

    let request = UpdateUserRequest {
        name: Some(String::new()),
        ..UpdateUserRequest::default()
    };
    let err = service.update(id, &request).unwrap_err();

    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "No fields to update");
    assert_eq!(service.find_by_id(id).unwrap(), original);
}

#[test]
fn update_of_missing_user_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = Uuid::new_v4();

    let request = UpdateUserRequest {
        name: Some("NewName".to_string()),
        ..UpdateUserRequest::default()
    };
    let err = service.update(id, &request).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), format!("User with id {id} not found"));
}

#[test]
fn update_keeping_own_email_and_phone_is_not_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.create(&john()).unwrap();

    let request = UpdateUserRequest {
        surname: Some("Smith".to_string()),
        email: Some("john@x.com".to_string()),
        phone_number: Some("1234567890".to_string()),
        ..UpdateUserRequest::default()
    };
    let updated = service.update(id, &request).unwrap();
    assert_eq!(updated.surname, "Smith");
}

#[test]
fn update_to_another_users_email_or_phone_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let john_id = service.create(&john()).unwrap();
    service.create(&jane()).unwrap();

    let email_err = service
        .update(
            john_id,
            &UpdateUserRequest {
                email: Some("jane@x.com".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        email_err,
        ServiceError::Conflict(ConflictField::Email)
    ));

    let phone_err = service
        .update(
            john_id,
            &UpdateUserRequest {
                phone_number: Some("0987654321".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        phone_err,
        ServiceError::Conflict(ConflictField::PhoneNumber)
    ));
    assert_eq!(service.find_by_id(john_id).unwrap().email, "john@x.com");
}

#[test]
fn update_validates_supplied_fields_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let request = UpdateUserRequest {
        phone_number: Some("123".to_string()),
        ..UpdateUserRequest::default()
    };
    let err = service.update(Uuid::new_v4(), &request).unwrap_err();
    assert!(matches!(err, ServiceError::ValidationFailed(_)));
}

#[test]
fn delete_missing_user_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.delete(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn delete_existing_user_removes_it() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.create(&john()).unwrap();

    service.delete(id).unwrap();

    let err = service.find_by_id(id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn find_all_on_empty_store_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.find_all().unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), "No users found");
}

#[test]
fn find_all_lists_every_user() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.create(&john()).unwrap();
    service.create(&jane()).unwrap();

    assert_eq!(service.find_all().unwrap().len(), 2);
}

/// Repository whose every call fails, to exercise the 500 path.
struct BrokenRepository;

impl BrokenRepository {
    fn failure(op: RepoOp) -> RepoError {
        RepoError::Storage {
            op,
            source: rusqlite::Error::InvalidQuery,
        }
    }
}

impl UserRepository for BrokenRepository {
    fn save(&self, _user: &NewUser) -> RepoResult<UserId> {
        Err(Self::failure(RepoOp::Save))
    }

    fn update(&self, _id: UserId, _user: &User) -> RepoResult<()> {
        Err(Self::failure(RepoOp::Update))
    }

    fn delete(&self, _id: UserId) -> RepoResult<()> {
        Err(Self::failure(RepoOp::Delete))
    }

    fn find_by_id(&self, _id: UserId) -> RepoResult<Option<User>> {
        Err(Self::failure(RepoOp::FindById))
    }

    fn find_by_email(&self, _email: &str) -> RepoResult<Option<User>> {
        Ok(None)
    }

    fn find_by_phone_number(&self, _phone_number: &str) -> RepoResult<Option<User>> {
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        Err(Self::failure(RepoOp::FindAll))
    }
}

#[test]
fn storage_failures_surface_as_internal() {
    let service = UserService::new(BrokenRepository);

    let err = service.create(&john()).unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.message(), "Failed to save user");
    match &err {
        ServiceError::Internal { source, .. } => assert_eq!(source.op(), Some(RepoOp::Save)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());

    let err = service.find_all().unwrap_err();
    assert_eq!(err.message(), "Failed to retrieve users");

    let err = service.delete(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[test]
fn every_missing_id_path_shares_one_not_found_message() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = Uuid::new_v4();
    let expected = format!("User with id {id} not found");

    let request = UpdateUserRequest {
        name: Some("NewName".to_string()),
        ..UpdateUserRequest::default()
    };
    let messages = [
        service.find_by_id(id).unwrap_err().message().to_string(),
        service.update(id, &request).unwrap_err().message().to_string(),
        service.delete(id).unwrap_err().message().to_string(),
    ];

    for message in messages {
        assert_eq!(message, expected);
    }
}
