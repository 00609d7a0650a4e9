use serde_json::json;
use userdir_core::api::{
    create_user, delete_user, find_user, list_users, parse_body, parse_user_id, update_user,
    ErrorResponse,
};
use userdir_core::db::open_db_in_memory;
use userdir_core::{CreateUserRequest, SqliteUserRepository, UpdateUserRequest, UserId, UserService};

fn john() -> CreateUserRequest {
    CreateUserRequest {
        name: "John".to_string(),
        surname: "Doe".to_string(),
        email: "john@x.com".to_string(),
        phone_number: "1234567890".to_string(),
    }
}

#[test]
fn create_reply_is_201_with_id() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let reply = create_user(&service, &john());

    assert_eq!(reply.status, 201);
    assert!(reply.is_success());
    assert_eq!(reply.body["code"], 201);
    assert_eq!(reply.body["message"], "User created successfully");
    let id = reply.body["data"]["id"].as_str().unwrap();
    assert!(parse_user_id(id).is_ok());
}

#[test]
fn validation_failure_reply_lists_field_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    let request = CreateUserRequest {
        phone_number: "12".to_string(),
        ..john()
    };

    let reply = create_user(&service, &request);

    assert_eq!(reply.status, 400);
    assert_eq!(
        reply.body,
        json!({
            "code": 400,
            "message": "Validation failed",
            "errors": [{
                "field": "PhoneNumber",
                "tag": "min",
                "message": "Field 'PhoneNumber' failed validation on the 'min' tag"
            }]
        })
    );
}

#[test]
fn conflict_reply_omits_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    create_user(&service, &john());

    let reply = create_user(&service, &john());

    assert_eq!(reply.status, 409);
    assert_eq!(
        reply.body,
        json!({ "code": 409, "message": "User with this email already exists" })
    );
}

#[test]
fn read_replies_render_raw_user_and_list() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    let id = service.create(&john()).unwrap();

    let reply = find_user(&service, id);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["id"], id.to_string());
    assert_eq!(reply.body["phone_number"], "1234567890");
    assert!(reply.body["created_at"].is_i64());

    let reply = list_users(&service);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body.as_array().unwrap().len(), 1);
}

#[test]
fn empty_list_reply_is_404() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let reply = list_users(&service);
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, json!({ "code": 404, "message": "No users found" }));
}

#[test]
fn update_and_delete_replies() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    let id = service.create(&john()).unwrap();

    let request = UpdateUserRequest {
        name: Some("NewName".to_string()),
        ..UpdateUserRequest::default()
    };
    let reply = update_user(&service, id, &request);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["message"], "User updated successfully");
    assert_eq!(reply.body["data"]["name"], "NewName");

    let reply = delete_user(&service, id);
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body,
        json!({ "code": 200, "message": "User deleted successfully" })
    );

    let reply = delete_user(&service, id);
    assert_eq!(reply.status, 404);
}

#[test]
fn malformed_ids_and_bodies_are_bad_requests() {
    let err = parse_user_id("not-a-uuid").unwrap_err();
    assert_eq!(err, ErrorResponse::new(400, "Invalid user ID"));

    let id: UserId = parse_user_id(" 6f1c1c7e-8a53-4d6f-9b8e-2d3f0c5f7a10 ").unwrap();
    assert_eq!(id.to_string(), "6f1c1c7e-8a53-4d6f-9b8e-2d3f0c5f7a10");

    let err = parse_body::<CreateUserRequest>(r#"{"name":"John","nickname":"JD"}"#).unwrap_err();
    assert_eq!(err.message, "Invalid Request Body");

    let body: UpdateUserRequest = parse_body(r#"{"email":"new@x.com"}"#).unwrap();
    assert_eq!(body.email(), Some("new@x.com"));
}

#[test]
fn json_create_body_with_created_at_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let request = parse_body::<CreateUserRequest>(
        r#"{"name":"John","surname":"Doe","email":"john@x.com","phone_number":"1234567890","created_at":"2024-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(request, john());

    let reply = create_user(&service, &request);
    assert_eq!(reply.status, 201);
}

#[test]
fn malformed_json_body_is_a_bad_request() {
    let err = parse_body::<CreateUserRequest>("{not json").unwrap_err();
    assert_eq!(err, ErrorResponse::new(400, "Invalid Request Body"));
    assert!(err.errors.is_none());
}
