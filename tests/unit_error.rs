use std::path::PathBuf;

use prowork::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::TaskNotFound("abc".to_string());
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let policy = Error::NotesNotAllowed {
        id: "abc".to_string(),
        task_type: "WORK".to_string(),
    };
    assert_eq!(policy.exit_code(), exit_codes::POLICY_BLOCKED);

    let op = Error::OperationFailed("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);

    let write = Error::WriteFailed {
        path: PathBuf::from("/tmp/tasks.json"),
        source: std::io::Error::other("disk full"),
    };
    assert_eq!(write.exit_code(), exit_codes::OPERATION_FAILED);
    assert_eq!(Error::WorkerStopped.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_details() {
    let err = Error::TaskNotFound("abc".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Task not found"));
    assert_eq!(json.details, Some(serde_json::json!({ "id": "abc" })));

    let err = Error::InvalidDate("tomorrow".to_string());
    let json = JsonError::from(&err);
    assert!(json.details.is_none());
    assert!(json.error.contains("tomorrow"));
}
