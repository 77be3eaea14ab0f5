use super::*;

#[test]
fn remote_event_uses_wire_names() {
    let event = RemoteEvent::FolderAddBulk(vec!["a".into(), "a/b".into()]);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "folder:add:bulk");
    assert_eq!(json["payload"][1], "a/b");

    let wire = r#"{"event":"file:change","payload":{"path":"src/a.ts","content":"x"}}"#;
    let parsed: RemoteEvent = serde_json::from_str(wire).unwrap();
    assert_eq!(
        parsed,
        RemoteEvent::FileChanged {
            path: "src/a.ts".into(),
            content: "x".to_string(),
        }
    );
    assert_eq!(parsed.name(), "file:change");
}

#[test]
fn remote_entry_reads_type_field() {
    let entry: RemoteEntry = serde_json::from_str(
        r#"{"name":"utils","path":"src/utils","type":"folder","depth":1}"#,
    )
    .unwrap();
    assert_eq!(entry.kind, NodeKind::Dir);

    let ack: RemoteAck = serde_json::from_str(r#"{"success":false}"#).unwrap();
    assert!(!ack.success);
    assert!(ack.paths.is_empty());
}

#[test]
fn rejected_errors_are_not_retried() {
    assert!(!RemoteError::Rejected("exists".to_string()).is_retryable());
    assert!(RemoteError::Timeout(Duration::from_secs(1)).is_retryable());
    assert!(RemoteError::Transport("reset".to_string()).is_retryable());
}

#[test]
fn conflicts_are_final_and_confirm_only_matching_mutations() {
    let exists = RemoteError::AlreadyExists("docs".into());
    let missing = RemoteError::NotFound("docs".into());
    assert!(!exists.is_retryable());
    assert!(!missing.is_retryable());

    assert!(exists.confirms(RemoteOp::Create));
    assert!(exists.confirms(RemoteOp::Rename));
    assert!(exists.confirms(RemoteOp::Move));
    assert!(!exists.confirms(RemoteOp::Delete));
    assert!(missing.confirms(RemoteOp::Delete));
    assert!(!missing.confirms(RemoteOp::Create));
    assert!(!missing.confirms(RemoteOp::Fetch));
    assert!(!RemoteError::Transport("reset".to_string()).confirms(RemoteOp::Create));
}
