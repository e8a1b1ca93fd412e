use std::{fs, path::Path};

use pretty_assertions::assert_eq;
use quarry::{describe_schema, load_schema_dir, regenerate, Outcome, QuarryError};
use tempfile::TempDir;

const PROTOCOL: &str = r#"[
    { "name": "Status",
      "server_bound": [
        { "name": "status_request", "id": 0, "sender_independent": true },
        { "name": "ping", "id": 1, "async": true, "fields": [ { "name": "payload", "type": "i64" } ] } ],
      "client_bound": [ { "name": "pong", "id": 1, "fields": [ { "name": "payload", "type": "i64" } ] } ] }
]"#;

const MAPPINGS: &str = r#"{ "types": [], "primitives": [ "i64" ] }"#;

const TARGET: &str = "\
pub enum ClientBoundPacket {
    //#ClientBoundPacket
    //#end
}
pub enum ServerBoundPacket {
    //#ServerBoundPacket
    //#end
}
impl AsyncPacketHandler {
    //#AsyncPacketHandler
    //#end
}
impl SyncPacketHandler {
    //#SyncPacketHandler
    pub fn status_request(&mut self) {
        self.requests += 1;
    }
    //#end
}
fn dispatch_sync_packet() {
    //#dispatch_sync_packet
    //#end
}
fn serialize() {
    //#serialize
    //#end
}
fn handle_packet() {
    //#handle_packet
    //#end
}
";

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project() -> (TempDir, TempDir) {
    let schema = TempDir::new().unwrap();
    write(&schema.path().join("protocol.json"), PROTOCOL);
    write(&schema.path().join("mappings.json"), MAPPINGS);

    let project = TempDir::new().unwrap();
    write(&project.path().join("src/network/packet_handler.rs"), TARGET);
    (schema, project)
}

#[test]
fn test_regenerate_writes_then_reports_unchanged() {
    let (schema, project) = project();
    let target = project.path().join("src/network/packet_handler.rs");

    let outcome = regenerate(schema.path(), project.path(), false).unwrap();
    assert_eq!(outcome, Outcome::Written(target.clone()));

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("        self.requests += 1;\n"));
    assert!(written.contains("    pub fn ping(&mut self, conn: &mut Connection, payload: i64) {\n    }\n"));

    let outcome = regenerate(schema.path(), project.path(), false).unwrap();
    assert_eq!(outcome, Outcome::Unchanged(target.clone()));
    assert_eq!(fs::read_to_string(&target).unwrap(), written);
}

#[cfg(unix)]
#[test]
fn test_regenerate_keeps_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let (schema, project) = project();
    let target = project.path().join("src/network/packet_handler.rs");
    fs::set_permissions(&target, fs::Permissions::from_mode(0o664)).unwrap();

    let outcome = regenerate(schema.path(), project.path(), false).unwrap();
    assert_eq!(outcome, Outcome::Written(target.clone()));
    assert_eq!(fs::metadata(&target).unwrap().permissions().mode() & 0o777, 0o664);
}

#[test]
fn test_check_mode_does_not_write() {
    let (schema, project) = project();
    let target = project.path().join("src/network/packet_handler.rs");

    let outcome = regenerate(schema.path(), project.path(), true).unwrap();
    assert_eq!(outcome, Outcome::Stale(target.clone()));
    assert_eq!(fs::read_to_string(&target).unwrap(), TARGET);
}

#[test]
fn test_config_file_overrides_target() {
    let (schema, project) = project();
    write(&schema.path().join("quarry.json"), r#"{ "target": "src/packets.rs" }"#);
    write(&project.path().join("src/packets.rs"), TARGET);

    let outcome = regenerate(schema.path(), project.path(), false).unwrap();
    assert_eq!(outcome, Outcome::Written(project.path().join("src/packets.rs")));
    // the default target is left alone
    assert_eq!(
        fs::read_to_string(project.path().join("src/network/packet_handler.rs")).unwrap(),
        TARGET
    );
}

#[test]
fn test_failed_merge_leaves_target_untouched() {
    let (schema, project) = project();
    write(&schema.path().join("protocol.json"), r#"[ { "name": "Status" } ]"#);

    let err = regenerate(schema.path(), project.path(), false).unwrap_err();
    assert!(matches!(err, QuarryError::HandlerOverflow { .. }), "{:?}", err);
    assert_eq!(
        fs::read_to_string(project.path().join("src/network/packet_handler.rs")).unwrap(),
        TARGET
    );
}

#[test]
fn test_missing_schema_file() {
    let (schema, project) = project();
    fs::remove_file(schema.path().join("mappings.json")).unwrap();
    let err = regenerate(schema.path(), project.path(), false).unwrap_err();
    assert!(matches!(err, QuarryError::Io(_)), "{:?}", err);
}

#[test]
fn test_describe_schema() {
    let (schema, _project) = project();
    let generator = load_schema_dir(schema.path()).unwrap();
    let description = describe_schema(&generator).unwrap();
    let value: serde_json::Value = serde_json::from_str(&description).unwrap();
    assert_eq!(value["states"][0]["server_bound"][1]["handler"], "ping");
    assert_eq!(value["states"][0]["server_bound"][1]["asynchronous"], true);
}
