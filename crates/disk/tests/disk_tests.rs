//! Drives the disk's content-port dispatch function directly (no socket).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use disk::dispatch::handle_bytes;
use disk::store::Store;

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:9".parse().unwrap()
}

fn send(store: &mut Store, req: &serde_json::Value) -> serde_json::Value {
    let bytes = serde_json::to_vec(req).unwrap();
    let reply = handle_bytes("d0", store, peer(), &bytes);
    serde_json::from_slice(&reply).unwrap()
}

#[test]
fn set_mode_fail_blocks_reads_but_not_writes() {
    let mut store = Store::new();
    let block_b64 = BASE64.encode(b"orig-block");
    let write = serde_json::json!({
        "cmd": "write-block",
        "args": {"file_name": "f", "stripe_idx": 0, "disk_index": 0, "block_b64": block_b64}
    });
    assert_eq!(send(&mut store, &write)["status"], "SUCCESS");

    let set_fail = serde_json::json!({"cmd": "set-mode", "args": {"state": "fail"}});
    assert_eq!(send(&mut store, &set_fail)["status"], "SUCCESS");

    // set-mode does not clear the store.
    let read = serde_json::json!({
        "cmd": "read-block",
        "args": {"file_name": "f", "stripe_idx": 0, "disk_index": 0}
    });
    let reply = send(&mut store, &read);
    assert_eq!(reply["status"], "FAILURE");
    assert_eq!(reply["error"], "simulated failure");

    // writes still succeed so the recovery path can repopulate the disk.
    let rewrite = serde_json::json!({
        "cmd": "write-block",
        "args": {"file_name": "f", "stripe_idx": 0, "disk_index": 0, "block_b64": block_b64}
    });
    assert_eq!(send(&mut store, &rewrite)["status"], "SUCCESS");

    let set_normal = serde_json::json!({"cmd": "set-mode", "args": {"state": "normal"}});
    assert_eq!(send(&mut store, &set_normal)["status"], "SUCCESS");

    let reply = send(&mut store, &read);
    assert_eq!(reply["status"], "SUCCESS");
    assert_eq!(reply["block_b64"], block_b64);
}

#[test]
fn fail_command_clears_store() {
    let mut store = Store::new();
    let block_b64 = BASE64.encode(b"abc12345");
    let write = serde_json::json!({
        "cmd": "write-block",
        "args": {"file_name": "f", "stripe_idx": 0, "disk_index": 0, "block_b64": block_b64}
    });
    assert_eq!(send(&mut store, &write)["status"], "SUCCESS");

    let fail = serde_json::json!({"cmd": "fail", "args": {}});
    let reply = send(&mut store, &fail);
    assert_eq!(reply["status"], "SUCCESS");
    assert_eq!(reply["event"], "fail-complete");

    let read = serde_json::json!({
        "cmd": "read-block",
        "args": {"file_name": "f", "stripe_idx": 0, "disk_index": 0}
    });
    let reply = send(&mut store, &read);
    assert_eq!(reply["status"], "FAILURE");
}
