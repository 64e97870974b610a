//! Drives the Manager's dispatch function directly (no socket) against
//! registration, DSS lifecycle, and busy-exclusion scenarios.

use std::net::SocketAddr;

use manager::dispatch::handle_bytes;
use manager::state::ManagerState;
use striped_core::protocol::manager::{ConfigureDssOk, LsOk, PrepareOk};
use striped_core::wire::{Ack, Reply, decode};

fn peer() -> SocketAddr {
    "127.0.0.1:9".parse().unwrap()
}

fn send(state: &mut ManagerState, req: &serde_json::Value) -> serde_json::Value {
    let bytes = serde_json::to_vec(req).unwrap();
    let reply = handle_bytes(state, peer(), &bytes);
    serde_json::from_slice(&reply).unwrap()
}

fn register_disk(state: &mut ManagerState, name: &str) {
    let req = serde_json::json!({
        "cmd": "register-disk",
        "args": {"disk_name": name, "ip": "127.0.0.1", "m_port": 0, "c_port": 0}
    });
    let reply = send(state, &req);
    assert_eq!(reply["status"], "SUCCESS", "register-disk {name} failed");
}

fn register_user(state: &mut ManagerState, name: &str) {
    let req = serde_json::json!({
        "cmd": "register-user",
        "args": {"user_name": name, "ip": "127.0.0.1", "m_port": 0, "c_port": 0}
    });
    let reply = send(state, &req);
    assert_eq!(reply["status"], "SUCCESS", "register-user {name} failed");
}

fn configure_dss(state: &mut ManagerState, dss_name: &str, n: usize, b: u64) -> serde_json::Value {
    let req = serde_json::json!({
        "cmd": "configure-dss",
        "args": {"dss_name": dss_name, "n": n, "striping_unit": b}
    });
    send(state, &req)
}

#[test]
fn duplicate_user_registration_is_rejected() {
    let mut state = ManagerState::new();
    register_user(&mut state, "alice");
    let req = serde_json::json!({
        "cmd": "register-user",
        "args": {"user_name": "alice", "ip": "127.0.0.1", "m_port": 1, "c_port": 2}
    });
    let reply = send(&mut state, &req);
    assert_eq!(reply["status"], "FAILURE");
}

#[test]
fn configure_dss_rejects_bad_striping_unit() {
    let mut state = ManagerState::new();
    for i in 0..3 {
        register_disk(&mut state, &format!("d{i}"));
    }
    let reply = configure_dss(&mut state, "alpha", 3, 100);
    assert_eq!(reply["status"], "FAILURE");

    let reply = configure_dss(&mut state, "alpha", 2, 256);
    assert_eq!(reply["status"], "FAILURE");
}

#[test]
fn configure_dss_fails_with_too_few_free_disks() {
    let mut state = ManagerState::new();
    for i in 0..4 {
        register_disk(&mut state, &format!("d{i}"));
    }
    let first = configure_dss(&mut state, "x", 3, 128);
    assert_eq!(first["status"], "SUCCESS");

    // only one disk remains Free.
    let second = configure_dss(&mut state, "y", 3, 128);
    assert_eq!(second["status"], "FAILURE");
    assert_eq!(second["error"], "fewer than n disks Free");
}

#[test]
fn configure_dss_selects_n_distinct_disks_in_order() {
    let mut state = ManagerState::new();
    for i in 0..5 {
        register_disk(&mut state, &format!("d{i}"));
    }
    let reply = configure_dss(&mut state, "x", 3, 128);
    let ok: ConfigureDssOk = serde_json::from_value(reply.clone()).unwrap();
    assert_eq!(ok.disks.len(), 3);
    let mut unique = ok.disks.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[test]
fn busy_flag_blocks_other_commands_until_matching_completion() {
    let mut state = ManagerState::new();
    for i in 0..3 {
        register_disk(&mut state, &format!("d{i}"));
    }
    register_user(&mut state, "alice");
    configure_dss(&mut state, "x", 3, 128);

    let prepare = serde_json::json!({
        "cmd": "copy-prepare",
        "args": {"dss_name": "x", "file_name": "f.bin", "owner": "alice"}
    });
    let reply = send(&mut state, &prepare);
    assert_eq!(reply["status"], "SUCCESS");

    let decommission = serde_json::json!({
        "cmd": "decommission-dss",
        "args": {"dss_name": "x", "user_name": "alice"}
    });
    let reply = send(&mut state, &decommission);
    assert_eq!(reply["status"], "FAILURE");
    assert_eq!(reply["error"], "busy: copy in progress");

    let complete = serde_json::json!({
        "cmd": "copy-complete",
        "args": {"dss_name": "x", "file_name": "f.bin", "owner": "alice", "size": 10}
    });
    let reply = send(&mut state, &complete);
    assert_eq!(reply["status"], "SUCCESS");

    // decommission now proceeds.
    let reply = send(&mut state, &decommission);
    assert_eq!(reply["status"], "SUCCESS");
}

#[test]
fn read_prepare_enforces_ownership() {
    let mut state = ManagerState::new();
    for i in 0..3 {
        register_disk(&mut state, &format!("d{i}"));
    }
    register_user(&mut state, "alice");
    register_user(&mut state, "mallory");
    configure_dss(&mut state, "x", 3, 128);

    let prepare = serde_json::json!({
        "cmd": "copy-prepare",
        "args": {"dss_name": "x", "file_name": "f.bin", "owner": "alice"}
    });
    send(&mut state, &prepare);
    let complete = serde_json::json!({
        "cmd": "copy-complete",
        "args": {"dss_name": "x", "file_name": "f.bin", "owner": "alice", "size": 10}
    });
    send(&mut state, &complete);

    let read_as_mallory = serde_json::json!({
        "cmd": "read-prepare",
        "args": {"dss_name": "x", "file_name": "f.bin", "user_name": "mallory"}
    });
    let reply = send(&mut state, &read_as_mallory);
    assert_eq!(reply["status"], "FAILURE");
    assert_eq!(reply["error"], "NOT_OWNER");

    let read_complete = serde_json::json!({"cmd": "read-complete", "args": {"dss_name": "x"}});
    // Manager should not be busy (read-prepare rejected before setting busy).
    let reply = send(&mut state, &read_complete);
    assert_eq!(reply["status"], "FAILURE");

    let read_as_alice = serde_json::json!({
        "cmd": "read-prepare",
        "args": {"dss_name": "x", "file_name": "f.bin", "user_name": "alice"}
    });
    let reply = send(&mut state, &read_as_alice);
    assert_eq!(reply["status"], "SUCCESS");
    let ok: PrepareOk = serde_json::from_value(reply).unwrap();
    assert_eq!(ok.n, 3);
}

#[test]
fn decommission_frees_disks_and_removes_dss() {
    let mut state = ManagerState::new();
    for i in 0..3 {
        register_disk(&mut state, &format!("d{i}"));
    }
    configure_dss(&mut state, "x", 3, 128);

    let begin = serde_json::json!({
        "cmd": "decommission-dss",
        "args": {"dss_name": "x", "user_name": "alice"}
    });
    send(&mut state, &begin);

    let complete = serde_json::json!({"cmd": "decommission-complete", "args": {"dss_name": "x"}});
    let reply = send(&mut state, &complete);
    assert_eq!(reply["status"], "SUCCESS");

    let ls = send(&mut state, &serde_json::json!({"cmd": "ls", "args": {}}));
    let ok: LsOk = serde_json::from_value(ls).unwrap();
    assert!(ok.dsses.is_empty());
    assert_eq!(ok.free_disks.len(), 3);
}

#[test]
fn deregister_disk_requires_free_state() {
    let mut state = ManagerState::new();
    register_disk(&mut state, "d0");
    register_disk(&mut state, "d1");
    register_disk(&mut state, "d2");
    configure_dss(&mut state, "x", 3, 128);

    let reply = send(
        &mut state,
        &serde_json::json!({"cmd": "deregister-disk", "args": {"disk_name": "d0"}}),
    );
    assert_eq!(reply["status"], "FAILURE");
    assert_eq!(reply["error"], "disk is InDSS; cannot deregister");
}

#[test]
fn bad_json_is_rejected_without_panicking() {
    let mut state = ManagerState::new();
    let reply = handle_bytes(&mut state, peer(), b"not json");
    let decoded: Reply<Ack> = decode(&reply).unwrap();
    assert!(decoded.into_result().is_err());
}
