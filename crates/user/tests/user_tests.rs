//! Spins up an in-process Manager and N Disks on real `127.0.0.1:0` sockets
//! and drives the User's engine end-to-end, covering the seed round-trip
//! scenarios.

use std::net::SocketAddr;

use rand::RngCore;
use tokio::net::UdpSocket;

use disk::dispatch::handle_bytes as disk_handle;
use disk::store::Store;
use manager::dispatch::handle_bytes as manager_handle;
use manager::state::ManagerState;
use striped_core::protocol::manager::{ManagerRequest, RegisterDiskArgs};
use striped_core::wire::{Ack, Reply, decode, encode};

use user::engine::Client;

async fn spawn_manager() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut state = ManagerState::new();
        let mut buf = vec![0u8; 65535];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let reply = manager_handle(&mut state, peer, &buf[..len]);
            let _ = socket.send_to(&reply, peer).await;
        }
    });
    addr
}

async fn spawn_disk(name: &str, manager_addr: SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let c_port = socket.local_addr().unwrap().port();
    let disk_name = name.to_string();
    tokio::spawn(async move {
        let mut store = Store::new();
        let mut buf = vec![0u8; 65535];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let reply = disk_handle(&disk_name, &mut store, peer, &buf[..len]);
            let _ = socket.send_to(&reply, peer).await;
        }
    });

    let reg_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let req = ManagerRequest::RegisterDisk(RegisterDiskArgs {
        disk_name: name.to_string(),
        ip: "127.0.0.1".to_string(),
        m_port: 0,
        c_port,
    });
    reg_socket
        .send_to(&encode(&req).unwrap(), manager_addr)
        .await
        .unwrap();
    let mut buf = vec![0u8; 4096];
    let len = reg_socket.recv(&mut buf).await.unwrap();
    let reply: Reply<Ack> = decode(&buf[..len]).unwrap();
    reply.into_result().expect("register-disk must succeed");
}

async fn spawn_disks(n: usize, manager_addr: SocketAddr) {
    for i in 0..n {
        spawn_disk(&format!("d{i}"), manager_addr).await;
    }
}

async fn new_client(name: &str, manager_addr: SocketAddr) -> Client {
    let client = Client::bind(name.to_string(), manager_addr, 0).await.unwrap();
    client
        .register("127.0.0.1".to_string(), 0, 0)
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn round_trip_is_bit_identical() {
    let manager_addr = spawn_manager().await;
    spawn_disks(3, manager_addr).await;
    let alice = new_client("alice", manager_addr).await;

    alice.configure_dss("x", 3, 128).await.unwrap();

    let mut data = vec![0u8; 200];
    rand::rng().fill_bytes(&mut data);
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.bin");
    let dst = dir.path().join("out.bin");
    std::fs::write(&src, &data).unwrap();

    alice.copy("x", &src).await.unwrap();
    alice.read("x", "in.bin", &dst, None).await.unwrap();

    let out = std::fs::read(&dst).unwrap();
    assert_eq!(out, data);

    let ls = alice.ls().await.unwrap();
    assert_eq!(ls.dsses.len(), 1);
    assert_eq!(ls.dsses[0].files["in.bin"].size, 200);
}

#[tokio::test]
async fn single_disk_failure_recovers_full_file() {
    let manager_addr = spawn_manager().await;
    spawn_disks(4, manager_addr).await;
    let alice = new_client("alice", manager_addr).await;

    alice.configure_dss("x", 4, 256).await.unwrap();

    let mut data = vec![0u8; 1024];
    rand::rng().fill_bytes(&mut data);
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.bin");
    let dst = dir.path().join("out.bin");
    std::fs::write(&src, &data).unwrap();

    alice.copy("x", &src).await.unwrap();
    alice.disk_failure_drill("x").await.unwrap();
    alice.read("x", "in.bin", &dst, None).await.unwrap();

    let out = std::fs::read(&dst).unwrap();
    assert_eq!(out, data);
}

#[tokio::test]
async fn read_by_non_owner_is_rejected() {
    let manager_addr = spawn_manager().await;
    spawn_disks(3, manager_addr).await;
    let alice = new_client("alice", manager_addr).await;
    let mallory = new_client("mallory", manager_addr).await;

    alice.configure_dss("x", 3, 128).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.bin");
    let dst = dir.path().join("out.bin");
    std::fs::write(&src, b"top secret payload, exactly").unwrap();

    alice.copy("x", &src).await.unwrap();

    let err = mallory.read("x", "in.bin", &dst, None).await.unwrap_err();
    assert!(err.to_string().contains("NOT_OWNER"));

    alice.read("x", "in.bin", &dst, None).await.unwrap();
    assert_eq!(std::fs::read(&dst).unwrap(), b"top secret payload, exactly");
}
