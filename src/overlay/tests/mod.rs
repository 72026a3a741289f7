use super::*;
use crate::protocol::{
    ExplainRecord, OA_CODE_PREVIOUS, OA_CODE_SELF, OverlayFrame, QueuePriority, WireReader,
    parse_explain_records,
};
use crate::services::test_impls::MockServices;
use crate::services::{InterfaceId, InterfaceState};
use crate::SID_SIZE;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};


type TestOverlay = Overlay<MockServices>;

fn make_overlay() -> TestOverlay {
    Overlay::new(Config::new(), MockServices::new()).unwrap()
}

fn make_overlay_with(config: Config) -> TestOverlay {
    Overlay::new(config, MockServices::new()).unwrap()
}

/// Build a Sid starting with `prefix`, remaining bytes set to `fill`.
fn sid_with(prefix: &[u8], fill: u8) -> Sid {
    let mut bytes = [fill; SID_SIZE];
    bytes[..prefix.len()].copy_from_slice(prefix);
    Sid::from_bytes(bytes).unwrap()
}

fn add(overlay: &mut TestOverlay, sid: &Sid) -> SubscriberId {
    overlay.find_or_create(sid).unwrap()
}

fn link_addr(last: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)), 4110)
}

/// Make `id` directly reachable by unicast on a fresh interface that is up.
fn make_direct(overlay: &mut TestOverlay, id: SubscriberId, name: &str) -> InterfaceId {
    let iface = overlay
        .services_mut()
        .add_interface(name, InterfaceState::Up);
    overlay
        .subscriber_mut(id)
        .unwrap()
        .set_interface(Some(iface));
    overlay.set_reachable(id, Reachability::UNICAST).unwrap();
    iface
}

fn sent_frames(overlay: &TestOverlay) -> &[OverlayFrame] {
    &overlay.services().frames
}

#[test]
fn test_new_overlay_is_empty() {
    let overlay = make_overlay();
    assert!(overlay.trie().is_empty());
    assert!(overlay.local().is_none());
    assert!(overlay.directory_service().is_none());
}

#[test]
fn test_new_rejects_bad_broadcast_slots() {
    let mut config = Config::new();
    config.overlay.broadcast_slots = Some(1000);

    let result = Overlay::new(config, MockServices::new());
    assert!(matches!(
        result,
        Err(OverlayError::Broadcast(BroadcastError::SlotsNotPowerOfTwo(1000)))
    ));
}

#[test]
fn test_max_subscribers_from_config() {
    let mut config = Config::new();
    config.overlay.max_subscribers = Some(1);
    let mut overlay = make_overlay_with(config);

    add(&mut overlay, &sid_with(&[0x20], 0));
    let result = overlay.find_or_create(&sid_with(&[0x30], 0));
    assert!(matches!(
        result,
        Err(OverlayError::Trie(TrieError::Full { max: 1 }))
    ));
}

#[test]
fn test_set_local_identity_marks_self() {
    let mut overlay = make_overlay();
    let sid = Sid::generate();
    let id = overlay.set_local_identity(&sid).unwrap();

    assert_eq!(overlay.local(), Some(id));
    assert_eq!(overlay.subscriber(id).unwrap().reachable(), Reachability::SelfNode);
    assert_eq!(overlay.subscriber(id).unwrap().sid(), &sid);
    // Self is never handed to the keyring
    assert!(overlay.services().signature_requests.is_empty());
}

#[test]
fn test_set_directory_service_unknown_id() {
    let mut overlay = make_overlay();
    let result = overlay.set_directory_service(Some(SubscriberId::new(7)));
    assert!(matches!(result, Err(OverlayError::UnknownSubscriber(_))));
    assert!(overlay.directory_service().is_none());
}

#[test]
fn test_unknown_subscriber_lookup() {
    let overlay = make_overlay();
    assert!(matches!(
        overlay.subscriber(SubscriberId::new(0)),
        Err(OverlayError::UnknownSubscriber(_))
    ));
}

#[test]
fn test_broadcast_dedup() {
    let mut overlay = make_overlay();
    let id = overlay.generate_broadcast_id();

    assert!(!overlay.is_duplicate_broadcast(&id));
    assert!(overlay.is_duplicate_broadcast(&id));

    let other = overlay.generate_broadcast_id();
    assert_ne!(id, other);
    assert!(!overlay.is_duplicate_broadcast(&other));
}

#[test]
fn test_independent_instances() {
    let mut a = make_overlay();
    let b = make_overlay();

    add(&mut a, &Sid::generate());
    assert_eq!(a.trie().len(), 1);
    assert!(b.trie().is_empty());
}
