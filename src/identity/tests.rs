use super::*;

fn sid_bytes(first: u8) -> [u8; SID_SIZE] {
    let mut bytes = [0u8; SID_SIZE];
    bytes[0] = first;
    bytes
}

#[test]
fn test_sid_from_bytes_accepts_valid_prefix() {
    let sid = Sid::from_bytes(sid_bytes(0x10)).unwrap();
    assert_eq!(sid.as_bytes()[0], 0x10);
}

#[test]
fn test_sid_rejects_reserved_prefix() {
    for first in 0x00..=RESERVED_PREFIX_MAX {
        let result = Sid::from_bytes(sid_bytes(first));
        assert!(matches!(result, Err(IdentityError::ReservedPrefix(b)) if b == first));
    }
}

#[test]
fn test_sid_from_slice_wrong_length() {
    let result = Sid::from_slice(&[0xab; 31]);
    assert!(matches!(result, Err(IdentityError::InvalidSidLength(31))));

    let result = Sid::from_slice(&[0xab; 33]);
    assert!(matches!(result, Err(IdentityError::InvalidSidLength(33))));
}

#[test]
fn test_sid_hex_roundtrip() {
    let sid = Sid::generate();
    let text = sid.to_string();
    assert_eq!(text.len(), 64);

    let parsed: Sid = text.parse().unwrap();
    assert_eq!(parsed, sid);
}

#[test]
fn test_sid_from_hex_invalid() {
    assert!(matches!(
        Sid::from_hex("zz"),
        Err(IdentityError::InvalidHex(_))
    ));
    assert!(matches!(
        Sid::from_hex("abcd"),
        Err(IdentityError::InvalidSidLength(2))
    ));
}

#[test]
fn test_sid_generate_never_reserved() {
    for _ in 0..256 {
        let sid = Sid::generate();
        assert!(sid.as_bytes()[0] > RESERVED_PREFIX_MAX);
    }
}

#[test]
fn test_sid_nibbles() {
    let mut bytes = sid_bytes(0x12);
    bytes[1] = 0x34;
    bytes[31] = 0xef;
    let sid = Sid::from_bytes(bytes).unwrap();

    assert_eq!(sid.nibble(0), 0x1);
    assert_eq!(sid.nibble(1), 0x2);
    assert_eq!(sid.nibble(2), 0x3);
    assert_eq!(sid.nibble(3), 0x4);
    assert_eq!(sid.nibble(SID_NIBBLES - 2), 0xe);
    assert_eq!(sid.nibble(SID_NIBBLES - 1), 0xf);
    assert_eq!(nibble_at(&[0xa5], 0), 0xa);
    assert_eq!(nibble_at(&[0xa5], 1), 0x5);
}

#[test]
fn test_sid_abbreviation_and_prefix() {
    let mut bytes = sid_bytes(0x12);
    bytes[1] = 0x34;
    let sid = Sid::from_bytes(bytes).unwrap();

    assert_eq!(sid.abbreviation(2), &[0x12, 0x34]);
    assert_eq!(sid.abbreviation(100).len(), SID_SIZE);
    assert!(sid.starts_with(&[0x12, 0x34]));
    assert!(!sid.starts_with(&[0x12, 0x35]));
}

#[test]
fn test_sid_ordering_is_bytewise() {
    let low = Sid::from_bytes(sid_bytes(0x20)).unwrap();
    let mut high_bytes = sid_bytes(0x20);
    high_bytes[31] = 1;
    let high = Sid::from_bytes(high_bytes).unwrap();
    assert!(low < high);
}

#[test]
fn test_sid_debug_is_truncated() {
    let sid = Sid::from_bytes(sid_bytes(0xab)).unwrap();
    assert_eq!(format!("{:?}", sid), "Sid(ab00000000000000)");
}
