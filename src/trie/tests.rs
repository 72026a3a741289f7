use super::*;

/// Build a Sid starting with `prefix`, remaining bytes set to `fill`.
fn sid_with(prefix: &[u8], fill: u8) -> Sid {
    let mut bytes = [fill; SID_SIZE];
    bytes[..prefix.len()].copy_from_slice(prefix);
    Sid::from_bytes(bytes).unwrap()
}

fn sid_of(trie: &SubscriberTrie, id: SubscriberId) -> Sid {
    *trie.get(id).unwrap().sid()
}

#[test]
fn test_first_insert_is_unique_at_one_nibble() {
    let mut trie = SubscriberTrie::new();
    let a = sid_with(&[0x12, 0x34], 0xaa);

    let id = trie.find_or_create(&a).unwrap();

    assert_eq!(trie.len(), 1);
    assert_eq!(trie.get(id).unwrap().abbreviate_len(), 1);
    assert_eq!(trie.find(&[0x12]).unwrap(), Lookup::Found(id));
    assert_eq!(trie.find(a.as_bytes()).unwrap(), Lookup::Found(id));
}

#[test]
fn test_insert_same_address_twice_returns_same_record() {
    let mut trie = SubscriberTrie::new();
    let a = sid_with(&[0x40], 0x01);

    let first = trie.find_or_create(&a).unwrap();
    let second = trie.find_or_create(&a).unwrap();
    let third = trie.lookup_or_create(a.as_bytes(), true).unwrap();

    assert_eq!(first, second);
    assert_eq!(third, Lookup::Found(first));
    assert_eq!(trie.len(), 1);
}

#[test]
fn test_split_pushes_both_leaves_to_divergence_depth() {
    let mut trie = SubscriberTrie::new();
    let a = sid_with(&[0x12, 0x34], 0x00);
    let b = sid_with(&[0x12, 0x35], 0x00);

    let ida = trie.find_or_create(&a).unwrap();
    assert_eq!(trie.get(ida).unwrap().abbreviate_len(), 1);

    let idb = trie.find_or_create(&b).unwrap();
    assert_ne!(ida, idb);

    // Shared nibbles 1,2,3; they differ at the fourth.
    assert_eq!(trie.get(ida).unwrap().abbreviate_len(), 4);
    assert_eq!(trie.get(idb).unwrap().abbreviate_len(), 4);
    assert_eq!(trie.leaf_depth(&a), Some(4));
    assert_eq!(trie.leaf_depth(&b), Some(4));

    assert_eq!(trie.root.node_mask(), 1 << 1);
    assert_eq!(trie.root.leaf_mask(), 0);
    // Root plus one node for each shared nibble
    assert_eq!(trie.node_count(), 4);
}

#[test]
fn test_short_prefix_is_ambiguous() {
    let mut trie = SubscriberTrie::new();
    let ida = trie.find_or_create(&sid_with(&[0x12, 0x34], 0x00)).unwrap();
    let idb = trie.find_or_create(&sid_with(&[0x12, 0x35], 0x00)).unwrap();

    assert_eq!(trie.find(&[0x12]).unwrap(), Lookup::Ambiguous);
    assert_eq!(trie.find(&[0x12, 0x34]).unwrap(), Lookup::Found(ida));
    assert_eq!(trie.find(&[0x12, 0x35]).unwrap(), Lookup::Found(idb));
    assert_eq!(trie.find(&[0x12, 0x36]).unwrap(), Lookup::Unknown);
}

#[test]
fn test_ambiguity_never_resolves_to_either_subscriber() {
    let mut trie = SubscriberTrie::new();
    let mut a_bytes = [0x77u8; SID_SIZE];
    let mut b_bytes = [0x77u8; SID_SIZE];
    a_bytes[31] = 0x01;
    b_bytes[31] = 0x02;
    let a = Sid::from_bytes(a_bytes).unwrap();
    let b = Sid::from_bytes(b_bytes).unwrap();
    trie.find_or_create(&a).unwrap();
    trie.find_or_create(&b).unwrap();

    for len in 1..SID_SIZE {
        let lookup = trie.find(&a_bytes[..len]).unwrap();
        assert_eq!(lookup, Lookup::Ambiguous, "prefix length {len}");
        assert!(lookup.subscriber().is_none());
    }
}

#[test]
fn test_prefix_reaching_foreign_leaf_is_unknown() {
    let mut trie = SubscriberTrie::new();
    trie.find_or_create(&sid_with(&[0x12, 0x99], 0x00)).unwrap();

    // First nibble lands on the only leaf, which doesn't carry the prefix.
    assert_eq!(trie.find(&[0x13]).unwrap(), Lookup::Unknown);
    assert_eq!(trie.find(&[0x12, 0x34]).unwrap(), Lookup::Unknown);
}

#[test]
fn test_abbreviation_never_creates() {
    let mut trie = SubscriberTrie::new();
    let lookup = trie.lookup_or_create(&[0x40; 31], true).unwrap();

    assert_eq!(lookup, Lookup::Unknown);
    assert!(trie.is_empty());
}

#[test]
fn test_lookup_without_create_does_not_insert() {
    let mut trie = SubscriberTrie::new();
    let a = sid_with(&[0x40], 0x01);

    assert_eq!(trie.lookup_or_create(a.as_bytes(), false).unwrap(), Lookup::Unknown);
    assert!(trie.is_empty());
}

#[test]
fn test_full_length_reserved_prefix_rejected() {
    let mut trie = SubscriberTrie::new();
    let result = trie.lookup_or_create(&[0x05; SID_SIZE], true);

    assert!(matches!(
        result,
        Err(TrieError::Identity(IdentityError::ReservedPrefix(0x05)))
    ));
    assert!(trie.is_empty());
}

#[test]
fn test_invalid_prefix_length() {
    let trie = SubscriberTrie::new();
    assert!(matches!(trie.find(&[]), Err(TrieError::InvalidPrefixLength(0))));
    assert!(matches!(
        trie.find(&[0x20; 33]),
        Err(TrieError::InvalidPrefixLength(33))
    ));
}

#[test]
fn test_capacity_limit_refuses_without_side_effects() {
    let mut trie = SubscriberTrie::with_max_subscribers(2);
    let a = sid_with(&[0x12, 0x34], 0x00);
    let b = sid_with(&[0x56], 0x00);
    let ida = trie.find_or_create(&a).unwrap();
    trie.find_or_create(&b).unwrap();

    // Would split a's leaf.
    let colliding = sid_with(&[0x12, 0x35], 0x00);
    let result = trie.find_or_create(&colliding);
    assert!(matches!(result, Err(TrieError::Full { max: 2 })));
    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(ida).unwrap().abbreviate_len(), 1);
    assert_eq!(trie.find(&[0x12]).unwrap(), Lookup::Found(ida));

    // Existing records are still returned.
    assert_eq!(trie.find_or_create(&a).unwrap(), ida);
}

#[test]
fn test_matching_returns_prefix_range_in_order() {
    let mut trie = SubscriberTrie::new();
    let sids = [
        sid_with(&[0x12, 0x40], 0x00),
        sid_with(&[0x13, 0x00], 0x00),
        sid_with(&[0x12, 0x34, 0x01], 0x00),
        sid_with(&[0x12, 0x34, 0x02], 0x00),
        sid_with(&[0x11, 0xff], 0x00),
    ];
    for sid in &sids {
        trie.find_or_create(sid).unwrap();
    }

    let found: Vec<Sid> = trie
        .matching(&[0x12])
        .into_iter()
        .map(|id| sid_of(&trie, id))
        .collect();
    assert_eq!(found, vec![sids[2], sids[3], sids[0]]);

    let found: Vec<Sid> = trie
        .matching(&[0x12, 0x34])
        .into_iter()
        .map(|id| sid_of(&trie, id))
        .collect();
    assert_eq!(found, vec![sids[2], sids[3]]);

    assert!(trie.matching(&[0x14]).is_empty());
}

#[test]
fn test_matching_skips_leaf_outside_prefix() {
    let mut trie = SubscriberTrie::new();
    trie.find_or_create(&sid_with(&[0x12, 0x99], 0x00)).unwrap();

    assert!(trie.matching(&[0x12, 0x34]).is_empty());
    assert_eq!(trie.matching(&[0x12]).len(), 1);
}

#[test]
fn test_enumerate_from_is_inclusive_and_ordered() {
    let mut trie = SubscriberTrie::new();
    let mut sids: Vec<Sid> = (0..200).map(|_| Sid::generate()).collect();
    for sid in &sids {
        trie.find_or_create(sid).unwrap();
    }
    sids.sort();

    let start = sids[50];
    let found: Vec<Sid> = trie
        .enumerate_from(&start)
        .into_iter()
        .map(|id| sid_of(&trie, id))
        .collect();
    assert_eq!(found, sids[50..].to_vec());
}

#[test]
fn test_walk_without_bounds_visits_everything_in_order() {
    let mut trie = SubscriberTrie::new();
    let mut sids: Vec<Sid> = (0..100).map(|_| Sid::generate()).collect();
    for sid in &sids {
        trie.find_or_create(sid).unwrap();
    }
    sids.sort();

    let mut seen = Vec::new();
    let stopped = trie.walk(None, None, |_, sub| {
        seen.push(*sub.sid());
        ControlFlow::Continue(())
    });
    assert!(!stopped);
    assert_eq!(seen, sids);
}

#[test]
fn test_walk_range_between_bounds() {
    let mut trie = SubscriberTrie::new();
    let sids = [
        sid_with(&[0x20], 0x00),
        sid_with(&[0x25, 0x10], 0x00),
        sid_with(&[0x31], 0x00),
        sid_with(&[0x3f], 0x00),
        sid_with(&[0x41], 0x00),
    ];
    for sid in &sids {
        trie.find_or_create(sid).unwrap();
    }

    let mut seen = Vec::new();
    trie.walk(Some(&[0x25]), Some(&[0x3f]), |_, sub| {
        seen.push(*sub.sid());
        ControlFlow::Continue(())
    });
    assert_eq!(seen, vec![sids[1], sids[2], sids[3]]);
}

#[test]
fn test_walk_stops_early() {
    let mut trie = SubscriberTrie::new();
    for _ in 0..20 {
        trie.find_or_create(&Sid::generate()).unwrap();
    }

    let mut visits = 0;
    let stopped = trie.walk(None, None, |_, _| {
        visits += 1;
        if visits == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert!(stopped);
    assert_eq!(visits, 3);
}

#[test]
fn test_cached_depth_tracks_live_depth() {
    let mut trie = SubscriberTrie::new();
    let sids: Vec<Sid> = (0..500).map(|_| Sid::generate()).collect();
    for sid in &sids {
        trie.find_or_create(sid).unwrap();

        // Every record stays consistent after each insert.
        for (_, sub) in trie.iter() {
            assert_eq!(trie.leaf_depth(sub.sid()), Some(sub.abbreviate_len()));
        }
    }
}

#[test]
fn test_every_inserted_address_resolves_by_its_unique_prefix() {
    let mut trie = SubscriberTrie::new();
    let sids: Vec<Sid> = (0..300).map(|_| Sid::generate()).collect();
    let ids: Vec<SubscriberId> = sids
        .iter()
        .map(|sid| trie.find_or_create(sid).unwrap())
        .collect();

    for (sid, id) in sids.iter().zip(&ids) {
        let nibbles = trie.get(*id).unwrap().abbreviate_len();
        let bytes = nibbles.div_ceil(2);
        assert_eq!(trie.find(&sid.as_bytes()[..bytes]).unwrap(), Lookup::Found(*id));
    }
}

#[test]
fn test_leaf_depth_unknown_sid() {
    let mut trie = SubscriberTrie::new();
    trie.find_or_create(&sid_with(&[0x12], 0x00)).unwrap();

    assert_eq!(trie.leaf_depth(&sid_with(&[0x12], 0x01)), None);
    assert_eq!(trie.leaf_depth(&sid_with(&[0x30], 0x01)), None);
}
