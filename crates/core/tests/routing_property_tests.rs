//! Property-based tests for event routing, session lifecycle and the
//! initial-sync trigger key.

use proptest::prelude::*;
use serde_json::json;
use storepulse_core::events::{route, DomainEvent, EventCategory, EventKind};
use storepulse_core::jobs::Priority;
use storepulse_core::platforms::Platform;
use storepulse_core::sync::{initial_sync_trigger_key, SyncStatus};

// =============================================================================
// Generators
// =============================================================================

fn arb_kind() -> impl Strategy<Value = EventKind> {
    (0..EventKind::ALL.len()).prop_map(|i| EventKind::ALL[i])
}

fn arb_platform() -> impl Strategy<Value = Platform> {
    (0..Platform::ALL.len()).prop_map(|i| Platform::ALL[i])
}

fn arb_status() -> impl Strategy<Value = SyncStatus> {
    prop_oneof![
        Just(SyncStatus::Pending),
        Just(SyncStatus::Processing),
        Just(SyncStatus::Syncing),
        Just(SyncStatus::Completed),
        Just(SyncStatus::Failed),
    ]
}

/// Type strings that never collide with a known kind.
fn arb_unknown_type() -> impl Strategy<Value = String> {
    "[a-z]{3,12}_x[a-z]{0,6}"
        .prop_filter("known kind", |s| s.parse::<EventKind>().is_err())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn unknown_types_are_stored_but_never_routed(event_type in arb_unknown_type()) {
        let event = DomainEvent::from_parts(&event_type, json!({ "k": 1 })).unwrap();
        prop_assert!(event.kind().is_none());
        prop_assert_eq!(route(&event), None);
        prop_assert_eq!(event.priority(), Priority::Normal);
        prop_assert_eq!(event.default_category(), EventCategory::System);
        prop_assert_eq!(event.event_type(), event_type.as_str());
    }

    #[test]
    fn kind_names_parse_back(kind in arb_kind()) {
        prop_assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
    }

    #[test]
    fn status_never_moves_backwards(from in arb_status(), to in arb_status()) {
        if from.can_transition_to(to) {
            prop_assert!(!from.is_terminal());
            prop_assert_ne!(from, to);
            prop_assert!(to != SyncStatus::Pending);
        }
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    #[test]
    fn trigger_key_ignores_platform_order_and_repeats(
        org in "[a-z0-9-]{1,16}",
        platforms in prop::collection::vec(arb_platform(), 1..8),
    ) {
        let mut reversed = platforms.clone();
        reversed.reverse();
        let mut doubled = platforms.clone();
        doubled.extend(platforms.iter().copied());

        let key = initial_sync_trigger_key(&org, &platforms);
        prop_assert_eq!(&key, &initial_sync_trigger_key(&org, &reversed));
        prop_assert_eq!(&key, &initial_sync_trigger_key(&org, &doubled));
        let prefix = format!("initial-sync:{}:", org);
        prop_assert!(key.starts_with(&prefix));
    }
}

#[test]
fn priority_table_matches_declared_order() {
    let mut kinds = EventKind::ALL.to_vec();
    kinds.sort_by_key(|k| std::cmp::Reverse(k.priority()));
    assert_eq!(kinds[0].priority(), Priority::Critical);
    assert_eq!(kinds[kinds.len() - 1].priority(), Priority::Low);
    assert!(Priority::Critical > Priority::High);
    assert!(Priority::High > Priority::Normal);
    assert!(Priority::Normal > Priority::Low);
}
