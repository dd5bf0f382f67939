//! Property-based tests for cursor traversal

use super::store::SessionStore;
use crate::models::Profile;
use proptest::prelude::*;

fn queue(len: usize) -> Vec<Profile> {
    (0..len)
        .map(|i| Profile {
            id: format!("p{}", i),
            name: format!("Candidate {}", i),
            age: 30,
            job: String::new(),
            bio: String::new(),
            education: String::new(),
            looking_for: String::new(),
            photo: String::new(),
            interests: vec![],
            hobbies: vec![],
        })
        .collect()
}

proptest! {
    #[test]
    fn cursor_cycles_through_queue(len in 1usize..40, steps in 0usize..200) {
        let mut store = SessionStore::default();
        store.replace_queue(queue(len));

        for _ in 0..steps {
            store.advance_cursor();
            prop_assert!(store.cursor() < len);
        }

        prop_assert_eq!(store.cursor(), steps % len);
    }

    #[test]
    fn empty_queue_cursor_stays_at_zero(steps in 0usize..50) {
        let mut store = SessionStore::default();
        for _ in 0..steps {
            store.advance_cursor();
        }
        prop_assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn overlapping_captures_advance_once(len in 2usize..20, overlap in 2usize..6) {
        let mut store = SessionStore::default();
        store.replace_queue(queue(len));

        let captured: Vec<_> = (0..overlap).filter_map(|_| store.presented()).collect();
        let advanced = captured.iter().filter(|p| store.advance_from(p)).count();

        prop_assert_eq!(advanced, 1);
        prop_assert_eq!(store.cursor(), 1);
    }
}
