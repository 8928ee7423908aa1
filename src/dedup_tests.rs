// src/dedup_tests.rs
// Unit tests for the duplicate-handling guard.

#[cfg(test)]
mod tests {
    use crate::dedup::{request_key, DedupGuard};

    #[test]
    fn test_first_seen_only_once() {
        let guard = DedupGuard::new();
        assert!(guard.should_process("203.0.113.7", "TestBot/1.0", "/page"));
        assert!(!guard.should_process("203.0.113.7", "TestBot/1.0", "/page"));
    }

    #[test]
    fn test_any_field_change_is_a_new_key() {
        let guard = DedupGuard::new();
        assert!(guard.should_process("203.0.113.7", "TestBot/1.0", "/page"));
        assert!(guard.should_process("203.0.113.8", "TestBot/1.0", "/page"));
        assert!(guard.should_process("203.0.113.7", "TestBot/2.0", "/page"));
        assert!(guard.should_process("203.0.113.7", "TestBot/1.0", "/other"));
    }

    #[test]
    fn test_key_is_stable_and_delimited() {
        assert_eq!(
            request_key("a", "b", "c"),
            request_key("a", "b", "c")
        );
        // The separator keeps ("ab", "c") and ("a", "bc") apart.
        assert_ne!(
            request_key("ab", "", "c"),
            request_key("a", "b", "c")
        );
    }

    #[test]
    fn test_shared_guard_across_threads() {
        use std::sync::Arc;
        let guard = Arc::new(DedupGuard::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = Arc::clone(&guard);
            handles.push(std::thread::spawn(move || {
                guard.should_process("203.0.113.7", "TestBot/1.0", "/page") as u32
            }));
        }
        let firsts: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(firsts, 1);
    }
}
