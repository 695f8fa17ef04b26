//! Identifier generation for every engine that mints server-side ids.
//!
//! All ids flow through the [`IdSource`] trait so tests can swap the random
//! source for a deterministic one and pin the ids they assert against.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Token lengths match the wire shapes the engines emulate: short ids for
/// documents, messages, and etags; longer opaque tokens for receipt handles.
pub const ID_LEN: usize = 9;
pub const RECEIPT_HANDLE_LEN: usize = 16;

pub trait IdSource: Send + Sync {
    /// Short lowercase base36 token used for document ids, message ids,
    /// placeholder content hashes, and etags.
    fn id(&self) -> String;

    /// Longer opaque token used for queue receipt handles.
    fn receipt_handle(&self) -> String;
}

/// Production source: uniformly random base36 tokens.
#[derive(Debug, Default)]
pub struct RandomIds;

impl RandomIds {
    fn token(len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl IdSource for RandomIds {
    fn id(&self) -> String {
        Self::token(ID_LEN)
    }

    fn receipt_handle(&self) -> String {
        Self::token(RECEIPT_HANDLE_LEN)
    }
}

/// Test source: zero-padded counters, same token lengths as [`RandomIds`].
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdSource for SequentialIds {
    fn id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:09}", n)
    }

    fn receipt_handle(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:016}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let ids = RandomIds;
        for _ in 0..100 {
            let id = ids.id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_random_receipt_handle_shape() {
        let ids = RandomIds;
        let handle = ids.receipt_handle();
        assert_eq!(handle.len(), RECEIPT_HANDLE_LEN);
        assert!(handle.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let ids = RandomIds;
        let a = ids.id();
        let b = ids.id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIds::default();
        assert_eq!(ids.id(), "000000000");
        assert_eq!(ids.id(), "000000001");
        assert_eq!(ids.receipt_handle(), "0000000000000002");
    }
}
