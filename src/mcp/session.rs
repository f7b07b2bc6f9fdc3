use std::sync::{
    atomic::{AtomicI64, Ordering},
    PoisonError, RwLock,
};

/// Per-scan protocol state shared by the transport, handshake and listings.
///
/// Request ids start at 1 and are handed out atomically, so concurrent callers
/// still observe unique, increasing ids.
#[derive(Debug)]
pub struct Session {
    next_id: AtomicI64,
    session_id: RwLock<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            session_id: RwLock::new(None),
        }
    }

    pub fn next_request_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last writer wins: a later response may rotate the session id.
    pub fn record_session_id(&self, value: &str) {
        let mut slot = self
            .session_id
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_deref() != Some(value) {
            tracing::debug!(session_id = %value, "captured session id");
            *slot = Some(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::Session;

    #[test]
    fn ids_start_at_one_without_gaps() {
        let session = Session::new();
        let ids: Vec<i64> = (0..4).map(|_| session.next_request_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn concurrent_ids_are_unique() {
        let session = Arc::new(Session::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| session.next_request_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("worker thread") {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 800);
        assert_eq!(seen.iter().max(), Some(&800));
    }

    #[test]
    fn later_session_id_overwrites_earlier() {
        let session = Session::new();
        assert_eq!(session.session_id(), None);
        session.record_session_id("abc");
        session.record_session_id("abc");
        assert_eq!(session.session_id().as_deref(), Some("abc"));
        session.record_session_id("def");
        assert_eq!(session.session_id().as_deref(), Some("def"));
    }
}
