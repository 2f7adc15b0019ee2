//! The set of live sessions and the fan-out policy applied to it.
//!
//! `LiveSet` is plain synchronous state. In production it is owned by the hub
//! loop and never touched from anywhere else; tests drive it directly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::domain::foundation::ClientId;
use crate::domain::realtime::EncodedEnvelope;

/// The hub's end of one session.
///
/// Holds the only producer of the session's mailbox and the sender side of
/// its eviction signal. Dropping the handle closes both, which is how
/// eviction tears a session down.
#[derive(Debug)]
pub struct SessionHandle {
    id: ClientId,
    mailbox: mpsc::Sender<EncodedEnvelope>,
    _eviction: watch::Sender<()>,
}

/// The session's end: the consumer of its mailbox and the eviction signal.
#[derive(Debug)]
pub struct Mailbox {
    pub frames: mpsc::Receiver<EncodedEnvelope>,
    pub evicted: EvictionSignal,
}

/// Completes once the hub has dropped the session's handle.
///
/// Cloneable so both session loops can watch it. Nothing is ever sent on the
/// underlying channel; only its closure matters.
#[derive(Debug, Clone)]
pub struct EvictionSignal(watch::Receiver<()>);

impl EvictionSignal {
    /// Waits until the session is evicted. Cancel safe.
    pub async fn evicted(&mut self) {
        while self.0.changed().await.is_ok() {}
    }

    #[cfg(test)]
    pub fn is_evicted(&self) -> bool {
        self.0.has_changed().is_err()
    }
}

impl SessionHandle {
    /// Creates the two ends of a session with a mailbox of `capacity` frames.
    pub fn open(id: ClientId, capacity: usize) -> (Self, Mailbox) {
        let (mailbox, frames) = mpsc::channel(capacity);
        let (eviction, watcher) = watch::channel(());
        let handle = Self {
            id,
            mailbox,
            _eviction: eviction,
        };
        let mailbox = Mailbox {
            frames,
            evicted: EvictionSignal(watcher),
        };
        (handle, mailbox)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }
}

/// Result of offering one envelope to every live session.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub evicted: Vec<ClientId>,
}

/// Identity-keyed set of live sessions.
#[derive(Debug, Default)]
pub struct LiveSet {
    sessions: HashMap<ClientId, SessionHandle>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a session. Returns `false` if its identity is already live, in
    /// which case the existing entry is kept and `handle` is dropped.
    pub fn admit(&mut self, handle: SessionHandle) -> bool {
        match self.sessions.entry(handle.id) {
            Entry::Occupied(_) => {
                debug!(client_id = %handle.id, "Ignoring duplicate registration");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Removes a session and tears it down. Absent sessions are a no-op.
    pub fn evict(&mut self, id: &ClientId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Offers `frame` to every live session without blocking.
    ///
    /// A session whose mailbox is full or already closed is evicted; the
    /// remaining sessions still receive the frame.
    pub fn fan_out(&mut self, frame: &EncodedEnvelope) -> FanOut {
        let mut outcome = FanOut::default();

        for (id, handle) in &self.sessions {
            match handle.mailbox.try_send(frame.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        client_id = %id,
                        event_type = %frame.event_type(),
                        "Mailbox full, evicting stalled client"
                    );
                    outcome.evicted.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(client_id = %id, "Mailbox closed, evicting client");
                    outcome.evicted.push(*id);
                }
            }
        }

        for id in &outcome.evicted {
            self.sessions.remove(id);
        }

        outcome
    }

    #[cfg(test)]
    pub fn contains(&self, id: &ClientId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = &ClientId> + '_ {
        self.sessions.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::limits::MAILBOX_CAPACITY;
    use crate::domain::realtime::EventType;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;
    use tokio::sync::mpsc::error::TryRecvError;

    fn frame(seq: usize) -> EncodedEnvelope {
        EncodedEnvelope::encode(EventType::POST_CREATED, &json!({ "seq": seq })).unwrap()
    }

    fn open(capacity: usize) -> (SessionHandle, Mailbox) {
        SessionHandle::open(ClientId::new(), capacity)
    }

    fn drain(mailbox: &mut Mailbox, into: &mut Vec<EncodedEnvelope>) {
        while let Ok(frame) = mailbox.frames.try_recv() {
            into.push(frame);
        }
    }

    #[test]
    fn admit_adds_session() {
        let mut live = LiveSet::new();
        let (handle, _mailbox) = open(4);
        let id = handle.id();

        assert!(live.admit(handle));
        assert!(live.contains(&id));
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn duplicate_identity_is_admitted_once() {
        let mut live = LiveSet::new();
        let id = ClientId::new();
        let (first, mut first_mailbox) = SessionHandle::open(id, 4);
        let (second, mut second_mailbox) = SessionHandle::open(id, 4);

        assert!(live.admit(first));
        assert!(!live.admit(second));
        assert_eq!(live.len(), 1);

        // The kept entry is the first one
        live.fan_out(&frame(1));
        assert!(first_mailbox.frames.try_recv().is_ok());
        assert_eq!(
            second_mailbox.frames.try_recv().unwrap_err(),
            TryRecvError::Disconnected
        );
    }

    #[test]
    fn evicting_absent_session_is_noop() {
        let mut live = LiveSet::new();
        let (handle, _mailbox) = open(4);
        live.admit(handle);

        assert!(!live.evict(&ClientId::new()));
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn evict_closes_mailbox_and_signals_session() {
        let mut live = LiveSet::new();
        let (handle, mut mailbox) = open(4);
        let id = handle.id();
        live.admit(handle);
        assert!(!mailbox.evicted.is_evicted());

        assert!(live.evict(&id));
        assert!(!live.evict(&id));
        assert_eq!(mailbox.frames.try_recv().unwrap_err(), TryRecvError::Disconnected);
        assert!(mailbox.evicted.is_evicted());
    }

    #[test]
    fn fan_out_delivers_one_shared_copy_to_each_session() {
        let mut live = LiveSet::new();
        let mut mailboxes = Vec::new();
        for _ in 0..3 {
            let (handle, mailbox) = open(4);
            live.admit(handle);
            mailboxes.push(mailbox);
        }

        let sent = frame(7);
        let outcome = live.fan_out(&sent);

        assert_eq!(outcome.delivered, 3);
        assert!(outcome.evicted.is_empty());
        for mailbox in &mut mailboxes {
            let got = mailbox.frames.try_recv().unwrap();
            assert!(got.shares_buffer_with(&sent));
            assert!(mailbox.frames.try_recv().is_err());
        }
    }

    #[test]
    fn session_admitted_after_fan_out_does_not_receive_it() {
        let mut live = LiveSet::new();
        live.fan_out(&frame(1));

        let (handle, mut mailbox) = open(4);
        live.admit(handle);

        assert_eq!(mailbox.frames.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn saturated_session_is_evicted_and_others_still_receive() {
        let mut live = LiveSet::new();
        let (slow, slow_mailbox) = open(2);
        let (fast, mut fast_mailbox) = open(2);
        let slow_id = slow.id();
        live.admit(slow);
        live.admit(fast);

        live.fan_out(&frame(1));
        live.fan_out(&frame(2));
        fast_mailbox.frames.try_recv().unwrap();
        fast_mailbox.frames.try_recv().unwrap();

        let outcome = live.fan_out(&frame(3));

        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.evicted, vec![slow_id]);
        assert!(!live.contains(&slow_id));
        assert_eq!(fast_mailbox.frames.try_recv().unwrap().as_str(), frame(3).as_str());
        assert!(slow_mailbox.evicted.is_evicted());
    }

    #[test]
    fn session_with_closed_mailbox_is_evicted() {
        let mut live = LiveSet::new();
        let (handle, mailbox) = open(4);
        let id = handle.id();
        live.admit(handle);
        drop(mailbox);

        let outcome = live.fan_out(&frame(1));

        assert_eq!(outcome.evicted, vec![id]);
        assert!(live.is_empty());
    }

    #[test]
    fn stalled_consumer_among_three_is_dropped_after_129_broadcasts() {
        let mut live = LiveSet::new();
        let (a, mut mailbox_a) = open(MAILBOX_CAPACITY);
        let (b, mut mailbox_b) = open(MAILBOX_CAPACITY);
        let (c, mut mailbox_c) = open(MAILBOX_CAPACITY);
        let b_id = b.id();
        live.admit(a);
        live.admit(b);
        live.admit(c);

        let mut received_a = Vec::new();
        let mut received_c = Vec::new();
        for seq in 0..129 {
            live.fan_out(&frame(seq));
            drain(&mut mailbox_a, &mut received_a);
            drain(&mut mailbox_c, &mut received_c);
        }

        assert!(!live.contains(&b_id));
        assert_eq!(live.len(), 2);
        assert!(mailbox_b.evicted.is_evicted());

        // B keeps only what it had queued before the eviction
        let mut leftover_b = Vec::new();
        drain(&mut mailbox_b, &mut leftover_b);
        assert_eq!(leftover_b.len(), MAILBOX_CAPACITY);
        assert_eq!(mailbox_b.frames.try_recv().unwrap_err(), TryRecvError::Disconnected);

        for received in [&received_a, &received_c] {
            assert_eq!(received.len(), 129);
            for (seq, got) in received.iter().enumerate() {
                assert_eq!(got.as_str(), frame(seq).as_str());
            }
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(usize),
        Unregister(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..6usize).prop_map(Op::Register),
            (0..6usize).prop_map(Op::Unregister),
        ]
    }

    proptest! {
        #[test]
        fn live_set_matches_net_effect_of_operations(ops in prop::collection::vec(op(), 0..64)) {
            let ids: Vec<ClientId> = (0..6).map(|_| ClientId::new()).collect();
            let mut live = LiveSet::new();
            let mut model = HashSet::new();

            for op in ops {
                match op {
                    Op::Register(i) => {
                        let (handle, _mailbox) = SessionHandle::open(ids[i], 1);
                        prop_assert_eq!(live.admit(handle), model.insert(ids[i]));
                    }
                    Op::Unregister(i) => {
                        prop_assert_eq!(live.evict(&ids[i]), model.remove(&ids[i]));
                    }
                }
            }

            let actual: HashSet<ClientId> = live.ids().copied().collect();
            prop_assert_eq!(actual, model);
        }
    }
}
