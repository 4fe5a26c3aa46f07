//! The write gate.
//!
//! The interception point between message arrival and message
//! propagation or storage. The host synchronization engine calls
//! [`WriteGate::check`] from each of its three hook points; the gate
//! returns an explicit forward-or-suppress action instead of relying
//! on "call next or don't" control flow.
//!
//! Each check is an independent async task: a slow chain lookup
//! suspends only the message being verified, never unrelated traffic.
//! If the originating connection closes mid-verification the check
//! simply completes and its result is discarded; chain queries are not
//! cheaply cancellable. Writes are verified independently, so even
//! same-connection writes may resolve out of submission order; callers
//! needing strict ordering must serialize above the gate.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::RuntimeFlavor;
use tracing::{debug, warn};

use graphgate_auth::{Decision, Resolver};
use graphgate_core::WireMessage;

/// Where in the pipeline a message was intercepted.
///
/// The storage-commit hook re-checks independently of the transport
/// hooks: a message that passed outbound or inbound gating must still
/// pass here before persisting, since the hooks can be reached through
/// different paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Writer to relay.
    Outbound,
    /// Relay to other peers.
    Inbound,
    /// Persistence boundary.
    StorageCommit,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPoint::Outbound => "outbound",
            HookPoint::Inbound => "inbound",
            HookPoint::StorageCommit => "storage_commit",
        };
        f.write_str(name)
    }
}

/// What the host engine should do with an intercepted message.
#[derive(Debug, Clone, PartialEq)]
pub enum GateAction {
    /// Forward the original message unchanged to the next stage.
    Forward,
    /// Do not forward. If the message carried a correlation id, `ack`
    /// holds a rejection to send back on the direct reply channel so
    /// the writer sees an explicit refusal rather than silence.
    Suppress {
        /// Rejection acknowledgment for the originating peer.
        ack: Option<WireMessage>,
    },
}

impl GateAction {
    /// Whether the message should propagate.
    pub fn is_forward(&self) -> bool {
        matches!(self, GateAction::Forward)
    }
}

/// Consumes resolver decisions at the sync engine's hook points.
pub struct WriteGate {
    resolver: Arc<Resolver>,
}

impl WriteGate {
    /// Create a gate over a resolver.
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// Resolve a message to a decision without acting on it.
    pub async fn authorize(&self, message: &WireMessage) -> Decision {
        self.resolver.authorize(message).await
    }

    /// Check a message at a hook point.
    ///
    /// Messages without a write payload are never gated: reads, acks,
    /// and handshakes always forward.
    pub async fn check(&self, hook: HookPoint, message: &WireMessage) -> GateAction {
        if !message.has_put() {
            return GateAction::Forward;
        }

        match self.authorize(message).await {
            Decision::Allowed { tier, .. } => {
                debug!(%hook, %tier, msg_id = ?message.id, "write authorized");
                GateAction::Forward
            }
            Decision::Denied { reason } => {
                warn!(%hook, %reason, msg_id = ?message.id, "write suppressed");
                let ack = message
                    .id
                    .is_some()
                    .then(|| message.rejection(format!("write not authorized: {reason}")));
                GateAction::Suppress { ack }
            }
        }
    }

    /// Synchronous convenience wrapper for non-async call sites.
    ///
    /// Blocks the current thread until the decision resolves. Suitable
    /// only at low message volume; hook integrations should prefer
    /// [`WriteGate::check`].
    pub fn is_valid_write(&self, message: &WireMessage) -> bool {
        if !message.has_put() {
            return true;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| {
                    handle.block_on(self.authorize(message)).is_allowed()
                })
            }
            // block_in_place is unavailable on a current-thread
            // runtime; resolve on a dedicated thread with its own
            // runtime instead of panicking.
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.resolve_blocking(message))
                    .join()
                    .unwrap_or(false)
            }),
            Err(_) => self.resolve_blocking(message),
        }
    }

    fn resolve_blocking(&self, message: &WireMessage) -> bool {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map(|runtime| runtime.block_on(self.authorize(message)).is_allowed())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use graphgate_auth::PreAuthCache;
    use graphgate_core::Identity;

    use super::*;

    fn gate_with_cache() -> (WriteGate, Arc<PreAuthCache>) {
        let cache = Arc::new(PreAuthCache::new());
        let resolver = Arc::new(Resolver::builder(Arc::clone(&cache)).build());
        (WriteGate::new(resolver), cache)
    }

    fn write_from(key: &str) -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert(format!("~{key}"), serde_json::json!({"v": 1}));
        WireMessage {
            id: Some("w1".into()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    #[tokio::test]
    async fn test_reads_are_never_gated() {
        let (gate, _) = gate_with_cache();
        let read = WireMessage {
            id: Some("r1".into()),
            get: Some(serde_json::json!({"#": "some-soul"})),
            ..WireMessage::default()
        };
        assert_eq!(gate.check(HookPoint::Inbound, &read).await, GateAction::Forward);
    }

    #[tokio::test]
    async fn test_denied_write_is_suppressed_with_ack() {
        let (gate, _) = gate_with_cache();
        let msg = write_from("K1");

        let action = gate.check(HookPoint::Outbound, &msg).await;
        match action {
            GateAction::Suppress { ack: Some(ack) } => {
                assert_eq!(ack.ack_for.as_deref(), Some("w1"));
                let err = ack.err.unwrap();
                assert!(err.contains("not authorized"));
            }
            other => panic!("expected suppression with ack, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_denied_write_without_id_has_no_ack() {
        let (gate, _) = gate_with_cache();
        let mut msg = write_from("K1");
        msg.id = None;

        let action = gate.check(HookPoint::Outbound, &msg).await;
        assert_eq!(action, GateAction::Suppress { ack: None });
    }

    #[tokio::test]
    async fn test_authorized_write_forwards_at_every_hook() {
        let (gate, cache) = gate_with_cache();
        cache
            .grant(&Identity::new("K1"), std::time::Duration::from_secs(60))
            .await;

        let msg = write_from("K1");
        for hook in [HookPoint::Outbound, HookPoint::Inbound, HookPoint::StorageCommit] {
            assert!(gate.check(hook, &msg).await.is_forward(), "hook {hook}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_wrapper_inside_runtime() {
        let (gate, cache) = gate_with_cache();
        cache
            .grant(&Identity::new("K1"), std::time::Duration::from_secs(60))
            .await;

        assert!(gate.is_valid_write(&write_from("K1")));
        assert!(!gate.is_valid_write(&write_from("K2")));
    }

    #[tokio::test]
    async fn test_blocking_wrapper_on_current_thread_runtime() {
        let (gate, cache) = gate_with_cache();
        cache
            .grant(&Identity::new("K1"), std::time::Duration::from_secs(60))
            .await;

        // The default test runtime is current-thread; the wrapper must
        // resolve without panicking.
        assert!(gate.is_valid_write(&write_from("K1")));
        assert!(!gate.is_valid_write(&write_from("K2")));
    }

    #[test]
    fn test_blocking_wrapper_outside_runtime() {
        let cache = Arc::new(PreAuthCache::new());
        let resolver = Arc::new(Resolver::builder(Arc::clone(&cache)).build());
        let gate = WriteGate::new(resolver);

        // No payload: passes without a runtime.
        assert!(gate.is_valid_write(&WireMessage::default()));
        // Unauthorized payload: denied via the throwaway runtime.
        assert!(!gate.is_valid_write(&write_from("K1")));
    }
}
