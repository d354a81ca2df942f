//! Event streaming Relay backed by an unbounded channel.
//!
//! A Relay is the sending half the renderer keeps; the receiving half is the
//! coordinator's FIFO operation queue.

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

/// Type-safe event streaming relay.
///
/// Cloning a relay yields another sender into the same queue, so several
/// element callbacks (click, hover, zoom buttons) can feed one consumer.
/// Events are delivered in the order they were sent.
///
/// # Examples
///
/// ```rust
/// use frontend::dataflow::relay;
/// use frontend::ViewEvent;
/// use futures::{FutureExt, StreamExt};
///
/// let (toggle_relay, mut stream) = relay::<ViewEvent>();
/// toggle_relay.send(ViewEvent::ToggleRequested("cultura".into()));
/// assert_eq!(
///     stream.next().now_or_never(),
///     Some(Some(ViewEvent::ToggleRequested("cultura".into())))
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
}

/// Error type for Relay operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The channel has been closed (receiver dropped)
    #[error("relay receiver dropped")]
    ChannelClosed,
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new Relay with an associated receiver stream.
    ///
    /// Use the `relay()` function for more convenient creation.
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (Relay { sender }, receiver)
    }

    /// Send an event through the relay.
    ///
    /// If the receiver has been dropped, the event is silently discarded;
    /// a torn-down view has nobody left to tell.
    pub fn send(&self, value: T) {
        let _ = self.sender.unbounded_send(value);
    }

    /// Try to send an event through the relay with explicit error handling.
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

/// Creates a new Relay with an associated receiver stream.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_relay_basic_functionality() {
        let (relay, mut receiver) = Relay::new();

        relay.send("test_event".to_string());

        let received = receiver.next().await;
        assert_eq!(received, Some("test_event".to_string()));
    }

    #[tokio::test]
    async fn test_relay_try_send() {
        let (relay, mut receiver) = Relay::new();

        // Should succeed while receiver exists
        assert!(relay.try_send("test".to_string()).is_ok());
        assert_eq!(receiver.next().await, Some("test".to_string()));

        // Drop receiver
        drop(receiver);

        // Should fail after receiver dropped
        assert_eq!(relay.try_send("fail".to_string()), Err(RelayError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_cloned_relays_share_fifo_order() {
        let (click_relay, mut stream) = relay::<u32>();
        let hover_relay = click_relay.clone();

        click_relay.send(1);
        hover_relay.send(2);
        click_relay.send(3);
        drop(click_relay);
        drop(hover_relay);

        let received: Vec<u32> = stream.collect().await;
        assert_eq!(received, vec![1, 2, 3]);
    }
}
