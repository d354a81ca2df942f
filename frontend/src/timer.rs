//! Delay source for the "layout probably finished" fallback.

use futures::future::{self, FutureExt, LocalBoxFuture};
use std::time::Duration;

pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Resolves every delay immediately. For headless hosts and tests where
/// wall-clock pacing is irrelevant.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateTimer;

impl Timer for ImmediateTimer {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }
}
