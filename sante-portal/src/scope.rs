//! Request lifetimes tied to a view.
//!
//! A view creates a [`ViewScope`] when it mounts and runs its fetches
//! through it. Cancelling or dropping the scope makes every in-flight call
//! resolve with [`PortalError::Cancelled`], so no late reply is applied to
//! a view that is gone.

use crate::error::PortalError;
use std::future::Future;
use tokio::sync::watch;

pub struct ViewScope {
    tx: watch::Sender<bool>,
}

/// Cloneable handle for running work under a scope from other tasks
#[derive(Clone)]
pub struct ScopeHandle {
    rx: watch::Receiver<bool>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, PortalError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<PortalError>,
    {
        self.handle().run(fut).await
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl ScopeHandle {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Run `fut` unless the scope goes away first
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, PortalError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<PortalError>,
    {
        let mut rx = self.rx.clone();
        tokio::select! {
            biased;
            // A dropped sender also ends the wait
            _ = rx.wait_for(|cancelled| *cancelled) => Err(PortalError::Cancelled),
            out = fut => out.map_err(Into::into),
        }
    }
}
