//! Lazily established handle to the hosted inference endpoint.
//!
//! The browser exposes the client library as a global that may appear some
//! time after the page starts. [`Connector::ensure_connection`] waits for it
//! under a [`RetryPolicy`], connects once, and hands the same client to every
//! later request of the page.

use derive_more::Display;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::asset::ImageAsset;
use crate::error::ClientError;

/// A connected client able to run predictions.
pub trait InferenceClient {
    /// Sends `image` to `route` and resolves to the `data` payload of the reply.
    fn predict(&self, route: &str, image: &ImageAsset) -> LocalBoxFuture<'static, Result<Value, ClientError>>;
}

/// The globally provided constructor of [`InferenceClient`]s.
pub trait ClientFactory {
    type Client: InferenceClient + 'static;

    fn is_available(&self) -> bool;

    fn connect(&self, endpoint: &str) -> LocalBoxFuture<'static, Result<Self::Client, ClientError>>;
}

pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Bounded retries with a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(50, Duration::from_millis(100))
    }
}

/// Polls `probe` until it reports ready or the policy runs out.
pub async fn wait_until<P>(policy: RetryPolicy, timer: &dyn Timer, mut probe: P) -> Result<(), ClientError>
where
    P: FnMut() -> bool,
{
    if probe() {
        return Ok(());
    }
    for attempt in 1..=policy.max_attempts {
        timer.sleep(policy.interval).await;
        if probe() {
            log::debug!("Client library ready after {} attempts", attempt);
            return Ok(());
        }
    }
    Err(ClientError::ConnectionUnavailable(format!(
        "client library did not load within {} ms",
        policy.timeout().as_millis()
    )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionStatus {
    #[display(fmt = "disconnected")]
    Absent,
    #[display(fmt = "connecting")]
    Connecting,
    #[display(fmt = "ready")]
    Ready,
    #[display(fmt = "unavailable")]
    Failed,
}

type PendingClient<C> = Shared<LocalBoxFuture<'static, Result<Rc<C>, ClientError>>>;

enum HandleSlot<C> {
    Absent,
    Connecting(PendingClient<C>),
    Ready(Rc<C>),
    Failed,
}

pub struct Connector<F: ClientFactory> {
    factory: Rc<F>,
    timer: Rc<dyn Timer>,
    policy: RetryPolicy,
    endpoint: String,
    slot: Rc<RefCell<HandleSlot<F::Client>>>,
}

impl<F: ClientFactory> Clone for Connector<F> {
    fn clone(&self) -> Self {
        Self {
            factory: Rc::clone(&self.factory),
            timer: Rc::clone(&self.timer),
            policy: self.policy,
            endpoint: self.endpoint.clone(),
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<F: ClientFactory + 'static> Connector<F> {
    pub fn new(factory: F, timer: Rc<dyn Timer>, policy: RetryPolicy, endpoint: impl Into<String>) -> Self {
        Self {
            factory: Rc::new(factory),
            timer,
            policy,
            endpoint: endpoint.into(),
            slot: Rc::new(RefCell::new(HandleSlot::Absent)),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> ConnectionStatus {
        match &*self.slot.borrow() {
            HandleSlot::Absent => ConnectionStatus::Absent,
            HandleSlot::Connecting(_) => ConnectionStatus::Connecting,
            HandleSlot::Ready(_) => ConnectionStatus::Ready,
            HandleSlot::Failed => ConnectionStatus::Failed,
        }
    }

    /// Returns the page's client, connecting first if there is none.
    ///
    /// Concurrent callers share one pending connection. A failure leaves the
    /// handle retryable by the next call.
    pub async fn ensure_connection(&self) -> Result<Rc<F::Client>, ClientError> {
        let pending = {
            let mut slot = self.slot.borrow_mut();
            match &*slot {
                HandleSlot::Ready(client) => return Ok(Rc::clone(client)),
                HandleSlot::Connecting(pending) => pending.clone(),
                HandleSlot::Absent | HandleSlot::Failed => {
                    log::info!("Connecting to {}", self.endpoint);
                    let pending = self.establish().shared();
                    *slot = HandleSlot::Connecting(pending.clone());
                    pending
                }
            }
        };

        let result = pending.await;

        let mut slot = self.slot.borrow_mut();
        if matches!(*slot, HandleSlot::Connecting(_)) {
            *slot = match &result {
                Ok(client) => {
                    log::info!("Connected to {}", self.endpoint);
                    HandleSlot::Ready(Rc::clone(client))
                }
                Err(e) => {
                    log::warn!("Connection to {} failed: {}", self.endpoint, e);
                    HandleSlot::Failed
                }
            };
        }
        result
    }

    fn establish(&self) -> LocalBoxFuture<'static, Result<Rc<F::Client>, ClientError>> {
        let factory = Rc::clone(&self.factory);
        let timer = Rc::clone(&self.timer);
        let policy = self.policy;
        let endpoint = self.endpoint.clone();

        async move {
            wait_until(policy, timer.as_ref(), || factory.is_available()).await?;
            let client = factory.connect(&endpoint).await.map_err(|e| match e {
                ClientError::ConnectionUnavailable(_) => e,
                other => ClientError::ConnectionUnavailable(other.to_string()),
            })?;
            Ok(Rc::new(client))
        }
        .boxed_local()
    }
}
