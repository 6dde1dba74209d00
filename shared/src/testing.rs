//! Scriptable stand-ins for the browser client library.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::asset::{ImageAsset, RawFile};
use crate::connection::{ClientFactory, InferenceClient, Timer};
use crate::error::ClientError;

#[derive(Default)]
pub struct InstantTimer {
    sleeps: Cell<u32>,
    slept: Cell<Duration>,
}

impl InstantTimer {
    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }

    pub fn slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Timer for InstantTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.sleeps.set(self.sleeps.get() + 1);
        self.slept.set(self.slept.get() + duration);
        futures::future::ready(()).boxed_local()
    }
}

#[derive(Debug)]
enum Scripted {
    Ready(Result<Value, ClientError>),
    Held(oneshot::Receiver<Result<Value, ClientError>>),
}

#[derive(Debug, Default)]
pub struct ClientProbe {
    predict_calls: Cell<u32>,
    routes: RefCell<Vec<String>>,
    payload_sizes: RefCell<Vec<usize>>,
    script: RefCell<VecDeque<Scripted>>,
}

impl ClientProbe {
    pub fn respond(&self, result: Result<Value, ClientError>) {
        self.script.borrow_mut().push_back(Scripted::Ready(result));
    }

    /// Queues a reply that stays pending until the returned sender fires.
    pub fn hold_next(&self) -> oneshot::Sender<Result<Value, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back(Scripted::Held(rx));
        tx
    }

    pub fn predict_calls(&self) -> u32 {
        self.predict_calls.get()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.borrow().clone()
    }

    pub fn payload_sizes(&self) -> Vec<usize> {
        self.payload_sizes.borrow().clone()
    }
}

#[derive(Debug)]
pub struct MockClient {
    probe: Rc<ClientProbe>,
}

impl InferenceClient for MockClient {
    fn predict(&self, route: &str, image: &ImageAsset) -> LocalBoxFuture<'static, Result<Value, ClientError>> {
        self.probe.predict_calls.set(self.probe.predict_calls.get() + 1);
        self.probe.routes.borrow_mut().push(route.to_string());
        self.probe.payload_sizes.borrow_mut().push(image.len());

        match self.probe.script.borrow_mut().pop_front() {
            Some(Scripted::Ready(result)) => futures::future::ready(result).boxed_local(),
            Some(Scripted::Held(rx)) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(ClientError::RemoteError("reply dropped".into())))
            }
            .boxed_local(),
            None => futures::future::ready(Err(ClientError::RemoteError(
                "no scripted reply".into(),
            )))
            .boxed_local(),
        }
    }
}

#[derive(Default)]
pub struct FactoryProbe {
    availability_checks: Cell<u32>,
    connect_calls: Cell<u32>,
    last_endpoint: RefCell<Option<String>>,
    reject_next: RefCell<Option<String>>,
    client: Rc<ClientProbe>,
}

impl FactoryProbe {
    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.get()
    }

    pub fn availability_checks(&self) -> u32 {
        self.availability_checks.get()
    }

    pub fn last_endpoint(&self) -> Option<String> {
        self.last_endpoint.borrow().clone()
    }

    pub fn reject_next_connect(&self, message: &str) {
        *self.reject_next.borrow_mut() = Some(message.to_string());
    }

    pub fn client(&self) -> Rc<ClientProbe> {
        Rc::clone(&self.client)
    }
}

pub struct MockFactory {
    probe: Rc<FactoryProbe>,
    ready_after: Option<u32>,
}

impl MockFactory {
    pub fn available() -> Self {
        Self::available_after(0)
    }

    /// Reports ready once `checks` availability probes have failed.
    pub fn available_after(checks: u32) -> Self {
        Self {
            probe: Rc::default(),
            ready_after: Some(checks),
        }
    }

    pub fn never_available() -> Self {
        Self {
            probe: Rc::default(),
            ready_after: None,
        }
    }

    pub fn probe(&self) -> Rc<FactoryProbe> {
        Rc::clone(&self.probe)
    }
}

impl ClientFactory for MockFactory {
    type Client = MockClient;

    fn is_available(&self) -> bool {
        let checks = self.probe.availability_checks.get() + 1;
        self.probe.availability_checks.set(checks);
        self.ready_after.is_some_and(|after| checks > after)
    }

    fn connect(&self, endpoint: &str) -> LocalBoxFuture<'static, Result<MockClient, ClientError>> {
        self.probe.connect_calls.set(self.probe.connect_calls.get() + 1);
        *self.probe.last_endpoint.borrow_mut() = Some(endpoint.to_string());

        let result = match self.probe.reject_next.borrow_mut().take() {
            Some(message) => Err(ClientError::ConnectionUnavailable(message)),
            None => Ok(MockClient {
                probe: self.probe.client(),
            }),
        };
        futures::future::ready(result).boxed_local()
    }
}

pub fn png(len: usize) -> RawFile {
    RawFile {
        name: "scan.png".into(),
        mime_type: "image/png".into(),
        bytes: vec![7u8; len],
    }
}
