use futures::future::{FutureExt, LocalBoxFuture};
use gloo_file::Blob;
use js_sys::{Function, Object, Promise, Reflect, JSON};
use serde_json::Value;
use shared::{ClientError, ClientFactory, ImageAsset, InferenceClient, Timer};
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Best-effort text for a rejected JS promise.
fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

/// The client constructor that `index.html` publishes on `window`.
pub struct GradioFactory {
    global: String,
}

impl GradioFactory {
    pub fn new(global: impl Into<String>) -> Self {
        Self { global: global.into() }
    }

    fn constructor(&self) -> Option<JsValue> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(&self.global)).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }
}

impl ClientFactory for GradioFactory {
    type Client = GradioClient;

    fn is_available(&self) -> bool {
        self.constructor().is_some()
    }

    fn connect(&self, endpoint: &str) -> LocalBoxFuture<'static, Result<GradioClient, ClientError>> {
        let constructor = self.constructor();
        let global = self.global.clone();
        let endpoint = endpoint.to_string();

        async move {
            let unavailable = |reason: String| ClientError::ConnectionUnavailable(reason);
            let constructor =
                constructor.ok_or_else(|| unavailable(format!("window.{} is not loaded", global)))?;
            let connect = method(&constructor, "connect")
                .ok_or_else(|| unavailable(format!("window.{} has no connect()", global)))?;

            let promise: Promise = connect
                .call1(&constructor, &JsValue::from_str(&endpoint))
                .and_then(|p| p.dyn_into::<Promise>())
                .map_err(|e| unavailable(describe(&e)))?;
            let handle = JsFuture::from(promise)
                .await
                .map_err(|e| unavailable(describe(&e)))?;

            Ok(GradioClient { handle })
        }
        .boxed_local()
    }
}

pub struct GradioClient {
    handle: JsValue,
}

impl GradioClient {
    fn payload(image: &ImageAsset) -> Result<Object, ClientError> {
        let blob = Blob::new_with_options(image.bytes(), Some(image.mime_type()));
        let raw: &web_sys::Blob = blob.as_ref();
        let payload = Object::new();
        Reflect::set(&payload, &JsValue::from_str("image"), raw)
            .map_err(|e| ClientError::RemoteError(describe(&e)))?;
        Ok(payload)
    }
}

impl InferenceClient for GradioClient {
    fn predict(&self, route: &str, image: &ImageAsset) -> LocalBoxFuture<'static, Result<Value, ClientError>> {
        let handle = self.handle.clone();
        let route = route.to_string();
        let payload = Self::payload(image);

        async move {
            let payload = payload?;
            let predict = method(&handle, "predict")
                .ok_or_else(|| ClientError::ConnectionUnavailable("client has no predict()".into()))?;

            let promise: Promise = predict
                .call2(&handle, &JsValue::from_str(&route), &payload)
                .and_then(|p| p.dyn_into::<Promise>())
                .map_err(|e| ClientError::RemoteError(describe(&e)))?;
            let result = JsFuture::from(promise)
                .await
                .map_err(|e| ClientError::RemoteError(describe(&e)))?;

            let data = Reflect::get(&result, &JsValue::from_str("data")).unwrap_or(JsValue::UNDEFINED);
            if data.is_undefined() || data.is_null() {
                return Ok(Value::Null);
            }
            let text = JSON::stringify(&data)
                .ok()
                .and_then(|s| s.as_string())
                .ok_or_else(|| ClientError::MalformedResponse("response data is not JSON".into()))?;
            serde_json::from_str(&text).map_err(|e| ClientError::MalformedResponse(e.to_string()))
        }
        .boxed_local()
    }
}

pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}
