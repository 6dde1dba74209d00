use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use js_sys::Date;
use shared::RawFile;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

pub fn now_ms() -> u64 {
    Date::now() as u64
}

/// The first file of a picker, drop or paste.
pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    file_list.item(0).map(GlooFile::from)
}

pub async fn read_file(file: &GlooFile) -> Result<RawFile, String> {
    let bytes = gloo_file::futures::read_as_bytes(file)
        .await
        .map_err(|e| format!("Could not read {}: {}", file.name(), e))?;
    Ok(RawFile {
        name: file.name(),
        mime_type: file.raw_mime_type(),
        bytes,
    })
}

fn click_download_link(href: &str, filename: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document available")?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into()
        .map_err(|_| "created element is not an anchor".to_string())?;
    anchor.set_href(href);
    anchor.set_download(filename);
    anchor.set_target("_blank");
    anchor.click();
    Ok(())
}

/// Saves a remote image under `filename`.
///
/// The image is fetched into an object URL first so the browser keeps the
/// filename even for cross-origin hosts. If that fails the plain URL is used.
pub fn download_image(url: String, filename: String) {
    spawn_local(async move {
        let fetched = match Request::get(&url).send().await {
            Ok(response) if response.ok() => response.binary().await.ok(),
            Ok(response) => {
                log::warn!("Download of {} returned {}", url, response.status());
                None
            }
            Err(e) => {
                log::warn!("Download of {} failed: {}", url, e);
                None
            }
        };

        let result = match fetched {
            Some(bytes) => {
                let object_url = ObjectUrl::from(Blob::new_with_options(bytes.as_slice(), Some("image/png")));
                let result = click_download_link(&object_url, &filename);
                // Revoked on drop; give the browser time to start the save.
                Timeout::new(1_000, move || drop(object_url)).forget();
                result
            }
            None => click_download_link(&url, &filename),
        };

        match result {
            Ok(()) => log::info!("Saved {}", filename),
            Err(e) => log::error!("Could not save {}: {}", filename, e),
        }
    });
}
