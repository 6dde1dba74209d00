use super::utils::{debounce, first_file};
use gloo_file::File as GlooFile;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UploadAreaProps {
    pub input_id: AttrValue,
    pub on_file: Callback<GlooFile>,
    pub disabled: bool,
    #[prop_or_default]
    pub max_upload_bytes: Option<usize>,
}

#[function_component(UploadArea)]
pub fn upload_area(props: &UploadAreaProps) -> Html {
    let is_dragging = use_state(|| false);

    let handle_change = {
        let on_file = props.on_file.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Some(file) = input.files().as_ref().and_then(first_file) {
                on_file.emit(file);
            }
            input.set_value("");
        })
    };

    let handle_drag_over = {
        let is_dragging = is_dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            is_dragging.set(true);
        })
    };

    let handle_drag_leave = {
        let is_dragging = is_dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            is_dragging.set(false);
        })
    };

    let handle_drop = {
        let is_dragging = is_dragging.clone();
        let on_file = props.on_file.clone();
        let disabled = props.disabled;
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            is_dragging.set(false);
            if disabled {
                return;
            }
            if let Some(file) = e
                .data_transfer()
                .and_then(|dt| dt.files())
                .as_ref()
                .and_then(first_file)
            {
                on_file.emit(file);
            }
        })
    };

    let trigger_file_input = {
        let input_id = props.input_id.clone();
        move || {
            if let Some(input) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&input_id))
            {
                if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                    html_input.click();
                }
            }
        }
    };

    let size_hint = match props.max_upload_bytes {
        Some(limit) => format!("PNG or JPEG, up to {} MB", limit / (1024 * 1024)),
        None => "PNG or JPEG".to_string(),
    };

    html! {
        <>
            <input
                type="file"
                id={props.input_id.clone()}
                accept="image/png,image/jpeg,image/jpg"
                style="display: none;"
                onchange={handle_change}
                disabled={props.disabled}
            />

            <div
                class={classes!("upload-area", is_dragging.then_some("drag-over"), props.disabled.then_some("disabled"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, trigger_file_input)}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop a CT scan here, paste, or click"}</p>
                    <p class="file-types">{ size_hint }</p>
                </div>
            </div>
        </>
    }
}
