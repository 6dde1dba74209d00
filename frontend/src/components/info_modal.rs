use super::super::{Model, Msg};
use shared::config::ModelInfo;
use shared::render::{class_style, format_class_name};
use yew::html::Scope;
use yew::prelude::*;

pub fn render_info_modal(info: &ModelInfo, link: &Scope<Model>) -> Html {
    let close = link.callback(|_| Msg::ToggleInfo);
    let input_size = info
        .input_size
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("x");

    html! {
        <div class="modal-backdrop" onclick={close.clone()}>
            <div class="modal" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <div class="modal-header">
                    <h2>{"Model Information"}</h2>
                    <button class="dismiss-btn" title="Close" onclick={close}>
                        <i class="fa-solid fa-times"></i>
                    </button>
                </div>
                <p><strong>{"Architecture: "}</strong>{ &info.architecture }</p>
                <p><strong>{"Input Size: "}</strong>{ format!("{} pixels", input_size) }</p>
                <p><strong>{ format!("Classes ({}):", info.classes.len()) }</strong></p>
                <ul class="class-list">
                    { for info.classes.iter().map(|class| {
                        let style = class_style(class);
                        html! {
                            <li key={class.clone()}>
                                <i class={style.icon} style={format!("color: {}", style.color)}></i>
                                { format!(" {}", format_class_name(class)) }
                            </li>
                        }
                    }) }
                </ul>
                <h3>{"Usage"}</h3>
                <ol>
                    <li>{"Upload a lung CT scan image (PNG or JPEG)."}</li>
                    <li>{"Click \"Analyze\" to get predictions, or \"Text Summary\" for the report."}</li>
                    <li>{"Review the confidence score and per-class probabilities."}</li>
                </ol>
                <h3>{"Response Format"}</h3>
                <pre class="response-format">
                    {"{ \"class\": \"<predicted class>\", \"confidence\": 0.0-1.0, \"probabilities\": { \"<class>\": 0.0-1.0 } }"}
                </pre>
                <p class="disclaimer">
                    {"Results come from a research model and are not a medical diagnosis."}
                </p>
            </div>
        </div>
    }
}
