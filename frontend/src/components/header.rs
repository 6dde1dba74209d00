use super::super::{Model, Msg, Page};
use yew::html::Scope;
use yew::prelude::*;

/// Renders the application header with the tool tabs
pub fn render_header(page: Page, link: &Scope<Model>) -> Html {
    let tab = |target: Page, icon: &'static str, label: &'static str| {
        html! {
            <button
                class={classes!("tab", (page == target).then_some("active"))}
                onclick={link.callback(move |_| Msg::SwitchPage(target))}
                disabled={page == target}
            >
                <i class={icon}></i>{ format!(" {}", label) }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-lungs"></i> {" Lung CT Analysis"}</h1>
            <p class="subtitle">{"Tumor classification and image augmentation for lung CT scans"}</p>
            <nav class="tabs">
                { tab(Page::Classification, "fa-solid fa-magnifying-glass", "Classification") }
                { tab(Page::Augmentation, "fa-solid fa-clone", "Augmentation") }
                <button
                    class="tab info-toggle"
                    title="About the model"
                    onclick={link.callback(|_| Msg::ToggleInfo)}
                >
                    <i class="fa-solid fa-circle-info"></i>
                </button>
            </nav>
        </header>
    }
}
