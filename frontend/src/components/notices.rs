use super::super::{Model, Msg};
use shared::{NoticeBoard, NoticeKind};
use yew::html::Scope;
use yew::prelude::*;

pub fn render_notices(board: &NoticeBoard, link: &Scope<Model>) -> Html {
    if board.is_empty() {
        return html! {};
    }

    html! {
        <div class="notice-stack" role="status">
            { for board.notices().iter().map(|notice| {
                let id = notice.id;
                let (class, icon) = match notice.kind {
                    NoticeKind::Error => ("error-message", "fa-solid fa-circle-exclamation"),
                    NoticeKind::Info => ("info-message", "fa-solid fa-circle-info"),
                };
                html! {
                    <div class={class} key={id.to_string()}>
                        <i class={icon}></i>
                        <p>{ &notice.message }</p>
                        <button
                            class="dismiss-btn"
                            title="Dismiss"
                            onclick={link.callback(move |_| Msg::Dismiss(id))}
                        >
                            <i class="fa-solid fa-times"></i>
                        </button>
                    </div>
                }
            }) }
        </div>
    }
}
