mod api;
mod components;
mod pages;

use components::header::render_header;
use components::info_modal::render_info_modal;
use components::notices::render_notices;
use gloo_timers::callback::Timeout;
use pages::augmentation::AugmentationPage;
use pages::classification::ClassificationPage;
use shared::{ClientConfig, Notice, NoticeBoard};
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Page {
    Classification,
    Augmentation,
}

pub enum Msg {
    SwitchPage(Page),
    Notify(Notice),
    Dismiss(Uuid),
    ToggleInfo,
}

pub struct Model {
    config: Rc<ClientConfig>,
    page: Page,
    notices: NoticeBoard,
    notice_timers: HashMap<Uuid, Timeout>,
    show_info: bool,
}

fn load_config() -> ClientConfig {
    match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Falling back to default client config: {}", e);
            ClientConfig::default()
        }
    }
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let config = load_config();
        log::info!(
            "Client config v{} loaded, classification via {}, augmentation via {}",
            config.version,
            config.classification.space,
            config.augmentation.space
        );

        Self {
            notices: NoticeBoard::new(config.ui.notice_capacity),
            config: Rc::new(config),
            page: Page::Classification,
            notice_timers: HashMap::new(),
            show_info: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SwitchPage(page) => {
                if self.page == page {
                    return false;
                }
                log::debug!("Switching to {:?}", page);
                self.page = page;
                true
            }
            Msg::Notify(notice) => {
                let id = notice.id;
                for dropped in self.notices.push(notice) {
                    self.notice_timers.remove(&dropped);
                }
                let link = ctx.link().clone();
                let timer = Timeout::new(self.config.ui.notice_timeout_ms, move || {
                    link.send_message(Msg::Dismiss(id));
                });
                self.notice_timers.insert(id, timer);
                true
            }
            Msg::Dismiss(id) => {
                self.notice_timers.remove(&id);
                self.notices.dismiss(id)
            }
            Msg::ToggleInfo => {
                self.show_info = !self.show_info;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let on_notify = link.callback(Msg::Notify);

        html! {
            <div class="app-container">
                { render_header(self.page, link) }
                { render_notices(&self.notices, link) }
                <main class="main-content">
                    {
                        match self.page {
                            Page::Classification => html! {
                                <ClassificationPage config={Rc::clone(&self.config)} {on_notify} />
                            },
                            Page::Augmentation => html! {
                                <AugmentationPage config={Rc::clone(&self.config)} {on_notify} />
                            },
                        }
                    }
                </main>
                if self.show_info {
                    { render_info_modal(&self.config.model_info, link) }
                }
                <footer class="app-footer">
                    <p>{"Research tool. Not intended for clinical diagnosis."}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
