use crate::api::{BrowserTimer, GradioFactory};
use crate::components::upload_section::UploadArea;
use crate::components::utils::{download_image, first_file, now_ms, read_file};
use crate::pages::PageProps;
use futures::future::{abortable, AbortHandle};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::asset::validate;
use shared::grid::{download_name, GridSlot};
use shared::{
    AugmentationGrid, AugmentationKind, AugmentationSet, ClientError, Notice, Orchestrator, PageSession, RawFile,
    SlotState, UiState,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::ClipboardEvent;
use yew::prelude::*;

const INPUT_ID: &str = "augmentation-file-input";

pub enum Msg {
    FileChosen(GlooFile),
    FileRead(Result<RawFile, String>),
    PreviewReady(String),
    Clear,
    Submit,
    Connected(Result<(), ClientError>),
    Finished(Result<AugmentationSet, ClientError>),
    SlotLoaded(AugmentationKind),
    SlotFailed(AugmentationKind),
    Download(AugmentationKind),
    DownloadAll,
    Pasted(ClipboardEvent),
}

pub struct AugmentationPage {
    session: PageSession<AugmentationGrid>,
    orchestrator: Orchestrator<GradioFactory>,
    preview: Option<String>,
    preview_task: Option<Timeout>,
    warmup: Option<AbortHandle>,
    paste_listener: Option<EventListener>,
}

impl Component for AugmentationPage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = &ctx.props().config;
        let endpoint = &config.augmentation;
        let orchestrator = Orchestrator::new(
            GradioFactory::new(config.client_global.clone()),
            Rc::new(BrowserTimer),
            config,
            endpoint,
        );

        let (warm_up, handle) = abortable({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.warm_up().await }
        });
        ctx.link().send_future_batch(async move {
            match warm_up.await {
                Ok(result) => vec![Msg::Connected(result)],
                Err(_) => Vec::new(),
            }
        });

        let link = ctx.link().clone();
        let paste_listener = web_sys::window().map(|window| {
            EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::Pasted(clipboard_event.clone()));
                }
            })
        });

        Self {
            session: PageSession::new(endpoint.max_upload_bytes),
            orchestrator,
            preview: None,
            preview_task: None,
            warmup: Some(handle),
            paste_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(file) => self.handle_file_chosen(ctx, file),
            Msg::FileRead(read) => self.handle_file_read(ctx, read),
            Msg::PreviewReady(url) => {
                self.preview_task = None;
                self.preview = Some(url);
                true
            }
            Msg::Clear => {
                if self.session.clear() {
                    self.preview = None;
                    self.preview_task = None;
                }
                true
            }
            Msg::Submit => self.handle_submit(ctx),
            Msg::Connected(result) => {
                if let Err(e) = result {
                    log::warn!("Augmentation service not ready yet: {}", e);
                }
                self.warmup = None;
                true
            }
            Msg::Finished(outcome) => {
                let outcome = outcome.map(|set| AugmentationGrid::from_set(&set));
                if let Err(e) = self.session.finish(outcome) {
                    ctx.props().on_notify.emit(Notice::from(&e));
                }
                true
            }
            Msg::SlotLoaded(kind) => self
                .session
                .result_mut()
                .is_some_and(|grid| grid.mark_loaded(kind)),
            Msg::SlotFailed(kind) => {
                log::warn!("Augmented image {} failed to load", kind.as_ref());
                self.session
                    .result_mut()
                    .is_some_and(|grid| grid.mark_failed(kind))
            }
            Msg::Download(kind) => {
                let url = self
                    .session
                    .result()
                    .and_then(|grid| grid.slot(kind))
                    .filter(|slot| slot.state == SlotState::Loaded)
                    .and_then(|slot| slot.reference.url());
                if let Some(url) = url {
                    download_image(url.to_string(), download_name(kind, now_ms()));
                }
                false
            }
            Msg::DownloadAll => {
                let Some(grid) = self.session.result() else {
                    return false;
                };
                let plan = grid.download_plan(ctx.props().config.download_stagger(), now_ms());
                log::info!("Downloading {} augmented images", plan.len());
                for item in plan {
                    Timeout::new(item.delay.as_millis() as u32, move || {
                        download_image(item.url, item.filename);
                    })
                    .forget();
                }
                false
            }
            Msg::Pasted(event) => {
                if let Some(file) = event
                    .clipboard_data()
                    .and_then(|data| data.files())
                    .as_ref()
                    .and_then(first_file)
                {
                    event.prevent_default();
                    return self.handle_file_chosen(ctx, file);
                }
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let busy = self.session.is_busy();

        html! {
            <div class="page augmentation-page" data-state={self.session.state().to_string()}>
                <section class="upload-section">
                    <h2>{"Upload CT Scan"}</h2>
                    <div class="connection-status">
                        { format!("Service: {}", self.orchestrator.connection_status()) }
                    </div>
                    <UploadArea
                        input_id={INPUT_ID}
                        on_file={link.callback(Msg::FileChosen)}
                        disabled={busy}
                        max_upload_bytes={self.session.max_upload_bytes()}
                    />
                    { self.render_preview(ctx) }
                    <div class="actions">
                        <button
                            class="primary-btn"
                            disabled={!self.session.can_submit()}
                            onclick={link.callback(|_| Msg::Submit)}
                        >
                            <i class="fa-solid fa-wand-magic-sparkles"></i>{" Generate Augmentations"}
                        </button>
                    </div>
                </section>
                <section class="results-section">
                    { self.render_results(ctx) }
                </section>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(handle) = self.warmup.take() {
            handle.abort();
        }
        self.paste_listener = None;
    }
}

impl AugmentationPage {
    fn handle_file_chosen(&mut self, ctx: &Context<Self>, file: GlooFile) -> bool {
        if self.session.is_busy() {
            return false;
        }
        if let Err(e) = validate(&file.raw_mime_type(), file.size() as usize, self.session.max_upload_bytes()) {
            log::warn!("Rejected {}: {}", file.name(), e);
            ctx.props().on_notify.emit(Notice::from(&e));
            return false;
        }
        ctx.link()
            .send_future(async move { Msg::FileRead(read_file(&file).await) });
        false
    }

    fn handle_file_read(&mut self, ctx: &Context<Self>, read: Result<RawFile, String>) -> bool {
        let accepted = read
            .map_err(Notice::error)
            .and_then(|raw| self.session.accept_file(raw).map_err(|e| Notice::from(&e)));

        match accepted {
            Ok(None) => false,
            Ok(Some(asset)) => {
                let asset = asset.clone();
                let link = ctx.link().clone();
                self.preview = None;
                self.preview_task = Some(Timeout::new(0, move || {
                    link.send_message(Msg::PreviewReady(asset.data_url()));
                }));
                true
            }
            Err(notice) => {
                ctx.props().on_notify.emit(notice);
                false
            }
        }
    }

    fn handle_submit(&mut self, ctx: &Context<Self>) -> bool {
        let asset = match self.session.begin_submit() {
            Ok(Some(asset)) => asset,
            Ok(None) => return false,
            Err(e) => {
                ctx.props().on_notify.emit(Notice::from(&e));
                return true;
            }
        };

        let orchestrator = self.orchestrator.clone();
        ctx.link()
            .send_future(async move { Msg::Finished(orchestrator.augment(&asset).await) });
        true
    }

    fn render_preview(&self, ctx: &Context<Self>) -> Html {
        let Some(asset) = self.session.asset() else {
            return html! {};
        };

        html! {
            <div class="preview-container">
                if let Some(url) = &self.preview {
                    <img src={url.clone()} alt={asset.name().to_string()} class="preview-image" />
                } else {
                    <div class="preview-loading"><div class="spinner"></div></div>
                }
                <div class="preview-footer">
                    <span class="file-name">{ asset.name() }</span>
                    <button
                        class="clear-btn"
                        title="Remove image"
                        disabled={self.session.is_busy()}
                        onclick={ctx.link().callback(|_| Msg::Clear)}
                    >
                        <i class="fa-solid fa-times"></i>
                    </button>
                </div>
            </div>
        }
    }

    fn render_results(&self, ctx: &Context<Self>) -> Html {
        if self.session.state() == UiState::Loading {
            return html! {
                <div class="loading-container">
                    <div class="spinner"></div>
                    <p>{"Generating augmented images..."}</p>
                </div>
            };
        }

        let Some(grid) = self.session.result() else {
            return html! {
                <div class="empty-state">
                    <i class="fa-solid fa-images"></i>
                    <p>{"Upload a CT scan to generate its augmented variants"}</p>
                </div>
            };
        };

        let loaded = grid.count(SlotState::Loaded);
        html! {
            <div class="augmentation-results">
                <div class="grid-header">
                    <h3>{ format!("Augmented Images ({} of {} loaded)", loaded, grid.slots().len()) }</h3>
                    <button
                        class="secondary-btn"
                        disabled={loaded == 0}
                        onclick={ctx.link().callback(|_| Msg::DownloadAll)}
                    >
                        <i class="fa-solid fa-download"></i>{" Download All"}
                    </button>
                </div>
                <div class="augmentation-grid">
                    { for grid.slots().iter().map(|slot| render_slot(slot, ctx)) }
                </div>
            </div>
        }
    }
}

fn render_slot(slot: &GridSlot, ctx: &Context<AugmentationPage>) -> Html {
    let kind = slot.kind;
    let link = ctx.link();

    let body = match (slot.reference.url(), slot.state) {
        (Some(url), SlotState::Loading | SlotState::Loaded) => html! {
            <>
                if slot.state == SlotState::Loading {
                    <div class="slot-loading"><div class="spinner"></div></div>
                }
                <img
                    src={url.to_string()}
                    alt={kind.title()}
                    class={classes!("augmented-image", (slot.state == SlotState::Loading).then_some("hidden"))}
                    onload={link.callback(move |_| Msg::SlotLoaded(kind))}
                    onerror={link.callback(move |_| Msg::SlotFailed(kind))}
                />
            </>
        },
        _ => html! {
            <div class="slot-error">
                <i class="fa-solid fa-triangle-exclamation"></i>
                <p>{"Image unavailable"}</p>
            </div>
        },
    };

    html! {
        <div class={classes!("augmentation-card", format!("slot-{}", kind.as_ref()))} key={kind.as_ref()}>
            <div class="card-title">{ kind.title() }</div>
            <div class="card-image">{ body }</div>
            <button
                class="download-btn"
                disabled={slot.state != SlotState::Loaded}
                onclick={link.callback(move |_| Msg::Download(kind))}
            >
                <i class="fa-solid fa-download"></i>{" Download"}
            </button>
        </div>
    }
}
