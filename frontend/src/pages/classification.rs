use crate::api::{BrowserTimer, GradioFactory};
use crate::components::results::{render_classification, render_summary};
use crate::components::upload_section::UploadArea;
use crate::components::utils::{first_file, read_file};
use crate::pages::PageProps;
use futures::future::{abortable, AbortHandle};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::asset::validate;
use shared::{
    ClassificationResult, ClientError, ConnectionStatus, Notice, Orchestrator, PageSession, RawFile, UiState,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::ClipboardEvent;
use yew::prelude::*;

const INPUT_ID: &str = "classification-file-input";

/// What the last successful submission produced.
pub enum Analysis {
    Structured(ClassificationResult),
    Summary(String),
}

#[derive(Clone, Copy, PartialEq)]
pub enum AnalysisMode {
    Structured,
    Summary,
}

pub enum Msg {
    FileChosen(GlooFile),
    FileRead(Result<RawFile, String>),
    PreviewReady(String),
    Clear,
    Submit(AnalysisMode),
    Connected(Result<(), ClientError>),
    Finished(String, Result<Analysis, ClientError>),
    Pasted(ClipboardEvent),
}

pub struct ClassificationPage {
    session: PageSession<Analysis>,
    orchestrator: Orchestrator<GradioFactory>,
    preview: Option<String>,
    preview_task: Option<Timeout>,
    analyzed_name: Option<String>,
    warmup: Option<AbortHandle>,
    paste_listener: Option<EventListener>,
}

impl Component for ClassificationPage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = &ctx.props().config;
        let endpoint = &config.classification;
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
            analyzed_name: None,
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
                    self.analyzed_name = None;
                }
                true
            }
            Msg::Submit(mode) => self.handle_submit(ctx, mode),
            Msg::Connected(result) => {
                match result {
                    Ok(()) => log::info!("Classification service ready"),
                    Err(e) => log::warn!("Classification service not ready yet: {}", e),
                }
                self.warmup = None;
                true
            }
            Msg::Finished(name, outcome) => {
                let succeeded = outcome.is_ok();
                if let Err(e) = self.session.finish(outcome) {
                    ctx.props().on_notify.emit(Notice::from(&e));
                }
                if succeeded {
                    self.analyzed_name = Some(name);
                }
                true
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
            <div class="page classification-page" data-state={self.session.state().to_string()}>
                <section class="upload-section">
                    <h2>{"Upload CT Scan"}</h2>
                    { self.render_connection_status() }
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
                            onclick={link.callback(|_| Msg::Submit(AnalysisMode::Structured))}
                        >
                            <i class="fa-solid fa-magnifying-glass"></i>{" Analyze"}
                        </button>
                        <button
                            class="secondary-btn"
                            disabled={!self.session.can_submit() || self.orchestrator.endpoint().summary_route.is_none()}
                            onclick={link.callback(|_| Msg::Submit(AnalysisMode::Summary))}
                        >
                            <i class="fa-solid fa-file-lines"></i>{" Text Summary"}
                        </button>
                    </div>
                </section>
                <section class="results-section">
                    { self.render_results() }
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

impl ClassificationPage {
    fn handle_file_chosen(&mut self, ctx: &Context<Self>, file: GlooFile) -> bool {
        if self.session.is_busy() {
            log::debug!("Ignoring {} while a request is running", file.name());
            return false;
        }
        // Checked before reading so an oversized file never gets loaded.
        let declared = validate(&file.raw_mime_type(), file.size() as usize, self.session.max_upload_bytes());
        if let Err(e) = declared {
            log::warn!("Rejected {}: {}", file.name(), e);
            ctx.props().on_notify.emit(Notice::from(&e));
            return false;
        }
        ctx.link()
            .send_future(async move { Msg::FileRead(read_file(&file).await) });
        false
    }

    fn handle_file_read(&mut self, ctx: &Context<Self>, read: Result<RawFile, String>) -> bool {
        let raw = match read {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("{}", e);
                ctx.props().on_notify.emit(Notice::error(e));
                return false;
            }
        };

        match self.session.accept_file(raw) {
            Ok(None) => false,
            Ok(Some(asset)) => {
                let asset = asset.clone();
                let link = ctx.link().clone();
                self.preview = None;
                self.analyzed_name = None;
                self.preview_task = Some(Timeout::new(0, move || {
                    link.send_message(Msg::PreviewReady(asset.data_url()));
                }));
                true
            }
            Err(e) => {
                ctx.props().on_notify.emit(Notice::from(&e));
                false
            }
        }
    }

    fn handle_submit(&mut self, ctx: &Context<Self>, mode: AnalysisMode) -> bool {
        let asset = match self.session.begin_submit() {
            Ok(Some(asset)) => asset,
            Ok(None) => return false,
            Err(e) => {
                ctx.props().on_notify.emit(Notice::from(&e));
                return true;
            }
        };

        let orchestrator = self.orchestrator.clone();
        ctx.link().send_future(async move {
            let outcome = match mode {
                AnalysisMode::Structured => orchestrator.classify(&asset).await.map(Analysis::Structured),
                AnalysisMode::Summary => orchestrator.summarize(&asset).await.map(Analysis::Summary),
            };
            Msg::Finished(asset.name().to_string(), outcome)
        });
        true
    }

    fn render_connection_status(&self) -> Html {
        let status = self.orchestrator.connection_status();
        let class = match status {
            ConnectionStatus::Ready => "status-ready",
            ConnectionStatus::Failed => "status-failed",
            _ => "status-pending",
        };
        html! {
            <div class={classes!("connection-status", class)}>
                { format!("Service: {}", status) }
            </div>
        }
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

    fn render_results(&self) -> Html {
        match self.session.state() {
            UiState::Loading => html! {
                <div class="loading-container">
                    <div class="spinner"></div>
                    <p>{"Analyzing image..."}</p>
                </div>
            },
            UiState::Idle | UiState::ImageSelected if self.session.result().is_none() => html! {
                <div class="empty-state">
                    <i class="fa-solid fa-microscope"></i>
                    <p>{"Upload a CT scan and click Analyze to see the results"}</p>
                </div>
            },
            _ => {
                let name = self.analyzed_name.as_deref().unwrap_or("");
                match self.session.result() {
                    Some(Analysis::Structured(result)) => render_classification(result, name),
                    Some(Analysis::Summary(text)) => render_summary(text),
                    None => html! {
                        <div class="empty-state">
                            <i class="fa-solid fa-triangle-exclamation"></i>
                            <p>{"The analysis did not complete. Try again."}</p>
                        </div>
                    },
                }
            }
        }
    }
}
