use derive_more::Display;

use crate::asset::{ImageAsset, RawFile};
use crate::error::ClientError;

/// Which panel a page shows. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UiState {
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "image-selected")]
    ImageSelected,
    #[display(fmt = "loading")]
    Loading,
    #[display(fmt = "success")]
    Success,
    #[display(fmt = "error")]
    Error,
}

/// Everything one page instance knows about its upload and its last result.
///
/// Owned by the page component. The network half of a submission runs
/// outside of it: [`PageSession::begin_submit`] hands out the asset and
/// [`PageSession::finish`] takes the outcome back.
#[derive(Debug)]
pub struct PageSession<R> {
    max_upload_bytes: Option<usize>,
    asset: Option<ImageAsset>,
    state: UiState,
    in_flight: bool,
    result: Option<R>,
}

impl<R> PageSession<R> {
    pub fn new(max_upload_bytes: Option<usize>) -> Self {
        Self {
            max_upload_bytes,
            asset: None,
            state: UiState::Idle,
            in_flight: false,
            result: None,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn result_mut(&mut self) -> Option<&mut R> {
        self.result.as_mut()
    }

    pub fn max_upload_bytes(&self) -> Option<usize> {
        self.max_upload_bytes
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        self.asset.is_some() && !self.in_flight
    }

    /// Validates and stores a new upload, replacing the previous one.
    ///
    /// A rejected file leaves the session exactly as it was. `Ok(None)` means
    /// a request is running and the file was dropped.
    pub fn accept_file(&mut self, raw: RawFile) -> Result<Option<&ImageAsset>, ClientError> {
        if self.in_flight {
            log::debug!("Upload of {} ignored, a request is already in flight", raw.name);
            return Ok(None);
        }
        let asset = ImageAsset::from_raw(raw, self.max_upload_bytes)?;
        log::info!("Accepted {} ({} bytes, {})", asset.name(), asset.len(), asset.mime_type());

        self.result = None;
        self.state = UiState::ImageSelected;
        Ok(Some(self.asset.insert(asset)))
    }

    /// Drops the upload and any result. Ignored while a request is running.
    pub fn clear(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.asset = None;
        self.result = None;
        self.state = UiState::Idle;
        true
    }

    /// Starts a submission.
    ///
    /// `Ok(None)` means one is already running and nothing happened.
    pub fn begin_submit(&mut self) -> Result<Option<ImageAsset>, ClientError> {
        if self.in_flight {
            log::debug!("Submit ignored, a request is already in flight");
            return Ok(None);
        }
        let asset = self.asset.clone().ok_or(ClientError::NoImageSelected)?;
        self.in_flight = true;
        self.state = UiState::Loading;
        Ok(Some(asset))
    }

    /// Records the outcome of the running submission.
    ///
    /// Failures keep the previous result and are handed back for reporting.
    pub fn finish(&mut self, outcome: Result<R, ClientError>) -> Result<(), ClientError> {
        self.in_flight = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.state = UiState::Success;
                Ok(())
            }
            Err(e) => {
                log::warn!("Request failed: {}", e);
                self.state = UiState::Error;
                Err(e)
            }
        }
    }
}
