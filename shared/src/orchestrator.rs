use std::rc::Rc;

use crate::asset::ImageAsset;
use crate::config::{EndpointConfig, ClientConfig};
use crate::connection::{ClientFactory, ConnectionStatus, Connector, InferenceClient, Timer};
use crate::error::ClientError;
use crate::response::{interpret_summary, AugmentationSet, ClassificationOutcome, ClassificationResult};

/// Runs the connect, predict and interpret steps for one page's endpoint.
///
/// Cloning is cheap and every clone shares the same connection handle.
pub struct Orchestrator<F: ClientFactory> {
    connector: Connector<F>,
    endpoint: Rc<EndpointConfig>,
}

impl<F: ClientFactory> Clone for Orchestrator<F> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            endpoint: Rc::clone(&self.endpoint),
        }
    }
}

impl<F: ClientFactory + 'static> Orchestrator<F> {
    pub fn new(factory: F, timer: Rc<dyn Timer>, config: &ClientConfig, endpoint: &EndpointConfig) -> Self {
        let connector = Connector::new(factory, timer, config.connection.policy(), endpoint.space.clone());
        Self {
            connector,
            endpoint: Rc::new(endpoint.clone()),
        }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connector.status()
    }

    /// Establishes the connection ahead of the first request.
    pub async fn warm_up(&self) -> Result<(), ClientError> {
        self.connector.ensure_connection().await.map(|_| ())
    }

    pub async fn classify(&self, image: &ImageAsset) -> Result<ClassificationResult, ClientError> {
        let data = self.call(&self.endpoint.route, image).await?;
        let outcome = ClassificationOutcome::from_payload(&data);
        if let ClassificationOutcome::Success(result) = &outcome {
            log::info!(
                "Classified {} as {} ({:.4})",
                image.name(),
                result.label,
                result.confidence
            );
        }
        outcome.into_result()
    }

    /// Asks the text route for its markdown report.
    pub async fn summarize(&self, image: &ImageAsset) -> Result<String, ClientError> {
        let route = self.endpoint.summary_route.as_deref().ok_or_else(|| {
            ClientError::ConnectionUnavailable("no summary route configured for this endpoint".into())
        })?;
        let data = self.call(route, image).await?;
        interpret_summary(&data)
    }

    pub async fn augment(&self, image: &ImageAsset) -> Result<AugmentationSet, ClientError> {
        let data = self.call(&self.endpoint.route, image).await?;
        let set = AugmentationSet::from_payload(&data)?;
        log::info!("Received {} augmented images for {}", set.valid_count(), image.name());
        Ok(set)
    }

    async fn call(&self, route: &str, image: &ImageAsset) -> Result<serde_json::Value, ClientError> {
        let client = self.connector.ensure_connection().await?;
        log::debug!("Calling {}{} with {} bytes", self.connector.endpoint(), route, image.len());
        client.predict(route, image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{PageSession, UiState};
    use crate::testing::{png, InstantTimer, MockFactory};
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use serde_json::json;
    use std::cell::RefCell;

    fn classifier(factory: MockFactory) -> Orchestrator<MockFactory> {
        let config = ClientConfig::default();
        Orchestrator::new(factory, Rc::new(InstantTimer::default()), &config, &config.classification)
    }

    fn augmenter(factory: MockFactory) -> Orchestrator<MockFactory> {
        let config = ClientConfig::default();
        Orchestrator::new(factory, Rc::new(InstantTimer::default()), &config, &config.augmentation)
    }

    fn selected(session: &mut PageSession<ClassificationResult>) -> ImageAsset {
        session.accept_file(png(32)).unwrap();
        session.begin_submit().unwrap().unwrap()
    }

    // Same order as the page: the session decides, then the orchestrator runs.
    fn submit(
        session: &mut PageSession<ClassificationResult>,
        orchestrator: &Orchestrator<MockFactory>,
    ) -> Result<(), ClientError> {
        match session.begin_submit()? {
            Some(asset) => session.finish(block_on(orchestrator.classify(&asset))),
            None => Ok(()),
        }
    }

    #[test]
    fn no_image_means_no_network_call() {
        let factory = MockFactory::available();
        let probe = factory.probe();
        let orchestrator = classifier(factory);
        let mut session: PageSession<ClassificationResult> = PageSession::new(None);

        assert_eq!(submit(&mut session, &orchestrator), Err(ClientError::NoImageSelected));
        assert_eq!(session.state(), UiState::Idle);
        assert_eq!(probe.availability_checks(), 0);
        assert_eq!(probe.connect_calls(), 0);
        assert_eq!(probe.client().predict_calls(), 0);
        assert_eq!(orchestrator.connection_status(), ConnectionStatus::Absent);

        session.accept_file(png(32)).unwrap();
        probe.client().respond(Ok(json!([{"class": "normal", "confidence": 0.9}])));
        assert_eq!(submit(&mut session, &orchestrator), Ok(()));
        assert_eq!(probe.connect_calls(), 1);
        assert_eq!(probe.client().predict_calls(), 1);
    }

    #[test]
    fn classifies_through_the_structured_route() {
        let factory = MockFactory::available();
        let probe = factory.probe();
        probe.client().respond(Ok(json!([{
            "class": "normal",
            "confidence": 0.97,
            "probabilities": {"normal": 0.97, "adenocarcinoma": 0.03}
        }])));
        let orchestrator = classifier(factory);
        let mut session = PageSession::new(None);
        let asset = selected(&mut session);

        let outcome = block_on(orchestrator.classify(&asset));
        session.finish(outcome).unwrap();

        assert_eq!(session.state(), UiState::Success);
        assert_eq!(session.result().map(|r| r.label.as_str()), Some("normal"));
        assert_eq!(probe.client().routes(), ["/predict_tumor_json"]);
        assert_eq!(probe.client().payload_sizes(), [32]);
        assert_eq!(probe.last_endpoint().as_deref(), Some("lungscan/lung-tumor-classification"));
    }

    #[test]
    fn remote_error_leaves_previous_results() {
        let factory = MockFactory::available();
        let probe = factory.probe();
        probe.client().respond(Ok(json!([{"class": "normal", "confidence": 0.9}])));
        probe.client().respond(Ok(json!([{"error": "model unavailable"}])));
        let orchestrator = classifier(factory);
        let mut session = PageSession::new(None);

        let asset = selected(&mut session);
        session.finish(block_on(orchestrator.classify(&asset))).unwrap();
        let before = session.result().cloned();

        let asset = session.begin_submit().unwrap().unwrap();
        let err = session.finish(block_on(orchestrator.classify(&asset))).unwrap_err();

        assert_eq!(err, ClientError::RemoteError("model unavailable".into()));
        assert_eq!(session.result().cloned(), before);
        assert_eq!(session.state(), UiState::Error);
        assert_eq!(probe.connect_calls(), 1);
    }

    #[test]
    fn unavailable_service_fails_without_predicting() {
        let factory = MockFactory::never_available();
        let probe = factory.probe();
        let orchestrator = classifier(factory);
        let mut session = PageSession::new(None);
        let asset = selected(&mut session);

        let err = session.finish(block_on(orchestrator.classify(&asset))).unwrap_err();
        assert!(matches!(err, ClientError::ConnectionUnavailable(_)));
        assert_eq!(probe.client().predict_calls(), 0);
        assert_eq!(orchestrator.connection_status(), ConnectionStatus::Failed);
        assert!(session.result().is_none());
    }

    #[test]
    fn rejected_predict_is_a_remote_error() {
        let factory = MockFactory::available();
        factory.probe().client().respond(Err(ClientError::RemoteError("queue full".into())));
        let orchestrator = classifier(factory);
        let asset = ImageAsset::from_raw(png(4), None).unwrap();

        assert_eq!(
            block_on(orchestrator.classify(&asset)),
            Err(ClientError::RemoteError("queue full".into()))
        );
    }

    #[test]
    fn resubmit_while_awaiting_response_is_a_no_op() {
        let factory = MockFactory::available();
        let client = factory.probe().client();
        let reply = client.hold_next();
        let orchestrator = classifier(factory);
        let session = Rc::new(RefCell::new(PageSession::new(None)));
        let asset = selected(&mut session.borrow_mut());

        let mut pool = LocalPool::new();
        {
            let orchestrator = orchestrator.clone();
            let session = Rc::clone(&session);
            pool.spawner()
                .spawn_local(async move {
                    let outcome = orchestrator.classify(&asset).await;
                    let _ = session.borrow_mut().finish(outcome);
                })
                .unwrap();
        }
        pool.run_until_stalled();

        assert_eq!(client.predict_calls(), 1);
        assert_eq!(session.borrow().state(), UiState::Loading);
        assert!(!session.borrow().can_submit());
        assert_eq!(session.borrow_mut().begin_submit(), Ok(None));
        assert_eq!(client.predict_calls(), 1);

        reply
            .send(Ok(json!([{"class": "adenocarcinoma", "confidence": 0.8}])))
            .unwrap();
        pool.run_until_stalled();

        assert_eq!(session.borrow().state(), UiState::Success);
        assert!(session.borrow().can_submit());
        assert_eq!(client.predict_calls(), 1);
    }

    #[test]
    fn summary_uses_the_text_route() {
        let factory = MockFactory::available();
        let client = factory.probe().client();
        client.respond(Ok(json!(["## Prediction Results\n\n**Predicted Class:** normal"])));
        let orchestrator = classifier(factory);
        let asset = ImageAsset::from_raw(png(4), None).unwrap();

        let text = block_on(orchestrator.summarize(&asset)).unwrap();
        assert!(text.starts_with("## Prediction Results"));
        assert_eq!(client.routes(), ["/predict_tumor"]);
    }

    #[test]
    fn augmentation_tolerates_short_payloads() {
        let factory = MockFactory::available();
        let probe = factory.probe();
        probe.client().respond(Ok(json!(["https://x/0.png", "https://x/1.png", "https://x/2.png", null, null])));
        let orchestrator = augmenter(factory);
        let asset = ImageAsset::from_raw(png(4), None).unwrap();

        let set = block_on(orchestrator.augment(&asset)).unwrap();
        assert_eq!(set.valid_count(), 3);
        assert_eq!(probe.client().routes(), ["/augment_image"]);
        assert_eq!(probe.last_endpoint().as_deref(), Some("lungscan/lung-ct-augmentation"));
    }

    #[test]
    fn augmentation_has_no_summary_route() {
        let orchestrator = augmenter(MockFactory::available());
        let asset = ImageAsset::from_raw(png(4), None).unwrap();
        assert!(block_on(orchestrator.summarize(&asset)).is_err());
    }
}
