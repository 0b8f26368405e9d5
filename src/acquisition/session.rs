//! Headless picker session
//!
//! Drives permission check, acquisition, processing and presentation the way
//! the host UI would. A failure anywhere leaves the displayed image as it was.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, warn};

use crate::acquisition::permissions::{Permission, PermissionDecision, PermissionGate, PermissionRequirements};
use crate::acquisition::presenter::Presenter;
use crate::acquisition::source::{AcquisitionKind, AcquisitionOutcome, ImageSource};
use crate::image_pipeline::{BridgeError, ImageReference, StandardBridge};

#[derive(Debug)]
pub enum SelectionOutcome {
    /// Processed and handed to the presenter
    Displayed(ImageReference),
    Cancelled,
    PermissionDenied(Vec<Permission>),
    AcquisitionFailed { code: String, message: String },
    ProcessingFailed(BridgeError),
}

pub struct PickerSession<S: ImageSource, G: PermissionGate, P: Presenter> {
    source: S,
    gate: G,
    presenter: P,
    bridge: Arc<StandardBridge>,
    requirements: PermissionRequirements,
    decision: Mutex<Option<PermissionDecision>>,
    current: Mutex<Option<ImageReference>>,
}

impl<S: ImageSource, G: PermissionGate, P: Presenter> PickerSession<S, G, P> {
    pub fn new(
        source: S,
        gate: G,
        presenter: P,
        bridge: Arc<StandardBridge>,
        requirements: PermissionRequirements,
    ) -> Self {
        Self {
            source,
            gate,
            presenter,
            bridge,
            requirements,
            decision: Mutex::new(None),
            current: Mutex::new(None),
        }
    }

    /// Requests the required permissions and remembers the verdict.
    pub fn prepare(&self) -> PermissionDecision {
        let requested = self.requirements.to_request();
        let decision = if requested.is_empty() {
            PermissionDecision::Granted
        } else {
            match self.gate.request(&requested) {
                Ok(grants) => self.requirements.evaluate(&grants),
                Err(e) => {
                    warn!("Permission request failed: {}", e);
                    PermissionDecision::Denied { missing: requested }
                }
            }
        };

        match &decision {
            PermissionDecision::Granted => info!("All permissions granted"),
            PermissionDecision::Denied { missing } => info!(?missing, "Permissions denied"),
        }

        *self.decision.lock().unwrap_or_else(PoisonError::into_inner) = Some(decision.clone());
        decision
    }

    pub async fn select(&self, kind: AcquisitionKind) -> SelectionOutcome {
        if let Err(missing) = self.permitted() {
            warn!(?missing, "Skipping acquisition without permissions");
            return SelectionOutcome::PermissionDenied(missing);
        }

        let reference = match self.source.acquire(kind) {
            AcquisitionOutcome::Selected(reference) => reference,
            AcquisitionOutcome::Cancelled => {
                info!("User cancelled image picker");
                return SelectionOutcome::Cancelled;
            }
            AcquisitionOutcome::Failed { code, message } => {
                warn!(%code, "Image picker error: {}", message);
                return SelectionOutcome::AcquisitionFailed { code, message };
            }
        };

        info!(selected = %reference, "Selected image");

        match self.bridge.process(reference.to_locator()).await {
            Ok(processed) => {
                info!(processed = %processed, "Processed image");
                self.presenter.display(&processed);
                *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(processed.clone());
                SelectionOutcome::Displayed(processed)
            }
            Err(e) => {
                error!(code = e.code(), "Processing error: {}", e);
                SelectionOutcome::ProcessingFailed(e)
            }
        }
    }

    /// The reference currently on display.
    pub fn current(&self) -> Option<ImageReference> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn permitted(&self) -> Result<(), Vec<Permission>> {
        let decision = self.decision.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match decision {
            Some(PermissionDecision::Granted) => Ok(()),
            Some(PermissionDecision::Denied { missing }) => Err(missing),
            None => {
                let required = self.requirements.to_request();
                if required.is_empty() { Ok(()) } else { Err(required) }
            }
        }
    }
}
