use storyboard_actor::{Actor, Message};
use tokio::sync::oneshot;

use super::{ControllerState, ConversationSnapshot, Settled};
use crate::error::{InvalidOperation, RequestFailed, ServiceKind};
use crate::service_client::{ExtractionResult, GenerationResult};
use crate::transcript::{GREETING, Transcript, TranscriptEntry};

pub const NO_USEFUL_INFORMATION: &str = "Could not get any useful information \
     for image generation from the given content.";
pub const CHOOSE_AN_OPTION: &str = "Please choose an option that matches \
     your imagination to generate a picture.";
pub const EXTRACTION_FAILED: &str =
    "Sorry, I could not read the content right now";
pub const GENERATION_FAILED: &str =
    "Sorry, I could not draw the picture right now";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    Busy(ServiceKind),
}

/// Everything one session displays: the transcript, whether a request
/// is outstanding, and the unsent input.
pub struct ConversationState {
    pub transcript: Transcript,
    pub stage: Stage,
    pub draft: String,
}

impl ConversationState {
    /// Seeds `transcript` with the greeting.
    pub fn new(mut transcript: Transcript) -> Self {
        transcript.append(TranscriptEntry::prompt_bot(GREETING));
        Self {
            transcript,
            stage: Stage::Idle,
            draft: String::new(),
        }
    }

    #[inline]
    pub fn busy(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            entries: self.transcript.all().to_vec(),
            busy: self.busy(),
            draft: self.draft.clone(),
        }
    }
}

type SubmitResult = Result<oneshot::Receiver<Settled>, InvalidOperation>;

impl ControllerState {
    pub fn submit_text(
        &mut self,
        text: String,
        handle: &Actor<Self>,
    ) -> SubmitResult {
        if self.conversation.busy() {
            debug!("rejected text while busy");
            return Err(InvalidOperation::Busy);
        }
        if text.trim().is_empty() {
            return Err(InvalidOperation::EmptyText);
        }

        self.conversation
            .transcript
            .append(TranscriptEntry::user(text.clone()));
        self.conversation.draft.clear();
        let settled_rx = self.enter_busy(ServiceKind::Extraction);

        let client = self.extraction_client.clone();
        let guard = SettleGuard::new(handle, ServiceKind::Extraction);
        tokio::spawn(async move {
            let result = client.extract_prompts(text).await;
            guard.settle(Settlement::Extraction(result));
        });
        Ok(settled_rx)
    }

    pub fn submit_image_choice(
        &mut self,
        prompt: String,
        handle: &Actor<Self>,
    ) -> SubmitResult {
        if self.conversation.busy() {
            debug!("rejected image choice while busy");
            return Err(InvalidOperation::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(InvalidOperation::EmptyText);
        }
        if !self
            .option_policy
            .permits(&self.conversation.transcript, &prompt)
        {
            debug!("rejected prompt that was not offered: {prompt:?}");
            return Err(InvalidOperation::UnknownPrompt);
        }

        self.conversation
            .transcript
            .append(TranscriptEntry::user(prompt.clone()));
        let settled_rx = self.enter_busy(ServiceKind::Generation);

        let client = self.generation_client.clone();
        let guard = SettleGuard::new(handle, ServiceKind::Generation);
        tokio::spawn(async move {
            let result = client.generate_image(prompt).await;
            guard.settle(Settlement::Generation(result));
        });
        Ok(settled_rx)
    }

    fn enter_busy(
        &mut self,
        service: ServiceKind,
    ) -> oneshot::Receiver<Settled> {
        let (settled_tx, settled_rx) = oneshot::channel();
        self.pending_reply = Some(settled_tx);
        self.conversation.stage = Stage::Busy(service);
        self.notify_busy_changed();
        settled_rx
    }

    fn settle(&mut self, settlement: Settlement) {
        if self.conversation.stage != Stage::Busy(settlement.service()) {
            error!(
                "got a settlement for {} while {:?}",
                settlement.service(),
                self.conversation.stage
            );
            return;
        }

        let (response, error) = match settlement {
            Settlement::Extraction(Ok(prompts)) if prompts.is_empty() => {
                (TranscriptEntry::prompt_bot(NO_USEFUL_INFORMATION), None)
            }
            Settlement::Extraction(Ok(prompts)) => (
                TranscriptEntry::prompt_offer(CHOOSE_AN_OPTION, prompts),
                None,
            ),
            Settlement::Extraction(Err(err)) => (
                TranscriptEntry::prompt_bot(format!(
                    "{EXTRACTION_FAILED}: {}",
                    err.message()
                )),
                Some(err),
            ),
            Settlement::Generation(Ok(image_ref)) => {
                (TranscriptEntry::image(image_ref), None)
            }
            Settlement::Generation(Err(err)) => (
                TranscriptEntry::image_bot(format!(
                    "{GENERATION_FAILED}: {}",
                    err.message()
                )),
                Some(err),
            ),
        };

        self.conversation.transcript.append(response.clone());
        self.conversation.stage = Stage::Idle;
        self.notify_busy_changed();

        if let Some(settled_tx) = self.pending_reply.take() {
            // The caller may not be waiting for the result.
            settled_tx.send(Settled { response, error }).ok();
        }
    }

    #[inline]
    fn notify_busy_changed(&self) {
        if let Some(on_busy_changed) = &self.on_busy_changed {
            on_busy_changed(self.conversation.busy());
        }
    }
}

#[derive(Debug)]
enum Settlement {
    Extraction(ExtractionResult),
    Generation(GenerationResult),
}

impl Settlement {
    #[inline]
    fn aborted(service: ServiceKind) -> Self {
        let err = RequestFailed::aborted(service);
        match service {
            ServiceKind::Extraction => Settlement::Extraction(Err(err)),
            ServiceKind::Generation => Settlement::Generation(Err(err)),
        }
    }

    #[inline]
    fn service(&self) -> ServiceKind {
        match self {
            Settlement::Extraction(_) => ServiceKind::Extraction,
            Settlement::Generation(_) => ServiceKind::Generation,
        }
    }
}

/// Reports the settlement of a request task back to the controller.
///
/// If the task ends without calling [`SettleGuard::settle`], e.g. the
/// request future panicked, the guard reports an aborted request when it
/// is dropped. Either way the controller hears back exactly once.
struct SettleGuard {
    handle: Option<Actor<ControllerState>>,
    service: ServiceKind,
}

impl SettleGuard {
    #[inline]
    fn new(handle: &Actor<ControllerState>, service: ServiceKind) -> Self {
        Self {
            handle: Some(handle.clone()),
            service,
        }
    }

    fn settle(mut self, settlement: Settlement) {
        if let Some(handle) = self.handle.take() {
            handle.send(RequestSettled(settlement)).ok();
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            warn!("{} request ended without settling", self.service);
            handle
                .send(RequestSettled(Settlement::aborted(self.service)))
                .ok();
        }
    }
}

#[derive(Debug)]
struct RequestSettled(Settlement);

impl Message<ControllerState> for RequestSettled {
    fn handle(
        self,
        state: &mut ControllerState,
        _handle: &Actor<ControllerState>,
    ) {
        state.settle(self.0);
    }
}

#[derive(Debug)]
pub struct UpdateDraft(pub String);

impl Message<ControllerState> for UpdateDraft {
    #[inline]
    fn handle(
        self,
        state: &mut ControllerState,
        _handle: &Actor<ControllerState>,
    ) {
        state.conversation.draft = self.0;
    }
}
