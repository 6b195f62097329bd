use std::sync::{Arc, Mutex};
use std::time::Duration;

use storyboard_model::ErrorKind;
use storyboard_test_services::{
    PresetExtraction, PresetFailure, PresetImage, ScriptedImageService,
    ScriptedPromptService,
};
use tokio::time::timeout;

use super::state::{CHOOSE_AN_OPTION, NO_USEFUL_INFORMATION};
use crate::transcript::GREETING;
use crate::{
    Controller, ControllerBuilder, InvalidOperation, OptionPolicy,
    PendingOperation, ServiceKind, Settled, Source,
};

const KNIGHT_TEXT: &str = "A knight enters a burning castle.";
const KNIGHT_PROMPTS: [&str; 2] =
    ["knight in armor before flames", "collapsing castle tower"];

struct Fixture {
    prompts: ScriptedPromptService,
    images: ScriptedImageService,
}

impl Fixture {
    fn new() -> Self {
        Self {
            prompts: ScriptedPromptService::default(),
            images: ScriptedImageService::default(),
        }
    }

    fn with_delay(delay: Duration) -> Self {
        let mut fixture = Self::new();
        fixture.prompts.set_delay(delay);
        fixture.images.set_delay(delay);
        fixture
    }

    fn offer_knight_prompts(&self) {
        self.prompts.add_step(PresetExtraction::Prompts(
            KNIGHT_PROMPTS.map(String::from).to_vec(),
        ));
    }

    fn builder(&self) -> ControllerBuilder {
        ControllerBuilder::with_services(
            self.prompts.clone(),
            self.images.clone(),
        )
    }

    fn build(&self) -> Controller {
        self.builder().build()
    }
}

async fn wait(pending: PendingOperation) -> Settled {
    timeout(Duration::from_millis(500), pending.settled())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_fresh_conversation() {
    let controller = Fixture::new().build();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.latest_options(), None);
    assert_eq!(snapshot.entries[0].source(), Source::PromptBot);
    assert_eq!(snapshot.entries[0].content(), GREETING);
    assert!(!snapshot.busy);
    assert!(snapshot.draft.is_empty());
}

#[tokio::test]
async fn test_submit_text_offers_prompts() {
    let fixture = Fixture::with_delay(Duration::from_millis(100));
    fixture.offer_knight_prompts();
    let controller = fixture.build();

    let pending = controller.submit_text(KNIGHT_TEXT).await.unwrap();

    // The user entry lands before the request settles.
    let snapshot = controller.snapshot().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[1].source(), Source::User);
    assert_eq!(snapshot.entries[1].content(), KNIGHT_TEXT);

    let settled = wait(pending).await;
    assert_eq!(settled.error, None);
    assert_eq!(settled.response.content(), CHOOSE_AN_OPTION);

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.busy);
    assert_eq!(snapshot.entries.len(), 3);
    let offer = &snapshot.entries[2];
    assert_eq!(offer.source(), Source::PromptBot);
    assert_eq!(offer.options().unwrap(), KNIGHT_PROMPTS);
    assert_eq!(snapshot.latest_options().unwrap(), KNIGHT_PROMPTS);
    assert_eq!(fixture.prompts.received(), vec![KNIGHT_TEXT]);
}

#[tokio::test]
async fn test_parsed_completion_keeps_order() {
    let fixture = Fixture::new();
    fixture.prompts.add_step(PresetExtraction::Completion(
        concat!(
            r#""Midjourneyprompt1": "third","#,
            r#""Midjourneyprompt2": "first","#,
            r#""Midjourneyprompt3": "second""#,
        )
        .to_owned(),
    ));
    let controller = fixture.build();

    let settled = wait(controller.submit_text("text").await.unwrap()).await;
    assert_eq!(
        settled.response.options().unwrap(),
        ["third", "first", "second"]
    );
}

#[tokio::test]
async fn test_empty_extraction() {
    let fixture = Fixture::new();
    fixture
        .prompts
        .add_step(PresetExtraction::Completion("Sorry.".to_owned()));
    let controller = fixture.build();

    let settled = wait(controller.submit_text("nothing").await.unwrap()).await;
    assert_eq!(settled.error, None);

    let snapshot = controller.snapshot().await;
    let response = snapshot.entries.last().unwrap();
    assert_eq!(response.source(), Source::PromptBot);
    assert_eq!(response.content(), NO_USEFUL_INFORMATION);
    assert_eq!(response.options(), None);
}

#[tokio::test]
async fn test_extraction_failure() {
    let fixture = Fixture::new();
    fixture
        .prompts
        .add_step(PresetExtraction::Failure(PresetFailure::Network));
    let controller = fixture.build();

    let settled = wait(controller.submit_text("hello").await.unwrap()).await;
    let err = settled.error.unwrap();
    assert_eq!(err.service(), ServiceKind::Extraction);
    assert_eq!(err.kind(), ErrorKind::Network);

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.busy);
    // Exactly one user entry and one prompt bot entry after the greeting.
    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.entries[1].source(), Source::User);
    assert_eq!(snapshot.entries[2].source(), Source::PromptBot);
    assert_eq!(snapshot.entries[2].options(), None);
}

#[tokio::test]
async fn test_reject_while_busy() {
    let fixture = Fixture::with_delay(Duration::from_millis(200));
    fixture.offer_knight_prompts();
    let controller = fixture.build();

    let pending = controller.submit_text(KNIGHT_TEXT).await.unwrap();
    let before = controller.snapshot().await;
    assert!(before.busy);

    for _ in 0..2 {
        let err = controller.submit_text("again").await.unwrap_err();
        assert_eq!(err, InvalidOperation::Busy);
        let err = controller
            .submit_image_choice(KNIGHT_PROMPTS[0])
            .await
            .unwrap_err();
        assert_eq!(err, InvalidOperation::Busy);
    }
    assert_eq!(controller.snapshot().await, before);

    wait(pending).await;
    assert_eq!(fixture.prompts.received(), vec![KNIGHT_TEXT]);
    assert!(fixture.images.received().is_empty());
}

#[tokio::test]
async fn test_reject_empty_text() {
    let fixture = Fixture::new();
    let controller = fixture.build();

    for text in ["", "   ", "\n"] {
        let err = controller.submit_text(text).await.unwrap_err();
        assert_eq!(err, InvalidOperation::EmptyText);
    }

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.entries.len(), 1);
    assert!(!snapshot.busy);
    assert!(fixture.prompts.received().is_empty());
}

#[tokio::test]
async fn test_submit_image_choice() {
    let fixture = Fixture::with_delay(Duration::from_millis(100));
    fixture.offer_knight_prompts();
    fixture
        .images
        .add_step(PresetImage::Reference("https://img/abc.png".to_owned()));
    let controller = fixture.build();
    wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;

    let pending = controller
        .submit_image_choice(KNIGHT_PROMPTS[0])
        .await
        .unwrap();
    let snapshot = controller.snapshot().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.entries[3].source(), Source::User);
    assert_eq!(snapshot.entries[3].content(), KNIGHT_PROMPTS[0]);

    let settled = wait(pending).await;
    assert_eq!(settled.error, None);

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.busy);
    assert_eq!(snapshot.entries.len(), 5);
    let image = &snapshot.entries[4];
    assert_eq!(image.source(), Source::ImageBot);
    assert_eq!(image.content(), "");
    assert_eq!(image.image_ref().unwrap().as_str(), "https://img/abc.png");
    assert_eq!(fixture.images.received(), vec![KNIGHT_PROMPTS[0]]);
}

#[tokio::test]
async fn test_generation_failure() {
    let fixture = Fixture::new();
    fixture.offer_knight_prompts();
    fixture
        .images
        .add_step(PresetImage::Failure(PresetFailure::RateLimitExceeded));
    let controller = fixture.build();
    wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;

    let pending = controller
        .submit_image_choice(KNIGHT_PROMPTS[1])
        .await
        .unwrap();
    let settled = wait(pending).await;
    let err = settled.error.unwrap();
    assert_eq!(err.service(), ServiceKind::Generation);
    assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    assert_eq!(settled.response.source(), Source::ImageBot);
    assert_eq!(settled.response.image_ref(), None);
    assert!(!controller.snapshot().await.busy);
}

#[tokio::test]
async fn test_unknown_prompt() {
    let fixture = Fixture::new();
    fixture.offer_knight_prompts();
    let controller = fixture.build();

    let err = controller
        .submit_image_choice(KNIGHT_PROMPTS[0])
        .await
        .unwrap_err();
    assert_eq!(err, InvalidOperation::UnknownPrompt);

    wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;
    let err = controller
        .submit_image_choice("a dragon nobody offered")
        .await
        .unwrap_err();
    assert_eq!(err, InvalidOperation::UnknownPrompt);
    assert_eq!(controller.snapshot().await.entries.len(), 3);
}

#[tokio::test]
async fn test_latest_option_policy() {
    let fixture = Fixture::new();
    fixture.offer_knight_prompts();
    fixture
        .prompts
        .add_step(PresetExtraction::Prompts(vec!["quiet harbor".to_owned()]));
    fixture
        .images
        .add_step(PresetImage::Reference("https://img/harbor.png".to_owned()));
    let controller = fixture
        .builder()
        .with_option_policy(OptionPolicy::Latest)
        .build();
    wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;
    wait(controller.submit_text("A ship docks.").await.unwrap()).await;

    let err = controller
        .submit_image_choice(KNIGHT_PROMPTS[0])
        .await
        .unwrap_err();
    assert_eq!(err, InvalidOperation::UnknownPrompt);

    let pending = controller.submit_image_choice("quiet harbor").await;
    let settled = wait(pending.unwrap()).await;
    assert_eq!(
        settled.response.image_ref().unwrap().as_str(),
        "https://img/harbor.png"
    );
}

#[tokio::test]
async fn test_unchecked_option_policy() {
    let fixture = Fixture::new();
    fixture
        .images
        .add_step(PresetImage::Reference("https://img/free.png".to_owned()));
    let controller = fixture
        .builder()
        .with_option_policy(OptionPolicy::Unchecked)
        .build();

    let pending = controller.submit_image_choice("anything at all").await;
    let settled = wait(pending.unwrap()).await;
    assert_eq!(settled.response.source(), Source::ImageBot);

    let err = controller.submit_image_choice(" ").await.unwrap_err();
    assert_eq!(err, InvalidOperation::EmptyText);
}

#[tokio::test]
async fn test_crashed_request_clears_busy() {
    let fixture = Fixture::new();
    fixture.prompts.add_step(PresetExtraction::Crash);
    fixture.offer_knight_prompts();
    let controller = fixture.build();

    let settled = wait(controller.submit_text("boom").await.unwrap()).await;
    let err = settled.error.unwrap();
    assert_eq!(err.service(), ServiceKind::Extraction);
    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(settled.response.source(), Source::PromptBot);

    // The controller keeps working after the crash.
    let settled = wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;
    assert_eq!(settled.response.options().unwrap().len(), 2);
}

#[tokio::test]
async fn test_observers() {
    let fixture = Fixture::new();
    fixture.offer_knight_prompts();
    let appended = Arc::new(Mutex::new(vec![]));
    let busy_changes = Arc::new(Mutex::new(vec![]));
    let controller = fixture
        .builder()
        .on_entry_appended({
            let appended = Arc::clone(&appended);
            move |entry, idx| {
                appended.lock().unwrap().push((idx, entry.source()));
            }
        })
        .on_busy_changed({
            let busy_changes = Arc::clone(&busy_changes);
            move |busy| busy_changes.lock().unwrap().push(busy)
        })
        .build();

    wait(controller.submit_text(KNIGHT_TEXT).await.unwrap()).await;
    assert_eq!(
        *appended.lock().unwrap(),
        vec![
            (0, Source::PromptBot),
            (1, Source::User),
            (2, Source::PromptBot),
        ]
    );
    assert_eq!(*busy_changes.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn test_draft() {
    let fixture = Fixture::new();
    fixture.offer_knight_prompts();
    let controller = fixture.build();

    let err = controller.submit_draft().await.unwrap_err();
    assert_eq!(err, InvalidOperation::EmptyText);

    controller.update_draft(KNIGHT_TEXT);
    assert_eq!(controller.snapshot().await.draft, KNIGHT_TEXT);

    let pending = controller.submit_draft().await.unwrap();
    let snapshot = controller.snapshot().await;
    assert!(snapshot.draft.is_empty());
    assert_eq!(snapshot.entries[1].content(), KNIGHT_TEXT);
    wait(pending).await;

    // Submitting text directly also clears the draft.
    fixture
        .prompts
        .add_step(PresetExtraction::Prompts(vec![]));
    controller.update_draft("half typed");
    wait(controller.submit_text("other text").await.unwrap()).await;
    assert!(controller.snapshot().await.draft.is_empty());
}

#[tokio::test]
async fn test_snapshot_serializes_for_display() {
    let controller = Fixture::new().build();
    let value = serde_json::to_value(controller.snapshot().await).unwrap();
    assert_eq!(value["busy"], false);
    assert_eq!(value["entries"][0]["source"], "promptBot");
    assert_eq!(value["entries"][0]["content"], GREETING);
}
