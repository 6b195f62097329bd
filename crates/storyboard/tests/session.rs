use std::sync::{Arc, Mutex};
use std::time::Duration;

use storyboard::SessionBuilder;
use storyboard::core::{InvalidOperation, PendingOperation, Settled, Source};
use storyboard_test_services::{
    PresetExtraction, PresetImage, ScriptedImageService, ScriptedPromptService,
};
use tokio::time::timeout;

async fn wait(pending: PendingOperation) -> Settled {
    timeout(Duration::from_millis(500), pending.settled())
        .await
        .unwrap()
}

fn offer(prompts: &ScriptedPromptService, options: &[&str]) {
    prompts.add_step(PresetExtraction::Prompts(
        options.iter().map(|o| o.to_string()).collect(),
    ));
}

#[tokio::test]
async fn test_message_then_option() {
    let prompts = ScriptedPromptService::default();
    let images = ScriptedImageService::default();
    offer(&prompts, &["a knight", "a burning castle"]);
    images.add_step(PresetImage::Reference("https://img/abc.png".to_owned()));

    let seen = Arc::new(Mutex::new(vec![]));
    let session = SessionBuilder::with_services(prompts.clone(), images.clone())
        .on_entry({
            let seen = Arc::clone(&seen);
            move |entry, index| {
                seen.lock().unwrap().push((index, entry.source()));
            }
        })
        .build();

    let pending = session
        .send_message("A knight enters a burning castle.")
        .await
        .unwrap();
    wait(pending).await;
    // The draft is consumed by the submission.
    assert!(session.snapshot().await.draft.is_empty());

    let settled = wait(session.choose_option(2).await.unwrap()).await;
    assert_eq!(
        settled.response.image_ref().map(|r| r.as_str()),
        Some("https://img/abc.png")
    );
    assert_eq!(images.received(), vec!["a burning castle"]);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            (0, Source::PromptBot),
            (1, Source::User),
            (2, Source::PromptBot),
            (3, Source::User),
            (4, Source::ImageBot),
        ]
    );
}

#[tokio::test]
async fn test_choose_missing_option() {
    let prompts = ScriptedPromptService::default();
    let images = ScriptedImageService::default();
    let session =
        SessionBuilder::with_services(prompts.clone(), images.clone()).build();

    // Nothing has been offered yet.
    let err = session.choose_option(1).await.unwrap_err();
    assert_eq!(err, InvalidOperation::UnknownPrompt);

    offer(&prompts, &["only one"]);
    wait(session.send_message("text").await.unwrap()).await;

    for number in [0, 2] {
        let err = session.choose_option(number).await.unwrap_err();
        assert_eq!(err, InvalidOperation::UnknownPrompt);
    }
    let err = session.draw("never offered").await.unwrap_err();
    assert_eq!(err, InvalidOperation::UnknownPrompt);
    assert!(images.received().is_empty());
    assert_eq!(session.snapshot().await.entries.len(), 3);
}

#[tokio::test]
async fn test_busy_session_reports_changes() {
    let mut prompts = ScriptedPromptService::default();
    prompts.set_delay(Duration::from_millis(100));
    let images = ScriptedImageService::default();
    offer(&prompts, &["a lighthouse"]);

    let changes = Arc::new(Mutex::new(vec![]));
    let session = SessionBuilder::with_services(prompts, images)
        .on_busy_changed({
            let changes = Arc::clone(&changes);
            move |busy| changes.lock().unwrap().push(busy)
        })
        .build();

    let pending = session.send_message("A lighthouse at dusk.").await.unwrap();
    let err = session.send_message("again").await.unwrap_err();
    assert_eq!(err, InvalidOperation::Busy);
    // The rejected message stays in the input box.
    assert_eq!(session.snapshot().await.draft, "again");

    wait(pending).await;
    assert_eq!(*changes.lock().unwrap(), vec![true, false]);
}
