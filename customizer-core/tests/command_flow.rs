//! Command Runner Integration Tests
//!
//! Exercises the command surface end to end with an in-memory store and a
//! recording notifier.

mod common;

use std::sync::Arc;

use common::{complete_form, image, session, RecordingGenerator};
use customizer_core::{
    Command, CommandOutcome, CommandRunner, CustomerField, CustomizerError, MemoryDesignStore,
    NotificationVariant, RecordingNotifier, Side,
};

fn runner() -> (CommandRunner, Arc<RecordingNotifier>, MemoryDesignStore) {
    let (session, _) = session();
    let notifier = Arc::new(RecordingNotifier::new());
    let store = MemoryDesignStore::new();
    let runner = CommandRunner::new(
        session,
        Arc::new(RecordingGenerator::default()),
        Arc::new(store.clone()),
        Arc::clone(&notifier) as Arc<dyn customizer_core::Notifier>,
    );
    (runner, notifier, store)
}

async fn started() -> (CommandRunner, Arc<RecordingNotifier>, MemoryDesignStore) {
    let (mut runner, notifier, store) = runner();
    for (side, source) in [(Side::Front, image(800, 600)), (Side::Back, image(600, 800))] {
        runner
            .execute(Command::UploadImage { side, source })
            .await
            .expect("upload");
    }
    runner
        .execute(Command::StartDesigning)
        .await
        .expect("start designing");
    (runner, notifier, store)
}

#[tokio::test]
async fn test_start_designing_requires_both_images() {
    let (mut runner, _, _) = runner();
    runner
        .execute(Command::UploadImage {
            side: Side::Front,
            source: image(10, 10),
        })
        .await
        .expect("upload");

    let err = runner.execute(Command::StartDesigning).await.unwrap_err();
    assert!(matches!(err, CustomizerError::InvalidState(_)));
    assert!(!runner.session().is_ready());
}

#[tokio::test]
async fn test_blank_text_is_unchanged() {
    let (mut runner, _, _) = started().await;
    let outcome = runner
        .execute(Command::AddText {
            content: "  ".into(),
            font: None,
        })
        .await
        .expect("add text");
    assert_eq!(outcome, CommandOutcome::Unchanged);
}

#[tokio::test]
async fn test_export_refusal_notifies_with_title() {
    let (mut runner, notifier, _) = started().await;
    complete_form(runner.session_mut());
    runner
        .execute(Command::SetVerified(false))
        .await
        .expect("unverify");

    let result = runner.execute(Command::Export).await;
    assert!(result.is_err());
    let last = notifier.last().expect("notification");
    assert_eq!(last.title, "Verification Required");
    assert_eq!(last.variant, NotificationVariant::Destructive);
}

#[tokio::test]
async fn test_export_success_notifies() {
    let (mut runner, notifier, _) = started().await;
    complete_form(runner.session_mut());
    runner
        .execute(Command::SetProductName("Team Shirt".into()))
        .await
        .expect("name");

    let outcome = runner.execute(Command::Export).await.expect("export");
    let CommandOutcome::Exported(document) = outcome else {
        panic!("expected a document, got {outcome:?}");
    };
    assert_eq!(document.file_name, "Team-Shirt-job-sheet.pdf");
    assert_eq!(notifier.last().map(|n| n.title), Some("PDF Exported".into()));
}

#[tokio::test]
async fn test_save_then_gallery() {
    let (mut runner, notifier, store) = started().await;
    runner
        .execute(Command::SetCustomer {
            field: CustomerField::CustomerName,
            value: "Ada".into(),
        })
        .await
        .expect("customer");

    let saved = runner.execute(Command::Save).await.expect("save");
    assert!(matches!(saved, CommandOutcome::Saved(_)));
    assert_eq!(notifier.last().map(|n| n.title), Some("Design Saved!".into()));
    assert_eq!(store.len(), 1);

    let CommandOutcome::Gallery(records) = runner.execute(Command::Gallery).await.expect("gallery")
    else {
        panic!("expected gallery");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].design.product_name, "My Custom Product");
}

#[tokio::test]
async fn test_start_over_returns_to_upload() {
    let (mut runner, _, _) = started().await;
    runner.execute(Command::StartOver).await.expect("start over");
    assert!(!runner.session().is_ready());
    assert!(!runner.session().state().has_product());
    runner
        .execute(Command::ClearImage(Side::Front))
        .await
        .expect("clear before enter");
}
