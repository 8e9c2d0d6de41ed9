//! Script Runner Integration Tests
//!
//! Runs design scripts from disk through the software renderer, the PDF
//! generator and a file-backed design store.

use std::path::Path;
use std::sync::Arc;

use customizer_cli::{run_script, Script};
use customizer_core::{
    CommandRunner, CustomizerConfig, DesignStore, FileDesignStore, Notifier, RecordingNotifier,
};
use customizer_renderer::{software_session, SignaturePad};

/// Write a small PNG to `dir/name`.
fn write_png(dir: &Path, name: &str) {
    let mut pad = SignaturePad::new();
    pad.add_stroke([(20.0, 20.0), (380.0, 130.0)]);
    std::fs::write(dir.join(name), pad.to_png().expect("png")).expect("write png");
}

fn runner(store: Arc<FileDesignStore>, notifier: Arc<RecordingNotifier>) -> CommandRunner {
    CommandRunner::new(
        software_session(CustomizerConfig::default(), false),
        Arc::new(customizer_renderer::PdfJobSheetGenerator::new()),
        store,
        notifier as Arc<dyn Notifier>,
    )
}

const ORDER: &str = "\
# product photos
upload-front-image front.png
upload-back-image back.png
start-designing
clear-front-image

add-text HELLO
set-property fill #EF4444
export
switch-side back
upload-artwork front.png

set-customer name Ada Lovelace
set-customer email ada@example.com
set-customer phone 555-0100
set-customer address 1 Loom Street
set-customer poc-name Grace Hopper
set-customer approved-by Ada Lovelace
set-verified yes
sign 10,100 120,40 260,110
export
save
";

// ==========================================================================
// Scripts
// ==========================================================================

#[tokio::test]
async fn test_script_exports_and_saves() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "front.png");
    write_png(dir.path(), "back.png");
    let script_path = dir.path().join("order.script");
    std::fs::write(&script_path, ORDER).expect("write script");

    let script = Script::from_file(&script_path).expect("parse");
    assert_eq!(script.len(), 19);

    let store = Arc::new(FileDesignStore::new(dir.path().join("designs.json")));
    let notifier = Arc::new(RecordingNotifier::new());
    let mut runner = runner(Arc::clone(&store), Arc::clone(&notifier));
    let out_dir = dir.path().join("out");

    let report = run_script(&mut runner, script, &out_dir)
        .await
        .expect("run");

    // Clearing an image after entering the editor and the early export fail.
    assert_eq!(report.failed, 2);
    assert_eq!(report.executed, 17);
    assert_eq!(report.saved, 1);
    assert_eq!(
        report.exported,
        vec![out_dir.join("My-Custom-Product-job-sheet.pdf")]
    );
    let pdf = std::fs::read(&report.exported[0]).expect("read pdf");
    assert!(pdf.starts_with(b"%PDF"));

    let titles: Vec<_> = notifier
        .notifications()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Required Fields Missing", "PDF Exported", "Design Saved!"]
    );

    let records = store.list_all().await.expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].design.canvas.sides.back.objects.len(), 1);
    assert_eq!(records[0].design.canvas.sides.front.objects.len(), 1);
    assert!(records[0].design.verified);
}

#[test]
fn test_parse_error_names_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script_path = dir.path().join("broken.script");
    std::fs::write(&script_path, "start-designing\n\nupload-artwork missing.png\n")
        .expect("write script");

    let err = Script::from_file(&script_path).unwrap_err();
    assert!(err.to_string().contains("line 3"), "{err}");
}

#[tokio::test]
async fn test_empty_script_does_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = Script::parse("# nothing to do\n\n", dir.path()).expect("parse");
    assert!(script.is_empty());

    let store = Arc::new(FileDesignStore::new(dir.path().join("designs.json")));
    let mut runner = runner(store, Arc::new(RecordingNotifier::new()));
    let report = run_script(&mut runner, script, dir.path())
        .await
        .expect("run");
    assert_eq!(report, customizer_cli::ScriptReport::default());
}
