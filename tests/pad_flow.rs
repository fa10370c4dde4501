//! End-to-end flows over the session board, scratch store and exporter,
//! exercising the same paths the pad UI drives.

use std::fs;

use tempfile::TempDir;
use voxpad::media::{export_take, mime, HandleStore, Take};
use voxpad::session::{Phase, SessionBoard};

#[test]
fn record_save_export_flow() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
    let mut board = SessionBoard::new();

    board.start_recording();
    board.tick();
    board.tick();
    assert_eq!(board.elapsed_secs(), 2);
    assert!(board.visible_draft().is_none(), "no draft while recording");

    // Microphone stops, one second of audio becomes the draft.
    let samples: Vec<i16> = (0..16000).map(|i| ((i % 64) * 128) as i16).collect();
    let handle = store.create_wav(&samples, 16000).unwrap();
    board.stop_recording();
    board.draft_from_capture(Take::from_capture(handle, 1.0));
    assert_eq!(board.phase(), Phase::DraftReady);
    assert_eq!(board.visible_draft().unwrap().media_type(), "audio/wav");

    let id = board.save_draft().expect("draft saved");
    assert_eq!(board.saved().len(), 1);
    assert!(board.visible_draft().is_none(), "saving consumes the draft");

    // Exporting twice must not clobber the first file.
    let exports = tmp.path().join("exports");
    let take = &board.find_saved(id).unwrap().take;
    let first = export_take(take, &exports, "recorded_audio").unwrap();
    let second = export_take(take, &exports, "recorded_audio").unwrap();
    assert_eq!(first.file_name().unwrap(), "recorded_audio.wav");
    assert_eq!(second.file_name().unwrap(), "recorded_audio-1.wav");
    assert!(first.exists());
    assert!(second.exists());
}

#[test]
fn rejected_import_keeps_current_draft() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
    let mut board = SessionBoard::new();

    let handle = store.create_wav(&[0i16; 800], 16000).unwrap();
    board.draft_from_capture(Take::from_capture(handle, 0.05));
    let draft_path = board.visible_draft().unwrap().path().to_path_buf();

    let notes = tmp.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();
    let rejected = store.adopt_copy(&notes).unwrap();
    let err = board
        .draft_from_upload(Take::from_upload(rejected, mime::media_type_of(&notes)))
        .unwrap_err();

    assert_eq!(err.to_string(), "Please upload a valid audio file.");
    assert_eq!(board.visible_draft().unwrap().path(), draft_path);
    assert!(draft_path.exists(), "rejected import must not touch the draft");
}

#[test]
fn import_during_session_ends_it() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
    let mut board = SessionBoard::new();

    board.start_recording();
    board.tick();
    assert!(board.is_recording());

    let clip = tmp.path().join("clip.ogg");
    fs::write(&clip, [1u8; 32]).unwrap();
    let handle = store.adopt_copy(&clip).unwrap();
    board
        .draft_from_upload(Take::from_upload(handle, "audio/ogg"))
        .unwrap();

    assert!(!board.is_recording(), "successful import ends the session");
    assert_eq!(board.phase(), Phase::DraftReady);
    assert_eq!(board.visible_draft().unwrap().media_type(), "audio/ogg");
}

#[test]
fn saved_takes_keep_order_and_unique_ids() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
    let mut board = SessionBoard::new();

    let mut ids = Vec::new();
    for _ in 0..5 {
        let handle = store.create_wav(&[0i16; 160], 16000).unwrap();
        board.draft_from_capture(Take::from_capture(handle, 0.01));
        ids.push(board.save_draft().unwrap());
    }

    assert_eq!(board.saved().len(), 5);
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "ids must be strictly increasing");
    }
    let listed: Vec<_> = board.saved().iter().map(|t| t.id).collect();
    assert_eq!(listed, ids, "list preserves insertion order");
}

#[test]
fn deleting_a_take_releases_its_audio() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
    let mut board = SessionBoard::new();

    let handle = store.create_wav(&[0i16; 160], 16000).unwrap();
    board.draft_from_capture(Take::from_capture(handle, 0.01));
    let first = board.save_draft().unwrap();

    let handle = store.create_wav(&[0i16; 320], 16000).unwrap();
    board.draft_from_capture(Take::from_capture(handle, 0.02));
    let second = board.save_draft().unwrap();

    let first_path = board.find_saved(first).unwrap().take.path().to_path_buf();
    let second_path = board.find_saved(second).unwrap().take.path().to_path_buf();

    assert!(board.delete_saved(first));
    assert!(!first_path.exists(), "deleted take audio is removed");
    assert!(second_path.exists());
    assert_eq!(board.saved().len(), 1);
    assert!(!board.delete_saved(first), "double delete is a no-op");
}

#[test]
fn imported_wav_reports_probed_duration() {
    let tmp = TempDir::new().unwrap();
    let store = HandleStore::at(tmp.path().join("scratch")).unwrap();

    // Half a second of silence at 16kHz, exported so it exists outside the
    // scratch dir like a user file would.
    let handle = store.create_wav(&vec![0i16; 8000], 16000).unwrap();
    let exported = export_take(&Take::from_capture(handle, 0.5), tmp.path(), "memo").unwrap();

    let imported = Take::from_upload(store.adopt_copy(&exported).unwrap(), "audio/wav");
    let secs = imported.duration_secs().expect("wav header is readable");
    assert!((secs - 0.5).abs() < 0.01);
}

#[test]
fn scratch_store_cleans_up_on_drop() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("scratch");

    let exported;
    {
        let store = HandleStore::at(&root).unwrap();
        let mut board = SessionBoard::new();

        let handle = store.create_wav(&[0i16; 160], 16000).unwrap();
        board.draft_from_capture(Take::from_capture(handle, 0.01));
        board.save_draft().unwrap();

        let take = &board.saved()[0].take;
        exported = export_take(take, tmp.path(), "keepsake").unwrap();
        assert!(root.exists());

        // Board drops first (takes release their files), then the store
        // removes the directory itself.
        drop(board);
        drop(store);
    }

    assert!(!root.exists(), "scratch dir removed on drop");
    assert!(exported.exists(), "exports are real copies and survive");
}
