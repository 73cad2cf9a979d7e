use photobook_layout::constraint::owner_page;
use photobook_layout::store::{BlobStore, Collection};
use photobook_layout::*;

async fn open(memory: &MemoryStore, total_pages: usize) -> Editor<MemoryStore> {
    let options = EditorOptions {
        total_pages,
        ..EditorOptions::default()
    };
    Editor::open(memory.clone(), options, Viewport::default())
        .await
        .unwrap()
}

fn photo(len: usize) -> ImageSource {
    ImageSource {
        name: "beach.png".to_string(),
        mime: "image/png".to_string(),
        bytes: vec![9; len],
        width: 200,
        height: 100,
    }
}

fn owner_side(editor: &Editor<MemoryStore>, id: &ObjectId) -> PageSide {
    let obj = editor.scene().get(id).unwrap();
    owner_page(editor.layout(), obj).unwrap().side
}

#[tokio::test]
async fn test_open_starts_on_empty_cover() {
    let memory = MemoryStore::new();
    let editor = open(&memory, 30).await;
    assert_eq!(editor.current_spread(), 0);
    assert_eq!(editor.spread_label(), "Cover");
    assert!(editor.scene().is_empty());
    assert_eq!(editor.history().len(), 1);
    assert!(editor.autosave_deadline().is_none());
}

#[tokio::test]
async fn test_open_loads_saved_cover() {
    let memory = MemoryStore::new();
    let id = {
        let mut editor = open(&memory, 30).await;
        let id = editor.add_text("Summer");
        assert!(editor.save().await);
        id
    };
    let editor = open(&memory, 30).await;
    assert!(editor.scene().get(&id).is_some());
}

#[tokio::test]
async fn test_navigation_saves_and_clears() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    let id = editor.add_text("Title");

    assert_eq!(editor.goto_spread(2).await, 2);
    assert!(editor.scene().is_empty());
    assert_eq!(editor.spread_label(), "Pages 2–3");

    let cover = editor.store().load(0).await.unwrap().unwrap();
    assert_eq!(cover.objects.len(), 1);

    editor.goto_spread(0).await;
    assert!(editor.scene().get(&id).is_some());
}

#[tokio::test]
async fn test_navigation_survives_failed_save() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(3).await;
    editor.add_text("lost");
    memory.fail_writes_to("spread_3");

    assert_eq!(editor.goto_spread(4).await, 4);
    assert!(editor.scene().is_empty());
}

#[tokio::test]
async fn test_goto_clamps_to_last_spread() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    assert_eq!(editor.goto_spread(99).await, 14);
    assert_eq!(editor.spread_label(), "Page 26");
    assert_eq!(editor.next_spread().await, 14);
    assert_eq!(editor.prev_spread().await, 13);
}

#[tokio::test]
async fn test_spread_one_round_trip_on_right_page() {
    // 4 pages: cover plus a single content spread
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 4).await;
    assert_eq!(editor.book().spread_count(), 1);
    editor.goto_spread(1).await;

    let report = editor.add_image(photo(16)).await;
    assert!(report.blob_stored);
    assert_eq!(owner_side(&editor, &report.id), PageSide::Right);

    let right = editor.layout().page(PageSide::Right).rect;
    editor
        .move_object(&report.id, right.x + 10.0, right.y + 10.0)
        .unwrap();
    assert!(editor.save().await);

    editor.goto_spread(0).await;
    editor.goto_spread(1).await;

    let obj = editor.scene().get(&report.id).unwrap();
    assert_eq!(obj.transform.left, right.x + 10.0);
    assert_eq!(obj.transform.top, right.y + 10.0);
    assert_eq!(owner_side(&editor, &report.id), PageSide::Right);
}

#[tokio::test]
async fn test_locked_page_never_owns_objects() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(1).await;

    let id = editor.add_text("Dedication");
    assert_eq!(owner_side(&editor, &id), PageSide::Right);

    let left = editor.layout().page(PageSide::Left).rect;
    editor.move_object(&id, left.x + 5.0, left.y + 5.0).unwrap();

    assert_eq!(owner_side(&editor, &id), PageSide::Right);
    let right = editor.layout().page(PageSide::Right).rect;
    let obj = editor.scene().get(&id).unwrap();
    assert!(right.contains_rect(&obj.bounding_box(), 0.01));
    assert_eq!(obj.clip.unwrap().rect, right);
}

#[tokio::test]
async fn test_scale_keeps_object_on_page() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let report = editor.add_image(photo(8)).await;

    editor.scale_object(&report.id, 3.0, 0.5, true).unwrap();

    let obj = editor.scene().get(&report.id).unwrap();
    assert_eq!(obj.transform.scale_y, 3.0);
    let page = owner_page(editor.layout(), obj).unwrap().rect;
    let visible = obj.effective_bounds().unwrap();
    assert!(page.contains_rect(&visible, 0.01));
}

#[tokio::test]
async fn test_oversized_object_survives_reload() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_image(photo(8)).await.id;

    editor.scale_object(&id, 4.0, 4.0, true).unwrap();
    let left = editor.layout().page(PageSide::Left).rect;
    editor.move_object(&id, left.x - 300.0, left.y).unwrap();

    let before = editor.scene().get(&id).unwrap().clone();
    assert_eq!(before.transform.left, left.x);
    assert_eq!(owner_side(&editor, &id), PageSide::Left);
    assert_eq!(before.clip.unwrap().rect, left);

    editor.goto_spread(3).await;
    editor.goto_spread(2).await;

    let after = editor.scene().get(&id).unwrap();
    assert_eq!(after.transform, before.transform);
    assert_eq!(after.clip, before.clip);
    assert_eq!(owner_side(&editor, &id), PageSide::Left);
}

#[tokio::test]
async fn test_unusable_scales_are_rejected() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_image(photo(8)).await.id;
    let start = editor.scene().get(&id).unwrap().transform;
    let history = editor.history().len();

    for (sx, sy, uniform) in [
        (-1.0, -1.0, true),
        (0.0, 1.0, false),
        (1.0, -0.5, false),
        (f32::NAN, 1.0, true),
        (f32::INFINITY, 1.0, false),
    ] {
        assert!(matches!(
            editor.scale_object(&id, sx, sy, uniform),
            Err(LayoutError::InvalidScale { .. })
        ));
    }
    assert_eq!(editor.scene().get(&id).unwrap().transform, start);
    assert_eq!(editor.history().len(), history);

    // Uniform scaling ignores the vertical factor
    editor.scale_object(&id, 0.25, -3.0, true).unwrap();
    let obj = editor.scene().get(&id).unwrap();
    assert_eq!((obj.transform.scale_x, obj.transform.scale_y), (0.25, 0.25));
}

#[tokio::test]
async fn test_stored_negative_scale_is_reset_on_load() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_image(photo(8)).await.id;
    assert!(editor.save().await);

    let mut record = editor.store().load(2).await.unwrap().unwrap();
    editor.goto_spread(3).await;

    record.objects[0].transform.scale_x = -1.0;
    record.objects[0].transform.scale_y = 0.0;
    memory
        .put(
            Collection::Spreads,
            "spread_2",
            serde_json::to_vec(&record).unwrap(),
        )
        .await
        .unwrap();
    editor.goto_spread(2).await;

    let obj = editor.scene().get(&id).unwrap();
    assert_eq!((obj.transform.scale_x, obj.transform.scale_y), (1.0, 1.0));
    let page = editor.layout().page(owner_side(&editor, &id)).rect;
    assert!(page.contains_rect(&obj.bounding_box(), 0.01));
}

#[tokio::test]
async fn test_missing_object_is_reported() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    let ghost = ObjectId::new("ghost");
    assert!(matches!(
        editor.move_object(&ghost, 0.0, 0.0),
        Err(LayoutError::ObjectNotFound(_))
    ));
    assert!(editor.remove_object(&ghost).is_err());
    assert!(!editor.move_layer(&ghost, 0));
}

#[tokio::test]
async fn test_undo_redo_and_divergent_edit() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_text("a");
    let start = editor.scene().get(&id).unwrap().transform;

    let left = editor.layout().page(PageSide::Left).rect;
    editor.move_object(&id, left.x, left.y).unwrap();

    assert!(editor.undo());
    assert_eq!(editor.scene().get(&id).unwrap().transform, start);
    assert!(editor.redo());
    assert_eq!(editor.scene().get(&id).unwrap().transform.left, left.x);

    assert!(editor.undo());
    editor.move_object(&id, left.x + 1.0, left.y).unwrap();
    assert!(!editor.redo());

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.scene().is_empty());
    assert!(!editor.undo());
}

#[tokio::test]
async fn test_history_is_bounded() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_text("a");
    let left = editor.layout().page(PageSide::Left).rect;
    for i in 0..80 {
        editor
            .move_object(&id, left.x + i as f32, left.y)
            .unwrap();
    }
    assert_eq!(editor.history().len(), 50);
}

#[tokio::test]
async fn test_add_spread_stops_at_seventy_pages() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 68).await;
    assert!(editor.add_spread().await);
    assert_eq!(editor.book().total_pages(), 70);
    assert!(!editor.add_spread().await);
    assert_eq!(editor.book().total_pages(), 70);
    assert_eq!(editor.book().spread_count(), 34);

    // The page count is remembered
    let reopened = open(&memory, 30).await;
    assert_eq!(reopened.book().total_pages(), 70);
}

#[tokio::test]
async fn test_mutations_schedule_autosave() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(5).await;
    editor.add_text("draft");

    let deadline = editor.autosave_deadline().unwrap();
    assert_eq!(editor.autosave_if_due(deadline - editor.options().autosave_delay()).await, None);
    assert_eq!(editor.autosave_if_due(deadline).await, Some(true));
    assert!(editor.autosave_deadline().is_none());
    assert!(memory.contains(Collection::Spreads, "spread_5"));
}

#[tokio::test]
async fn test_flush_saves_pending_changes_only() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    assert_eq!(editor.flush().await, None);
    editor.add_text("x");
    assert_eq!(editor.flush().await, Some(true));
    assert!(memory.contains(Collection::Spreads, "spread_0"));
}

#[tokio::test]
async fn test_full_image_store_keeps_photo_inline_then_strips_it() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;

    // Room for an empty slot list but not for the photo
    let empty = PhotoTray { slots: vec![None] };
    memory.set_quota(
        Collection::Images,
        Some(serde_json::to_vec(&empty).unwrap().len()),
    );

    let report = editor.add_image(photo(64)).await;

    assert!(!report.blob_stored);
    assert_eq!(report.tray, Some(PhotoSaveOutcome::Degraded { stripped: 1 }));
    assert_eq!(editor.photo_tray().slots, vec![None]);
    // The object is still placed
    assert!(editor.scene().get(&report.id).is_some());
}

#[tokio::test]
async fn test_image_store_failure_after_stripping_is_surfaced() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    memory.set_quota(Collection::Images, Some(0));

    let report = editor.add_image(photo(64)).await;

    assert!(!report.blob_stored);
    assert_eq!(report.tray, None);
    assert_eq!(editor.scene().len(), 1);
}

#[tokio::test]
async fn test_text_color_only_applies_to_text() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let text = editor.add_text("t");
    let image = editor.add_image(photo(4)).await.id;

    assert!(editor.set_text_color(&text, "#ff0000").unwrap());
    assert!(!editor.set_text_color(&image, "#ff0000").unwrap());
    match &editor.scene().get(&text).unwrap().kind {
        ObjectKind::Text { fill, .. } => assert_eq!(fill, "#ff0000"),
        other => panic!("expected text, got {other:?}"),
    }
}

#[tokio::test]
async fn test_layers_follow_stacking_order() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let a = editor.add_text("a");
    let b = editor.add_text("b");
    let c = editor.add_text("c");

    let order: Vec<ObjectId> = editor.layers().into_iter().map(|l| l.id).collect();
    assert_eq!(order, vec![a.clone(), b.clone(), c.clone()]);

    assert!(editor.move_layer(&c, 0));
    let order: Vec<ObjectId> = editor.layers().into_iter().map(|l| l.id).collect();
    assert_eq!(order, vec![c.clone(), a.clone(), b.clone()]);

    // Out-of-range targets clamp to the top
    assert!(editor.move_layer(&c, 99));
    assert_eq!(editor.layers().last().unwrap().id, c);
    assert!(editor.history().can_undo());
}

#[tokio::test]
async fn test_clear_and_remove() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    let a = editor.add_text("a");
    editor.add_text("b");

    let removed = editor.remove_object(&a).unwrap();
    assert_eq!(removed.id, a);
    assert_eq!(editor.scene().len(), 1);

    editor.clear();
    assert!(editor.scene().is_empty());
    assert!(editor.undo());
    assert_eq!(editor.scene().len(), 1);
}

#[tokio::test]
async fn test_reorder_through_editor() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    let mut ids = Vec::new();
    for i in 1..=5 {
        editor.goto_spread(i).await;
        ids.push(editor.add_text(format!("spread {i}")));
    }

    let report = editor.reorder_spreads(3, 5).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(editor.current_spread(), 5);
    assert!(editor.scene().get(&ids[2]).is_some());

    // Spread 5 was unsaved when the reorder started; it was saved first
    let record = editor.store().load(4).await.unwrap().unwrap();
    assert_eq!(record.objects[0].id, ids[4]);

    assert!(editor.reorder_spreads(1, 4).await.is_none());
    assert!(editor.reorder_spreads(4, 0).await.is_none());
}

#[tokio::test]
async fn test_delete_spread_clears_current_scene() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    editor.add_text("gone");
    assert!(editor.save().await);

    assert!(editor.delete_spread(2).await);
    assert!(editor.scene().is_empty());
    assert!(editor.store().load(2).await.unwrap().is_none());
    assert!(editor.saved_spreads().iter().all(|m| m.spread_index != 2));
}

#[tokio::test]
async fn test_zoom_and_theme_are_remembered() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    let before = editor.layout().page(PageSide::Left).rect;

    assert_eq!(editor.zoom_in().await, 1.1);
    assert_eq!(editor.set_zoom(5.0).await, 2.0);
    assert!(editor.layout().page(PageSide::Left).rect.width > before.width);
    editor.set_theme(Theme::Dark).await;

    let reopened = open(&memory, 30).await;
    assert_eq!(reopened.zoom(), 2.0);
    assert_eq!(reopened.theme(), Theme::Dark);

    assert_eq!(editor.zoom_reset().await, 1.0);
    assert_eq!(editor.layout().page(PageSide::Left).rect, before);
}

#[tokio::test]
async fn test_resize_reclips_objects() {
    let memory = MemoryStore::new();
    let mut editor = open(&memory, 30).await;
    editor.goto_spread(2).await;
    let id = editor.add_text("t");

    editor.resize(Viewport::new(600.0, 800.0));

    let page = owner_page(editor.layout(), editor.scene().get(&id).unwrap()).unwrap();
    let clip = editor.scene().get(&id).unwrap().clip.unwrap();
    assert_eq!(clip.rect, page.rect);
}
