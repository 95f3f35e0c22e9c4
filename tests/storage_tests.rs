use atelier::storage::models::Patch;
use atelier::storage::{Database, GalleryItemChanges, NewWork, WorkChanges};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn url(name: &str) -> String {
    format!("https://cdn.example.net/{name}")
}

fn insert_image(db: &Database, name: &str) -> u64 {
    db.insert_gallery_item(url(name), name.to_string(), String::new())
        .unwrap()
        .id
}

fn insert_work_in(db: &Database, title: &str, series_id: Option<u64>) -> u64 {
    db.insert_work(NewWork {
        title: title.to_string(),
        description: String::new(),
        image_url: url(title),
        order: None,
        selected_series_id: series_id,
    })
    .unwrap()
    .id
}

// ============================================================================
// Gallery
// ============================================================================

#[test]
fn test_gallery_orders_are_assigned_sequentially() {
    let (_dir, db) = test_db();

    for name in ["a.png", "b.png", "c.png"] {
        insert_image(&db, name);
    }

    let images = db.list_gallery().unwrap();
    let orders: Vec<u32> = images.iter().map(|i| i.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_gallery_list_sorts_by_order_then_id() {
    let (_dir, db) = test_db();

    let a = insert_image(&db, "a.png");
    let b = insert_image(&db, "b.png");

    // Force a duplicate order value; the earlier id must win the tie
    db.update_gallery_item(
        b,
        GalleryItemChanges {
            order: Some(1),
            ..Default::default()
        },
    )
    .unwrap();

    let ids: Vec<u64> = db.list_gallery().unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn test_gallery_reorder_restamps_submitted_sequence() {
    let (_dir, db) = test_db();

    let a = insert_image(&db, "a.png");
    let b = insert_image(&db, "b.png");
    let c = insert_image(&db, "c.png");

    db.reorder_gallery(&[c, a, b]).unwrap();

    let images = db.list_gallery().unwrap();
    let listed: Vec<(u64, u32)> = images.iter().map(|i| (i.id, i.order)).collect();
    assert_eq!(listed, vec![(c, 1), (a, 2), (b, 3)]);
}

#[test]
fn test_gallery_reorder_skips_unknown_ids() {
    let (_dir, db) = test_db();

    let a = insert_image(&db, "a.png");
    let b = insert_image(&db, "b.png");

    db.reorder_gallery(&[b, 999, a]).unwrap();

    let images = db.list_gallery().unwrap();
    let listed: Vec<(u64, u32)> = images.iter().map(|i| (i.id, i.order)).collect();
    assert_eq!(listed, vec![(b, 1), (a, 3)]);
}

#[test]
fn test_gallery_update_overwrites_present_fields_only() {
    let (_dir, db) = test_db();
    let id = insert_image(&db, "a.png");

    let updated = db
        .update_gallery_item(
            id,
            GalleryItemChanges {
                title: Some("Winter".to_string()),
                available: Some(false),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Winter");
    assert!(!updated.available);
    assert_eq!(updated.order, 1);
    assert_eq!(updated.image_url, url("a.png"));
}

#[test]
fn test_gallery_update_missing_id_is_none() {
    let (_dir, db) = test_db();
    assert!(db
        .update_gallery_item(42, GalleryItemChanges::default())
        .unwrap()
        .is_none());
}

#[test]
fn test_gallery_delete_returns_record_once() {
    let (_dir, db) = test_db();
    let id = insert_image(&db, "a.png");

    let removed = db.delete_gallery_item(id).unwrap().unwrap();
    assert_eq!(removed.id, id);
    assert!(db.delete_gallery_item(id).unwrap().is_none());
    assert!(db.list_gallery().unwrap().is_empty());
}

// ============================================================================
// Landing slides
// ============================================================================

#[test]
fn test_landing_slides_order_and_update() {
    let (_dir, db) = test_db();

    let first = db.insert_landing_slide(url("s1.jpg")).unwrap();
    let second = db.insert_landing_slide(url("s2.jpg")).unwrap();
    assert_eq!(first.order, 1);
    assert_eq!(second.order, 2);

    db.update_landing_slide_order(second.id, 0).unwrap().unwrap();
    let ids: Vec<u64> = db
        .list_landing_slides()
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

// ============================================================================
// Series and works
// ============================================================================

#[test]
fn test_series_round_trip_with_works() {
    let (_dir, db) = test_db();

    let series = db
        .insert_series("Landscapes".to_string(), Some(url("cover.jpg")))
        .unwrap();
    let w1 = insert_work_in(&db, "Dunes", Some(series.id));
    let w2 = insert_work_in(&db, "Cliffs", Some(series.id));

    let (found, works) = db.get_series_with_works(series.id).unwrap().unwrap();
    assert_eq!(found.name, "Landscapes");
    let ids: Vec<u64> = works.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![w1, w2]);

    let all = db.list_series_with_works().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].1.len(), 2);
}

#[test]
fn test_get_series_missing_is_none() {
    let (_dir, db) = test_db();
    assert!(db.get_series_with_works(5).unwrap().is_none());
}

#[test]
fn test_update_series_name_only_keeps_image() {
    let (_dir, db) = test_db();
    let series = db
        .insert_series("Old".to_string(), Some(url("cover.jpg")))
        .unwrap();

    let updated = db
        .update_series(series.id, Some("New".to_string()), None)
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "New");
    assert_eq!(updated.image_url, Some(url("cover.jpg")));
}

#[test]
fn test_works_order_is_global_across_series() {
    let (_dir, db) = test_db();
    let s1 = db.insert_series("One".to_string(), None).unwrap();
    let s2 = db.insert_series("Two".to_string(), None).unwrap();

    insert_work_in(&db, "w1", Some(s1.id));
    insert_work_in(&db, "w2", Some(s2.id));
    let third = db.get_work(insert_work_in(&db, "w3", None)).unwrap().unwrap();

    assert_eq!(third.order, 3);
}

#[test]
fn test_works_by_series_sorted_and_scoped() {
    let (_dir, db) = test_db();
    let s1 = db.insert_series("One".to_string(), None).unwrap();
    let s2 = db.insert_series("Two".to_string(), None).unwrap();

    let a = insert_work_in(&db, "a", Some(s1.id));
    let b = insert_work_in(&db, "b", Some(s1.id));
    insert_work_in(&db, "c", Some(s2.id));

    db.reorder_works(&[b, a]).unwrap();

    let ids: Vec<u64> = db
        .list_works_by_series(s1.id)
        .unwrap()
        .iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec![b, a]);

    assert!(db.list_works_by_series(999).unwrap().is_empty());
}

#[test]
fn test_update_work_reparents_and_maintains_index() {
    let (_dir, db) = test_db();
    let s1 = db.insert_series("One".to_string(), None).unwrap();
    let s2 = db.insert_series("Two".to_string(), None).unwrap();
    let work = insert_work_in(&db, "w", Some(s1.id));

    db.update_work(
        work,
        WorkChanges {
            selected_series_id: Patch::Value(s2.id),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();

    assert!(db.list_works_by_series(s1.id).unwrap().is_empty());
    let ids: Vec<u64> = db
        .list_works_by_series(s2.id)
        .unwrap()
        .iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec![work]);
}

#[test]
fn test_update_work_detaches_on_null() {
    let (_dir, db) = test_db();
    let series = db.insert_series("One".to_string(), None).unwrap();
    let work = insert_work_in(&db, "w", Some(series.id));

    let updated = db
        .update_work(
            work,
            WorkChanges {
                selected_series_id: Patch::Null,
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.selected_series_id, None);
    assert!(db.list_works_by_series(series.id).unwrap().is_empty());
}

#[test]
fn test_update_work_absent_patch_keeps_series() {
    let (_dir, db) = test_db();
    let series = db.insert_series("One".to_string(), None).unwrap();
    let work = insert_work_in(&db, "w", Some(series.id));

    let updated = db
        .update_work(
            work,
            WorkChanges {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.selected_series_id, Some(series.id));
    assert_eq!(db.list_works_by_series(series.id).unwrap().len(), 1);
}

#[test]
fn test_delete_work_cleans_index() {
    let (_dir, db) = test_db();
    let series = db.insert_series("One".to_string(), None).unwrap();
    let keep = insert_work_in(&db, "keep", Some(series.id));
    let gone = insert_work_in(&db, "gone", Some(series.id));

    db.delete_work(gone).unwrap().unwrap();

    let ids: Vec<u64> = db
        .list_works_by_series(series.id)
        .unwrap()
        .iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec![keep]);
}

#[test]
fn test_delete_series_cascades_to_works() {
    let (_dir, db) = test_db();
    let series = db
        .insert_series("Doomed".to_string(), Some(url("cover.jpg")))
        .unwrap();
    let w1 = insert_work_in(&db, "w1", Some(series.id));
    let w2 = insert_work_in(&db, "w2", Some(series.id));
    let unrelated = insert_work_in(&db, "free", None);

    let (removed, removed_works) = db.delete_series(series.id).unwrap().unwrap();
    assert_eq!(removed.id, series.id);
    let removed_ids: Vec<u64> = removed_works.iter().map(|w| w.id).collect();
    assert_eq!(removed_ids, vec![w1, w2]);

    // Former series id now yields an empty collection
    assert!(db.get_series_with_works(series.id).unwrap().is_none());
    assert!(db.list_works_by_series(series.id).unwrap().is_empty());
    assert!(db.get_work(w1).unwrap().is_none());
    assert!(db.get_work(w2).unwrap().is_none());

    // Works outside the series survive
    assert!(db.get_work(unrelated).unwrap().is_some());
}

#[test]
fn test_delete_series_missing_is_none() {
    let (_dir, db) = test_db();
    assert!(db.delete_series(77).unwrap().is_none());
}

// ============================================================================
// Singletons
// ============================================================================

#[test]
fn test_bio_upsert_overwrites() {
    let (_dir, db) = test_db();
    assert!(db.get_bio().unwrap().is_none());

    db.upsert_bio("first".to_string(), None).unwrap();
    db.upsert_bio("second".to_string(), Some(url("me.jpg")))
        .unwrap();

    let bio = db.get_bio().unwrap().unwrap();
    assert_eq!(bio.bio_text, "second");
    assert_eq!(bio.profile_picture_url, Some(url("me.jpg")));
}

#[test]
fn test_settings_upsert_overwrites() {
    let (_dir, db) = test_db();
    assert!(db.get_settings().unwrap().is_none());

    db.upsert_settings(Some(url("bg1.jpg"))).unwrap();
    db.upsert_settings(Some(url("bg2.jpg"))).unwrap();

    let settings = db.get_settings().unwrap().unwrap();
    assert_eq!(settings.background_image_url, Some(url("bg2.jpg")));
}

// ============================================================================
// Accounts
// ============================================================================

#[test]
fn test_create_user_enforces_unique_username() {
    let (_dir, db) = test_db();

    let user = db
        .create_user("oman".to_string(), "hash-1".to_string(), "admin".to_string())
        .unwrap()
        .unwrap();
    assert_eq!(user.role, "admin");

    let duplicate = db
        .create_user("oman".to_string(), "hash-2".to_string(), "admin".to_string())
        .unwrap();
    assert!(duplicate.is_none());

    assert_eq!(db.user_count().unwrap(), 1);
    let found = db.get_user_by_username("oman").unwrap().unwrap();
    assert_eq!(found.password_hash, "hash-1");
    assert!(db.get_user_by_username("nobody").unwrap().is_none());
}

// ============================================================================
// CV documents and profile pictures
// ============================================================================

#[test]
fn test_cv_documents_list_newest_first() {
    let (_dir, db) = test_db();

    let old = db
        .insert_cv_document("CV 2023".to_string(), String::new(), url("cv-2023.pdf"))
        .unwrap();
    let new = db
        .insert_cv_document("CV 2024".to_string(), String::new(), url("cv-2024.pdf"))
        .unwrap();

    let ids: Vec<u64> = db.list_cv_documents().unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![new.id, old.id]);

    db.delete_cv_document(old.id).unwrap().unwrap();
    assert_eq!(db.list_cv_documents().unwrap().len(), 1);
}

#[test]
fn test_profile_pictures_round_trip() {
    let (_dir, db) = test_db();

    let picture = db.insert_profile_picture(url("face.jpg")).unwrap();
    assert_eq!(db.list_profile_pictures().unwrap().len(), 1);

    db.delete_profile_picture(picture.id).unwrap().unwrap();
    assert!(db.list_profile_pictures().unwrap().is_empty());
    assert!(db.delete_profile_picture(picture.id).unwrap().is_none());
}

// ============================================================================
// Purge
// ============================================================================

#[test]
fn test_purge_all_clears_every_collection() {
    let (_dir, db) = test_db();

    insert_image(&db, "a.png");
    db.insert_landing_slide(url("s.jpg")).unwrap();
    let series = db.insert_series("S".to_string(), None).unwrap();
    insert_work_in(&db, "w", Some(series.id));
    db.upsert_bio("text".to_string(), None).unwrap();
    db.create_user("u".to_string(), "h".to_string(), "admin".to_string())
        .unwrap();

    let stats = db.purge_all().unwrap();
    assert!(stats.records >= 6);

    assert!(db.list_gallery().unwrap().is_empty());
    assert!(db.list_landing_slides().unwrap().is_empty());
    assert!(db.list_series_with_works().unwrap().is_empty());
    assert!(db.list_works().unwrap().is_empty());
    assert!(db.get_bio().unwrap().is_none());
    assert_eq!(db.user_count().unwrap(), 0);
    assert!(db.get_user_by_username("u").unwrap().is_none());
}
