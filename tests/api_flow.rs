//! End-to-end admin flows against the production store in a temp directory:
//! the same sequences the serving layer drives, minus HTTP.

use cardstock::api::CardstockApi;
use cardstock::config::CardstockConfig;
use cardstock::model::{Card, PageSeed, RecordId, Section};
use cardstock::store::JsonlStore;
use cardstock::uploads::IncomingFile;
use tempfile::TempDir;

fn setup() -> (TempDir, CardstockApi<JsonlStore>) {
    let dir = TempDir::new().unwrap();
    let config = CardstockConfig {
        data_dir: Some(dir.path().join("data")),
        uploads_dir: Some(dir.path().join("data").join("uploads")),
        ..Default::default()
    };
    let api = CardstockApi::open(&config).unwrap();
    (dir, api)
}

fn seeds() -> Vec<PageSeed> {
    vec![
        PageSeed {
            slug: "telegram".to_string(),
            id: RecordId::parse("a1b2c3d4e5").unwrap(),
            title: "Join on Telegram".to_string(),
            link_url: "https://t.me/example".to_string(),
        },
        PageSeed {
            slug: "analytics".to_string(),
            id: RecordId::parse("b2c3d4e5f6").unwrap(),
            title: "Exclusive analytics".to_string(),
            link_url: String::new(),
        },
    ]
}

#[test]
fn startup_seeding_then_page_edit() {
    let (_dir, api) = setup();

    let messages = api.seed_pages(&seeds()).unwrap();
    assert_eq!(messages.len(), 2);
    // Second boot: nothing new.
    assert!(api.seed_pages(&seeds()).unwrap().is_empty());

    let mut page = api.get_page("telegram").unwrap().unwrap();
    page.title = "Join the channel".to_string();
    page.description = "Daily updates".to_string();
    page.touch();
    api.upsert_page("telegram", page).unwrap();

    let page = api.get_page("Telegram").unwrap().unwrap();
    assert_eq!(page.title, "Join the channel");
    assert_eq!(api.list_pages().unwrap().len(), 2);
}

#[test]
fn card_lifecycle_create_edit_attach_delete() {
    let (dir, api) = setup();
    let id = RecordId::generate();

    let mut card = Card::new(id.clone(), "Market outlook");
    card.section = Section::Research;
    api.upsert_card(&id, card).unwrap();

    let report = api
        .attach_files(
            &id,
            &[
                IncomingFile::new("chart.png", b"png-bytes".to_vec()),
                IncomingFile::new("notes.exe", b"nope".to_vec()),
                IncomingFile::new("summary.pdf", b"pdf-bytes".to_vec()),
            ],
        )
        .unwrap();

    // Partial batch: two saved, one rejection notice.
    assert_eq!(report.saved.len(), 2);
    assert_eq!(report.messages.len(), 1);
    assert!(report.messages[0].content.contains("notes.exe"));

    let card = api.get_card(&id).unwrap().unwrap();
    assert_eq!(card.files.len(), 2);
    assert_eq!(
        card.files[0].url,
        format!("/uploads/{}/chart.png", id)
    );
    let upload_folder = dir.path().join("data").join("uploads").join(id.as_str());
    assert!(upload_folder.join("chart.png").exists());
    assert!(!upload_folder.join("notes.exe").exists());

    // Remove one attachment; the other survives.
    assert!(api.delete_file(&id, "chart.png").unwrap());
    assert!(!api.delete_file(&id, "chart.png").unwrap());
    let card = api.get_card(&id).unwrap().unwrap();
    assert_eq!(card.files.len(), 1);
    assert_eq!(card.files[0].name, "summary.pdf");

    // Deleting the card removes the record and the whole folder; a second
    // delete is "not found", not an error.
    assert!(api.delete_card(&id).unwrap());
    assert!(!upload_folder.exists());
    assert!(api.get_card(&id).unwrap().is_none());
    assert!(!api.delete_card(&id).unwrap());
}

#[test]
fn attachments_accumulate_across_edits() {
    let (_dir, api) = setup();
    let id = RecordId::generate();
    api.upsert_card(&id, Card::new(id.clone(), "t")).unwrap();

    api.attach_files(&id, &[IncomingFile::new("a.png", b"1".to_vec())])
        .unwrap();
    api.attach_files(&id, &[IncomingFile::new("a.png", b"2".to_vec())])
        .unwrap();

    // Same original name twice: the second save gets a suffixed name and the
    // list grows instead of being replaced.
    let card = api.get_card(&id).unwrap().unwrap();
    let names: Vec<&str> = card.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "a_2.png"]);
}

#[test]
fn card_listing_is_most_recently_modified_first() {
    let (_dir, api) = setup();

    let first = RecordId::generate();
    api.upsert_card(&first, Card::new(first.clone(), "first"))
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let second = RecordId::generate();
    api.upsert_card(&second, Card::new(second.clone(), "second"))
        .unwrap();

    let titles: Vec<String> = api
        .list_cards()
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["second", "first"]);

    // Editing the older card moves it to the front.
    let mut card = api.get_card(&first).unwrap().unwrap();
    card.title = "first, edited".to_string();
    card.touch();
    api.upsert_card(&first, card).unwrap();

    let titles: Vec<String> = api
        .list_cards()
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["first, edited", "second"]);
}

#[test]
fn state_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let config = CardstockConfig {
        data_dir: Some(dir.path().join("data")),
        ..Default::default()
    };
    let id = RecordId::generate();

    {
        let api = CardstockApi::open(&config).unwrap();
        api.seed_pages(&seeds()).unwrap();
        api.upsert_card(&id, Card::new(id.clone(), "persisted"))
            .unwrap();
    }

    let api = CardstockApi::open(&config).unwrap();
    assert_eq!(api.list_pages().unwrap().len(), 2);
    assert_eq!(api.get_card(&id).unwrap().unwrap().title, "persisted");
}
