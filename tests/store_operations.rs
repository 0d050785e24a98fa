use linkhub::HubInstance;
use linkhub::config::HubConfig;
use linkhub::error::HubErrorCode;
use linkhub::record::{EventDraft, LinkDraft};
use linkhub::session::CallerContext;
use std::path::Path;
use tempfile::tempdir;

fn open_hub(dir: &Path) -> HubInstance {
    HubInstance::open(HubConfig::default(), dir).expect("open hub")
}

fn admin(hub: &HubInstance) -> CallerContext {
    CallerContext::with_session(hub.login("changeme").expect("login"))
}

fn link_draft(platform: &str, url: &str) -> LinkDraft {
    LinkDraft {
        platform: platform.into(),
        url: url.into(),
        icon: None,
    }
}

fn event_draft(title: &str, date: &str) -> EventDraft {
    EventDraft {
        title: title.into(),
        date: date.into(),
        ..EventDraft::default()
    }
}

#[tokio::test]
async fn first_link_gets_id_one_and_defaults() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    let link = hub
        .create_link(&caller, link_draft("Spotify", "https://x"))
        .await
        .expect("create");
    assert_eq!(link.id, 1);
    assert_eq!(link.platform, "Spotify");
    assert_eq!(link.url, "https://x");
    assert_eq!(link.icon, "");
    assert_eq!(link.click_count, 0);
}

#[tokio::test]
async fn next_id_is_max_plus_one_even_across_gaps() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    for platform in ["Spotify", "Bandcamp", "YouTube"] {
        hub.create_link(&caller, link_draft(platform, "https://x"))
            .await
            .expect("seed");
    }
    hub.delete_link(&caller, 2).await.expect("delete middle");

    let link = hub
        .create_link(&caller, link_draft("Instagram", "https://x"))
        .await
        .expect("create after gap");
    assert_eq!(link.id, 4);

    let ids: Vec<u64> = hub
        .list_links()
        .await
        .expect("list")
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);

    assert_eq!(hub.links().get(3).await.expect("get").platform, "YouTube");
    let err = hub.links().get(2).await.expect_err("deleted id");
    assert_eq!(err.code(), HubErrorCode::LinkNotFound);
}

#[tokio::test]
async fn deleting_the_max_id_frees_it_for_reuse() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    hub.create_link(&caller, link_draft("Spotify", "https://x"))
        .await
        .expect("create 1");
    let second = hub
        .create_link(&caller, link_draft("Bandcamp", "https://x"))
        .await
        .expect("create 2");
    hub.delete_link(&caller, second.id).await.expect("delete 2");

    let reused = hub
        .create_link(&caller, link_draft("YouTube", "https://x"))
        .await
        .expect("create again");
    assert_eq!(reused.id, 2);
}

#[tokio::test]
async fn delete_of_missing_id_leaves_the_file_untouched() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);
    hub.create_link(&caller, link_draft("Spotify", "https://x"))
        .await
        .expect("seed");

    let path = dir.path().join("links.json");
    let before = std::fs::read(&path).expect("read before");

    let err = hub.delete_link(&caller, 99).await.expect_err("missing id");
    assert_eq!(err.code(), HubErrorCode::LinkNotFound);

    let after = std::fs::read(&path).expect("read after");
    assert_eq!(before, after);
}

#[tokio::test]
async fn failed_validation_leaves_the_file_untouched() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);
    hub.create_link(&caller, link_draft("Spotify", "https://x"))
        .await
        .expect("seed");

    let path = dir.path().join("links.json");
    let before = std::fs::read(&path).expect("read before");

    let err = hub
        .create_link(&caller, link_draft("", "https://x"))
        .await
        .expect_err("empty platform");
    assert_eq!(err.code(), HubErrorCode::Validation);

    let after = std::fs::read(&path).expect("read after");
    assert_eq!(before, after);
}

#[tokio::test]
async fn clicks_accumulate_and_survive_reopen() {
    let dir = tempdir().expect("temp dir");
    {
        let hub = open_hub(dir.path());
        let caller = admin(&hub);
        let link = hub
            .create_link(&caller, link_draft("Spotify", "https://x"))
            .await
            .expect("create");
        assert_eq!(hub.record_click(link.id).await.expect("click").click_count, 1);
        assert_eq!(hub.record_click(link.id).await.expect("click").click_count, 2);
    }

    let reopened = open_hub(dir.path());
    let links = reopened.list_links().await.expect("list");
    assert_eq!(links[0].click_count, 2);
}

#[tokio::test]
async fn click_on_missing_link_is_not_found() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let err = hub.record_click(42).await.expect_err("missing link");
    assert_eq!(err.code(), HubErrorCode::LinkNotFound);
}

#[tokio::test]
async fn event_defaults_are_filled_at_creation() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    let event = hub
        .create_event(&caller, event_draft("Album release show", "2026-09-01"))
        .await
        .expect("create event");
    assert_eq!(event.id, 1);
    assert_eq!(event.status, "upcoming");
    assert_eq!(event.time, "");
    assert_eq!(event.venue, "");
    assert_eq!(event.ticket_url, "");

    let err = hub
        .create_event(&caller, event_draft("No date", ""))
        .await
        .expect_err("missing date");
    assert_eq!(err.code(), HubErrorCode::Validation);
}

#[tokio::test]
async fn event_status_is_passed_through_verbatim() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    let draft = EventDraft {
        title: "Club night".into(),
        date: "2026-10-31".into(),
        status: Some("sold out".into()),
        ..EventDraft::default()
    };
    let event = hub.create_event(&caller, draft).await.expect("create");
    assert_eq!(event.status, "sold out");
}

#[tokio::test]
async fn collections_are_independent() {
    let dir = tempdir().expect("temp dir");
    let hub = open_hub(dir.path());
    let caller = admin(&hub);

    hub.create_link(&caller, link_draft("Spotify", "https://x"))
        .await
        .expect("link");
    hub.create_event(&caller, event_draft("Festival", "2026-08-14"))
        .await
        .expect("event");

    // Ids are allocated per collection, not globally.
    let event = hub
        .create_event(&caller, event_draft("Encore", "2026-08-15"))
        .await
        .expect("event 2");
    assert_eq!(event.id, 2);
    assert_eq!(hub.list_links().await.expect("links").len(), 1);
    assert_eq!(hub.events().get(2).await.expect("get").title, "Encore");

    let err = hub.delete_event(&caller, 5).await.expect_err("missing event");
    assert_eq!(err.code(), HubErrorCode::EventNotFound);
}

#[tokio::test]
async fn files_written_by_earlier_deployments_load_unchanged() {
    let dir = tempdir().expect("temp dir");
    // Hand-written in the original deployment's shape: camelCase names,
    // optional fields missing entirely.
    std::fs::write(
        dir.path().join("links.json"),
        r#"[
  { "id": 1, "platform": "Spotify", "url": "https://x", "icon": "", "clickCount": 7 },
  { "id": 3, "platform": "Bandcamp", "url": "https://y" }
]"#,
    )
    .expect("seed links");
    std::fs::write(
        dir.path().join("events.json"),
        r#"[{ "id": 2, "title": "Festival", "date": "2026-08-14", "ticketUrl": "https://t" }]"#,
    )
    .expect("seed events");

    let hub = open_hub(dir.path());
    let links = hub.list_links().await.expect("links");
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].click_count, 7);
    assert_eq!(links[1].click_count, 0);

    let events = hub.list_events().await.expect("events");
    assert_eq!(events[0].status, "upcoming");
    assert_eq!(events[0].ticket_url, "https://t");

    // max+1 over what the old deployment wrote.
    let caller = admin(&hub);
    let link = hub
        .create_link(&caller, link_draft("YouTube", "https://z"))
        .await
        .expect("create");
    assert_eq!(link.id, 4);
}
