use std::time::Duration;

use claims::{assert_none, assert_ok, assert_some};
use newsletter_client::{
    components::{BannerStatus, FormStatus, SubscribeForm, TestBanner},
    flag_store::FlagStore,
};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, query_param},
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribe_form_walks_from_idle_to_success() {
    let app = spawn_app().await;

    Mock::given(query_param("action", "subscribe"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "person_id": 42 })),
        )
        .expect(1)
        .mount(&app.endpoint)
        .await;

    let form = SubscribeForm::new(app.newsletter_client());
    assert_eq!(form.status(), FormStatus::Idle);

    form.set_email("a@b.com");
    assert_ok!(form.submit().await);

    assert_eq!(form.status(), FormStatus::Success);
    assert!(!form.client().is_loading());
}

#[tokio::test]
async fn test_banner_persists_success_across_mounts() {
    let app = spawn_app().await;

    Mock::given(query_param("action", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "job_id": "x" })))
        .expect(1)
        .mount(&app.endpoint)
        .await;

    let banner = TestBanner::mount(
        app.email_client(),
        app.flag_store(),
        app.storage.test_flag_key.as_str(),
    )
    .with_hide_delay(Duration::from_millis(50));
    assert!(banner.is_visible());
    assert_some!(banner.render().unwrap());

    banner.set_to_email("ops@example.com");
    assert_ok!(banner.send_test().await);
    assert_eq!(
        banner.status(),
        BannerStatus::Success {
            job_id: Some("x".into())
        }
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!banner.is_visible());
    assert_none!(banner.render().unwrap());

    assert!(app.flag_store().is_set(&app.storage.test_flag_key).unwrap());
    let remounted = TestBanner::mount(
        app.email_client(),
        app.flag_store(),
        app.storage.test_flag_key.as_str(),
    );
    assert!(!remounted.is_visible());
}

#[tokio::test]
async fn unreadable_flag_file_still_shows_the_banner() {
    let app = spawn_app().await;
    std::fs::create_dir_all(app.storage.flag_file.parent().unwrap()).unwrap();
    std::fs::write(&app.storage.flag_file, "{ not json").unwrap();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.endpoint)
        .await;

    let banner = TestBanner::mount(
        app.email_client(),
        app.flag_store(),
        app.storage.test_flag_key.as_str(),
    );

    assert!(banner.is_visible());
}
