use claims::{assert_err, assert_none, assert_ok};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, lorem::en::Sentence},
};
use newsletter_client::email_client::{SendEmailRequest, SendTemplateRequest};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, method, query_param},
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn send_email_rejected_by_the_server_keeps_its_message() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(query_param("action", "send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad subject" })))
        .expect(1)
        .mount(&app.endpoint)
        .await;

    let client = app.email_client();
    let request = SendEmailRequest {
        to_email: SafeEmail().fake(),
        subject: "".into(),
        body_html: "<p>Hi</p>".into(),
        ..Default::default()
    };

    let error = assert_err!(client.send_email(&request).await);

    assert_eq!(error.to_string(), "bad subject");
    assert_eq!(client.error().as_deref(), Some("bad subject"));
    assert!(!client.is_loading());
}

#[tokio::test]
async fn send_email_passes_tags_and_recipient_name() {
    let app = spawn_app().await;
    let subject: String = Sentence(1..3).fake();

    Mock::given(query_param("action", "send"))
        .and(body_json(json!({
            "to_email": "ursula@example.com",
            "to_name": "Ursula",
            "subject": subject,
            "body_html": "<p>Hello {{Name}}</p>",
            "substitutions": { "Name": "Ursula" },
            "tags": ["welcome"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "job_id": "1a2b" })),
        )
        .expect(1)
        .mount(&app.endpoint)
        .await;

    let request = SendEmailRequest {
        to_email: "ursula@example.com".into(),
        to_name: Some("Ursula".into()),
        subject: subject.clone(),
        body_html: "<p>Hello {{Name}}</p>".into(),
        substitutions: Some([("Name".to_string(), json!("Ursula"))].into()),
        tags: Some(vec!["welcome".into()]),
    };

    let response = assert_ok!(app.email_client().send_email(&request).await);
    assert_eq!(response.job_id.as_deref(), Some("1a2b"));
}

#[tokio::test]
async fn send_template_success_clears_a_previous_error() {
    let app = spawn_app().await;

    Mock::given(query_param("action", "send-template"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "template not found" })))
        .up_to_n_times(1)
        .mount(&app.endpoint)
        .await;
    Mock::given(query_param("action", "send-template"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "job_id": "t-1" })))
        .mount(&app.endpoint)
        .await;

    let client = app.email_client();
    let request = SendTemplateRequest {
        to_email: "a@b.com".into(),
        template_id: "welcome".into(),
        ..Default::default()
    };

    assert_err!(client.send_template(&request).await);
    assert_eq!(client.error().as_deref(), Some("template not found"));

    assert_ok!(client.send_template(&request).await);
    assert_none!(client.error());
}
