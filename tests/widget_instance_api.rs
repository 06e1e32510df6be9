mod common;

use axum::http::StatusCode;
use common::{TestApp, admin_form, body_json, body_string};
use storefront_backend::features::widget::WidgetInstance;

const MISSING_INFO: &str =
    "We cannot create the widget instance because it is missing required information.";

#[tokio::test]
async fn valid_submission_returns_error_false_without_html() {
    let t = TestApp::new().await;
    let resp = t
        .send(admin_form(
            "/admin/widget_instance/validate",
            "code=cms_page_link&theme_id=3",
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_string(resp).await, r#"{"error":false}"#);
}

#[tokio::test]
async fn missing_theme_returns_rendered_error_block() {
    let t = TestApp::new().await;
    let resp = t
        .send(admin_form(
            "/admin/widget_instance/validate",
            "code=cms_page_link&theme_id=",
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["error"], true);
    let html = json["html_message"].as_str().expect("html_message");
    assert!(html.starts_with("<div class=\"messages\">"));
    assert!(html.contains("message-error"));
    assert!(html.contains(MISSING_INFO));
}

#[tokio::test]
async fn unknown_widget_code_cannot_be_created() {
    let t = TestApp::new().await;
    let json = body_json(
        t.send(admin_form(
            "/admin/widget_instance/validate",
            "code=does_not_exist&theme_id=3",
        ))
        .await,
    )
    .await;
    assert_eq!(json["error"], true);
    assert!(json["html_message"].as_str().unwrap().contains(MISSING_INFO));
}

#[tokio::test]
async fn unknown_instance_id_asks_for_correct_widget() {
    let t = TestApp::new().await;
    let json = body_json(
        t.send(admin_form("/admin/widget_instance/validate", "instance_id=999"))
            .await,
    )
    .await;
    assert_eq!(json["error"], true);
    assert!(
        json["html_message"]
            .as_str()
            .unwrap()
            .contains("Please specify a correct widget.")
    );
}

#[tokio::test]
async fn stored_instance_validates_by_id() {
    let t = TestApp::new().await;
    let id = t
        .state
        .widget_storage
        .insert(&WidgetInstance::new(
            Some(r"Cms\Block\Widget\Page\Link".into()),
            Some("cms_page_link".into()),
            Some(1),
        ))
        .await
        .expect("insert");

    let resp = t
        .send(admin_form(
            "/admin/widget_instance/validate",
            &format!("instance_id={id}"),
        ))
        .await;
    assert_eq!(body_string(resp).await, r#"{"error":false}"#);
}

#[tokio::test]
async fn messages_are_rendered_in_configured_locale() {
    let t = TestApp::with_config(|cfg| {
        cfg.i18n.locale = "fr_FR".into();
        let dict = std::path::Path::new(&cfg.resources.base_path).join("i18n/fr_FR.csv");
        std::fs::write(
            dict,
            format!("\"{MISSING_INFO}\",\"Informations requises manquantes.\"\n"),
        )
        .expect("write dictionary");
    })
    .await;
    let json = body_json(
        t.send(admin_form("/admin/widget_instance/validate", "theme_id=1"))
            .await,
    )
    .await;
    let html = json["html_message"].as_str().unwrap();
    assert!(html.contains("Informations requises manquantes."));
    assert!(!html.contains(MISSING_INFO));
}

#[tokio::test]
async fn inline_translation_wraps_messages_in_translate_spans() {
    let t = TestApp::with_config(|cfg| cfg.i18n.inline_translation = true).await;
    let json = body_json(
        t.send(admin_form("/admin/widget_instance/validate", "theme_id=1"))
            .await,
    )
    .await;
    let html = json["html_message"].as_str().unwrap();
    assert!(html.contains("<span data-translate="));
    assert!(!html.contains("{{{"));
}

#[tokio::test]
async fn save_inserts_then_updates() {
    let t = TestApp::new().await;
    let created = t
        .send(admin_form(
            "/admin/widget_instance/save",
            "code=cms_page_link&theme_id=2&title=Footer&store_ids=0,1&widget_parameters=%7B%22page_id%22%3A%225%22%7D",
        ))
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let id = body_json(created).await["instance_id"]
        .as_i64()
        .expect("instance_id");

    let stored = t
        .state
        .widget_storage
        .load(id)
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(stored.title.as_deref(), Some("Footer"));
    assert_eq!(stored.store_ids, vec![0, 1]);
    assert_eq!(stored.widget_parameters["page_id"], "5");

    let updated = t
        .send(admin_form(
            "/admin/widget_instance/save",
            &format!("instance_id={id}&sort_order=4"),
        ))
        .await;
    assert_eq!(body_json(updated).await["instance_id"], id);
    let reloaded = t.state.widget_storage.load(id).await.unwrap().unwrap();
    assert_eq!(reloaded.sort_order, 4);
    assert_eq!(reloaded.title.as_deref(), Some("Footer"));
}

#[tokio::test]
async fn save_rejects_incomplete_instance_with_problem_json() {
    let t = TestApp::new().await;
    let resp = t
        .send(admin_form("/admin/widget_instance/save", "code=cms_page_link"))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let problem = body_json(resp).await;
    assert_eq!(problem["code"], "VALIDATION_FAILED");
    assert!(problem["detail"].as_str().unwrap().contains(MISSING_INFO));
}
