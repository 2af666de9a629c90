//! Facade selection from configuration and end-to-end scenarios

use crate::integration::mock_server::MockServerFixture;
use newsletter::{DriverKind, Error, InvalidNewsletterList, Newsletter, NewsletterConfig, Options};
use serde_json::{json, Value};

fn config_for(driver: &str, base_url: &str) -> NewsletterConfig {
    NewsletterConfig::from_yaml_str(&format!(
        r#"
driver: {driver}
defaultList: list1
lists:
  list1:
    id: 123
  list2:
    id: 456
mailchimp:
  apiKey: test-us10
  base_url: "{base_url}"
mailjet:
  key: public
  secret: private
  base_url: "{base_url}"
"#
    ))
    .unwrap()
}

#[tokio::test]
async fn test_selects_driver_from_config() {
    let fixture = MockServerFixture::new().await;

    let cases = [
        ("mailchimp", "mailchimp", true),
        ("mailjet", "mailjet", true),
        ("log", "null", false),
        ("null", "null", false),
    ];
    for (driver, provider, enabled) in cases {
        let newsletter = Newsletter::from_config(&config_for(driver, &fixture.base_url)).unwrap();
        assert_eq!(newsletter.provider_id(), provider, "driver {driver}");
        assert_eq!(newsletter.is_enabled(), enabled, "driver {driver}");
    }
}

#[tokio::test]
async fn test_log_driver_records_calls() {
    let fixture = MockServerFixture::new().await;
    let newsletter = Newsletter::from_config(&config_for("log", &fixture.base_url)).unwrap();
    match &newsletter {
        Newsletter::Null(driver) => assert!(driver.logs_calls()),
        other => panic!("expected null driver, got {other:?}"),
    }
    assert!(newsletter.api().is_none());
}

#[test]
fn test_missing_credentials_block() {
    let config = NewsletterConfig::from_yaml_str(
        r#"
driver: mailjet
defaultList: subscribers
lists:
  subscribers:
    id: 1
"#,
    )
    .unwrap();

    let err = Newsletter::from_config(&config).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("mailjet")
    );
}

#[test]
fn test_empty_lists_rejected_when_driver_enabled() {
    let mut config = NewsletterConfig::from_yaml_str(
        r#"
driver: mailchimp
defaultList: subscribers
lists: {}
mailchimp:
  apiKey: test-us10
"#,
    )
    .unwrap();
    assert!(config.lists.lists.is_empty());

    let err = Newsletter::from_config(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidList(InvalidNewsletterList::NoListsDefined)
    ));

    // a disabled newsletter never looks at the lists
    config.driver = DriverKind::Null;
    assert!(!Newsletter::from_config(&config).unwrap().is_enabled());
}

#[tokio::test]
async fn test_disabled_newsletter_is_a_noop() {
    let mut fixture = MockServerFixture::new().await;
    let guards = fixture.mock_no_requests().await;

    let newsletter = Newsletter::disabled();
    let options = Options::new();
    let email = "ada@example.com";

    assert_eq!(newsletter.subscribe(email, &options, "").await.unwrap(), Value::Null);
    assert_eq!(newsletter.subscribe_pending(email, &options, "").await.unwrap(), Value::Null);
    assert_eq!(newsletter.subscribe_or_update(email, &options, "anything").await.unwrap(), Value::Null);
    assert_eq!(newsletter.add_member(email, &options, "").await.unwrap(), Value::Null);
    assert_eq!(newsletter.get_members("", &options).await.unwrap(), json!([]));
    assert_eq!(newsletter.get_member(email, "").await.unwrap(), Value::Null);
    assert_eq!(newsletter.get_member_activity(email, "").await.unwrap(), Value::Null);
    assert!(!newsletter.has_member(email, "").await.unwrap());
    assert!(!newsletter.is_subscribed(email, "").await.unwrap());
    assert_eq!(newsletter.unsubscribe(email, "").await.unwrap(), Value::Null);
    assert_eq!(
        newsletter.update_email_address(email, "new@example.com", "").await.unwrap(),
        Value::Null
    );
    assert_eq!(newsletter.delete(email, "").await.unwrap(), Value::Null);

    for guard in guards {
        guard.assert_async().await;
    }
}

#[tokio::test]
async fn test_mailchimp_lists_route_to_their_ids() {
    let mut fixture = MockServerFixture::new().await;
    let list1 = fixture
        .server
        .mock("POST", "/lists/123/members")
        .expect(2)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"list_id": "123"}).to_string())
        .create_async()
        .await;
    let list2 = fixture
        .mock_json_response("POST", "/lists/456/members", None, 200, json!({"list_id": "456"}))
        .await;

    let newsletter = Newsletter::from_config(&config_for("mailchimp", &fixture.base_url)).unwrap();
    let options = Options::new();

    let first = newsletter.subscribe("a@example.com", &options, "list1").await.unwrap();
    let default = newsletter.subscribe("b@example.com", &options, "").await.unwrap();
    let second = newsletter.subscribe("c@example.com", &options, "list2").await.unwrap();

    assert_eq!(first["list_id"], "123");
    assert_eq!(default["list_id"], "123");
    assert_eq!(second["list_id"], "456");
    list1.assert_async().await;
    list2.assert_async().await;
}

#[tokio::test]
async fn test_mailjet_lists_route_to_their_ids() {
    let mut fixture = MockServerFixture::new().await;
    let list1 = fixture
        .mock_json_response("POST", "/contactslist/123/managecontact", None, 201, json!({"Data": []}))
        .await;
    let list2 = fixture
        .mock_json_response("POST", "/contactslist/456/managecontact", None, 201, json!({"Data": []}))
        .await;

    let newsletter = Newsletter::from_config(&config_for("mailjet", &fixture.base_url)).unwrap();

    newsletter.unsubscribe("a@example.com", "").await.unwrap();
    newsletter.unsubscribe("a@example.com", "list2").await.unwrap();

    list1.assert_async().await;
    list2.assert_async().await;
}

#[tokio::test]
async fn test_unknown_list_through_facade() {
    let fixture = MockServerFixture::new().await;
    let newsletter = Newsletter::from_config(&config_for("mailjet", &fixture.base_url)).unwrap();

    let err = newsletter
        .subscribe("a@example.com", &Options::new(), "list3")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid newsletter list: There is no list named `list3`."
    );
}

#[test]
fn test_environment_selects_driver_and_list_id() {
    let config = NewsletterConfig::from_yaml_str(
        r#"
defaultList: subscribers
lists:
  subscribers:
    id: ""
"#,
    )
    .unwrap()
    .apply_overrides_from(|key| match key {
        "MAIL_NEWSLETTER_DRIVER" => Some("mailjet".to_string()),
        "MAIL_NEWSLETTER_LIST_ID" => Some("789".to_string()),
        "MJ_APIKEY_PUBLIC" => Some("public".to_string()),
        "MJ_APIKEY_PRIVATE" => Some("private".to_string()),
        _ => None,
    });

    let newsletter = Newsletter::from_config(&config).unwrap();
    match &newsletter {
        Newsletter::Mailjet(driver) => {
            assert_eq!(driver.lists().default().unwrap().id(), "789");
        }
        other => panic!("expected mailjet driver, got {other:?}"),
    }
}
