use burwood_api::{ACCESS_TOKEN_HEADER, PortalClient};
use burwood_provider::resources::HierarchyConfig;
use burwood_provider::{Provider, ProviderConfig, ProviderError, parse_manifest};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> Provider {
    Provider::from_client(PortalClient::with_token(&server.uri(), "tok-123").expect("client"))
}

const PROJECT_WITH_BUDGET: &str = r#"
projects:
  - projectid: p-1
    projectname: Genomics
    departmentid: "12"
    latestbudget:
      - amount: 500
        billingaccountid: 0000-AAAA
        ponumber: PO-1
"#;

#[tokio::test]
async fn configure_signs_in_when_credentials_are_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(basic_auth("ops", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig {
        host: Some(server.uri()),
        username: Some("ops".into()),
        password: Some("hunter2".into()),
    };
    let provider = Provider::configure(&config).await.expect("configure");
    assert!(provider.client().has_token());
}

#[tokio::test]
async fn configure_reports_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("locked"))
        .mount(&server)
        .await;

    let config = ProviderConfig {
        host: Some(server.uri()),
        username: Some("ops".into()),
        password: Some("hunter2".into()),
    };
    let error = Provider::configure(&config).await.expect_err("403");
    assert!(matches!(error, ProviderError::Authentication(_)));
    assert!(error.to_string().contains("status: 403, body: locked"));
}

#[tokio::test]
async fn project_create_posts_project_then_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/project/p-1"))
        .and(header(ACCESS_TOKEN_HEADER, "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projectid": "p-1",
            "projectname": "Genomics",
            "aftercredits": "Suspend",
            "departmentid": "12",
            "departmentname": "Physics",
            "totalbudget": "0.00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/project/p-1/add_budget"))
        .and(body_json(json!({
            "ponumber": "PO-1",
            "grant": "",
            "amount": 500,
            "billingaccountid": "0000-AAAA",
            "expirationdate": "",
            "datesuspended": "",
            "dateactivated": "",
            "dateissued": "",
            "state": "Future",
            "recurring": false,
            "actualspend": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = parse_manifest(PROJECT_WITH_BUDGET).expect("manifest");
    let provider = provider_for(&server);
    let state = provider
        .projects()
        .create_or_update(&manifest.projects[0])
        .await
        .expect("create");

    assert_eq!(state.id, "p-1");
    assert_eq!(state.project.department_name, "Physics");
    assert_eq!(state.latest_budget.expect("budget").amount, 500);
}

#[tokio::test]
async fn multiple_budgets_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    let manifest = parse_manifest(
        r#"
projects:
  - projectid: p-1
    departmentid: "12"
    latestbudget:
      - { amount: 1, billingaccountid: a }
      - { amount: 2, billingaccountid: b }
"#,
    )
    .expect("manifest");

    let provider = provider_for(&server);
    let error = provider
        .projects()
        .create_or_update(&manifest.projects[0])
        .await
        .expect_err("two budgets");
    assert!(matches!(error, ProviderError::MultipleBudgets { count: 2 }));

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn budget_failure_leaves_project_written() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projectid": "p-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/project/p-1/add_budget"))
        .respond_with(ResponseTemplate::new(400).set_body_string("billing account unknown"))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = parse_manifest(PROJECT_WITH_BUDGET).expect("manifest");
    let error = provider_for(&server)
        .projects()
        .create_or_update(&manifest.projects[0])
        .await
        .expect_err("budget rejected");

    let message = error.to_string();
    assert!(message.contains("error creating budget for project p-1"), "{message}");
    assert!(message.contains("status: 400, body: billing account unknown"), "{message}");
    assert_eq!(error.portal_error().and_then(|source| source.status()), Some(400));
}

#[tokio::test]
async fn read_fetches_latest_budget_for_existing_project() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projectid": "p-1", "totalbudget": "750.00" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/project/p-1/budgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ponumber": "old", "amount": 250 },
            { "ponumber": "new", "amount": 500, "actualspend": 12.25 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = provider_for(&server).projects().read("p-1").await.expect("read");
    assert!(state.exists());
    assert_eq!(state.project.total_budget, "750.00");
    let latest = state.latest_budget.expect("latest");
    assert_eq!(latest.po_number, "new");
    assert_eq!(latest.actual_spend, 12.25);
}

#[tokio::test]
async fn read_of_empty_record_skips_budget_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/project/ghost/budgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let state = provider_for(&server).projects().read("ghost").await.expect("read");
    assert!(!state.exists());
    assert_eq!(state.id, "ghost");
    assert!(state.latest_budget.is_none());
}

#[tokio::test]
async fn budgets_failure_keeps_portal_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/p-1/budgets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;

    let error = provider_for(&server).projects().budgets("p-1").await.expect_err("401");
    assert!(error.to_string().contains("error retrieving budgets for project p-1"));
    let source = error.portal_error().expect("portal error");
    assert_eq!(source.status(), Some(401));
    assert!(source.hint().is_some_and(|hint| hint.contains("Unauthorized")));
}

#[tokio::test]
async fn budgets_lists_every_entry_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/p-1/budgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ponumber": "old", "amount": 250 },
            { "ponumber": "new", "amount": 500 }
        ])))
        .mount(&server)
        .await;

    let budgets = provider_for(&server).projects().budgets("p-1").await.expect("budgets");
    let numbers: Vec<_> = budgets.iter().map(|budget| budget.po_number.as_str()).collect();
    assert_eq!(numbers, ["old", "new"]);
}

#[tokio::test]
async fn delete_returns_echoed_project() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projectid": "p-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = provider_for(&server).projects().delete("p-1").await.expect("delete");
    assert_eq!(deleted.project_id, "p-1");
}

#[tokio::test]
async fn hierarchy_apply_and_data_source_read() {
    let server = MockServer::start().await;
    let remote = json!([
        { "groupname": "Research", "groupid": "1", "departments": [
            { "departmentname": "Physics", "departmentid": "12", "projects": [{ "projectid": "p-1" }] }
        ]}
    ]);
    Mock::given(method("POST"))
        .and(path("/api/group_hierarchy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/group_hierarchy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let config = HierarchyConfig::from_value(json!({
        "groups": [{ "groupid": "1", "departments": [{ "departmentid": "12", "projects": [{ "projectid": "p-1" }] }] }]
    }))
    .expect("config");

    let applied = provider.group_hierarchy().apply(&config).await.expect("apply");
    assert_eq!(applied.groups[0].group_name, "Research");
    assert!(applied.id.parse::<i64>().is_ok());

    let read = provider.group_hierarchy().read().await.expect("resource read");
    let data = provider.hierarchy_data_source().read().await.expect("data source read");
    assert_eq!(read.groups, data.groups);
    assert_eq!(data.groups[0].departments[0].department_name, "Physics");

    provider.group_hierarchy().delete();
}

#[tokio::test]
async fn apply_manifest_posts_hierarchy_before_projects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/group_hierarchy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projectid": "p-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = parse_manifest(
        r#"
hierarchy:
  groups: []
projects:
  - projectid: p-1
    departmentid: "12"
"#,
    )
    .expect("manifest");

    let applied = provider_for(&server).apply_manifest(&manifest).await.expect("apply");
    assert!(applied.hierarchy.is_some());
    assert_eq!(applied.projects.len(), 1);

    let received = server.received_requests().await.unwrap_or_default();
    let paths: Vec<_> = received.iter().map(|request| request.url.path().to_string()).collect();
    assert_eq!(paths, ["/api/group_hierarchy", "/api/project/p-1"]);
}

#[tokio::test]
async fn apply_manifest_with_invalid_later_block_sends_nothing() {
    let server = MockServer::start().await;
    let manifest = parse_manifest(
        r#"
projects:
  - projectid: p-1
    departmentid: "12"
  - projectid: p-2
    departmentid: "12"
    latestbudget:
      - { amount: 1, billingaccountid: a }
      - { amount: 2, billingaccountid: b }
"#,
    )
    .expect("manifest");

    let error = provider_for(&server).apply_manifest(&manifest).await.expect_err("invalid");
    assert!(matches!(error, ProviderError::MultipleBudgets { .. }));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
