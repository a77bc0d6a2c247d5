use httpmock::prelude::*;
use invoice_merge::adapters::StaticTokenProvider;
use invoice_merge::utils::validation::Validate;
use invoice_merge::{
    GoogleDocsClient, GoogleDriveClient, GoogleSheetsClient, InvoiceEngine, InvoicePipeline,
    JobConfig,
};

fn job_config(server: &MockServer) -> JobConfig {
    let toml_content = format!(
        r#"
[source]
spreadsheet_id = "sheet123"

[template]
document_id = "template456"
folder_id = "folder789"

[auth]
credentials_path = "/tmp/test-creds.json"

[endpoints]
sheets_url = "{base}"
drive_url = "{base}"
docs_url = "{base}"
"#,
        base = server.base_url()
    );

    let config = JobConfig::from_toml_str(&toml_content).unwrap();
    config.validate().unwrap();
    config
}

fn mock_sheets(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/sheet123/values/Package_Meta");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "range": "Package_Meta!A1:E2",
                "values": [
                    ["Package_Number", "Customer_Name", "Customer_Email", "Order_Date", "Shipping_Address"],
                    ["1", "Alice", "a@x.com", "2024-01-01", "Addr1"]
                ]
            }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/sheet123/values/Package_Contents");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "range": "Package_Contents!A1:I4",
                "values": [
                    ["Package_Number", "Card", "Set", "Cond.", "Finish", "Lang.", "Amount", "Status", "Date"],
                    ["1", "CardA", "SetX", "NM", "Foil", "EN", "2", "Paid", "2024-01-02"],
                    ["1", "CardB", "SetY", "LP", "Nonfoil", "EN", "3", "Paid", "2024-01-02"],
                    ["99", "Ghost", "SetZ", "NM", "Foil", "EN", "1.5", "Paid", "2024-01-03"]
                ]
            }));
    });
}

fn pipeline_for(
    server: &MockServer,
) -> InvoicePipeline<
    GoogleSheetsClient<StaticTokenProvider>,
    GoogleDriveClient<StaticTokenProvider>,
    GoogleDocsClient<StaticTokenProvider>,
> {
    let config = job_config(server);
    let fetcher = GoogleSheetsClient::with_base_url(
        StaticTokenProvider::new("test-token"),
        config.endpoints.sheets_url.as_deref().unwrap(),
    );
    let copier = GoogleDriveClient::with_base_url(
        StaticTokenProvider::new("test-token"),
        config.endpoints.drive_url.as_deref().unwrap(),
    );
    let replacer = GoogleDocsClient::with_base_url(
        StaticTokenProvider::new("test-token"),
        config.endpoints.docs_url.as_deref().unwrap(),
    );
    InvoicePipeline::new(fetcher, copier, replacer, config)
}

#[tokio::test]
async fn test_end_to_end_run_produces_invoice_per_package() {
    let server = MockServer::start();
    mock_sheets(&server);

    let copy_1 = server.mock(|when, then| {
        when.method(POST)
            .path("/files/template456/copy")
            .json_body_partial(r#"{"name": "Invoice_1"}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "copy-1"}));
    });
    let copy_99 = server.mock(|when, then| {
        when.method(POST)
            .path("/files/template456/copy")
            .json_body_partial(r#"{"name": "Invoice_99"}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "copy-99"}));
    });

    let items_1 = "Card: CardA, Set: SetX, Cond.: NM, Finish: Foil, Lang.: EN, \
                   Amount: 2, Status: Paid, Date: 2024-01-02\n\
                   Card: CardB, Set: SetY, Cond.: LP, Finish: Nonfoil, Lang.: EN, \
                   Amount: 3, Status: Paid, Date: 2024-01-02";
    let expected_fill_1 = serde_json::json!({
        "requests": [
            { "replaceAllText": {
                "containsText": { "text": "{{Customer_Name}}", "matchCase": true },
                "replaceText": "Alice" } },
            { "replaceAllText": {
                "containsText": { "text": "{{Customer_Email}}", "matchCase": true },
                "replaceText": "a@x.com" } },
            { "replaceAllText": {
                "containsText": { "text": "{{Package_Number}}", "matchCase": true },
                "replaceText": "1" } },
            { "replaceAllText": {
                "containsText": { "text": "{{Order_Date}}", "matchCase": true },
                "replaceText": "2024-01-01" } },
            { "replaceAllText": {
                "containsText": { "text": "{{Shipping_Address}}", "matchCase": true },
                "replaceText": "Addr1" } },
            { "replaceAllText": {
                "containsText": { "text": "{{Items}}", "matchCase": true },
                "replaceText": items_1 } },
            { "replaceAllText": {
                "containsText": { "text": "{{Total_Amount}}", "matchCase": true },
                "replaceText": "5" } }
        ]
    });
    let fill_1 = server.mock(|when, then| {
        when.method(POST)
            .path("/documents/copy-1:batchUpdate")
            .json_body_partial(expected_fill_1.to_string());
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"documentId": "copy-1"}));
    });
    // The orphaned package gets empty-string customer substitutions.
    let expected_fill_99 = serde_json::json!({
        "requests": [
            { "replaceAllText": {
                "containsText": { "text": "{{Customer_Name}}", "matchCase": true },
                "replaceText": "" } }
        ]
    });
    let fill_99 = server.mock(|when, then| {
        when.method(POST)
            .path("/documents/copy-99:batchUpdate")
            .json_body_partial(expected_fill_99.to_string());
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"documentId": "copy-99"}));
    });

    let engine = InvoiceEngine::new(pipeline_for(&server));
    let report = engine.run().await.unwrap();

    assert_eq!(report.succeeded, vec!["1", "99"]);
    assert!(report.is_clean());

    copy_1.assert();
    copy_99.assert();
    fill_1.assert();
    fill_99.assert();
}

#[tokio::test]
async fn test_one_failing_package_does_not_abort_the_run() {
    let server = MockServer::start();
    mock_sheets(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/files/template456/copy")
            .json_body_partial(r#"{"name": "Invoice_1"}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "copy-1"}));
    });
    // Copying package 99 hits a quota error; its filled copy never happens.
    server.mock(|when, then| {
        when.method(POST)
            .path("/files/template456/copy")
            .json_body_partial(r#"{"name": "Invoice_99"}"#);
        then.status(429).body("Rate limit exceeded");
    });
    server.mock(|when, then| {
        when.method(POST).path("/documents/copy-1:batchUpdate");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"documentId": "copy-1"}));
    });

    let engine = InvoiceEngine::new(pipeline_for(&server));
    let report = engine.run().await.unwrap();

    assert_eq!(report.succeeded, vec!["1"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].package_number, "99");
    assert!(report.failed[0].reason.contains("429"));
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_any_document() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/sheet123/values/Package_Meta");
        then.status(401).body("Invalid Credentials");
    });

    let copy_mock = server.mock(|when, then| {
        when.method(POST).path("/files/template456/copy");
        then.status(200)
            .json_body(serde_json::json!({"id": "never"}));
    });

    let engine = InvoiceEngine::new(pipeline_for(&server));
    let err = engine.run().await.unwrap_err();

    assert!(err.to_string().contains("401"));
    copy_mock.assert_hits(0);
}
