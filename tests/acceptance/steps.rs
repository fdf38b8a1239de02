use crate::IssuedumpWorld;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use issuedump::config::ExportConfig;
use issuedump::github::issues::{IssueFetcher, issues_only};
use issuedump::github::mock::{MockTransport, json_page};
use issuedump::transform::normalize_all;
use issuedump::RepositoryRef;
use serde_json::json;

fn run_binary(world: &mut IssuedumpWorld, args: &[&str]) {
    let workdir = tempfile::tempdir().expect("Failed to create working directory for test");
    let mut command = std::process::Command::new(env!("CARGO_BIN_EXE_issuedump"));
    command
        .args(args)
        .current_dir(workdir.path())
        .env("ISSUEDUMP_API_URL", "http://127.0.0.1:9");
    if world.without_token {
        command.env_remove("GITHUB_TOKEN");
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute issuedump: {}", e));

    world.captured_output = [output.stdout, output.stderr].concat();
    world.command_status = Some(output.status);
}

#[given("no access token is configured")]
async fn given_no_access_token(world: &mut IssuedumpWorld) {
    world.without_token = true;
}

#[when("I run `issuedump` without arguments")]
async fn when_run_without_arguments(world: &mut IssuedumpWorld) {
    run_binary(world, &[]);
}

#[when(regex = r#"^I run `issuedump ([^`]*)`$"#)]
async fn when_run_issuedump(world: &mut IssuedumpWorld, args: String) {
    let args: Vec<&str> = args.split_whitespace().collect();
    run_binary(world, &args);
}

#[then(regex = r#"^the command should fail with a message containing "(.*)"$"#)]
async fn then_command_fails(world: &mut IssuedumpWorld, expected: String) {
    let output = String::from_utf8(world.captured_output.clone()).expect("Invalid UTF-8");
    assert!(
        output.contains(&expected),
        "Expected output to contain '{}', but got:\n---\n{}\n---",
        expected,
        output
    );
    assert!(
        world.command_status.is_some_and(|s| !s.success()),
        "Command should have failed but exited with: {:?}",
        world.command_status
    );
}

#[then(regex = r#"^the command should succeed with a message containing "(.*)"$"#)]
async fn then_command_succeeds(world: &mut IssuedumpWorld, expected: String) {
    let output = String::from_utf8(world.captured_output.clone()).expect("Invalid UTF-8");
    assert!(
        output.contains(&expected),
        "Expected output to contain '{}', but got:\n---\n{}\n---",
        expected,
        output
    );
    assert!(
        world.command_status.is_some_and(|s| s.success()),
        "Command failed with status: {:?}",
        world.command_status
    );
}

#[given("the first page has no Link header")]
async fn given_no_link_header(world: &mut IssuedumpWorld) {
    world.first_page_link = None;
}

#[given(regex = r#"^the first page has the Link header '(.*)'$"#)]
async fn given_link_header(world: &mut IssuedumpWorld, link: String) {
    world.first_page_link = Some(link);
}

#[given("the API rejects the credential")]
async fn given_api_rejects_credential(world: &mut IssuedumpWorld) {
    world.reject_credential = true;
}

#[given("every page returns the issues:")]
async fn given_every_page_returns(world: &mut IssuedumpWorld, step: &Step) {
    let table = step.table.as_ref().expect("Expected a table of issues");
    let header = &table.rows[0];
    let column = |name: &str| header.iter().position(|h| h == name);

    world.page_records = table.rows[1..]
        .iter()
        .map(|row| {
            let cell = |name: &str| column(name).map(|i| row[i].trim().to_string());
            let number: u64 = cell("number")
                .and_then(|n| n.parse().ok())
                .expect("number column required");
            let labels: Vec<serde_json::Value> = cell("labels")
                .unwrap_or_default()
                .split(',')
                .filter(|name| !name.is_empty())
                .map(|name| json!({ "name": name }))
                .collect();

            let mut issue = json!({
                "number": number,
                "title": cell("title").unwrap_or_default(),
                "comments": 0,
                "body": "",
                "updated_at": "2024-01-02T00:00:00Z",
                "created_at": "2024-01-01T00:00:00Z",
                "state": "open",
                "labels": labels,
                "html_url": format!("https://github.com/o/r/issues/{}", number),
                "url": format!("https://api.github.com/repos/o/r/issues/{}", number),
            });
            if let Some(milestone) = cell("milestone").filter(|m| !m.is_empty()) {
                issue["milestone"] = json!({ "title": milestone });
            }
            if cell("pull_request").as_deref() == Some("yes") {
                issue["pull_request"] = json!({ "url": "https://api.github.com/repos/o/r/pulls/1" });
            }
            issue
        })
        .collect();
}

#[when("the issues are fetched")]
async fn when_issues_are_fetched(world: &mut IssuedumpWorld) {
    let link = world.first_page_link.clone();
    let body = serde_json::Value::Array(world.page_records.clone());
    let reject = world.reject_credential;

    let transport = MockTransport::new(move |page| {
        if reject {
            return Ok(json_page(401, None, &json!({ "message": "Bad credentials" })));
        }
        let link = if page == 1 { link.clone() } else { None };
        Ok(json_page(200, link, &body))
    });
    let fetcher = IssueFetcher::new(transport, ExportConfig::default());

    let result = fetcher
        .fetch_all(&RepositoryRef::new("o", "r"), "test-token")
        .await
        .map_err(|e| e.to_string());

    if let Ok(raw) = &result {
        world.issues = issues_only(raw.clone());
        world.normalized = normalize_all(&world.issues).expect("Records should normalize");
    }
    world.fetch_result = Some(result);
}

#[then(regex = r#"^(\d+) raw records should be fetched$"#)]
async fn then_raw_records_fetched(world: &mut IssuedumpWorld, count: usize) {
    let raw = world
        .fetch_result
        .as_ref()
        .expect("Fetch was not run")
        .as_ref()
        .expect("Fetch should succeed");
    assert_eq!(raw.len(), count);
}

#[then(regex = r#"^(\d+) issues should remain after filtering$"#)]
async fn then_issues_remain(world: &mut IssuedumpWorld, count: usize) {
    assert_eq!(world.issues.len(), count);
}

#[then(regex = r#"^(\d+) normalized records should be produced$"#)]
async fn then_normalized_produced(world: &mut IssuedumpWorld, count: usize) {
    assert_eq!(world.normalized.len(), count);
}

#[then(regex = r#"^the fetch should fail with "(.*)"$"#)]
async fn then_fetch_fails(world: &mut IssuedumpWorld, expected: String) {
    match world.fetch_result.as_ref().expect("Fetch was not run") {
        Ok(raw) => panic!("Fetch should have failed but returned {} records", raw.len()),
        Err(message) => assert!(
            message.contains(&expected),
            "Expected error containing '{}', got '{}'",
            expected,
            message
        ),
    }
}

#[then(regex = r#"^normalized issue (\d+) should have labels "(.*)" and milestone "(.*)"$"#)]
async fn then_normalized_issue_has(
    world: &mut IssuedumpWorld,
    number: u64,
    labels: String,
    milestone: String,
) {
    let issue = world
        .normalized
        .iter()
        .find(|issue| issue.number == number)
        .unwrap_or_else(|| panic!("Issue {} not found", number));
    assert_eq!(issue.labels, labels);
    assert_eq!(issue.milestone_title, milestone);
}
