use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

const ACTOR: &str = "6f1c2a8e-4b7d-4f0e-9a51-2c3d4e5f6a7b";

fn exec(temp: &Path, args: &[&str]) -> Output {
    let db_path = temp.join("leadkeep.sqlite3");
    cargo_bin_cmd!("leadkeep")
        .env("XDG_CONFIG_HOME", temp)
        .args(["--db-path", db_path.to_str().expect("db path")])
        .args(args)
        .output()
        .expect("run command")
}

fn run_cmd_json(temp: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = exec(temp, &full);
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

fn exit_code(temp: &Path, args: &[&str]) -> Option<i32> {
    let output = exec(temp, args);
    assert!(!output.status.success(), "command succeeded: {:?}", output);
    output.status.code()
}

fn add_business_lead(temp: &Path, name: &str) -> String {
    let lead = run_cmd_json(
        temp,
        &["lead", "add", "--name", name, "--entity-type", "business"],
    );
    lead["id"].as_str().expect("lead id").to_string()
}

#[test]
fn lead_contacts_and_conversion_flow() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead_id = add_business_lead(dir, "Acme Corp");
    let owner = format!("lead:{lead_id}");

    run_cmd_json(dir, &["contact", "add", &owner, "--name", "Ann", "--primary"]);
    run_cmd_json(dir, &["contact", "add", &owner, "--name", "Ben", "--primary"]);

    let contacts = run_cmd_json(dir, &["contact", "ls", &owner]);
    let contacts = contacts.as_array().expect("array");
    assert_eq!(contacts.len(), 2);
    let primaries: Vec<&str> = contacts
        .iter()
        .filter(|contact| contact["is_primary"] == true)
        .map(|contact| contact["name"].as_str().expect("name"))
        .collect();
    assert_eq!(primaries, vec!["Ben"]);

    assert_eq!(exit_code(dir, &["lead", "convert", &lead_id]), Some(3));

    run_cmd_json(dir, &["lead", "edit", &lead_id, "--status", "won"]);
    let detail = run_cmd_json(dir, &["lead", "show", &lead_id]);
    assert_eq!(detail["can_be_converted"], true);
    assert_eq!(detail["is_converted"], false);

    let customer = run_cmd_json(dir, &["lead", "convert", &lead_id]);
    assert_eq!(customer["converted_from_lead_id"], lead_id.as_str());
    assert_eq!(customer["status"], "active");

    let detail = run_cmd_json(dir, &["lead", "show", &lead_id]);
    assert_eq!(detail["can_be_converted"], false);
    assert_eq!(detail["is_converted"], true);
    assert_eq!(detail["customer_id"], customer["id"]);

    assert_eq!(exit_code(dir, &["lead", "convert", &lead_id]), Some(3));
}

#[test]
fn individual_owner_rejects_contacts() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead = run_cmd_json(dir, &["lead", "add", "--name", "Ada"]);
    let owner = format!("lead:{}", lead["id"].as_str().expect("id"));

    assert_eq!(
        exit_code(dir, &["contact", "add", &owner, "--name", "Ann"]),
        Some(3)
    );
    let contacts = run_cmd_json(dir, &["contact", "ls", &owner]);
    assert!(contacts.as_array().expect("array").is_empty());
}

#[test]
fn follow_ups_need_an_actor() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead_id = add_business_lead(dir, "Globex");
    let owner = format!("lead:{lead_id}");

    assert_eq!(
        exit_code(dir, &["followup", "add", &owner, "--due", "2099-01-01"]),
        Some(3)
    );

    let follow_up = run_cmd_json(
        dir,
        &[
            "--actor",
            ACTOR,
            "followup",
            "add",
            &owner,
            "--due",
            "2099-01-01 09:30",
            "--notes",
            "send proposal",
        ],
    );
    assert_eq!(follow_up["status"], "pending");
    assert_eq!(follow_up["created_by"], ACTOR);
    let id = follow_up["id"].as_str().expect("id").to_string();

    let done = run_cmd_json(dir, &["--actor", ACTOR, "followup", "done", &id]);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["completed_by"], ACTOR);
    assert!(done["completed_at"].is_number());

    let cancelled = run_cmd_json(dir, &["followup", "cancel", &id]);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["completed_by"], ACTOR);
}

#[test]
fn remind_groups_pending_follow_ups() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead_id = add_business_lead(dir, "Initech");
    let owner = format!("lead:{lead_id}");
    for due in ["2000-01-01", "2099-01-01"] {
        run_cmd_json(
            dir,
            &["--actor", ACTOR, "followup", "add", &owner, "--due", due],
        );
    }

    let output = run_cmd_json(dir, &["remind"]);
    let overdue = output["overdue"].as_array().expect("overdue");
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["owner_name"], "Initech");
    assert!(output["today"].as_array().expect("today").is_empty());
    assert!(output["soon"].as_array().expect("soon").is_empty());
}

#[test]
fn delete_cascades_and_hides_the_lead() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead_id = add_business_lead(dir, "Hooli");
    let owner = format!("lead:{lead_id}");
    run_cmd_json(dir, &["contact", "add", &owner, "--name", "Ann"]);
    run_cmd_json(
        dir,
        &["--actor", ACTOR, "followup", "add", &owner, "--due", "2099-01-01"],
    );

    let summary = run_cmd_json(dir, &["lead", "delete", &lead_id]);
    assert_eq!(summary["contact_persons"], 1);
    assert_eq!(summary["follow_ups"], 1);

    assert_eq!(exit_code(dir, &["lead", "show", &lead_id]), Some(2));
    let deleted = run_cmd_json(dir, &["lead", "list", "--only-deleted"]);
    assert_eq!(deleted.as_array().expect("array").len(), 1);

    run_cmd_json(dir, &["lead", "restore", &lead_id]);
    let detail = run_cmd_json(dir, &["lead", "show", &lead_id]);
    assert!(detail["contacts"].as_array().expect("contacts").is_empty());
}

#[test]
fn customer_back_reference_is_immutable() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();

    let lead_id = add_business_lead(dir, "Umbrella");
    run_cmd_json(dir, &["lead", "edit", &lead_id, "--status", "won"]);
    let customer = run_cmd_json(dir, &["lead", "convert", &lead_id]);
    let customer_id = customer["id"].as_str().expect("id").to_string();

    let other_id = add_business_lead(dir, "Other");
    assert_eq!(
        exit_code(
            dir,
            &["customer", "edit", &customer_id, "--from-lead", &other_id]
        ),
        Some(3)
    );

    run_cmd_json(
        dir,
        &["project", "add", &customer_id, "--name", "Rollout"],
    );
    let summary = run_cmd_json(dir, &["customer", "delete", &customer_id]);
    assert_eq!(summary["projects"], 1);
}

#[cfg(unix)]
#[test]
fn keep_last_contact_config_blocks_removal() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path();
    let config_path = dir.join("config.toml");
    fs::write(&config_path, "[contacts]\nkeep_last_contact = true\n").expect("write config");
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600)).expect("chmod");
    let config = config_path.to_str().expect("config path");

    let lead_id = add_business_lead(dir, "Stark");
    let owner = format!("lead:{lead_id}");
    let contact = run_cmd_json(dir, &["contact", "add", &owner, "--name", "Pepper"]);
    let contact_id = contact["id"].as_str().expect("id").to_string();

    assert_eq!(
        exit_code(dir, &["--config", config, "contact", "rm", &contact_id]),
        Some(3)
    );
    run_cmd_json(dir, &["contact", "rm", &contact_id]);
}
