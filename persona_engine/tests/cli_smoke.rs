use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
}

#[test]
fn cli_boots_switches_and_writes_summary() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    write(
        root,
        "config.json",
        r#"{
            "script_dirs": ["shared"],
            "menu_title": "Personas",
            "environments": [
                { "id": "alice", "default": true, "script_dirs": ["alice"],
                  "autorun": ["main"], "models": ["alice"] },
                { "id": "bob", "script_dirs": ["bob"], "autorun": ["main"],
                  "models": ["bob"] },
                { "id": "root" }
            ]
        }"#,
    )?;
    write(
        root,
        "alice/main.lua",
        r#"
        local util = require("util")
        models.alice.head:setPos(util.offset, 0, 0)
        events.TICK:register(function() store:set("alice_ticks", (store:get("alice_ticks") or 0) + 1) end)
        "#,
    )?;
    write(root, "bob/main.lua", "nameplate.CHAT:setText('Bob')")?;
    write(root, "shared/util.lua", "return { offset = 4 }")?;

    let summary_path = root.join("summary.json");
    let output = Command::new(env!("CARGO_BIN_EXE_persona_engine"))
        .arg("--config")
        .arg(root.join("config.json"))
        .args(["--ticks", "2", "--switch", "bob", "--switch", "alice"])
        .arg("--summary-json")
        .arg(&summary_path)
        .output()
        .context("running persona_engine")?;
    assert!(
        output.status.success(),
        "persona_engine failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Active environment: alice"), "{stdout}");

    let summary: Value = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    assert_eq!(summary["active"], "alice");
    let ids: Vec<&str> = summary["environments"]
        .as_array()
        .context("environments array")?
        .iter()
        .filter_map(|env| env["id"].as_str())
        .collect();
    assert_eq!(ids, ["root", "alice", "bob"]);
    assert_eq!(summary["host"]["parts"]["alice.head.pos"]["x"].as_f64(), Some(4.0));
    // Two ticks after boot plus two after switching back; none while bob was active.
    assert_eq!(summary["host"]["store"]["alice_ticks"].as_f64(), Some(4.0));
    assert!(summary["host"]["nameplate"].as_object().map_or(true, |m| m.is_empty()));
    Ok(())
}

#[test]
fn cli_fails_when_nothing_registers() -> Result<()> {
    let temp = tempdir()?;
    write(
        temp.path(),
        "config.json",
        r#"{ "environments": [ { "id": "root" }, { "id": "bad id" } ] }"#,
    )?;
    let output = Command::new(env!("CARGO_BIN_EXE_persona_engine"))
        .arg("--config")
        .arg(temp.path().join("config.json"))
        .output()
        .context("running persona_engine")?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no environment"), "{stderr}");
    Ok(())
}
