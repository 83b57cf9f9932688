use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("partcat-cli")?)
}

fn new_workspace(root: &Path) -> Result<(), Box<dyn Error>> {
    cli()?.args(["new", root.to_str().unwrap()]).assert().success();
    Ok(())
}

fn workspace_cli(root: &Path, args: &[&str]) -> Result<Command, Box<dyn Error>> {
    let mut command = cli()?;
    command.args(["--workspace", root.to_str().unwrap()]);
    command.args(args);
    Ok(command)
}

fn component_dir(root: &Path, name: &str) -> PathBuf {
    root.join("components").join(name)
}

#[test]
fn component_lifecycle_new_set_show() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;

    workspace_cli(&root, &["component", "new", "R1"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Created component 'R1'"));
    assert!(component_dir(&root, "R1").join("MANIFEST").is_file());
    assert!(component_dir(&root, "R1").join("QUANTITY").is_file());

    workspace_cli(
        &root,
        &["component", "set", "R1", "--quantity", "47", "--notes", "hand matched"],
    )?
    .assert()
    .success();

    let quantity = fs::read_to_string(component_dir(&root, "R1").join("QUANTITY"))?;
    assert_eq!(quantity.trim(), "47");

    workspace_cli(&root, &["show", "R1"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Quantity: 47"))
        .stdout(predicate::str::contains("hand matched"));
    Ok(())
}

#[test]
fn property_add_applies_the_human_name_transform() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;
    workspace_cli(&root, &["component", "new", "R1"])?.assert().success();

    workspace_cli(&root, &["property", "add", "R1", "Tolerance", "5%"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Value-Tolerance"));

    let manifest = fs::read_to_string(component_dir(&root, "R1").join("MANIFEST"))?;
    assert!(manifest.contains("Value-Tolerance: 5%"));

    // Reserved keys are stored without the prefix.
    workspace_cli(&root, &["property", "add", "R1", "Category", "Resistors"])?
        .assert()
        .success();
    let manifest = fs::read_to_string(component_dir(&root, "R1").join("MANIFEST"))?;
    assert!(manifest.contains("Category: Resistors"));
    assert!(!manifest.contains("Value-Category"));

    // The detail view renders the human name.
    workspace_cli(&root, &["show", "R1"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Tolerance: 5%"))
        .stdout(predicate::str::contains("Category: Resistors"));
    Ok(())
}

#[test]
fn property_set_and_remove_edit_the_manifest() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;
    workspace_cli(&root, &["component", "new", "R1"])?.assert().success();
    workspace_cli(&root, &["property", "add", "R1", "--raw", "Value-Tolerance", "5%"])?
        .assert()
        .success();

    workspace_cli(&root, &["property", "set", "R1", "0", "1%"])?
        .assert()
        .success();
    let manifest = fs::read_to_string(component_dir(&root, "R1").join("MANIFEST"))?;
    assert!(manifest.contains("Value-Tolerance: 1%"));

    workspace_cli(&root, &["property", "remove", "R1", "0"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed property 'Tolerance'"));
    let manifest = fs::read_to_string(component_dir(&root, "R1").join("MANIFEST"))?;
    assert!(!manifest.contains("Tolerance"));

    workspace_cli(&root, &["property", "remove", "R1", "0"])?
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
    Ok(())
}

#[test]
fn rename_onto_an_existing_component_fails_cleanly() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;
    workspace_cli(&root, &["component", "new", "R2"])?.assert().success();
    workspace_cli(&root, &["component", "new", "R2_new"])?.assert().success();
    workspace_cli(&root, &["property", "add", "R2", "Category", "Resistors"])?
        .assert()
        .success();

    workspace_cli(&root, &["component", "rename", "R2", "R2_new"])?
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // The original directory and its contents are untouched.
    let manifest = fs::read_to_string(component_dir(&root, "R2").join("MANIFEST"))?;
    assert!(manifest.contains("Category: Resistors"));

    workspace_cli(&root, &["component", "rename", "R2", "R3"])?
        .assert()
        .success();
    assert!(!component_dir(&root, "R2").exists());
    assert!(component_dir(&root, "R3").join("MANIFEST").is_file());
    Ok(())
}

#[test]
fn save_as_duplicates_a_component() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;
    workspace_cli(&root, &["component", "new", "U1"])?.assert().success();
    workspace_cli(&root, &["property", "add", "U1", "Category", "ICs"])?
        .assert()
        .success();
    workspace_cli(&root, &["component", "set", "U1", "--quantity", "3"])?
        .assert()
        .success();

    workspace_cli(&root, &["component", "save-as", "U1", "U1_spare"])?
        .assert()
        .success();

    // A save-as with the unchanged name is rejected up front.
    workspace_cli(&root, &["component", "save-as", "U1", "U1"])?
        .assert()
        .failure()
        .stderr(predicate::str::contains("already named"));

    assert!(component_dir(&root, "U1").exists());
    workspace_cli(&root, &["show", "U1_spare"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Quantity: 3"))
        .stdout(predicate::str::contains("Category: ICs"));
    Ok(())
}

#[test]
fn delete_requires_confirmation() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let root = tmp.path().join("catalog");
    new_workspace(&root)?;
    workspace_cli(&root, &["component", "new", "R1"])?.assert().success();

    workspace_cli(&root, &["component", "delete", "R1"])?
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert!(component_dir(&root, "R1").exists());

    workspace_cli(&root, &["component", "delete", "R1", "--yes"])?
        .assert()
        .success();
    assert!(!component_dir(&root, "R1").exists());

    workspace_cli(&root, &["list"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace is empty."));
    Ok(())
}
