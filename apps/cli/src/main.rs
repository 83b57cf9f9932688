use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use partcat_catalog::{build_category_tree, Component, Property, Workspace};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "partcat-cli",
    about = "Command-line shell for PartCat component workspaces",
    author,
    version
)]
struct Cli {
    /// 工作區根目錄或 PartCat.pcw 檔案；預設為目前目錄。 / Workspace root or PartCat.pcw file (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立新的 PartCat 工作區。 / Create a new PartCat workspace.
    New(NewArgs),
    /// 列出工作區內的所有元件。 / List every component in the workspace.
    List(ListArgs),
    /// 顯示分類/子分類樹。 / Print the category / sub-category tree.
    Tree(TreeArgs),
    /// 顯示單一元件的詳細資料。 / Show the detail view of one component.
    Show(ShowArgs),
    /// 管理元件（新增/改名/另存/刪除/修改）。 / Manage components (new/rename/save-as/delete/set).
    #[command(subcommand)]
    Component(ComponentCommand),
    /// 管理元件屬性（新增/修改/移除）。 / Manage component properties (add/set/remove).
    #[command(subcommand)]
    Property(PropertyCommand),
}

#[derive(Args)]
struct NewArgs {
    /// 新工作區的根目錄路徑。 / Root directory of the new workspace.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Args)]
struct ListArgs {
    /// 以 JSON 格式輸出。 / Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TreeArgs {
    /// 以 JSON 格式輸出。 / Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// 元件名稱。 / Component name.
    name: String,

    /// 以 JSON 格式輸出。 / Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ComponentCommand {
    /// 建立空白元件。 / Create an empty component.
    New(ComponentNewArgs),
    /// 重新命名元件。 / Rename a component.
    Rename(ComponentRenameArgs),
    /// 以新名稱另存元件。 / Save a component under a new name.
    SaveAs(ComponentSaveAsArgs),
    /// 永久刪除元件。 / Permanently delete a component.
    Delete(ComponentDeleteArgs),
    /// 修改元件的數量或備註。 / Update a component's quantity or notes.
    Set(ComponentSetArgs),
}

#[derive(Args)]
struct ComponentNewArgs {
    /// 新元件名稱。 / Name of the new component.
    name: String,
}

#[derive(Args)]
struct ComponentRenameArgs {
    /// 現有元件名稱。 / Current component name.
    name: String,
    /// 新的元件名稱。 / New component name.
    new_name: String,
}

#[derive(Args)]
struct ComponentSaveAsArgs {
    /// 現有元件名稱。 / Current component name.
    name: String,
    /// 複本的元件名稱。 / Name of the copy.
    new_name: String,
}

#[derive(Args)]
struct ComponentDeleteArgs {
    /// 要刪除的元件名稱。 / Component to delete.
    name: String,

    /// 確認刪除；未加上此旗標時拒絕執行。 / Confirm the deletion; refused without this flag.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct ComponentSetArgs {
    /// 元件名稱。 / Component name.
    name: String,

    /// 新的庫存數量。 / New stock quantity.
    #[arg(long, value_name = "N")]
    quantity: Option<u32>,

    /// 新的備註內容；空字串會移除備註檔。 / New notes text; an empty string removes the notes file.
    #[arg(long, value_name = "TEXT")]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum PropertyCommand {
    /// 新增屬性。 / Add a property.
    Add(PropertyAddArgs),
    /// 修改既有屬性的值。 / Change an existing property's value.
    Set(PropertySetArgs),
    /// 依索引移除屬性。 / Remove a property by index.
    Remove(PropertyRemoveArgs),
}

#[derive(Args)]
struct PropertyAddArgs {
    /// 元件名稱。 / Component name.
    component: String,
    /// 屬性名稱（預設視為使用者名稱）。 / Property name (treated as a human name by default).
    name: String,
    /// 屬性值。 / Property value.
    value: String,

    /// 將名稱視為儲存格式，不做轉換。 / Store the name verbatim without the human-name transform.
    #[arg(long)]
    raw: bool,
}

#[derive(Args)]
struct PropertySetArgs {
    /// 元件名稱。 / Component name.
    component: String,
    /// 屬性索引（見 `show` 輸出的順序）。 / Property index (the order shown by `show`).
    index: usize,
    /// 新的屬性值。 / New property value.
    value: String,
}

#[derive(Args)]
struct PropertyRemoveArgs {
    /// 元件名稱。 / Component name.
    component: String,
    /// 屬性索引。 / Property index.
    index: usize,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    match command {
        Commands::New(args) => execute_new(args),
        Commands::List(args) => execute_list(&open_workspace(workspace)?, args),
        Commands::Tree(args) => execute_tree(&open_workspace(workspace)?, args),
        Commands::Show(args) => execute_show(&open_workspace(workspace)?, args),
        Commands::Component(subcommand) => {
            let mut ws = open_workspace(workspace)?;
            execute_component_command(&mut ws, subcommand)
        }
        Commands::Property(subcommand) => {
            let mut ws = open_workspace(workspace)?;
            execute_property_command(&mut ws, subcommand)
        }
    }
}

fn execute_new(args: NewArgs) -> Result<()> {
    let path = resolve_input_path(&args.path)?;
    Workspace::create(&path)
        .with_context(|| format!("failed to create workspace at {}", path.display()))?;
    println!("Created workspace at {}", path.display());
    Ok(())
}

fn execute_list(workspace: &Workspace, args: ListArgs) -> Result<()> {
    let components = workspace.components()?;

    if args.json {
        let entries: Vec<_> = components
            .iter()
            .map(|component| {
                json!({
                    "name": component.name(),
                    "quantity": component.quantity(),
                    "category": component.category(),
                    "sub_category": component.sub_category(),
                })
            })
            .collect();
        let payload = json!({
            "workspace": workspace.name(),
            "components": entries,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if components.is_empty() {
        println!("Workspace is empty.");
        return Ok(());
    }
    for component in components {
        println!(
            "{:<24} {:>6}  {}",
            component.name(),
            component.quantity(),
            component.category().unwrap_or("-")
        );
    }
    Ok(())
}

fn execute_tree(workspace: &Workspace, args: TreeArgs) -> Result<()> {
    let components = workspace.components()?;
    let tree = build_category_tree(components);
    let names = |indices: &[usize]| -> Vec<&str> {
        indices.iter().map(|&index| components[index].name()).collect()
    };

    if args.json {
        let categories: Vec<_> = tree
            .categories
            .iter()
            .map(|node| {
                let sub_categories: Vec<_> = node
                    .sub_categories
                    .iter()
                    .map(|group| {
                        json!({
                            "name": group.name,
                            "members": names(&group.members),
                        })
                    })
                    .collect();
                json!({
                    "name": node.name,
                    "sub_categories": sub_categories,
                    "unsorted": names(&node.unsorted),
                })
            })
            .collect();
        let payload = json!({
            "workspace": workspace.name(),
            "categories": categories,
            "uncategorized": names(&tree.uncategorized),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if tree.is_empty() {
        println!("Workspace is empty.");
        return Ok(());
    }
    for node in &tree.categories {
        println!("{}", label(&node.name));
        for group in &node.sub_categories {
            println!("  {}", label(&group.name));
            for &index in &group.members {
                println!("    {}", components[index].name());
            }
        }
        for &index in &node.unsorted {
            println!("  {}", components[index].name());
        }
    }
    if !tree.uncategorized.is_empty() {
        println!("Uncategorized");
        for &index in &tree.uncategorized {
            println!("  {}", components[index].name());
        }
    }
    Ok(())
}

fn execute_show(workspace: &Workspace, args: ShowArgs) -> Result<()> {
    let index = find_component(workspace, &args.name)?;
    let component = workspace.component(index)?;
    let notes = component
        .notes()
        .with_context(|| format!("failed to read notes for '{}'", args.name))?;

    if args.json {
        let properties: Vec<_> = component
            .properties()
            .iter()
            .map(|prop| {
                json!({
                    "name": prop.name(),
                    "human_name": prop.human_name(),
                    "value": prop.value(),
                })
            })
            .collect();
        let payload = json!({
            "name": component.name(),
            "quantity": component.quantity(),
            "properties": properties,
            "notes": notes,
            "image": component.image(),
            "datasheet": component.datasheet(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Name: {}", component.name());
    println!("Quantity: {}", component.quantity());
    println!("Properties:");
    if component.properties().is_empty() {
        println!("  (none)");
    }
    for prop in component.properties() {
        println!("  {}: {}", prop.human_name(), prop.value());
    }
    if !notes.is_empty() {
        println!("Notes:");
        for line in notes.lines() {
            println!("  {line}");
        }
    }
    match component.image() {
        Some(path) => println!("Image: {}", path.display()),
        None => println!("Image: (none)"),
    }
    match component.datasheet() {
        Some(path) => println!("Datasheet: {}", path.display()),
        None => println!("Datasheet: (none)"),
    }
    Ok(())
}

fn execute_component_command(workspace: &mut Workspace, command: ComponentCommand) -> Result<()> {
    match command {
        ComponentCommand::New(args) => {
            let components_dir = workspace.components_directory()?;
            Component::create(&components_dir, &args.name)
                .with_context(|| format!("failed to create component '{}'", args.name))?;
            println!("Created component '{}'", args.name);
            Ok(())
        }
        ComponentCommand::Rename(args) => {
            let index = find_component(workspace, &args.name)?;
            workspace
                .component_mut(index)?
                .rename(&args.new_name)
                .with_context(|| format!("failed to rename '{}'", args.name))?;
            println!("Renamed '{}' to '{}'", args.name, args.new_name);
            Ok(())
        }
        ComponentCommand::SaveAs(args) => {
            let index = find_component(workspace, &args.name)?;
            workspace
                .component_mut(index)?
                .save_as(&args.new_name)
                .with_context(|| format!("failed to save '{}' as '{}'", args.name, args.new_name))?;
            println!("Saved '{}' as '{}'", args.name, args.new_name);
            Ok(())
        }
        ComponentCommand::Delete(args) => {
            if !args.yes {
                bail!(
                    "refusing to permanently delete '{}' without --yes",
                    args.name
                );
            }
            let index = find_component(workspace, &args.name)?;
            let component = workspace.take_component(index)?;
            component
                .delete()
                .with_context(|| format!("failed to delete '{}'", args.name))?;
            println!("Deleted component '{}'", args.name);
            Ok(())
        }
        ComponentCommand::Set(args) => {
            if args.quantity.is_none() && args.notes.is_none() {
                bail!("nothing to change; pass --quantity and/or --notes");
            }
            let index = find_component(workspace, &args.name)?;
            let component = workspace.component_mut(index)?;
            if let Some(quantity) = args.quantity {
                component.set_quantity(quantity);
                component
                    .save()
                    .with_context(|| format!("failed to save '{}'", args.name))?;
                println!("Set quantity of '{}' to {}", args.name, quantity);
            }
            if let Some(notes) = args.notes {
                component
                    .save_notes(&notes)
                    .with_context(|| format!("failed to write notes for '{}'", args.name))?;
                println!("Updated notes of '{}'", args.name);
            }
            Ok(())
        }
    }
}

fn execute_property_command(workspace: &mut Workspace, command: PropertyCommand) -> Result<()> {
    match command {
        PropertyCommand::Add(args) => {
            let index = find_component(workspace, &args.component)?;
            let component = workspace.component_mut(index)?;
            let property = if args.raw {
                Property::new(args.name.clone(), args.value)
            } else {
                let mut property = Property::empty();
                property.set_human_name(&args.name);
                property.set_value(args.value);
                property
            };
            let stored_name = property.name().to_string();
            component.add_property(property);
            component
                .save()
                .with_context(|| format!("failed to save '{}'", args.component))?;
            println!("Added property '{}' to '{}'", stored_name, args.component);
            Ok(())
        }
        PropertyCommand::Set(args) => {
            let index = find_component(workspace, &args.component)?;
            let component = workspace.component_mut(index)?;
            component.property_mut(args.index)?.set_value(args.value);
            component
                .save()
                .with_context(|| format!("failed to save '{}'", args.component))?;
            println!(
                "Updated property {} of '{}'",
                args.index, args.component
            );
            Ok(())
        }
        PropertyCommand::Remove(args) => {
            let index = find_component(workspace, &args.component)?;
            let component = workspace.component_mut(index)?;
            let removed = component.remove_property(args.index)?;
            component
                .save()
                .with_context(|| format!("failed to save '{}'", args.component))?;
            println!(
                "Removed property '{}' from '{}'",
                removed.human_name(),
                args.component
            );
            Ok(())
        }
    }
}

fn label(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

fn find_component(workspace: &Workspace, name: &str) -> Result<usize> {
    workspace
        .component_named(name)
        .ok_or_else(|| anyhow!("no component named '{name}' in this workspace"))
}

fn open_workspace(workspace: Option<PathBuf>) -> Result<Workspace> {
    let path = resolve_workspace(workspace)?;
    let mut ws = Workspace::new();
    ws.open(&path)
        .with_context(|| format!("failed to open workspace at {}", path.display()))?;
    Ok(ws)
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
