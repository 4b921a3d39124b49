use crate::store::{load_document, FileStore, SaveWriter};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sitecraft_document::{BehaviorCall, Document};
use sitecraft_editor::{BehaviorTrigger, Command, DocumentHandle, EditorConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Document file to edit
    pub document: PathBuf,

    /// JSON array of commands, e.g. `[{"type": "undo"}]`
    pub script: PathBuf,

    /// Apply the script without writing the document back
    #[arg(long)]
    pub dry_run: bool,
}

/// No interpreter runs under the CLI; behavior calls are reported instead.
struct ReportTrigger;

impl BehaviorTrigger for ReportTrigger {
    fn trigger(
        &mut self,
        behaviors: &[BehaviorCall],
        _document: &Document,
        component_id: &str,
        event: Option<&str>,
    ) {
        for call in behaviors {
            println!(
                "     {} {} on {} ({})",
                "↯".cyan(),
                call.behavior_id,
                component_id,
                event.unwrap_or("-")
            );
        }
    }
}

pub fn replay(args: ReplayArgs, config: &EditorConfig) -> Result<()> {
    let document = load_document(&args.document)?;
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let commands: Vec<Command> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid command script {}", args.script.display()))?;

    println!("▶️  {} {} commands", "Replaying".green().bold(), commands.len());
    println!("   Document: {}", args.document.display());
    println!();

    let mut handle = DocumentHandle::new(document)
        .with_config(config.clone())
        .with_trigger(ReportTrigger);
    let mut writer = None;
    if !args.dry_run {
        let (store, save_writer) = FileStore::spawn(&args.document)?;
        handle = handle.with_persistence(store);
        writer = Some(save_writer);
    }

    let outcome = run_script(&mut handle, commands);
    let summary = (
        handle.history().undo_levels(),
        handle.history().redo_levels(),
        handle.document().next_id(),
    );
    // Closes the snapshot queue so the writer can drain and stop.
    drop(handle);
    let writes = writer.map(SaveWriter::finish).transpose()?;
    outcome?;

    let (undo_levels, redo_levels, next_id) = summary;
    println!();
    println!(
        "✨ {} {} undo levels, {} redo levels, nextId {}",
        "Done".green().bold(),
        undo_levels,
        redo_levels,
        next_id
    );
    match writes {
        Some(writes) => println!("   {} {} writes", "Saved:".cyan(), writes),
        None => println!("   {} dry run, document not written", "Note:".yellow()),
    }
    Ok(())
}

fn run_script(handle: &mut DocumentHandle, commands: Vec<Command>) -> Result<()> {
    for (index, command) in commands.into_iter().enumerate() {
        let kind = command.kind();
        handle
            .dispatch(command)
            .with_context(|| format!("Command #{} ({}) failed", index + 1, kind))?;
        println!("   {} {}", "✓".green(), kind);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::write_document;

    fn setup(script: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("site.json");
        let script_path = dir.path().join("script.json");
        write_document(&document, &Document::blank("site")).unwrap();
        fs::write(&script_path, script).unwrap();
        (dir, document, script_path)
    }

    const SCRIPT: &str = r#"[
        { "type": "addComponent", "data": { "parentId": "site-component-1", "tag": "nav" } },
        { "type": "addComponent", "data": { "parentId": "site-component-2", "tag": "a" } },
        { "type": "undo" }
    ]"#;

    #[test]
    fn test_replay_saves_result() {
        let (_dir, document, script) = setup(SCRIPT);

        replay(
            ReplayArgs {
                document: document.clone(),
                script,
                dry_run: false,
            },
            &EditorConfig::default(),
        )
        .unwrap();

        let doc = load_document(&document).unwrap();
        assert_eq!(doc.component("site-component-2").unwrap().tag, "nav");
        assert!(!doc.contains_component("site-component-3"));
        assert_eq!(doc.next_id(), 3);
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let (_dir, document, script) = setup(SCRIPT);
        let before = fs::read_to_string(&document).unwrap();

        replay(
            ReplayArgs {
                document: document.clone(),
                script,
                dry_run: true,
            },
            &EditorConfig::default(),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&document).unwrap(), before);
    }

    #[test]
    fn test_failing_command_is_reported() {
        let (_dir, document, script) =
            setup(r#"[{ "type": "removePage", "data": { "route": "/" } }]"#);

        let err = replay(
            ReplayArgs {
                document,
                script,
                dry_run: false,
            },
            &EditorConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("#1 (removePage)"));
    }
}
