use crate::store::write_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitecraft_document::Document;
use sitecraft_editor::EditorConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Document file to create
    pub path: PathBuf,

    /// Id namespace (defaults to the configured one)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Force overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn new(args: NewArgs, config: &EditorConfig) -> Result<()> {
    if args.path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            args.path.display().to_string().bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let namespace = args
        .namespace
        .unwrap_or_else(|| config.default_namespace.clone());
    let doc = Document::blank(namespace);
    write_document(&args.path, &doc)?;

    println!(
        "  {} Created {} (namespace {})",
        "✓".green(),
        args.path.display(),
        doc.namespace().bright_white()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::load_document;

    #[test]
    fn test_new_uses_configured_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let config = EditorConfig {
            default_namespace: "shop".to_string(),
            ..EditorConfig::default()
        };

        new(
            NewArgs {
                path: path.clone(),
                namespace: None,
                force: false,
            },
            &config,
        )
        .unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.namespace(), "shop");
        assert_eq!(doc.page_root("/").unwrap().id, "shop-component-1");
    }

    #[test]
    fn test_new_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, "keep me").unwrap();

        let args = NewArgs {
            path: path.clone(),
            namespace: Some("site".to_string()),
            force: false,
        };
        new(args, &EditorConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
