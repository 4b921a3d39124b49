use crate::store::load_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document files to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn check(args: CheckArgs) -> Result<()> {
    println!("🔍 {} document invariants", "Checking".green().bold());

    let mut failed = 0;
    for path in &args.paths {
        match load_document(path) {
            Ok(doc) => println!(
                "   {} {} ({} pages, {} components, nextId {})",
                "✓".green(),
                path.display(),
                doc.pages.len(),
                doc.context.components.len(),
                doc.next_id()
            ),
            Err(err) => {
                failed += 1;
                println!("   {} {}: {:#}", "✗".red(), path.display(), err);
            }
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, args.paths.len());
    }
    println!("✨ {} {} documents valid", "Done".green().bold(), args.paths.len());
    Ok(())
}
