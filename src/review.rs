use crate::disposal;
use crate::store::{DuplicateCluster, FingerprintStore};
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::path::Path;

/// Clusters shown per page.
pub const PAGE_SIZE: usize = 25;

/// Interactive terminal review of resolved clusters.
///
/// A pure consumer of the resolver's output: it renders one page of
/// clusters at a time and forwards single-member delete requests to the
/// disposal engine, reporting success or failure per request.
pub fn run(
    clusters: &[DuplicateCluster],
    store: &dyn FingerprintStore,
    trash: &Path,
) -> Result<()> {
    if clusters.is_empty() {
        println!("No duplicates found.");
        return Ok(());
    }

    let total_pages = clusters.len().div_ceil(PAGE_SIZE);
    let mut page = 0;
    loop {
        render_page(clusters, page, total_pages);

        let command: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("n(ext) / p(rev) / d <path> / q(uit)")
            .allow_empty(true)
            .interact_text()?;

        match command.trim() {
            "n" => page = (page + 1).min(total_pages - 1),
            "p" => page = page.saturating_sub(1),
            "q" | "" => break,
            cmd if cmd.starts_with("d ") => {
                let target = Path::new(cmd[2..].trim());
                if disposal::delete_picture(target, store, trash) {
                    println!("Deleted {}", target.display());
                } else {
                    println!("Failed to delete {}", target.display());
                }
            }
            other => println!("Unrecognized command: {other}"),
        }
    }
    Ok(())
}

fn render_page(clusters: &[DuplicateCluster], page: usize, total_pages: usize) {
    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(clusters.len());

    println!(
        "\nPage {}/{} — {} duplicate group(s) total",
        page + 1,
        total_pages,
        clusters.len()
    );
    for (i, cluster) in clusters[start..end].iter().enumerate() {
        println!(" Group {} ({} files):", start + i + 1, cluster.count());
        for member in &cluster.members {
            println!(
                "   {} | {} bytes | {} | {}",
                member.identity.display(),
                member.file_size,
                member.image_size,
                member.capture_time
            );
        }
    }
}
