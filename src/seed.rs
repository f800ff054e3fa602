use anyhow::Context;
use tracing::info;

use crate::models::Tab;
use crate::repo::{Repo, TabRepo};

/// Upsert every configured tab and its nodes. Safe to run on every start:
/// existing rows are updated in place, never duplicated.
pub async fn seed_tabs(repo: &dyn Repo, tabs: &[Tab]) -> anyhow::Result<()> {
    for tab in tabs {
        let tab_id = repo
            .upsert_tab(&tab.slug, &tab.name)
            .await
            .with_context(|| format!("seeding tab '{}'", tab.slug))?;
        for node in &tab.nodes {
            repo.upsert_node(tab_id, node)
                .await
                .with_context(|| format!("seeding node '{}' of tab '{}'", node, tab.slug))?;
        }
        info!(tab = %tab.slug, nodes = tab.nodes.len(), "seeded tab");
    }
    Ok(())
}
