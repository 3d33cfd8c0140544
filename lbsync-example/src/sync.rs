//! Concurrent leaderboard workflows run by the example.

use std::sync::Arc;

// ---

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ---

use lbsync_client::LeaderboardClient;

// ---

/// Look up every name in parallel. Fails if any lookup failed.
pub async fn find_all(
    client: &Arc<LeaderboardClient>,
    app_id: u32,
    names: &[String],
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    // ---
    let mut tasks = JoinSet::new();
    for name in names {
        let client = Arc::clone(client);
        let cancel = cancel.clone();
        let name = name.clone();
        tasks.spawn(async move {
            let outcome = client.find_leaderboard(app_id, &name, &cancel).await;
            (name, outcome)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (name, outcome) = joined?;
        match outcome {
            Ok(info) => println!("{name:<12} id={:<8} entries={}", info.id, info.entry_count),
            Err(e) => {
                warn!("{name}: {e}");
                failed += 1;
            }
        }
    }

    finish("lookups", names.len(), failed)
}

// ---

/// Download every id in parallel and print the top of each board.
pub async fn entries_all(
    client: &Arc<LeaderboardClient>,
    app_id: u32,
    ids: &[i32],
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    // ---
    let mut tasks = JoinSet::new();
    for &id in ids {
        let client = Arc::clone(client);
        let cancel = cancel.clone();
        tasks.spawn(async move { (id, client.leaderboard_entries(app_id, id, &cancel).await) });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (id, outcome) = joined?;
        match outcome {
            Ok(board) => {
                println!("#{id}: {} entries", board.entries.len());
                for entry in board.entries.iter().take(3) {
                    println!(
                        "  {:>4}  {:<20} {}",
                        entry.global_rank, entry.player_id, entry.score
                    );
                }
            }
            Err(e) => {
                warn!("#{id}: {e}");
                failed += 1;
            }
        }
    }

    finish("downloads", ids.len(), failed)
}

// ---

fn finish(what: &str, total: usize, failed: usize) -> anyhow::Result<()> {
    // ---
    info!(total, failed, "{what} complete");
    if failed > 0 {
        anyhow::bail!("{failed} of {total} {what} failed");
    }
    Ok(())
}
