use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::StatsSource;
use crate::state::{Delta, ProviderCommand};

/// Run fetches on a worker pool and report each outcome as a [`Delta`].
///
/// The thread exits once every command sender is dropped.
pub fn spawn_provider(
    source: Arc<dyn StatsSource>,
    parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Fetch pool unavailable, using one thread per request".to_string(),
            ));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Fetch { page_id, request } => {
                    let tx = tx.clone();
                    let source = source.clone();
                    let job = move || {
                        let result = request.call.execute(source.as_ref());
                        let _ = tx.send(Delta::FetchFinished {
                            page_id,
                            ticket: request.ticket,
                            key: request.key,
                            result,
                        });
                    };
                    if let Some(pool) = pool.as_ref() {
                        pool.spawn(job);
                    } else {
                        thread::spawn(job);
                    }
                }
            }
        }
    })
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("fetch-{idx}"))
        .build()
        .ok()
}
