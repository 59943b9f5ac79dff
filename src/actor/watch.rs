//! Watch loop - polls the served tree and requests reloads.
//!
//! Every tick: one full mtime scan, compare against the baseline, and on a
//! strict increase ask the WebSocket actor to notify every browser. Changes
//! landing within one poll window coalesce into a single reload for free.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::messages::WsMsg;
use crate::debug;
use crate::scan::{self, WatchState};

/// Watch actor - owns the scan baseline for the process lifetime.
pub struct WatchActor {
    root: PathBuf,
    interval: Duration,
    ws_tx: mpsc::Sender<WsMsg>,
    state: WatchState,
}

impl WatchActor {
    pub fn new(root: PathBuf, interval: Duration, ws_tx: mpsc::Sender<WsMsg>) -> Self {
        Self {
            root,
            interval,
            ws_tx,
            state: WatchState::new(),
        }
    }

    /// Run the poll loop until shutdown (or until the ws actor goes away).
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A scan overrunning the interval must not cause a burst of
        // catch-up scans afterwards
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("watch"; "watching {} every {:?}", self.root.display(), self.interval);

        loop {
            ticker.tick().await;
            if crate::core::is_shutdown() {
                break;
            }

            // Synchronous full-tree walk; per-entry errors are skipped
            // inside the scan so a vanishing file never kills the loop
            let latest = scan::latest_mtime(&self.root);

            if self.state.observe(latest) {
                debug!("watch"; "change detected");
                if self.ws_tx.send(WsMsg::Reload).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    const TICK: Duration = Duration::from_millis(10);

    async fn expect_reload(rx: &mut mpsc::Receiver<WsMsg>) {
        match timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(WsMsg::Reload)) => {}
            Ok(_) => panic!("expected a reload message"),
            Err(_) => panic!("no reload within timeout"),
        }
    }

    async fn expect_silence(rx: &mut mpsc::Receiver<WsMsg>) {
        if timeout(Duration::from_millis(200), rx.recv()).await.is_ok() {
            panic!("unexpected message during quiet period");
        }
    }

    #[tokio::test]
    async fn test_startup_does_not_reload() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let actor = WatchActor::new(dir.path().to_path_buf(), TICK, tx);
        tokio::spawn(actor.run());

        // Files that existed before the watcher started are the baseline
        expect_silence(&mut rx).await;
    }

    #[tokio::test]
    async fn test_file_change_triggers_exactly_one_reload() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let actor = WatchActor::new(dir.path().to_path_buf(), TICK, tx);
        tokio::spawn(actor.run());

        // Let the first scan establish the baseline
        tokio::time::sleep(Duration::from_millis(100)).await;

        // A new file carries a fresh mtime, strictly newer than baseline
        fs::write(dir.path().join("new.mjs"), "export {}").unwrap();

        expect_reload(&mut rx).await;
        expect_silence(&mut rx).await;
    }

    #[tokio::test]
    async fn test_changes_in_one_window_coalesce() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        // Long interval: both writes land within one poll window
        let actor = WatchActor::new(dir.path().to_path_buf(), Duration::from_millis(300), tx);
        tokio::spawn(actor.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(dir.path().join("a.css"), "body{}").unwrap();
        fs::write(dir.path().join("b.css"), "div{}").unwrap();

        expect_reload(&mut rx).await;
        expect_silence(&mut rx).await;
    }
}
