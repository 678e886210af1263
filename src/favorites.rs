use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::{FavoriteRecord, Favorites, MovieSummary};
use crate::storage::FavoritesPersistence;

pub struct FavoritesStore {
    entries: Favorites,
    mirror: mpsc::UnboundedSender<Favorites>,
}

pub struct PersistWorker {
    handle: JoinHandle<()>,
}

impl PersistWorker {
    // Completes only once the owning store has been dropped.
    pub async fn finish(self) {
        if let Err(e) = self.handle.await {
            error!("Favorites writer task failed: {}", e);
        }
    }
}

impl FavoritesStore {
    // Must be called inside a tokio runtime.
    pub fn hydrate(persistence: FavoritesPersistence) -> (Self, PersistWorker) {
        let entries = persistence.load();
        info!("Loaded {} favorites", entries.len());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_snapshots(persistence, rx));
        (
            Self {
                entries,
                mirror: tx,
            },
            PersistWorker { handle },
        )
    }

    pub fn toggle(&mut self, movie: &MovieSummary) -> bool {
        let now_favorite = if self.entries.remove(&movie.id).is_some() {
            info!("Removed from favorites: {}", movie.title);
            false
        } else {
            self.entries.insert(movie.id, FavoriteRecord::from(movie));
            info!("Added to favorites: {}", movie.title);
            true
        };
        if self.mirror.send(self.entries.clone()).is_err() {
            error!("Favorites writer stopped; change kept in memory only");
        }
        now_favorite
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: i64) -> Option<&FavoriteRecord> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> Vec<FavoriteRecord> {
        self.entries.values().cloned().collect()
    }

    pub fn snapshot(&self) -> &Favorites {
        &self.entries
    }
}

async fn write_snapshots(
    persistence: FavoritesPersistence,
    mut rx: mpsc::UnboundedReceiver<Favorites>,
) {
    while let Some(mut latest) = rx.recv().await {
        // Only the newest queued snapshot matters.
        while let Ok(next) = rx.try_recv() {
            latest = next;
        }
        let persistence = persistence.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || persistence.save(&latest)).await {
            error!("Favorites save task panicked: {}", e);
        }
    }
}
