// src/services/capacity_feed.rs

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::models::checkin::CapacitySnapshot;

// Assinantes lentos perdem snapshots antigos; cada snapshot é o estado completo.
const FEED_BUFFER: usize = 64;

/// Canal publish/subscribe da lotação. Quem escreve publica depois do commit;
/// cada conexão SSE é um assinante.
///
/// Dois commits podem publicar fora de ordem. O feed guarda a maior versão já
/// enviada e descarta snapshots mais antigos, então o último evento recebido
/// é sempre o estado mais novo.
#[derive(Clone)]
pub struct CapacityFeed {
    sender: broadcast::Sender<CapacitySnapshot>,
    last_version: Arc<Mutex<i64>>,
}

impl CapacityFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_BUFFER);
        Self { sender, last_version: Arc::new(Mutex::new(0)) }
    }

    /// Publica um snapshot. Retorna quantos assinantes receberam (0 se ninguém
    /// ouve ou se o snapshot já foi superado por outro mais novo).
    pub fn publish(&self, snapshot: CapacitySnapshot) -> usize {
        // O envio acontece com a trava na mão: a ordem do canal é a ordem das versões
        let mut last = self.last_version.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.version < *last {
            tracing::debug!("Dropping stale capacity snapshot v{} (latest v{})", snapshot.version, *last);
            return 0;
        }
        *last = snapshot.version;
        self.sender.send(snapshot).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CapacitySnapshot> {
        self.sender.subscribe()
    }
}

impl Default for CapacityFeed {
    fn default() -> Self {
        Self::new()
    }
}
