use crate::peer::{NegotiationRole, PeerSession};
use crate::transport::{LocalMedia, TransportEvent, TransportFactory};
use anyhow::{Context, Result};
use glasswall_core::ParticipantId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Owns one [`PeerSession`] per remote participant.
pub struct PeerRegistry {
    sessions: HashMap<ParticipantId, PeerSession>,
    factory: Arc<dyn TransportFactory>,
    local_media: LocalMedia,
    transport_tx: mpsc::Sender<TransportEvent>,
}

impl PeerRegistry {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        local_media: LocalMedia,
        transport_tx: mpsc::Sender<TransportEvent>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            factory,
            local_media,
            transport_tx,
        }
    }

    /// Returns the session for `id`, creating it (and its transport, with the
    /// local tracks attached) when there is none yet.
    pub async fn get_or_create(
        &mut self,
        id: &ParticipantId,
        role: NegotiationRole,
    ) -> Result<&mut PeerSession> {
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let transport = self
                    .factory
                    .create(id.clone(), self.transport_tx.clone())
                    .await
                    .with_context(|| format!("Failed to create transport for {}", id))?;

                if let Err(e) = transport.attach_local_media(&self.local_media).await {
                    let _ = transport.close().await;
                    return Err(e.context(format!("Failed to attach local media for {}", id)));
                }

                info!("Created peer session for {} ({:?})", id, role);
                Ok(entry.insert(PeerSession::new(id.clone(), role, transport)))
            }
        }
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&PeerSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut PeerSession> {
        self.sessions.get_mut(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Closes the session's transport and forgets it. No-op when absent.
    pub async fn remove(&mut self, id: &ParticipantId) -> Option<PeerSession> {
        let mut session = self.sessions.remove(id)?;
        session.close().await;
        info!("Removed peer session for {} ({})", id, session.state());
        Some(session)
    }

    /// Closes and forgets every session.
    pub async fn clear(&mut self) -> Vec<PeerSession> {
        let ids: Vec<ParticipantId> = self.sessions.keys().cloned().collect();
        let mut closed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(session) = self.remove(&id).await {
                closed.push(session);
            }
        }
        closed
    }

    pub fn all(&self) -> impl Iterator<Item = (&ParticipantId, &PeerSession)> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
