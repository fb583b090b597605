// Proposal State Patcher
//
// Reads and overwrites `Referenda::ReferendumInfoFor` records directly,
// bypassing the chain's submit/vote/decide transitions.

use log::info;

use gov_common::{
    referenda::{Proposal, ProposalState, ReferendumIndex},
    serializer::Serializer,
    storage,
};

use super::error::{FastForwardError, Result};
use crate::backend::StorageBackend;

pub struct ProposalStore<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: StorageBackend + ?Sized> ProposalStore<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn read(&self, id: ReferendumIndex) -> Result<Option<Proposal>> {
        let Some(bytes) = self
            .backend
            .read_storage(&storage::referendum_info_key(id))
            .await?
        else {
            return Ok(None);
        };

        let state = ProposalState::from_bytes(&bytes)
            .map_err(|e| FastForwardError::decode("referendum info", None, e))?;
        Ok(Some(Proposal { id, state }))
    }

    pub async fn get(&self, id: ReferendumIndex) -> Result<Proposal> {
        self.read(id)
            .await?
            .ok_or(FastForwardError::ProposalNotFound(id))
    }

    /// Number of referenda ever submitted
    pub async fn count(&self) -> Result<ReferendumIndex> {
        match self
            .backend
            .read_storage(&storage::referendum_count_key())
            .await?
        {
            Some(bytes) => ReferendumIndex::from_bytes(&bytes)
                .map_err(|e| FastForwardError::decode("referendum count", None, e)),
            None => Ok(0),
        }
    }

    /// Total issuance, the denominator of the support fraction
    pub async fn total_issuance(&self) -> Result<u128> {
        match self
            .backend
            .read_storage(&storage::total_issuance_key())
            .await?
        {
            Some(bytes) => u128::from_bytes(&bytes)
                .map_err(|e| FastForwardError::decode("total issuance", None, e)),
            None => Ok(0),
        }
    }

    /// Overwrite the stored state of an existing, still ongoing referendum
    pub async fn patch(&self, id: ReferendumIndex, state: ProposalState) -> Result<()> {
        let current = self.get(id).await?;
        if current.state.is_terminal() {
            return Err(FastForwardError::invariant(format!(
                "referendum {} is already {}, refusing to patch it",
                id,
                current.state.name()
            )));
        }

        self.backend
            .write_storage(vec![(storage::referendum_info_key(id), state.to_bytes())])
            .await?;

        if log::log_enabled!(log::Level::Info) {
            info!("patched referendum {} to {}", id, state.name());
        }
        Ok(())
    }
}
