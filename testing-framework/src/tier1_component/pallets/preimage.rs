// Preimage pallet: content-addressed storage of encoded calls

use gov_common::{
    call::PreimageCall,
    crypto::{hash, Hash},
    error::DispatchError,
    event::{PreimageEvent, RuntimeEvent},
    origin::OriginCaller,
    storage,
};

use super::scheduler::ensure_root;
use crate::tier1_component::ext::{DispatchResult, Ext};

pub(crate) fn dispatch(ext: &mut Ext, origin: &OriginCaller, call: PreimageCall) -> DispatchResult {
    match call {
        PreimageCall::NotePreimage { bytes } => {
            if matches!(origin, OriginCaller::Origins(_)) {
                return Err(DispatchError::BadOrigin);
            }
            note(ext, bytes).map(|_| ())
        }
        PreimageCall::UnnotePreimage { hash } => {
            ensure_root(origin)?;
            unnote(ext, &hash)
        }
    }
}

/// Store `bytes` under their hash and length
pub(crate) fn note(ext: &mut Ext, bytes: Vec<u8>) -> Result<Hash, DispatchError> {
    let hash = hash(&bytes);
    let len = bytes.len() as u32;
    if ext.get_raw(&storage::preimage_key(&hash, len)).is_some() {
        return Err(DispatchError::AlreadyNoted(hash));
    }

    ext.put_raw(storage::preimage_key(&hash, len), bytes);
    ext.put(storage::request_status_key(&hash), &len);
    ext.deposit_event(RuntimeEvent::Preimage(PreimageEvent::Noted { hash: hash.clone() }));
    Ok(hash)
}

pub(crate) fn unnote(ext: &mut Ext, hash: &Hash) -> DispatchResult {
    let len = len(ext, hash)?.ok_or_else(|| DispatchError::Unavailable(hash.clone()))?;
    ext.remove(&storage::preimage_key(hash, len));
    ext.remove(&storage::request_status_key(hash));
    ext.deposit_event(RuntimeEvent::Preimage(PreimageEvent::Cleared { hash: hash.clone() }));
    Ok(())
}

pub(crate) fn len(ext: &Ext, hash: &Hash) -> Result<Option<u32>, DispatchError> {
    ext.get(&storage::request_status_key(hash))
}

pub(crate) fn fetch(ext: &Ext, hash: &Hash, len: u32) -> Option<Vec<u8>> {
    ext.get_raw(&storage::preimage_key(hash, len)).cloned()
}
