// System pallet: remarks and raw storage writes

use gov_common::{
    call::SystemCall,
    crypto::hash,
    event::{RuntimeEvent, SystemEvent},
    origin::OriginCaller,
};

use super::scheduler::ensure_root;
use crate::tier1_component::ext::{DispatchResult, Ext};

pub(crate) fn dispatch(ext: &mut Ext, origin: &OriginCaller, call: SystemCall) -> DispatchResult {
    match call {
        SystemCall::Remark { remark } => {
            ext.deposit_event(RuntimeEvent::System(SystemEvent::Remarked {
                hash: hash(&remark),
            }));
            Ok(())
        }
        SystemCall::SetStorage { items } => {
            ensure_root(origin)?;
            let count = items.len() as u32;
            for (key, value) in items {
                ext.put_raw(key, value);
            }
            ext.deposit_event(RuntimeEvent::System(SystemEvent::StorageSet { items: count }));
            Ok(())
        }
    }
}
