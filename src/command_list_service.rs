//! Per-command-list root-signature bindings.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

use crate::key_registry::Key;
use crate::root_signature::RootSignatureRecord;
use crate::{BindPoint, DescriptorHeapType};

#[derive(Debug, Default, Clone)]
pub struct CommandListBindingState {
    pub graphics: Option<Arc<RootSignatureRecord>>,
    pub compute: Option<Arc<RootSignatureRecord>>,
}

impl CommandListBindingState {
    fn slot_mut(&mut self, bind_point: BindPoint) -> &mut Option<Arc<RootSignatureRecord>> {
        match bind_point {
            BindPoint::Graphics => &mut self.graphics,
            BindPoint::Compute => &mut self.compute,
        }
    }

    pub fn bound(&self, bind_point: BindPoint) -> Option<&Arc<RootSignatureRecord>> {
        match bind_point {
            BindPoint::Graphics => self.graphics.as_ref(),
            BindPoint::Compute => self.compute.as_ref(),
        }
    }
}

/// Binding state of every live command list.
///
/// The table lock is only held to find a list's state; each list carries its
/// own lock so that threads recording unrelated lists don't contend.
#[derive(Debug, Default)]
pub struct CommandListService {
    lists: Mutex<HashMap<Key, Arc<Mutex<CommandListBindingState>>>>,
}

impl CommandListService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_command_list(&self, key: Key) {
        let previous = self
            .lists
            .lock()
            .insert(key, Arc::new(Mutex::new(CommandListBindingState::default())));
        assert!(previous.is_none(), "command list {} registered twice", key);
    }

    pub fn destroy_command_list(&self, key: Key) -> bool {
        self.lists.lock().remove(&key).is_some()
    }

    fn state(&self, key: Key) -> Option<Arc<Mutex<CommandListBindingState>>> {
        self.lists.lock().get(&key).cloned()
    }

    /// Binds `root_signature` to `bind_point`. A null signature leaves the
    /// current binding untouched.
    pub fn set_root_signature(
        &self,
        key: Key,
        bind_point: BindPoint,
        root_signature: Option<Arc<RootSignatureRecord>>,
    ) {
        let root_signature = match root_signature {
            Some(root_signature) => root_signature,
            None => return,
        };
        match self.state(key) {
            Some(state) => *state.lock().slot_mut(bind_point) = Some(root_signature),
            None => warn!(
                "Root signature {} bound to untracked command list {}",
                root_signature.key, key
            ),
        }
    }

    pub fn reset(&self, key: Key) {
        if let Some(state) = self.state(key) {
            let mut state = state.lock();
            state.graphics = None;
            state.compute = None;
        }
    }

    /// Heap type the bound root signature declares for descriptor table
    /// `slot`. `None` when nothing is bound or the slot is not a table.
    pub fn get_descriptor_table_heap_type(
        &self,
        key: Key,
        bind_point: BindPoint,
        slot: u32,
    ) -> Option<DescriptorHeapType> {
        let state = self.state(key)?;
        let state = state.lock();
        let root_signature = match state.bound(bind_point) {
            Some(root_signature) => root_signature,
            None => {
                warn!(
                    "Descriptor table {} set on command list {} with no {:?} root signature bound",
                    slot, key, bind_point
                );
                return None;
            }
        };
        let heap_type = root_signature.descriptor_table_heap_type(slot);
        if heap_type.is_none() {
            warn!(
                "Root signature {} has no descriptor table at slot {}",
                root_signature.key, slot
            );
        }
        heap_type
    }

    pub fn binding_state(&self, key: Key) -> Option<CommandListBindingState> {
        self.state(key).map(|state| state.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(key: u32) -> Arc<RootSignatureRecord> {
        Arc::new(RootSignatureRecord::new(
            Key(key),
            vec![
                None,
                Some(DescriptorHeapType::Sampler),
                Some(DescriptorHeapType::CBV_SRV_UAV),
            ],
        ))
    }

    #[test]
    fn slot_lookup_follows_binding_and_reset() {
        let service = CommandListService::new();
        service.create_command_list(Key(1));
        service.set_root_signature(Key(1), BindPoint::Graphics, Some(signature(7)));

        assert_eq!(
            service.get_descriptor_table_heap_type(Key(1), BindPoint::Graphics, 2),
            Some(DescriptorHeapType::CBV_SRV_UAV)
        );
        assert_eq!(
            service.get_descriptor_table_heap_type(Key(1), BindPoint::Compute, 2),
            None
        );

        service.reset(Key(1));
        assert_eq!(
            service.get_descriptor_table_heap_type(Key(1), BindPoint::Graphics, 2),
            None
        );
    }

    #[test]
    fn null_signature_keeps_binding() {
        let service = CommandListService::new();
        service.create_command_list(Key(1));
        service.set_root_signature(Key(1), BindPoint::Compute, Some(signature(7)));
        service.set_root_signature(Key(1), BindPoint::Compute, None);
        assert_eq!(
            service.get_descriptor_table_heap_type(Key(1), BindPoint::Compute, 1),
            Some(DescriptorHeapType::Sampler)
        );
    }

    #[test]
    fn lists_are_independent() {
        let service = Arc::new(CommandListService::new());
        for key in 1..=8 {
            service.create_command_list(Key(key));
        }
        let threads: Vec<_> = (1..=8u32)
            .map(|key| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        service.set_root_signature(Key(key), BindPoint::Graphics, Some(signature(100 + key)));
                        let bound = service.binding_state(Key(key)).unwrap();
                        assert_eq!(bound.graphics.unwrap().key, Key(100 + key));
                        service.reset(Key(key));
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_registration_is_fatal() {
        let service = CommandListService::new();
        service.create_command_list(Key(1));
        service.create_command_list(Key(1));
    }
}
