use std::sync::{Arc, RwLock};

/// Receives ownership of a buffer pushed with
/// [`Sender::push_frame_owned`](super::Sender::push_frame_owned) once the
/// sender is done with it.
pub type DeallocHook = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Installed dealloc hook, shared between the caller and the send worker.
#[derive(Default)]
pub(crate) struct DeallocSlot {
    hook: RwLock<Option<DeallocHook>>,
}

impl DeallocSlot {
    pub(crate) fn install(&self, hook: DeallocHook) {
        *self.hook.write().unwrap_or_else(|p| p.into_inner()) = Some(hook);
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.hook
            .read()
            .map(|h| h.is_some())
            .unwrap_or_else(|p| p.into_inner().is_some())
    }

    /// Hands an owned buffer to the hook, or drops it when none is set.
    pub(crate) fn release(&self, buf: Vec<u8>) {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        match hook {
            Some(hook) => hook(buf),
            None => drop(buf),
        }
    }
}
