//! Usage: Mutex extension trait that recovers from poisoning instead of propagating the panic.

use std::sync::{Mutex, MutexGuard};

pub(crate) trait MutexExt<T> {
    /// Lock the mutex; a poisoned lock is logged and recovered.
    fn lock_or_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    #[track_caller]
    fn lock_or_recover(&self) -> MutexGuard<'_, T> {
        match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let loc = std::panic::Location::caller();
                tracing::error!(
                    mutex_type = std::any::type_name::<T>(),
                    file = loc.file(),
                    line = loc.line(),
                    "mutex poisoned by a panicking thread; recovered inner state"
                );
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn lock_or_recover_returns_guard() {
        let mutex = Mutex::new(HashMap::from([("sid", 1)]));
        assert_eq!(mutex.lock_or_recover().get("sid"), Some(&1));
    }

    #[test]
    fn lock_or_recover_survives_poisoning() {
        let mutex = Arc::new(Mutex::new(Vec::<String>::new()));
        let mutex_clone = Arc::clone(&mutex);

        let _ = std::thread::spawn(move || {
            let mut guard = mutex_clone.lock().unwrap();
            guard.push("pending".to_string());
            panic!("poison the lock");
        })
        .join();

        let guard = mutex.lock_or_recover();
        assert_eq!(guard.as_slice(), ["pending".to_string()]);
    }
}
