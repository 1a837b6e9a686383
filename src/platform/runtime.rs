use std::future::Future;

/// Runs `future` in the background without waiting for it.
///
/// On the web the future is queued on the microtask loop. Natively it is
/// spawned on the ambient Tokio runtime; without one it is driven to
/// completion on the calling thread.
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(_) => futures::executor::block_on(future),
    }
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm-web")))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    futures::executor::block_on(future);
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_inline_without_a_runtime() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        spawn_detached(async move {
            flag.store(true, Ordering::SeqCst);
        });
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn spawns_on_the_ambient_runtime() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn_detached(async move {
            let _ = tx.send(7);
        });
        assert_eq!(rx.await.unwrap(), 7);
    }
}
