//! Shared test helpers.

use std::future::Future;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

/// Poll a future to completion on the current thread.
///
/// Collaborator futures in this crate never wait on I/O readiness, so a
/// no-op waker is enough.
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_ready_and_boxed() {
        assert_eq!(block_on(async { 7 }), 7);
        let boxed: crate::storage::BoxFuture<'_, &str> = Box::pin(async { "done" });
        assert_eq!(block_on(boxed), "done");
    }
}
