use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;

/// Saved context for native code, reached from managed code, that calls back
/// into managed-aware logic.
///
/// Lives on the stack of the call that creates it. It is neither `Send` nor
/// `Sync`, and the runtime fills it in on entry.
#[repr(C)]
#[derive(Debug)]
pub struct ReverseTransitionFrame {
    pub saved_transition_frame: *mut c_void,
    pub saved_thread: *mut c_void,
    _not_send: PhantomData<*mut ()>,
}

impl ReverseTransitionFrame {
    pub const fn new() -> Self {
        ReverseTransitionFrame {
            saved_transition_frame: ptr::null_mut(),
            saved_thread: ptr::null_mut(),
            _not_send: PhantomData,
        }
    }
}

impl Default for ReverseTransitionFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// The runtime's side of a reverse transition.
pub trait TransitionBridge {
    /// # Safety
    /// `frame` must be a live stack frame not currently entered.
    unsafe fn enter(&self, frame: *mut ReverseTransitionFrame);

    /// # Safety
    /// `frame` must be the frame most recently entered on this thread.
    unsafe fn leave(&self, frame: *mut ReverseTransitionFrame);
}

/// Scope of one reverse transition. Leaves on drop, so the prior context is
/// restored whether the scope returns or unwinds.
pub struct ReverseTransition<'f, B: TransitionBridge + ?Sized> {
    bridge: &'f B,
    frame: &'f mut ReverseTransitionFrame,
}

impl<'f, B: TransitionBridge + ?Sized> ReverseTransition<'f, B> {
    pub fn enter(bridge: &'f B, frame: &'f mut ReverseTransitionFrame) -> Self {
        // SAFETY: the exclusive borrow keeps the frame in place until drop.
        unsafe { bridge.enter(&mut *frame) };
        ReverseTransition { bridge, frame }
    }

    pub fn frame(&self) -> &ReverseTransitionFrame {
        self.frame
    }
}

impl<B: TransitionBridge + ?Sized> Drop for ReverseTransition<'_, B> {
    fn drop(&mut self) {
        // SAFETY: this frame was entered in `enter` and is still borrowed.
        unsafe { self.bridge.leave(&mut *self.frame) };
    }
}

/// Runs `f` inside a reverse transition backed by a frame on this stack.
pub fn with_reverse_transition<B, F, R>(bridge: &B, f: F) -> R
where
    B: TransitionBridge + ?Sized,
    F: FnOnce() -> R,
{
    let mut frame = ReverseTransitionFrame::new();
    let _transition = ReverseTransition::enter(bridge, &mut frame);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::panic;

    #[derive(Default)]
    struct RecordingBridge {
        events: RefCell<Vec<(&'static str, usize)>>,
    }

    impl TransitionBridge for RecordingBridge {
        unsafe fn enter(&self, frame: *mut ReverseTransitionFrame) {
            (*frame).saved_thread = 0x7 as *mut c_void;
            self.events.borrow_mut().push(("enter", frame as usize));
        }

        unsafe fn leave(&self, frame: *mut ReverseTransitionFrame) {
            self.events.borrow_mut().push(("leave", frame as usize));
        }
    }

    #[test]
    fn enter_and_leave_use_the_same_frame() {
        let bridge = RecordingBridge::default();
        let value = with_reverse_transition(&bridge, || 5);
        assert_eq!(value, 5);

        let events = bridge.events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "enter");
        assert_eq!(events[1].0, "leave");
        assert_eq!(events[0].1, events[1].1);
    }

    #[test]
    fn leave_runs_when_the_scope_unwinds() {
        let bridge = RecordingBridge::default();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            with_reverse_transition(&bridge, || panic!("callback failed"))
        }));
        assert!(result.is_err());

        let names: Vec<_> = bridge.events.borrow().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["enter", "leave"]);
    }

    #[test]
    fn runtime_writes_land_in_the_callers_frame() {
        let bridge = RecordingBridge::default();
        let mut frame = ReverseTransitionFrame::new();
        {
            let transition = ReverseTransition::enter(&bridge, &mut frame);
            assert_eq!(transition.frame().saved_thread, 0x7 as *mut c_void);
        }
        assert_eq!(frame.saved_thread, 0x7 as *mut c_void);
    }
}
