//! Cancellable browser timers
//!
//! Both handles stop their timer on `cancel()` or `Drop`. `cancel()` is safe
//! to call from inside the handle's own callback; dropping is not (the
//! callback closure would be freed while it runs), so owners cancel from
//! callbacks and drop from elsewhere.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

/// High resolution clock (ms), same timebase as animation frame timestamps
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// `setInterval` handle
pub struct Interval {
    handle: Option<i32>,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start(period_ms: i32, callback: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut()>::new(callback);
        let handle = window()?.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms,
        )?;
        Ok(Self {
            handle: Some(handle),
            _closure: closure,
        })
    }

    pub fn cancel(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
            window.clear_interval_with_handle(handle);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct LoopInner {
    frame: Cell<Option<i32>>,
    stopped: Cell<bool>,
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopInner {
    fn request(&self) {
        if self.stopped.get() {
            return;
        }
        let closure = self.closure.borrow();
        let (Some(closure), Some(window)) = (closure.as_ref(), web_sys::window()) else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => self.frame.set(Some(id)),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

/// Self-rescheduling `requestAnimationFrame` loop
///
/// The callback gets the frame timestamp and returns whether to keep going.
pub struct AnimationLoop {
    inner: Rc<LoopInner>,
}

impl AnimationLoop {
    pub fn start(mut callback: impl FnMut(f64) -> bool + 'static) -> Result<Self, JsValue> {
        // Fail early if there is no window to schedule on
        window()?;

        let inner = Rc::new(LoopInner {
            frame: Cell::new(None),
            stopped: Cell::new(false),
            closure: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.frame.set(None);
            if inner.stopped.get() || !callback(time) {
                return;
            }
            inner.request();
        });
        *inner.closure.borrow_mut() = Some(closure);
        inner.request();

        Ok(Self { inner })
    }

    pub fn cancel(&mut self) {
        self.inner.stopped.set(true);
        if let (Some(id), Some(window)) = (self.inner.frame.take(), web_sys::window()) {
            window.cancel_animation_frame(id).ok();
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
        self.inner.closure.borrow_mut().take();
    }
}
