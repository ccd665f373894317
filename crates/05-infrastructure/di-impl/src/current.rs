//! 线程内的“当前定位器”
//!
//! 只是显式传递定位器之外的便利层：`with_locator` 在闭包执行期间把定位器安装到当前线程，
//! 嵌套调用结束后恢复外层的定位器，闭包 panic 时同样恢复。

use crate::locator::DefaultBeanLocator;
use std::cell::RefCell;

thread_local! {
    static CURRENT: RefCell<Option<DefaultBeanLocator>> = const { RefCell::new(None) };
}

struct Restore {
    previous: Option<DefaultBeanLocator>,
}

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// 在 `f` 执行期间把 `locator` 设为当前线程的定位器
pub fn with_locator<R>(locator: &DefaultBeanLocator, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(locator.clone()));
    let _restore = Restore { previous };
    f()
}

/// 当前线程的定位器
pub fn locator() -> Option<DefaultBeanLocator> {
    CURRENT.with(|current| current.borrow().clone())
}
