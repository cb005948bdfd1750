//! Interactive page components. Each one works on element ids in the page's
//! [`DomTree`](crate::dom::DomTree) and, where it needs time, on the page's
//! [`TimerQueue`](crate::engine::timers::TimerQueue).

pub mod contact;
pub mod media;
pub mod modal;
pub mod nav;
pub mod packages;
pub mod reveal;
pub mod rotator;
pub mod utilities;
pub mod visibility;
