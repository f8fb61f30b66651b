// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell basics.
//!
//! Loads a tracker configuration from JSON, wraps two children, and walks
//! through a dwell, a transient hover, and a hover that moves between children.
//!
//! Run:
//! - `cargo run -p understory_demos --example dwell_basics`

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use understory_dwell::attrs::Attributes;
use understory_dwell::child::Child;
use understory_dwell::config::DwellConfig;
use understory_dwell::pointer::PointerEvent;
use understory_dwell::timer::ManualScheduler;
use understory_dwell::tracker::DwellTracker;

fn main() {
    let config: DwellConfig =
        serde_json::from_str(r#"{ "dwellingTime": 500 }"#).expect("valid config");
    println!("== Config ==\n  {:?}", config);

    let timers = Rc::new(ManualScheduler::new());
    let dwelled: Rc<RefCell<Vec<Attributes>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = dwelled.clone();
    let mut tracker: DwellTracker<ManualScheduler> =
        DwellTracker::with_config(timers.clone(), config).on_dwell(
            move |_: &PointerEvent, attrs: &Attributes| {
                sink.borrow_mut().push(attrs.clone());
            },
        );

    let children = vec![
        Child::new(Attributes::new().with("aKey", "childOne"))
            .with_pointer_enter(|_: &PointerEvent| println!("  (childOne's own hover handler)")),
        Child::new(Attributes::new().with("aKey", "childTwo")),
    ];
    let wrapped = tracker.wrap(&children);
    let ev = PointerEvent::default();

    // Rest on child one for the full dwelling time.
    println!("== Dwell on childOne ==");
    wrapped[0].pointer_enter(&ev);
    timers.advance(Duration::from_millis(500));
    wrapped[0].pointer_leave(&ev);
    println!("  dwelled: {:?}", dwelled.borrow());
    assert_eq!(dwelled.borrow().len(), 1);

    // Leave after half the dwelling time.
    println!("== Transient hover on childTwo ==");
    wrapped[1].pointer_enter(&ev);
    timers.advance(Duration::from_millis(250));
    wrapped[1].pointer_leave(&ev);
    timers.advance(Duration::from_secs(1));
    println!("  dwelled: {} total", dwelled.borrow().len());
    assert_eq!(dwelled.borrow().len(), 1);

    // Brush past child one, settle on child two.
    println!("== Brush past childOne, settle on childTwo ==");
    wrapped[0].pointer_enter(&ev);
    wrapped[0].pointer_leave(&ev);
    wrapped[1].pointer_enter(&ev);
    timers.advance(Duration::from_millis(500));
    let last = dwelled.borrow().last().cloned();
    println!("  last dwell: {:?}", last);
    assert_eq!(last, Some(Attributes::new().with("aKey", "childTwo")));
    assert_eq!(dwelled.borrow().len(), 2);
}
