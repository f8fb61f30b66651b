// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell driven by raw pointer positions.
//!
//! A toolbar of three buttons laid out in a row. A scripted pointer path is
//! replayed one frame (16 ms) at a time; the hover driver turns positions into
//! enter/leave calls and the tracker reports which button the pointer rested on.
//! Tracker activity is logged at trace level.
//!
//! Run:
//! - `cargo run -p understory_demos --example dwell_hover`

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use kurbo::{Point, Rect};
use simplelog::{Config, LevelFilter, SimpleLogger};
use understory_dwell::attrs::{AttrValue, Attributes};
use understory_dwell::child::Child;
use understory_dwell::config::{DwellConfig, SlotPolicy};
use understory_dwell::hover::{HoverEvent, HoverState};
use understory_dwell::pointer::{Modifiers, PointerEvent};
use understory_dwell::timer::ManualScheduler;
use understory_dwell::tracker::DwellTracker;

const FRAME: Duration = Duration::from_millis(16);

fn main() {
    let _ = SimpleLogger::init(LevelFilter::Trace, Config::default());

    let timers = Rc::new(ManualScheduler::new());
    let tips: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = tips.clone();
    let config = DwellConfig::new()
        .with_dwelling_time(Duration::from_millis(400))
        .with_slots(SlotPolicy::PerChild);
    let mut tracker: DwellTracker<ManualScheduler> =
        DwellTracker::with_config(timers.clone(), config).on_dwell(
            move |e: &PointerEvent, attrs: &Attributes| {
                if let Some(AttrValue::Str(tip)) = attrs.get("tooltip") {
                    let tip = if e.modifiers.contains(Modifiers::SHIFT) {
                        format!("{tip} (details)")
                    } else {
                        tip.clone()
                    };
                    sink.borrow_mut().push(tip);
                }
            },
        );

    let labels = ["Cut", "Copy", "Paste"];
    let bounds: Vec<Rect> = (0..labels.len())
        .map(|i| {
            let x = i as f64 * 40.0;
            Rect::new(x, 0.0, x + 32.0, 24.0)
        })
        .collect();
    let children: Vec<Child<PointerEvent, Attributes>> = labels
        .iter()
        .map(|label| {
            Child::new(
                Attributes::new()
                    .with("label", *label)
                    .with("tooltip", format!("{label} the selection")),
            )
        })
        .collect();
    let wrapped = tracker.wrap(&children);

    // (position, frames spent there, modifiers)
    let path = [
        (Point::new(10.0, 10.0), 10, Modifiers::empty()), // 160 ms on Cut
        (Point::new(50.0, 10.0), 30, Modifiers::empty()), // 480 ms on Copy
        (Point::new(36.0, 10.0), 5, Modifiers::empty()),  // gap between buttons
        (Point::new(90.0, 12.0), 30, Modifiers::SHIFT),   // 480 ms on Paste
        (Point::new(200.0, 12.0), 1, Modifiers::empty()), // off the toolbar
    ];

    let mut hover = HoverState::new();
    for (pos, frames, modifiers) in path {
        let ev = PointerEvent::at(pos).with_modifiers(modifiers);
        for t in hover.pointer_moved(&wrapped, &bounds, &ev) {
            match t {
                HoverEvent::Enter(i) => println!("  enter {}", labels[i]),
                HoverEvent::Leave(i) => println!("  leave {}", labels[i]),
            }
        }
        for _ in 0..frames {
            timers.advance(FRAME);
        }
    }
    let _ = hover.pointer_left(&wrapped, &PointerEvent::default());

    println!("== Tooltips shown ==");
    for tip in tips.borrow().iter() {
        println!("  {tip}");
    }
    assert_eq!(
        *tips.borrow(),
        vec![
            String::from("Copy the selection"),
            String::from("Paste the selection (details)"),
        ]
    );
}
