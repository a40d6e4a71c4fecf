#![no_main]

//! Drives arbitrary attach/detach sequences through a bridge and checks the
//! bookkeeping against a naive model: counts match, native identity is
//! stable while a subscription is live, and eviction is final.

use std::any::Any;
use std::rc::Rc;

use arbitrary::Arbitrary;
use evshim_core::{EventHandler, NativeSignal, SignalBridge, SignalHandler};
use libfuzzer_sys::fuzz_target;

const POOL: usize = 8;

#[derive(Arbitrary, Debug)]
enum Op {
    Attach { slot: u8 },
    Detach { slot: u8 },
}

struct Recv;

fn on_signal(_receiver: Option<&dyn Any>, _sender: &u8, _args: &()) {}

fuzz_target!(|ops: Vec<Op>| {
    let receivers: Vec<Rc<Recv>> = (0..POOL).map(|_| Rc::new(Recv)).collect();
    let mut bridge: SignalBridge<u8> = SignalBridge::new();

    let mut counts = [0usize; POOL];
    let mut natives: Vec<Option<NativeSignal<u8>>> = vec![None; POOL];

    for op in ops {
        let (slot, attach) = match op {
            Op::Attach { slot } => (slot as usize % POOL, true),
            Op::Detach { slot } => (slot as usize % POOL, false),
        };
        let handler: SignalHandler<u8> = EventHandler::bound(Rc::clone(&receivers[slot]), on_signal);

        if attach {
            let native = bridge
                .map_for_attachment(Some(&handler))
                .expect("attach of a present handler maps");
            match &natives[slot] {
                Some(known) => assert!(Rc::ptr_eq(known, &native)),
                None => natives[slot] = Some(native),
            }
            counts[slot] += 1;
        } else if counts[slot] == 0 {
            assert!(bridge.try_map_for_detachment(Some(&handler)).is_none());
        } else {
            let native = bridge
                .try_map_for_detachment(Some(&handler))
                .expect("live identity detaches");
            let known = natives[slot].as_ref().expect("live identity has a native");
            assert!(Rc::ptr_eq(known, &native));
            counts[slot] -= 1;
            if counts[slot] == 0 {
                natives[slot] = None;
            }
        }

        assert_eq!(bridge.attachment_count(Some(&handler)), counts[slot]);
    }

    assert_eq!(bridge.len(), counts.iter().filter(|&&c| c > 0).count());
});
