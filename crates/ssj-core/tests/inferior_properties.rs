//! Property test for breakpoint dual-index consistency.

use proptest::prelude::*;
use ssj_core::Inferior;

#[derive(Debug, Clone)]
enum Op {
    Add(u32, String, u32),
    Clear(u32),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0u32..8, "[a-c]\\.js", 0u32..8).prop_map(|(id, f, l)| Op::Add(id, f, l)),
        (0u32..8).prop_map(Op::Clear),
    ];
    proptest::collection::vec(op, 0..50)
}

proptest! {
    /// Property 6: after any sequence of add/clear, both indices agree on
    /// the set of known ids.
    #[test]
    fn breakpoint_indices_never_diverge(ops in arb_ops()) {
        let mut inf = Inferior::new();
        for op in ops {
            match op {
                Op::Add(id, file, line) => inf.add_breakpoint(id, file, line),
                Op::Clear(id) => inf.clear_breakpoint(id),
            }
        }

        let by_id: std::collections::HashSet<u32> = inf.breakpoints().map(|b| b.id).collect();
        let by_location: std::collections::HashSet<u32> = inf
            .breakpoints()
            .filter_map(|b| inf.breakpoint_at(&b.file_name, b.line))
            .collect();
        prop_assert_eq!(by_id, by_location);
    }
}
