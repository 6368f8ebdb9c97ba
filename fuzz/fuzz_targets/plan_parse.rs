#![no_main]

//! Fuzz target for plan.json and apply.json parsing.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(plan) = serde_json::from_str::<buildergen_types::plan::EditPlan>(s) {
        let _ = serde_json::to_string_pretty(&plan);
    }

    let _ = serde_json::from_str::<buildergen_types::plan::PlanOp>(s);
    let _ = serde_json::from_str::<buildergen_types::plan::PlanSummary>(s);
    let _ = serde_json::from_str::<buildergen_types::ops::EditOp>(s);
    let _ = serde_json::from_str::<Vec<buildergen_types::ops::EditOp>>(s);
    let _ = serde_json::from_str::<buildergen_types::apply::ApplyReport>(s);

    if let Ok(val) = serde_json::from_str::<serde_json::Value>(s) {
        let _ = serde_json::from_value::<buildergen_types::plan::EditPlan>(val);
    }
});
