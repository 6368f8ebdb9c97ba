#![no_main]

//! Fuzz target for applying arbitrary plans to arbitrary units.
//!
//! Whatever the inputs, a failed apply must leave the unit exactly as it was.

use buildergen_edit::{ApplyOptions, apply_plan};
use buildergen_types::decl::CompilationUnit;
use buildergen_types::plan::{EditPlan, ToolInfo};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    unit_json: String,
    plan_json: String,
    dry_run: bool,
    require_clean_hashes: bool,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(mut unit) = serde_json::from_str::<CompilationUnit>(&input.unit_json) else {
        return;
    };
    let Ok(plan) = serde_json::from_str::<EditPlan>(&input.plan_json) else {
        return;
    };

    let before = unit.clone();
    let opts = ApplyOptions {
        dry_run: input.dry_run,
        require_clean_hashes: input.require_clean_hashes,
    };
    let tool = ToolInfo {
        name: "buildergen-fuzz".to_string(),
        version: None,
    };

    match apply_plan(&mut unit, &plan, tool, &opts) {
        Ok((report, _patch)) => {
            if input.dry_run || !report.committed {
                assert_eq!(unit, before);
            }
        }
        Err(_) => assert_eq!(unit, before),
    }
});
