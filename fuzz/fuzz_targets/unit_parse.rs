#![no_main]

//! Fuzz target for compilation unit parsing and rendering.
//!
//! Arbitrary JSON must either fail to parse or render without panicking, and a
//! parsed unit must survive a serialize/parse cycle unchanged.

use buildergen_types::decl::{ClassDecl, CompilationUnit, DeclPath};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = DeclPath::parse(s);
    if let Ok(class) = serde_json::from_str::<ClassDecl>(s) {
        let _ = buildergen_render::render_class(&class);
    }

    if let Ok(unit) = serde_json::from_str::<CompilationUnit>(s) {
        let rendered = buildergen_render::render_unit(&unit);
        let json = serde_json::to_string(&unit).expect("serialize parsed unit");
        let reparsed: CompilationUnit = serde_json::from_str(&json).expect("reparse unit");
        assert_eq!(reparsed, unit);
        assert_eq!(buildergen_render::render_unit(&reparsed), rendered);
    }
});
