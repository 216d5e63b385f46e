//! File-driven injection cases.
//!
//! Each `tests/cases/<name>.py` is injected with the space in `<name>.json`
//! (or `<name>.space.py` for a Python dict literal) and compared with
//! `<name>.expected`.

use std::{error::Error, fs, path::Path};

use kwinject::{ParamSpace, inject};

fn run_case(path: &Path) -> datatest_stable::Result<()> {
    let code = fs::read_to_string(path)?;
    let json_space = path.with_extension("json");
    let space = if json_space.exists() {
        ParamSpace::from_json_str(&fs::read_to_string(&json_space)?)?
    } else {
        ParamSpace::from_literal(&fs::read_to_string(path.with_extension("space.py"))?)?
    };
    let expected = fs::read_to_string(path.with_extension("expected"))?;

    let actual = inject(&code, &space)?;
    if actual != expected {
        let msg: Box<dyn Error> = format!(
            "{}: output differs\n--- expected\n{expected}\n+++ actual\n{actual}",
            path.display()
        )
        .into();
        return Err(msg);
    }
    Ok(())
}

datatest_stable::harness!(run_case, "tests/cases", r"(^|/)[^/.]+\.py$");
