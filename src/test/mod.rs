//! Fixtures for unit tests: small script corpora and one-call decompilation.

use crate::{
    interpreter::{Interpreter, InterpreterConfig},
    ir::FunctionSet,
    script::{PrototypeMap, Script, ScriptFormat, ScriptMap},
};

/// Interprets every script of a corpus and returns the results.
pub fn decompile(format: ScriptFormat, scripts: Vec<(i32, Script)>) -> FunctionSet {
    let scripts: ScriptMap = scripts.into_iter().collect();
    let prototypes = PrototypeMap::new();
    let config = InterpreterConfig::default().with_format(format);
    let mut interpreter = Interpreter::new(&scripts, &prototypes, config);
    interpreter.interpret_all();
    interpreter.finish()
}

/// Renders the instruction chain of one function, one instruction per line.
pub fn listing(set: &FunctionSet, id: i32) -> Vec<String> {
    set.get(id)
        .map(|function| {
            function
                .instructions
                .instructions()
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
