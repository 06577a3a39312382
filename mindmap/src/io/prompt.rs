//! System prompt rendering for mind-map generation.

use minijinja::{Environment, context};

use crate::core::segment::{IDEOGRAPH_LIMIT, WORD_LIMIT};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

/// Render the fixed system instruction describing the required JSON shape
/// and the label budget.
pub fn build_system_prompt() -> String {
    let mut env = Environment::new();
    env.add_template("system", SYSTEM_TEMPLATE)
        .expect("system template should be valid");
    env.get_template("system")
        .expect("system template registered")
        .render(context! {
            ideograph_limit => IDEOGRAPH_LIMIT,
            word_limit => WORD_LIMIT,
        })
        .expect("system template rendering should not fail")
}
