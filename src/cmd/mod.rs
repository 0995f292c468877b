mod check;
mod generate;
mod slides;

pub use check::cmd_check;
pub use generate::cmd_generate;
pub use slides::cmd_slides;

use beanflow::PitchScript;

/// Built-in pitch, or one slide per sentence of `text`.
fn script_for(text: Option<&str>) -> PitchScript {
    text.map_or_else(PitchScript::beanflow, PitchScript::from_text)
}
