mod recipe;
mod taxonomy;
mod view;

pub use recipe::parse_ids;
pub use taxonomy::TaxonomyKind;
pub use view::*;

use std::ops::Deref;

/// Tag, ingredient and recipe store. Every operation is scoped to the
/// owning user id.
#[derive(Clone)]
pub struct Command(pub cookbook_shared::State);

impl Deref for Command {
    type Target = cookbook_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
