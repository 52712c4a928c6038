// Grouped temporaries
//
// Vulkan create-info structs hold raw pointer + count pairs into sibling
// arrays. A `Bundle` owns those arrays and hands out descriptors that borrow
// it, so the arrays cannot move or drop while a descriptor still points into
// them. Descriptors are rebuilt on every `view` call instead of being stored
// next to the data they reference.

use std::ops::Deref;

pub struct Bundle<D> {
    dependencies: D,
}

impl<D> Bundle<D> {
    pub fn new(dependencies: D) -> Self {
        Self { dependencies }
    }

    /// Build a descriptor from the owned dependencies.
    ///
    /// The result borrows `self`, which pins the dependencies in place for as
    /// long as the descriptor lives.
    pub fn view<'a, M>(&'a self, factory: impl FnOnce(&'a D) -> M) -> M {
        factory(&self.dependencies)
    }
}

impl<D> Deref for Bundle<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.dependencies
    }
}
