// src/utils/cache.rs
use std::cell::OnceCell;
use std::rc::Rc;

/// Lazily computed value that is either memoized or recomputed on every access.
///
/// Regions hold one `Memo` per intermediate quantity (coordinates, centroid,
/// inertia tensor, ...). With caching disabled, every call runs the
/// computation again and nothing is retained, trading time for memory.
pub struct Memo<T> {
    enabled: bool,
    cell: OnceCell<Rc<T>>,
}

impl<T> Memo<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_compute<F>(&self, compute: F) -> Rc<T>
    where
        F: FnOnce() -> T,
    {
        if !self.enabled {
            return Rc::new(compute());
        }
        Rc::clone(self.cell.get_or_init(|| Rc::new(compute())))
    }
}
