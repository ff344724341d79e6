pub mod atlantic;

use atlantic::AtlanticSardine;

pub trait Swimmer {
    fn swim(&self) -> u32;
}

pub struct Sardine {
    cousin: AtlanticSardine,
}

impl Swimmer for Sardine {
    #[inline]
    fn swim(&self) -> u32 {
        1
    }
}
