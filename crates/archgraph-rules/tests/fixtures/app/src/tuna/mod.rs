pub mod atlantic;

use crate::salmon::Salmon;

pub struct Tuna {
    weight: u32,
}

impl Tuna {
    pub fn new(prey: Salmon) -> Self {
        drop(prey);
        Self { weight: 0 }
    }
}

pub struct TunaField {
    pub salmon: Salmon,
}

pub struct TunaProperty;

impl TunaProperty {
    pub fn salmon(&self) -> Salmon {
        Salmon
    }
}
