use super::Swimmer;

pub struct AtlanticSardine;

impl Swimmer for AtlanticSardine {
    fn swim(&self) -> u32 {
        2
    }
}
