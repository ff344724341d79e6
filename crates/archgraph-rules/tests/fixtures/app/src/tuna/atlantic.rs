use crate::salmon::Salmon;

pub struct AtlanticTuna {
    salmon: Salmon,
}
