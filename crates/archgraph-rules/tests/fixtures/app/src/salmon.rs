#[derive(Debug, Clone, PartialEq)]
pub struct Salmon;
