pub mod salmon;
pub mod sardine;
pub mod tuna;

use tuna::Tuna;

pub struct DependsOnTuna {
    pub tuna: Tuna,
}
