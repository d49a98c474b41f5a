mod bracket;

mod smiles;
pub use smiles::*;
