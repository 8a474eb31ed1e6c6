/// Ion mobility estimates from the ion mass (SDS model)
pub mod mobility;
