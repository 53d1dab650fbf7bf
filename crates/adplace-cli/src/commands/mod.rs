pub mod check;
pub mod placements;
pub mod simulate;
