pub mod cell;
pub mod direction;
pub mod random_pool;
