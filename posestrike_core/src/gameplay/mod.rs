pub mod combo;
pub mod match_loop;
pub mod session;
