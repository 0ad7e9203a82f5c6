pub mod gate;
pub mod middleware;
pub mod session;
