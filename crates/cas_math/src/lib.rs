pub mod error;
pub mod eval;
pub mod numeric;

pub use error::EvalError;
pub use eval::evaluate;
pub use numeric::{abs, gcd, lcm, nth_root, prime_factorization, sign};
